use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::catalog::{Channel, DataType, Wires, MAX_CHANNELS};

/// Desired configuration of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub data_type: DataType,
    pub wires: Wires,
    pub low_pass_filter: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            data_type: DataType::Off,
            wires: Wires::Four,
            low_pass_filter: false,
        }
    }
}

/// Runtime state of a channel slot.
///
/// Lives for the whole session manager lifetime; configuration is kept even
/// while the unit is disconnected so a reconnect can push it again.
#[derive(Debug, Clone)]
pub(crate) struct ChannelState {
    pub(crate) config: ChannelConfig,
    pub(crate) last_raw: i32,
    pub(crate) last_query: Instant,
}

impl ChannelState {
    fn new() -> Self {
        Self {
            config: ChannelConfig::default(),
            last_raw: 0,
            last_query: Instant::now(),
        }
    }
}

/// Fixed-size bank of all protocol channel slots, owned by the session
/// manager. Slots are never added or removed, only reconfigured.
#[derive(Debug, Clone)]
pub(crate) struct ChannelBank {
    slots: [ChannelState; MAX_CHANNELS],
}

impl ChannelBank {
    pub(crate) fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| ChannelState::new()),
        }
    }

    pub(crate) fn state(&self, channel: Channel) -> &ChannelState {
        &self.slots[channel.index()]
    }

    pub(crate) fn state_mut(&mut self, channel: Channel) -> &mut ChannelState {
        &mut self.slots[channel.index()]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Channel, &ChannelState)> {
        Channel::ALL.iter().map(|ch| (*ch, self.state(*ch)))
    }

    /// Number of channels the converter currently has to visit.
    ///
    /// Recomputed on every call; configuration can change at runtime.
    pub(crate) fn active_channel_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.config.data_type != DataType::Off)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_off_four_wire() {
        let bank = ChannelBank::new();
        for (_, state) in bank.iter() {
            assert_eq!(state.config, ChannelConfig::default());
            assert_eq!(state.config.data_type, DataType::Off);
            assert_eq!(state.config.wires, Wires::Four);
            assert!(!state.config.low_pass_filter);
            assert_eq!(state.last_raw, 0);
        }
        assert_eq!(bank.active_channel_count(), 0);
    }

    #[test]
    fn test_active_count_tracks_off_toggling() {
        let mut bank = ChannelBank::new();
        bank.state_mut(Channel::Ch1).config.data_type = DataType::Pt100;
        assert_eq!(bank.active_channel_count(), 1);
        bank.state_mut(Channel::Ch2).config.data_type = DataType::Pt1000;
        assert_eq!(bank.active_channel_count(), 2);
        bank.state_mut(Channel::Ch1).config.data_type = DataType::Off;
        assert_eq!(bank.active_channel_count(), 1);
        bank.state_mut(Channel::Ch1).config.data_type = DataType::Pt100;
        assert_eq!(bank.active_channel_count(), 2);
    }

    #[test]
    fn test_config_round_trip() {
        let mut bank = ChannelBank::new();
        let cfg = ChannelConfig {
            data_type: DataType::ResistanceTo10K,
            wires: Wires::Three,
            low_pass_filter: true,
        };
        bank.state_mut(Channel::Ch3).config = cfg;
        assert_eq!(bank.state(Channel::Ch3).config, cfg);
        // The other slots keep their defaults.
        assert_eq!(bank.state(Channel::Ch4).config, ChannelConfig::default());
    }
}
