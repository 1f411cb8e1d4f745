use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Number of channel slots the wire protocol addresses.
///
/// The PT-104 itself exposes four input pairs, but the driver enumerates
/// eight slots and ignores the upper four on this variant.
pub const MAX_CHANNELS: usize = 8;

/// Input channel of the data logger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum Channel {
    Ch1 = 1,
    Ch2 = 2,
    Ch3 = 3,
    Ch4 = 4,
    Ch5 = 5,
    Ch6 = 6,
    Ch7 = 7,
    Ch8 = 8,
}

impl Channel {
    /// All protocol channel slots, in wire order.
    pub const ALL: [Channel; MAX_CHANNELS] = [
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
        Channel::Ch5,
        Channel::Ch6,
        Channel::Ch7,
        Channel::Ch8,
    ];

    /// Zero-based slot index used for channel state storage.
    pub(crate) fn index(self) -> usize {
        self as usize - 1
    }
}

impl Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CH{}", *self as u32)
    }
}

impl clap::ValueEnum for Channel {
    fn value_variants<'a>() -> &'a [Self] {
        &Self::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new((*self as u32).to_string()))
    }
}

/// Number of sensor leads connected to a channel.
///
/// Three and four wire hookups let the unit compensate for lead resistance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum Wires {
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Wires {
    pub const MIN: Wires = Wires::Two;
    pub const MAX: Wires = Wires::Four;
}

impl Display for Wires {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-wire", *self as u32)
    }
}

impl clap::ValueEnum for Wires {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Two, Self::Three, Self::Four]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new((*self as u32).to_string()))
    }
}

/// Sensor or input range configured for a channel.
///
/// `Off` disables the channel; it is skipped by the converter and excluded
/// from the conversion timing math.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum DataType {
    Off = 0,
    Pt100 = 1,
    Pt1000 = 2,
    ResistanceTo375R = 3,
    ResistanceTo10K = 4,
    DifferentialTo115Mv = 5,
    DifferentialTo2500Mv = 6,
    SingleEndedTo115Mv = 7,
    SingleEndedTo2500Mv = 8,
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Off => f.write_str("Off"),
            DataType::Pt100 => f.write_str("PT100"),
            DataType::Pt1000 => f.write_str("PT1000"),
            DataType::ResistanceTo375R => f.write_str("Resistance 0..375 Ohm"),
            DataType::ResistanceTo10K => f.write_str("Resistance 0..10 kOhm"),
            DataType::DifferentialTo115Mv => f.write_str("Differential 0..115 mV"),
            DataType::DifferentialTo2500Mv => f.write_str("Differential 0..2500 mV"),
            DataType::SingleEndedTo115Mv => f.write_str("Single-ended 0..115 mV"),
            DataType::SingleEndedTo2500Mv => f.write_str("Single-ended 0..2500 mV"),
        }
    }
}

impl clap::ValueEnum for DataType {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Off,
            Self::Pt100,
            Self::Pt1000,
            Self::ResistanceTo375R,
            Self::ResistanceTo10K,
            Self::DifferentialTo115Mv,
            Self::DifferentialTo2500Mv,
            Self::SingleEndedTo115Mv,
            Self::SingleEndedTo2500Mv,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Off => clap::builder::PossibleValue::new("off"),
            Self::Pt100 => clap::builder::PossibleValue::new("pt100"),
            Self::Pt1000 => clap::builder::PossibleValue::new("pt1000"),
            Self::ResistanceTo375R => clap::builder::PossibleValue::new("res375"),
            Self::ResistanceTo10K => clap::builder::PossibleValue::new("res10k"),
            Self::DifferentialTo115Mv => clap::builder::PossibleValue::new("diff115mv"),
            Self::DifferentialTo2500Mv => clap::builder::PossibleValue::new("diff2500mv"),
            Self::SingleEndedTo115Mv => clap::builder::PossibleValue::new("se115mv"),
            Self::SingleEndedTo2500Mv => clap::builder::PossibleValue::new("se2500mv"),
        })
    }
}

/// Transport used to reach a unit. The codes form a bitmask so that `All`
/// can be passed to device enumeration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u32)]
pub enum CommunicationType {
    Usb = 0x0000_0001,
    Ethernet = 0x0000_0002,
    All = 0xFFFF_FFFF,
}

impl Display for CommunicationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunicationType::Usb => f.write_str("USB"),
            CommunicationType::Ethernet => f.write_str("Ethernet"),
            CommunicationType::All => f.write_str("All"),
        }
    }
}

impl clap::ValueEnum for CommunicationType {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Usb, Self::Ethernet, Self::All]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Usb => clap::builder::PossibleValue::new("usb"),
            Self::Ethernet => clap::builder::PossibleValue::new("ethernet"),
            Self::All => clap::builder::PossibleValue::new("all"),
        })
    }
}

/// Category selector for the unit information query.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u32)]
pub enum InfoCategory {
    DriverVersion = 0,
    UsbVersion = 1,
    HardwareVersion = 2,
    VariantInfo = 3,
    BatchAndSerial = 4,
    CalDate = 5,
    KernelDriverVersion = 6,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_codes() {
        assert_eq!(u32::from(Channel::Ch1), 1);
        assert_eq!(u32::from(Channel::Ch8), 8);
        assert_eq!(Channel::try_from(3).unwrap(), Channel::Ch3);
        assert!(Channel::try_from(9).is_err());
    }

    #[test]
    fn test_data_type_codes() {
        assert_eq!(u32::from(DataType::Off), 0);
        assert_eq!(u32::from(DataType::SingleEndedTo2500Mv), 8);
        assert_eq!(DataType::try_from(1).unwrap(), DataType::Pt100);
    }

    #[test]
    fn test_wires_bounds() {
        assert_eq!(u32::from(Wires::MIN), 2);
        assert_eq!(u32::from(Wires::MAX), 4);
    }

    #[test]
    fn test_communication_type_is_bitmask() {
        let all = u32::from(CommunicationType::All);
        assert_eq!(all & u32::from(CommunicationType::Usb), 0x1);
        assert_eq!(all & u32::from(CommunicationType::Ethernet), 0x2);
    }
}
