use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Channel, CommunicationType, DataType, InfoCategory, Wires};
use crate::channel::{ChannelBank, ChannelConfig};
use crate::error::{Error, Result};
use crate::port::{usb::UsbPt104Library, Handle, HardwarePort};
use crate::scale::scale;
use crate::timing;

/// Unit information snapshot, fetched on demand from an open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitInfo {
    pub driver_version: String,
    pub usb_version: String,
    pub hardware_version: String,
    pub variant_info: String,
    pub batch_and_serial: String,
    pub cal_date: String,
    pub kernel_driver_version: String,
}

impl fmt::Display for UnitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "driver_version: {}", self.driver_version)?;
        writeln!(f, "usb_version: {}", self.usb_version)?;
        writeln!(f, "hardware_version: {}", self.hardware_version)?;
        writeln!(f, "variant_info: {}", self.variant_info)?;
        writeln!(f, "batch_and_serial: {}", self.batch_and_serial)?;
        writeln!(f, "cal_date: {}", self.cal_date)?;
        write!(f, "kernel_driver_version: {}", self.kernel_driver_version)
    }
}

/// Session manager for one PT-104 unit.
///
/// Owns the channel configuration store and at most one open driver handle.
/// Channels can be configured before connecting; `connect` pushes the whole
/// stored configuration to the hardware.
///
/// Not meant for concurrent callers: every operation takes `&mut self`, so
/// sharing a device across tasks needs an external mutex.
pub struct Device {
    port: Box<dyn HardwarePort>,
    handle: Option<Handle>,
    channels: ChannelBank,
}

impl Device {
    /// Create a session manager backed by the usbpt104 shared library.
    ///
    /// Fails if the driver library cannot be loaded or lacks a symbol.
    pub fn new() -> Result<Self> {
        Ok(Self::with_port(Box::new(UsbPt104Library::load()?)))
    }

    /// Create a session manager on an already constructed hardware port.
    pub fn with_port(port: Box<dyn HardwarePort>) -> Self {
        Self {
            port,
            handle: None,
            channels: ChannelBank::new(),
        }
    }

    /// Connection status.
    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Connect to a unit over USB by its batch/serial id (empty for "any").
    pub fn connect(&mut self, serial: &str) -> Result<()> {
        self.connect_via(serial, CommunicationType::Usb)
    }

    /// Connect to a unit over an explicit transport.
    ///
    /// Only USB is implemented; requesting `Ethernet` fails by design and
    /// the `All` enumeration sentinel is rejected as a programmer error.
    /// An existing session is closed first, so no handle leaks across
    /// reconnects.
    pub fn connect_via(&mut self, serial: &str, interface: CommunicationType) -> Result<()> {
        match interface {
            CommunicationType::All => return Err(Error::UnsupportedInterface),
            CommunicationType::Ethernet => return Err(Error::EthernetNotImplemented),
            CommunicationType::Usb => {}
        }

        if self.is_connected() {
            self.disconnect();
        }

        let handle = self.port.open(serial.as_bytes()).map_err(Error::Open)?;
        self.handle = Some(handle);
        info!("PT-104 opened (handle {handle})");

        if let Some(unit) = self.get_unit_info() {
            debug!(
                "connected to {} ({})",
                unit.variant_info, unit.batch_and_serial
            );
        }
        self.push_channels();
        Ok(())
    }

    /// Close the session. Idempotent; returns false if already disconnected.
    pub fn disconnect(&mut self) -> bool {
        let Some(handle) = self.handle.take() else {
            return false;
        };
        if let Err(status) = self.port.close(handle) {
            warn!("device close reported driver status {status:#010x}");
        }
        info!("PT-104 closed (handle {handle})");
        true
    }

    /// Store a channel configuration and push it to the hardware.
    ///
    /// The in-memory store is always updated, even without a session, so the
    /// configuration survives a reconnect. Returns whether the hardware was
    /// updated too.
    pub fn configure_channel(
        &mut self,
        channel: Channel,
        data_type: DataType,
        wires: Wires,
        low_pass_filter: bool,
    ) -> bool {
        self.channels.state_mut(channel).config = ChannelConfig {
            data_type,
            wires,
            low_pass_filter,
        };
        let Some(handle) = self.handle else {
            debug!("device not connected, stored configuration for {channel} only");
            return false;
        };
        match self.port.set_channel(handle, channel, data_type, wires) {
            Ok(()) => true,
            Err(status) => {
                warn!("{channel} configuration rejected, driver status {status:#010x}");
                false
            }
        }
    }

    /// Configure several channels at once. Returns whether every
    /// configuration reached the hardware.
    pub fn configure_channels<I>(&mut self, configs: I) -> bool
    where
        I: IntoIterator<Item = (Channel, ChannelConfig)>,
    {
        let mut pushed = true;
        for (channel, cfg) in configs {
            pushed &=
                self.configure_channel(channel, cfg.data_type, cfg.wires, cfg.low_pass_filter);
        }
        pushed
    }

    /// Push the whole stored channel configuration to the hardware.
    fn push_channels(&mut self) {
        let Some(handle) = self.handle else {
            return;
        };
        for (channel, state) in self.channels.iter() {
            let cfg = state.config;
            if let Err(status) = self
                .port
                .set_channel(handle, channel, cfg.data_type, cfg.wires)
            {
                warn!("{channel} configuration rejected, driver status {status:#010x}");
            }
        }
    }

    /// Number of channels currently configured with a non-off data type.
    pub fn active_channel_count(&self) -> usize {
        self.channels.active_channel_count()
    }

    /// Stored configuration of a channel.
    pub fn channel_config(&self, channel: Channel) -> ChannelConfig {
        self.channels.state(channel).config
    }

    /// Query a measurement value from the unit.
    ///
    /// Returns `None` without touching the hardware when disconnected.
    /// Otherwise waits out the channel's conversion deadline, issues the
    /// read and scales the code with the channel's current data type; with
    /// `raw` the unscaled code is returned. A read the driver rejects is
    /// reported as `None`, the caller can retry on its next sampling tick.
    pub async fn get_value(&mut self, channel: Channel, raw: bool) -> Result<Option<f64>> {
        self.get_value_with_cancel(channel, raw, &CancellationToken::new())
            .await
    }

    /// Like [`get_value`](Self::get_value), but the conversion wait aborts
    /// with [`Error::Cancelled`] when `cancel` fires.
    pub async fn get_value_with_cancel(
        &mut self,
        channel: Channel,
        raw: bool,
        cancel: &CancellationToken,
    ) -> Result<Option<f64>> {
        let Some(handle) = self.handle else {
            return Ok(None);
        };

        let deadline = timing::conversion_deadline(
            self.channels.state(channel).last_query,
            self.channels.active_channel_count(),
        );
        timing::wait_until(deadline, cancel).await?;

        let low_pass_filter = self.channels.state(channel).config.low_pass_filter;
        let result = self.port.read_value(handle, channel, low_pass_filter);

        // The query timestamp advances on failure too, the converter has
        // been disturbed either way.
        let state = self.channels.state_mut(channel);
        state.last_query = Instant::now();

        match result {
            Ok(code) => {
                state.last_raw = code;
                if raw {
                    Ok(Some(code as f64))
                } else if state.config.data_type == DataType::Off {
                    // An off channel has no unit to scale into.
                    Ok(None)
                } else {
                    // Scaling uses the data type configured *now*, not the
                    // one active when the conversion started.
                    Ok(Some(scale(code, state.config.data_type)))
                }
            }
            Err(status) => {
                warn!("read on {channel} failed, driver status {status:#010x}");
                Ok(None)
            }
        }
    }

    /// Scaled reading of channel 1.
    pub async fn value_channel_1(&mut self) -> Result<Option<f64>> {
        self.get_value(Channel::Ch1, false).await
    }

    /// Scaled reading of channel 2.
    pub async fn value_channel_2(&mut self) -> Result<Option<f64>> {
        self.get_value(Channel::Ch2, false).await
    }

    /// Scaled reading of channel 3.
    pub async fn value_channel_3(&mut self) -> Result<Option<f64>> {
        self.get_value(Channel::Ch3, false).await
    }

    /// Scaled reading of channel 4.
    pub async fn value_channel_4(&mut self) -> Result<Option<f64>> {
        self.get_value(Channel::Ch4, false).await
    }

    /// Inform the driver of the local mains frequency for noise rejection.
    ///
    /// Needs an open session. Returns whether the driver accepted the
    /// setting.
    pub fn set_mains(&mut self, sixty_hertz: bool) -> Result<bool> {
        let handle = self.handle.ok_or(Error::NotConnected)?;
        match self.port.set_mains(handle, sixty_hertz as u16) {
            Ok(()) => Ok(true),
            Err(status) => {
                warn!("mains setting rejected, driver status {status:#010x}");
                Ok(false)
            }
        }
    }

    /// Fetch the unit information snapshot.
    ///
    /// `None` when disconnected or when any of the seven info queries fails.
    pub fn get_unit_info(&self) -> Option<UnitInfo> {
        let handle = self.handle?;
        let query = |category| self.port.unit_info(handle, category).ok();
        Some(UnitInfo {
            driver_version: query(InfoCategory::DriverVersion)?,
            usb_version: query(InfoCategory::UsbVersion)?,
            hardware_version: query(InfoCategory::HardwareVersion)?,
            variant_info: query(InfoCategory::VariantInfo)?,
            batch_and_serial: query(InfoCategory::BatchAndSerial)?,
            cal_date: query(InfoCategory::CalDate)?,
            kernel_driver_version: query(InfoCategory::KernelDriverVersion)?,
        })
    }

    /// List attached units on this device's port. No session required.
    pub fn discover(&self, interface: CommunicationType) -> Result<String> {
        self.port.enumerate(interface).map_err(Error::Enumerate)
    }

    /// List attached units via the usbpt104 library. No session required.
    pub fn discover_devices(interface: CommunicationType) -> Result<String> {
        UsbPt104Library::load()?
            .enumerate(interface)
            .map_err(Error::Enumerate)
    }
}
