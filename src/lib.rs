//!
//! This library provides a session and channel manager for the Pico/Omega
//! PT-104 RTD data acquisition module, on top of the usbpt104 driver
//! library shipped with the PicoSDK.
//!
//! <br>
//!
//! # Details
//!
//! - The usbpt104 shared library must be installed; it is loaded when the
//!   [`Device`] is created.
//!
//! - Basic setup, configuration and a reading
//!
//!   ```no_run
//!   use pt104ctrl::{Channel, DataType, Device, Wires};
//!   #[tokio::main]
//!   async fn main() -> pt104ctrl::Result<()> {
//!       let mut unit = Device::new()?;
//!       unit.connect("AY429/026")?;
//!       unit.configure_channel(Channel::Ch1, DataType::Pt100, Wires::Four, false);
//!       if let Some(value) = unit.value_channel_1().await? {
//!           println!("CH1: {value:.3} °C");
//!       }
//!       unit.disconnect();
//!       Ok(())
//!   }
//!   ```
//!
//! Readings are scaled by the configured data type: RTD ranges in °C,
//! resistance ranges in mΩ, voltage ranges in mV. The unit round-robins its
//! ADC over all active channels, so a reading is only handed out after the
//! conversion time (0.75 s per active channel) has elapsed; [`Device`]
//! enforces this with a blocking, cancellable wait.
//!

pub mod catalog;
pub mod channel;
pub mod device;
pub mod error;
pub mod port;
pub mod scale;
pub mod timing;

pub use catalog::{Channel, CommunicationType, DataType, InfoCategory, Wires, MAX_CHANNELS};
pub use channel::ChannelConfig;
pub use device::{Device, UnitInfo};
pub use error::{Error, Result};
pub use timing::CONVERSION_TIME_PER_CHANNEL;
