//! Hardware port abstraction over the usbpt104 driver entry points.
//!
//! The session manager talks to the unit exclusively through
//! [`HardwarePort`], so the real shared-library binding can be swapped for a
//! scripted port in tests.

pub mod usb;

#[cfg(test)]
pub(crate) mod mock;

use crate::catalog::{Channel, CommunicationType, DataType, InfoCategory, Wires};

/// Raw driver status code. Zero means success; any other value is a
/// hardware-level failure with no further standardized detail.
pub type PicoStatus = u32;

/// Driver status for a successful call.
pub const PICO_OK: PicoStatus = 0;

/// Opaque unit handle issued by the driver on open.
pub type Handle = i16;

/// Result of a single driver call: payload on status 0, otherwise the raw
/// status code.
pub type PortResult<T> = std::result::Result<T, PicoStatus>;

/// One driver call per usbpt104 entry point.
pub trait HardwarePort: Send {
    /// Open the unit with the given batch/serial id (empty for "any unit").
    fn open(&self, serial: &[u8]) -> PortResult<Handle>;

    /// Close a previously opened unit.
    fn close(&self, handle: Handle) -> PortResult<()>;

    /// List attached units of the given transport as a raw device string.
    fn enumerate(&self, interface: CommunicationType) -> PortResult<String>;

    /// Query one unit information string.
    fn unit_info(&self, handle: Handle, category: InfoCategory) -> PortResult<String>;

    /// Fetch the most recent conversion result for a channel.
    fn read_value(&self, handle: Handle, channel: Channel, low_pass_filter: bool)
        -> PortResult<i32>;

    /// Push sensor type and wiring for a channel.
    fn set_channel(
        &self,
        handle: Handle,
        channel: Channel,
        data_type: DataType,
        wires: Wires,
    ) -> PortResult<()>;

    /// Inform the driver of the local mains frequency (1 = 60 Hz, 0 = 50 Hz).
    fn set_mains(&self, handle: Handle, sixty_hertz: u16) -> PortResult<()>;
}

pub(crate) fn check(status: PicoStatus) -> PortResult<()> {
    if status == PICO_OK {
        Ok(())
    } else {
        Err(status)
    }
}
