use thiserror::Error;

use crate::port::PicoStatus;

/// Errors surfaced by a device session.
///
/// Transient read misses are not part of this taxonomy: a failed channel or
/// info read is reported as an absent value, so a sampling loop can simply
/// retry on its next tick.
#[derive(Debug, Error)]
pub enum Error {
    /// `connect` was called with the `All` enumeration sentinel.
    #[error("interface must be USB or Ethernet, not the All enumeration sentinel")]
    UnsupportedInterface,

    /// Ethernet sessions are out of scope for this driver layer.
    #[error("ethernet sessions are not implemented")]
    EthernetNotImplemented,

    /// The driver refused to open the unit.
    #[error("device open failed with driver status {0:#010x}")]
    Open(PicoStatus),

    /// Device enumeration failed.
    #[error("device enumeration failed with driver status {0:#010x}")]
    Enumerate(PicoStatus),

    /// The operation needs an open session.
    #[error("no open device session")]
    NotConnected,

    /// The conversion wait was cancelled by the caller.
    #[error("conversion wait cancelled")]
    Cancelled,

    /// The usbpt104 shared library could not be loaded or is incomplete.
    #[error("usbpt104 driver library error: {0}")]
    Library(#[from] libloading::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
