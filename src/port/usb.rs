//! Binding to the usbpt104 shared library shipped with the PicoSDK.

use libloading::Library;
use std::ffi::OsStr;
use std::os::raw::c_char;

use super::{check, Handle, HardwarePort, PicoStatus, PortResult};
use crate::catalog::{Channel, CommunicationType, DataType, InfoCategory, Wires};
use crate::error::Result;

/// Platform name of the Pico usbpt104 driver library.
#[cfg(unix)]
pub const DEFAULT_LIBRARY: &str = "libusbpt104.so";
#[cfg(windows)]
pub const DEFAULT_LIBRARY: &str = "usbpt104.dll";

const STRING_BUF_LEN: usize = 256;

type OpenUnitFn = unsafe extern "C" fn(*mut Handle, *const c_char) -> PicoStatus;
type CloseUnitFn = unsafe extern "C" fn(Handle) -> PicoStatus;
type EnumerateFn = unsafe extern "C" fn(*mut c_char, *mut u32, u32) -> PicoStatus;
type GetUnitInfoFn = unsafe extern "C" fn(Handle, *mut c_char, i16, *mut i16, u32) -> PicoStatus;
type GetValueFn = unsafe extern "C" fn(Handle, u32, *mut i32, i16) -> PicoStatus;
type SetChannelFn = unsafe extern "C" fn(Handle, u32, u32, i16) -> PicoStatus;
type SetMainsFn = unsafe extern "C" fn(Handle, u16) -> PicoStatus;

/// The real USB transport: the usbpt104 shared library with all entry
/// points resolved up front.
///
/// Loading happens explicitly at construction, so a missing or truncated
/// driver installation fails here with a [`libloading::Error`] instead of
/// surfacing as ambient process state later on.
pub struct UsbPt104Library {
    open_unit: OpenUnitFn,
    close_unit: CloseUnitFn,
    enumerate: EnumerateFn,
    get_unit_info: GetUnitInfoFn,
    get_value: GetValueFn,
    set_channel: SetChannelFn,
    set_mains: SetMainsFn,
    // Keeps the library mapped for as long as the symbols above are callable.
    _lib: Library,
}

impl UsbPt104Library {
    /// Load the driver library under its platform default name.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_LIBRARY)
    }

    /// Load the driver library from an explicit path or name.
    pub fn load_from(name: impl AsRef<OsStr>) -> Result<Self> {
        // SAFETY: loading runs the library's initializers; the usbpt104
        // driver has no side effects beyond registering with the kernel
        // driver. Symbols are copied out while `lib` is alive and stay valid
        // because `lib` is stored alongside them.
        unsafe {
            let lib = Library::new(name.as_ref())?;
            let open_unit = *lib.get::<OpenUnitFn>(b"UsbPt104OpenUnit\0")?;
            let close_unit = *lib.get::<CloseUnitFn>(b"UsbPt104CloseUnit\0")?;
            let enumerate = *lib.get::<EnumerateFn>(b"UsbPt104Enumerate\0")?;
            let get_unit_info = *lib.get::<GetUnitInfoFn>(b"UsbPt104GetUnitInfo\0")?;
            let get_value = *lib.get::<GetValueFn>(b"UsbPt104GetValue\0")?;
            let set_channel = *lib.get::<SetChannelFn>(b"UsbPt104SetChannel\0")?;
            let set_mains = *lib.get::<SetMainsFn>(b"UsbPt104SetMains\0")?;
            Ok(Self {
                open_unit,
                close_unit,
                enumerate,
                get_unit_info,
                get_value,
                set_channel,
                set_mains,
                _lib: lib,
            })
        }
    }
}

fn buf_to_string(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

impl HardwarePort for UsbPt104Library {
    fn open(&self, serial: &[u8]) -> PortResult<Handle> {
        let mut cstr = serial.to_vec();
        cstr.push(0);
        let mut handle: Handle = 0;
        let status = unsafe { (self.open_unit)(&mut handle, cstr.as_ptr() as *const c_char) };
        check(status)?;
        Ok(handle)
    }

    fn close(&self, handle: Handle) -> PortResult<()> {
        check(unsafe { (self.close_unit)(handle) })
    }

    fn enumerate(&self, interface: CommunicationType) -> PortResult<String> {
        let mut buf = [0 as c_char; STRING_BUF_LEN];
        let mut len = STRING_BUF_LEN as u32;
        let status = unsafe { (self.enumerate)(buf.as_mut_ptr(), &mut len, interface.into()) };
        check(status)?;
        Ok(buf_to_string(&buf))
    }

    fn unit_info(&self, handle: Handle, category: InfoCategory) -> PortResult<String> {
        let mut buf = [0 as c_char; STRING_BUF_LEN];
        let mut required: i16 = 0;
        let status = unsafe {
            (self.get_unit_info)(
                handle,
                buf.as_mut_ptr(),
                STRING_BUF_LEN as i16,
                &mut required,
                category.into(),
            )
        };
        check(status)?;
        Ok(buf_to_string(&buf))
    }

    fn read_value(
        &self,
        handle: Handle,
        channel: Channel,
        low_pass_filter: bool,
    ) -> PortResult<i32> {
        let mut value: i32 = 0;
        let status = unsafe {
            (self.get_value)(handle, channel.into(), &mut value, low_pass_filter as i16)
        };
        check(status)?;
        Ok(value)
    }

    fn set_channel(
        &self,
        handle: Handle,
        channel: Channel,
        data_type: DataType,
        wires: Wires,
    ) -> PortResult<()> {
        let status = unsafe {
            (self.set_channel)(
                handle,
                channel.into(),
                data_type.into(),
                u32::from(wires) as i16,
            )
        };
        check(status)
    }

    fn set_mains(&self, handle: Handle, sixty_hertz: u16) -> PortResult<()> {
        check(unsafe { (self.set_mains)(handle, sixty_hertz) })
    }
}
