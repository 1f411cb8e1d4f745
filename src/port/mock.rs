//! Scripted hardware port for session manager tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{Handle, HardwarePort, PicoStatus, PortResult, PICO_OK};
use crate::catalog::{Channel, CommunicationType, DataType, InfoCategory, Wires};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Open,
    Close(Handle),
    Enumerate(CommunicationType),
    UnitInfo(InfoCategory),
    ReadValue(Channel),
    SetChannel(Channel, DataType, Wires),
    SetMains(u16),
}

pub(crate) struct MockState {
    /// Status returned by the next open call.
    pub open_status: PicoStatus,
    /// Handle counter; each successful open hands out the next value.
    pub next_handle: Handle,
    /// Scripted read results, consumed front to back. An empty queue reads
    /// as a successful zero code.
    pub read_results: VecDeque<PortResult<i32>>,
    /// Device string returned by enumeration.
    pub devices: String,
    /// Every driver call in order, for asserting call sequences.
    pub calls: Vec<Call>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            open_status: PICO_OK,
            next_handle: 0,
            read_results: VecDeque::new(),
            devices: "GQ840/197".to_string(),
            calls: Vec::new(),
        }
    }
}

pub(crate) struct MockPort {
    state: Arc<Mutex<MockState>>,
}

impl MockPort {
    pub(crate) fn new() -> (Self, Arc<Mutex<MockState>>) {
        let state = Arc::new(Mutex::new(MockState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            state,
        )
    }
}

impl HardwarePort for MockPort {
    fn open(&self, _serial: &[u8]) -> PortResult<Handle> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Open);
        if state.open_status != PICO_OK {
            return Err(state.open_status);
        }
        state.next_handle += 1;
        Ok(state.next_handle)
    }

    fn close(&self, handle: Handle) -> PortResult<()> {
        self.state.lock().unwrap().calls.push(Call::Close(handle));
        Ok(())
    }

    fn enumerate(&self, interface: CommunicationType) -> PortResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Enumerate(interface));
        Ok(state.devices.clone())
    }

    fn unit_info(&self, _handle: Handle, category: InfoCategory) -> PortResult<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::UnitInfo(category));
        Ok(format!("{category:?}"))
    }

    fn read_value(
        &self,
        _handle: Handle,
        channel: Channel,
        _low_pass_filter: bool,
    ) -> PortResult<i32> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ReadValue(channel));
        state.read_results.pop_front().unwrap_or(Ok(0))
    }

    fn set_channel(
        &self,
        _handle: Handle,
        channel: Channel,
        data_type: DataType,
        wires: Wires,
    ) -> PortResult<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::SetChannel(channel, data_type, wires));
        Ok(())
    }

    fn set_mains(&self, _handle: Handle, sixty_hertz: u16) -> PortResult<()> {
        self.state
            .lock()
            .unwrap()
            .calls
            .push(Call::SetMains(sixty_hertz));
        Ok(())
    }
}
