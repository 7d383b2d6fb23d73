//! A scripted BlueNRG-MS for tests
//!
//! `MockFirmware` implements [`Hardware`] by playing the controller's side of the SPI header
//! protocol. Every command written to it is logged and answered, either by a test supplied
//! responder or by a default answer built from the registry. A reset clears the pending frames
//! and queues the HAL initialized event.

use super::Hardware;
use crate::hci::schema::base::events as base_events;
use crate::hci::schema::vendor::{events as vendor_events, handle_response};
use crate::hci::schema::{Completion, Params, Registry, Variant};
use crate::hci::{CommandPacket, OpCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Once};

/// Optional responses to a command
///
/// Returning `None` lets the mock answer with its default response.
pub type Responder = Box<dyn FnMut(&CommandPacket) -> Option<Vec<Vec<u8>>> + Send>;

enum Phase {
    Idle,
    Reading,
    Writing,
}

struct State {
    registry: Arc<Registry>,
    phase: Phase,
    selected: bool,
    in_reset: bool,
    not_ready: usize,
    writable: u8,
    reset_reason: u8,
    resets: usize,
    next_handle: u16,
    outbox: VecDeque<Vec<u8>>,
    pending: Vec<u8>,
    commands: Vec<CommandPacket>,
    acl: Vec<Vec<u8>>,
    responder: Option<Responder>,
}

#[derive(Clone)]
pub struct MockFirmware(Arc<Mutex<State>>);

impl MockFirmware {
    pub fn new() -> Self {
        Self::with_variant(Variant::Idb05a1)
    }

    pub fn with_variant(variant: Variant) -> Self {
        init_logging();

        MockFirmware(Arc::new(Mutex::new(State {
            registry: Registry::bluenrg_ms(variant),
            phase: Phase::Idle,
            selected: false,
            in_reset: false,
            not_ready: 0,
            writable: 128,
            reset_reason: 1,
            resets: 0,
            next_handle: 1,
            outbox: VecDeque::new(),
            pending: Vec::new(),
            commands: Vec::new(),
            acl: Vec::new(),
            responder: None,
        })))
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a frame for the host to read
    pub fn queue_frame(&self, frame: Vec<u8>) {
        self.state().outbox.push_back(frame);
    }

    /// Report not ready for the next `polls` header exchanges
    pub fn set_not_ready(&self, polls: usize) {
        self.state().not_ready = polls;
    }

    /// Set the room for writes reported by the write header
    pub fn set_writable(&self, writable: u8) {
        self.state().writable = writable;
    }

    /// Set the reason code of the HAL initialized event queued on reset
    pub fn set_reset_reason(&self, reason: u8) {
        self.state().reset_reason = reason;
    }

    pub fn respond_with<F>(&self, responder: F)
    where
        F: FnMut(&CommandPacket) -> Option<Vec<Vec<u8>>> + Send + 'static,
    {
        self.state().responder = Some(Box::new(responder));
    }

    pub fn commands(&self) -> Vec<CommandPacket> {
        self.state().commands.clone()
    }

    pub fn opcodes(&self) -> Vec<OpCode> {
        self.state().commands.iter().map(|c| c.opcode()).collect()
    }

    /// ACL data packets written by the host, without the packet indicator
    pub fn acl_packets(&self) -> Vec<Vec<u8>> {
        self.state().acl.clone()
    }

    pub fn clear_commands(&self) {
        self.state().commands.clear();
    }

    pub fn resets(&self) -> usize {
        self.state().resets
    }

    pub fn is_selected(&self) -> bool {
        self.state().selected
    }

    pub fn pending_frames(&self) -> usize {
        self.state().outbox.len()
    }
}

impl State {
    fn header_reply(&mut self, buf: &mut [u8]) {
        let request = buf[0];

        buf.iter_mut().for_each(|b| *b = 0);

        if self.not_ready > 0 {
            self.not_ready -= 1;
            return;
        }

        let readable = self.outbox.front().map(|f| f.len() as u16).unwrap_or_default();

        buf[0] = 0x02;
        buf[3..5].copy_from_slice(&readable.to_le_bytes());

        match request {
            0x0B if readable > 0 => self.phase = Phase::Reading,
            0x0A => {
                buf[1] = self.writable;
                self.phase = Phase::Writing;
            }
            _ => (),
        }
    }

    fn give_frame(&mut self, buf: &mut [u8]) {
        if let Some(frame) = self.outbox.pop_front() {
            let len = frame.len().min(buf.len());

            buf[..len].copy_from_slice(&frame[..len]);
        }

        self.phase = Phase::Idle;
    }

    fn take_bytes(&mut self, buf: &mut [u8]) {
        self.pending.extend_from_slice(buf);

        buf.iter_mut().for_each(|b| *b = 0);

        if self.pending.first() == Some(&0x02) {
            let complete = self.pending.len() >= 5
                && self.pending.len() >= 5 + <u16>::from_le_bytes([self.pending[3], self.pending[4]]) as usize;

            if complete {
                let packet = self.pending.split_off(1);

                self.pending.clear();
                self.acl.push(packet);
            }

            return;
        }

        if self.pending.len() < 4 || self.pending.len() < 4 + self.pending[3] as usize {
            return;
        }

        let packet = match CommandPacket::from_packet(&self.pending) {
            Ok(packet) => packet,
            Err(e) => panic!("host wrote a malformed command packet {:02X?}: {}", self.pending, e),
        };

        self.pending.clear();

        let scripted = self.responder.as_mut().and_then(|responder| responder(&packet));

        let frames = match scripted {
            Some(frames) => frames,
            None => self.default_response(packet.opcode()),
        };

        self.outbox.extend(frames);

        self.commands.push(packet);
    }

    fn default_response(&mut self, opcode: OpCode) -> Vec<Vec<u8>> {
        let command = match self.registry.command(opcode) {
            Ok(command) => *command,
            Err(_) => return vec![command_complete(opcode, &[0x01])],
        };

        let mut payload = match command.response {
            Params::Fixed(layout) if layout == handle_response::LAYOUT => {
                let handle = self.next_handle;

                self.next_handle += 1;

                let h = handle.to_le_bytes();

                vec![0x00, h[0], h[1]]
            }
            Params::Fixed(layout) => vec![0; layout.min_len()],
            _ => Vec::new(),
        };

        match command.completion {
            Completion::CommandComplete => vec![command_complete(opcode, &payload)],
            Completion::CommandStatus => vec![command_status(0, opcode)],
            Completion::LeMeta(sub) => {
                payload.insert(0, sub);

                vec![command_status(0, opcode), event(base_events::LE_META_EVENT, &payload)]
            }
            Completion::Vendor(sub) => vec![command_status(0, opcode), vendor_event(sub, &payload)],
        }
    }

    fn on_reset(&mut self) {
        self.resets += 1;
        self.next_handle = 1;
        self.outbox.clear();
        self.outbox
            .push_back(vendor_event(vendor_events::HAL_INITIALIZED, &[self.reset_reason]));
    }
}

impl Hardware for MockFirmware {
    fn transfer(&mut self, buf: &mut [u8]) {
        let mut state = self.state();

        assert!(state.selected, "transfer without chip select");

        match state.phase {
            Phase::Idle => state.header_reply(buf),
            Phase::Reading => state.give_frame(buf),
            Phase::Writing => state.take_bytes(buf),
        }
    }

    fn select(&mut self) {
        let mut state = self.state();

        state.selected = true;
        state.phase = Phase::Idle;
    }

    fn deselect(&mut self) {
        let mut state = self.state();

        state.selected = false;
        state.phase = Phase::Idle;
        state.pending.clear();
    }

    fn set_reset(&mut self, high: bool) {
        let mut state = self.state();

        if high && state.in_reset {
            state.on_reset();
        }

        state.in_reset = !high;
    }

    fn delay_us(&mut self, _: u32) {}

    fn data_available(&mut self) -> bool {
        !self.state().outbox.is_empty()
    }
}

pub fn event(code: u8, params: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x04, code, params.len() as u8];

    frame.extend_from_slice(params);

    frame
}

pub fn command_complete(opcode: OpCode, return_parameters: &[u8]) -> Vec<u8> {
    let mut params = vec![0x01];

    params.extend_from_slice(&opcode.to_val().to_le_bytes());
    params.extend_from_slice(return_parameters);

    event(base_events::CMD_COMPLETE, &params)
}

pub fn command_status(status: u8, opcode: OpCode) -> Vec<u8> {
    let op = opcode.to_val().to_le_bytes();

    event(base_events::CMD_STATUS, &[status, 0x01, op[0], op[1]])
}

pub fn vendor_event(sub_code: u16, params: &[u8]) -> Vec<u8> {
    let mut payload = sub_code.to_le_bytes().to_vec();

    payload.extend_from_slice(params);

    event(base_events::VENDOR, &payload)
}

pub fn le_meta_event(sub_code: u8, params: &[u8]) -> Vec<u8> {
    let mut payload = vec![sub_code];

    payload.extend_from_slice(params);

    event(base_events::LE_META_EVENT, &payload)
}

/// Initialize logging for tests
///
/// Log output shows with `cargo test -- --nocapture`.
pub fn init_logging() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let _ = simplelog::TermLogger::init(
            simplelog::LevelFilter::Trace,
            simplelog::Config::default(),
            simplelog::TerminalMode::Mixed,
        );
    });
}
