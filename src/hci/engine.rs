//! Command and event engine
//!
//! The [`HostInterface`] owns the SPI transport and is the only thing that talks to the
//! BlueNRG-MS. A synchronous command is written and then the transport is polled until the event
//! that completes the command shows up. Which event completes a command is looked up in the
//! registry.
//!
//! While waiting, frames are checked in this order:
//! 1. A *Hardware Error* event always ends the wait with an error.
//! 2. A *Command Status* event for the opcode. A failing status ends the wait with an error. It
//!    completes the command only for commands completed by a Command Status event, for all other
//!    commands it only means the command was accepted.
//! 3. A *Command Complete* event for the opcode completes the command.
//! 4. An LE meta or vendor event with the sub event code the command is completed by.
//!
//! Every other frame is dropped. Waits are limited to one second no matter the timeout asked
//! for.

use super::acl::HciACLData;
use super::error::{Error as ControllerError, HardwareCode};
use super::events::{CommandCompleteData, CommandStatusData, EventPacket, HardwareErrorData};
use super::schema::base::events as base_events;
use super::schema::{
    CodecError, Completion, Field, Layout, LayoutReader, Params, Registry, ResolvedCommand, SchemaError, Value,
    Variant,
};
use super::{CommandPacket, OpCode, EVENT_HEADER_SIZE, READ_PACKET_SIZE};
use crate::hci_transport::{BootloaderUnsupported, Hardware, HciPacketIndicator, SpiTransport, DEFAULT_RETRIES};
use core::convert::TryFrom;
use core::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The ceiling of every wait
pub const MAX_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// A matching event carried a failing status
    Status { opcode: Option<OpCode>, status: ControllerError },
    Hardware(HardwareCode),
    Timeout,
    /// Less than the whole packet could be written
    ShortWrite { expected: usize, written: usize },
    Schema(SchemaError),
    Codec(CodecError),
}

impl Error {
    /// The controller status of a `Status` error
    pub fn status(&self) -> Option<ControllerError> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Status {
                opcode: Some(opcode),
                status,
            } => write!(f, "command {} failed with status {}", opcode, status),
            Error::Status { opcode: None, status } => write!(f, "event reported status {}", status),
            Error::Hardware(code) => write!(f, "hardware error: {}", code),
            Error::Timeout => write!(f, "timed out waiting for the controller"),
            Error::ShortWrite { expected, written } => {
                write!(f, "only {} of {} bytes were written", written, expected)
            }
            Error::Schema(e) => write!(f, "schema error: {}", e),
            Error::Codec(e) => write!(f, "codec error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<SchemaError> for Error {
    fn from(e: SchemaError) -> Self {
        Error::Schema(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

impl From<super::events::EventError> for Error {
    fn from(e: super::events::EventError) -> Self {
        match e {
            super::events::EventError::Codec(e) => Error::Codec(e),
            super::events::EventError::Schema(e) => Error::Schema(e),
        }
    }
}

/// The frame that completed a command or a wait
///
/// The payload is the part of the frame after the event header (and sub event code), for a
/// Command Complete event it is the return parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    opcode: Option<OpCode>,
    frame: Vec<u8>,
    start: usize,
    layout: Option<Layout>,
}

impl Response {
    pub fn opcode(&self) -> Option<OpCode> {
        self.opcode
    }

    /// The event code of the frame
    pub fn event_code(&self) -> u8 {
        self.frame[1]
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn payload(&self) -> &[u8] {
        &self.frame[self.start..]
    }

    /// The leading status of the payload
    ///
    /// `NoError` is returned for an empty payload.
    pub fn status(&self) -> ControllerError {
        self.payload()
            .first()
            .map(|s| ControllerError::from(*s))
            .unwrap_or(ControllerError::NoError)
    }

    /// Get a reader of the payload
    ///
    /// The payload is checked against the response layout when the registry has one.
    pub fn reader(&self) -> Result<LayoutReader<'_>, CodecError> {
        match self.layout {
            Some(layout) => LayoutReader::new(layout, self.payload()),
            None => Ok(LayoutReader::unchecked(self.payload())),
        }
    }

    pub fn u8(&self, field: &Field) -> Result<u8, CodecError> {
        self.reader()?.u8(field)
    }

    pub fn u16(&self, field: &Field) -> Result<u16, CodecError> {
        self.reader()?.u16(field)
    }

    /// Decode the payload with the response layout
    pub fn values(&self) -> Result<Vec<Value>, CodecError> {
        match self.layout {
            Some(layout) => layout.decode(self.payload()),
            None => Ok(vec![Value::Bytes(self.payload().to_vec())]),
        }
    }
}

/// What a poll loop waits for
enum Awaited {
    Command(ResolvedCommand),
    Event {
        code: u8,
        sub_code: Option<u16>,
    },
}

/// Interface to the BlueNRG-MS
pub struct HostInterface<H> {
    transport: SpiTransport<H>,
    registry: Arc<Registry>,
    timeout: Duration,
    retries: usize,
}

impl<H> HostInterface<H>
where
    H: Hardware,
{
    /// Create a `HostInterface` for the tables of a hardware variant
    pub fn new(hardware: H, variant: Variant) -> Self {
        Self::with_registry(hardware, Registry::bluenrg_ms(variant))
    }

    pub fn with_registry(hardware: H, registry: Arc<Registry>) -> Self {
        HostInterface {
            transport: SpiTransport::new(hardware),
            registry,
            timeout: MAX_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Set the timeout used by commands sent without an explicit timeout
    ///
    /// The timeout is capped at one second.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout.min(MAX_TIMEOUT);
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_retries(&mut self, retries: usize) {
        self.retries = retries;
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn variant(&self) -> Variant {
        self.registry.variant()
    }

    pub fn hardware(&self) -> &H {
        self.transport.hardware()
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        self.transport.hardware_mut()
    }

    pub fn into_inner(self) -> H {
        self.transport.into_inner()
    }

    /// Pulse the reset line of the BlueNRG-MS
    pub fn reset(&mut self) {
        log::info!("resetting the BlueNRG-MS");

        self.transport.reset()
    }

    pub fn enter_bootloader(&mut self) -> Result<(), BootloaderUnsupported> {
        log::info!("entering the BlueNRG-MS bootloader");

        self.transport.enter_bootloader()
    }

    /// Check if the BlueNRG-MS signals data to read
    pub fn any(&mut self) -> bool {
        self.transport.any()
    }

    /// Read one frame
    ///
    /// `None` is returned when nothing could be read within the retries.
    pub fn read_frame(&mut self, retries: usize) -> Option<Vec<u8>> {
        let frame = self.transport.read(READ_PACKET_SIZE, retries);

        if let Some(frame) = &frame {
            log::trace!("read frame {:02X?}", frame);
        }

        frame
    }

    fn write_packet(&mut self, header: &[u8], parameters: &[u8], retries: usize) -> Result<(), Error> {
        let expected = header.len() + parameters.len();

        let written = self.transport.write(header, parameters, retries);

        if written < expected {
            log::warn!("short write of {} out of {} bytes", written, expected);

            Err(Error::ShortWrite { expected, written })
        } else {
            Ok(())
        }
    }

    /// Send a command
    ///
    /// An async command returns `None` right after it is written, its completion (if any) comes
    /// later as an unsolicited event. Otherwise this waits at most `timeout` (capped at one
    /// second) for the command to complete.
    pub fn send(
        &mut self,
        command: &CommandPacket,
        is_async: bool,
        timeout: Duration,
        retries: usize,
    ) -> Result<Option<Response>, Error> {
        let resolved = *self.registry.command(command.opcode())?;

        log::trace!(
            "sending {} ({}) {:02X?}",
            resolved.name,
            command.opcode(),
            command.parameters()
        );

        self.write_packet(&command.header(), command.parameters(), retries)?;

        if is_async {
            return Ok(None);
        }

        self.poll(&Awaited::Command(resolved), timeout, retries).map(Some)
    }

    /// Send a command and wait for it to complete with the default timeout and retries
    pub fn send_command(&mut self, command: &CommandPacket) -> Result<Response, Error> {
        let (timeout, retries) = (self.timeout, self.retries);

        self.send(command, false, timeout, retries)?.ok_or(Error::Timeout)
    }

    /// Send a command with already encoded parameters
    pub fn send_raw(&mut self, opcode: OpCode, parameters: Vec<u8>) -> Result<Response, Error> {
        self.send_command(&CommandPacket::new(opcode, parameters)?)
    }

    /// Send a command without waiting for it to complete
    pub fn send_async(&mut self, opcode: OpCode, parameters: Vec<u8>) -> Result<(), Error> {
        let (timeout, retries) = (self.timeout, self.retries);

        self.send(&CommandPacket::new(opcode, parameters)?, true, timeout, retries)
            .map(|_| ())
    }

    /// Encode parameters from values and send the command
    ///
    /// Values are encoded against the request layout of the command, one value per field. The
    /// values of a command without a fixed layout are laid out one after the other.
    pub fn send_values(&mut self, opcode: OpCode, values: &[Value]) -> Result<Response, Error> {
        let parameters = self.encode_request(opcode, values)?;

        self.send_raw(opcode, parameters)
    }

    /// Encode the parameters of a command
    pub fn encode_request(&self, opcode: OpCode, values: &[Value]) -> Result<Vec<u8>, Error> {
        let command = self.registry.command(opcode)?;

        match command.request {
            Params::Fixed(layout) => Ok(layout.encode(values)?),
            _ => Ok(concat(values)),
        }
    }

    /// Send ACL data
    ///
    /// The payload must fit in a single packet.
    pub fn send_acl(&mut self, data: &HciACLData, retries: usize) -> Result<(), Error> {
        let header = data.header();

        let indicated = [
            HciPacketIndicator::AclData.val(),
            header[0],
            header[1],
            header[2],
            header[3],
        ];

        log::trace!("sending ACL data for handle {}", data.get_handle());

        self.write_packet(&indicated, data.get_payload(), retries)
    }

    /// Wait for an event
    ///
    /// With no sub event code any event with the event code matches.
    pub fn wait_event(
        &mut self,
        code: u8,
        sub_code: Option<u16>,
        timeout: Duration,
        retries: usize,
    ) -> Result<Response, Error> {
        self.poll(&Awaited::Event { code, sub_code }, timeout, retries)
    }

    fn poll(&mut self, awaited: &Awaited, timeout: Duration, retries: usize) -> Result<Response, Error> {
        let limit = timeout.min(MAX_TIMEOUT);

        let start = Instant::now();

        loop {
            if let Some(frame) = self.read_frame(retries) {
                if let Some(response) = self.check(awaited, frame)? {
                    return Ok(response);
                }
            }

            if start.elapsed() >= limit {
                log::debug!("timed out after {:?}", start.elapsed());

                return Err(Error::Timeout);
            }
        }
    }

    /// Check a frame against what is awaited
    ///
    /// `None` is returned for frames that do not match.
    fn check(&self, awaited: &Awaited, frame: Vec<u8>) -> Result<Option<Response>, Error> {
        let packet = match EventPacket::from_packet(&frame) {
            Ok(packet) => packet,
            Err(e) => {
                log::debug!("dropping frame {:02X?}: {}", frame, e);

                return Ok(None);
            }
        };

        if packet.code() == base_events::HARDWARE_ERROR {
            let code = HardwareErrorData::try_from(packet.parameters())
                .map(|data| data.code)
                .unwrap_or(HardwareCode::Unknown(0xFF));

            log::error!("hardware error: {}", code);

            return Err(Error::Hardware(code));
        }

        let matched = match awaited {
            Awaited::Command(command) => self.check_command(command, &packet)?,
            Awaited::Event { code, sub_code } => self.check_event(*code, *sub_code, &packet)?,
        };

        match matched {
            Some((opcode, start, layout)) => Ok(Some(Response {
                opcode,
                frame,
                start,
                layout,
            })),
            None => {
                log::debug!("dropping unmatched event {:02X?}", frame);

                Ok(None)
            }
        }
    }

    fn check_command(
        &self,
        command: &ResolvedCommand,
        packet: &EventPacket,
    ) -> Result<Option<(Option<OpCode>, usize, Option<Layout>)>, Error> {
        let opcode = Some(command.opcode);

        let params = packet.parameters();

        let status_check = |status: ControllerError| {
            status.ok_or_else(|status| {
                log::error!("{} failed with status {}", command.name, status);

                Error::Status { opcode, status }
            })
        };

        let payload_start = match (packet.code(), command.completion) {
            (base_events::CMD_STATUS, completion) => match CommandStatusData::try_from(params) {
                Ok(data) if data.opcode == command.opcode => {
                    status_check(data.status)?;

                    if completion == Completion::CommandStatus {
                        return Ok(Some((opcode, EVENT_HEADER_SIZE, None)));
                    }

                    return Ok(None);
                }
                _ => return Ok(None),
            },
            (base_events::CMD_COMPLETE, _) => match CommandCompleteData::try_from(params) {
                Ok(data) if data.opcode == command.opcode => {
                    EVENT_HEADER_SIZE + (params.len() - data.return_parameters.len())
                }
                _ => return Ok(None),
            },
            (base_events::LE_META_EVENT, Completion::LeMeta(sub)) if params.first() == Some(&sub) => {
                EVENT_HEADER_SIZE + 1
            }
            (base_events::VENDOR, Completion::Vendor(sub))
                if params.len() >= 2 && <u16>::from_le_bytes([params[0], params[1]]) == sub =>
            {
                EVENT_HEADER_SIZE + 2
            }
            _ => return Ok(None),
        };

        let payload = &packet.as_bytes()[payload_start..];

        if command.response_has_status {
            if let Some(status) = payload.first() {
                status_check(ControllerError::from(*status))?;
            }
        }

        Ok(Some((opcode, payload_start, command.response.layout())))
    }

    fn check_event(
        &self,
        code: u8,
        sub_code: Option<u16>,
        packet: &EventPacket,
    ) -> Result<Option<(Option<OpCode>, usize, Option<Layout>)>, Error> {
        if packet.code() != code {
            return Ok(None);
        }

        match sub_code {
            None => {
                let layout = self.registry.event(code).ok().and_then(|e| e.params.layout());

                Ok(Some((None, EVENT_HEADER_SIZE, layout)))
            }
            Some(sub) => {
                let width = match self.registry.sub_code_width(code)? {
                    Some(width) => width,
                    None => return Ok(None),
                };

                match packet.sub_code(width) {
                    Ok(found) if found == sub => {
                        let layout = self
                            .registry
                            .sub_event(code, sub)
                            .ok()
                            .and_then(|e| e.params.layout());

                        Ok(Some((None, EVENT_HEADER_SIZE + width.size(), layout)))
                    }
                    _ => Ok(None),
                }
            }
        }
    }
}

/// Lay out values one after the other
fn concat(values: &[Value]) -> Vec<u8> {
    let mut raw = Vec::new();

    for value in values {
        match value {
            Value::U8(v) => raw.push(*v),
            Value::I8(v) => raw.push(*v as u8),
            Value::U16(v) => raw.extend_from_slice(&v.to_le_bytes()),
            Value::U32(v) => raw.extend_from_slice(&v.to_le_bytes()),
            Value::Bytes(v) => raw.extend_from_slice(v),
        }
    }

    raw
}
