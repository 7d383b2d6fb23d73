//! The Host Controller Interface (HCI)
//!
//! The HCI is the primary way of interacting with the BlueNRG-MS for this library. Commands are
//! framed into command packets here, sent by the [`engine`], and matched to the event that
//! completes them. What commands and events exist, and how their parameters are laid out, is
//! described by the [`schema`] registry.
//!
//! The standard HCI commands the BlueNRG-MS supports each have a module named after the command
//! within the module of their opcode group (for example
//! [`le::transmitter::set_advertising_enable`]). Every command module has a `send` function that
//! sends the command and waits for it to complete.

/// Create a module for a command whose only return is a status
///
/// The parameters of the generated `send` function are encoded, in order, against the request
/// layout the registry has for the command.
macro_rules! status_command {
    (
        $(#[$attrs:meta])*
        $name:ident, $ogf:expr, $ocf:expr $(, $arg:ident : $ty:ty )* $(,)?
    ) => {
        $(#[$attrs])*
        pub mod $name {
            use crate::hci::engine::{Error, HostInterface};
            use crate::hci::OpCode;
            use crate::hci::schema::Value;
            use crate::hci_transport::Hardware;

            pub const OPCODE: OpCode = OpCode::new($ogf, $ocf);

            pub fn send<H: Hardware>(hci: &mut HostInterface<H> $(, $arg: $ty )*) -> Result<(), Error> {
                let values: Vec<Value> = vec![ $( Value::from($arg) ),* ];

                hci.send_values(OPCODE, &values).map(|_| ())
            }
        }
    };
}

pub mod acl;
pub mod cb;
pub mod engine;
pub mod error;
pub mod events;
pub mod info_params;
pub mod le;
pub mod link_control;
pub mod schema;
pub mod sco;
pub mod status_prams;

use crate::hci_transport::HciPacketIndicator;
use core::fmt;
use schema::CodecError;

/// The largest payload of a packet exchanged with the BlueNRG-MS
pub const HCI_MAX_PAYLOAD_SIZE: usize = 128;

/// The size of the buffer used when reading a packet
pub const READ_PACKET_SIZE: usize = 128;

/// The size of a command packet header (indicator, opcode, and parameter length)
pub const COMMAND_HEADER_SIZE: usize = 4;

/// The size of an event packet header (indicator, event code, and parameter length)
pub const EVENT_HEADER_SIZE: usize = 3;

/// A command opcode
///
/// The opcode is the combination of the opcode group field (OGF, the upper 6 bits) and the
/// opcode command field (OCF, the lower 10 bits).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OpCode(u16);

impl OpCode {
    pub const fn new(ogf: u16, ocf: u16) -> Self {
        OpCode(((ogf & 0x3F) << 10) | (ocf & 0x3FF))
    }

    pub const fn from_val(val: u16) -> Self {
        OpCode(val)
    }

    pub const fn to_val(&self) -> u16 {
        self.0
    }

    pub const fn ogf(&self) -> u16 {
        self.0 >> 10
    }

    pub const fn ocf(&self) -> u16 {
        self.0 & 0x3FF
    }
}

impl fmt::Debug for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "OpCode(0x{:04X}, ogf: 0x{:02X}, ocf: 0x{:03X})", self.0, self.ogf(), self.ocf())
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

/// A command packet
///
/// The parameters are kept apart from the header because the SPI link may only be able to take
/// the header and a part of the parameters in one transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPacket {
    opcode: OpCode,
    parameters: Vec<u8>,
}

impl CommandPacket {
    /// Create a new command packet
    ///
    /// An error is returned if the parameters cannot fit within a packet.
    pub fn new(opcode: OpCode, parameters: Vec<u8>) -> Result<Self, CodecError> {
        let max = HCI_MAX_PAYLOAD_SIZE - COMMAND_HEADER_SIZE;

        if parameters.len() > max {
            Err(CodecError::Oversize {
                field: "parameters",
                max,
                len: parameters.len(),
            })
        } else {
            Ok(CommandPacket { opcode, parameters })
        }
    }

    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    pub fn parameters(&self) -> &[u8] {
        &self.parameters
    }

    /// The packet header
    ///
    /// This is the command packet indicator, the little endian opcode, and the length of the
    /// parameters.
    pub fn header(&self) -> [u8; COMMAND_HEADER_SIZE] {
        let opcode = self.opcode.to_val().to_le_bytes();

        [
            HciPacketIndicator::Command.val(),
            opcode[0],
            opcode[1],
            self.parameters.len() as u8,
        ]
    }

    /// The full length of the packet
    pub fn len(&self) -> usize {
        COMMAND_HEADER_SIZE + self.parameters.len()
    }

    /// Convert into the raw packet
    pub fn into_packet(self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(self.len());

        packet.extend_from_slice(&self.header());

        packet.extend_from_slice(&self.parameters);

        packet
    }

    /// Parse a raw command packet
    ///
    /// This is the inverse of `into_packet`. It is mostly useful for looking at the commands
    /// going out of the host.
    pub fn from_packet(packet: &[u8]) -> Result<Self, CodecError> {
        if packet.len() < COMMAND_HEADER_SIZE {
            return Err(CodecError::TooShort {
                needed: COMMAND_HEADER_SIZE,
                available: packet.len(),
            });
        }

        if packet[0] != HciPacketIndicator::Command.val() {
            return Err(CodecError::UnexpectedIndicator(packet[0]));
        }

        let declared = packet[3] as usize;

        let actual = packet.len() - COMMAND_HEADER_SIZE;

        if declared != actual {
            return Err(CodecError::LengthMismatch { declared, actual });
        }

        CommandPacket::new(
            OpCode::from_val(<u16>::from_le_bytes([packet[1], packet[2]])),
            packet[COMMAND_HEADER_SIZE..].to_vec(),
        )
    }
}

/// Verify that a raw packet is a complete event packet
///
/// A packet is verified if it starts with the event packet indicator and the declared length of
/// the event parameters matches the number of bytes that follow the header.
pub fn verify(packet: Option<&[u8]>) -> bool {
    match packet {
        Some(p) if p.len() >= EVENT_HEADER_SIZE => {
            p[0] == HciPacketIndicator::Event.val() && p[2] as usize == p.len() - EVENT_HEADER_SIZE
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_fields() {
        let opcode = OpCode::new(0x3F, 0x102);

        assert_eq!(opcode.to_val(), 0xFD02);
        assert_eq!(opcode.ogf(), 0x3F);
        assert_eq!(opcode.ocf(), 0x102);
        assert_eq!(OpCode::from_val(0x2006), OpCode::new(0x08, 0x06));
    }

    #[test]
    fn command_packet_layout() {
        let packet = CommandPacket::new(OpCode::new(0x3F, 0x0C), vec![0x00, 0x06, 1, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(packet.header(), [0x01, 0x0C, 0xFC, 0x08]);
        assert_eq!(packet.len(), 12);

        let raw = packet.clone().into_packet();

        assert_eq!(&raw[..6], &[0x01, 0x0C, 0xFC, 0x08, 0x00, 0x06]);
        assert_eq!(CommandPacket::from_packet(&raw), Ok(packet));
    }

    #[test]
    fn empty_command_packet() {
        let raw = CommandPacket::new(OpCode::new(0x03, 0x03), Vec::new()).unwrap().into_packet();

        assert_eq!(raw, vec![0x01, 0x03, 0x0C, 0x00]);
    }

    #[test]
    fn oversize_parameters() {
        let too_big = vec![0u8; HCI_MAX_PAYLOAD_SIZE];

        assert!(CommandPacket::new(OpCode::new(0x3F, 0x106), too_big).is_err());
    }

    #[test]
    fn malformed_command_packets() {
        assert_eq!(
            CommandPacket::from_packet(&[0x04, 0x03, 0x0C, 0x00]),
            Err(CodecError::UnexpectedIndicator(0x04))
        );
        assert_eq!(
            CommandPacket::from_packet(&[0x01, 0x03, 0x0C, 0x02, 0x00]),
            Err(CodecError::LengthMismatch { declared: 2, actual: 1 })
        );
    }

    #[test]
    fn verify_event_packets() {
        assert!(verify(Some(&[0x04, 0x0E, 0x04, 0x01, 0x03, 0x0C, 0x00])));
        assert!(verify(Some(&[0x04, 0x10, 0x00])));

        assert!(!verify(None));
        assert!(!verify(Some(&[])));
        assert!(!verify(Some(&[0x04, 0x0E])));
        assert!(!verify(Some(&[0x02, 0x0E, 0x01, 0x00])));
        assert!(!verify(Some(&[0x04, 0x0E, 0x05, 0x01, 0x03, 0x0C, 0x00])));
    }
}
