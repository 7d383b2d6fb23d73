//! L2CAP protocol
//!
//! Only single frame (basic) L2CAP PDUs are handled, there is no segmentation or reassembly. A
//! basic frame is a 16 bit payload length, a 16 bit channel identifier, and the payload.
//!
//! ```text
//!  0               15 16              31
//! -------------------------------------------
//! |     length      |    channel id   | payload ...
//! -------------------------------------------
//! ```

use crate::hci::acl::HciACLData;
use core::fmt;

/// Channel Identifier
///
/// Channel Identifiers are used by the L2CAP to associate the data with a given channel. The
/// fixed channels of a LE-U logical link are the attribute protocol, LE signaling, and security
/// manager channels.
///
/// # Specification Reference
/// See Bluetooth Specification V4.1 | Vol 3, Part A Section 2.1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChannelIdentifier {
    NullIdentifier,
    /// BR/EDR signaling
    SignalingChannel,
    ConnectionlessChannel,
    /// Channel for the Attribute Protocol
    AttributeProtocol,
    /// See the Bluetooth Specification V4.1 | Vol 3, Part A Section 4
    LowEnergyL2CAPSignalingChannel,
    SecurityManagerProtocol,
    /// Channels created by the LE credit based connection procedure
    DynamicallyAllocated(u16),
}

impl ChannelIdentifier {
    pub const LE_DYNAMIC_BOUNDS: core::ops::RangeInclusive<u16> = 0x0040..=0x007F;

    /// Convert to the numerical value
    pub fn to_val(&self) -> u16 {
        match self {
            ChannelIdentifier::NullIdentifier => 0x0,
            ChannelIdentifier::SignalingChannel => 0x1,
            ChannelIdentifier::ConnectionlessChannel => 0x2,
            ChannelIdentifier::AttributeProtocol => 0x4,
            ChannelIdentifier::LowEnergyL2CAPSignalingChannel => 0x5,
            ChannelIdentifier::SecurityManagerProtocol => 0x6,
            ChannelIdentifier::DynamicallyAllocated(val) => *val,
        }
    }

    pub fn try_from_raw(val: u16) -> Result<Self, AclDataError> {
        match val {
            0x0 => Ok(ChannelIdentifier::NullIdentifier),
            0x1 => Ok(ChannelIdentifier::SignalingChannel),
            0x2 => Ok(ChannelIdentifier::ConnectionlessChannel),
            0x4 => Ok(ChannelIdentifier::AttributeProtocol),
            0x5 => Ok(ChannelIdentifier::LowEnergyL2CAPSignalingChannel),
            0x6 => Ok(ChannelIdentifier::SecurityManagerProtocol),
            _ if Self::LE_DYNAMIC_BOUNDS.contains(&val) => Ok(ChannelIdentifier::DynamicallyAllocated(val)),
            _ => Err(AclDataError::InvalidChannelId),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChannelIdentifier::NullIdentifier => "NUL",
            ChannelIdentifier::SignalingChannel => "SCH",
            ChannelIdentifier::ConnectionlessChannel => "CLS",
            ChannelIdentifier::AttributeProtocol => "ATT",
            ChannelIdentifier::LowEnergyL2CAPSignalingChannel => "LE_SCH",
            ChannelIdentifier::SecurityManagerProtocol => "SMP",
            ChannelIdentifier::DynamicallyAllocated(_) => "DYN",
        }
    }
}

impl fmt::Display for ChannelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}(0x{:04X})", self.name(), self.to_val())
    }
}

/// Acl Data Errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclDataError {
    /// Raw data is too small for an ACL frame
    RawDataTooSmall,
    /// Specified payload length didn't match the actual payload length
    PayloadLengthIncorrect,
    /// The payload does not fit in a basic frame
    PayloadTooLarge,
    /// Invalid Channel Id
    InvalidChannelId,
}

impl fmt::Display for AclDataError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AclDataError::RawDataTooSmall => write!(f, "Raw data is too small for an ACL frame"),
            AclDataError::PayloadLengthIncorrect => write!(
                f,
                "Specified payload length didn't \
                match the actual payload length"
            ),
            AclDataError::PayloadTooLarge => write!(f, "Payload is larger than a basic frame can hold"),
            AclDataError::InvalidChannelId => write!(f, "Invalid Channel Id"),
        }
    }
}

impl std::error::Error for AclDataError {}

/// A basic L2CAP frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicFrame<'a> {
    channel_id: ChannelIdentifier,
    payload: &'a [u8],
}

impl<'a> BasicFrame<'a> {
    pub const HEADER_SIZE: usize = 4;

    pub fn new(channel_id: ChannelIdentifier, payload: &'a [u8]) -> Result<Self, AclDataError> {
        if payload.len() > <u16>::MAX.into() {
            return Err(AclDataError::PayloadTooLarge);
        }

        Ok(BasicFrame { channel_id, payload })
    }

    pub fn get_channel_id(&self) -> ChannelIdentifier {
        self.channel_id
    }

    pub fn get_payload(&self) -> &'a [u8] {
        self.payload
    }

    /// This create a complete L2CAP data packet in its raw form
    pub fn to_raw_data(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(Self::HEADER_SIZE + self.payload.len());

        v.extend_from_slice(&(self.payload.len() as u16).to_le_bytes());

        v.extend_from_slice(&self.channel_id.to_val().to_le_bytes());

        v.extend_from_slice(self.payload);

        v
    }

    /// Create a frame from a raw L2CAP data packet
    ///
    /// # Requirements
    /// * The length of the raw data must be >= 4
    /// * The length value in the raw data must be less than or equal to the length of the payload
    ///   portion of the raw data. Any bytes beyond the length are ignored.
    /// * The channel id must be valid
    pub fn try_from_raw_data(data: &'a [u8]) -> Result<Self, AclDataError> {
        if data.len() < Self::HEADER_SIZE {
            return Err(AclDataError::RawDataTooSmall);
        }

        let len: usize = <u16>::from_le_bytes([data[0], data[1]]).into();

        let channel_id = ChannelIdentifier::try_from_raw(<u16>::from_le_bytes([data[2], data[3]]))?;

        let payload = data[Self::HEADER_SIZE..]
            .get(..len)
            .ok_or(AclDataError::PayloadLengthIncorrect)?;

        Ok(BasicFrame { channel_id, payload })
    }
}

/// The L2CAP signaling channels
pub mod signaling {
    use super::AclDataError;

    pub const COMMAND_REJECT: u8 = 0x01;
    pub const CONNECTION_REQUEST: u8 = 0x02;
    pub const CONNECTION_RESPONSE: u8 = 0x03;
    pub const CONFIGURE_REQUEST: u8 = 0x04;
    pub const CONFIGURE_RESPONSE: u8 = 0x05;
    pub const DISCONNECTION_REQUEST: u8 = 0x06;
    pub const DISCONNECTION_RESPONSE: u8 = 0x07;
    pub const ECHO_REQUEST: u8 = 0x08;
    pub const ECHO_RESPONSE: u8 = 0x09;
    pub const INFORMATION_REQUEST: u8 = 0x0A;
    pub const INFORMATION_RESPONSE: u8 = 0x0B;
    pub const CREATE_CHANNEL_REQUEST: u8 = 0x0C;
    pub const CREATE_CHANNEL_RESPONSE: u8 = 0x0D;
    pub const MOVE_CHANNEL_REQUEST: u8 = 0x0E;
    pub const MOVE_CHANNEL_RESPONSE: u8 = 0x0F;
    pub const MOVE_CHANNEL_CONFIRMATION: u8 = 0x10;
    pub const MOVE_CHANNEL_CONFIRMATION_RESPONSE: u8 = 0x11;
    pub const CONNECTION_PARAMETER_UPDATE_REQUEST: u8 = 0x12;
    pub const CONNECTION_PARAMETER_UPDATE_RESPONSE: u8 = 0x13;
    pub const LE_CREDIT_BASED_CONNECTION_REQUEST: u8 = 0x14;
    pub const LE_CREDIT_BASED_CONNECTION_RESPONSE: u8 = 0x15;
    pub const LE_FLOW_CONTROL_CREDIT: u8 = 0x16;

    pub fn name(code: u8) -> Option<&'static str> {
        let name = match code {
            COMMAND_REJECT => "Command Reject",
            CONNECTION_REQUEST => "Connection Request",
            CONNECTION_RESPONSE => "Connection Response",
            CONFIGURE_REQUEST => "Configure Request",
            CONFIGURE_RESPONSE => "Configure Response",
            DISCONNECTION_REQUEST => "Disconnection Request",
            DISCONNECTION_RESPONSE => "Disconnection Response",
            ECHO_REQUEST => "Echo Request",
            ECHO_RESPONSE => "Echo Response",
            INFORMATION_REQUEST => "Information Request",
            INFORMATION_RESPONSE => "Information Response",
            CREATE_CHANNEL_REQUEST => "Create Channel Request",
            CREATE_CHANNEL_RESPONSE => "Create Channel Response",
            MOVE_CHANNEL_REQUEST => "Move Channel Request",
            MOVE_CHANNEL_RESPONSE => "Move Channel Response",
            MOVE_CHANNEL_CONFIRMATION => "Move Channel Confirmation",
            MOVE_CHANNEL_CONFIRMATION_RESPONSE => "Move Channel Confirmation Response",
            CONNECTION_PARAMETER_UPDATE_REQUEST => "Connection Parameter Update Request",
            CONNECTION_PARAMETER_UPDATE_RESPONSE => "Connection Parameter Update Response",
            LE_CREDIT_BASED_CONNECTION_REQUEST => "LE Credit Based Connection Request",
            LE_CREDIT_BASED_CONNECTION_RESPONSE => "LE Credit Based Connection Response",
            LE_FLOW_CONTROL_CREDIT => "LE Flow Control Credit",
            _ => return None,
        };

        Some(name)
    }

    /// A signaling command
    ///
    /// The header is the code, an identifier matching requests to responses, and the 16 bit
    /// length of the data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Command<'a> {
        pub code: u8,
        pub identifier: u8,
        pub data: &'a [u8],
    }

    impl<'a> Command<'a> {
        pub const HEADER_SIZE: usize = 4;

        pub fn try_from_raw(raw: &'a [u8]) -> Result<Self, AclDataError> {
            if raw.len() < Self::HEADER_SIZE {
                return Err(AclDataError::RawDataTooSmall);
            }

            let len: usize = <u16>::from_le_bytes([raw[2], raw[3]]).into();

            let data = raw[Self::HEADER_SIZE..]
                .get(..len)
                .ok_or(AclDataError::PayloadLengthIncorrect)?;

            Ok(Command {
                code: raw[0],
                identifier: raw[1],
                data,
            })
        }

        pub fn name(&self) -> Option<&'static str> {
            name(self.code)
        }
    }
}

/// Describe a received ACL data packet for logging
///
/// `packet` is the packet without the packet indicator. The frame on a fixed channel is named
/// down to the attribute PDU, security manager command, or signaling command it carries.
pub fn describe(packet: &[u8]) -> String {
    let acl = match HciACLData::try_from_packet(packet) {
        Ok(acl) => acl,
        Err(e) => return format!("invalid ACL data: {}", e),
    };

    let frame = match BasicFrame::try_from_raw_data(acl.get_payload()) {
        Ok(frame) => frame,
        Err(e) => return format!("handle {} invalid L2CAP frame: {}", acl.get_handle(), e),
    };

    let payload = frame.get_payload();

    let content = match frame.get_channel_id() {
        ChannelIdentifier::AttributeProtocol => match crate::att::Pdu::try_from_raw(payload) {
            Ok(pdu) => pdu.to_string(),
            Err(e) => e.to_string(),
        },
        ChannelIdentifier::SecurityManagerProtocol => match crate::sm::Command::try_from_raw(payload) {
            Ok(command) => command.to_string(),
            Err(e) => e.to_string(),
        },
        ChannelIdentifier::SignalingChannel | ChannelIdentifier::LowEnergyL2CAPSignalingChannel => {
            match signaling::Command::try_from_raw(payload) {
                Ok(command) => match command.name() {
                    Some(name) => format!("{} ({} bytes)", name, command.data.len()),
                    None => format!("unknown signaling code 0x{:02X}", command.code),
                },
                Err(e) => e.to_string(),
            }
        }
        _ => format!("{} bytes", payload.len()),
    };

    format!("handle {} {}: {}", acl.get_handle(), frame.get_channel_id(), content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_frames() {
        let frame = BasicFrame::new(ChannelIdentifier::AttributeProtocol, &[0x0A, 0x03, 0x00]).unwrap();

        let raw = frame.to_raw_data();

        assert_eq!(raw, vec![0x03, 0x00, 0x04, 0x00, 0x0A, 0x03, 0x00]);

        assert_eq!(BasicFrame::try_from_raw_data(&raw), Ok(frame));

        // bytes past the length are not part of the payload
        let padded = [0x01, 0x00, 0x06, 0x00, 0x0B, 0xEE];

        assert_eq!(BasicFrame::try_from_raw_data(&padded).unwrap().get_payload(), &[0x0B]);
    }

    #[test]
    fn bad_frames() {
        assert_eq!(
            BasicFrame::try_from_raw_data(&[0x01, 0x00, 0x04]),
            Err(AclDataError::RawDataTooSmall)
        );
        assert_eq!(
            BasicFrame::try_from_raw_data(&[0x05, 0x00, 0x04, 0x00, 0x0A]),
            Err(AclDataError::PayloadLengthIncorrect)
        );
        assert_eq!(
            BasicFrame::try_from_raw_data(&[0x00, 0x00, 0x80, 0x00]),
            Err(AclDataError::InvalidChannelId)
        );

        let large = vec![0u8; 0x1_0000];

        assert_eq!(
            BasicFrame::new(ChannelIdentifier::AttributeProtocol, &large),
            Err(AclDataError::PayloadTooLarge)
        );
    }

    #[test]
    fn channel_ids() {
        assert_eq!(
            ChannelIdentifier::try_from_raw(0x0041),
            Ok(ChannelIdentifier::DynamicallyAllocated(0x41))
        );
        assert_eq!(ChannelIdentifier::SecurityManagerProtocol.to_string(), "SMP(0x0006)");
        assert_eq!(ChannelIdentifier::try_from_raw(0x0003), Err(AclDataError::InvalidChannelId));
    }

    #[test]
    fn signaling_commands() {
        let raw = [0x12, 0x07, 0x08, 0x00, 0x06, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x80, 0x0C];

        let command = signaling::Command::try_from_raw(&raw).unwrap();

        assert_eq!(command.identifier, 0x07);
        assert_eq!(command.data.len(), 8);
        assert_eq!(command.name(), Some("Connection Parameter Update Request"));
        assert_eq!(signaling::name(0x17), None);
    }

    #[test]
    fn described_packets() {
        // handle 0x0801 with a complete PDU, write request to handle 3
        let write = [0x01, 0x28, 0x08, 0x00, 0x04, 0x00, 0x04, 0x00, 0x12, 0x03, 0x00, 0x61];

        assert_eq!(
            describe(&write),
            "handle 0x0801 ATT(0x0004): Write Request (3 bytes)"
        );

        let security_request = [0x01, 0x28, 0x06, 0x00, 0x02, 0x00, 0x06, 0x00, 0x0B, 0x01];

        assert_eq!(
            describe(&security_request),
            "handle 0x0801 SMP(0x0006): Security Request (1 bytes)"
        );

        let update = [
            0x01, 0x28, 0x0A, 0x00, 0x06, 0x00, 0x05, 0x00, 0x13, 0x01, 0x02, 0x00, 0x00, 0x00,
        ];

        assert_eq!(
            describe(&update),
            "handle 0x0801 LE_SCH(0x0005): Connection Parameter Update Response (2 bytes)"
        );

        assert_eq!(
            describe(&[0x01, 0x28, 0x01, 0x00, 0x00]),
            "handle 0x0801 invalid L2CAP frame: Raw data is too small for an ACL frame"
        );
    }
}
