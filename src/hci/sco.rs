//! HCI SCO data packets
//!
//! LE controllers do not carry SCO links, the header is only decoded to name packets that show up
//! on the link.

use super::acl::ConnectionHandle;
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketStatus {
    CorrectlyReceived,
    PossiblyInvalid,
    NoDataReceived,
    PartiallyLost,
}

impl PacketStatus {
    fn from_shifted_val(val: u16) -> Self {
        match (val >> 12) & 3 {
            0 => PacketStatus::CorrectlyReceived,
            1 => PacketStatus::PossiblyInvalid,
            2 => PacketStatus::NoDataReceived,
            _ => PacketStatus::PartiallyLost,
        }
    }

    fn get_shifted_val(&self) -> u16 {
        (match self {
            PacketStatus::CorrectlyReceived => 0,
            PacketStatus::PossiblyInvalid => 1,
            PacketStatus::NoDataReceived => 2,
            PacketStatus::PartiallyLost => 3,
        }) << 12
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HciSCOPacketError {
    PacketTooSmall,
    PayloadTooLarge,
    InvalidConnectionHandle(&'static str),
}

impl fmt::Display for HciSCOPacketError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HciSCOPacketError::PacketTooSmall => write!(f, "Packet is too small to be a valid HCI SCO Data"),
            HciSCOPacketError::PayloadTooLarge => write!(f, "Payload is larger than 255 bytes"),
            HciSCOPacketError::InvalidConnectionHandle(reason) => {
                write!(f, "Invalid connection handle, {}", reason)
            }
        }
    }
}

impl std::error::Error for HciSCOPacketError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HciSCOData<'a> {
    connection_handle: ConnectionHandle,
    packet_status: PacketStatus,
    payload: &'a [u8],
}

impl<'a> HciSCOData<'a> {
    pub const HEADER_SIZE: usize = 3;

    pub fn new(
        connection_handle: ConnectionHandle,
        packet_status: PacketStatus,
        payload: &'a [u8],
    ) -> Result<Self, HciSCOPacketError> {
        if payload.len() > <u8>::MAX.into() {
            Err(HciSCOPacketError::PayloadTooLarge)
        } else {
            Ok(HciSCOData {
                connection_handle,
                packet_status,
                payload,
            })
        }
    }

    pub fn get_handle(&self) -> ConnectionHandle {
        self.connection_handle
    }

    pub fn get_packet_status(&self) -> PacketStatus {
        self.packet_status
    }

    pub fn get_payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn get_packet(&self) -> Vec<u8> {
        let first_2_bytes = self.connection_handle.get_raw_handle() | self.packet_status.get_shifted_val();

        let mut v = Vec::with_capacity(Self::HEADER_SIZE + self.payload.len());

        v.extend_from_slice(&first_2_bytes.to_le_bytes());
        v.push(self.payload.len() as u8);
        v.extend_from_slice(self.payload);

        v
    }

    pub fn try_from_packet(packet: &'a [u8]) -> Result<Self, HciSCOPacketError> {
        if packet.len() < Self::HEADER_SIZE {
            return Err(HciSCOPacketError::PacketTooSmall);
        }

        let first_2_bytes = <u16>::from_le_bytes([packet[0], packet[1]]);

        let payload = packet
            .get(Self::HEADER_SIZE..(Self::HEADER_SIZE + packet[2] as usize))
            .ok_or(HciSCOPacketError::PacketTooSmall)?;

        Ok(HciSCOData {
            connection_handle: ConnectionHandle::try_from(first_2_bytes & 0xFFF)
                .map_err(HciSCOPacketError::InvalidConnectionHandle)?,
            packet_status: PacketStatus::from_shifted_val(first_2_bytes),
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sco_header() {
        let raw = [0x05, 0x20, 0x02, 0x11, 0x22];

        let data = HciSCOData::try_from_packet(&raw).unwrap();

        assert_eq!(data.get_handle().get_raw_handle(), 0x005);
        assert_eq!(data.get_packet_status(), PacketStatus::NoDataReceived);
        assert_eq!(data.get_payload(), &[0x11, 0x22]);
        assert_eq!(data.get_packet(), raw.to_vec());

        assert_eq!(
            HciSCOData::try_from_packet(&[0x05, 0x20, 0x03, 0x11]),
            Err(HciSCOPacketError::PacketTooSmall)
        );
    }
}
