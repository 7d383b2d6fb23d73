//! HCI ACL data packets
//!
//! The BlueNRG-MS runs its own L2CAP and ATT layers, so ACL data is rarely exchanged with it. A
//! packet is still framed the standard way, a 12 bit connection handle, the packet boundary and
//! broadcast flags, a 16 bit payload length, and the payload.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionHandle {
    handle: u16,
}

impl ConnectionHandle {
    pub const MAX: u16 = 0x0EFF;

    /// Try to create a ConnectionHandle from a raw value
    ///
    /// # Error
    /// The raw value was greater then the maximum value.
    pub fn try_from(raw: u16) -> Result<ConnectionHandle, &'static str> {
        if raw <= ConnectionHandle::MAX {
            Ok(ConnectionHandle { handle: raw })
        } else {
            Err("Raw value larger then max")
        }
    }

    pub fn get_raw_handle(&self) -> u16 {
        self.handle
    }
}

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X}", self.handle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ACLPacketBoundary {
    FirstNonFlushable,
    ContinuingFragment,
    FirstAutoFlushable,
    CompleteL2capPdu,
}

impl ACLPacketBoundary {
    /// Get the value shifted into the place of the Packet Boundary Flag
    fn get_shifted_val(&self) -> u16 {
        (match self {
            ACLPacketBoundary::FirstNonFlushable => 0x0,
            ACLPacketBoundary::ContinuingFragment => 0x1,
            ACLPacketBoundary::FirstAutoFlushable => 0x2,
            ACLPacketBoundary::CompleteL2capPdu => 0x3,
        }) << 12
    }

    /// Get the `ACLPacketBoundary` from the first 16 bits of a HCI ACL data packet. The input
    /// `val` does not need to be masked.
    fn from_shifted_val(val: u16) -> Self {
        match (val >> 12) & 3 {
            0x0 => ACLPacketBoundary::FirstNonFlushable,
            0x1 => ACLPacketBoundary::ContinuingFragment,
            0x2 => ACLPacketBoundary::FirstAutoFlushable,
            _ => ACLPacketBoundary::CompleteL2capPdu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ACLBroadcastFlag {
    // Point-to-point message
    NoBroadcast,
    // Broadcast to all active slaves
    ActiveSlaveBroadcast,
}

impl ACLBroadcastFlag {
    fn get_shifted_val(&self) -> u16 {
        (match self {
            ACLBroadcastFlag::NoBroadcast => 0x0,
            ACLBroadcastFlag::ActiveSlaveBroadcast => 0x1,
        }) << 14
    }

    fn try_from_shifted_val(val: u16) -> Result<Self, ()> {
        match (val >> 14) & 3 {
            0x0 => Ok(ACLBroadcastFlag::NoBroadcast),
            0x1 => Ok(ACLBroadcastFlag::ActiveSlaveBroadcast),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HciACLPacketError {
    PacketTooSmall,
    PayloadTooLarge,
    InvalidBroadcastFlag,
    InvalidConnectionHandle(&'static str),
}

impl fmt::Display for HciACLPacketError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HciACLPacketError::PacketTooSmall => write!(f, "Packet is too small to be a valid HCI ACL Data"),
            HciACLPacketError::PayloadTooLarge => write!(f, "Payload is larger than a HCI ACL Data packet can hold"),
            HciACLPacketError::InvalidBroadcastFlag => write!(f, "Packet has invalid broadcast Flag"),
            HciACLPacketError::InvalidConnectionHandle(reason) => {
                write!(f, "Invalid connection handle, {}", reason)
            }
        }
    }
}

impl std::error::Error for HciACLPacketError {}

/// A HCI ACL Data Packet
///
/// For a LE-U logical link the packet boundary flag is either `FirstNonFlushable` or
/// `ContinuingFragment`, and the broadcast flag is always `NoBroadcast`. Segmentation is not done
/// by this library, so a payload must be a whole L2CAP PDU sent as `FirstNonFlushable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HciACLData<'a> {
    connection_handle: ConnectionHandle,
    packet_boundary_flag: ACLPacketBoundary,
    broadcast_flag: ACLBroadcastFlag,
    payload: &'a [u8],
}

impl<'a> HciACLData<'a> {
    /// The size of the header of a HCI ACL data packet
    pub const HEADER_SIZE: usize = 4;

    pub fn new(
        connection_handle: ConnectionHandle,
        packet_boundary_flag: ACLPacketBoundary,
        broadcast_flag: ACLBroadcastFlag,
        payload: &'a [u8],
    ) -> Result<Self, HciACLPacketError> {
        if payload.len() > <u16>::MAX.into() {
            return Err(HciACLPacketError::PayloadTooLarge);
        }

        Ok(HciACLData {
            connection_handle,
            packet_boundary_flag,
            broadcast_flag,
            payload,
        })
    }

    pub fn get_handle(&self) -> ConnectionHandle {
        self.connection_handle
    }

    pub fn get_payload(&self) -> &'a [u8] {
        self.payload
    }

    pub fn get_packet_boundary_flag(&self) -> ACLPacketBoundary {
        self.packet_boundary_flag
    }

    pub fn get_broadcast_flag(&self) -> ACLBroadcastFlag {
        self.broadcast_flag
    }

    /// The header of the packet, without the packet indicator
    pub fn header(&self) -> [u8; HciACLData::<'static>::HEADER_SIZE] {
        let first_2_bytes = self.connection_handle.get_raw_handle()
            | self.packet_boundary_flag.get_shifted_val()
            | self.broadcast_flag.get_shifted_val();

        let f = first_2_bytes.to_le_bytes();
        let l = (self.payload.len() as u16).to_le_bytes();

        [f[0], f[1], l[0], l[1]]
    }

    /// Convert the `HciACLData` into a raw packet
    pub fn get_packet(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.payload.len() + Self::HEADER_SIZE);

        v.extend_from_slice(&self.header());

        v.extend_from_slice(self.payload);

        v
    }

    /// Attempt to create a `HciAclData` from a raw packet (without the packet indicator)
    pub fn try_from_packet(packet: &'a [u8]) -> Result<Self, HciACLPacketError> {
        if packet.len() < Self::HEADER_SIZE {
            return Err(HciACLPacketError::PacketTooSmall);
        }

        let first_2_bytes = <u16>::from_le_bytes([packet[0], packet[1]]);

        let connection_handle =
            ConnectionHandle::try_from(first_2_bytes & 0xFFF).map_err(HciACLPacketError::InvalidConnectionHandle)?;

        let packet_boundary_flag = ACLPacketBoundary::from_shifted_val(first_2_bytes);

        let broadcast_flag = ACLBroadcastFlag::try_from_shifted_val(first_2_bytes)
            .map_err(|_| HciACLPacketError::InvalidBroadcastFlag)?;

        let data_length = <u16>::from_le_bytes([packet[2], packet[3]]) as usize;

        let payload = packet
            .get(Self::HEADER_SIZE..(Self::HEADER_SIZE + data_length))
            .ok_or(HciACLPacketError::PacketTooSmall)?;

        Ok(HciACLData {
            connection_handle,
            packet_boundary_flag,
            broadcast_flag,
            payload,
        })
    }
}
