//! Events
//!
//! An event packet is made of the event packet indicator, the event code, the length of the
//! parameters, and the parameters. The LE meta event and the vendor event put a sub event code
//! in front of their parameters (one byte for LE meta events, two for vendor events).
//!
//! [`EventPacket`] is a checked view over a raw event packet. The `*Data` types are views over
//! the parameters of the events this library acts on. None of them copy the parameters.

use super::error::{Error, HardwareCode};
use super::schema::base::{
    advertising_report, command_complete, command_status, disconnection_complete, hardware_error,
    le_connection_complete,
};
use super::schema::vendor::{
    attribute_modified, gap_procedure_complete, hal_initialized, read_permit_request, write_permit_request,
};
use super::schema::{CodecError, Layout, LayoutReader, Registry, ResolvedEvent, SchemaError, SubCodeWidth, Variant};
use super::{OpCode, EVENT_HEADER_SIZE};
use crate::hci_transport::HciPacketIndicator;
use core::convert::TryFrom;
use core::fmt;

/// A checked view of an event packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventPacket<'a> {
    packet: &'a [u8],
}

impl<'a> EventPacket<'a> {
    /// Check a raw packet and create a view of it
    ///
    /// The packet must start with the event packet indicator and the declared parameter length
    /// must match the number of bytes after the header.
    pub fn from_packet(packet: &'a [u8]) -> Result<Self, CodecError> {
        if packet.len() < EVENT_HEADER_SIZE {
            return Err(CodecError::TooShort {
                needed: EVENT_HEADER_SIZE,
                available: packet.len(),
            });
        }

        if packet[0] != HciPacketIndicator::Event.val() {
            return Err(CodecError::UnexpectedIndicator(packet[0]));
        }

        let declared = packet[2] as usize;
        let actual = packet.len() - EVENT_HEADER_SIZE;

        if declared != actual {
            return Err(CodecError::LengthMismatch { declared, actual });
        }

        Ok(EventPacket { packet })
    }

    pub fn code(&self) -> u8 {
        self.packet[1]
    }

    pub fn parameters(&self) -> &'a [u8] {
        &self.packet[EVENT_HEADER_SIZE..]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.packet
    }

    /// Read the sub event code
    pub fn sub_code(&self, width: SubCodeWidth) -> Result<u16, CodecError> {
        let p = self.parameters();

        match width {
            SubCodeWidth::U8 if !p.is_empty() => Ok(p[0] as u16),
            SubCodeWidth::U16 if p.len() >= 2 => Ok(<u16>::from_le_bytes([p[0], p[1]])),
            _ => Err(CodecError::TooShort {
                needed: width.size(),
                available: p.len(),
            }),
        }
    }

    /// The parameters following the sub event code
    pub fn sub_parameters(&self, width: SubCodeWidth) -> &'a [u8] {
        self.parameters().get(width.size()..).unwrap_or_default()
    }

    /// Look up the event within a registry
    ///
    /// For events with sub events this also reads the sub event code.
    pub fn decode<'r>(&self, registry: &'r Registry) -> Result<DecodedEvent<'r, 'a>, EventError> {
        let code = self.code();

        match registry.sub_code_width(code)? {
            None => Ok(DecodedEvent {
                code,
                sub_code: None,
                descriptor: registry.event(code)?,
                parameters: self.parameters(),
            }),
            Some(width) => {
                let sub_code = self.sub_code(width)?;

                Ok(DecodedEvent {
                    code,
                    sub_code: Some(sub_code),
                    descriptor: registry.sub_event(code, sub_code)?,
                    parameters: self.sub_parameters(width),
                })
            }
        }
    }
}

/// An event resolved through a registry
#[derive(Clone, Copy, Debug)]
pub struct DecodedEvent<'r, 'a> {
    pub code: u8,
    pub sub_code: Option<u16>,
    /// The descriptor of the event, or of the sub event for events with sub events
    pub descriptor: &'r ResolvedEvent,
    /// The parameters, without the sub event code
    pub parameters: &'a [u8],
}

impl<'r, 'a> DecodedEvent<'r, 'a> {
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// The layout of the parameters, if it is fixed
    pub fn layout(&self) -> Option<Layout> {
        self.descriptor.params.layout()
    }

    /// Create a reader of the parameters checked against the layout
    pub fn reader(&self) -> Result<LayoutReader<'a>, CodecError> {
        match self.layout() {
            Some(layout) => LayoutReader::new(layout, self.parameters),
            None => Ok(LayoutReader::unchecked(self.parameters)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventError {
    Codec(CodecError),
    Schema(SchemaError),
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EventError::Codec(e) => fmt::Display::fmt(e, f),
            EventError::Schema(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for EventError {}

impl From<CodecError> for EventError {
    fn from(e: CodecError) -> Self {
        EventError::Codec(e)
    }
}

impl From<SchemaError> for EventError {
    fn from(e: SchemaError) -> Self {
        EventError::Schema(e)
    }
}

/// Implement `TryFrom<&[u8]>` for an event view
///
/// The parameters are checked against the layout before the body runs.
macro_rules! impl_try_from_for_parameters {
    ( $data:ident $(<$lt:lifetime>)?, $layout:expr, |$reader:ident| $body:block ) => {
        impl<'a> TryFrom<&'a [u8]> for $data $(<$lt>)? {
            type Error = CodecError;

            fn try_from(parameters: &'a [u8]) -> Result<Self, Self::Error> {
                let $reader = LayoutReader::new($layout, parameters)?;

                $body
            }
        }
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandCompleteData<'a> {
    pub number_of_hci_command_packets: u8,
    pub opcode: OpCode,
    pub return_parameters: &'a [u8],
}

impl_try_from_for_parameters! { CommandCompleteData<'a>, command_complete::LAYOUT, |reader| {
    Ok(CommandCompleteData {
        number_of_hci_command_packets: reader.u8(&command_complete::NUM_HCI_COMMAND_PACKETS)?,
        opcode: OpCode::from_val(reader.u16(&command_complete::OPCODE)?),
        return_parameters: &reader.buffer()[command_complete::LAYOUT.min_len()..],
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandStatusData {
    pub status: Error,
    pub number_of_hci_command_packets: u8,
    pub opcode: OpCode,
}

impl_try_from_for_parameters! { CommandStatusData, command_status::LAYOUT, |reader| {
    Ok(CommandStatusData {
        status: Error::from(reader.u8(&command_status::STATUS)?),
        number_of_hci_command_packets: reader.u8(&command_status::NUM_HCI_COMMAND_PACKETS)?,
        opcode: OpCode::from_val(reader.u16(&command_status::OPCODE)?),
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HardwareErrorData {
    pub code: HardwareCode,
}

impl_try_from_for_parameters! { HardwareErrorData, hardware_error::LAYOUT, |reader| {
    Ok(HardwareErrorData {
        code: HardwareCode::from(reader.u8(&hardware_error::CODE)?),
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisconnectionCompleteData {
    pub status: Error,
    pub connection_handle: u16,
    pub reason: Error,
}

impl_try_from_for_parameters! { DisconnectionCompleteData, disconnection_complete::LAYOUT, |reader| {
    Ok(DisconnectionCompleteData {
        status: Error::from(reader.u8(&disconnection_complete::STATUS)?),
        connection_handle: reader.u16(&disconnection_complete::HANDLE)?,
        reason: Error::from(reader.u8(&disconnection_complete::REASON)?),
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LERole {
    Master,
    Slave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LEConnectionCompleteData {
    pub status: Error,
    pub connection_handle: u16,
    pub role: LERole,
    pub peer_address_type: u8,
    pub peer_address: [u8; 6],
    pub connection_interval: u16,
    pub connection_latency: u16,
    pub supervision_timeout: u16,
    pub master_clock_accuracy: u8,
}

impl_try_from_for_parameters! { LEConnectionCompleteData, le_connection_complete::LAYOUT, |reader| {
    Ok(LEConnectionCompleteData {
        status: Error::from(reader.u8(&le_connection_complete::STATUS)?),
        connection_handle: reader.u16(&le_connection_complete::HANDLE)?,
        role: if reader.u8(&le_connection_complete::ROLE)? == 0 { LERole::Master } else { LERole::Slave },
        peer_address_type: reader.u8(&le_connection_complete::PEER_ADDRESS_TYPE)?,
        peer_address: reader.address(&le_connection_complete::PEER_ADDRESS)?,
        connection_interval: reader.u16(&le_connection_complete::INTERVAL)?,
        connection_latency: reader.u16(&le_connection_complete::LATENCY)?,
        supervision_timeout: reader.u16(&le_connection_complete::SUPERVISION_TIMEOUT)?,
        master_clock_accuracy: reader.u8(&le_connection_complete::MASTER_CLOCK_ACCURACY)?,
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LEAdvEventType {
    ConnectableAndScannableUndirectedAdvertising,
    ConnectableDirectedAdvertising,
    ScannableUndirectedAdvertising,
    NonConnectableUndirectedAdvertising,
    ScanResponse,
    Unknown(u8),
}

impl From<u8> for LEAdvEventType {
    fn from(raw: u8) -> Self {
        match raw {
            0x00 => LEAdvEventType::ConnectableAndScannableUndirectedAdvertising,
            0x01 => LEAdvEventType::ConnectableDirectedAdvertising,
            0x02 => LEAdvEventType::ScannableUndirectedAdvertising,
            0x03 => LEAdvEventType::NonConnectableUndirectedAdvertising,
            0x04 => LEAdvEventType::ScanResponse,
            _ => LEAdvEventType::Unknown(raw),
        }
    }
}

/// One advertising report
///
/// The RSSI is the byte right after the advertising data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvertisingReport<'a> {
    pub event_type: LEAdvEventType,
    pub address_type: u8,
    pub address: [u8; 6],
    pub data: &'a [u8],
    pub rssi: i8,
}

impl<'a> AdvertisingReport<'a> {
    /// Read one report, returning it with the bytes after it
    fn chew(raw: &'a [u8]) -> Result<(Self, &'a [u8]), CodecError> {
        let reader = LayoutReader::new(advertising_report::LAYOUT, raw)?;

        let data_len = reader.u8(&advertising_report::DATA_LENGTH)? as usize;

        let data_rssi = reader.bytes(&advertising_report::DATA_RSSI)?;

        if data_rssi.len() < data_len + 1 {
            return Err(CodecError::TooShort {
                needed: advertising_report::DATA_RSSI.offset + data_len + 1,
                available: raw.len(),
            });
        }

        let report = AdvertisingReport {
            event_type: LEAdvEventType::from(reader.u8(&advertising_report::EVENT_TYPE)?),
            address_type: reader.u8(&advertising_report::ADDRESS_TYPE)?,
            address: reader.address(&advertising_report::ADDRESS)?,
            data: &data_rssi[..data_len],
            rssi: data_rssi[data_len] as i8,
        };

        Ok((report, &data_rssi[(data_len + 1)..]))
    }

    /// Read the report of a GAP device found vendor event
    pub fn from_device_found(parameters: &'a [u8]) -> Result<Self, CodecError> {
        Self::chew(parameters).map(|(report, _)| report)
    }
}

/// Iterator over the reports of an LE advertising report event
///
/// The BlueNRG-MS puts one report in an event, further reports are read as if they followed one
/// another.
pub struct AdvertisingReportIter<'a> {
    remaining: u8,
    raw: &'a [u8],
}

impl<'a> AdvertisingReportIter<'a> {
    /// Create an iterator over the parameters (after the sub event code) of the event
    pub fn new(parameters: &'a [u8]) -> Result<Self, CodecError> {
        let reader = LayoutReader::new(Layout(&[advertising_report::NUM_REPORTS]), parameters)?;

        Ok(AdvertisingReportIter {
            remaining: reader.u8(&advertising_report::NUM_REPORTS)?,
            raw: &parameters[1..],
        })
    }
}

impl<'a> Iterator for AdvertisingReportIter<'a> {
    type Item = Result<AdvertisingReport<'a>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;

        match AdvertisingReport::chew(self.raw) {
            Ok((report, rest)) => {
                self.raw = rest;
                Some(Ok(report))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

/// The reason for the last reset of the BlueNRG-MS
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetReason {
    Normal,
    UpdaterAci,
    UpdaterBadFlag,
    UpdaterPin,
    Watchdog,
    Lockup,
    Brownout,
    Crash,
    EccError,
    Unknown(u8),
}

impl From<u8> for ResetReason {
    fn from(raw: u8) -> Self {
        match raw {
            1 => ResetReason::Normal,
            2 => ResetReason::UpdaterAci,
            3 => ResetReason::UpdaterBadFlag,
            4 => ResetReason::UpdaterPin,
            5 => ResetReason::Watchdog,
            6 => ResetReason::Lockup,
            7 => ResetReason::Brownout,
            8 => ResetReason::Crash,
            9 => ResetReason::EccError,
            _ => ResetReason::Unknown(raw),
        }
    }
}

impl From<ResetReason> for u8 {
    fn from(reason: ResetReason) -> u8 {
        match reason {
            ResetReason::Normal => 1,
            ResetReason::UpdaterAci => 2,
            ResetReason::UpdaterBadFlag => 3,
            ResetReason::UpdaterPin => 4,
            ResetReason::Watchdog => 5,
            ResetReason::Lockup => 6,
            ResetReason::Brownout => 7,
            ResetReason::Crash => 8,
            ResetReason::EccError => 9,
            ResetReason::Unknown(raw) => raw,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HalInitializedData {
    pub reason: ResetReason,
}

impl_try_from_for_parameters! { HalInitializedData, hal_initialized::LAYOUT, |reader| {
    Ok(HalInitializedData {
        reason: ResetReason::from(reader.u8(&hal_initialized::REASON_CODE)?),
    })
}}

/// Read a length prefixed tail
fn length_prefixed<'a>(reader: &LayoutReader<'a>, len: usize, tail: &'a [u8]) -> Result<&'a [u8], CodecError> {
    tail.get(..len).ok_or(CodecError::TooShort {
        needed: reader.buffer().len() - tail.len() + len,
        available: reader.buffer().len(),
    })
}

/// A GATT attribute modified event
///
/// The offset is only reported by the IDB05A1 stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeModifiedData<'a> {
    pub connection_handle: u16,
    pub attribute_handle: u16,
    pub offset: Option<u16>,
    pub data: &'a [u8],
}

impl<'a> AttributeModifiedData<'a> {
    pub fn try_from_variant(parameters: &'a [u8], variant: Variant) -> Result<Self, CodecError> {
        let (layout, tail) = match variant {
            Variant::Idb05a1 => (attribute_modified::IDB05A1, attribute_modified::DATA_IDB05A1),
            Variant::Idb04a1 => (attribute_modified::IDB04A1, attribute_modified::DATA_IDB04A1),
        };

        let reader = LayoutReader::new(layout, parameters)?;

        let len = reader.u8(&attribute_modified::DATA_LENGTH)? as usize;

        Ok(AttributeModifiedData {
            connection_handle: reader.u16(&attribute_modified::CONN_HANDLE)?,
            attribute_handle: reader.u16(&attribute_modified::ATTR_HANDLE)?,
            offset: match variant {
                Variant::Idb05a1 => Some(reader.u16(&attribute_modified::OFFSET)?),
                Variant::Idb04a1 => None,
            },
            data: length_prefixed(&reader, len, reader.bytes(&tail)?)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WritePermitRequestData<'a> {
    pub connection_handle: u16,
    pub attribute_handle: u16,
    pub data: &'a [u8],
}

impl_try_from_for_parameters! { WritePermitRequestData<'a>, write_permit_request::LAYOUT, |reader| {
    let len = reader.u8(&write_permit_request::DATA_LENGTH)? as usize;

    Ok(WritePermitRequestData {
        connection_handle: reader.u16(&write_permit_request::CONN_HANDLE)?,
        attribute_handle: reader.u16(&write_permit_request::ATTR_HANDLE)?,
        data: length_prefixed(&reader, len, reader.bytes(&write_permit_request::DATA)?)?,
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadPermitRequestData {
    pub connection_handle: u16,
    pub attribute_handle: u16,
    pub offset: u16,
}

impl_try_from_for_parameters! { ReadPermitRequestData, read_permit_request::LAYOUT, |reader| {
    Ok(ReadPermitRequestData {
        connection_handle: reader.u16(&read_permit_request::CONN_HANDLE)?,
        attribute_handle: reader.u16(&read_permit_request::ATTR_HANDLE)?,
        offset: reader.u16(&read_permit_request::OFFSET)?,
    })
}}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GapProcedureCompleteData<'a> {
    pub procedure_code: u8,
    pub status: Error,
    pub data: &'a [u8],
}

impl_try_from_for_parameters! { GapProcedureCompleteData<'a>, gap_procedure_complete::LAYOUT, |reader| {
    Ok(GapProcedureCompleteData {
        procedure_code: reader.u8(&gap_procedure_complete::PROCEDURE_CODE)?,
        status: Error::from(reader.u8(&gap_procedure_complete::STATUS)?),
        data: reader.bytes(&gap_procedure_complete::DATA)?,
    })
}}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::schema::base::events as base_events;
    use crate::hci::schema::vendor::events as vendor_events;
    use crate::hci_transport::mock;

    #[test]
    fn checked_packet() {
        assert_eq!(
            EventPacket::from_packet(&[0x02, 0x0E, 0x00]),
            Err(CodecError::UnexpectedIndicator(0x02))
        );
        assert_eq!(
            EventPacket::from_packet(&[0x04, 0x0E, 0x02, 0x00]),
            Err(CodecError::LengthMismatch { declared: 2, actual: 1 })
        );

        let raw = mock::command_complete(OpCode::new(0x03, 0x03), &[0x00]);

        let packet = EventPacket::from_packet(&raw).unwrap();

        assert_eq!(packet.code(), base_events::CMD_COMPLETE);

        let complete = CommandCompleteData::try_from(packet.parameters()).unwrap();

        assert_eq!(complete.opcode, OpCode::new(0x03, 0x03));
        assert_eq!(complete.return_parameters, &[0x00]);
    }

    #[test]
    fn decode_through_registry() {
        let registry = Registry::bluenrg_ms(Variant::Idb05a1);

        let raw = mock::vendor_event(vendor_events::HAL_INITIALIZED, &[0x01]);

        let packet = EventPacket::from_packet(&raw).unwrap();

        let decoded = packet.decode(&registry).unwrap();

        assert_eq!(decoded.name(), "HAL_INITIALIZED");
        assert_eq!(decoded.sub_code, Some(vendor_events::HAL_INITIALIZED));
        assert_eq!(
            HalInitializedData::try_from(decoded.parameters).unwrap().reason,
            ResetReason::Normal
        );

        let unknown = mock::vendor_event(0x7777, &[]);

        assert_eq!(
            EventPacket::from_packet(&unknown).unwrap().decode(&registry).unwrap_err(),
            EventError::Schema(SchemaError::UnknownSubEvent(0xFF, 0x7777))
        );

        let truncated = [0x04, 0xFF, 0x01, 0x01];

        assert!(matches!(
            EventPacket::from_packet(&truncated).unwrap().decode(&registry),
            Err(EventError::Codec(_))
        ));
    }

    #[test]
    fn connection_complete() {
        let params = [
            0x00, 0x01, 0x08, 0x01, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x28, 0x00, 0x00, 0x00, 0xF4, 0x01,
            0x00,
        ];

        let data = LEConnectionCompleteData::try_from(&params[..]).unwrap();

        assert_eq!(data.connection_handle, 0x0801);
        assert_eq!(data.role, LERole::Slave);
        assert_eq!(data.peer_address, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        assert_eq!(data.supervision_timeout, 500);

        assert!(LEConnectionCompleteData::try_from(&params[..10]).is_err());
    }

    #[test]
    fn disconnection_reason() {
        let data = DisconnectionCompleteData::try_from(&[0x00, 0x01, 0x08, 0x13][..]).unwrap();

        assert_eq!(data.connection_handle, 0x0801);
        assert_eq!(data.reason, Error::RemoteUserTerminatedConnection);
    }

    #[test]
    fn advertising_reports() {
        let mut params = vec![0x01, 0x00, 0x01, 1, 2, 3, 4, 5, 6, 0x03, 0x02, 0x01, 0x06, 0xC4];

        let reports: Vec<_> = AdvertisingReportIter::new(&params).unwrap().collect();

        assert_eq!(reports.len(), 1);

        let report = reports[0].unwrap();

        assert_eq!(report.event_type, LEAdvEventType::ConnectableAndScannableUndirectedAdvertising);
        assert_eq!(report.address, [1, 2, 3, 4, 5, 6]);
        assert_eq!(report.data, &[0x02, 0x01, 0x06]);
        assert_eq!(report.rssi, -60);

        // missing rssi
        params.pop();

        assert!(AdvertisingReportIter::new(&params).unwrap().next().unwrap().is_err());
    }

    #[test]
    fn attribute_modified_by_variant() {
        let new_stack = [0x01, 0x08, 0x0E, 0x00, 0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC];

        let data = AttributeModifiedData::try_from_variant(&new_stack, Variant::Idb05a1).unwrap();

        assert_eq!(data.attribute_handle, 0x0E);
        assert_eq!(data.offset, Some(0));
        assert_eq!(data.data, &[0xAA, 0xBB]);

        let old_stack = [0x01, 0x08, 0x0E, 0x00, 0x02, 0xAA, 0xBB];

        let data = AttributeModifiedData::try_from_variant(&old_stack, Variant::Idb04a1).unwrap();

        assert_eq!(data.offset, None);
        assert_eq!(data.data, &[0xAA, 0xBB]);

        let short = [0x01, 0x08, 0x0E, 0x00, 0x05, 0xAA];

        assert!(AttributeModifiedData::try_from_variant(&short, Variant::Idb04a1).is_err());
    }

    #[test]
    fn permit_requests() {
        let write = WritePermitRequestData::try_from(&[0x01, 0x08, 0x10, 0x00, 0x01, 0x7F][..]).unwrap();

        assert_eq!(write.attribute_handle, 0x10);
        assert_eq!(write.data, &[0x7F]);

        let read = ReadPermitRequestData::try_from(&[0x01, 0x08, 0x10, 0x00, 0x00, 0x04, 0x00][..]).unwrap();

        assert_eq!(read.connection_handle, 0x0801);
        assert_eq!(read.offset, 4);
    }
}
