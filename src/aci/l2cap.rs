//! L2CAP commands
//!
//! A slave asks the master for new connection parameters with an L2CAP connection parameter
//! update request. As master the request arrives as a *L2CAP Connection Update Request* vendor
//! event which is answered with `connection_parameter_update_response`.

use crate::hci::schema::vendor::events;
use crate::hci::schema::{Field, Layout, LayoutReader};
use crate::hci::schema::CodecError;
use core::convert::TryFrom;

/// Connection parameters requested over L2CAP
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub interval_min: u16,
    pub interval_max: u16,
    pub slave_latency: u16,
    pub timeout_multiplier: u16,
}

/// The *L2CAP Connection Update Request* vendor event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionUpdateRequest {
    pub connection_handle: u16,
    pub identifier: u8,
    pub parameters: ConnectionParameters,
}

impl ConnectionUpdateRequest {
    /// The sub code of the event
    pub const SUB_CODE: u16 = events::L2CAP_CONN_UPD_REQ;

    const CONN_HANDLE: Field = Field::u16("conn_handle", 0);
    const IDENTIFIER: Field = Field::u8("identifier", 3);
    const INTERVAL_MIN: Field = Field::u16("interval_min", 6);
    const INTERVAL_MAX: Field = Field::u16("interval_max", 8);
    const SLAVE_LATENCY: Field = Field::u16("slave_latency", 10);
    const TIMEOUT_MULT: Field = Field::u16("timeout_mult", 12);

    const LAYOUT: Layout = Layout(&[
        Self::CONN_HANDLE,
        Self::IDENTIFIER,
        Self::INTERVAL_MIN,
        Self::INTERVAL_MAX,
        Self::SLAVE_LATENCY,
        Self::TIMEOUT_MULT,
    ]);
}

impl<'a> TryFrom<&'a [u8]> for ConnectionUpdateRequest {
    type Error = CodecError;

    /// Parameters are the event parameters after the vendor sub code
    fn try_from(parameters: &'a [u8]) -> Result<Self, Self::Error> {
        let reader = LayoutReader::new(Self::LAYOUT, parameters)?;

        Ok(ConnectionUpdateRequest {
            connection_handle: reader.u16(&Self::CONN_HANDLE)?,
            identifier: reader.u8(&Self::IDENTIFIER)?,
            parameters: ConnectionParameters {
                interval_min: reader.u16(&Self::INTERVAL_MIN)?,
                interval_max: reader.u16(&Self::INTERVAL_MAX)?,
                slave_latency: reader.u16(&Self::SLAVE_LATENCY)?,
                timeout_multiplier: reader.u16(&Self::TIMEOUT_MULT)?,
            },
        })
    }
}

pub mod connection_parameter_update_request {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{l2cap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, l2cap::CONN_PARAM_UPDATE_REQ);

    /// Ask the master for new connection parameters
    ///
    /// The outcome is reported with a *L2CAP Connection Update Response* event.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        parameters: &super::ConnectionParameters,
    ) -> Result<(), Error> {
        let values = [
            Value::from(connection_handle),
            Value::from(parameters.interval_min),
            Value::from(parameters.interval_max),
            Value::from(parameters.slave_latency),
            Value::from(parameters.timeout_multiplier),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod connection_parameter_update_response {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{l2cap, OGF_VENDOR};
    use crate::hci::schema::{Value, Variant};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, l2cap::CONN_PARAM_UPDATE_RESP);

    /// Answer a connection update request
    ///
    /// The connection event lengths are only sent to the IDB05A1 stack.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        request: &super::ConnectionUpdateRequest,
        ce_length: (u16, u16),
        accept: bool,
    ) -> Result<(), Error> {
        let mut values = vec![
            Value::from(request.connection_handle),
            Value::from(request.parameters.interval_min),
            Value::from(request.parameters.interval_max),
            Value::from(request.parameters.slave_latency),
            Value::from(request.parameters.timeout_multiplier),
        ];

        if hci.variant() == Variant::Idb05a1 {
            values.push(Value::from(ce_length.0));
            values.push(Value::from(ce_length.1));
        }

        values.push(Value::from(request.identifier));
        values.push(Value::from(accept));

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::MockFirmware;

    const REQUEST: [u8; 14] = [
        0x01, 0x08, 0x0B, 0x07, 0x08, 0x00, 0x10, 0x00, 0x20, 0x00, 0x00, 0x00, 0xC8, 0x00,
    ];

    #[test]
    fn update_request_event() {
        let request = ConnectionUpdateRequest::try_from(&REQUEST[..]).unwrap();

        assert_eq!(request.connection_handle, 0x0801);
        assert_eq!(request.identifier, 0x07);
        assert_eq!(request.parameters.interval_max, 0x20);
        assert_eq!(request.parameters.timeout_multiplier, 200);

        assert!(ConnectionUpdateRequest::try_from(&REQUEST[..10]).is_err());
    }

    #[test]
    fn update_response_by_variant() {
        let request = ConnectionUpdateRequest::try_from(&REQUEST[..]).unwrap();

        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        connection_parameter_update_response::send(&mut hci, &request, (2, 4), true).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].parameters().len(), 16);
        assert_eq!(&commands[0].parameters()[10..], &[0x02, 0x00, 0x04, 0x00, 0x07, 0x01]);

        let firmware = MockFirmware::with_variant(Variant::Idb04a1);

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb04a1);

        connection_parameter_update_response::send(&mut hci, &request, (2, 4), false).unwrap();

        assert_eq!(&firmware.commands()[0].parameters()[10..], &[0x07, 0x00]);
    }
}
