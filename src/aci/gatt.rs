//! GATT commands
//!
//! The firmware keeps the attribute database. The host adds services, characteristics and
//! descriptors with the `add_*` commands, which return the handle the firmware assigned, and
//! then works with those handles. The client procedures (discovery, reads and writes to a peer
//! server) are accepted with a *Command Status* and report their results in GATT vendor events.

/// Service type of `add_serv`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceType {
    Primary,
    Secondary,
}

impl ServiceType {
    pub fn val(&self) -> u8 {
        match self {
            ServiceType::Primary => 0x01,
            ServiceType::Secondary => 0x02,
        }
    }
}

vendor_command! {
    /// Initialize the GATT server
    ///
    /// This must be sent before the GAP init.
    init,
    gatt::INIT,
}

pub mod add_serv {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::handle_response::HANDLE;
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;
    use crate::uuid::Uuid;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::ADD_SERV);

    /// Add a service and get its handle
    ///
    /// `max_attribute_records` must cover every attribute of the service, the firmware reserves
    /// the handles for them.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        uuid: &Uuid,
        service_type: super::ServiceType,
        max_attribute_records: u8,
    ) -> Result<u16, Error> {
        let values = [
            Value::from(uuid.uuid_type()),
            Value::from(uuid.as_le_bytes()),
            Value::from(service_type.val()),
            Value::from(max_attribute_records),
        ];

        Ok(hci.send_values(OPCODE, &values)?.u16(&HANDLE)?)
    }
}

pub mod include_serv {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::handle_response::HANDLE;
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;
    use crate::uuid::Uuid;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::INCLUDE_SERV);

    /// Include the service with the handle range `start..=end` into the service at
    /// `service_handle`
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        service_handle: u16,
        start: u16,
        end: u16,
        uuid: &Uuid,
    ) -> Result<u16, Error> {
        let values = [
            Value::from(service_handle),
            Value::from(start),
            Value::from(end),
            Value::from(uuid.uuid_type()),
            Value::from(uuid.as_le_bytes()),
        ];

        Ok(hci.send_values(OPCODE, &values)?.u16(&HANDLE)?)
    }
}

pub mod add_char {
    use crate::gatt::characteristic::{EventMask, Permissions, Properties};
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::handle_response::HANDLE;
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;
    use crate::uuid::Uuid;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::ADD_CHAR);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AddCharacteristic<'a> {
        pub service_handle: u16,
        pub uuid: &'a Uuid,
        /// Maximum length of the value
        pub value_len: u8,
        pub properties: Properties,
        pub permissions: Permissions,
        pub event_mask: EventMask,
        pub encryption_key_size: u8,
        /// The value can be shorter than `value_len`
        pub is_variable: bool,
    }

    /// Add a characteristic to a service
    ///
    /// The returned handle is the handle of the characteristic declaration, the value is at the
    /// next handle.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, characteristic: &AddCharacteristic) -> Result<u16, Error> {
        let values = [
            Value::from(characteristic.service_handle),
            Value::from(characteristic.uuid.uuid_type()),
            Value::from(characteristic.uuid.as_le_bytes()),
            Value::from(characteristic.value_len),
            Value::from(characteristic.properties.bits()),
            Value::from(characteristic.permissions.bits()),
            Value::from(characteristic.event_mask.bits()),
            Value::from(characteristic.encryption_key_size),
            Value::from(characteristic.is_variable),
        ];

        Ok(hci.send_values(OPCODE, &values)?.u16(&HANDLE)?)
    }
}

pub mod add_char_desc {
    use crate::gatt::characteristic::{Access, EventMask, Permissions};
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::handle_response::HANDLE;
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;
    use crate::uuid::Uuid;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::ADD_CHAR_DESC);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AddDescriptor<'a> {
        pub service_handle: u16,
        pub characteristic_handle: u16,
        pub uuid: &'a Uuid,
        pub value_max_len: u8,
        pub value: &'a [u8],
        pub permissions: Permissions,
        pub access: Access,
        pub event_mask: EventMask,
        pub encryption_key_size: u8,
        pub is_variable: bool,
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, descriptor: &AddDescriptor) -> Result<u16, Error> {
        let values = [
            Value::from(descriptor.service_handle),
            Value::from(descriptor.characteristic_handle),
            Value::from(descriptor.uuid.uuid_type()),
            Value::from(descriptor.uuid.as_le_bytes()),
            Value::from(descriptor.value_max_len),
            Value::from(descriptor.value.len() as u8),
            Value::from(descriptor.value),
            Value::from(descriptor.permissions.bits()),
            Value::from(descriptor.access.bits()),
            Value::from(descriptor.event_mask.bits()),
            Value::from(descriptor.encryption_key_size),
            Value::from(descriptor.is_variable),
        ];

        Ok(hci.send_values(OPCODE, &values)?.u16(&HANDLE)?)
    }
}

pub mod update_char_value {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::UPD_CHAR_VAL);

    /// Update the value of a characteristic
    ///
    /// The firmware sends a notification or indication if the client enabled them.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        service_handle: u16,
        characteristic_handle: u16,
        offset: u8,
        value: &[u8],
    ) -> Result<(), Error> {
        let values = [
            Value::from(service_handle),
            Value::from(characteristic_handle),
            Value::from(offset),
            Value::from(value.len() as u8),
            Value::from(value),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    del_char,
    gatt::DEL_CHAR,
    service_handle: u16,
    characteristic_handle: u16,
}

vendor_command! {
    del_service,
    gatt::DEL_SERV,
    service_handle: u16,
}

vendor_command! {
    del_include_service,
    gatt::DEL_INC_SERV,
    service_handle: u16,
    include_service_handle: u16,
}

vendor_command! {
    /// Set which GATT vendor events are reported
    set_event_mask,
    gatt::SET_EVT_MASK,
    event_mask: u32,
}

vendor_command! {
    /// Start the MTU exchange as a client
    exchange_config,
    gatt::EXCHANGE_CONFIG,
    connection_handle: u16,
}

vendor_command! {
    find_info_req,
    gatt::ATT_FIND_INFO_REQ,
    connection_handle: u16,
    start_handle: u16,
    end_handle: u16,
}

vendor_command! {
    disc_all_prim_services,
    gatt::DISC_ALL_PRIM_SERVICES,
    connection_handle: u16,
}

vendor_command! {
    find_included_services,
    gatt::FIND_INCLUDED_SERVICES,
    connection_handle: u16,
    start_handle: u16,
    end_handle: u16,
}

vendor_command! {
    disc_all_charac_of_serv,
    gatt::DISC_ALL_CHARAC_OF_SERV,
    connection_handle: u16,
    start_handle: u16,
    end_handle: u16,
}

vendor_command! {
    disc_all_charac_descriptors,
    gatt::DISC_ALL_CHARAC_DESCRIPTORS,
    connection_handle: u16,
    start_handle: u16,
    end_handle: u16,
}

/// Client procedures that take a handle range and a UUID
macro_rules! uuid_procedure {
    ( $(#[$attrs:meta])* $name:ident, $ocf:ident ) => {
        $(#[$attrs])*
        pub mod $name {
            use crate::hci::engine::{Error, HostInterface};
            use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
            use crate::hci::schema::Value;
            use crate::hci::OpCode;
            use crate::hci_transport::Hardware;
            use crate::uuid::Uuid;

            pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::$ocf);

            pub fn send<H: Hardware>(
                hci: &mut HostInterface<H>,
                connection_handle: u16,
                start_handle: u16,
                end_handle: u16,
                uuid: &Uuid,
            ) -> Result<(), Error> {
                let values = [
                    Value::from(connection_handle),
                    Value::from(start_handle),
                    Value::from(end_handle),
                    Value::from(uuid.uuid_type()),
                    Value::from(uuid.as_le_bytes()),
                ];

                hci.send_values(OPCODE, &values).map(|_| ())
            }
        }
    };
}

uuid_procedure! { disc_charac_by_uuid, DISC_CHARAC_BY_UUID }

uuid_procedure! {
    /// Read the values of the characteristics with a UUID in a handle range
    read_using_charac_uuid,
    READ_USING_CHARAC_UUID
}

uuid_procedure! { read_by_type_req, ATT_READ_BY_TYPE_REQ }

uuid_procedure! { read_by_group_type_req, ATT_READ_BY_GROUP_TYPE_REQ }

pub mod disc_prim_service_by_uuid {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;
    use crate::uuid::Uuid;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::DISC_PRIM_SERVICE_BY_UUID);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, connection_handle: u16, uuid: &Uuid) -> Result<(), Error> {
        let values = [
            Value::from(connection_handle),
            Value::from(uuid.uuid_type()),
            Value::from(uuid.as_le_bytes()),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    read_charac_val,
    gatt::READ_CHARAC_VAL,
    connection_handle: u16,
    attribute_handle: u16,
}

vendor_command! {
    read_long_charac_val,
    gatt::READ_LONG_CHARAC_VAL,
    connection_handle: u16,
    attribute_handle: u16,
    offset: u16,
}

vendor_command! {
    read_char_desc,
    gatt::READ_CHAR_DESC,
    connection_handle: u16,
    attribute_handle: u16,
}

/// Client writes of a single value
macro_rules! write_procedure {
    ( $(#[$attrs:meta])* $name:ident, $ocf:ident ) => {
        $(#[$attrs])*
        pub mod $name {
            use crate::hci::engine::{Error, HostInterface};
            use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
            use crate::hci::schema::Value;
            use crate::hci::OpCode;
            use crate::hci_transport::Hardware;

            pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::$ocf);

            pub fn send<H: Hardware>(
                hci: &mut HostInterface<H>,
                connection_handle: u16,
                attribute_handle: u16,
                value: &[u8],
            ) -> Result<(), Error> {
                let values = [
                    Value::from(connection_handle),
                    Value::from(attribute_handle),
                    Value::from(value.len() as u8),
                    Value::from(value),
                ];

                hci.send_values(OPCODE, &values).map(|_| ())
            }
        }
    };
}

write_procedure! {
    /// Write a characteristic value of the peer, waiting for the write response
    write_char_value,
    WRITE_CHAR_VALUE
}

write_procedure! { write_char_desc, WRITE_CHAR_DESC }

write_procedure! {
    /// Write a characteristic value of the peer with a write command
    write_without_response,
    WRITE_WITHOUT_RESPONSE
}

write_procedure! { signed_write_without_response, SIGNED_WRITE_WITHOUT_RESPONSE }

vendor_command! {
    /// Confirm a received indication
    confirm_indication,
    gatt::CONFIRM_INDICATION,
    connection_handle: u16,
}

pub mod write_response {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::WRITE_RESPONSE);

    /// Reply to a *GATT Write Permit Request*
    ///
    /// The firmware holds the write until this is sent. With `allow` the value is written,
    /// otherwise the client gets an error response with the ATT error `error_code`.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        attribute_handle: u16,
        allow: bool,
        error_code: u8,
        value: &[u8],
    ) -> Result<(), Error> {
        let values = [
            Value::from(connection_handle),
            Value::from(attribute_handle),
            Value::from(!allow),
            Value::from(error_code),
            Value::from(value.len() as u8),
            Value::from(value),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    /// Reply to a *GATT Read Permit Request*, letting the read go through
    allow_read,
    gatt::ALLOW_READ,
    connection_handle: u16,
}

vendor_command! {
    set_security_permission,
    gatt::SET_SECURITY_PERMISSION,
    service_handle: u16,
    attribute_handle: u16,
    security_permission: u8,
}

pub mod set_desc_value {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::SET_DESC_VAL);

    /// Set the value of a descriptor
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        service_handle: u16,
        characteristic_handle: u16,
        descriptor_handle: u16,
        offset: u16,
        value: &[u8],
    ) -> Result<(), Error> {
        let values = [
            Value::from(service_handle),
            Value::from(characteristic_handle),
            Value::from(descriptor_handle),
            Value::from(offset),
            Value::from(value.len() as u8),
            Value::from(value),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

/// Take the value of a read handle value response
///
/// The value is cut to the length the firmware reports.
fn handle_value(response: &crate::hci::engine::Response) -> Result<Vec<u8>, crate::hci::engine::Error> {
    use crate::hci::schema::vendor::read_handle_value_response::{VALUE, VALUE_LEN};

    let reader = response.reader()?;

    let len = reader.u16(&VALUE_LEN)? as usize;

    let value = reader.bytes(&VALUE)?;

    Ok(value[..len.min(value.len())].to_vec())
}

pub mod read_handle_value {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::READ_HANDLE_VALUE);

    /// Read the value of a local attribute
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, attribute_handle: u16) -> Result<Vec<u8>, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(attribute_handle)])?;

        super::handle_value(&response)
    }
}

pub mod read_handle_value_offset {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::READ_HANDLE_VALUE_OFFSET);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, attribute_handle: u16, offset: u8) -> Result<Vec<u8>, Error> {
        let values = [Value::from(attribute_handle), Value::from(offset)];

        let response = hci.send_values(OPCODE, &values)?;

        super::handle_value(&response)
    }
}

pub mod update_char_value_ext {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gatt, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gatt::UPD_CHAR_VAL_EXT);

    /// Update part of a long characteristic value
    ///
    /// `update_type` selects a local update (`0x00`), a notification (`0x01`) or an indication
    /// (`0x02`). `total_len` is the length of the whole value.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        service_handle: u16,
        characteristic_handle: u16,
        update_type: u8,
        total_len: u16,
        offset: u16,
        value: &[u8],
    ) -> Result<(), Error> {
        let values = [
            Value::from(service_handle),
            Value::from(characteristic_handle),
            Value::from(update_type),
            Value::from(total_len),
            Value::from(offset),
            Value::from(value.len() as u8),
            Value::from(value),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gatt::characteristic::{EventMask, Permissions, Properties};
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};
    use crate::uuid::Uuid;
    use core::convert::TryFrom;

    #[test]
    fn added_attributes_get_the_firmware_handles() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        let service_uuid = Uuid::try_from("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap();

        let service = add_serv::send(&mut hci, &service_uuid, ServiceType::Primary, 4).unwrap();

        let characteristic = add_char::send(
            &mut hci,
            &add_char::AddCharacteristic {
                service_handle: service,
                uuid: &Uuid::from_u16(0x2A00),
                value_len: 20,
                properties: Properties::READ | Properties::WRITE,
                permissions: Permissions::empty(),
                event_mask: EventMask::ATTRIBUTE_WRITE,
                encryption_key_size: 16,
                is_variable: true,
            },
        )
        .unwrap();

        assert_eq!((service, characteristic), (1, 2));

        let commands = firmware.commands();

        let add_serv_parameters = commands[0].parameters();

        assert_eq!(add_serv_parameters.len(), 19);
        assert_eq!(add_serv_parameters[0], 0x02);
        assert_eq!(add_serv_parameters[1], 0x9E);
        assert_eq!(&add_serv_parameters[17..], &[0x01, 0x04]);

        assert_eq!(
            commands[1].parameters(),
            &[0x01, 0x00, 0x01, 0x00, 0x2A, 20, 0x0A, 0x00, 0x01, 16, 0x01]
        );
    }

    #[test]
    fn read_handle_value_is_trimmed() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            Some(vec![mock::command_complete(
                command.opcode(),
                &[0x00, 0x02, 0x00, 0xAA, 0xBB, 0xCC, 0xDD],
            )])
        });

        assert_eq!(read_handle_value::send(&mut hci, 0x000E), Ok(vec![0xAA, 0xBB]));
        assert_eq!(firmware.commands()[0].parameters(), &[0x0E, 0x00]);
    }

    #[test]
    fn write_response_allows_with_zero_status() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        write_response::send(&mut hci, 0x0801, 0x000F, true, 0, &[0x55]).unwrap();
        write_response::send(&mut hci, 0x0801, 0x000F, false, 0x80, &[]).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].parameters(), &[0x01, 0x08, 0x0F, 0x00, 0x00, 0x00, 0x01, 0x55]);
        assert_eq!(commands[1].parameters(), &[0x01, 0x08, 0x0F, 0x00, 0x01, 0x80, 0x00]);
    }

    #[test]
    fn client_procedures_are_accepted_by_status() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        read_using_charac_uuid::send(&mut hci, 0x0801, 0x0001, 0xFFFF, &Uuid::from_u16(0x2A19)).unwrap();

        write_char_value::send(&mut hci, 0x0801, 0x0010, &[1, 2]).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].opcode(), read_using_charac_uuid::OPCODE);
        assert_eq!(
            commands[0].parameters(),
            &[0x01, 0x08, 0x01, 0x00, 0xFF, 0xFF, 0x01, 0x19, 0x2A]
        );
        assert_eq!(commands[1].parameters(), &[0x01, 0x08, 0x10, 0x00, 0x02, 1, 2]);
    }
}
