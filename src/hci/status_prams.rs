//! Status Parameter Commands

pub mod read_rssi {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_STATUS_PARAM};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_STATUS_PARAM, ocf::READ_RSSI);

    const RSSI: Field = Field::i8("rssi", 3);

    /// Read the RSSI (in dBm) of a connection
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, connection_handle: u16) -> Result<i8, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(connection_handle)])?;

        Ok(response.reader()?.i8(&RSSI)?)
    }
}

#[cfg(test)]
mod tests {
    use super::read_rssi;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn rssi_is_signed() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            Some(vec![mock::command_complete(command.opcode(), &[0x00, 0x01, 0x08, 0xC4])])
        });

        assert_eq!(read_rssi::send(&mut hci, 0x0801), Ok(-60));
    }
}
