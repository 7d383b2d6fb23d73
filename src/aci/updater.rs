//! Updater commands
//!
//! The updater is the bootloader of the BlueNRG-MS. `start` reboots into it, after which only
//! the commands of this module are answered until `reboot`. Flash is programmed in blocks of at
//! most [`get_bufsize`] bytes, the format of the firmware image is not handled here.

vendor_command! {
    /// Reboot into the updater
    start,
    updater::START,
}

vendor_command! {
    /// Leave the updater and start the firmware
    reboot,
    updater::REBOOT,
}

macro_rules! read_u8 {
    ( $(#[$attrs:meta])* $name:ident, $ocf:ident, $field:expr ) => {
        $(#[$attrs])*
        pub mod $name {
            use crate::hci::engine::{Error, HostInterface};
            use crate::hci::schema::vendor::{updater, OGF_VENDOR};
            use crate::hci::schema::Field;
            use crate::hci::OpCode;
            use crate::hci_transport::Hardware;

            pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, updater::$ocf);

            const VALUE: Field = Field::u8($field, 1);

            pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u8, Error> {
                Ok(hci.send_raw(OPCODE, Vec::new())?.u8(&VALUE)?)
            }
        }
    };
}

read_u8! { get_version, GET_VERSION, "version" }

read_u8! {
    /// The largest block of data the updater takes
    get_bufsize,
    GET_BUFSIZE,
    "buffer_size"
}

read_u8! { hw_version, HW_VERSION, "version" }

vendor_command! {
    /// Mark the firmware as invalid
    ///
    /// The BlueNRG-MS stays in the updater on the next reset.
    erase_blue_flag,
    updater::ERASE_BLUE_FLAG,
}

vendor_command! {
    /// Mark the firmware as valid
    reset_blue_flag,
    updater::RESET_BLUE_FLAG,
}

vendor_command! {
    erase_sector,
    updater::ERASE_SECTOR,
    address: u32,
}

pub mod prog_data_block {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{updater, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, updater::PROG_DATA_BLOCK);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, address: u32, data: &[u8]) -> Result<(), Error> {
        let values = [Value::from(address), Value::from(data.len() as u16), Value::from(data)];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod read_data_block {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{updater, OGF_VENDOR};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, updater::READ_DATA_BLOCK);

    const DATA: Field = Field::tail("data", 1);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, address: u32, len: u16) -> Result<Vec<u8>, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(address), Value::from(len)])?;

        let data = response.reader()?.bytes(&DATA)?;

        Ok(data[..data.len().min(len as usize)].to_vec())
    }
}

pub mod calc_crc {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{updater, OGF_VENDOR};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, updater::CALC_CRC);

    const CRC: Field = Field::u32("crc", 1);

    /// CRC of `sectors` flash sectors starting at `address`
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, address: u32, sectors: u8) -> Result<u32, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(address), Value::from(sectors)])?;

        Ok(response.reader()?.u32(&CRC)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn program_and_check_a_block() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            if command.opcode() == calc_crc::OPCODE {
                Some(vec![mock::command_complete(command.opcode(), &[0x00, 0x78, 0x56, 0x34, 0x12])])
            } else if command.opcode() == get_bufsize::OPCODE {
                Some(vec![mock::command_complete(command.opcode(), &[0x00, 0x64])])
            } else {
                None
            }
        });

        assert_eq!(get_bufsize::send(&mut hci), Ok(100));

        erase_sector::send(&mut hci, 0x1001_0000).unwrap();

        prog_data_block::send(&mut hci, 0x1001_0000, &[0xDE, 0xAD]).unwrap();

        assert_eq!(calc_crc::send(&mut hci, 0x1001_0000, 1), Ok(0x1234_5678));

        let commands = firmware.commands();

        assert_eq!(commands[1].parameters(), &[0x00, 0x00, 0x01, 0x10]);
        assert_eq!(
            commands[2].parameters(),
            &[0x00, 0x00, 0x01, 0x10, 0x02, 0x00, 0xDE, 0xAD]
        );
        assert_eq!(commands[3].parameters(), &[0x00, 0x00, 0x01, 0x10, 0x01]);
    }
}
