//! Informational Parameter Commands

pub mod read_local_version {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::read_local_version::{
        HCI_REVISION, HCI_VERSION, LMP_PAL_SUBVERSION, LMP_PAL_VERSION, MANUFACTURER_NAME,
    };
    use crate::hci::schema::base::{ocf, OGF_INFO_PARAM};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;
    use core::fmt;

    pub const OPCODE: OpCode = OpCode::new(OGF_INFO_PARAM, ocf::READ_LOCAL_VERSION);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VersionInformation {
        pub hci_version: u8,
        pub hci_revision: u16,
        pub lmp_pal_version: u8,
        pub manufacturer_name: u16,
        pub lmp_pal_subversion: u16,
    }

    impl VersionInformation {
        /// The firmware version of the BlueNRG-MS
        ///
        /// This is the major and minor number, followed by the patch letter (there is none for
        /// patch zero) and `dev` for development builds. For example `7.2c`.
        pub fn firmware_version(&self) -> FirmwareVersion {
            FirmwareVersion {
                major: (self.hci_revision & 0xFF) as u8,
                minor: ((self.lmp_pal_subversion & 0xF0) >> 4) as u8,
                patch: (self.lmp_pal_subversion & 0xF) as u8,
                dev: self.lmp_pal_subversion & 0x8000 != 0,
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct FirmwareVersion {
        pub major: u8,
        pub minor: u8,
        pub patch: u8,
        pub dev: bool,
    }

    impl fmt::Display for FirmwareVersion {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{}.{}", self.major, self.minor)?;

            if self.patch != 0 {
                write!(f, "{}", (b'a' + self.patch - 1) as char)?;
            }

            if self.dev {
                write!(f, "dev")?;
            }

            Ok(())
        }
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<VersionInformation, Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let reader = response.reader()?;

        Ok(VersionInformation {
            hci_version: reader.u8(&HCI_VERSION)?,
            hci_revision: reader.u16(&HCI_REVISION)?,
            lmp_pal_version: reader.u8(&LMP_PAL_VERSION)?,
            manufacturer_name: reader.u16(&MANUFACTURER_NAME)?,
            lmp_pal_subversion: reader.u16(&LMP_PAL_SUBVERSION)?,
        })
    }
}

pub mod read_bd_addr {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_INFO_PARAM};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_INFO_PARAM, ocf::READ_BD_ADDR);

    const BD_ADDR: Field = Field::bytes("bdaddr", 1, 6);

    /// Read the public address of the controller
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<[u8; 6], Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let mut address = [0u8; 6];

        address.copy_from_slice(response.reader()?.bytes(&BD_ADDR)?);

        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn firmware_version_string() {
        let version = |hci_revision, lmp_pal_subversion| read_local_version::VersionInformation {
            hci_version: 6,
            hci_revision,
            lmp_pal_version: 6,
            manufacturer_name: 0x30,
            lmp_pal_subversion,
        };

        assert_eq!(version(0x0107, 0x0023).firmware_version().to_string(), "7.2c");
        assert_eq!(version(0x0107, 0x0020).firmware_version().to_string(), "7.2");
        assert_eq!(version(0x0107, 0x8021).firmware_version().to_string(), "7.2adev");
    }

    #[test]
    fn read_version_and_address() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            let ret: &[u8] = if command.opcode() == read_local_version::OPCODE {
                &[0x00, 0x06, 0x07, 0x01, 0x06, 0x30, 0x00, 0x23, 0x00]
            } else {
                &[0x00, 1, 2, 3, 4, 5, 6]
            };

            Some(vec![mock::command_complete(command.opcode(), ret)])
        });

        let info = read_local_version::send(&mut hci).unwrap();

        assert_eq!(info.manufacturer_name, 0x30);
        assert_eq!(info.firmware_version().to_string(), "7.2c");

        assert_eq!(read_bd_addr::send(&mut hci), Ok([1, 2, 3, 4, 5, 6]));
    }
}
