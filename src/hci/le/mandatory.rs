//! Mandatory LE commands
//!
//! These are the commands every LE controller supports.

pub mod set_event_mask {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_SET_EVENT_MASK);

    /// The default mask enables the first five LE meta events
    pub const DEFAULT_MASK: u64 = 0x1F;

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, mask: u64) -> Result<(), Error> {
        hci.send_raw(OPCODE, mask.to_le_bytes().to_vec()).map(|_| ())
    }
}

pub mod read_buffer_size {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_READ_BUFFER_SIZE);

    const PKT_LEN: Field = Field::u16("pkt_len", 1);
    const MAX_PKT: Field = Field::u8("max_pkt", 3);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct BufferSize {
        /// The maximum size of the payload of an ACL data packet
        pub packet_len: u16,
        /// The number of ACL data packets the controller can buffer
        pub packet_cnt: u8,
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<BufferSize, Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let reader = response.reader()?;

        Ok(BufferSize {
            packet_len: reader.u16(&PKT_LEN)?,
            packet_cnt: reader.u8(&MAX_PKT)?,
        })
    }
}

/// Commands returning eight bytes after the status
macro_rules! eight_byte_read {
    ($(#[$attrs:meta])* $name:ident, $ocf:expr, $field:literal) => {
        $(#[$attrs])*
        pub mod $name {
            use crate::hci::engine::{Error, HostInterface};
            use crate::hci::schema::base::{ocf, OGF_LE_CTL};
            use crate::hci::schema::Field;
            use crate::hci::OpCode;
            use crate::hci_transport::Hardware;

            pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, $ocf);

            const BITS: Field = Field::bytes($field, 1, 8);

            /// Send the command, the return is the little endian bit field
            pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u64, Error> {
                let response = hci.send_raw(OPCODE, Vec::new())?;

                let b = response.reader()?.bytes(&BITS)?;

                Ok(<u64>::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
            }
        }
    };
}

eight_byte_read! {
    /// Read the LE features supported by the controller
    read_local_supported_features, ocf::LE_READ_LOCAL_SUPPORTED_FEATURES, "features"
}

eight_byte_read! {
    /// Read the combinations of LE states the controller supports
    read_supported_states, ocf::LE_READ_SUPPORTED_STATES, "states"
}

pub mod read_white_list_size {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_READ_WHITE_LIST_SIZE);

    const SIZE: Field = Field::u8("size", 1);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u8, Error> {
        Ok(hci.send_raw(OPCODE, Vec::new())?.u8(&SIZE)?)
    }
}

status_command! {
    clear_white_list,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_CLEAR_WHITE_LIST,
}

status_command! {
    add_device_to_white_list,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_ADD_DEVICE_TO_WHITE_LIST,
    address_type: u8,
    address: [u8; 6],
}

status_command! {
    remove_device_from_white_list,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_REMOVE_DEVICE_FROM_WHITE_LIST,
    address_type: u8,
    address: [u8; 6],
}

pub mod test_end {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_TEST_END);

    const NUM_PKTS: Field = Field::u16("num_pkts", 1);

    /// End a receiver or transmitter test
    ///
    /// The return is the number of packets received, it is zero for a transmitter test.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u16, Error> {
        Ok(hci.send_raw(OPCODE, Vec::new())?.u16(&NUM_PKTS)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn read_commands() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            let ret = if command.opcode() == read_buffer_size::OPCODE {
                vec![0x00, 0x1B, 0x00, 0x04]
            } else if command.opcode() == read_local_supported_features::OPCODE {
                vec![0x00, 1, 2, 3, 4, 5, 6, 7, 8]
            } else {
                return None;
            };

            Some(vec![mock::command_complete(command.opcode(), &ret)])
        });

        assert_eq!(
            read_buffer_size::send(&mut hci).unwrap(),
            read_buffer_size::BufferSize {
                packet_len: 27,
                packet_cnt: 4
            }
        );

        assert_eq!(read_local_supported_features::send(&mut hci).unwrap(), 0x0807060504030201);

        // default answer of the mock is all zero
        assert_eq!(read_white_list_size::send(&mut hci).unwrap(), 0);

        set_event_mask::send(&mut hci, set_event_mask::DEFAULT_MASK).unwrap();

        assert_eq!(
            firmware.commands().last().unwrap().parameters(),
            &[0x1F, 0, 0, 0, 0, 0, 0, 0]
        );

        add_device_to_white_list::send(&mut hci, 0, [1, 2, 3, 4, 5, 6]).unwrap();

        assert_eq!(
            firmware.commands().last().unwrap().parameters(),
            &[0, 1, 2, 3, 4, 5, 6]
        );
    }
}
