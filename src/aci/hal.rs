//! HAL commands
//!
//! These configure the BlueNRG-MS itself. The public address and the stack mode are written to
//! the configuration data area, and must be written right after a reset before any other command.

/// Offsets and lengths of the values in the configuration data area
pub mod config {
    pub const PUBLIC_ADDRESS_OFFSET: u8 = 0x00;
    pub const PUBLIC_ADDRESS_LEN: usize = 6;

    pub const DIV_OFFSET: u8 = 0x06;
    pub const DIV_LEN: usize = 2;

    pub const ER_OFFSET: u8 = 0x08;
    pub const ER_LEN: usize = 16;

    pub const IR_OFFSET: u8 = 0x18;
    pub const IR_LEN: usize = 16;

    pub const LL_WITHOUT_HOST_OFFSET: u8 = 0x2C;
    pub const LL_WITHOUT_HOST_LEN: usize = 1;

    pub const MODE_OFFSET: u8 = 0x2D;
    pub const MODE_LEN: usize = 1;

    /// Mode 2, the slave and master mode with the default number of connections
    pub const MODE_SLAVE_AND_MASTER: u8 = 0x02;
}

pub mod get_fw_build_number {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{hal, OGF_VENDOR};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, hal::GET_FW_BUILD_NUMBER);

    const BUILD_NUMBER: Field = Field::u16("build_number", 1);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u16, Error> {
        Ok(hci.send_raw(OPCODE, Vec::new())?.u16(&BUILD_NUMBER)?)
    }
}

pub mod write_config_data {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{hal, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, hal::WRITE_CONFIG_DATA);

    /// Write `data` at `offset` of the configuration data area
    ///
    /// See [`config`](super::config) for the offsets. Writing the public address must be the
    /// first command after a reset.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, offset: u8, data: &[u8]) -> Result<(), Error> {
        let values = [Value::from(offset), Value::from(data.len() as u8), Value::from(data)];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod read_config_data {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{hal, OGF_VENDOR};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, hal::READ_CONFIG_DATA);

    const DATA: Field = Field::tail("data", 1);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, offset: u8) -> Result<Vec<u8>, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(offset)])?;

        Ok(response.reader()?.bytes(&DATA)?.to_vec())
    }
}

vendor_command! {
    /// Set the output power
    ///
    /// `pa_level` goes from 0 to 7, with `en_high_power` the range is +8 dBm down to -15 dBm
    /// and without it is +4 dBm down to -18 dBm.
    set_tx_power_level,
    hal::SET_TX_POWER_LEVEL,
    en_high_power: bool,
    pa_level: u8,
}

vendor_command! {
    /// Put the BlueNRG-MS in standby
    ///
    /// Any activity on the SPI wakes it up again.
    device_standby,
    hal::DEVICE_STANDBY,
}

pub mod le_tx_test_packet_number {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{hal, OGF_VENDOR};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, hal::LE_TX_TEST_PACKET_NUMBER);

    const NUMBER_OF_PACKETS: Field = Field::u32("number_of_packets", 1);

    /// The number of packets sent in the last direct test mode
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u32, Error> {
        Ok(hci.send_raw(OPCODE, Vec::new())?.reader()?.u32(&NUMBER_OF_PACKETS)?)
    }
}

vendor_command! {
    /// Start a carrier tone on `rf_channel` (0 to 39)
    tone_start,
    hal::TONE_START,
    rf_channel: u8,
}

vendor_command! {
    tone_stop,
    hal::TONE_STOP,
}

pub mod get_link_status {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{hal, OGF_VENDOR};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, hal::GET_LINK_STATUS);

    const LINK_STATUS: Field = Field::bytes("link_status", 1, 8);
    const CONN_HANDLE: Field = Field::bytes("conn_handle", 9, 16);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum LinkState {
        Idle,
        Advertising,
        ConnectedAsSlave,
        Scanning,
        Reserved,
        ConnectedAsMaster,
        TxTest,
        RxTest,
        Unknown(u8),
    }

    impl From<u8> for LinkState {
        fn from(raw: u8) -> Self {
            match raw {
                0 => LinkState::Idle,
                1 => LinkState::Advertising,
                2 => LinkState::ConnectedAsSlave,
                3 => LinkState::Scanning,
                4 => LinkState::Reserved,
                5 => LinkState::ConnectedAsMaster,
                6 => LinkState::TxTest,
                7 => LinkState::RxTest,
                _ => LinkState::Unknown(raw),
            }
        }
    }

    /// The state and connection handle of the eight links
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LinkStatus {
        pub states: [LinkState; 8],
        pub handles: [u16; 8],
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<LinkStatus, Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let reader = response.reader()?;

        let raw_states = reader.bytes(&LINK_STATUS)?;
        let raw_handles = reader.bytes(&CONN_HANDLE)?;

        let mut status = LinkStatus {
            states: [LinkState::Idle; 8],
            handles: [0; 8],
        };

        for (state, raw) in status.states.iter_mut().zip(raw_states) {
            *state = LinkState::from(*raw);
        }

        for (handle, raw) in status.handles.iter_mut().zip(raw_handles.chunks_exact(2)) {
            *handle = <u16>::from_le_bytes([raw[0], raw[1]]);
        }

        Ok(status)
    }
}

pub mod get_anchor_period {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{hal, OGF_VENDOR};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, hal::GET_ANCHOR_PERIOD);

    const ANCHOR_PERIOD: Field = Field::u32("anchor_period", 1);
    const MAX_FREE_SLOT: Field = Field::u32("max_free_slot", 5);

    /// Returns the anchor period and the largest free slot, both in units of 625 µs
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<(u32, u32), Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let reader = response.reader()?;

        Ok((reader.u32(&ANCHOR_PERIOD)?, reader.u32(&MAX_FREE_SLOT)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn config_data_is_length_prefixed() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        let address = [0x14, 0x34, 0x00, 0xE1, 0x80, 0x02];

        write_config_data::send(&mut hci, config::PUBLIC_ADDRESS_OFFSET, &address).unwrap();
        write_config_data::send(&mut hci, config::MODE_OFFSET, &[config::MODE_SLAVE_AND_MASTER]).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].opcode(), write_config_data::OPCODE);
        assert_eq!(
            commands[0].parameters(),
            &[0x00, 0x06, 0x14, 0x34, 0x00, 0xE1, 0x80, 0x02]
        );
        assert_eq!(commands[1].parameters(), &[0x2D, 0x01, 0x02]);
    }

    #[test]
    fn tx_power_level() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        set_tx_power_level::send(&mut hci, true, 5).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x01, 0x05]);
    }

    #[test]
    fn link_status() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            let mut ret = vec![0x00, 2, 1, 0, 0, 0, 0, 0, 0];

            ret.extend_from_slice(&[0x01, 0x08]);
            ret.extend_from_slice(&[0; 14]);

            Some(vec![mock::command_complete(command.opcode(), &ret)])
        });

        let status = get_link_status::send(&mut hci).unwrap();

        assert_eq!(status.states[0], get_link_status::LinkState::ConnectedAsSlave);
        assert_eq!(status.states[1], get_link_status::LinkState::Advertising);
        assert_eq!(status.handles[0], 0x0801);
        assert_eq!(status.handles[1], 0);
    }

    #[test]
    fn read_config_data_returns_the_tail() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            Some(vec![mock::command_complete(command.opcode(), &[0x00, 1, 2, 3, 4, 5, 6])])
        });

        let address = read_config_data::send(&mut hci, config::PUBLIC_ADDRESS_OFFSET).unwrap();

        assert_eq!(address, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(firmware.commands()[0].parameters(), &[0x00]);
    }
}
