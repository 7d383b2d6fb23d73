//! Controller and Baseband Commands

status_command! {
    /// Reset the controller
    ///
    /// This is the HCI reset, it does not touch the reset line of the BlueNRG-MS.
    reset,
    crate::hci::schema::base::OGF_HOST_CTL,
    crate::hci::schema::base::ocf::RESET,
}

pub mod read_transmit_power_level {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_HOST_CTL};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_HOST_CTL, ocf::READ_TRANSMIT_POWER_LEVEL);

    const LEVEL: Field = Field::i8("level", 3);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum TransmitPowerLevelType {
        CurrentPowerLevel,
        MaximumPowerLevel,
    }

    impl TransmitPowerLevelType {
        fn val(&self) -> u8 {
            match self {
                TransmitPowerLevelType::CurrentPowerLevel => 0x00,
                TransmitPowerLevelType::MaximumPowerLevel => 0x01,
            }
        }
    }

    /// Read the transmit power level (in dBm) of a connection
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        level_type: TransmitPowerLevelType,
    ) -> Result<i8, Error> {
        let values = [Value::from(connection_handle), Value::from(level_type.val())];

        Ok(hci.send_values(OPCODE, &values)?.reader()?.i8(&LEVEL)?)
    }
}

status_command! {
    /// Turn flow control from the controller to the host on or off
    ///
    /// The BlueNRG-MS only takes `0x00` (off) and `0x01` (on for ACL data).
    set_controller_to_host_fc,
    crate::hci::schema::base::OGF_HOST_CTL,
    crate::hci::schema::base::ocf::SET_CONTROLLER_TO_HOST_FC,
    flow_control_enable: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn reset_has_no_parameters() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        reset::send(&mut hci).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].opcode(), reset::OPCODE);
        assert!(commands[0].parameters().is_empty());
    }

    #[test]
    fn transmit_power_level() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            Some(vec![mock::command_complete(command.opcode(), &[0x00, 0x01, 0x08, 0x08])])
        });

        let level = read_transmit_power_level::send(
            &mut hci,
            0x0801,
            read_transmit_power_level::TransmitPowerLevelType::MaximumPowerLevel,
        );

        assert_eq!(level, Ok(8));
        assert_eq!(firmware.commands()[0].parameters(), &[0x01, 0x08, 0x01]);
    }
}
