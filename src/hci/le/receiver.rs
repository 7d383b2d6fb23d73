//! Scanning and receiver commands

pub mod set_scan_parameters {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_SET_SCAN_PARAMETERS);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum LEScanType {
        PassiveScanning,
        ActiveScanning,
    }

    /// Scan parameters
    ///
    /// The interval and window are in units of 0.625 ms, the window must not be larger than the
    /// interval.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ScanningParameters {
        pub scan_type: LEScanType,
        pub scan_interval: u16,
        pub scan_window: u16,
        pub own_address_type: u8,
        pub scanning_filter_policy: u8,
    }

    impl Default for ScanningParameters {
        fn default() -> Self {
            ScanningParameters {
                scan_type: LEScanType::PassiveScanning,
                scan_interval: 0x0010,
                scan_window: 0x0010,
                own_address_type: 0,
                scanning_filter_policy: 0,
            }
        }
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, params: ScanningParameters) -> Result<(), Error> {
        let scan_type = match params.scan_type {
            LEScanType::PassiveScanning => 0u8,
            LEScanType::ActiveScanning => 1u8,
        };

        let values = [
            Value::from(scan_type),
            Value::from(params.scan_interval),
            Value::from(params.scan_window),
            Value::from(params.own_address_type),
            Value::from(params.scanning_filter_policy),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

status_command! {
    set_scan_enable,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_SET_SCAN_ENABLE,
    enable: bool,
    filter_duplicates: bool,
}

status_command! {
    /// Start the receiver test
    receiver_test,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_RECEIVER_TEST,
    frequency: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::MockFirmware;

    #[test]
    fn scan_commands() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        let params = set_scan_parameters::ScanningParameters {
            scan_type: set_scan_parameters::LEScanType::ActiveScanning,
            scan_interval: 0x4000,
            scan_window: 0x4000,
            ..Default::default()
        };

        set_scan_parameters::send(&mut hci, params).unwrap();
        set_scan_enable::send(&mut hci, true, false).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].parameters(), &[0x01, 0x00, 0x40, 0x00, 0x40, 0x00, 0x00]);
        assert_eq!(commands[1].opcode(), set_scan_enable::OPCODE);
        assert_eq!(commands[1].parameters(), &[0x01, 0x00]);
    }
}
