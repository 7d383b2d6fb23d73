//! Advertising and transmitter commands

pub mod read_advertising_channel_tx_power {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_READ_ADV_CHANNEL_TX_POWER);

    const LEVEL: Field = Field::i8("level", 1);

    /// Read the transmit power level (in dBm) used for advertising
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<i8, Error> {
        Ok(hci.send_raw(OPCODE, Vec::new())?.reader()?.i8(&LEVEL)?)
    }
}

pub mod set_advertising_parameters {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_SET_ADV_PARAMETERS);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum AdvertisingType {
        ConnectableAndScannableUndirected,
        ConnectableHighDutyCycleDirected,
        ScannableUndirected,
        NonConnectableUndirected,
        ConnectableLowDutyCycleDirected,
    }

    impl AdvertisingType {
        fn val(&self) -> u8 {
            match self {
                AdvertisingType::ConnectableAndScannableUndirected => 0x00,
                AdvertisingType::ConnectableHighDutyCycleDirected => 0x01,
                AdvertisingType::ScannableUndirected => 0x02,
                AdvertisingType::NonConnectableUndirected => 0x03,
                AdvertisingType::ConnectableLowDutyCycleDirected => 0x04,
            }
        }
    }

    /// Advertising parameters
    ///
    /// Intervals are in units of 0.625 ms. The channel map is a bit field of channels 37, 38 and
    /// 39 (in that order from bit 0).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AdvertisingParameters {
        pub minimum_advertising_interval: u16,
        pub maximum_advertising_interval: u16,
        pub advertising_type: AdvertisingType,
        pub own_address_type: u8,
        pub peer_address_type: u8,
        pub peer_address: [u8; 6],
        pub advertising_channel_map: u8,
        pub advertising_filter_policy: u8,
    }

    impl Default for AdvertisingParameters {
        fn default() -> Self {
            AdvertisingParameters {
                minimum_advertising_interval: 0x0800,
                maximum_advertising_interval: 0x0800,
                advertising_type: AdvertisingType::ConnectableAndScannableUndirected,
                own_address_type: 0,
                peer_address_type: 0,
                peer_address: [0; 6],
                advertising_channel_map: 0x07,
                advertising_filter_policy: 0,
            }
        }
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, params: AdvertisingParameters) -> Result<(), Error> {
        let values = [
            Value::from(params.minimum_advertising_interval),
            Value::from(params.maximum_advertising_interval),
            Value::from(params.advertising_type.val()),
            Value::from(params.own_address_type),
            Value::from(params.peer_address_type),
            Value::from(params.peer_address),
            Value::from(params.advertising_channel_map),
            Value::from(params.advertising_filter_policy),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

/// Set advertising or scan response data
///
/// Both commands take up to 31 bytes of data, anything longer is rejected before it is sent.
macro_rules! data_command {
    ($name:ident, $ocf:expr) => {
        pub mod $name {
            use crate::hci::engine::{Error, HostInterface};
            use crate::hci::schema::base::{ocf, OGF_LE_CTL};
            use crate::hci::schema::Value;
            use crate::hci::OpCode;
            use crate::hci_transport::Hardware;

            pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, $ocf);

            pub const MAX_DATA_LEN: usize = 31;

            pub fn send<H: Hardware>(hci: &mut HostInterface<H>, data: &[u8]) -> Result<(), Error> {
                let values = [Value::U8(data.len().min(MAX_DATA_LEN) as u8), Value::from(data)];

                hci.send_values(OPCODE, &values).map(|_| ())
            }
        }
    };
}

data_command!(set_advertising_data, ocf::LE_SET_ADV_DATA);

data_command!(set_scan_response_data, ocf::LE_SET_SCAN_RESPONSE_DATA);

status_command! {
    /// Enable or disable advertising
    set_advertising_enable,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_SET_ADVERTISE_ENABLE,
    enable: bool,
}

status_command! {
    set_random_address,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_SET_RANDOM_ADDRESS,
    address: [u8; 6],
}

status_command! {
    /// Start the transmitter test
    ///
    /// `frequency` is `(F - 2402) / 2` where F is the channel frequency in MHz.
    transmitter_test,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_TRANSMITTER_TEST,
    frequency: u8,
    length_of_test_data: u8,
    packet_payload: u8,
}
