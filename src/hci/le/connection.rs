//! LE connection commands
//!
//! Connections are normally made through the GAP procedures of the BlueNRG-MS (see
//! [`aci::gap`](crate::aci::gap)). These are the standard HCI commands for doing it directly.

pub mod create_connection {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_CREATE_CONN);

    /// Connection parameters
    ///
    /// The connection intervals are in units of 1.25 ms and the supervision timeout is in units
    /// of 10 ms.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ConnectionParameters {
        pub scan_interval: u16,
        pub scan_window: u16,
        pub initiator_filter_policy: u8,
        pub peer_address_type: u8,
        pub peer_address: [u8; 6],
        pub own_address_type: u8,
        pub connection_interval_min: u16,
        pub connection_interval_max: u16,
        pub connection_latency: u16,
        pub supervision_timeout: u16,
        pub minimum_ce_length: u16,
        pub maximum_ce_length: u16,
    }

    impl ConnectionParameters {
        /// Parameters for connecting to a peer with the defaults used by the BlueNRG-MS examples
        pub fn new(peer_address_type: u8, peer_address: [u8; 6]) -> Self {
            ConnectionParameters {
                scan_interval: 0x4000,
                scan_window: 0x4000,
                initiator_filter_policy: 0,
                peer_address_type,
                peer_address,
                own_address_type: 0,
                connection_interval_min: 0x0028,
                connection_interval_max: 0x0038,
                connection_latency: 0,
                supervision_timeout: 0x01F4,
                minimum_ce_length: 0,
                maximum_ce_length: 0x03E8,
            }
        }

        pub(crate) fn values(&self) -> [Value; 12] {
            [
                Value::from(self.scan_interval),
                Value::from(self.scan_window),
                Value::from(self.initiator_filter_policy),
                Value::from(self.peer_address_type),
                Value::from(self.peer_address),
                Value::from(self.own_address_type),
                Value::from(self.connection_interval_min),
                Value::from(self.connection_interval_max),
                Value::from(self.connection_latency),
                Value::from(self.supervision_timeout),
                Value::from(self.minimum_ce_length),
                Value::from(self.maximum_ce_length),
            ]
        }
    }

    /// Start creating a connection
    ///
    /// This returns once the controller accepted the command. The connection itself is reported
    /// by an *LE Connection Complete* event.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: ConnectionParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

status_command! {
    create_connection_cancel,
    crate::hci::schema::base::OGF_LE_CTL,
    crate::hci::schema::base::ocf::LE_CREATE_CONN_CANCEL,
}

pub mod connection_update {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_CONN_UPDATE);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ConnectionUpdate {
        pub connection_handle: u16,
        pub connection_interval_min: u16,
        pub connection_interval_max: u16,
        pub connection_latency: u16,
        pub supervision_timeout: u16,
        pub minimum_ce_length: u16,
        pub maximum_ce_length: u16,
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, update: ConnectionUpdate) -> Result<(), Error> {
        let values = [
            Value::from(update.connection_handle),
            Value::from(update.connection_interval_min),
            Value::from(update.connection_interval_max),
            Value::from(update.connection_latency),
            Value::from(update.supervision_timeout),
            Value::from(update.minimum_ce_length),
            Value::from(update.maximum_ce_length),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod set_host_channel_classification {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_SET_HOST_CHANNEL_CLASSIFICATION);

    /// The largest data channel
    pub const MAX_CHANNEL: usize = 36;

    /// Set the data channels the controller may use
    ///
    /// Channels above 36 are ignored.
    pub fn send<H, I>(hci: &mut HostInterface<H>, channels: I) -> Result<(), Error>
    where
        H: Hardware,
        I: IntoIterator<Item = usize>,
    {
        let mut map = vec![0u8; 5];

        for channel in channels.into_iter().filter(|c| *c <= MAX_CHANNEL) {
            map[channel / 8] |= 1 << (channel % 8);
        }

        hci.send_raw(OPCODE, map).map(|_| ())
    }
}

pub mod read_channel_map {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_READ_CHANNEL_MAP);

    const MAP: Field = Field::bytes("map", 3, 5);

    /// Read the data channels used by a connection
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, connection_handle: u16) -> Result<Vec<usize>, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(connection_handle)])?;

        let map = response.reader()?.bytes(&MAP)?;

        Ok((0..=super::set_host_channel_classification::MAX_CHANNEL)
            .filter(|c| map[c / 8] & (1 << (c % 8)) != 0)
            .collect())
    }
}

pub mod read_remote_features {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_READ_REMOTE_USED_FEATURES);

    const FEATURES: Field = Field::bytes("features", 3, 8);

    /// Read the LE features of the peer
    ///
    /// This waits for the *LE Read Remote Used Features Complete* event.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, connection_handle: u16) -> Result<u64, Error> {
        let response = hci.send_values(OPCODE, &[Value::from(connection_handle)])?;

        let b = response.reader()?.bytes(&FEATURES)?;

        Ok(<u64>::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::base::events;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn channel_maps() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        set_host_channel_classification::send(&mut hci, vec![0, 9, 36, 37]).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x01, 0x02, 0x00, 0x00, 0x10]);

        firmware.respond_with(|command| {
            Some(vec![mock::command_complete(
                command.opcode(),
                &[0x00, 0x01, 0x08, 0x01, 0x02, 0x00, 0x00, 0x10],
            )])
        });

        assert_eq!(read_channel_map::send(&mut hci, 0x0801).unwrap(), vec![0, 9, 36]);
    }

    #[test]
    fn remote_features_wait_for_meta_event() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            Some(vec![
                mock::command_status(0x00, command.opcode()),
                mock::le_meta_event(
                    events::LE_READ_REMOTE_USED_FEATURES_COMPLETE,
                    &[0x00, 0x01, 0x08, 0x01, 0, 0, 0, 0, 0, 0, 0],
                ),
            ])
        });

        assert_eq!(read_remote_features::send(&mut hci, 0x0801).unwrap(), 1);
    }

    #[test]
    fn create_connection_layout() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        let params = create_connection::ConnectionParameters::new(0, [1, 2, 3, 4, 5, 6]);

        create_connection::send(&mut hci, params).unwrap();

        let commands = firmware.commands();

        assert_eq!(commands[0].parameters().len(), 25);
        assert_eq!(&commands[0].parameters()[6..12], &[1, 2, 3, 4, 5, 6]);
    }
}
