//! Standard HCI tables
//!
//! The subset of the Bluetooth v4.1 HCI commands and events a BlueNRG-MS controller supports.
//! Fields that are read on hot paths have named [`Field`] constants, the tables are built from
//! those same constants.

use super::Width::*;
use super::{
    CommandDescriptor as Cmd, Completion, EventDescriptor as Evt, Extension, Field, GroupDescriptor, Layout, Params,
    SubCodeWidth, SubEvents,
};

pub const OGF_LINK_CTL: u16 = 0x01;
pub const OGF_HOST_CTL: u16 = 0x03;
pub const OGF_INFO_PARAM: u16 = 0x04;
pub const OGF_STATUS_PARAM: u16 = 0x05;
pub const OGF_LE_CTL: u16 = 0x08;

pub mod ocf {
    pub const DISCONNECT: u16 = 0x0006;

    pub const RESET: u16 = 0x0003;
    pub const READ_TRANSMIT_POWER_LEVEL: u16 = 0x002D;
    pub const SET_CONTROLLER_TO_HOST_FC: u16 = 0x0031;

    pub const READ_LOCAL_VERSION: u16 = 0x0001;
    pub const READ_BD_ADDR: u16 = 0x0009;

    pub const READ_RSSI: u16 = 0x0005;

    pub const LE_SET_EVENT_MASK: u16 = 0x0001;
    pub const LE_READ_BUFFER_SIZE: u16 = 0x0002;
    pub const LE_READ_LOCAL_SUPPORTED_FEATURES: u16 = 0x0003;
    pub const LE_SET_RANDOM_ADDRESS: u16 = 0x0005;
    pub const LE_SET_ADV_PARAMETERS: u16 = 0x0006;
    pub const LE_READ_ADV_CHANNEL_TX_POWER: u16 = 0x0007;
    pub const LE_SET_ADV_DATA: u16 = 0x0008;
    pub const LE_SET_SCAN_RESPONSE_DATA: u16 = 0x0009;
    pub const LE_SET_ADVERTISE_ENABLE: u16 = 0x000A;
    pub const LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
    pub const LE_SET_SCAN_ENABLE: u16 = 0x000C;
    pub const LE_CREATE_CONN: u16 = 0x000D;
    pub const LE_CREATE_CONN_CANCEL: u16 = 0x000E;
    pub const LE_READ_WHITE_LIST_SIZE: u16 = 0x000F;
    pub const LE_CLEAR_WHITE_LIST: u16 = 0x0010;
    pub const LE_ADD_DEVICE_TO_WHITE_LIST: u16 = 0x0011;
    pub const LE_REMOVE_DEVICE_FROM_WHITE_LIST: u16 = 0x0012;
    pub const LE_CONN_UPDATE: u16 = 0x0013;
    pub const LE_SET_HOST_CHANNEL_CLASSIFICATION: u16 = 0x0014;
    pub const LE_READ_CHANNEL_MAP: u16 = 0x0015;
    pub const LE_READ_REMOTE_USED_FEATURES: u16 = 0x0016;
    pub const LE_ENCRYPT: u16 = 0x0017;
    pub const LE_RAND: u16 = 0x0018;
    pub const LE_START_ENCRYPTION: u16 = 0x0019;
    pub const LE_LTK_REPLY: u16 = 0x001A;
    pub const LE_LTK_NEG_REPLY: u16 = 0x001B;
    pub const LE_READ_SUPPORTED_STATES: u16 = 0x001C;
    pub const LE_RECEIVER_TEST: u16 = 0x001D;
    pub const LE_TRANSMITTER_TEST: u16 = 0x001E;
    pub const LE_TEST_END: u16 = 0x001F;
}

pub mod events {
    pub const DISCONN_COMPLETE: u8 = 0x05;
    pub const ENCRYPT_CHANGE: u8 = 0x08;
    pub const READ_REMOTE_VERSION_COMPLETE: u8 = 0x0C;
    pub const CMD_COMPLETE: u8 = 0x0E;
    pub const CMD_STATUS: u8 = 0x0F;
    pub const HARDWARE_ERROR: u8 = 0x10;
    pub const NUM_COMP_PKTS: u8 = 0x13;
    pub const DATA_BUFFER_OVERFLOW: u8 = 0x1A;
    pub const ENCRYPTION_KEY_REFRESH_COMPLETE: u8 = 0x30;
    pub const LE_META_EVENT: u8 = 0x3E;
    pub const VENDOR: u8 = 0xFF;
    /// BR/EDR connection complete, never sent by an LE only controller
    pub const CONN_COMPLETE: u8 = 0x03;

    pub const LE_CONN_COMPLETE: u8 = 0x01;
    pub const LE_ADVERTISING_REPORT: u8 = 0x02;
    pub const LE_CONN_UPDATE_COMPLETE: u8 = 0x03;
    pub const LE_READ_REMOTE_USED_FEATURES_COMPLETE: u8 = 0x04;
    pub const LE_LTK_REQUEST: u8 = 0x05;
}

/// The response of commands that only return a status
pub const STATUS_ONLY: Params = Params::Fixed(Layout(&[STATUS]));

pub const STATUS: Field = Field::u8("status", 0);

/// Command Complete event
pub mod command_complete {
    use super::*;

    pub const NUM_HCI_COMMAND_PACKETS: Field = Field::u8("ncmd", 0);
    pub const OPCODE: Field = Field::u16("opcode", 1);
    pub const LAYOUT: Layout = Layout(&[NUM_HCI_COMMAND_PACKETS, OPCODE]);
}

/// Command Status event
pub mod command_status {
    use super::*;

    pub const STATUS: Field = Field::u8("status", 0);
    pub const NUM_HCI_COMMAND_PACKETS: Field = Field::u8("ncmd", 1);
    pub const OPCODE: Field = Field::u16("opcode", 2);
    pub const LAYOUT: Layout = Layout(&[STATUS, NUM_HCI_COMMAND_PACKETS, OPCODE]);
}

/// Hardware Error event
pub mod hardware_error {
    use super::*;

    pub const CODE: Field = Field::u8("code", 0);
    pub const LAYOUT: Layout = Layout(&[CODE]);
}

/// Disconnection Complete event
pub mod disconnection_complete {
    use super::*;

    pub const STATUS: Field = Field::u8("status", 0);
    pub const HANDLE: Field = Field::u16("handle", 1);
    pub const REASON: Field = Field::u8("reason", 3);
    pub const LAYOUT: Layout = Layout(&[STATUS, HANDLE, REASON]);
}

/// LE Connection Complete sub event
pub mod le_connection_complete {
    use super::*;

    pub const STATUS: Field = Field::u8("status", 0);
    pub const HANDLE: Field = Field::u16("handle", 1);
    pub const ROLE: Field = Field::u8("role", 3);
    pub const PEER_ADDRESS_TYPE: Field = Field::u8("peer_bdaddr_type", 4);
    pub const PEER_ADDRESS: Field = Field::bytes("peer_bdaddr", 5, 6);
    pub const INTERVAL: Field = Field::u16("interval", 11);
    pub const LATENCY: Field = Field::u16("latency", 13);
    pub const SUPERVISION_TIMEOUT: Field = Field::u16("supervision_timeout", 15);
    pub const MASTER_CLOCK_ACCURACY: Field = Field::u8("master_clock_accuracy", 17);
    pub const LAYOUT: Layout = Layout(&[
        STATUS,
        HANDLE,
        ROLE,
        PEER_ADDRESS_TYPE,
        PEER_ADDRESS,
        INTERVAL,
        LATENCY,
        SUPERVISION_TIMEOUT,
        MASTER_CLOCK_ACCURACY,
    ]);
}

/// One report of an LE Advertising Report
///
/// The offsets are relative to the report, after the leading number of reports. The GAP device
/// found vendor event uses the same layout.
pub mod advertising_report {
    use super::*;

    pub const NUM_REPORTS: Field = Field::u8("num_reports", 0);
    pub const EVENT_TYPE: Field = Field::u8("evt_type", 0);
    pub const ADDRESS_TYPE: Field = Field::u8("bdaddr_type", 1);
    pub const ADDRESS: Field = Field::bytes("bdaddr", 2, 6);
    pub const DATA_LENGTH: Field = Field::u8("data_length", 8);
    /// The data followed by the RSSI
    pub const DATA_RSSI: Field = Field::tail("data_rssi", 9);
    pub const LAYOUT: Layout = Layout(&[EVENT_TYPE, ADDRESS_TYPE, ADDRESS, DATA_LENGTH, DATA_RSSI]);
}

/// Read Local Version Information response
pub mod read_local_version {
    use super::*;

    pub const HCI_VERSION: Field = Field::u8("hci_version", 1);
    pub const HCI_REVISION: Field = Field::u16("hci_revision", 2);
    pub const LMP_PAL_VERSION: Field = Field::u8("lmp_pal_version", 4);
    pub const MANUFACTURER_NAME: Field = Field::u16("manufacturer_name", 5);
    pub const LMP_PAL_SUBVERSION: Field = Field::u16("lmp_pal_subversion", 7);
    pub const LAYOUT: Layout = Layout(&[
        STATUS,
        HCI_VERSION,
        HCI_REVISION,
        LMP_PAL_VERSION,
        MANUFACTURER_NAME,
        LMP_PAL_SUBVERSION,
    ]);
}

const LINK_CTL: &[Cmd] = &[Cmd::new(
    ocf::DISCONNECT,
    "DISCONNECT",
    Params::Fixed(layout![handle @ 0: U16, reason @ 2: U8]),
    STATUS_ONLY,
)
.completed_by(Completion::CommandStatus)];

const HOST_CTL: &[Cmd] = &[
    Cmd::new(ocf::RESET, "RESET", Params::None, STATUS_ONLY),
    Cmd::new(
        ocf::READ_TRANSMIT_POWER_LEVEL,
        "READ_TRANSMIT_POWER_LEVEL",
        Params::Fixed(layout![handle @ 0: U16, level_type @ 2: U8]),
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16, level @ 3: I8]),
    ),
    Cmd::new(
        ocf::SET_CONTROLLER_TO_HOST_FC,
        "SET_CONTROLLER_TO_HOST_FC",
        Params::Fixed(layout![flow_control_enable @ 0: U8]),
        STATUS_ONLY,
    ),
];

const INFO_PARAM: &[Cmd] = &[
    Cmd::new(
        ocf::READ_LOCAL_VERSION,
        "READ_LOCAL_VERSION",
        Params::None,
        Params::Fixed(read_local_version::LAYOUT),
    ),
    Cmd::new(
        ocf::READ_BD_ADDR,
        "READ_BD_ADDR",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, bdaddr @ 1: Bytes(6)]),
    ),
];

const STATUS_PARAM: &[Cmd] = &[Cmd::new(
    ocf::READ_RSSI,
    "READ_RSSI",
    Params::Fixed(layout![handle @ 0: U16]),
    Params::Fixed(layout![status @ 0: U8, handle @ 1: U16, rssi @ 3: I8]),
)];

const CONNECTION_REQUEST: Layout = layout![
    interval @ 0: U16,
    window @ 2: U16,
    initiator_filter @ 4: U8,
    peer_bdaddr_type @ 5: U8,
    peer_bdaddr @ 6: Bytes(6),
    own_bdaddr_type @ 12: U8,
    min_interval @ 13: U16,
    max_interval @ 15: U16,
    latency @ 17: U16,
    supervision_timeout @ 19: U16,
    min_ce_length @ 21: U16,
    max_ce_length @ 23: U16,
];

const LE_CTL: &[Cmd] = &[
    Cmd::new(
        ocf::LE_SET_EVENT_MASK,
        "LE_SET_EVENT_MASK",
        Params::Fixed(layout![mask @ 0: Bytes(8)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_READ_BUFFER_SIZE,
        "LE_READ_BUFFER_SIZE",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, pkt_len @ 1: U16, max_pkt @ 3: U8]),
    ),
    Cmd::new(
        ocf::LE_READ_LOCAL_SUPPORTED_FEATURES,
        "LE_READ_LOCAL_SUPPORTED_FEATURES",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, features @ 1: Bytes(8)]),
    ),
    Cmd::new(
        ocf::LE_SET_RANDOM_ADDRESS,
        "LE_SET_RANDOM_ADDRESS",
        Params::Fixed(layout![bdaddr @ 0: Bytes(6)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_SET_ADV_PARAMETERS,
        "LE_SET_ADV_PARAMETERS",
        Params::Fixed(layout![
            min_interval @ 0: U16,
            max_interval @ 2: U16,
            advtype @ 4: U8,
            own_bdaddr_type @ 5: U8,
            direct_bdaddr_type @ 6: U8,
            direct_bdaddr @ 7: Bytes(6),
            chan_map @ 13: U8,
            filter @ 14: U8,
        ]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_READ_ADV_CHANNEL_TX_POWER,
        "LE_READ_ADV_CHANNEL_TX_POWER",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, level @ 1: I8]),
    ),
    Cmd::new(
        ocf::LE_SET_ADV_DATA,
        "LE_SET_ADV_DATA",
        Params::Fixed(layout![length @ 0: U8, data @ 1: Bytes(31)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_SET_SCAN_RESPONSE_DATA,
        "LE_SET_SCAN_RESPONSE_DATA",
        Params::Fixed(layout![length @ 0: U8, data @ 1: Bytes(31)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_SET_ADVERTISE_ENABLE,
        "LE_SET_ADVERTISE_ENABLE",
        Params::Fixed(layout![enable @ 0: U8]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_SET_SCAN_PARAMETERS,
        "LE_SET_SCAN_PARAMETERS",
        Params::Fixed(layout![
            scan_type @ 0: U8,
            interval @ 1: U16,
            window @ 3: U16,
            own_bdaddr_type @ 5: U8,
            filter @ 6: U8,
        ]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_SET_SCAN_ENABLE,
        "LE_SET_SCAN_ENABLE",
        Params::Fixed(layout![enable @ 0: U8, filter_dup @ 1: U8]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_CREATE_CONN,
        "LE_CREATE_CONN",
        Params::Fixed(CONNECTION_REQUEST),
        STATUS_ONLY,
    )
    .completed_by(Completion::CommandStatus),
    Cmd::new(ocf::LE_CREATE_CONN_CANCEL, "LE_CREATE_CONN_CANCEL", Params::None, STATUS_ONLY),
    Cmd::new(
        ocf::LE_READ_WHITE_LIST_SIZE,
        "LE_READ_WHITE_LIST_SIZE",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, size @ 1: U8]),
    ),
    Cmd::new(ocf::LE_CLEAR_WHITE_LIST, "LE_CLEAR_WHITE_LIST", Params::None, STATUS_ONLY),
    Cmd::new(
        ocf::LE_ADD_DEVICE_TO_WHITE_LIST,
        "LE_ADD_DEVICE_TO_WHITE_LIST",
        Params::Fixed(layout![bdaddr_type @ 0: U8, bdaddr @ 1: Bytes(6)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_REMOVE_DEVICE_FROM_WHITE_LIST,
        "LE_REMOVE_DEVICE_FROM_WHITE_LIST",
        Params::Fixed(layout![bdaddr_type @ 0: U8, bdaddr @ 1: Bytes(6)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_CONN_UPDATE,
        "LE_CONN_UPDATE",
        Params::Fixed(layout![
            handle @ 0: U16,
            min_interval @ 2: U16,
            max_interval @ 4: U16,
            latency @ 6: U16,
            supervision_timeout @ 8: U16,
            min_ce_length @ 10: U16,
            max_ce_length @ 12: U16,
        ]),
        STATUS_ONLY,
    )
    .completed_by(Completion::CommandStatus),
    Cmd::new(
        ocf::LE_SET_HOST_CHANNEL_CLASSIFICATION,
        "LE_SET_HOST_CHANNEL_CLASSIFICATION",
        Params::Fixed(layout![map @ 0: Bytes(5)]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_READ_CHANNEL_MAP,
        "LE_READ_CHANNEL_MAP",
        Params::Fixed(layout![handle @ 0: U16]),
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16, map @ 3: Bytes(5)]),
    ),
    Cmd::new(
        ocf::LE_READ_REMOTE_USED_FEATURES,
        "LE_READ_REMOTE_USED_FEATURES",
        Params::Fixed(layout![handle @ 0: U16]),
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16, features @ 3: Bytes(8)]),
    )
    .completed_by(Completion::LeMeta(events::LE_READ_REMOTE_USED_FEATURES_COMPLETE)),
    Cmd::new(
        ocf::LE_ENCRYPT,
        "LE_ENCRYPT",
        Params::Fixed(layout![key @ 0: Bytes(16), plaintext @ 16: Bytes(16)]),
        Params::Fixed(layout![status @ 0: U8, encdata @ 1: Bytes(16)]),
    ),
    Cmd::new(
        ocf::LE_RAND,
        "LE_RAND",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, random @ 1: Bytes(8)]),
    ),
    Cmd::new(
        ocf::LE_START_ENCRYPTION,
        "LE_START_ENCRYPTION",
        Params::Fixed(layout![
            handle @ 0: U16,
            random @ 2: Bytes(8),
            diversifier @ 10: U16,
            key @ 12: Bytes(16),
        ]),
        STATUS_ONLY,
    )
    .completed_by(Completion::CommandStatus),
    Cmd::new(
        ocf::LE_LTK_REPLY,
        "LE_LTK_REPLY",
        Params::Fixed(layout![handle @ 0: U16, key @ 2: Bytes(16)]),
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16]),
    ),
    Cmd::new(
        ocf::LE_LTK_NEG_REPLY,
        "LE_LTK_NEG_REPLY",
        Params::Fixed(layout![handle @ 0: U16]),
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16]),
    ),
    Cmd::new(
        ocf::LE_READ_SUPPORTED_STATES,
        "LE_READ_SUPPORTED_STATES",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, states @ 1: Bytes(8)]),
    ),
    Cmd::new(
        ocf::LE_RECEIVER_TEST,
        "LE_RECEIVER_TEST",
        Params::Fixed(layout![frequency @ 0: U8]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_TRANSMITTER_TEST,
        "LE_TRANSMITTER_TEST",
        Params::Fixed(layout![frequency @ 0: U8, length @ 1: U8, payload @ 2: U8]),
        STATUS_ONLY,
    ),
    Cmd::new(
        ocf::LE_TEST_END,
        "LE_TEST_END",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, num_pkts @ 1: U16]),
    ),
];

const GROUPS: &[GroupDescriptor] = &[
    GroupDescriptor {
        ogf: OGF_LINK_CTL,
        name: "LINK_CTL",
        commands: LINK_CTL,
    },
    GroupDescriptor {
        ogf: OGF_HOST_CTL,
        name: "HOST_CTL",
        commands: HOST_CTL,
    },
    GroupDescriptor {
        ogf: OGF_INFO_PARAM,
        name: "INFO_PARAM",
        commands: INFO_PARAM,
    },
    GroupDescriptor {
        ogf: OGF_STATUS_PARAM,
        name: "STATUS_PARAM",
        commands: STATUS_PARAM,
    },
    GroupDescriptor {
        ogf: OGF_LE_CTL,
        name: "LE_CTL",
        commands: LE_CTL,
    },
];

const EVENTS: &[Evt] = &[
    Evt::new(
        events::CONN_COMPLETE as u16,
        "CONN_COMPLETE",
        Params::Fixed(layout![
            status @ 0: U8,
            handle @ 1: U16,
            bdaddr @ 3: Bytes(6),
            link_type @ 9: U8,
            encr_mode @ 10: U8,
        ]),
    ),
    Evt::new(
        events::DISCONN_COMPLETE as u16,
        "DISCONN_COMPLETE",
        Params::Fixed(disconnection_complete::LAYOUT),
    ),
    Evt::new(
        events::ENCRYPT_CHANGE as u16,
        "ENCRYPT_CHANGE",
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16, encrypt @ 3: U8]),
    ),
    Evt::new(
        events::READ_REMOTE_VERSION_COMPLETE as u16,
        "READ_REMOTE_VERSION_COMPLETE",
        Params::Fixed(layout![
            status @ 0: U8,
            handle @ 1: U16,
            lmp_version @ 3: U8,
            manufacturer_name @ 4: U16,
            lmp_subversion @ 6: U16,
        ]),
    ),
    Evt::new(
        events::CMD_COMPLETE as u16,
        "CMD_COMPLETE",
        Params::Fixed(command_complete::LAYOUT),
    ),
    Evt::new(
        events::CMD_STATUS as u16,
        "CMD_STATUS",
        Params::Fixed(command_status::LAYOUT),
    ),
    Evt::new(
        events::HARDWARE_ERROR as u16,
        "HARDWARE_ERROR",
        Params::Fixed(hardware_error::LAYOUT),
    ),
    Evt::new(
        events::NUM_COMP_PKTS as u16,
        "NUM_COMP_PKTS",
        Params::Fixed(layout![num_hndl @ 0: U8, handle_count_pairs @ 1: Tail]),
    ),
    Evt::new(
        events::DATA_BUFFER_OVERFLOW as u16,
        "DATA_BUFFER_OVERFLOW",
        Params::Fixed(layout![link_type @ 0: U8]),
    ),
    Evt::new(
        events::ENCRYPTION_KEY_REFRESH_COMPLETE as u16,
        "ENCRYPTION_KEY_REFRESH_COMPLETE",
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16]),
    ),
    Evt::new(events::LE_META_EVENT as u16, "LE_META_EVENT", Params::Variable).with_sub_events(SubCodeWidth::U8),
    Evt::new(events::VENDOR as u16, "VENDOR", Params::Variable).with_sub_events(SubCodeWidth::U16),
];

const LE_META_EVENTS: &[Evt] = &[
    Evt::new(
        events::LE_CONN_COMPLETE as u16,
        "LE_CONN_COMPLETE",
        Params::Fixed(le_connection_complete::LAYOUT),
    ),
    Evt::new(
        events::LE_ADVERTISING_REPORT as u16,
        "LE_ADVERTISING_REPORT",
        Params::Fixed(layout![num_reports @ 0: U8, reports @ 1: Tail]),
    ),
    Evt::new(
        events::LE_CONN_UPDATE_COMPLETE as u16,
        "LE_CONN_UPDATE_COMPLETE",
        Params::Fixed(layout![
            status @ 0: U8,
            handle @ 1: U16,
            interval @ 3: U16,
            latency @ 5: U16,
            supervision_timeout @ 7: U16,
        ]),
    ),
    Evt::new(
        events::LE_READ_REMOTE_USED_FEATURES_COMPLETE as u16,
        "LE_READ_REMOTE_USED_FEATURES_COMPLETE",
        Params::Fixed(layout![status @ 0: U8, handle @ 1: U16, features @ 3: Bytes(8)]),
    ),
    Evt::new(
        events::LE_LTK_REQUEST as u16,
        "LE_LTK_REQUEST",
        Params::Fixed(layout![handle @ 0: U16, random @ 2: Bytes(8), ediv @ 10: U16]),
    ),
];

/// The standard HCI extension
pub static BASE: Extension = Extension {
    name: "HCI",
    groups: GROUPS,
    events: EVENTS,
    sub_events: &[SubEvents {
        parent: events::LE_META_EVENT,
        events: LE_META_EVENTS,
    }],
};

#[cfg(test)]
mod tests {
    use super::super::*;
    use super::*;
    use crate::hci::OpCode;

    #[test]
    fn named_fields_match_tables() {
        let registry = Registry::bluenrg_ms(Variant::default());

        let conn = registry
            .sub_event(events::LE_META_EVENT, events::LE_CONN_COMPLETE as u16)
            .unwrap();

        assert_eq!(conn.params.layout().unwrap().min_len(), 18);

        let version = registry
            .command(OpCode::new(OGF_INFO_PARAM, ocf::READ_LOCAL_VERSION))
            .unwrap();

        assert!(version.response_has_status);
        assert_eq!(version.response.layout().unwrap().min_len(), 9);
    }

    #[test]
    fn completions() {
        let registry = Registry::bluenrg_ms(Variant::default());

        let disconnect = registry.command(OpCode::new(OGF_LINK_CTL, ocf::DISCONNECT)).unwrap();

        assert_eq!(disconnect.completion, Completion::CommandStatus);

        let reset = registry.command(OpCode::new(OGF_HOST_CTL, ocf::RESET)).unwrap();

        assert_eq!(reset.completion, Completion::CommandComplete);
    }
}
