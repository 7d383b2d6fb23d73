//! BlueNRG-MS ACI tables
//!
//! All vendor commands share the opcode group `0x3F`. The ocf constants are grouped by the ACI
//! layer they belong to. Vendor events are sub events of the HCI vendor event (`0xFF`), their
//! sub event codes are 16 bits wide.

use super::base::{advertising_report, STATUS, STATUS_ONLY};
use super::Width::*;
use super::{
    CommandDescriptor as Cmd, Completion, EventDescriptor as Evt, Extension, Field, GroupDescriptor, Layout, Params,
    SubEvents, Variant,
};

pub const OGF_VENDOR: u16 = 0x3F;

pub mod hal {
    pub const GET_FW_BUILD_NUMBER: u16 = 0x0000;
    pub const WRITE_CONFIG_DATA: u16 = 0x000C;
    pub const READ_CONFIG_DATA: u16 = 0x000D;
    pub const SET_TX_POWER_LEVEL: u16 = 0x000F;
    pub const DEVICE_STANDBY: u16 = 0x0013;
    pub const LE_TX_TEST_PACKET_NUMBER: u16 = 0x0014;
    pub const TONE_START: u16 = 0x0015;
    pub const TONE_STOP: u16 = 0x0016;
    pub const GET_LINK_STATUS: u16 = 0x0017;
    pub const GET_ANCHOR_PERIOD: u16 = 0x0019;
}

pub mod updater {
    pub const START: u16 = 0x0020;
    pub const REBOOT: u16 = 0x0021;
    pub const GET_VERSION: u16 = 0x0022;
    pub const GET_BUFSIZE: u16 = 0x0023;
    pub const ERASE_BLUE_FLAG: u16 = 0x0024;
    pub const RESET_BLUE_FLAG: u16 = 0x0025;
    pub const ERASE_SECTOR: u16 = 0x0026;
    pub const PROG_DATA_BLOCK: u16 = 0x0027;
    pub const READ_DATA_BLOCK: u16 = 0x0028;
    pub const CALC_CRC: u16 = 0x0029;
    pub const HW_VERSION: u16 = 0x002A;
}

pub mod gap {
    pub const SET_NON_DISCOVERABLE: u16 = 0x0081;
    pub const SET_LIMITED_DISCOVERABLE: u16 = 0x0082;
    pub const SET_DISCOVERABLE: u16 = 0x0083;
    pub const SET_DIRECT_CONNECTABLE: u16 = 0x0084;
    pub const SET_IO_CAPABILITY: u16 = 0x0085;
    pub const SET_AUTH_REQUIREMENT: u16 = 0x0086;
    pub const SET_AUTHOR_REQUIREMENT: u16 = 0x0087;
    pub const PASSKEY_RESPONSE: u16 = 0x0088;
    pub const AUTHORIZATION_RESPONSE: u16 = 0x0089;
    pub const INIT: u16 = 0x008A;
    pub const SET_NON_CONNECTABLE: u16 = 0x008B;
    pub const SET_UNDIRECTED_CONNECTABLE: u16 = 0x008C;
    pub const SLAVE_SECURITY_REQUEST: u16 = 0x008D;
    pub const UPDATE_ADV_DATA: u16 = 0x008E;
    pub const DELETE_AD_TYPE: u16 = 0x008F;
    pub const GET_SECURITY_LEVEL: u16 = 0x0090;
    pub const SET_EVT_MASK: u16 = 0x0091;
    pub const CONFIGURE_WHITELIST: u16 = 0x0092;
    pub const TERMINATE: u16 = 0x0093;
    pub const CLEAR_SECURITY_DB: u16 = 0x0094;
    pub const ALLOW_REBOND: u16 = 0x0095;
    pub const START_LIMITED_DISCOVERY_PROC: u16 = 0x0096;
    pub const START_GENERAL_DISCOVERY_PROC: u16 = 0x0097;
    pub const START_NAME_DISCOVERY_PROC: u16 = 0x0098;
    pub const START_AUTO_CONN_ESTABLISH_PROC: u16 = 0x0099;
    pub const START_GENERAL_CONN_ESTABLISH_PROC: u16 = 0x009A;
    pub const START_SELECTIVE_CONN_ESTABLISH_PROC: u16 = 0x009B;
    pub const CREATE_CONNECTION: u16 = 0x009C;
    pub const TERMINATE_GAP_PROCEDURE: u16 = 0x009D;
    pub const START_CONNECTION_UPDATE: u16 = 0x009E;
    pub const SEND_PAIRING_REQUEST: u16 = 0x009F;
    pub const RESOLVE_PRIVATE_ADDRESS: u16 = 0x00A0;
    pub const SET_BROADCAST_MODE: u16 = 0x00A1;
    pub const START_OBSERVATION_PROC: u16 = 0x00A2;
    pub const GET_BONDED_DEVICES: u16 = 0x00A3;
    pub const IS_DEVICE_BONDED: u16 = 0x00A4;
}

pub mod gatt {
    pub const INIT: u16 = 0x0101;
    pub const ADD_SERV: u16 = 0x0102;
    pub const INCLUDE_SERV: u16 = 0x0103;
    pub const ADD_CHAR: u16 = 0x0104;
    pub const ADD_CHAR_DESC: u16 = 0x0105;
    pub const UPD_CHAR_VAL: u16 = 0x0106;
    pub const DEL_CHAR: u16 = 0x0107;
    pub const DEL_SERV: u16 = 0x0108;
    pub const DEL_INC_SERV: u16 = 0x0109;
    pub const SET_EVT_MASK: u16 = 0x010A;
    pub const EXCHANGE_CONFIG: u16 = 0x010B;
    pub const ATT_FIND_INFO_REQ: u16 = 0x010C;
    pub const ATT_FIND_BY_TYPE_VALUE_REQ: u16 = 0x010D;
    pub const ATT_READ_BY_TYPE_REQ: u16 = 0x010E;
    pub const ATT_READ_BY_GROUP_TYPE_REQ: u16 = 0x010F;
    pub const ATT_PREPARE_WRITE_REQ: u16 = 0x0110;
    pub const ATT_EXECUTE_WRITE_REQ: u16 = 0x0111;
    pub const DISC_ALL_PRIM_SERVICES: u16 = 0x0112;
    pub const DISC_PRIM_SERVICE_BY_UUID: u16 = 0x0113;
    pub const FIND_INCLUDED_SERVICES: u16 = 0x0114;
    pub const DISC_ALL_CHARAC_OF_SERV: u16 = 0x0115;
    pub const DISC_CHARAC_BY_UUID: u16 = 0x0116;
    pub const DISC_ALL_CHARAC_DESCRIPTORS: u16 = 0x0117;
    pub const READ_CHARAC_VAL: u16 = 0x0118;
    pub const READ_USING_CHARAC_UUID: u16 = 0x0119;
    pub const READ_LONG_CHARAC_VAL: u16 = 0x011A;
    pub const READ_MULTIPLE_CHARAC_VAL: u16 = 0x011B;
    pub const WRITE_CHAR_VALUE: u16 = 0x011C;
    pub const WRITE_LONG_CHARAC_VAL: u16 = 0x011D;
    pub const WRITE_CHARAC_RELIABLE: u16 = 0x011E;
    pub const WRITE_LONG_CHARAC_DESC: u16 = 0x011F;
    pub const READ_LONG_CHARAC_DESC: u16 = 0x0120;
    pub const WRITE_CHAR_DESC: u16 = 0x0121;
    pub const READ_CHAR_DESC: u16 = 0x0122;
    pub const WRITE_WITHOUT_RESPONSE: u16 = 0x0123;
    pub const SIGNED_WRITE_WITHOUT_RESPONSE: u16 = 0x0124;
    pub const CONFIRM_INDICATION: u16 = 0x0125;
    pub const WRITE_RESPONSE: u16 = 0x0126;
    pub const ALLOW_READ: u16 = 0x0127;
    pub const SET_SECURITY_PERMISSION: u16 = 0x0128;
    pub const SET_DESC_VAL: u16 = 0x0129;
    pub const READ_HANDLE_VALUE: u16 = 0x012A;
    pub const READ_HANDLE_VALUE_OFFSET: u16 = 0x012B;
    pub const UPD_CHAR_VAL_EXT: u16 = 0x012C;
}

pub mod l2cap {
    pub const CONN_PARAM_UPDATE_REQ: u16 = 0x0181;
    pub const CONN_PARAM_UPDATE_RESP: u16 = 0x0182;
}

/// Vendor event sub codes
pub mod events {
    pub const HAL_INITIALIZED: u16 = 0x0001;
    pub const HAL_EVENTS_LOST: u16 = 0x0002;
    pub const HAL_CRASH_INFO: u16 = 0x0003;

    pub const GAP_LIMITED_DISCOVERABLE: u16 = 0x0400;
    pub const GAP_PAIRING_CMPLT: u16 = 0x0401;
    pub const GAP_PASS_KEY_REQUEST: u16 = 0x0402;
    pub const GAP_AUTHORIZATION_REQUEST: u16 = 0x0403;
    pub const GAP_SLAVE_SECURITY_INITIATED: u16 = 0x0404;
    pub const GAP_BOND_LOST: u16 = 0x0405;
    pub const GAP_DEVICE_FOUND: u16 = 0x0406;
    pub const GAP_PROCEDURE_COMPLETE: u16 = 0x0407;
    /// Address not resolved on IDB05A1, reconnection address on IDB04A1
    pub const GAP_ADDR_NOT_RESOLVED: u16 = 0x0408;

    pub const L2CAP_CONN_UPD_RESP: u16 = 0x0800;
    pub const L2CAP_PROCEDURE_TIMEOUT: u16 = 0x0801;
    pub const L2CAP_CONN_UPD_REQ: u16 = 0x0802;

    pub const GATT_ATTRIBUTE_MODIFIED: u16 = 0x0C01;
    pub const GATT_PROCEDURE_TIMEOUT: u16 = 0x0C02;
    pub const ATT_EXCHANGE_MTU_RESP: u16 = 0x0C03;
    pub const ATT_FIND_INFORMATION_RESP: u16 = 0x0C04;
    pub const ATT_FIND_BY_TYPE_VAL_RESP: u16 = 0x0C05;
    pub const ATT_READ_BY_TYPE_RESP: u16 = 0x0C06;
    pub const ATT_READ_RESP: u16 = 0x0C07;
    pub const ATT_READ_BLOB_RESP: u16 = 0x0C08;
    pub const ATT_READ_MULTIPLE_RESP: u16 = 0x0C09;
    pub const ATT_READ_BY_GROUP_TYPE_RESP: u16 = 0x0C0A;
    pub const ATT_PREPARE_WRITE_RESP: u16 = 0x0C0C;
    pub const ATT_EXEC_WRITE_RESP: u16 = 0x0C0D;
    pub const GATT_INDICATION: u16 = 0x0C0E;
    pub const GATT_NOTIFICATION: u16 = 0x0C0F;
    pub const GATT_PROCEDURE_COMPLETE: u16 = 0x0C10;
    pub const GATT_ERROR_RESP: u16 = 0x0C11;
    pub const GATT_DISC_READ_CHAR_BY_UUID_RESP: u16 = 0x0C12;
    pub const GATT_WRITE_PERMIT_REQ: u16 = 0x0C13;
    pub const GATT_READ_PERMIT_REQ: u16 = 0x0C14;
    pub const GATT_READ_MULTI_PERMIT_REQ: u16 = 0x0C15;
    pub const GATT_TX_POOL_AVAILABLE: u16 = 0x0C16;
    pub const GATT_SERVER_CONFIRMATION: u16 = 0x0C17;
    pub const GATT_PREPARE_WRITE_PERMIT_REQ: u16 = 0x0C18;
}

/// Response of the commands that return a new handle
pub mod handle_response {
    use super::*;

    pub const HANDLE: Field = Field::u16("handle", 1);
    pub const LAYOUT: Layout = Layout(&[STATUS, HANDLE]);
}

/// GAP init response
pub mod gap_init_response {
    use super::*;

    pub const SERVICE_HANDLE: Field = Field::u16("service_handle", 1);
    pub const DEV_NAME_CHAR_HANDLE: Field = Field::u16("dev_name_char_handle", 3);
    pub const APPEARANCE_CHAR_HANDLE: Field = Field::u16("appearance_char_handle", 5);
    pub const LAYOUT: Layout = Layout(&[STATUS, SERVICE_HANDLE, DEV_NAME_CHAR_HANDLE, APPEARANCE_CHAR_HANDLE]);
}

/// Read handle value response
pub mod read_handle_value_response {
    use super::*;

    pub const VALUE_LEN: Field = Field::u16("value_len", 1);
    pub const VALUE: Field = Field::tail("value", 3);
    pub const LAYOUT: Layout = Layout(&[STATUS, VALUE_LEN, VALUE]);
}

/// HAL initialized event
pub mod hal_initialized {
    use super::*;

    pub const REASON_CODE: Field = Field::u8("reason_code", 0);
    pub const LAYOUT: Layout = Layout(&[REASON_CODE]);
}

/// GATT attribute modified event
pub mod attribute_modified {
    use super::*;

    pub const CONN_HANDLE: Field = Field::u16("conn_handle", 0);
    pub const ATTR_HANDLE: Field = Field::u16("attr_handle", 2);
    pub const DATA_LENGTH: Field = Field::u8("data_length", 4);
    pub const OFFSET: Field = Field::u16("offset", 5);
    pub const DATA_IDB05A1: Field = Field::tail("att_data", 7);
    pub const DATA_IDB04A1: Field = Field::tail("att_data", 5);
    pub const IDB05A1: Layout = Layout(&[CONN_HANDLE, ATTR_HANDLE, DATA_LENGTH, OFFSET, DATA_IDB05A1]);
    pub const IDB04A1: Layout = Layout(&[CONN_HANDLE, ATTR_HANDLE, DATA_LENGTH, DATA_IDB04A1]);
}

/// GATT write permit request event
pub mod write_permit_request {
    use super::*;

    pub const CONN_HANDLE: Field = Field::u16("conn_handle", 0);
    pub const ATTR_HANDLE: Field = Field::u16("attr_handle", 2);
    pub const DATA_LENGTH: Field = Field::u8("data_length", 4);
    pub const DATA: Field = Field::tail("data", 5);
    pub const LAYOUT: Layout = Layout(&[CONN_HANDLE, ATTR_HANDLE, DATA_LENGTH, DATA]);
}

/// GATT read permit request event
pub mod read_permit_request {
    use super::*;

    pub const CONN_HANDLE: Field = Field::u16("conn_handle", 0);
    pub const ATTR_HANDLE: Field = Field::u16("attr_handle", 2);
    pub const DATA_LENGTH: Field = Field::u8("data_length", 4);
    pub const OFFSET: Field = Field::u16("offset", 5);
    pub const LAYOUT: Layout = Layout(&[CONN_HANDLE, ATTR_HANDLE, DATA_LENGTH, OFFSET]);
}

/// GAP procedure complete event
pub mod gap_procedure_complete {
    use super::*;

    pub const PROCEDURE_CODE: Field = Field::u8("procedure_code", 0);
    pub const STATUS: Field = Field::u8("status", 1);
    pub const DATA: Field = Field::tail("data", 2);
    pub const LAYOUT: Layout = Layout(&[PROCEDURE_CODE, STATUS, DATA]);
}

const CONNECTION_PROCEDURE: Layout = layout![
    scan_interval @ 0: U16,
    scan_window @ 2: U16,
    peer_bdaddr_type @ 4: U8,
    peer_bdaddr @ 5: Bytes(6),
    own_bdaddr_type @ 11: U8,
    min_conn_interval @ 12: U16,
    max_conn_interval @ 14: U16,
    conn_latency @ 16: U16,
    supervision_timeout @ 18: U16,
    min_conn_length @ 20: U16,
    max_conn_length @ 22: U16,
];

const DISCOVERY_PROCEDURE: Layout = layout![
    scan_interval @ 0: U16,
    scan_window @ 2: U16,
    own_bdaddr_type @ 4: U8,
    filter_duplicates @ 5: U8,
];

const HANDLE_RANGE: Layout = layout![conn_handle @ 0: U16, start_handle @ 2: U16, end_handle @ 4: U16];

const HANDLE_RANGE_UUID: Layout = layout![
    conn_handle @ 0: U16,
    start_handle @ 2: U16,
    end_handle @ 4: U16,
    uuid_type @ 6: U8,
    uuid @ 7: Tail,
];

const CONN_ATTR: Layout = layout![conn_handle @ 0: U16, attr_handle @ 2: U16];

const CONN_ATTR_OFFSET: Layout = layout![conn_handle @ 0: U16, attr_handle @ 2: U16, val_offset @ 4: U16];

const CONN_ATTR_VALUE: Layout = layout![
    conn_handle @ 0: U16,
    attr_handle @ 2: U16,
    val_len @ 4: U8,
    attr_val @ 5: Tail,
];

const CONN_ATTR_OFFSET_VALUE: Layout = layout![
    conn_handle @ 0: U16,
    attr_handle @ 2: U16,
    val_offset @ 4: U16,
    val_len @ 6: U8,
    attr_val @ 7: Tail,
];

const CONN: Layout = layout![conn_handle @ 0: U16];

const fn procedure(ocf: u16, name: &'static str, request: Params) -> Cmd {
    Cmd::new(ocf, name, request, STATUS_ONLY).completed_by(Completion::CommandStatus)
}

const fn simple(ocf: u16, name: &'static str, request: Params) -> Cmd {
    Cmd::new(ocf, name, request, STATUS_ONLY)
}

const HAL: &[Cmd] = &[
    Cmd::new(
        hal::GET_FW_BUILD_NUMBER,
        "HAL_GET_FW_BUILD_NUMBER",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, build_number @ 1: U16]),
    ),
    simple(
        hal::WRITE_CONFIG_DATA,
        "HAL_WRITE_CONFIG_DATA",
        Params::Fixed(layout![offset @ 0: U8, length @ 1: U8, value @ 2: Tail]),
    ),
    Cmd::new(
        hal::READ_CONFIG_DATA,
        "HAL_READ_CONFIG_DATA",
        Params::Fixed(layout![offset @ 0: U8]),
        Params::Fixed(layout![status @ 0: U8, data @ 1: Tail]),
    ),
    simple(
        hal::SET_TX_POWER_LEVEL,
        "HAL_SET_TX_POWER_LEVEL",
        Params::Fixed(layout![en_high_power @ 0: U8, pa_level @ 1: U8]),
    ),
    simple(hal::DEVICE_STANDBY, "HAL_DEVICE_STANDBY", Params::None),
    Cmd::new(
        hal::LE_TX_TEST_PACKET_NUMBER,
        "HAL_LE_TX_TEST_PACKET_NUMBER",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, number_of_packets @ 1: U32]),
    ),
    simple(hal::TONE_START, "HAL_TONE_START", Params::Fixed(layout![rf_channel @ 0: U8])),
    simple(hal::TONE_STOP, "HAL_TONE_STOP", Params::None),
    Cmd::new(
        hal::GET_LINK_STATUS,
        "HAL_GET_LINK_STATUS",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, link_status @ 1: Bytes(8), conn_handle @ 9: Bytes(16)]),
    ),
    Cmd::new(
        hal::GET_ANCHOR_PERIOD,
        "HAL_GET_ANCHOR_PERIOD",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, anchor_period @ 1: U32, max_free_slot @ 5: U32]),
    ),
];

const UPDATER: &[Cmd] = &[
    simple(updater::START, "UPDATER_START", Params::None),
    simple(updater::REBOOT, "UPDATER_REBOOT", Params::None),
    Cmd::new(
        updater::GET_VERSION,
        "GET_UPDATER_VERSION",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, version @ 1: U8]),
    ),
    Cmd::new(
        updater::GET_BUFSIZE,
        "GET_UPDATER_BUFSIZE",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, buffer_size @ 1: U8]),
    ),
    simple(updater::ERASE_BLUE_FLAG, "UPDATER_ERASE_BLUE_FLAG", Params::None),
    simple(updater::RESET_BLUE_FLAG, "UPDATER_RESET_BLUE_FLAG", Params::None),
    simple(
        updater::ERASE_SECTOR,
        "UPDATER_ERASE_SECTOR",
        Params::Fixed(layout![address @ 0: U32]),
    ),
    simple(
        updater::PROG_DATA_BLOCK,
        "UPDATER_PROG_DATA_BLOCK",
        Params::Fixed(layout![address @ 0: U32, data_len @ 4: U16, data @ 6: Tail]),
    ),
    Cmd::new(
        updater::READ_DATA_BLOCK,
        "UPDATER_READ_DATA_BLOCK",
        Params::Fixed(layout![address @ 0: U32, data_len @ 4: U16]),
        Params::Fixed(layout![status @ 0: U8, data @ 1: Tail]),
    ),
    Cmd::new(
        updater::CALC_CRC,
        "UPDATER_CALC_CRC",
        Params::Fixed(layout![address @ 0: U32, num_sectors @ 4: U8]),
        Params::Fixed(layout![status @ 0: U8, crc @ 1: U32]),
    ),
    Cmd::new(
        updater::HW_VERSION,
        "UPDATER_HW_VERSION",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, version @ 1: U8]),
    ),
];

const GAP: &[Cmd] = &[
    simple(gap::SET_NON_DISCOVERABLE, "GAP_SET_NON_DISCOVERABLE", Params::None),
    simple(gap::SET_LIMITED_DISCOVERABLE, "GAP_SET_LIMITED_DISCOVERABLE", Params::Variable),
    simple(gap::SET_DISCOVERABLE, "GAP_SET_DISCOVERABLE", Params::Variable),
    simple(
        gap::SET_DIRECT_CONNECTABLE,
        "GAP_SET_DIRECT_CONNECTABLE",
        Params::ByVariant(&[
            (
                Variant::Idb05a1,
                layout![
                    own_bdaddr_type @ 0: U8,
                    directed_adv_type @ 1: U8,
                    direct_bdaddr_type @ 2: U8,
                    direct_bdaddr @ 3: Bytes(6),
                    adv_interv_min @ 9: U16,
                    adv_interv_max @ 11: U16,
                ],
            ),
            (
                Variant::Idb04a1,
                layout![own_bdaddr_type @ 0: U8, direct_bdaddr_type @ 1: U8, direct_bdaddr @ 2: Bytes(6)],
            ),
        ]),
    ),
    simple(
        gap::SET_IO_CAPABILITY,
        "GAP_SET_IO_CAPABILITY",
        Params::Fixed(layout![io_capability @ 0: U8]),
    ),
    simple(
        gap::SET_AUTH_REQUIREMENT,
        "GAP_SET_AUTH_REQUIREMENT",
        Params::Fixed(layout![
            mitm_mode @ 0: U8,
            oob_enable @ 1: U8,
            oob_data @ 2: Bytes(16),
            min_encryption_key_size @ 18: U8,
            max_encryption_key_size @ 19: U8,
            use_fixed_pin @ 20: U8,
            fixed_pin @ 21: U32,
            bonding_mode @ 25: U8,
        ]),
    ),
    simple(
        gap::SET_AUTHOR_REQUIREMENT,
        "GAP_SET_AUTHOR_REQUIREMENT",
        Params::Fixed(layout![conn_handle @ 0: U16, authorization_enable @ 2: U8]),
    ),
    simple(
        gap::PASSKEY_RESPONSE,
        "GAP_PASSKEY_RESPONSE",
        Params::Fixed(layout![conn_handle @ 0: U16, passkey @ 2: U32]),
    ),
    simple(
        gap::AUTHORIZATION_RESPONSE,
        "GAP_AUTHORIZATION_RESPONSE",
        Params::Fixed(layout![conn_handle @ 0: U16, authorize @ 2: U8]),
    ),
    Cmd::new(
        gap::INIT,
        "GAP_INIT",
        Params::ByVariant(&[
            (
                Variant::Idb05a1,
                layout![role @ 0: U8, privacy_enabled @ 1: U8, device_name_char_len @ 2: U8],
            ),
            (Variant::Idb04a1, layout![role @ 0: U8]),
        ]),
        Params::Fixed(gap_init_response::LAYOUT),
    ),
    simple(
        gap::SET_NON_CONNECTABLE,
        "GAP_SET_NON_CONNECTABLE",
        Params::ByVariant(&[
            (Variant::Idb05a1, layout![adv_event_type @ 0: U8, own_address_type @ 1: U8]),
            (Variant::Idb04a1, layout![adv_event_type @ 0: U8]),
        ]),
    ),
    simple(
        gap::SET_UNDIRECTED_CONNECTABLE,
        "GAP_SET_UNDIRECTED_CONNECTABLE",
        Params::Fixed(layout![adv_filter_policy @ 0: U8, own_addr_type @ 1: U8]),
    ),
    procedure(
        gap::SLAVE_SECURITY_REQUEST,
        "GAP_SLAVE_SECURITY_REQUEST",
        Params::Fixed(layout![conn_handle @ 0: U16, bonding @ 2: U8, mitm_protection @ 3: U8]),
    ),
    simple(
        gap::UPDATE_ADV_DATA,
        "GAP_UPDATE_ADV_DATA",
        Params::Fixed(layout![adv_len @ 0: U8, adv_data @ 1: Tail]),
    ),
    simple(
        gap::DELETE_AD_TYPE,
        "GAP_DELETE_AD_TYPE",
        Params::Fixed(layout![ad_type @ 0: U8]),
    ),
    Cmd::new(
        gap::GET_SECURITY_LEVEL,
        "GAP_GET_SECURITY_LEVEL",
        Params::None,
        Params::Fixed(layout![
            status @ 0: U8,
            mitm_protection @ 1: U8,
            bonding @ 2: U8,
            oob_data @ 3: U8,
            passkey_required @ 4: U8,
        ]),
    ),
    simple(gap::SET_EVT_MASK, "GAP_SET_EVT_MASK", Params::Fixed(layout![evt_mask @ 0: U16])),
    simple(gap::CONFIGURE_WHITELIST, "GAP_CONFIGURE_WHITELIST", Params::None),
    procedure(
        gap::TERMINATE,
        "GAP_TERMINATE",
        Params::Fixed(layout![handle @ 0: U16, reason @ 2: U8]),
    ),
    simple(gap::CLEAR_SECURITY_DB, "GAP_CLEAR_SECURITY_DB", Params::None),
    simple(
        gap::ALLOW_REBOND,
        "GAP_ALLOW_REBOND",
        Params::ByVariant(&[(Variant::Idb05a1, CONN), (Variant::Idb04a1, Layout::EMPTY)]),
    ),
    procedure(
        gap::START_LIMITED_DISCOVERY_PROC,
        "GAP_START_LIMITED_DISCOVERY_PROC",
        Params::Fixed(DISCOVERY_PROCEDURE),
    ),
    procedure(
        gap::START_GENERAL_DISCOVERY_PROC,
        "GAP_START_GENERAL_DISCOVERY_PROC",
        Params::Fixed(DISCOVERY_PROCEDURE),
    ),
    procedure(
        gap::START_NAME_DISCOVERY_PROC,
        "GAP_START_NAME_DISCOVERY_PROC",
        Params::Fixed(CONNECTION_PROCEDURE),
    ),
    procedure(
        gap::START_AUTO_CONN_ESTABLISH_PROC,
        "GAP_START_AUTO_CONN_ESTABLISH_PROC",
        Params::Variable,
    ),
    procedure(
        gap::START_GENERAL_CONN_ESTABLISH_PROC,
        "GAP_START_GENERAL_CONN_ESTABLISH_PROC",
        Params::ByVariant(&[
            (
                Variant::Idb05a1,
                layout![
                    scan_type @ 0: U8,
                    scan_interval @ 1: U16,
                    scan_window @ 3: U16,
                    own_address_type @ 5: U8,
                    filter_duplicates @ 6: U8,
                ],
            ),
            (
                Variant::Idb04a1,
                layout![
                    scan_type @ 0: U8,
                    scan_interval @ 1: U16,
                    scan_window @ 3: U16,
                    own_address_type @ 5: U8,
                    filter_duplicates @ 6: U8,
                    reconn_addr @ 7: Bytes(6),
                ],
            ),
        ]),
    ),
    procedure(
        gap::START_SELECTIVE_CONN_ESTABLISH_PROC,
        "GAP_START_SELECTIVE_CONN_ESTABLISH_PROC",
        Params::Fixed(layout![
            scan_type @ 0: U8,
            scan_interval @ 1: U16,
            scan_window @ 3: U16,
            own_address_type @ 5: U8,
            filter_duplicates @ 6: U8,
            num_whitelist_entries @ 7: U8,
            addr_array @ 8: Tail,
        ]),
    ),
    procedure(
        gap::CREATE_CONNECTION,
        "GAP_CREATE_CONNECTION",
        Params::Fixed(CONNECTION_PROCEDURE),
    ),
    simple(
        gap::TERMINATE_GAP_PROCEDURE,
        "GAP_TERMINATE_GAP_PROCEDURE",
        Params::Fixed(layout![procedure_code @ 0: U8]),
    ),
    procedure(
        gap::START_CONNECTION_UPDATE,
        "GAP_START_CONNECTION_UPDATE",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            conn_min_interval @ 2: U16,
            conn_max_interval @ 4: U16,
            conn_latency @ 6: U16,
            supervision_timeout @ 8: U16,
            min_conn_length @ 10: U16,
            max_conn_length @ 12: U16,
        ]),
    ),
    procedure(
        gap::SEND_PAIRING_REQUEST,
        "GAP_SEND_PAIRING_REQUEST",
        Params::Fixed(layout![conn_handle @ 0: U16, force_rebond @ 2: U8]),
    ),
    Cmd::new(
        gap::RESOLVE_PRIVATE_ADDRESS,
        "GAP_RESOLVE_PRIVATE_ADDRESS",
        Params::ByVariant(&[
            (Variant::Idb05a1, layout![address @ 0: Bytes(6)]),
            (Variant::Idb04a1, Layout::EMPTY),
        ]),
        Params::Fixed(layout![status @ 0: U8, actual_address @ 1: Bytes(6)]),
    ),
    simple(
        gap::SET_BROADCAST_MODE,
        "GAP_SET_BROADCAST_MODE",
        Params::Fixed(layout![
            adv_interv_min @ 0: U16,
            adv_interv_max @ 2: U16,
            adv_type @ 4: U8,
            own_addr_type @ 5: U8,
            var_len_data @ 6: Tail,
        ]),
    ),
    procedure(
        gap::START_OBSERVATION_PROC,
        "GAP_START_OBSERVATION_PROC",
        Params::Fixed(layout![
            scan_interval @ 0: U16,
            scan_window @ 2: U16,
            scan_type @ 4: U8,
            own_address_type @ 5: U8,
            filter_duplicates @ 6: U8,
        ]),
    ),
    Cmd::new(
        gap::GET_BONDED_DEVICES,
        "GAP_GET_BONDED_DEVICES",
        Params::None,
        Params::Fixed(layout![status @ 0: U8, num_addr @ 1: U8, dev_list @ 2: Tail]),
    ),
    simple(
        gap::IS_DEVICE_BONDED,
        "GAP_IS_DEVICE_BONDED",
        Params::Fixed(layout![peer_address_type @ 0: U8, peer_address @ 1: Bytes(6)]),
    ),
];

const GATT: &[Cmd] = &[
    simple(gatt::INIT, "GATT_INIT", Params::None),
    Cmd::new(
        gatt::ADD_SERV,
        "GATT_ADD_SERV",
        Params::Variable,
        Params::Fixed(handle_response::LAYOUT),
    ),
    Cmd::new(
        gatt::INCLUDE_SERV,
        "GATT_INCLUDE_SERV",
        Params::Variable,
        Params::Fixed(handle_response::LAYOUT),
    ),
    Cmd::new(
        gatt::ADD_CHAR,
        "GATT_ADD_CHAR",
        Params::Variable,
        Params::Fixed(handle_response::LAYOUT),
    ),
    Cmd::new(
        gatt::ADD_CHAR_DESC,
        "GATT_ADD_CHAR_DESC",
        Params::Variable,
        Params::Fixed(handle_response::LAYOUT),
    ),
    simple(
        gatt::UPD_CHAR_VAL,
        "GATT_UPD_CHAR_VAL",
        Params::Fixed(layout![
            serv_handle @ 0: U16,
            char_handle @ 2: U16,
            val_offset @ 4: U8,
            char_value_len @ 5: U8,
            char_value @ 6: Tail,
        ]),
    ),
    simple(
        gatt::DEL_CHAR,
        "GATT_DEL_CHAR",
        Params::Fixed(layout![serv_handle @ 0: U16, char_handle @ 2: U16]),
    ),
    simple(gatt::DEL_SERV, "GATT_DEL_SERV", Params::Fixed(layout![serv_handle @ 0: U16])),
    simple(
        gatt::DEL_INC_SERV,
        "GATT_DEL_INC_SERV",
        Params::Fixed(layout![serv_handle @ 0: U16, inc_serv_handle @ 2: U16]),
    ),
    simple(gatt::SET_EVT_MASK, "GATT_SET_EVT_MASK", Params::Fixed(layout![evt_mask @ 0: U32])),
    procedure(gatt::EXCHANGE_CONFIG, "GATT_EXCHANGE_CONFIG", Params::Fixed(CONN)),
    procedure(gatt::ATT_FIND_INFO_REQ, "ATT_FIND_INFO_REQ", Params::Fixed(HANDLE_RANGE)),
    procedure(
        gatt::ATT_FIND_BY_TYPE_VALUE_REQ,
        "ATT_FIND_BY_TYPE_VALUE_REQ",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            start_handle @ 2: U16,
            end_handle @ 4: U16,
            uuid @ 6: Bytes(2),
            attr_val_len @ 8: U8,
            attr_val @ 9: Tail,
        ]),
    ),
    procedure(
        gatt::ATT_READ_BY_TYPE_REQ,
        "ATT_READ_BY_TYPE_REQ",
        Params::Fixed(HANDLE_RANGE_UUID),
    ),
    procedure(
        gatt::ATT_READ_BY_GROUP_TYPE_REQ,
        "ATT_READ_BY_GROUP_TYPE_REQ",
        Params::Fixed(HANDLE_RANGE_UUID),
    ),
    procedure(
        gatt::ATT_PREPARE_WRITE_REQ,
        "ATT_PREPARE_WRITE_REQ",
        Params::Fixed(CONN_ATTR_OFFSET_VALUE),
    ),
    procedure(
        gatt::ATT_EXECUTE_WRITE_REQ,
        "ATT_EXECUTE_WRITE_REQ",
        Params::Fixed(layout![conn_handle @ 0: U16, execute @ 2: U8]),
    ),
    procedure(
        gatt::DISC_ALL_PRIM_SERVICES,
        "GATT_DISC_ALL_PRIM_SERVICES",
        Params::Fixed(CONN),
    ),
    procedure(
        gatt::DISC_PRIM_SERVICE_BY_UUID,
        "GATT_DISC_PRIM_SERVICE_BY_UUID",
        Params::Fixed(layout![conn_handle @ 0: U16, uuid_type @ 2: U8, uuid @ 3: Tail]),
    ),
    procedure(
        gatt::FIND_INCLUDED_SERVICES,
        "GATT_FIND_INCLUDED_SERVICES",
        Params::Fixed(HANDLE_RANGE),
    ),
    procedure(
        gatt::DISC_ALL_CHARAC_OF_SERV,
        "GATT_DISC_ALL_CHARAC_OF_SERV",
        Params::Fixed(HANDLE_RANGE),
    ),
    procedure(
        gatt::DISC_CHARAC_BY_UUID,
        "GATT_DISC_CHARAC_BY_UUID",
        Params::Fixed(HANDLE_RANGE_UUID),
    ),
    procedure(
        gatt::DISC_ALL_CHARAC_DESCRIPTORS,
        "GATT_DISC_ALL_CHARAC_DESCRIPTORS",
        Params::Fixed(HANDLE_RANGE),
    ),
    procedure(gatt::READ_CHARAC_VAL, "GATT_READ_CHARAC_VAL", Params::Fixed(CONN_ATTR)),
    procedure(
        gatt::READ_USING_CHARAC_UUID,
        "GATT_READ_USING_CHARAC_UUID",
        Params::Fixed(HANDLE_RANGE_UUID),
    ),
    procedure(
        gatt::READ_LONG_CHARAC_VAL,
        "GATT_READ_LONG_CHARAC_VAL",
        Params::Fixed(CONN_ATTR_OFFSET),
    ),
    procedure(
        gatt::READ_MULTIPLE_CHARAC_VAL,
        "GATT_READ_MULTIPLE_CHARAC_VAL",
        Params::Fixed(layout![conn_handle @ 0: U16, num_handles @ 2: U8, set_of_handles @ 3: Tail]),
    ),
    procedure(gatt::WRITE_CHAR_VALUE, "GATT_WRITE_CHAR_VALUE", Params::Fixed(CONN_ATTR_VALUE)),
    procedure(
        gatt::WRITE_LONG_CHARAC_VAL,
        "GATT_WRITE_LONG_CHARAC_VAL",
        Params::Fixed(CONN_ATTR_OFFSET_VALUE),
    ),
    procedure(
        gatt::WRITE_CHARAC_RELIABLE,
        "GATT_WRITE_CHARAC_RELIABLE",
        Params::Fixed(CONN_ATTR_OFFSET_VALUE),
    ),
    procedure(
        gatt::WRITE_LONG_CHARAC_DESC,
        "GATT_WRITE_LONG_CHARAC_DESC",
        Params::Fixed(CONN_ATTR_OFFSET_VALUE),
    ),
    procedure(
        gatt::READ_LONG_CHARAC_DESC,
        "GATT_READ_LONG_CHARAC_DESC",
        Params::Fixed(CONN_ATTR_OFFSET),
    ),
    procedure(gatt::WRITE_CHAR_DESC, "GATT_WRITE_CHAR_DESC", Params::Fixed(CONN_ATTR_VALUE)),
    procedure(gatt::READ_CHAR_DESC, "GATT_READ_CHAR_DESC", Params::Fixed(CONN_ATTR)),
    simple(
        gatt::WRITE_WITHOUT_RESPONSE,
        "GATT_WRITE_WITHOUT_RESPONSE",
        Params::Fixed(CONN_ATTR_VALUE),
    ),
    simple(
        gatt::SIGNED_WRITE_WITHOUT_RESPONSE,
        "GATT_SIGNED_WRITE_WITHOUT_RESPONSE",
        Params::Fixed(CONN_ATTR_VALUE),
    ),
    simple(gatt::CONFIRM_INDICATION, "GATT_CONFIRM_INDICATION", Params::Fixed(CONN)),
    simple(
        gatt::WRITE_RESPONSE,
        "GATT_WRITE_RESPONSE",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            attr_handle @ 2: U16,
            write_status @ 4: U8,
            err_code @ 5: U8,
            att_val_len @ 6: U8,
            att_val @ 7: Tail,
        ]),
    ),
    simple(gatt::ALLOW_READ, "GATT_ALLOW_READ", Params::Fixed(CONN)),
    simple(
        gatt::SET_SECURITY_PERMISSION,
        "GATT_SET_SECURITY_PERMISSION",
        Params::Fixed(layout![serv_handle @ 0: U16, attr_handle @ 2: U16, security_permission @ 4: U8]),
    ),
    simple(
        gatt::SET_DESC_VAL,
        "GATT_SET_DESC_VAL",
        Params::Fixed(layout![
            serv_handle @ 0: U16,
            char_handle @ 2: U16,
            char_desc_handle @ 4: U16,
            val_offset @ 6: U16,
            char_desc_value_len @ 8: U8,
            char_desc_value @ 9: Tail,
        ]),
    ),
    Cmd::new(
        gatt::READ_HANDLE_VALUE,
        "GATT_READ_HANDLE_VALUE",
        Params::Fixed(layout![attr_handle @ 0: U16]),
        Params::Fixed(read_handle_value_response::LAYOUT),
    ),
    Cmd::new(
        gatt::READ_HANDLE_VALUE_OFFSET,
        "GATT_READ_HANDLE_VALUE_OFFSET",
        Params::Fixed(layout![attr_handle @ 0: U16, offset @ 2: U8]),
        Params::Fixed(read_handle_value_response::LAYOUT),
    ),
    simple(
        gatt::UPD_CHAR_VAL_EXT,
        "GATT_UPD_CHAR_VAL_EXT",
        Params::Fixed(layout![
            serv_handle @ 0: U16,
            char_handle @ 2: U16,
            update_type @ 4: U8,
            char_length @ 5: U16,
            value_offset @ 7: U16,
            value_length @ 9: U8,
            value @ 10: Tail,
        ]),
    ),
];

const L2CAP: &[Cmd] = &[
    procedure(
        l2cap::CONN_PARAM_UPDATE_REQ,
        "L2CAP_CONN_PARAM_UPDATE_REQ",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            interval_min @ 2: U16,
            interval_max @ 4: U16,
            slave_latency @ 6: U16,
            timeout_multiplier @ 8: U16,
        ]),
    ),
    simple(
        l2cap::CONN_PARAM_UPDATE_RESP,
        "L2CAP_CONN_PARAM_UPDATE_RESP",
        Params::ByVariant(&[
            (
                Variant::Idb05a1,
                layout![
                    conn_handle @ 0: U16,
                    interval_min @ 2: U16,
                    interval_max @ 4: U16,
                    slave_latency @ 6: U16,
                    timeout_multiplier @ 8: U16,
                    min_ce_length @ 10: U16,
                    max_ce_length @ 12: U16,
                    id @ 14: U8,
                    accept @ 15: U8,
                ],
            ),
            (
                Variant::Idb04a1,
                layout![
                    conn_handle @ 0: U16,
                    interval_min @ 2: U16,
                    interval_max @ 4: U16,
                    slave_latency @ 6: U16,
                    timeout_multiplier @ 8: U16,
                    id @ 10: U8,
                    accept @ 11: U8,
                ],
            ),
        ]),
    ),
];

const fn group(name: &'static str, commands: &'static [Cmd]) -> GroupDescriptor {
    GroupDescriptor {
        ogf: OGF_VENDOR,
        name,
        commands,
    }
}

const GROUPS: &[GroupDescriptor] = &[
    group("VENDOR_CMD", HAL),
    group("VENDOR_CMD", UPDATER),
    group("VENDOR_CMD", GAP),
    group("VENDOR_CMD", GATT),
    group("VENDOR_CMD", L2CAP),
];

const CONN_LEN: Layout = layout![conn_handle @ 0: U16, event_data_length @ 2: U8];

const CONN_LEN_VALUE: Layout = layout![conn_handle @ 0: U16, event_data_length @ 2: U8, value @ 3: Tail];

const CONN_LEN_ATTR_VALUE: Layout = layout![
    conn_handle @ 0: U16,
    event_data_length @ 2: U8,
    attr_handle @ 3: U16,
    attr_value @ 5: Tail,
];

const VENDOR_EVENTS: &[Evt] = &[
    Evt::new(
        events::HAL_INITIALIZED,
        "HAL_INITIALIZED",
        Params::Fixed(hal_initialized::LAYOUT),
    ),
    Evt::new(
        events::HAL_EVENTS_LOST,
        "HAL_EVENTS_LOST",
        Params::Fixed(layout![lost_events @ 0: Bytes(8)]),
    ),
    Evt::new(
        events::HAL_CRASH_INFO,
        "HAL_CRASH_INFO",
        Params::Fixed(layout![
            crash_type @ 0: U8,
            sp @ 1: U32,
            r0 @ 5: U32,
            r1 @ 9: U32,
            r2 @ 13: U32,
            r3 @ 17: U32,
            r12 @ 21: U32,
            lr @ 25: U32,
            pc @ 29: U32,
            xpsr @ 33: U32,
            reserved @ 37: U32,
            debug_data_len @ 41: U8,
            debug_data @ 42: Tail,
        ]),
    ),
    Evt::new(events::GAP_LIMITED_DISCOVERABLE, "GAP_LIMITED_DISCOVERABLE", Params::None),
    Evt::new(
        events::GAP_PAIRING_CMPLT,
        "GAP_PAIRING_CMPLT",
        Params::Fixed(layout![conn_handle @ 0: U16, status @ 2: U8]),
    ),
    Evt::new(events::GAP_PASS_KEY_REQUEST, "GAP_PASS_KEY_REQUEST", Params::Fixed(CONN)),
    Evt::new(
        events::GAP_AUTHORIZATION_REQUEST,
        "GAP_AUTHORIZATION_REQUEST",
        Params::Fixed(CONN),
    ),
    Evt::new(
        events::GAP_SLAVE_SECURITY_INITIATED,
        "GAP_SLAVE_SECURITY_INITIATED",
        Params::None,
    ),
    Evt::new(events::GAP_BOND_LOST, "GAP_BOND_LOST", Params::None),
    Evt::new(
        events::GAP_DEVICE_FOUND,
        "GAP_DEVICE_FOUND",
        Params::Fixed(advertising_report::LAYOUT),
    ),
    Evt::new(
        events::GAP_PROCEDURE_COMPLETE,
        "GAP_PROCEDURE_COMPLETE",
        Params::Fixed(gap_procedure_complete::LAYOUT),
    ),
    Evt::new(
        events::GAP_ADDR_NOT_RESOLVED,
        "GAP_ADDR_NOT_RESOLVED",
        Params::ByVariant(&[
            (Variant::Idb05a1, CONN),
            (Variant::Idb04a1, layout![reconnection_address @ 0: Bytes(6)]),
        ]),
    ),
    Evt::new(
        events::L2CAP_CONN_UPD_RESP,
        "L2CAP_CONN_UPD_RESP",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            code @ 3: U8,
            identifier @ 4: U8,
            l2cap_length @ 5: U16,
            result @ 7: U16,
        ]),
    ),
    Evt::new(
        events::L2CAP_PROCEDURE_TIMEOUT,
        "L2CAP_PROCEDURE_TIMEOUT",
        Params::Fixed(CONN_LEN),
    ),
    Evt::new(
        events::L2CAP_CONN_UPD_REQ,
        "L2CAP_CONN_UPD_REQ",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            identifier @ 3: U8,
            l2cap_length @ 4: U16,
            interval_min @ 6: U16,
            interval_max @ 8: U16,
            slave_latency @ 10: U16,
            timeout_mult @ 12: U16,
        ]),
    ),
    Evt::new(
        events::GATT_ATTRIBUTE_MODIFIED,
        "GATT_ATTRIBUTE_MODIFIED",
        Params::ByVariant(&[
            (Variant::Idb05a1, attribute_modified::IDB05A1),
            (Variant::Idb04a1, attribute_modified::IDB04A1),
        ]),
    ),
    Evt::new(events::GATT_PROCEDURE_TIMEOUT, "GATT_PROCEDURE_TIMEOUT", Params::Fixed(CONN)),
    Evt::new(
        events::ATT_EXCHANGE_MTU_RESP,
        "ATT_EXCHANGE_MTU_RESP",
        Params::Fixed(layout![conn_handle @ 0: U16, event_data_length @ 2: U8, server_rx_mtu @ 3: U16]),
    ),
    Evt::new(
        events::ATT_FIND_INFORMATION_RESP,
        "ATT_FIND_INFORMATION_RESP",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            format @ 3: U8,
            handle_uuid_pair @ 4: Tail,
        ]),
    ),
    Evt::new(
        events::ATT_FIND_BY_TYPE_VAL_RESP,
        "ATT_FIND_BY_TYPE_VAL_RESP",
        Params::Fixed(CONN_LEN_VALUE),
    ),
    Evt::new(
        events::ATT_READ_BY_TYPE_RESP,
        "ATT_READ_BY_TYPE_RESP",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            handle_value_pair_length @ 3: U8,
            handle_value_pair @ 4: Tail,
        ]),
    ),
    Evt::new(events::ATT_READ_RESP, "ATT_READ_RESP", Params::Fixed(CONN_LEN_VALUE)),
    Evt::new(events::ATT_READ_BLOB_RESP, "ATT_READ_BLOB_RESP", Params::Fixed(CONN_LEN_VALUE)),
    Evt::new(
        events::ATT_READ_MULTIPLE_RESP,
        "ATT_READ_MULTIPLE_RESP",
        Params::Fixed(CONN_LEN_VALUE),
    ),
    Evt::new(
        events::ATT_READ_BY_GROUP_TYPE_RESP,
        "ATT_READ_BY_GROUP_TYPE_RESP",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            attribute_data_length @ 3: U8,
            attribute_data_list @ 4: Tail,
        ]),
    ),
    Evt::new(
        events::ATT_PREPARE_WRITE_RESP,
        "ATT_PREPARE_WRITE_RESP",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            attribute_handle @ 3: U16,
            offset @ 5: U16,
            part_attr_value @ 7: Tail,
        ]),
    ),
    Evt::new(events::ATT_EXEC_WRITE_RESP, "ATT_EXEC_WRITE_RESP", Params::Fixed(CONN_LEN)),
    Evt::new(events::GATT_INDICATION, "GATT_INDICATION", Params::Fixed(CONN_LEN_ATTR_VALUE)),
    Evt::new(
        events::GATT_NOTIFICATION,
        "GATT_NOTIFICATION",
        Params::Fixed(CONN_LEN_ATTR_VALUE),
    ),
    Evt::new(
        events::GATT_PROCEDURE_COMPLETE,
        "GATT_PROCEDURE_COMPLETE",
        Params::Fixed(layout![conn_handle @ 0: U16, data_length @ 2: U8, error_code @ 3: U8]),
    ),
    Evt::new(
        events::GATT_ERROR_RESP,
        "GATT_ERROR_RESP",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            event_data_length @ 2: U8,
            req_opcode @ 3: U8,
            attr_handle @ 4: U16,
            error_code @ 6: U8,
        ]),
    ),
    Evt::new(
        events::GATT_DISC_READ_CHAR_BY_UUID_RESP,
        "GATT_DISC_READ_CHAR_BY_UUID_RESP",
        Params::Fixed(CONN_LEN_ATTR_VALUE),
    ),
    Evt::new(
        events::GATT_WRITE_PERMIT_REQ,
        "GATT_WRITE_PERMIT_REQ",
        Params::Fixed(write_permit_request::LAYOUT),
    ),
    Evt::new(
        events::GATT_READ_PERMIT_REQ,
        "GATT_READ_PERMIT_REQ",
        Params::Fixed(read_permit_request::LAYOUT),
    ),
    Evt::new(
        events::GATT_READ_MULTI_PERMIT_REQ,
        "GATT_READ_MULTI_PERMIT_REQ",
        Params::Fixed(layout![conn_handle @ 0: U16, data_length @ 2: U8, data @ 3: Tail]),
    ),
    Evt::new(
        events::GATT_TX_POOL_AVAILABLE,
        "GATT_TX_POOL_AVAILABLE",
        Params::Fixed(layout![conn_handle @ 0: U16, available_buffers @ 2: U16]),
    ),
    Evt::new(
        events::GATT_SERVER_CONFIRMATION,
        "GATT_SERVER_CONFIRMATION",
        Params::Fixed(CONN),
    ),
    Evt::new(
        events::GATT_PREPARE_WRITE_PERMIT_REQ,
        "GATT_PREPARE_WRITE_PERMIT_REQ",
        Params::Fixed(layout![
            conn_handle @ 0: U16,
            attr_handle @ 2: U16,
            offset @ 4: U16,
            data_length @ 6: U8,
            data @ 7: Tail,
        ]),
    ),
];

/// The BlueNRG-MS ACI extension
pub static BLUENRG_MS: Extension = Extension {
    name: "BlueNRG-MS",
    groups: GROUPS,
    events: &[],
    sub_events: &[SubEvents {
        parent: super::base::events::VENDOR,
        events: VENDOR_EVENTS,
    }],
};

#[cfg(test)]
mod tests {
    use super::super::{Registry, Variant};
    use super::*;
    use crate::hci::OpCode;

    #[test]
    fn procedures_complete_by_status() {
        let registry = Registry::bluenrg_ms(Variant::Idb05a1);

        for ocf in [gap::START_GENERAL_DISCOVERY_PROC, gap::CREATE_CONNECTION, gap::TERMINATE].iter() {
            let command = registry.command(OpCode::new(OGF_VENDOR, *ocf)).unwrap();

            assert_eq!(command.completion, Completion::CommandStatus, "{}", command.name);
        }

        let add_serv = registry.command(OpCode::new(OGF_VENDOR, gatt::ADD_SERV)).unwrap();

        assert_eq!(add_serv.completion, Completion::CommandComplete);
        assert_eq!(add_serv.request, Params::Variable);
        assert!(add_serv.response_has_status);
    }

    #[test]
    fn corrected_offsets() {
        let registry = Registry::bluenrg_ms(Variant::Idb05a1);

        let terminate = registry.command(OpCode::new(OGF_VENDOR, gap::TERMINATE)).unwrap();

        assert_eq!(terminate.request.layout().unwrap().field("reason").unwrap().offset, 2);

        let discovery = registry
            .command(OpCode::new(OGF_VENDOR, gap::START_GENERAL_DISCOVERY_PROC))
            .unwrap();

        let own = discovery.request.layout().unwrap().field("own_bdaddr_type").copied().unwrap();

        assert_eq!(own, Field::u8("own_bdaddr_type", 4));

        let by_uuid = registry
            .command(OpCode::new(OGF_VENDOR, 0x119))
            .unwrap();

        assert_eq!(by_uuid.name, "GATT_READ_USING_CHARAC_UUID");
    }

    #[test]
    fn vendor_events_resolve() {
        let registry = Registry::bluenrg_ms(Variant::Idb05a1);

        let init = registry.sub_event(0xFF, events::HAL_INITIALIZED).unwrap();

        assert_eq!(init.name, "HAL_INITIALIZED");

        let modified = registry.sub_event(0xFF, events::GATT_ATTRIBUTE_MODIFIED).unwrap();

        assert_eq!(modified.params, Params::Fixed(attribute_modified::IDB05A1));
    }
}
