//! GAP commands
//!
//! The GAP layer of the BlueNRG-MS runs the advertising, discovery and connection procedures.
//! Procedures that complete later (discovery, connection establishment, termination) are only
//! accepted by a *Command Status* event, their outcome comes as a *GAP Procedure Complete* or a
//! LE meta event.

use crate::hci::schema::Variant;

/// The maximum length of advertising data
pub const MAX_ADV_DATA_LEN: usize = 31;

/// AD type of the complete local name
pub const AD_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;

/// The GAP role(s) of the device
///
/// The role values differ between the two stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Peripheral,
    Broadcaster,
    Central,
    Observer,
}

impl Role {
    pub fn val(&self, variant: Variant) -> u8 {
        match (self, variant) {
            (Role::Peripheral, _) => 0x01,
            (Role::Broadcaster, _) => 0x02,
            (Role::Central, Variant::Idb05a1) => 0x04,
            (Role::Central, Variant::Idb04a1) => 0x03,
            (Role::Observer, Variant::Idb05a1) => 0x08,
            (Role::Observer, Variant::Idb04a1) => 0x04,
        }
    }
}

/// Procedure codes of the *GAP Procedure Complete* event and of `terminate_gap_procedure`
pub mod procedure {
    pub const LIMITED_DISCOVERY: u8 = 0x01;
    pub const GENERAL_DISCOVERY: u8 = 0x02;
    pub const NAME_DISCOVERY: u8 = 0x04;
    pub const AUTO_CONNECTION_ESTABLISHMENT: u8 = 0x08;
    pub const GENERAL_CONNECTION_ESTABLISHMENT: u8 = 0x10;
    pub const SELECTIVE_CONNECTION_ESTABLISHMENT: u8 = 0x20;
    pub const DIRECT_CONNECTION_ESTABLISHMENT: u8 = 0x40;
    pub const OBSERVATION: u8 = 0x80;
}

/// Advertising types for the discoverable and non-connectable modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdvertisingType {
    ConnectableUndirected,
    ScannableUndirected,
    NonConnectableUndirected,
}

impl AdvertisingType {
    pub fn val(&self) -> u8 {
        match self {
            AdvertisingType::ConnectableUndirected => 0x00,
            AdvertisingType::ScannableUndirected => 0x02,
            AdvertisingType::NonConnectableUndirected => 0x03,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoCapability {
    DisplayOnly,
    DisplayYesNo,
    KeyboardOnly,
    NoInputNoOutput,
    KeyboardDisplay,
}

impl IoCapability {
    pub fn val(&self) -> u8 {
        match self {
            IoCapability::DisplayOnly => 0x00,
            IoCapability::DisplayYesNo => 0x01,
            IoCapability::KeyboardOnly => 0x02,
            IoCapability::NoInputNoOutput => 0x03,
            IoCapability::KeyboardDisplay => 0x04,
        }
    }
}

pub mod init {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::gap_init_response::{
        APPEARANCE_CHAR_HANDLE, DEV_NAME_CHAR_HANDLE, SERVICE_HANDLE,
    };
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::INIT);

    /// Handles of the GAP service created by the firmware
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct GapHandles {
        pub service_handle: u16,
        pub dev_name_char_handle: u16,
        pub appearance_char_handle: u16,
    }

    /// Initialize the GAP layer
    ///
    /// The IDB04A1 stack only takes the role, privacy and the device name length are ignored
    /// for it.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        role: super::Role,
        privacy_enabled: bool,
        device_name_char_len: u8,
    ) -> Result<GapHandles, Error> {
        let values = [
            Value::from(role.val(hci.variant())),
            Value::from(privacy_enabled),
            Value::from(device_name_char_len),
        ];

        let response = hci.send_values(OPCODE, &values)?;

        let reader = response.reader()?;

        Ok(GapHandles {
            service_handle: reader.u16(&SERVICE_HANDLE)?,
            dev_name_char_handle: reader.u16(&DEV_NAME_CHAR_HANDLE)?,
            appearance_char_handle: reader.u16(&APPEARANCE_CHAR_HANDLE)?,
        })
    }
}

vendor_command! {
    /// Stop advertising
    set_non_discoverable,
    gap::SET_NON_DISCOVERABLE,
}

/// Parameters of the discoverable modes
///
/// `local_name` is the AD type followed by the name, or empty for no name (see
/// [`local_name_ad`](crate::gap::advertise::local_name_ad)).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoverableParameters<'a> {
    pub advertising_type: AdvertisingType,
    pub interval_min: u16,
    pub interval_max: u16,
    pub own_address_type: crate::aci::AddressType,
    pub filter_policy: u8,
    pub local_name: &'a [u8],
    pub service_uuid_list: &'a [u8],
    pub slave_conn_interval_min: u16,
    pub slave_conn_interval_max: u16,
}

impl<'a> DiscoverableParameters<'a> {
    /// Undirected connectable advertising on one interval with no white list
    pub fn new(advertising_type: AdvertisingType, interval: u16, local_name: &'a [u8]) -> Self {
        DiscoverableParameters {
            advertising_type,
            interval_min: interval,
            interval_max: interval,
            own_address_type: crate::aci::AddressType::Public,
            filter_policy: 0,
            local_name,
            service_uuid_list: &[],
            slave_conn_interval_min: 0,
            slave_conn_interval_max: 0,
        }
    }

    pub(crate) fn values(&self) -> Vec<crate::hci::schema::Value> {
        use crate::hci::schema::Value;

        vec![
            Value::from(self.advertising_type.val()),
            Value::from(self.interval_min),
            Value::from(self.interval_max),
            Value::from(self.own_address_type.val()),
            Value::from(self.filter_policy),
            Value::from(self.local_name.len() as u8),
            Value::from(self.local_name),
            Value::from(self.service_uuid_list.len() as u8),
            Value::from(self.service_uuid_list),
            Value::from(self.slave_conn_interval_min),
            Value::from(self.slave_conn_interval_max),
        ]
    }
}

pub mod set_limited_discoverable {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_LIMITED_DISCOVERABLE);

    /// Advertise in limited discoverable mode
    ///
    /// The firmware stops advertising after about 180 seconds.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::DiscoverableParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

pub mod set_discoverable {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_DISCOVERABLE);

    /// Advertise in general discoverable mode
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::DiscoverableParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

pub mod set_direct_connectable {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::{Value, Variant};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_DIRECT_CONNECTABLE);

    /// Directed advertising to a single initiator
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DirectConnectable {
        pub own_address_type: AddressType,
        /// High duty cycle (`0x01`) or low duty cycle (`0x04`), IDB05A1 only
        pub directed_advertising_type: u8,
        pub initiator_address_type: AddressType,
        pub initiator_address: [u8; 6],
        /// IDB05A1 only
        pub interval_min: u16,
        /// IDB05A1 only
        pub interval_max: u16,
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &DirectConnectable) -> Result<(), Error> {
        let values = match hci.variant() {
            Variant::Idb05a1 => vec![
                Value::from(parameters.own_address_type.val()),
                Value::from(parameters.directed_advertising_type),
                Value::from(parameters.initiator_address_type.val()),
                Value::from(parameters.initiator_address),
                Value::from(parameters.interval_min),
                Value::from(parameters.interval_max),
            ],
            Variant::Idb04a1 => vec![
                Value::from(parameters.own_address_type.val()),
                Value::from(parameters.initiator_address_type.val()),
                Value::from(parameters.initiator_address),
            ],
        };

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod set_io_capability {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_IO_CAPABILITY);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, capability: super::IoCapability) -> Result<(), Error> {
        hci.send_values(OPCODE, &[Value::from(capability.val())]).map(|_| ())
    }
}

pub mod set_auth_requirement {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_AUTH_REQUIREMENT);

    pub const MIN_ENCRYPTION_KEY_SIZE: u8 = 7;
    pub const MAX_ENCRYPTION_KEY_SIZE: u8 = 16;

    /// Security requirements of the device
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AuthRequirement {
        pub mitm_protection: bool,
        pub oob_data: Option<[u8; 16]>,
        pub min_encryption_key_size: u8,
        pub max_encryption_key_size: u8,
        pub fixed_pin: Option<u32>,
        pub bonding: bool,
    }

    impl Default for AuthRequirement {
        /// MITM protection and bonding required with the pass key `123456`
        fn default() -> Self {
            AuthRequirement {
                mitm_protection: true,
                oob_data: None,
                min_encryption_key_size: MIN_ENCRYPTION_KEY_SIZE,
                max_encryption_key_size: MAX_ENCRYPTION_KEY_SIZE,
                fixed_pin: Some(123456),
                bonding: true,
            }
        }
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, requirement: &AuthRequirement) -> Result<(), Error> {
        // The firmware takes `0` for using the fixed pin
        let (use_fixed_pin, fixed_pin) = match requirement.fixed_pin {
            Some(pin) => (0u8, pin),
            None => (1u8, 0),
        };

        let values = [
            Value::from(requirement.mitm_protection),
            Value::from(requirement.oob_data.is_some()),
            Value::Bytes(requirement.oob_data.unwrap_or_default().to_vec()),
            Value::from(requirement.min_encryption_key_size),
            Value::from(requirement.max_encryption_key_size),
            Value::from(use_fixed_pin),
            Value::from(fixed_pin),
            Value::from(requirement.bonding),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    /// Require authorization from the host for a connection
    set_author_requirement,
    gap::SET_AUTHOR_REQUIREMENT,
    connection_handle: u16,
    authorization_enable: bool,
}

vendor_command! {
    /// Reply to a *GAP Pass Key Request* event
    passkey_response,
    gap::PASSKEY_RESPONSE,
    connection_handle: u16,
    passkey: u32,
}

vendor_command! {
    /// Reply to a *GAP Authorization Request* event
    authorization_response,
    gap::AUTHORIZATION_RESPONSE,
    connection_handle: u16,
    authorize: bool,
}

pub mod set_non_connectable {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_NON_CONNECTABLE);

    /// Non connectable advertising
    ///
    /// The IDB04A1 stack always advertises with its own public address, `own_address_type` is
    /// not sent to it.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        advertising_type: super::AdvertisingType,
        own_address_type: AddressType,
    ) -> Result<(), Error> {
        let values = [Value::from(advertising_type.val()), Value::from(own_address_type.val())];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    /// Undirected connectable advertising with the white list
    set_undirected_connectable,
    gap::SET_UNDIRECTED_CONNECTABLE,
    filter_policy: u8,
    own_address_type: u8,
}

vendor_command! {
    /// Send a slave security request to the master
    slave_security_request,
    gap::SLAVE_SECURITY_REQUEST,
    connection_handle: u16,
    bonding: bool,
    mitm_protection: bool,
}

pub mod update_adv_data {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::{CodecError, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::UPDATE_ADV_DATA);

    /// Add AD structures to the advertising data
    ///
    /// The data is checked against the 31 byte limit before anything is sent.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, data: &[u8]) -> Result<(), Error> {
        if data.len() > super::MAX_ADV_DATA_LEN {
            return Err(Error::Codec(CodecError::Oversize {
                field: "adv_data",
                max: super::MAX_ADV_DATA_LEN,
                len: data.len(),
            }));
        }

        let values = [Value::from(data.len() as u8), Value::from(data)];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    /// Remove an AD type from the advertising data
    delete_ad_type,
    gap::DELETE_AD_TYPE,
    ad_type: u8,
}

pub mod get_security_level {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::GET_SECURITY_LEVEL);

    const MITM_PROTECTION: Field = Field::u8("mitm_protection", 1);
    const BONDING: Field = Field::u8("bonding", 2);
    const OOB_DATA: Field = Field::u8("oob_data", 3);
    const PASSKEY_REQUIRED: Field = Field::u8("passkey_required", 4);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SecurityLevel {
        pub mitm_protection: bool,
        pub bonding: bool,
        pub oob_data: bool,
        pub passkey_required: bool,
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<SecurityLevel, Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let reader = response.reader()?;

        Ok(SecurityLevel {
            mitm_protection: reader.u8(&MITM_PROTECTION)? != 0,
            bonding: reader.u8(&BONDING)? != 0,
            oob_data: reader.u8(&OOB_DATA)? != 0,
            passkey_required: reader.u8(&PASSKEY_REQUIRED)? != 0,
        })
    }
}

vendor_command! {
    /// Set which GAP vendor events are reported
    set_event_mask,
    gap::SET_EVT_MASK,
    event_mask: u16,
}

vendor_command! {
    /// Add the bonded devices to the white list
    configure_whitelist,
    gap::CONFIGURE_WHITELIST,
}

vendor_command! {
    /// Terminate a connection
    ///
    /// Only the acceptance is waited for, the link is down once the *Disconnection Complete*
    /// event is received.
    terminate,
    gap::TERMINATE,
    connection_handle: u16,
    reason: u8,
}

vendor_command! {
    /// Remove all bonded devices from the security database
    clear_security_db,
    gap::CLEAR_SECURITY_DB,
}

pub mod allow_rebond {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::ALLOW_REBOND);

    /// Allow a bonded device to pair again after a *GAP Bond Lost* event
    ///
    /// The connection handle is not sent to the IDB04A1 stack.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, connection_handle: u16) -> Result<(), Error> {
        hci.send_values(OPCODE, &[Value::from(connection_handle)]).map(|_| ())
    }
}

/// Scanning parameters of the discovery procedures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscoveryParameters {
    pub scan_interval: u16,
    pub scan_window: u16,
    pub own_address_type: crate::aci::AddressType,
    pub filter_duplicates: bool,
}

impl Default for DiscoveryParameters {
    fn default() -> Self {
        DiscoveryParameters {
            scan_interval: 0x10,
            scan_window: 0x10,
            own_address_type: crate::aci::AddressType::Public,
            filter_duplicates: true,
        }
    }
}

impl DiscoveryParameters {
    fn values(&self) -> [crate::hci::schema::Value; 4] {
        use crate::hci::schema::Value;

        [
            Value::from(self.scan_interval),
            Value::from(self.scan_window),
            Value::from(self.own_address_type.val()),
            Value::from(self.filter_duplicates),
        ]
    }
}

pub mod start_limited_discovery_proc {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_LIMITED_DISCOVERY_PROC);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::DiscoveryParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

pub mod start_general_discovery_proc {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_GENERAL_DISCOVERY_PROC);

    /// Start the general discovery procedure
    ///
    /// Found devices are reported by *GAP Device Found* (IDB04A1) or LE advertising report
    /// (IDB05A1) events until the procedure is terminated.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::DiscoveryParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

/// Parameters of the procedures that create a connection to a single peer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionParameters {
    pub scan_interval: u16,
    pub scan_window: u16,
    pub peer_address_type: crate::aci::AddressType,
    pub peer_address: [u8; 6],
    pub own_address_type: crate::aci::AddressType,
    pub conn_interval_min: u16,
    pub conn_interval_max: u16,
    pub conn_latency: u16,
    pub supervision_timeout: u16,
    pub min_conn_length: u16,
    pub max_conn_length: u16,
}

impl ConnectionParameters {
    /// Connection parameters with the defaults of the BlueNRG-MS examples
    pub fn new(peer_address_type: crate::aci::AddressType, peer_address: [u8; 6]) -> Self {
        ConnectionParameters {
            scan_interval: 0x4000,
            scan_window: 0x4000,
            peer_address_type,
            peer_address,
            own_address_type: crate::aci::AddressType::Public,
            conn_interval_min: 0x6C,
            conn_interval_max: 0x6C,
            conn_latency: 0,
            supervision_timeout: 0xC80,
            min_conn_length: 0x000C,
            max_conn_length: 0x000C,
        }
    }

    fn values(&self) -> [crate::hci::schema::Value; 11] {
        use crate::hci::schema::Value;

        [
            Value::from(self.scan_interval),
            Value::from(self.scan_window),
            Value::from(self.peer_address_type.val()),
            Value::from(self.peer_address),
            Value::from(self.own_address_type.val()),
            Value::from(self.conn_interval_min),
            Value::from(self.conn_interval_max),
            Value::from(self.conn_latency),
            Value::from(self.supervision_timeout),
            Value::from(self.min_conn_length),
            Value::from(self.max_conn_length),
        ]
    }
}

pub mod start_name_discovery_proc {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_NAME_DISCOVERY_PROC);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::ConnectionParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

pub mod create_connection {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::CREATE_CONNECTION);

    /// Start the direct connection establishment procedure
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::ConnectionParameters) -> Result<(), Error> {
        hci.send_values(OPCODE, &parameters.values()).map(|_| ())
    }
}

pub mod start_auto_conn_establish_proc {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::{Value, Variant};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_AUTO_CONN_ESTABLISH_PROC);

    /// Connect to the first of the listed devices that advertises
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct AutoConnection {
        pub scan_interval: u16,
        pub scan_window: u16,
        pub own_address_type: AddressType,
        pub conn_interval_min: u16,
        pub conn_interval_max: u16,
        pub conn_latency: u16,
        pub supervision_timeout: u16,
        pub min_conn_length: u16,
        pub max_conn_length: u16,
        /// IDB04A1 only
        pub reconnection_address: Option<[u8; 6]>,
        pub whitelist: Vec<(AddressType, [u8; 6])>,
    }

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &AutoConnection) -> Result<(), Error> {
        let mut values = vec![
            Value::from(parameters.scan_interval),
            Value::from(parameters.scan_window),
            Value::from(parameters.own_address_type.val()),
            Value::from(parameters.conn_interval_min),
            Value::from(parameters.conn_interval_max),
            Value::from(parameters.conn_latency),
            Value::from(parameters.supervision_timeout),
            Value::from(parameters.min_conn_length),
            Value::from(parameters.max_conn_length),
        ];

        if hci.variant() == Variant::Idb04a1 {
            values.push(Value::from(parameters.reconnection_address.is_some()));
            values.push(Value::from(parameters.reconnection_address.unwrap_or_default()));
        }

        values.push(Value::from(parameters.whitelist.len() as u8));

        for (address_type, address) in parameters.whitelist.iter() {
            values.push(Value::from(address_type.val()));
            values.push(Value::from(*address));
        }

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

/// Scanning parameters of the general and selective connection establishment procedures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EstablishParameters {
    /// Passive (`0x00`) or active (`0x01`) scanning
    pub scan_type: u8,
    pub scan_interval: u16,
    pub scan_window: u16,
    pub own_address_type: crate::aci::AddressType,
    pub filter_duplicates: bool,
}

impl EstablishParameters {
    fn values(&self) -> Vec<crate::hci::schema::Value> {
        use crate::hci::schema::Value;

        vec![
            Value::from(self.scan_type),
            Value::from(self.scan_interval),
            Value::from(self.scan_window),
            Value::from(self.own_address_type.val()),
            Value::from(self.filter_duplicates),
        ]
    }
}

pub mod start_general_conn_establish_proc {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::{Value, Variant};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_GENERAL_CONN_ESTABLISH_PROC);

    /// Start the general connection establishment procedure
    ///
    /// The reconnection address is only sent to the IDB04A1 stack, zeros are sent when there is
    /// none.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        parameters: &super::EstablishParameters,
        reconnection_address: Option<[u8; 6]>,
    ) -> Result<(), Error> {
        let mut values = parameters.values();

        if hci.variant() == Variant::Idb04a1 {
            values.push(Value::from(reconnection_address.unwrap_or_default()));
        }

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod start_selective_conn_establish_proc {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_SELECTIVE_CONN_ESTABLISH_PROC);

    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        parameters: &super::EstablishParameters,
        whitelist: &[(AddressType, [u8; 6])],
    ) -> Result<(), Error> {
        let mut values = parameters.values();

        let mut addresses = Vec::with_capacity(whitelist.len() * 7);

        for (address_type, address) in whitelist {
            addresses.push(address_type.val());
            addresses.extend_from_slice(address);
        }

        values.push(Value::from(whitelist.len() as u8));
        values.push(Value::from(addresses));

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    /// Terminate a GAP procedure
    ///
    /// `procedure_code` is one of the codes in [`procedure`](super::procedure).
    terminate_gap_procedure,
    gap::TERMINATE_GAP_PROCEDURE,
    procedure_code: u8,
}

pub mod start_connection_update {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_CONNECTION_UPDATE);

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ConnectionUpdate {
        pub conn_interval_min: u16,
        pub conn_interval_max: u16,
        pub conn_latency: u16,
        pub supervision_timeout: u16,
        pub min_conn_length: u16,
        pub max_conn_length: u16,
    }

    /// Update the parameters of a connection as master
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        update: &ConnectionUpdate,
    ) -> Result<(), Error> {
        let values = [
            Value::from(connection_handle),
            Value::from(update.conn_interval_min),
            Value::from(update.conn_interval_max),
            Value::from(update.conn_latency),
            Value::from(update.supervision_timeout),
            Value::from(update.min_conn_length),
            Value::from(update.max_conn_length),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

vendor_command! {
    /// Start pairing with the peer of a connection
    send_pairing_request,
    gap::SEND_PAIRING_REQUEST,
    connection_handle: u16,
    force_rebond: bool,
}

pub mod resolve_private_address {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::RESOLVE_PRIVATE_ADDRESS);

    const ACTUAL_ADDRESS: Field = Field::bytes("actual_address", 1, 6);

    /// Resolve a private address with the bonded devices
    ///
    /// The IDB04A1 stack takes no address, it resolves the address of the current peer.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, address: [u8; 6]) -> Result<[u8; 6], Error> {
        let response = hci.send_values(OPCODE, &[Value::from(address)])?;

        Ok(response.reader()?.address(&ACTUAL_ADDRESS)?)
    }
}

pub mod set_broadcast_mode {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::SET_BROADCAST_MODE);

    /// Broadcast advertising data
    ///
    /// `data` is the advertising data length followed by the data, then the number of white
    /// list entries and the entries.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        interval_min: u16,
        interval_max: u16,
        advertising_type: super::AdvertisingType,
        own_address_type: AddressType,
        data: &[u8],
    ) -> Result<(), Error> {
        let values = [
            Value::from(interval_min),
            Value::from(interval_max),
            Value::from(advertising_type.val()),
            Value::from(own_address_type.val()),
            Value::from(data),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod start_observation_proc {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::START_OBSERVATION_PROC);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, parameters: &super::EstablishParameters) -> Result<(), Error> {
        let values = [
            Value::from(parameters.scan_interval),
            Value::from(parameters.scan_window),
            Value::from(parameters.scan_type),
            Value::from(parameters.own_address_type.val()),
            Value::from(parameters.filter_duplicates),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod get_bonded_devices {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::GET_BONDED_DEVICES);

    const NUM_ADDR: Field = Field::u8("num_addr", 1);
    const DEV_LIST: Field = Field::tail("dev_list", 2);

    /// The address type and address of every bonded device
    ///
    /// Entries with an unknown address type are skipped.
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<Vec<(AddressType, [u8; 6])>, Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let reader = response.reader()?;

        let count = reader.u8(&NUM_ADDR)? as usize;

        let devices = reader
            .bytes(&DEV_LIST)?
            .chunks_exact(7)
            .take(count)
            .filter_map(|entry| {
                let mut address = [0u8; 6];

                address.copy_from_slice(&entry[1..]);

                AddressType::from_val(entry[0]).map(|address_type| (address_type, address))
            })
            .collect();

        Ok(devices)
    }
}

pub mod is_device_bonded {
    use crate::aci::AddressType;
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::error;
    use crate::hci::schema::vendor::{gap, OGF_VENDOR};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_VENDOR, gap::IS_DEVICE_BONDED);

    /// Check if a device is in the security database
    ///
    /// The firmware answers a device that is not bonded with a failed status, that status is
    /// returned as `false`.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        peer_address_type: AddressType,
        peer_address: [u8; 6],
    ) -> Result<bool, Error> {
        let values = [Value::from(peer_address_type.val()), Value::from(peer_address)];

        match hci.send_values(OPCODE, &values) {
            Ok(_) => Ok(true),
            Err(Error::Status {
                status: error::Error::Failed,
                ..
            }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aci::AddressType;
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn role_values_depend_on_the_variant() {
        assert_eq!(Role::Peripheral.val(Variant::Idb05a1), 0x01);
        assert_eq!(Role::Central.val(Variant::Idb05a1), 0x04);
        assert_eq!(Role::Central.val(Variant::Idb04a1), 0x03);
        assert_eq!(Role::Observer.val(Variant::Idb04a1), 0x04);
    }

    #[test]
    fn init_returns_the_gap_handles() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            Some(vec![mock::command_complete(
                command.opcode(),
                &[0x00, 0x05, 0x00, 0x06, 0x00, 0x08, 0x00],
            )])
        });

        let handles = init::send(&mut hci, Role::Peripheral, false, 7).unwrap();

        assert_eq!(
            handles,
            init::GapHandles {
                service_handle: 5,
                dev_name_char_handle: 6,
                appearance_char_handle: 8,
            }
        );
        assert_eq!(firmware.commands()[0].parameters(), &[0x01, 0x00, 0x07]);
    }

    #[test]
    fn init_of_the_older_stack_only_sends_the_role() {
        let firmware = MockFirmware::with_variant(Variant::Idb04a1);

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb04a1);

        init::send(&mut hci, Role::Central, true, 7).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x03]);
    }

    #[test]
    fn discoverable_parameters_are_concatenated() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        let name = [AD_TYPE_COMPLETE_LOCAL_NAME, b'a', b'b'];

        let parameters = DiscoverableParameters::new(AdvertisingType::ScannableUndirected, 0x0800, &name);

        set_discoverable::send(&mut hci, &parameters).unwrap();

        assert_eq!(
            firmware.commands()[0].parameters(),
            &[0x02, 0x00, 0x08, 0x00, 0x08, 0x00, 0x00, 0x03, 0x09, b'a', b'b', 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn oversized_advertising_data_is_not_sent() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        assert!(update_adv_data::send(&mut hci, &[0; 32]).is_err());
        assert!(firmware.commands().is_empty());

        update_adv_data::send(&mut hci, &[0x02, 0x01, 0x06]).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x03, 0x02, 0x01, 0x06]);
    }

    #[test]
    fn auth_requirement_with_fixed_pin() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        set_auth_requirement::send(&mut hci, &set_auth_requirement::AuthRequirement::default()).unwrap();

        let commands = firmware.commands();

        let parameters = commands[0].parameters();

        assert_eq!(parameters.len(), 26);
        assert_eq!(&parameters[..2], &[0x01, 0x00]);
        assert_eq!(&parameters[18..], &[7, 16, 0, 0x40, 0xE2, 0x01, 0x00, 0x01]);
    }

    #[test]
    fn terminate_places_the_reason_after_the_handle() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        terminate::send(&mut hci, 0x0801, 0x13).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x01, 0x08, 0x13]);
    }

    #[test]
    fn discovery_uses_one_byte_address_type() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        start_general_discovery_proc::send(&mut hci, &DiscoveryParameters::default()).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x10, 0x00, 0x10, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn direct_connectable_by_variant() {
        let parameters = set_direct_connectable::DirectConnectable {
            own_address_type: AddressType::Public,
            directed_advertising_type: 0x04,
            initiator_address_type: AddressType::Random,
            initiator_address: [1, 2, 3, 4, 5, 6],
            interval_min: 0x20,
            interval_max: 0x30,
        };

        let firmware = MockFirmware::with_variant(Variant::Idb04a1);

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb04a1);

        set_direct_connectable::send(&mut hci, &parameters).unwrap();

        assert_eq!(firmware.commands()[0].parameters(), &[0x00, 0x01, 1, 2, 3, 4, 5, 6]);

        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        set_direct_connectable::send(&mut hci, &parameters).unwrap();

        assert_eq!(firmware.commands()[0].parameters().len(), 13);
    }

    #[test]
    fn bonded_devices() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            if command.opcode() == get_bonded_devices::OPCODE {
                Some(vec![mock::command_complete(
                    command.opcode(),
                    &[0x00, 0x01, 0x01, 1, 2, 3, 4, 5, 6],
                )])
            } else {
                Some(vec![mock::command_complete(command.opcode(), &[0x41])])
            }
        });

        assert_eq!(
            get_bonded_devices::send(&mut hci),
            Ok(vec![(AddressType::Random, [1, 2, 3, 4, 5, 6])])
        );
        assert_eq!(is_device_bonded::send(&mut hci, AddressType::Public, [0; 6]), Ok(false));
    }
}
