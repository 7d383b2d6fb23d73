//! Session configuration
//!
//! [`PeripheralConfig`] and [`ScannerConfig`] hold everything a session needs before it owns the
//! hardware. Both can be stored as a compact binary blob with `to_bytes` and loaded back with
//! `from_bytes`, for example to keep them in the flash of the host.

use crate::aci::AddressType;
use crate::hci::engine::MAX_TIMEOUT;
use crate::hci::schema::Variant;
use crate::hci_transport::DEFAULT_RETRIES;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public address used when none is configured
pub const DEFAULT_ADDRESS: [u8; 6] = [0x02, 0x80, 0xE1, 0x00, 0x34, 0x14];

/// Interval between calls to the periodic callback of the run loop
pub const DEFAULT_RUN_INTERVAL: Duration = Duration::from_millis(1000);

/// Advertising interval in units of 625 µs (1.28 s)
pub const DEFAULT_ADVERTISING_INTERVAL: u16 = 0x0800;

/// Transmit power of the BlueNRG-MS
///
/// The default is the high power amplifier at level 5, about +2 dBm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxPower {
    pub high_power: bool,
    pub pa_level: u8,
}

impl Default for TxPower {
    fn default() -> Self {
        TxPower {
            high_power: true,
            pa_level: 5,
        }
    }
}

/// Parse an address written as twelve hex digits
///
/// The bytes are kept in the written order, which is the order the configuration data area of
/// the BlueNRG-MS takes them in.
///
/// ```
/// # use bo_tie_bluenrg::config::{address_from_hex, DEFAULT_ADDRESS};
/// assert_eq!(address_from_hex("0280E1003414"), Some(DEFAULT_ADDRESS));
/// assert_eq!(address_from_hex("0280E10034"), None);
/// ```
pub fn address_from_hex(hex: &str) -> Option<[u8; 6]> {
    if hex.len() != 12 || !hex.is_ascii() {
        return None;
    }

    let mut address = [0u8; 6];

    for (byte, i) in address.iter_mut().zip((0..12).step_by(2)) {
        *byte = <u8>::from_str_radix(&hex[i..(i + 2)], 16).ok()?;
    }

    Some(address)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralConfig {
    pub address: [u8; 6],
    pub address_type: AddressType,
    /// The device name, also advertised as the complete local name
    pub name: String,
    /// Connectable advertising, otherwise only scannable
    pub connectable: bool,
    /// Advertising interval in units of 625 µs
    pub interval: u16,
    /// Advertising data set after advertising starts
    pub advertising_data: Option<Vec<u8>>,
    pub tx_power: TxPower,
    pub variant: Variant,
    pub run_interval: Duration,
    pub command_timeout: Duration,
    pub retries: usize,
}

impl PeripheralConfig {
    pub fn new<N: Into<String>>(address: [u8; 6], name: N) -> Self {
        PeripheralConfig {
            address,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        PeripheralConfig {
            address: DEFAULT_ADDRESS,
            address_type: AddressType::Public,
            name: String::new(),
            connectable: false,
            interval: DEFAULT_ADVERTISING_INTERVAL,
            advertising_data: None,
            tx_power: TxPower::default(),
            variant: Variant::default(),
            run_interval: DEFAULT_RUN_INTERVAL,
            command_timeout: MAX_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    pub address: [u8; 6],
    pub name: String,
    /// Scan interval in units of 625 µs
    pub scan_interval: u16,
    /// Scan window in units of 625 µs
    pub scan_window: u16,
    pub filter_duplicates: bool,
    pub tx_power: TxPower,
    pub variant: Variant,
    /// Interval of the periodic callback while connected
    pub run_interval: Duration,
    pub command_timeout: Duration,
    pub retries: usize,
}

impl ScannerConfig {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(bytes)
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            address: DEFAULT_ADDRESS,
            name: String::new(),
            scan_interval: 0x10,
            scan_window: 0x10,
            filter_duplicates: true,
            tx_power: TxPower::default(),
            variant: Variant::default(),
            run_interval: DEFAULT_RUN_INTERVAL,
            command_timeout: MAX_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_defaults() {
        let config = ScannerConfig::default();

        assert_eq!(config.address, [0x02, 0x80, 0xE1, 0x00, 0x34, 0x14]);
        assert!(config.name.is_empty());
        assert_eq!(config.retries, 5);
        assert_eq!(config.command_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn stored_configuration() {
        let mut config = PeripheralConfig::new(address_from_hex("AABBCCDDEEFF").unwrap(), "sensor");

        config.connectable = true;
        config.advertising_data = Some(vec![0x02, 0x01, 0x06]);
        config.variant = Variant::Idb04a1;

        let bytes = config.to_bytes().unwrap();

        assert_eq!(PeripheralConfig::from_bytes(&bytes).unwrap(), config);

        assert!(PeripheralConfig::from_bytes(&bytes[..bytes.len() / 2]).is_err());
    }

    #[test]
    fn bad_addresses() {
        assert_eq!(address_from_hex("0280E100341G"), None);
        assert_eq!(address_from_hex("0280E1003414FF"), None);
        assert_eq!(address_from_hex("0280E10034é"), None);
    }
}
