//! BlueNRG-MS Application Command Interface
//!
//! The ACI is the vendor command group (OGF `0x3F`) of the BlueNRG-MS. The firmware runs the GAP
//! and GATT layers itself, so the commands here are how the host builds the attribute database,
//! advertises, scans and connects. Every command is a module with an `OPCODE` and a `send`
//! function, the same as the standard HCI commands in [`hci`](crate::hci).
//!
//! Some request layouts differ between the IDB05A1 and IDB04A1 stacks. Functions for those
//! commands pick the parameters for the variant of the [`HostInterface`](crate::hci::engine::HostInterface).

/// Create a vendor command that only returns a status
///
/// The ocf is given as `group::NAME` of [`crate::hci::schema::vendor`].
macro_rules! vendor_command {
    (
        $(#[$attrs:meta])*
        $name:ident, $group:ident :: $ocf:ident $(, $arg:ident : $ty:ty )* $(,)?
    ) => {
        status_command! {
            $(#[$attrs])*
            $name,
            crate::hci::schema::vendor::OGF_VENDOR,
            crate::hci::schema::vendor::$group::$ocf
            $(, $arg: $ty )*
        }
    };
}

pub mod gap;
pub mod gatt;
pub mod hal;
pub mod l2cap;
pub mod updater;

/// Own and peer address types used by the ACI
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AddressType {
    Public,
    Random,
}

impl AddressType {
    pub fn val(&self) -> u8 {
        match self {
            AddressType::Public => 0x00,
            AddressType::Random => 0x01,
        }
    }

    pub fn from_val(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(AddressType::Public),
            0x01 => Some(AddressType::Random),
            _ => None,
        }
    }
}

impl Default for AddressType {
    fn default() -> Self {
        AddressType::Public
    }
}

/// Split a vendor opcode into its ACI layer name
///
/// This is for logging, the returned name is the group of the ocf.
pub fn layer_name(ocf: u16) -> &'static str {
    match ocf {
        0x0000..=0x001F => "HAL",
        0x0020..=0x002F => "UPDATER",
        0x0080..=0x00FF => "GAP",
        0x0100..=0x017F => "GATT",
        0x0180..=0x01FF => "L2CAP",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_types() {
        assert_eq!(AddressType::from_val(0x01), Some(AddressType::Random));
        assert_eq!(AddressType::from_val(0x02), None);
        assert_eq!(AddressType::default().val(), 0x00);
    }

    #[test]
    fn layers() {
        use crate::hci::schema::vendor;

        assert_eq!(layer_name(vendor::hal::WRITE_CONFIG_DATA), "HAL");
        assert_eq!(layer_name(vendor::updater::CALC_CRC), "UPDATER");
        assert_eq!(layer_name(vendor::gap::INIT), "GAP");
        assert_eq!(layer_name(vendor::gatt::UPD_CHAR_VAL_EXT), "GATT");
        assert_eq!(layer_name(vendor::l2cap::CONN_PARAM_UPDATE_RESP), "L2CAP");
    }
}
