//! Advertising data
//!
//! Advertising data is a sequence of AD structures. Each structure is a length byte followed by
//! the AD type and the data, the length counts the type and the data. The BlueNRG-MS takes at
//! most 31 bytes of advertising data.

use crate::aci::gap::{AD_TYPE_COMPLETE_LOCAL_NAME, MAX_ADV_DATA_LEN};
use core::convert::TryFrom;
use core::fmt;

/// Assigned numbers of the AD types
pub mod ad_type {
    pub const FLAGS: u8 = 0x01;
    pub const INCOMPLETE_16BIT_SERVICE_UUIDS: u8 = 0x02;
    pub const COMPLETE_16BIT_SERVICE_UUIDS: u8 = 0x03;
    pub const INCOMPLETE_128BIT_SERVICE_UUIDS: u8 = 0x06;
    pub const COMPLETE_128BIT_SERVICE_UUIDS: u8 = 0x07;
    pub const SHORTENED_LOCAL_NAME: u8 = 0x08;
    pub const COMPLETE_LOCAL_NAME: u8 = super::AD_TYPE_COMPLETE_LOCAL_NAME;
    pub const TX_POWER_LEVEL: u8 = 0x0A;
    pub const SERVICE_DATA_16BIT_UUID: u8 = 0x16;
    pub const APPEARANCE: u8 = 0x19;
    pub const MANUFACTURER_SPECIFIC_DATA: u8 = 0xFF;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The data would not fit in the advertising packet
    TooLarge { overflow: usize, remaining: usize },
    /// The length of an AD structure is larger than the remaining bytes
    IncorrectLength,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TooLarge { overflow, remaining } => write!(
                f,
                "Advertising data too large, {} bytes over with {} remaining",
                overflow, remaining
            ),
            Error::IncorrectLength => write!(
                f,
                "The length of an AD structure is larger than the remaining bytes"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// The local name as taken by the discoverable commands
///
/// This is the AD type followed by the name, the firmware adds the length. An empty name gives
/// no local name at all.
///
/// ```
/// # use bo_tie_bluenrg::gap::advertise::local_name_ad;
/// assert_eq!(local_name_ad("BLE").unwrap(), vec![0x09, b'B', b'L', b'E']);
/// assert!(local_name_ad("").unwrap().is_empty());
/// ```
pub fn local_name_ad(name: &str) -> Result<Vec<u8>, Error> {
    if name.is_empty() {
        return Ok(Vec::new());
    }

    // one byte for the length the firmware adds
    let remaining = MAX_ADV_DATA_LEN - 1;

    let len = 1 + name.len();

    if len > remaining {
        return Err(Error::TooLarge {
            overflow: len - remaining,
            remaining,
        });
    }

    let mut ad = Vec::with_capacity(len);

    ad.push(AD_TYPE_COMPLETE_LOCAL_NAME);
    ad.extend_from_slice(name.as_bytes());

    Ok(ad)
}

/// Advertising data under construction
///
/// Structures are only added if they fit in the 31 bytes of advertising data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvertisingData {
    data: Vec<u8>,
}

impl AdvertisingData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an AD structure
    pub fn try_push(&mut self, ad_type: u8, data: &[u8]) -> Result<(), Error> {
        let len = 2 + data.len();

        let remaining = self.remaining();

        if len > remaining {
            return Err(Error::TooLarge {
                overflow: len - remaining,
                remaining,
            });
        }

        self.data.push((1 + data.len()) as u8);
        self.data.push(ad_type);
        self.data.extend_from_slice(data);

        Ok(())
    }

    /// Add the flags structure
    pub fn try_push_flags(&mut self, flags: u8) -> Result<(), Error> {
        self.try_push(ad_type::FLAGS, &[flags])
    }

    pub fn remaining(&self) -> usize {
        MAX_ADV_DATA_LEN - self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl<'a> TryFrom<&'a [u8]> for AdvertisingData {
    type Error = Error;

    fn try_from(raw: &'a [u8]) -> Result<Self, Self::Error> {
        if raw.len() > MAX_ADV_DATA_LEN {
            return Err(Error::TooLarge {
                overflow: raw.len() - MAX_ADV_DATA_LEN,
                remaining: MAX_ADV_DATA_LEN,
            });
        }

        AdStructures::iter(raw).try_for_each(|ad| ad.map(|_| ()))?;

        Ok(AdvertisingData { data: raw.to_vec() })
    }
}

/// An iterator over the AD structures of received advertising data
///
/// Each item is the AD type with its data.
pub struct AdStructures<'a> {
    bytes: &'a [u8],
}

impl<'a> AdStructures<'a> {
    pub fn iter(bytes: &'a [u8]) -> Self {
        AdStructures { bytes }
    }
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = Result<(u8, &'a [u8]), Error>;

    fn next(&mut self) -> Option<Self::Item> {
        // zero length structures are padding
        while let Some((0, rest)) = self.bytes.split_first() {
            self.bytes = rest;
        }

        self.bytes.split_first().map(|(first, rest)| {
            let len = *first as usize;

            if rest.len() >= len {
                let (structure, rest_of) = rest.split_at(len);

                self.bytes = rest_of;

                Ok((structure[0], &structure[1..]))
            } else {
                self.bytes = &[];

                Err(Error::IncorrectLength)
            }
        })
    }
}

/// Get the local name from advertising data
///
/// The complete local name is preferred over the shortened one.
pub fn find_local_name(data: &[u8]) -> Option<&str> {
    let mut shortened = None;

    for (ty, name) in AdStructures::iter(data).filter_map(Result::ok) {
        match ty {
            ad_type::COMPLETE_LOCAL_NAME => return core::str::from_utf8(name).ok(),
            ad_type::SHORTENED_LOCAL_NAME => shortened = core::str::from_utf8(name).ok(),
            _ => (),
        }
    }

    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_limit() {
        let mut data = AdvertisingData::new();

        data.try_push_flags(0x06).unwrap();
        data.try_push(ad_type::MANUFACTURER_SPECIFIC_DATA, &[0x30, 0x00, 1, 2, 3]).unwrap();

        assert_eq!(data.as_bytes()[..3], [0x02, 0x01, 0x06]);
        assert_eq!(data.remaining(), 31 - 3 - 7);

        assert_eq!(
            data.try_push(ad_type::COMPLETE_LOCAL_NAME, &[b'a'; 20]),
            Err(Error::TooLarge {
                overflow: 1,
                remaining: 21
            })
        );

        assert_eq!(data.as_bytes().len(), 10);
    }

    #[test]
    fn long_local_name() {
        assert!(local_name_ad(&"n".repeat(29)).is_ok());
        assert_eq!(
            local_name_ad(&"n".repeat(30)),
            Err(Error::TooLarge {
                overflow: 1,
                remaining: 30
            })
        );
    }

    #[test]
    fn received_structures() {
        let raw = [0x02, 0x01, 0x06, 0x00, 0x04, 0x09, b'B', b'L', b'E', 0x03, 0x08, b'B', b'L'];

        let types: Vec<u8> = AdStructures::iter(&raw).map(|ad| ad.unwrap().0).collect();

        assert_eq!(types, vec![0x01, 0x09, 0x08]);

        assert_eq!(find_local_name(&raw), Some("BLE"));
        assert_eq!(find_local_name(&raw[9..]), Some("BL"));

        assert_eq!(
            AdvertisingData::try_from(&[0x05, 0x09, b'B'][..]),
            Err(Error::IncorrectLength)
        );
    }
}
