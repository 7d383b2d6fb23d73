//! Attribute identifiers
//!
//! The BlueNRG-MS firmware only accepts UUIDs in their 16 bit and 128 bit forms. Unlike the
//! expanded Bluetooth Base UUID arithmetic, a short and a long UUID are never considered equal
//! here. Two UUIDs are equal only when their raw bytes are equal.

use core::convert::TryFrom;
use core::fmt;

/// UUID type value for a 16 bit UUID as used by the ACI GATT commands
pub const UUID_TYPE_16: u8 = 0x01;

/// UUID type value for a 128 bit UUID as used by the ACI GATT commands
pub const UUID_TYPE_128: u8 = 0x02;

/// Universally Unique Identifier
///
/// A `Uuid` is either two or sixteen bytes long. The bytes are kept in the order the firmware
/// expects them, which is the reverse of the written form.
///
/// ```
/// # use bo_tie_bluenrg::uuid::Uuid;
/// # use core::convert::TryFrom;
/// let uuid = Uuid::try_from("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap();
///
/// assert_eq!(uuid.to_string(), "6e400001-b5a3-f393-e0a9-e50e24dcca9e");
/// assert_eq!(uuid.as_le_bytes()[0], 0x9e);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Uuid {
    Bits16(u16),
    Bits128(u128),
}

impl Uuid {
    pub const fn from_u16(v: u16) -> Self {
        Uuid::Bits16(v)
    }

    pub const fn from_u128(v: u128) -> Self {
        Uuid::Bits128(v)
    }

    /// The UUID type code the firmware uses for this UUID
    pub fn uuid_type(&self) -> u8 {
        match self {
            Uuid::Bits16(_) => UUID_TYPE_16,
            Uuid::Bits128(_) => UUID_TYPE_128,
        }
    }

    /// Number of bytes in the raw form (2 or 16)
    pub fn len(&self) -> usize {
        match self {
            Uuid::Bits16(_) => 2,
            Uuid::Bits128(_) => 16,
        }
    }

    /// The raw bytes, byte-reversed relative to the written form
    pub fn as_le_bytes(&self) -> Vec<u8> {
        match self {
            Uuid::Bits16(v) => v.to_le_bytes().to_vec(),
            Uuid::Bits128(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// Create a `Uuid` from raw little endian bytes as they appear in an event
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, UuidFormatError<'static>> {
        match bytes.len() {
            2 => Ok(Uuid::Bits16(<u16>::from_le_bytes([bytes[0], bytes[1]]))),
            16 => {
                let mut raw = [0u8; 16];

                raw.copy_from_slice(bytes);

                Ok(Uuid::Bits128(<u128>::from_le_bytes(raw)))
            }
            len => Err(UuidFormatError::IncorrectLength(len)),
        }
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The written form
///
/// A 16 bit UUID is written as four hex digits, a 128 bit UUID as the usual
/// \[8\]-\[4\]-\[4\]-\[4\]-\[12\] grouping.
impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Uuid::Bits16(v) => write!(f, "{:04x}", v),
            Uuid::Bits128(v) => write!(
                f,
                "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
                (v >> 96) as u32,
                (v >> 80) as u16,
                (v >> 64) as u16,
                (v >> 48) as u16,
                v & 0xFFFF_FFFF_FFFF
            ),
        }
    }
}

impl From<u16> for Uuid {
    fn from(v: u16) -> Uuid {
        Self::from_u16(v)
    }
}

impl From<u128> for Uuid {
    fn from(v: u128) -> Uuid {
        Self::from_u128(v)
    }
}

#[cfg(feature = "uuid-crate")]
impl From<uuid::Uuid> for Uuid {
    fn from(uuid: uuid::Uuid) -> Uuid {
        <u128>::from_be_bytes(*uuid.as_bytes()).into()
    }
}

#[cfg(feature = "uuid-crate")]
impl From<Uuid> for uuid::Uuid {
    fn from(uuid: Uuid) -> uuid::Uuid {
        match uuid {
            Uuid::Bits16(v) => uuid::Uuid::from_u128(v as u128),
            Uuid::Bits128(v) => uuid::Uuid::from_bytes(v.to_be_bytes()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UuidFormatError<'a> {
    /// The number of bytes is neither 2 nor 16
    IncorrectLength(usize),
    /// An odd number of hex digits
    IncompleteByte,
    IncorrectDigit(&'a str),
}

impl<'a> fmt::Display for UuidFormatError<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            UuidFormatError::IncorrectLength(len) => {
                write!(f, "a UUID must be 2 or 16 bytes long, not {} bytes", len)
            }
            UuidFormatError::IncompleteByte => write!(f, "odd number of hex digits"),
            UuidFormatError::IncorrectDigit(digits) => {
                write!(f, "digits '{}' are not hexadecimal", digits)
            }
        }
    }
}

impl<'a> std::error::Error for UuidFormatError<'a> {}

/// Create a UUID from its written form
///
/// Dashes are ignored, so both `"180d"` and `"6e400001-b5a3-f393-e0a9-e50e24dcca9e"` are
/// accepted. The remaining hex digits must make up exactly 2 or 16 bytes.
impl<'a> TryFrom<&'a str> for Uuid {
    type Error = UuidFormatError<'a>;

    fn try_from(v: &'a str) -> Result<Self, Self::Error> {
        let digits: Vec<&'a str> = v
            .split('-')
            .flat_map(|field| {
                (0..field.len())
                    .step_by(2)
                    .map(move |i| field.get(i..(i + 2).min(field.len())))
            })
            .map(|pair| pair.ok_or(UuidFormatError::IncorrectDigit(v)))
            .collect::<Result<_, _>>()?;

        let mut be_bytes = Vec::with_capacity(digits.len());

        for pair in digits {
            if pair.len() != 2 {
                return Err(UuidFormatError::IncompleteByte);
            }

            // from_str_radix also takes a sign
            if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(UuidFormatError::IncorrectDigit(pair));
            }

            be_bytes.push(<u8>::from_str_radix(pair, 16).or(Err(UuidFormatError::IncorrectDigit(pair)))?);
        }

        be_bytes.reverse();

        Uuid::from_le_bytes(&be_bytes)
    }
}

/// Create a UUID from bytes in the written (big endian) order
impl<'a> TryFrom<&'a [u8]> for Uuid {
    type Error = UuidFormatError<'static>;

    fn try_from(be_bytes: &'a [u8]) -> Result<Self, Self::Error> {
        let le: Vec<u8> = be_bytes.iter().rev().copied().collect();

        Uuid::from_le_bytes(&le)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn short_and_long_forms() {
        let short = Uuid::try_from("2902").unwrap();

        assert_eq!(short, Uuid::from_u16(0x2902));
        assert_eq!(short.uuid_type(), UUID_TYPE_16);
        assert_eq!(short.as_le_bytes(), vec![0x02, 0x29]);

        let long = Uuid::try_from("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap();

        assert_eq!(long, Uuid::from_u128(0x6e400001_b5a3_f393_e0a9_e50e24dcca9e));
        assert_eq!(long.uuid_type(), UUID_TYPE_128);
        assert_eq!(long.as_le_bytes()[..2], [0x9e, 0xca]);
        assert_eq!(long.as_le_bytes()[15], 0x6e);
    }

    #[test]
    fn short_is_not_long() {
        let short = Uuid::from_u16(0x180D);
        let long = Uuid::try_from("0000180d-0000-1000-8000-00805f9b34fb").unwrap();

        assert_ne!(short, long);
    }

    #[test]
    fn invalid_lengths() {
        assert_eq!(Uuid::try_from("12"), Err(UuidFormatError::IncorrectLength(1)));
        assert_eq!(Uuid::try_from("123456"), Err(UuidFormatError::IncorrectLength(3)));
        assert_eq!(Uuid::try_from("123"), Err(UuidFormatError::IncompleteByte));
        assert!(Uuid::try_from("zz02").is_err());
        assert!(Uuid::try_from(&[1u8, 2, 3, 4][..]).is_err());
        assert!(Uuid::from_le_bytes(&[0u8; 15]).is_err());
    }

    #[test]
    fn signs_are_not_digits() {
        assert_eq!(Uuid::try_from("+180"), Err(UuidFormatError::IncorrectDigit("+1")));
        assert_eq!(Uuid::try_from("18+0"), Err(UuidFormatError::IncorrectDigit("+0")));
        assert_eq!(Uuid::try_from("180D"), Ok(Uuid::from_u16(0x180D)));
    }

    #[test]
    fn display_then_parse_is_identity() {
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let uuid = if rng.gen::<bool>() {
                Uuid::from_u16(rng.gen())
            } else {
                Uuid::from_u128(rng.gen())
            };

            let text = uuid.to_string();

            assert_eq!(Uuid::try_from(text.as_str()), Ok(uuid), "{}", text);
        }
    }

    #[test]
    fn raw_byte_round_trip() {
        let uuid = Uuid::try_from("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap();

        assert_eq!(Uuid::from_le_bytes(&uuid.as_le_bytes()), Ok(uuid));
    }
}
