//! Controller status codes
//!
//! The BlueNRG-MS reports both the standard HCI error codes and its own vendor specific codes
//! through the same status byte.

use core::fmt::{self, Display, Formatter};

macro_rules! status_codes {
    ( $( $name:ident = $val:literal, )* ) => {
        /// A Controller Error
        ///
        /// `Error` covers the controller error codes that the BlueNRG-MS firmware reports, both the
        /// ones listed in volume one part F of the Bluetooth core specification and the vendor
        /// specific ones of the ACI.
        ///
        /// ### `NoError`
        /// The status code zero. It is not an error, but it is what a successful status byte
        /// converts into.
        ///
        /// ### `Unknown`
        /// Any status byte not known to this library.
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Hash)]
        pub enum Error {
            NoError,
            Unknown(u8),
            $( $name, )*
        }

        impl From<u8> for Error {
            fn from(raw: u8) -> Self {
                match raw {
                    0x00 => Error::NoError,
                    $( $val => Error::$name, )*
                    _ => Error::Unknown(raw),
                }
            }
        }

        impl From<Error> for u8 {
            fn from(error: Error) -> u8 {
                match error {
                    Error::NoError => 0x00,
                    Error::Unknown(raw) => raw,
                    $( Error::$name => $val, )*
                }
            }
        }

        impl fmt::Debug for Error {
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                match *self {
                    Error::NoError => f.write_str("NoError"),
                    Error::Unknown(val) => write!(f, "Unknown Error Code (0x{:X})", val),
                    $( Error::$name => write!(f, concat!(stringify!($name), " (0x{:X})"), $val), )*
                }
            }
        }
    };
}

status_codes! {
    UnknownHciCommand = 0x01,
    UnknownConnectionIdentifier = 0x02,
    AuthenticationFailure = 0x05,
    PinOrKeyMissing = 0x06,
    MemoryCapacityExceeded = 0x07,
    ConnectionTimeout = 0x08,
    CommandDisallowed = 0x0C,
    UnsupportedFeatureOrParameterValue = 0x11,
    InvalidHciCommandParameters = 0x12,
    RemoteUserTerminatedConnection = 0x13,
    RemoteDeviceTerminatedConnectionDueToLowResources = 0x14,
    RemoteDeviceTerminatedConnectionDueToPowerOff = 0x15,
    ConnectionTerminatedByLocalHost = 0x16,
    UnsupportedRemoteFeature = 0x1A,
    InvalidLlParameters = 0x1E,
    UnspecifiedError = 0x1F,
    LlResponseTimeout = 0x22,
    LmpPduNotAllowed = 0x24,
    InstantPassed = 0x28,
    PairingWithUnitKeyNotSupported = 0x29,
    ControllerBusy = 0x3A,
    UnacceptableConnectionParameters = 0x3B,
    AdvertisingTimeout = 0x3C,
    ConnectionTerminatedDueToMicFailure = 0x3D,
    ConnectionFailedToBeEstablished = 0x3E,
    // BlueNRG-MS vendor codes
    Failed = 0x41,
    InvalidParameters = 0x42,
    NotAllowed = 0x46,
    GenericError = 0x47,
    AddressNotResolved = 0x48,
    FlashReadFailed = 0x49,
    FlashWriteFailed = 0x4A,
    FlashEraseFailed = 0x4B,
    InvalidCid = 0x50,
    TimerNotValidLayer = 0x54,
    TimerInsufficientResources = 0x55,
    CsrkNotFound = 0x5A,
    IrkNotFound = 0x5B,
    DeviceNotFoundInDatabase = 0x5C,
    SecurityDatabaseFull = 0x5D,
    DeviceNotBonded = 0x5E,
    DeviceInBlacklist = 0x5F,
    InvalidHandle = 0x60,
    InvalidParameter = 0x61,
    OutOfHandles = 0x62,
    InvalidOperation = 0x63,
    InsufficientResources = 0x64,
    InsufficientEncryptionKeySize = 0x65,
    CharacteristicAlreadyExists = 0x66,
    NoValidSlot = 0x82,
    ScanWindowTooShort = 0x83,
    NewIntervalFailed = 0x84,
    IntervalTooLarge = 0x85,
    LengthFailed = 0x86,
    ProfileAlreadyInitialized = 0xF0,
    NullParameter = 0xF1,
    Timeout = 0xFF,
}

impl Error {
    pub fn ok_or_else<F, E>(self, err: F) -> Result<(), E>
    where
        F: FnOnce(Self) -> E,
    {
        if let Error::NoError = self {
            Ok(())
        } else {
            Err(err(self))
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Error::NoError
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

/// Hardware error code
///
/// The code carried by a Hardware Error event. The BlueNRG-MS defines three of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardwareCode {
    SpiFraming,
    RadioState,
    TimerOverrun,
    Unknown(u8),
}

impl From<u8> for HardwareCode {
    fn from(raw: u8) -> Self {
        match raw {
            0 => HardwareCode::SpiFraming,
            1 => HardwareCode::RadioState,
            2 => HardwareCode::TimerOverrun,
            _ => HardwareCode::Unknown(raw),
        }
    }
}

impl Display for HardwareCode {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            HardwareCode::SpiFraming => f.write_str("SPI framing error"),
            HardwareCode::RadioState => f.write_str("radio state error"),
            HardwareCode::TimerOverrun => f.write_str("timer overrun error"),
            HardwareCode::Unknown(code) => write!(f, "unknown hardware error 0x{:02X}", code),
        }
    }
}
