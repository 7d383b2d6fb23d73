//! The Attribute Protocol
//!
//! The BlueNRG-MS runs the ATT server itself, the host only sees attribute PDUs when ACL data is
//! routed to it. This module names and takes apart those PDUs, and has the ATT error codes used
//! when replying to permission requests.
//!
//! An attribute opcode is one byte split into three fields.
//!
//! ```text
//!  7 6 5 4 3 2 1 0
//! -----------------
//! |c|b|     a     |
//! -----------------
//! ```
//! * `a` is the method
//! * `b` is the command flag
//! * `c` is the authentication signature flag

use core::convert::TryFrom;
use core::fmt;

/// The error code for refusing a write
pub const WRITE_NOT_PERMITTED: u8 = 0x03;

/// The size of the authentication signature at the end of a signed PDU
pub const SIGNATURE_SIZE: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PduOpCode {
    /// A boolean to indicate if there is an authentication signature in the Attribute PDU
    sig: bool,
    /// Command flag
    command: bool,
    /// Method
    method: u8,
}

impl PduOpCode {
    pub fn method(&self) -> u8 {
        self.method
    }

    pub fn is_command(&self) -> bool {
        self.command
    }

    pub fn is_signed(&self) -> bool {
        self.sig
    }

    pub fn as_raw(&self) -> u8 {
        self.method & 0x3F | (if self.sig { 1 } else { 0 }) << 7 | (if self.command { 1 } else { 0 }) << 6
    }

    pub fn name(&self) -> Option<PduName> {
        PduName::try_from(self.as_raw()).ok()
    }
}

impl From<u8> for PduOpCode {
    fn from(val: u8) -> Self {
        PduOpCode {
            sig: 0 != (val & (1 << 7)),
            command: 0 != (val & (1 << 6)),
            method: val & 0x3F,
        }
    }
}

impl fmt::Display for PduOpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#x}", self.as_raw()),
        }
    }
}

/// The attribute PDUs of a version 4.1 controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PduName {
    ErrorResponse,
    ExchangeMtuRequest,
    ExchangeMtuResponse,
    FindInformationRequest,
    FindInformationResponse,
    FindByTypeValueRequest,
    FindByTypeValueResponse,
    ReadByTypeRequest,
    ReadByTypeResponse,
    ReadRequest,
    ReadResponse,
    ReadBlobRequest,
    ReadBlobResponse,
    ReadMultipleRequest,
    ReadMultipleResponse,
    ReadByGroupTypeRequest,
    ReadByGroupTypeResponse,
    WriteRequest,
    WriteResponse,
    WriteCommand,
    SignedWriteCommand,
    PrepareWriteRequest,
    PrepareWriteResponse,
    ExecuteWriteRequest,
    ExecuteWriteResponse,
    HandleValueNotification,
    HandleValueIndication,
    HandleValueConfirmation,
}

impl TryFrom<u8> for PduName {
    type Error = ();

    fn try_from(val: u8) -> Result<Self, ()> {
        match val {
            0x01 => Ok(PduName::ErrorResponse),
            0x02 => Ok(PduName::ExchangeMtuRequest),
            0x03 => Ok(PduName::ExchangeMtuResponse),
            0x04 => Ok(PduName::FindInformationRequest),
            0x05 => Ok(PduName::FindInformationResponse),
            0x06 => Ok(PduName::FindByTypeValueRequest),
            0x07 => Ok(PduName::FindByTypeValueResponse),
            0x08 => Ok(PduName::ReadByTypeRequest),
            0x09 => Ok(PduName::ReadByTypeResponse),
            0x0A => Ok(PduName::ReadRequest),
            0x0B => Ok(PduName::ReadResponse),
            0x0C => Ok(PduName::ReadBlobRequest),
            0x0D => Ok(PduName::ReadBlobResponse),
            0x0E => Ok(PduName::ReadMultipleRequest),
            0x0F => Ok(PduName::ReadMultipleResponse),
            0x10 => Ok(PduName::ReadByGroupTypeRequest),
            0x11 => Ok(PduName::ReadByGroupTypeResponse),
            0x12 => Ok(PduName::WriteRequest),
            0x13 => Ok(PduName::WriteResponse),
            0x52 => Ok(PduName::WriteCommand),
            0xD2 => Ok(PduName::SignedWriteCommand),
            0x16 => Ok(PduName::PrepareWriteRequest),
            0x17 => Ok(PduName::PrepareWriteResponse),
            0x18 => Ok(PduName::ExecuteWriteRequest),
            0x19 => Ok(PduName::ExecuteWriteResponse),
            0x1B => Ok(PduName::HandleValueNotification),
            0x1D => Ok(PduName::HandleValueIndication),
            0x1E => Ok(PduName::HandleValueConfirmation),
            _ => Err(()),
        }
    }
}

impl From<PduName> for u8 {
    fn from(name: PduName) -> Self {
        match name {
            PduName::ErrorResponse => 0x01,
            PduName::ExchangeMtuRequest => 0x02,
            PduName::ExchangeMtuResponse => 0x03,
            PduName::FindInformationRequest => 0x04,
            PduName::FindInformationResponse => 0x05,
            PduName::FindByTypeValueRequest => 0x06,
            PduName::FindByTypeValueResponse => 0x07,
            PduName::ReadByTypeRequest => 0x08,
            PduName::ReadByTypeResponse => 0x09,
            PduName::ReadRequest => 0x0A,
            PduName::ReadResponse => 0x0B,
            PduName::ReadBlobRequest => 0x0C,
            PduName::ReadBlobResponse => 0x0D,
            PduName::ReadMultipleRequest => 0x0E,
            PduName::ReadMultipleResponse => 0x0F,
            PduName::ReadByGroupTypeRequest => 0x10,
            PduName::ReadByGroupTypeResponse => 0x11,
            PduName::WriteRequest => 0x12,
            PduName::WriteResponse => 0x13,
            PduName::WriteCommand => 0x52,
            PduName::SignedWriteCommand => 0xD2,
            PduName::PrepareWriteRequest => 0x16,
            PduName::PrepareWriteResponse => 0x17,
            PduName::ExecuteWriteRequest => 0x18,
            PduName::ExecuteWriteResponse => 0x19,
            PduName::HandleValueNotification => 0x1B,
            PduName::HandleValueIndication => 0x1D,
            PduName::HandleValueConfirmation => 0x1E,
        }
    }
}

impl fmt::Display for PduName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PduName::ErrorResponse => "Error Response",
            PduName::ExchangeMtuRequest => "Exchange MTU Request",
            PduName::ExchangeMtuResponse => "Exchange MTU Response",
            PduName::FindInformationRequest => "Find Information Request",
            PduName::FindInformationResponse => "Find Information Response",
            PduName::FindByTypeValueRequest => "Find By Type Value Request",
            PduName::FindByTypeValueResponse => "Find By Type Value Response",
            PduName::ReadByTypeRequest => "Read By Type Request",
            PduName::ReadByTypeResponse => "Read By Type Response",
            PduName::ReadRequest => "Read Request",
            PduName::ReadResponse => "Read Response",
            PduName::ReadBlobRequest => "Read Blob Request",
            PduName::ReadBlobResponse => "Read Blob Response",
            PduName::ReadMultipleRequest => "Read Multiple Request",
            PduName::ReadMultipleResponse => "Read Multiple Response",
            PduName::ReadByGroupTypeRequest => "Read By Group Type Request",
            PduName::ReadByGroupTypeResponse => "Read By Group Type Response",
            PduName::WriteRequest => "Write Request",
            PduName::WriteResponse => "Write Response",
            PduName::WriteCommand => "Write Command",
            PduName::SignedWriteCommand => "Signed Write Command",
            PduName::PrepareWriteRequest => "Prepare Write Request",
            PduName::PrepareWriteResponse => "Prepare Write Response",
            PduName::ExecuteWriteRequest => "Execute Write Request",
            PduName::ExecuteWriteResponse => "Execute Write Response",
            PduName::HandleValueNotification => "Handle Value Notification",
            PduName::HandleValueIndication => "Handle Value Indication",
            PduName::HandleValueConfirmation => "Handle Value Confirmation",
        };

        f.write_str(name)
    }
}

/// The ATT Protocol errors
///
/// See the Bluetooth Specification (v4.1) volume 3, part F, section 3.4.1.1 for the meaning of
/// each error.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Error {
    /// Used to represent 0x00, this should never be used as an error code
    NoError,
    InvalidHandle,
    ReadNotPermitted,
    WriteNotPermitted,
    InvalidPDU,
    InsufficientAuthentication,
    RequestNotSupported,
    InvalidOffset,
    InsufficientAuthorization,
    PrepareQueueFull,
    AttributeNotFound,
    AttributeNotLong,
    InsufficientEncryptionKeySize,
    InvalidAttributeValueLength,
    UnlikelyError,
    InsufficientEncryption,
    UnsupportedGroupType,
    InsufficientResources,
    /// Error codes defined by the application (0x80 to 0x9F)
    Application(u8),
    /// Common profile and service error codes (0xE0 to 0xFF)
    CommonProfile(u8),
    Reserved(u8),
}

impl From<u8> for Error {
    fn from(val: u8) -> Error {
        match val {
            0x00 => Error::NoError,
            0x01 => Error::InvalidHandle,
            0x02 => Error::ReadNotPermitted,
            WRITE_NOT_PERMITTED => Error::WriteNotPermitted,
            0x04 => Error::InvalidPDU,
            0x05 => Error::InsufficientAuthentication,
            0x06 => Error::RequestNotSupported,
            0x07 => Error::InvalidOffset,
            0x08 => Error::InsufficientAuthorization,
            0x09 => Error::PrepareQueueFull,
            0x0A => Error::AttributeNotFound,
            0x0B => Error::AttributeNotLong,
            0x0C => Error::InsufficientEncryptionKeySize,
            0x0D => Error::InvalidAttributeValueLength,
            0x0E => Error::UnlikelyError,
            0x0F => Error::InsufficientEncryption,
            0x10 => Error::UnsupportedGroupType,
            0x11 => Error::InsufficientResources,
            0x80..=0x9F => Error::Application(val),
            0xE0..=0xFF => Error::CommonProfile(val),
            _ => Error::Reserved(val),
        }
    }
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::NoError => 0x00,
            Error::InvalidHandle => 0x01,
            Error::ReadNotPermitted => 0x02,
            Error::WriteNotPermitted => WRITE_NOT_PERMITTED,
            Error::InvalidPDU => 0x04,
            Error::InsufficientAuthentication => 0x05,
            Error::RequestNotSupported => 0x06,
            Error::InvalidOffset => 0x07,
            Error::InsufficientAuthorization => 0x08,
            Error::PrepareQueueFull => 0x09,
            Error::AttributeNotFound => 0x0A,
            Error::AttributeNotLong => 0x0B,
            Error::InsufficientEncryptionKeySize => 0x0C,
            Error::InvalidAttributeValueLength => 0x0D,
            Error::UnlikelyError => 0x0E,
            Error::InsufficientEncryption => 0x0F,
            Error::UnsupportedGroupType => 0x10,
            Error::InsufficientResources => 0x11,
            Error::Application(val) | Error::CommonProfile(val) | Error::Reserved(val) => val,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoError => write!(f, "No Error"),
            Error::InvalidHandle => write!(f, "The attribute handle given was not valid on this server"),
            Error::ReadNotPermitted => write!(f, "The attribute cannot be read"),
            Error::WriteNotPermitted => write!(f, "The attribute cannot be written"),
            Error::InvalidPDU => write!(f, "The attribute PDU was invalid"),
            Error::InsufficientAuthentication => write!(f, "The attribute requires authentication"),
            Error::RequestNotSupported => write!(f, "Attribute server does not support the request received"),
            Error::InvalidOffset => write!(f, "Offset specified was past the end of the attribute"),
            Error::InsufficientAuthorization => write!(f, "The attribute requires authorization"),
            Error::PrepareQueueFull => write!(f, "Too many prepare writes have been queued"),
            Error::AttributeNotFound => write!(f, "No attribute found within the given attribute handle range"),
            Error::AttributeNotLong => write!(f, "The attribute cannot be read using the Read Blob Request"),
            Error::InsufficientEncryptionKeySize => write!(f, "The encryption key size is insufficient"),
            Error::InvalidAttributeValueLength => write!(f, "The attribute value length is invalid"),
            Error::UnlikelyError => write!(f, "The request encountered an unlikely error"),
            Error::InsufficientEncryption => write!(f, "The attribute requires encryption"),
            Error::UnsupportedGroupType => write!(f, "The attribute type is not a supported grouping attribute"),
            Error::InsufficientResources => write!(f, "Insufficient resources to complete the request"),
            Error::Application(val) => write!(f, "Application error 0x{:02X}", val),
            Error::CommonProfile(val) => write!(f, "Common profile error 0x{:02X}", val),
            Error::Reserved(val) => write!(f, "Reserved error code 0x{:02X}", val),
        }
    }
}

impl std::error::Error for Error {}

/// The PDU was empty or too short for its signature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PduTooShort;

impl fmt::Display for PduTooShort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attribute PDU too short")
    }
}

impl std::error::Error for PduTooShort {}

/// An attribute PDU received on the ATT channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pdu<'a> {
    opcode: PduOpCode,
    parameters: &'a [u8],
    signature: Option<&'a [u8]>,
}

impl<'a> Pdu<'a> {
    pub fn try_from_raw(raw: &'a [u8]) -> Result<Self, PduTooShort> {
        let (first, rest) = raw.split_first().ok_or(PduTooShort)?;

        let opcode = PduOpCode::from(*first);

        let (parameters, signature) = if opcode.is_signed() {
            let at = rest.len().checked_sub(SIGNATURE_SIZE).ok_or(PduTooShort)?;

            let (parameters, signature) = rest.split_at(at);

            (parameters, Some(signature))
        } else {
            (rest, None)
        };

        Ok(Pdu {
            opcode,
            parameters,
            signature,
        })
    }

    pub fn opcode(&self) -> PduOpCode {
        self.opcode
    }

    pub fn parameters(&self) -> &'a [u8] {
        self.parameters
    }

    pub fn signature(&self) -> Option<&'a [u8]> {
        self.signature
    }

    /// The error of an *Error Response*
    ///
    /// The parameters of the response are the request opcode, the handle in error and the code.
    pub fn error(&self) -> Option<Error> {
        match self.opcode.name() {
            Some(PduName::ErrorResponse) => self.parameters.get(3).map(|code| Error::from(*code)),
            _ => None,
        }
    }
}

impl fmt::Display for Pdu<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.opcode, self.parameters.len())?;

        if let Some(error) = self.error() {
            write!(f, ": {}", error)?;
        }

        Ok(())
    }
}
