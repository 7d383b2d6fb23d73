//! Security Manager Protocol
//!
//! Pairing is done by the BlueNRG-MS, the host only names the security manager commands it sees
//! on the SMP channel. A command is a one byte code followed by its data.

use core::fmt;

pub const L2CAP_CHANNEL_ID: crate::l2cap::ChannelIdentifier =
    crate::l2cap::ChannelIdentifier::SecurityManagerProtocol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Incorrect Size
    Size,
    /// Incorrect Value
    Value(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Size => write!(f, "Security manager command is empty"),
            Error::Value(val) => write!(f, "Unknown security manager code 0x{:02X}", val),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandType {
    PairingRequest,
    PairingResponse,
    PairingConfirm,
    PairingRandom,
    PairingFailed,
    EncryptionInformation,
    MasterIdentification,
    IdentityInformation,
    IdentityAddressInformation,
    SigningInformation,
    SecurityRequest,
    PairingPublicKey,
    PairingDHKeyCheck,
    PairingKeyPressNotification,
}

impl CommandType {
    pub fn into_val(self) -> u8 {
        match self {
            CommandType::PairingRequest => 0x1,
            CommandType::PairingResponse => 0x2,
            CommandType::PairingConfirm => 0x3,
            CommandType::PairingRandom => 0x4,
            CommandType::PairingFailed => 0x5,
            CommandType::EncryptionInformation => 0x6,
            CommandType::MasterIdentification => 0x7,
            CommandType::IdentityInformation => 0x8,
            CommandType::IdentityAddressInformation => 0x9,
            CommandType::SigningInformation => 0xa,
            CommandType::SecurityRequest => 0xb,
            CommandType::PairingPublicKey => 0xc,
            CommandType::PairingDHKeyCheck => 0xd,
            CommandType::PairingKeyPressNotification => 0xe,
        }
    }

    pub fn try_from_val(val: u8) -> Result<Self, Error> {
        match val {
            0x1 => Ok(CommandType::PairingRequest),
            0x2 => Ok(CommandType::PairingResponse),
            0x3 => Ok(CommandType::PairingConfirm),
            0x4 => Ok(CommandType::PairingRandom),
            0x5 => Ok(CommandType::PairingFailed),
            0x6 => Ok(CommandType::EncryptionInformation),
            0x7 => Ok(CommandType::MasterIdentification),
            0x8 => Ok(CommandType::IdentityInformation),
            0x9 => Ok(CommandType::IdentityAddressInformation),
            0xa => Ok(CommandType::SigningInformation),
            0xb => Ok(CommandType::SecurityRequest),
            0xc => Ok(CommandType::PairingPublicKey),
            0xd => Ok(CommandType::PairingDHKeyCheck),
            0xe => Ok(CommandType::PairingKeyPressNotification),
            _ => Err(Error::Value(val)),
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CommandType::PairingRequest => "Pairing Request",
            CommandType::PairingResponse => "Pairing Response",
            CommandType::PairingConfirm => "Pairing Confirm",
            CommandType::PairingRandom => "Pairing Random",
            CommandType::PairingFailed => "Pairing Failed",
            CommandType::EncryptionInformation => "Encryption Information",
            CommandType::MasterIdentification => "Master Identification",
            CommandType::IdentityInformation => "Identity Information",
            CommandType::IdentityAddressInformation => "Identity Address Information",
            CommandType::SigningInformation => "Signing Information",
            CommandType::SecurityRequest => "Security Request",
            CommandType::PairingPublicKey => "Pairing Public Key",
            CommandType::PairingDHKeyCheck => "Pairing DHKey Check",
            CommandType::PairingKeyPressNotification => "Pairing Keypress Notification",
        };

        f.write_str(name)
    }
}

/// The reason carried by a *Pairing Failed* command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingFailedReason {
    PasskeyEntryFailed,
    OobNotAvailable,
    AuthenticationRequirements,
    ConfirmValueFailed,
    PairingNotSupported,
    EncryptionKeySize,
    CommandNotSupported,
    UnspecifiedReason,
    RepeatedAttempts,
    InvalidParameters,
    DHKeyCheckFailed,
    NumericComparisonFailed,
    BrEdrPairingInProgress,
    CrossTransportKeyDerivationGenerationNotAllowed,
    Reserved(u8),
}

impl From<u8> for PairingFailedReason {
    fn from(val: u8) -> Self {
        match val {
            0x1 => PairingFailedReason::PasskeyEntryFailed,
            0x2 => PairingFailedReason::OobNotAvailable,
            0x3 => PairingFailedReason::AuthenticationRequirements,
            0x4 => PairingFailedReason::ConfirmValueFailed,
            0x5 => PairingFailedReason::PairingNotSupported,
            0x6 => PairingFailedReason::EncryptionKeySize,
            0x7 => PairingFailedReason::CommandNotSupported,
            0x8 => PairingFailedReason::UnspecifiedReason,
            0x9 => PairingFailedReason::RepeatedAttempts,
            0xa => PairingFailedReason::InvalidParameters,
            0xb => PairingFailedReason::DHKeyCheckFailed,
            0xc => PairingFailedReason::NumericComparisonFailed,
            0xd => PairingFailedReason::BrEdrPairingInProgress,
            0xe => PairingFailedReason::CrossTransportKeyDerivationGenerationNotAllowed,
            _ => PairingFailedReason::Reserved(val),
        }
    }
}

/// A security manager command received on the SMP channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command<'a> {
    command_type: CommandType,
    data: &'a [u8],
}

impl<'a> Command<'a> {
    pub fn try_from_raw(raw: &'a [u8]) -> Result<Self, Error> {
        let (code, data) = raw.split_first().ok_or(Error::Size)?;

        Ok(Command {
            command_type: CommandType::try_from_val(*code)?,
            data,
        })
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The reason of a *Pairing Failed* command
    pub fn failed_reason(&self) -> Option<PairingFailedReason> {
        match self.command_type {
            CommandType::PairingFailed => self.data.first().map(|r| PairingFailedReason::from(*r)),
            _ => None,
        }
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.command_type, self.data.len())?;

        if let Some(reason) = self.failed_reason() {
            write!(f, ": {:?}", reason)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_codes() {
        for val in 0x1..=0xeu8 {
            assert_eq!(CommandType::try_from_val(val).unwrap().into_val(), val);
        }

        assert_eq!(CommandType::try_from_val(0x0f), Err(Error::Value(0x0f)));
    }

    #[test]
    fn commands() {
        let request = Command::try_from_raw(&[0x01, 0x03, 0x00, 0x01, 0x10, 0x07, 0x07]).unwrap();

        assert_eq!(request.command_type(), CommandType::PairingRequest);
        assert_eq!(request.data().len(), 6);
        assert_eq!(request.failed_reason(), None);

        let failed = Command::try_from_raw(&[0x05, 0x03]).unwrap();

        assert_eq!(
            failed.failed_reason(),
            Some(PairingFailedReason::AuthenticationRequirements)
        );
        assert_eq!(failed.to_string(), "Pairing Failed (1 bytes): AuthenticationRequirements");

        assert_eq!(Command::try_from_raw(&[]), Err(Error::Size));
    }
}
