//! Link Control Commands

pub mod disconnect {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::error;
    use crate::hci::schema::base::{ocf, OGF_LINK_CTL};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LINK_CTL, ocf::DISCONNECT);

    /// These are the error codes that are given as reasons for disconnecting
    ///
    /// These enumerations are the acceptable error codes to be used as reasons for
    /// triggering the disconnect.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum DisconnectReason {
        AuthenticationFailure,
        RemoteUserTerminatedConnection,
        RemoteDeviceTerminatedConnectionDueToLowResources,
        RemoteDeviceTerminatedConnectionDueToPowerOff,
        UnsupportedRemoteFeature,
        PairingWithUnitKeyNotSupported,
        UnacceptableConnectionParameters,
    }

    impl DisconnectReason {
        pub fn try_from_hci_error(error: error::Error) -> Result<DisconnectReason, &'static str> {
            match error {
                error::Error::AuthenticationFailure => Ok(DisconnectReason::AuthenticationFailure),
                error::Error::RemoteUserTerminatedConnection => Ok(DisconnectReason::RemoteUserTerminatedConnection),
                error::Error::RemoteDeviceTerminatedConnectionDueToLowResources => {
                    Ok(DisconnectReason::RemoteDeviceTerminatedConnectionDueToLowResources)
                }
                error::Error::RemoteDeviceTerminatedConnectionDueToPowerOff => {
                    Ok(DisconnectReason::RemoteDeviceTerminatedConnectionDueToPowerOff)
                }
                error::Error::UnsupportedRemoteFeature => Ok(DisconnectReason::UnsupportedRemoteFeature),
                error::Error::PairingWithUnitKeyNotSupported => Ok(DisconnectReason::PairingWithUnitKeyNotSupported),
                error::Error::UnacceptableConnectionParameters => {
                    Ok(DisconnectReason::UnacceptableConnectionParameters)
                }
                _ => Err("No Disconnect reason for error"),
            }
        }

        pub fn get_val(&self) -> u8 {
            match *self {
                DisconnectReason::AuthenticationFailure => 0x05,
                DisconnectReason::RemoteUserTerminatedConnection => 0x13,
                DisconnectReason::RemoteDeviceTerminatedConnectionDueToLowResources => 0x14,
                DisconnectReason::RemoteDeviceTerminatedConnectionDueToPowerOff => 0x15,
                DisconnectReason::UnsupportedRemoteFeature => 0x1A,
                DisconnectReason::PairingWithUnitKeyNotSupported => 0x29,
                DisconnectReason::UnacceptableConnectionParameters => 0x3B,
            }
        }
    }

    /// Disconnect a connection
    ///
    /// Only the acceptance of the command is waited for, the *Disconnection Complete* event
    /// follows once the link is down.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        reason: DisconnectReason,
    ) -> Result<(), Error> {
        let values = [Value::from(connection_handle), Value::from(reason.get_val())];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::disconnect::{self, DisconnectReason};
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::error;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn disconnect_reasons() {
        assert_eq!(
            DisconnectReason::try_from_hci_error(error::Error::RemoteUserTerminatedConnection),
            Ok(DisconnectReason::RemoteUserTerminatedConnection)
        );
        assert!(DisconnectReason::try_from_hci_error(error::Error::Failed).is_err());
    }

    #[test]
    fn disconnect_is_accepted_by_status() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| Some(vec![mock::command_status(0x0C, command.opcode())]));

        let result = disconnect::send(&mut hci, 0x0801, DisconnectReason::RemoteUserTerminatedConnection);

        assert_eq!(
            result,
            Err(Error::Status {
                opcode: Some(disconnect::OPCODE),
                status: error::Error::from(0x0C),
            })
        );
        assert_eq!(firmware.commands()[0].parameters(), &[0x01, 0x08, 0x13]);
    }
}
