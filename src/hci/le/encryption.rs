//! LE encryption commands
//!
//! The BlueNRG-MS does its own pairing. These are only needed when the host manages the keys.

pub mod encrypt {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_ENCRYPT);

    const ENCRYPTED_DATA: Field = Field::bytes("encdata", 1, 16);

    /// Encrypt `plain_text` with AES-128 using `key`
    ///
    /// Both the key and the plain text are most significant octet first, as is the returned
    /// cipher text.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        key: [u8; 16],
        plain_text: [u8; 16],
    ) -> Result<[u8; 16], Error> {
        let values = [Value::Bytes(key.to_vec()), Value::Bytes(plain_text.to_vec())];

        let response = hci.send_values(OPCODE, &values)?;

        let mut cipher_text = [0u8; 16];

        cipher_text.copy_from_slice(response.reader()?.bytes(&ENCRYPTED_DATA)?);

        Ok(cipher_text)
    }
}

pub mod rand {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Field;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_RAND);

    const RANDOM: Field = Field::bytes("random", 1, 8);

    /// Get a random number from the controller
    pub fn send<H: Hardware>(hci: &mut HostInterface<H>) -> Result<u64, Error> {
        let response = hci.send_raw(OPCODE, Vec::new())?;

        let b = response.reader()?.bytes(&RANDOM)?;

        Ok(<u64>::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }
}

pub mod enable_encryption {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::Value;
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_START_ENCRYPTION);

    /// Start encryption of a connection
    ///
    /// This only waits for the controller to accept the command, the outcome is reported later by
    /// an *Encryption Change* event.
    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        random_number: u64,
        encrypted_diversifier: u16,
        long_term_key: u128,
    ) -> Result<(), Error> {
        let values = [
            Value::from(connection_handle),
            Value::Bytes(random_number.to_le_bytes().to_vec()),
            Value::from(encrypted_diversifier),
            Value::Bytes(long_term_key.to_le_bytes().to_vec()),
        ];

        hci.send_values(OPCODE, &values).map(|_| ())
    }
}

pub mod long_term_key_request_reply {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_LTK_REPLY);

    const HANDLE: Field = Field::u16("handle", 1);

    pub fn send<H: Hardware>(
        hci: &mut HostInterface<H>,
        connection_handle: u16,
        long_term_key: u128,
    ) -> Result<u16, Error> {
        let values = [
            Value::from(connection_handle),
            Value::Bytes(long_term_key.to_le_bytes().to_vec()),
        ];

        Ok(hci.send_values(OPCODE, &values)?.u16(&HANDLE)?)
    }
}

pub mod long_term_key_request_negative_reply {
    use crate::hci::engine::{Error, HostInterface};
    use crate::hci::schema::base::{ocf, OGF_LE_CTL};
    use crate::hci::schema::{Field, Value};
    use crate::hci::OpCode;
    use crate::hci_transport::Hardware;

    pub const OPCODE: OpCode = OpCode::new(OGF_LE_CTL, ocf::LE_LTK_NEG_REPLY);

    const HANDLE: Field = Field::u16("handle", 1);

    pub fn send<H: Hardware>(hci: &mut HostInterface<H>, connection_handle: u16) -> Result<u16, Error> {
        Ok(hci.send_values(OPCODE, &[Value::from(connection_handle)])?.u16(&HANDLE)?)
    }
}

#[cfg(test)]
mod tests {
    use crate::hci::engine::HostInterface;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::{self, MockFirmware};

    #[test]
    fn encrypt_returns_cipher_text() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        firmware.respond_with(|command| {
            let mut ret = vec![0x00];

            // echo the plain text back
            ret.extend_from_slice(&command.parameters()[16..]);

            Some(vec![mock::command_complete(command.opcode(), &ret)])
        });

        let cipher_text = super::encrypt::send(&mut hci, [0xAA; 16], [0x55; 16]).unwrap();

        assert_eq!(cipher_text, [0x55; 16]);
        assert_eq!(firmware.commands()[0].parameters().len(), 32);
    }

    #[test]
    fn start_encryption_waits_for_status() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        super::enable_encryption::send(&mut hci, 0x0801, 1, 2, 3).unwrap();

        let commands = firmware.commands();

        let sent = &commands[0];

        assert_eq!(sent.opcode(), super::enable_encryption::OPCODE);
        assert_eq!(&sent.parameters()[..4], &[0x01, 0x08, 0x01, 0x00]);
        assert_eq!(sent.parameters().len(), 28);
    }
}
