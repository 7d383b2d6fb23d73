//! Characteristics and descriptors
//!
//! A characteristic is declared with a [`CharacteristicBuilder`] taken from a
//! [`CharacteristicAdder`](super::CharacteristicAdder). The flags are the raw bit fields of the
//! BlueNRG-MS `add_char` and `add_char_desc` commands.

use super::{BuildError, CharacteristicAdder, CharacteristicId, DescriptorId, ServiceId};
use crate::uuid::Uuid;
use bitflags::bitflags;

/// The largest encryption key size
pub const MAX_ENCRYPTION_KEY_SIZE: u8 = 16;

/// Value length of a characteristic when none is set
pub const DEFAULT_VALUE_LEN: u8 = 20;

bitflags! {
    /// Characteristic Properties
    ///
    /// These are the properties that are part of the Characteristic Declaration
    pub struct Properties: u8 {
        const BROADCAST = 0x01;
        const READ = 0x02;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
        const INDICATE = 0x20;
        const AUTHENTICATED_SIGNED_WRITES = 0x40;
        const EXTENDED_PROPERTIES = 0x80;
    }
}

bitflags! {
    /// Security permissions of an attribute
    pub struct Permissions: u8 {
        const AUTHEN_READ = 0x01;
        const AUTHOR_READ = 0x02;
        const ENCRY_READ = 0x04;
        const AUTHEN_WRITE = 0x08;
        const AUTHOR_WRITE = 0x10;
        const ENCRY_WRITE = 0x20;
    }
}

bitflags! {
    /// Access permissions of a descriptor
    pub struct Access: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        const READ_WRITE = Self::READ.bits | Self::WRITE.bits;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const SIGNED_WRITE = 0x08;
    }
}

bitflags! {
    /// The GATT vendor events the firmware sends for an attribute
    ///
    /// With either of the `*_AND_WAIT` flags the firmware holds the access until the host
    /// answers the permit request.
    pub struct EventMask: u8 {
        const ATTRIBUTE_WRITE = 0x01;
        const WRITE_REQUEST_AND_WAIT = 0x02;
        const READ_REQUEST_AND_WAIT = 0x04;
    }
}

/// A declared characteristic
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Characteristic {
    pub(super) uuid: Uuid,
    pub(super) service: usize,
    pub(super) value_len: u8,
    pub(super) properties: Properties,
    pub(super) permissions: Permissions,
    pub(super) event_mask: EventMask,
    pub(super) encryption_key_size: u8,
    pub(super) is_variable: bool,
    pub(super) descriptors: Vec<usize>,
    pub(super) handle: Option<u16>,
}

impl Characteristic {
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn service(&self) -> ServiceId {
        ServiceId(self.service)
    }

    /// Maximum length of the value
    pub fn value_len(&self) -> u8 {
        self.value_len
    }

    pub fn properties(&self) -> Properties {
        self.properties
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn event_mask(&self) -> EventMask {
        self.event_mask
    }

    pub fn is_variable(&self) -> bool {
        self.is_variable
    }

    /// Handle of the characteristic declaration
    ///
    /// This is `None` until the characteristic is registered.
    pub fn handle(&self) -> Option<u16> {
        self.handle
    }

    /// Handle of the characteristic value, right after the declaration
    pub fn value_handle(&self) -> Option<u16> {
        self.handle.map(|handle| handle + 1)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = DescriptorId> + '_ {
        self.descriptors.iter().map(|index| DescriptorId(*index))
    }

    /// The number of attribute records the characteristic takes in its service
    ///
    /// The declaration and value take two records. The firmware adds a further two records for
    /// each of the client configuration (notify or indicate), the server configuration
    /// (broadcast) and the extended properties descriptors. Each added descriptor takes one.
    pub fn attribute_records(&self) -> usize {
        let mut records = 2;

        if self.properties.intersects(Properties::NOTIFY | Properties::INDICATE) {
            records += 2;
        }

        if self.properties.contains(Properties::BROADCAST) {
            records += 2;
        }

        if self.properties.contains(Properties::EXTENDED_PROPERTIES) {
            records += 2;
        }

        records + self.descriptors.len()
    }
}

/// A declared descriptor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    pub(super) uuid: Uuid,
    pub(super) characteristic: usize,
    pub(super) value: Vec<u8>,
    pub(super) value_max_len: u8,
    pub(super) permissions: Permissions,
    pub(super) access: Access,
    pub(super) event_mask: EventMask,
    pub(super) encryption_key_size: u8,
    pub(super) is_variable: bool,
    pub(super) handle: Option<u16>,
}

impl Descriptor {
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The characteristic the descriptor belongs to
    pub fn characteristic(&self) -> CharacteristicId {
        CharacteristicId(self.characteristic)
    }

    /// The initial value
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_max_len(&self) -> u8 {
        self.value_max_len
    }

    pub fn permissions(&self) -> Permissions {
        self.permissions
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn handle(&self) -> Option<u16> {
        self.handle
    }
}

/// The declaration of a descriptor
///
/// The maximum length of the value defaults to the length of the initial value. With no access
/// set the descriptor can neither be read nor written by a client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorDeclaration {
    uuid: Uuid,
    value: Vec<u8>,
    value_max_len: Option<usize>,
    permissions: Permissions,
    access: Access,
    event_mask: EventMask,
}

impl DescriptorDeclaration {
    pub fn new<V>(uuid: Uuid, value: V) -> Self
    where
        V: Into<Vec<u8>>,
    {
        DescriptorDeclaration {
            uuid,
            value: value.into(),
            value_max_len: None,
            permissions: Permissions::empty(),
            access: Access::empty(),
            event_mask: EventMask::empty(),
        }
    }

    pub fn set_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn set_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn set_event_mask(mut self, event_mask: EventMask) -> Self {
        self.event_mask = event_mask;
        self
    }

    pub fn set_value_max_len(mut self, max: usize) -> Self {
        self.value_max_len = Some(max);
        self
    }

    fn into_descriptor(self, characteristic: usize) -> Result<Descriptor, BuildError> {
        let max = self.value_max_len.unwrap_or(self.value.len());

        if max > <u8>::max_value() as usize {
            return Err(BuildError::DescriptorValueTooLong {
                len: max,
                max: <u8>::max_value() as usize,
            });
        }

        if self.value.len() > max {
            return Err(BuildError::DescriptorValueTooLong {
                len: self.value.len(),
                max,
            });
        }

        Ok(Descriptor {
            uuid: self.uuid,
            characteristic,
            value: self.value,
            value_max_len: max as u8,
            permissions: self.permissions,
            access: self.access,
            event_mask: self.event_mask,
            encryption_key_size: MAX_ENCRYPTION_KEY_SIZE,
            is_variable: true,
            handle: None,
        })
    }
}

/// Builder of a characteristic
///
/// The characteristic and its descriptors are only added to the database by
/// `complete_characteristic`.
pub struct CharacteristicBuilder<'a> {
    adder: CharacteristicAdder<'a>,
    characteristic: Characteristic,
    descriptors: Vec<Descriptor>,
}

impl<'a> CharacteristicBuilder<'a> {
    pub(super) fn new(adder: CharacteristicAdder<'a>, properties: Properties, uuid: Uuid) -> Self {
        let service = adder.service;

        CharacteristicBuilder {
            adder,
            characteristic: Characteristic {
                uuid,
                service,
                value_len: DEFAULT_VALUE_LEN,
                properties,
                permissions: Permissions::empty(),
                event_mask: EventMask::empty(),
                encryption_key_size: MAX_ENCRYPTION_KEY_SIZE,
                is_variable: true,
                descriptors: Vec::new(),
                handle: None,
            },
            descriptors: Vec::new(),
        }
    }

    /// Set the maximum length of the value
    pub fn set_value_len(mut self, value_len: u8) -> Self {
        self.characteristic.value_len = value_len;
        self
    }

    pub fn set_permissions(mut self, permissions: Permissions) -> Self {
        self.characteristic.permissions = permissions;
        self
    }

    /// Set the GATT events the firmware sends for this characteristic
    ///
    /// A characteristic must have `ATTRIBUTE_WRITE` in its mask for writes by a client to show
    /// up as [`Event::AttributeWritten`](crate::gap::Event::AttributeWritten).
    pub fn set_event_mask(mut self, event_mask: EventMask) -> Self {
        self.characteristic.event_mask = event_mask;
        self
    }

    pub fn set_encryption_key_size(mut self, size: u8) -> Self {
        self.characteristic.encryption_key_size = size;
        self
    }

    /// Make the value always `value_len` bytes long
    pub fn set_fixed_length(mut self) -> Self {
        self.characteristic.is_variable = false;
        self
    }

    /// Add a descriptor after the ones already added
    pub fn add_descriptor(mut self, declaration: DescriptorDeclaration) -> Result<Self, BuildError> {
        let descriptor = declaration.into_descriptor(self.adder.database.characteristics.len())?;

        self.descriptors.push(descriptor);

        Ok(self)
    }

    /// Finish the characteristic and go back to adding characteristics
    pub fn complete_characteristic(self) -> CharacteristicAdder<'a> {
        let CharacteristicBuilder {
            adder,
            mut characteristic,
            descriptors,
        } = self;

        let database = &mut *adder.database;

        let index = database.characteristics.len();

        for descriptor in descriptors {
            characteristic.descriptors.push(database.descriptors.len());

            database.descriptors.push(descriptor);
        }

        database.characteristics.push(characteristic);

        database.services[adder.service].characteristics.push(index);

        adder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_value_limits() {
        let uuid = Uuid::from_u16(0x2901);

        let declaration = DescriptorDeclaration::new(uuid, &b"name"[..]);

        assert_eq!(declaration.clone().into_descriptor(0).unwrap().value_max_len, 4);

        assert_eq!(
            declaration.set_value_max_len(2).into_descriptor(0),
            Err(BuildError::DescriptorValueTooLong { len: 4, max: 2 })
        );

        assert!(DescriptorDeclaration::new(uuid, vec![0; 300]).into_descriptor(0).is_err());
    }

    #[test]
    fn access_bits() {
        assert_eq!(Access::READ_WRITE.bits(), 0x03);
        assert_eq!((Properties::READ | Properties::NOTIFY).bits(), 0x12);
        assert!(Permissions::empty().is_empty());
    }
}
