//! The GATT attribute database
//!
//! The database is declared on the host as a tree of services, characteristics and
//! descriptors, then registered with the firmware which assigns the handles. Nodes are kept in
//! flat lists owned by [`AttributeDatabase`] and refer to their parent by index.
//!
//! ```
//! # use bo_tie_bluenrg::gatt::AttributeDatabase;
//! # use bo_tie_bluenrg::gatt::characteristic::{EventMask, Properties};
//! # use bo_tie_bluenrg::uuid::Uuid;
//! let mut database = AttributeDatabase::new();
//!
//! database
//!     .new_service_constructor(Uuid::from_u16(0x180F), true)
//!     .into_characteristics_adder()
//!     .build_characteristic(Properties::READ | Properties::NOTIFY, Uuid::from_u16(0x2A19))
//!     .set_value_len(1)
//!     .set_event_mask(EventMask::empty())
//!     .complete_characteristic()
//!     .finish_service()
//!     .unwrap();
//! ```

use crate::aci::gatt::{add_char, add_char_desc, add_serv, ServiceType};
use crate::hci::engine::{Error, HostInterface};
use crate::hci_transport::Hardware;
use crate::uuid::Uuid;
use core::fmt;

pub mod characteristic;

use characteristic::{Characteristic, CharacteristicBuilder, Descriptor, Properties};

/// Attribute records reserved for a service without characteristics
///
/// The firmware rejects smaller counts for an empty service.
pub const EMPTY_SERVICE_RECORDS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharacteristicId(pub(crate) usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DescriptorId(pub(crate) usize);

/// An attribute whose value can be read or written by UUID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attribute {
    Characteristic(CharacteristicId),
    Descriptor(DescriptorId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The value of a descriptor is longer than its maximum length, or the maximum does not fit
    /// in a byte
    DescriptorValueTooLong { len: usize, max: usize },
    /// A service needs more attribute records than the firmware can reserve for it
    TooManyAttributeRecords { records: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::DescriptorValueTooLong { len, max } => write!(
                f,
                "descriptor value of {} bytes is longer than the maximum of {}",
                len, max
            ),
            BuildError::TooManyAttributeRecords { records } => write!(
                f,
                "service needs {} attribute records, at most 255 can be reserved",
                records
            ),
        }
    }
}

impl std::error::Error for BuildError {}

/// Count the attribute records of a service from its characteristics
pub fn attribute_records<'a, I>(characteristics: I) -> usize
where
    I: IntoIterator<Item = &'a Characteristic>,
{
    let mut characteristics = characteristics.into_iter().peekable();

    if characteristics.peek().is_none() {
        EMPTY_SERVICE_RECORDS
    } else {
        1 + characteristics.map(Characteristic::attribute_records).sum::<usize>()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Service {
    uuid: Uuid,
    service_type: ServiceType,
    characteristics: Vec<usize>,
    handle: Option<u16>,
}

impl Service {
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn is_primary(&self) -> bool {
        self.service_type == ServiceType::Primary
    }

    /// The handle of the service declaration, `None` until the service is registered
    pub fn handle(&self) -> Option<u16> {
        self.handle
    }

    pub fn characteristics(&self) -> impl Iterator<Item = CharacteristicId> + '_ {
        self.characteristics.iter().map(|index| CharacteristicId(*index))
    }
}

/// Constructor of a service
pub struct ServiceBuilder<'a> {
    database: &'a mut AttributeDatabase,
    service: usize,
    marks: (usize, usize),
}

impl<'a> ServiceBuilder<'a> {
    fn new(database: &'a mut AttributeDatabase, uuid: Uuid, is_primary: bool) -> Self {
        let service = database.services.len();

        let marks = (database.characteristics.len(), database.descriptors.len());

        database.services.push(Service {
            uuid,
            service_type: if is_primary {
                ServiceType::Primary
            } else {
                ServiceType::Secondary
            },
            characteristics: Vec::new(),
            handle: None,
        });

        ServiceBuilder {
            database,
            service,
            marks,
        }
    }

    /// Start adding characteristics
    pub fn into_characteristics_adder(self) -> CharacteristicAdder<'a> {
        CharacteristicAdder {
            database: self.database,
            service: self.service,
            marks: self.marks,
        }
    }

    /// Create a service with no characteristics
    pub fn make_empty(self) -> ServiceId {
        ServiceId(self.service)
    }
}

/// Adds characteristics to a service, in order
pub struct CharacteristicAdder<'a> {
    database: &'a mut AttributeDatabase,
    service: usize,
    marks: (usize, usize),
}

impl<'a> CharacteristicAdder<'a> {
    pub fn build_characteristic(self, properties: Properties, uuid: Uuid) -> CharacteristicBuilder<'a> {
        CharacteristicBuilder::new(self, properties, uuid)
    }

    /// Finish the service
    ///
    /// The service is removed from the database again if it needs more attribute records than
    /// can be reserved.
    pub fn finish_service(self) -> Result<ServiceId, BuildError> {
        let records = self.database.attribute_records(ServiceId(self.service));

        if records > <u8>::max_value() as usize {
            self.database.services.truncate(self.service);
            self.database.characteristics.truncate(self.marks.0);
            self.database.descriptors.truncate(self.marks.1);

            return Err(BuildError::TooManyAttributeRecords { records });
        }

        Ok(ServiceId(self.service))
    }
}

/// The declared services, characteristics and descriptors
///
/// Registration happens in declaration order: a service, then each of its characteristics
/// directly followed by the characteristic's descriptors.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeDatabase {
    services: Vec<Service>,
    characteristics: Vec<Characteristic>,
    descriptors: Vec<Descriptor>,
}

impl AttributeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_service_constructor(&mut self, uuid: Uuid, is_primary: bool) -> ServiceBuilder<'_> {
        ServiceBuilder::new(self, uuid, is_primary)
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceId> {
        (0..self.services.len()).map(ServiceId)
    }

    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.get(id.0)
    }

    pub fn characteristic(&self, id: CharacteristicId) -> Option<&Characteristic> {
        self.characteristics.get(id.0)
    }

    pub fn descriptor(&self, id: DescriptorId) -> Option<&Descriptor> {
        self.descriptors.get(id.0)
    }

    /// The number of attribute records to reserve for a service
    pub fn attribute_records(&self, id: ServiceId) -> usize {
        match self.services.get(id.0) {
            Some(service) => attribute_records(service.characteristics.iter().map(|c| &self.characteristics[*c])),
            None => 0,
        }
    }

    /// Check if every node got a handle
    pub fn is_registered(&self) -> bool {
        self.services.iter().all(|s| s.handle.is_some())
            && self.characteristics.iter().all(|c| c.handle.is_some())
            && self.descriptors.iter().all(|d| d.handle.is_some())
    }

    fn clear_handles(&mut self) {
        self.services.iter_mut().for_each(|s| s.handle = None);
        self.characteristics.iter_mut().for_each(|c| c.handle = None);
        self.descriptors.iter_mut().for_each(|d| d.handle = None);
    }

    /// Add the database to the firmware
    ///
    /// Every node gets the handle returned by its `add_*` command. The first failing command
    /// stops the registration, nodes after it are left without a handle.
    pub fn register<H: Hardware>(&mut self, hci: &mut HostInterface<H>) -> Result<(), Error> {
        self.clear_handles();

        for service in 0..self.services.len() {
            self.register_service(hci, service)?;
        }

        log::info!(
            "registered {} services, {} characteristics, {} descriptors",
            self.services.len(),
            self.characteristics.len(),
            self.descriptors.len()
        );

        Ok(())
    }

    fn register_service<H: Hardware>(&mut self, hci: &mut HostInterface<H>, service: usize) -> Result<(), Error> {
        let records = self.attribute_records(ServiceId(service)).min(<u8>::max_value() as usize) as u8;

        let service_handle = {
            let s = &self.services[service];

            add_serv::send(hci, &s.uuid, s.service_type, records)?
        };

        log::debug!(
            "service {} at handle {} with {} records",
            self.services[service].uuid,
            service_handle,
            records
        );

        self.services[service].handle = Some(service_handle);

        for i in 0..self.services[service].characteristics.len() {
            let characteristic = self.services[service].characteristics[i];

            self.register_characteristic(hci, service_handle, characteristic)?;
        }

        Ok(())
    }

    fn register_characteristic<H: Hardware>(
        &mut self,
        hci: &mut HostInterface<H>,
        service_handle: u16,
        characteristic: usize,
    ) -> Result<(), Error> {
        let handle = {
            let c = &self.characteristics[characteristic];

            add_char::send(
                hci,
                &add_char::AddCharacteristic {
                    service_handle,
                    uuid: &c.uuid,
                    value_len: c.value_len,
                    properties: c.properties,
                    permissions: c.permissions,
                    event_mask: c.event_mask,
                    encryption_key_size: c.encryption_key_size,
                    is_variable: c.is_variable,
                },
            )?
        };

        log::debug!("characteristic {} at handle {}", self.characteristics[characteristic].uuid, handle);

        self.characteristics[characteristic].handle = Some(handle);

        for i in 0..self.characteristics[characteristic].descriptors.len() {
            let descriptor = self.characteristics[characteristic].descriptors[i];

            let d = &self.descriptors[descriptor];

            let descriptor_handle = add_char_desc::send(
                hci,
                &add_char_desc::AddDescriptor {
                    service_handle,
                    characteristic_handle: handle,
                    uuid: &d.uuid,
                    value_max_len: d.value_max_len,
                    value: &d.value,
                    permissions: d.permissions,
                    access: d.access,
                    event_mask: d.event_mask,
                    encryption_key_size: d.encryption_key_size,
                    is_variable: d.is_variable,
                },
            )?;

            log::debug!("descriptor {} at handle {}", d.uuid, descriptor_handle);

            self.descriptors[descriptor].handle = Some(descriptor_handle);
        }

        Ok(())
    }

    /// Get the UUID for a handle reported by the firmware
    ///
    /// Both the declaration and the value handle of a characteristic give the characteristic's
    /// UUID. A descriptor handle gives the UUID of the descriptor's characteristic.
    pub fn uuid_from_handle(&self, handle: u16) -> Option<Uuid> {
        let handle = Some(handle);

        if let Some(service) = self.services.iter().find(|s| s.handle == handle) {
            return Some(service.uuid);
        }

        if let Some(c) = self
            .characteristics
            .iter()
            .find(|c| c.handle == handle || c.value_handle() == handle)
        {
            return Some(c.uuid);
        }

        self.descriptors
            .iter()
            .find(|d| d.handle == handle)
            .map(|d| self.characteristics[d.characteristic].uuid)
    }

    /// Find the first characteristic, or else the first descriptor, with the UUID
    pub fn find(&self, uuid: &Uuid) -> Option<Attribute> {
        self.characteristics
            .iter()
            .position(|c| &c.uuid == uuid)
            .map(|i| Attribute::Characteristic(CharacteristicId(i)))
            .or_else(|| {
                self.descriptors
                    .iter()
                    .position(|d| &d.uuid == uuid)
                    .map(|i| Attribute::Descriptor(DescriptorId(i)))
            })
    }
}
