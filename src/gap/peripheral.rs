//! The peripheral session
//!
//! A [`Peripheral`] brings up the BlueNRG-MS as a GAP peripheral, registers an
//! [`AttributeDatabase`], and advertises it. [`run`](Peripheral::run) then reads events until it
//! is stopped, handing them to a [`Handler`].
//!
//! ```no_run
//! # use bo_tie_bluenrg::config::{PeripheralConfig, DEFAULT_ADDRESS};
//! # use bo_tie_bluenrg::gap::{peripheral::Peripheral, Event, Permission};
//! # use bo_tie_bluenrg::gatt::AttributeDatabase;
//! # use bo_tie_bluenrg::hci_transport::Hardware;
//! # fn example<H: Hardware>(hardware: H, database: AttributeDatabase) -> Result<(), bo_tie_bluenrg::gap::Error> {
//! let mut config = PeripheralConfig::new(DEFAULT_ADDRESS, "sensor");
//!
//! config.connectable = true;
//!
//! let mut peripheral = Peripheral::new(hardware, config, database)?;
//!
//! let mut handler = |session: &mut Peripheral<H>, event: Event<'_>| {
//!     if let Event::AttributeWritten { attribute_handle, data } = event {
//!         let uuid = session.database().uuid_from_handle(attribute_handle);
//!
//!         println!("{:?} written with {:?}", uuid, data);
//!     }
//!
//!     None::<Permission>
//! };
//!
//! peripheral.run(&mut handler)
//! # }
//! ```

use super::advertise::{local_name_ad, AdvertisingData};
use super::{
    configure, notification_queue, reset_and_wait, Error, Event, Handler, Notification, Notifier, Permission,
    State, StopHandle,
};
use crate::aci::gap::{
    init::GapHandles, set_auth_requirement, set_discoverable, update_adv_data, AdvertisingType,
    DiscoverableParameters, Role, MAX_ADV_DATA_LEN,
};
use crate::aci::{gap, gatt, hal};
use crate::config::PeripheralConfig;
use crate::gatt::{Attribute, AttributeDatabase};
use crate::hci::engine::{self, HostInterface};
use crate::hci::events::{
    AttributeModifiedData, DisconnectionCompleteData, EventPacket, HardwareErrorData, LEConnectionCompleteData,
    ReadPermitRequestData, WritePermitRequestData,
};
use crate::hci::le::transmitter::set_scan_response_data;
use crate::hci::schema::base::events as base_events;
use crate::hci::schema::vendor::events as vendor_events;
use crate::hci::schema::SubCodeWidth;
use crate::hci_transport::{Hardware, HciPacketIndicator};
use crate::uuid::Uuid;
use core::convert::TryFrom;
use std::sync::mpsc;
use std::time::Instant;

/// A GAP peripheral serving an attribute database
pub struct Peripheral<H> {
    hci: HostInterface<H>,
    config: PeripheralConfig,
    database: AttributeDatabase,
    local_name: Vec<u8>,
    gap_handles: GapHandles,
    connection_handle: Option<u16>,
    state: State,
    notifier: Notifier,
    notifications: mpsc::Receiver<Notification>,
    stop: StopHandle,
}

impl<H> Peripheral<H>
where
    H: Hardware,
{
    /// Create a peripheral
    ///
    /// Nothing is sent to the BlueNRG-MS until the peripheral is started. The device name must
    /// fit in the advertising packet as the complete local name, and the configured advertising
    /// data must be well formed.
    pub fn new(hardware: H, config: PeripheralConfig, database: AttributeDatabase) -> Result<Self, Error> {
        let local_name = local_name_ad(&config.name)?;

        if let Some(data) = &config.advertising_data {
            AdvertisingData::try_from(data.as_slice())?;
        }

        let mut hci = HostInterface::new(hardware, config.variant);

        hci.set_timeout(config.command_timeout);
        hci.set_retries(config.retries);

        let (notifier, notifications) = notification_queue();

        Ok(Peripheral {
            hci,
            config,
            database,
            local_name,
            gap_handles: GapHandles::default(),
            connection_handle: None,
            state: State::Constructed,
            notifier,
            notifications,
            stop: StopHandle::new(),
        })
    }

    /// The interface to the BlueNRG-MS, for commands not wrapped by the session
    pub fn hci(&mut self) -> &mut HostInterface<H> {
        &mut self.hci
    }

    pub fn config(&self) -> &PeripheralConfig {
        &self.config
    }

    pub fn database(&self) -> &AttributeDatabase {
        &self.database
    }

    /// Handles of the GAP service, valid once started
    pub fn gap_handles(&self) -> GapHandles {
        self.gap_handles
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn connection_handle(&self) -> Option<u16> {
        self.connection_handle
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Initialize the BlueNRG-MS and start advertising
    ///
    /// On any failure the BlueNRG-MS is reset and the peripheral is stopped.
    pub fn start(&mut self) -> Result<(), Error> {
        self.stop.clear();
        self.state = State::Initializing;

        match self.initialize().and_then(|_| self.set_discoverable()) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("peripheral startup failed: {}", e);

                self.stop();

                Err(e)
            }
        }
    }

    fn initialize(&mut self) -> Result<(), Error> {
        // The configuration data is only taken after the second reset
        reset_and_wait(&mut self.hci)?;
        reset_and_wait(&mut self.hci)?;

        configure(&mut self.hci, &self.config.address)?;

        gatt::init::send(&mut self.hci)?;

        let name = self.config.name.as_bytes();

        self.gap_handles = gap::init::send(&mut self.hci, Role::Peripheral, false, name.len() as u8)?;

        gatt::update_char_value::send(
            &mut self.hci,
            self.gap_handles.service_handle,
            self.gap_handles.dev_name_char_handle,
            0,
            name,
        )?;

        set_auth_requirement::send(&mut self.hci, &set_auth_requirement::AuthRequirement::default())?;

        hal::set_tx_power_level::send(
            &mut self.hci,
            self.config.tx_power.high_power,
            self.config.tx_power.pa_level,
        )?;

        self.database.register(&mut self.hci)?;

        log::info!("peripheral '{}' initialized", self.config.name);

        Ok(())
    }

    /// Start advertising
    ///
    /// The scan response data is cleared and the configured advertising data is added after
    /// the local name.
    pub fn set_discoverable(&mut self) -> Result<(), Error> {
        set_scan_response_data::send(&mut self.hci, &[0u8; MAX_ADV_DATA_LEN])?;

        let advertising_type = if self.config.connectable {
            AdvertisingType::ConnectableUndirected
        } else {
            AdvertisingType::ScannableUndirected
        };

        let mut parameters = DiscoverableParameters::new(advertising_type, self.config.interval, &self.local_name);

        parameters.own_address_type = self.config.address_type;

        set_discoverable::send(&mut self.hci, &parameters)?;

        if let Some(data) = &self.config.advertising_data {
            update_adv_data::send(&mut self.hci, data)?;
        }

        log::debug!("advertising as {:?}", advertising_type);

        self.state = State::Advertising;

        Ok(())
    }

    /// Write the value of a characteristic or descriptor
    ///
    /// Writing a characteristic with notify or indicate sends the value to the client when it
    /// enabled them.
    pub fn write_by_uuid(&mut self, uuid: &Uuid, offset: u8, value: &[u8]) -> Result<(), Error> {
        let attribute = self.database.find(uuid).ok_or(Error::UnknownUuid(*uuid))?;

        if self.connection_handle.is_none() {
            return Err(Error::NotConnected);
        }

        let not_registered = || Error::NotRegistered(*uuid);

        match attribute {
            Attribute::Characteristic(id) => {
                let characteristic = self.database.characteristic(id).ok_or_else(not_registered)?;

                let service_handle = self
                    .database
                    .service(characteristic.service())
                    .and_then(|s| s.handle())
                    .ok_or_else(not_registered)?;

                let handle = characteristic.handle().ok_or_else(not_registered)?;

                gatt::update_char_value::send(&mut self.hci, service_handle, handle, offset, value)?;
            }
            Attribute::Descriptor(id) => {
                let descriptor = self.database.descriptor(id).ok_or_else(not_registered)?;

                let characteristic = self
                    .database
                    .characteristic(descriptor.characteristic())
                    .ok_or_else(not_registered)?;

                let service_handle = self
                    .database
                    .service(characteristic.service())
                    .and_then(|s| s.handle())
                    .ok_or_else(not_registered)?;

                let characteristic_handle = characteristic.handle().ok_or_else(not_registered)?;

                let handle = descriptor.handle().ok_or_else(not_registered)?;

                gatt::set_desc_value::send(
                    &mut self.hci,
                    service_handle,
                    characteristic_handle,
                    handle,
                    offset.into(),
                    value,
                )?;
            }
        }

        Ok(())
    }

    /// Read the value of a characteristic or descriptor
    pub fn read_by_uuid(&mut self, uuid: &Uuid) -> Result<Vec<u8>, Error> {
        let attribute = self.database.find(uuid).ok_or(Error::UnknownUuid(*uuid))?;

        if self.connection_handle.is_none() {
            return Err(Error::NotConnected);
        }

        let (handle, max_len) = match attribute {
            Attribute::Characteristic(id) => self
                .database
                .characteristic(id)
                .and_then(|c| c.value_handle().map(|h| (h, c.value_len() as usize))),
            Attribute::Descriptor(id) => self
                .database
                .descriptor(id)
                .and_then(|d| d.handle().map(|h| (h, d.value_max_len() as usize))),
        }
        .ok_or(Error::NotRegistered(*uuid))?;

        let mut value = gatt::read_handle_value::send(&mut self.hci, handle)?;

        value.truncate(max_len);

        Ok(value)
    }

    /// Reset the BlueNRG-MS and stop the session
    pub fn stop(&mut self) {
        self.hci.reset();

        self.connection_handle = None;
        self.state = State::Stopped;
    }

    /// Start the peripheral and run it until stopped
    ///
    /// The BlueNRG-MS is always reset when this returns.
    pub fn run<F>(&mut self, handler: &mut F) -> Result<(), Error>
    where
        F: Handler<Self>,
    {
        self.start()?;

        let result = self.event_loop(handler);

        if let Err(e) = &result {
            log::error!("peripheral stopped: {}", e);
        }

        self.stop();

        result
    }

    fn event_loop<F>(&mut self, handler: &mut F) -> Result<(), Error>
    where
        F: Handler<Self>,
    {
        let mut last_periodic = Instant::now();

        while !self.stop.is_stopped() {
            self.drain_notifications();

            if let Some(frame) = self.hci.read_frame(self.config.retries) {
                if crate::hci::verify(Some(&frame)) {
                    match self.dispatch(handler, &frame) {
                        Err(e) if e.is_fatal() => return Err(e),
                        Err(e) => log::warn!("event {:02X?} not handled: {}", frame, e),
                        Ok(()) => (),
                    }
                } else if frame.first() == Some(&HciPacketIndicator::AclData.val()) {
                    log::debug!("ACL data, {}", crate::l2cap::describe(&frame[1..]));
                } else {
                    log::debug!("dropping malformed frame {:02X?}", frame);
                }
            }

            if last_periodic.elapsed() >= self.config.run_interval {
                handler.periodic(self);

                last_periodic = Instant::now();
            }
        }

        Ok(())
    }

    /// Make the writes queued by the notifiers
    fn drain_notifications(&mut self) {
        while let Ok(notification) = self.notifications.try_recv() {
            if self.connection_handle.is_none() {
                log::debug!("not connected, dropping value for {}", notification.uuid);

                continue;
            }

            if let Err(e) = self.write_by_uuid(&notification.uuid, notification.offset, &notification.value) {
                log::warn!("failed to write {}: {}", notification.uuid, e);
            }
        }
    }

    fn dispatch<F>(&mut self, handler: &mut F, frame: &[u8]) -> Result<(), Error>
    where
        F: Handler<Self>,
    {
        let packet = EventPacket::from_packet(frame)?;

        match packet.code() {
            base_events::DISCONN_COMPLETE => {
                let data = DisconnectionCompleteData::try_from(packet.parameters())?;

                log::info!("connection {} closed: {}", data.connection_handle, data.reason);

                self.connection_handle = None;
                self.state = State::Idle;

                handler.on_event(
                    self,
                    Event::Disconnected {
                        connection_handle: data.connection_handle,
                        reason: data.reason.into(),
                    },
                );

                self.set_discoverable()
            }
            base_events::LE_META_EVENT => {
                if packet.sub_code(SubCodeWidth::U8)? != u16::from(base_events::LE_CONN_COMPLETE) {
                    log::debug!("dropping LE meta event {:02X?}", frame);

                    return Ok(());
                }

                let data = LEConnectionCompleteData::try_from(packet.sub_parameters(SubCodeWidth::U8))?;

                if !data.status.is_success() {
                    log::warn!("connection failed: {}", data.status);

                    return Ok(());
                }

                log::info!("connected to {:02X?} as {}", data.peer_address, data.connection_handle);

                self.connection_handle = Some(data.connection_handle);
                self.state = State::Connected;

                handler.on_event(
                    self,
                    Event::Connected {
                        connection_handle: data.connection_handle,
                        peer_address: data.peer_address,
                    },
                );

                Ok(())
            }
            base_events::VENDOR => self.dispatch_vendor(handler, &packet),
            base_events::HARDWARE_ERROR => {
                let data = HardwareErrorData::try_from(packet.parameters())?;

                Err(Error::Hci(engine::Error::Hardware(data.code)))
            }
            _ => {
                log::debug!("dropping event {:02X?}", frame);

                Ok(())
            }
        }
    }

    fn dispatch_vendor<F>(&mut self, handler: &mut F, packet: &EventPacket<'_>) -> Result<(), Error>
    where
        F: Handler<Self>,
    {
        let code = packet.sub_code(SubCodeWidth::U16)?;

        let parameters = packet.sub_parameters(SubCodeWidth::U16);

        match code {
            vendor_events::GATT_ATTRIBUTE_MODIFIED => {
                let data = AttributeModifiedData::try_from_variant(parameters, self.hci.variant())?;

                handler.on_event(
                    self,
                    Event::AttributeWritten {
                        attribute_handle: data.attribute_handle,
                        data: data.data,
                    },
                );
            }
            vendor_events::GATT_WRITE_PERMIT_REQ => {
                let request = WritePermitRequestData::try_from(parameters)?;

                let permission = handler.on_event(
                    self,
                    Event::WritePermissionRequest {
                        attribute_handle: request.attribute_handle,
                        data: request.data,
                    },
                );

                let (allow, error_code) = match or_allow(permission) {
                    Permission::Allow => (true, 0),
                    Permission::Deny(error_code) => (false, error_code),
                };

                gatt::write_response::send(
                    &mut self.hci,
                    request.connection_handle,
                    request.attribute_handle,
                    allow,
                    error_code,
                    request.data,
                )
                .map_err(Error::Acknowledgement)?;
            }
            vendor_events::GATT_READ_PERMIT_REQ => {
                let request = ReadPermitRequestData::try_from(parameters)?;

                let permission = handler.on_event(
                    self,
                    Event::ReadPermissionRequest {
                        attribute_handle: request.attribute_handle,
                        offset: request.offset,
                    },
                );

                // the firmware only takes the reply on an open connection
                match or_allow(permission) {
                    Permission::Allow if self.connection_handle.is_some() => {
                        gatt::allow_read::send(&mut self.hci, request.connection_handle)
                            .map_err(Error::Acknowledgement)?;
                    }
                    Permission::Allow => log::warn!(
                        "not connected, the read of handle {} is left unanswered",
                        request.attribute_handle
                    ),
                    Permission::Deny(_) => log::warn!(
                        "read of handle {} denied, the request is left unanswered",
                        request.attribute_handle
                    ),
                }
            }
            code => {
                handler.on_event(self, Event::Vendor { code, parameters });
            }
        }

        Ok(())
    }
}

fn or_allow(permission: Option<Permission>) -> Permission {
    permission.unwrap_or_else(|| {
        log::warn!("no answer to a permission request, allowing it");

        Permission::Allow
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ADDRESS;
    use crate::gap::EventKind;
    use crate::gatt::characteristic::{EventMask, Properties};
    use crate::hci::error::Error as ControllerError;
    use crate::hci::OpCode;
    use crate::hci_transport::mock::{self, MockFirmware};
    use std::time::Duration;

    const CONNECTION: u16 = 0x0801;

    fn rx_uuid() -> Uuid {
        Uuid::try_from("6e400002-b5a3-f393-e0a9-e50e24dcca9e").unwrap()
    }

    fn tx_uuid() -> Uuid {
        Uuid::try_from("6e400003-b5a3-f393-e0a9-e50e24dcca9e").unwrap()
    }

    /// The mock registers the service at handle 1, rx at 2 and tx at 3
    fn uart_database() -> AttributeDatabase {
        let mut database = AttributeDatabase::new();

        database
            .new_service_constructor(Uuid::try_from("6e400001-b5a3-f393-e0a9-e50e24dcca9e").unwrap(), true)
            .into_characteristics_adder()
            .build_characteristic(Properties::WRITE | Properties::WRITE_WITHOUT_RESPONSE, rx_uuid())
            .set_event_mask(EventMask::ATTRIBUTE_WRITE | EventMask::WRITE_REQUEST_AND_WAIT)
            .complete_characteristic()
            .build_characteristic(Properties::READ | Properties::NOTIFY, tx_uuid())
            .set_value_len(4)
            .set_event_mask(EventMask::READ_REQUEST_AND_WAIT)
            .complete_characteristic()
            .finish_service()
            .unwrap();

        database
    }

    fn config() -> PeripheralConfig {
        let mut config = PeripheralConfig::new(DEFAULT_ADDRESS, "uart");

        config.connectable = true;
        config.run_interval = Duration::from_millis(5);

        config
    }

    fn connection_complete() -> Vec<u8> {
        let h = CONNECTION.to_le_bytes();

        mock::le_meta_event(
            base_events::LE_CONN_COMPLETE,
            &[0x00, h[0], h[1], 0x01, 0x00, 6, 5, 4, 3, 2, 1, 0x28, 0x00, 0x00, 0x00, 0xF4, 0x01, 0x00],
        )
    }

    fn disconnection_complete() -> Vec<u8> {
        let h = CONNECTION.to_le_bytes();

        mock::event(base_events::DISCONN_COMPLETE, &[0x00, h[0], h[1], 0x13])
    }

    /// Answer the first `set_discoverable` with the frames
    fn after_advertising(firmware: &MockFirmware, frames: Vec<Vec<u8>>) {
        let mut frames = Some(frames);

        firmware.respond_with(move |command| {
            if command.opcode() != set_discoverable::OPCODE {
                return None;
            }

            let mut reply = vec![mock::command_complete(set_discoverable::OPCODE, &[0x00])];

            reply.extend(frames.take().unwrap_or_default());

            Some(reply)
        });
    }

    fn sent(firmware: &MockFirmware, opcode: OpCode) -> Vec<Vec<u8>> {
        firmware
            .commands()
            .into_iter()
            .filter(|c| c.opcode() == opcode)
            .map(|c| c.parameters().to_vec())
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<(EventKind, Option<u16>, Vec<u8>)>,
        uuids: Vec<Option<Uuid>>,
        permission: Option<Permission>,
        stop_on: Option<EventKind>,
        periodic: usize,
    }

    impl Handler<Peripheral<MockFirmware>> for Recorder {
        fn on_event(&mut self, session: &mut Peripheral<MockFirmware>, event: Event<'_>) -> Option<Permission> {
            self.events.push((event.kind(), event.handle(), event.payload().to_vec()));

            match event {
                Event::AttributeWritten { attribute_handle, .. }
                | Event::WritePermissionRequest { attribute_handle, .. }
                | Event::ReadPermissionRequest { attribute_handle, .. } => {
                    self.uuids.push(session.database().uuid_from_handle(attribute_handle))
                }
                _ => (),
            }

            if Some(event.kind()) == self.stop_on {
                session.stop_handle().stop();
            }

            self.permission
        }

        fn periodic(&mut self, session: &mut Peripheral<MockFirmware>) {
            self.periodic += 1;

            // a missing event must not hang the test
            if self.periodic > 200 {
                session.stop_handle().stop();
            }
        }
    }

    #[test]
    fn client_write_reaches_the_handler() {
        let firmware = MockFirmware::new();

        let h = CONNECTION.to_le_bytes();

        after_advertising(
            &firmware,
            vec![
                connection_complete(),
                mock::vendor_event(
                    vendor_events::GATT_ATTRIBUTE_MODIFIED,
                    &[h[0], h[1], 0x02, 0x00, 0x03, 0x00, 0x00, b'a', b'b', b'c'],
                ),
            ],
        );

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        let mut recorder = Recorder {
            stop_on: Some(EventKind::AttributeWritten),
            ..Recorder::default()
        };

        peripheral.run(&mut recorder).unwrap();

        assert_eq!(
            recorder.events,
            vec![
                (EventKind::Connected, Some(CONNECTION), vec![6, 5, 4, 3, 2, 1]),
                (EventKind::AttributeWritten, Some(2), b"abc".to_vec()),
            ]
        );

        assert_eq!(recorder.uuids, vec![Some(rx_uuid())]);

        assert_eq!(peripheral.state(), State::Stopped);
        assert_eq!(firmware.resets(), 3);

        // local name AD type followed by "uart"
        let discoverable = &sent(&firmware, set_discoverable::OPCODE)[0];

        assert_eq!(discoverable[0], AdvertisingType::ConnectableUndirected.val());
        assert_eq!(discoverable[7..13], [5, 0x09, b'u', b'a', b'r', b't']);

        assert_eq!(sent(&firmware, set_scan_response_data::OPCODE).len(), 1);
    }

    #[test]
    fn startup_order() {
        let firmware = MockFirmware::new();

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        peripheral.start().unwrap();

        assert_eq!(
            firmware.opcodes(),
            vec![
                hal::write_config_data::OPCODE,
                hal::write_config_data::OPCODE,
                gatt::init::OPCODE,
                gap::init::OPCODE,
                gatt::update_char_value::OPCODE,
                set_auth_requirement::OPCODE,
                hal::set_tx_power_level::OPCODE,
                gatt::add_serv::OPCODE,
                gatt::add_char::OPCODE,
                gatt::add_char::OPCODE,
                set_scan_response_data::OPCODE,
                set_discoverable::OPCODE,
            ]
        );

        let commands = firmware.commands();

        assert_eq!(commands[0].parameters(), &[0x00, 6, 0x02, 0x80, 0xE1, 0x00, 0x34, 0x14]);
        assert_eq!(commands[1].parameters(), &[0x2D, 1, 0x02]);
        assert_eq!(commands[3].parameters(), &[0x01, 0x00, 4]);
        assert_eq!(commands[6].parameters(), &[0x01, 5]);

        assert_eq!(peripheral.state(), State::Advertising);
        assert_eq!(firmware.resets(), 2);
    }

    #[test]
    fn startup_aborts_on_the_first_failure() {
        let firmware = MockFirmware::new();

        let mut characteristics = 0;

        firmware.respond_with(move |command| {
            if command.opcode() == gatt::add_char::OPCODE {
                characteristics += 1;

                if characteristics == 2 {
                    return Some(vec![mock::command_complete(gatt::add_char::OPCODE, &[0x41])]);
                }
            }

            None
        });

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        let error = peripheral.start().unwrap_err();

        match error {
            Error::Hci(e) => assert_eq!(e.status(), Some(ControllerError::Failed)),
            e => panic!("unexpected error {:?}", e),
        }

        assert_eq!(firmware.commands().len(), 10);
        assert!(sent(&firmware, set_discoverable::OPCODE).is_empty());

        assert_eq!(peripheral.state(), State::Stopped);
        assert_eq!(firmware.resets(), 3);
    }

    #[test]
    fn bad_reset_reason_stops_startup() {
        let firmware = MockFirmware::new();

        firmware.set_reset_reason(8);

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        assert_eq!(
            peripheral.run(&mut Recorder::default()),
            Err(Error::ResetReason(crate::hci::events::ResetReason::Crash))
        );

        assert!(firmware.commands().is_empty());
        assert_eq!(peripheral.state(), State::Stopped);
    }

    #[test]
    fn write_permission() {
        let h = CONNECTION.to_le_bytes();

        let request = mock::vendor_event(
            vendor_events::GATT_WRITE_PERMIT_REQ,
            &[h[0], h[1], 0x03, 0x00, 0x01, 0x05],
        );

        for (permission, expected) in [
            (Some(Permission::Allow), [0x00, 0x00]),
            (None, [0x00, 0x00]),
            (Some(Permission::deny_write()), [0x01, 0x03]),
        ]
        .iter()
        {
            let firmware = MockFirmware::new();

            after_advertising(&firmware, vec![connection_complete(), request.clone()]);

            let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

            let mut recorder = Recorder {
                permission: *permission,
                stop_on: Some(EventKind::WritePermissionRequest),
                ..Recorder::default()
            };

            peripheral.run(&mut recorder).unwrap();

            assert_eq!(recorder.uuids, vec![Some(rx_uuid())]);

            let responses = sent(&firmware, gatt::write_response::OPCODE);

            assert_eq!(
                responses,
                vec![vec![h[0], h[1], 0x03, 0x00, expected[0], expected[1], 0x01, 0x05]]
            );
        }
    }

    #[test]
    fn read_permission() {
        let h = CONNECTION.to_le_bytes();

        let firmware = MockFirmware::new();

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        peripheral.start().unwrap();

        let request = mock::vendor_event(
            vendor_events::GATT_READ_PERMIT_REQ,
            &[h[0], h[1], 0x04, 0x00, 0x00, 0x00, 0x00],
        );

        let mut recorder = Recorder::default();

        peripheral.dispatch(&mut recorder, &request).unwrap();

        assert!(sent(&firmware, gatt::allow_read::OPCODE).is_empty());

        peripheral.dispatch(&mut recorder, &connection_complete()).unwrap();

        peripheral.dispatch(&mut recorder, &request).unwrap();

        assert_eq!(sent(&firmware, gatt::allow_read::OPCODE), vec![vec![h[0], h[1]]]);

        recorder.permission = Some(Permission::Deny(0x02));

        peripheral.dispatch(&mut recorder, &request).unwrap();

        assert_eq!(sent(&firmware, gatt::allow_read::OPCODE).len(), 1);
        assert_eq!(recorder.uuids, vec![Some(tx_uuid()); 3]);
    }

    #[test]
    fn advertising_again_after_disconnect() {
        let firmware = MockFirmware::new();

        after_advertising(&firmware, vec![connection_complete(), disconnection_complete()]);

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        let mut recorder = Recorder {
            stop_on: Some(EventKind::Disconnected),
            ..Recorder::default()
        };

        peripheral.run(&mut recorder).unwrap();

        assert_eq!(
            recorder.events[1],
            (EventKind::Disconnected, Some(CONNECTION), Vec::new())
        );

        assert_eq!(sent(&firmware, set_discoverable::OPCODE).len(), 2);
        assert_eq!(sent(&firmware, set_scan_response_data::OPCODE).len(), 2);
    }

    #[test]
    fn hardware_error_ends_the_loop() {
        let firmware = MockFirmware::new();

        after_advertising(&firmware, vec![mock::event(base_events::HARDWARE_ERROR, &[0x02])]);

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        let error = peripheral.run(&mut Recorder::default()).unwrap_err();

        assert!(error.is_fatal());
        assert_eq!(peripheral.state(), State::Stopped);
    }

    #[test]
    fn values_by_uuid() {
        let firmware = MockFirmware::new();

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        peripheral.start().unwrap();

        let unknown = Uuid::from_u16(0x2A19);

        assert_eq!(peripheral.write_by_uuid(&unknown, 0, &[1]), Err(Error::UnknownUuid(unknown)));
        assert_eq!(peripheral.read_by_uuid(&tx_uuid()), Err(Error::NotConnected));

        peripheral.dispatch(&mut Recorder::default(), &connection_complete()).unwrap();

        assert_eq!(peripheral.connection_handle(), Some(CONNECTION));
        assert_eq!(peripheral.state(), State::Connected);

        peripheral.write_by_uuid(&tx_uuid(), 0, &[9, 8]).unwrap();

        assert_eq!(
            sent(&firmware, gatt::update_char_value::OPCODE).last(),
            Some(&vec![0x01, 0x00, 0x03, 0x00, 0x00, 2, 9, 8])
        );

        firmware.respond_with(|command| {
            if command.opcode() == gatt::read_handle_value::OPCODE {
                Some(vec![mock::command_complete(
                    gatt::read_handle_value::OPCODE,
                    &[0x00, 6, 0, 1, 2, 3, 4, 5, 6],
                )])
            } else {
                None
            }
        });

        // cut to the value length of 4
        assert_eq!(peripheral.read_by_uuid(&tx_uuid()), Ok(vec![1, 2, 3, 4]));

        assert_eq!(sent(&firmware, gatt::read_handle_value::OPCODE), vec![vec![0x04, 0x00]]);
    }

    #[test]
    fn notifications_wait_for_a_connection() {
        let firmware = MockFirmware::new();

        let mut peripheral = Peripheral::new(firmware.clone(), config(), uart_database()).unwrap();

        peripheral.start().unwrap();

        let notifier = peripheral.notifier();

        notifier.notify(tx_uuid(), vec![1]).unwrap();

        peripheral.drain_notifications();

        // only the GAP device name so far
        assert_eq!(sent(&firmware, gatt::update_char_value::OPCODE).len(), 1);

        peripheral.dispatch(&mut Recorder::default(), &connection_complete()).unwrap();

        notifier.notify_at(tx_uuid(), 1, vec![2]).unwrap();

        peripheral.drain_notifications();

        assert_eq!(
            sent(&firmware, gatt::update_char_value::OPCODE).last(),
            Some(&vec![0x01, 0x00, 0x03, 0x00, 0x01, 1, 2])
        );
    }

    #[test]
    fn rejected_configuration() {
        let mut config = config();

        config.name = "n".repeat(30);

        assert!(Peripheral::new(MockFirmware::new(), config, uart_database()).is_err());

        let mut config = self::config();

        config.advertising_data = Some(vec![0x05, 0xFF, 0x01]);

        assert!(Peripheral::new(MockFirmware::new(), config, uart_database()).is_err());
    }
}
