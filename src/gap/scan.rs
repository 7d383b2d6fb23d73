//! Scanning and connecting as a central
//!
//! A [`Scanner`] runs the general discovery procedure of the BlueNRG-MS and collects the
//! advertising reports of connectable or scannable devices into [`ScanEntry`]s. It can then
//! connect to one of them with the direct connection establishment procedure. While connected,
//! [`run`](Scanner::run) reads the events of the connection and hands them to a [`Handler`].

use super::advertise::{find_local_name, local_name_ad};
use super::{configure, reset_and_wait, Error, Event, Handler, State, StopHandle};
use crate::aci::gap::{
    create_connection, init::GapHandles, procedure, start_general_discovery_proc, terminate,
    terminate_gap_procedure, ConnectionParameters, DiscoveryParameters, Role,
};
use crate::aci::{gatt, hal, AddressType};
use crate::config::ScannerConfig;
use crate::hci::engine::{self, HostInterface};
use crate::hci::events::{
    AdvertisingReport, AdvertisingReportIter, DisconnectionCompleteData, EventPacket, GapProcedureCompleteData,
    HardwareErrorData, LEAdvEventType, LEConnectionCompleteData,
};
use crate::hci::schema::base::events as base_events;
use crate::hci::schema::vendor::events as vendor_events;
use crate::hci::schema::SubCodeWidth;
use crate::hci_transport::{Hardware, HciPacketIndicator};
use core::convert::TryFrom;
use std::time::{Duration, Instant};

/// A device found by a scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanEntry {
    pub address: [u8; 6],
    pub address_type: u8,
    pub rssi: i8,
    /// The advertising data
    pub data: Vec<u8>,
}

impl ScanEntry {
    /// Create an entry for reports of connectable or scannable undirected advertising
    fn from_report(report: &AdvertisingReport<'_>) -> Option<Self> {
        match report.event_type {
            LEAdvEventType::ConnectableAndScannableUndirectedAdvertising
            | LEAdvEventType::ScannableUndirectedAdvertising => Some(ScanEntry {
                address: report.address,
                address_type: report.address_type,
                rssi: report.rssi,
                data: report.data.to_vec(),
            }),
            _ => None,
        }
    }

    pub fn local_name(&self) -> Option<&str> {
        find_local_name(&self.data)
    }

    pub fn peer_address_type(&self) -> AddressType {
        match self.address_type {
            0 => AddressType::Public,
            _ => AddressType::Random,
        }
    }
}

pub struct Scanner<H> {
    hci: HostInterface<H>,
    config: ScannerConfig,
    gap_handles: GapHandles,
    connection_handle: Option<u16>,
    state: State,
    stop: StopHandle,
}

impl<H> Scanner<H>
where
    H: Hardware,
{
    /// Create a scanner
    ///
    /// The device name must fit in an advertising packet as the complete local name.
    pub fn new(hardware: H, config: ScannerConfig) -> Result<Self, Error> {
        local_name_ad(&config.name)?;

        let mut hci = HostInterface::new(hardware, config.variant);

        hci.set_timeout(config.command_timeout);
        hci.set_retries(config.retries);

        Ok(Scanner {
            hci,
            config,
            gap_handles: GapHandles::default(),
            connection_handle: None,
            state: State::Constructed,
            stop: StopHandle::new(),
        })
    }

    pub fn hci(&mut self) -> &mut HostInterface<H> {
        &mut self.hci
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

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

    /// Initialize the BlueNRG-MS and start the general discovery procedure
    pub fn start(&mut self) -> Result<(), Error> {
        self.stop.clear();

        match self.initialize().and_then(|_| self.start_discovery()) {
            Ok(()) => Ok(()),
            Err(e) => {
                log::error!("scanner startup failed: {}", e);

                self.stop();

                Err(e)
            }
        }
    }

    fn initialize(&mut self) -> Result<(), Error> {
        self.state = State::Initializing;

        // The configuration data is only taken after the second reset
        reset_and_wait(&mut self.hci)?;
        reset_and_wait(&mut self.hci)?;

        configure(&mut self.hci, &self.config.address)?;

        gatt::init::send(&mut self.hci)?;

        self.gap_handles = crate::aci::gap::init::send(
            &mut self.hci,
            Role::Central,
            false,
            self.config.name.len() as u8,
        )?;

        hal::set_tx_power_level::send(
            &mut self.hci,
            self.config.tx_power.high_power,
            self.config.tx_power.pa_level,
        )?;

        log::info!("central initialized");

        self.state = State::Idle;

        Ok(())
    }

    fn start_discovery(&mut self) -> Result<(), Error> {
        let parameters = DiscoveryParameters {
            scan_interval: self.config.scan_interval,
            scan_window: self.config.scan_window,
            own_address_type: AddressType::Public,
            filter_duplicates: self.config.filter_duplicates,
        };

        start_general_discovery_proc::send(&mut self.hci, &parameters)?;

        self.state = State::Scanning;

        Ok(())
    }

    /// Scan for `timeout` and return the devices found
    ///
    /// The BlueNRG-MS is reset after the scan.
    pub fn scan(&mut self, timeout: Duration) -> Result<Vec<ScanEntry>, Error> {
        self.start()?;

        let entries = self.collect(timeout);

        if let Err(e) = terminate_gap_procedure::send(&mut self.hci, procedure::GENERAL_DISCOVERY) {
            log::warn!("failed to terminate discovery: {}", e);
        }

        self.stop();

        let entries = entries?;

        log::info!("found {} devices", entries.len());

        Ok(entries)
    }

    fn collect(&mut self, timeout: Duration) -> Result<Vec<ScanEntry>, Error> {
        let start = Instant::now();

        let mut entries = Vec::new();

        while start.elapsed() < timeout && !self.stop.is_stopped() {
            let frame = match self.hci.read_frame(self.config.retries) {
                Some(frame) if crate::hci::verify(Some(&frame)) => frame,
                _ => continue,
            };

            match self.reports(&frame, &mut entries) {
                Ok(true) => {
                    log::debug!("discovery ended by the BlueNRG-MS");

                    break;
                }
                Ok(false) => (),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => log::warn!("event {:02X?} not handled: {}", frame, e),
            }
        }

        Ok(entries)
    }

    /// Add the reports of an event to `entries`
    ///
    /// `true` is returned when the event ends the discovery procedure.
    fn reports(&self, frame: &[u8], entries: &mut Vec<ScanEntry>) -> Result<bool, Error> {
        let packet = EventPacket::from_packet(frame)?;

        match packet.code() {
            base_events::LE_META_EVENT
                if packet.sub_code(SubCodeWidth::U8)? == u16::from(base_events::LE_ADVERTISING_REPORT) =>
            {
                for report in AdvertisingReportIter::new(packet.sub_parameters(SubCodeWidth::U8))? {
                    entries.extend(ScanEntry::from_report(&report?));
                }

                Ok(false)
            }
            base_events::VENDOR => {
                let parameters = packet.sub_parameters(SubCodeWidth::U16);

                match packet.sub_code(SubCodeWidth::U16)? {
                    vendor_events::GAP_DEVICE_FOUND => {
                        entries.extend(ScanEntry::from_report(&AdvertisingReport::from_device_found(parameters)?));

                        Ok(false)
                    }
                    vendor_events::GAP_PROCEDURE_COMPLETE => Ok(GapProcedureCompleteData::try_from(parameters)?
                        .procedure_code
                        == procedure::GENERAL_DISCOVERY),
                    _ => Ok(false),
                }
            }
            base_events::HARDWARE_ERROR => Err(Error::Hci(engine::Error::Hardware(
                HardwareErrorData::try_from(packet.parameters())?.code,
            ))),
            _ => Ok(false),
        }
    }

    /// Connect to a peripheral
    ///
    /// A running discovery is terminated first. `timeout` is how long to wait for the
    /// connection, the procedure is terminated when it runs out.
    pub fn connect(&mut self, address_type: AddressType, address: [u8; 6], timeout: Duration) -> Result<u16, Error> {
        match self.state {
            State::Scanning => {
                terminate_gap_procedure::send(&mut self.hci, procedure::GENERAL_DISCOVERY)?;

                self.state = State::Idle;
            }
            State::Idle => (),
            State::Connected => {
                log::warn!("already connected");

                return self.connection_handle.ok_or(Error::NotConnected);
            }
            _ => self.initialize()?,
        }

        create_connection::send(&mut self.hci, &ConnectionParameters::new(address_type, address))?;

        let start = Instant::now();

        let (wait, retries) = (self.hci.timeout(), self.hci.retries());

        let data = loop {
            let response = self.hci.wait_event(
                base_events::LE_META_EVENT,
                Some(base_events::LE_CONN_COMPLETE.into()),
                wait,
                retries,
            );

            match response {
                Ok(response) => break LEConnectionCompleteData::try_from(response.payload())?,
                Err(engine::Error::Timeout) if start.elapsed() < timeout && !self.stop.is_stopped() => (),
                Err(engine::Error::Timeout) => {
                    log::warn!("no connection to {:02X?}", address);

                    terminate_gap_procedure::send(&mut self.hci, procedure::DIRECT_CONNECTION_ESTABLISHMENT)?;

                    return Err(Error::Hci(engine::Error::Timeout));
                }
                Err(e) => return Err(e.into()),
            }
        };

        data.status.ok_or_else(|status| engine::Error::Status { opcode: None, status })?;

        log::info!("connected to {:02X?} as {}", address, data.connection_handle);

        self.connection_handle = Some(data.connection_handle);
        self.state = State::Connected;

        Ok(data.connection_handle)
    }

    /// Close the connection with the reason for the peer
    pub fn disconnect(&mut self, reason: u8) -> Result<(), Error> {
        let handle = self.connection_handle.ok_or(Error::NotConnected)?;

        terminate::send(&mut self.hci, handle, reason)?;

        let (wait, retries) = (self.hci.timeout(), self.hci.retries());

        let response = self.hci.wait_event(base_events::DISCONN_COMPLETE, None, wait, retries)?;

        let data = DisconnectionCompleteData::try_from(response.payload())?;

        log::info!("connection {} closed: {}", data.connection_handle, data.reason);

        self.connection_handle = None;
        self.state = State::Idle;

        Ok(())
    }

    /// Reset the BlueNRG-MS and stop the session
    pub fn stop(&mut self) {
        self.hci.reset();

        self.connection_handle = None;
        self.state = State::Stopped;
    }

    /// Read the events of the BlueNRG-MS until stopped
    ///
    /// This is meant for after [`connect`](Scanner::connect), a disconnection by the peer is only
    /// seen here. A scanner that is not initialized is initialized first. The BlueNRG-MS is
    /// always reset when this returns.
    pub fn run<F>(&mut self, handler: &mut F) -> Result<(), Error>
    where
        F: Handler<Self>,
    {
        self.stop.clear();

        let result = match self.state {
            State::Constructed | State::Stopped => self.initialize(),
            _ => Ok(()),
        }
        .and_then(|_| self.event_loop(handler));

        if let Err(e) = &result {
            log::error!("scanner stopped: {}", e);
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
            }
            base_events::LE_META_EVENT
                if packet.sub_code(SubCodeWidth::U8)? == u16::from(base_events::LE_CONN_COMPLETE) =>
            {
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
            }
            base_events::VENDOR => {
                let code = packet.sub_code(SubCodeWidth::U16)?;

                handler.on_event(
                    self,
                    Event::Vendor {
                        code,
                        parameters: packet.sub_parameters(SubCodeWidth::U16),
                    },
                );
            }
            base_events::HARDWARE_ERROR => {
                let data = HardwareErrorData::try_from(packet.parameters())?;

                return Err(Error::Hci(engine::Error::Hardware(data.code)));
            }
            _ => log::debug!("dropping event {:02X?}", frame),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gap::{advertise, EventKind, Permission};
    use crate::hci::error::Error as ControllerError;
    use crate::hci::OpCode;
    use crate::hci_transport::mock::{self, MockFirmware};

    const PEER: [u8; 6] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];

    fn report(event_type: u8, address: [u8; 6], data: &[u8], rssi: i8) -> Vec<u8> {
        let mut params = vec![1, event_type, 0x00];

        params.extend_from_slice(&address);
        params.push(data.len() as u8);
        params.extend_from_slice(data);
        params.push(rssi as u8);

        mock::le_meta_event(base_events::LE_ADVERTISING_REPORT, &params)
    }

    fn connection_complete(status: u8) -> Vec<u8> {
        let mut params = vec![status, 0x01, 0x08, 0x00, 0x00];

        params.extend_from_slice(&PEER);
        params.extend_from_slice(&[0x6C, 0x00, 0x00, 0x00, 0x80, 0x0C, 0x00]);

        mock::le_meta_event(base_events::LE_CONN_COMPLETE, &params)
    }

    /// Answer a procedure with its command status followed by the frames
    fn after(firmware: &MockFirmware, opcode: OpCode, frames: Vec<Vec<u8>>) {
        let mut frames = Some(frames);

        firmware.respond_with(move |command| {
            if command.opcode() != opcode {
                return None;
            }

            let mut reply = vec![mock::command_status(0x00, opcode)];

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

    #[test]
    fn startup_order() {
        let firmware = MockFirmware::new();

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        scanner.start().unwrap();

        assert_eq!(
            firmware.opcodes(),
            vec![
                hal::write_config_data::OPCODE,
                hal::write_config_data::OPCODE,
                gatt::init::OPCODE,
                crate::aci::gap::init::OPCODE,
                hal::set_tx_power_level::OPCODE,
                start_general_discovery_proc::OPCODE,
            ]
        );

        // central role of the IDB05A1 stack
        assert_eq!(firmware.commands()[3].parameters(), &[0x04, 0x00, 0x00]);

        assert_eq!(
            sent(&firmware, start_general_discovery_proc::OPCODE),
            vec![vec![0x10, 0x00, 0x10, 0x00, 0x00, 0x01]]
        );

        assert_eq!(scanner.state(), State::Scanning);
        assert_eq!(firmware.resets(), 2);
    }

    #[test]
    fn scan_keeps_connectable_and_scannable_reports() {
        let firmware = MockFirmware::new();

        let name = [0x05, 0x09, b'n', b'o', b'd', b'e'];

        after(
            &firmware,
            start_general_discovery_proc::OPCODE,
            vec![
                report(0x00, PEER, &name, -60),
                report(0x04, [1; 6], &[], -70),
                report(0x02, [2; 6], &[0x02, 0x01, 0x06], -80),
                report(0x03, [3; 6], &[], -90),
            ],
        );

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        let entries = scanner.scan(Duration::from_millis(50)).unwrap();

        assert_eq!(
            entries,
            vec![
                ScanEntry {
                    address: PEER,
                    address_type: 0,
                    rssi: -60,
                    data: name.to_vec(),
                },
                ScanEntry {
                    address: [2; 6],
                    address_type: 0,
                    rssi: -80,
                    data: vec![0x02, 0x01, 0x06],
                },
            ]
        );

        assert_eq!(entries[0].local_name(), Some("node"));
        assert_eq!(entries[1].local_name(), None);
        assert_eq!(entries[0].peer_address_type(), AddressType::Public);

        assert_eq!(sent(&firmware, terminate_gap_procedure::OPCODE), vec![vec![0x02]]);

        assert_eq!(scanner.state(), State::Stopped);
        assert_eq!(firmware.resets(), 3);
    }

    #[test]
    fn discovery_ended_by_the_firmware() {
        let firmware = MockFirmware::new();

        after(
            &firmware,
            start_general_discovery_proc::OPCODE,
            vec![
                report(0x00, PEER, &[], -50),
                mock::vendor_event(vendor_events::GAP_PROCEDURE_COMPLETE, &[procedure::GENERAL_DISCOVERY, 0x00]),
            ],
        );

        let mut scanner = Scanner::new(firmware, ScannerConfig::default()).unwrap();

        let start = Instant::now();

        // the scan ends well before its timeout
        assert_eq!(scanner.scan(Duration::from_secs(30)).unwrap().len(), 1);
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[test]
    fn connect_after_discovery() {
        let firmware = MockFirmware::new();

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        scanner.start().unwrap();

        after(&firmware, create_connection::OPCODE, vec![connection_complete(0x00)]);

        assert_eq!(
            scanner.connect(AddressType::Public, PEER, Duration::from_secs(1)),
            Ok(0x0801)
        );

        assert_eq!(scanner.state(), State::Connected);
        assert_eq!(sent(&firmware, terminate_gap_procedure::OPCODE), vec![vec![0x02]]);

        let parameters = &sent(&firmware, create_connection::OPCODE)[0];

        assert_eq!(parameters[4..11], [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);

        after(
            &firmware,
            terminate::OPCODE,
            vec![mock::event(base_events::DISCONN_COMPLETE, &[0x00, 0x01, 0x08, 0x16])],
        );

        scanner.disconnect(0x13).unwrap();

        assert_eq!(sent(&firmware, terminate::OPCODE), vec![vec![0x01, 0x08, 0x13]]);
        assert_eq!(scanner.connection_handle(), None);
        assert_eq!(scanner.disconnect(0x13), Err(Error::NotConnected));
    }

    #[test]
    fn failed_connection() {
        let firmware = MockFirmware::new();

        after(&firmware, create_connection::OPCODE, vec![connection_complete(0x41)]);

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        let error = scanner
            .connect(AddressType::Random, PEER, Duration::from_secs(1))
            .unwrap_err();

        match error {
            Error::Hci(e) => assert_eq!(e.status(), Some(ControllerError::Failed)),
            e => panic!("unexpected error {:?}", e),
        }

        // initialized without starting discovery
        assert!(sent(&firmware, start_general_discovery_proc::OPCODE).is_empty());
        assert_eq!(scanner.connection_handle(), None);
    }

    #[test]
    fn long_names_are_rejected() {
        let mut config = ScannerConfig::default();

        config.name = "n".repeat(256);

        match Scanner::new(MockFirmware::new(), config) {
            Err(Error::Advertising(advertise::Error::TooLarge { overflow, remaining })) => {
                assert_eq!((overflow, remaining), (227, 30))
            }
            Err(e) => panic!("unexpected error {:?}", e),
            Ok(_) => panic!("scanner created with a 256 byte name"),
        }

        let mut config = ScannerConfig::default();

        config.name = "central".into();

        let firmware = MockFirmware::new();

        let mut scanner = Scanner::new(firmware.clone(), config).unwrap();

        scanner.start().unwrap();

        // the name length given to the GAP init
        assert_eq!(firmware.commands()[3].parameters(), &[0x04, 0x00, 7]);
    }

    /// Stop the scanner if the expected events never come
    fn stop_later(scanner: &Scanner<MockFirmware>) {
        let stop = scanner.stop_handle();

        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(5));

            stop.stop();
        });
    }

    #[test]
    fn disconnection_by_the_peer() {
        let firmware = MockFirmware::new();

        after(&firmware, create_connection::OPCODE, vec![connection_complete(0x00)]);

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        scanner.connect(AddressType::Public, PEER, Duration::from_secs(1)).unwrap();

        firmware.queue_frame(mock::event(base_events::DISCONN_COMPLETE, &[0x00, 0x01, 0x08, 0x13]));

        let mut seen = Vec::new();

        let mut handler = |session: &mut Scanner<MockFirmware>, event: Event<'_>| {
            seen.push((event.kind(), event.handle(), session.state(), session.connection_handle()));

            if event.kind() == EventKind::Disconnected {
                session.stop_handle().stop();
            }

            None::<Permission>
        };

        stop_later(&scanner);

        scanner.run(&mut handler).unwrap();

        assert_eq!(seen, vec![(EventKind::Disconnected, Some(0x0801), State::Idle, None)]);

        // the closed connection is not terminated again
        assert!(sent(&firmware, terminate::OPCODE).is_empty());
        assert_eq!(scanner.disconnect(0x13), Err(Error::NotConnected));
        assert_eq!(scanner.state(), State::Stopped);
    }

    #[test]
    fn run_initializes_and_follows_the_connection() {
        let firmware = MockFirmware::new();

        let mut frames = Some(vec![
            connection_complete(0x00),
            mock::vendor_event(vendor_events::GAP_PROCEDURE_COMPLETE, &[procedure::DIRECT_CONNECTION_ESTABLISHMENT, 0x00]),
            mock::event(base_events::DISCONN_COMPLETE, &[0x00, 0x01, 0x08, 0x13]),
        ]);

        firmware.respond_with(move |command| {
            if command.opcode() != hal::set_tx_power_level::OPCODE {
                return None;
            }

            let mut reply = vec![mock::command_complete(hal::set_tx_power_level::OPCODE, &[0x00])];

            reply.extend(frames.take().unwrap_or_default());

            Some(reply)
        });

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        let mut seen = Vec::new();

        let mut handler = |session: &mut Scanner<MockFirmware>, event: Event<'_>| {
            seen.push((event.kind(), event.handle(), session.state(), session.connection_handle()));

            if event.kind() == EventKind::Disconnected {
                session.stop_handle().stop();
            }

            None::<Permission>
        };

        stop_later(&scanner);

        scanner.run(&mut handler).unwrap();

        assert_eq!(
            seen,
            vec![
                (EventKind::Connected, Some(0x0801), State::Connected, Some(0x0801)),
                (EventKind::Vendor, None, State::Connected, Some(0x0801)),
                (EventKind::Disconnected, Some(0x0801), State::Idle, None),
            ]
        );

        // two resets to initialize and one to stop
        assert_eq!(firmware.resets(), 3);
        assert!(sent(&firmware, start_general_discovery_proc::OPCODE).is_empty());
    }

    #[test]
    fn hardware_error_ends_the_run() {
        let firmware = MockFirmware::new();

        after(&firmware, create_connection::OPCODE, vec![connection_complete(0x00)]);

        let mut scanner = Scanner::new(firmware.clone(), ScannerConfig::default()).unwrap();

        scanner.connect(AddressType::Public, PEER, Duration::from_secs(1)).unwrap();

        firmware.queue_frame(mock::event(base_events::HARDWARE_ERROR, &[0x01]));

        stop_later(&scanner);

        match scanner.run(&mut |_: &mut Scanner<MockFirmware>, _: Event<'_>| None::<Permission>) {
            Err(Error::Hci(engine::Error::Hardware(_))) => (),
            r => panic!("unexpected result {:?}", r),
        }

        assert_eq!(scanner.state(), State::Stopped);
        assert_eq!(scanner.connection_handle(), None);
    }
}
