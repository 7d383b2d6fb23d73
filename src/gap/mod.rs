//! Generic Access Profile sessions
//!
//! A session owns the [`HostInterface`] to the BlueNRG-MS. A [`Peripheral`](peripheral::Peripheral)
//! advertises and serves an [`AttributeDatabase`](crate::gatt::AttributeDatabase), a
//! [`Scanner`](scan::Scanner) discovers devices and connects to them as a central.
//!
//! Events read while a session runs are turned into an [`Event`] and given to a single
//! [`Handler`]. Only the session talks to the BlueNRG-MS, other threads hand data to it through a
//! [`Notifier`] and stop it with a [`StopHandle`].

pub mod advertise;
pub mod peripheral;
pub mod scan;

use crate::aci;
use crate::hci::engine::{self, HostInterface};
use crate::hci::events::{HalInitializedData, ResetReason};
use crate::hci::schema::vendor::events as vendor_events;
use crate::hci::schema::base::events as base_events;
use crate::hci::schema::CodecError;
use crate::hci_transport::Hardware;
use crate::uuid::Uuid;
use core::convert::TryFrom;
use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// ATT error code sent when a write is denied
pub const WRITE_NOT_PERMITTED: u8 = crate::att::WRITE_NOT_PERMITTED;

/// The kind of an [`Event`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Connected,
    Disconnected,
    AttributeWritten,
    WritePermissionRequest,
    ReadPermissionRequest,
    Vendor,
}

/// An event given to the [`Handler`] of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    Connected {
        connection_handle: u16,
        peer_address: [u8; 6],
    },
    Disconnected {
        connection_handle: u16,
        reason: u8,
    },
    /// A client wrote to an attribute
    AttributeWritten { attribute_handle: u16, data: &'a [u8] },
    /// A client wants to write to an attribute
    ///
    /// The write is held by the firmware until the handler's [`Permission`] is sent.
    WritePermissionRequest { attribute_handle: u16, data: &'a [u8] },
    /// A client wants to read an attribute
    ///
    /// The handler can update the value before the read is allowed.
    ReadPermissionRequest { attribute_handle: u16, offset: u16 },
    /// Any other vendor event, by its sub event code
    Vendor { code: u16, parameters: &'a [u8] },
}

impl<'a> Event<'a> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Connected { .. } => EventKind::Connected,
            Event::Disconnected { .. } => EventKind::Disconnected,
            Event::AttributeWritten { .. } => EventKind::AttributeWritten,
            Event::WritePermissionRequest { .. } => EventKind::WritePermissionRequest,
            Event::ReadPermissionRequest { .. } => EventKind::ReadPermissionRequest,
            Event::Vendor { .. } => EventKind::Vendor,
        }
    }

    /// The connection handle or attribute handle of the event
    pub fn handle(&self) -> Option<u16> {
        match *self {
            Event::Connected { connection_handle, .. } | Event::Disconnected { connection_handle, .. } => {
                Some(connection_handle)
            }
            Event::AttributeWritten { attribute_handle, .. }
            | Event::WritePermissionRequest { attribute_handle, .. }
            | Event::ReadPermissionRequest { attribute_handle, .. } => Some(attribute_handle),
            Event::Vendor { .. } => None,
        }
    }

    /// The data of the event
    ///
    /// This is the peer address for `Connected`.
    pub fn payload(&self) -> &[u8] {
        match self {
            Event::Connected { peer_address, .. } => peer_address,
            Event::AttributeWritten { data, .. } | Event::WritePermissionRequest { data, .. } => data,
            Event::Vendor { parameters, .. } => parameters,
            Event::Disconnected { .. } | Event::ReadPermissionRequest { .. } => &[],
        }
    }

    pub fn is_permission_request(&self) -> bool {
        match self.kind() {
            EventKind::WritePermissionRequest | EventKind::ReadPermissionRequest => true,
            _ => false,
        }
    }
}

/// The answer to a permission request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    Allow,
    /// Deny a write with the ATT error code, or leave a read unanswered
    Deny(u8),
}

impl Permission {
    pub fn deny_write() -> Self {
        Permission::Deny(WRITE_NOT_PERMITTED)
    }
}

/// Receiver of the events of a session
///
/// The handler runs inside the session's loop and can send commands through the session it is
/// given. Anything slow stalls the loop.
///
/// Any closure `FnMut(&mut S, Event) -> Option<Permission>` is a handler. The returned
/// permission is only used for permission requests, where `None` allows the access.
pub trait Handler<S> {
    fn on_event(&mut self, session: &mut S, event: Event<'_>) -> Option<Permission>;

    /// Called once every run interval of the session
    fn periodic(&mut self, _session: &mut S) {}
}

impl<S, F> Handler<S> for F
where
    F: FnMut(&mut S, Event<'_>) -> Option<Permission>,
{
    fn on_event(&mut self, session: &mut S, event: Event<'_>) -> Option<Permission> {
        self(session, event)
    }
}

/// Cooperative stop of a running session
///
/// The session checks the handle between frames.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::SeqCst)
    }
}

/// A value to write by the running session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub uuid: Uuid,
    pub offset: u8,
    pub value: Vec<u8>,
}

/// Queue of writes for the session
///
/// The run loop of the session takes the queued writes and makes them with
/// [`write_by_uuid`](peripheral::Peripheral::write_by_uuid). A write of a characteristic with
/// notify or indicate is sent to the client.
#[derive(Clone, Debug)]
pub struct Notifier(mpsc::Sender<Notification>);

impl Notifier {
    /// Queue a new value
    ///
    /// An error is returned when the session is gone.
    pub fn notify<V>(&self, uuid: Uuid, value: V) -> Result<(), Error>
    where
        V: Into<Vec<u8>>,
    {
        self.notify_at(uuid, 0, value)
    }

    pub fn notify_at<V>(&self, uuid: Uuid, offset: u8, value: V) -> Result<(), Error>
    where
        V: Into<Vec<u8>>,
    {
        self.0
            .send(Notification {
                uuid,
                offset,
                value: value.into(),
            })
            .map_err(|_| Error::SessionClosed)
    }
}

/// Create a notifier and the receiver end kept by a session
fn notification_queue() -> (Notifier, mpsc::Receiver<Notification>) {
    let (sender, receiver) = mpsc::channel();

    (Notifier(sender), receiver)
}

/// The state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Constructed,
    Initializing,
    Advertising,
    Scanning,
    /// Initialized and neither advertising nor scanning
    Idle,
    Connected,
    Stopped,
}

#[derive(Debug, PartialEq)]
pub enum Error {
    /// The BlueNRG-MS did not report being initialized after a reset
    NotReady,
    /// The BlueNRG-MS started for another reason than a normal reset
    ResetReason(ResetReason),
    Hci(engine::Error),
    Build(crate::gatt::BuildError),
    Advertising(advertise::Error),
    /// The reply to a permission request failed, the firmware is left waiting for it
    Acknowledgement(engine::Error),
    UnknownUuid(Uuid),
    /// The attribute was not registered
    NotRegistered(Uuid),
    NotConnected,
    /// The session of a [`Notifier`] is gone
    SessionClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotReady => write!(f, "BlueNRG-MS not ready"),
            Error::ResetReason(reason) => write!(f, "unexpected reset reason {:?}", reason),
            Error::Hci(e) => write!(f, "{}", e),
            Error::Build(e) => write!(f, "{}", e),
            Error::Advertising(e) => write!(f, "{}", e),
            Error::Acknowledgement(e) => write!(f, "permission request not acknowledged: {}", e),
            Error::UnknownUuid(uuid) => write!(f, "no attribute with UUID {}", uuid),
            Error::NotRegistered(uuid) => write!(f, "attribute {} is not registered", uuid),
            Error::NotConnected => write!(f, "not connected"),
            Error::SessionClosed => write!(f, "session closed"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Check if the error ends the run loop of a session
    ///
    /// A hardware error or a permission request left without a reply leaves the firmware in a
    /// state the session cannot recover from.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Acknowledgement(_) | Error::Hci(engine::Error::Hardware(_)) => true,
            _ => false,
        }
    }
}

impl From<engine::Error> for Error {
    fn from(e: engine::Error) -> Self {
        Error::Hci(e)
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Hci(engine::Error::Codec(e))
    }
}

impl From<crate::gatt::BuildError> for Error {
    fn from(e: crate::gatt::BuildError) -> Self {
        Error::Build(e)
    }
}

impl From<advertise::Error> for Error {
    fn from(e: advertise::Error) -> Self {
        Error::Advertising(e)
    }
}

/// Reset the BlueNRG-MS and wait for it to report a normal start
fn reset_and_wait<H: Hardware>(hci: &mut HostInterface<H>) -> Result<(), Error> {
    hci.reset();

    let (timeout, retries) = (hci.timeout(), hci.retries());

    let response = match hci.wait_event(
        base_events::VENDOR,
        Some(vendor_events::HAL_INITIALIZED),
        timeout,
        retries,
    ) {
        Ok(response) => response,
        Err(engine::Error::Timeout) => {
            log::error!("no HAL initialized event after reset");

            return Err(Error::NotReady);
        }
        Err(e) => return Err(e.into()),
    };

    let reason = HalInitializedData::try_from(response.payload())
        .map_err(engine::Error::from)?
        .reason;

    if reason != ResetReason::Normal {
        log::error!("BlueNRG-MS started with reset reason {:?}", reason);

        return Err(Error::ResetReason(reason));
    }

    Ok(())
}

/// Write the public address and the mode
///
/// This must come right after a reset.
fn configure<H: Hardware>(hci: &mut HostInterface<H>, address: &[u8; 6]) -> Result<(), Error> {
    use aci::hal::{config, write_config_data};

    write_config_data::send(hci, config::PUBLIC_ADDRESS_OFFSET, address)?;

    write_config_data::send(hci, config::MODE_OFFSET, &[config::MODE_SLAVE_AND_MASTER])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hci::schema::Variant;
    use crate::hci_transport::mock::MockFirmware;

    #[test]
    fn event_triple() {
        let data = [1, 2, 3];

        let event = Event::AttributeWritten {
            attribute_handle: 2,
            data: &data,
        };

        assert_eq!((event.kind(), event.handle(), event.payload()), (EventKind::AttributeWritten, Some(2), &data[..]));

        let connected = Event::Connected {
            connection_handle: 0x0801,
            peer_address: [6, 5, 4, 3, 2, 1],
        };

        assert_eq!(connected.handle(), Some(0x0801));
        assert_eq!(connected.payload(), &[6, 5, 4, 3, 2, 1]);
        assert!(!connected.is_permission_request());

        assert!(Event::ReadPermissionRequest {
            attribute_handle: 4,
            offset: 0
        }
        .is_permission_request());
    }

    #[test]
    fn closures_are_handlers() {
        let mut seen = Vec::new();

        let mut handler = |count: &mut usize, event: Event<'_>| {
            *count += 1;
            seen.push(event.kind());

            Some(Permission::deny_write())
        };

        let mut count = 0;

        let permission = Handler::on_event(
            &mut handler,
            &mut count,
            Event::WritePermissionRequest {
                attribute_handle: 3,
                data: &[1],
            },
        );

        Handler::periodic(&mut handler, &mut count);

        assert_eq!(permission, Some(Permission::Deny(0x03)));
        assert_eq!(count, 1);
        assert_eq!(seen, vec![EventKind::WritePermissionRequest]);
    }

    #[test]
    fn notifier_queues_values() {
        let (notifier, receiver) = notification_queue();

        let other = notifier.clone();

        std::thread::spawn(move || other.notify(Uuid::from_u16(0x2A19), vec![99]).unwrap())
            .join()
            .unwrap();

        assert_eq!(
            receiver.try_recv(),
            Ok(Notification {
                uuid: Uuid::from_u16(0x2A19),
                offset: 0,
                value: vec![99]
            })
        );

        drop(receiver);

        assert_eq!(notifier.notify(Uuid::from_u16(0x2A19), vec![1]), Err(Error::SessionClosed));
    }

    #[test]
    fn stop_handle_is_shared() {
        let stop = StopHandle::new();

        let other = stop.clone();

        other.stop();

        assert!(stop.is_stopped());

        stop.clear();

        assert!(!other.is_stopped());
    }

    #[test]
    fn bad_reset_reason() {
        let firmware = MockFirmware::new();

        let mut hci = HostInterface::new(firmware.clone(), Variant::Idb05a1);

        assert_eq!(reset_and_wait(&mut hci), Ok(()));

        firmware.set_reset_reason(5);

        assert_eq!(reset_and_wait(&mut hci), Err(Error::ResetReason(ResetReason::Watchdog)));
        assert_eq!(firmware.resets(), 2);
    }
}
