//! A Bluetooth Low Energy host for the BlueNRG-MS
//!
//! The BlueNRG-MS is a network co-processor, it runs the link layer and the host stack up to GATT
//! and GAP. This library is the other side of the SPI link to it. Commands, events, and ACL data
//! go through the [`hci`] (Host Controller Interface), with the vendor specific commands of the
//! BlueNRG-MS in [`aci`].
//!
//! Most applications only need a session from [`gap`]. A [`gap::peripheral::Peripheral`]
//! registers a [`gatt::AttributeDatabase`] and advertises it, a [`gap::scan::Scanner`] discovers
//! and connects to other devices.

#[macro_use]
pub mod hci;

pub mod aci;
pub mod att;
pub mod config;
pub mod gap;
pub mod gatt;
pub mod hci_transport;
pub mod l2cap;
pub mod sm;
pub mod uuid;
