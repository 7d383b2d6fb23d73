//! Low Energy (LE) Controller Commands
//!
//! The LE commands are broken up into modules based on the *LE Controller Requirements* in the
//! Bluetooth Specification (v4.1) found at 'Vol 2, Part E, section 3.1'. The BlueNRG-MS is a v4.1
//! controller, none of the v4.2 and later commands exist.

pub mod connection;
pub mod encryption;
pub mod mandatory;
pub mod receiver;
pub mod transmitter;
