//! Host Controller interface transport layer
//!
//! The BlueNRG-MS is connected through SPI. Every exchange starts with the host selecting the
//! chip and transferring a five byte header. The reply to the header tells the host if the
//! controller is ready and how many bytes it can take and has to give. A packet is only
//! transferred within the same chip select as the header exchange.
//!
//! The SPI bus, the chip select, reset, and IRQ lines, and a delay make up the [`Hardware`] of the
//! link. Either implement `Hardware` directly or use the [`embedded`] adaptor for drivers that
//! implement the `embedded-hal` traits.

pub mod embedded;
#[cfg(test)]
pub(crate) mod mock;

use core::convert::TryFrom;
use core::ops::{Deref, DerefMut};

/// Packet Indicator
///
/// The packet indicator is the first byte of every packet transferred over the link. It tells
/// what kind of packet follows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HciPacketIndicator {
    Command,
    AclData,
    ScoData,
    Event,
    Vendor,
}

impl HciPacketIndicator {
    pub fn val(&self) -> u8 {
        match self {
            HciPacketIndicator::Command => 0x01,
            HciPacketIndicator::AclData => 0x02,
            HciPacketIndicator::ScoData => 0x03,
            HciPacketIndicator::Event => 0x04,
            HciPacketIndicator::Vendor => 0xFF,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HciPacketIndicator::Command => "HCI_COMMAND_PKT",
            HciPacketIndicator::AclData => "HCI_ACLDATA_PKT",
            HciPacketIndicator::ScoData => "HCI_SCODATA_PKT",
            HciPacketIndicator::Event => "HCI_EVENT_PKT",
            HciPacketIndicator::Vendor => "HCI_VENDOR_PKT",
        }
    }
}

impl TryFrom<u8> for HciPacketIndicator {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x01 => Ok(HciPacketIndicator::Command),
            0x02 => Ok(HciPacketIndicator::AclData),
            0x03 => Ok(HciPacketIndicator::ScoData),
            0x04 => Ok(HciPacketIndicator::Event),
            0xFF => Ok(HciPacketIndicator::Vendor),
            _ => Err(raw),
        }
    }
}

/// The physical link to the BlueNRG-MS
///
/// None of these operations can fail. An implementation that sees a bus error should log it and
/// leave the buffer zeroed, the zeroed reply header reads as "not ready" and the exchange is
/// retried.
pub trait Hardware {
    /// Full duplex transfer
    ///
    /// The content of `buf` is written out and replaced with the bytes read in.
    fn transfer(&mut self, buf: &mut [u8]);

    /// Assert the chip select line
    fn select(&mut self);

    /// Release the chip select line
    fn deselect(&mut self);

    /// Drive the reset line, `true` for high (not in reset)
    fn set_reset(&mut self, high: bool);

    /// Block for a number of microseconds
    fn delay_us(&mut self, us: u32);

    /// Check the IRQ line
    ///
    /// The BlueNRG-MS raises the IRQ line when it has data for the host. Hardware that cannot read
    /// the line should keep the default of `true`.
    fn data_available(&mut self) -> bool {
        true
    }

    /// Drive the IRQ line high as an output
    ///
    /// This is only used to enter the bootloader. The return is false when the hardware cannot
    /// switch the direction of the IRQ line.
    fn drive_irq_high(&mut self) -> bool {
        false
    }

    /// Return the IRQ line to an input
    fn release_irq(&mut self) {}
}

impl<T: Hardware + ?Sized> Hardware for &mut T {
    fn transfer(&mut self, buf: &mut [u8]) {
        (**self).transfer(buf)
    }

    fn select(&mut self) {
        (**self).select()
    }

    fn deselect(&mut self) {
        (**self).deselect()
    }

    fn set_reset(&mut self, high: bool) {
        (**self).set_reset(high)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn data_available(&mut self) -> bool {
        (**self).data_available()
    }

    fn drive_irq_high(&mut self) -> bool {
        (**self).drive_irq_high()
    }

    fn release_irq(&mut self) {
        (**self).release_irq()
    }
}

/// Chip select guard
///
/// The chip is selected on creation and released when the guard is dropped.
struct ChipSelect<'a, H: Hardware>(&'a mut H);

impl<'a, H: Hardware> ChipSelect<'a, H> {
    fn new(hardware: &'a mut H) -> Self {
        hardware.select();

        ChipSelect(hardware)
    }
}

impl<H: Hardware> Deref for ChipSelect<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.0
    }
}

impl<H: Hardware> DerefMut for ChipSelect<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.0
    }
}

impl<H: Hardware> Drop for ChipSelect<'_, H> {
    fn drop(&mut self) {
        self.0.deselect()
    }
}

/// The number of times an exchange is tried before giving up
pub const DEFAULT_RETRIES: usize = 5;

/// The delay between two tries of an exchange and after every read
pub const RETRY_DELAY_US: u32 = 150;

const READ_HEADER: [u8; 5] = [0x0B, 0x00, 0x00, 0x00, 0x00];
const WRITE_HEADER: [u8; 5] = [0x0A, 0x00, 0x00, 0x00, 0x00];
const DEVICE_READY: u8 = 0x02;

/// The reply to a header exchange
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpiHeader {
    pub ready: bool,
    /// Bytes the controller can take
    pub writable: u16,
    /// Bytes the controller has for the host
    pub readable: u16,
}

impl SpiHeader {
    fn from_reply(reply: &[u8; 5]) -> Self {
        SpiHeader {
            ready: reply[0] == DEVICE_READY,
            writable: reply[1] as u16,
            readable: <u16>::from_le_bytes([reply[3], reply[4]]),
        }
    }
}

/// Error for hardware without bootloader support
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BootloaderUnsupported;

impl core::fmt::Display for BootloaderUnsupported {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("the hardware cannot drive the IRQ line")
    }
}

impl std::error::Error for BootloaderUnsupported {}

/// The SPI transport
///
/// This only moves bytes, it knows nothing of the packets within them. The retry counts given to
/// `read` and `write` bound the number of header exchanges.
pub struct SpiTransport<H> {
    hardware: H,
}

impl<H: Hardware> SpiTransport<H> {
    pub fn new(hardware: H) -> Self {
        SpiTransport { hardware }
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }

    pub fn into_inner(self) -> H {
        self.hardware
    }

    /// Pulse the reset line
    pub fn reset(&mut self) {
        log::info!("resetting the BlueNRG-MS");

        self.hardware.set_reset(false);
        self.hardware.delay_us(5);
        self.hardware.set_reset(true);
        self.hardware.delay_us(5);
    }

    /// Check if the controller has data for the host
    pub fn any(&mut self) -> bool {
        self.hardware.data_available()
    }

    /// Reset the controller into its bootloader
    pub fn enter_bootloader(&mut self) -> Result<(), BootloaderUnsupported> {
        if !self.hardware.drive_irq_high() {
            return Err(BootloaderUnsupported);
        }

        self.reset();

        self.hardware.delay_us(4_000);

        self.hardware.release_irq();

        log::info!("BlueNRG-MS is in its bootloader");

        Ok(())
    }

    /// Read a packet
    ///
    /// At most `size` bytes are read. `None` is returned when the controller was not ready or had
    /// nothing to give within `retries` header exchanges.
    pub fn read(&mut self, size: usize, retries: usize) -> Option<Vec<u8>> {
        let mut data = None;

        for _ in 0..retries {
            let mut cs = ChipSelect::new(&mut self.hardware);

            let mut reply = READ_HEADER;

            cs.transfer(&mut reply);

            let header = SpiHeader::from_reply(&reply);

            log::trace!("read header reply {:?}", header);

            if header.ready && header.readable > 0 {
                let mut buf = vec![0xFF; (header.readable as usize).min(size)];

                cs.transfer(&mut buf);

                data = Some(buf);

                break;
            }

            drop(cs);

            self.hardware.delay_us(RETRY_DELAY_US);
        }

        self.hardware.delay_us(RETRY_DELAY_US);

        if let Some(ref packet) = data {
            log::trace!("read {:02X?}", packet);
        }

        data
    }

    /// Write a packet
    ///
    /// The header is written first. Only as much of the parameters as the controller reports room
    /// for is written after it. Nothing is written if the controller cannot take the header.
    ///
    /// The return is the number of bytes written. It is up to the caller to check it against the
    /// length of the packet.
    pub fn write(&mut self, header: &[u8], parameters: &[u8], retries: usize) -> usize {
        for _ in 0..retries {
            let mut cs = ChipSelect::new(&mut self.hardware);

            let mut reply = WRITE_HEADER;

            cs.transfer(&mut reply);

            let spi_header = SpiHeader::from_reply(&reply);

            log::trace!("write header reply {:?}", spi_header);

            if spi_header.ready && (spi_header.writable > 0 || spi_header.readable > 0) {
                let writable = spi_header.writable as usize;

                if writable < header.len() {
                    log::debug!("controller can only take {} bytes, not writing", writable);

                    return 0;
                }

                let mut buf = header.to_vec();

                cs.transfer(&mut buf);

                let len = parameters.len().min(writable - header.len());

                if len > 0 {
                    let mut buf = parameters[..len].to_vec();

                    cs.transfer(&mut buf);
                }

                log::trace!("wrote {:02X?} {:02X?}", header, &parameters[..len]);

                return header.len() + len;
            }

            drop(cs);

            self.hardware.delay_us(RETRY_DELAY_US);
        }

        0
    }
}
