//! `embedded-hal` adaptor
//!
//! [`EmbeddedHal`] implements [`Hardware`] with a blocking SPI bus, output pins for chip select and
//! reset, an input pin for the IRQ line, and a microsecond delay.
//!
//! The `embedded-hal` 0.2 pin traits cannot change the direction of a pin, so this adaptor does
//! not support entering the bootloader.

use super::Hardware;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub struct EmbeddedHal<SPI, CS, RST, IRQ, D> {
    spi: SPI,
    chip_select: CS,
    reset: RST,
    irq: IRQ,
    delay: D,
}

impl<SPI, CS, RST, IRQ, D> EmbeddedHal<SPI, CS, RST, IRQ, D>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
    RST: OutputPin,
    IRQ: InputPin,
    D: DelayUs<u32>,
{
    pub fn new(spi: SPI, chip_select: CS, reset: RST, irq: IRQ, delay: D) -> Self {
        EmbeddedHal {
            spi,
            chip_select,
            reset,
            irq,
            delay,
        }
    }

    /// Release the peripherals
    pub fn free(self) -> (SPI, CS, RST, IRQ, D) {
        (self.spi, self.chip_select, self.reset, self.irq, self.delay)
    }
}

impl<SPI, CS, RST, IRQ, D> Hardware for EmbeddedHal<SPI, CS, RST, IRQ, D>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
    RST: OutputPin,
    IRQ: InputPin,
    D: DelayUs<u32>,
{
    fn transfer(&mut self, buf: &mut [u8]) {
        if self.spi.transfer(buf).is_err() {
            log::warn!("SPI transfer of {} bytes failed", buf.len());

            buf.iter_mut().for_each(|b| *b = 0);
        }
    }

    fn select(&mut self) {
        if self.chip_select.set_low().is_err() {
            log::warn!("failed to assert chip select");
        }
    }

    fn deselect(&mut self) {
        if self.chip_select.set_high().is_err() {
            log::warn!("failed to release chip select");
        }
    }

    fn set_reset(&mut self, high: bool) {
        let result = if high { self.reset.set_high() } else { self.reset.set_low() };

        if result.is_err() {
            log::warn!("failed to drive the reset line {}", if high { "high" } else { "low" });
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us)
    }

    fn data_available(&mut self) -> bool {
        self.irq.is_high().unwrap_or_else(|_| {
            log::warn!("failed to read the IRQ line");

            false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Bus {
        log: Vec<String>,
        fail_spi: bool,
    }

    struct Spi(Rc<RefCell<Bus>>);

    impl Transfer<u8> for Spi {
        type Error = ();

        fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], ()> {
            let mut bus = self.0.borrow_mut();

            bus.log.push(format!("spi {:02X?}", words));

            if bus.fail_spi {
                return Err(());
            }

            words.iter_mut().for_each(|w| *w = 0x02);

            Ok(words)
        }
    }

    struct Pin(&'static str, Rc<RefCell<Bus>>);

    impl OutputPin for Pin {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            self.1.borrow_mut().log.push(format!("{} low", self.0));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.1.borrow_mut().log.push(format!("{} high", self.0));
            Ok(())
        }
    }

    impl InputPin for Pin {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            Ok(true)
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            Ok(false)
        }
    }

    struct Delay(Rc<RefCell<Bus>>);

    impl DelayUs<u32> for Delay {
        fn delay_us(&mut self, us: u32) {
            self.0.borrow_mut().log.push(format!("delay {}", us));
        }
    }

    fn adaptor(bus: &Rc<RefCell<Bus>>) -> EmbeddedHal<Spi, Pin, Pin, Pin, Delay> {
        EmbeddedHal::new(
            Spi(bus.clone()),
            Pin("cs", bus.clone()),
            Pin("rst", bus.clone()),
            Pin("irq", bus.clone()),
            Delay(bus.clone()),
        )
    }

    #[test]
    fn reset_pulse() {
        let bus = Rc::new(RefCell::new(Bus::default()));

        let mut transport = super::super::SpiTransport::new(adaptor(&bus));

        transport.reset();

        assert_eq!(bus.borrow().log, vec!["rst low", "delay 5", "rst high", "delay 5"]);
        assert!(transport.any());
    }

    #[test]
    fn bus_errors_read_as_zero() {
        let bus = Rc::new(RefCell::new(Bus::default()));

        let mut hardware = adaptor(&bus);

        let mut buf = [0x0B, 0, 0, 0, 0];

        hardware.select();
        hardware.transfer(&mut buf);

        assert_eq!(buf, [0x02; 5]);

        bus.borrow_mut().fail_spi = true;

        let mut buf = [0x0B, 0, 0, 0, 0];

        hardware.transfer(&mut buf);
        hardware.deselect();

        assert_eq!(buf, [0; 5]);
        assert_eq!(bus.borrow().log.first().map(String::as_str), Some("cs low"));
        assert_eq!(bus.borrow().log.last().map(String::as_str), Some("cs high"));
    }
}
