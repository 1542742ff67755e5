//! # Parallel Port Handshake
//!
//! The bus-facing side of the printer. A host (usually an emulated PC's LPT
//! port) latches a byte, pulses STROBE and polls status:
//!
//! ```text
//! host                         printer
//!  │ write_data(b)               latch b
//!  │ write_control(STROBE|…) ──► handle_char(b), ack = true
//!  │ write_control(…)            (strobe released)
//!  │ read_status()          ◄── ¬ack, select, ¬busy, ¬int, ¬error; ack cleared
//! ```
//!
//! ## Control Register
//!
//! | Bit | Name | Meaning |
//! |-----|------|---------|
//! | 0 | STROBE | feed the latched byte |
//! | 1 | AUTOFEED | CR also performs LF |
//! | 2 | NOT_RESET | clear to reset the printer |
//! | 3 | SELECT | select the printer |
//!
//! ## Status Register
//!
//! | Bit | Name | Set when |
//! |-----|------|----------|
//! | 2 | NOT_INTERRUPT | no interrupt pending |
//! | 3 | NOT_ERROR | no error |
//! | 4 | SELECT | printer selected |
//! | 6 | NOT_ACK | no acknowledge pending |
//! | 7 | NOT_BUSY | ready for data |

use bitflags::bitflags;
use log::{debug, trace};

use crate::device::EscpPrinter;
use crate::spool::PageSink;

bitflags! {
    /// Lines driven by the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Control: u8 {
        const STROBE = 0x01;
        const AUTOFEED = 0x02;
        const NOT_RESET = 0x04;
        const SELECT = 0x08;
    }
}

bitflags! {
    /// Lines driven by the printer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Status: u8 {
        const NOT_INTERRUPT = 0x04;
        const NOT_ERROR = 0x08;
        const SELECT = 0x10;
        const NOT_ACK = 0x40;
        const NOT_BUSY = 0x80;
    }
}

/// Handshake line state kept by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Handshake {
    /// Latched data byte
    pub data: u8,
    pub ack: bool,
    pub select: bool,
    pub busy: bool,
    pub int_pending: bool,
    pub error: bool,
    /// CR implies LF
    pub autofeed: bool,
}

impl Handshake {
    /// Pack the line state into a status byte.
    pub fn status(&self) -> Status {
        let mut status = Status::empty();
        status.set(Status::NOT_ACK, !self.ack);
        status.set(Status::SELECT, self.select);
        status.set(Status::NOT_BUSY, !self.busy);
        status.set(Status::NOT_INTERRUPT, !self.int_pending);
        status.set(Status::NOT_ERROR, !self.error);
        status
    }
}

/// A device on the parallel port.
pub trait LptDevice {
    /// Latch a byte on the data lines.
    fn write_data(&mut self, data: u8);

    /// Drive the control lines.
    fn write_control(&mut self, control: Control);

    /// Sample the status lines. Reading clears a pending acknowledge.
    fn read_status(&mut self) -> Status;
}

impl<S: PageSink> LptDevice for EscpPrinter<S> {
    fn write_data(&mut self, data: u8) {
        self.port.data = data;
    }

    fn write_control(&mut self, control: Control) {
        self.port.autofeed = control.contains(Control::AUTOFEED);

        if control.contains(Control::SELECT) {
            self.port.select = true;
        }

        if !control.contains(Control::NOT_RESET) {
            debug!("LPT: reset line asserted");
            self.port.select = false;
            self.reset();
        }

        if control.contains(Control::STROBE) {
            let data = self.port.data;
            trace!("LPT: strobe 0x{:02x}", data);
            self.handle_char(data);
            self.port.ack = true;
        }
    }

    fn read_status(&mut self) -> Status {
        let status = self.port.status();
        self.port.ack = false;
        status
    }
}
