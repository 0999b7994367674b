//! Standard controller ports readable through `$4016/$4017`.
//!
//! The port owns a latch bit and one 8-bit shift register per pad. Button
//! state is pulled from the host through an injected callback on the falling
//! edge of the latch; the core never sees input devices directly.

use core::fmt;

use bitflags::bitflags;

bitflags! {
    /// Packed button state for one pad, in shift-register bit order
    /// (A is read out first).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Buttons: u8 {
        const A      = 0b0000_0001;
        const B      = 0b0000_0010;
        const SELECT = 0b0000_0100;
        const START  = 0b0000_1000;
        const UP     = 0b0001_0000;
        const DOWN   = 0b0010_0000;
        const LEFT   = 0b0100_0000;
        const RIGHT  = 0b1000_0000;
    }
}

/// Host callback polling both pads. Must not touch core state.
pub type PollButtons = Box<dyn FnMut() -> (Buttons, Buttons)>;

/// Latch plus the two serial shift registers behind `$4016/$4017`.
#[derive(Default)]
pub struct ControllerPort {
    latch: bool,
    joy1_shift: u8,
    joy2_shift: u8,
    poll: Option<PollButtons>,
}

impl fmt::Debug for ControllerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerPort")
            .field("latch", &self.latch)
            .field("joy1_shift", &self.joy1_shift)
            .field("joy2_shift", &self.joy2_shift)
            .field("poll", &self.poll.is_some())
            .finish()
    }
}

impl ControllerPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the host poll callback.
    pub fn set_poll(&mut self, poll: PollButtons) {
        self.poll = Some(poll);
    }

    /// CPU write to `$4016`: bit 0 drives the latch line. The pads are
    /// sampled on the falling edge.
    pub fn write_latch(&mut self, value: u8) {
        let previous = self.latch;
        self.latch = value & 0x01 != 0;
        if previous && !self.latch {
            self.refresh_shift_registers();
        }
    }

    /// CPU read of either port: returns the serial bit in D0 and advances
    /// the shift register.
    ///
    /// While the latch is held high the pads are re-sampled before every
    /// read, so strobe-and-read loops observe live state.
    pub fn read(&mut self, addr: u16) -> u8 {
        if self.latch {
            self.refresh_shift_registers();
        }

        let shift = if addr == crate::memory::apu::JOY1 {
            &mut self.joy1_shift
        } else {
            &mut self.joy2_shift
        };
        let bit = *shift & 0x01;
        *shift >>= 1;
        bit
    }

    fn refresh_shift_registers(&mut self) {
        if let Some(poll) = self.poll.as_mut() {
            let (joy1, joy2) = poll();
            self.joy1_shift = joy1.bits();
            self.joy2_shift = joy2.bits();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port_with_state(joy1: Buttons, joy2: Buttons) -> ControllerPort {
        let mut port = ControllerPort::new();
        port.set_poll(Box::new(move || (joy1, joy2)));
        port
    }

    #[test]
    fn falling_edge_latches_and_reads_shift_out_lsb_first() {
        let mut port = port_with_state(Buttons::A | Buttons::START, Buttons::empty());
        port.write_latch(1);
        port.write_latch(0);

        let bits: Vec<u8> = (0..8).map(|_| port.read(0x4016)).collect();
        assert_eq!(bits, [1, 0, 0, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn ports_shift_independently() {
        let mut port = port_with_state(Buttons::A, Buttons::B);
        port.write_latch(1);
        port.write_latch(0);

        assert_eq!(port.read(0x4016), 1);
        assert_eq!(port.read(0x4017), 0);
        assert_eq!(port.read(0x4017), 1);
        assert_eq!(port.read(0x4016), 0);
    }

    #[test]
    fn held_latch_keeps_resampling() {
        use std::cell::Cell;
        use std::rc::Rc;

        let presses = Rc::new(Cell::new(Buttons::empty()));
        let mut port = ControllerPort::new();
        let shared = Rc::clone(&presses);
        port.set_poll(Box::new(move || (shared.get(), Buttons::empty())));

        port.write_latch(1);
        presses.set(Buttons::A);
        // Latch still high: every read re-polls, so A stays visible in D0.
        assert_eq!(port.read(0x4016), 1);
        assert_eq!(port.read(0x4016), 1);
    }
}
