use bitflags::bitflags;

bitflags! {
    /// The 6502 processor status register (P).
    ///
    /// Bit layout:
    /// 7 6 5 4 3 2 1 0
    /// N V - B D I Z C
    ///
    /// Neither the break bit nor bit 5 physically exist as flags: bit 5
    /// always reads back 1 and B is synthesized onto pushed copies only.
    /// This type therefore never stores either; the byte conversions apply
    /// the rules at the boundary.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub(crate) struct Status: u8 {
        /// Carry flag (C): carry out of bit 7, or inverted borrow.
        const CARRY     = 0b0000_0001;

        /// Zero flag (Z).
        const ZERO      = 0b0000_0010;

        /// Interrupt disable flag (I): masks IRQ when set.
        const INTERRUPT = 0b0000_0100;

        /// Decimal mode flag (D): storable, ignored by the ALU.
        const DECIMAL   = 0b0000_1000;

        /// Overflow flag (V): signed arithmetic overflow.
        const OVERFLOW  = 0b0100_0000;

        /// Negative flag (N): bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

/// Break bit position in the pushed byte form.
const BREAK_BIT: u8 = 0b0001_0000;
/// Bit 5 of the byte form, hardwired to 1.
const UNUSED_BIT: u8 = 0b0010_0000;

impl Status {
    /// Power-on state: interrupt disable set, everything else clear.
    pub(crate) fn power_on() -> Self {
        Status::INTERRUPT
    }

    /// Byte form with bit 5 forced high and the break bit clear.
    pub(crate) fn to_byte(self) -> u8 {
        self.bits() | UNUSED_BIT
    }

    /// Byte form as pushed by BRK/PHP (`brk` true) or by hardware interrupt
    /// sequences (`brk` false).
    pub(crate) fn to_pushed_byte(self, brk: bool) -> u8 {
        let mut value = self.to_byte();
        if brk {
            value |= BREAK_BIT;
        }
        value
    }

    /// Loads flags from a byte as PLP/RTI do; break and bit 5 are dropped.
    pub(crate) fn from_byte(byte: u8) -> Self {
        Status::from_bits_truncate(byte & !(BREAK_BIT | UNUSED_BIT))
    }

    /// Updates N and Z from a result value.
    pub(crate) fn set_zn(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    pub(crate) fn carry(self) -> bool {
        self.contains(Status::CARRY)
    }

    pub(crate) fn interrupt_disabled(self) -> bool {
        self.contains(Status::INTERRUPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_form_always_reads_bit_5() {
        assert_eq!(Status::empty().to_byte() & UNUSED_BIT, UNUSED_BIT);
        assert_eq!(Status::power_on().to_byte(), 0b0010_0100);
    }

    #[test]
    fn break_bit_only_on_pushes() {
        let status = Status::CARRY;
        assert_eq!(status.to_byte() & BREAK_BIT, 0);
        assert_eq!(status.to_pushed_byte(true), 0b0011_0001);
        assert_eq!(status.to_pushed_byte(false), 0b0010_0001);
    }

    #[test]
    fn from_byte_drops_break_and_unused() {
        let status = Status::from_byte(0xFF);
        assert_eq!(
            status,
            Status::CARRY
                | Status::ZERO
                | Status::INTERRUPT
                | Status::DECIMAL
                | Status::OVERFLOW
                | Status::NEGATIVE
        );
        assert_eq!(status.to_byte(), 0xFF & !BREAK_BIT);
    }
}
