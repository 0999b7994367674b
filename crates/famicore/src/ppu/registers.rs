//! CPU-visible PPU registers and the internal `v/t/x/w` VRAM latches.
//!
//! Register bytes are decoded bit-for-bit on write into the bitflags types
//! below; the raw backing integers never leak past this module's accessors.

use bitflags::bitflags;

bitflags! {
    /// PPUCTRL (`$2000`).
    ///
    /// Bits 0-1 select the base nametable and are not individual flags;
    /// they are mirrored into `t.nametable` on every write.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Control: u8 {
        const VRAM_INCREMENT_32     = 0b0000_0100;
        const SPRITE_PATTERN_HIGH   = 0b0000_1000;
        const BACKGROUND_PATTERN_HIGH = 0b0001_0000;
        const SPRITE_SIZE_8X16      = 0b0010_0000;
        const EXT_MASTER            = 0b0100_0000;
        const NMI_ENABLE            = 0b1000_0000;
    }
}

impl Control {
    /// Base nametable select (bits 0-1).
    pub(crate) fn nametable_select(self) -> u8 {
        self.bits() & 0b11
    }

    /// PPUDATA address increment: 1 (across) or 32 (down).
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Self::VRAM_INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Pattern table used by 8x8 sprites.
    pub(crate) fn sprite_pattern_base(self) -> u16 {
        if self.contains(Self::SPRITE_PATTERN_HIGH) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Pattern table used by the background.
    pub(crate) fn background_pattern_base(self) -> u16 {
        if self.contains(Self::BACKGROUND_PATTERN_HIGH) {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in rows: 8 or 16.
    pub(crate) fn sprite_height(self) -> u8 {
        if self.contains(Self::SPRITE_SIZE_8X16) {
            16
        } else {
            8
        }
    }

    pub(crate) fn nmi_enabled(self) -> bool {
        self.contains(Self::NMI_ENABLE)
    }
}

bitflags! {
    /// PPUMASK (`$2001`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct Mask: u8 {
        const GREYSCALE        = 0b0000_0001;
        const BACKGROUND_LEFT  = 0b0000_0010;
        const SPRITES_LEFT     = 0b0000_0100;
        const SHOW_BACKGROUND  = 0b0000_1000;
        const SHOW_SPRITES     = 0b0001_0000;
        const EMPHASIZE_RED    = 0b0010_0000;
        const EMPHASIZE_GREEN  = 0b0100_0000;
        const EMPHASIZE_BLUE   = 0b1000_0000;
    }
}

impl Mask {
    /// Rendering is enabled when either layer is shown.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Self::SHOW_BACKGROUND | Self::SHOW_SPRITES)
    }

    pub(crate) fn show_background(self) -> bool {
        self.contains(Self::SHOW_BACKGROUND)
    }

    pub(crate) fn show_sprites(self) -> bool {
        self.contains(Self::SHOW_SPRITES)
    }
}

bitflags! {
    /// PPUSTATUS (`$2002`). Only the top three bits exist in hardware.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub(crate) struct PpuStatus: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        const VBLANK          = 0b1000_0000;
    }
}

// 15-bit VRAM address layout:
//  14 12 11 10 9      5 4      0
//  [fine_y][nt][coarse_y][coarse_x]
const COARSE_X_MASK: u16 = 0x001F;
const COARSE_Y_MASK: u16 = 0x03E0;
const NAMETABLE_MASK: u16 = 0x0C00;
const FINE_Y_MASK: u16 = 0x7000;
const COARSE_Y_SHIFT: u16 = 5;
const NAMETABLE_SHIFT: u16 = 10;
const FINE_Y_SHIFT: u16 = 12;

/// The PPU's internal 15-bit VRAM address, used for both the current (`v`)
/// and temporary (`t`) registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramAddr(u16);

impl VramAddr {
    pub(crate) fn coarse_x(self) -> u8 {
        (self.0 & COARSE_X_MASK) as u8
    }

    pub(crate) fn set_coarse_x(&mut self, value: u8) {
        self.0 = (self.0 & !COARSE_X_MASK) | u16::from(value & 0b1_1111);
    }

    pub(crate) fn coarse_y(self) -> u8 {
        ((self.0 & COARSE_Y_MASK) >> COARSE_Y_SHIFT) as u8
    }

    pub(crate) fn set_coarse_y(&mut self, value: u8) {
        self.0 = (self.0 & !COARSE_Y_MASK) | (u16::from(value & 0b1_1111) << COARSE_Y_SHIFT);
    }

    pub(crate) fn nametable(self) -> u8 {
        ((self.0 & NAMETABLE_MASK) >> NAMETABLE_SHIFT) as u8
    }

    pub(crate) fn set_nametable(&mut self, value: u8) {
        self.0 = (self.0 & !NAMETABLE_MASK) | (u16::from(value & 0b11) << NAMETABLE_SHIFT);
    }

    pub(crate) fn fine_y(self) -> u8 {
        ((self.0 & FINE_Y_MASK) >> FINE_Y_SHIFT) as u8
    }

    pub(crate) fn set_fine_y(&mut self, value: u8) {
        self.0 = (self.0 & !FINE_Y_MASK) | (u16::from(value & 0b111) << FINE_Y_SHIFT);
    }

    /// The address as driven onto the 14-bit video bus.
    pub(crate) fn bus_address(self) -> u16 {
        self.0 & 0x3FFF
    }

    /// Raw 15-bit value, for PPUDATA increments and palette decoding.
    pub(crate) fn raw(self) -> u16 {
        self.0
    }

    /// Adds the PPUDATA post-increment, wrapping within 15 bits.
    pub(crate) fn advance(&mut self, increment: u16) {
        self.0 = self.0.wrapping_add(increment) & 0x7FFF;
    }

    /// Coarse X step during rendering, toggling the horizontal nametable on
    /// wrap from tile 31.
    pub(crate) fn increment_coarse_x(&mut self) {
        let next = (self.coarse_x() + 1) & 0b1_1111;
        self.set_coarse_x(next);
        if next == 0 {
            self.set_nametable(self.nametable() ^ 0b01);
        }
    }

    /// Fine/coarse Y step at the end of a scanline, toggling the vertical
    /// nametable on coarse Y wrap.
    pub(crate) fn increment_y(&mut self) {
        let fine = (self.fine_y() + 1) & 0b111;
        self.set_fine_y(fine);
        if fine == 0 {
            let coarse = (self.coarse_y() + 1) & 0b1_1111;
            self.set_coarse_y(coarse);
            if coarse == 0 {
                self.set_nametable(self.nametable() ^ 0b10);
            }
        }
    }

    /// Copies the horizontal scroll bits from `t` (dot 257).
    pub(crate) fn copy_horizontal(&mut self, t: VramAddr) {
        self.set_coarse_x(t.coarse_x());
        self.set_nametable((self.nametable() & 0b10) | (t.nametable() & 0b01));
    }

    /// Copies the vertical scroll bits from `t` (pre-render dots 280-304).
    pub(crate) fn copy_vertical(&mut self, t: VramAddr) {
        self.set_coarse_y(t.coarse_y());
        self.set_fine_y(t.fine_y());
        self.set_nametable((self.nametable() & 0b01) | (t.nametable() & 0b10));
    }
}

/// The `v/t/x/w` scroll register block behind PPUSCROLL and PPUADDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VramRegisters {
    /// Current VRAM address ("v").
    pub(crate) v: VramAddr,
    /// Temporary VRAM address ("t"), the staging copy the CPU writes.
    pub(crate) t: VramAddr,
    /// Fine X scroll ("x"), 3 bits.
    pub(crate) fine_x: u8,
    /// First-write toggle ("w"): true before the first of the two writes.
    pub(crate) first_write: bool,
}

impl Default for VramRegisters {
    fn default() -> Self {
        Self {
            v: VramAddr::default(),
            t: VramAddr::default(),
            fine_x: 0,
            first_write: true,
        }
    }
}

impl VramRegisters {
    /// PPUSCROLL write pair: X scroll first, Y scroll second.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if self.first_write {
            self.t.set_coarse_x(value >> 3);
            self.fine_x = value & 0b111;
        } else {
            self.t.set_coarse_y(value >> 3);
            self.t.set_fine_y(value & 0b111);
        }
        self.first_write = !self.first_write;
    }

    /// PPUADDR write pair: high six bits first (bit 14 is cleared), low
    /// byte second, upon which `t` is copied into `v`.
    pub(crate) fn write_addr(&mut self, value: u8) {
        if self.first_write {
            self.t.set_fine_y((value >> 4) & 0b011);
            self.t.set_nametable((value >> 2) & 0b11);
            let coarse_y = (self.t.coarse_y() & 0b00111) | ((value << 3) & 0b11000);
            self.t.set_coarse_y(coarse_y);
        } else {
            self.t.set_coarse_x(value & 0b1_1111);
            let coarse_y = (self.t.coarse_y() & 0b11000) | ((value >> 5) & 0b00111);
            self.t.set_coarse_y(coarse_y);
            self.v = self.t;
        }
        self.first_write = !self.first_write;
    }

    /// PPUSTATUS read side effect: rewinds the write toggle.
    pub(crate) fn reset_toggle(&mut self) {
        self.first_write = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_writes_split_into_fine_and_coarse() {
        let mut regs = VramRegisters::default();
        regs.write_scroll(0b0111_1101); // X = 15 coarse, 5 fine
        assert_eq!(regs.t.coarse_x(), 0b01111);
        assert_eq!(regs.fine_x, 0b101);
        assert!(!regs.first_write);

        regs.write_scroll(0b0101_1110); // Y = 11 coarse, 6 fine
        assert_eq!(regs.t.coarse_y(), 0b01011);
        assert_eq!(regs.t.fine_y(), 0b110);
        assert!(regs.first_write);
    }

    #[test]
    fn addr_writes_assemble_and_latch_v() {
        let mut regs = VramRegisters::default();
        regs.write_addr(0x21);
        regs.write_addr(0x08);
        assert_eq!(regs.v.raw(), 0x2108);
        assert!(regs.first_write);
    }

    #[test]
    fn addr_high_write_clears_bit_14() {
        let mut regs = VramRegisters::default();
        regs.write_addr(0x7F);
        regs.write_addr(0xFF);
        assert_eq!(regs.v.raw(), 0x3FFF);
    }

    #[test]
    fn coarse_x_increment_toggles_horizontal_nametable() {
        let mut v = VramAddr::default();
        v.set_coarse_x(31);
        v.increment_coarse_x();
        assert_eq!(v.coarse_x(), 0);
        assert_eq!(v.nametable(), 0b01);
    }

    #[test]
    fn y_increment_carries_through_coarse_y_and_nametable() {
        let mut v = VramAddr::default();
        v.set_fine_y(7);
        v.set_coarse_y(29);
        v.increment_y();
        assert_eq!(v.fine_y(), 0);
        assert_eq!(v.coarse_y(), 30);

        v.set_fine_y(7);
        v.set_coarse_y(31);
        v.increment_y();
        assert_eq!(v.coarse_y(), 0);
        assert_eq!(v.nametable(), 0b10);
    }

    #[test]
    fn horizontal_copy_preserves_vertical_bits() {
        let mut v = VramAddr::default();
        v.set_coarse_y(17);
        v.set_nametable(0b10);
        let mut t = VramAddr::default();
        t.set_coarse_x(9);
        t.set_nametable(0b01);

        v.copy_horizontal(t);
        assert_eq!(v.coarse_x(), 9);
        assert_eq!(v.coarse_y(), 17);
        assert_eq!(v.nametable(), 0b11);
    }
}
