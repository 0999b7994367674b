//! PPU-side video bus: pattern tables on the cartridge, nametables in the
//! 2 KiB VRAM behind the cartridge's mirroring wiring. Palette RAM never
//! appears here; those accesses stay inside the PPU.

use crate::cartridge::{Cartridge, Mirroring};
use crate::memory::ppu as ppu_mem;

/// Borrowed view of the memories on the video bus.
pub(crate) struct VideoBus<'a> {
    pub(crate) vram: &'a mut [u8; ppu_mem::VRAM_SIZE],
    pub(crate) cartridge: &'a Cartridge,
}

impl VideoBus<'_> {
    pub(crate) fn read(&self, addr: u16) -> u8 {
        let addr = addr & ppu_mem::VIDEO_ADDR_MASK;
        if addr < ppu_mem::PATTERN_END {
            self.cartridge.chr_read(addr)
        } else {
            self.vram[self.vram_index(addr)]
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        let addr = addr & ppu_mem::VIDEO_ADDR_MASK;
        if addr < ppu_mem::PATTERN_END {
            // Mapper 0 has CHR ROM only; a write strobe here is a bug.
            panic!("write to CHR ROM at {addr:#06X}");
        }
        let index = self.vram_index(addr);
        self.vram[index] = value;
    }

    /// Applies the cartridge's nametable mirroring, then folds the address
    /// into the VRAM buffer.
    fn vram_index(&self, addr: u16) -> usize {
        let mirrored = match self.cartridge.mirroring() {
            Mirroring::Horizontal => addr & !0x0400,
            Mirroring::Vertical => addr & !0x0800,
        };
        (mirrored - ppu_mem::NAMETABLE_BASE) as usize % ppu_mem::VRAM_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cartridge(mirroring: Mirroring) -> Cartridge {
        let mut chr = vec![0; 8 * 1024];
        chr[0x0123] = 0x77;
        Cartridge::new(vec![0; 16 * 1024], chr, None, mirroring).unwrap()
    }

    #[test]
    fn pattern_reads_come_from_chr() {
        let cart = cartridge(Mirroring::Horizontal);
        let mut vram = Box::new([0; ppu_mem::VRAM_SIZE]);
        let bus = VideoBus {
            vram: &mut vram,
            cartridge: &cart,
        };
        assert_eq!(bus.read(0x0123), 0x77);
    }

    #[test]
    fn horizontal_mirroring_aliases_bit_10() {
        let cart = cartridge(Mirroring::Horizontal);
        let mut vram = Box::new([0; ppu_mem::VRAM_SIZE]);
        let mut bus = VideoBus {
            vram: &mut vram,
            cartridge: &cart,
        };
        bus.write(0x2005, 0x31);
        assert_eq!(bus.read(0x2005), 0x31);
        assert_eq!(bus.read(0x2405), 0x31);
        assert_eq!(bus.read(0x2005 ^ 0x0400), 0x31);
    }

    #[test]
    fn vertical_mirroring_aliases_bit_11() {
        let cart = cartridge(Mirroring::Vertical);
        let mut vram = Box::new([0; ppu_mem::VRAM_SIZE]);
        let mut bus = VideoBus {
            vram: &mut vram,
            cartridge: &cart,
        };
        bus.write(0x2405, 0x42);
        assert_eq!(bus.read(0x2405 ^ 0x0800), 0x42);
        // The other nametable stays independent.
        bus.write(0x2005, 0x24);
        assert_eq!(bus.read(0x2405), 0x42);
        assert_eq!(bus.read(0x2005), 0x24);
    }

    #[test]
    #[should_panic(expected = "write to CHR ROM")]
    fn chr_writes_are_fatal() {
        let cart = cartridge(Mirroring::Horizontal);
        let mut vram = Box::new([0; ppu_mem::VRAM_SIZE]);
        let mut bus = VideoBus {
            vram: &mut vram,
            cartridge: &cart,
        };
        bus.write(0x0000, 0x01);
    }
}
