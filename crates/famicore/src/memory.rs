//! Shared definitions for the console memory map.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and prevents magic numbers from sneaking into the bus routing and
//! the state machines.

/// CPU memory map details.
pub mod cpu {
    /// Internal work RAM size (mirrored through `$0000-$1FFF`).
    pub const RAM_SIZE: usize = 0x0800;

    /// First address of the hardware stack page.
    pub const STACK_PAGE: u16 = 0x0100;

    /// Start of cartridge PRG RAM (`$6000`).
    pub const PRG_RAM_BASE: u16 = 0x6000;
    /// Start of cartridge PRG ROM (`$8000`).
    pub const PRG_ROM_BASE: u16 = 0x8000;

    /// NMI vector (`$FFFA/$FFFB`).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    /// Reset vector (`$FFFC/$FFFD`).
    pub const RESET_VECTOR: u16 = 0xFFFC;
    /// BRK/IRQ vector (`$FFFE/$FFFF`).
    pub const BRK_IRQ_VECTOR: u16 = 0xFFFE;
}

/// PPU register layout and video memory rules.
pub mod ppu {
    /// First CPU-visible PPU register address.
    pub const REGISTER_BASE: u16 = 0x2000;
    /// End of the mirrored register window (exclusive).
    pub const REGISTER_MIRROR_END: u16 = 0x4000;
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// OAM DMA trigger register (`$4014`), handled by the console harness.
    pub const OAM_DMA: u16 = 0x4014;

    /// Video address space is 14 bits wide.
    pub const VIDEO_ADDR_MASK: u16 = 0x3FFF;
    /// Pattern tables live below this address (CHR ROM on the cartridge).
    pub const PATTERN_END: u16 = 0x2000;
    /// Nametable base address.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Attribute tables start here within each nametable.
    pub const ATTRIBUTE_BASE: u16 = 0x23C0;
    /// Nametable RAM size (2 KiB, two physical tables).
    pub const VRAM_SIZE: usize = 0x0800;
    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count.
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// CPU-visible PPU register identifiers, decoded from `addr & 0x0007`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control,
        /// `$2001` - PPUMASK
        Mask,
        /// `$2002` - PPUSTATUS
        Status,
        /// `$2003` - OAMADDR
        OamAddr,
        /// `$2004` - OAMDATA
        OamData,
        /// `$2005` - PPUSCROLL
        Scroll,
        /// `$2006` - PPUADDR
        Addr,
        /// `$2007` - PPUDATA
        Data,
    }

    impl Register {
        /// Resolves the canonical register for a 3-bit register select.
        pub const fn from_select(select: u8) -> Self {
            match select & 0x07 {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }

    /// OAMDATA register address, the OAM DMA write target.
    pub const OAM_DATA: u16 = 0x2004;
}

/// APU and I/O register layout.
pub mod apu {
    /// Start of the CPU-mapped APU register range.
    pub const REGISTER_BASE: u16 = 0x4000;
    /// Address of the status register (`$4015`).
    pub const STATUS: u16 = 0x4015;
    /// Controller port 1 / output latch (`$4016`).
    pub const JOY1: u16 = 0x4016;
}
