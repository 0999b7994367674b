#![allow(dead_code)]

use famicore::{Cartridge, Console, Mirroring};

pub const PRG_BANK: usize = 16 * 1024;
pub const CHR_BANK: usize = 8 * 1024;
pub const PRG_BASE: u16 = 0x8000;

/// Builds a mapper-0 cartridge whose 16 KiB PRG bank contains `program`
/// at `$8000` with the reset vector pointing there. `patches` lays down
/// additional byte runs (interrupt handlers, vectors) by CPU address.
pub fn cartridge_with_program(program: &[u8], patches: &[(u16, &[u8])]) -> Cartridge {
    let mut prg = vec![0u8; PRG_BANK];
    prg[..program.len()].copy_from_slice(program);

    // Reset vector: $8000. The 16 KiB bank mirrors into $C000-$FFFF, so
    // the vectors live at the top of the bank.
    prg[PRG_BANK - 4] = 0x00;
    prg[PRG_BANK - 3] = 0x80;

    for (addr, bytes) in patches {
        let offset = (addr - PRG_BASE) as usize % PRG_BANK;
        prg[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    Cartridge::new(prg, vec![0; CHR_BANK], None, Mirroring::Vertical)
        .expect("test cartridge geometry is valid")
}

/// Boots a console around `program` and runs it for `frames` frames.
pub fn run_program_for_frames(program: &[u8], patches: &[(u16, &[u8])], frames: usize) -> Console {
    let mut console = Console::new(cartridge_with_program(program, patches));
    for _ in 0..frames {
        console.run_single_frame();
    }
    console
}
