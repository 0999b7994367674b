//! CPU-side bus: routes the 16-bit address space onto RAM, the PPU register
//! window, the APU/controller I/O block and the cartridge.
//!
//! The bus is a per-cycle view over the devices, built by the console for
//! each access. PPU registers need the two-phase protocol: `set_address`
//! arms the register select so the PPU observes the access on its next dot,
//! and reads complete from the PPU's CPU-side data bus after the PPU has
//! stepped.

use crate::apu::Apu;
use crate::bus::BusDir;
use crate::cartridge::Cartridge;
use crate::controller::ControllerPort;
use crate::memory::cpu as cpu_mem;
use crate::memory::ppu as ppu_mem;
use crate::ppu::Ppu;

/// Borrowed view of everything attached to the CPU bus.
pub(crate) struct CpuBus<'a> {
    pub(crate) ram: &'a mut [u8; cpu_mem::RAM_SIZE],
    pub(crate) ppu: &'a mut Ppu,
    pub(crate) apu: &'a mut Apu,
    pub(crate) cartridge: &'a mut Cartridge,
    pub(crate) controllers: &'a mut ControllerPort,
}

impl CpuBus<'_> {
    /// Latches the cycle's address. Addresses inside the PPU register
    /// mirror arm the PPU's register port; a write in the same cycle
    /// upgrades the access direction before the PPU consumes it.
    pub(crate) fn set_address(&mut self, addr: u16) {
        if (ppu_mem::REGISTER_BASE..ppu_mem::REGISTER_MIRROR_END).contains(&addr) {
            self.ppu.register_select = (addr & ppu_mem::REGISTER_SELECT_MASK) as u8;
            self.ppu.register_access = Some(BusDir::Read);
        }
    }

    /// Completes a read cycle.
    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % cpu_mem::RAM_SIZE],
            // The PPU produced its reply while stepping; pick it up from
            // its CPU-side data bus.
            0x2000..=0x3FFF => self.ppu.cpu_data_bus,
            ppu_mem::OAM_DMA => panic!("read from write-only OAM DMA register"),
            0x4000..=0x4013 | 0x4015 => self.apu.read(addr),
            0x4016 | 0x4017 => self.controllers.read(addr),
            0x4018..=0x401F => {
                panic!("access to reserved CPU test-mode register {addr:#06X}")
            }
            // Unmapped expansion area below PRG RAM.
            0x4020..=0x5FFF => 0,
            _ => self.cartridge.cpu_read(addr),
        }
    }

    /// Completes a write cycle. `$4014` never reaches the bus; the console
    /// intercepts it as the OAM DMA trigger.
    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % cpu_mem::RAM_SIZE] = value,
            0x2000..=0x3FFF => {
                self.ppu.register_select = (addr & ppu_mem::REGISTER_SELECT_MASK) as u8;
                self.ppu.cpu_data_bus = value;
                self.ppu.register_access = Some(BusDir::Write);
            }
            ppu_mem::OAM_DMA => unreachable!("OAM DMA trigger is intercepted by the console"),
            0x4000..=0x4013 | 0x4015 => self.apu.write(addr, value),
            0x4016 => self.controllers.write_latch(value),
            // `$4017` reads the second controller but writes the APU frame
            // counter.
            0x4017 => self.apu.write(addr, value),
            0x4018..=0x401F => {
                panic!("access to reserved CPU test-mode register {addr:#06X}")
            }
            0x4020..=0x5FFF => {}
            _ => self.cartridge.cpu_write(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::Mirroring;

    struct Fixture {
        ram: Box<[u8; cpu_mem::RAM_SIZE]>,
        ppu: Ppu,
        apu: Apu,
        cartridge: Cartridge,
        controllers: ControllerPort,
    }

    impl Fixture {
        fn new() -> Self {
            let mut prg = vec![0; 16 * 1024];
            prg[0] = 0x99;
            Self {
                ram: Box::new([0; cpu_mem::RAM_SIZE]),
                ppu: Ppu::new(),
                apu: Apu::new(),
                cartridge: Cartridge::new(prg, vec![], None, Mirroring::Horizontal).unwrap(),
                controllers: ControllerPort::new(),
            }
        }

        fn bus(&mut self) -> CpuBus<'_> {
            CpuBus {
                ram: &mut self.ram,
                ppu: &mut self.ppu,
                apu: &mut self.apu,
                cartridge: &mut self.cartridge,
                controllers: &mut self.controllers,
            }
        }
    }

    #[test]
    fn ram_mirrors_every_2_kib() {
        let mut fixture = Fixture::new();
        let mut bus = fixture.bus();
        bus.write(0x0042, 0xAB);
        assert_eq!(bus.read(0x0042), 0xAB);
        assert_eq!(bus.read(0x0842), 0xAB);
        assert_eq!(bus.read(0x1842), 0xAB);
    }

    #[test]
    fn ppu_register_window_mirrors_every_8_bytes() {
        let mut fixture = Fixture::new();
        let mut bus = fixture.bus();
        bus.write(0x3FF9, 0x1E); // PPUMASK mirror
        assert_eq!(fixture.ppu.register_select, 1);
        assert_eq!(fixture.ppu.register_access, Some(BusDir::Write));
        assert_eq!(fixture.ppu.cpu_data_bus, 0x1E);
    }

    #[test]
    fn set_address_arms_a_ppu_read() {
        let mut fixture = Fixture::new();
        let mut bus = fixture.bus();
        bus.set_address(0x2002);
        assert_eq!(fixture.ppu.register_select, 2);
        assert_eq!(fixture.ppu.register_access, Some(BusDir::Read));
    }

    #[test]
    fn cartridge_space_routes_high_addresses() {
        let mut fixture = Fixture::new();
        let mut bus = fixture.bus();
        assert_eq!(bus.read(0x8000), 0x99);
        bus.write(0x6000, 0x55);
        assert_eq!(bus.read(0x6000), 0x55);
    }

    #[test]
    #[should_panic(expected = "reserved CPU test-mode register")]
    fn reserved_io_access_is_fatal() {
        let mut fixture = Fixture::new();
        let mut bus = fixture.bus();
        let _ = bus.read(0x4018);
    }
}
