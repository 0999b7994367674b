//! Cycle-accurate console core: a 6502 CPU, picture processor and audio
//! processor co-simulated in lockstep over two buses.
//!
//! [`Console`] owns every component and sequences one *system tick* per CPU
//! cycle:
//!
//! 1. advance the OAM DMA engine if one is in flight, otherwise step the
//!    CPU one cycle;
//! 2. route the CPU address onto the CPU bus; a write to `$4014` starts a
//!    DMA, any other write lands now;
//! 3. step the PPU three dots, routing its video-bus accesses;
//! 4. latch the PPU's NMI output into the CPU;
//! 5. complete a pending CPU read from the bus;
//! 6. step the APU once and latch its IRQ into the CPU.
//!
//! The host supplies a pre-parsed [`Cartridge`] (mapper 0 only; file
//! formats and mapper detection are host concerns), polls input through a
//! callback installed with [`Console::set_controller_callback`], and
//! consumes the frame buffer and audio samples between frames.
//!
//! # Failure model
//!
//! Cartridge geometry violations surface as [`Error`] at construction.
//! Faults that indicate emulator or ROM bugs at run time (illegal opcodes,
//! reserved I/O access, CHR writes) panic: the simulation is deterministic
//! and cannot meaningfully continue past them.

mod apu;
mod bits;
mod bus;
mod cartridge;
mod controller;
mod cpu;
mod dma;
mod error;
mod memory;
mod ppu;

pub use apu::{CPU_CLOCK_HZ, OUTPUT_SAMPLE_RATE};
pub use cartridge::{Cartridge, Mirroring};
pub use controller::{Buttons, PollButtons};
pub use error::Error;
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::apu::Apu;
use crate::bus::cpu::CpuBus;
use crate::bus::video::VideoBus;
use crate::bus::BusDir;
use crate::controller::ControllerPort;
use crate::cpu::Cpu;
use crate::dma::OamDma;
use crate::memory::cpu as cpu_mem;
use crate::memory::ppu as ppu_mem;
use crate::ppu::Ppu;

/// The whole console: CPU, PPU, APU, memories, controller port and the
/// cartridge, advanced in lockstep.
pub struct Console {
    cpu: Cpu,
    oam_dma: Option<OamDma>,
    ppu: Ppu,
    apu: Apu,
    ram: Box<[u8; cpu_mem::RAM_SIZE]>,
    vram: Box<[u8; ppu_mem::VRAM_SIZE]>,
    controllers: ControllerPort,
    cartridge: Cartridge,
    cycle_count: u64,
}

impl Console {
    /// Builds a powered-on console with the reset sequence pending; the
    /// first executed instruction fetches through the reset vector.
    pub fn new(cartridge: Cartridge) -> Self {
        tracing::debug!("console powered on");
        Self {
            cpu: Cpu::new(),
            oam_dma: None,
            ppu: Ppu::new(),
            apu: Apu::new(),
            ram: Box::new([0; cpu_mem::RAM_SIZE]),
            vram: Box::new([0; ppu_mem::VRAM_SIZE]),
            controllers: ControllerPort::new(),
            cartridge,
            cycle_count: 0,
        }
    }

    /// Installs the controller poll callback, invoked on the falling edge
    /// of the controller latch.
    pub fn set_controller_callback(&mut self, poll: PollButtons) {
        self.controllers.set_poll(poll);
    }

    /// Runs system ticks until the PPU reports a completed frame.
    pub fn run_single_frame(&mut self) {
        while !self.ppu.take_frame_complete() {
            self.step_cpu_cycle();
        }
    }

    /// Palette-index frame buffer (256x240). Contents are stable while the
    /// PPU is in vertical blank, i.e. right after [`Self::run_single_frame`]
    /// returns.
    pub fn frame_buffer(&self) -> &[u8] {
        self.ppu.frame_buffer()
    }

    /// Audio samples produced since the last call (mono 32-bit float at
    /// the nominal output rate); rewinds the producer index.
    pub fn sample_buffer(&mut self) -> &[f32] {
        self.apu.drain_samples()
    }

    /// Advances the console by one CPU cycle (one system tick).
    pub fn step_cpu_cycle(&mut self) {
        // 1. CPU half-step, or the DMA engine borrowing its bus pins.
        if let Some(dma) = self.oam_dma.as_mut() {
            if dma.step(&mut self.cpu) {
                self.oam_dma = None;
            }
        } else {
            self.cpu.step();
        }

        // 2. Address routing and the write half of the cycle.
        let addr = self.cpu.address_bus;
        let write = self.cpu.rw == BusDir::Write;
        {
            let mut bus = CpuBus {
                ram: &mut self.ram,
                ppu: &mut self.ppu,
                apu: &mut self.apu,
                cartridge: &mut self.cartridge,
                controllers: &mut self.controllers,
            };
            bus.set_address(addr);
            if write {
                if addr == ppu_mem::OAM_DMA {
                    let page = self.cpu.data_bus;
                    tracing::trace!(page, "oam dma started");
                    self.oam_dma = Some(OamDma::new(page, self.cycle_count % 2 == 0));
                } else {
                    bus.write(addr, self.cpu.data_bus);
                }
            }
        }

        // 3. Three PPU dots per CPU cycle; the PPU masters the video bus.
        for _ in 0..3 {
            self.ppu.step();
            if let Some(dir) = self.ppu.video_access {
                let mut video = VideoBus {
                    vram: &mut self.vram,
                    cartridge: &self.cartridge,
                };
                match dir {
                    BusDir::Read => {
                        self.ppu.video_data_bus = video.read(self.ppu.video_address_bus);
                    }
                    BusDir::Write => {
                        video.write(self.ppu.video_address_bus, self.ppu.video_data_bus);
                    }
                }
            }
        }

        // 4. PPU fetches observed the post-CPU bus state; now the NMI level.
        self.cpu.nmi_line = self.ppu.nmi;

        // 5. Complete the read half of the cycle.
        if !write {
            let mut bus = CpuBus {
                ram: &mut self.ram,
                ppu: &mut self.ppu,
                apu: &mut self.apu,
                cartridge: &mut self.cartridge,
                controllers: &mut self.controllers,
            };
            self.cpu.data_bus = bus.read(addr);
        }

        // 6. APU and its IRQ line.
        self.apu.step();
        self.cpu.irq_line = self.apu.irq();

        self.cycle_count += 1;
    }

    /// Total CPU cycles since power-on.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    /// Snapshot of the CPU registers for tracing and tests.
    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            pc: self.cpu.pc,
            a: self.cpu.a,
            x: self.cpu.x,
            y: self.cpu.y,
            s: self.cpu.s,
            p: self.cpu.p.to_byte(),
        }
    }

    /// Reads a RAM or cartridge byte without advancing time or touching
    /// I/O registers (their reads have side effects).
    pub fn peek_cpu_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize % cpu_mem::RAM_SIZE],
            0x6000..=0xFFFF => self.cartridge.cpu_read(addr),
            _ => 0,
        }
    }
}

/// Lightweight CPU register snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CpuSnapshot {
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    pub p: u8,
}

#[cfg(test)]
mod tests {
    use ctor::ctor;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    #[ctor]
    fn init_tracing() {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}
