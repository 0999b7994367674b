//! 6502 CPU modeled as a per-cycle bus machine.
//!
//! The CPU communicates with the outside world exclusively through its
//! address bus, data bus and read/write line. [`Cpu::step`] advances exactly
//! one cycle: it drives the address bus (and the data bus on writes) and the
//! console harness then performs the actual memory transfer, so reads issued
//! in cycle N are consumed from the data bus during cycle N+1.
//!
//! Instruction execution is staged over the tagged [`ExecState`]; decoding
//! happens on cycles where `sync` is high, which is also where pending
//! interrupts hijack the fetched opcode.

pub(crate) mod addressing;
pub(crate) mod instructions;
pub(crate) mod status;

use crate::bus::BusDir;
use crate::cpu::addressing::AddressStage;
use crate::cpu::instructions::INSTRUCTION_SET;
use crate::cpu::status::Status;

/// Micro-op stage the current instruction is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecState {
    /// The last data byte of the instruction is arriving; issue the next
    /// opcode fetch this cycle.
    FetchOpcode,
    /// Running the addressing-mode (or stack/branch) cycles.
    FetchingAddress(AddressStage),
    /// Read-modify-write: waiting for the operand read to land.
    Waiting,
    /// Read-modify-write: writing the modified value back.
    StoringData,
}

/// Complete CPU state: architectural registers, bus pins, interrupt lines
/// and the micro-op stage of the instruction in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cpu {
    // Bus pins.
    pub(crate) address_bus: u16,
    pub(crate) data_bus: u8,
    pub(crate) rw: BusDir,
    /// High during opcode fetch cycles.
    pub(crate) sync: bool,

    // Interrupt input lines, driven by the harness each cycle.
    pub(crate) reset_line: bool,
    pub(crate) nmi_line: bool,
    pub(crate) irq_line: bool,

    // Architectural registers.
    pub(crate) pc: u16,
    pub(crate) a: u8,
    pub(crate) x: u8,
    pub(crate) y: u8,
    pub(crate) s: u8,
    pub(crate) p: Status,
    pub(crate) instruction_register: u8,

    // Latched interrupt requests, serviced at opcode-fetch boundaries.
    pub(crate) reset_pending: bool,
    pub(crate) nmi_pending: bool,
    pub(crate) irq_pending: bool,
    /// Last sampled NMI line level, for edge detection.
    nmi_level: bool,

    exec: ExecState,
}

impl Cpu {
    /// Power-on state: registers cleared, interrupt disable set, reset
    /// pending so the first instruction boundary runs the reset sequence.
    pub(crate) fn new() -> Self {
        Self {
            address_bus: 0,
            data_bus: 0,
            rw: BusDir::Read,
            sync: false,
            reset_line: false,
            nmi_line: false,
            irq_line: false,
            pc: 0,
            a: 0,
            x: 0,
            y: 0,
            s: 0,
            p: Status::power_on(),
            instruction_register: 0x00,
            reset_pending: true,
            nmi_pending: false,
            irq_pending: false,
            nmi_level: false,
            exec: ExecState::FetchingAddress(AddressStage::default()),
        }
    }

    /// Advances the CPU by one cycle.
    pub(crate) fn step(&mut self) {
        // The reset line is sampled every cycle and takes effect
        // immediately, dropping whatever instruction was in flight.
        if self.reset_line {
            *self = Cpu::new();
            return;
        }

        if self.nmi_line && !self.nmi_level {
            self.nmi_pending = true;
        }
        self.nmi_level = self.nmi_line;

        if self.irq_line && !self.p.interrupt_disabled() {
            self.irq_pending = true;
        }

        if self.sync {
            if self.reset_pending || self.nmi_pending || self.irq_pending {
                // Discard the fetched byte and inject BRK; the interrupt
                // sequence picks the vector from the pending flags.
                self.instruction_register = 0x00;
            } else {
                self.instruction_register = self.data_bus;
                self.pc = self.pc.wrapping_add(1);
            }
        }

        // Defaults for every cycle; shapes override as needed.
        self.rw = BusDir::Read;
        self.sync = false;

        let state = self.exec;
        self.exec = INSTRUCTION_SET[self.instruction_register as usize](self, state);
    }
}
