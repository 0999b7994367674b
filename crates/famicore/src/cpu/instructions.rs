//! Instruction shapes and the 256-entry opcode dispatch table.
//!
//! Every documented opcode is one of a handful of *shapes* (read-and-use,
//! store, read-modify-write, single-byte, branch, stack, jump, interrupt)
//! parameterized by an addressing mode and an operation. Each shape is a
//! per-cycle function over the tagged execution state: it drives the bus for
//! the current cycle and returns the state the instruction will be in on the
//! next cycle.
//!
//! State convention: the final cycle of every instruction calls
//! [`fetch_opcode`] (sync high, PC on the address bus) and returns
//! `FetchingAddress` with a fresh staging record, so the next instruction is
//! dispatched into its first post-fetch cycle. The `FetchOpcode` state marks
//! the cycle where an instruction's last requested data byte is on the data
//! bus and the next opcode fetch must be issued.

use crate::bus::BusDir;
use crate::cpu::addressing::{AddressStage, AddressingMode};
use crate::cpu::status::Status;
use crate::cpu::{Cpu, ExecState};
use crate::memory::cpu::{BRK_IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR, STACK_PAGE};

/// One opcode: a per-cycle transition function over the execution state.
pub(crate) type Instruction = fn(&mut Cpu, ExecState) -> ExecState;

/// Operation consuming CPU state (and usually the data bus).
type Operation = fn(&mut Cpu);
/// Read-modify-write operation: value in, replacement value out.
type InOutOperation = fn(&mut Cpu, u8) -> u8;
/// Branch predicate.
type BranchCondition = fn(&Cpu) -> bool;

/// Issues the next opcode fetch: sync high, PC on the address bus.
pub(crate) fn fetch_opcode(cpu: &mut Cpu) {
    cpu.sync = true;
    cpu.address_bus = cpu.pc;
}

fn fresh_fetch(cpu: &mut Cpu) -> ExecState {
    fetch_opcode(cpu);
    ExecState::FetchingAddress(AddressStage::default())
}

// ─────────────────────────────────────────────────────────────────────────
//  Shapes
// ─────────────────────────────────────────────────────────────────────────

fn single_byte(cpu: &mut Cpu, state: ExecState, operation: Operation) -> ExecState {
    match state {
        ExecState::FetchOpcode => {
            operation(cpu);
            fresh_fetch(cpu)
        }
        ExecState::FetchingAddress(_) => {
            // Dummy read of the byte after the opcode.
            cpu.address_bus = cpu.pc;
            ExecState::FetchOpcode
        }
        _ => unreachable!("single-byte instruction in invalid state"),
    }
}

fn read_and_use(
    cpu: &mut Cpu,
    state: ExecState,
    mode: AddressingMode,
    operation: Operation,
) -> ExecState {
    match state {
        ExecState::FetchOpcode => {
            // Operand is on the data bus; execute while the next opcode
            // fetch goes out.
            fetch_opcode(cpu);
            operation(cpu);
            ExecState::FetchingAddress(AddressStage::default())
        }
        ExecState::FetchingAddress(mut stage) => {
            if mode(cpu, &mut stage, true) {
                ExecState::FetchOpcode
            } else {
                ExecState::FetchingAddress(stage)
            }
        }
        _ => unreachable!("read instruction in invalid state"),
    }
}

fn store(
    cpu: &mut Cpu,
    state: ExecState,
    mode: AddressingMode,
    source: fn(&Cpu) -> u8,
) -> ExecState {
    match state {
        ExecState::FetchOpcode => fresh_fetch(cpu),
        ExecState::FetchingAddress(mut stage) => {
            if mode(cpu, &mut stage, false) {
                cpu.rw = BusDir::Write;
                cpu.data_bus = source(cpu);
                ExecState::FetchOpcode
            } else {
                ExecState::FetchingAddress(stage)
            }
        }
        _ => unreachable!("store instruction in invalid state"),
    }
}

fn read_modify_write(
    cpu: &mut Cpu,
    state: ExecState,
    mode: AddressingMode,
    modify: InOutOperation,
) -> ExecState {
    match state {
        ExecState::FetchOpcode => fresh_fetch(cpu),
        ExecState::FetchingAddress(mut stage) => {
            if mode(cpu, &mut stage, false) {
                ExecState::Waiting
            } else {
                ExecState::FetchingAddress(stage)
            }
        }
        ExecState::Waiting => {
            // Unmodified value is written back while the ALU works.
            cpu.rw = BusDir::Write;
            ExecState::StoringData
        }
        ExecState::StoringData => {
            cpu.rw = BusDir::Write;
            cpu.data_bus = modify(cpu, cpu.data_bus);
            ExecState::FetchOpcode
        }
    }
}

fn push(cpu: &mut Cpu, state: ExecState, value: fn(&Cpu) -> u8) -> ExecState {
    match state {
        ExecState::FetchOpcode => fresh_fetch(cpu),
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    ExecState::FetchingAddress(stage)
                }
                1 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_sub(1);
                    cpu.data_bus = value(cpu);
                    cpu.rw = BusDir::Write;
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid push cycle"),
            }
        }
        _ => unreachable!("push instruction in invalid state"),
    }
}

fn pull(cpu: &mut Cpu, state: ExecState, load: fn(&mut Cpu, u8)) -> ExecState {
    match state {
        ExecState::FetchOpcode => {
            load(cpu, cpu.data_bus);
            fresh_fetch(cpu)
        }
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    ExecState::FetchingAddress(stage)
                }
                1 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                2 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid pull cycle"),
            }
        }
        _ => unreachable!("pull instruction in invalid state"),
    }
}

fn jump(cpu: &mut Cpu, state: ExecState, mode: AddressingMode) -> ExecState {
    match state {
        // No FetchOpcode state: the address being fetched is the new PC.
        ExecState::FetchingAddress(mut stage) => {
            if mode(cpu, &mut stage, false) {
                cpu.pc = cpu.address_bus;
                fresh_fetch(cpu)
            } else {
                ExecState::FetchingAddress(stage)
            }
        }
        _ => unreachable!("jump instruction in invalid state"),
    }
}

fn jump_to_subroutine(cpu: &mut Cpu, state: ExecState) -> ExecState {
    match state {
        ExecState::FetchOpcode => {
            cpu.pc |= u16::from(cpu.data_bus) << 8;
            fresh_fetch(cpu)
        }
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    cpu.pc = cpu.pc.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                1 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_sub(1);
                    stage.address = u16::from(cpu.data_bus); // target low byte
                    ExecState::FetchingAddress(stage)
                }
                2 => {
                    cpu.rw = BusDir::Write;
                    cpu.data_bus = (cpu.pc >> 8) as u8;
                    ExecState::FetchingAddress(stage)
                }
                3 => {
                    cpu.rw = BusDir::Write;
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_sub(1);
                    cpu.data_bus = cpu.pc as u8;
                    ExecState::FetchingAddress(stage)
                }
                4 => {
                    cpu.address_bus = cpu.pc;
                    cpu.pc = stage.address & 0x00FF;
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid JSR cycle"),
            }
        }
        _ => unreachable!("JSR in invalid state"),
    }
}

fn return_from_subroutine(cpu: &mut Cpu, state: ExecState) -> ExecState {
    match state {
        ExecState::FetchOpcode => fresh_fetch(cpu),
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    cpu.pc = cpu.pc.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                1 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                2 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                3 => {
                    stage.address = u16::from(cpu.data_bus); // PCL
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    ExecState::FetchingAddress(stage)
                }
                4 => {
                    cpu.pc = (u16::from(cpu.data_bus) << 8) | (stage.address & 0x00FF);
                    cpu.address_bus = cpu.pc;
                    cpu.pc = cpu.pc.wrapping_add(1);
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid RTS cycle"),
            }
        }
        _ => unreachable!("RTS in invalid state"),
    }
}

fn branch(cpu: &mut Cpu, state: ExecState, taken: BranchCondition) -> ExecState {
    match state {
        ExecState::FetchOpcode => fresh_fetch(cpu),
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    cpu.pc = cpu.pc.wrapping_add(1);
                    if taken(cpu) {
                        ExecState::FetchingAddress(stage)
                    } else {
                        ExecState::FetchOpcode
                    }
                }
                1 => {
                    cpu.address_bus = cpu.pc;
                    let offset = i16::from(cpu.data_bus as i8) as u16;
                    stage.address = cpu.pc.wrapping_add(offset);
                    // PCL is patched first; a page crossing needs the extra
                    // cycle to fix PCH.
                    cpu.pc = (cpu.pc & 0xFF00) | (stage.address & 0x00FF);
                    if cpu.pc != stage.address {
                        ExecState::FetchingAddress(stage)
                    } else {
                        ExecState::FetchOpcode
                    }
                }
                2 => {
                    cpu.address_bus = cpu.pc;
                    cpu.pc = stage.address;
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid branch cycle"),
            }
        }
        _ => unreachable!("branch in invalid state"),
    }
}

/// The 7-cycle interrupt sequence shared by BRK and the injected reset, NMI
/// and IRQ entries. A pending reset turns the three stack pushes into reads
/// so memory is left untouched.
fn interrupt_sequence(cpu: &mut Cpu, state: ExecState) -> ExecState {
    match state {
        ExecState::FetchOpcode => {
            cpu.pc |= u16::from(cpu.data_bus) << 8;
            fresh_fetch(cpu)
        }
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    // BRK consumes a padding byte; injected interrupts leave
                    // PC on the interrupted instruction.
                    if !cpu.nmi_pending && !cpu.irq_pending {
                        cpu.pc = cpu.pc.wrapping_add(1);
                    }
                    ExecState::FetchingAddress(stage)
                }
                1 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_sub(1);
                    cpu.data_bus = (cpu.pc >> 8) as u8;
                    if !cpu.reset_pending {
                        cpu.rw = BusDir::Write;
                    }
                    ExecState::FetchingAddress(stage)
                }
                2 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_sub(1);
                    cpu.data_bus = cpu.pc as u8;
                    if !cpu.reset_pending {
                        cpu.rw = BusDir::Write;
                    }
                    ExecState::FetchingAddress(stage)
                }
                3 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_sub(1);
                    let brk = !cpu.reset_pending && !cpu.nmi_pending && !cpu.irq_pending;
                    cpu.data_bus = cpu.p.to_pushed_byte(brk);
                    if !cpu.reset_pending {
                        cpu.rw = BusDir::Write;
                    }
                    ExecState::FetchingAddress(stage)
                }
                4 => {
                    stage.address = if cpu.reset_pending {
                        RESET_VECTOR
                    } else if cpu.nmi_pending {
                        NMI_VECTOR
                    } else {
                        BRK_IRQ_VECTOR
                    };
                    cpu.address_bus = stage.address;

                    cpu.reset_pending = false;
                    cpu.nmi_pending = false;
                    cpu.irq_pending = false;
                    ExecState::FetchingAddress(stage)
                }
                5 => {
                    cpu.pc = u16::from(cpu.data_bus);
                    stage.address = stage.address.wrapping_add(1);
                    cpu.address_bus = stage.address;
                    cpu.p.insert(Status::INTERRUPT);
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid interrupt sequence cycle"),
            }
        }
        _ => unreachable!("interrupt sequence in invalid state"),
    }
}

fn return_from_interrupt(cpu: &mut Cpu, state: ExecState) -> ExecState {
    match state {
        ExecState::FetchOpcode => {
            cpu.pc |= u16::from(cpu.data_bus) << 8;
            fresh_fetch(cpu)
        }
        ExecState::FetchingAddress(mut stage) => {
            let cycle = stage.cycle;
            stage.cycle += 1;
            match cycle {
                0 => {
                    cpu.address_bus = cpu.pc;
                    ExecState::FetchingAddress(stage)
                }
                1 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                2 => {
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                3 => {
                    cpu.p = Status::from_byte(cpu.data_bus);
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    cpu.s = cpu.s.wrapping_add(1);
                    ExecState::FetchingAddress(stage)
                }
                4 => {
                    cpu.pc = u16::from(cpu.data_bus); // PCL
                    cpu.address_bus = STACK_PAGE | u16::from(cpu.s);
                    ExecState::FetchOpcode
                }
                _ => unreachable!("invalid RTI cycle"),
            }
        }
        _ => unreachable!("RTI in invalid state"),
    }
}

fn illegal(cpu: &mut Cpu, _: ExecState) -> ExecState {
    panic!(
        "illegal opcode {:#04X} at pc {:#06X}",
        cpu.instruction_register, cpu.pc
    );
}

// ─────────────────────────────────────────────────────────────────────────
//  Operations
// ─────────────────────────────────────────────────────────────────────────

fn adc_value(cpu: &mut Cpu, operand: u8) {
    let result = u16::from(cpu.a) + u16::from(operand) + u16::from(cpu.p.carry());
    let result8 = result as u8;
    cpu.p.set(Status::CARRY, result & 0x100 != 0);
    cpu.p.set(
        Status::OVERFLOW,
        (cpu.a ^ result8) & (operand ^ result8) & 0x80 != 0,
    );
    cpu.a = result8;
    cpu.p.set_zn(cpu.a);
}

fn adc(cpu: &mut Cpu) {
    adc_value(cpu, cpu.data_bus);
}

/// SBC is ADC with the operand inverted; carry set means "no borrow".
fn sbc(cpu: &mut Cpu) {
    adc_value(cpu, !cpu.data_bus);
}

fn and(cpu: &mut Cpu) {
    cpu.a &= cpu.data_bus;
    cpu.p.set_zn(cpu.a);
}

fn ora(cpu: &mut Cpu) {
    cpu.a |= cpu.data_bus;
    cpu.p.set_zn(cpu.a);
}

fn eor(cpu: &mut Cpu) {
    cpu.a ^= cpu.data_bus;
    cpu.p.set_zn(cpu.a);
}

fn bit(cpu: &mut Cpu) {
    cpu.p.set(Status::NEGATIVE, cpu.data_bus & 0x80 != 0);
    cpu.p.set(Status::OVERFLOW, cpu.data_bus & 0x40 != 0);
    cpu.p.set(Status::ZERO, cpu.a & cpu.data_bus == 0);
}

fn compare(cpu: &mut Cpu, register: u8) {
    let result = register.wrapping_sub(cpu.data_bus);
    cpu.p.set_zn(result);
    cpu.p.set(Status::CARRY, cpu.data_bus <= register);
}

fn cmp(cpu: &mut Cpu) {
    let register = cpu.a;
    compare(cpu, register);
}

fn cpx(cpu: &mut Cpu) {
    let register = cpu.x;
    compare(cpu, register);
}

fn cpy(cpu: &mut Cpu) {
    let register = cpu.y;
    compare(cpu, register);
}

fn lda(cpu: &mut Cpu) {
    cpu.a = cpu.data_bus;
    cpu.p.set_zn(cpu.a);
}

fn ldx(cpu: &mut Cpu) {
    cpu.x = cpu.data_bus;
    cpu.p.set_zn(cpu.x);
}

fn ldy(cpu: &mut Cpu) {
    cpu.y = cpu.data_bus;
    cpu.p.set_zn(cpu.y);
}

fn asl_value(cpu: &mut Cpu, operand: u8) -> u8 {
    let result = operand << 1;
    cpu.p.set(Status::CARRY, operand & 0x80 != 0);
    cpu.p.set_zn(result);
    result
}

fn lsr_value(cpu: &mut Cpu, operand: u8) -> u8 {
    let result = operand >> 1;
    cpu.p.set(Status::CARRY, operand & 0x01 != 0);
    cpu.p.set_zn(result);
    result
}

fn rol_value(cpu: &mut Cpu, operand: u8) -> u8 {
    let result = (operand << 1) | u8::from(cpu.p.carry());
    cpu.p.set(Status::CARRY, operand & 0x80 != 0);
    cpu.p.set_zn(result);
    result
}

fn ror_value(cpu: &mut Cpu, operand: u8) -> u8 {
    let result = (operand >> 1) | (u8::from(cpu.p.carry()) << 7);
    cpu.p.set(Status::CARRY, operand & 0x01 != 0);
    cpu.p.set_zn(result);
    result
}

fn inc_value(cpu: &mut Cpu, operand: u8) -> u8 {
    let result = operand.wrapping_add(1);
    cpu.p.set_zn(result);
    result
}

fn dec_value(cpu: &mut Cpu, operand: u8) -> u8 {
    let result = operand.wrapping_sub(1);
    cpu.p.set_zn(result);
    result
}

// ─────────────────────────────────────────────────────────────────────────
//  Dispatch table
// ─────────────────────────────────────────────────────────────────────────

use crate::cpu::addressing::{
    absolute, absolute_x, absolute_y, immediate, indirect, indirect_x, indirect_y, zero_page,
    zero_page_x, zero_page_y,
};

/// Opcode dispatch table. Unassigned opcodes land on [`illegal`], which
/// halts the core.
#[rustfmt::skip]
pub(crate) static INSTRUCTION_SET: [Instruction; 256] = {
    let mut set: [Instruction; 256] = [illegal; 256];

    // 0x00-0x1F
    set[0x00] = interrupt_sequence;                                                   // BRK
    set[0x01] = |cpu, s| read_and_use(cpu, s, indirect_x, ora);                       // ORA (zp,X)
    set[0x05] = |cpu, s| read_and_use(cpu, s, zero_page, ora);                        // ORA zp
    set[0x06] = |cpu, s| read_modify_write(cpu, s, zero_page, asl_value);             // ASL zp
    set[0x08] = |cpu, s| push(cpu, s, |c| c.p.to_pushed_byte(true));                  // PHP
    set[0x09] = |cpu, s| read_and_use(cpu, s, immediate, ora);                        // ORA #
    set[0x0A] = |cpu, s| single_byte(cpu, s, |c| c.a = asl_value(c, c.a));            // ASL A
    set[0x0D] = |cpu, s| read_and_use(cpu, s, absolute, ora);                         // ORA abs
    set[0x0E] = |cpu, s| read_modify_write(cpu, s, absolute, asl_value);              // ASL abs
    set[0x10] = |cpu, s| branch(cpu, s, |c| !c.p.contains(Status::NEGATIVE));         // BPL
    set[0x11] = |cpu, s| read_and_use(cpu, s, indirect_y, ora);                       // ORA (zp),Y
    set[0x15] = |cpu, s| read_and_use(cpu, s, zero_page_x, ora);                      // ORA zp,X
    set[0x16] = |cpu, s| read_modify_write(cpu, s, zero_page_x, asl_value);           // ASL zp,X
    set[0x18] = |cpu, s| single_byte(cpu, s, |c| c.p.remove(Status::CARRY));          // CLC
    set[0x19] = |cpu, s| read_and_use(cpu, s, absolute_y, ora);                       // ORA abs,Y
    set[0x1D] = |cpu, s| read_and_use(cpu, s, absolute_x, ora);                       // ORA abs,X
    set[0x1E] = |cpu, s| read_modify_write(cpu, s, absolute_x, asl_value);            // ASL abs,X

    // 0x20-0x3F
    set[0x20] = jump_to_subroutine;                                                   // JSR
    set[0x21] = |cpu, s| read_and_use(cpu, s, indirect_x, and);                       // AND (zp,X)
    set[0x24] = |cpu, s| read_and_use(cpu, s, zero_page, bit);                        // BIT zp
    set[0x25] = |cpu, s| read_and_use(cpu, s, zero_page, and);                        // AND zp
    set[0x26] = |cpu, s| read_modify_write(cpu, s, zero_page, rol_value);             // ROL zp
    set[0x28] = |cpu, s| pull(cpu, s, |c, v| c.p = Status::from_byte(v));             // PLP
    set[0x29] = |cpu, s| read_and_use(cpu, s, immediate, and);                        // AND #
    set[0x2A] = |cpu, s| single_byte(cpu, s, |c| c.a = rol_value(c, c.a));            // ROL A
    set[0x2C] = |cpu, s| read_and_use(cpu, s, absolute, bit);                         // BIT abs
    set[0x2D] = |cpu, s| read_and_use(cpu, s, absolute, and);                         // AND abs
    set[0x2E] = |cpu, s| read_modify_write(cpu, s, absolute, rol_value);              // ROL abs
    set[0x30] = |cpu, s| branch(cpu, s, |c| c.p.contains(Status::NEGATIVE));          // BMI
    set[0x31] = |cpu, s| read_and_use(cpu, s, indirect_y, and);                       // AND (zp),Y
    set[0x35] = |cpu, s| read_and_use(cpu, s, zero_page_x, and);                      // AND zp,X
    set[0x36] = |cpu, s| read_modify_write(cpu, s, zero_page_x, rol_value);           // ROL zp,X
    set[0x38] = |cpu, s| single_byte(cpu, s, |c| c.p.insert(Status::CARRY));          // SEC
    set[0x39] = |cpu, s| read_and_use(cpu, s, absolute_y, and);                       // AND abs,Y
    set[0x3D] = |cpu, s| read_and_use(cpu, s, absolute_x, and);                       // AND abs,X
    set[0x3E] = |cpu, s| read_modify_write(cpu, s, absolute_x, rol_value);            // ROL abs,X

    // 0x40-0x5F
    set[0x40] = return_from_interrupt;                                                // RTI
    set[0x41] = |cpu, s| read_and_use(cpu, s, indirect_x, eor);                       // EOR (zp,X)
    set[0x45] = |cpu, s| read_and_use(cpu, s, zero_page, eor);                        // EOR zp
    set[0x46] = |cpu, s| read_modify_write(cpu, s, zero_page, lsr_value);             // LSR zp
    set[0x48] = |cpu, s| push(cpu, s, |c| c.a);                                       // PHA
    set[0x49] = |cpu, s| read_and_use(cpu, s, immediate, eor);                        // EOR #
    set[0x4A] = |cpu, s| single_byte(cpu, s, |c| c.a = lsr_value(c, c.a));            // LSR A
    set[0x4C] = |cpu, s| jump(cpu, s, absolute);                                      // JMP abs
    set[0x4D] = |cpu, s| read_and_use(cpu, s, absolute, eor);                         // EOR abs
    set[0x4E] = |cpu, s| read_modify_write(cpu, s, absolute, lsr_value);              // LSR abs
    set[0x50] = |cpu, s| branch(cpu, s, |c| !c.p.contains(Status::OVERFLOW));         // BVC
    set[0x51] = |cpu, s| read_and_use(cpu, s, indirect_y, eor);                       // EOR (zp),Y
    set[0x55] = |cpu, s| read_and_use(cpu, s, zero_page_x, eor);                      // EOR zp,X
    set[0x56] = |cpu, s| read_modify_write(cpu, s, zero_page_x, lsr_value);           // LSR zp,X
    set[0x58] = |cpu, s| single_byte(cpu, s, |c| c.p.remove(Status::INTERRUPT));      // CLI
    set[0x59] = |cpu, s| read_and_use(cpu, s, absolute_y, eor);                       // EOR abs,Y
    set[0x5D] = |cpu, s| read_and_use(cpu, s, absolute_x, eor);                       // EOR abs,X
    set[0x5E] = |cpu, s| read_modify_write(cpu, s, absolute_x, lsr_value);            // LSR abs,X

    // 0x60-0x7F
    set[0x60] = return_from_subroutine;                                               // RTS
    set[0x61] = |cpu, s| read_and_use(cpu, s, indirect_x, adc);                       // ADC (zp,X)
    set[0x65] = |cpu, s| read_and_use(cpu, s, zero_page, adc);                        // ADC zp
    set[0x66] = |cpu, s| read_modify_write(cpu, s, zero_page, ror_value);             // ROR zp
    set[0x68] = |cpu, s| pull(cpu, s, |c, v| { c.a = v; c.p.set_zn(v); });            // PLA
    set[0x69] = |cpu, s| read_and_use(cpu, s, immediate, adc);                        // ADC #
    set[0x6A] = |cpu, s| single_byte(cpu, s, |c| c.a = ror_value(c, c.a));            // ROR A
    set[0x6C] = |cpu, s| jump(cpu, s, indirect);                                      // JMP (abs)
    set[0x6D] = |cpu, s| read_and_use(cpu, s, absolute, adc);                         // ADC abs
    set[0x6E] = |cpu, s| read_modify_write(cpu, s, absolute, ror_value);              // ROR abs
    set[0x70] = |cpu, s| branch(cpu, s, |c| c.p.contains(Status::OVERFLOW));          // BVS
    set[0x71] = |cpu, s| read_and_use(cpu, s, indirect_y, adc);                       // ADC (zp),Y
    set[0x75] = |cpu, s| read_and_use(cpu, s, zero_page_x, adc);                      // ADC zp,X
    set[0x76] = |cpu, s| read_modify_write(cpu, s, zero_page_x, ror_value);           // ROR zp,X
    set[0x78] = |cpu, s| single_byte(cpu, s, |c| c.p.insert(Status::INTERRUPT));      // SEI
    set[0x79] = |cpu, s| read_and_use(cpu, s, absolute_y, adc);                       // ADC abs,Y
    set[0x7D] = |cpu, s| read_and_use(cpu, s, absolute_x, adc);                       // ADC abs,X
    set[0x7E] = |cpu, s| read_modify_write(cpu, s, absolute_x, ror_value);            // ROR abs,X

    // 0x80-0x9F
    set[0x81] = |cpu, s| store(cpu, s, indirect_x, |c| c.a);                          // STA (zp,X)
    set[0x84] = |cpu, s| store(cpu, s, zero_page, |c| c.y);                           // STY zp
    set[0x85] = |cpu, s| store(cpu, s, zero_page, |c| c.a);                           // STA zp
    set[0x86] = |cpu, s| store(cpu, s, zero_page, |c| c.x);                           // STX zp
    set[0x88] = |cpu, s| single_byte(cpu, s, |c| { c.y = c.y.wrapping_sub(1); c.p.set_zn(c.y); }); // DEY
    set[0x8A] = |cpu, s| single_byte(cpu, s, |c| { c.a = c.x; c.p.set_zn(c.a); });    // TXA
    set[0x8C] = |cpu, s| store(cpu, s, absolute, |c| c.y);                            // STY abs
    set[0x8D] = |cpu, s| store(cpu, s, absolute, |c| c.a);                            // STA abs
    set[0x8E] = |cpu, s| store(cpu, s, absolute, |c| c.x);                            // STX abs
    set[0x90] = |cpu, s| branch(cpu, s, |c| !c.p.contains(Status::CARRY));            // BCC
    set[0x91] = |cpu, s| store(cpu, s, indirect_y, |c| c.a);                          // STA (zp),Y
    set[0x94] = |cpu, s| store(cpu, s, zero_page_x, |c| c.y);                         // STY zp,X
    set[0x95] = |cpu, s| store(cpu, s, zero_page_x, |c| c.a);                         // STA zp,X
    set[0x96] = |cpu, s| store(cpu, s, zero_page_y, |c| c.x);                         // STX zp,Y
    set[0x98] = |cpu, s| single_byte(cpu, s, |c| { c.a = c.y; c.p.set_zn(c.a); });    // TYA
    set[0x99] = |cpu, s| store(cpu, s, absolute_y, |c| c.a);                          // STA abs,Y
    set[0x9A] = |cpu, s| single_byte(cpu, s, |c| c.s = c.x);                          // TXS
    set[0x9D] = |cpu, s| store(cpu, s, absolute_x, |c| c.a);                          // STA abs,X

    // 0xA0-0xBF
    set[0xA0] = |cpu, s| read_and_use(cpu, s, immediate, ldy);                        // LDY #
    set[0xA1] = |cpu, s| read_and_use(cpu, s, indirect_x, lda);                       // LDA (zp,X)
    set[0xA2] = |cpu, s| read_and_use(cpu, s, immediate, ldx);                        // LDX #
    set[0xA4] = |cpu, s| read_and_use(cpu, s, zero_page, ldy);                        // LDY zp
    set[0xA5] = |cpu, s| read_and_use(cpu, s, zero_page, lda);                        // LDA zp
    set[0xA6] = |cpu, s| read_and_use(cpu, s, zero_page, ldx);                        // LDX zp
    set[0xA8] = |cpu, s| single_byte(cpu, s, |c| { c.y = c.a; c.p.set_zn(c.y); });    // TAY
    set[0xA9] = |cpu, s| read_and_use(cpu, s, immediate, lda);                        // LDA #
    set[0xAA] = |cpu, s| single_byte(cpu, s, |c| { c.x = c.a; c.p.set_zn(c.x); });    // TAX
    set[0xAC] = |cpu, s| read_and_use(cpu, s, absolute, ldy);                         // LDY abs
    set[0xAD] = |cpu, s| read_and_use(cpu, s, absolute, lda);                         // LDA abs
    set[0xAE] = |cpu, s| read_and_use(cpu, s, absolute, ldx);                         // LDX abs
    set[0xB0] = |cpu, s| branch(cpu, s, |c| c.p.contains(Status::CARRY));             // BCS
    set[0xB1] = |cpu, s| read_and_use(cpu, s, indirect_y, lda);                       // LDA (zp),Y
    set[0xB4] = |cpu, s| read_and_use(cpu, s, zero_page_x, ldy);                      // LDY zp,X
    set[0xB5] = |cpu, s| read_and_use(cpu, s, zero_page_x, lda);                      // LDA zp,X
    set[0xB6] = |cpu, s| read_and_use(cpu, s, zero_page_y, ldx);                      // LDX zp,Y
    set[0xB8] = |cpu, s| single_byte(cpu, s, |c| c.p.remove(Status::OVERFLOW));       // CLV
    set[0xB9] = |cpu, s| read_and_use(cpu, s, absolute_y, lda);                       // LDA abs,Y
    set[0xBA] = |cpu, s| single_byte(cpu, s, |c| { c.x = c.s; c.p.set_zn(c.x); });    // TSX
    set[0xBC] = |cpu, s| read_and_use(cpu, s, absolute_x, ldy);                       // LDY abs,X
    set[0xBD] = |cpu, s| read_and_use(cpu, s, absolute_x, lda);                       // LDA abs,X
    set[0xBE] = |cpu, s| read_and_use(cpu, s, absolute_y, ldx);                       // LDX abs,Y

    // 0xC0-0xDF
    set[0xC0] = |cpu, s| read_and_use(cpu, s, immediate, cpy);                        // CPY #
    set[0xC1] = |cpu, s| read_and_use(cpu, s, indirect_x, cmp);                       // CMP (zp,X)
    set[0xC4] = |cpu, s| read_and_use(cpu, s, zero_page, cpy);                        // CPY zp
    set[0xC5] = |cpu, s| read_and_use(cpu, s, zero_page, cmp);                        // CMP zp
    set[0xC6] = |cpu, s| read_modify_write(cpu, s, zero_page, dec_value);             // DEC zp
    set[0xC8] = |cpu, s| single_byte(cpu, s, |c| { c.y = c.y.wrapping_add(1); c.p.set_zn(c.y); }); // INY
    set[0xC9] = |cpu, s| read_and_use(cpu, s, immediate, cmp);                        // CMP #
    set[0xCA] = |cpu, s| single_byte(cpu, s, |c| { c.x = c.x.wrapping_sub(1); c.p.set_zn(c.x); }); // DEX
    set[0xCC] = |cpu, s| read_and_use(cpu, s, absolute, cpy);                         // CPY abs
    set[0xCD] = |cpu, s| read_and_use(cpu, s, absolute, cmp);                         // CMP abs
    set[0xCE] = |cpu, s| read_modify_write(cpu, s, absolute, dec_value);              // DEC abs
    set[0xD0] = |cpu, s| branch(cpu, s, |c| !c.p.contains(Status::ZERO));             // BNE
    set[0xD1] = |cpu, s| read_and_use(cpu, s, indirect_y, cmp);                       // CMP (zp),Y
    set[0xD5] = |cpu, s| read_and_use(cpu, s, zero_page_x, cmp);                      // CMP zp,X
    set[0xD6] = |cpu, s| read_modify_write(cpu, s, zero_page_x, dec_value);           // DEC zp,X
    set[0xD8] = |cpu, s| single_byte(cpu, s, |c| c.p.remove(Status::DECIMAL));        // CLD
    set[0xD9] = |cpu, s| read_and_use(cpu, s, absolute_y, cmp);                       // CMP abs,Y
    set[0xDD] = |cpu, s| read_and_use(cpu, s, absolute_x, cmp);                       // CMP abs,X
    set[0xDE] = |cpu, s| read_modify_write(cpu, s, absolute_x, dec_value);            // DEC abs,X

    // 0xE0-0xFF
    set[0xE0] = |cpu, s| read_and_use(cpu, s, immediate, cpx);                        // CPX #
    set[0xE1] = |cpu, s| read_and_use(cpu, s, indirect_x, sbc);                       // SBC (zp,X)
    set[0xE4] = |cpu, s| read_and_use(cpu, s, zero_page, cpx);                        // CPX zp
    set[0xE5] = |cpu, s| read_and_use(cpu, s, zero_page, sbc);                        // SBC zp
    set[0xE6] = |cpu, s| read_modify_write(cpu, s, zero_page, inc_value);             // INC zp
    set[0xE8] = |cpu, s| single_byte(cpu, s, |c| { c.x = c.x.wrapping_add(1); c.p.set_zn(c.x); }); // INX
    set[0xE9] = |cpu, s| read_and_use(cpu, s, immediate, sbc);                        // SBC #
    set[0xEA] = |cpu, s| single_byte(cpu, s, |_| {});                                 // NOP
    set[0xEC] = |cpu, s| read_and_use(cpu, s, absolute, cpx);                         // CPX abs
    set[0xED] = |cpu, s| read_and_use(cpu, s, absolute, sbc);                         // SBC abs
    set[0xEE] = |cpu, s| read_modify_write(cpu, s, absolute, inc_value);              // INC abs
    set[0xF0] = |cpu, s| branch(cpu, s, |c| c.p.contains(Status::ZERO));              // BEQ
    set[0xF1] = |cpu, s| read_and_use(cpu, s, indirect_y, sbc);                       // SBC (zp),Y
    set[0xF5] = |cpu, s| read_and_use(cpu, s, zero_page_x, sbc);                      // SBC zp,X
    set[0xF6] = |cpu, s| read_modify_write(cpu, s, zero_page_x, inc_value);           // INC zp,X
    set[0xF8] = |cpu, s| single_byte(cpu, s, |c| c.p.insert(Status::DECIMAL));        // SED
    set[0xF9] = |cpu, s| read_and_use(cpu, s, absolute_y, sbc);                       // SBC abs,Y
    set[0xFD] = |cpu, s| read_and_use(cpu, s, absolute_x, sbc);                       // SBC abs,X
    set[0xFE] = |cpu, s| read_modify_write(cpu, s, absolute_x, inc_value);            // INC abs,X

    set
};

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu() -> Cpu {
        Cpu::new()
    }

    #[test]
    fn adc_carry_and_overflow_semantics() {
        let cases = [
            // (a, operand, carry_in) -> (result, carry, overflow)
            (0x0Du8, 0xD3u8, true, 0xE1u8, false, false),
            (0xFE, 0x06, true, 0x05, true, false),
            (0x7F, 0x02, false, 0x81, false, true),
            (0xBE, 0xBF, false, 0x7D, true, true),
        ];
        for (a, operand, carry, want_a, want_c, want_v) in cases {
            let mut cpu = cpu();
            cpu.a = a;
            cpu.p.set(Status::CARRY, carry);
            adc_value(&mut cpu, operand);
            assert_eq!(cpu.a, want_a, "A for {a:#04X} + {operand:#04X}");
            assert_eq!(cpu.p.carry(), want_c, "C for {a:#04X} + {operand:#04X}");
            assert_eq!(
                cpu.p.contains(Status::OVERFLOW),
                want_v,
                "V for {a:#04X} + {operand:#04X}"
            );
        }
    }

    #[test]
    fn sbc_carry_means_no_borrow() {
        let mut cpu = cpu();
        cpu.a = 0x05;
        cpu.data_bus = 0x03;
        cpu.p.insert(Status::CARRY);
        sbc(&mut cpu);
        assert_eq!(cpu.a, 0x02);
        assert!(cpu.p.carry());

        let mut cpu = self::cpu();
        cpu.a = 0x50;
        cpu.data_bus = 0xB0;
        cpu.p.insert(Status::CARRY);
        sbc(&mut cpu);
        assert_eq!(cpu.a, 0xA0);
        assert!(!cpu.p.carry());
        assert!(cpu.p.contains(Status::OVERFLOW));
    }

    #[test]
    fn shift_and_rotate_carry_paths() {
        let mut cpu = cpu();
        assert_eq!(asl_value(&mut cpu, 0x88), 0x10);
        assert!(cpu.p.carry());

        let mut cpu = self::cpu();
        assert_eq!(lsr_value(&mut cpu, 0x11), 0x08);
        assert!(cpu.p.carry());

        let mut cpu = self::cpu();
        cpu.p.remove(Status::CARRY);
        assert_eq!(rol_value(&mut cpu, 0x88), 0x10);
        assert!(cpu.p.carry());

        let mut cpu = self::cpu();
        cpu.p.remove(Status::CARRY);
        assert_eq!(ror_value(&mut cpu, 0x11), 0x08);
        assert!(cpu.p.carry());
    }

    #[test]
    fn rotate_pulls_old_carry_in() {
        let mut cpu = cpu();
        cpu.p.insert(Status::CARRY);
        assert_eq!(rol_value(&mut cpu, 0x00), 0x01);
        assert!(!cpu.p.carry());

        let mut cpu = self::cpu();
        cpu.p.insert(Status::CARRY);
        assert_eq!(ror_value(&mut cpu, 0x00), 0x80);
        assert!(!cpu.p.carry());
    }

    #[test]
    fn bit_sets_nv_from_memory_and_z_from_mask() {
        let mut cpu = cpu();
        cpu.a = 0x01;
        cpu.data_bus = 0xC0;
        bit(&mut cpu);
        assert!(cpu.p.contains(Status::NEGATIVE));
        assert!(cpu.p.contains(Status::OVERFLOW));
        assert!(cpu.p.contains(Status::ZERO));
    }

    #[test]
    fn compare_sets_carry_on_greater_or_equal() {
        let mut cpu = cpu();
        cpu.a = 0x40;
        cpu.data_bus = 0x40;
        cmp(&mut cpu);
        assert!(cpu.p.carry());
        assert!(cpu.p.contains(Status::ZERO));

        cpu.data_bus = 0x41;
        cmp(&mut cpu);
        assert!(!cpu.p.carry());
    }
}
