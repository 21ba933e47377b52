use log::{debug, trace};
use rand::Rng;

use crate::vm::config::{
    FONT_GLYPH_HEIGHT, FONT_START, KEY_COUNT, MEMORY_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
    STACK_DEPTH,
};
use crate::vm::decode::{decode, fetch_opcode, Instruction};
use crate::vm::error::Chip8Error;
use crate::vm::state::{clear_display, newly_pressed_key, set_keys, ExecutionMode, VmState};

const FLAG: usize = 0xF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Executed(Instruction),
    /// The opcode matched no instruction form; only the PC moved.
    Ignored(u16),
    /// FX0A is still waiting; nothing was fetched.
    AwaitingKey,
    /// A pending FX0A received `key` this cycle.
    KeyReceived(u8),
}

/// One engine cycle with a fresh key snapshot from the host.
pub fn step<R: Rng + ?Sized>(
    state: &mut VmState,
    keys: &[bool; KEY_COUNT],
    rng: &mut R,
) -> Result<CycleOutcome, Chip8Error> {
    set_keys(state, keys);
    execute_cycle(state, rng)
}

pub fn execute_cycle<R: Rng + ?Sized>(
    state: &mut VmState,
    rng: &mut R,
) -> Result<CycleOutcome, Chip8Error> {
    if let ExecutionMode::AwaitingKey { register } = state.mode {
        return Ok(match newly_pressed_key(state) {
            Some(key) => {
                debug!("key {key:#x} ends FX0A wait, stored in V{register:X}");
                state.registers[register] = key;
                state.mode = ExecutionMode::Running;
                CycleOutcome::KeyReceived(key)
            }
            None => CycleOutcome::AwaitingKey,
        });
    }

    let opcode = fetch_opcode(&state.memory, state.pc)?;
    trace!("{:#05x}: {opcode:04x}", state.pc);
    state.pc += 2;

    execute_opcode(state, opcode, rng)
}

/// Executes `opcode` as if it had just been fetched, so the PC already points past it.
pub fn execute_opcode<R: Rng + ?Sized>(
    state: &mut VmState,
    opcode: u16,
    rng: &mut R,
) -> Result<CycleOutcome, Chip8Error> {
    match decode(opcode) {
        Some(instruction) => {
            execute_instruction(state, instruction, rng)?;
            Ok(CycleOutcome::Executed(instruction))
        }
        None => {
            debug!("ignoring unknown opcode {opcode:#06x}");
            Ok(CycleOutcome::Ignored(opcode))
        }
    }
}

pub fn execute_instruction<R: Rng + ?Sized>(
    state: &mut VmState,
    instruction: Instruction,
    rng: &mut R,
) -> Result<(), Chip8Error> {
    match instruction {
        Instruction::MachineCall { .. } => {}
        Instruction::ClearScreen => clear_display(state),
        Instruction::Return => {
            if state.sp == 0 {
                return Err(Chip8Error::StackUnderflow {
                    pc: state.pc.wrapping_sub(2),
                });
            }
            state.sp -= 1;
            state.pc = state.stack[state.sp];
        }
        Instruction::Jump { address } => state.pc = address,
        Instruction::Call { address } => {
            if state.sp == STACK_DEPTH {
                return Err(Chip8Error::StackOverflow {
                    pc: state.pc.wrapping_sub(2),
                });
            }
            state.stack[state.sp] = state.pc;
            state.sp += 1;
            state.pc = address;
        }
        Instruction::SkipIfEqual { x, value } => {
            let condition = state.registers[x] == value;
            skip_if(state, condition);
        }
        Instruction::SkipIfNotEqual { x, value } => {
            let condition = state.registers[x] != value;
            skip_if(state, condition);
        }
        Instruction::SkipIfRegistersEqual { x, y } => {
            let condition = state.registers[x] == state.registers[y];
            skip_if(state, condition);
        }
        Instruction::SkipIfRegistersNotEqual { x, y } => {
            let condition = state.registers[x] != state.registers[y];
            skip_if(state, condition);
        }
        Instruction::LoadImmediate { x, value } => state.registers[x] = value,
        Instruction::AddImmediate { x, value } => {
            state.registers[x] = state.registers[x].wrapping_add(value)
        }
        Instruction::Copy { x, y } => state.registers[x] = state.registers[y],
        Instruction::Or { x, y } => state.registers[x] |= state.registers[y],
        Instruction::And { x, y } => state.registers[x] &= state.registers[y],
        Instruction::Xor { x, y } => state.registers[x] ^= state.registers[y],
        Instruction::AddWithCarry { x, y } => {
            let (result, carry) = state.registers[x].overflowing_add(state.registers[y]);
            state.registers[x] = result;
            state.registers[FLAG] = u8::from(carry);
        }
        Instruction::Subtract { x, y } => {
            let (minuend, subtrahend) = (state.registers[x], state.registers[y]);
            state.registers[x] = minuend.wrapping_sub(subtrahend);
            state.registers[FLAG] = u8::from(minuend >= subtrahend);
        }
        Instruction::SubtractReversed { x, y } => {
            let (minuend, subtrahend) = (state.registers[y], state.registers[x]);
            state.registers[x] = minuend.wrapping_sub(subtrahend);
            state.registers[FLAG] = u8::from(minuend >= subtrahend);
        }
        Instruction::ShiftRight { x, y } => {
            let value = state.registers[y];
            state.registers[x] = value >> 1;
            state.registers[FLAG] = value & 0x1;
        }
        Instruction::ShiftLeft { x, y } => {
            let value = state.registers[y];
            state.registers[x] = value << 1;
            state.registers[FLAG] = (value & 0x80) >> 7;
        }
        Instruction::LoadIndex { address } => state.index = address,
        Instruction::JumpWithOffset { address } => {
            state.pc = address + u16::from(state.registers[0]);
        }
        Instruction::Random { x, mask } => state.registers[x] = rng.gen::<u8>() & mask,
        Instruction::Draw { x, y, height } => draw_sprite(state, x, y, height),
        Instruction::SkipIfKeyDown { x } => {
            let pressed = state.key_inputs[(state.registers[x] & 0x0F) as usize];
            skip_if(state, pressed);
        }
        Instruction::SkipIfKeyUp { x } => {
            let pressed = state.key_inputs[(state.registers[x] & 0x0F) as usize];
            skip_if(state, !pressed);
        }
        Instruction::LoadDelayTimer { x } => state.registers[x] = state.delay_timer,
        Instruction::AwaitKey { x } => match newly_pressed_key(state) {
            Some(key) => state.registers[x] = key,
            None => state.mode = ExecutionMode::AwaitingKey { register: x },
        },
        Instruction::SetDelayTimer { x } => state.delay_timer = state.registers[x],
        Instruction::SetSoundTimer { x } => state.sound_timer = state.registers[x],
        Instruction::AddToIndex { x } => {
            let sum = state.index + u16::from(state.registers[x]);
            state.index = sum & 0x0FFF;
            state.registers[FLAG] = u8::from(sum > 0x0FFF);
        }
        Instruction::LoadGlyphAddress { x } => {
            let digit = (state.registers[x] & 0x0F) as usize;
            state.index = (FONT_START + digit * FONT_GLYPH_HEIGHT) as u16;
        }
        Instruction::StoreBcd { x } => {
            let start = state.index as usize;
            if start + 2 < MEMORY_SIZE {
                let value = state.registers[x];
                state.memory[start] = value / 100;
                state.memory[start + 1] = (value / 10) % 10;
                state.memory[start + 2] = value % 10;
            }
        }
        Instruction::StoreRegisters { x } => {
            let start = state.index as usize;
            if start + x < MEMORY_SIZE {
                state.memory[start..=start + x].copy_from_slice(&state.registers[..=x]);
                state.index += x as u16 + 1;
            }
        }
        Instruction::LoadRegisters { x } => {
            let start = state.index as usize;
            if start + x < MEMORY_SIZE {
                state.registers[..=x].copy_from_slice(&state.memory[start..=start + x]);
                state.index += x as u16 + 1;
            }
        }
    }

    Ok(())
}

fn skip_if(state: &mut VmState, condition: bool) {
    if condition {
        state.pc = state.pc.wrapping_add(2);
    }
}

fn draw_sprite(state: &mut VmState, x: usize, y: usize, height: u8) {
    let x_start = state.registers[x] as usize;
    let y_start = state.registers[y] as usize;
    state.registers[FLAG] = 0;

    let mut collision = false;

    for row in 0..height as usize {
        let sprite_address = state.index as usize + row;
        if sprite_address >= MEMORY_SIZE {
            break;
        }

        let sprite_row = state.memory[sprite_address];
        let y_pos = (y_start + row) % SCREEN_HEIGHT;

        for bit in 0..8 {
            if (sprite_row >> (7 - bit)) & 0x1 == 0 {
                continue;
            }

            let x_pos = (x_start + bit) % SCREEN_WIDTH;
            let location = x_pos + y_pos * SCREEN_WIDTH;
            if state.screen_buffer[location] == 1 {
                collision = true;
            }
            state.screen_buffer[location] ^= 1;
        }
    }

    state.registers[FLAG] = u8::from(collision);
    state.should_draw = true;
}
