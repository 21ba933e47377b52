use std::fs;
use std::path::Path;

use log::{debug, info, log_enabled, trace, Level};

use crate::vm::config::{
    FONT_BYTES, FONT_START, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT, SCREEN_HEIGHT,
    SCREEN_WIDTH, STACK_DEPTH,
};
use crate::vm::error::Chip8Error;

pub type FrameBuffer = [u8; SCREEN_WIDTH * SCREEN_HEIGHT];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Running,
    /// Suspended on FX0A until a key goes down; the key index lands in `register`.
    AwaitingKey { register: usize },
}

#[derive(Debug, Clone)]
pub struct VmState {
    pub memory: [u8; MEMORY_SIZE],
    pub registers: [u8; REGISTER_COUNT],
    pub stack: [u16; STACK_DEPTH],
    pub sp: usize,
    pub pc: u16,
    pub index: u16,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub screen_buffer: FrameBuffer,
    pub should_draw: bool,
    pub key_inputs: [bool; KEY_COUNT],
    pub previous_keys: [bool; KEY_COUNT],
    pub mode: ExecutionMode,
}

impl Default for VmState {
    fn default() -> Self {
        Self {
            memory: [0; MEMORY_SIZE],
            registers: [0; REGISTER_COUNT],
            stack: [0; STACK_DEPTH],
            sp: 0,
            pc: PROGRAM_START as u16,
            index: 0,
            delay_timer: 0,
            sound_timer: 0,
            screen_buffer: [0; SCREEN_WIDTH * SCREEN_HEIGHT],
            should_draw: true,
            key_inputs: [false; KEY_COUNT],
            previous_keys: [false; KEY_COUNT],
            mode: ExecutionMode::Running,
        }
    }
}

pub fn create_state() -> VmState {
    let mut state = VmState::default();
    reset_state(&mut state);
    state
}

pub fn reset_state(state: &mut VmState) {
    state.memory = [0; MEMORY_SIZE];
    state.registers = [0; REGISTER_COUNT];
    state.stack = [0; STACK_DEPTH];
    state.sp = 0;
    state.key_inputs = [false; KEY_COUNT];
    state.previous_keys = [false; KEY_COUNT];
    clear_display(state);

    state.pc = PROGRAM_START as u16;
    state.index = 0;
    state.delay_timer = 0;
    state.sound_timer = 0;
    state.mode = ExecutionMode::Running;

    load_font(state);
}

pub fn clear_display(state: &mut VmState) {
    state.screen_buffer = [0; SCREEN_WIDTH * SCREEN_HEIGHT];
    state.should_draw = true;
}

pub fn load_font(state: &mut VmState) {
    state.memory[FONT_START..FONT_START + FONT_BYTES.len()].copy_from_slice(&FONT_BYTES);
}

/// Copies `program` to 0x200. Rejects programs that do not fit instead of truncating them.
pub fn load_program(state: &mut VmState, program: &[u8]) -> Result<(), Chip8Error> {
    let max_size = MEMORY_SIZE - PROGRAM_START;

    if program.len() > max_size {
        return Err(Chip8Error::RomTooLarge {
            size: program.len(),
            max: max_size,
        });
    }

    let start = PROGRAM_START;
    let end = PROGRAM_START + program.len();
    state.memory[start..end].copy_from_slice(program);

    if log_enabled!(Level::Trace) {
        log_rom_content(program);
    }
    info!("loaded rom into mem starting at {start:#05x} - to {end:#05x}");

    Ok(())
}

pub fn load_rom_file(state: &mut VmState, path: &Path) -> Result<(), Chip8Error> {
    let rom_bytes = fs::read(path).map_err(|source| Chip8Error::RomLoad {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("read {} bytes from {}", rom_bytes.len(), path.display());

    load_program(state, &rom_bytes)
}

fn log_rom_content(rom: &[u8]) {
    let rows = rom
        .chunks(16)
        .enumerate()
        .map(|(row, bytes)| {
            let hex = bytes
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<_>>()
                .join(" ");
            format!("{:#05x}: {hex}", PROGRAM_START + row * 16)
        })
        .collect::<Vec<_>>();

    trace!("rom content:\n{}", rows.join("\n"));
}

/// Installs this cycle's key snapshot, keeping the last one for edge detection.
pub fn set_keys(state: &mut VmState, keys: &[bool; KEY_COUNT]) {
    state.previous_keys = state.key_inputs;
    state.key_inputs = *keys;
}

/// Lowest key that is down now but was up in the previous snapshot.
pub fn newly_pressed_key(state: &VmState) -> Option<u8> {
    state
        .key_inputs
        .iter()
        .zip(state.previous_keys.iter())
        .position(|(now, before)| *now && !*before)
        .map(|index| index as u8)
}

/// Hands the frame to the presentation layer once per change.
pub fn take_frame(state: &mut VmState) -> Option<&FrameBuffer> {
    if !state.should_draw {
        return None;
    }

    state.should_draw = false;
    Some(&state.screen_buffer)
}

pub fn sound_active(state: &VmState) -> bool {
    state.sound_timer > 0
}
