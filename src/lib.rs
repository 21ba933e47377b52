pub mod vm;

pub use vm::app::{run_emulator_app, run_emulator_headless, run_frame};
pub use vm::config::HostConfig;
pub use vm::cpu::{execute_cycle, execute_instruction, execute_opcode, step, CycleOutcome};
pub use vm::decode::{decode, fetch_opcode, Instruction, OpcodeFields};
pub use vm::error::Chip8Error;
pub use vm::state::{
    clear_display, create_state, load_program, load_rom_file, newly_pressed_key, reset_state,
    set_keys, sound_active, take_frame, ExecutionMode, FrameBuffer, VmState,
};
pub use vm::timer::{advance_timers, tick_timers, TimerClock, TIMER_TICK};
