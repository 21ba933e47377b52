use std::env;

use crate::vm::error::Chip8Error;

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: usize = 0x200;
pub const FONT_START: usize = 0x050;
pub const FONT_GLYPH_HEIGHT: usize = 5;
pub const REGISTER_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const STACK_DEPTH: usize = 16;
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const TIMER_HZ: u32 = 60;

/// Hex digits 0-F, 4 pixels wide (high nibble) and 5 rows tall.
pub const FONT_BYTES: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub const SCALE_VAR: &str = "CHIP8_SCALE";
pub const CYCLES_PER_FRAME_VAR: &str = "CHIP8_CYCLES_PER_FRAME";
pub const FPS_VAR: &str = "CHIP8_FPS";

/// Tuning for the windowed host. None of it affects instruction semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    pub scale: usize,
    pub cycles_per_frame: usize,
    pub target_fps: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            scale: 12,
            cycles_per_frame: 1,
            target_fps: 60,
        }
    }
}

impl HostConfig {
    pub fn from_env() -> Result<Self, Chip8Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Chip8Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            scale: read_positive(&lookup, SCALE_VAR, defaults.scale)?,
            cycles_per_frame: read_positive(
                &lookup,
                CYCLES_PER_FRAME_VAR,
                defaults.cycles_per_frame,
            )?,
            target_fps: read_positive(&lookup, FPS_VAR, defaults.target_fps)?,
        };
        config.window_size()?;
        Ok(config)
    }

    /// Window dimensions in pixels. Fails when the scale overflows the backend's `i32` sizes.
    pub fn window_size(&self) -> Result<(i32, i32), Chip8Error> {
        let scaled = |cells: usize| {
            cells
                .checked_mul(self.scale)
                .and_then(|pixels| i32::try_from(pixels).ok())
                .ok_or(Chip8Error::InvalidArgument(SCALE_VAR))
        };
        Ok((scaled(SCREEN_WIDTH)?, scaled(SCREEN_HEIGHT)?))
    }
}

fn read_positive<F>(lookup: &F, name: &'static str, default: usize) -> Result<usize, Chip8Error>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };

    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(Chip8Error::InvalidArgument(name)),
        Ok(value) => Ok(value),
    }
}
