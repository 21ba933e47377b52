use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug)]
pub enum Chip8Error {
    RomLoad {
        path: PathBuf,
        source: std::io::Error,
    },
    RomTooLarge {
        size: usize,
        max: usize,
    },
    ProgramCounterOutOfBounds(u16),
    StackOverflow {
        pc: u16,
    },
    StackUnderflow {
        pc: u16,
    },
    InvalidArgument(&'static str),
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RomLoad { path, source } => {
                write!(f, "failed to read ROM {}: {source}", path.display())
            }
            Self::RomTooLarge { size, max } => {
                write!(f, "ROM too large: {size} bytes (max {max})")
            }
            Self::ProgramCounterOutOfBounds(pc) => {
                write!(f, "program counter exceeded program memory: 0x{pc:03x}")
            }
            Self::StackOverflow { pc } => {
                write!(f, "call with full stack at 0x{pc:03x}")
            }
            Self::StackUnderflow { pc } => {
                write!(f, "return instruction with empty stack at 0x{pc:03x}")
            }
            Self::InvalidArgument(argument) => write!(f, "invalid argument: {argument}"),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RomLoad { source, .. } => Some(source),
            _ => None,
        }
    }
}
