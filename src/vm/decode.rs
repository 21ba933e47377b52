use crate::vm::config::MEMORY_SIZE;
use crate::vm::error::Chip8Error;

/// Every operand field of an opcode, extracted whether the instruction uses it or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeFields {
    pub opcode: u16,
    pub x: usize,
    pub y: usize,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl OpcodeFields {
    pub fn from_opcode(opcode: u16) -> Self {
        Self {
            opcode,
            x: ((opcode & 0x0F00) >> 8) as usize,
            y: ((opcode & 0x00F0) >> 4) as usize,
            n: (opcode & 0x000F) as u8,
            nn: (opcode & 0x00FF) as u8,
            nnn: opcode & 0x0FFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0NNN, a call into native code on the original machines. Ignored.
    MachineCall { address: u16 },
    ClearScreen,
    Return,
    Jump { address: u16 },
    Call { address: u16 },
    SkipIfEqual { x: usize, value: u8 },
    SkipIfNotEqual { x: usize, value: u8 },
    SkipIfRegistersEqual { x: usize, y: usize },
    LoadImmediate { x: usize, value: u8 },
    AddImmediate { x: usize, value: u8 },
    Copy { x: usize, y: usize },
    Or { x: usize, y: usize },
    And { x: usize, y: usize },
    Xor { x: usize, y: usize },
    AddWithCarry { x: usize, y: usize },
    Subtract { x: usize, y: usize },
    ShiftRight { x: usize, y: usize },
    SubtractReversed { x: usize, y: usize },
    ShiftLeft { x: usize, y: usize },
    SkipIfRegistersNotEqual { x: usize, y: usize },
    LoadIndex { address: u16 },
    JumpWithOffset { address: u16 },
    Random { x: usize, mask: u8 },
    Draw { x: usize, y: usize, height: u8 },
    SkipIfKeyDown { x: usize },
    SkipIfKeyUp { x: usize },
    LoadDelayTimer { x: usize },
    AwaitKey { x: usize },
    SetDelayTimer { x: usize },
    SetSoundTimer { x: usize },
    AddToIndex { x: usize },
    LoadGlyphAddress { x: usize },
    StoreBcd { x: usize },
    StoreRegisters { x: usize },
    LoadRegisters { x: usize },
}

/// Big-endian word at `pc`. Both bytes must lie inside memory.
pub fn fetch_opcode(memory: &[u8; MEMORY_SIZE], pc: u16) -> Result<u16, Chip8Error> {
    let address = pc as usize;
    if address > MEMORY_SIZE - 2 {
        return Err(Chip8Error::ProgramCounterOutOfBounds(pc));
    }

    Ok(u16::from_be_bytes([memory[address], memory[address + 1]]))
}

/// Returns `None` for opcodes outside the instruction set.
pub fn decode(opcode: u16) -> Option<Instruction> {
    let OpcodeFields {
        x, y, n, nn, nnn, ..
    } = OpcodeFields::from_opcode(opcode);

    let instruction = match opcode {
        0x00E0 => Instruction::ClearScreen,
        0x00EE => Instruction::Return,
        _ => match opcode & 0xF000 {
            0x0000 => Instruction::MachineCall { address: nnn },
            0x1000 => Instruction::Jump { address: nnn },
            0x2000 => Instruction::Call { address: nnn },
            0x3000 => Instruction::SkipIfEqual { x, value: nn },
            0x4000 => Instruction::SkipIfNotEqual { x, value: nn },
            0x5000 if n == 0 => Instruction::SkipIfRegistersEqual { x, y },
            0x6000 => Instruction::LoadImmediate { x, value: nn },
            0x7000 => Instruction::AddImmediate { x, value: nn },
            0x8000 => decode_family_8(opcode, x, y)?,
            0x9000 if n == 0 => Instruction::SkipIfRegistersNotEqual { x, y },
            0xA000 => Instruction::LoadIndex { address: nnn },
            0xB000 => Instruction::JumpWithOffset { address: nnn },
            0xC000 => Instruction::Random { x, mask: nn },
            0xD000 => Instruction::Draw { x, y, height: n },
            0xE000 => match opcode & 0xF0FF {
                0xE09E => Instruction::SkipIfKeyDown { x },
                0xE0A1 => Instruction::SkipIfKeyUp { x },
                _ => return None,
            },
            0xF000 => decode_family_f(opcode, x)?,
            _ => return None,
        },
    };

    Some(instruction)
}

fn decode_family_8(opcode: u16, x: usize, y: usize) -> Option<Instruction> {
    let instruction = match opcode & 0xF00F {
        0x8000 => Instruction::Copy { x, y },
        0x8001 => Instruction::Or { x, y },
        0x8002 => Instruction::And { x, y },
        0x8003 => Instruction::Xor { x, y },
        0x8004 => Instruction::AddWithCarry { x, y },
        0x8005 => Instruction::Subtract { x, y },
        0x8006 => Instruction::ShiftRight { x, y },
        0x8007 => Instruction::SubtractReversed { x, y },
        0x800E => Instruction::ShiftLeft { x, y },
        _ => return None,
    };
    Some(instruction)
}

fn decode_family_f(opcode: u16, x: usize) -> Option<Instruction> {
    let instruction = match opcode & 0xF0FF {
        0xF007 => Instruction::LoadDelayTimer { x },
        0xF00A => Instruction::AwaitKey { x },
        0xF015 => Instruction::SetDelayTimer { x },
        0xF018 => Instruction::SetSoundTimer { x },
        0xF01E => Instruction::AddToIndex { x },
        0xF029 => Instruction::LoadGlyphAddress { x },
        0xF033 => Instruction::StoreBcd { x },
        0xF055 => Instruction::StoreRegisters { x },
        0xF065 => Instruction::LoadRegisters { x },
        _ => return None,
    };
    Some(instruction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_follow_fixed_masks() {
        let fields = OpcodeFields::from_opcode(0xD123);
        assert_eq!(fields.x, 1);
        assert_eq!(fields.y, 2);
        assert_eq!(fields.n, 3);
        assert_eq!(fields.nn, 0x23);
        assert_eq!(fields.nnn, 0x123);
    }

    #[test]
    fn fields_match_masks_for_every_opcode() {
        for opcode in 0..=u16::MAX {
            let fields = OpcodeFields::from_opcode(opcode);
            assert_eq!(fields.x as u16, (opcode >> 8) & 0xF);
            assert_eq!(fields.y as u16, (opcode >> 4) & 0xF);
            assert_eq!(fields.n as u16, opcode & 0xF);
            assert_eq!(fields.nn as u16, opcode & 0xFF);
            assert_eq!(fields.nnn, opcode & 0xFFF);
        }
    }

    #[test]
    fn decodes_each_family() {
        assert_eq!(decode(0x00E0), Some(Instruction::ClearScreen));
        assert_eq!(decode(0x00EE), Some(Instruction::Return));
        assert_eq!(
            decode(0x0123),
            Some(Instruction::MachineCall { address: 0x123 })
        );
        assert_eq!(decode(0x1ABC), Some(Instruction::Jump { address: 0xABC }));
        assert_eq!(decode(0x2ABC), Some(Instruction::Call { address: 0xABC }));
        assert_eq!(
            decode(0x8AB4),
            Some(Instruction::AddWithCarry { x: 0xA, y: 0xB })
        );
        assert_eq!(
            decode(0x8ABE),
            Some(Instruction::ShiftLeft { x: 0xA, y: 0xB })
        );
        assert_eq!(
            decode(0xD125),
            Some(Instruction::Draw {
                x: 1,
                y: 2,
                height: 5
            })
        );
        assert_eq!(decode(0xE59E), Some(Instruction::SkipIfKeyDown { x: 5 }));
        assert_eq!(decode(0xE5A1), Some(Instruction::SkipIfKeyUp { x: 5 }));
        assert_eq!(decode(0xF30A), Some(Instruction::AwaitKey { x: 3 }));
        assert_eq!(decode(0xF365), Some(Instruction::LoadRegisters { x: 3 }));
    }

    #[test]
    fn unmatched_opcodes_decode_to_none() {
        for opcode in [0x5121, 0x912F, 0x8008, 0x800D, 0xE000, 0xE19F, 0xF000, 0xF0FF] {
            assert_eq!(decode(opcode), None, "opcode {opcode:#06x}");
        }
    }

    #[test]
    fn every_family_member_is_recognised() {
        let recognised = (0..=u16::MAX).filter(|op| decode(*op).is_some()).count();
        // 0x0/1/2/3/4/6/7/A/B/C/D families are fully populated (11 * 4096),
        // 5XY0 and 9XY0 take 256 each, 8XY_ has 9 forms, EX__ 2, FX__ 9.
        let expected = 11 * 4096 + 2 * 256 + 9 * 256 + 2 * 16 + 9 * 16;
        assert_eq!(recognised, expected);
    }

    #[test]
    fn fetch_is_big_endian_and_bounded() {
        let mut memory = [0u8; MEMORY_SIZE];
        memory[0x200] = 0xA2;
        memory[0x201] = 0x2A;
        assert_eq!(fetch_opcode(&memory, 0x200).unwrap(), 0xA22A);
        assert!(fetch_opcode(&memory, 0xFFE).is_ok());
        assert!(matches!(
            fetch_opcode(&memory, 0xFFF),
            Err(Chip8Error::ProgramCounterOutOfBounds(0xFFF))
        ));
    }
}
