use std::fmt::Display;

use num_enum::TryFromPrimitive;
use thiserror::Error;

#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, TryFromPrimitive)]
pub enum Opcode {
    Constant,
    Add,
    Sub,
    Mul,
    Div,
    Pop,
    True,
    False,
    Equal,
    NotEqual,
    GreaterThan,
    Minus,
    Bang,
    JumpNotTruthy,
    Jump,
    Null,
    GetGlobal,
    SetGlobal,
    Array,
    Hash,
    Index,
}

/// Name and operand layout of an opcode. Widths are in bytes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Definition {
    pub name: &'static str,
    pub operand_widths: &'static [usize],
}

impl Definition {
    const fn new(name: &'static str, operand_widths: &'static [usize]) -> Self {
        Definition {
            name,
            operand_widths,
        }
    }

    /// Bytes taken by the operands, not counting the opcode.
    pub fn operands_len(&self) -> usize {
        self.operand_widths.iter().sum()
    }
}

impl Opcode {
    pub fn definition(self) -> Definition {
        match self {
            Opcode::Constant => Definition::new("OpConstant", &[2]),
            Opcode::Add => Definition::new("OpAdd", &[]),
            Opcode::Sub => Definition::new("OpSub", &[]),
            Opcode::Mul => Definition::new("OpMul", &[]),
            Opcode::Div => Definition::new("OpDiv", &[]),
            Opcode::Pop => Definition::new("OpPop", &[]),
            Opcode::True => Definition::new("OpTrue", &[]),
            Opcode::False => Definition::new("OpFalse", &[]),
            Opcode::Equal => Definition::new("OpEqual", &[]),
            Opcode::NotEqual => Definition::new("OpNotEqual", &[]),
            Opcode::GreaterThan => Definition::new("OpGreaterThan", &[]),
            Opcode::Minus => Definition::new("OpMinus", &[]),
            Opcode::Bang => Definition::new("OpBang", &[]),
            Opcode::JumpNotTruthy => Definition::new("OpJumpNotTruthy", &[2]),
            Opcode::Jump => Definition::new("OpJump", &[2]),
            Opcode::Null => Definition::new("OpNull", &[]),
            Opcode::GetGlobal => Definition::new("OpGetGlobal", &[2]),
            Opcode::SetGlobal => Definition::new("OpSetGlobal", &[2]),
            Opcode::Array => Definition::new("OpArray", &[2]),
            Opcode::Hash => Definition::new("OpHash", &[2]),
            Opcode::Index => Definition::new("OpIndex", &[]),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum CodeError {
    #[error("opcode {0} undefined")]
    UndefinedOpcode(u8),
    #[error("unexpected end of instructions")]
    UnexpectedEnd,
}

pub fn lookup(op: u8) -> Result<Opcode, CodeError> {
    Opcode::try_from(op).map_err(|_| CodeError::UndefinedOpcode(op))
}

/// Encodes one instruction. Operands past the definition are ignored and
/// missing ones are written as zero; each is truncated to its width.
pub fn make(op: Opcode, operands: &[usize]) -> Instructions {
    let definition = op.definition();
    let mut bytes = Vec::with_capacity(1 + definition.operands_len());
    bytes.push(op as u8);

    for (i, &width) in definition.operand_widths.iter().enumerate() {
        let operand = operands.get(i).copied().unwrap_or(0);
        match width {
            1 => bytes.push(operand as u8),
            2 => bytes.extend_from_slice(&(operand as u16).to_be_bytes()),
            _ => unreachable!("operand width {width} in the opcode table"),
        }
    }

    Instructions { bytes }
}

/// Decodes the operands that follow an opcode, returning them together with
/// the number of bytes they took.
pub fn read_operands(
    definition: &Definition,
    bytes: &[u8],
) -> Result<(Vec<usize>, usize), CodeError> {
    let mut operands = Vec::with_capacity(definition.operand_widths.len());
    let mut offset = 0;

    for &width in definition.operand_widths {
        let operand = match width {
            1 => bytes.get(offset).copied().map(usize::from),
            2 => bytes.get(offset..).and_then(read_u16).map(usize::from),
            _ => unreachable!("operand width {width} in the opcode table"),
        };
        operands.push(operand.ok_or(CodeError::UnexpectedEnd)?);
        offset += width;
    }

    Ok((operands, offset))
}

pub fn read_u16(bytes: &[u8]) -> Option<u16> {
    match bytes {
        [high, low, ..] => Some(u16::from_be_bytes([*high, *low])),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Instructions {
    pub bytes: Vec<u8>,
}

impl Instructions {
    pub fn new() -> Instructions {
        Instructions { bytes: Vec::new() }
    }

    pub fn iter(&self) -> InstructionsIter {
        InstructionsIter {
            instructions: self,
            offset: 0,
            failed: false,
        }
    }

    pub fn push(&mut self, instruction: &Instructions) {
        self.bytes.extend_from_slice(&instruction.bytes);
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl FromIterator<Instructions> for Instructions {
    fn from_iter<T: IntoIterator<Item = Instructions>>(iter: T) -> Self {
        let mut out = Instructions::new();
        for instruction in iter {
            out.push(&instruction);
        }
        out
    }
}

impl Display for Instructions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for item in self.iter() {
            match item {
                Ok(Instruction {
                    offset,
                    op,
                    operands,
                }) => {
                    write!(f, "{:04} {}", offset, op.definition().name)?;
                    for operand in operands {
                        write!(f, " {}", operand)?;
                    }
                    writeln!(f)?;
                }
                Err(error) => writeln!(f, "ERROR: {}", error)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Instruction {
    pub offset: usize,
    pub op: Opcode,
    pub operands: Vec<usize>,
}

/// Decodes one instruction at a time. Stops after the first malformed one.
pub struct InstructionsIter<'a> {
    instructions: &'a Instructions,
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for InstructionsIter<'a> {
    type Item = Result<Instruction, CodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let offset = self.offset;
        let byte = *self.instructions.bytes.get(offset)?;

        let decoded = lookup(byte).and_then(|op| {
            let (operands, read) =
                read_operands(&op.definition(), &self.instructions.bytes[offset + 1..])?;
            Ok((op, operands, read))
        });

        match decoded {
            Ok((op, operands, read)) => {
                self.offset += 1 + read;
                Some(Ok(Instruction {
                    offset,
                    op,
                    operands,
                }))
            }
            Err(error) => {
                self.failed = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_make() {
        let tests = vec![
            (Opcode::Constant, vec![65534], vec![0, 255, 254]),
            (Opcode::Add, vec![], vec![1]),
            (Opcode::JumpNotTruthy, vec![7], vec![13, 0, 7]),
            (Opcode::Hash, vec![2], vec![19, 0, 2]),
            (Opcode::Index, vec![], vec![20]),
        ];

        for (op, operands, expected) in tests {
            assert_eq!(make(op, &operands).bytes, expected, "op: {:?}", op);
        }
    }

    #[test]
    fn test_make_operand_count_mismatch() {
        assert_eq!(make(Opcode::Constant, &[]).bytes, vec![0, 0, 0]);
        assert_eq!(make(Opcode::Pop, &[1, 2]).bytes, vec![5]);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(0), Ok(Opcode::Constant));
        assert_eq!(lookup(20), Ok(Opcode::Index));
        assert_eq!(lookup(21), Err(CodeError::UndefinedOpcode(21)));
        assert_eq!(
            CodeError::UndefinedOpcode(255).to_string(),
            "opcode 255 undefined"
        );
    }

    #[test]
    fn test_read_operands() {
        let tests = vec![
            (Opcode::Constant, vec![65535], 2),
            (Opcode::GetGlobal, vec![300], 2),
            (Opcode::Bang, vec![], 0),
        ];

        for (op, operands, bytes_read) in tests {
            let instruction = make(op, &operands);
            let definition = op.definition();

            let read = read_operands(&definition, &instruction.bytes[1..]);

            assert_eq!(read, Ok((operands, bytes_read)), "op: {:?}", op);
        }

        assert_eq!(
            read_operands(&Opcode::Constant.definition(), &[1]),
            Err(CodeError::UnexpectedEnd)
        );
    }

    #[test]
    fn test_instructions_string() {
        let instructions: Instructions = vec![
            make(Opcode::Add, &[]),
            make(Opcode::Constant, &[2]),
            make(Opcode::Constant, &[65535]),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            instructions.to_string(),
            "0000 OpAdd\n0001 OpConstant 2\n0004 OpConstant 65535\n"
        );
    }

    #[test]
    fn test_disassembly_stops_at_bad_bytes() {
        let mut instructions = make(Opcode::Pop, &[]);
        instructions.bytes.push(99);
        instructions.push(&make(Opcode::Pop, &[]));
        assert_eq!(
            instructions.to_string(),
            "0000 OpPop\nERROR: opcode 99 undefined\n"
        );

        let truncated = Instructions {
            bytes: vec![Opcode::Jump as u8, 0],
        };
        assert_eq!(
            truncated.to_string(),
            "ERROR: unexpected end of instructions\n"
        );
    }

    #[test]
    fn test_every_opcode_round_trips() {
        let opcodes: Vec<Opcode> = (0u8..).map_while(|byte| lookup(byte).ok()).collect();
        assert_eq!(opcodes.len(), 21);
        assert_eq!(lookup(21), Err(CodeError::UndefinedOpcode(21)));

        for op in opcodes {
            let definition = op.definition();
            assert_eq!(lookup(op as u8), Ok(op));

            for value in [0, 65535] {
                let operands = vec![value; definition.operand_widths.len()];
                let instruction = make(op, &operands);

                assert_eq!(instruction.len(), 1 + definition.operands_len(), "op: {:?}", op);
                assert_eq!(instruction.bytes[0], op as u8);
                assert_eq!(
                    read_operands(&definition, &instruction.bytes[1..]),
                    Ok((operands, definition.operands_len())),
                    "op: {:?}",
                    op
                );
            }
        }
    }

    #[test]
    fn test_iter_decodes_offsets() {
        let instructions: Instructions = vec![
            make(Opcode::JumpNotTruthy, &[4]),
            make(Opcode::Null, &[]),
            make(Opcode::Array, &[2]),
        ]
        .into_iter()
        .collect();

        let decoded: Vec<_> = instructions.iter().collect();
        assert_eq!(
            decoded,
            vec![
                Ok(Instruction {
                    offset: 0,
                    op: Opcode::JumpNotTruthy,
                    operands: vec![4],
                }),
                Ok(Instruction {
                    offset: 3,
                    op: Opcode::Null,
                    operands: vec![],
                }),
                Ok(Instruction {
                    offset: 4,
                    op: Opcode::Array,
                    operands: vec![2],
                }),
            ]
        );
        assert_eq!(Instructions::new().iter().count(), 0);
    }
}
