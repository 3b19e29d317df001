use std::fmt;

use num_enum::IntoPrimitive;
use num_enum::TryFromPrimitive;

use crate::errors::DecodeFault;
use crate::memory::Int;
use crate::registers::Register;

macro_rules! opcodes {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Defines the instruction mnemonics
        /// Operands are registers, memory addresses or immediate integers
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive, IntoPrimitive)]
        pub enum Opcode {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl Opcode {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl fmt::Display for Opcode {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Self::$name => f.write_str(stringify!($name)) , )+
                }
            }
        }
    }
}

opcodes! {
    /// Terminate the run normally
    END = 0x00,
    /// Emit the value of a register to the output sink
    /// @param reg The register to emit
    PRINT = 0x05,
    /// Load a memory cell into a register
    /// @param reg The destination register
    /// @param addr The cell address
    LOADA = 0x10,
    /// Load the memory cell addressed by register A into a register
    /// @param reg The destination register
    LOAD = 0x11,
    /// Load an immediate value into a register
    /// @param reg The destination register
    /// @param imm The value to load
    LOADI = 0x12,
    /// Store a register into a memory cell
    /// @param reg The source register
    /// @param addr The cell address
    STOREA = 0x13,
    /// Store a register into the memory cell addressed by register A
    /// @param reg The source register
    STORE = 0x14,
    /// Copy one register into another
    /// @param src The source register
    /// @param dst The destination register
    MOVE = 0x15,
    /// Add an immediate value to a register
    /// @param reg The register to add to
    /// @param imm The value to add
    ADDI = 0x20,
    /// Add two registers into a destination register
    ADD = 0x21,
    /// Subtract the second register from the first into a destination register
    SUB = 0x22,
    /// Multiply two registers into a destination register
    MUL = 0x23,
    /// Divide the first register by the second into a destination register
    /// Integer division, truncating toward zero
    DIV = 0x24,
    /// Jump to an instruction index
    /// @param target The index to jump to
    JMP = 0x40,
    /// Jump to the instruction index held in a register
    /// @param reg The register holding the index
    JMPR = 0x41,
    /// Jump to an instruction index if a register is zero
    JZ = 0x42,
    /// Jump to an instruction index if the first register is less than the second
    JLT = 0x43,
}

impl Opcode {
    /// Number of operands the instruction takes.
    pub fn arity(&self) -> usize {
        match self {
            Opcode::END => 0,
            Opcode::PRINT | Opcode::LOAD | Opcode::STORE | Opcode::JMP | Opcode::JMPR => 1,
            Opcode::LOADA
            | Opcode::LOADI
            | Opcode::STOREA
            | Opcode::MOVE
            | Opcode::ADDI
            | Opcode::JZ => 2,
            Opcode::ADD | Opcode::SUB | Opcode::MUL | Opcode::DIV | Opcode::JLT => 3,
        }
    }
}

/// A decoded instruction: opcode plus typed operands.
///
/// Produced by [`Instruction::decode`] once per fetch-decode-execute
/// step and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// reg ← memory\[addr\]
    Loada { reg: Register, addr: Int },
    /// reg ← memory\[A\]
    Load { reg: Register },
    /// reg ← imm
    Loadi { reg: Register, imm: Int },
    /// memory\[addr\] ← reg
    Storea { reg: Register, addr: Int },
    /// memory\[A\] ← reg
    Store { reg: Register },
    /// dst ← src
    Move { src: Register, dst: Register },
    /// reg ← reg + imm
    Addi { reg: Register, imm: Int },
    /// dst ← lhs + rhs
    Add { lhs: Register, rhs: Register, dst: Register },
    /// dst ← lhs − rhs
    Sub { lhs: Register, rhs: Register, dst: Register },
    /// dst ← lhs × rhs
    Mul { lhs: Register, rhs: Register, dst: Register },
    /// dst ← lhs ÷ rhs
    Div { lhs: Register, rhs: Register, dst: Register },
    /// P ← target
    Jmp { target: Int },
    /// P ← reg
    Jmpr { reg: Register },
    /// if reg == 0 then P ← target
    Jz { reg: Register, target: Int },
    /// if lhs < rhs then P ← target
    Jlt { lhs: Register, rhs: Register, target: Int },
    /// Emit reg to the output sink
    Print { reg: Register },
    /// Terminate the run normally
    End,
}

impl Instruction {
    /// Decodes one whitespace-split source line into an instruction.
    ///
    /// Validates the mnemonic, the operand count and the operand kinds
    /// against the closed instruction set. Memory-address *range*
    /// checks are left to execute time.
    pub fn decode<T: AsRef<str>>(tokens: &[T]) -> Result<Self, DecodeFault> {
        let mnemonic = tokens.first().map(AsRef::as_ref).unwrap_or("");

        let opcode = Opcode::ALL
            .iter()
            .copied()
            .find(|opcode| mnemonic == opcode.name())
            .ok_or_else(|| DecodeFault::UnknownOpcode {
                mnemonic: mnemonic.to_owned(),
            })?;

        let operands = &tokens[1..];
        if operands.len() != opcode.arity() {
            return Err(DecodeFault::WrongOperandCount {
                opcode,
                expected: opcode.arity(),
                found: operands.len(),
            });
        }

        let instruction = match opcode {
            Opcode::LOADA => Instruction::Loada {
                reg: register(&operands[0])?,
                addr: integer(&operands[1])?,
            },
            Opcode::LOAD => Instruction::Load {
                reg: register(&operands[0])?,
            },
            Opcode::LOADI => Instruction::Loadi {
                reg: register(&operands[0])?,
                imm: integer(&operands[1])?,
            },
            Opcode::STOREA => Instruction::Storea {
                reg: register(&operands[0])?,
                addr: integer(&operands[1])?,
            },
            Opcode::STORE => Instruction::Store {
                reg: register(&operands[0])?,
            },
            Opcode::MOVE => Instruction::Move {
                src: register(&operands[0])?,
                dst: register(&operands[1])?,
            },
            Opcode::ADDI => Instruction::Addi {
                reg: register(&operands[0])?,
                imm: integer(&operands[1])?,
            },
            Opcode::ADD => Instruction::Add {
                lhs: register(&operands[0])?,
                rhs: register(&operands[1])?,
                dst: register(&operands[2])?,
            },
            Opcode::SUB => Instruction::Sub {
                lhs: register(&operands[0])?,
                rhs: register(&operands[1])?,
                dst: register(&operands[2])?,
            },
            Opcode::MUL => Instruction::Mul {
                lhs: register(&operands[0])?,
                rhs: register(&operands[1])?,
                dst: register(&operands[2])?,
            },
            Opcode::DIV => Instruction::Div {
                lhs: register(&operands[0])?,
                rhs: register(&operands[1])?,
                dst: register(&operands[2])?,
            },
            Opcode::JMP => Instruction::Jmp {
                target: integer(&operands[0])?,
            },
            Opcode::JMPR => Instruction::Jmpr {
                reg: register(&operands[0])?,
            },
            Opcode::JZ => Instruction::Jz {
                reg: register(&operands[0])?,
                target: integer(&operands[1])?,
            },
            Opcode::JLT => Instruction::Jlt {
                lhs: register(&operands[0])?,
                rhs: register(&operands[1])?,
                target: integer(&operands[2])?,
            },
            Opcode::PRINT => Instruction::Print {
                reg: register(&operands[0])?,
            },
            Opcode::END => Instruction::End,
        };

        Ok(instruction)
    }
}

/// Resolves a token against the closed register set.
fn register<T: AsRef<str>>(token: &T) -> Result<Register, DecodeFault> {
    let token = token.as_ref();

    Register::ALL
        .iter()
        .copied()
        .find(|register| token == register.name())
        .ok_or_else(|| DecodeFault::InvalidRegister {
            token: token.to_owned(),
        })
}

/// Parses a token as an address or immediate.
fn integer<T: AsRef<str>>(token: &T) -> Result<Int, DecodeFault> {
    let token = token.as_ref();

    token.parse().map_err(|_| DecodeFault::InvalidAddress {
        token: token.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_loadi() -> Result<(), DecodeFault> {
        assert_eq!(
            Instruction::decode(&["LOADI", "A", "5"])?,
            Instruction::Loadi {
                reg: Register::A,
                imm: 5
            }
        );

        Ok(())
    }

    #[test]
    fn test_decode_negative_immediate() -> Result<(), DecodeFault> {
        assert_eq!(
            Instruction::decode(&["ADDI", "X", "-1"])?,
            Instruction::Addi {
                reg: Register::X,
                imm: -1
            }
        );

        Ok(())
    }

    #[test]
    fn test_decode_three_operands() -> Result<(), DecodeFault> {
        assert_eq!(
            Instruction::decode(&["DIV", "A", "B", "C"])?,
            Instruction::Div {
                lhs: Register::A,
                rhs: Register::B,
                dst: Register::C,
            }
        );

        Ok(())
    }

    #[test]
    fn test_decode_end() -> Result<(), DecodeFault> {
        assert_eq!(Instruction::decode(&["END"])?, Instruction::End);

        Ok(())
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            Instruction::decode(&["HCF"]),
            Err(DecodeFault::UnknownOpcode {
                mnemonic: "HCF".to_owned()
            })
        );
    }

    #[test]
    fn test_mnemonics_are_case_sensitive() {
        assert!(matches!(
            Instruction::decode(&["loadi", "A", "5"]),
            Err(DecodeFault::UnknownOpcode { .. })
        ));
    }

    #[test]
    fn test_wrong_operand_count() {
        assert_eq!(
            Instruction::decode(&["ADD", "A", "B"]),
            Err(DecodeFault::WrongOperandCount {
                opcode: Opcode::ADD,
                expected: 3,
                found: 2,
            })
        );
        assert!(matches!(
            Instruction::decode(&["END", "A"]),
            Err(DecodeFault::WrongOperandCount { .. })
        ));
    }

    #[test]
    fn test_invalid_register() {
        assert_eq!(
            Instruction::decode(&["PRINT", "Q"]),
            Err(DecodeFault::InvalidRegister {
                token: "Q".to_owned()
            })
        );
    }

    #[test]
    fn test_malformed_address() {
        assert_eq!(
            Instruction::decode(&["JMP", "start"]),
            Err(DecodeFault::InvalidAddress {
                token: "start".to_owned()
            })
        );
    }

    #[test]
    fn test_register_validated_before_address() {
        // Operand kinds are checked left to right.
        assert!(matches!(
            Instruction::decode(&["LOADA", "Q", "nope"]),
            Err(DecodeFault::InvalidRegister { .. })
        ));
    }
}
