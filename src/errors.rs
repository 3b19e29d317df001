use thiserror::Error;

use crate::instruction::Opcode;
use crate::memory::Int;

/// Raised while interpreting the raw tokens of an instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFault {
    /// The mnemonic does not name any instruction.
    #[error("no instruction matching `{mnemonic}` was found")]
    UnknownOpcode { mnemonic: String },

    /// The instruction was given the wrong number of operands.
    #[error("{opcode} expects {expected} operand(s), got {found}")]
    WrongOperandCount {
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// The token does not name any register.
    #[error("unknown register `{token}`")]
    InvalidRegister { token: String },

    /// The token is not a well-formed address or immediate.
    #[error("`{token}` is not a valid address or immediate")]
    InvalidAddress { token: String },
}

/// Raised on an access outside the address space, either a memory cell
/// or (for the program counter) an instruction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryFault {
    #[error("address `{address}` is out of bounds")]
    OutOfBounds { address: Int },
}

/// Raised while executing an arithmetic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArithmeticFault {
    /// The result does not fit the machine word.
    #[error("{opcode} overflowed on {lhs} and {rhs}")]
    Overflow { opcode: Opcode, lhs: Int, rhs: Int },

    /// The divisor register held zero.
    #[error("division by zero")]
    DivideByZero,
}

/// Any condition that halts the current run.
///
/// Component faults convert into this type with `?`; the engine hands
/// the value to the reporter and halts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error(transparent)]
    Decode(#[from] DecodeFault),

    #[error(transparent)]
    Memory(#[from] MemoryFault),

    #[error(transparent)]
    Arithmetic(#[from] ArithmeticFault),

    /// The run consumed its instruction budget.
    #[error("exceeded the step limit of {limit} instructions")]
    StepLimitExceeded { limit: u64 },
}

impl Fault {
    /// Short label used by diagnostics to classify the fault.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::Decode(_) => "decode",
            Fault::Memory(_) => "memory",
            Fault::Arithmetic(_) => "arithmetic",
            Fault::StepLimitExceeded { .. } => "limit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;

    #[test]
    fn fault_wraps_component_faults() {
        let fault = Fault::from(MemoryFault::OutOfBounds { address: 2048 });
        assert_eq!(fault.kind(), "memory");
        assert_eq!(fault.to_string(), "address `2048` is out of bounds");
    }

    #[test]
    fn overflow_names_opcode_and_operands() {
        let fault = Fault::from(ArithmeticFault::Overflow {
            opcode: Opcode::MUL,
            lhs: 65536,
            rhs: 65536,
        });
        assert_eq!(fault.kind(), "arithmetic");
        assert_eq!(fault.to_string(), "MUL overflowed on 65536 and 65536");
    }
}
