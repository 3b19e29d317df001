use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::*;

use crate::errors::{ArithmeticFault, Fault, MemoryFault};
use crate::instruction::{Instruction, Opcode};
use crate::memory::{Int, Memory};
use crate::program::Program;
use crate::registers::{Register, Registers};
use crate::reporter::{self, Diagnostic};

/// Instruction budget applied to new processors. Bounds the runtime of
/// looping programs; set [`Processor::step_limit`] to `None` to lift it.
pub const DEFAULT_STEP_LIMIT: u64 = 1_000_000;

/// State of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Mid-run; the next step can be executed
    Running,
    /// The run is over
    Halted(Halt),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// The program reached `END`
    Normal,
    /// A fault was detected and reported
    Fault(Fault),
    /// An external caller requested termination between steps
    Cancelled,
}

/// Output collaborator of `PRINT`: receives one integer per emission.
pub trait Sink {
    fn emit(&mut self, value: Int);
}

/// Collects emitted values in memory.
impl Sink for Vec<Int> {
    fn emit(&mut self, value: Int) {
        self.push(value);
    }
}

/// Writes each emitted value on its own line of standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&mut self, value: Int) {
        println!("{}", value);
    }
}

/// Drives the fetch-decode-execute cycle over a loaded program
#[derive(Debug, Clone)]
pub struct Processor {
    /// The register file, including the program counter
    pub regs: Registers,
    /// Current state of the run
    pub status: Status,
    /// Faults the run after this many executed instructions.
    /// `None` disables the budget.
    pub step_limit: Option<u64>,
    /// Cooperative termination: when the flag reads `true` between two
    /// steps, the run halts as cancelled.
    pub cancel: Option<Arc<AtomicBool>>,
    steps: u64,
    last_diagnostic: Option<Diagnostic>,
}

impl Default for Processor {
    /// Initializes a new processor
    fn default() -> Self {
        Self::new()
    }
}

impl Processor {
    /// Initializes a new processor
    pub fn new() -> Self {
        Self {
            regs: Registers::default(),
            status: Status::Running,
            step_limit: Some(DEFAULT_STEP_LIMIT),
            cancel: None,
            steps: 0,
            last_diagnostic: None,
        }
    }

    /// Number of instructions executed in the current run
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Diagnostic of the fault that halted the current run, if any
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.last_diagnostic.as_ref()
    }

    /// Executes a single decoded instruction
    pub fn execute_instruction<const S: usize>(
        &mut self,
        instruction: Instruction,
        program: &Program,
        memory: &mut Memory<S>,
        sink: &mut dyn Sink,
    ) -> Result<(), Fault> {
        match instruction {
            Instruction::Loada { reg, addr } => {
                let value = memory.read(addr)?;
                self.regs.set(reg, value);
                self.advance()?;

                debug!("LOADA {} {}: {}", reg, addr, value);
            }
            Instruction::Load { reg } => {
                let addr = self.regs.get(Register::A);
                let value = memory.read(addr)?;
                self.regs.set(reg, value);
                self.advance()?;

                debug!("LOAD {} [{}]: {}", reg, addr, value);
            }
            Instruction::Loadi { reg, imm } => {
                self.regs.set(reg, imm);
                self.advance()?;

                debug!("LOADI {} {}", reg, imm);
            }
            Instruction::Storea { reg, addr } => {
                let value = self.regs.get(reg);
                memory.write(addr, value)?;
                self.advance()?;

                debug!("STOREA {} {}: {}", reg, addr, value);
            }
            Instruction::Store { reg } => {
                let addr = self.regs.get(Register::A);
                let value = self.regs.get(reg);
                memory.write(addr, value)?;
                self.advance()?;

                debug!("STORE {} [{}]: {}", reg, addr, value);
            }
            Instruction::Move { src, dst } => {
                let value = self.regs.get(src);
                self.regs.set(dst, value);
                self.advance()?;

                debug!("MOVE {} {}: {}", src, dst, value);
            }
            Instruction::Addi { reg, imm } => {
                let value = self.regs.get(reg);
                let result = value.checked_add(imm).ok_or(ArithmeticFault::Overflow {
                    opcode: Opcode::ADDI,
                    lhs: value,
                    rhs: imm,
                })?;
                self.regs.set(reg, result);
                self.advance()?;

                debug!("ADDI {} {}: {}", value, imm, result);
            }
            Instruction::Add { lhs, rhs, dst } => {
                let a = self.regs.get(lhs);
                let b = self.regs.get(rhs);
                let result = a.checked_add(b).ok_or(ArithmeticFault::Overflow {
                    opcode: Opcode::ADD,
                    lhs: a,
                    rhs: b,
                })?;
                self.regs.set(dst, result);
                self.advance()?;

                debug!("ADD {} {}: {}", a, b, result);
            }
            Instruction::Sub { lhs, rhs, dst } => {
                let a = self.regs.get(lhs);
                let b = self.regs.get(rhs);
                let result = a.checked_sub(b).ok_or(ArithmeticFault::Overflow {
                    opcode: Opcode::SUB,
                    lhs: a,
                    rhs: b,
                })?;
                self.regs.set(dst, result);
                self.advance()?;

                debug!("SUB {} {}: {}", a, b, result);
            }
            Instruction::Mul { lhs, rhs, dst } => {
                let a = self.regs.get(lhs);
                let b = self.regs.get(rhs);
                let result = a.checked_mul(b).ok_or(ArithmeticFault::Overflow {
                    opcode: Opcode::MUL,
                    lhs: a,
                    rhs: b,
                })?;
                self.regs.set(dst, result);
                self.advance()?;

                debug!("MUL {} {}: {}", a, b, result);
            }
            Instruction::Div { lhs, rhs, dst } => {
                let a = self.regs.get(lhs);
                let b = self.regs.get(rhs);
                if b == 0 {
                    return Err(ArithmeticFault::DivideByZero.into());
                }
                // `i32::MIN / -1` does not fit the machine word.
                let result = a.checked_div(b).ok_or(ArithmeticFault::Overflow {
                    opcode: Opcode::DIV,
                    lhs: a,
                    rhs: b,
                })?;
                self.regs.set(dst, result);
                self.advance()?;

                debug!("DIV {} {}: {}", a, b, result);
            }
            Instruction::Jmp { target } => {
                self.jump(program, target)?;

                debug!("JMP {}", target);
            }
            Instruction::Jmpr { reg } => {
                let target = self.regs.get(reg);
                self.jump(program, target)?;

                debug!("JMPR {}: {}", reg, target);
            }
            Instruction::Jz { reg, target } => {
                let value = self.regs.get(reg);
                if value == 0 {
                    self.jump(program, target)?;
                } else {
                    self.advance()?;
                }

                debug!("JZ {} {}: {}", reg, target, value);
            }
            Instruction::Jlt { lhs, rhs, target } => {
                let a = self.regs.get(lhs);
                let b = self.regs.get(rhs);
                if a < b {
                    self.jump(program, target)?;
                } else {
                    self.advance()?;
                }

                debug!("JLT {} {} {}: {} {}", lhs, rhs, target, a, b);
            }
            Instruction::Print { reg } => {
                let value = self.regs.get(reg);
                sink.emit(value);
                self.advance()?;

                info!("{}", value);
            }
            Instruction::End => {
                self.status = Status::Halted(Halt::Normal);
                self.advance()?;

                debug!("END");
            }
        }

        Ok(())
    }

    /// Runs one fetch-decode-execute step
    pub fn step<const S: usize>(
        &mut self,
        program: &Program,
        memory: &mut Memory<S>,
        sink: &mut dyn Sink,
    ) -> Result<(), Fault> {
        if let Some(limit) = self.step_limit {
            if self.steps >= limit {
                return Err(Fault::StepLimitExceeded { limit });
            }
        }
        self.steps += 1;

        let line = program.fetch(self.regs.get(Register::P))?;
        let instruction = Instruction::decode(line.tokens())?;
        self.execute_instruction(instruction, program, memory, sink)
    }

    /// Runs `program` from a clean state until it halts.
    ///
    /// Memory and registers are re-zeroed and `P` starts at 0. Any
    /// fault is handed to the reporter exactly once, then the run
    /// halts; it never continues past a fault.
    pub fn run<const S: usize>(
        &mut self,
        program: &Program,
        memory: &mut Memory<S>,
        sink: &mut dyn Sink,
    ) -> Halt {
        memory.reset();
        self.regs.reset();
        self.steps = 0;
        self.last_diagnostic = None;
        self.status = Status::Running;

        loop {
            if let Status::Halted(halt) = &self.status {
                if let Halt::Normal = halt {
                    info!("program halted normally after {} step(s)", self.steps);
                }
                return halt.clone();
            }

            if self.cancel_requested() {
                self.status = Status::Halted(Halt::Cancelled);
                continue;
            }

            if let Err(fault) = self.step(program, memory, sink) {
                self.last_diagnostic = Some(reporter::report(&fault));
                self.status = Status::Halted(Halt::Fault(fault));
            }
        }
    }

    /// Advances the program counter to the next instruction
    fn advance(&mut self) -> Result<(), Fault> {
        let p = self.regs.get(Register::P);
        let next = p
            .checked_add(1)
            .ok_or(MemoryFault::OutOfBounds { address: p })?;
        self.regs.set(Register::P, next);
        Ok(())
    }

    /// Redirects the program counter. A target outside the program
    /// faults the same step the jump is taken, not at the next fetch.
    fn jump(&mut self, program: &Program, target: Int) -> Result<(), Fault> {
        if !program.contains(target) {
            return Err(MemoryFault::OutOfBounds { address: target }.into());
        }
        self.regs.set(Register::P, target);
        Ok(())
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}
