//! A small virtual machine for an assembly-like language: a single
//! 2048-cell address space, six named registers (`A`, `B`, `C`, `D`,
//! `P`, `X` — `P` is the program counter) and a fetch-decode-execute
//! cycle with explicit, recoverable fault signaling.
//!
//! - [`memory`] — bounds-checked integer cells
//! - [`registers`] — the closed register file
//! - [`instruction`] — mnemonics, typed instructions and the decoder
//! - [`program`] — tokenized source lines addressed by `P`
//! - [`processor`] — the execution engine
//! - [`errors`] — the fault taxonomy
//! - [`reporter`] — turns faults into diagnostics
//!
//! # Example
//! ```
//! use asmvm::memory::StdMem;
//! use asmvm::processor::{Halt, Processor};
//! use asmvm::program;
//!
//! let program = program!["LOADI A 5", "LOADI B 0", "ADD A B C", "PRINT C", "END"];
//!
//! let mut cpu = Processor::new();
//! let mut mem = StdMem::default();
//! let mut out = Vec::new();
//!
//! assert_eq!(cpu.run(&program, &mut mem, &mut out), Halt::Normal);
//! assert_eq!(out, vec![5]);
//! ```

pub mod errors;
pub mod instruction;
pub mod memory;
pub mod processor;
pub mod program;
pub mod registers;
pub mod reporter;
