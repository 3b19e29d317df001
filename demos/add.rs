use color_eyre::eyre::Result;

use asmvm::memory::StdMem;
use asmvm::processor::{Processor, StdoutSink};
use asmvm::program;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let program = program![
        "LOADI A 5",
        "LOADI B 0",
        "ADD A B C",
        "PRINT C",
        "END"
    ];

    let mut cpu = Processor::new();
    let mut mem = StdMem::default();

    cpu.run(&program, &mut mem, &mut StdoutSink);

    Ok(())
}
