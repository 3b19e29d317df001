use color_eyre::eyre::Result;

use asmvm::memory::StdMem;
use asmvm::processor::{Processor, StdoutSink};
use asmvm::program;
use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap(); // logging

    let program = program![
        "LOADI A 5",
        "JZ A 5",
        "PRINT A",
        "ADDI A -1",
        "JMP 1",
        "END"
    ];

    let mut cpu = Processor::new();
    let mut mem = StdMem::default();

    cpu.run(&program, &mut mem, &mut StdoutSink);

    Ok(())
}
