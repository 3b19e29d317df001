use color_eyre::eyre::{eyre, Result};

use asmvm::memory::StdMem;
use asmvm::processor::{Halt, Processor, StdoutSink};
use asmvm::program::Program;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let program = Program::from_file("demos/programs/sum.asm")?;
    if program.check().is_err() {
        // every bad line was already logged
        return Err(eyre!("program failed to decode"));
    }

    let mut cpu = Processor::new();
    let mut mem = StdMem::default();

    match cpu.run(&program, &mut mem, &mut StdoutSink) {
        Halt::Normal => Ok(()),
        halt => Err(eyre!("run did not finish normally: {:?}", halt)),
    }
}
