use std::path::PathBuf;

use clap::Parser;
use log::info;

use chip8_vm::{run_emulator_app, Chip8Error, HostConfig};

#[derive(Debug, Parser)]
#[command(name = "chip8-vm")]
#[command(about = "Run a CHIP-8 program")]
#[command(long_about = "Run a CHIP-8 program.\n\n\
    Window scale, cycles per frame and frame rate are read from CHIP8_SCALE, \
    CHIP8_CYCLES_PER_FRAME and CHIP8_FPS. Logging follows RUST_LOG.")]
struct Args {
    /// ROM image, loaded verbatim at 0x200
    #[arg(default_value = "roms/2-ibm-logo.ch8")]
    rom: PathBuf,
}

fn main() -> Result<(), Chip8Error> {
    pretty_env_logger::init();

    let args = Args::parse();
    let config = HostConfig::from_env()?;
    info!("host config: {config:?}");

    let state = run_emulator_app(&args.rom, config)?;
    info!("stopped at pc={:#05x}", state.pc);
    Ok(())
}
