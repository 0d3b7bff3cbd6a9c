//! rv32sim CLI - run, disassemble and decode RV32 programs.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rv32sim::ImageFormat;
use tracing_subscriber::EnvFilter;

/// rv32sim - a functional simulator for a reduced RV32IM core
#[derive(Parser, Debug)]
#[command(name = "rv32sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program until it exits
    Run {
        /// Program image (ELF, flat binary or hex text)
        #[arg(required = true)]
        program: PathBuf,

        /// Image format (default: detect from contents)
        #[arg(short, long)]
        image: Option<ImageFormat>,

        #[command(flatten)]
        memory: cli::MemoryArgs,

        /// Stop with an error after this many instructions
        #[arg(short, long)]
        max_steps: Option<u64>,

        /// Final state report: none, text, or json
        #[arg(short, long, default_value = "none")]
        report: cli::ReportFormat,
    },

    /// Disassemble the code of a program image
    Disasm {
        /// Program image (ELF, flat binary or hex text)
        #[arg(required = true)]
        program: PathBuf,

        /// Image format (default: detect from contents)
        #[arg(short, long)]
        image: Option<ImageFormat>,

        #[command(flatten)]
        memory: cli::MemoryArgs,
    },

    /// Decode instruction words given in hex
    Decode {
        /// Instruction words, e.g. 0x002081b3
        #[arg(required = true)]
        words: Vec<String>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        Commands::Run {
            program,
            image,
            memory,
            max_steps,
            report,
        } => cli::run::execute(&program, image, &memory, max_steps, report),

        Commands::Disasm {
            program,
            image,
            memory,
        } => cli::disasm::execute(&program, image, &memory).map(|()| ExitCode::SUCCESS),

        Commands::Decode { words } => cli::decode::execute(&words).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
