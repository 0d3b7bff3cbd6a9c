//! Run command implementation.

use std::path::Path;
use std::process::ExitCode;

use rv32sim::{ConsoleSyscalls, ImageFormat, RunExit, loader};
use tracing::info;

use super::output::{JsonReport, format_text};
use super::{CliError, MemoryArgs, ReportFormat};

/// Execute the run command.
///
/// The process exit status is the program's exit code.
///
/// # Errors
///
/// Returns an error if the program cannot be loaded, traps, or exceeds its
/// step budget.
pub(crate) fn execute(
    program: &Path,
    image: Option<ImageFormat>,
    memory: &MemoryArgs,
    max_steps: Option<u64>,
    report: ReportFormat,
) -> Result<ExitCode, CliError> {
    let config = memory.resolve(max_steps)?;
    let loaded = loader::load_file(program, image, &config)?;
    info!(
        program = %program.display(),
        format = ?loaded.format,
        entry = loaded.cpu.pc,
        "loaded program"
    );

    let mut vm = loaded.into_vm(ConsoleSyscalls::stdout());
    let result = vm.run(config.max_steps);

    let (exit, trap) = match &result {
        Ok(summary) => (Some(summary.exit), None),
        Err(cause) => (None, Some(cause.to_string())),
    };
    print_report(report, &JsonReport::new(&vm.cpu, vm.steps(), exit, trap))?;

    match result {
        Ok(summary) => match summary.exit {
            RunExit::Halted { code } => Ok(exit_code(code)),
            RunExit::StepLimit => Err(CliError::StepLimit(summary.steps)),
        },
        Err(cause) => Err(CliError::Trap { cause, pc: vm.cpu.pc }),
    }
}

/// Reports go to stderr so they never mix with the program's console.
fn print_report(format: ReportFormat, report: &JsonReport) -> Result<(), CliError> {
    match format {
        ReportFormat::None => {}
        ReportFormat::Text => eprint!("{}", format_text(report)),
        ReportFormat::Json => eprintln!("{}", serde_json::to_string_pretty(report)?),
    }
    Ok(())
}

/// Map an exit code to a process status, keeping the low byte.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code as u8)
}
