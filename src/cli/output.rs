//! Final-state reports for the `run` command.

use std::fmt::Write as _;

use rv32sim::{Cpu, RunExit};
use serde::Serialize;

/// ABI register names, indexed by register number.
const ABI_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// JSON-serializable run report.
#[derive(Debug, Serialize)]
pub(super) struct JsonReport {
    /// How the run ended; null when it trapped.
    pub(super) exit: Option<RunExit>,
    /// Trap message, if the run trapped.
    pub(super) trap: Option<String>,
    /// Instructions retired.
    pub(super) steps: u64,
    /// Final program counter.
    pub(super) pc: u32,
    /// Final register file, x0 first.
    pub(super) registers: [u32; 32],
}

impl JsonReport {
    /// Capture the final state of a run.
    pub(super) fn new(cpu: &Cpu, steps: u64, exit: Option<RunExit>, trap: Option<String>) -> Self {
        Self {
            exit,
            trap,
            steps,
            pc: cpu.pc,
            registers: *cpu.registers(),
        }
    }
}

/// Format a run report as human-readable text.
pub(super) fn format_text(report: &JsonReport) -> String {
    let mut output = String::new();

    match (&report.exit, &report.trap) {
        (Some(RunExit::Halted { code }), _) => {
            let _ = writeln!(output, "Exited with code {code}");
        }
        (Some(RunExit::StepLimit), _) => output.push_str("Stopped at step limit\n"),
        (None, Some(trap)) => {
            let _ = writeln!(output, "Trapped: {trap}");
        }
        (None, None) => {}
    }
    let _ = writeln!(output, "  Steps: {}", report.steps);
    let _ = writeln!(output, "  PC:    {:#010x}", report.pc);

    for (row, chunk) in report.registers.chunks(4).enumerate() {
        for (col, value) in chunk.iter().enumerate() {
            let index = row * 4 + col;
            let _ = write!(output, "  x{index:<2} {:>4} {value:#010x}", ABI_NAMES[index]);
        }
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_report() {
        let mut cpu = Cpu::with_pc(0x40);
        cpu.write_reg(10, 0xDEAD_BEEF);
        let report = JsonReport::new(&cpu, 17, Some(RunExit::Halted { code: 0 }), None);

        let text = format_text(&report);

        assert!(text.starts_with("Exited with code 0\n"));
        assert!(text.contains("Steps: 17"));
        assert!(text.contains("0x00000040"));
        assert!(text.contains("x10   a0 0xdeadbeef"));
        assert_eq!(text.lines().count(), 3 + 8);
    }

    #[test]
    fn test_json_report() {
        let cpu = Cpu::with_pc(8);
        let report = JsonReport::new(&cpu, 2, None, Some("Invalid Instruction: 0xffffffff".into()));

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["exit"], serde_json::Value::Null);
        assert_eq!(json["pc"], 8);
        assert_eq!(json["registers"].as_array().unwrap().len(), 32);
        assert_eq!(json["trap"], "Invalid Instruction: 0xffffffff");
    }
}
