#![no_main]

use std::io;

use libfuzzer_sys::fuzz_target;
use rv32sim::loader::{self, ImageFormat};
use rv32sim::{ConsoleSyscalls, SimConfig};

fuzz_target!(|data: &[u8]| {
    let config = SimConfig {
        memory_size: 0x1_0000,
        ..SimConfig::default()
    };

    // Any image in any format either loads or reports an error
    let format = ImageFormat::detect(data);
    let Ok(program) = loader::load(data, format, &config) else {
        return;
    };

    let mut vm = program.into_vm(ConsoleSyscalls::new(io::sink()));
    if let Ok(summary) = vm.run(Some(10_000)) {
        assert!(summary.steps <= 10_000);
    }
    assert_eq!(vm.cpu.read_reg(0), 0);
});
