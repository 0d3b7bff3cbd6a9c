//! Benchmarks for the RV32 simulator.

#![allow(missing_docs)] // Benchmark macros generate undocumented functions
#![allow(clippy::unreadable_literal)] // Instruction encodings are standard hex

use std::hint::black_box;
use std::io;

use criterion::{Criterion, criterion_group, criterion_main};
use rv32sim::isa::{decode, encode};
use rv32sim::{ConsoleSyscalls, Vm};

const MEMORY_SIZE: u32 = 65536;

type BenchVm = Vm<ConsoleSyscalls<io::Sink>>;

/// Memory filled with `addi x1, x1, 1`.
fn addi_vm() -> BenchVm {
    let mut vm = Vm::new(MEMORY_SIZE, 0, ConsoleSyscalls::new(io::sink()));
    let addi_x1 = encode::addi(1, 1, 1);
    for addr in (0..MEMORY_SIZE).step_by(4) {
        let _ = vm.memory.store_u32(addr, addi_x1);
    }
    vm
}

fn bench_step(c: &mut Criterion) {
    let mut vm = addi_vm();

    c.bench_function("step_addi", |b| {
        b.iter(|| {
            vm.cpu.pc = 0;
            for _ in 0..1000 {
                let _ = black_box(vm.step());
            }
        });
    });
}

fn bench_run(c: &mut Criterion) {
    let mut vm = addi_vm();

    c.bench_function("run_10k", |b| {
        b.iter(|| {
            vm.cpu.pc = 0;
            let _ = black_box(vm.run(Some(10_000)));
        });
    });
}

fn bench_loop(c: &mut Criterion) {
    // t0 = 1000; loop: t1 += t0; t0 -= 1; bne t0, x0, loop; spin
    let program = [
        encode::addi(5, 0, 1000),
        encode::add(6, 6, 5),
        encode::addi(5, 5, -1),
        encode::bne(5, 0, -8),
        encode::jal(0, 0),
    ];
    let mut vm = Vm::new(MEMORY_SIZE, 0, ConsoleSyscalls::new(io::sink()));
    for (addr, word) in (0u32..).step_by(4).zip(program) {
        let _ = vm.memory.store_u32(addr, word);
    }

    c.bench_function("sum_loop_1000", |b| {
        b.iter(|| {
            vm.cpu.pc = 0;
            vm.cpu.write_reg(6, 0);
            let _ = black_box(vm.run(Some(3001)));
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let instructions = [
        encode::addi(1, 1, 1),
        encode::add(3, 1, 2),
        encode::beq(1, 2, 8),
        encode::jal(0, 0),
        encode::lw(5, 2, 8),
    ];

    c.bench_function("decode_1000", |b| {
        b.iter(|| {
            for _ in 0..200 {
                for inst in &instructions {
                    let _ = black_box(decode(*inst));
                }
            }
        });
    });
}

fn bench_disasm(c: &mut Criterion) {
    let inst = decode(0x002081B3).ok();

    c.bench_function("disasm_add", |b| {
        b.iter(|| black_box(inst.map(|i| i.to_string())));
    });
}

criterion_group!(benches, bench_step, bench_run, bench_loop, bench_decode, bench_disasm);
criterion_main!(benches);
