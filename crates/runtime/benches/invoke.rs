// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for invoke and a full driver tick.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use indicator::{MemoryBank, OutputStateMapper};
use memory_manager::{Arena, ArenaCapacity};
use runtime::{CyclicDriver, InferenceEngine};

fn bench_invoke(c: &mut Criterion) {
    let blob = model_ir::sine_model().unwrap();
    let mut engine = InferenceEngine::new(Arena::new(ArenaCapacity::default()))
        .load(&blob)
        .unwrap()
        .allocate_tensors()
        .unwrap();
    let input = engine.input(0).unwrap();
    let output = engine.output(0).unwrap();

    c.bench_function("invoke_sine", |b| {
        let mut x = 0.0f32;
        b.iter(|| {
            x = (x + 0.1) % model_ir::SINE_X_RANGE;
            engine.tensor_mut(input).unwrap().set_f32(0, black_box(x)).unwrap();
            engine.invoke().unwrap();
            black_box(engine.tensor(output).unwrap().f32_at(0).unwrap())
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let blob = model_ir::sine_model().unwrap();
    let mut engine = InferenceEngine::new(Arena::new(ArenaCapacity::default()))
        .load(&blob)
        .unwrap()
        .allocate_tensors()
        .unwrap();
    let mut driver = CyclicDriver::new(20, model_ir::SINE_X_RANGE).unwrap();
    let mut mapper = OutputStateMapper::new(MemoryBank::new());

    c.bench_function("tick_with_memory_bank", |b| {
        b.iter(|| black_box(driver.tick(&mut engine, &mut mapper).is_emitted()))
    });
}

fn bench_load_and_allocate(c: &mut Criterion) {
    let blob = model_ir::sine_model().unwrap();
    c.bench_function("load_and_allocate", |b| {
        b.iter(|| {
            InferenceEngine::new(Arena::new(ArenaCapacity::default()))
                .load(black_box(&blob))
                .unwrap()
                .allocate_tensors()
                .unwrap()
                .arena_stats()
        })
    });
}

criterion_group!(benches, bench_invoke, bench_tick, bench_load_and_allocate);
criterion_main!(benches);
