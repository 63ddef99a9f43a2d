// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the reference kernels at the sizes the sine model uses.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::{fully_connected, relu, Activation, DType, Dims, TensorView, TensorViewMut};

fn f32_bytes(values: impl Iterator<Item = f32>) -> Vec<u8> {
    values.flat_map(f32::to_le_bytes).collect()
}

fn bench_fully_connected(c: &mut Criterion) {
    let units = 16;
    let input = f32_bytes((0..units).map(|i| i as f32 * 0.1));
    let weights = f32_bytes((0..units * units).map(|i| (i % 7) as f32 * 0.05 - 0.15));
    let bias = f32_bytes((0..units).map(|i| i as f32 * -0.01));
    let mut out = vec![0u8; units * 4];

    let row = Dims::new(&[1, units]).unwrap();
    let x = TensorView::new(row, DType::F32, &input).unwrap();
    let w = TensorView::new(Dims::new(&[units, units]).unwrap(), DType::F32, &weights).unwrap();
    let b = TensorView::new(Dims::new(&[units]).unwrap(), DType::F32, &bias).unwrap();

    c.bench_function("fully_connected_16x16_relu", |bench| {
        bench.iter(|| {
            let mut y = TensorViewMut::new(row, DType::F32, &mut out).unwrap();
            fully_connected(black_box(&x), &w, Some(&b), &mut y, Activation::Relu).unwrap();
        })
    });
}

fn bench_relu(c: &mut Criterion) {
    let dims = Dims::new(&[1, 256]).unwrap();
    let input = f32_bytes((0..256).map(|i| i as f32 - 128.0));
    let mut out = vec![0u8; 256 * 4];
    let x = TensorView::new(dims, DType::F32, &input).unwrap();

    c.bench_function("relu_256", |bench| {
        bench.iter(|| {
            let mut y = TensorViewMut::new(dims, DType::F32, &mut out).unwrap();
            relu(black_box(&x), &mut y).unwrap();
        })
    });
}

criterion_group!(benches, bench_fully_connected, bench_relu);
criterion_main!(benches);
