use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use tnt_core::{ComplexArray, Complex64, DelayTableScanner, LbFft};

const DWELL: f64 = 2e-5;

/// Затухающий FID с шумом, `nspec` трасс по `npts` точек.
fn synthetic_fid(
    npts: usize,
    nspec: usize,
) -> ComplexArray {
    let mut rng = SmallRng::seed_from_u64(0x7e57);
    let mut data = Vec::with_capacity(npts * nspec);

    for _ in 0..nspec {
        for k in 0..npts {
            let t = k as f64 * DWELL;
            let amp = (-t / 5e-3).exp();
            let phase = -2.0 * std::f64::consts::PI * 1500.0 * t;
            let signal = Complex64::from_polar(amp, phase);
            let noise = Complex64::new(rng.gen_range(-0.01..0.01), rng.gen_range(-0.01..0.01));
            data.push(signal + noise);
        }
    }

    // ComplexArray::from_vec не может упасть: длина совпадает с формой
    ComplexArray::from_vec([npts, nspec, 1, 1], data).unwrap()
}

fn bench_lbfft(c: &mut Criterion) {
    let mut group = c.benchmark_group("lbfft");

    for &npts in &[1024usize, 4096, 16384] {
        let fid = synthetic_fid(npts, 8);
        let lb = LbFft::new(20.0, 1).with_phase(0.0);

        group.throughput(Throughput::Elements((npts * 8) as u64));
        group.bench_with_input(BenchmarkId::new("fixed_phase", npts), &fid, |b, fid| {
            b.iter(|| lb.process(black_box(fid), DWELL, None).unwrap())
        });
    }

    let fid = synthetic_fid(4096, 8);
    let auto = LbFft::new(20.0, 1);
    group.bench_function("auto_phase/4096", |b| {
        b.iter(|| auto.process(black_box(&fid), DWELL, None).unwrap())
    });

    group.finish();
}

fn bench_delay_scan(c: &mut Criterion) {
    let mut buf = vec![0u8; 64 * 1024];
    let mut pos = 1024;
    for t in 0..16 {
        let name = format!("de{t}:1");
        let values = (1..=64).map(|i| format!("{i}m")).collect::<Vec<_>>().join(" ");

        for chunk in [name.as_bytes(), values.as_bytes()] {
            buf[pos..pos + 4].copy_from_slice(&(chunk.len() as u32).to_le_bytes());
            buf[pos + 4..pos + 4 + chunk.len()].copy_from_slice(chunk);
            pos += 4 + chunk.len();
        }
        pos += 512;
    }

    c.bench_function("delay_scan_64k", |b| {
        b.iter(|| DelayTableScanner::new(black_box(&buf)).scan())
    });
}

criterion_group!(benches, bench_lbfft, bench_delay_scan);
criterion_main!(benches);
