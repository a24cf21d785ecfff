use std::hint::black_box;
use std::time::Instant;

use groundfall_terrain::{NoiseField, TerrainGenerator};

fn bench_sample(octaves: usize, iterations: usize) {
    let field = NoiseField::fractal(42, octaves);

    let start = Instant::now();
    let mut acc = 0.0_f32;
    for i in 0..iterations {
        let t = i as f32 * 0.013;
        acc += field.sample(black_box(t), black_box(-t * 0.7));
    }
    black_box(acc);
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  sample ({octaves} octaves, {iterations} iters): {per_iter:?}/sample, total {elapsed:?}");
}

fn bench_generate(resolution: usize, octaves: usize, iterations: usize) {
    let generator = TerrainGenerator::default();
    let field = NoiseField::fractal(42, octaves);

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(generator.generate(
            black_box(64.0),
            black_box(64.0),
            resolution,
            resolution,
            &field,
        ));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  generate ({resolution}x{resolution}, {octaves} octaves, {iterations} iters): {per_iter:?}/grid, total {elapsed:?}"
    );
}

fn main() {
    println!("=== Terrain Benchmarks ===\n");

    println!("Noise sampling:");
    bench_sample(1, 1_000_000);
    bench_sample(6, 200_000);

    println!("\nHeightfield generation:");
    bench_generate(64, 1, 100);
    bench_generate(256, 1, 10);
    bench_generate(256, 6, 5);

    println!("\n=== Done ===");
}
