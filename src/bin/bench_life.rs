use std::time::Instant;

use parlife::{EngineConfig, SimulationEngine};

const GENERATIONS: u32 = 100;

fn main() {
    tracing_subscriber::fmt::init();

    let config = EngineConfig {
        width: 1920,
        height: 1080,
        workers: 8,
        sparsity: 2,
        seed: Some(42),
    };
    let mut engine = SimulationEngine::new(&config).unwrap();
    let mut pixels = vec![0u32; config.cell_count()];

    let timer = Instant::now();
    for _ in 0..GENERATIONS {
        engine.advance_generation().unwrap();
        engine.read_pixels(&mut pixels);
    }
    let elapsed = timer.elapsed();
    println!(
        "{GENERATIONS} generations in {:?} ({:.1} gens/sec)",
        elapsed,
        f64::from(GENERATIONS) / elapsed.as_secs_f64()
    );
}
