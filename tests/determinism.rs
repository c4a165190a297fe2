mod common;

use aggpack_lib::aggpack_core::config::{BoundingMode, SweepConfig};
use aggpack_lib::aggpack_core::physics::CentralForceStepper;
use aggpack_lib::aggpack_core::sweep::{MemorySink, SweepRunner};
use common::SweepConfigBuilder;

fn run(config: &SweepConfig) -> MemorySink {
    let mut sink = MemorySink::default();
    SweepRunner::new(config, |c: &SweepConfig| {
        CentralForceStepper::from_config(&c.physics)
    })
    .run(&mut sink)
    .unwrap();
    sink
}

#[test]
fn test_determinism_consistency() {
    let config = SweepConfigBuilder::new()
        .with_axes(&[3, 5], &[6], &[0.25, 0.75])
        .with_seed(12345)
        .with_frames(20)
        .build();

    let first = run(&config);
    let second = run(&config);

    assert_eq!(first.runs.len(), second.runs.len());
    for (a, b) in first.runs.iter().zip(&second.runs) {
        assert_eq!(a.seed, b.seed, "Seeds should match for {}", a.name);
        assert_eq!(a.records, b.records, "Series should match for {}", a.name);
    }
}

#[test]
fn test_different_seeds_diverge() {
    let a = run(&SweepConfigBuilder::new().with_seed(1).build());
    let b = run(&SweepConfigBuilder::new().with_seed(2).build());
    assert_ne!(a.runs[0].records, b.runs[0].records);
}

#[test]
fn test_approximate_mode_is_reproducible() {
    let config = SweepConfigBuilder::new()
        .with_mode(BoundingMode::Approximate)
        .with_frames(10)
        .build();
    assert_eq!(run(&config).runs[0].records, run(&config).runs[0].records);
}
