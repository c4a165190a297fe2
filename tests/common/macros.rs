/// Asserts that two floats agree within an absolute tolerance.
#[macro_export]
macro_rules! assert_close {
    ($left:expr, $right:expr, $eps:expr) => {
        let (l, r): (f64, f64) = ($left, $right);
        assert!(
            (l - r).abs() <= $eps,
            "{} = {} is not within {} of {}",
            stringify!($left),
            l,
            $eps,
            r
        );
    };
}

/// Asserts that no two particles of an aggregate overlap.
#[macro_export]
macro_rules! assert_no_overlap {
    ($aggregate:expr) => {
        let particles = $aggregate.particles();
        let min_gap = 2.0 * $aggregate.particle_radius() - 1e-9;
        for i in 0..particles.len() {
            for j in (i + 1)..particles.len() {
                let d = particles[i].position.distance(particles[j].position);
                assert!(
                    d >= min_gap,
                    "Particles {} and {} overlap: distance {} < {}",
                    i,
                    j,
                    d,
                    min_gap
                );
            }
        }
    };
}
