mod common;

use aggpack_lib::aggpack_core::aggregate::AggregateBuilder;
use aggpack_lib::aggpack_core::bounding::bounding_sphere;
use aggpack_lib::aggpack_core::distribution::distribute_on_sphere;
use glam::DVec3;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

prop_compose! {
    fn arb_point()(
        x in -100.0f64..100.0,
        y in -100.0f64..100.0,
        z in -100.0f64..100.0
    ) -> DVec3 {
        DVec3::new(x, y, z)
    }
}

prop_compose! {
    fn arb_builder()(
        radius in 0.1f64..5.0,
        jump_chance in 0.0f64..=1.0
    ) -> AggregateBuilder {
        AggregateBuilder::new(radius).with_jump_chance(jump_chance)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_distribution_on_sphere(n in 1usize..300, r in 0.0f64..1000.0) {
        let points = distribute_on_sphere(n, r);
        prop_assert_eq!(points.len(), n);
        for p in &points {
            prop_assert!((p.length() - r).abs() <= 1e-9 * r.max(1.0),
                "|{:?}| = {} differs from {}", p, p.length(), r);
        }
        prop_assert_eq!(points, distribute_on_sphere(n, r));
    }

    #[test]
    fn test_aggregate_properties(
        builder in arb_builder(),
        center in arb_point(),
        count in 1usize..25,
        seed in any::<u64>()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let aggregate = builder.build(center, count, &mut rng).unwrap();

        prop_assert_eq!(aggregate.len(), count);
        prop_assert_eq!(aggregate.particles()[0].position, center);
        assert_no_overlap!(aggregate);
    }

    #[test]
    fn test_aggregate_reproducible(builder in arb_builder(), seed in any::<u64>()) {
        let a = builder.build(DVec3::ZERO, 10, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        let b = builder.build(DVec3::ZERO, 10, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_bounding_sphere_encloses_points(
        points in prop::collection::vec(arb_point(), 1..200)
    ) {
        let sphere = bounding_sphere(&points).unwrap();
        let farthest = points
            .iter()
            .map(|p| p.distance(sphere.center))
            .fold(0.0f64, f64::max);
        prop_assert!((farthest - sphere.radius).abs() < 1e-9);
        for p in &points {
            prop_assert!(sphere.contains(*p, 1e-9));
        }
    }
}
