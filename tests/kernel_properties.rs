use glam::Vec2;
use particle_life::{Layout, SimulationConfig, SimulationState};
use proptest::prelude::*;

prop_compose! {
    fn arb_config()(
        species in 1usize..7,
        speed in 0.25f32..=3.0,
        force_strength in 0.1f32..=3.0,
        friction in 0.01f32..0.6,
        max_radius in 5.0f32..150.0,
        min_radius in 0.0f32..200.0,
    ) -> SimulationConfig {
        SimulationConfig {
            particle_count: 120,
            speed,
            force_strength,
            friction,
            max_radius,
            min_radius,
            ..SimulationConfig::with_species(species)
        }
    }
}

fn assert_bounded(state: &SimulationState) -> Result<(), TestCaseError> {
    let world = state.dimensions();
    for p in state.particles() {
        prop_assert!(p.position.is_finite() && p.velocity.is_finite(), "{:?}", p);
        prop_assert!((0.0..world.x).contains(&p.position.x), "x = {}", p.position.x);
        prop_assert!((0.0..world.y).contains(&p.position.y), "y = {}", p.position.y);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn positions_stay_finite_and_in_bounds(
        config in arb_config(),
        seed in any::<u64>(),
        layout in 0usize..Layout::ALL.len(),
        width in 80.0f32..600.0,
        height in 80.0f32..600.0,
    ) {
        let mut state = SimulationState::with_seed(Vec2::new(width, height), config, seed);
        state.randomize_rules();
        state.initialize_with_layout(Layout::ALL[layout]);
        assert_bounded(&state)?;
        for _ in 0..220 {
            state.step();
            assert_bounded(&state)?;
        }
    }

    #[test]
    fn extreme_settings_stay_bounded(seed in any::<u64>()) {
        let config = SimulationConfig {
            particle_count: 300,
            speed: 3.0,
            force_strength: 3.0,
            friction: 0.01,
            ..SimulationConfig::default()
        };
        let mut state = SimulationState::with_seed(Vec2::new(400.0, 300.0), config, seed);
        state.randomize_rules();
        for _ in 0..250 {
            state.step();
        }
        assert_bounded(&state)?;
    }

    #[test]
    fn population_changes_only_through_config(
        seed in any::<u64>(),
        start in 0usize..300,
        target in 0usize..300,
        steps in 1usize..30,
    ) {
        let config = SimulationConfig { particle_count: start, ..SimulationConfig::default() };
        let mut state = SimulationState::with_seed(Vec2::new(500.0, 400.0), config, seed);
        for _ in 0..steps {
            state.step();
        }
        prop_assert_eq!(state.particles().len(), start);

        let before = state.particles().to_vec();
        let mut resized = state.config().clone();
        resized.particle_count = target;
        state.update_config(resized);

        prop_assert_eq!(state.particles().len(), target);
        let kept = start.min(target);
        prop_assert_eq!(&state.particles()[..kept], &before[..kept]);
    }

    #[test]
    fn updated_config_is_always_runnable(
        max_radius in prop::num::f32::ANY,
        min_radius in prop::num::f32::ANY,
        friction in prop::num::f32::ANY,
        rows in 0usize..5,
        cols in 0usize..5,
    ) {
        let mut state = SimulationState::with_seed(
            Vec2::new(300.0, 300.0),
            SimulationConfig { particle_count: 50, ..SimulationConfig::default() },
            1,
        );
        let config = SimulationConfig {
            particle_count: 50,
            max_radius,
            min_radius,
            friction,
            rules: vec![vec![0.5; cols]; rows],
            ..SimulationConfig::default()
        };
        state.update_config(config);

        let applied = state.config();
        prop_assert!(applied.max_radius.is_finite() && applied.max_radius >= 1.0);
        prop_assert!(applied.min_radius >= 0.0);
        prop_assert!(applied.min_radius <= applied.max_radius);
        prop_assert!((0.0..=1.0).contains(&applied.friction));
        let species = applied.species_count();
        prop_assert!(species >= 1);
        prop_assert!(applied.rules.iter().all(|row| row.len() == species));
        prop_assert!(state.particles().iter().all(|p| p.kind < species));

        for _ in 0..5 {
            state.step();
        }
        assert_bounded(&state)?;
    }
}
