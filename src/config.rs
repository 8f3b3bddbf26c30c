use crate::constants::{
    DEFAULT_PARTICLE_COUNT, DEFAULT_SPECIES_COUNT, MIN_CELL_SIZE, MIN_RADIUS_FALLBACK_RATIO,
};
use rand::Rng;

/// How the renderer colors particles. The kernel never reads this.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Flat,
    Glow,
    Velocity,
    Density,
}

impl ColorMode {
    pub fn next(self) -> Self {
        match self {
            ColorMode::Flat => ColorMode::Glow,
            ColorMode::Glow => ColorMode::Velocity,
            ColorMode::Velocity => ColorMode::Density,
            ColorMode::Density => ColorMode::Flat,
        }
    }
}

/// Rule matrix shipped with the default config. Asymmetric on purpose:
/// chase pairs like 0 -> 1 (+) / 1 -> 0 (-) give the default run some motion.
const DEFAULT_RULES: [[f32; DEFAULT_SPECIES_COUNT]; DEFAULT_SPECIES_COUNT] = [
    [0.6, 0.4, -0.2, 0.0, -0.5, 0.3],
    [-0.3, 0.5, 0.45, -0.1, 0.0, -0.4],
    [0.2, -0.35, 0.4, 0.5, -0.2, 0.0],
    [0.0, 0.3, -0.4, 0.55, 0.35, -0.25],
    [-0.45, 0.0, 0.25, -0.3, 0.5, 0.4],
    [0.35, -0.2, 0.0, 0.3, -0.4, 0.45],
];

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub particle_count: usize,
    /// Global timestep scale.
    pub speed: f32,
    /// Fraction of velocity removed each step.
    pub friction: f32,
    /// Outer interaction cutoff, also the spatial grid cell size.
    pub max_radius: f32,
    /// Radius of the universal repulsion zone.
    pub min_radius: f32,
    pub force_strength: f32,
    /// `rules[from][to]`: how strongly `from` is pulled toward (+) or pushed from (-) `to`.
    pub rules: Vec<Vec<f32>>,

    // Passed through untouched for the renderer / mutation toggle.
    pub trail_intensity: f32,
    pub particle_size: f32,
    pub glow: bool,
    pub mutation: bool,
    pub show_connections: bool,
    pub color_mode: ColorMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            speed: 1.0,
            friction: 0.15,
            max_radius: 80.0,
            min_radius: 20.0,
            force_strength: 1.0,
            rules: DEFAULT_RULES.iter().map(|row| row.to_vec()).collect(),
            trail_intensity: 0.2,
            particle_size: 2.0,
            glow: false,
            mutation: false,
            show_connections: false,
            color_mode: ColorMode::Flat,
        }
    }
}

impl SimulationConfig {
    /// Default physics with an all-zero `species x species` rule matrix.
    pub fn with_species(species: usize) -> Self {
        let species = species.max(1);
        Self {
            rules: vec![vec![0.0; species]; species],
            ..Self::default()
        }
    }

    pub fn species_count(&self) -> usize {
        self.rules.len()
    }

    #[inline]
    pub fn rule(&self, from: usize, to: usize) -> f32 {
        self.rules[from][to]
    }

    /// Fill the rule matrix with uniform values in `[-1, 1]`, keeping its size.
    pub fn randomize_rules<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for row in self.rules.iter_mut() {
            for value in row.iter_mut() {
                *value = rng.gen_range(-1.0..=1.0);
            }
        }
    }

    /// Coerce the config into something the kernel can always run.
    /// Never fails; returns true if anything had to be corrected.
    pub fn sanitize(&mut self) -> bool {
        let mut corrected = false;

        if !self.max_radius.is_finite() || self.max_radius < MIN_CELL_SIZE {
            self.max_radius = MIN_CELL_SIZE;
            corrected = true;
        }
        if !self.min_radius.is_finite() || self.min_radius < 0.0 {
            self.min_radius = 0.0;
            corrected = true;
        }
        if self.min_radius > self.max_radius {
            self.min_radius = self.max_radius * MIN_RADIUS_FALLBACK_RATIO;
            corrected = true;
        }
        if !(0.0..=1.0).contains(&self.friction) {
            // NaN lands here too; clamp keeps it NaN, so fall back explicitly.
            self.friction = if self.friction.is_nan() {
                0.0
            } else {
                self.friction.clamp(0.0, 1.0)
            };
            corrected = true;
        }

        // Square the rule matrix up.
        if self.rules.is_empty() {
            self.rules = vec![vec![0.0]];
            corrected = true;
        }
        let species = self.rules.len();
        for row in self.rules.iter_mut() {
            if row.len() != species {
                row.resize(species, 0.0);
                corrected = true;
            }
        }

        corrected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_config_is_already_valid() {
        let mut config = SimulationConfig::default();
        assert!(!config.sanitize());
        assert_eq!(config.species_count(), DEFAULT_SPECIES_COUNT);
    }

    #[test]
    fn inverted_radii_fall_back_to_ratio() {
        let mut config = SimulationConfig {
            max_radius: 50.0,
            min_radius: 90.0,
            ..SimulationConfig::default()
        };
        assert!(config.sanitize());
        assert!((config.min_radius - 15.0).abs() < 1e-5);
        assert!(config.min_radius <= config.max_radius);
    }

    #[test]
    fn ragged_matrix_is_squared() {
        let mut config = SimulationConfig {
            rules: vec![vec![1.0], vec![0.5, -0.5, 0.25], vec![]],
            ..SimulationConfig::default()
        };
        config.sanitize();
        assert_eq!(config.species_count(), 3);
        assert!(config.rules.iter().all(|row| row.len() == 3));
        assert_eq!(config.rule(0, 0), 1.0);
        assert_eq!(config.rule(0, 2), 0.0);
        assert_eq!(config.rule(1, 2), 0.25);
    }

    #[test]
    fn empty_matrix_becomes_single_species() {
        let mut config = SimulationConfig {
            rules: Vec::new(),
            ..SimulationConfig::default()
        };
        config.sanitize();
        assert_eq!(config.rules, vec![vec![0.0]]);
    }

    #[test]
    fn degenerate_scalars_are_clamped() {
        let mut config = SimulationConfig {
            max_radius: 0.0,
            min_radius: -4.0,
            friction: f32::NAN,
            ..SimulationConfig::default()
        };
        config.sanitize();
        assert_eq!(config.max_radius, MIN_CELL_SIZE);
        assert_eq!(config.min_radius, 0.0);
        assert_eq!(config.friction, 0.0);
    }

    #[test]
    fn randomized_rules_stay_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut config = SimulationConfig::with_species(4);
        config.randomize_rules(&mut rng);
        assert_eq!(config.species_count(), 4);
        assert!(config.rules.iter().flatten().all(|v| (-1.0..=1.0).contains(v)));
        assert!(config.rules.iter().flatten().any(|v| *v != 0.0));
    }

    #[test]
    fn color_mode_cycles_back_to_flat() {
        let mut mode = ColorMode::Flat;
        for _ in 0..4 {
            mode = mode.next();
        }
        assert_eq!(mode, ColorMode::Flat);
    }
}
