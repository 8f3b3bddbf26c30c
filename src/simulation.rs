use crate::config::SimulationConfig;
use crate::constants::*;
use crate::energy::EnergySampler;
use crate::force::{force, repulsion_ratio};
use crate::layout::{self, Layout};
use crate::mutation::SpeciesMutation;
use crate::spatial::SpatialGrid;
use crate::utils::{wrap_coordinate, wrapped_offset};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

// --- Core Data Structures ---

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Species index into the rule matrix.
    pub kind: usize,
}

impl Particle {
    pub fn at_rest(position: Vec2, kind: usize) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            kind,
        }
    }
}

/// Cursor-driven radial force. Positive strength attracts, negative repels.
///
/// Written by the input layer, read once per step, never cleared by the kernel.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct PointerForce {
    pub active: bool,
    pub position: Vec2,
    pub radius: f32,
    pub strength: f32,
}

impl PointerForce {
    pub fn is_engaged(&self) -> bool {
        self.active && self.strength != 0.0 && self.radius > 0.0
    }
}

pub type SimRng = StdRng;

/// Owns the population and config and advances them one step at a time.
pub struct SimulationState {
    particles: Vec<Particle>,
    config: SimulationConfig,
    rng: SimRng,
    world: Vec2,
    grid: SpatialGrid,
    pointer: PointerForce,
    layout: Layout,
    frame: u64,
    mutation: SpeciesMutation,
    energy: EnergySampler,
    smoothed_max_speed: f32,
    // OPTIMIZATION: Buffers for reuse in the step loop
    force_buffer: Vec<Vec2>,
    neighbor_buffer: Vec<usize>,
    neighbor_counts: Vec<u32>,
}

impl SimulationState {
    pub fn new(world: Vec2, config: SimulationConfig) -> Self {
        Self::with_rng(world, config, SimRng::from_entropy())
    }

    /// Same as [`SimulationState::new`] but reproducible.
    pub fn with_seed(world: Vec2, config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(world, config, SimRng::seed_from_u64(seed))
    }

    fn with_rng(world: Vec2, mut config: SimulationConfig, rng: SimRng) -> Self {
        config.sanitize();
        let capacity = config.particle_count;
        let mut state = Self {
            particles: Vec::with_capacity(capacity),
            config,
            rng,
            world: Vec2::ZERO,
            grid: SpatialGrid::new(),
            pointer: PointerForce::default(),
            layout: Layout::Random,
            frame: 0,
            mutation: SpeciesMutation::new(),
            energy: EnergySampler::default(),
            smoothed_max_speed: MAX_SPEED_FLOOR,
            force_buffer: Vec::with_capacity(capacity),
            neighbor_buffer: Vec::new(),
            neighbor_counts: Vec::with_capacity(capacity),
        };
        state.set_dimensions(world.x, world.y);
        state.initialize_particles();
        state
    }

    // --- Lifecycle ---

    /// Resize the world. Particles outside the new bounds are clamped to the edge.
    pub fn set_dimensions(&mut self, width: f32, height: f32) {
        let sanitize = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        self.world = Vec2::new(sanitize(width), sanitize(height));
        self.grid
            .configure(self.config.max_radius, self.world.x, self.world.y);

        let world = self.world;
        let fit = |value: f32, extent: f32| {
            if (0.0..extent).contains(&value) {
                value
            } else if value >= extent {
                (extent - 1.0).max(0.0)
            } else {
                0.0
            }
        };
        for particle in self.particles.iter_mut() {
            particle.position = Vec2::new(
                fit(particle.position.x, world.x),
                fit(particle.position.y, world.y),
            );
        }
        let (cols, rows) = self.grid.dimensions();
        log::debug!(
            "World resized to {}x{}, grid {}x{} (cell {:.1})",
            self.world.x,
            self.world.y,
            cols,
            rows,
            self.grid.cell_size()
        );
    }

    /// Apply a new config. Never rejects: invalid values are corrected first.
    pub fn update_config(&mut self, mut config: SimulationConfig) {
        if config.sanitize() {
            log::debug!(
                "Corrected config (min_radius {:.1}, max_radius {:.1}, {} species)",
                config.min_radius,
                config.max_radius,
                config.species_count()
            );
        }
        let species = config.species_count();
        let radius_changed = config.max_radius != self.config.max_radius;
        // Only an explicit count change resizes; particles appended through
        // `particles_mut` survive unrelated edits.
        let count_changed = config.particle_count != self.config.particle_count;
        self.config = config;

        if radius_changed {
            self.grid
                .configure(self.config.max_radius, self.world.x, self.world.y);
        }

        for particle in self.particles.iter_mut() {
            if particle.kind >= species {
                particle.kind %= species;
            }
        }

        let current = self.particles.len();
        if !count_changed {
            self.config.particle_count = current;
            return;
        }
        let target = self.config.particle_count;
        if target > current {
            let world = self.world;
            let rng = &mut self.rng;
            self.particles.extend(
                (current..target).map(|_| layout::random_particle(world, species, rng)),
            );
            log::debug!("Grew population {} -> {}", current, target);
        } else if target < current {
            self.particles.truncate(target);
            log::debug!("Shrank population {} -> {}", current, target);
        }
    }

    pub fn initialize_particles(&mut self) {
        self.initialize_with_layout(Layout::Random);
    }

    /// Replace the population from scratch and reset all step bookkeeping.
    pub fn initialize_with_layout(&mut self, layout: Layout) {
        self.layout = layout;
        self.particles = layout::generate(
            layout,
            self.config.particle_count,
            self.world.x,
            self.world.y,
            self.config.species_count(),
            &mut self.rng,
        );
        self.frame = 0;
        self.mutation.reset();
        self.energy.clear();
        self.smoothed_max_speed = MAX_SPEED_FLOOR;
        self.neighbor_counts.clear();
        log::debug!(
            "Initialized {} particles with {} layout",
            self.particles.len(),
            layout.name()
        );
    }

    /// Re-run the current layout.
    pub fn restart(&mut self) {
        self.initialize_with_layout(self.layout);
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = SimRng::seed_from_u64(seed);
    }

    pub fn randomize_rules(&mut self) {
        let mut config = self.config.clone();
        config.randomize_rules(&mut self.rng);
        self.update_config(config);
    }

    /// Append a ring of particles flying out from `center`.
    pub fn spawn_burst(&mut self, center: Vec2, count: usize, kind: usize) {
        let count = count.min(MAX_PARTICLES.saturating_sub(self.particles.len()));
        let kind = kind % self.config.species_count();
        let world = self.world;
        for _ in 0..count {
            let direction = Vec2::from_angle(self.rng.gen_range(0.0..TAU));
            let offset = direction * self.rng.gen_range(0.0..=SPAWN_BURST_RADIUS);
            let position = center + offset;
            self.particles.push(Particle {
                position: Vec2::new(
                    wrap_or_zero(position.x, world.x),
                    wrap_or_zero(position.y, world.y),
                ),
                velocity: direction * SPAWN_BURST_SPEED,
                kind,
            });
        }
        self.config.particle_count = self.particles.len();
    }

    // --- Step ---

    /// Advance one timestep. No-op until the world has a nonzero size.
    pub fn step(&mut self) {
        if !self.is_dimensioned() {
            return;
        }

        let world = self.world;
        let count = self.particles.len();
        let species = self.config.species_count();
        let max_radius = self.config.max_radius;
        let radius_sq = max_radius * max_radius;
        let inv_radius = 1.0 / max_radius;
        let beta = repulsion_ratio(self.config.min_radius, max_radius);
        let dt = self.config.speed * TIMESTEP_SCALE;
        let retained = 1.0 - self.config.friction;
        let strength = self.config.force_strength;
        let max_speed = max_radius * VELOCITY_CAP_FACTOR;
        let pointer = self.pointer;
        let pointer_engaged = pointer.is_engaged();

        self.grid.rebuild(self.particles.iter().map(|p| p.position));

        self.force_buffer.clear();
        self.force_buffer.resize(count, Vec2::ZERO);
        self.neighbor_counts.clear();
        self.neighbor_counts.resize(count, 0);

        // --- Force accumulation ---
        for i in 0..count {
            let particle = self.particles[i];
            let rules = &self.config.rules[particle.kind % species];
            let mut total = Vec2::ZERO;
            let mut nearby = 0u32;

            self.neighbor_buffer.clear();
            self.grid
                .query_neighborhood_into(particle.position, &mut self.neighbor_buffer);
            for &j in &self.neighbor_buffer {
                if j == i {
                    continue;
                }
                let other = &self.particles[j];
                let offset = wrapped_offset(particle.position, other.position, world);
                let dist_sq = offset.length_squared();
                // Written so NaN distances fall through to `continue` too.
                if !(dist_sq >= MIN_DISTANCE_SQ && dist_sq < radius_sq) {
                    continue;
                }
                let dist = dist_sq.sqrt();
                let magnitude = force(dist * inv_radius, rules[other.kind % species], beta);
                total += offset / dist * (magnitude * strength);
                nearby += 1;
            }

            if pointer_engaged {
                let to_pointer = pointer.position - particle.position;
                let dist = to_pointer.length();
                if dist > 0.0 && dist < pointer.radius {
                    let falloff = 1.0 - dist / pointer.radius;
                    total += to_pointer / dist
                        * (pointer.strength * falloff * POINTER_FORCE_GAIN);
                }
            }

            self.force_buffer[i] = total;
            self.neighbor_counts[i] = nearby;
        }

        // --- Integration ---
        let mut observed_max = 0.0f32;
        for i in 0..count {
            let particle = &mut self.particles[i];

            // Friction damps the old velocity before this step's force lands.
            let mut velocity = particle.velocity * retained + self.force_buffer[i] * dt;
            let speed = velocity.length();
            if speed > max_speed {
                velocity *= max_speed / speed;
            }
            if !velocity.is_finite() {
                velocity = Vec2::ZERO;
            }

            let position = particle.position + velocity;
            if !position.is_finite() {
                // Sacrifice this trajectory rather than poison the neighbors.
                particle.position = layout::random_position(world, &mut self.rng);
                particle.velocity = Vec2::ZERO;
                continue;
            }
            particle.position = Vec2::new(
                wrap_coordinate(position.x, world.x),
                wrap_coordinate(position.y, world.y),
            );
            particle.velocity = velocity;
            observed_max = observed_max.max(velocity.length());
        }
        self.smoothed_max_speed = (self.smoothed_max_speed * MAX_SPEED_DECAY
            + observed_max * MAX_SPEED_BLEND)
            .max(MAX_SPEED_FLOOR);

        // --- Species mutation ---
        if self.config.mutation && self.mutation.tick() {
            self.grid.rebuild(self.particles.iter().map(|p| p.position));
            self.mutation.apply(
                &mut self.particles,
                &self.grid,
                world,
                max_radius,
                species,
                &mut self.rng,
            );
        }

        self.frame += 1;

        // --- Energy sampling ---
        if self.frame % ENERGY_SAMPLE_INTERVAL == 0 {
            self.energy.sample(&self.particles, species);
        }
    }

    // --- Accessors ---

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Direct access for input layers that spawn particles themselves.
    /// Appending is fine; the next step picks new particles up.
    pub fn particles_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.particles
    }

    /// Current config. Clone it, edit, and pass it back through `update_config`.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn pointer(&self) -> &PointerForce {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerForce {
        &mut self.pointer
    }

    pub fn set_pointer(&mut self, pointer: PointerForce) {
        self.pointer = pointer;
    }

    /// In-range neighbor count per particle from the last step.
    pub fn neighbor_counts(&self) -> &[u32] {
        &self.neighbor_counts
    }

    pub fn smoothed_max_speed(&self) -> f32 {
        self.smoothed_max_speed
    }

    /// Per-species mean speed snapshots, oldest first.
    pub fn energy_history(&self) -> Vec<Vec<f32>> {
        self.energy.history()
    }

    pub fn energy(&self) -> &EnergySampler {
        &self.energy
    }

    pub fn species_counts(&self) -> Vec<usize> {
        let species = self.config.species_count();
        let mut counts = vec![0; species];
        for particle in &self.particles {
            counts[particle.kind % species] += 1;
        }
        counts
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn dimensions(&self) -> Vec2 {
        self.world
    }

    pub fn is_dimensioned(&self) -> bool {
        self.world.x > 0.0 && self.world.y > 0.0
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }
}

fn wrap_or_zero(value: f32, extent: f32) -> f32 {
    if extent > 0.0 && value.is_finite() {
        wrap_coordinate(value, extent)
    } else {
        0.0
    }
}
