//! Starting arrangements for a fresh population.

use crate::simulation::{Particle, SimRng};
use crate::utils::wrap_coordinate;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

// 2π / φ², the golden angle.
const GOLDEN_ANGLE: f32 = 2.399_963_1;
const BURST_SPREAD: f32 = 0.05;
const BURST_MIN_SPEED: f32 = 1.0;
const BURST_MAX_SPEED: f32 = 3.0;
const SPIRAL_EXTENT: f32 = 0.45;
const SPIRAL_SPIN: f32 = 0.5;
const RING_EXTENT: f32 = 0.45;
const RING_JITTER: f32 = 4.0;
const RING_SPIN: f32 = 0.8;
const CLUSTER_RADIUS: f32 = 0.08;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Layout {
    #[default]
    Random,
    /// Everything starts near the center flying outward.
    Burst,
    /// Golden-angle spiral, spinning.
    Spiral,
    /// Checkerboard lattice of species.
    Grid,
    /// One ring per species, spinning.
    Rings,
    /// One blob per species.
    Clusters,
}

impl Layout {
    pub const ALL: [Layout; 6] = [
        Layout::Random,
        Layout::Burst,
        Layout::Spiral,
        Layout::Grid,
        Layout::Rings,
        Layout::Clusters,
    ];

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|l| *l == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Layout::Random => "random",
            Layout::Burst => "burst",
            Layout::Spiral => "spiral",
            Layout::Grid => "grid",
            Layout::Rings => "rings",
            Layout::Clusters => "clusters",
        }
    }
}

/// Build `count` particles in `layout` inside `[0, width) x [0, height)`.
pub fn generate(
    layout: Layout,
    count: usize,
    width: f32,
    height: f32,
    species: usize,
    rng: &mut SimRng,
) -> Vec<Particle> {
    let species = species.max(1);
    let world = Vec2::new(width.max(0.0), height.max(0.0));
    let mut particles = match layout {
        Layout::Random => random(count, world, species, rng),
        Layout::Burst => burst(count, world, species, rng),
        Layout::Spiral => spiral(count, world, species),
        Layout::Grid => grid(count, world, species),
        Layout::Rings => rings(count, world, species, rng),
        Layout::Clusters => clusters(count, world, species, rng),
    };
    for particle in particles.iter_mut() {
        particle.position = place(particle.position, world);
    }
    particles
}

/// One particle at a uniform random spot, at rest, of a random species.
pub fn random_particle(world: Vec2, species: usize, rng: &mut SimRng) -> Particle {
    Particle {
        position: random_position(world, rng),
        velocity: Vec2::ZERO,
        kind: rng.gen_range(0..species.max(1)),
    }
}

pub fn random_position(world: Vec2, rng: &mut SimRng) -> Vec2 {
    Vec2::new(
        if world.x > 0.0 { rng.gen_range(0.0..world.x) } else { 0.0 },
        if world.y > 0.0 { rng.gen_range(0.0..world.y) } else { 0.0 },
    )
}

fn place(position: Vec2, world: Vec2) -> Vec2 {
    let axis = |value: f32, extent: f32| {
        if extent > 0.0 && value.is_finite() {
            wrap_coordinate(value, extent)
        } else {
            0.0
        }
    };
    Vec2::new(axis(position.x, world.x), axis(position.y, world.y))
}

fn random(count: usize, world: Vec2, species: usize, rng: &mut SimRng) -> Vec<Particle> {
    (0..count)
        .map(|_| random_particle(world, species, rng))
        .collect()
}

fn burst(count: usize, world: Vec2, species: usize, rng: &mut SimRng) -> Vec<Particle> {
    let center = world * 0.5;
    let spread = world.min_element() * BURST_SPREAD;
    (0..count)
        .map(|_| {
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            let distance = rng.gen_range(0.0..=spread.max(f32::EPSILON));
            Particle {
                position: center + direction * distance,
                velocity: direction * rng.gen_range(BURST_MIN_SPEED..BURST_MAX_SPEED),
                kind: rng.gen_range(0..species),
            }
        })
        .collect()
}

fn spiral(count: usize, world: Vec2, species: usize) -> Vec<Particle> {
    let center = world * 0.5;
    let extent = world.min_element() * SPIRAL_EXTENT;
    (0..count)
        .map(|i| {
            let angle = i as f32 * GOLDEN_ANGLE;
            let distance = (i as f32 / count as f32).sqrt() * extent;
            let direction = Vec2::from_angle(angle);
            Particle {
                position: center + direction * distance,
                velocity: direction.perp() * SPIRAL_SPIN,
                kind: i % species,
            }
        })
        .collect()
}

fn grid(count: usize, world: Vec2, species: usize) -> Vec<Particle> {
    if count == 0 {
        return Vec::new();
    }
    let aspect = if world.y > 0.0 { world.x / world.y } else { 1.0 };
    let cols = ((count as f32 * aspect).sqrt().ceil() as usize).clamp(1, count);
    let rows = count.div_ceil(cols);
    let cell = Vec2::new(world.x / cols as f32, world.y / rows as f32);
    (0..count)
        .map(|i| {
            let (col, row) = (i % cols, i / cols);
            Particle {
                position: Vec2::new(
                    (col as f32 + 0.5) * cell.x,
                    (row as f32 + 0.5) * cell.y,
                ),
                velocity: Vec2::ZERO,
                kind: (col + row) % species,
            }
        })
        .collect()
}

fn rings(count: usize, world: Vec2, species: usize, rng: &mut SimRng) -> Vec<Particle> {
    let center = world * 0.5;
    let extent = world.min_element() * RING_EXTENT;
    (0..count)
        .map(|i| {
            let kind = i % species;
            let radius = extent * (kind + 1) as f32 / species as f32;
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            let jitter = rng.gen_range(-RING_JITTER..=RING_JITTER);
            Particle {
                position: center + direction * (radius + jitter).max(0.0),
                velocity: direction.perp() * RING_SPIN,
                kind,
            }
        })
        .collect()
}

fn clusters(count: usize, world: Vec2, species: usize, rng: &mut SimRng) -> Vec<Particle> {
    let centers: Vec<Vec2> = (0..species)
        .map(|_| random_position(world, rng))
        .collect();
    let spread = world.min_element() * CLUSTER_RADIUS;
    (0..count)
        .map(|i| {
            let kind = i % species;
            // sqrt keeps the disc uniformly filled.
            let distance = rng.gen_range(0.0f32..=1.0).sqrt() * spread;
            let direction = Vec2::from_angle(rng.gen_range(0.0..TAU));
            Particle {
                position: centers[kind] + direction * distance,
                velocity: Vec2::ZERO,
                kind,
            }
        })
        .collect()
}
