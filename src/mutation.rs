//! Majority-vote species conversion.
//!
//! A particle surrounded by a clear local majority of another species may
//! convert to it. Conversion odds scale with how lopsided the vote is, and
//! the pass only runs every [`MUTATION_INTERVAL`] invocations so the spread
//! reads as slow waves rather than an instant flip.

use crate::constants::{
    MUTATION_INTERVAL, MUTATION_MIN_EVIDENCE, MUTATION_RADIUS_FACTOR, MUTATION_RATE,
};
use crate::simulation::{Particle, SimRng};
use crate::spatial::SpatialGrid;
use crate::utils::wrapped_offset;
use glam::Vec2;
use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct SpeciesMutation {
    invocations: u64,
    // Scratch reused across passes.
    counts: Vec<usize>,
    neighbors: Vec<usize>,
}

/// Outcome of the vote for one particle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Vote {
    pub majority: usize,
    pub majority_count: usize,
    pub own_count: usize,
}

impl Vote {
    /// Conversion probability, or `None` when the particle keeps its type.
    pub fn conversion_chance(&self, own_kind: usize) -> Option<f32> {
        if self.majority == own_kind || self.majority_count <= MUTATION_MIN_EVIDENCE {
            return None;
        }
        let advantage =
            (self.majority_count - self.own_count) as f32 / self.majority_count as f32;
        Some(advantage * MUTATION_RATE)
    }
}

/// Pick the most common species in `counts`.
///
/// The scan starts from the particle's own species, so a tie never beats it.
pub fn tally(counts: &[usize], own_kind: usize) -> Vote {
    let own_count = counts.get(own_kind).copied().unwrap_or(0);
    let mut majority = own_kind;
    let mut majority_count = own_count;
    for (kind, &count) in counts.iter().enumerate() {
        if count > majority_count {
            majority = kind;
            majority_count = count;
        }
    }
    Vote {
        majority,
        majority_count,
        own_count,
    }
}

impl SpeciesMutation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one invocation; true when this one should run a pass.
    pub fn tick(&mut self) -> bool {
        self.invocations += 1;
        self.invocations % MUTATION_INTERVAL == 0
    }

    pub fn reset(&mut self) {
        self.invocations = 0;
    }

    /// Run one conversion pass in place. `grid` must hold the current positions.
    /// Returns how many particles changed species.
    pub fn apply(
        &mut self,
        particles: &mut [Particle],
        grid: &SpatialGrid,
        world: Vec2,
        max_radius: f32,
        species: usize,
        rng: &mut SimRng,
    ) -> usize {
        if species < 2 {
            return 0;
        }
        let radius = max_radius * MUTATION_RADIUS_FACTOR;
        let radius_sq = radius * radius;
        let mut converted = 0;

        for i in 0..particles.len() {
            let position = particles[i].position;
            let own_kind = particles[i].kind % species;

            self.counts.clear();
            self.counts.resize(species, 0);
            self.neighbors.clear();
            grid.query_neighborhood_into(position, &mut self.neighbors);

            for &j in &self.neighbors {
                if j == i || j >= particles.len() {
                    continue;
                }
                let other = &particles[j];
                if wrapped_offset(position, other.position, world).length_squared() < radius_sq {
                    self.counts[other.kind % species] += 1;
                }
            }

            let vote = tally(&self.counts, own_kind);
            if let Some(chance) = vote.conversion_chance(own_kind) {
                if rng.gen_bool(chance.clamp(0.0, 1.0) as f64) {
                    particles[i].kind = vote.majority;
                    converted += 1;
                }
            }
        }
        converted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn ties_keep_current_species() {
        let vote = tally(&[4, 4, 1], 1);
        assert_eq!(vote.majority, 1);
        assert_eq!(vote.conversion_chance(1), None);
    }

    #[test]
    fn clear_majority_converts_with_scaled_odds() {
        let vote = tally(&[1, 9, 0], 0);
        assert_eq!(vote.majority, 1);
        assert_eq!(vote.majority_count, 9);
        let chance = vote.conversion_chance(0).expect("majority differs");
        assert!((chance - (8.0 / 9.0) * MUTATION_RATE).abs() < 1e-6);
    }

    #[test]
    fn thin_evidence_never_converts() {
        let vote = tally(&[0, 2], 0);
        assert_eq!(vote.majority, 1);
        assert_eq!(vote.conversion_chance(0), None);
        let vote = tally(&[0, 3], 0);
        assert!(vote.conversion_chance(0).is_some());
    }

    #[test]
    fn runs_every_eighth_invocation() {
        let mut mutation = SpeciesMutation::new();
        let runs: Vec<bool> = (0..16).map(|_| mutation.tick()).collect();
        assert_eq!(runs.iter().filter(|r| **r).count(), 2);
        assert!(runs[7] && runs[15]);
        assert!(!runs[0]);
    }

    #[test]
    fn surrounded_minority_eventually_converts() {
        let mut grid = SpatialGrid::new();
        grid.configure(50.0, 500.0, 500.0);
        let mut particles: Vec<Particle> = (0..12)
            .map(|i| Particle {
                position: Vec2::new(250.0 + (i % 4) as f32, 250.0 + (i / 4) as f32),
                velocity: Vec2::ZERO,
                kind: if i == 0 { 1 } else { 0 },
            })
            .collect();
        grid.rebuild(particles.iter().map(|p| p.position));

        let mut rng = SimRng::seed_from_u64(3);
        let mut mutation = SpeciesMutation::new();
        for _ in 0..200 {
            mutation.apply(&mut particles, &grid, Vec2::splat(500.0), 50.0, 2, &mut rng);
        }
        assert!(particles.iter().all(|p| p.kind == 0));
    }

    #[test]
    fn distant_particles_do_not_vote() {
        let mut grid = SpatialGrid::new();
        grid.configure(100.0, 1000.0, 1000.0);
        let mut particles = vec![Particle {
            position: Vec2::new(100.0, 100.0),
            velocity: Vec2::ZERO,
            kind: 1,
        }];
        // Inside the 3x3 block but outside 0.4 * max_radius.
        for i in 0..10 {
            particles.push(Particle {
                position: Vec2::new(160.0 + i as f32, 100.0),
                velocity: Vec2::ZERO,
                kind: 0,
            });
        }
        grid.rebuild(particles.iter().map(|p| p.position));
        let mut rng = SimRng::seed_from_u64(11);
        let mut mutation = SpeciesMutation::new();
        for _ in 0..100 {
            mutation.apply(&mut particles, &grid, Vec2::splat(1000.0), 100.0, 2, &mut rng);
        }
        assert_eq!(particles[0].kind, 1);
    }
}
