//! Rolling per-species activity history.

use crate::constants::ENERGY_HISTORY_CAPACITY;
use crate::simulation::Particle;

/// Fixed-capacity ring of per-species average speeds.
///
/// Each snapshot has one entry per species. Once full, the oldest snapshot is
/// overwritten; [`EnergySampler::history`] always reads oldest first.
#[derive(Debug, Clone)]
pub struct EnergySampler {
    slots: Vec<Vec<f32>>,
    head: usize,
    capacity: usize,
    // Scratch reused by every sample.
    counts: Vec<usize>,
    sums: Vec<f32>,
}

impl Default for EnergySampler {
    fn default() -> Self {
        Self::with_capacity(ENERGY_HISTORY_CAPACITY)
    }
}

impl EnergySampler {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
            counts: Vec::new(),
            sums: Vec::new(),
        }
    }

    /// Record one snapshot of mean speed per species.
    pub fn sample(&mut self, particles: &[Particle], species: usize) {
        self.counts.clear();
        self.counts.resize(species, 0);
        self.sums.clear();
        self.sums.resize(species, 0.0);

        for particle in particles {
            if species == 0 {
                break;
            }
            let kind = particle.kind % species;
            self.counts[kind] += 1;
            self.sums[kind] += particle.velocity.length();
        }

        let snapshot = self
            .sums
            .iter()
            .zip(&self.counts)
            .map(|(&sum, &count)| if count > 0 { sum / count as f32 } else { 0.0 });

        if self.slots.len() < self.capacity {
            self.slots.push(snapshot.collect());
        } else {
            let slot = &mut self.slots[self.head];
            slot.clear();
            slot.extend(snapshot);
        }
        self.head = (self.head + 1) % self.capacity;
    }

    /// Snapshots ordered oldest to newest.
    pub fn history(&self) -> Vec<Vec<f32>> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec<f32>> {
        // Before the first wrap `head == len`, so the split is (all, empty).
        let split = if self.slots.len() < self.capacity {
            self.slots.len()
        } else {
            self.head
        };
        let (newer, older) = self.slots.split_at(split);
        older.iter().chain(newer.iter())
    }

    pub fn latest(&self) -> Option<&[f32]> {
        if self.slots.is_empty() {
            return None;
        }
        let index = (self.head + self.capacity - 1) % self.capacity;
        self.slots.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn particle(kind: usize, vx: f32, vy: f32) -> Particle {
        Particle {
            position: Vec2::ZERO,
            velocity: Vec2::new(vx, vy),
            kind,
        }
    }

    #[test]
    fn averages_speed_per_species() {
        let mut sampler = EnergySampler::default();
        let particles = [
            particle(0, 3.0, 4.0),
            particle(0, 0.0, 1.0),
            particle(2, 2.0, 0.0),
        ];
        sampler.sample(&particles, 3);
        let latest = sampler.latest().expect("one snapshot");
        assert_eq!(latest.len(), 3);
        assert!((latest[0] - 3.0).abs() < 1e-6);
        assert_eq!(latest[1], 0.0);
        assert!((latest[2] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn empty_history_reads_empty() {
        let sampler = EnergySampler::default();
        assert!(sampler.history().is_empty());
        assert!(sampler.latest().is_none());
    }

    #[test]
    fn overwrites_oldest_and_reads_in_order() {
        let mut sampler = EnergySampler::with_capacity(4);
        for step in 0..10 {
            sampler.sample(&[particle(0, step as f32, 0.0)], 1);
        }
        let history = sampler.history();
        assert_eq!(history.len(), 4);
        let speeds: Vec<f32> = history.iter().map(|s| s[0]).collect();
        assert_eq!(speeds, vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(sampler.latest(), Some(&[9.0][..]));
    }

    #[test]
    fn partial_fill_reads_in_order() {
        let mut sampler = EnergySampler::with_capacity(5);
        for step in 0..3 {
            sampler.sample(&[particle(0, step as f32, 0.0)], 1);
        }
        let speeds: Vec<f32> = sampler.iter().map(|s| s[0]).collect();
        assert_eq!(speeds, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn clear_resets_ring() {
        let mut sampler = EnergySampler::with_capacity(2);
        sampler.sample(&[particle(0, 1.0, 0.0)], 1);
        sampler.clear();
        assert!(sampler.is_empty());
        sampler.sample(&[particle(0, 5.0, 0.0)], 1);
        assert_eq!(sampler.history(), vec![vec![5.0]]);
    }
}
