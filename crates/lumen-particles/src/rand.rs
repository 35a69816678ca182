//! Seeded xorshift32 PRNG so simulation runs are reproducible

use lumen_core::Vec3;

pub struct ParticleRng {
    state: u32,
}

impl ParticleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits keeps the result strictly below 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns an index in [0, len). `len` must be non-zero.
    pub fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }

    /// True with probability `p`
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Returns a random unit direction vector (uniformly on sphere surface)
    pub fn random_direction(&mut self) -> Vec3 {
        // Marsaglia method for uniform sphere sampling
        loop {
            let x = self.range(-1.0, 1.0);
            let y = self.range(-1.0, 1.0);
            let s = x * x + y * y;
            if s < 1.0 {
                let factor = 2.0 * (1.0 - s).sqrt();
                return Vec3::new(x * factor, y * factor, 1.0 - 2.0 * s);
            }
        }
    }

    /// Uniform point inside a ball of `radius`
    pub fn in_sphere(&mut self, radius: f32) -> Vec3 {
        self.random_direction() * radius * self.next_f32().cbrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = ParticleRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn rng_direction_unit_length() {
        let mut rng = ParticleRng::new(123);
        for _ in 0..100 {
            let d = rng.random_direction();
            assert!((d.length() - 1.0).abs() < 0.01);
        }
    }

    #[test]
    fn index_stays_in_bounds() {
        let mut rng = ParticleRng::new(7);
        for _ in 0..1000 {
            assert!(rng.index(13) < 13);
        }
        assert_eq!(rng.index(1), 0);
    }

    #[test]
    fn in_sphere_respects_radius() {
        let mut rng = ParticleRng::new(99);
        for _ in 0..200 {
            assert!(rng.in_sphere(4.0).length() <= 4.0 + 1e-4);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ParticleRng::new(5);
        let mut b = ParticleRng::new(5);
        for _ in 0..50 {
            assert_eq!(a.next_f32(), b.next_f32());
        }
    }
}
