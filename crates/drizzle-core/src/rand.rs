//! Lightweight xorshift32 PRNG shared by spawning and wind

pub struct OverlayRng {
    state: u32,
}

impl OverlayRng {
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
        // 24 mantissa bits keep the result strictly below 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Returns a float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Returns a float in [-magnitude, magnitude)
    pub fn signed(&mut self, magnitude: f32) -> f32 {
        self.range(-magnitude, magnitude)
    }

    /// Returns an index in [0, len), or None for an empty range
    pub fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some((self.next_u32() as usize) % len)
    }

    /// Picks a random element of `items`
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.index(items.len()).map(|i| &items[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_range_bounds() {
        let mut rng = OverlayRng::new(42);
        for _ in 0..1000 {
            let v = rng.range(0.0, 10.0);
            assert!((0.0..10.0).contains(&v));
        }
    }

    #[test]
    fn rng_signed_is_symmetric_bound() {
        let mut rng = OverlayRng::new(7);
        for _ in 0..1000 {
            let v = rng.signed(2.0);
            assert!((-2.0..2.0).contains(&v));
        }
    }

    #[test]
    fn rng_pick_empty_and_nonempty() {
        let mut rng = OverlayRng::new(9);
        let empty: [u8; 0] = [];
        assert!(rng.pick(&empty).is_none());
        let items = ["a", "b", "c"];
        for _ in 0..100 {
            assert!(items.contains(rng.pick(&items).unwrap()));
        }
    }

    #[test]
    fn rng_zero_seed_still_advances() {
        let mut rng = OverlayRng::new(0);
        let a = rng.next_f32();
        let b = rng.next_f32();
        assert_ne!(a, b);
    }
}
