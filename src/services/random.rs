// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random values for fixture generation.

use crate::error::{AppError, Result};
use ring::rand::{SecureRandom, SystemRandom};

/// Source of random 64-bit words, with range helpers built on top.
pub trait RandomSource {
    fn next_u64(&mut self) -> Result<u64>;

    /// Uniform integer in `low..=high` (returns `low` if the range is empty).
    fn int_inclusive(&mut self, low: i64, high: i64) -> Result<i64> {
        if high <= low {
            return Ok(low);
        }

        let span = (high - low) as u64 + 1;
        // Reject the tail so every value is equally likely.
        let limit = u64::MAX - u64::MAX % span;
        loop {
            let x = self.next_u64()?;
            if x < limit {
                return Ok(low + (x % span) as i64);
            }
        }
    }

    /// Uniform real in `low..high`.
    fn uniform(&mut self, low: f64, high: f64) -> Result<f64> {
        // 53 random mantissa bits -> [0, 1)
        let unit = (self.next_u64()? >> 11) as f64 / (1u64 << 53) as f64;
        Ok(low + (high - low) * unit)
    }

    /// Pick one element; `None` for an empty slice.
    fn choose<'a, T>(&mut self, items: &'a [T]) -> Result<Option<&'a T>>
    where
        Self: Sized,
    {
        if items.is_empty() {
            return Ok(None);
        }
        let index = self.int_inclusive(0, items.len() as i64 - 1)?;
        Ok(items.get(index as usize))
    }
}

/// Operating-system randomness.
pub struct SystemRandomSource {
    rng: SystemRandom,
}

impl SystemRandomSource {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for SystemRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for SystemRandomSource {
    fn next_u64(&mut self) -> Result<u64> {
        let mut bytes = [0u8; 8];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
        Ok(u64::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed sequence of words.
    struct Sequence {
        words: Vec<u64>,
        next: usize,
    }

    impl RandomSource for Sequence {
        fn next_u64(&mut self) -> Result<u64> {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            Ok(word)
        }
    }

    fn sequence(words: &[u64]) -> Sequence {
        Sequence {
            words: words.to_vec(),
            next: 0,
        }
    }

    #[test]
    fn test_int_inclusive_bounds() {
        let mut rng = sequence(&[0, 5, 6]);
        assert_eq!(rng.int_inclusive(20, 25).unwrap(), 20);
        assert_eq!(rng.int_inclusive(20, 25).unwrap(), 25);
        assert_eq!(rng.int_inclusive(20, 25).unwrap(), 20);
    }

    #[test]
    fn test_int_inclusive_rejects_biased_tail() {
        // u64::MAX is in the rejected tail for a span of 3
        let mut rng = sequence(&[u64::MAX, 4]);
        assert_eq!(rng.int_inclusive(0, 2).unwrap(), 1);
    }

    #[test]
    fn test_int_inclusive_empty_range() {
        let mut rng = sequence(&[123]);
        assert_eq!(rng.int_inclusive(7, 7).unwrap(), 7);
        assert_eq!(rng.int_inclusive(9, 3).unwrap(), 9);
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = sequence(&[0, u64::MAX]);
        assert_eq!(rng.uniform(1.0, 20.0).unwrap(), 1.0);
        let top = rng.uniform(1.0, 20.0).unwrap();
        assert!(top < 20.0 && top > 19.99);
    }

    #[test]
    fn test_choose() {
        let items = ["a", "b", "c"];
        let mut rng = sequence(&[2]);
        assert_eq!(rng.choose(&items).unwrap(), Some(&"c"));

        let empty: [&str; 0] = [];
        assert_eq!(rng.choose(&empty).unwrap(), None);
    }

    #[test]
    fn test_system_source_ranges() {
        let mut rng = SystemRandomSource::new();
        for _ in 0..1000 {
            let v = rng.int_inclusive(5, 15).unwrap();
            assert!((5..=15).contains(&v));
            let f = rng.uniform(1.0, 20.0).unwrap();
            assert!((1.0..20.0).contains(&f));
        }
    }
}
