use std::collections::HashSet;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use catalchemy_core::EntityKind;

/// Number of random bytes in an identifier suffix (two hex chars each).
const SUFFIX_BYTES: usize = 4;

/// Collision-free identifier source for one entity kind.
///
/// Every id issued by an allocator is remembered for the allocator's
/// lifetime, so ids never repeat across `allocate` calls. Two allocators
/// share nothing: ids of different kinds stay apart only through their
/// prefix.
#[derive(Debug)]
pub struct IdAllocator<R: RngCore = ChaCha8Rng> {
    prefix: String,
    used: HashSet<String>,
    rng: R,
}

impl IdAllocator<ChaCha8Rng> {
    /// Allocator for `kind` seeded from the run seed.
    pub fn seeded(kind: EntityKind, seed: u64) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(hash_seed(seed, kind.id_prefix()));
        Self::with_rng(kind.id_prefix(), rng)
    }
}

impl<R: RngCore> IdAllocator<R> {
    pub fn with_rng(prefix: impl Into<String>, rng: R) -> Self {
        Self {
            prefix: prefix.into(),
            used: HashSet::new(),
            rng,
        }
    }

    /// Issue `count` new ids, none of which was issued before.
    ///
    /// Suffixes are drawn by rejection sampling with no retry bound.
    pub fn allocate(&mut self, count: usize) -> Vec<String> {
        let mut ids = Vec::with_capacity(count);
        while ids.len() < count {
            let candidate = self.draw();
            if self.used.insert(candidate.clone()) {
                ids.push(candidate);
            }
        }
        ids
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> usize {
        self.used.len()
    }

    fn draw(&mut self) -> String {
        let mut bytes = [0_u8; SUFFIX_BYTES];
        self.rng.fill_bytes(&mut bytes);
        format!("{}_{}", self.prefix, hex::encode(bytes))
    }
}

/// Derive a stable sub-seed for `key` from the run seed (FNV-1a).
pub(crate) fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of 32-bit values, looping at the end.
    struct ScriptedRng {
        values: Vec<u32>,
        cursor: usize,
    }

    impl ScriptedRng {
        fn new(values: Vec<u32>) -> Self {
            Self { values, cursor: 0 }
        }
    }

    impl RngCore for ScriptedRng {
        fn next_u32(&mut self) -> u32 {
            let value = self.values[self.cursor % self.values.len()];
            self.cursor += 1;
            value
        }

        fn next_u64(&mut self) -> u64 {
            self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for chunk in dst.chunks_mut(4) {
                let bytes = self.next_u32().to_be_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    #[test]
    fn ids_are_unique_across_calls() {
        let mut allocator = IdAllocator::seeded(EntityKind::Product, 7);
        let mut all = HashSet::new();
        for _ in 0..20 {
            for id in allocator.allocate(50) {
                assert!(id.starts_with("product_"));
                assert_eq!(id.len(), "product_".len() + SUFFIX_BYTES * 2);
                assert!(all.insert(id));
            }
        }
        assert_eq!(allocator.issued(), 1000);
    }

    #[test]
    fn collisions_are_redrawn() {
        let rng = ScriptedRng::new(vec![1, 1, 1, 2, 2, 3]);
        let mut allocator = IdAllocator::with_rng("brand", rng);

        let first = allocator.allocate(2);
        assert_eq!(first, vec!["brand_00000001", "brand_00000002"]);

        let second = allocator.allocate(1);
        assert_eq!(second, vec!["brand_00000003"]);
        assert_eq!(allocator.issued(), 3);
    }

    #[test]
    fn independent_allocators_may_collide() {
        let mut left = IdAllocator::with_rng("review", ScriptedRng::new(vec![42]));
        let mut right = IdAllocator::with_rng("review", ScriptedRng::new(vec![42]));

        let left_ids = left.allocate(1);
        let right_ids = right.allocate(1);

        // Each allocator only guards its own ids.
        assert_eq!(left_ids, right_ids);
    }

    #[test]
    fn seeded_allocators_are_reproducible() {
        let mut a = IdAllocator::seeded(EntityKind::Brand, 99);
        let mut b = IdAllocator::seeded(EntityKind::Brand, 99);
        assert_eq!(a.allocate(5), b.allocate(5));
    }
}
