//! Blake2b hashing for randomness seeds.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use valelect_types::Seed;

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the next seed in a chain by hashing the current one.
pub fn next_seed(seed: &Seed) -> Seed {
    Seed::new(blake2b_256(seed.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blake2b_deterministic() {
        let h1 = blake2b_256(b"validator group");
        let h2 = blake2b_256(b"validator group");
        assert_eq!(h1, h2);
    }

    #[test]
    fn blake2b_different_inputs() {
        assert_ne!(blake2b_256(b"hello"), blake2b_256(b"world"));
    }

    #[test]
    fn blake2b_multi_equivalent() {
        let single = blake2b_256(b"helloworld");
        let multi = blake2b_256_multi(&[b"hello", b"world"]);
        assert_eq!(single, multi);
    }

    #[test]
    fn seed_chain_advances() {
        let s0 = Seed::new([7u8; 32]);
        let s1 = next_seed(&s0);
        let s2 = next_seed(&s1);
        assert_ne!(s0, s1);
        assert_ne!(s1, s2);
        assert_eq!(next_seed(&s0), s1);
    }
}
