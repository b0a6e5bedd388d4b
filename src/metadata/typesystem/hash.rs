//! Method signature hashing for override detection.
//!
//! This module provides [`SignatureHash`], used to decide whether a method hides (overrides) a
//! method of the same shape further up a base chain. Two methods share a signature when their
//! names and the canonical names of their parameter types are equal, in order. The hash uses
//! FNV-1a inspired sequential mixing so that component order matters and equal components do
//! not cancel each other out.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use hubscope::metadata::typesystem::hash::SignatureHash;
//!
//! let hash = SignatureHash::new()
//!     .add_name("SendMessage")
//!     .add_type_name("System.String")
//!     .add_type_name("System.String")
//!     .finalize();
//! ```

use std::hash::{DefaultHasher, Hash, Hasher};

/// Hash builder for method signatures using FNV-1a inspired mixing
pub struct SignatureHash {
    /// Current hash state using FNV-1a algorithm principles
    state: u64,
}

impl SignatureHash {
    /// Create a new signature hash builder
    #[must_use]
    pub fn new() -> Self {
        SignatureHash {
            state: 0xcbf2_9ce4_8422_2325_u64, // FNV-1a 64-bit offset basis
        }
    }

    fn mix(&mut self, value: u64) {
        self.state ^= value;
        self.state = self.state.wrapping_mul(0x0100_0000_01b3_u64); // FNV-1a 64-bit prime

        self.state ^= self.state >> 33;
        self.state = self.state.wrapping_mul(0xff51_afd7_ed55_8ccd_u64);
        self.state ^= self.state >> 33;
    }

    /// Add a hashable component to the signature
    #[must_use]
    pub fn add_component<T: Hash + ?Sized>(mut self, component: &T) -> Self {
        let mut hasher = DefaultHasher::new();
        component.hash(&mut hasher);
        self.mix(hasher.finish());
        self
    }

    /// Add the member name to the signature
    #[must_use]
    pub fn add_name(self, name: &str) -> Self {
        self.add_component(name)
    }

    /// Add a parameter type, identified by its canonical name
    ///
    /// Types without a canonical name (open generic parameters) are hashed by their display
    /// form, which keeps `!0` and `!!0` apart.
    #[must_use]
    pub fn add_type_name(self, canonical_name: &str) -> Self {
        self.add_component(canonical_name)
    }

    /// Finalize the hash and return the computed signature
    #[must_use]
    pub fn finalize(self) -> u64 {
        self.state
    }
}

impl Default for SignatureHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let hash1 = SignatureHash::new()
            .add_name("SendMessage")
            .add_type_name("System.String")
            .finalize();
        let hash2 = SignatureHash::new()
            .add_name("SendMessage")
            .add_type_name("System.String")
            .finalize();

        assert_eq!(hash1, hash2, "Hash should be deterministic");
    }

    #[test]
    fn test_hash_order_sensitive() {
        let hash1 = SignatureHash::new()
            .add_name("Move")
            .add_type_name("System.Int32")
            .add_type_name("System.String")
            .finalize();
        let hash2 = SignatureHash::new()
            .add_name("Move")
            .add_type_name("System.String")
            .add_type_name("System.Int32")
            .finalize();

        assert_ne!(hash1, hash2, "Hash should be order-sensitive");
    }

    #[test]
    fn test_repeated_components_do_not_cancel() {
        let empty = SignatureHash::new().add_name("Ping").finalize();
        let doubled = SignatureHash::new()
            .add_name("Ping")
            .add_type_name("System.Int32")
            .add_type_name("System.Int32")
            .finalize();

        assert_ne!(empty, doubled);
    }
}
