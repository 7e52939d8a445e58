//! Stable hashers for computing home slots.
//!
//! The home slot of a key must be the same every time a table file is opened, so the hasher has to
//! be stable across processes and builds.  The std `DefaultHasher` is randomly keyed and is NOT
//! usable here.  Any `BuildHasher + Default` with a stable output can be plugged into a
//! [`HashTable`](crate::table::HashTable); the table records a fingerprint of the hasher in its
//! header and refuses to open with a different one.

use std::hash::{BuildHasherDefault, Hasher};

/// Seed used by [`Mur3Hasher`].  Changing this invalidates every existing table file.
pub const MUR3_SEED: u32 = 0x5eed_db01;

/// Hasher based on murmur3 x64 128, using the low 64 bits of the result.
/// This is the default hasher for a table.
pub struct Mur3Hasher(mur3::Hasher128);

impl Default for Mur3Hasher {
    fn default() -> Self {
        Self(mur3::Hasher128::with_seed(MUR3_SEED))
    }
}

impl Hasher for Mur3Hasher {
    fn finish(&self) -> u64 {
        self.0.finish128().0
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }
}

/// Build hasher for [`Mur3Hasher`].
pub type Mur3BuildHasher = BuildHasherDefault<Mur3Hasher>;

/// Treats the key bytes as a big endian unsigned integer (only the trailing eight bytes count).
///
/// Use this when keys are already uniformly distributed hashes (a crawler's URL hashes for
/// instance) so hashing them again is wasted work.  It also makes collisions trivial to construct.
#[derive(Default)]
pub struct KeyIntHasher(u64);

impl Hasher for KeyIntHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = (self.0 << 8) | *b as u64;
        }
    }
}

/// Build hasher for [`KeyIntHasher`].
pub type KeyIntBuildHasher = BuildHasherDefault<KeyIntHasher>;
