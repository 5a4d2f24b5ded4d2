//! The noise source driving randomized soup construction.

use crate::error::Error;
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// A fast 64-bit generator with a small fixed internal state.
///
/// Wraps xoshiro256**, whose rotate-multiply-xor update is statistically
/// strong enough for soup construction while staying a handful of
/// instructions per draw.
pub struct Noise(Xoshiro256StarStar);

impl Noise {
    /// Seeds the generator from the operating system's entropy source.
    pub fn from_entropy() -> Result<Self, Error> {
        let mut seed = [0; 32];
        getrandom::getrandom(&mut seed)?;
        Ok(Noise(Xoshiro256StarStar::from_seed(seed)))
    }

    /// Seeds the generator from a fixed value, for reproducible runs.
    pub fn from_seed(seed: u64) -> Self {
        Noise(Xoshiro256StarStar::seed_from_u64(seed))
    }

    /// An unbiased value in `[0, range)`.
    ///
    /// Draws at or above the largest multiple of `range` representable in
    /// 64 bits are discarded and redrawn, so no residue class is favored.
    /// `range == 0` returns 0 by definition.
    pub fn uniform(&mut self, range: u32) -> u32 {
        if range == 0 {
            return 0;
        }
        let range = u64::from(range);
        let zone = u64::MAX - u64::MAX % range;
        loop {
            let draw = self.0.next_u64();
            if draw < zone {
                return (draw % range) as u32;
            }
        }
    }
}
