use std::hash::Hasher;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// An f32 that supports Hash and Eq by comparing raw bits. Generally this is dangerous,
/// but resource descriptions are built from deterministic values and never hold NaN, and
/// the description caches require that equal descriptions hash equal.
#[derive(Debug, Copy, Clone, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct DecimalF32(pub f32);

impl From<DecimalF32> for f32 {
    fn from(value: DecimalF32) -> f32 {
        value.0
    }
}

impl From<f32> for DecimalF32 {
    fn from(value: f32) -> DecimalF32 {
        DecimalF32(value)
    }
}

impl PartialEq for DecimalF32 {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        // Bit-exact so Eq stays consistent with Hash (0.0 and -0.0 are distinct)
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for DecimalF32 {}

impl std::hash::Hash for DecimalF32 {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        let bits: u32 = self.0.to_bits();
        bits.hash(state);
    }
}

/// An f64 counterpart of `DecimalF32`.
#[derive(Debug, Copy, Clone, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct DecimalF64(pub f64);

impl From<DecimalF64> for f64 {
    fn from(value: DecimalF64) -> f64 {
        value.0
    }
}

impl From<f64> for DecimalF64 {
    fn from(value: f64) -> DecimalF64 {
        DecimalF64(value)
    }
}

impl PartialEq for DecimalF64 {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for DecimalF64 {}

impl std::hash::Hash for DecimalF64 {
    fn hash<H: Hasher>(
        &self,
        state: &mut H,
    ) {
        let bits: u64 = self.0.to_bits();
        bits.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hash;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_values_hash_equal() {
        let a = DecimalF32(0.25);
        let b = DecimalF32(0.25);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn zero_and_negative_zero_are_distinct() {
        let a = DecimalF32(0.0);
        let b = DecimalF32(-0.0);
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }
}
