//! Layer masks: a 32-bit set selecting which renderable layers a camera or
//! selection rule includes.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, Not};

/// Number of addressable layers.
pub const LAYER_COUNT: u8 = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer index {0} out of range (0..32)")]
    OutOfRange(u8),
}

/// Bitset over the 32 render layers. Serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    pub const NONE: LayerMask = LayerMask(0);

    pub fn from_layer(layer: u8) -> Result<Self, LayerError> {
        if layer >= LAYER_COUNT {
            return Err(LayerError::OutOfRange(layer));
        }
        Ok(Self(1 << layer))
    }

    pub fn from_layers<I>(layers: I) -> Result<Self, LayerError>
    where
        I: IntoIterator<Item = u8>,
    {
        layers
            .into_iter()
            .try_fold(Self::NONE, |mask, layer| Ok(mask | Self::from_layer(layer)?))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, layer: u8) -> bool {
        layer < LAYER_COUNT && self.0 & (1 << layer) != 0
    }

    pub fn intersection(self, other: LayerMask) -> LayerMask {
        Self(self.0 & other.0)
    }

    pub fn union(self, other: LayerMask) -> LayerMask {
        Self(self.0 | other.0)
    }

    /// Layers in `self` that are not in `other`.
    pub fn without(self, other: LayerMask) -> LayerMask {
        Self(self.0 & !other.0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate set layer indices in ascending order.
    pub fn layers(self) -> impl Iterator<Item = u8> {
        (0..LAYER_COUNT).filter(move |&layer| self.contains(layer))
    }
}

impl BitAnd for LayerMask {
    type Output = LayerMask;

    fn bitand(self, rhs: LayerMask) -> LayerMask {
        self.intersection(rhs)
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        self.union(rhs)
    }
}

impl Not for LayerMask {
    type Output = LayerMask;

    fn not(self) -> LayerMask {
        Self(!self.0)
    }
}

impl std::fmt::Display for LayerMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selects_all_layers() {
        assert_eq!(LayerMask::default(), LayerMask::ALL);
        assert_eq!(LayerMask::ALL.count(), 32);
    }

    #[test]
    fn from_layer_rejects_out_of_range() {
        assert_eq!(LayerMask::from_layer(31).unwrap().bits(), 1 << 31);
        assert_eq!(LayerMask::from_layer(32), Err(LayerError::OutOfRange(32)));
    }

    #[test]
    fn from_layers_collects() {
        let mask = LayerMask::from_layers([0, 3, 5]).unwrap();
        assert_eq!(mask.bits(), 0b101001);
        assert_eq!(mask.layers().collect::<Vec<_>>(), vec![0, 3, 5]);
    }

    #[test]
    fn set_operations() {
        let a = LayerMask(0b1100);
        let b = LayerMask(0b1010);
        assert_eq!(a & b, LayerMask(0b1000));
        assert_eq!(a | b, LayerMask(0b1110));
        assert_eq!(a.without(b), LayerMask(0b0100));
        assert_eq!((!a).intersection(a), LayerMask::NONE);
        assert!(LayerMask::NONE.is_empty());
    }

    #[test]
    fn contains_ignores_out_of_range_index() {
        assert!(!LayerMask::ALL.contains(40));
    }

    #[test]
    fn serializes_as_integer() {
        let json = serde_json::to_string(&LayerMask(12)).unwrap();
        assert_eq!(json, "12");
        let back: LayerMask = serde_json::from_str("4294967295").unwrap();
        assert_eq!(back, LayerMask::ALL);
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(LayerMask(0x30).to_string(), "0x00000030");
    }
}
