use scaleview_common::LayerMask;

/// Disjoint split of a camera's visible layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerPartition {
    /// Rendered by the secondary camera at reduced resolution.
    pub scaled: LayerMask,
    /// Left on the primary camera at native resolution.
    pub full_resolution: LayerMask,
}

impl LayerPartition {
    /// The layers the primary camera could see before the split.
    pub fn visible(&self) -> LayerMask {
        self.scaled | self.full_resolution
    }
}

/// Split `visible` by `selection`. Selected layers the camera cannot see are
/// dropped.
pub fn partition(visible: LayerMask, selection: LayerMask) -> LayerPartition {
    let scaled = visible & selection;
    LayerPartition {
        scaled,
        full_resolution: visible.without(scaled),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_disjoint_cover(visible: LayerMask, selection: LayerMask) {
        let p = partition(visible, selection);
        assert_eq!(p.visible(), visible);
        assert!((p.scaled & p.full_resolution).is_empty());
    }

    #[test]
    fn split_covers_visible_set() {
        assert_disjoint_cover(LayerMask(0b1111), LayerMask(0b0110));
        assert_disjoint_cover(LayerMask::ALL, LayerMask(0x8000_0001));
        assert_disjoint_cover(LayerMask::NONE, LayerMask::ALL);
        assert_disjoint_cover(LayerMask(0xdead_beef), LayerMask(0x1234_5678));
    }

    #[test]
    fn wide_selection_keeps_only_intersection() {
        let p = partition(LayerMask(0b0011), LayerMask::ALL);
        assert_eq!(p.scaled, LayerMask(0b0011));
        assert!(p.full_resolution.is_empty());

        let p = partition(LayerMask(0b0011), LayerMask(0b1110));
        assert_eq!(p.scaled, LayerMask(0b0010));
        assert_eq!(p.full_resolution, LayerMask(0b0001));
    }

    #[test]
    fn empty_selection_keeps_everything_native() {
        let p = partition(LayerMask(0b1011), LayerMask::NONE);
        assert!(p.scaled.is_empty());
        assert_eq!(p.full_resolution, LayerMask(0b1011));
    }
}
