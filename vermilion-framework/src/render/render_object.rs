use crate::geometry::AxisAlignedBoundingBox;

pub type RenderFeatureIndex = u16;
pub type RenderStageIndex = u32;
pub type VisibilityGroupIndex = u16;

pub const MAX_RENDER_STAGE_COUNT: u32 = 32;

slotmap::new_key_type! {
    /// Generation-checked arena key of a render object within its visibility group.
    /// Removal-with-swap inside the arena can never silently invalidate a stale key
    /// held elsewhere; a stale key simply stops resolving.
    pub struct RenderObjectKey;
}

/// The set of render stages an object participates in.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderStageMask(u32);

impl RenderStageMask {
    pub fn empty() -> Self {
        RenderStageMask(0)
    }

    pub fn with_stage(
        mut self,
        index: RenderStageIndex,
    ) -> Self {
        assert!(index < MAX_RENDER_STAGE_COUNT);
        self.0 |= 1 << index;
        self
    }

    pub fn is_included(
        &self,
        index: RenderStageIndex,
    ) -> bool {
        assert!(index < MAX_RENDER_STAGE_COUNT);
        (self.0 & (1 << index)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Per-object renderable state owned by a visibility group.
#[derive(Clone, Debug, Default)]
pub struct RenderObject {
    /// World-space bounds. An invalid box opts the object out of frustum culling.
    pub bounding_box: AxisAlignedBoundingBox,
    pub stage_mask: RenderStageMask,
    pub render_feature_index: RenderFeatureIndex,
    /// Assigned when the object is added to a visibility group
    pub visibility_group_index: VisibilityGroupIndex,
    /// The arena key, assigned when the object is added to a visibility group
    pub key: RenderObjectKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_mask_inclusion() {
        let mask = RenderStageMask::empty().with_stage(0).with_stage(5);
        assert!(mask.is_included(0));
        assert!(mask.is_included(5));
        assert!(!mask.is_included(1));
        assert!(RenderStageMask::empty().is_empty());
    }

    #[test]
    #[should_panic]
    fn stage_index_out_of_range() {
        let _ = RenderStageMask::empty().with_stage(MAX_RENDER_STAGE_COUNT);
    }
}
