use crate::render::{RenderFeatureIndex, RenderView, VisibilityGroup};
use std::sync::Arc;
use vermilion_rhi::VermilionResult;

/// A renderable domain (meshes, sprites, debug lines, ...) that copies its
/// game-world state into a view's extraction data each frame.
///
/// Extraction runs after visibility culling for the view; implementations read the
/// view's visible set and snapshot whatever per-object state drawing will need.
/// They must not touch game-world state afterwards — that is the point of the
/// extraction copy.
pub trait RenderFeature: Send + Sync {
    fn feature_index(&self) -> RenderFeatureIndex;

    fn debug_name(&self) -> &str;

    fn extract(
        &self,
        view: &RenderView,
        visibility_groups: &[Arc<VisibilityGroup>],
    ) -> VermilionResult<()>;
}
