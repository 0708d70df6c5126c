use crate::render::{
    RenderObjectKey, RenderStageIndex, RenderSystem, RenderView, RenderViewIndex, SortKey,
    VisibilityGroupIndex,
};
use fnv::FnvHashMap;
use std::sync::Arc;

/// One sorted draw entry produced by the prepare phase.
#[derive(Debug, Copy, Clone)]
pub struct DrawListEntry {
    pub sort_key: SortKey,
    pub visibility_group_index: VisibilityGroupIndex,
    pub key: RenderObjectKey,
}

/// Everything one frame extracts: the collected views and the per-(stage, view)
/// sorted draw lists.
#[derive(Default)]
pub struct RenderContextData {
    pub views: Vec<Arc<RenderView>>,
    pub draw_lists: FnvHashMap<(RenderStageIndex, RenderViewIndex), Vec<DrawListEntry>>,
}

impl RenderContextData {
    pub fn clear(&mut self) {
        self.views.clear();
        self.draw_lists.clear();
    }
}

/// Double-buffered per-frame extraction storage. Extraction writes one slot while
/// rendering reads the other; the slot choice comes exclusively from the render
/// system's parity accessors — indexing `data` any other way is a correctness
/// hazard.
#[derive(Default)]
pub struct RenderContext {
    data: [RenderContextData; 2],
}

impl RenderContext {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn data_for_extraction(
        &self,
        render_system: &RenderSystem,
    ) -> &RenderContextData {
        &self.data[render_system.data_index_for_extraction()]
    }

    pub fn data_for_extraction_mut(
        &mut self,
        render_system: &RenderSystem,
    ) -> &mut RenderContextData {
        &mut self.data[render_system.data_index_for_extraction()]
    }

    pub fn data_for_rendering(
        &self,
        render_system: &RenderSystem,
    ) -> &RenderContextData {
        &self.data[render_system.data_index_for_rendering()]
    }
}
