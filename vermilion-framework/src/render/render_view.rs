use crate::geometry::{AxisAlignedBoundingBox, Frustum};
use crate::render::{RenderObjectKey, VisibilityGroupIndex};
use glam::{Mat4, Vec3};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use vermilion_base::ConcurrentCollector;

pub type RenderViewIndex = u32;

const FRAME_NEVER: u64 = u64::MAX;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CullingMode {
    /// Every object is visible
    None,
    /// Objects outside the view frustum are excluded
    Frustum,
}

/// A visible render object reference recorded during extraction. The group index
/// disambiguates keys from different visibility group arenas.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VisibleRenderObject {
    pub visibility_group_index: VisibilityGroupIndex,
    pub key: RenderObjectKey,
}

/// A camera (or shadow caster, reflection probe, ...) the renderer extracts and
/// draws. Extraction state is interior-mutable so worker threads can append
/// concurrently; the aggregate bounding box is only touched through
/// `expand_bounding_box`, which merges one worker's accumulator at a time.
pub struct RenderView {
    debug_name: String,
    eye_position: Vec3,
    view_matrix: Mat4,
    proj_matrix: Mat4,
    view_proj: Mat4,
    culling_mode: CullingMode,
    frustum: Frustum,
    view_index: AtomicU32,
    last_collected_frame: AtomicU64,
    visible_objects: RwLock<ConcurrentCollector<VisibleRenderObject>>,
    bounding_box: Mutex<AxisAlignedBoundingBox>,
}

impl RenderView {
    pub fn new(
        debug_name: impl Into<String>,
        eye_position: Vec3,
        view_matrix: Mat4,
        proj_matrix: Mat4,
        culling_mode: CullingMode,
    ) -> Self {
        let debug_name = debug_name.into();
        let view_proj = proj_matrix * view_matrix;
        log::trace!("allocate view {}", debug_name);

        RenderView {
            debug_name,
            eye_position,
            view_matrix,
            proj_matrix,
            view_proj,
            culling_mode,
            frustum: Frustum::from_view_proj(&view_proj),
            view_index: AtomicU32::new(0),
            last_collected_frame: AtomicU64::new(FRAME_NEVER),
            visible_objects: RwLock::new(ConcurrentCollector::new()),
            bounding_box: Mutex::new(AxisAlignedBoundingBox::invalid()),
        }
    }

    pub fn debug_name(&self) -> &str {
        &self.debug_name
    }

    pub fn eye_position(&self) -> Vec3 {
        self.eye_position
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.proj_matrix
    }

    pub fn view_proj(&self) -> Mat4 {
        self.view_proj
    }

    pub fn culling_mode(&self) -> CullingMode {
        self.culling_mode
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Stable index assigned each frame when the collected views are closed
    pub fn view_index(&self) -> RenderViewIndex {
        self.view_index.load(Ordering::Acquire)
    }

    pub fn set_view_index(
        &self,
        index: RenderViewIndex,
    ) {
        self.view_index.store(index, Ordering::Release);
    }

    /// Claims this view for extraction in `frame_count`. Returns false if the view
    /// was already extracted this frame — extraction requests within one frame are
    /// deduplicated on this stamp.
    pub fn begin_extract(
        &self,
        frame_count: u64,
    ) -> bool {
        let previous = self.last_collected_frame.swap(frame_count, Ordering::AcqRel);
        if previous == frame_count {
            return false;
        }

        let mut visible_objects = self.visible_objects.write();
        visible_objects.clear();
        *self.bounding_box.lock() = AxisAlignedBoundingBox::invalid();
        true
    }

    pub fn last_collected_frame(&self) -> Option<u64> {
        match self.last_collected_frame.load(Ordering::Acquire) {
            FRAME_NEVER => None,
            frame => Some(frame),
        }
    }

    /// Appends a visible object. Safe to call from extraction worker threads.
    pub fn add_visible(
        &self,
        visible: VisibleRenderObject,
    ) {
        self.visible_objects.read().add(visible);
    }

    /// Consolidates the visible-object collector. Must happen-after all extraction
    /// workers have finished.
    pub fn close_visible(&self) {
        self.visible_objects.write().close();
    }

    /// Contiguous snapshot of the visible objects. Only valid after
    /// `close_visible`.
    pub fn visible_objects(&self) -> Vec<VisibleRenderObject> {
        self.visible_objects.read().items().to_vec()
    }

    pub fn visible_object_count(&self) -> usize {
        self.visible_objects.read().len()
    }

    /// Merges one extraction worker's local bounding-box accumulator.
    pub fn expand_bounding_box(
        &self,
        bounds: &AxisAlignedBoundingBox,
    ) {
        self.bounding_box.lock().expand_to_include(bounds);
    }

    /// Aggregate bounds of everything visible in this view
    pub fn bounding_box(&self) -> AxisAlignedBoundingBox {
        *self.bounding_box.lock()
    }
}
