use crate::geometry::{AxisAlignedBoundingBox, FrustumTestResult};
use crate::render::{
    CullingMode, RenderObject, RenderObjectKey, RenderView, VisibilityGroupIndex,
    VisibleRenderObject,
};
use parking_lot::RwLock;
use slotmap::SlotMap;
use std::sync::atomic::{AtomicU64, Ordering};

// Below this object count the fork-join overhead outweighs the culling work
const PARALLEL_EXTRACT_THRESHOLD: usize = 256;

/// The per-scene collection of render objects subject to frustum culling for a set
/// of views.
///
/// Objects live in a generation-checked arena; removal is O(1) and a stale key held
/// by other systems simply stops resolving instead of silently aliasing a swapped-in
/// neighbor.
pub struct VisibilityGroup {
    index: VisibilityGroupIndex,
    objects: RwLock<SlotMap<RenderObjectKey, RenderObject>>,
    frustum_test_count: AtomicU64,
}

impl VisibilityGroup {
    pub fn new(index: VisibilityGroupIndex) -> Self {
        VisibilityGroup {
            index,
            objects: RwLock::new(SlotMap::with_key()),
            frustum_test_count: AtomicU64::new(0),
        }
    }

    pub fn index(&self) -> VisibilityGroupIndex {
        self.index
    }

    pub fn add_render_object(
        &self,
        mut object: RenderObject,
    ) -> RenderObjectKey {
        object.visibility_group_index = self.index;
        self.objects.write().insert_with_key(|key| {
            object.key = key;
            object
        })
    }

    /// Removes an object. Returns false for a stale or unknown key.
    pub fn remove_render_object(
        &self,
        key: RenderObjectKey,
    ) -> bool {
        self.objects.write().remove(key).is_some()
    }

    pub fn get_render_object(
        &self,
        key: RenderObjectKey,
    ) -> Option<RenderObject> {
        self.objects.read().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Number of frustum tests performed since creation. Instrumentation for tests
    /// and stats HUDs.
    pub fn frustum_test_count(&self) -> u64 {
        self.frustum_test_count.load(Ordering::Acquire)
    }

    /// Culls this group's objects into the view's visible set.
    ///
    /// Idempotent per (view, frame): the view's last-collected-frame stamp makes a
    /// second extraction request within the same frame a no-op. The culling loop is
    /// parallelized over index ranges; every worker accumulates its own bounding
    /// box which is merged after the join, and visible objects land in the view's
    /// internally-synchronized collector.
    pub fn extract(
        &self,
        view: &RenderView,
        frame_count: u64,
    ) {
        profiling::scope!("VisibilityGroup::extract");

        if !view.begin_extract(frame_count) {
            return;
        }

        let objects = self.objects.read();
        let keys: Vec<RenderObjectKey> = objects.keys().collect();

        if keys.len() < PARALLEL_EXTRACT_THRESHOLD {
            let bounds = self.extract_range(&objects, &keys, view);
            view.expand_bounding_box(&bounds);
        } else {
            let worker_count = std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(4)
                .min(keys.len());
            let chunk_size = (keys.len() + worker_count - 1) / worker_count;

            let objects = &*objects;
            std::thread::scope(|scope| {
                let mut workers = Vec::with_capacity(worker_count);
                for chunk in keys.chunks(chunk_size) {
                    workers.push(
                        scope.spawn(move || self.extract_range(objects, chunk, view)),
                    );
                }

                for worker in workers {
                    let bounds = worker.join().expect("extraction worker panicked");
                    view.expand_bounding_box(&bounds);
                }
            });
        }

        view.close_visible();
    }

    fn extract_range(
        &self,
        objects: &SlotMap<RenderObjectKey, RenderObject>,
        keys: &[RenderObjectKey],
        view: &RenderView,
    ) -> AxisAlignedBoundingBox {
        let mut local_bounds = AxisAlignedBoundingBox::invalid();

        for key in keys {
            let Some(object) = objects.get(*key) else {
                continue;
            };

            if view.culling_mode() == CullingMode::Frustum && object.bounding_box.is_valid() {
                self.frustum_test_count.fetch_add(1, Ordering::AcqRel);
                if view.frustum().test_aabb(&object.bounding_box) == FrustumTestResult::Outside {
                    continue;
                }
            }

            view.add_visible(VisibleRenderObject {
                visibility_group_index: self.index,
                key: *key,
            });
            local_bounds.expand_to_include(&object.bounding_box);
        }

        local_bounds
    }
}
