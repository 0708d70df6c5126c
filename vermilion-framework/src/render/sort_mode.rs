use crate::render::{RenderObject, RenderView};
use glam::Vec3;

/// A packed draw-ordering key: depth first, then visibility-group and
/// render-feature indices as stable tie-breakers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey {
    pub value: u32,
    pub visibility_group_index: u16,
    pub render_feature_index: u16,
}

impl SortKey {
    pub fn packed(&self) -> u64 {
        ((self.value as u64) << 32)
            | ((self.visibility_group_index as u64) << 16)
            | self.render_feature_index as u64
    }
}

/// Generates sort keys for render objects within a stage.
pub trait SortMode: Send + Sync {
    fn generate_sort_key(
        &self,
        view: &RenderView,
        object: &RenderObject,
    ) -> SortKey;

    fn generate_sort_keys(
        &self,
        view: &RenderView,
        objects: &[RenderObject],
        out_sort_keys: &mut Vec<SortKey>,
    ) {
        out_sort_keys.clear();
        out_sort_keys.reserve(objects.len());
        for object in objects {
            out_sort_keys.push(self.generate_sort_key(view, object));
        }
    }
}

// Monotonic unsigned ordering for an IEEE float: flip the sign bit for positive
// values, flip everything for negative ones
// (http://aras-p.info/blog/2014/01/16/rough-sorting-by-depth/)
fn compute_distance(distance: f32) -> u32 {
    let bits = distance.to_bits();
    let mask = ((-((bits >> 31) as i32)) as u32) | 0x8000_0000;
    mask ^ bits
}

/// Orders objects by distance from the view plane.
pub struct DistanceSortMode {
    sort_back_to_front: bool,
}

impl DistanceSortMode {
    pub fn new(sort_back_to_front: bool) -> Self {
        DistanceSortMode { sort_back_to_front }
    }

    fn view_plane_distance(
        view: &RenderView,
        position: Vec3,
    ) -> f32 {
        let inverse_view = view.view_matrix().inverse();
        let forward = -inverse_view.col(2).truncate();
        let origin = inverse_view.col(3).truncate();
        forward.dot(position - origin)
    }
}

impl SortMode for DistanceSortMode {
    fn generate_sort_key(
        &self,
        view: &RenderView,
        object: &RenderObject,
    ) -> SortKey {
        let distance = Self::view_plane_distance(view, object.bounding_box.center());
        let mut value = compute_distance(distance);
        if self.sort_back_to_front {
            value = !value;
        }

        SortKey {
            value,
            visibility_group_index: object.visibility_group_index,
            render_feature_index: object.render_feature_index,
        }
    }
}

pub struct FrontToBackSortMode(DistanceSortMode);

impl FrontToBackSortMode {
    pub fn new() -> Self {
        FrontToBackSortMode(DistanceSortMode::new(false))
    }
}

impl Default for FrontToBackSortMode {
    fn default() -> Self {
        Self::new()
    }
}

impl SortMode for FrontToBackSortMode {
    fn generate_sort_key(
        &self,
        view: &RenderView,
        object: &RenderObject,
    ) -> SortKey {
        self.0.generate_sort_key(view, object)
    }
}

pub struct BackToFrontSortMode(DistanceSortMode);

impl BackToFrontSortMode {
    pub fn new() -> Self {
        BackToFrontSortMode(DistanceSortMode::new(true))
    }
}

impl Default for BackToFrontSortMode {
    fn default() -> Self {
        Self::new()
    }
}

impl SortMode for BackToFrontSortMode {
    fn generate_sort_key(
        &self,
        view: &RenderView,
        object: &RenderObject,
    ) -> SortKey {
        self.0.generate_sort_key(view, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AxisAlignedBoundingBox;
    use crate::render::{CullingMode, RenderStageMask};
    use glam::Mat4;

    fn view_at_origin() -> RenderView {
        RenderView::new(
            "sort-test",
            Vec3::ZERO,
            Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
            Mat4::IDENTITY,
            CullingMode::None,
        )
    }

    fn object_at_depth(
        depth: f32,
        visibility_group_index: u16,
        render_feature_index: u16,
    ) -> RenderObject {
        RenderObject {
            bounding_box: AxisAlignedBoundingBox::from_center_and_half_extents(
                Vec3::new(0.0, 0.0, -depth),
                Vec3::splat(0.5),
            ),
            stage_mask: RenderStageMask::empty(),
            render_feature_index,
            visibility_group_index,
            key: Default::default(),
        }
    }

    #[test]
    fn monotonic_distance_mapping() {
        assert!(compute_distance(-5.0) < compute_distance(-1.0));
        assert!(compute_distance(-1.0) < compute_distance(0.0));
        assert!(compute_distance(0.0) < compute_distance(1.0));
        assert!(compute_distance(1.0) < compute_distance(5.0));
    }

    #[test]
    fn front_to_back_orders_near_first() {
        let view = view_at_origin();
        let sort_mode = FrontToBackSortMode::new();

        let near = sort_mode.generate_sort_key(&view, &object_at_depth(1.0, 0, 0));
        let far = sort_mode.generate_sort_key(&view, &object_at_depth(10.0, 0, 0));
        assert!(near < far);
    }

    #[test]
    fn back_to_front_reverses_the_order() {
        let view = view_at_origin();
        let sort_mode = BackToFrontSortMode::new();

        let near = sort_mode.generate_sort_key(&view, &object_at_depth(1.0, 0, 0));
        let far = sort_mode.generate_sort_key(&view, &object_at_depth(10.0, 0, 0));
        assert!(far < near);
    }

    #[test]
    fn ties_break_on_group_then_feature() {
        let view = view_at_origin();
        let sort_mode = FrontToBackSortMode::new();

        let a = sort_mode.generate_sort_key(&view, &object_at_depth(4.0, 0, 1));
        let b = sort_mode.generate_sort_key(&view, &object_at_depth(4.0, 1, 0));
        assert_eq!(a.value, b.value);
        assert!(a < b);

        let c = sort_mode.generate_sort_key(&view, &object_at_depth(4.0, 0, 2));
        assert!(a < c);

        // The packed form orders the same way
        assert!(a.packed() < b.packed());
        assert!(a.packed() < c.packed());
    }
}
