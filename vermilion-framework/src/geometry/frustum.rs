use crate::geometry::{AxisAlignedBoundingBox, Plane};
use glam::{Mat4, Vec3};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrustumTestResult {
    Outside,
    Intersecting,
    Inside,
}

/// A view frustum as six inward-facing planes.
#[derive(Clone, Debug, Default)]
pub struct Frustum {
    pub planes: [Plane; 6],
}

impl Frustum {
    pub const LEFT: usize = 0;
    pub const RIGHT: usize = 1;
    pub const BOTTOM: usize = 2;
    pub const TOP: usize = 3;
    pub const NEAR: usize = 4;
    pub const FAR: usize = 5;

    /// Extracts the planes from a view-projection matrix. Assumes a [0, 1] clip
    /// space depth range.
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let row0 = view_proj.row(0);
        let row1 = view_proj.row(1);
        let row2 = view_proj.row(2);
        let row3 = view_proj.row(3);

        Frustum {
            planes: [
                Plane::from_coefficients(row3 + row0),
                Plane::from_coefficients(row3 - row0),
                Plane::from_coefficients(row3 + row1),
                Plane::from_coefficients(row3 - row1),
                Plane::from_coefficients(row2),
                Plane::from_coefficients(row3 - row2),
            ],
        }
    }

    pub fn contains_point(
        &self,
        point: Vec3,
    ) -> bool {
        for plane in &self.planes {
            if plane.distance(point) < 0.0 {
                return false;
            }
        }

        true
    }

    /// Classifies an axis-aligned bounding box against the frustum.
    pub fn test_aabb(
        &self,
        aabb: &AxisAlignedBoundingBox,
    ) -> FrustumTestResult {
        let center = aabb.center();
        let half_extents = aabb.half_extents();
        let mut intersecting = false;

        for plane in &self.planes {
            let normal = plane.get_normal();
            // Projection radius of the box onto the plane normal
            let radius = half_extents.dot(normal.abs());
            let distance = plane.distance(center);

            if distance < -radius {
                return FrustumTestResult::Outside;
            }
            if distance < radius {
                intersecting = true;
            }
        }

        if intersecting {
            FrustumTestResult::Intersecting
        } else {
            FrustumTestResult::Inside
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_frustum() -> Frustum {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        Frustum::from_view_proj(&(proj * view))
    }

    #[test]
    fn points_in_front_are_inside() {
        let frustum = test_frustum();
        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        assert!(!frustum.contains_point(Vec3::new(200.0, 0.0, -10.0)));
    }

    #[test]
    fn aabb_classification() {
        let frustum = test_frustum();

        let inside = AxisAlignedBoundingBox::from_center_and_half_extents(
            Vec3::new(0.0, 0.0, -10.0),
            Vec3::splat(1.0),
        );
        assert_eq!(frustum.test_aabb(&inside), FrustumTestResult::Inside);

        let outside = AxisAlignedBoundingBox::from_center_and_half_extents(
            Vec3::new(0.0, 0.0, 50.0),
            Vec3::splat(1.0),
        );
        assert_eq!(frustum.test_aabb(&outside), FrustumTestResult::Outside);

        let straddling = AxisAlignedBoundingBox::from_center_and_half_extents(
            Vec3::new(0.0, 0.0, -100.0),
            Vec3::splat(5.0),
        );
        assert_eq!(
            frustum.test_aabb(&straddling),
            FrustumTestResult::Intersecting
        );
    }
}
