use glam::{Vec3, Vec4};

/// A plane in normal/distance form. `normal.xyz` is the unit normal, `normal.w` the
/// signed distance term, so `distance(p) = dot(n, p) + w`.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec4,
}

impl Plane {
    pub fn new(
        normal: Vec3,
        point: Vec3,
    ) -> Self {
        let normal = normal.normalize();
        let d = -normal.dot(point);

        Plane {
            normal: normal.extend(d),
        }
    }

    /// Builds a plane from unnormalized coefficients, e.g. extracted from a
    /// view-projection matrix
    pub fn from_coefficients(coefficients: Vec4) -> Self {
        let length = coefficients.truncate().length();
        Plane {
            normal: coefficients / length,
        }
    }

    pub fn get_normal(&self) -> Vec3 {
        self.normal.truncate()
    }

    pub fn distance(
        &self,
        p: Vec3,
    ) -> f32 {
        self.normal.w + self.normal.truncate().dot(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_signed() {
        let plane = Plane::new(Vec3::Y, Vec3::ZERO);
        assert!(plane.distance(Vec3::new(0.0, 2.0, 0.0)) > 0.0);
        assert!(plane.distance(Vec3::new(0.0, -2.0, 0.0)) < 0.0);
        assert_eq!(plane.distance(Vec3::ZERO), 0.0);
    }
}
