use glam::Vec3;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisAlignedBoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for AxisAlignedBoundingBox {
    fn default() -> Self {
        Self::invalid()
    }
}

impl AxisAlignedBoundingBox {
    /// An empty box that any point or box can be expanded into
    pub fn invalid() -> Self {
        AxisAlignedBoundingBox {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
        }
    }

    pub fn new(
        min: Vec3,
        max: Vec3,
    ) -> Self {
        AxisAlignedBoundingBox { min, max }
    }

    pub fn from_center_and_half_extents(
        center: Vec3,
        half_extents: Vec3,
    ) -> Self {
        AxisAlignedBoundingBox {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn expand_to_include_point(
        &mut self,
        point: Vec3,
    ) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn expand_to_include(
        &mut self,
        other: &AxisAlignedBoundingBox,
    ) {
        if !other.is_valid() {
            return;
        }
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }
}
