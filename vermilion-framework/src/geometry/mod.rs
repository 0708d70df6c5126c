mod aabb;
mod frustum;
mod plane;

pub use aabb::AxisAlignedBoundingBox;
pub use frustum::{Frustum, FrustumTestResult};
pub use plane::Plane;
