//! Umbrella crate re-exporting the vermilion rendering stack.

pub use vermilion_base as base;

pub use vermilion_rhi as rhi;

#[cfg(feature = "framework")]
pub use vermilion_framework as framework;

#[cfg(feature = "framework")]
pub use vermilion_framework::graph;
