//! Lowest level crate of `vermilion`. Support containers and memory helpers shared
//! by the RHI and framework layers.

mod decimal;
pub use decimal::DecimalF32;
pub use decimal::DecimalF64;

pub mod collector;
pub use collector::ConcurrentCollector;

pub mod memory;
