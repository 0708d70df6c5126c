//! Render hardware interface of the vermilion stack.
//!
//! One capability-oriented backend contract (`GraphicsBackend`), generic resource
//! objects shared by every backend, a resource registry with explicit reference
//! counts and a deferred release queue, and the per-backend state-object caches.
//! The software (`headless`) backend is always available; native backends plug in
//! through the same trait.

pub mod backend;

mod buffer;
mod command_list;
mod device;
mod error;
mod factory;
mod fence;
mod framebuffer;
mod pipeline;
mod resource;
mod resource_layout;
mod resource_manager;
mod sampler;
mod shader;
mod state_cache;
mod swapchain;
mod texture;
mod types;

pub use buffer::*;
pub use command_list::*;
pub use device::*;
pub use error::*;
pub use factory::*;
pub use fence::*;
pub use framebuffer::*;
pub use pipeline::*;
pub use resource::*;
pub use resource_layout::*;
pub use resource_manager::*;
pub use sampler::*;
pub use shader::*;
pub use state_cache::*;
pub use swapchain::*;
pub use texture::*;
pub use types::*;

pub use backend::headless::HeadlessBackend;
pub use backend::{FramebufferTarget, GraphicsBackend};
