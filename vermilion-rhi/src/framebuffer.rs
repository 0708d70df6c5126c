use crate::{
    DeviceResource, DeviceResourceState, FramebufferAttachmentDescription,
    FramebufferDescription, ResourceKind, Texture, VermilionResult,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Native-side framebuffer operations, one implementation per graphics backend.
pub trait FramebufferBackend: Send + Sync {
    /// Re-binds one color slot, replacing the prior native view.
    fn rebind_color_target(
        &self,
        index: usize,
        attachment: &FramebufferAttachmentDescription,
        texture: Arc<Texture>,
    ) -> VermilionResult<()>;

    /// CPU readback of one color target. Backends without a readback path must
    /// return `VermilionError::Unsupported`, never silently no-op.
    fn snapshot(
        &self,
        color_index: usize,
        array_layer: u32,
        mip_level: u32,
        out_pixels: &mut Vec<u8>,
    ) -> VermilionResult<()>;

    fn destroy(&self) {}
}

/// Binds 0..N color targets plus an optional depth-stencil target into a renderable
/// output target set.
///
/// Width and height are derived once at creation from whichever attached texture is
/// examined first (depth target takes priority over color target 0); they are not
/// re-derived when a color slot is re-bound.
pub struct Framebuffer {
    state: DeviceResourceState,
    description: Mutex<FramebufferDescription>,
    width: u32,
    height: u32,
    backend: Box<dyn FramebufferBackend>,
}

impl Framebuffer {
    pub fn new(
        description: FramebufferDescription,
        width: u32,
        height: u32,
        backend: Box<dyn FramebufferBackend>,
    ) -> Self {
        Framebuffer {
            state: DeviceResourceState::new(ResourceKind::Framebuffer),
            description: Mutex::new(description),
            width,
            height,
            backend,
        }
    }

    pub fn description(&self) -> FramebufferDescription {
        self.description.lock().clone()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn color_target_count(&self) -> usize {
        self.description.lock().color_targets.len()
    }

    pub fn color_target(
        &self,
        index: usize,
    ) -> Option<FramebufferAttachmentDescription> {
        self.description.lock().color_targets.get(index).copied()
    }

    pub fn depth_target(&self) -> Option<FramebufferAttachmentDescription> {
        self.description.lock().depth_target
    }

    /// Re-binds one color slot. Must only be called for `index <
    /// color_target_count()`; reference counting of the attachment textures is the
    /// device's responsibility (see `Device::set_framebuffer_color_target`).
    pub fn rebind_color_target(
        &self,
        index: usize,
        attachment: FramebufferAttachmentDescription,
        texture: Arc<Texture>,
    ) -> VermilionResult<()> {
        {
            let mut description = self.description.lock();
            assert!(
                index < description.color_targets.len(),
                "color target index {} out of range ({} slots)",
                index,
                description.color_targets.len()
            );
            description.color_targets[index] = attachment;
        }

        self.backend.rebind_color_target(index, &attachment, texture)
    }

    /// Captures the pixels of one color target into `out_pixels`.
    pub fn snapshot(
        &self,
        color_index: usize,
        array_layer: u32,
        mip_level: u32,
        out_pixels: &mut Vec<u8>,
    ) -> VermilionResult<()> {
        self.backend
            .snapshot(color_index, array_layer, mip_level, out_pixels)
    }
}

impl DeviceResource for Framebuffer {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
