use crate::{
    DeviceResource, DeviceResourceState, Extents2D, ResourceHandle, ResourceKind,
    SwapchainDescription, VermilionResult,
};
use parking_lot::Mutex;

/// Native-side swapchain operations, one implementation per graphics backend.
pub trait SwapchainBackend: Send + Sync {
    fn present(&self) -> VermilionResult<()>;

    fn destroy(&self) {}
}

struct SwapchainTargets {
    framebuffer: ResourceHandle,
    color_texture: ResourceHandle,
    depth_texture: ResourceHandle,
}

/// The presentation surface of a device. The back buffer is exposed as an ordinary
/// framebuffer handle so render passes can target it without special cases.
///
/// Resizing recreates the back-buffer resources through the device's factory; see
/// `Device::resize_swapchain`.
pub struct Swapchain {
    state: DeviceResourceState,
    description: SwapchainDescription,
    extents: Mutex<Extents2D>,
    targets: Mutex<SwapchainTargets>,
    backend: Box<dyn SwapchainBackend>,
}

impl Swapchain {
    pub fn new(
        description: SwapchainDescription,
        backend: Box<dyn SwapchainBackend>,
    ) -> Self {
        let extents = Extents2D {
            width: description.width,
            height: description.height,
        };

        Swapchain {
            state: DeviceResourceState::new(ResourceKind::Swapchain),
            description,
            extents: Mutex::new(extents),
            targets: Mutex::new(SwapchainTargets {
                framebuffer: ResourceHandle::invalid(),
                color_texture: ResourceHandle::invalid(),
                depth_texture: ResourceHandle::invalid(),
            }),
            backend,
        }
    }

    pub fn description(&self) -> &SwapchainDescription {
        &self.description
    }

    pub fn extents(&self) -> Extents2D {
        *self.extents.lock()
    }

    pub fn image_count(&self) -> u32 {
        self.description.image_count
    }

    pub fn vsync_enabled(&self) -> bool {
        self.description.vsync
    }

    /// The framebuffer wrapping the current back buffer
    pub fn back_buffer(&self) -> ResourceHandle {
        self.targets.lock().framebuffer
    }

    pub fn back_buffer_texture(&self) -> ResourceHandle {
        self.targets.lock().color_texture
    }

    pub fn depth_texture(&self) -> ResourceHandle {
        self.targets.lock().depth_texture
    }

    pub(crate) fn set_targets(
        &self,
        framebuffer: ResourceHandle,
        color_texture: ResourceHandle,
        depth_texture: ResourceHandle,
        extents: Extents2D,
    ) {
        let mut targets = self.targets.lock();
        targets.framebuffer = framebuffer;
        targets.color_texture = color_texture;
        targets.depth_texture = depth_texture;
        *self.extents.lock() = extents;
    }

    pub fn present(&self) -> VermilionResult<()> {
        self.backend.present()
    }
}

impl DeviceResource for Swapchain {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
