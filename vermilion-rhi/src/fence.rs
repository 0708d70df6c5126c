use crate::{DeviceResource, DeviceResourceState, FenceWait, ResourceKind, VermilionResult};

/// Native-side fence operations, one implementation per graphics backend.
pub trait FenceBackend: Send + Sync {
    /// Blocks until the fence signals or the timeout elapses. Returns `false` on
    /// timeout, `true` on signal.
    fn wait(
        &self,
        timeout: FenceWait,
    ) -> VermilionResult<bool>;

    fn signaled(&self) -> bool;

    /// Marks the fence signaled. Called by the backend's submission path.
    fn signal(&self);

    fn reset(&self);

    fn destroy(&self) {}
}

/// A GPU → CPU synchronization primitive. Submitted alongside a command list and
/// signaled by the device when the corresponding GPU work completes.
pub struct Fence {
    state: DeviceResourceState,
    backend: Box<dyn FenceBackend>,
}

impl Fence {
    pub fn new(backend: Box<dyn FenceBackend>) -> Self {
        Fence {
            state: DeviceResourceState::new(ResourceKind::Fence),
            backend,
        }
    }

    pub fn wait(
        &self,
        timeout: FenceWait,
    ) -> VermilionResult<bool> {
        self.backend.wait(timeout)
    }

    pub fn signaled(&self) -> bool {
        self.backend.signaled()
    }

    pub fn reset(&self) {
        self.backend.reset()
    }

    pub fn backend(&self) -> &dyn FenceBackend {
        &*self.backend
    }
}

impl DeviceResource for Fence {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
