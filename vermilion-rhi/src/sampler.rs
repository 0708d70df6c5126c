use crate::{DeviceResource, DeviceResourceState, ResourceKind, SamplerDescription};

/// Native-side sampler object. Most backends have nothing to do beyond creation and
/// destruction.
pub trait SamplerBackend: Send + Sync {
    fn destroy(&self) {}
}

pub struct Sampler {
    state: DeviceResourceState,
    description: SamplerDescription,
    backend: Box<dyn SamplerBackend>,
}

impl Sampler {
    pub fn new(
        description: SamplerDescription,
        backend: Box<dyn SamplerBackend>,
    ) -> Self {
        Sampler {
            state: DeviceResourceState::new(ResourceKind::Sampler),
            description,
            backend,
        }
    }

    pub fn description(&self) -> &SamplerDescription {
        &self.description
    }
}

impl DeviceResource for Sampler {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
