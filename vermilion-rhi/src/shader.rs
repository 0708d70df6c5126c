use crate::{DeviceResource, DeviceResourceState, ResourceKind, ShaderDescription, ShaderStages};
use fnv::FnvHasher;
use std::hash::Hasher;

pub trait ShaderBackend: Send + Sync {
    fn destroy(&self) {}
}

/// A compiled shader stage. Compilation itself happens in the external shader
/// compiler; the device only receives finished byte code.
pub struct Shader {
    state: DeviceResourceState,
    description: ShaderDescription,
    byte_code_hash: u64,
    backend: Box<dyn ShaderBackend>,
}

impl Shader {
    pub fn new(
        description: ShaderDescription,
        backend: Box<dyn ShaderBackend>,
    ) -> Self {
        let mut hasher = FnvHasher::default();
        hasher.write(&description.byte_code);
        let byte_code_hash = hasher.finish();

        Shader {
            state: DeviceResourceState::new(ResourceKind::Shader),
            description,
            byte_code_hash,
            backend,
        }
    }

    pub fn description(&self) -> &ShaderDescription {
        &self.description
    }

    pub fn stage(&self) -> ShaderStages {
        self.description.stage
    }

    pub fn entry_point(&self) -> &str {
        &self.description.entry_point
    }

    pub fn byte_code(&self) -> &[u8] {
        &self.description.byte_code
    }

    /// Used by input-layout caches that key on the vertex shader's input signature
    pub fn byte_code_hash(&self) -> u64 {
        self.byte_code_hash
    }
}

impl DeviceResource for Shader {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
