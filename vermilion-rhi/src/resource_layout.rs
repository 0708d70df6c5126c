use crate::{
    DeviceResource, DeviceResourceState, ResourceKind, ResourceLayoutDescription,
    ResourceSetDescription,
};

/// Describes the shape of a group of shader-visible bindings. Purely declarative;
/// backends derive their native binding objects from it at pipeline creation.
pub struct ResourceLayout {
    state: DeviceResourceState,
    description: ResourceLayoutDescription,
}

impl ResourceLayout {
    pub fn new(description: ResourceLayoutDescription) -> Self {
        ResourceLayout {
            state: DeviceResourceState::new(ResourceKind::ResourceLayout),
            description,
        }
    }

    pub fn description(&self) -> &ResourceLayoutDescription {
        &self.description
    }

    pub fn element_count(&self) -> usize {
        self.description.elements.len()
    }
}

impl DeviceResource for ResourceLayout {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }
}

/// Binds concrete resources (buffers, textures, samplers) to the slots of a
/// `ResourceLayout`. The factory increments the reference count of every bound
/// resource at creation; the counts are given back when the set is released through
/// the deferred release queue.
pub struct ResourceSet {
    state: DeviceResourceState,
    description: ResourceSetDescription,
}

impl ResourceSet {
    pub fn new(description: ResourceSetDescription) -> Self {
        ResourceSet {
            state: DeviceResourceState::new(ResourceKind::ResourceSet),
            description,
        }
    }

    pub fn description(&self) -> &ResourceSetDescription {
        &self.description
    }
}

impl DeviceResource for ResourceSet {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }
}
