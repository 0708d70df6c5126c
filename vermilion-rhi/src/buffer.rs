use crate::{
    BufferDescription, DeviceResource, DeviceResourceState, MapAccess, MappedResource,
    ResourceKind, VermilionResult,
};

/// Native-side operations of a buffer. Implemented once per graphics backend; all
/// cross-backend logic lives in `Buffer`.
pub trait BufferBackend: Send + Sync {
    fn map(
        &self,
        access: MapAccess,
    ) -> VermilionResult<MappedResource>;

    fn unmap(&self);

    fn write(
        &self,
        offset: u64,
        data: &[u8],
    ) -> VermilionResult<()>;

    fn read(
        &self,
        offset: u64,
        out: &mut [u8],
    ) -> VermilionResult<()>;

    fn destroy(&self) {}
}

/// A piece of memory that can be accessed by the GPU. It may reside in CPU or GPU
/// memory depending on the `MemoryUsage` it was created with.
pub struct Buffer {
    state: DeviceResourceState,
    description: BufferDescription,
    backend: Box<dyn BufferBackend>,
}

impl Buffer {
    pub fn new(
        description: BufferDescription,
        backend: Box<dyn BufferBackend>,
    ) -> Self {
        Buffer {
            state: DeviceResourceState::new(ResourceKind::Buffer),
            description,
            backend,
        }
    }

    pub fn description(&self) -> &BufferDescription {
        &self.description
    }

    pub fn size(&self) -> u64 {
        self.description.size
    }

    /// Maps the buffer for CPU access. The requested access must be compatible with
    /// the buffer's memory usage; the device validates this before calling through.
    pub fn map(
        &self,
        access: MapAccess,
    ) -> VermilionResult<MappedResource> {
        self.backend.map(access)
    }

    pub fn unmap(&self) {
        self.backend.unmap()
    }

    pub fn write(
        &self,
        offset: u64,
        data: &[u8],
    ) -> VermilionResult<()> {
        self.backend.write(offset, data)
    }

    pub fn read(
        &self,
        offset: u64,
        out: &mut [u8],
    ) -> VermilionResult<()> {
        self.backend.read(offset, out)
    }
}

impl DeviceResource for Buffer {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
