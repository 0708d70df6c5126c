use crate::{
    DeviceResource, DeviceResourceState, Extents3D, MapAccess, MappedResource, ResourceKind,
    TextureDescription, VermilionResult,
};

/// Native-side operations of a texture, one implementation per graphics backend.
pub trait TextureBackend: Send + Sync {
    fn map(
        &self,
        subresource: u32,
        access: MapAccess,
    ) -> VermilionResult<MappedResource>;

    fn unmap(
        &self,
        subresource: u32,
    );

    fn write(
        &self,
        subresource: u32,
        data: &[u8],
    ) -> VermilionResult<()>;

    fn read(
        &self,
        subresource: u32,
        out: &mut Vec<u8>,
    ) -> VermilionResult<()>;

    fn destroy(&self) {}
}

/// An image resource. Subresources are addressed as
/// `array_layer * mip_levels + mip_level`.
pub struct Texture {
    state: DeviceResourceState,
    description: TextureDescription,
    backend: Box<dyn TextureBackend>,
}

impl Texture {
    pub fn new(
        description: TextureDescription,
        backend: Box<dyn TextureBackend>,
    ) -> Self {
        Texture {
            state: DeviceResourceState::new(ResourceKind::Texture),
            description,
            backend,
        }
    }

    pub fn description(&self) -> &TextureDescription {
        &self.description
    }

    pub fn extents(&self) -> Extents3D {
        self.description.extents
    }

    pub fn array_layer_count(&self) -> u32 {
        self.description.array_layers
    }

    pub fn mip_count(&self) -> u32 {
        self.description.mip_levels
    }

    pub fn subresource_count(&self) -> u32 {
        self.description.subresource_count()
    }

    pub fn subresource_index(
        &self,
        array_layer: u32,
        mip_level: u32,
    ) -> u32 {
        debug_assert!(array_layer < self.description.array_layers);
        debug_assert!(mip_level < self.description.mip_levels);
        array_layer * self.description.mip_levels + mip_level
    }

    /// (array_layer, mip_level) of the given subresource index
    pub fn subresource_location(
        &self,
        subresource: u32,
    ) -> (u32, u32) {
        (
            subresource / self.description.mip_levels,
            subresource % self.description.mip_levels,
        )
    }

    /// Bytes per row of the given mip level
    pub fn row_pitch(
        &self,
        mip_level: u32,
    ) -> u32 {
        let extents = self.description.extents.mip_extents(mip_level);
        extents.width * self.description.format.block_size_in_bytes()
    }

    /// Bytes per depth slice of the given mip level
    pub fn depth_pitch(
        &self,
        mip_level: u32,
    ) -> u32 {
        let extents = self.description.extents.mip_extents(mip_level);
        self.row_pitch(mip_level) * extents.height
    }

    /// Total byte size of one subresource
    pub fn subresource_size_in_bytes(
        &self,
        subresource: u32,
    ) -> u64 {
        let (_, mip_level) = self.subresource_location(subresource);
        let extents = self.description.extents.mip_extents(mip_level);
        self.depth_pitch(mip_level) as u64 * extents.depth as u64
    }

    pub fn map(
        &self,
        subresource: u32,
        access: MapAccess,
    ) -> VermilionResult<MappedResource> {
        self.backend.map(subresource, access)
    }

    pub fn unmap(
        &self,
        subresource: u32,
    ) {
        self.backend.unmap(subresource)
    }

    pub fn write(
        &self,
        subresource: u32,
        data: &[u8],
    ) -> VermilionResult<()> {
        self.backend.write(subresource, data)
    }

    pub fn read(
        &self,
        subresource: u32,
        out: &mut Vec<u8>,
    ) -> VermilionResult<()> {
        self.backend.read(subresource, out)
    }
}

impl DeviceResource for Texture {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
