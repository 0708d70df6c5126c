use super::*;
use crate::ResourceHandle;
use vermilion_base::DecimalF32;

#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Used to create a `Buffer`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferDescription {
    pub size: u64,
    pub alignment: u32, // May be 0
    pub usage: BufferUsage,
    pub memory_usage: MemoryUsage,
    // For structured buffers
    pub structure_byte_stride: u32,
}

impl Default for BufferDescription {
    fn default() -> Self {
        BufferDescription {
            size: 0,
            alignment: 0,
            usage: BufferUsage::empty(),
            memory_usage: MemoryUsage::GpuOnly,
            structure_byte_stride: 0,
        }
    }
}

impl BufferDescription {
    pub fn verify(&self) {
        assert_ne!(self.size, 0);
        assert!(!self.usage.is_empty());
    }

    pub fn for_staging_buffer(size: usize) -> BufferDescription {
        BufferDescription {
            size: size as u64,
            alignment: 0,
            usage: BufferUsage::TRANSFER_SRC | BufferUsage::TRANSFER_DST,
            memory_usage: MemoryUsage::Staging,
            structure_byte_stride: 0,
        }
    }

    pub fn for_vertex_buffer(size: usize) -> BufferDescription {
        BufferDescription {
            size: size as u64,
            alignment: 0,
            usage: BufferUsage::VERTEX_BUFFER | BufferUsage::TRANSFER_DST,
            memory_usage: MemoryUsage::GpuOnly,
            structure_byte_stride: 0,
        }
    }

    pub fn for_index_buffer(size: usize) -> BufferDescription {
        BufferDescription {
            size: size as u64,
            alignment: 0,
            usage: BufferUsage::INDEX_BUFFER | BufferUsage::TRANSFER_DST,
            memory_usage: MemoryUsage::GpuOnly,
            structure_byte_stride: 0,
        }
    }

    pub fn for_uniform_buffer(size: usize) -> BufferDescription {
        BufferDescription {
            size: size as u64,
            alignment: 0,
            usage: BufferUsage::UNIFORM_BUFFER,
            memory_usage: MemoryUsage::Dynamic,
            structure_byte_stride: 0,
        }
    }
}

/// Determines how many dimensions the texture will have.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum TextureDimensions {
    /// Assume 2D if depth = 1, otherwise 3D
    Auto,
    Dim1D,
    Dim2D,
    Dim3D,
}

impl Default for TextureDimensions {
    fn default() -> Self {
        TextureDimensions::Auto
    }
}

impl TextureDimensions {
    pub fn determine_dimensions(
        self,
        extents: Extents3D,
    ) -> TextureDimensions {
        match self {
            TextureDimensions::Auto => {
                if extents.depth > 1 {
                    TextureDimensions::Dim3D
                } else {
                    TextureDimensions::Dim2D
                }
            }
            TextureDimensions::Dim1D => {
                assert_eq!(extents.height, 1);
                assert_eq!(extents.depth, 1);
                TextureDimensions::Dim1D
            }
            TextureDimensions::Dim2D => {
                assert_eq!(extents.depth, 1);
                TextureDimensions::Dim2D
            }
            TextureDimensions::Dim3D => TextureDimensions::Dim3D,
        }
    }
}

/// Used to create a `Texture`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureDescription {
    pub extents: Extents3D,
    // Generally 1, except 6 for cubemaps
    pub array_layers: u32,
    pub mip_levels: u32,
    pub sample_count: TextureSampleCount,
    pub format: PixelFormat,
    pub usage: TextureUsage,
    pub memory_usage: MemoryUsage,
    pub dimensions: TextureDimensions,
}

impl Default for TextureDescription {
    fn default() -> Self {
        TextureDescription {
            extents: Extents3D {
                width: 0,
                height: 0,
                depth: 0,
            },
            array_layers: 1,
            mip_levels: 1,
            sample_count: TextureSampleCount::SampleCount1,
            format: PixelFormat::Unknown,
            usage: TextureUsage::SAMPLED,
            memory_usage: MemoryUsage::GpuOnly,
            dimensions: TextureDimensions::Auto,
        }
    }
}

impl TextureDescription {
    pub fn verify(&self) {
        assert!(self.extents.width > 0);
        assert!(self.extents.height > 0);
        assert!(self.extents.depth > 0);
        assert!(self.array_layers > 0);
        assert!(self.mip_levels > 0);
        assert_ne!(self.format, PixelFormat::Unknown);
        assert!(
            self.mip_levels < 2 || self.sample_count == TextureSampleCount::SampleCount1,
            "multisampled textures cannot have mip chains"
        );

        assert!(
            !(self.format.has_depth() && self.usage.contains(TextureUsage::STORAGE)),
            "Cannot use depth stencil as UAV"
        );
    }

    pub fn for_render_target(
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> TextureDescription {
        TextureDescription {
            extents: Extents3D {
                width,
                height,
                depth: 1,
            },
            usage: if format.has_depth() {
                TextureUsage::DEPTH_STENCIL | TextureUsage::SAMPLED
            } else {
                TextureUsage::RENDER_TARGET | TextureUsage::SAMPLED
            },
            format,
            ..Default::default()
        }
    }

    /// One subresource per (array layer, mip level) pair
    pub fn subresource_count(&self) -> u32 {
        self.array_layers * self.mip_levels
    }
}

/// Used to create a `Sampler`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct SamplerDescription {
    pub min_filter: SamplerFilter,
    pub mag_filter: SamplerFilter,
    pub mip_filter: SamplerFilter,
    pub address_mode_u: SamplerAddressMode,
    pub address_mode_v: SamplerAddressMode,
    pub address_mode_w: SamplerAddressMode,
    pub mip_lod_bias: DecimalF32,
    pub max_anisotropy: u32,
    pub compare_op: Option<CompareOp>,
    pub min_lod: DecimalF32,
    pub max_lod: DecimalF32,
    pub border_color: SamplerBorderColor,
}

impl Default for SamplerDescription {
    fn default() -> Self {
        SamplerDescription {
            min_filter: SamplerFilter::Linear,
            mag_filter: SamplerFilter::Linear,
            mip_filter: SamplerFilter::Linear,
            address_mode_u: SamplerAddressMode::Repeat,
            address_mode_v: SamplerAddressMode::Repeat,
            address_mode_w: SamplerAddressMode::Repeat,
            mip_lod_bias: DecimalF32(0.0),
            max_anisotropy: 1,
            compare_op: None,
            min_lod: DecimalF32(0.0),
            max_lod: DecimalF32(f32::MAX),
            border_color: SamplerBorderColor::TransparentBlack,
        }
    }
}

/// Used to create a `Shader`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct ShaderDescription {
    pub stage: ShaderStages,
    pub entry_point: String,
    pub byte_code: Vec<u8>,
}

impl ShaderDescription {
    pub fn verify(&self) {
        assert_eq!(self.stage.bits().count_ones(), 1, "exactly one shader stage");
        assert!(!self.entry_point.is_empty());
        assert!(!self.byte_code.is_empty());
    }
}

/// Rasterizer state for a graphics pipeline. Backends cache the native state object
/// by a hash of this description.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct RasterizerStateDescription {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub fill_mode: FillMode,
    pub depth_clip_enabled: bool,
    pub scissor_test_enabled: bool,
}

impl Default for RasterizerStateDescription {
    fn default() -> Self {
        RasterizerStateDescription {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            fill_mode: FillMode::Solid,
            depth_clip_enabled: true,
            scissor_test_enabled: false,
        }
    }
}

/// Blend state for one color target
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BlendAttachmentDescription {
    pub blend_enabled: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_op: BlendOp,
    pub write_mask: ColorWriteMask,
}

impl BlendAttachmentDescription {
    pub fn alpha_blend() -> Self {
        BlendAttachmentDescription {
            blend_enabled: true,
            src_color_factor: BlendFactor::SrcAlpha,
            dst_color_factor: BlendFactor::OneMinusSrcAlpha,
            color_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::OneMinusSrcAlpha,
            alpha_op: BlendOp::Add,
            write_mask: ColorWriteMask::ALL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct BlendStateDescription {
    pub alpha_to_coverage_enabled: bool,
    /// When false, only `targets[0]` is used and applied to every color target
    pub independent_blend_enabled: bool,
    pub targets: Vec<BlendAttachmentDescription>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct StencilOpDescription {
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub compare_op: CompareOp,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct DepthStencilStateDescription {
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_compare_op: CompareOp,
    pub stencil_test_enabled: bool,
    pub front: StencilOpDescription,
    pub back: StencilOpDescription,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
}

impl Default for DepthStencilStateDescription {
    fn default() -> Self {
        DepthStencilStateDescription {
            depth_test_enabled: false,
            depth_write_enabled: false,
            depth_compare_op: CompareOp::LessOrEqual,
            stencil_test_enabled: false,
            front: Default::default(),
            back: Default::default(),
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
        }
    }
}

/// A single vertex attribute within an input layout
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct VertexElementDescription {
    pub semantic: String,
    pub format: VertexElementFormat,
    pub buffer_index: u32,
    pub byte_offset: u32,
    /// 0 = per-vertex data, otherwise advance once per N instances
    pub instance_step_rate: u32,
}

/// Describes how vertex buffers map to vertex shader inputs. On some backends the
/// native object additionally depends on the vertex shader's input signature, so the
/// state cache keys on (layout, shader byte code hash).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct InputLayoutDescription {
    pub elements: Vec<VertexElementDescription>,
}

/// One element of a `ResourceLayout`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct ResourceLayoutElementDescription {
    pub name: String,
    pub kind: BindableResourceKind,
    pub stages: ShaderStages,
    pub count: u32,
}

/// Used to create a `ResourceLayout`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct ResourceLayoutDescription {
    pub elements: Vec<ResourceLayoutElementDescription>,
}

/// Used to create a `ResourceSet`. Binds concrete resources to the slots of a layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ResourceSetDescription {
    pub layout: ResourceHandle,
    pub resources: Vec<ResourceHandle>,
}

/// Used to create a `GraphicsPipeline`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GraphicsPipelineDescription {
    pub rasterizer_state: RasterizerStateDescription,
    pub blend_state: BlendStateDescription,
    pub depth_stencil_state: DepthStencilStateDescription,
    pub input_layout: InputLayoutDescription,
    pub primitive_topology: PrimitiveTopology,
    /// One shader per stage, vertex first
    pub shaders: Vec<ResourceHandle>,
    pub resource_layouts: Vec<ResourceHandle>,
    pub color_formats: Vec<PixelFormat>,
    pub depth_format: Option<PixelFormat>,
    pub sample_count: TextureSampleCount,
}

impl Default for GraphicsPipelineDescription {
    fn default() -> Self {
        GraphicsPipelineDescription {
            rasterizer_state: Default::default(),
            blend_state: Default::default(),
            depth_stencil_state: Default::default(),
            input_layout: Default::default(),
            primitive_topology: PrimitiveTopology::TriangleList,
            shaders: Vec::new(),
            resource_layouts: Vec::new(),
            color_formats: Vec::new(),
            depth_format: None,
            sample_count: TextureSampleCount::SampleCount1,
        }
    }
}

impl GraphicsPipelineDescription {
    pub fn verify(&self) {
        assert!(!self.shaders.is_empty());
        assert!(!self.color_formats.is_empty() || self.depth_format.is_some());
    }
}

/// Used to create a `ComputePipeline`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct ComputePipelineDescription {
    pub shader: ResourceHandle,
    pub resource_layouts: Vec<ResourceHandle>,
}

/// One attachment slot of a framebuffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct FramebufferAttachmentDescription {
    pub texture: ResourceHandle,
    pub array_layer: u32,
    pub mip_level: u32,
}

impl FramebufferAttachmentDescription {
    pub fn new(texture: ResourceHandle) -> Self {
        FramebufferAttachmentDescription {
            texture,
            array_layer: 0,
            mip_level: 0,
        }
    }
}

/// Used to create a `Framebuffer`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FramebufferDescription {
    pub color_targets: Vec<FramebufferAttachmentDescription>,
    pub depth_target: Option<FramebufferAttachmentDescription>,
}

impl FramebufferDescription {
    pub fn verify(&self) {
        assert!(!self.color_targets.is_empty() || self.depth_target.is_some());
    }
}

/// Used to create a `Swapchain`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SwapchainDescription {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub depth_format: Option<PixelFormat>,
    pub image_count: u32,
    pub vsync: bool,
}

impl Default for SwapchainDescription {
    fn default() -> Self {
        SwapchainDescription {
            width: 0,
            height: 0,
            format: PixelFormat::B8G8R8A8_UNORM_SRGB,
            depth_format: None,
            image_count: 2,
            vsync: true,
        }
    }
}

impl SwapchainDescription {
    pub fn verify(&self) {
        assert!(self.width > 0);
        assert!(self.height > 0);
        assert!(self.image_count >= 1);
        if let Some(depth_format) = self.depth_format {
            assert!(depth_format.has_depth());
        }
    }
}

/// Used to create a `CommandList`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CommandListDescription {
    /// Secondary command lists are used to encode a single pass on multiple threads
    pub is_secondary: bool,
}

/// Describes how to create a device.
#[derive(Clone, Debug, Default)]
pub struct DeviceDescription {
    /// Indicates whether the device should enable backend debug/validation features
    pub debug: bool,
    /// Indicates that the device will own a "main" swapchain created at init time.
    /// When set, `main_swapchain_description` must be filled in.
    pub has_main_swapchain: bool,
    pub main_swapchain_description: SwapchainDescription,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnv::FnvHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = FnvHasher::default();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equal_buffer_descriptions_hash_equal() {
        let a = BufferDescription {
            size: 1024,
            alignment: 256,
            usage: BufferUsage::VERTEX_BUFFER | BufferUsage::TRANSFER_DST,
            memory_usage: MemoryUsage::GpuOnly,
            structure_byte_stride: 0,
        };
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn equal_texture_descriptions_hash_equal() {
        let a = TextureDescription::for_render_target(128, 128, PixelFormat::R8G8B8A8_UNORM);
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn equal_sampler_descriptions_hash_equal() {
        // Samplers carry floats; DecimalF32 keeps them hashable bit-for-bit
        let a = SamplerDescription {
            mip_lod_bias: DecimalF32(-0.5),
            max_lod: DecimalF32(12.0),
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn equal_pipeline_state_descriptions_hash_equal() {
        let a = RasterizerStateDescription {
            cull_mode: CullMode::Front,
            scissor_test_enabled: true,
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(hash_of(&a), hash_of(&b));

        let a = DepthStencilStateDescription {
            depth_test_enabled: true,
            depth_write_enabled: true,
            ..Default::default()
        };
        let b = a.clone();
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn texture_subresource_count() {
        let description = TextureDescription {
            extents: Extents3D {
                width: 64,
                height: 64,
                depth: 1,
            },
            array_layers: 6,
            mip_levels: 4,
            format: PixelFormat::R8G8B8A8_UNORM,
            ..Default::default()
        };
        assert_eq!(description.subresource_count(), 24);
    }

    #[test]
    #[should_panic]
    fn zero_sized_buffer_fails_verify() {
        BufferDescription::default().verify();
    }
}
