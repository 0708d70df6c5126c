#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// The kind of graphics backend a device was created on
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Software device with CPU-backed resources. Always available; used for tests,
    /// asset cooking and headless tools.
    Headless,
    Direct3D11,
    Metal,
    Vulkan,
}

/// The kind of a device resource. Stored alongside every registered resource so
/// lookups can be validated cheaply in debug builds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum ResourceKind {
    Buffer,
    Texture,
    Sampler,
    Shader,
    GraphicsPipeline,
    ComputePipeline,
    Framebuffer,
    Swapchain,
    Fence,
    CommandList,
    ResourceLayout,
    ResourceSet,
}

/// Where a resource's memory lives and how the CPU may access it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum MemoryUsage {
    /// Device-local; never CPU-mapped
    GpuOnly,
    /// CPU-writable, intended for per-frame updates. Mappable for write only.
    Dynamic,
    /// CPU-readable staging memory. Mappable for read and write.
    Staging,
}

impl Default for MemoryUsage {
    fn default() -> Self {
        MemoryUsage::GpuOnly
    }
}

/// Requested CPU access when mapping a buffer or texture subresource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MapAccess {
    Read,
    Write,
    ReadWrite,
}

impl MapAccess {
    /// Access modes are only legal for resources created with matching usage flags
    pub fn is_compatible_with(
        self,
        memory_usage: MemoryUsage,
    ) -> bool {
        match self {
            MapAccess::Read | MapAccess::ReadWrite => memory_usage == MemoryUsage::Staging,
            MapAccess::Write => {
                memory_usage == MemoryUsage::Dynamic || memory_usage == MemoryUsage::Staging
            }
        }
    }
}

bitflags::bitflags! {
    /// How a buffer may be bound to the pipeline
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct BufferUsage: u32 {
        const VERTEX_BUFFER = 0x01;
        const INDEX_BUFFER = 0x02;
        const UNIFORM_BUFFER = 0x04;
        const STORAGE_BUFFER = 0x08;
        const INDIRECT_BUFFER = 0x10;
        const TRANSFER_SRC = 0x20;
        const TRANSFER_DST = 0x40;
    }
}

bitflags::bitflags! {
    /// How a texture may be bound to the pipeline
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct TextureUsage: u32 {
        const SAMPLED = 0x01;
        const RENDER_TARGET = 0x02;
        const DEPTH_STENCIL = 0x04;
        const STORAGE = 0x08;
        const TRANSFER_SRC = 0x10;
        const TRANSFER_DST = 0x20;
    }
}

bitflags::bitflags! {
    /// Shader stages a resource binding is visible to
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct ShaderStages: u32 {
        const VERTEX = 0x01;
        const FRAGMENT = 0x02;
        const GEOMETRY = 0x04;
        const TESSELLATION_CONTROL = 0x08;
        const TESSELLATION_EVALUATION = 0x10;
        const COMPUTE = 0x20;
    }
}

bitflags::bitflags! {
    /// Per-render-target color channel write mask
    #[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
    pub struct ColorWriteMask: u8 {
        const RED = 0x1;
        const GREEN = 0x2;
        const BLUE = 0x4;
        const ALPHA = 0x8;
        const ALL = 0xF;
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        ColorWriteMask::ALL
    }
}

/// Pixel formats supported across backends. This is the least-common-denominator set
/// the engine's content pipeline targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    Unknown,
    R8_UNORM,
    R8G8_UNORM,
    R8G8B8A8_UNORM,
    R8G8B8A8_UNORM_SRGB,
    B8G8R8A8_UNORM,
    B8G8R8A8_UNORM_SRGB,
    R16_FLOAT,
    R16G16B16A16_FLOAT,
    R32_UINT,
    R32_FLOAT,
    R32G32_FLOAT,
    R32G32B32A32_FLOAT,
    R10G10B10A2_UNORM,
    R11G11B10_FLOAT,
    D16_UNORM,
    D24_UNORM_S8_UINT,
    D32_FLOAT,
    D32_FLOAT_S8_UINT,
}

impl Default for PixelFormat {
    fn default() -> Self {
        PixelFormat::Unknown
    }
}

impl PixelFormat {
    pub fn has_depth(self) -> bool {
        matches!(
            self,
            PixelFormat::D16_UNORM
                | PixelFormat::D24_UNORM_S8_UINT
                | PixelFormat::D32_FLOAT
                | PixelFormat::D32_FLOAT_S8_UINT
        )
    }

    pub fn has_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::D24_UNORM_S8_UINT | PixelFormat::D32_FLOAT_S8_UINT
        )
    }

    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            PixelFormat::R8G8B8A8_UNORM_SRGB | PixelFormat::B8G8R8A8_UNORM_SRGB
        )
    }

    /// Bytes per pixel. Zero for `Unknown`.
    pub fn block_size_in_bytes(self) -> u32 {
        match self {
            PixelFormat::Unknown => 0,
            PixelFormat::R8_UNORM => 1,
            PixelFormat::R8G8_UNORM | PixelFormat::R16_FLOAT | PixelFormat::D16_UNORM => 2,
            PixelFormat::R8G8B8A8_UNORM
            | PixelFormat::R8G8B8A8_UNORM_SRGB
            | PixelFormat::B8G8R8A8_UNORM
            | PixelFormat::B8G8R8A8_UNORM_SRGB
            | PixelFormat::R32_UINT
            | PixelFormat::R32_FLOAT
            | PixelFormat::R10G10B10A2_UNORM
            | PixelFormat::R11G11B10_FLOAT
            | PixelFormat::D24_UNORM_S8_UINT
            | PixelFormat::D32_FLOAT => 4,
            PixelFormat::R16G16B16A16_FLOAT
            | PixelFormat::R32G32_FLOAT
            | PixelFormat::D32_FLOAT_S8_UINT => 8,
            PixelFormat::R32G32B32A32_FLOAT => 16,
        }
    }
}

/// MSAA sample count
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum TextureSampleCount {
    SampleCount1,
    SampleCount2,
    SampleCount4,
    SampleCount8,
    SampleCount16,
}

impl Default for TextureSampleCount {
    fn default() -> Self {
        TextureSampleCount::SampleCount1
    }
}

impl TextureSampleCount {
    pub fn as_u32(self) -> u32 {
        match self {
            TextureSampleCount::SampleCount1 => 1,
            TextureSampleCount::SampleCount2 => 2,
            TextureSampleCount::SampleCount4 => 4,
            TextureSampleCount::SampleCount8 => 8,
            TextureSampleCount::SampleCount16 => 16,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum CullMode {
    None,
    Back,
    Front,
}

impl Default for CullMode {
    fn default() -> Self {
        CullMode::Back
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

impl Default for FrontFace {
    fn default() -> Self {
        FrontFace::CounterClockwise
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum FillMode {
    Solid,
    Wireframe,
}

impl Default for FillMode {
    fn default() -> Self {
        FillMode::Solid
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

impl Default for CompareOp {
    fn default() -> Self {
        CompareOp::Always
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

impl Default for StencilOp {
    fn default() -> Self {
        StencilOp::Keep
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
}

impl Default for BlendFactor {
    fn default() -> Self {
        BlendFactor::One
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl Default for BlendOp {
    fn default() -> Self {
        BlendOp::Add
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl Default for PrimitiveTopology {
    fn default() -> Self {
        PrimitiveTopology::TriangleList
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

impl Default for IndexFormat {
    fn default() -> Self {
        IndexFormat::Uint32
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum SamplerFilter {
    Nearest,
    Linear,
}

impl Default for SamplerFilter {
    fn default() -> Self {
        SamplerFilter::Linear
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum SamplerAddressMode {
    Repeat,
    Mirror,
    ClampToEdge,
    ClampToBorder,
}

impl Default for SamplerAddressMode {
    fn default() -> Self {
        SamplerAddressMode::Repeat
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum SamplerBorderColor {
    TransparentBlack,
    OpaqueBlack,
    OpaqueWhite,
}

impl Default for SamplerBorderColor {
    fn default() -> Self {
        SamplerBorderColor::TransparentBlack
    }
}

/// The kind of resource a `ResourceLayout` element binds
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum BindableResourceKind {
    UniformBuffer,
    StorageBuffer,
    Texture,
    StorageTexture,
    Sampler,
}

/// Vertex attribute formats understood by input layouts
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum VertexElementFormat {
    Float1,
    Float2,
    Float3,
    Float4,
    UInt1,
    UInt2,
    UInt4,
    UByte4,
    UByte4Normalized,
}

impl VertexElementFormat {
    pub fn size_in_bytes(self) -> u32 {
        match self {
            VertexElementFormat::Float1 | VertexElementFormat::UInt1 => 4,
            VertexElementFormat::Float2 | VertexElementFormat::UInt2 => 8,
            VertexElementFormat::Float3 => 12,
            VertexElementFormat::Float4 | VertexElementFormat::UInt4 => 16,
            VertexElementFormat::UByte4 | VertexElementFormat::UByte4Normalized => 4,
        }
    }
}

/// A 2d size for windows, textures, etc.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Extents2D {
    pub width: u32,
    pub height: u32,
}

/// A 3d size for windows, textures, etc.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub struct Extents3D {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl Extents3D {
    /// Extents of the given mip level, clamped to 1
    pub fn mip_extents(
        &self,
        mip_level: u32,
    ) -> Extents3D {
        Extents3D {
            width: (self.width >> mip_level).max(1),
            height: (self.height >> mip_level).max(1),
            depth: (self.depth >> mip_level).max(1),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorClearValue(pub [f32; 4]);

impl Default for ColorClearValue {
    fn default() -> Self {
        ColorClearValue([0.0, 0.0, 0.0, 0.0])
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DepthStencilClearValue {
    pub depth: f32,
    pub stencil: u32,
}

impl Default for DepthStencilClearValue {
    fn default() -> Self {
        DepthStencilClearValue {
            depth: 1.0,
            stencil: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScissorRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// How long to block in a fence wait.
///
/// The original design encoded "wait forever" as the maximum representable 64-bit
/// nanosecond timeout; this makes the intent explicit instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FenceWait {
    Infinite,
    Nanoseconds(u64),
}

/// Information about the device, mostly flags indicating whether certain features are
/// supported by the active backend
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    pub compute_shader: bool,
    pub geometry_shader: bool,
    pub tessellation_shader: bool,
    pub multiple_viewports: bool,
    pub independent_blend: bool,
    pub structured_buffers: bool,
    pub texture_1d: bool,
    pub fill_mode_wireframe: bool,
    pub sampler_anisotropy: bool,
    pub depth_clip_disable: bool,
    pub command_list_debug_markers: bool,
    pub concurrent_resources: bool,
    pub depth_range_zero_to_one: bool,
    pub uv_origin_top_left: bool,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        DeviceCapabilities {
            compute_shader: false,
            geometry_shader: false,
            tessellation_shader: false,
            multiple_viewports: false,
            independent_blend: false,
            structured_buffers: false,
            texture_1d: false,
            fill_mode_wireframe: false,
            sampler_anisotropy: false,
            depth_clip_disable: false,
            command_list_debug_markers: false,
            concurrent_resources: false,
            depth_range_zero_to_one: true,
            uv_origin_top_left: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_access_compatibility() {
        assert!(!MapAccess::Read.is_compatible_with(MemoryUsage::GpuOnly));
        assert!(!MapAccess::Read.is_compatible_with(MemoryUsage::Dynamic));
        assert!(MapAccess::Read.is_compatible_with(MemoryUsage::Staging));

        assert!(MapAccess::Write.is_compatible_with(MemoryUsage::Dynamic));
        assert!(MapAccess::Write.is_compatible_with(MemoryUsage::Staging));
        assert!(!MapAccess::Write.is_compatible_with(MemoryUsage::GpuOnly));

        assert!(MapAccess::ReadWrite.is_compatible_with(MemoryUsage::Staging));
        assert!(!MapAccess::ReadWrite.is_compatible_with(MemoryUsage::Dynamic));
    }

    #[test]
    fn depth_format_flags() {
        assert!(PixelFormat::D32_FLOAT.has_depth());
        assert!(!PixelFormat::D32_FLOAT.has_stencil());
        assert!(PixelFormat::D24_UNORM_S8_UINT.has_stencil());
        assert!(!PixelFormat::R8G8B8A8_UNORM.has_depth());
    }

    #[test]
    fn mip_extents_clamp_to_one() {
        let extents = Extents3D {
            width: 16,
            height: 4,
            depth: 1,
        };
        assert_eq!(
            extents.mip_extents(3),
            Extents3D {
                width: 2,
                height: 1,
                depth: 1
            }
        );
    }
}
