pub mod headless;

use crate::{
    BackendKind, BufferBackend, BufferDescription, CommandList, CommandListBackend,
    CommandListDescription, ComputePipelineDescription, DeviceCapabilities,
    DeviceResourceManager, Fence, FenceBackend, FramebufferBackend, FramebufferDescription,
    GraphicsPipelineDescription, GraphicsPipelineParts, SamplerBackend, SamplerDescription,
    Shader, ShaderBackend, ShaderDescription, SwapchainBackend, SwapchainDescription, Texture,
    TextureBackend, TextureDescription, VermilionResult,
};
use downcast_rs::{impl_downcast, DowncastSync};
use raw_window_handle::HasRawWindowHandle;
use std::sync::Arc;

/// A framebuffer attachment resolved to its texture, handed to backends so they can
/// build native views without reaching back into the resource registry.
#[derive(Clone)]
pub struct FramebufferTarget {
    pub texture: Arc<Texture>,
    pub array_layer: u32,
    pub mip_level: u32,
}

/// The capability contract every native graphics backend implements.
///
/// All cross-backend logic — frame counting, fence-wait defaulting, the deferred
/// release queue, resource registration, map validation — lives in `Device` and its
/// factory; a backend only supplies the native objects and the submission path.
pub trait GraphicsBackend: DowncastSync {
    fn kind(&self) -> BackendKind;

    fn capabilities(&self) -> &DeviceCapabilities;

    fn create_buffer(
        &self,
        description: &BufferDescription,
    ) -> VermilionResult<Box<dyn BufferBackend>>;

    fn create_texture(
        &self,
        description: &TextureDescription,
    ) -> VermilionResult<Box<dyn TextureBackend>>;

    fn create_sampler(
        &self,
        description: &SamplerDescription,
    ) -> VermilionResult<Box<dyn SamplerBackend>>;

    fn create_shader(
        &self,
        description: &ShaderDescription,
    ) -> VermilionResult<Box<dyn ShaderBackend>>;

    fn create_graphics_pipeline(
        &self,
        description: &GraphicsPipelineDescription,
        shaders: &[Arc<Shader>],
    ) -> VermilionResult<GraphicsPipelineParts>;

    fn create_compute_pipeline(
        &self,
        description: &ComputePipelineDescription,
        shader: &Arc<Shader>,
    ) -> VermilionResult<Box<dyn crate::PipelineBackend>>;

    fn create_framebuffer(
        &self,
        description: &FramebufferDescription,
        color_targets: &[FramebufferTarget],
        depth_target: Option<&FramebufferTarget>,
    ) -> VermilionResult<Box<dyn FramebufferBackend>>;

    /// `window` is `None` for surfaceless (offscreen) swapchains; native backends
    /// that require a surface must reject that with `Unsupported`.
    fn create_swapchain(
        &self,
        window: Option<&dyn HasRawWindowHandle>,
        description: &SwapchainDescription,
    ) -> VermilionResult<Box<dyn SwapchainBackend>>;

    fn create_fence(&self) -> VermilionResult<Box<dyn FenceBackend>>;

    fn create_command_list(
        &self,
        description: &CommandListDescription,
    ) -> VermilionResult<Box<dyn CommandListBackend>>;

    /// Hands a closed command list to the backend queue. The optional fence is
    /// signaled when the submitted work completes.
    fn submit_command_list(
        &self,
        command_list: &CommandList,
        fence: Option<&Fence>,
        resources: &DeviceResourceManager,
    ) -> VermilionResult<()>;

    /// Blocks until all submitted GPU work completes.
    fn wait_for_idle(&self) -> VermilionResult<()>;
}

impl_downcast!(sync GraphicsBackend);
