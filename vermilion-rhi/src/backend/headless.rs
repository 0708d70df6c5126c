//! Software graphics backend with CPU-backed resources.
//!
//! Every resource is real: buffers and textures own mappable memory, command lists
//! replay their recorded commands synchronously at submission, fences signal when
//! the submitted work finishes. This is the backend unit tests and headless tools
//! (asset cooking, thumbnail capture) run on; it also serves as the reference
//! implementation of the `GraphicsBackend` contract.

use crate::backend::{FramebufferTarget, GraphicsBackend};
use crate::*;
use parking_lot::{Condvar, Mutex};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fixed-size byte storage with a stable address, usable as a map target.
///
/// Concurrent CPU/GPU access to mapped memory is inherently racy on real devices;
/// the device-level map/unmap and idle-wait contract is what serializes access, so
/// the raw copies here do not add their own locking.
struct MappableMemory {
    data: UnsafeCell<Box<[u8]>>,
    mapped: AtomicBool,
}

unsafe impl Send for MappableMemory {}
unsafe impl Sync for MappableMemory {}

impl MappableMemory {
    fn new(size: usize) -> Self {
        MappableMemory {
            data: UnsafeCell::new(vec![0u8; size].into_boxed_slice()),
            mapped: AtomicBool::new(false),
        }
    }

    fn len(&self) -> usize {
        unsafe { (&(*self.data.get())).len() }
    }

    fn ptr(&self) -> *mut u8 {
        unsafe { (&mut *self.data.get()).as_mut_ptr() }
    }

    fn begin_map(&self) -> bool {
        !self.mapped.swap(true, Ordering::AcqRel)
    }

    fn end_map(&self) {
        self.mapped.store(false, Ordering::Release);
    }

    fn write(
        &self,
        offset: u64,
        bytes: &[u8],
    ) -> VermilionResult<()> {
        if offset + bytes.len() as u64 > self.len() as u64 {
            return Err(VermilionError::OutOfBounds);
        }
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptr().add(offset as usize),
                bytes.len(),
            );
        }
        Ok(())
    }

    fn read(
        &self,
        offset: u64,
        out: &mut [u8],
    ) -> VermilionResult<()> {
        if offset + out.len() as u64 > self.len() as u64 {
            return Err(VermilionError::OutOfBounds);
        }
        unsafe {
            std::ptr::copy_nonoverlapping(
                self.ptr().add(offset as usize),
                out.as_mut_ptr(),
                out.len(),
            );
        }
        Ok(())
    }

}

//
// Buffer
//

pub struct HeadlessBuffer {
    memory: MappableMemory,
}

impl HeadlessBuffer {
    fn new(description: &BufferDescription) -> Self {
        HeadlessBuffer {
            memory: MappableMemory::new(description.size as usize),
        }
    }
}

impl BufferBackend for HeadlessBuffer {
    fn map(
        &self,
        access: MapAccess,
    ) -> VermilionResult<MappedResource> {
        if !self.memory.begin_map() {
            return Err("buffer is already mapped")?;
        }

        let size = self.memory.len() as u64;
        Ok(MappedResource::new(
            self.memory.ptr(),
            size,
            size as u32,
            size as u32,
            0,
            access,
        ))
    }

    fn unmap(&self) {
        self.memory.end_map();
    }

    fn write(
        &self,
        offset: u64,
        data: &[u8],
    ) -> VermilionResult<()> {
        self.memory.write(offset, data)
    }

    fn read(
        &self,
        offset: u64,
        out: &mut [u8],
    ) -> VermilionResult<()> {
        self.memory.read(offset, out)
    }
}

//
// Texture
//

pub struct HeadlessTexture {
    description: TextureDescription,
    subresources: Vec<MappableMemory>,
}

impl HeadlessTexture {
    fn new(description: &TextureDescription) -> Self {
        let block_size = description.format.block_size_in_bytes().max(1);
        let mut subresources =
            Vec::with_capacity(description.subresource_count() as usize);
        for subresource in 0..description.subresource_count() {
            let mip_level = subresource % description.mip_levels;
            let extents = description.extents.mip_extents(mip_level);
            let size = block_size as usize
                * extents.width as usize
                * extents.height as usize
                * extents.depth as usize;
            subresources.push(MappableMemory::new(size));
        }

        HeadlessTexture {
            description: description.clone(),
            subresources,
        }
    }

    fn pitches(
        &self,
        subresource: u32,
    ) -> (u32, u32) {
        let mip_level = subresource % self.description.mip_levels;
        let extents = self.description.extents.mip_extents(mip_level);
        let row_pitch = extents.width * self.description.format.block_size_in_bytes();
        (row_pitch, row_pitch * extents.height)
    }
}

impl TextureBackend for HeadlessTexture {
    fn map(
        &self,
        subresource: u32,
        access: MapAccess,
    ) -> VermilionResult<MappedResource> {
        let memory = self
            .subresources
            .get(subresource as usize)
            .ok_or(VermilionError::OutOfBounds)?;

        if !memory.begin_map() {
            return Err("texture subresource is already mapped")?;
        }

        let (row_pitch, depth_pitch) = self.pitches(subresource);
        Ok(MappedResource::new(
            memory.ptr(),
            memory.len() as u64,
            row_pitch,
            depth_pitch,
            subresource,
            access,
        ))
    }

    fn unmap(
        &self,
        subresource: u32,
    ) {
        if let Some(memory) = self.subresources.get(subresource as usize) {
            memory.end_map();
        }
    }

    fn write(
        &self,
        subresource: u32,
        data: &[u8],
    ) -> VermilionResult<()> {
        let memory = self
            .subresources
            .get(subresource as usize)
            .ok_or(VermilionError::OutOfBounds)?;
        memory.write(0, data)
    }

    fn read(
        &self,
        subresource: u32,
        out: &mut Vec<u8>,
    ) -> VermilionResult<()> {
        let memory = self
            .subresources
            .get(subresource as usize)
            .ok_or(VermilionError::OutOfBounds)?;
        out.resize(memory.len(), 0);
        memory.read(0, out)
    }
}

//
// Sampler / Shader / Pipelines
//

pub struct HeadlessSampler;
impl SamplerBackend for HeadlessSampler {}

pub struct HeadlessShader;
impl ShaderBackend for HeadlessShader {}

pub struct HeadlessPipeline;
impl PipelineBackend for HeadlessPipeline {}

//
// Framebuffer
//

pub struct HeadlessFramebuffer {
    color_targets: Mutex<Vec<FramebufferTarget>>,
    depth_target: Option<FramebufferTarget>,
}

impl HeadlessFramebuffer {
    fn new(
        color_targets: &[FramebufferTarget],
        depth_target: Option<&FramebufferTarget>,
    ) -> Self {
        HeadlessFramebuffer {
            color_targets: Mutex::new(color_targets.to_vec()),
            depth_target: depth_target.cloned(),
        }
    }
}

impl FramebufferBackend for HeadlessFramebuffer {
    fn rebind_color_target(
        &self,
        index: usize,
        attachment: &FramebufferAttachmentDescription,
        texture: Arc<Texture>,
    ) -> VermilionResult<()> {
        let mut color_targets = self.color_targets.lock();
        if index >= color_targets.len() {
            return Err(VermilionError::OutOfBounds);
        }

        color_targets[index] = FramebufferTarget {
            texture,
            array_layer: attachment.array_layer,
            mip_level: attachment.mip_level,
        };
        Ok(())
    }

    fn snapshot(
        &self,
        color_index: usize,
        array_layer: u32,
        mip_level: u32,
        out_pixels: &mut Vec<u8>,
    ) -> VermilionResult<()> {
        let color_targets = self.color_targets.lock();
        let target = color_targets
            .get(color_index)
            .ok_or(VermilionError::OutOfBounds)?;

        let subresource = target.texture.subresource_index(array_layer, mip_level);
        target.texture.read(subresource, out_pixels)
    }
}

//
// Fence
//

pub struct HeadlessFence {
    signaled: Mutex<bool>,
    condvar: Condvar,
}

impl HeadlessFence {
    fn new() -> Self {
        HeadlessFence {
            signaled: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }
}

impl FenceBackend for HeadlessFence {
    fn wait(
        &self,
        timeout: FenceWait,
    ) -> VermilionResult<bool> {
        let mut signaled = self.signaled.lock();
        match timeout {
            FenceWait::Infinite => {
                while !*signaled {
                    self.condvar.wait(&mut signaled);
                }
                Ok(true)
            }
            FenceWait::Nanoseconds(ns) => {
                let deadline = Instant::now() + Duration::from_nanos(ns);
                while !*signaled {
                    if self.condvar.wait_until(&mut signaled, deadline).timed_out() {
                        return Ok(*signaled);
                    }
                }
                Ok(true)
            }
        }
    }

    fn signaled(&self) -> bool {
        *self.signaled.lock()
    }

    fn signal(&self) {
        *self.signaled.lock() = true;
        self.condvar.notify_all();
    }

    fn reset(&self) {
        *self.signaled.lock() = false;
    }
}

//
// Command list
//

pub struct HeadlessCommandList {
    commands: Mutex<Vec<RecordedCommand>>,
}

impl HeadlessCommandList {
    fn new() -> Self {
        HeadlessCommandList {
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn commands(&self) -> Vec<RecordedCommand> {
        self.commands.lock().clone()
    }

    pub fn command_count(&self) -> usize {
        self.commands.lock().len()
    }
}

impl CommandListBackend for HeadlessCommandList {
    fn begin(&self) -> VermilionResult<()> {
        self.commands.lock().clear();
        Ok(())
    }

    fn end(&self) -> VermilionResult<()> {
        Ok(())
    }

    fn record(
        &self,
        command: RecordedCommand,
    ) -> VermilionResult<()> {
        self.commands.lock().push(command);
        Ok(())
    }
}

//
// Swapchain
//

pub struct HeadlessSwapchain {
    present_count: AtomicU64,
}

impl HeadlessSwapchain {
    fn new() -> Self {
        HeadlessSwapchain {
            present_count: AtomicU64::new(0),
        }
    }

    pub fn present_count(&self) -> u64 {
        self.present_count.load(Ordering::Acquire)
    }
}

impl SwapchainBackend for HeadlessSwapchain {
    fn present(&self) -> VermilionResult<()> {
        self.present_count.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

//
// Backend
//

fn encode_color(
    format: PixelFormat,
    value: &ColorClearValue,
) -> Vec<u8> {
    fn to_u8(channel: f32) -> u8 {
        (channel.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
    }

    let [r, g, b, a] = value.0;
    match format {
        PixelFormat::R8_UNORM => vec![to_u8(r)],
        PixelFormat::R8G8_UNORM => vec![to_u8(r), to_u8(g)],
        PixelFormat::R8G8B8A8_UNORM | PixelFormat::R8G8B8A8_UNORM_SRGB => {
            vec![to_u8(r), to_u8(g), to_u8(b), to_u8(a)]
        }
        PixelFormat::B8G8R8A8_UNORM | PixelFormat::B8G8R8A8_UNORM_SRGB => {
            vec![to_u8(b), to_u8(g), to_u8(r), to_u8(a)]
        }
        PixelFormat::R32_FLOAT => r.to_le_bytes().to_vec(),
        PixelFormat::R32G32_FLOAT => {
            let mut bytes = r.to_le_bytes().to_vec();
            bytes.extend_from_slice(&g.to_le_bytes());
            bytes
        }
        PixelFormat::R32G32B32A32_FLOAT => {
            let mut bytes = r.to_le_bytes().to_vec();
            bytes.extend_from_slice(&g.to_le_bytes());
            bytes.extend_from_slice(&b.to_le_bytes());
            bytes.extend_from_slice(&a.to_le_bytes());
            bytes
        }
        // Remaining formats clear to zero
        _ => vec![0; format.block_size_in_bytes() as usize],
    }
}

fn encode_depth_stencil(
    format: PixelFormat,
    value: &DepthStencilClearValue,
) -> Vec<u8> {
    let depth = value.depth.clamp(0.0, 1.0);
    match format {
        PixelFormat::D16_UNORM => ((depth * 65535.0) as u16).to_le_bytes().to_vec(),
        PixelFormat::D24_UNORM_S8_UINT => {
            let packed = ((depth * 16_777_215.0) as u32) | (value.stencil << 24);
            packed.to_le_bytes().to_vec()
        }
        PixelFormat::D32_FLOAT => depth.to_le_bytes().to_vec(),
        PixelFormat::D32_FLOAT_S8_UINT => {
            let mut bytes = depth.to_le_bytes().to_vec();
            bytes.extend_from_slice(&value.stencil.to_le_bytes());
            bytes
        }
        _ => vec![0; format.block_size_in_bytes() as usize],
    }
}

/// The always-available software implementation of `GraphicsBackend`.
pub struct HeadlessBackend {
    capabilities: DeviceCapabilities,
    state_caches: StateObjectCaches,
    submitted_command_list_count: AtomicU64,
    draw_call_count: AtomicU64,
    dispatch_count: AtomicU64,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        HeadlessBackend {
            capabilities: DeviceCapabilities {
                compute_shader: true,
                geometry_shader: true,
                tessellation_shader: true,
                multiple_viewports: true,
                independent_blend: true,
                structured_buffers: true,
                texture_1d: true,
                fill_mode_wireframe: true,
                sampler_anisotropy: true,
                depth_clip_disable: true,
                command_list_debug_markers: true,
                concurrent_resources: true,
                depth_range_zero_to_one: true,
                uv_origin_top_left: true,
            },
            state_caches: StateObjectCaches::new(),
            submitted_command_list_count: AtomicU64::new(0),
            draw_call_count: AtomicU64::new(0),
            dispatch_count: AtomicU64::new(0),
        }
    }

    pub fn state_caches(&self) -> &StateObjectCaches {
        &self.state_caches
    }

    pub fn submitted_command_list_count(&self) -> u64 {
        self.submitted_command_list_count.load(Ordering::Acquire)
    }

    pub fn draw_call_count(&self) -> u64 {
        self.draw_call_count.load(Ordering::Acquire)
    }

    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count.load(Ordering::Acquire)
    }

    fn clear_color_target(
        resources: &DeviceResourceManager,
        framebuffer: &Framebuffer,
        index: u32,
        value: &ColorClearValue,
    ) -> VermilionResult<()> {
        let attachment = framebuffer
            .color_target(index as usize)
            .ok_or(VermilionError::OutOfBounds)?;
        let texture = resources
            .get_resource::<Texture>(attachment.texture)
            .ok_or(VermilionError::InvalidHandle)?;

        let subresource =
            texture.subresource_index(attachment.array_layer, attachment.mip_level);
        let pattern = encode_color(texture.description().format, value);

        let mut data = Vec::new();
        texture.read(subresource, &mut data)?;
        let mut offset = 0;
        while offset + pattern.len() <= data.len() {
            data[offset..offset + pattern.len()].copy_from_slice(&pattern);
            offset += pattern.len();
        }
        texture.write(subresource, &data)
    }

    fn clear_depth_target(
        resources: &DeviceResourceManager,
        framebuffer: &Framebuffer,
        value: &DepthStencilClearValue,
    ) -> VermilionResult<()> {
        let attachment = match framebuffer.depth_target() {
            Some(attachment) => attachment,
            None => return Ok(()),
        };
        let texture = resources
            .get_resource::<Texture>(attachment.texture)
            .ok_or(VermilionError::InvalidHandle)?;

        let subresource =
            texture.subresource_index(attachment.array_layer, attachment.mip_level);
        let pattern = encode_depth_stencil(texture.description().format, value);

        let mut data = Vec::new();
        texture.read(subresource, &mut data)?;
        let mut offset = 0;
        while offset + pattern.len() <= data.len() {
            data[offset..offset + pattern.len()].copy_from_slice(&pattern);
            offset += pattern.len();
        }
        texture.write(subresource, &data)
    }

    fn execute(
        &self,
        commands: &[RecordedCommand],
        resources: &DeviceResourceManager,
    ) -> VermilionResult<()> {
        let mut current_framebuffer: Option<Arc<Framebuffer>> = None;

        for command in commands {
            match command {
                RecordedCommand::SetFramebuffer(handle) => {
                    current_framebuffer = resources.get_resource::<Framebuffer>(*handle);
                    if current_framebuffer.is_none() {
                        return Err(VermilionError::InvalidHandle);
                    }
                }
                RecordedCommand::ClearColorTarget { index, value } => {
                    let framebuffer = current_framebuffer
                        .as_ref()
                        .ok_or("clear without a bound framebuffer")?;
                    Self::clear_color_target(resources, framebuffer, *index, value)?;
                }
                RecordedCommand::ClearDepthStencilTarget { value } => {
                    let framebuffer = current_framebuffer
                        .as_ref()
                        .ok_or("clear without a bound framebuffer")?;
                    Self::clear_depth_target(resources, framebuffer, value)?;
                }
                RecordedCommand::UpdateBuffer {
                    buffer,
                    byte_offset,
                    data,
                } => {
                    let buffer = resources
                        .get_resource::<Buffer>(*buffer)
                        .ok_or(VermilionError::InvalidHandle)?;
                    buffer.write(*byte_offset, data)?;
                }
                RecordedCommand::CopyBuffer {
                    src,
                    dst,
                    src_offset,
                    dst_offset,
                    size,
                } => {
                    let src = resources
                        .get_resource::<Buffer>(*src)
                        .ok_or(VermilionError::InvalidHandle)?;
                    let dst = resources
                        .get_resource::<Buffer>(*dst)
                        .ok_or(VermilionError::InvalidHandle)?;

                    let mut staging = vec![0u8; *size as usize];
                    src.read(*src_offset, &mut staging)?;
                    dst.write(*dst_offset, &staging)?;
                }
                RecordedCommand::CopyTexture {
                    src,
                    src_subresource,
                    dst,
                    dst_subresource,
                } => {
                    let src = resources
                        .get_resource::<Texture>(*src)
                        .ok_or(VermilionError::InvalidHandle)?;
                    let dst = resources
                        .get_resource::<Texture>(*dst)
                        .ok_or(VermilionError::InvalidHandle)?;

                    let mut staging = Vec::new();
                    src.read(*src_subresource, &mut staging)?;
                    dst.write(*dst_subresource, &staging)?;
                }
                RecordedCommand::ResolveTexture { src, dst } => {
                    let src = resources
                        .get_resource::<Texture>(*src)
                        .ok_or(VermilionError::InvalidHandle)?;
                    let dst = resources
                        .get_resource::<Texture>(*dst)
                        .ok_or(VermilionError::InvalidHandle)?;

                    let count = src.subresource_count().min(dst.subresource_count());
                    for subresource in 0..count {
                        let mut staging = Vec::new();
                        src.read(subresource, &mut staging)?;
                        dst.write(subresource, &staging)?;
                    }
                }
                RecordedCommand::Draw { .. }
                | RecordedCommand::DrawIndexed { .. }
                | RecordedCommand::DrawInstanced { .. } => {
                    self.draw_call_count.fetch_add(1, Ordering::AcqRel);
                }
                RecordedCommand::Dispatch { .. } => {
                    self.dispatch_count.fetch_add(1, Ordering::AcqRel);
                }
                // Pure pipeline state; nothing to emulate
                RecordedCommand::SetViewport(_)
                | RecordedCommand::SetScissor(_)
                | RecordedCommand::SetGraphicsPipeline(_)
                | RecordedCommand::SetComputePipeline(_)
                | RecordedCommand::SetVertexBuffer { .. }
                | RecordedCommand::SetIndexBuffer { .. }
                | RecordedCommand::SetResourceSet { .. }
                | RecordedCommand::PushDebugGroup(_)
                | RecordedCommand::PopDebugGroup
                | RecordedCommand::InsertDebugMarker(_) => {}
            }
        }

        Ok(())
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Headless
    }

    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    fn create_buffer(
        &self,
        description: &BufferDescription,
    ) -> VermilionResult<Box<dyn BufferBackend>> {
        Ok(Box::new(HeadlessBuffer::new(description)))
    }

    fn create_texture(
        &self,
        description: &TextureDescription,
    ) -> VermilionResult<Box<dyn TextureBackend>> {
        Ok(Box::new(HeadlessTexture::new(description)))
    }

    fn create_sampler(
        &self,
        _description: &SamplerDescription,
    ) -> VermilionResult<Box<dyn SamplerBackend>> {
        Ok(Box::new(HeadlessSampler))
    }

    fn create_shader(
        &self,
        _description: &ShaderDescription,
    ) -> VermilionResult<Box<dyn ShaderBackend>> {
        Ok(Box::new(HeadlessShader))
    }

    fn create_graphics_pipeline(
        &self,
        description: &GraphicsPipelineDescription,
        shaders: &[Arc<Shader>],
    ) -> VermilionResult<GraphicsPipelineParts> {
        let multisample_enabled = description.sample_count != TextureSampleCount::SampleCount1;
        let vertex_shader_hash = shaders
            .iter()
            .find(|shader| shader.stage().contains(ShaderStages::VERTEX))
            .map(|shader| shader.byte_code_hash())
            .unwrap_or(0);

        Ok(GraphicsPipelineParts {
            rasterizer_state: self
                .state_caches
                .get_rasterizer_state(&description.rasterizer_state, multisample_enabled),
            blend_state: self.state_caches.get_blend_state(&description.blend_state),
            depth_stencil_state: self
                .state_caches
                .get_depth_stencil_state(&description.depth_stencil_state),
            input_layout: self
                .state_caches
                .get_input_layout(&description.input_layout, vertex_shader_hash),
            backend: Box::new(HeadlessPipeline),
        })
    }

    fn create_compute_pipeline(
        &self,
        _description: &ComputePipelineDescription,
        _shader: &Arc<Shader>,
    ) -> VermilionResult<Box<dyn PipelineBackend>> {
        Ok(Box::new(HeadlessPipeline))
    }

    fn create_framebuffer(
        &self,
        _description: &FramebufferDescription,
        color_targets: &[FramebufferTarget],
        depth_target: Option<&FramebufferTarget>,
    ) -> VermilionResult<Box<dyn FramebufferBackend>> {
        Ok(Box::new(HeadlessFramebuffer::new(color_targets, depth_target)))
    }

    fn create_swapchain(
        &self,
        _window: Option<&dyn raw_window_handle::HasRawWindowHandle>,
        _description: &SwapchainDescription,
    ) -> VermilionResult<Box<dyn SwapchainBackend>> {
        Ok(Box::new(HeadlessSwapchain::new()))
    }

    fn create_fence(&self) -> VermilionResult<Box<dyn FenceBackend>> {
        Ok(Box::new(HeadlessFence::new()))
    }

    fn create_command_list(
        &self,
        _description: &CommandListDescription,
    ) -> VermilionResult<Box<dyn CommandListBackend>> {
        Ok(Box::new(HeadlessCommandList::new()))
    }

    fn submit_command_list(
        &self,
        command_list: &CommandList,
        fence: Option<&Fence>,
        resources: &DeviceResourceManager,
    ) -> VermilionResult<()> {
        if command_list.record_state() != CommandListState::Closed {
            return Err("submitted command list was not closed")?;
        }

        let backend = command_list
            .backend()
            .downcast_ref::<HeadlessCommandList>()
            .ok_or("command list was created by another backend")?;

        self.execute(&backend.commands(), resources)?;
        self.submitted_command_list_count
            .fetch_add(1, Ordering::AcqRel);

        // Work completes synchronously, so the fence signals at submission
        if let Some(fence) = fence {
            fence.backend().signal();
        }
        Ok(())
    }

    fn wait_for_idle(&self) -> VermilionResult<()> {
        // All submissions execute synchronously
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mappable_memory_bounds() {
        let memory = MappableMemory::new(16);
        assert!(memory.write(0, &[1; 16]).is_ok());
        assert!(matches!(
            memory.write(1, &[1; 16]),
            Err(VermilionError::OutOfBounds)
        ));

        let mut out = [0u8; 4];
        assert!(memory.read(12, &mut out).is_ok());
        assert_eq!(out, [1; 4]);
    }

    #[test]
    fn fence_signals_and_times_out() {
        let fence = HeadlessFence::new();
        assert_eq!(fence.wait(FenceWait::Nanoseconds(100_000)).unwrap(), false);

        fence.signal();
        assert_eq!(fence.wait(FenceWait::Infinite).unwrap(), true);
        assert!(fence.signaled());

        fence.reset();
        assert!(!fence.signaled());
    }

    #[test]
    fn color_encoding() {
        let value = ColorClearValue([1.0, 0.5, 0.0, 1.0]);
        assert_eq!(
            encode_color(PixelFormat::R8G8B8A8_UNORM, &value),
            vec![255, 128, 0, 255]
        );
        assert_eq!(
            encode_color(PixelFormat::B8G8R8A8_UNORM, &value),
            vec![0, 128, 255, 255]
        );
    }

}
