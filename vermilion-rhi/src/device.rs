use crate::backend::headless::HeadlessBackend;
use crate::backend::GraphicsBackend;
use crate::*;
use fnv::FnvHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceState {
    Initialized,
    FrameInProgress,
    Destroyed,
}

/// The top-level per-backend device: owns the resource manager, the resource
/// factory, command submission and the frame lifecycle.
///
/// This is an explicit context object; create one per backend (tests may hold
/// several in one process) and pass it to whatever needs it.
pub struct Device {
    backend: Arc<dyn GraphicsBackend>,
    factory: DeviceResourceFactory,
    resource_manager: DeviceResourceManager,
    state: DeviceState,
    frame_count: u64,
    main_swapchain: ResourceHandle,
    active_maps: FnvHashMap<(ResourceHandle, u32), MappedResource>,
    invalid_mapped: MappedResource,
}

impl Device {
    pub fn new(
        description: &DeviceDescription,
        backend: Box<dyn GraphicsBackend>,
    ) -> VermilionResult<Self> {
        Self::new_with_window(description, backend, None)
    }

    /// Creates a device whose main swapchain presents to the given window surface.
    pub fn new_with_window(
        description: &DeviceDescription,
        backend: Box<dyn GraphicsBackend>,
        window: Option<&dyn raw_window_handle::HasRawWindowHandle>,
    ) -> VermilionResult<Self> {
        let backend: Arc<dyn GraphicsBackend> = backend.into();
        let factory = DeviceResourceFactory::new(backend.clone());
        let mut resource_manager = DeviceResourceManager::new();

        let main_swapchain = if description.has_main_swapchain {
            factory.create_swapchain(
                &mut resource_manager,
                window,
                &description.main_swapchain_description,
            )?
        } else {
            ResourceHandle::invalid()
        };

        log::debug!("created {:?} device", backend.kind());
        Ok(Device {
            backend,
            factory,
            resource_manager,
            state: DeviceState::Initialized,
            frame_count: 0,
            main_swapchain,
            active_maps: Default::default(),
            invalid_mapped: MappedResource::invalid(),
        })
    }

    /// Creates a device on the software backend.
    pub fn new_headless(description: &DeviceDescription) -> VermilionResult<Self> {
        Self::new(description, Box::new(HeadlessBackend::new()))
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn capabilities(&self) -> &DeviceCapabilities {
        self.backend.capabilities()
    }

    pub fn backend(&self) -> &dyn GraphicsBackend {
        &*self.backend
    }

    pub fn resource_manager(&self) -> &DeviceResourceManager {
        &self.resource_manager
    }

    /// Number of completed frames since device creation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn main_swapchain(&self) -> ResourceHandle {
        self.main_swapchain
    }

    //
    // Frame lifecycle
    //

    pub fn begin_frame(&mut self) {
        debug_assert_eq!(self.state, DeviceState::Initialized);
        profiling::scope!("Device::begin_frame");
        self.state = DeviceState::FrameInProgress;
    }

    /// Blocks until all GPU work completes, flushes the deferred release queue,
    /// presents the main swapchain and advances the frame counter.
    pub fn end_frame(&mut self) -> VermilionResult<()> {
        debug_assert_eq!(self.state, DeviceState::FrameInProgress);
        profiling::scope!("Device::end_frame");

        self.wait_for_idle()?;

        if !self.main_swapchain.is_invalidated() {
            if let Some(swapchain) = self
                .resource_manager
                .get_resource::<Swapchain>(self.main_swapchain)
            {
                swapchain.present()?;
            }
        }

        self.frame_count += 1;
        self.state = DeviceState::Initialized;
        Ok(())
    }

    /// Blocks until the GPU has completed all submitted work, then flushes the
    /// deferred release queue — the one point where queued resources may actually
    /// be destroyed.
    pub fn wait_for_idle(&mut self) -> VermilionResult<()> {
        profiling::scope!("Device::wait_for_idle");
        self.backend.wait_for_idle()?;
        self.resource_manager.release_resources();
        Ok(())
    }

    //
    // Resource creation
    //

    pub fn create_buffer(
        &mut self,
        description: &BufferDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_buffer(&mut self.resource_manager, description)
    }

    pub fn create_texture(
        &mut self,
        description: &TextureDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_texture(&mut self.resource_manager, description)
    }

    pub fn create_sampler(
        &mut self,
        description: &SamplerDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_sampler(&mut self.resource_manager, description)
    }

    pub fn create_shader(
        &mut self,
        description: &ShaderDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_shader(&mut self.resource_manager, description)
    }

    pub fn create_graphics_pipeline(
        &mut self,
        description: &GraphicsPipelineDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_graphics_pipeline(&mut self.resource_manager, description)
    }

    pub fn create_compute_pipeline(
        &mut self,
        description: &ComputePipelineDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_compute_pipeline(&mut self.resource_manager, description)
    }

    pub fn create_framebuffer(
        &mut self,
        description: &FramebufferDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_framebuffer(&mut self.resource_manager, description)
    }

    pub fn create_fence(&mut self) -> VermilionResult<ResourceHandle> {
        self.factory.create_fence(&mut self.resource_manager)
    }

    pub fn create_command_list(
        &mut self,
        description: &CommandListDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_command_list(&mut self.resource_manager, description)
    }

    pub fn create_resource_layout(
        &mut self,
        description: &ResourceLayoutDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_resource_layout(&mut self.resource_manager, description)
    }

    pub fn create_resource_set(
        &mut self,
        description: &ResourceSetDescription,
    ) -> VermilionResult<ResourceHandle> {
        self.factory
            .create_resource_set(&mut self.resource_manager, description)
    }

    //
    // Resource access
    //

    pub fn get_resource<T: DeviceResource>(
        &self,
        handle: ResourceHandle,
    ) -> Option<Arc<T>> {
        self.resource_manager.get_resource(handle)
    }

    pub fn get_resource_untyped(
        &self,
        handle: ResourceHandle,
    ) -> Option<Arc<dyn DeviceResource>> {
        self.resource_manager.get_resource_untyped(handle)
    }

    pub fn increment_resource_ref(
        &mut self,
        handle: ResourceHandle,
    ) -> u32 {
        self.resource_manager.increment_resource_ref(handle)
    }

    pub fn decrement_resource_ref(
        &mut self,
        handle: ResourceHandle,
    ) -> u32 {
        self.resource_manager.decrement_resource_ref(handle)
    }

    pub fn enqueue_release_resource(
        &self,
        handle: ResourceHandle,
    ) {
        self.resource_manager.enqueue_release_resource(handle)
    }

    //
    // Submission and synchronization
    //

    /// Hands a recorded command list to the backend queue without a fence.
    pub fn submit_command_list(
        &self,
        command_list: ResourceHandle,
    ) -> VermilionResult<()> {
        self.submit_command_list_with_fence(command_list, ResourceHandle::invalid())
    }

    /// Hands a recorded command list to the backend queue. The fence, when valid,
    /// is signaled once the submitted work completes.
    pub fn submit_command_list_with_fence(
        &self,
        command_list: ResourceHandle,
        fence: ResourceHandle,
    ) -> VermilionResult<()> {
        let command_list = self
            .resource_manager
            .get_resource::<CommandList>(command_list)
            .ok_or(VermilionError::InvalidHandle)?;

        let fence = if fence.is_invalidated() {
            None
        } else {
            Some(
                self.resource_manager
                    .get_resource::<Fence>(fence)
                    .ok_or(VermilionError::InvalidHandle)?,
            )
        };

        self.backend.submit_command_list(
            &command_list,
            fence.as_deref(),
            &self.resource_manager,
        )
    }

    /// Blocks until the fence signals.
    pub fn wait_for_fence(
        &self,
        fence: ResourceHandle,
    ) -> VermilionResult<()> {
        let fence = self
            .resource_manager
            .get_resource::<Fence>(fence)
            .ok_or(VermilionError::InvalidHandle)?;
        fence.wait(FenceWait::Infinite)?;
        Ok(())
    }

    /// Returns `false` on timeout, `true` on signal.
    pub fn wait_for_fence_timeout(
        &self,
        fence: ResourceHandle,
        timeout_ns: u64,
    ) -> VermilionResult<bool> {
        let fence = self
            .resource_manager
            .get_resource::<Fence>(fence)
            .ok_or(VermilionError::InvalidHandle)?;
        fence.wait(FenceWait::Nanoseconds(timeout_ns))
    }

    /// Waits for all (or any, when `wait_all` is false) of the given fences.
    /// Returns `false` on timeout.
    pub fn wait_for_fences(
        &self,
        fences: &[ResourceHandle],
        wait_all: bool,
        timeout: FenceWait,
    ) -> VermilionResult<bool> {
        let mut resolved = Vec::with_capacity(fences.len());
        for handle in fences {
            resolved.push(
                self.resource_manager
                    .get_resource::<Fence>(*handle)
                    .ok_or(VermilionError::InvalidHandle)?,
            );
        }

        if wait_all {
            let deadline = match timeout {
                FenceWait::Infinite => None,
                FenceWait::Nanoseconds(ns) => Some(Instant::now() + Duration::from_nanos(ns)),
            };

            for fence in &resolved {
                let remaining = match deadline {
                    None => FenceWait::Infinite,
                    Some(deadline) => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Ok(false);
                        }
                        FenceWait::Nanoseconds((deadline - now).as_nanos() as u64)
                    }
                };
                if !fence.wait(remaining)? {
                    return Ok(false);
                }
            }
            Ok(true)
        } else {
            let deadline = match timeout {
                FenceWait::Infinite => None,
                FenceWait::Nanoseconds(ns) => Some(Instant::now() + Duration::from_nanos(ns)),
            };

            loop {
                if resolved.iter().any(|fence| fence.signaled()) {
                    return Ok(true);
                }
                if let Some(deadline) = deadline {
                    if Instant::now() >= deadline {
                        return Ok(false);
                    }
                }
                std::thread::sleep(Duration::from_micros(50));
            }
        }
    }

    //
    // Mapping and updates
    //

    /// Maps a buffer or texture subresource for CPU access.
    ///
    /// Contract violations (non-mappable resource kind, usage/access mismatch,
    /// subresource out of range) assert in debug builds; release builds return a
    /// reference to a cached invalid mapping, which callers on hot paths must check
    /// via `MappedResource::is_valid`.
    pub fn map(
        &mut self,
        handle: ResourceHandle,
        access: MapAccess,
        subresource: u32,
    ) -> &MappedResource {
        let Some(resource) = self.resource_manager.get_resource_untyped(handle) else {
            debug_assert!(false, "map called with an unknown handle");
            return &self.invalid_mapped;
        };

        let mapped = if let Some(buffer) = resource.downcast_ref::<Buffer>() {
            debug_assert_eq!(subresource, 0, "buffers have a single subresource");
            let memory_usage = buffer.description().memory_usage;
            debug_assert!(
                access.is_compatible_with(memory_usage),
                "map access {:?} is incompatible with memory usage {:?}",
                access,
                memory_usage
            );
            if subresource != 0 || !access.is_compatible_with(memory_usage) {
                return &self.invalid_mapped;
            }
            buffer.map(access)
        } else if let Some(texture) = resource.downcast_ref::<Texture>() {
            let memory_usage = texture.description().memory_usage;
            debug_assert!(
                subresource < texture.subresource_count(),
                "subresource {} out of range ({} subresources)",
                subresource,
                texture.subresource_count()
            );
            debug_assert!(
                access.is_compatible_with(memory_usage),
                "map access {:?} is incompatible with memory usage {:?}",
                access,
                memory_usage
            );
            if subresource >= texture.subresource_count()
                || !access.is_compatible_with(memory_usage)
            {
                return &self.invalid_mapped;
            }
            texture.map(subresource, access)
        } else {
            debug_assert!(false, "only buffers and textures can be mapped");
            return &self.invalid_mapped;
        };

        match mapped {
            Ok(mapped) => self
                .active_maps
                .entry((handle, subresource))
                .or_insert(mapped),
            Err(error) => {
                log::error!("map failed: {}", error);
                &self.invalid_mapped
            }
        }
    }

    pub fn unmap(
        &mut self,
        handle: ResourceHandle,
        subresource: u32,
    ) {
        if self.active_maps.remove(&(handle, subresource)).is_none() {
            return;
        }

        let Some(resource) = self.resource_manager.get_resource_untyped(handle) else {
            return;
        };

        if let Some(buffer) = resource.downcast_ref::<Buffer>() {
            buffer.unmap();
        } else if let Some(texture) = resource.downcast_ref::<Texture>() {
            texture.unmap(subresource);
        }
    }

    /// Writes `data` into the buffer at `offset`. The range must lie inside the
    /// buffer.
    pub fn update_buffer(
        &mut self,
        handle: ResourceHandle,
        offset: u64,
        data: &[u8],
    ) -> VermilionResult<()> {
        let buffer = self
            .resource_manager
            .get_resource::<Buffer>(handle)
            .ok_or(VermilionError::InvalidHandle)?;

        debug_assert!(
            offset + data.len() as u64 <= buffer.size(),
            "update_buffer range {}..{} exceeds buffer size {}",
            offset,
            offset + data.len() as u64,
            buffer.size()
        );
        buffer.write(offset, data)
    }

    /// Replaces the contents of one texture subresource.
    pub fn update_texture(
        &mut self,
        handle: ResourceHandle,
        subresource: u32,
        data: &[u8],
    ) -> VermilionResult<()> {
        let texture = self
            .resource_manager
            .get_resource::<Texture>(handle)
            .ok_or(VermilionError::InvalidHandle)?;

        debug_assert!(subresource < texture.subresource_count());
        if subresource >= texture.subresource_count() {
            return Err(VermilionError::OutOfBounds);
        }
        texture.write(subresource, data)
    }

    /// Copies the content of `src` into `dst`, collapsing multisampling where the
    /// backend supports it.
    pub fn resolve_texture(
        &mut self,
        src: ResourceHandle,
        dst: ResourceHandle,
    ) -> VermilionResult<()> {
        let src = self
            .resource_manager
            .get_resource::<Texture>(src)
            .ok_or(VermilionError::InvalidHandle)?;
        let dst = self
            .resource_manager
            .get_resource::<Texture>(dst)
            .ok_or(VermilionError::InvalidHandle)?;

        let count = src.subresource_count().min(dst.subresource_count());
        for subresource in 0..count {
            let mut staging = Vec::new();
            src.read(subresource, &mut staging)?;
            dst.write(subresource, &staging)?;
        }
        Ok(())
    }

    //
    // Framebuffers and swapchains
    //

    /// Re-binds one color slot of a framebuffer, swapping the reference counts of
    /// the old and new attachment textures.
    pub fn set_framebuffer_color_target(
        &mut self,
        framebuffer: ResourceHandle,
        index: usize,
        attachment: FramebufferAttachmentDescription,
    ) -> VermilionResult<()> {
        let framebuffer = self
            .resource_manager
            .get_resource::<Framebuffer>(framebuffer)
            .ok_or(VermilionError::InvalidHandle)?;

        let texture = self
            .resource_manager
            .get_resource::<Texture>(attachment.texture)
            .ok_or(VermilionError::InvalidHandle)?;

        let previous = framebuffer.color_target(index);
        framebuffer.rebind_color_target(index, attachment, texture)?;

        self.resource_manager
            .increment_resource_ref(attachment.texture);
        if let Some(previous) = previous {
            self.resource_manager
                .enqueue_release_resource(previous.texture);
        }
        Ok(())
    }

    /// Captures one color target of a framebuffer into `out_pixels`.
    pub fn snapshot_framebuffer(
        &self,
        framebuffer: ResourceHandle,
        color_index: usize,
        array_layer: u32,
        mip_level: u32,
        out_pixels: &mut Vec<u8>,
    ) -> VermilionResult<()> {
        let framebuffer = self
            .resource_manager
            .get_resource::<Framebuffer>(framebuffer)
            .ok_or(VermilionError::InvalidHandle)?;
        framebuffer.snapshot(color_index, array_layer, mip_level, out_pixels)
    }

    /// Resizes the main swapchain. No-op when the device has no main swapchain or
    /// the handle no longer resolves.
    pub fn resize_swapchain(
        &mut self,
        width: u32,
        height: u32,
    ) -> VermilionResult<()> {
        if self.main_swapchain.is_invalidated() {
            return Ok(());
        }
        let Some(swapchain) = self
            .resource_manager
            .get_resource::<Swapchain>(self.main_swapchain)
        else {
            return Ok(());
        };

        let extents = swapchain.extents();
        if extents.width == width && extents.height == height {
            return Ok(());
        }

        // The old targets ride the deferred release queue; the GPU may still be
        // rendering to them
        self.resource_manager
            .enqueue_release_resource(swapchain.back_buffer());
        self.resource_manager
            .enqueue_release_resource(swapchain.back_buffer_texture());
        self.resource_manager
            .enqueue_release_resource(swapchain.depth_texture());

        let (framebuffer, color_texture, depth_texture) =
            self.factory.create_swapchain_targets(
                &mut self.resource_manager,
                &swapchain.description().clone(),
                width,
                height,
            )?;
        swapchain.set_targets(
            framebuffer,
            color_texture,
            depth_texture,
            Extents2D { width, height },
        );
        Ok(())
    }

    /// Tears the device down, destroying every remaining resource. Called
    /// automatically on drop.
    pub fn destroy(&mut self) -> VermilionResult<()> {
        if self.state == DeviceState::Destroyed {
            return Ok(());
        }

        self.backend.wait_for_idle()?;
        self.resource_manager.release_resources();
        self.resource_manager.clear();
        self.main_swapchain = ResourceHandle::invalid();
        self.state = DeviceState::Destroyed;
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let _ = self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headless_device() -> Device {
        Device::new_headless(&DeviceDescription::default()).unwrap()
    }

    fn device_with_swapchain(
        width: u32,
        height: u32,
    ) -> Device {
        Device::new_headless(&DeviceDescription {
            debug: true,
            has_main_swapchain: true,
            main_swapchain_description: SwapchainDescription {
                width,
                height,
                format: PixelFormat::R8G8B8A8_UNORM,
                depth_format: Some(PixelFormat::D32_FLOAT),
                image_count: 2,
                vsync: false,
            },
        })
        .unwrap()
    }

    #[test]
    fn frame_lifecycle_advances_the_frame_counter() {
        let mut device = device_with_swapchain(64, 64);
        assert_eq!(device.frame_count(), 0);

        for _ in 0..3 {
            device.begin_frame();
            device.end_frame().unwrap();
        }
        assert_eq!(device.frame_count(), 3);
    }

    #[test]
    fn map_and_unmap_a_staging_buffer() {
        let mut device = headless_device();
        let buffer = device
            .create_buffer(&BufferDescription::for_staging_buffer(64))
            .unwrap();

        let mapped = device.map(buffer, MapAccess::ReadWrite, 0);
        assert!(mapped.is_valid());
        assert_eq!(mapped.size(), 64);
        assert!(mapped.write(0, &[42; 16]));

        let mut out = [0u8; 16];
        assert!(mapped.read(0, &mut out));
        assert_eq!(out, [42; 16]);

        device.unmap(buffer, 0);

        // Mappable again after unmap
        let mapped = device.map(buffer, MapAccess::Read, 0);
        assert!(mapped.is_valid());
        device.unmap(buffer, 0);
    }

    #[test]
    #[should_panic]
    fn map_rejects_one_past_the_last_subresource() {
        let mut device = headless_device();
        let texture = device
            .create_texture(&TextureDescription {
                extents: Extents3D {
                    width: 16,
                    height: 16,
                    depth: 1,
                },
                array_layers: 2,
                mip_levels: 3,
                format: PixelFormat::R8G8B8A8_UNORM,
                memory_usage: MemoryUsage::Staging,
                ..Default::default()
            })
            .unwrap();

        // One past the last valid subresource (2 * 3) must be rejected
        let _ = device.map(texture, MapAccess::Read, 6);
    }

    #[test]
    #[should_panic]
    fn map_rejects_incompatible_access() {
        let mut device = headless_device();
        let buffer = device
            .create_buffer(&BufferDescription::for_vertex_buffer(64))
            .unwrap();

        // GpuOnly memory is never CPU-readable
        let _ = device.map(buffer, MapAccess::Read, 0);
    }

    #[test]
    fn update_buffer_within_bounds() {
        let mut device = headless_device();
        let buffer = device
            .create_buffer(&BufferDescription::for_staging_buffer(32))
            .unwrap();

        device.update_buffer(buffer, 8, &[7; 8]).unwrap();

        let mapped = device.map(buffer, MapAccess::Read, 0);
        let mut out = [0u8; 8];
        assert!(mapped.read(8, &mut out));
        assert_eq!(out, [7; 8]);
        device.unmap(buffer, 0);
    }

    #[test]
    #[should_panic]
    fn update_buffer_rejects_out_of_bounds() {
        let mut device = headless_device();
        let buffer = device
            .create_buffer(&BufferDescription::for_staging_buffer(32))
            .unwrap();

        let _ = device.update_buffer(buffer, 30, &[0; 8]);
    }

    #[test]
    fn submitted_copies_execute_and_signal_the_fence() {
        let mut device = headless_device();
        let src = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();
        let dst = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();
        let fence = device.create_fence().unwrap();
        let command_list = device
            .create_command_list(&CommandListDescription::default())
            .unwrap();

        device.update_buffer(src, 0, &[3; 16]).unwrap();

        let commands = device.get_resource::<CommandList>(command_list).unwrap();
        commands.begin().unwrap();
        commands.cmd_copy_buffer(src, dst, 0, 0, 16).unwrap();
        commands.end().unwrap();

        // The fence is unsignaled until the submission completes
        assert_eq!(device.wait_for_fence_timeout(fence, 1_000).unwrap(), false);

        device
            .submit_command_list_with_fence(command_list, fence)
            .unwrap();
        device.wait_for_fence(fence).unwrap();
        assert!(device
            .wait_for_fences(&[fence], true, FenceWait::Infinite)
            .unwrap());

        let mapped = device.map(dst, MapAccess::Read, 0);
        let mut out = [0u8; 16];
        assert!(mapped.read(0, &mut out));
        assert_eq!(out, [3; 16]);
        device.unmap(dst, 0);
    }

    #[test]
    fn deferred_release_waits_for_idle() {
        let mut device = headless_device();
        let buffer = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();

        device.increment_resource_ref(buffer);
        device.enqueue_release_resource(buffer);

        // First idle flush decrements 2 -> 1; the buffer survives
        device.wait_for_idle().unwrap();
        assert!(device.get_resource::<Buffer>(buffer).is_some());

        device.enqueue_release_resource(buffer);
        device.wait_for_idle().unwrap();
        assert!(device.get_resource::<Buffer>(buffer).is_none());
    }

    #[test]
    fn equal_pipeline_state_descriptions_share_cached_state_objects() {
        let mut device = headless_device();
        let shader = device
            .create_shader(&ShaderDescription {
                stage: ShaderStages::VERTEX,
                entry_point: "vs_main".to_string(),
                byte_code: vec![1, 2, 3, 4],
            })
            .unwrap();

        let description = GraphicsPipelineDescription {
            rasterizer_state: RasterizerStateDescription {
                cull_mode: CullMode::Front,
                depth_clip_enabled: false,
                ..Default::default()
            },
            shaders: vec![shader],
            color_formats: vec![PixelFormat::R8G8B8A8_UNORM],
            ..Default::default()
        };

        let first = device.create_graphics_pipeline(&description).unwrap();
        let second = device.create_graphics_pipeline(&description).unwrap();
        assert_ne!(first, second, "pipelines themselves are never deduplicated");

        let first = device.get_resource::<GraphicsPipeline>(first).unwrap();
        let second = device.get_resource::<GraphicsPipeline>(second).unwrap();
        assert!(Arc::ptr_eq(
            first.rasterizer_state(),
            second.rasterizer_state()
        ));
        assert!(Arc::ptr_eq(first.blend_state(), second.blend_state()));
        assert!(Arc::ptr_eq(first.input_layout(), second.input_layout()));
    }

    #[test]
    fn clear_and_snapshot_the_back_buffer() {
        let mut device = device_with_swapchain(4, 4);
        let swapchain = device
            .get_resource::<Swapchain>(device.main_swapchain())
            .unwrap();
        let back_buffer = swapchain.back_buffer();

        let command_list = device
            .create_command_list(&CommandListDescription::default())
            .unwrap();
        let commands = device.get_resource::<CommandList>(command_list).unwrap();
        commands.begin().unwrap();
        commands.cmd_set_framebuffer(back_buffer).unwrap();
        commands
            .cmd_set_viewport(Viewport {
                x: 0.0,
                y: 0.0,
                width: 4.0,
                height: 4.0,
                min_depth: 0.0,
                max_depth: 1.0,
            })
            .unwrap();
        commands
            .cmd_clear_color_target(0, ColorClearValue([1.0, 0.0, 0.0, 1.0]))
            .unwrap();
        commands
            .cmd_clear_depth_stencil_target(DepthStencilClearValue {
                depth: 1.0,
                stencil: 0,
            })
            .unwrap();
        commands.end().unwrap();
        device.submit_command_list(command_list).unwrap();

        let mut pixels = Vec::new();
        device
            .snapshot_framebuffer(back_buffer, 0, 0, 0, &mut pixels)
            .unwrap();
        assert_eq!(pixels.len(), 4 * 4 * 4);
        for pixel in pixels.chunks(4) {
            assert_eq!(pixel, [255, 0, 0, 255]);
        }
    }

    #[test]
    fn resize_swapchain_rebuilds_the_back_buffer() {
        let mut device = device_with_swapchain(32, 32);
        let swapchain = device
            .get_resource::<Swapchain>(device.main_swapchain())
            .unwrap();
        let old_back_buffer = swapchain.back_buffer();

        device.resize_swapchain(64, 48).unwrap();
        assert_eq!(
            swapchain.extents(),
            Extents2D {
                width: 64,
                height: 48
            }
        );
        assert_ne!(swapchain.back_buffer(), old_back_buffer);

        let framebuffer = device
            .get_resource::<Framebuffer>(swapchain.back_buffer())
            .unwrap();
        assert_eq!(framebuffer.width(), 64);
        assert_eq!(framebuffer.height(), 48);

        // Same extents: no-op
        let back_buffer = swapchain.back_buffer();
        device.resize_swapchain(64, 48).unwrap();
        assert_eq!(swapchain.back_buffer(), back_buffer);

        // The old targets die at the next idle flush
        device.wait_for_idle().unwrap();
        assert!(device
            .get_resource::<Framebuffer>(old_back_buffer)
            .is_none());
    }

    #[test]
    fn resize_without_a_main_swapchain_is_a_noop() {
        let mut device = headless_device();
        device.resize_swapchain(128, 128).unwrap();
    }

    #[test]
    fn framebuffer_dimensions_derive_from_depth_target_first() {
        let mut device = headless_device();
        let color = device
            .create_texture(&TextureDescription::for_render_target(
                64,
                64,
                PixelFormat::R8G8B8A8_UNORM,
            ))
            .unwrap();
        let depth = device
            .create_texture(&TextureDescription::for_render_target(
                32,
                32,
                PixelFormat::D32_FLOAT,
            ))
            .unwrap();

        let framebuffer = device
            .create_framebuffer(&FramebufferDescription {
                color_targets: vec![FramebufferAttachmentDescription::new(color)],
                depth_target: Some(FramebufferAttachmentDescription::new(depth)),
            })
            .unwrap();

        let framebuffer = device.get_resource::<Framebuffer>(framebuffer).unwrap();
        assert_eq!(framebuffer.width(), 32);
        assert_eq!(framebuffer.height(), 32);
    }

    #[test]
    fn rebinding_a_color_target_swaps_attachment_refs() {
        let mut device = headless_device();
        let first = device
            .create_texture(&TextureDescription::for_render_target(
                16,
                16,
                PixelFormat::R8G8B8A8_UNORM,
            ))
            .unwrap();
        let second = device
            .create_texture(&TextureDescription::for_render_target(
                16,
                16,
                PixelFormat::R8G8B8A8_UNORM,
            ))
            .unwrap();

        let framebuffer = device
            .create_framebuffer(&FramebufferDescription {
                color_targets: vec![FramebufferAttachmentDescription::new(first)],
                depth_target: None,
            })
            .unwrap();

        assert_eq!(device.resource_manager().resource_ref_count(first), 2);
        device
            .set_framebuffer_color_target(
                framebuffer,
                0,
                FramebufferAttachmentDescription::new(second),
            )
            .unwrap();
        assert_eq!(device.resource_manager().resource_ref_count(second), 2);

        // The old attachment's reference comes back at the next flush
        device.wait_for_idle().unwrap();
        assert_eq!(device.resource_manager().resource_ref_count(first), 1);
    }

    #[test]
    fn resource_sets_hold_references_on_bound_resources() {
        let mut device = headless_device();
        let layout = device
            .create_resource_layout(&ResourceLayoutDescription {
                elements: vec![
                    ResourceLayoutElementDescription {
                        name: "per_object".to_string(),
                        kind: BindableResourceKind::UniformBuffer,
                        stages: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                        count: 1,
                    },
                    ResourceLayoutElementDescription {
                        name: "albedo".to_string(),
                        kind: BindableResourceKind::Texture,
                        stages: ShaderStages::FRAGMENT,
                        count: 1,
                    },
                ],
            })
            .unwrap();

        let uniforms = device
            .create_buffer(&BufferDescription::for_uniform_buffer(256))
            .unwrap();
        let albedo = device
            .create_texture(&TextureDescription::for_render_target(
                16,
                16,
                PixelFormat::R8G8B8A8_UNORM,
            ))
            .unwrap();

        let resource_set = device
            .create_resource_set(&ResourceSetDescription {
                layout,
                resources: vec![uniforms, albedo],
            })
            .unwrap();

        assert_eq!(device.resource_manager().resource_ref_count(uniforms), 2);
        assert_eq!(device.resource_manager().resource_ref_count(albedo), 2);

        // Releasing the set gives the references back over two flushes
        device.enqueue_release_resource(resource_set);
        device.wait_for_idle().unwrap();
        assert!(device.get_resource::<ResourceSet>(resource_set).is_none());
        device.wait_for_idle().unwrap();
        assert_eq!(device.resource_manager().resource_ref_count(uniforms), 1);
        assert_eq!(device.resource_manager().resource_ref_count(albedo), 1);
    }

    #[test]
    fn compute_pipelines_reference_their_shader() {
        let mut device = headless_device();
        let shader = device
            .create_shader(&ShaderDescription {
                stage: ShaderStages::COMPUTE,
                entry_point: "cs_main".to_string(),
                byte_code: vec![9, 9, 9],
            })
            .unwrap();

        let pipeline = device
            .create_compute_pipeline(&ComputePipelineDescription {
                shader,
                resource_layouts: Vec::new(),
            })
            .unwrap();

        assert_eq!(device.resource_manager().resource_ref_count(shader), 2);
        assert!(device.get_resource::<ComputePipeline>(pipeline).is_some());
    }

    #[test]
    fn command_lists_only_record_between_begin_and_end() {
        let mut device = headless_device();
        let command_list = device
            .create_command_list(&CommandListDescription::default())
            .unwrap();
        let commands = device.get_resource::<CommandList>(command_list).unwrap();

        assert_eq!(commands.record_state(), CommandListState::Initial);
        commands.begin().unwrap();
        assert_eq!(commands.record_state(), CommandListState::Recording);
        commands.cmd_draw(3, 0).unwrap();
        commands.end().unwrap();
        assert_eq!(commands.record_state(), CommandListState::Closed);

        // Reusable after another begin
        commands.begin().unwrap();
        commands.end().unwrap();
    }
}
