use crate::backend::{FramebufferTarget, GraphicsBackend};
use crate::*;
use std::sync::Arc;

/// Produces concrete resource objects through the active backend and registers them
/// with the resource manager.
///
/// Every `create_*` returns a `ResourceHandle`, the one ownership convention of the
/// API. Each call creates a brand-new resource instance, even for identical
/// descriptions; only the backend's immutable state-object caches deduplicate.
pub struct DeviceResourceFactory {
    backend: Arc<dyn GraphicsBackend>,
}

impl DeviceResourceFactory {
    pub fn new(backend: Arc<dyn GraphicsBackend>) -> Self {
        DeviceResourceFactory { backend }
    }

    pub fn create_buffer(
        &self,
        manager: &mut DeviceResourceManager,
        description: &BufferDescription,
    ) -> VermilionResult<ResourceHandle> {
        description.verify();
        let backend = self.backend.create_buffer(description)?;
        let buffer = Arc::new(Buffer::new(description.clone(), backend));
        Ok(manager.register_resource(buffer))
    }

    pub fn create_texture(
        &self,
        manager: &mut DeviceResourceManager,
        description: &TextureDescription,
    ) -> VermilionResult<ResourceHandle> {
        description.verify();
        let backend = self.backend.create_texture(description)?;
        let texture = Arc::new(Texture::new(description.clone(), backend));
        Ok(manager.register_resource(texture))
    }

    pub fn create_sampler(
        &self,
        manager: &mut DeviceResourceManager,
        description: &SamplerDescription,
    ) -> VermilionResult<ResourceHandle> {
        let backend = self.backend.create_sampler(description)?;
        let sampler = Arc::new(Sampler::new(description.clone(), backend));
        Ok(manager.register_resource(sampler))
    }

    pub fn create_shader(
        &self,
        manager: &mut DeviceResourceManager,
        description: &ShaderDescription,
    ) -> VermilionResult<ResourceHandle> {
        description.verify();
        let backend = self.backend.create_shader(description)?;
        let shader = Arc::new(Shader::new(description.clone(), backend));
        Ok(manager.register_resource(shader))
    }

    pub fn create_graphics_pipeline(
        &self,
        manager: &mut DeviceResourceManager,
        description: &GraphicsPipelineDescription,
    ) -> VermilionResult<ResourceHandle> {
        description.verify();

        let mut shaders = Vec::with_capacity(description.shaders.len());
        for handle in &description.shaders {
            let shader = manager
                .get_resource::<Shader>(*handle)
                .ok_or(VermilionError::InvalidHandle)?;
            shaders.push(shader);
        }

        let parts = self.backend.create_graphics_pipeline(description, &shaders)?;
        let pipeline = Arc::new(GraphicsPipeline::new(description.clone(), parts));
        let handle = manager.register_resource(pipeline);

        for shader in &description.shaders {
            manager.increment_resource_ref(*shader);
        }
        for layout in &description.resource_layouts {
            manager.increment_resource_ref(*layout);
        }
        Ok(handle)
    }

    pub fn create_compute_pipeline(
        &self,
        manager: &mut DeviceResourceManager,
        description: &ComputePipelineDescription,
    ) -> VermilionResult<ResourceHandle> {
        let shader = manager
            .get_resource::<Shader>(description.shader)
            .ok_or(VermilionError::InvalidHandle)?;

        let backend = self.backend.create_compute_pipeline(description, &shader)?;
        let pipeline = Arc::new(ComputePipeline::new(description.clone(), backend));
        let handle = manager.register_resource(pipeline);

        manager.increment_resource_ref(description.shader);
        for layout in &description.resource_layouts {
            manager.increment_resource_ref(*layout);
        }
        Ok(handle)
    }

    fn resolve_target(
        manager: &DeviceResourceManager,
        attachment: &FramebufferAttachmentDescription,
    ) -> VermilionResult<FramebufferTarget> {
        let texture = manager
            .get_resource::<Texture>(attachment.texture)
            .ok_or(VermilionError::InvalidHandle)?;
        Ok(FramebufferTarget {
            texture,
            array_layer: attachment.array_layer,
            mip_level: attachment.mip_level,
        })
    }

    pub fn create_framebuffer(
        &self,
        manager: &mut DeviceResourceManager,
        description: &FramebufferDescription,
    ) -> VermilionResult<ResourceHandle> {
        description.verify();

        let mut color_targets = Vec::with_capacity(description.color_targets.len());
        for attachment in &description.color_targets {
            color_targets.push(Self::resolve_target(manager, attachment)?);
        }
        let depth_target = description
            .depth_target
            .as_ref()
            .map(|attachment| Self::resolve_target(manager, attachment))
            .transpose()?;

        // Dimensions come from whichever attached texture is examined first; the
        // depth target takes priority over color target 0. They are fixed for the
        // lifetime of the framebuffer.
        let reference = depth_target.as_ref().or_else(|| color_targets.first());
        let (width, height) = match reference {
            Some(target) => {
                let extents = target
                    .texture
                    .extents()
                    .mip_extents(target.mip_level);
                (extents.width, extents.height)
            }
            None => (0, 0),
        };

        let backend = self.backend.create_framebuffer(
            description,
            &color_targets,
            depth_target.as_ref(),
        )?;
        let framebuffer = Arc::new(Framebuffer::new(
            description.clone(),
            width,
            height,
            backend,
        ));
        let handle = manager.register_resource(framebuffer);

        // Composite resources hold a reference on every attachment; the deferred
        // release queue gives them back when the framebuffer dies
        for attachment in &description.color_targets {
            manager.increment_resource_ref(attachment.texture);
        }
        if let Some(depth) = &description.depth_target {
            manager.increment_resource_ref(depth.texture);
        }
        Ok(handle)
    }

    pub fn create_swapchain(
        &self,
        manager: &mut DeviceResourceManager,
        window: Option<&dyn raw_window_handle::HasRawWindowHandle>,
        description: &SwapchainDescription,
    ) -> VermilionResult<ResourceHandle> {
        description.verify();

        let backend = self.backend.create_swapchain(window, description)?;
        let swapchain = Arc::new(Swapchain::new(description.clone(), backend));
        let handle = manager.register_resource(swapchain.clone());

        let (framebuffer, color_texture, depth_texture) = self.create_swapchain_targets(
            manager,
            description,
            description.width,
            description.height,
        )?;
        swapchain.set_targets(
            framebuffer,
            color_texture,
            depth_texture,
            Extents2D {
                width: description.width,
                height: description.height,
            },
        );
        Ok(handle)
    }

    /// Builds the back-buffer texture(s) and framebuffer for a swapchain. Also used
    /// when the device resizes its main swapchain.
    pub(crate) fn create_swapchain_targets(
        &self,
        manager: &mut DeviceResourceManager,
        description: &SwapchainDescription,
        width: u32,
        height: u32,
    ) -> VermilionResult<(ResourceHandle, ResourceHandle, ResourceHandle)> {
        let color_texture = self.create_texture(
            manager,
            &TextureDescription::for_render_target(width, height, description.format),
        )?;

        let depth_texture = match description.depth_format {
            Some(depth_format) => self.create_texture(
                manager,
                &TextureDescription::for_render_target(width, height, depth_format),
            )?,
            None => ResourceHandle::invalid(),
        };

        let framebuffer = self.create_framebuffer(
            manager,
            &FramebufferDescription {
                color_targets: vec![FramebufferAttachmentDescription::new(color_texture)],
                depth_target: if depth_texture.is_invalidated() {
                    None
                } else {
                    Some(FramebufferAttachmentDescription::new(depth_texture))
                },
            },
        )?;

        Ok((framebuffer, color_texture, depth_texture))
    }

    pub fn create_fence(
        &self,
        manager: &mut DeviceResourceManager,
    ) -> VermilionResult<ResourceHandle> {
        let backend = self.backend.create_fence()?;
        let fence = Arc::new(Fence::new(backend));
        Ok(manager.register_resource(fence))
    }

    pub fn create_command_list(
        &self,
        manager: &mut DeviceResourceManager,
        description: &CommandListDescription,
    ) -> VermilionResult<ResourceHandle> {
        let backend = self.backend.create_command_list(description)?;
        let command_list = Arc::new(CommandList::new(description.clone(), backend));
        Ok(manager.register_resource(command_list))
    }

    pub fn create_resource_layout(
        &self,
        manager: &mut DeviceResourceManager,
        description: &ResourceLayoutDescription,
    ) -> VermilionResult<ResourceHandle> {
        let layout = Arc::new(ResourceLayout::new(description.clone()));
        Ok(manager.register_resource(layout))
    }

    pub fn create_resource_set(
        &self,
        manager: &mut DeviceResourceManager,
        description: &ResourceSetDescription,
    ) -> VermilionResult<ResourceHandle> {
        let layout = manager
            .get_resource::<ResourceLayout>(description.layout)
            .ok_or(VermilionError::InvalidHandle)?;
        debug_assert_eq!(
            layout.element_count(),
            description.resources.len(),
            "resource set binds {} resources but the layout declares {} elements",
            description.resources.len(),
            layout.element_count()
        );

        for handle in &description.resources {
            if !manager.contains(*handle) {
                return Err(VermilionError::InvalidHandle);
            }
        }

        let resource_set = Arc::new(ResourceSet::new(description.clone()));
        let handle = manager.register_resource(resource_set);

        manager.increment_resource_ref(description.layout);
        for bound in &description.resources {
            manager.increment_resource_ref(*bound);
        }
        Ok(handle)
    }
}
