//! Renders a few frames on the software backend and reads the result back.
//!
//! Run with `cargo run --example headless_frame`.

use std::sync::Arc;
use vermilion::framework::{
    AxisAlignedBoundingBox, CullingMode, FrontToBackSortMode, RenderContext, RenderObject,
    RenderObjectKey, RenderStage, RenderStageIndex, RenderStageMask, RenderSystem, RenderView,
    SceneContext, SortMode, VisibilityGroup,
};
use vermilion::rhi::{
    ColorClearValue, CommandList, Device, DeviceDescription, FramebufferAttachmentDescription,
    FramebufferDescription, PixelFormat, ResourceHandle, TextureDescription, VermilionResult,
};

struct OpaqueStage {
    sort_mode: FrontToBackSortMode,
    framebuffer: ResourceHandle,
}

impl RenderStage for OpaqueStage {
    fn debug_name(&self) -> &str {
        "opaque"
    }

    fn stage_index(&self) -> RenderStageIndex {
        0
    }

    fn sort_mode(&self) -> &dyn SortMode {
        &self.sort_mode
    }

    fn bind_output(
        &mut self,
        device: &mut Device,
        _view: &RenderView,
    ) -> VermilionResult<ResourceHandle> {
        if self.framebuffer.is_invalidated() {
            let color = device.create_texture(&TextureDescription::for_render_target(
                128,
                128,
                PixelFormat::R8G8B8A8_UNORM,
            ))?;
            self.framebuffer = device.create_framebuffer(&FramebufferDescription {
                color_targets: vec![FramebufferAttachmentDescription::new(color)],
                depth_target: None,
            })?;
        }
        Ok(self.framebuffer)
    }

    fn clear_color(&self) -> Option<ColorClearValue> {
        Some(ColorClearValue([0.1, 0.1, 0.15, 1.0]))
    }

    fn draw(
        &mut self,
        commands: &CommandList,
        _visibility_group: &VisibilityGroup,
        _object: RenderObjectKey,
    ) -> VermilionResult<()> {
        commands.cmd_draw(3, 0)
    }
}

fn main() -> VermilionResult<()> {
    env_logger::init();

    let mut device = Device::new_headless(&DeviceDescription::default())?;
    let mut render_system = RenderSystem::new(false);

    let group = Arc::new(VisibilityGroup::new(0));
    for i in 0..32 {
        group.add_render_object(RenderObject {
            bounding_box: AxisAlignedBoundingBox::from_center_and_half_extents(
                glam::Vec3::new((i % 8) as f32 * 4.0 - 14.0, 0.0, -(i as f32) - 5.0),
                glam::Vec3::splat(0.5),
            ),
            stage_mask: RenderStageMask::empty().with_stage(0),
            ..Default::default()
        });
    }

    let proj = glam::Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
    let view = glam::Mat4::look_at_rh(glam::Vec3::ZERO, glam::Vec3::NEG_Z, glam::Vec3::Y);

    let mut scene = SceneContext {
        visibility_groups: vec![group],
        render_views: vec![Arc::new(RenderView::new(
            "main",
            glam::Vec3::ZERO,
            view,
            proj,
            CullingMode::Frustum,
        ))],
        render_stages: vec![Box::new(OpaqueStage {
            sort_mode: FrontToBackSortMode::new(),
            framebuffer: ResourceHandle::invalid(),
        })],
        render_features: Vec::new(),
        context: RenderContext::new(),
    };

    for _ in 0..3 {
        render_system.render_frame(&mut device, &mut scene)?;
    }

    println!(
        "rendered {} frames, {} visible objects in the last one",
        render_system.frame_count(),
        scene.render_views[0].visible_object_count()
    );
    Ok(())
}
