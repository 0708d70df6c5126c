use crate::render::{
    DrawListEntry, RenderContext, RenderFeature, RenderStage, RenderView, VisibilityGroup,
};
use fnv::FnvHashMap;
use std::sync::Arc;
use vermilion_base::ConcurrentCollector;
use vermilion_rhi::{CommandList, CommandListDescription, Device, Framebuffer, VermilionResult, Viewport};

/// Everything the render system orchestrates for one scene: visibility groups,
/// persistent views, the active renderer's stages, registered render features and
/// the double-buffered per-frame extraction data.
#[derive(Default)]
pub struct SceneContext {
    pub visibility_groups: Vec<Arc<VisibilityGroup>>,
    pub render_views: Vec<Arc<RenderView>>,
    pub render_stages: Vec<Box<dyn RenderStage>>,
    pub render_features: Vec<Box<dyn RenderFeature>>,
    pub context: RenderContext,
}

impl SceneContext {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn visibility_group(
        &self,
        index: u16,
    ) -> Option<&Arc<VisibilityGroup>> {
        self.visibility_groups
            .iter()
            .find(|group| group.index() == index)
    }
}

/// Per-frame orchestration: collect → extract → prepare → begin frame → draw →
/// present → end frame.
///
/// An explicit object, not a singleton; its frame counter is the single source of
/// truth for the double-buffer parity of the extraction data.
pub struct RenderSystem {
    frame_count: u64,
    multi_threaded_rendering: bool,
}

impl RenderSystem {
    pub fn new(multi_threaded_rendering: bool) -> Self {
        RenderSystem {
            frame_count: 0,
            multi_threaded_rendering,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn is_multi_threaded_rendering(&self) -> bool {
        self.multi_threaded_rendering
    }

    /// The extraction data slot written this frame. With multi-threaded rendering
    /// the slot alternates with frame parity; single-threaded rendering always uses
    /// slot 0.
    pub fn data_index_for_extraction(&self) -> usize {
        if self.multi_threaded_rendering {
            (self.frame_count & 1) as usize
        } else {
            0
        }
    }

    /// The extraction data slot read while rendering; the opposite of the
    /// extraction slot when multi-threaded rendering is enabled.
    pub fn data_index_for_rendering(&self) -> usize {
        if self.multi_threaded_rendering {
            ((self.frame_count + 1) & 1) as usize
        } else {
            0
        }
    }

    pub fn advance_frame(&mut self) {
        self.frame_count += 1;
    }

    /// Runs one complete frame against the scene.
    pub fn render_frame(
        &mut self,
        device: &mut Device,
        scene: &mut SceneContext,
    ) -> VermilionResult<()> {
        self.collect(scene);
        self.extract(scene)?;
        self.prepare(scene);

        device.begin_frame();
        self.draw(device, scene)?;
        device.end_frame()?;

        self.advance_frame();
        Ok(())
    }

    /// Gathers the views participating in this frame into the extraction slot and
    /// assigns each a stable index.
    fn collect(
        &self,
        scene: &mut SceneContext,
    ) {
        profiling::scope!("RenderSystem::collect");

        let collector = ConcurrentCollector::with_capacity(scene.render_views.len().max(1));
        for view in &scene.render_views {
            collector.add(view.clone());
        }
        let mut collector = collector;
        collector.close();

        let data = scene.context.data_for_extraction_mut(self);
        data.clear();
        data.views = collector.items().to_vec();
        for (index, view) in data.views.iter().enumerate() {
            view.set_view_index(index as u32);
        }
    }

    /// Culls every visibility group into every collected view, then lets each
    /// render feature snapshot its per-view data.
    fn extract(
        &self,
        scene: &mut SceneContext,
    ) -> VermilionResult<()> {
        profiling::scope!("RenderSystem::extract");

        let views = scene.context.data_for_extraction(self).views.clone();
        for view in &views {
            for group in &scene.visibility_groups {
                group.extract(view, self.frame_count);
            }
            // A view no group claimed this frame still needs its (empty) visible
            // set closed for prepare
            if view.begin_extract(self.frame_count) {
                view.close_visible();
            }
            for feature in &scene.render_features {
                feature.extract(view, &scene.visibility_groups)?;
            }
        }
        Ok(())
    }

    /// Builds the sorted per-(stage, view) draw lists from the visible sets.
    fn prepare(
        &self,
        scene: &mut SceneContext,
    ) {
        profiling::scope!("RenderSystem::prepare");

        let views = scene.context.data_for_extraction(self).views.clone();
        let mut draw_lists = FnvHashMap::default();

        for stage in &scene.render_stages {
            for view in &views {
                let mut entries = Vec::new();
                for visible in view.visible_objects() {
                    let Some(group) = scene.visibility_group(visible.visibility_group_index)
                    else {
                        continue;
                    };
                    let Some(object) = group.get_render_object(visible.key) else {
                        continue;
                    };
                    if !stage.is_applicable(&object) {
                        continue;
                    }

                    entries.push(DrawListEntry {
                        sort_key: stage.sort_mode().generate_sort_key(view, &object),
                        visibility_group_index: visible.visibility_group_index,
                        key: visible.key,
                    });
                }

                // Stable: equal keys keep their collection order
                entries.sort_by_key(|entry| entry.sort_key);
                draw_lists.insert((stage.stage_index(), view.view_index()), entries);
            }
        }

        scene.context.data_for_extraction_mut(self).draw_lists = draw_lists;
    }

    /// Draws the rendering slot's prepared lists: per stage and view, bind the
    /// stage's output, set the viewport, clear, then draw each object in sorted
    /// order.
    fn draw(
        &self,
        device: &mut Device,
        scene: &mut SceneContext,
    ) -> VermilionResult<()> {
        profiling::scope!("RenderSystem::draw");

        let SceneContext {
            visibility_groups,
            render_stages,
            context,
            ..
        } = scene;

        let views = context.data_for_rendering(self).views.clone();
        if views.is_empty() {
            return Ok(());
        }

        let command_list = device.create_command_list(&CommandListDescription::default())?;
        let commands = device
            .get_resource::<CommandList>(command_list)
            .expect("command list was just created");
        commands.begin()?;

        for stage in render_stages.iter_mut() {
            for view in &views {
                let entries = context
                    .data_for_rendering(self)
                    .draw_lists
                    .get(&(stage.stage_index(), view.view_index()))
                    .cloned()
                    .unwrap_or_default();

                let framebuffer_handle = stage.bind_output(device, view)?;
                commands.cmd_set_framebuffer(framebuffer_handle)?;

                if let Some(framebuffer) =
                    device.get_resource::<Framebuffer>(framebuffer_handle)
                {
                    commands.cmd_set_viewport(Viewport {
                        x: 0.0,
                        y: 0.0,
                        width: framebuffer.width() as f32,
                        height: framebuffer.height() as f32,
                        min_depth: 0.0,
                        max_depth: 1.0,
                    })?;

                    if let Some(clear_color) = stage.clear_color() {
                        for index in 0..framebuffer.color_target_count() {
                            commands.cmd_clear_color_target(index as u32, clear_color)?;
                        }
                    }
                    if let Some(clear_depth) = stage.clear_depth_stencil() {
                        if framebuffer.depth_target().is_some() {
                            commands.cmd_clear_depth_stencil_target(clear_depth)?;
                        }
                    }
                }

                for entry in &entries {
                    let Some(group) = visibility_groups
                        .iter()
                        .find(|group| group.index() == entry.visibility_group_index)
                    else {
                        continue;
                    };
                    stage.draw(&commands, group, entry.key)?;
                }
            }
        }

        commands.end()?;
        device.submit_command_list(command_list)?;

        // Transient per-frame list; dies at the next idle flush
        device.enqueue_release_resource(command_list);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::AxisAlignedBoundingBox;
    use crate::render::{
        CullingMode, FrontToBackSortMode, RenderObject, RenderObjectKey, RenderStageIndex,
        RenderStageMask, SortMode,
    };
    use glam::{Mat4, Vec3};
    use parking_lot::Mutex;
    use vermilion_rhi::{
        ColorClearValue, DeviceDescription, FramebufferAttachmentDescription,
        FramebufferDescription, PixelFormat, ResourceHandle, TextureDescription,
    };

    #[test]
    fn double_buffer_parity() {
        let mut multi_threaded = RenderSystem::new(true);
        for _ in 0..7 {
            multi_threaded.advance_frame();
        }
        assert_eq!(multi_threaded.frame_count(), 7);
        assert_eq!(multi_threaded.data_index_for_extraction(), 1);
        assert_eq!(multi_threaded.data_index_for_rendering(), 0);

        let mut single_threaded = RenderSystem::new(false);
        for _ in 0..7 {
            single_threaded.advance_frame();
        }
        assert_eq!(single_threaded.data_index_for_extraction(), 0);
        assert_eq!(single_threaded.data_index_for_rendering(), 0);
    }

    struct TestStage {
        sort_mode: FrontToBackSortMode,
        framebuffer: ResourceHandle,
        drawn: Arc<Mutex<Vec<RenderObjectKey>>>,
    }

    impl TestStage {
        fn new(drawn: Arc<Mutex<Vec<RenderObjectKey>>>) -> Self {
            TestStage {
                sort_mode: FrontToBackSortMode::new(),
                framebuffer: ResourceHandle::invalid(),
                drawn,
            }
        }
    }

    impl RenderStage for TestStage {
        fn debug_name(&self) -> &str {
            "test_opaque"
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
                    16,
                    16,
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
            Some(ColorClearValue([0.0, 0.0, 0.0, 1.0]))
        }

        fn draw(
            &mut self,
            commands: &CommandList,
            _visibility_group: &VisibilityGroup,
            object: RenderObjectKey,
        ) -> VermilionResult<()> {
            self.drawn.lock().push(object);
            commands.cmd_draw(3, 0)
        }
    }

    fn object_at_depth(depth: f32) -> RenderObject {
        RenderObject {
            bounding_box: AxisAlignedBoundingBox::from_center_and_half_extents(
                Vec3::new(0.0, 0.0, -depth),
                Vec3::splat(0.5),
            ),
            stage_mask: RenderStageMask::empty().with_stage(0),
            ..Default::default()
        }
    }

    fn test_scene(drawn: Arc<Mutex<Vec<RenderObjectKey>>>) -> SceneContext {
        let group = Arc::new(VisibilityGroup::new(0));
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        let view_matrix = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let view = Arc::new(RenderView::new(
            "main",
            Vec3::ZERO,
            view_matrix,
            proj,
            CullingMode::Frustum,
        ));

        SceneContext {
            visibility_groups: vec![group],
            render_views: vec![view],
            render_stages: vec![Box::new(TestStage::new(drawn))],
            render_features: Vec::new(),
            context: RenderContext::new(),
        }
    }

    #[test]
    fn single_threaded_frame_draws_sorted_front_to_back() {
        let drawn = Arc::new(Mutex::new(Vec::new()));
        let mut scene = test_scene(drawn.clone());
        let group = scene.visibility_groups[0].clone();

        // Insert far-to-near; the stage must draw near-to-far
        let far = group.add_render_object(object_at_depth(50.0));
        let near = group.add_render_object(object_at_depth(1.0));
        let middle = group.add_render_object(object_at_depth(10.0));
        let _culled = group.add_render_object(RenderObject {
            bounding_box: AxisAlignedBoundingBox::from_center_and_half_extents(
                Vec3::new(0.0, 0.0, 200.0),
                Vec3::splat(0.5),
            ),
            stage_mask: RenderStageMask::empty().with_stage(0),
            ..Default::default()
        });

        let mut device = Device::new_headless(&DeviceDescription::default()).unwrap();
        let mut render_system = RenderSystem::new(false);
        render_system.render_frame(&mut device, &mut scene).unwrap();

        assert_eq!(render_system.frame_count(), 1);
        assert_eq!(device.frame_count(), 1);
        assert_eq!(*drawn.lock(), vec![near, middle, far]);
    }

    #[test]
    fn multi_threaded_frames_draw_the_previous_frame_data() {
        let drawn = Arc::new(Mutex::new(Vec::new()));
        let mut scene = test_scene(drawn.clone());
        let group = scene.visibility_groups[0].clone();
        let object = group.add_render_object(object_at_depth(5.0));

        let mut device = Device::new_headless(&DeviceDescription::default()).unwrap();
        let mut render_system = RenderSystem::new(true);

        // Frame 0 extracts into slot 0 but renders slot 1, which is still empty
        render_system.render_frame(&mut device, &mut scene).unwrap();
        assert!(drawn.lock().is_empty());

        // Frame 1 renders what frame 0 extracted
        render_system.render_frame(&mut device, &mut scene).unwrap();
        assert_eq!(*drawn.lock(), vec![object]);
    }
}
