use crate::render::{
    RenderObject, RenderObjectKey, RenderStageIndex, RenderView, SortMode, VisibilityGroup,
};
use vermilion_rhi::{
    ColorClearValue, CommandList, DepthStencilClearValue, Device, ResourceHandle,
    VermilionResult,
};

/// One pass of the active renderer (opaque G-buffer fill, transparency, shadow
/// depth, ...). A stage filters the visible set down to applicable objects, orders
/// them with its sort mode and draws into its output framebuffer.
pub trait RenderStage: Send + Sync {
    fn debug_name(&self) -> &str;

    fn stage_index(&self) -> RenderStageIndex;

    fn sort_mode(&self) -> &dyn SortMode;

    fn is_applicable(
        &self,
        object: &RenderObject,
    ) -> bool {
        object.stage_mask.is_included(self.stage_index())
    }

    /// Returns the framebuffer this stage draws into for the given view, creating
    /// or resizing it as needed.
    fn bind_output(
        &mut self,
        device: &mut Device,
        view: &RenderView,
    ) -> VermilionResult<ResourceHandle>;

    /// Clear value applied to every color target before drawing, if any
    fn clear_color(&self) -> Option<ColorClearValue> {
        None
    }

    /// Clear value applied to the depth target before drawing, if any
    fn clear_depth_stencil(&self) -> Option<DepthStencilClearValue> {
        None
    }

    /// Records the draw for one visible object.
    fn draw(
        &mut self,
        commands: &CommandList,
        visibility_group: &VisibilityGroup,
        object: RenderObjectKey,
    ) -> VermilionResult<()>;
}
