use crate::{
    BlendState, ComputePipelineDescription, DepthStencilState, DeviceResource,
    DeviceResourceState, GraphicsPipelineDescription, InputLayout, RasterizerState, ResourceKind,
};
use std::sync::Arc;

pub trait PipelineBackend: Send + Sync {
    fn destroy(&self) {}
}

/// The pieces a backend hands back when building a graphics pipeline. The state
/// object `Arc`s come out of the backend's `StateObjectCaches`, so two pipelines
/// built from equal state descriptions share the same native objects.
pub struct GraphicsPipelineParts {
    pub rasterizer_state: Arc<RasterizerState>,
    pub blend_state: Arc<BlendState>,
    pub depth_stencil_state: Arc<DepthStencilState>,
    pub input_layout: Arc<InputLayout>,
    pub backend: Box<dyn PipelineBackend>,
}

pub struct GraphicsPipeline {
    state: DeviceResourceState,
    description: GraphicsPipelineDescription,
    rasterizer_state: Arc<RasterizerState>,
    blend_state: Arc<BlendState>,
    depth_stencil_state: Arc<DepthStencilState>,
    input_layout: Arc<InputLayout>,
    backend: Box<dyn PipelineBackend>,
}

impl GraphicsPipeline {
    pub fn new(
        description: GraphicsPipelineDescription,
        parts: GraphicsPipelineParts,
    ) -> Self {
        GraphicsPipeline {
            state: DeviceResourceState::new(ResourceKind::GraphicsPipeline),
            description,
            rasterizer_state: parts.rasterizer_state,
            blend_state: parts.blend_state,
            depth_stencil_state: parts.depth_stencil_state,
            input_layout: parts.input_layout,
            backend: parts.backend,
        }
    }

    pub fn description(&self) -> &GraphicsPipelineDescription {
        &self.description
    }

    pub fn rasterizer_state(&self) -> &Arc<RasterizerState> {
        &self.rasterizer_state
    }

    pub fn blend_state(&self) -> &Arc<BlendState> {
        &self.blend_state
    }

    pub fn depth_stencil_state(&self) -> &Arc<DepthStencilState> {
        &self.depth_stencil_state
    }

    pub fn input_layout(&self) -> &Arc<InputLayout> {
        &self.input_layout
    }
}

impl DeviceResource for GraphicsPipeline {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}

pub struct ComputePipeline {
    state: DeviceResourceState,
    description: ComputePipelineDescription,
    backend: Box<dyn PipelineBackend>,
}

impl ComputePipeline {
    pub fn new(
        description: ComputePipelineDescription,
        backend: Box<dyn PipelineBackend>,
    ) -> Self {
        ComputePipeline {
            state: DeviceResourceState::new(ResourceKind::ComputePipeline),
            description,
            backend,
        }
    }

    pub fn description(&self) -> &ComputePipelineDescription {
        &self.description
    }
}

impl DeviceResource for ComputePipeline {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
