use crate::graph::{RenderGraphBuilder, RenderPass};
use fnv::FnvHashMap;
use vermilion_rhi::{Device, ResourceHandle, VermilionResult};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphNodeId(pub(super) usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RenderGraphResourceId(pub(super) usize);

/// How a graph node binds a resource it declares.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderGraphResourceBindType {
    /// Created for this graph, usable only within it
    Transient,
    WriteOnly,
    ReadOnly,
    ReadWrite,
    /// An already-live resource registered into the graph; the graph never owns it
    Imported,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderGraphResourceType {
    Unknown,
    Buffer,
    Texture,
    Sampler,
    RenderTarget,
}

/// The access state a graph resource is in while a pass executes. Transitions
/// between states become barriers in the compiled pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderGraphResourceState {
    Undefined,
    Write,
    Read,
}

/// A schedulable event in the graph, generally one render or compute pass. Nodes
/// declare the resources they create, read and write during `setup`; `compile`
/// turns the node into an executable pass once the builder has resolved resources
/// and execution order.
pub trait RenderGraphNode: Send {
    fn name(&self) -> &str;

    /// Declare resource usage. `resources` carries named handles the embedding
    /// renderer makes available to every node (e.g. the swapchain back buffer).
    fn setup(
        &mut self,
        node_id: RenderGraphNodeId,
        builder: &mut RenderGraphBuilder,
        resources: &FnvHashMap<String, ResourceHandle>,
    ) -> VermilionResult<()>;

    /// Produce the executable pass. Called in execution order, after every pending
    /// graph resource has been instantiated.
    fn compile(
        &mut self,
        builder: &RenderGraphBuilder,
        device: &mut Device,
    ) -> VermilionResult<Box<dyn RenderPass>>;

    /// Disabled nodes are skipped at compile time without disturbing the rest of
    /// the graph.
    fn is_enabled(&self) -> bool {
        true
    }
}
