use crate::graph::{
    CompiledPass, RenderGraphNode, RenderGraphNodeId, RenderGraphResourceBindType,
    RenderGraphResourceId, RenderGraphResourceState, RenderGraphResourceType, RenderPipeline,
    ResourceStateTransition,
};
use fnv::{FnvHashMap, FnvHashSet};
use std::collections::BinaryHeap;
use vermilion_rhi::{
    BufferDescription, Device, FramebufferAttachmentDescription, FramebufferDescription,
    ResourceHandle, SamplerDescription, TextureDescription, VermilionError, VermilionResult,
};

pub(super) enum PendingResourceDescription {
    Texture(TextureDescription),
    Buffer(BufferDescription),
    Sampler(SamplerDescription),
    /// A texture plus a single-target framebuffer wrapping it; the graph handle
    /// resolves to the framebuffer
    RenderTarget(TextureDescription),
}

/// A graph resource: either imported (already live) or pending until `compile`
/// instantiates it through the device factory.
pub struct RenderGraphResource {
    handle: ResourceHandle,
    bind_type: RenderGraphResourceBindType,
    resource_type: RenderGraphResourceType,
    producer: Option<RenderGraphNodeId>,
    pending: Option<PendingResourceDescription>,
}

impl RenderGraphResource {
    /// Invalid until the graph is compiled, unless the resource was imported
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    pub fn bind_type(&self) -> RenderGraphResourceBindType {
        self.bind_type
    }

    pub fn resource_type(&self) -> RenderGraphResourceType {
        self.resource_type
    }

    pub fn producer(&self) -> Option<RenderGraphNodeId> {
        self.producer
    }
}

/// A declarative dependency graph over GPU resources produced and consumed by
/// named nodes, compiled into an ordered `RenderPipeline`.
///
/// Execution order guarantees: no node executes before every node it reads from
/// has executed, and a resource's state transitions are recorded between a write
/// and any subsequent read.
pub struct RenderGraphBuilder {
    nodes: Vec<Option<Box<dyn RenderGraphNode>>>,
    node_names: Vec<String>,
    resources: Vec<RenderGraphResource>,
    reads: Vec<(RenderGraphNodeId, RenderGraphResourceId)>,
    writes: Vec<(RenderGraphNodeId, RenderGraphResourceId)>,
    compiled: bool,
}

impl Default for RenderGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderGraphBuilder {
    pub fn new() -> Self {
        RenderGraphBuilder {
            nodes: Vec::new(),
            node_names: Vec::new(),
            resources: Vec::new(),
            reads: Vec::new(),
            writes: Vec::new(),
            compiled: false,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_name(
        &self,
        node: RenderGraphNodeId,
    ) -> &str {
        &self.node_names[node.0]
    }

    pub fn resource(
        &self,
        resource: RenderGraphResourceId,
    ) -> &RenderGraphResource {
        &self.resources[resource.0]
    }

    /// The concrete handle behind a graph resource. Invalid before `compile` for
    /// non-imported resources.
    pub fn resource_handle(
        &self,
        resource: RenderGraphResourceId,
    ) -> ResourceHandle {
        self.resources[resource.0].handle
    }

    /// Registers a node and runs its `setup`, which declares the node's resource
    /// usage against this builder.
    pub fn add_node(
        &mut self,
        mut node: Box<dyn RenderGraphNode>,
        resources: &FnvHashMap<String, ResourceHandle>,
    ) -> VermilionResult<RenderGraphNodeId> {
        let node_id = RenderGraphNodeId(self.nodes.len());
        self.node_names.push(node.name().to_string());
        self.nodes.push(None);

        node.setup(node_id, self, resources)?;
        self.nodes[node_id.0] = Some(node);
        Ok(node_id)
    }

    /// Registers an already-live resource. The graph records usage against it but
    /// never assumes ownership.
    pub fn import(
        &mut self,
        handle: ResourceHandle,
        resource_type: RenderGraphResourceType,
    ) -> RenderGraphResourceId {
        debug_assert!(!handle.is_invalidated());
        let id = RenderGraphResourceId(self.resources.len());
        self.resources.push(RenderGraphResource {
            handle,
            bind_type: RenderGraphResourceBindType::Imported,
            resource_type,
            producer: None,
            pending: None,
        });
        id
    }

    fn create_pending(
        &mut self,
        producer: RenderGraphNodeId,
        resource_type: RenderGraphResourceType,
        bind_type: RenderGraphResourceBindType,
        pending: PendingResourceDescription,
    ) -> RenderGraphResourceId {
        debug_assert_ne!(bind_type, RenderGraphResourceBindType::Imported);
        let id = RenderGraphResourceId(self.resources.len());
        self.resources.push(RenderGraphResource {
            handle: ResourceHandle::invalid(),
            bind_type,
            resource_type,
            producer: Some(producer),
            pending: Some(pending),
        });
        id
    }

    /// Registers a pending texture creation attributed to `producer`. The
    /// description is stored; instantiation happens during `compile`.
    pub fn create_texture(
        &mut self,
        producer: RenderGraphNodeId,
        description: &TextureDescription,
        bind_type: RenderGraphResourceBindType,
    ) -> RenderGraphResourceId {
        self.create_pending(
            producer,
            RenderGraphResourceType::Texture,
            bind_type,
            PendingResourceDescription::Texture(description.clone()),
        )
    }

    pub fn create_buffer(
        &mut self,
        producer: RenderGraphNodeId,
        description: &BufferDescription,
        bind_type: RenderGraphResourceBindType,
    ) -> RenderGraphResourceId {
        self.create_pending(
            producer,
            RenderGraphResourceType::Buffer,
            bind_type,
            PendingResourceDescription::Buffer(description.clone()),
        )
    }

    pub fn create_sampler(
        &mut self,
        producer: RenderGraphNodeId,
        description: &SamplerDescription,
        bind_type: RenderGraphResourceBindType,
    ) -> RenderGraphResourceId {
        self.create_pending(
            producer,
            RenderGraphResourceType::Sampler,
            bind_type,
            PendingResourceDescription::Sampler(description.clone()),
        )
    }

    /// Registers a pending render target: a texture wrapped in a single-target
    /// framebuffer. The graph handle resolves to the framebuffer.
    pub fn create_render_target(
        &mut self,
        producer: RenderGraphNodeId,
        description: &TextureDescription,
        bind_type: RenderGraphResourceBindType,
    ) -> RenderGraphResourceId {
        self.create_pending(
            producer,
            RenderGraphResourceType::RenderTarget,
            bind_type,
            PendingResourceDescription::RenderTarget(description.clone()),
        )
    }

    /// Records that `node` writes `resource`.
    pub fn write(
        &mut self,
        node: RenderGraphNodeId,
        resource: RenderGraphResourceId,
    ) {
        debug_assert_ne!(
            self.resources[resource.0].bind_type,
            RenderGraphResourceBindType::ReadOnly,
            "node '{}' writes a read-only resource",
            self.node_name(node)
        );
        self.writes.push((node, resource));
    }

    /// Records that `node` reads `resource`; `node` will execute after every
    /// writer of the resource.
    pub fn read(
        &mut self,
        node: RenderGraphNodeId,
        resource: RenderGraphResourceId,
    ) {
        debug_assert_ne!(
            self.resources[resource.0].bind_type,
            RenderGraphResourceBindType::WriteOnly,
            "node '{}' reads a write-only resource",
            self.node_name(node)
        );
        self.reads.push((node, resource));
    }

    fn instantiate_pending_resources(
        &mut self,
        device: &mut Device,
    ) -> VermilionResult<()> {
        for resource in &mut self.resources {
            let Some(pending) = resource.pending.take() else {
                continue;
            };

            resource.handle = match pending {
                PendingResourceDescription::Texture(description) => {
                    device.create_texture(&description)?
                }
                PendingResourceDescription::Buffer(description) => {
                    device.create_buffer(&description)?
                }
                PendingResourceDescription::Sampler(description) => {
                    device.create_sampler(&description)?
                }
                PendingResourceDescription::RenderTarget(description) => {
                    let texture = device.create_texture(&description)?;
                    let attachment = FramebufferAttachmentDescription::new(texture);
                    let framebuffer = if description.format.has_depth() {
                        FramebufferDescription {
                            color_targets: Vec::new(),
                            depth_target: Some(attachment),
                        }
                    } else {
                        FramebufferDescription {
                            color_targets: vec![attachment],
                            depth_target: None,
                        }
                    };
                    device.create_framebuffer(&framebuffer)?
                }
            };
        }
        Ok(())
    }

    /// Writers of each resource: the producer plus every declared write.
    fn resource_writers(&self) -> Vec<Vec<RenderGraphNodeId>> {
        let mut writers: Vec<Vec<RenderGraphNodeId>> = vec![Vec::new(); self.resources.len()];
        for (index, resource) in self.resources.iter().enumerate() {
            if let Some(producer) = resource.producer {
                writers[index].push(producer);
            }
        }
        for (node, resource) in &self.writes {
            if !writers[resource.0].contains(node) {
                writers[resource.0].push(*node);
            }
        }
        writers
    }

    /// Topological order over the producer/consumer edges, deterministic by node
    /// registration order.
    fn execution_order(&self) -> VermilionResult<Vec<RenderGraphNodeId>> {
        let node_count = self.nodes.len();
        let writers = self.resource_writers();

        let mut edges: FnvHashSet<(usize, usize)> = FnvHashSet::default();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        let mut in_degree = vec![0usize; node_count];

        for (reader, resource) in &self.reads {
            for writer in &writers[resource.0] {
                if writer == reader {
                    continue;
                }
                if edges.insert((writer.0, reader.0)) {
                    successors[writer.0].push(reader.0);
                    in_degree[reader.0] += 1;
                }
            }
        }

        // Kahn, always expanding the lowest ready node id first
        let mut ready: BinaryHeap<std::cmp::Reverse<usize>> = (0..node_count)
            .filter(|index| in_degree[*index] == 0)
            .map(std::cmp::Reverse)
            .collect();
        let mut order = Vec::with_capacity(node_count);

        while let Some(std::cmp::Reverse(index)) = ready.pop() {
            order.push(RenderGraphNodeId(index));
            for successor in &successors[index] {
                in_degree[*successor] -= 1;
                if in_degree[*successor] == 0 {
                    ready.push(std::cmp::Reverse(*successor));
                }
            }
        }

        if order.len() < node_count {
            let stuck = (0..node_count)
                .find(|index| in_degree[*index] > 0)
                .expect("incomplete order without a positive in-degree");
            return Err(VermilionError::GraphCycle(self.node_names[stuck].clone()));
        }

        Ok(order)
    }

    /// A node survives culling when it writes something observable: an imported
    /// resource, or a resource read by a surviving node. Nodes that write nothing
    /// at all are treated as side-effecting and kept.
    fn live_nodes(
        &self,
        order: &[RenderGraphNodeId],
    ) -> Vec<bool> {
        let mut written_by: Vec<Vec<RenderGraphResourceId>> = vec![Vec::new(); self.nodes.len()];
        for (index, resource) in self.resources.iter().enumerate() {
            if let Some(producer) = resource.producer {
                written_by[producer.0].push(RenderGraphResourceId(index));
            }
        }
        for (node, resource) in &self.writes {
            if !written_by[node.0].contains(resource) {
                written_by[node.0].push(*resource);
            }
        }

        let mut live_resources = vec![false; self.resources.len()];
        let mut live = vec![false; self.nodes.len()];

        for node in order.iter().rev() {
            let written = &written_by[node.0];
            let is_live = written.is_empty()
                || written.iter().any(|resource| {
                    live_resources[resource.0]
                        || self.resources[resource.0].bind_type
                            == RenderGraphResourceBindType::Imported
                });

            if is_live {
                live[node.0] = true;
                for (reader, resource) in &self.reads {
                    if reader == node {
                        live_resources[resource.0] = true;
                    }
                }
            }
        }

        live
    }

    /// Resolves all pending resources, establishes the execution order, culls dead
    /// and disabled nodes, records resource state transitions and compiles each
    /// surviving node into a pass.
    pub fn compile(
        &mut self,
        device: &mut Device,
    ) -> VermilionResult<RenderPipeline> {
        profiling::scope!("RenderGraphBuilder::compile");
        debug_assert!(!self.compiled, "a graph builder compiles only once");
        self.compiled = true;

        self.instantiate_pending_resources(device)?;
        let order = self.execution_order()?;
        let live = self.live_nodes(&order);

        let mut reads_by_node: FnvHashMap<usize, Vec<RenderGraphResourceId>> =
            FnvHashMap::default();
        for (node, resource) in &self.reads {
            reads_by_node.entry(node.0).or_default().push(*resource);
        }
        let mut writes_by_node: FnvHashMap<usize, Vec<RenderGraphResourceId>> =
            FnvHashMap::default();
        for (index, resource) in self.resources.iter().enumerate() {
            if let Some(producer) = resource.producer {
                writes_by_node
                    .entry(producer.0)
                    .or_default()
                    .push(RenderGraphResourceId(index));
            }
        }
        for (node, resource) in &self.writes {
            let entries = writes_by_node.entry(node.0).or_default();
            if !entries.contains(resource) {
                entries.push(*resource);
            }
        }

        let mut nodes = std::mem::take(&mut self.nodes);
        let mut resource_states =
            vec![RenderGraphResourceState::Undefined; self.resources.len()];
        let mut passes = Vec::new();

        for node_id in order {
            let node = nodes[node_id.0]
                .as_mut()
                .expect("node disappeared before compilation");

            if !node.is_enabled() {
                log::debug!("render graph node '{}' is disabled", self.node_name(node_id));
                continue;
            }
            if !live[node_id.0] {
                log::debug!("culled render graph node '{}'", self.node_name(node_id));
                continue;
            }

            let mut transitions = Vec::new();
            for resource in writes_by_node.get(&node_id.0).into_iter().flatten() {
                let state = &mut resource_states[resource.0];
                if *state != RenderGraphResourceState::Write {
                    transitions.push(ResourceStateTransition {
                        resource: *resource,
                        handle: self.resources[resource.0].handle,
                        before: *state,
                        after: RenderGraphResourceState::Write,
                    });
                    *state = RenderGraphResourceState::Write;
                }
            }
            for resource in reads_by_node.get(&node_id.0).into_iter().flatten() {
                // A node both reading and writing a resource leaves it in Write
                if writes_by_node
                    .get(&node_id.0)
                    .map(|writes| writes.contains(resource))
                    .unwrap_or(false)
                {
                    continue;
                }
                let state = &mut resource_states[resource.0];
                if *state != RenderGraphResourceState::Read {
                    transitions.push(ResourceStateTransition {
                        resource: *resource,
                        handle: self.resources[resource.0].handle,
                        before: *state,
                        after: RenderGraphResourceState::Read,
                    });
                    *state = RenderGraphResourceState::Read;
                }
            }

            let pass = nodes[node_id.0]
                .as_mut()
                .unwrap()
                .compile(self, device)?;
            passes.push(CompiledPass { pass, transitions });
        }

        Ok(RenderPipeline { passes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::RenderPass;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use vermilion_rhi::{DeviceDescription, Framebuffer, PixelFormat, Texture};

    type Blackboard = Arc<Mutex<FnvHashMap<String, RenderGraphResourceId>>>;
    type ExecutionLog = Arc<Mutex<Vec<String>>>;

    struct TestPass {
        name: String,
        log: ExecutionLog,
    }

    impl RenderPass for TestPass {
        fn name(&self) -> &str {
            &self.name
        }

        fn execute(
            &mut self,
            _device: &mut Device,
        ) -> VermilionResult<()> {
            self.log.lock().push(self.name.clone());
            Ok(())
        }
    }

    struct TestNode {
        name: String,
        creates: Vec<String>,
        reads: Vec<String>,
        writes: Vec<String>,
        enabled: bool,
        board: Blackboard,
        log: ExecutionLog,
    }

    impl TestNode {
        fn boxed(
            name: &str,
            creates: &[&str],
            reads: &[&str],
            writes: &[&str],
            board: &Blackboard,
            log: &ExecutionLog,
        ) -> Box<dyn RenderGraphNode> {
            Box::new(TestNode {
                name: name.to_string(),
                creates: creates.iter().map(|s| s.to_string()).collect(),
                reads: reads.iter().map(|s| s.to_string()).collect(),
                writes: writes.iter().map(|s| s.to_string()).collect(),
                enabled: true,
                board: board.clone(),
                log: log.clone(),
            })
        }
    }

    impl RenderGraphNode for TestNode {
        fn name(&self) -> &str {
            &self.name
        }

        fn setup(
            &mut self,
            node_id: RenderGraphNodeId,
            builder: &mut RenderGraphBuilder,
            _resources: &FnvHashMap<String, ResourceHandle>,
        ) -> VermilionResult<()> {
            let mut board = self.board.lock();
            for name in &self.creates {
                let id = builder.create_texture(
                    node_id,
                    &TextureDescription::for_render_target(8, 8, PixelFormat::R8G8B8A8_UNORM),
                    RenderGraphResourceBindType::Transient,
                );
                board.insert(name.clone(), id);
            }
            for name in &self.writes {
                let id = board[name];
                builder.write(node_id, id);
            }
            for name in &self.reads {
                let id = board[name];
                builder.read(node_id, id);
            }
            Ok(())
        }

        fn compile(
            &mut self,
            _builder: &RenderGraphBuilder,
            _device: &mut Device,
        ) -> VermilionResult<Box<dyn RenderPass>> {
            Ok(Box::new(TestPass {
                name: self.name.clone(),
                log: self.log.clone(),
            }))
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }
    }

    fn new_test_setup() -> (Device, RenderGraphBuilder, Blackboard, ExecutionLog) {
        let device = Device::new_headless(&DeviceDescription::default()).unwrap();
        (
            device,
            RenderGraphBuilder::new(),
            Blackboard::default(),
            ExecutionLog::default(),
        )
    }

    #[test]
    fn diamond_compiles_in_dependency_order() {
        let (mut device, mut builder, board, log) = new_test_setup();
        let external = FnvHashMap::default();

        // The back buffer is imported; writing it keeps the final node live
        let back_buffer_texture = device
            .create_texture(&TextureDescription::for_render_target(
                8,
                8,
                PixelFormat::R8G8B8A8_UNORM,
            ))
            .unwrap();
        let back_buffer =
            builder.import(back_buffer_texture, RenderGraphResourceType::Texture);
        board.lock().insert("back_buffer".to_string(), back_buffer);

        builder
            .add_node(
                TestNode::boxed("gbuffer", &["t1"], &[], &[], &board, &log),
                &external,
            )
            .unwrap();
        builder
            .add_node(
                TestNode::boxed("lighting", &["t2"], &["t1"], &[], &board, &log),
                &external,
            )
            .unwrap();
        builder
            .add_node(
                TestNode::boxed("ssao", &["t3"], &["t1"], &[], &board, &log),
                &external,
            )
            .unwrap();
        builder
            .add_node(
                TestNode::boxed(
                    "composite",
                    &[],
                    &["t2", "t3"],
                    &["back_buffer"],
                    &board,
                    &log,
                ),
                &external,
            )
            .unwrap();

        let mut pipeline = builder.compile(&mut device).unwrap();
        assert_eq!(
            pipeline.pass_names(),
            vec!["gbuffer", "lighting", "ssao", "composite"]
        );

        pipeline.execute(&mut device).unwrap();
        assert_eq!(
            *log.lock(),
            vec!["gbuffer", "lighting", "ssao", "composite"]
        );
    }

    #[test]
    fn pending_resources_instantiate_at_compile() {
        let (mut device, mut builder, board, log) = new_test_setup();

        builder
            .add_node(
                TestNode::boxed("producer", &["t1"], &[], &[], &board, &log),
                &FnvHashMap::default(),
            )
            .unwrap();

        let id = board.lock()["t1"];
        assert!(builder.resource_handle(id).is_invalidated());

        let _ = builder.compile(&mut device).unwrap();
        let handle = builder.resource_handle(id);
        assert!(!handle.is_invalidated());
        assert!(device.get_resource::<Texture>(handle).is_some());
    }

    #[test]
    fn render_targets_resolve_to_framebuffers() {
        let (mut device, mut builder, _board, _log) = new_test_setup();

        struct RenderTargetNode;
        impl RenderGraphNode for RenderTargetNode {
            fn name(&self) -> &str {
                "target_producer"
            }

            fn setup(
                &mut self,
                node_id: RenderGraphNodeId,
                builder: &mut RenderGraphBuilder,
                _resources: &FnvHashMap<String, ResourceHandle>,
            ) -> VermilionResult<()> {
                let target = builder.create_render_target(
                    node_id,
                    &TextureDescription::for_render_target(
                        32,
                        32,
                        PixelFormat::R8G8B8A8_UNORM,
                    ),
                    RenderGraphResourceBindType::WriteOnly,
                );
                // Keep the node live by treating its own output as observable
                builder.write(node_id, target);
                Ok(())
            }

            fn compile(
                &mut self,
                builder: &RenderGraphBuilder,
                device: &mut Device,
            ) -> VermilionResult<Box<dyn RenderPass>> {
                let handle = builder.resource_handle(RenderGraphResourceId(0));
                let framebuffer = device
                    .get_resource::<Framebuffer>(handle)
                    .ok_or("render target did not resolve to a framebuffer")?;
                assert_eq!(framebuffer.width(), 32);

                struct Noop;
                impl RenderPass for Noop {
                    fn name(&self) -> &str {
                        "noop"
                    }
                    fn execute(
                        &mut self,
                        _device: &mut Device,
                    ) -> VermilionResult<()> {
                        Ok(())
                    }
                }
                Ok(Box::new(Noop))
            }
        }

        builder
            .add_node(Box::new(RenderTargetNode), &FnvHashMap::default())
            .unwrap();

        // WriteOnly, never read, not imported: the node is culled, but the
        // resource was still instantiated
        let pipeline = builder.compile(&mut device).unwrap();
        assert_eq!(pipeline.pass_count(), 0);
        assert!(!builder
            .resource_handle(RenderGraphResourceId(0))
            .is_invalidated());
    }

    #[test]
    fn cycles_are_rejected() {
        let (mut device, mut builder, board, log) = new_test_setup();
        let external = FnvHashMap::default();

        let x = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();
        let y = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();
        let x = builder.import(x, RenderGraphResourceType::Buffer);
        let y = builder.import(y, RenderGraphResourceType::Buffer);
        {
            let mut board = board.lock();
            board.insert("x".to_string(), x);
            board.insert("y".to_string(), y);
        }

        builder
            .add_node(
                TestNode::boxed("a", &[], &["y"], &["x"], &board, &log),
                &external,
            )
            .unwrap();
        builder
            .add_node(
                TestNode::boxed("b", &[], &["x"], &["y"], &board, &log),
                &external,
            )
            .unwrap();

        match builder.compile(&mut device) {
            Err(VermilionError::GraphCycle(node)) => {
                assert!(node == "a" || node == "b");
            }
            other => panic!("expected a graph cycle error, got {:?}", other.is_ok()),
        }
    }

    #[test]
    fn dead_and_disabled_nodes_are_skipped() {
        let (mut device, mut builder, board, log) = new_test_setup();
        let external = FnvHashMap::default();

        let out = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();
        let out = builder.import(out, RenderGraphResourceType::Buffer);
        board.lock().insert("out".to_string(), out);

        builder
            .add_node(
                TestNode::boxed("used", &["t1"], &[], &[], &board, &log),
                &external,
            )
            .unwrap();
        builder
            .add_node(
                TestNode::boxed("dead", &["t_unused"], &[], &[], &board, &log),
                &external,
            )
            .unwrap();

        let disabled = TestNode {
            name: "disabled".to_string(),
            creates: vec![],
            reads: vec!["t1".to_string()],
            writes: vec!["out".to_string()],
            enabled: false,
            board: board.clone(),
            log: log.clone(),
        };
        builder.add_node(Box::new(disabled), &external).unwrap();

        builder
            .add_node(
                TestNode::boxed("final", &[], &["t1"], &["out"], &board, &log),
                &external,
            )
            .unwrap();

        let pipeline = builder.compile(&mut device).unwrap();
        assert_eq!(pipeline.pass_names(), vec!["used", "final"]);
    }

    #[test]
    fn write_then_read_records_a_state_transition() {
        let (mut device, mut builder, board, log) = new_test_setup();
        let external = FnvHashMap::default();

        let out = device
            .create_buffer(&BufferDescription::for_staging_buffer(16))
            .unwrap();
        let out = builder.import(out, RenderGraphResourceType::Buffer);
        board.lock().insert("out".to_string(), out);

        builder
            .add_node(
                TestNode::boxed("producer", &["t1"], &[], &[], &board, &log),
                &external,
            )
            .unwrap();
        builder
            .add_node(
                TestNode::boxed("consumer", &[], &["t1"], &["out"], &board, &log),
                &external,
            )
            .unwrap();

        let pipeline = builder.compile(&mut device).unwrap();
        let t1 = board.lock()["t1"];

        // Pass 0 takes t1 Undefined -> Write, pass 1 takes it Write -> Read
        let producer_transitions = pipeline.pass_transitions(0);
        assert!(producer_transitions.iter().any(|transition| {
            transition.resource == t1
                && transition.before == RenderGraphResourceState::Undefined
                && transition.after == RenderGraphResourceState::Write
        }));

        let consumer_transitions = pipeline.pass_transitions(1);
        assert!(consumer_transitions.iter().any(|transition| {
            transition.resource == t1
                && transition.before == RenderGraphResourceState::Write
                && transition.after == RenderGraphResourceState::Read
        }));
    }
}
