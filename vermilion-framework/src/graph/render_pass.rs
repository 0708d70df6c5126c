use crate::graph::{RenderGraphResourceId, RenderGraphResourceState};
use vermilion_rhi::{Device, ResourceHandle, VermilionResult};

/// A resource state change the compiled pipeline performs before executing a pass.
#[derive(Debug, Copy, Clone)]
pub struct ResourceStateTransition {
    pub resource: RenderGraphResourceId,
    pub handle: ResourceHandle,
    pub before: RenderGraphResourceState,
    pub after: RenderGraphResourceState,
}

/// Executable unit produced by compiling a render graph node.
pub trait RenderPass: Send {
    fn name(&self) -> &str;

    fn execute(
        &mut self,
        device: &mut Device,
    ) -> VermilionResult<()>;
}

pub(super) struct CompiledPass {
    pub(super) pass: Box<dyn RenderPass>,
    pub(super) transitions: Vec<ResourceStateTransition>,
}

/// The executable form of a render graph: passes in dependency order, each with
/// the resource state transitions that must precede it.
pub struct RenderPipeline {
    pub(super) passes: Vec<CompiledPass>,
}

impl RenderPipeline {
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.pass.name()).collect()
    }

    /// The transitions recorded for the pass at `index`, in execution order.
    pub fn pass_transitions(
        &self,
        index: usize,
    ) -> &[ResourceStateTransition] {
        &self.passes[index].transitions
    }

    pub fn execute(
        &mut self,
        device: &mut Device,
    ) -> VermilionResult<()> {
        profiling::scope!("RenderPipeline::execute");

        for compiled in &mut self.passes {
            for transition in &compiled.transitions {
                log::trace!(
                    "transition {:?}: {:?} -> {:?}",
                    transition.handle,
                    transition.before,
                    transition.after
                );
            }
            compiled.pass.execute(device)?;
        }
        Ok(())
    }
}
