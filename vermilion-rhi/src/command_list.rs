use crate::{
    ColorClearValue, CommandListDescription, DepthStencilClearValue, DeviceResource,
    DeviceResourceState, IndexFormat, ResourceHandle, ResourceKind, ScissorRect,
    VermilionResult, Viewport,
};
use parking_lot::Mutex;

/// One recorded command. Backends either translate these into native calls while
/// recording or replay them at submission.
#[derive(Debug, Clone)]
pub enum RecordedCommand {
    SetFramebuffer(ResourceHandle),
    SetViewport(Viewport),
    SetScissor(ScissorRect),
    ClearColorTarget {
        index: u32,
        value: ColorClearValue,
    },
    ClearDepthStencilTarget {
        value: DepthStencilClearValue,
    },
    SetGraphicsPipeline(ResourceHandle),
    SetComputePipeline(ResourceHandle),
    SetVertexBuffer {
        binding: u32,
        buffer: ResourceHandle,
        byte_offset: u64,
    },
    SetIndexBuffer {
        buffer: ResourceHandle,
        format: IndexFormat,
        byte_offset: u64,
    },
    SetResourceSet {
        slot: u32,
        resource_set: ResourceHandle,
    },
    Draw {
        vertex_count: u32,
        first_vertex: u32,
    },
    DrawIndexed {
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    },
    DrawInstanced {
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
        first_instance: u32,
    },
    Dispatch {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },
    CopyBuffer {
        src: ResourceHandle,
        dst: ResourceHandle,
        src_offset: u64,
        dst_offset: u64,
        size: u64,
    },
    CopyTexture {
        src: ResourceHandle,
        src_subresource: u32,
        dst: ResourceHandle,
        dst_subresource: u32,
    },
    UpdateBuffer {
        buffer: ResourceHandle,
        byte_offset: u64,
        data: Vec<u8>,
    },
    ResolveTexture {
        src: ResourceHandle,
        dst: ResourceHandle,
    },
    PushDebugGroup(String),
    PopDebugGroup,
    InsertDebugMarker(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CommandListState {
    Initial,
    Recording,
    Closed,
}

/// Native-side command list, one implementation per graphics backend.
pub trait CommandListBackend: downcast_rs::DowncastSync {
    /// Begins a new recording, discarding any previously recorded commands.
    fn begin(&self) -> VermilionResult<()>;

    fn end(&self) -> VermilionResult<()>;

    fn record(
        &self,
        command: RecordedCommand,
    ) -> VermilionResult<()>;

    fn destroy(&self) {}
}

downcast_rs::impl_downcast!(sync CommandListBackend);

/// Records GPU commands for submission via `Device::submit_command_list`.
///
/// State machine: `Initial → Recording → Closed`; `begin` may be called again on a
/// closed list to reuse it.
pub struct CommandList {
    state: DeviceResourceState,
    description: CommandListDescription,
    record_state: Mutex<CommandListState>,
    backend: Box<dyn CommandListBackend>,
}

impl CommandList {
    pub fn new(
        description: CommandListDescription,
        backend: Box<dyn CommandListBackend>,
    ) -> Self {
        CommandList {
            state: DeviceResourceState::new(ResourceKind::CommandList),
            description,
            record_state: Mutex::new(CommandListState::Initial),
            backend,
        }
    }

    pub fn description(&self) -> &CommandListDescription {
        &self.description
    }

    pub fn record_state(&self) -> CommandListState {
        *self.record_state.lock()
    }

    /// The backend object this list records into. Used by backend submission paths.
    pub fn backend(&self) -> &dyn CommandListBackend {
        &*self.backend
    }

    pub fn begin(&self) -> VermilionResult<()> {
        let mut record_state = self.record_state.lock();
        if *record_state == CommandListState::Recording {
            debug_assert!(false, "begin called on a command list already recording");
            return Err("begin called on a command list already recording")?;
        }

        self.backend.begin()?;
        *record_state = CommandListState::Recording;
        Ok(())
    }

    pub fn end(&self) -> VermilionResult<()> {
        let mut record_state = self.record_state.lock();
        if *record_state != CommandListState::Recording {
            debug_assert!(false, "end called on a command list that is not recording");
            return Err("end called on a command list that is not recording")?;
        }

        self.backend.end()?;
        *record_state = CommandListState::Closed;
        Ok(())
    }

    fn record(
        &self,
        command: RecordedCommand,
    ) -> VermilionResult<()> {
        debug_assert_eq!(
            *self.record_state.lock(),
            CommandListState::Recording,
            "commands can only be recorded between begin and end"
        );
        if *self.record_state.lock() != CommandListState::Recording {
            return Err("commands can only be recorded between begin and end")?;
        }

        self.backend.record(command)
    }

    pub fn cmd_set_framebuffer(
        &self,
        framebuffer: ResourceHandle,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetFramebuffer(framebuffer))
    }

    pub fn cmd_set_viewport(
        &self,
        viewport: Viewport,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetViewport(viewport))
    }

    pub fn cmd_set_scissor(
        &self,
        scissor: ScissorRect,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetScissor(scissor))
    }

    pub fn cmd_clear_color_target(
        &self,
        index: u32,
        value: ColorClearValue,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::ClearColorTarget { index, value })
    }

    pub fn cmd_clear_depth_stencil_target(
        &self,
        value: DepthStencilClearValue,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::ClearDepthStencilTarget { value })
    }

    pub fn cmd_set_graphics_pipeline(
        &self,
        pipeline: ResourceHandle,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetGraphicsPipeline(pipeline))
    }

    pub fn cmd_set_compute_pipeline(
        &self,
        pipeline: ResourceHandle,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetComputePipeline(pipeline))
    }

    pub fn cmd_set_vertex_buffer(
        &self,
        binding: u32,
        buffer: ResourceHandle,
        byte_offset: u64,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetVertexBuffer {
            binding,
            buffer,
            byte_offset,
        })
    }

    pub fn cmd_set_index_buffer(
        &self,
        buffer: ResourceHandle,
        format: IndexFormat,
        byte_offset: u64,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetIndexBuffer {
            buffer,
            format,
            byte_offset,
        })
    }

    pub fn cmd_set_resource_set(
        &self,
        slot: u32,
        resource_set: ResourceHandle,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::SetResourceSet { slot, resource_set })
    }

    pub fn cmd_draw(
        &self,
        vertex_count: u32,
        first_vertex: u32,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::Draw {
            vertex_count,
            first_vertex,
        })
    }

    pub fn cmd_draw_indexed(
        &self,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::DrawIndexed {
            index_count,
            first_index,
            vertex_offset,
        })
    }

    pub fn cmd_draw_instanced(
        &self,
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
        first_instance: u32,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::DrawInstanced {
            vertex_count,
            first_vertex,
            instance_count,
            first_instance,
        })
    }

    pub fn cmd_dispatch(
        &self,
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::Dispatch {
            group_count_x,
            group_count_y,
            group_count_z,
        })
    }

    pub fn cmd_copy_buffer(
        &self,
        src: ResourceHandle,
        dst: ResourceHandle,
        src_offset: u64,
        dst_offset: u64,
        size: u64,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::CopyBuffer {
            src,
            dst,
            src_offset,
            dst_offset,
            size,
        })
    }

    pub fn cmd_copy_texture(
        &self,
        src: ResourceHandle,
        src_subresource: u32,
        dst: ResourceHandle,
        dst_subresource: u32,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::CopyTexture {
            src,
            src_subresource,
            dst,
            dst_subresource,
        })
    }

    pub fn cmd_update_buffer(
        &self,
        buffer: ResourceHandle,
        byte_offset: u64,
        data: &[u8],
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::UpdateBuffer {
            buffer,
            byte_offset,
            data: data.to_vec(),
        })
    }

    pub fn cmd_resolve_texture(
        &self,
        src: ResourceHandle,
        dst: ResourceHandle,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::ResolveTexture { src, dst })
    }

    pub fn cmd_push_debug_group(
        &self,
        name: &str,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::PushDebugGroup(name.to_string()))
    }

    pub fn cmd_pop_debug_group(&self) -> VermilionResult<()> {
        self.record(RecordedCommand::PopDebugGroup)
    }

    pub fn cmd_insert_debug_marker(
        &self,
        name: &str,
    ) -> VermilionResult<()> {
        self.record(RecordedCommand::InsertDebugMarker(name.to_string()))
    }
}

impl DeviceResource for CommandList {
    fn resource_state(&self) -> &DeviceResourceState {
        &self.state
    }

    fn destroy(&self) {
        self.backend.destroy();
    }
}
