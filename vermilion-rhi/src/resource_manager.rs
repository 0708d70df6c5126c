use crate::{DeviceResource, ResourceHandle, ResourceKey};
use crossbeam_channel::{Receiver, Sender};
use slotmap::SlotMap;
use std::sync::Arc;

struct ResourceEntry {
    resource: Arc<dyn DeviceResource>,
    ref_count: u32,
}

/// The registry, reference-counting and deferred-release authority for all GPU
/// resources of a device.
///
/// Reference counts are plain integers guarded by the manager's own `&mut`
/// receivers; the manager is owned by its device and mutated from one thread.
/// `enqueue_release_resource` is the one thread-safe entry point: it pushes onto a
/// channel that `release_resources` drains once the device is known idle, so a
/// resource still referenced by in-flight GPU commands is never destroyed early.
pub struct DeviceResourceManager {
    resources: SlotMap<ResourceKey, ResourceEntry>,
    release_tx: Sender<ResourceHandle>,
    release_rx: Receiver<ResourceHandle>,
}

impl Default for DeviceResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceResourceManager {
    pub fn new() -> Self {
        let (release_tx, release_rx) = crossbeam_channel::unbounded();
        DeviceResourceManager {
            resources: SlotMap::with_key(),
            release_tx,
            release_rx,
        }
    }

    /// Assigns a handle to the resource and inserts it into the registry with an
    /// initial reference count of one.
    pub fn register_resource(
        &mut self,
        resource: Arc<dyn DeviceResource>,
    ) -> ResourceHandle {
        let kind = resource.resource_kind();
        let key = self.resources.insert(ResourceEntry {
            resource: resource.clone(),
            ref_count: 1,
        });

        let handle = ResourceHandle(key);
        resource.resource_state().set_handle(handle);
        log::trace!("registered {:?} as {:?}", kind, handle);
        handle
    }

    /// Resolves a handle to a resource of concrete type `T`.
    ///
    /// Returns `None` for an invalidated or unknown handle. The downcast is not
    /// checked by the handle itself; asking for the wrong concrete type is a logic
    /// error guarded by a debug assertion and reported as `None` in release builds.
    pub fn get_resource<T: DeviceResource>(
        &self,
        handle: ResourceHandle,
    ) -> Option<Arc<T>> {
        let entry = self.resources.get(handle.key())?;
        let resource = entry.resource.clone();
        match resource.downcast_arc::<T>() {
            Ok(resource) => Some(resource),
            Err(_) => {
                debug_assert!(
                    false,
                    "handle {:?} resolved to a {:?}, not the requested type",
                    handle,
                    entry.resource.resource_kind()
                );
                None
            }
        }
    }

    /// Resolves a handle without downcasting.
    pub fn get_resource_untyped(
        &self,
        handle: ResourceHandle,
    ) -> Option<Arc<dyn DeviceResource>> {
        self.resources
            .get(handle.key())
            .map(|entry| entry.resource.clone())
    }

    pub fn contains(
        &self,
        handle: ResourceHandle,
    ) -> bool {
        self.resources.contains_key(handle.key())
    }

    /// Returns the new reference count, or 0 for an unknown handle.
    pub fn increment_resource_ref(
        &mut self,
        handle: ResourceHandle,
    ) -> u32 {
        match self.resources.get_mut(handle.key()) {
            Some(entry) => {
                entry.ref_count += 1;
                entry.ref_count
            }
            None => {
                debug_assert!(false, "increment_resource_ref on unknown {:?}", handle);
                0
            }
        }
    }

    /// Returns the new reference count, or 0 for an unknown handle. Decrementing to
    /// zero does not destroy the resource; destruction happens when the deferred
    /// release queue is flushed. The count never goes below zero.
    pub fn decrement_resource_ref(
        &mut self,
        handle: ResourceHandle,
    ) -> u32 {
        match self.resources.get_mut(handle.key()) {
            Some(entry) => {
                entry.ref_count = entry.ref_count.saturating_sub(1);
                entry.ref_count
            }
            None => 0,
        }
    }

    pub fn resource_ref_count(
        &self,
        handle: ResourceHandle,
    ) -> u32 {
        self.resources
            .get(handle.key())
            .map(|entry| entry.ref_count)
            .unwrap_or(0)
    }

    /// Queues the resource for release at the next `release_resources` flush. Safe to
    /// call from any thread. Queueing an unknown or already-released handle is
    /// harmless; the flush skips it.
    pub fn enqueue_release_resource(
        &self,
        handle: ResourceHandle,
    ) {
        // Not a problem if the manager is being torn down concurrently
        let _ = self.release_tx.send(handle);
    }

    /// Drains the deferred release queue. For each queued handle the reference count
    /// is decremented; the resource is destroyed and unregistered only when the
    /// count reaches zero.
    ///
    /// Called once per `Device::wait_for_idle`, i.e. only when the GPU is known to
    /// have finished with the queued resources.
    pub fn release_resources(&mut self) {
        for handle in self.release_rx.try_iter().collect::<Vec<_>>() {
            let remaining = match self.resources.get_mut(handle.key()) {
                Some(entry) => {
                    entry.ref_count = entry.ref_count.saturating_sub(1);
                    entry.ref_count
                }
                None => continue,
            };

            if remaining == 0 {
                if let Some(entry) = self.resources.remove(handle.key()) {
                    log::trace!(
                        "releasing {:?} {:?}",
                        entry.resource.resource_kind(),
                        handle
                    );
                    entry.resource.release();
                    self.enqueue_referenced_resources(&*entry.resource);
                }
            }
        }
    }

    /// Gives back the references a composite resource holds on its parts. The parts
    /// land on the release queue and are destroyed at a later flush, once the device
    /// is idle again. Reference edges only point from composites to leaves, so this
    /// never cycles.
    fn enqueue_referenced_resources(
        &self,
        resource: &dyn DeviceResource,
    ) {
        if let Some(framebuffer) = resource.downcast_ref::<crate::Framebuffer>() {
            let description = framebuffer.description();
            for attachment in &description.color_targets {
                self.enqueue_release_resource(attachment.texture);
            }
            if let Some(depth) = &description.depth_target {
                self.enqueue_release_resource(depth.texture);
            }
        } else if let Some(resource_set) = resource.downcast_ref::<crate::ResourceSet>() {
            let description = resource_set.description();
            self.enqueue_release_resource(description.layout);
            for bound in &description.resources {
                self.enqueue_release_resource(*bound);
            }
        } else if let Some(pipeline) = resource.downcast_ref::<crate::GraphicsPipeline>() {
            let description = pipeline.description();
            for shader in &description.shaders {
                self.enqueue_release_resource(*shader);
            }
            for layout in &description.resource_layouts {
                self.enqueue_release_resource(*layout);
            }
        } else if let Some(pipeline) = resource.downcast_ref::<crate::ComputePipeline>() {
            let description = pipeline.description();
            self.enqueue_release_resource(description.shader);
            for layout in &description.resource_layouts {
                self.enqueue_release_resource(*layout);
            }
        } else if let Some(swapchain) = resource.downcast_ref::<crate::Swapchain>() {
            self.enqueue_release_resource(swapchain.back_buffer());
            self.enqueue_release_resource(swapchain.back_buffer_texture());
            self.enqueue_release_resource(swapchain.depth_texture());
        }
    }

    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Releases everything still registered. Used at device teardown.
    pub fn clear(&mut self) {
        for (_, entry) in self.resources.drain() {
            entry.resource.release();
        }
    }
}
