use crate::{MapAccess, ResourceKind};
use downcast_rs::{impl_downcast, DowncastSync};
use parking_lot::Mutex;
use slotmap::Key;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

slotmap::new_key_type! {
    /// Key into the device resource registry. Index/generation pair, so a slot can be
    /// reused without stale handles resolving to the new occupant.
    pub struct ResourceKey;
}

/// An opaque identifier referencing a GPU resource through a `DeviceResourceManager`.
///
/// Handles are plain values and carry no ownership; the resource manager owns the
/// resource lifetime. A default-constructed handle is invalidated and never resolves.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ResourceHandle(pub(crate) ResourceKey);

impl ResourceHandle {
    pub fn invalid() -> Self {
        Default::default()
    }

    pub fn is_invalidated(&self) -> bool {
        self.0.is_null()
    }

    pub(crate) fn key(&self) -> ResourceKey {
        self.0
    }

    fn as_ffi(&self) -> u64 {
        self.0.data().as_ffi()
    }

    fn from_ffi(value: u64) -> Self {
        ResourceHandle(ResourceKey::from(slotmap::KeyData::from_ffi(value)))
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        if self.is_invalidated() {
            write!(f, "ResourceHandle(invalid)")
        } else {
            write!(f, "ResourceHandle({:?})", self.0)
        }
    }
}

/// Bookkeeping shared by every device resource: the assigned handle, the released
/// flag and an optional debug name. Concrete resources embed one of these and hand it
/// out through `DeviceResource::resource_state`.
pub struct DeviceResourceState {
    kind: ResourceKind,
    handle: AtomicU64,
    released: AtomicBool,
    debug_name: Mutex<Option<String>>,
}

impl DeviceResourceState {
    pub fn new(kind: ResourceKind) -> Self {
        DeviceResourceState {
            kind,
            handle: AtomicU64::new(ResourceHandle::invalid().as_ffi()),
            released: AtomicBool::new(false),
            debug_name: Mutex::new(None),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn handle(&self) -> ResourceHandle {
        ResourceHandle::from_ffi(self.handle.load(Ordering::Acquire))
    }

    pub(crate) fn set_handle(
        &self,
        handle: ResourceHandle,
    ) {
        self.handle.store(handle.as_ffi(), Ordering::Release);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    fn mark_released(&self) -> bool {
        !self.released.swap(true, Ordering::AcqRel)
    }

    pub fn debug_name(&self) -> Option<String> {
        self.debug_name.lock().clone()
    }

    pub fn set_debug_name(
        &self,
        name: &str,
    ) {
        *self.debug_name.lock() = Some(name.to_string());
    }
}

/// Contract for any GPU-backed object (buffer, texture, pipeline, fence, ...).
///
/// Resources are created through the device's resource factory, registered with the
/// resource manager (which assigns the handle) and destroyed when the manager's
/// deferred release queue drives their reference count to zero.
pub trait DeviceResource: DowncastSync {
    fn resource_state(&self) -> &DeviceResourceState;

    /// Backend-side teardown. Invoked exactly once by `release`.
    fn destroy(&self) {}

    fn resource_kind(&self) -> ResourceKind {
        self.resource_state().kind()
    }

    fn handle(&self) -> ResourceHandle {
        self.resource_state().handle()
    }

    fn debug_name(&self) -> Option<String> {
        self.resource_state().debug_name()
    }

    fn set_debug_name(
        &self,
        name: &str,
    ) {
        self.resource_state().set_debug_name(name);
    }

    fn is_released(&self) -> bool {
        self.resource_state().is_released()
    }

    /// Tears the resource down. Releasing an already-released resource is a no-op.
    fn release(&self) {
        if self.resource_state().mark_released() {
            self.destroy();
        }
    }
}

impl_downcast!(sync DeviceResource);

/// A transient view over a mapped buffer or texture subresource.
///
/// In release builds the device returns a cached invalid instance when a map request
/// violates the usage contract; callers on hot paths are expected to check
/// `is_valid` rather than rely on the debug-only assertions.
#[derive(Debug)]
pub struct MappedResource {
    data: *mut u8,
    size: u64,
    row_pitch: u32,
    depth_pitch: u32,
    subresource: u32,
    access: MapAccess,
    valid: bool,
}

// The pointer is only dereferenced by the owner of the mapping, and the device
// contract (map/unmap pairing, idle waits) serializes access to the memory behind it.
unsafe impl Send for MappedResource {}
unsafe impl Sync for MappedResource {}

impl MappedResource {
    pub fn new(
        data: *mut u8,
        size: u64,
        row_pitch: u32,
        depth_pitch: u32,
        subresource: u32,
        access: MapAccess,
    ) -> Self {
        MappedResource {
            data,
            size,
            row_pitch,
            depth_pitch,
            subresource,
            access,
            valid: true,
        }
    }

    pub fn invalid() -> Self {
        MappedResource {
            data: std::ptr::null_mut(),
            size: 0,
            row_pitch: 0,
            depth_pitch: 0,
            subresource: 0,
            access: MapAccess::Read,
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn data_ptr(&self) -> *mut u8 {
        self.data
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn row_pitch(&self) -> u32 {
        self.row_pitch
    }

    pub fn depth_pitch(&self) -> u32 {
        self.depth_pitch
    }

    pub fn subresource(&self) -> u32 {
        self.subresource
    }

    pub fn access(&self) -> MapAccess {
        self.access
    }

    /// Copies `data` into the mapping at `offset`. Returns false (and copies nothing)
    /// if the mapping is invalid, read-only or the range is out of bounds.
    pub fn write(
        &self,
        offset: u64,
        data: &[u8],
    ) -> bool {
        if !self.valid || self.access == MapAccess::Read {
            return false;
        }
        if offset + data.len() as u64 > self.size {
            return false;
        }

        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                self.data.add(offset as usize),
                data.len(),
            );
        }
        true
    }

    /// Copies out of the mapping at `offset` into `out`. Returns false (and copies
    /// nothing) if the mapping is invalid, write-only or the range is out of bounds.
    pub fn read(
        &self,
        offset: u64,
        out: &mut [u8],
    ) -> bool {
        if !self.valid || self.access == MapAccess::Write {
            return false;
        }
        if offset + out.len() as u64 > self.size {
            return false;
        }

        unsafe {
            std::ptr::copy_nonoverlapping(
                self.data.add(offset as usize),
                out.as_mut_ptr(),
                out.len(),
            );
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_handle_is_invalidated() {
        let handle = ResourceHandle::default();
        assert!(handle.is_invalidated());
        assert_eq!(handle, ResourceHandle::invalid());
    }

    #[test]
    fn handle_ffi_roundtrip() {
        let handle = ResourceHandle::invalid();
        assert_eq!(ResourceHandle::from_ffi(handle.as_ffi()), handle);
    }

    #[test]
    fn invalid_mapped_resource_rejects_io() {
        let mapped = MappedResource::invalid();
        assert!(!mapped.is_valid());
        assert!(!mapped.write(0, &[1, 2, 3]));
        let mut out = [0u8; 2];
        assert!(!mapped.read(0, &mut out));
    }

    #[test]
    fn mapped_resource_bounds_are_enforced() {
        let mut storage = [0u8; 8];
        let mapped = MappedResource::new(
            storage.as_mut_ptr(),
            8,
            8,
            8,
            0,
            MapAccess::ReadWrite,
        );

        assert!(mapped.write(4, &[7, 7, 7, 7]));
        assert!(!mapped.write(5, &[0; 4]));

        let mut out = [0u8; 4];
        assert!(mapped.read(4, &mut out));
        assert_eq!(out, [7, 7, 7, 7]);
        assert!(!mapped.read(8, &mut out));
    }
}
