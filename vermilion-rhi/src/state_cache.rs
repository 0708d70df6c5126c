use crate::{
    BlendStateDescription, DepthStencilStateDescription, InputLayoutDescription,
    RasterizerStateDescription,
};
use fnv::{FnvHashMap, FnvHasher};
use parking_lot::Mutex;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Hash of a state object description
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StateObjectHash(u64);

impl StateObjectHash {
    pub fn from_key<KeyT: Hash>(key: &KeyT) -> StateObjectHash {
        let mut hasher = FnvHasher::default();
        key.hash(&mut hasher);
        StateObjectHash(hasher.finish())
    }
}

/// A cache of immutable native state objects keyed by a hash of their description.
///
/// Entries are never evicted: the number of distinct state combinations is bounded
/// by content, not frame count. Requesting an entry with an equal key returns the
/// same `Arc` (pointer equality), so backends can compare states cheaply.
pub struct StateObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    entries: Mutex<FnvHashMap<StateObjectHash, Arc<V>>>,
    phantom: std::marker::PhantomData<K>,
}

impl<K, V> Default for StateObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        StateObjectCache {
            entries: Mutex::new(Default::default()),
            phantom: Default::default(),
        }
    }
}

impl<K, V> StateObjectCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get_or_create<F>(
        &self,
        key: &K,
        create_fn: F,
    ) -> Arc<V>
    where
        F: FnOnce(&K) -> V,
    {
        let hash = StateObjectHash::from_key(key);
        let mut entries = self.entries.lock();
        entries
            .entry(hash)
            .or_insert_with(|| Arc::new(create_fn(key)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable rasterizer state object. Keyed by description plus whether the owning
/// pipeline multisamples, since that toggles the native rasterizer setup on some
/// backends.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub description: RasterizerStateDescription,
    pub multisample_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlendState {
    pub description: BlendStateDescription,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub description: DepthStencilStateDescription,
}

/// Immutable input layout object. Layouts interact with vertex shader input
/// signatures on some backends, so the cache key includes the shader byte code hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputLayout {
    pub description: InputLayoutDescription,
    pub vertex_shader_hash: u64,
}

pub type RasterizerStateKey = (RasterizerStateDescription, bool);
pub type InputLayoutKey = (InputLayoutDescription, u64);

/// The per-device set of state object caches. Each backend owns one of these and
/// routes pipeline creation through it to avoid redundant native state objects.
#[derive(Default)]
pub struct StateObjectCaches {
    pub rasterizer: StateObjectCache<RasterizerStateKey, RasterizerState>,
    pub blend: StateObjectCache<BlendStateDescription, BlendState>,
    pub depth_stencil: StateObjectCache<DepthStencilStateDescription, DepthStencilState>,
    pub input_layout: StateObjectCache<InputLayoutKey, InputLayout>,
}

impl StateObjectCaches {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get_rasterizer_state(
        &self,
        description: &RasterizerStateDescription,
        multisample_enabled: bool,
    ) -> Arc<RasterizerState> {
        let key = (description.clone(), multisample_enabled);
        self.rasterizer.get_or_create(&key, |key| RasterizerState {
            description: key.0.clone(),
            multisample_enabled: key.1,
        })
    }

    pub fn get_blend_state(
        &self,
        description: &BlendStateDescription,
    ) -> Arc<BlendState> {
        self.blend.get_or_create(description, |key| BlendState {
            description: key.clone(),
        })
    }

    pub fn get_depth_stencil_state(
        &self,
        description: &DepthStencilStateDescription,
    ) -> Arc<DepthStencilState> {
        self.depth_stencil
            .get_or_create(description, |key| DepthStencilState {
                description: key.clone(),
            })
    }

    pub fn get_input_layout(
        &self,
        description: &InputLayoutDescription,
        vertex_shader_hash: u64,
    ) -> Arc<InputLayout> {
        let key = (description.clone(), vertex_shader_hash);
        self.input_layout.get_or_create(&key, |key| InputLayout {
            description: key.0.clone(),
            vertex_shader_hash: key.1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CullMode;

    #[test]
    fn equal_keys_return_the_same_entry() {
        let caches = StateObjectCaches::new();

        let description = RasterizerStateDescription {
            cull_mode: CullMode::Front,
            scissor_test_enabled: true,
            ..Default::default()
        };

        let first = caches.get_rasterizer_state(&description, true);
        let second = caches.get_rasterizer_state(&description.clone(), true);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(caches.rasterizer.len(), 1);
    }

    #[test]
    fn multisample_flag_is_part_of_the_key() {
        let caches = StateObjectCaches::new();
        let description = RasterizerStateDescription::default();

        let without = caches.get_rasterizer_state(&description, false);
        let with = caches.get_rasterizer_state(&description, true);
        assert!(!Arc::ptr_eq(&without, &with));
        assert_eq!(caches.rasterizer.len(), 2);
    }

    #[test]
    fn input_layouts_key_on_shader_byte_code() {
        let caches = StateObjectCaches::new();
        let description = InputLayoutDescription::default();

        let a = caches.get_input_layout(&description, 0x1111);
        let b = caches.get_input_layout(&description, 0x2222);
        let c = caches.get_input_layout(&description, 0x1111);
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn entries_are_never_evicted() {
        let caches = StateObjectCaches::new();
        for i in 0..16 {
            let description = DepthStencilStateDescription {
                stencil_read_mask: i as u8,
                ..Default::default()
            };
            caches.get_depth_stencil_state(&description);
        }
        assert_eq!(caches.depth_stencil.len(), 16);
    }
}
