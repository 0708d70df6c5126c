//! Versioned binary resource descriptors.
//!
//! Every descriptor stream leads with a `u32` version tag and one compression-mode
//! byte, followed by the (optionally compressed) bincode payload. Loaders reject
//! unknown version tags and unknown compression-mode bytes as hard failures —
//! guessing at either corrupts assets silently.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use vermilion_rhi::{IndexFormat, SamplerDescription, ShaderStages, VermilionError, VermilionResult};

/// Codec applied to a descriptor payload. The byte values are part of the on-disk
/// format and must never be reordered.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompressionMode {
    None,
    Zstd,
    BrotliG,
}

impl CompressionMode {
    pub fn to_byte(self) -> u8 {
        match self {
            CompressionMode::None => 0,
            CompressionMode::Zstd => 1,
            CompressionMode::BrotliG => 2,
        }
    }

    pub fn from_byte(byte: u8) -> Option<CompressionMode> {
        match byte {
            0 => Some(CompressionMode::None),
            1 => Some(CompressionMode::Zstd),
            2 => Some(CompressionMode::BrotliG),
            _ => None,
        }
    }
}

fn compress(
    payload: Vec<u8>,
    mode: CompressionMode,
) -> VermilionResult<Vec<u8>> {
    match mode {
        CompressionMode::None => Ok(payload),
        #[cfg(feature = "compression-zstd")]
        CompressionMode::Zstd => {
            zstd::bulk::compress(&payload, 0).map_err(VermilionError::from)
        }
        #[cfg(not(feature = "compression-zstd"))]
        CompressionMode::Zstd => Err(VermilionError::CompressionNotCompiledIn("zstd")),
        // GPU-decompressed brotli blobs are produced by the external cooker only
        CompressionMode::BrotliG => Err(VermilionError::CompressionNotCompiledIn("brotli-g")),
    }
}

fn decompress(
    payload: Vec<u8>,
    mode: CompressionMode,
) -> VermilionResult<Vec<u8>> {
    match mode {
        CompressionMode::None => Ok(payload),
        #[cfg(feature = "compression-zstd")]
        CompressionMode::Zstd => {
            zstd::stream::decode_all(payload.as_slice()).map_err(VermilionError::from)
        }
        #[cfg(not(feature = "compression-zstd"))]
        CompressionMode::Zstd => Err(VermilionError::CompressionNotCompiledIn("zstd")),
        CompressionMode::BrotliG => Err(VermilionError::CompressionNotCompiledIn("brotli-g")),
    }
}

fn save_descriptor<T: Serialize, W: Write>(
    value: &T,
    version: u32,
    compression: CompressionMode,
    writer: &mut W,
) -> VermilionResult<()> {
    let payload = bincode::serialize(value)
        .map_err(|error| VermilionError::StringError(error.to_string()))?;
    let payload = compress(payload, compression)?;

    writer.write_all(&version.to_le_bytes())?;
    writer.write_all(&[compression.to_byte()])?;
    writer.write_all(&(payload.len() as u64).to_le_bytes())?;
    writer.write_all(&payload)?;
    Ok(())
}

fn load_descriptor<T: DeserializeOwned, R: Read>(
    current_version: u32,
    reader: &mut R,
) -> VermilionResult<T> {
    let mut version_bytes = [0u8; 4];
    reader.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version > current_version {
        return Err(VermilionError::UnsupportedVersion(version));
    }

    let mut mode_byte = [0u8; 1];
    reader.read_exact(&mut mode_byte)?;
    let Some(mode) = CompressionMode::from_byte(mode_byte[0]) else {
        return Err(VermilionError::UnknownCompressionMode(mode_byte[0]));
    };

    let mut length_bytes = [0u8; 8];
    reader.read_exact(&mut length_bytes)?;
    let length = u64::from_le_bytes(length_bytes) as usize;

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;
    let payload = decompress(payload, mode)?;

    bincode::deserialize(&payload)
        .map_err(|error| VermilionError::StringError(error.to_string()))
}

/// A compiled shader stage as produced by the external shader compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderDescriptor {
    pub name: String,
    pub stage: ShaderStages,
    pub entry_point: String,
    pub byte_code: Vec<u8>,
}

impl ShaderDescriptor {
    pub const CURRENT_VERSION: u32 = 2;

    pub fn save<W: Write>(
        &self,
        writer: &mut W,
        compression: CompressionMode,
    ) -> VermilionResult<()> {
        save_descriptor(self, Self::CURRENT_VERSION, compression, writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> VermilionResult<Self> {
        load_descriptor(Self::CURRENT_VERSION, reader)
    }
}

/// A named sampler preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplerDescriptor {
    pub name: String,
    pub description: SamplerDescription,
}

impl SamplerDescriptor {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn save<W: Write>(
        &self,
        writer: &mut W,
        compression: CompressionMode,
    ) -> VermilionResult<()> {
        save_descriptor(self, Self::CURRENT_VERSION, compression, writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> VermilionResult<Self> {
        load_descriptor(Self::CURRENT_VERSION, reader)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MaterialParameterValue {
    Float(f32),
    Float4([f32; 4]),
    Int(i32),
    Bool(bool),
    TextureRef(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParameterDescriptor {
    pub name: String,
    pub value: MaterialParameterValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialDescriptor {
    pub name: String,
    pub shader_refs: Vec<String>,
    pub parameters: Vec<MaterialParameterDescriptor>,
    pub two_sided: bool,
}

impl MaterialDescriptor {
    pub const CURRENT_VERSION: u32 = 3;

    pub fn save<W: Write>(
        &self,
        writer: &mut W,
        compression: CompressionMode,
    ) -> VermilionResult<()> {
        save_descriptor(self, Self::CURRENT_VERSION, compression, writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> VermilionResult<Self> {
        load_descriptor(Self::CURRENT_VERSION, reader)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubMeshDescriptor {
    pub first_index: u32,
    pub index_count: u32,
    pub material_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshDescriptor {
    pub name: String,
    pub vertex_stride: u32,
    pub vertex_data: Vec<u8>,
    pub index_format: IndexFormat,
    pub index_data: Vec<u8>,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub sub_meshes: Vec<SubMeshDescriptor>,
}

impl MeshDescriptor {
    pub const CURRENT_VERSION: u32 = 4;

    pub fn save<W: Write>(
        &self,
        writer: &mut W,
        compression: CompressionMode,
    ) -> VermilionResult<()> {
        save_descriptor(self, Self::CURRENT_VERSION, compression, writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> VermilionResult<Self> {
        load_descriptor(Self::CURRENT_VERSION, reader)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDescriptor {
    pub name: String,
    /// -1 for the root
    pub parent_index: i32,
    pub inverse_bind_pose: [f32; 16],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonDescriptor {
    pub name: String,
    pub joints: Vec<JointDescriptor>,
}

impl SkeletonDescriptor {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn save<W: Write>(
        &self,
        writer: &mut W,
        compression: CompressionMode,
    ) -> VermilionResult<()> {
        save_descriptor(self, Self::CURRENT_VERSION, compression, writer)
    }

    pub fn load<R: Read>(reader: &mut R) -> VermilionResult<Self> {
        load_descriptor(Self::CURRENT_VERSION, reader)
    }
}

/// Outcome of a descriptor load once fallback substitution has been applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceLoadState {
    Loaded,
    /// The real resource could not be loaded; a fallback was substituted
    LoadedResourceMissing,
}

/// Runs a descriptor load, substituting `fallback` and logging the error when the
/// stream is missing or corrupt. Missing assets degrade, they do not abort the
/// frame.
pub fn load_or_fallback<T, R, F>(
    reader: &mut R,
    load: F,
    fallback: T,
) -> (T, ResourceLoadState)
where
    R: Read,
    F: FnOnce(&mut R) -> VermilionResult<T>,
{
    match load(reader) {
        Ok(value) => (value, ResourceLoadState::Loaded),
        Err(error) => {
            log::error!("descriptor load failed, substituting fallback: {}", error);
            (fallback, ResourceLoadState::LoadedResourceMissing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_material() -> MaterialDescriptor {
        MaterialDescriptor {
            name: "brushed_metal".to_string(),
            shader_refs: vec!["standard_vs".to_string(), "standard_ps".to_string()],
            parameters: vec![
                MaterialParameterDescriptor {
                    name: "roughness".to_string(),
                    value: MaterialParameterValue::Float(0.35),
                },
                MaterialParameterDescriptor {
                    name: "albedo_map".to_string(),
                    value: MaterialParameterValue::TextureRef("metal_albedo".to_string()),
                },
            ],
            two_sided: false,
        }
    }

    #[test]
    fn shader_descriptor_round_trips() {
        let descriptor = ShaderDescriptor {
            name: "standard_vs".to_string(),
            stage: ShaderStages::VERTEX,
            entry_point: "vs_main".to_string(),
            byte_code: (0..255).collect(),
        };

        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();
        let loaded = ShaderDescriptor::load(&mut Cursor::new(stream)).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn sampler_descriptor_round_trips() {
        let descriptor = SamplerDescriptor {
            name: "trilinear_wrap".to_string(),
            description: SamplerDescription::default(),
        };

        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();
        let loaded = SamplerDescriptor::load(&mut Cursor::new(stream)).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn material_descriptor_round_trips() {
        let descriptor = test_material();
        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();
        let loaded = MaterialDescriptor::load(&mut Cursor::new(stream)).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn mesh_descriptor_round_trips() {
        let descriptor = MeshDescriptor {
            name: "crate_01".to_string(),
            vertex_stride: 32,
            vertex_data: vec![1; 320],
            index_format: IndexFormat::Uint16,
            index_data: vec![2; 64],
            bounds_min: [-1.0, 0.0, -1.0],
            bounds_max: [1.0, 2.0, 1.0],
            sub_meshes: vec![SubMeshDescriptor {
                first_index: 0,
                index_count: 32,
                material_index: 0,
            }],
        };

        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();
        let loaded = MeshDescriptor::load(&mut Cursor::new(stream)).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn skeleton_descriptor_round_trips() {
        let descriptor = SkeletonDescriptor {
            name: "biped".to_string(),
            joints: vec![
                JointDescriptor {
                    name: "root".to_string(),
                    parent_index: -1,
                    inverse_bind_pose: [0.0; 16],
                },
                JointDescriptor {
                    name: "spine".to_string(),
                    parent_index: 0,
                    inverse_bind_pose: [1.0; 16],
                },
            ],
        };

        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();
        let loaded = SkeletonDescriptor::load(&mut Cursor::new(stream)).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[cfg(feature = "compression-zstd")]
    #[test]
    fn zstd_round_trips() {
        let descriptor = test_material();
        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::Zstd).unwrap();
        let loaded = MaterialDescriptor::load(&mut Cursor::new(stream)).unwrap();
        assert_eq!(loaded, descriptor);
    }

    #[test]
    fn unknown_compression_byte_is_a_hard_failure() {
        let descriptor = test_material();
        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();

        // Corrupt the compression-mode byte (offset 4, after the version tag)
        stream[4] = 9;
        match MaterialDescriptor::load(&mut Cursor::new(stream)) {
            Err(VermilionError::UnknownCompressionMode(9)) => {}
            other => panic!("expected an unknown compression mode error, got {:?}", other),
        }
    }

    #[test]
    fn future_versions_are_rejected() {
        let descriptor = test_material();
        let mut stream = Vec::new();
        descriptor.save(&mut stream, CompressionMode::None).unwrap();

        let future = (MaterialDescriptor::CURRENT_VERSION + 1).to_le_bytes();
        stream[..4].copy_from_slice(&future);
        match MaterialDescriptor::load(&mut Cursor::new(stream)) {
            Err(VermilionError::UnsupportedVersion(version)) => {
                assert_eq!(version, MaterialDescriptor::CURRENT_VERSION + 1);
            }
            other => panic!("expected an unsupported version error, got {:?}", other),
        }
    }

    #[cfg(not(feature = "compression-zstd"))]
    #[test]
    fn not_compiled_in_codecs_are_reported() {
        let descriptor = test_material();
        let mut stream = Vec::new();
        match descriptor.save(&mut stream, CompressionMode::Zstd) {
            Err(VermilionError::CompressionNotCompiledIn("zstd")) => {}
            other => panic!("expected a not-compiled-in error, got {:?}", other),
        }
    }

    #[test]
    fn failed_loads_substitute_the_fallback() {
        let fallback = test_material();
        let mut garbage = Cursor::new(vec![0xFFu8; 3]);

        let (loaded, state) = load_or_fallback(
            &mut garbage,
            |reader| MaterialDescriptor::load(reader),
            fallback.clone(),
        );
        assert_eq!(state, ResourceLoadState::LoadedResourceMissing);
        assert_eq!(loaded, fallback);
    }
}
