//! Model asset loading.
//!
//! [`AssetLoader`] decodes glTF/GLB model files into [`ModelAsset`]s and caches them per path, so
//! repeated requests share one decoded asset. Raw bytes come from an [`AssetSource`]; the
//! filesystem is the default source.

use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
    rc::Rc,
};

use glam::{Vec3, Vec4};

/// The model shipped with the viewer.
pub const DEFAULT_MODEL_PATH: &str = "assets/chalice-transformed.glb";

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to read asset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode glTF asset {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },

    #[error("Mesh {mesh} has no {attribute} data")]
    MissingAttribute {
        mesh: String,
        attribute: &'static str,
    },

    #[error("Asset {path} has no mesh named {name}")]
    MissingMesh { path: PathBuf, name: String },

    #[error("Asset {path} has no material named {name}")]
    MissingMaterial { path: PathBuf, name: String },
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Aabb { min: first, max: first }, |acc, p| acc.including(p)))
    }

    pub fn including(self, p: Vec3) -> Self {
        Aabb {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    pub fn union(self, other: Aabb) -> Self {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }
}

/// Triangle geometry of one named mesh, with all primitives merged.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

/// PBR factors of one named material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: Vec4,
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: Vec3,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: Vec4::ONE,
            metallic: 1.0,
            roughness: 1.0,
            emissive: Vec3::ZERO,
        }
    }
}

/// A decoded model file. Immutable once loaded.
#[derive(Debug)]
pub struct ModelAsset {
    pub path: PathBuf,
    pub meshes: HashMap<String, MeshData>,
    pub materials: HashMap<String, MaterialData>,
}

impl ModelAsset {
    /// Decodes a GLB file or a glTF file with embedded buffers.
    pub fn from_slice(path: &Path, bytes: &[u8]) -> Result<Self, AssetError> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).map_err(|source| AssetError::Gltf {
                path: path.to_path_buf(),
                source,
            })?;

        let mut materials = HashMap::new();
        for material in document.materials() {
            let Some(name) = material.name() else {
                continue;
            };
            let pbr = material.pbr_metallic_roughness();
            materials.insert(
                name.to_string(),
                MaterialData {
                    name: name.to_string(),
                    base_color: Vec4::from(pbr.base_color_factor()),
                    metallic: pbr.metallic_factor(),
                    roughness: pbr.roughness_factor(),
                    emissive: Vec3::from(material.emissive_factor()),
                },
            );
        }

        let mut meshes = HashMap::new();
        for mesh in document.meshes() {
            let name = mesh
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
            if meshes.contains_key(&name) {
                log::warn!("Duplicate mesh name {} in {}", name, path.display());
                continue;
            }
            let data = read_mesh(&name, &mesh, &buffers)?;
            meshes.insert(name, data);
        }

        Ok(Self {
            path: path.to_path_buf(),
            meshes,
            materials,
        })
    }

    pub fn mesh(&self, name: &str) -> Result<&MeshData, AssetError> {
        self.meshes.get(name).ok_or_else(|| AssetError::MissingMesh {
            path: self.path.clone(),
            name: name.to_string(),
        })
    }

    pub fn material(&self, name: &str) -> Result<&MaterialData, AssetError> {
        self.materials
            .get(name)
            .ok_or_else(|| AssetError::MissingMaterial {
                path: self.path.clone(),
                name: name.to_string(),
            })
    }
}

fn read_mesh(
    name: &str,
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData, AssetError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| &d.0[..]));
        let base = positions.len() as u32;

        let prim_positions: Vec<Vec3> = reader
            .read_positions()
            .ok_or_else(|| AssetError::MissingAttribute {
                mesh: name.to_string(),
                attribute: "POSITION",
            })?
            .map(Vec3::from)
            .collect();

        let prim_indices: Vec<u32> = match reader.read_indices() {
            Some(read) => read.into_u32().map(|i| base + i).collect(),
            None => (base..base + prim_positions.len() as u32).collect(),
        };

        let prim_normals: Vec<Vec3> = match reader.read_normals() {
            Some(read) => read.map(Vec3::from).collect(),
            None => {
                let local: Vec<u32> = prim_indices.iter().map(|i| i - base).collect();
                compute_normals(&prim_positions, &local)
            }
        };

        positions.extend(prim_positions);
        normals.extend(prim_normals);
        indices.extend(prim_indices);
    }

    let bounds = Aabb::from_points(positions.iter().copied()).ok_or_else(|| {
        AssetError::MissingAttribute {
            mesh: name.to_string(),
            attribute: "POSITION",
        }
    })?;

    Ok(MeshData {
        name: name.to_string(),
        positions,
        normals,
        indices,
        bounds,
    })
}

/// Area-weighted smooth normals for meshes that ship without them.
fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

/// Where asset bytes come from.
pub trait AssetSource {
    fn fetch(&self, path: &Path) -> Result<Vec<u8>, AssetError>;
}

/// Reads assets from the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct FsSource {
    pub root: Option<PathBuf>,
}

impl AssetSource for FsSource {
    fn fetch(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        let full = match &self.root {
            Some(root) => root.join(path),
            None => path.to_path_buf(),
        };
        std::fs::read(&full).map_err(|source| AssetError::Io { path: full, source })
    }
}

/// Loads and caches [`ModelAsset`]s.
///
/// Successful loads are cached for the lifetime of the loader. Failures are returned to the
/// caller and not cached, so asking again fetches again.
pub struct AssetLoader<S: AssetSource = FsSource> {
    source: S,
    cache: RefCell<HashMap<PathBuf, Rc<ModelAsset>>>,
}

impl Default for AssetLoader<FsSource> {
    fn default() -> Self {
        Self::new(FsSource::default())
    }
}

impl<S: AssetSource> AssetLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the cached asset for `path`, fetching and decoding it on first use.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Rc<ModelAsset>, AssetError> {
        let path = path.as_ref();
        if let Some(asset) = self.cache.borrow().get(path) {
            return Ok(Rc::clone(asset));
        }

        let bytes = self.source.fetch(path)?;
        let asset = Rc::new(ModelAsset::from_slice(path, &bytes)?);
        log::info!(
            "Loaded {}: {} meshes, {} materials",
            path.display(),
            asset.meshes.len(),
            asset.materials.len()
        );
        self.cache
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&asset));
        Ok(asset)
    }

    /// Loads `path` ahead of the first frame. The outcome is logged; a later [`load`] returns the
    /// cached asset or retries after a failure.
    ///
    /// [`load`]: AssetLoader::load
    pub fn preload(&self, path: impl AsRef<Path>) -> bool {
        match self.load(path.as_ref()) {
            Ok(_) => true,
            Err(err) => {
                log::warn!("Preload of {} failed: {}", path.as_ref().display(), err);
                false
            }
        }
    }

    pub fn is_cached(&self, path: impl AsRef<Path>) -> bool {
        self.cache.borrow().contains_key(path.as_ref())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use super::*;

    /// One triangle named `dragon_chalice` using the `Obsidian` material, buffers embedded.
    pub(crate) const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "materials": [{
            "name": "Obsidian",
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.05, 0.05, 0.06, 1.0],
                "metallicFactor": 0.8,
                "roughnessFactor": 0.15
            }
        }],
        "meshes": [{
            "name": "dragon_chalice",
            "primitives": [{
                "attributes": { "POSITION": 0, "NORMAL": 1 },
                "indices": 2,
                "material": 0
            }]
        }],
        "buffers": [{
            "byteLength": 80,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 72, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;

    /// Serves the triangle fixture and counts fetches. The first `failures` fetches fail.
    pub(crate) struct CountingSource {
        pub fetches: Cell<usize>,
        pub failures: Cell<usize>,
    }

    impl CountingSource {
        pub(crate) fn new() -> Self {
            Self {
                fetches: Cell::new(0),
                failures: Cell::new(0),
            }
        }
    }

    impl AssetSource for CountingSource {
        fn fetch(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(AssetError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "unavailable"),
                });
            }
            Ok(TRIANGLE_GLTF.as_bytes().to_vec())
        }
    }

    #[test]
    fn test_decodes_named_mesh_and_material() {
        let asset =
            ModelAsset::from_slice(Path::new("triangle.gltf"), TRIANGLE_GLTF.as_bytes()).unwrap();

        let mesh = asset.mesh("dragon_chalice").unwrap();
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.bounds.min, Vec3::ZERO);
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 1.0, 0.0));

        let material = asset.material("Obsidian").unwrap();
        assert!((material.metallic - 0.8).abs() < 1e-6);
        assert!((material.roughness - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_missing_names_are_errors() {
        let asset =
            ModelAsset::from_slice(Path::new("triangle.gltf"), TRIANGLE_GLTF.as_bytes()).unwrap();
        assert!(matches!(
            asset.mesh("teapot"),
            Err(AssetError::MissingMesh { .. })
        ));
        assert!(matches!(
            asset.material("Gold"),
            Err(AssetError::MissingMaterial { .. })
        ));
    }

    #[test]
    fn test_repeated_loads_share_one_fetch() {
        let loader = AssetLoader::new(CountingSource::new());
        let a = loader.load("chalice.glb").unwrap();
        let b = loader.load("chalice.glb").unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(loader.source().fetches.get(), 1);
    }

    #[test]
    fn test_nonexistent_path_is_surfaced() {
        let loader = AssetLoader::<FsSource>::default();
        let result = loader.load("does/not/exist/chalice-transformed.glb");
        assert!(matches!(result, Err(AssetError::Io { .. })));
        assert!(!loader.is_cached("does/not/exist/chalice-transformed.glb"));
    }

    #[test]
    fn test_failures_are_not_cached() {
        let source = CountingSource::new();
        source.failures.set(1);
        let loader = AssetLoader::new(source);

        assert!(!loader.preload("chalice.glb"));
        assert!(loader.load("chalice.glb").is_ok());
        assert_eq!(loader.source().fetches.get(), 2);
    }

    #[test]
    fn test_corrupt_bytes_fail_to_decode() {
        let result = ModelAsset::from_slice(Path::new("bad.glb"), b"glTF\x02\x00garbage");
        assert!(matches!(result, Err(AssetError::Gltf { .. })));
    }

    #[test]
    fn test_generated_normals_face_out_of_triangle() {
        let positions = [Vec3::ZERO, Vec3::X, Vec3::Y];
        let normals = compute_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals, vec![Vec3::Z; 3]);
    }
}
