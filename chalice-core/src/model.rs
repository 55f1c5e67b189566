//! The model presenter: turns the loaded chalice asset into a positioned scene node.

use std::rc::Rc;

use glam::Vec3;

use crate::{
    asset::{AssetError, ModelAsset},
    scene::{MeshRef, Node, NodeKind, Transform},
};

pub const CHALICE_GEOMETRY: &str = "dragon_chalice";
pub const CHALICE_MATERIAL: &str = "Obsidian";

/// The placement baked into the chalice mesh node.
pub const CHALICE_TRANSFORM: Transform = Transform {
    translation: Vec3::new(-12.624, 6.324, 0.933),
    rotation: Vec3::new(-1.555, 0.0, -std::f32::consts::PI),
    scale: Vec3::splat(0.009),
};

/// Attributes a caller passes through to the presented group node. The presenter does not
/// interpret them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeAttributes {
    pub name: Option<String>,
    pub transform: Option<Transform>,
}

/// Builds the chalice node: a group carrying `attrs`, holding the mesh at its fixed placement.
///
/// Fails if the asset lacks the chalice geometry or material.
pub fn present_chalice(asset: &Rc<ModelAsset>, attrs: NodeAttributes) -> Result<Node, AssetError> {
    asset.mesh(CHALICE_GEOMETRY)?;
    asset.material(CHALICE_MATERIAL)?;

    let mesh = Node::new(NodeKind::Mesh(MeshRef {
        asset: Rc::clone(asset),
        geometry: CHALICE_GEOMETRY.to_string(),
        material: CHALICE_MATERIAL.to_string(),
    }))
    .with_name(CHALICE_GEOMETRY)
    .with_transform(CHALICE_TRANSFORM);

    Ok(Node {
        name: attrs.name,
        transform: attrs.transform.unwrap_or(Transform::IDENTITY),
        kind: NodeKind::Group,
        children: vec![mesh],
    })
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, path::PathBuf};

    use super::*;
    use crate::asset::tests::TRIANGLE_GLTF;

    #[test]
    fn test_presents_fixed_placement() {
        let asset = Rc::new(
            ModelAsset::from_slice(std::path::Path::new("t.gltf"), TRIANGLE_GLTF.as_bytes())
                .unwrap(),
        );
        let node = present_chalice(&asset, NodeAttributes::default()).unwrap();

        assert!(matches!(node.kind, NodeKind::Group));
        assert_eq!(node.transform, Transform::IDENTITY);
        assert_eq!(node.children.len(), 1);
        let mesh = &node.children[0];
        assert_eq!(mesh.transform, CHALICE_TRANSFORM);
        match &mesh.kind {
            NodeKind::Mesh(m) => {
                assert_eq!(m.geometry, CHALICE_GEOMETRY);
                assert_eq!(m.material, CHALICE_MATERIAL);
                assert!(m.geometry().is_some());
            }
            _ => panic!("expected a mesh node"),
        }
    }

    #[test]
    fn test_passes_attributes_through() {
        let asset = Rc::new(
            ModelAsset::from_slice(std::path::Path::new("t.gltf"), TRIANGLE_GLTF.as_bytes())
                .unwrap(),
        );
        let attrs = NodeAttributes {
            name: Some("chalice".to_string()),
            transform: Some(Transform::from_translation(Vec3::Y)),
        };
        let node = present_chalice(&asset, attrs).unwrap();
        assert_eq!(node.name.as_deref(), Some("chalice"));
        assert_eq!(node.transform.translation, Vec3::Y);
    }

    #[test]
    fn test_missing_geometry_is_an_error() {
        let asset = Rc::new(ModelAsset {
            path: PathBuf::from("empty.glb"),
            meshes: HashMap::new(),
            materials: HashMap::new(),
        });
        assert!(matches!(
            present_chalice(&asset, NodeAttributes::default()),
            Err(AssetError::MissingMesh { .. })
        ));
    }
}
