//! Scene-graph types and the scene composer.
//!
//! [`compose_scene`] builds the whole frame description from the current parameters and
//! viewport. The graph is rebuilt whenever either changes; it is cheap and holds no GPU
//! resources, only references to the loaded model asset.

use std::rc::Rc;

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::{
    Color,
    anim::FloatAnimation,
    asset::{Aabb, MaterialData, MeshData, ModelAsset},
    controls::SceneParameters,
    postprocess::PostProcessStage,
    viewport::ViewportState,
};

/// Vertical offset of the root group.
pub const ROOT_OFFSET: Vec3 = Vec3::new(0.0, -0.5, 0.0);
/// Where the centered model sits inside the float wrapper.
pub const CENTER_POSITION: Vec3 = Vec3::new(0.0, 0.8, 0.0);
/// Tilt of the centered model, XYZ euler angles in radians.
pub const CENTER_ROTATION: Vec3 = Vec3::new(0.0, -std::f32::consts::PI / 3.5, -0.4);

/// A translation, XYZ euler rotation and scale, composed as `T * R * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale,
            Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z),
            self.translation,
        )
    }
}

/// A perspective camera. The field of view is vertical, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, -1.0, 4.0),
            fov: 65.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect.max(1e-4), self.near, self.far)
    }
}

/// Binds orbit interaction to the scene camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitBinding {
    pub target: Vec3,
}

/// Image-based lighting: a studio gradient plus a tinted highlight strip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentLight {
    pub intensity: f32,
    pub highlight: Color,
}

/// A reference to one geometry and one material of a loaded asset.
#[derive(Debug, Clone)]
pub struct MeshRef {
    pub asset: Rc<ModelAsset>,
    pub geometry: String,
    pub material: String,
}

impl MeshRef {
    /// Returns the referenced geometry. Names are checked when the reference is created.
    pub fn geometry(&self) -> Option<&MeshData> {
        self.asset.meshes.get(&self.geometry)
    }

    pub fn material(&self) -> Option<&MaterialData> {
        self.asset.materials.get(&self.material)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Group,
    /// Applies a [`FloatAnimation`] pose on top of the node transform.
    Float(FloatAnimation),
    /// Shifts the children so their bounding box is centered on the node origin.
    Center { offset: Vec3 },
    Mesh(MeshRef),
    Camera(PerspectiveCamera),
    OrbitControls(OrbitBinding),
    Environment(EnvironmentLight),
    PostProcessing(PostProcessStage),
}

/// A node of the scene graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: NodeKind,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            transform: Transform::IDENTITY,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(NodeKind::Group)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Local matrix of this node at `time` seconds.
    pub fn local_matrix(&self, time: f32) -> Mat4 {
        let base = self.transform.to_mat4();
        match &self.kind {
            NodeKind::Float(anim) => base * anim.pose(time).to_mat4(),
            NodeKind::Center { offset } => base * Mat4::from_translation(*offset),
            _ => base,
        }
    }

    /// Bounding box of the node's content in its parent's space, at rest.
    pub fn bounds(&self) -> Option<Aabb> {
        let local = self.content_bounds()?;
        let m = self.local_matrix(0.0);
        Aabb::from_points(local.corners().map(|c| m.transform_point3(c)))
    }

    /// Bounding box of the node's own geometry and children, in the node's space.
    fn content_bounds(&self) -> Option<Aabb> {
        let own = match &self.kind {
            NodeKind::Mesh(mesh) => mesh.geometry().map(|g| g.bounds),
            _ => None,
        };
        self.children
            .iter()
            .filter_map(Node::bounds)
            .fold(own, |acc, b| Some(acc.map_or(b, |a| a.union(b))))
    }

    /// Depth-first iterator over this node and all descendants.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// A mesh to draw with its world transform.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub world: Mat4,
    pub mesh: MeshRef,
}

/// The composed scene for one state of parameters and viewport.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub root: Node,
}

impl SceneGraph {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.root.iter()
    }

    pub fn count(&self, pred: impl Fn(&NodeKind) -> bool) -> usize {
        self.nodes().filter(|n| pred(&n.kind)).count()
    }

    pub fn camera(&self) -> Option<PerspectiveCamera> {
        self.nodes().find_map(|n| match n.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        })
    }

    pub fn orbit(&self) -> Option<OrbitBinding> {
        self.nodes().find_map(|n| match n.kind {
            NodeKind::OrbitControls(binding) => Some(binding),
            _ => None,
        })
    }

    pub fn environment(&self) -> Option<EnvironmentLight> {
        self.nodes().find_map(|n| match n.kind {
            NodeKind::Environment(env) => Some(env),
            _ => None,
        })
    }

    pub fn post_processing(&self) -> Option<PostProcessStage> {
        self.nodes().find_map(|n| match n.kind {
            NodeKind::PostProcessing(stage) => Some(stage),
            _ => None,
        })
    }

    /// Flattens the graph into mesh draws at `time` seconds. Parent transforms apply before
    /// their children's.
    pub fn draw_list(&self, time: f32) -> Vec<DrawItem> {
        fn visit(node: &Node, parent: Mat4, time: f32, out: &mut Vec<DrawItem>) {
            let world = parent * node.local_matrix(time);
            if let NodeKind::Mesh(mesh) = &node.kind {
                out.push(DrawItem {
                    world,
                    mesh: mesh.clone(),
                });
            }
            for child in &node.children {
                visit(child, world, time, out);
            }
        }

        let mut out = Vec::new();
        visit(&self.root, Mat4::IDENTITY, time, &mut out);
        out
    }
}

/// Wraps `content` so its bounding box center lands on the wrapper origin.
pub fn centered(content: Node, transform: Transform) -> Node {
    let offset = content.bounds().map(|b| -b.center()).unwrap_or(Vec3::ZERO);
    Node::new(NodeKind::Center { offset })
        .with_transform(transform)
        .with_child(content)
}

/// Builds the scene for the given state.
///
/// `model` is the presented model node, or `None` while the asset is unavailable; the rest of
/// the scene is built either way.
pub fn compose_scene(
    params: &SceneParameters,
    viewport: &ViewportState,
    model: Option<Node>,
    float: FloatAnimation,
) -> SceneGraph {
    let scale = viewport.model_scale();
    let center_transform = Transform {
        translation: CENTER_POSITION,
        rotation: CENTER_ROTATION,
        scale: Vec3::splat(scale),
    };

    let mut float_node = Node::new(NodeKind::Float(float)).with_name("float");
    if let Some(model) = model {
        float_node = float_node.with_child(centered(model, center_transform).with_name("center"));
    }

    let content = Node::group()
        .with_name("content")
        .with_transform(Transform::from_translation(ROOT_OFFSET))
        .with_child(float_node);

    let root = Node::group()
        .with_name("scene")
        .with_child(content)
        .with_child(Node::new(NodeKind::Camera(PerspectiveCamera::default())).with_name("camera"))
        .with_child(
            Node::new(NodeKind::OrbitControls(OrbitBinding { target: Vec3::ZERO }))
                .with_name("orbit"),
        )
        .with_child(
            Node::new(NodeKind::Environment(EnvironmentLight {
                intensity: params.environment_intensity,
                highlight: params.highlight,
            }))
            .with_name("environment"),
        )
        .with_child(
            Node::new(NodeKind::PostProcessing(PostProcessStage::default()))
                .with_name("effects"),
        );

    SceneGraph { root }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{
        asset::tests::TRIANGLE_GLTF,
        model::{NodeAttributes, present_chalice},
        viewport::ViewportTier,
    };

    fn triangle_asset() -> Rc<ModelAsset> {
        Rc::new(ModelAsset::from_slice(Path::new("triangle.gltf"), TRIANGLE_GLTF.as_bytes()).unwrap())
    }

    fn mesh_node(asset: &Rc<ModelAsset>) -> Node {
        Node::new(NodeKind::Mesh(MeshRef {
            asset: Rc::clone(asset),
            geometry: "dragon_chalice".to_string(),
            material: "Obsidian".to_string(),
        }))
    }

    #[test]
    fn test_scene_contains_each_part_once() {
        let asset = triangle_asset();
        let model = present_chalice(&asset, NodeAttributes::default()).unwrap();
        let scene = compose_scene(
            &SceneParameters::default(),
            &ViewportState::default(),
            Some(model),
            FloatAnimation::chalice(),
        );

        assert_eq!(scene.count(|k| matches!(k, NodeKind::Mesh(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Camera(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::OrbitControls(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Environment(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::PostProcessing(_))), 1);

        let camera = scene.camera().unwrap();
        assert_eq!(camera.position, Vec3::new(0.0, -1.0, 4.0));
        assert_eq!(camera.fov, 65.0);
    }

    #[test]
    fn test_environment_follows_parameters() {
        let params = SceneParameters {
            environment_intensity: 3.2,
            highlight: Color::new(1, 2, 3),
            ..SceneParameters::default()
        };
        let scene = compose_scene(&params, &ViewportState::default(), None, FloatAnimation::chalice());
        let env = scene.environment().unwrap();
        assert_eq!(env.intensity, 3.2);
        assert_eq!(env.highlight, Color::new(1, 2, 3));
    }

    #[test]
    fn test_missing_model_leaves_rest_of_scene() {
        let scene = compose_scene(
            &SceneParameters::default(),
            &ViewportState::default(),
            None,
            FloatAnimation::chalice(),
        );
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Mesh(_))), 0);
        assert!(scene.draw_list(0.0).is_empty());
        assert!(scene.camera().is_some());
        assert!(scene.post_processing().is_some());
    }

    #[test]
    fn test_center_uses_viewport_scale() {
        let asset = triangle_asset();
        let compact = ViewportState {
            tier: ViewportTier::Compact,
        };
        let scene = compose_scene(
            &SceneParameters::default(),
            &compact,
            Some(mesh_node(&asset)),
            FloatAnimation::chalice(),
        );
        let center = scene
            .nodes()
            .find(|n| matches!(n.kind, NodeKind::Center { .. }))
            .unwrap();
        assert_eq!(center.transform.scale, Vec3::splat(2.4));
        assert_eq!(center.transform.translation, CENTER_POSITION);
    }

    #[test]
    fn test_centering_offsets_bounding_box() {
        let asset = triangle_asset();
        let node = centered(mesh_node(&asset), Transform::IDENTITY);
        match node.kind {
            NodeKind::Center { offset } => assert_eq!(offset, Vec3::new(-0.5, -0.5, 0.0)),
            _ => panic!("expected a center node"),
        }
        let bounds = node.bounds().unwrap();
        assert_eq!(bounds.center(), Vec3::ZERO);
    }

    #[test]
    fn test_draw_list_applies_outer_transforms_first() {
        let asset = triangle_asset();
        let inner = mesh_node(&asset).with_transform(Transform {
            scale: Vec3::splat(2.0),
            ..Transform::IDENTITY
        });
        let outer = Node::group()
            .with_transform(Transform::from_translation(Vec3::new(10.0, 0.0, 0.0)))
            .with_child(inner);
        let scene = SceneGraph { root: outer };

        let draws = scene.draw_list(0.0);
        assert_eq!(draws.len(), 1);
        // Scaled first, then translated.
        let p = draws[0].world.transform_point3(Vec3::X);
        assert!((p - Vec3::new(12.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_float_node_moves_over_time() {
        let asset = triangle_asset();
        let scene = compose_scene(
            &SceneParameters::default(),
            &ViewportState::default(),
            Some(mesh_node(&asset)),
            FloatAnimation::chalice(),
        );
        let a = scene.draw_list(0.0)[0].world;
        let b = scene.draw_list(1.0)[0].world;
        assert_ne!(a, b);
    }

    #[test]
    fn test_euler_order_matches_xyz() {
        let t = Transform {
            rotation: Vec3::new(std::f32::consts::FRAC_PI_2, 0.0, std::f32::consts::FRAC_PI_2),
            ..Transform::IDENTITY
        };
        // Rz first, then Rx: X -> Y -> Z.
        let p = t.to_mat4().transform_vector3(Vec3::X);
        assert!((p - Vec3::Z).length() < 1e-5);
    }
}
