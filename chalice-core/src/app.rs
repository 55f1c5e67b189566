//! The root application state.
//!
//! [`ChaliceApp`] wires the control panel, responsive sizing, the model asset and the render
//! surface together. The window layer feeds it resize events and input, attaches the surface
//! once it exists, and asks for the current [`SceneGraph`] every frame. The scene is rebuilt only
//! after parameters or the viewport changed.

use std::{
    cell::{Cell, Ref, RefCell},
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    anim::FloatAnimation,
    asset::{AssetLoader, AssetSource, FsSource, ModelAsset},
    controls::ControlPanel,
    model::{NodeAttributes, present_chalice},
    observe::{Observable, Subscription},
    orbit::OrbitControls,
    scene::{PerspectiveCamera, SceneGraph, compose_scene},
    surface::{RenderSurface, SurfaceSlot},
    viewport::{ResizeEvents, ResponsiveSizing, ViewportState},
};

/// Where the model asset stands.
#[derive(Debug, Clone)]
pub enum ModelState {
    Pending,
    Ready(Rc<ModelAsset>),
    Failed(String),
}

pub struct ChaliceApp<S: RenderSurface + 'static, A: AssetSource = FsSource> {
    panel: ControlPanel,
    viewport: Observable<ViewportState>,
    resize_events: ResizeEvents,
    surface: Rc<RefCell<SurfaceSlot<S>>>,
    loader: AssetLoader<A>,
    model_path: PathBuf,
    model: ModelState,
    float: FloatAnimation,
    orbit: OrbitControls,
    scene: Option<SceneGraph>,
    dirty: Rc<Cell<bool>>,
    scene_builds: usize,
    state_subscriptions: Vec<Subscription>,
    resize_subscription: Option<Subscription>,
}

impl<S: RenderSurface + 'static, A: AssetSource> ChaliceApp<S, A> {
    pub fn new(loader: AssetLoader<A>, model_path: impl Into<PathBuf>) -> Self {
        let panel = ControlPanel::new();
        let viewport = Observable::new(ViewportState::default());
        let surface = Rc::new(RefCell::new(SurfaceSlot::new(panel.params().background)));
        let dirty = Rc::new(Cell::new(true));

        let mut state_subscriptions = Vec::new();

        let slot = Rc::clone(&surface);
        let mut last_background = panel.params().background;
        state_subscriptions.push(panel.subscribe(move |params| {
            if params.background != last_background {
                last_background = params.background;
                slot.borrow_mut().set_clear_color(params.background);
            }
        }));

        let params_dirty = Rc::clone(&dirty);
        state_subscriptions.push(panel.subscribe(move |_| params_dirty.set(true)));
        let viewport_dirty = Rc::clone(&dirty);
        state_subscriptions.push(viewport.subscribe(move |_| viewport_dirty.set(true)));

        let camera = PerspectiveCamera::default();

        Self {
            panel,
            viewport,
            resize_events: ResizeEvents::new(),
            surface,
            loader,
            model_path: model_path.into(),
            model: ModelState::Pending,
            float: FloatAnimation::chalice().with_random_offset(),
            orbit: OrbitControls::new(camera.position, glam::Vec3::ZERO),
            scene: None,
            dirty,
            scene_builds: 0,
            state_subscriptions,
            resize_subscription: None,
        }
    }

    /// Subscribes to resize events, sizes the model for `width` and loads the model asset.
    ///
    /// Mounting twice is a no-op.
    pub fn mount(&mut self, width: u32) {
        if self.resize_subscription.is_some() {
            log::warn!("Application is already mounted");
            return;
        }
        let sizing = ResponsiveSizing::new(self.viewport.clone());
        self.resize_subscription = Some(sizing.mount(width, &self.resize_events));
        self.load_model();
        self.dirty.set(true);
    }

    /// Releases the resize subscription. No resize callbacks fire afterwards, and a later
    /// [`mount`](Self::mount) subscribes again. The parameter wiring set up in `new` lives as
    /// long as the application.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.resize_subscription.take() {
            subscription.unsubscribe();
        }
        log::debug!("Application torn down");
    }

    /// Loads the model asset if it is not loaded yet. A failed load is attempted again.
    pub fn load_model(&mut self) {
        if matches!(self.model, ModelState::Ready(_)) {
            return;
        }
        self.model = match self.loader.load(&self.model_path) {
            Ok(asset) => match present_chalice(&asset, NodeAttributes::default()) {
                Ok(_) => ModelState::Ready(asset),
                Err(err) => {
                    log::error!("{}", err);
                    ModelState::Failed(err.to_string())
                }
            },
            Err(err) => {
                log::error!("{}", err);
                ModelState::Failed(err.to_string())
            }
        };
        self.dirty.set(true);
    }

    /// Records the render surface and applies the current background to it.
    pub fn attach_surface(&mut self, surface: S) {
        let mut slot = self.surface.borrow_mut();
        if slot.is_attached() {
            log::warn!("Replacing an already attached render surface");
        }
        slot.attach(surface);
    }

    pub fn surface(&self) -> Ref<'_, SurfaceSlot<S>> {
        self.surface.borrow()
    }

    /// Forwards a window resize. Only the width is consulted.
    pub fn resize(&self, width: u32) {
        self.resize_events.emit(&width);
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    pub fn viewport(&self) -> ViewportState {
        self.viewport.get()
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitControls {
        &mut self.orbit
    }

    pub fn model_state(&self) -> &ModelState {
        &self.model
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn model_error(&self) -> Option<&str> {
        match &self.model {
            ModelState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the scene for the current state, rebuilding it if anything changed.
    pub fn scene(&mut self) -> &SceneGraph {
        if self.dirty.replace(false) || self.scene.is_none() {
            let model = match &self.model {
                ModelState::Ready(asset) => present_chalice(
                    asset,
                    NodeAttributes {
                        name: Some("chalice".to_string()),
                        transform: None,
                    },
                )
                .ok(),
                _ => None,
            };
            self.scene_builds += 1;
            self.scene = Some(compose_scene(
                &self.panel.params(),
                &self.viewport.get(),
                model,
                self.float,
            ));
        }
        match &self.scene {
            Some(scene) => scene,
            None => unreachable!("scene was just built"),
        }
    }

    /// How many times the scene graph has been composed.
    pub fn scene_builds(&self) -> usize {
        self.scene_builds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Color,
        asset::tests::CountingSource,
        controls::{BG_COLOR, ControlValue, INTENSITY},
        scene::NodeKind,
        surface::tests::RecordingSurface,
        viewport::ViewportTier,
    };

    fn app() -> ChaliceApp<RecordingSurface, CountingSource> {
        ChaliceApp::new(AssetLoader::new(CountingSource::new()), "chalice.glb")
    }

    #[test]
    fn test_mount_with_defaults() {
        let mut app = app();
        app.mount(1280);
        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        app.attach_surface(surface);

        let scene = app.scene();
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Mesh(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Camera(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::OrbitControls(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Environment(_))), 1);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::PostProcessing(_))), 1);
        assert_eq!(*calls.borrow(), vec![Color::WHITE]);
        assert_eq!(app.viewport().tier, ViewportTier::Normal);
    }

    #[test]
    fn test_background_edit_updates_clear_color_once() {
        let mut app = app();
        app.mount(1280);
        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        app.attach_surface(surface);

        let teal = Color::new(0, 0x80, 0x80);
        app.panel()
            .set(BG_COLOR, ControlValue::Color(teal))
            .unwrap();
        app.panel()
            .set(INTENSITY, ControlValue::Number(2.0))
            .unwrap();

        assert_eq!(*calls.borrow(), vec![Color::WHITE, teal]);
    }

    #[test]
    fn test_background_before_surface_applies_latest() {
        let mut app = app();
        app.mount(1280);
        app.panel()
            .set(BG_COLOR, ControlValue::Color(Color::new(1, 1, 1)))
            .unwrap();
        app.panel()
            .set(BG_COLOR, ControlValue::Color(Color::new(2, 2, 2)))
            .unwrap();

        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        assert!(calls.borrow().is_empty());
        app.attach_surface(surface);
        assert_eq!(*calls.borrow(), vec![Color::new(2, 2, 2)]);
    }

    #[test]
    fn test_scene_rebuilds_only_on_change() {
        let mut app = app();
        app.mount(1280);
        app.scene();
        app.scene();
        assert_eq!(app.scene_builds(), 1);

        app.resize(1300);
        app.scene();
        assert_eq!(app.scene_builds(), 1);

        app.resize(500);
        let scale = app
            .scene()
            .nodes()
            .find_map(|n| match n.kind {
                NodeKind::Center { .. } => Some(n.transform.scale.x),
                _ => None,
            })
            .unwrap();
        assert_eq!(scale, 2.4);
        assert_eq!(app.scene_builds(), 2);

        app.panel()
            .set(INTENSITY, ControlValue::Number(4.0))
            .unwrap();
        assert_eq!(app.scene().environment().unwrap().intensity, 4.0);
        assert_eq!(app.scene_builds(), 3);
    }

    #[test]
    fn test_teardown_releases_resize_subscription() {
        let mut app = app();
        app.mount(1920);
        app.teardown();
        app.resize(320);
        assert_eq!(app.viewport().tier, ViewportTier::Normal);
    }

    #[test]
    fn test_remount_after_teardown_is_fully_wired() {
        let mut app = app();
        app.mount(1280);
        let surface = RecordingSurface::default();
        let calls = Rc::clone(&surface.calls);
        app.attach_surface(surface);
        app.scene();

        app.teardown();
        app.mount(1280);
        let builds = app.scene_builds();
        app.scene();

        app.panel()
            .set(BG_COLOR, ControlValue::Color(Color::BLACK))
            .unwrap();
        app.panel()
            .set(INTENSITY, ControlValue::Number(4.0))
            .unwrap();

        assert_eq!(*calls.borrow(), vec![Color::WHITE, Color::BLACK]);
        assert_eq!(app.scene().environment().unwrap().intensity, 4.0);
        assert!(app.scene_builds() > builds);

        app.resize(320);
        assert_eq!(app.viewport().tier, ViewportTier::Compact);
    }

    #[test]
    fn test_failed_asset_leaves_scene_without_model() {
        let source = CountingSource::new();
        source.failures.set(1);
        let mut app: ChaliceApp<RecordingSurface, CountingSource> =
            ChaliceApp::new(AssetLoader::new(source), "chalice.glb");
        app.mount(1280);

        assert!(app.model_error().is_some());
        let scene = app.scene();
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Mesh(_))), 0);
        assert_eq!(scene.count(|k| matches!(k, NodeKind::Camera(_))), 1);

        app.load_model();
        assert!(app.model_error().is_none());
        assert_eq!(
            app.scene().count(|k| matches!(k, NodeKind::Mesh(_))),
            1
        );
    }
}
