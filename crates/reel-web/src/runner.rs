use log::{error, info, warn};
use reel_engine::{
    build_render_buffer, AssetManifest, CameraUniform, FixedTimestep, ReelConfig, RenderBuffer, ShowContext,
    Switcher,
};

/// Owns the shared show context and the switcher, and packs render data
/// after every tick.
///
/// The show crate keeps one runner in a `thread_local!` and exports free
/// functions through [`export_shows!`](crate::export_shows), since
/// wasm-bindgen cannot export this struct's generic setup directly.
pub struct ShowRunner {
    ctx: ShowContext,
    switcher: Switcher,
    timestep: FixedTimestep,
    render_buffer: RenderBuffer,
    camera: CameraUniform,
    config: ReelConfig,
    initialized: bool,
}

impl ShowRunner {
    pub fn new(switcher: Switcher, config: ReelConfig, manifest: AssetManifest) -> Self {
        let ctx = ShowContext::new(&config, manifest);
        let camera = ctx.camera.uniform();
        Self {
            ctx,
            switcher,
            timestep: FixedTimestep::new(config.fixed_dt),
            render_buffer: RenderBuffer::with_capacity(config.max_instances),
            camera,
            config,
            initialized: false,
        }
    }

    /// Start the configured default show, or the first registered one.
    pub fn init(&mut self) {
        let first = if self.config.default_show.is_empty() {
            self.switcher.ids().next().map(str::to_string)
        } else {
            Some(self.config.default_show.clone())
        };
        self.initialized = true;
        match first {
            Some(id) => {
                self.activate(&id);
            }
            None => warn!("no shows registered"),
        }
        self.pack();
    }

    /// Switch shows. Returns false, keeping the current show, if `id` is unknown.
    pub fn activate(&mut self, id: &str) -> bool {
        match self.switcher.activate(&mut self.ctx, id) {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Advance by measured frame time using fixed steps, then repack buffers.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }
        let steps = self.timestep.accumulate(dt);
        for _ in 0..steps {
            self.switcher.update(&mut self.ctx, self.timestep.dt());
        }
        self.pack();
    }

    fn pack(&mut self) {
        build_render_buffer(self.ctx.scene.iter(), &mut self.render_buffer);
        self.camera = self.ctx.camera.uniform();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.ctx.camera.set_aspect(width, height);
        self.camera = self.ctx.camera.uniform();
    }

    // ---- Asset bridge ----

    /// Pending fetches as a JSON array of `{ticket, kind, name, path}`.
    pub fn take_asset_requests(&mut self) -> String {
        let requests = self.ctx.assets.take_requests();
        serde_json::to_string(&requests).unwrap_or_else(|e| {
            error!("failed to encode asset requests: {}", e);
            "[]".to_string()
        })
    }

    pub fn asset_loaded(&mut self, ticket: u32) {
        self.ctx.assets.complete(ticket);
    }

    pub fn asset_failed(&mut self, ticket: u32, reason: &str) {
        self.ctx.assets.fail(ticket, reason);
    }

    // ---- Introspection ----

    pub fn show_ids(&self) -> Vec<String> {
        self.switcher.ids().map(str::to_string).collect()
    }

    pub fn active_show(&self) -> String {
        self.switcher.active_id().unwrap_or_default().to_string()
    }

    pub fn context(&self) -> &ShowContext {
        &self.ctx
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn lights_ptr(&self) -> *const f32 {
        self.render_buffer.lights_ptr()
    }

    pub fn light_count(&self) -> u32 {
        self.render_buffer.light_count()
    }

    pub fn vertices_ptr(&self) -> *const f32 {
        self.render_buffer.vertices_ptr()
    }

    pub fn vertex_float_count(&self) -> u32 {
        self.render_buffer.vertices.len() as u32
    }

    pub fn camera_ptr(&self) -> *const f32 {
        &self.camera as *const CameraUniform as *const f32
    }

    pub fn max_instances(&self) -> u32 {
        self.config.max_instances as u32
    }
}

/// Parse host-supplied JSON, falling back to defaults on error.
pub fn parse_setup(config_json: &str, manifest_json: &str) -> (ReelConfig, AssetManifest) {
    let config = if config_json.trim().is_empty() {
        ReelConfig::default()
    } else {
        ReelConfig::from_json(config_json).unwrap_or_else(|e| {
            warn!("{}; using default config", e);
            ReelConfig::default()
        })
    };
    let manifest = if manifest_json.trim().is_empty() {
        AssetManifest::default()
    } else {
        AssetManifest::from_json(manifest_json).unwrap_or_else(|e| {
            warn!("{}; using empty asset manifest", e);
            AssetManifest::default()
        })
    };
    info!("reel config: default show '{}', seed {}", config.default_show, config.seed);
    (config, manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_engine::{
        Cast, Choreography, Color, Entity, EntityId, Frame, Geometry, Material, Mesh, Result, StageHandler,
        StageSchedule, Timeline,
    };

    #[derive(Default)]
    struct Fader {
        cube: Option<EntityId>,
        font: bool,
    }

    impl Fader {
        fn fade(&mut self, f: &mut Frame<'_>, p: f32) {
            f.with(self.cube, |e| e.opacity = 1.0 - p);
        }
    }

    impl Choreography for Fader {
        const STAGES: &'static [StageHandler<Self>] = &[Self::fade];

        fn name(&self) -> &str {
            "fader"
        }

        fn schedule(&self) -> Result<StageSchedule> {
            StageSchedule::from_pairs(&[("fade", 2.0)])
        }

        fn build(&mut self, cast: &mut Cast<'_>) {
            let cube = Entity::new().with_mesh(Mesh::new(Geometry::cube(1.0), Material::standard(Color::WHITE)));
            self.cube = Some(cast.spawn(cube));
            if self.font {
                cast.request_font("bold");
            }
        }

        fn reset(&mut self, f: &mut Frame<'_>) {
            f.with(self.cube, |e| e.opacity = 1.0);
        }
    }

    fn runner(default_show: &str) -> ShowRunner {
        let mut sw = Switcher::new();
        sw.register("plain", Timeline::boxed(Fader::default()).unwrap()).unwrap();
        sw.register("titled", Timeline::boxed(Fader { cube: None, font: true }).unwrap()).unwrap();
        let config = ReelConfig {
            default_show: default_show.to_string(),
            ..Default::default()
        };
        ShowRunner::new(sw, config, AssetManifest::default())
    }

    #[test]
    fn init_starts_first_show() {
        let mut r = runner("");
        r.init();
        assert_eq!(r.active_show(), "plain");
        assert_eq!(r.instance_count(), 1);
    }

    #[test]
    fn init_honours_default_show() {
        let mut r = runner("titled");
        r.init();
        assert_eq!(r.active_show(), "titled");
        let json = r.take_asset_requests();
        assert!(json.contains("\"kind\":\"font\""));
        assert!(json.contains("\"name\":\"bold\""));
    }

    #[test]
    fn tick_before_init_is_ignored() {
        let mut r = runner("");
        r.tick(0.5);
        assert_eq!(r.instance_count(), 0);
    }

    #[test]
    fn tick_repacks_instances() {
        let mut r = runner("");
        r.init();
        r.tick(0.5);
        assert_eq!(r.instance_count(), 1);
        assert!(r.context().scene.iter().all(|e| e.opacity < 1.0));
    }

    #[test]
    fn unknown_show_keeps_current() {
        let mut r = runner("");
        r.init();
        assert!(!r.activate("missing"));
        assert_eq!(r.active_show(), "plain");
        assert!(r.activate("titled"));
        assert_eq!(r.context().scene.len(), 1);
    }

    #[test]
    fn bad_json_falls_back() {
        let (config, manifest) = parse_setup("{oops", "");
        assert_eq!(config, ReelConfig::default());
        assert_eq!(manifest, AssetManifest::default());
    }
}
