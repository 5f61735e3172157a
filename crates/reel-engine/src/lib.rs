pub mod api;
pub mod assets;
pub mod components;
pub mod core;
pub mod error;
pub mod extensions;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::config::{CameraConfig, ReelConfig};
pub use api::context::ShowContext;
pub use api::frame::{Cast, Frame};
pub use api::show::{Choreography, Show, StageHandler};
pub use api::switcher::Switcher;
pub use api::timeline::Timeline;
pub use api::types::{EntityId, ShowId};
pub use assets::loader::{
    AssetEvent, AssetKind, AssetLoader, AssetPayload, AssetRequest, FontHandle, Subscription, TextureHandle,
};
pub use assets::manifest::AssetManifest;
pub use components::color::Color;
pub use components::entity::{Entity, MotionParams};
pub use components::light::{Light, LightKind};
pub use components::mesh::{Geometry, Material, Mesh, MeshPart};
pub use core::scene::Scene;
pub use core::schedule::{StageFrame, StagePoint, StageSchedule, StageSpec};
pub use core::time::{Clock, FixedTimestep};
pub use error::{ReelError, Result};
pub use renderer::camera::{Camera3D, CameraUniform};
pub use renderer::instance::{LightInstance, RenderBuffer, RenderInstance};
pub use systems::render::build_render_buffer;

pub use extensions::{
    approach, ease, ease_in_out_cubic, lerp, lerp_vec3, orbit, oscillate, pulse, ramp, Aabb, CubicBezier,
    Curve, Easing, Particle, ParticleSet, QuadraticBezier, Rng, WaveAxis, WaveBand, WaveField,
};
