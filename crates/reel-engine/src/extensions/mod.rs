// extensions/mod.rs
//
// Procedural transform library used by show handlers.
// Nothing here touches Scene or Entity; handlers feed results into them.

pub mod curve;
pub mod easing;
pub mod particle;
pub mod rng;
pub mod stagger;
pub mod wave;

pub use curve::{orbit, CubicBezier, Curve, QuadraticBezier};
pub use easing::{approach, ease, ease_in_out_cubic, lerp, lerp_vec3, ramp, Easing};
pub use particle::{Aabb, Particle, ParticleSet};
pub use rng::Rng;
pub use wave::{oscillate, pulse, WaveAxis, WaveBand, WaveField};
