pub mod color;
pub mod entity;
pub mod light;
pub mod mesh;
