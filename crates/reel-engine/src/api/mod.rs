pub mod config;
pub mod context;
pub mod frame;
pub mod show;
pub mod switcher;
pub mod timeline;
pub mod types;
