pub mod runner;

pub use runner::{parse_setup, ShowRunner};

#[doc(hidden)]
pub use js_sys;

/// Generate the `#[wasm_bindgen]` exports for a show catalogue.
///
/// Expands to:
/// - `thread_local!` storage for the [`ShowRunner`]
/// - a `with_runner()` helper that logs instead of panicking when called
///   before `reel_init`
/// - lifecycle exports (`reel_init`, `reel_tick`, `reel_activate`)
/// - asset bridge exports and buffer accessors
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
///
/// mod shows;
///
/// reel_web::export_shows!(shows::catalogue, "my-reel");
/// ```
///
/// `$catalogue` is a `fn() -> reel_engine::Result<reel_engine::Switcher>`.
#[macro_export]
macro_rules! export_shows {
    ($catalogue:path, $reel_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::ShowRunner>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::ShowRunner) -> R) -> Option<R> {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                match borrow.as_mut() {
                    Some(runner) => Some(f(runner)),
                    None => {
                        log::error!("{}: call reel_init() first", $reel_name);
                        None
                    }
                }
            })
        }

        /// `config_json` and `manifest_json` may be empty strings.
        #[wasm_bindgen]
        pub fn reel_init(config_json: &str, manifest_json: &str) -> bool {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let switcher = match $catalogue() {
                Ok(s) => s,
                Err(e) => {
                    log::error!("{}: catalogue rejected: {}", $reel_name, e);
                    return false;
                }
            };
            let (config, manifest) = $crate::parse_setup(config_json, manifest_json);
            let runner = $crate::ShowRunner::new(switcher, config, manifest);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $reel_name);
            true
        }

        #[wasm_bindgen]
        pub fn reel_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn reel_activate(id: &str) -> bool {
            with_runner(|r| r.activate(id)).unwrap_or(false)
        }

        #[wasm_bindgen]
        pub fn reel_resize(width: f32, height: f32) {
            with_runner(|r| r.resize(width, height));
        }

        #[wasm_bindgen]
        pub fn reel_show_ids() -> $crate::js_sys::Array {
            let ids = with_runner(|r| r.show_ids()).unwrap_or_default();
            ids.into_iter().map(JsValue::from).collect()
        }

        #[wasm_bindgen]
        pub fn reel_active_show() -> String {
            with_runner(|r| r.active_show()).unwrap_or_default()
        }

        // ---- Asset bridge ----

        #[wasm_bindgen]
        pub fn reel_take_asset_requests() -> String {
            with_runner(|r| r.take_asset_requests()).unwrap_or_else(|| "[]".to_string())
        }

        #[wasm_bindgen]
        pub fn reel_asset_loaded(ticket: u32) {
            with_runner(|r| r.asset_loaded(ticket));
        }

        #[wasm_bindgen]
        pub fn reel_asset_failed(ticket: u32, reason: &str) {
            with_runner(|r| r.asset_failed(ticket, reason));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_instances_ptr() -> *const f32 {
            with_runner(|r| r.instances_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_instance_count() -> u32 {
            with_runner(|r| r.instance_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_lights_ptr() -> *const f32 {
            with_runner(|r| r.lights_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_light_count() -> u32 {
            with_runner(|r| r.light_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_vertices_ptr() -> *const f32 {
            with_runner(|r| r.vertices_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_vertex_float_count() -> u32 {
            with_runner(|r| r.vertex_float_count()).unwrap_or(0)
        }

        #[wasm_bindgen]
        pub fn get_camera_ptr() -> *const f32 {
            with_runner(|r| r.camera_ptr()).unwrap_or(std::ptr::null())
        }

        #[wasm_bindgen]
        pub fn get_max_instances() -> u32 {
            with_runner(|r| r.max_instances()).unwrap_or(0)
        }
    };
}
