#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Scroll-driven motion for the Synapse society site: smooth scrolling,
//! scroll-linked section progress, a pinned horizontal track, kinetic text,
//! card tilt with focus dimming and canvas particle overlays.
//!
//! Everything outside `wasm` is plain state driven by explicit timestamps,
//! so it runs and tests on the host.

pub mod clipboard;
pub mod config;
pub mod content;
pub mod error;
pub mod logger;
pub mod motion;
pub mod particles;
pub mod reveal;
pub mod scene;
pub mod scroll;
pub mod surface;
pub mod tilt;
pub mod track;

pub use config::EngineConfig;
pub use content::SiteContent;
pub use error::{MotionError, Result};
pub use scene::{Input, Scene, SceneFrame};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use crate::config::EngineConfig;
    use crate::content::SiteContent;
    use crate::logger::{self, LevelFilter};

    mod dom;
    mod mount;
    mod render;

    pub use dom::{container_key, render_content, DomProbe};
    pub use mount::Mount;
    pub use render::Canvas2dSurface;

    thread_local! {
        static MOUNTED: RefCell<Option<Mount>> = const { RefCell::new(None) };
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        if let Err(err) = logger::init(LevelFilter::INFO) {
            web_sys::console::warn_1(&err.to_string().into());
        }

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Pages may override engine defaults with an inline JSON block.
        let config = match document.get_element_by_id("motion-config").and_then(|el| el.text_content()) {
            Some(json) => EngineConfig::from_json(&json)?,
            None => EngineConfig::default(),
        };
        let content = SiteContent::embedded()?;

        let mount = Mount::new(DomProbe::new(window, document), config, content)?;
        MOUNTED.with(|slot| slot.replace(Some(mount)));
        Ok(())
    }

    /// Detaches the engine from the page.
    #[wasm_bindgen]
    pub fn teardown() {
        MOUNTED.with(|slot| drop(slot.take()));
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{container_key, render_content, Canvas2dSurface, DomProbe, Mount};
