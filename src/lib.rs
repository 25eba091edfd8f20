//! Interactive document-canvas viewport engine.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It presents
//! a fixed-size logical document (sized by physical page dimensions) inside a
//! resizable host element, pannable and zoomable, with reactive page-size and
//! margin configuration, a registry of display objects across three scene
//! layers, and an interaction lock. The host layer is responsible only for
//! constructing the managers, calling [`engine::ViewportEngine::init`], and
//! wiring its own UI controls to the engine handle.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`viewport`] | Pan/zoom camera over a bounded world |
//! | [`scene`] | Retained scene: three layers of z-sorted display nodes |
//! | [`dimension`] | Reactive page-size manager (A-series/Letter, orientation) |
//! | [`margins`] | Reactive margin manager, derived from page dimensions |
//! | [`layout`] | Header/body/footer layout-block rendering contract |
//! | [`input`] | Modifier keys, wheel normalization, drag-pan state |
//! | [`notify`] | Listener lists and subscription disposers |
//! | [`geometry`] | Page-size tables and physical-unit conversions |
//! | [`consts`] | Shared numeric constants (zoom limits, colors, etc.) |

pub mod consts;
pub mod dimension;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod margins;
pub mod notify;
pub mod scene;
pub mod viewport;

mod dom;
mod render;
mod schedule;

/// Route panics and `log` records to the browser console. Call once from the
/// host before constructing an engine; repeat calls are harmless.
pub fn init_browser_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::debug!("console logger already installed");
    }
}
