//! Vista Web - browser front end for the building viewer
//!
//! Renders the viewer into the page's canvas, feeds it the document scroll
//! position and landmark geometry, and hosts the debug panel.

mod app;
mod page;
mod ui;

use wasm_bindgen::prelude::*;

/// Entry point for WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging with filtering to reduce wgpu noise
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(tracing::Level::WARN)
            .build()
    );

    app::run();
}
