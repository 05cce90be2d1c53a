//! Bevy application setup

use std::time::Duration;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{DefaultPickingPlugins, prelude::MeshPickingPlugin};
use vista_core::ViewerConfig;
use vista_scene::models::ModelSettings;
use vista_scene::{Viewer, VistaScenePlugin};

use crate::page::PagePlugin;
use crate::ui::{DebugPanel, UiPlugin};

/// Startup options read from the page URL
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// `?config=` - URL-encoded JSON export
    pub config: Option<ViewerConfig>,
    /// `?model=` - building model asset path
    pub model: Option<String>,
    /// `?interactive` - start with orbit controls instead of the scroll director
    pub interactive: bool,
    /// `?production` or `?debug=0` - no debug panel
    pub production: bool,
}

impl LaunchOptions {
    /// Read options from the current page location
    #[cfg(target_arch = "wasm32")]
    pub fn from_browser() -> Self {
        let search = web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default();
        Self::from_query(&search, |raw| {
            js_sys::decode_uri_component(raw).ok().map(String::from)
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_browser() -> Self {
        Self::default()
    }

    /// Parse a `?key=value&...` search string; `decode` undoes URL encoding
    pub fn from_query(search: &str, decode: impl Fn(&str) -> Option<String>) -> Self {
        let config = parse_query_param(search, "config")
            .and_then(|raw| decode(&raw))
            .and_then(|json| match ViewerConfig::from_json(&json) {
                Ok(config) => {
                    tracing::info!("Using viewer config from URL parameter");
                    Some(config)
                }
                Err(e) => {
                    tracing::error!("Ignoring config URL parameter: {}", e);
                    None
                }
            });

        Self {
            config,
            model: parse_query_param(search, "model").and_then(|raw| decode(&raw)),
            interactive: has_query_flag(search, "interactive"),
            production: has_query_flag(search, "production")
                || parse_query_param(search, "debug").as_deref() == Some("0"),
        }
    }
}

/// Parse a query parameter from a search string, still URL-encoded
fn parse_query_param(search: &str, param: &str) -> Option<String> {
    let search = search.trim_start_matches('?');
    for pair in search.split('&') {
        let mut parts = pair.splitn(2, '=');
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            if key == param {
                return Some(value.replace('+', " "));
            }
        }
    }
    None
}

/// True for `?flag`, `?flag=1` or `?flag=true`
fn has_query_flag(search: &str, flag: &str) -> bool {
    search
        .trim_start_matches('?')
        .split('&')
        .any(|pair| match pair.split_once('=') {
            Some((key, value)) => key == flag && matches!(value, "" | "1" | "true"),
            None => pair == flag,
        })
}

/// Run the Bevy application
pub fn run() {
    let options = LaunchOptions::from_browser();

    let mut viewer = Viewer::from_config(options.config.unwrap_or_default());
    if !options.interactive {
        viewer.enter_directed(Duration::ZERO);
    }
    let panel = if options.production {
        DebugPanel::production()
    } else {
        DebugPanel::default()
    };
    let model = options
        .model
        .map(|path| ModelSettings { path })
        .unwrap_or_default();

    App::new()
        .insert_resource(ClearColor(Color::srgb_u8(0xfe, 0xcd, 0xad)))
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vista - Building Viewer".to_string(),
                    canvas: Some("#vista-canvas".to_string()),
                    fit_canvas_to_parent: true,
                    // The page underneath must keep receiving wheel and touch scroll
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Models and environment maps are served next to index.html
                file_path: "".to_string(),
                // Don't look for .meta files - the static host doesn't have them
                meta_check: bevy::asset::AssetMetaCheck::Never,
                ..default()
            })
        )
        // These must be added BEFORE EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .insert_resource(viewer)
        .insert_resource(model)
        .insert_resource(panel)
        .add_plugins(VistaScenePlugin)
        .add_plugins(PagePlugin)
        .add_plugins(UiPlugin)
        .run();
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_core::ToneMapping;

    fn identity(raw: &str) -> Option<String> {
        Some(raw.to_string())
    }

    #[test]
    fn test_parse_query_param() {
        let search = "?model=models/Tower.glb&debug=1";
        assert_eq!(parse_query_param(search, "model").as_deref(), Some("models/Tower.glb"));
        assert_eq!(parse_query_param(search, "debug").as_deref(), Some("1"));
        assert!(parse_query_param(search, "config").is_none());
        assert!(parse_query_param("", "model").is_none());
    }

    #[test]
    fn test_interactive_flag() {
        assert!(has_query_flag("?interactive", "interactive"));
        assert!(has_query_flag("?a=b&interactive=true", "interactive"));
        assert!(!has_query_flag("?interactive=0", "interactive"));
        assert!(!has_query_flag("?interactively", "interactive"));
    }

    #[test]
    fn test_config_from_query() {
        let options = LaunchOptions::from_query(r#"?config={"toneMapping":"ACES","fov":40}"#, identity);
        let config = options.config.unwrap();
        assert_eq!(config.lighting.tone_mapping, ToneMapping::Aces);
        assert_eq!(config.camera.fov, 40.0);
        assert!(!options.interactive);
    }

    #[test]
    fn test_production_flag() {
        assert!(LaunchOptions::from_query("?production", identity).production);
        assert!(LaunchOptions::from_query("?model=a.glb&debug=0", identity).production);
        assert!(!LaunchOptions::from_query("?debug=1", identity).production);
        assert!(!LaunchOptions::from_query("", identity).production);
    }

    #[test]
    fn test_bad_config_is_ignored() {
        let options = LaunchOptions::from_query("?config=not-json&interactive", identity);
        assert!(options.config.is_none());
        assert!(options.interactive);
    }
}
