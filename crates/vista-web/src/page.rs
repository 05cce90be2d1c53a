//! Host page integration: scroll offset, landmark geometry and the loader overlay

use std::collections::HashMap;

use bevy::prelude::*;
use vista_core::LandmarkRect;
use vista_scene::{LoadingProgress, PageGeometry, Viewer};

/// Element id of the loading overlay
pub const LOADER_ID: &str = "loader";

/// Landmark moves smaller than this (CSS pixels) are measurement noise
const LAYOUT_TOLERANCE: f64 = 0.5;

pub struct PagePlugin;

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreUpdate, measure_page)
            .add_systems(Last, update_loader);
    }
}

/// Raw measurements of the document for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSnapshot {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub landmarks: HashMap<String, LandmarkRect>,
}

/// Copy a snapshot into the geometry resource, bumping the layout
/// generation only when the viewport or a landmark actually moved
pub fn apply_snapshot(page: &mut PageGeometry, snapshot: PageSnapshot) {
    page.scroll_y = snapshot.scroll_y;

    let reflowed = (page.viewport_height - snapshot.viewport_height).abs() > LAYOUT_TOLERANCE
        || page.landmarks.len() != snapshot.landmarks.len()
        || snapshot.landmarks.iter().any(|(id, rect)| match page.landmarks.get(id) {
            Some(old) => {
                (old.top - rect.top).abs() > LAYOUT_TOLERANCE
                    || (old.height - rect.height).abs() > LAYOUT_TOLERANCE
            }
            None => true,
        });

    if reflowed {
        page.viewport_height = snapshot.viewport_height;
        page.landmarks = snapshot.landmarks;
        page.layout_generation += 1;
        tracing::debug!(generation = page.layout_generation, "Page layout changed");
    }
}

#[cfg(target_arch = "wasm32")]
fn read_page(landmark_ids: impl Iterator<Item = String>) -> Option<PageSnapshot> {
    let window = web_sys::window()?;
    let document = window.document()?;
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let viewport_height = window.inner_height().ok()?.as_f64()?;

    let mut landmarks = HashMap::new();
    for id in landmark_ids {
        if let Some(element) = document.get_element_by_id(&id) {
            // Client rects are viewport-relative; store document offsets
            let rect = element.get_bounding_client_rect();
            landmarks.insert(
                id,
                LandmarkRect {
                    top: rect.top() + scroll_y,
                    height: rect.height(),
                },
            );
        }
    }

    Some(PageSnapshot {
        scroll_y,
        viewport_height,
        landmarks,
    })
}

fn measure_page(viewer: Res<Viewer>, mut page: ResMut<PageGeometry>) {
    #[cfg(target_arch = "wasm32")]
    {
        let ids = viewer
            .director()
            .transitions()
            .iter()
            .map(|transition| transition.landmark.clone());
        if let Some(snapshot) = read_page(ids) {
            apply_snapshot(&mut page, snapshot);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (&viewer, &mut page);
    }
}

/// Slide the loader away once loading has finished
fn update_loader(time: Res<Time>, progress: Res<LoadingProgress>, mut hidden: Local<bool>) {
    let visible = progress.overlay_visible(time.elapsed());
    if visible != *hidden {
        return;
    }
    *hidden = !visible;

    if progress.failed > 0 && !visible {
        tracing::warn!(failed = progress.failed, "Some assets failed to load");
    }

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let Some(loader) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(LOADER_ID))
            .and_then(|element| element.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            tracing::warn!("No #{} element on the page", LOADER_ID);
            return;
        };
        let display = if visible { "flex" } else { "none" };
        if let Err(e) = loader.style().set_property("display", display) {
            tracing::error!("Failed to update loader overlay: {:?}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(scroll_y: f64, top: f64) -> PageSnapshot {
        let mut landmarks = HashMap::new();
        landmarks.insert("section-two".to_string(), LandmarkRect { top, height: 800.0 });
        PageSnapshot {
            scroll_y,
            viewport_height: 900.0,
            landmarks,
        }
    }

    #[test]
    fn test_scrolling_keeps_layout_generation() {
        let mut page = PageGeometry::default();
        apply_snapshot(&mut page, snapshot(0.0, 1000.0));
        assert_eq!(page.layout_generation, 1);

        apply_snapshot(&mut page, snapshot(450.0, 1000.2));
        assert_eq!(page.scroll_y, 450.0);
        assert_eq!(page.layout_generation, 1);
    }

    #[test]
    fn test_reflow_bumps_layout_generation() {
        let mut page = PageGeometry::default();
        apply_snapshot(&mut page, snapshot(0.0, 1000.0));
        apply_snapshot(&mut page, snapshot(0.0, 1300.0));
        assert_eq!(page.layout_generation, 2);
        assert_eq!(page.landmarks["section-two"].top, 1300.0);

        let mut resized = snapshot(0.0, 1300.0);
        resized.viewport_height = 700.0;
        apply_snapshot(&mut page, resized);
        assert_eq!(page.layout_generation, 3);
        assert_eq!(page.viewport_height, 700.0);
    }

    #[test]
    fn test_missing_landmark_counts_as_reflow() {
        let mut page = PageGeometry::default();
        apply_snapshot(&mut page, snapshot(0.0, 1000.0));

        let mut gone = snapshot(0.0, 1000.0);
        gone.landmarks.clear();
        apply_snapshot(&mut page, gone);
        assert_eq!(page.layout_generation, 2);
        assert!(page.landmarks.is_empty());
    }
}
