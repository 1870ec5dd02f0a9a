//! JavaScript interop for the Leaflet map.
//! Provides Rust bindings to the helper functions defined in map_helpers.js.

use log::{debug, warn};
use mapty::config::{TILE_ATTRIBUTION, TILE_URL};
use mapty::{Coords, MapSurface, Marker};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(module = "/map_helpers.js")]
extern "C" {
    #[wasm_bindgen(js_name = createMap)]
    fn create_map(
        element_id: &str,
        lat: f64,
        lng: f64,
        zoom: u8,
        tile_url: &str,
        attribution: &str,
        on_click: &Closure<dyn FnMut(f64, f64)>,
    ) -> JsValue;

    #[wasm_bindgen(js_name = addMarker)]
    fn add_marker(map: &JsValue, lat: f64, lng: f64, options: JsValue, content: &str);

    #[wasm_bindgen(js_name = flyTo)]
    fn map_fly_to(map: &JsValue, lat: f64, lng: f64, zoom: u8, duration_secs: f64);
}

/// A live Leaflet map plus the click handler it calls back into.
#[derive(Debug)]
pub struct LeafletMap {
    handle: JsValue,
    _on_click: Closure<dyn FnMut(f64, f64)>,
}

impl LeafletMap {
    /// Create the map inside `element_id`, centred on `center`, with the tile
    /// layer attached. Every map click is forwarded to `on_click`.
    pub fn mount(
        element_id: &str,
        center: Coords,
        zoom: u8,
        mut on_click: impl FnMut(Coords) + 'static,
    ) -> Self {
        let on_click = Closure::<dyn FnMut(f64, f64)>::new(move |lat, lng| {
            on_click(Coords(lat, lng));
        });
        let handle = create_map(
            element_id,
            center.lat(),
            center.lng(),
            zoom,
            TILE_URL,
            TILE_ATTRIBUTION,
            &on_click,
        );
        debug!("Map mounted at ({}, {})", center.lat(), center.lng());
        Self {
            handle,
            _on_click: on_click,
        }
    }
}

impl MapSurface for LeafletMap {
    fn place_marker(&self, marker: &Marker) {
        let options = match serde_wasm_bindgen::to_value(&marker.popup) {
            Ok(options) => options,
            Err(e) => {
                warn!("Could not encode popup options: {}", e);
                return;
            }
        };
        add_marker(
            &self.handle,
            marker.coords.lat(),
            marker.coords.lng(),
            options,
            &marker.content,
        );
    }

    fn fly_to(&self, coords: Coords, zoom: u8, duration_secs: f64) {
        map_fly_to(&self.handle, coords.lat(), coords.lng(), zoom, duration_secs);
    }
}
