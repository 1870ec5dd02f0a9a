//! Main module for the Mapty workout logger using Yew.
//! Wires the tracker, the Leaflet map and browser services into the UI.

use chrono::Local;
use gloo_timers::callback::Timeout;
use log::{error, info, warn};
use mapty::config::*;
use mapty::{Coords, Field, Kind, SnapshotStorage};
use wasm_bindgen::prelude::*;
use yew::prelude::*;

mod components;
mod geolocation;
mod hooks;
mod logging;
mod map;
mod storage;

use components::{WorkoutForm, WorkoutItem};
use geolocation::current_position;
use hooks::{use_tracker, with_active_tracker, TrackerHandle};
use map::LeafletMap;
use storage::BrowserStorage;

fn alert(message: &str) {
    if let Err(e) = gloo_utils::window().alert_with_message(message) {
        warn!("Could not show alert: {:?}", e);
    }
}

/// Clear every logged workout and restart the app.
///
/// Exported for the developer console; there is no UI control for it.
#[wasm_bindgen]
pub fn reset() {
    let cleared = with_active_tracker(|tracker| tracker.reset()).unwrap_or_else(|| {
        let mut storage = BrowserStorage::open();
        storage.remove(STORAGE_KEY)
    });
    if let Err(e) = cleared {
        warn!("Could not clear workouts: {}", e);
    }
    if let Err(e) = gloo_utils::window().location().reload() {
        error!("Could not reload: {:?}", e);
    }
}

/// Locate the user, then mount the map around them and hand it to the tracker.
async fn load_map(tracker: TrackerHandle) {
    let center = match current_position().await {
        Ok(center) => center,
        Err(e) => {
            error!("{}", e);
            alert(GEOLOCATION_ALERT);
            return;
        }
    };
    info!("Located user at ({}, {})", center.lat(), center.lng());

    let on_click = {
        let tracker = tracker.clone();
        move |coords: Coords| tracker.update(|t| t.map_clicked(coords))
    };
    let map = LeafletMap::mount(MAP_ELEMENT_ID, center, MAP_ZOOM, on_click);
    tracker.update(|t| t.map_ready(map));
}

/// Primary application component: sidebar with form and list, and the map.
#[function_component(App)]
fn app() -> Html {
    let tracker = use_tracker();

    // Geolocation runs once on mount; entries already render without a map.
    {
        let tracker = tracker.clone();
        use_effect_with((), move |_| {
            wasm_bindgen_futures::spawn_local(load_map(tracker));
            || ()
        });
    }

    let on_kind = {
        let tracker = tracker.clone();
        Callback::from(move |kind: Kind| tracker.update(|t| t.kind_changed(kind)))
    };

    let on_edit = {
        let tracker = tracker.clone();
        Callback::from(move |(field, text): (Field, String)| {
            tracker.update(|t| t.field_edited(field, text))
        })
    };

    let on_submit = {
        let tracker = tracker.clone();
        Callback::from(move |_: ()| match tracker.update(|t| t.submit(Local::now())) {
            Ok(_) => {
                let hide = tracker.borrow().form().hides();
                let tracker = tracker.clone();
                Timeout::new(FORM_RESTORE_MS, move || {
                    tracker.update(|t| t.form_settled(hide));
                })
                .forget();
            }
            Err(e) => {
                warn!("Rejected workout: {}", e);
                alert(e.alert_message());
            }
        })
    };

    let on_select = {
        let tracker = tracker.clone();
        Callback::from(move |id: String| {
            tracker.update(|t| t.list_clicked(&id));
        })
    };

    let state = tracker.borrow();
    let form = state.form();
    let workouts: Html = state
        .store()
        .newest_first()
        .map(|workout| {
            html! {
                <WorkoutItem
                    key={workout.id().to_string()}
                    workout={workout.clone()}
                    onselect={on_select.clone()}
                />
            }
        })
        .collect();

    let view = html! {
        <>
            <div class="sidebar">
                <h1 class="logo">{ "Mapty" }</h1>
                <ul class="workouts">
                    <WorkoutForm
                        visible={form.is_visible()}
                        suppressed={form.display_suppressed()}
                        reveals={form.reveals()}
                        kind={form.kind()}
                        fields={form.fields().clone()}
                        {on_kind}
                        {on_edit}
                        {on_submit}
                    />
                    { workouts }
                </ul>
                <p class="copyright">
                    { "Map data © OpenStreetMap contributors" }
                </p>
            </div>
            <div id={MAP_ELEMENT_ID}></div>
        </>
    };
    view
}

/// Entry point: installs diagnostics and renders the App component.
fn main() {
    console_error_panic_hook::set_once();
    logging::init(LOG_LEVEL);
    yew::Renderer::<App>::new().render();
}
