//! One-shot position lookup through the browser Geolocation API.

use futures::channel::oneshot;
use mapty::Coords;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Position as GeolocationPosition, PositionError as GeolocationPositionError};

#[derive(Debug)]
pub enum GeolocationError {
    /// The browser exposes no geolocation service.
    Unsupported,
    /// The request was refused or failed.
    Failed(String),
    /// Neither callback ever fired.
    Abandoned,
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationError::Unsupported => write!(f, "Geolocation is not supported"),
            GeolocationError::Failed(msg) => write!(f, "Geolocation failed: {}", msg),
            GeolocationError::Abandoned => write!(f, "Geolocation request was dropped"),
        }
    }
}

impl std::error::Error for GeolocationError {}

type Reply = oneshot::Sender<Result<Coords, GeolocationError>>;

fn answer(reply: &Rc<RefCell<Option<Reply>>>, result: Result<Coords, GeolocationError>) {
    if let Some(tx) = reply.borrow_mut().take() {
        let _ = tx.send(result);
    }
}

/// Ask for the current position once. Resolves on the first callback.
pub async fn current_position() -> Result<Coords, GeolocationError> {
    let geolocation = gloo_utils::window()
        .navigator()
        .geolocation()
        .map_err(|_| GeolocationError::Unsupported)?;

    let (tx, rx) = oneshot::channel();
    let reply = Rc::new(RefCell::new(Some(tx)));

    let on_success = {
        let reply = reply.clone();
        Closure::once(move |position: GeolocationPosition| {
            let coords = position.coords();
            answer(&reply, Ok(Coords(coords.latitude(), coords.longitude())));
        })
    };
    let on_error = {
        let reply = reply.clone();
        Closure::once(move |error: GeolocationPositionError| {
            answer(&reply, Err(GeolocationError::Failed(error.message())));
        })
    };

    geolocation
        .get_current_position_with_error_callback(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
        )
        .map_err(|e| {
            GeolocationError::Failed(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
        })?;

    // Both closures must outlive the request.
    let result = rx.await.unwrap_or(Err(GeolocationError::Abandoned));
    drop((on_success, on_error));
    result
}
