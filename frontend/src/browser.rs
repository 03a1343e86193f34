use gloo_console::error;
use gloo_utils::window;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Position, PositionError, Storage};
use workout_tracker_lib::{
    storage::{KeyValueStorage, StorageError},
    workout::Coords,
};
use yew::Callback;

/// `window.localStorage`, if the browser grants access to it.
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    pub fn open() -> Self {
        let storage = window().local_storage().ok().flatten();
        if storage.is_none() {
            error!("localStorage is not available");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(|e| StorageError::Read {
            key: key.to_owned(),
            reason: js_reason(&e),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?.set_item(key, value).map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: js_reason(&e),
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?.remove_item(key).map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: js_reason(&e),
        })
    }
}

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// One-shot position request. Exactly one of the callbacks fires.
pub fn request_position(on_position: Callback<Coords>, on_error: Callback<String>) {
    let geolocation = match window().navigator().geolocation() {
        Ok(geolocation) => geolocation,
        Err(e) => {
            on_error.emit(js_reason(&e));
            return;
        }
    };

    let failed = on_error.clone();
    let success = Closure::once_into_js(move |position: Position| {
        let coords = position.coords();
        on_position.emit(Coords(coords.latitude(), coords.longitude()));
    });
    let failure = Closure::once_into_js(move |e: PositionError| {
        failed.emit(e.message());
    });

    if let Err(e) = geolocation.get_current_position_with_error_callback(success.unchecked_ref(), Some(failure.unchecked_ref())) {
        on_error.emit(js_reason(&e));
    }
}

pub fn alert(message: &str) {
    if window().alert_with_message(message).is_err() {
        error!(format!("Alert failed: {}", message));
    }
}

pub fn reload() {
    if let Err(e) = window().location().reload() {
        error!(format!("Reload failed: {}", js_reason(&e)));
    }
}
