//! Key-value persistence
//!
//! Backed by LocalStorage on wasm. Native builds have no store: reads find
//! nothing and writes are dropped.

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

/// Stored value for `key`, if any
#[cfg(target_arch = "wasm32")]
pub fn read(key: &str) -> Option<String> {
    let Some(storage) = local_storage() else {
        log::warn!("LocalStorage unavailable, {key} will not persist");
        return None;
    };
    storage.get_item(key).ok().flatten()
}

/// Store `value` under `key`; failures are logged and otherwise ignored
#[cfg(target_arch = "wasm32")]
pub fn write(key: &str, value: &str) -> bool {
    let Some(storage) = local_storage() else {
        log::warn!("LocalStorage unavailable, {key} not saved");
        return false;
    };
    if storage.set_item(key, value).is_err() {
        log::warn!("Failed to write {key}");
        return false;
    }
    true
}

#[cfg(not(target_arch = "wasm32"))]
pub fn read(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn write(_key: &str, _value: &str) -> bool {
    false
}
