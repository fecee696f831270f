use crate::error::StorageError;
use crate::host::HostStore;
use std::borrow::Cow;
use wasm_bindgen::JsValue;

/// The page's `window.localStorage`.
///
/// Only available on `wasm32` with the `browser` feature. The handle is not `Send`; browser
/// storage is single-threaded.
#[derive(Debug, Clone)]
pub struct BrowserStore {
    storage: web_sys::Storage,
}

impl BrowserStore {
    /// Binds to `window.localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::StoreUnavailable`] when there is no window (e.g. inside a worker)
    /// or the browser refuses access to `localStorage`.
    pub fn local() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::StoreUnavailable {
            message: "no global window".into(),
            context: Some("localStorage requires a browser window".into()),
        })?;

        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::StoreUnavailable {
                message: "window.localStorage is not supported".into(),
                context: None,
            }),
            Err(err) => Err(StorageError::StoreUnavailable {
                message: describe(&err),
                context: Some("Access to window.localStorage was denied".into()),
            }),
        }
    }
}

fn describe(err: &JsValue) -> Cow<'static, str> {
    err.as_string().unwrap_or_else(|| format!("{err:?}")).into()
}

fn backend(op: &'static str) -> impl FnOnce(JsValue) -> StorageError {
    move |err| StorageError::Backend { message: describe(&err), context: Some(op.into()) }
}

impl HostStore for BrowserStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(backend("localStorage.getItem"))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(backend("localStorage.setItem"))
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(backend("localStorage.removeItem"))
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage.clear().map_err(backend("localStorage.clear"))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let len = self.storage.length().map_err(backend("localStorage.length"))?;
        let mut keys = Vec::with_capacity(usize::try_from(len).unwrap_or_default());
        for idx in 0..len {
            if let Some(key) = self.storage.key(idx).map_err(backend("localStorage.key"))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
