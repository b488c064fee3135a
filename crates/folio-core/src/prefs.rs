//! Visitor preference store.
//!
//! Preferences such as the UI theme or preferred language live in a key-value
//! map that is handed to whoever needs it. Writes are batched: the first `set`
//! after a flush schedules one, and every change made before it fires goes out
//! in the same backend write. Backend writes run on the blocking pool and are
//! serialized, so the newest snapshot is always the last one written.

use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Preference key for the UI theme.
pub const THEME_KEY: &str = "uiStyle";

/// Preference key for the preferred post language.
pub const LANG_KEY: &str = "lang";

/// Default delay between the first change and the flush.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1);

/// Preference store errors.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored preferences are not a JSON object.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for preference operations.
pub type Result<T> = std::result::Result<T, PrefsError>;

/// Snapshot of all preferences.
pub type PrefMap = BTreeMap<String, Value>;

/// Where preferences are persisted.
pub trait PrefsBackend: Send + Sync + 'static {
    /// Read the stored map.
    fn load(&self) -> Result<PrefMap>;

    /// Replace the stored map.
    fn save(&self, prefs: &PrefMap) -> Result<()>;
}

/// Backend that keeps the last saved map in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<PrefMap>,
    writes: AtomicUsize,
}

impl MemoryBackend {
    /// Create a backend pre-populated with `prefs`.
    #[must_use]
    pub fn with_prefs(prefs: PrefMap) -> Self {
        Self {
            saved: Mutex::new(prefs),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Last saved map.
    pub fn saved(&self) -> PrefMap {
        lock(&self.saved).clone()
    }
}

impl PrefsBackend for MemoryBackend {
    fn load(&self) -> Result<PrefMap> {
        Ok(lock(&self.saved).clone())
    }

    fn save(&self, prefs: &PrefMap) -> Result<()> {
        *lock(&self.saved) = prefs.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend storing one JSON object in a file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend for `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PrefsBackend for JsonFileBackend {
    fn load(&self) -> Result<PrefMap> {
        if !self.path.exists() {
            return Ok(PrefMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, prefs: &PrefMap) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(prefs)?)?;
        Ok(())
    }
}

impl<B: PrefsBackend + ?Sized> PrefsBackend for Box<B> {
    fn load(&self) -> Result<PrefMap> {
        (**self).load()
    }

    fn save(&self, prefs: &PrefMap) -> Result<()> {
        (**self).save(prefs)
    }
}

struct Inner<B> {
    backend: B,
    values: Mutex<PrefMap>,
    /// Held from snapshot to save.
    flush_lock: Mutex<()>,
    flush_scheduled: AtomicBool,
    debounce: Duration,
}

impl<B: PrefsBackend> Inner<B> {
    fn flush(&self) {
        let _flushing = lock(&self.flush_lock);
        let snapshot = lock(&self.values).clone();
        match self.backend.save(&snapshot) {
            Ok(()) => debug!(keys = snapshot.len(), "preferences flushed"),
            Err(e) => warn!(error = %e, "failed to persist preferences"),
        }
    }
}

/// Shared handle to the preference store.
pub struct Preferences<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for Preferences<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B> std::fmt::Debug for Preferences<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("debounce", &self.inner.debounce)
            .finish_non_exhaustive()
    }
}

impl<B: PrefsBackend> Preferences<B> {
    /// Open the store with the default debounce.
    pub fn new(backend: B) -> Self {
        Self::with_debounce(backend, DEFAULT_DEBOUNCE)
    }

    /// Open the store. Unreadable stored data starts an empty store.
    pub fn with_debounce(backend: B, debounce: Duration) -> Self {
        let values = backend.load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable preferences");
            PrefMap::new()
        });

        Self {
            inner: Arc::new(Inner {
                backend,
                values: Mutex::new(values),
                flush_lock: Mutex::new(()),
                flush_scheduled: AtomicBool::new(false),
                debounce,
            }),
        }
    }

    /// Read a preference.
    pub fn get(&self, key: &str) -> Option<Value> {
        lock(&self.inner.values).get(key).cloned()
    }

    /// Read a string preference.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// All preferences.
    pub fn snapshot(&self) -> PrefMap {
        lock(&self.inner.values).clone()
    }

    /// Set a preference; `Value::Null` removes it.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        {
            let mut values = lock(&self.inner.values);
            if value.is_null() {
                values.remove(&key);
            } else {
                values.insert(key, value);
            }
        }
        self.schedule_flush();
    }

    /// Remove a preference.
    pub fn remove(&self, key: &str) {
        self.set(key, Value::Null);
    }

    /// Write the current state immediately.
    pub fn flush_now(&self) {
        self.inner.flush();
    }

    /// Backend in use.
    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    fn schedule_flush(&self) {
        if self.inner.flush_scheduled.swap(true, Ordering::SeqCst) {
            return;
        }

        let inner = Arc::clone(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(inner.debounce).await;
                    inner.flush_scheduled.store(false, Ordering::SeqCst);
                    if let Err(e) = tokio::task::spawn_blocking(move || inner.flush()).await {
                        warn!(error = %e, "preference flush task failed");
                    }
                });
            }
            Err(_) => {
                inner.flush_scheduled.store(false, Ordering::SeqCst);
                inner.flush();
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
