//! Local best-score cache
//!
//! LocalStorage in the browser, a small text file natively, memory in tests.
//! An absent or unparsable value reads as "no best score yet".

use std::cell::Cell;

/// Local persistent best score
pub trait BestScoreCache {
    fn get(&self) -> Option<u32>;
    fn set(&self, score: u32);
}

/// Cached best score, treating absent values as zero
pub fn load_best(cache: &dyn BestScoreCache) -> u32 {
    cache.get().unwrap_or(0)
}

fn parse_score(raw: &str) -> Option<u32> {
    raw.trim().parse().ok()
}

/// In-memory cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    value: Cell<Option<u32>>,
}

impl MemoryCache {
    pub fn new(initial: Option<u32>) -> Self {
        Self {
            value: Cell::new(initial),
        }
    }
}

impl BestScoreCache for MemoryCache {
    fn get(&self) -> Option<u32> {
        self.value.get()
    }

    fn set(&self, score: u32) {
        self.value.set(Some(score));
    }
}

/// Browser LocalStorage cache
#[cfg(target_arch = "wasm32")]
pub struct LocalStorageCache {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorageCache {
    pub const DEFAULT_KEY: &'static str = "skyward_best_score";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl BestScoreCache for LocalStorageCache {
    fn get(&self) -> Option<u32> {
        let raw = Self::storage()?.get_item(&self.key).ok()??;
        let parsed = parse_score(&raw);
        if parsed.is_none() {
            log::warn!("Ignoring unreadable best score {:?}", raw);
        }
        parsed
    }

    fn set(&self, score: u32) {
        if let Some(storage) = Self::storage() {
            let _ = storage.set_item(&self.key, &score.to_string());
            log::info!("Best score cached ({})", score);
        }
    }
}

/// Plain-text file cache for native hosts
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileCache {
    path: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileCache {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl BestScoreCache for FileCache {
    fn get(&self) -> Option<u32> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let parsed = parse_score(&raw);
        if parsed.is_none() {
            log::warn!("Ignoring unreadable best score in {}", self.path.display());
        }
        parsed
    }

    fn set(&self, score: u32) {
        if let Err(e) = std::fs::write(&self.path, score.to_string()) {
            log::warn!("Could not cache best score in {}: {}", self.path.display(), e);
        }
    }
}
