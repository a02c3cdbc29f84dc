//! Best-score persistence
//!
//! - `best`: monotonic best-score cell shared across the frame loop and
//!   ledger futures
//! - `cache`: local best-score cache (LocalStorage / file / memory)
//! - `ledger`: async remote score ledger trait plus an in-memory ledger
//! - `bridge`: what happens to a score once a session ends

pub mod best;
pub mod bridge;
pub mod cache;
pub mod ledger;

pub use best::BestScore;
pub use bridge::{SaveStatus, ScoreBridge, StatusTone};
pub use cache::{BestScoreCache, MemoryCache, load_best};
#[cfg(not(target_arch = "wasm32"))]
pub use cache::FileCache;
#[cfg(target_arch = "wasm32")]
pub use cache::LocalStorageCache;
pub use ledger::{Confirmation, InMemoryLedger, LedgerError, ScoreEvent, ScoreLedger, TxHandle};
