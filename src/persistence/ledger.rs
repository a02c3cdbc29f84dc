//! Remote score ledger seam
//!
//! The contract side of best-score persistence: read a player's score,
//! submit a new one, wait for it to land, and watch score events. Every
//! call is async and fallible. Futures are not `Send`: the browser host is
//! single-threaded.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use thiserror::Error;

use crate::highscores::PlayerId;

/// A score recorded on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEvent {
    pub player: PlayerId,
    pub score: u32,
}

/// Handle to a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHandle {
    pub hash: String,
}

/// Final state of a mined transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Success,
    Failed { status: u8 },
}

/// Ledger failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("transaction rejected by the user")]
    Rejected,

    #[error("insufficient funds for fees")]
    InsufficientFunds,

    #[error("contract reverted: {reason}")]
    Reverted { reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

impl LedgerError {
    /// Text for the save-status line
    pub fn user_message(&self) -> String {
        match self {
            LedgerError::Rejected => "Transaction was rejected in wallet.".to_string(),
            LedgerError::InsufficientFunds => {
                "Not enough funds to pay for transaction fees.".to_string()
            }
            LedgerError::Reverted { reason } => {
                format!("Failed to save score to the ledger. Reason: {}", reason)
            }
            LedgerError::Network(details) | LedgerError::Unavailable(details) => {
                format!("Failed to save score to the ledger. Details: {}", details)
            }
        }
    }
}

/// Remote score ledger, bound to the connected player's signer
#[async_trait(?Send)]
pub trait ScoreLedger {
    /// Address transactions are signed with
    fn player(&self) -> &PlayerId;

    async fn read_score(&self, player: &PlayerId) -> Result<u32, LedgerError>;

    async fn submit_score(&self, value: u32) -> Result<TxHandle, LedgerError>;

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<Confirmation, LedgerError>;

    /// Live feed of score events from every player
    fn subscribe(&self) -> UnboundedReceiver<ScoreEvent>;

    /// Events from the last `window` blocks, oldest first
    async fn query_recent_score_events(&self, window: u64) -> Result<Vec<ScoreEvent>, LedgerError>;
}

#[derive(Default)]
struct Book {
    /// Keyed by lowercase address
    scores: HashMap<String, u32>,
    events: Vec<ScoreEvent>,
    pending: HashMap<String, u32>,
    next_tx: u64,
    subscribers: Vec<UnboundedSender<ScoreEvent>>,
    fail_next_submit: Option<LedgerError>,
    fail_next_confirmation: Option<Result<Confirmation, LedgerError>>,
    unavailable: bool,
}

impl Book {
    fn record(&mut self, event: ScoreEvent) {
        self.scores
            .insert(event.player.as_str().to_ascii_lowercase(), event.score);
        self.events.push(event.clone());
        self.subscribers
            .retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    fn check_available(&self) -> Result<(), LedgerError> {
        if self.unavailable {
            Err(LedgerError::Unavailable("node not reachable".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Ledger kept in memory: one score per player, one event per confirmed
/// submission. Failures can be scripted for the next call.
pub struct InMemoryLedger {
    player: PlayerId,
    book: RefCell<Book>,
}

impl InMemoryLedger {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            book: RefCell::new(Book::default()),
        }
    }

    /// Record a score from another session (notifies subscribers)
    pub fn record_external(&self, player: PlayerId, score: u32) {
        self.book.borrow_mut().record(ScoreEvent { player, score });
    }

    /// Make the next `submit_score` fail
    pub fn fail_next_submit(&self, error: LedgerError) {
        self.book.borrow_mut().fail_next_submit = Some(error);
    }

    /// Replace the outcome of the next `await_confirmation`
    pub fn fail_next_confirmation(&self, outcome: Result<Confirmation, LedgerError>) {
        self.book.borrow_mut().fail_next_confirmation = Some(outcome);
    }

    /// Make reads, submissions and queries fail until cleared
    pub fn set_unavailable(&self, unavailable: bool) {
        self.book.borrow_mut().unavailable = unavailable;
    }

    pub fn event_count(&self) -> usize {
        self.book.borrow().events.len()
    }
}

#[async_trait(?Send)]
impl ScoreLedger for InMemoryLedger {
    fn player(&self) -> &PlayerId {
        &self.player
    }

    async fn read_score(&self, player: &PlayerId) -> Result<u32, LedgerError> {
        let book = self.book.borrow();
        book.check_available()?;
        Ok(book
            .scores
            .get(&player.as_str().to_ascii_lowercase())
            .copied()
            .unwrap_or(0))
    }

    async fn submit_score(&self, value: u32) -> Result<TxHandle, LedgerError> {
        let mut book = self.book.borrow_mut();
        book.check_available()?;
        if let Some(err) = book.fail_next_submit.take() {
            return Err(err);
        }
        book.next_tx += 1;
        let hash = format!("0x{:064x}", book.next_tx);
        book.pending.insert(hash.clone(), value);
        log::debug!("Submitted score {} in {}", value, hash);
        Ok(TxHandle { hash })
    }

    async fn await_confirmation(&self, handle: &TxHandle) -> Result<Confirmation, LedgerError> {
        let mut book = self.book.borrow_mut();
        let Some(value) = book.pending.remove(&handle.hash) else {
            return Err(LedgerError::Network(format!(
                "unknown transaction {}",
                handle.hash
            )));
        };
        if let Some(outcome) = book.fail_next_confirmation.take() {
            return outcome;
        }
        let player = self.player.clone();
        book.record(ScoreEvent {
            player,
            score: value,
        });
        Ok(Confirmation::Success)
    }

    fn subscribe(&self) -> UnboundedReceiver<ScoreEvent> {
        let (tx, rx) = unbounded();
        self.book.borrow_mut().subscribers.push(tx);
        rx
    }

    async fn query_recent_score_events(&self, window: u64) -> Result<Vec<ScoreEvent>, LedgerError> {
        let book = self.book.borrow();
        book.check_available()?;
        let window = usize::try_from(window).unwrap_or(usize::MAX);
        let start = book.events.len().saturating_sub(window);
        Ok(book.events[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use futures::executor::block_on;

    fn me() -> PlayerId {
        PlayerId::new("0xMe00000000000000000000000000000000000001")
    }

    #[test]
    fn test_submit_then_confirm_records_score() {
        let ledger = InMemoryLedger::new(me());
        block_on(async {
            assert_eq!(ledger.read_score(&me()).await, Ok(0));
            let tx = ledger.submit_score(17).await.unwrap();
            // Not visible until confirmed
            assert_eq!(ledger.read_score(&me()).await, Ok(0));
            assert_eq!(ledger.await_confirmation(&tx).await, Ok(Confirmation::Success));
            assert_eq!(ledger.read_score(&me()).await, Ok(17));
            // Lookup ignores address case
            let lower = PlayerId::new(me().as_str().to_ascii_lowercase());
            assert_eq!(ledger.read_score(&lower).await, Ok(17));
        });
        assert_eq!(ledger.event_count(), 1);
    }

    #[test]
    fn test_subscribers_see_every_event() {
        let ledger = InMemoryLedger::new(me());
        let mut feed = ledger.subscribe();
        ledger.record_external(PlayerId::new("0xother"), 9);
        block_on(async {
            let tx = ledger.submit_score(4).await.unwrap();
            ledger.await_confirmation(&tx).await.unwrap();
            assert_eq!(feed.next().await.map(|e| e.score), Some(9));
            assert_eq!(feed.next().await.map(|e| e.player), Some(me()));
        });
    }

    #[test]
    fn test_scripted_failures() {
        let ledger = InMemoryLedger::new(me());
        block_on(async {
            ledger.fail_next_submit(LedgerError::Rejected);
            assert_eq!(ledger.submit_score(3).await, Err(LedgerError::Rejected));

            let tx = ledger.submit_score(3).await.unwrap();
            ledger.fail_next_confirmation(Ok(Confirmation::Failed { status: 0 }));
            assert_eq!(
                ledger.await_confirmation(&tx).await,
                Ok(Confirmation::Failed { status: 0 })
            );
            assert_eq!(ledger.read_score(&me()).await, Ok(0));

            ledger.set_unavailable(true);
            assert!(matches!(
                ledger.query_recent_score_events(10).await,
                Err(LedgerError::Unavailable(_))
            ));
        });
    }

    #[test]
    fn test_query_window() {
        let ledger = InMemoryLedger::new(me());
        for i in 0..5 {
            ledger.record_external(PlayerId::new(format!("0x{}", i)), i);
        }
        let recent = block_on(ledger.query_recent_score_events(2)).unwrap();
        let scores: Vec<u32> = recent.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![3, 4]);
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            LedgerError::Rejected.user_message(),
            "Transaction was rejected in wallet."
        );
        assert!(
            LedgerError::Reverted {
                reason: "score too low".into()
            }
            .user_message()
            .ends_with("Reason: score too low")
        );
        assert!(
            LedgerError::Network("timeout".into())
                .user_message()
                .contains("Details: timeout")
        );
    }
}
