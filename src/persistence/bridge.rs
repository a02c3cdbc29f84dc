//! Score bridge
//!
//! Glue between finished sessions and wherever best scores live. Offline it
//! only touches the local cache. With a ledger it checks the player's stored
//! score, submits a higher one and tracks the transaction, keeping the
//! leaderboard and global top score in step with inbound score events.
//!
//! Nothing here blocks the frame loop: hosts spawn the returned futures.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc::UnboundedReceiver;

use super::best::BestScore;
use super::cache::{BestScoreCache, load_best};
use super::ledger::{Confirmation, LedgerError, ScoreEvent, ScoreLedger, TxHandle};
use crate::consts::SCORE_EVENT_WINDOW;
use crate::highscores::{Leaderboard, LeaderboardView, PlayerId, max_event_score};
use crate::settings::NetworkConfig;

/// Progress of saving a finished session's score
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Checking,
    NotHigher,
    CheckFailed,
    Saving,
    SubmitFailed(LedgerError),
    Pending { tx: TxHandle },
    Saved { tx: TxHandle },
    Reverted { tx: TxHandle, status: u8 },
    ConfirmationUnknown { tx: TxHandle },
}

/// How a status line should look
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Info,
    Waiting,
    Success,
    Failure,
}

impl StatusTone {
    /// CSS color for the status line
    pub fn color(self) -> &'static str {
        match self {
            StatusTone::Info => "#ffffff",
            StatusTone::Waiting => "#ffff77",
            StatusTone::Success => "#00ff00",
            StatusTone::Failure => "#ff7777",
        }
    }
}

impl SaveStatus {
    pub fn tone(&self) -> StatusTone {
        match self {
            SaveStatus::Checking | SaveStatus::NotHigher | SaveStatus::Saving => StatusTone::Info,
            SaveStatus::Pending { .. } | SaveStatus::ConfirmationUnknown { .. } => {
                StatusTone::Waiting
            }
            SaveStatus::Saved { .. } => StatusTone::Success,
            SaveStatus::CheckFailed
            | SaveStatus::SubmitFailed(_)
            | SaveStatus::Reverted { .. } => StatusTone::Failure,
        }
    }

    /// Explorer link for the transaction, when there is one
    pub fn link(&self, network: &NetworkConfig) -> Option<String> {
        match self {
            SaveStatus::Pending { tx }
            | SaveStatus::Saved { tx }
            | SaveStatus::Reverted { tx, .. }
            | SaveStatus::ConfirmationUnknown { tx } => Some(network.tx_url(&tx.hash)),
            _ => None,
        }
    }
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveStatus::Checking => f.write_str("Checking your best score..."),
            SaveStatus::NotHigher => {
                f.write_str("Your current score is not higher than your best score on the ledger.")
            }
            SaveStatus::CheckFailed => {
                f.write_str("Error checking your current score on the ledger.")
            }
            SaveStatus::Saving => f.write_str("Saving score to the ledger..."),
            SaveStatus::SubmitFailed(err) => f.write_str(&err.user_message()),
            SaveStatus::Pending { .. } => {
                f.write_str("Transaction sent... Waiting for confirmation.")
            }
            SaveStatus::Saved { .. } => f.write_str("Score saved on the ledger!"),
            SaveStatus::Reverted { status, .. } => {
                write!(f, "Transaction failed on the ledger (Status: {}).", status)
            }
            SaveStatus::ConfirmationUnknown { .. } => {
                f.write_str("Transaction sent but confirmation failed.")
            }
        }
    }
}

/// Drops overlapping entries instead of queueing them
#[derive(Debug, Default)]
struct BusyFlag(Cell<bool>);

impl BusyFlag {
    fn try_enter(&self) -> Option<BusyGuard<'_>> {
        if self.0.replace(true) {
            None
        } else {
            Some(BusyGuard(&self.0))
        }
    }
}

struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

struct Remote {
    ledger: Rc<dyn ScoreLedger>,
    network: NetworkConfig,
}

/// Best-score persistence for one player
pub struct ScoreBridge {
    /// Shown in the HUD; raised as soon as a session ends
    best: BestScore,
    /// What the authority (ledger or cache) holds
    confirmed: BestScore,
    global_top: BestScore,
    cache: Box<dyn BestScoreCache>,
    remote: Option<Remote>,
    status: RefCell<Option<SaveStatus>>,
    leaderboard: RefCell<LeaderboardView>,
    event_busy: BusyFlag,
    leaderboard_busy: BusyFlag,
}

impl ScoreBridge {
    /// Play offline; the cache is the authority
    pub fn offline(cache: Box<dyn BestScoreCache>) -> Self {
        let cached = load_best(cache.as_ref());
        log::info!("Playing offline, cached best score {}", cached);
        Self {
            best: BestScore::new(cached),
            confirmed: BestScore::new(cached),
            global_top: BestScore::default(),
            cache,
            remote: None,
            status: RefCell::new(None),
            leaderboard: RefCell::new(LeaderboardView::Hidden),
            event_busy: BusyFlag::default(),
            leaderboard_busy: BusyFlag::default(),
        }
    }

    /// Persist to a ledger. The cached value seeds the display until
    /// `connect` reads the ledger.
    pub fn with_ledger(
        cache: Box<dyn BestScoreCache>,
        ledger: Rc<dyn ScoreLedger>,
        network: NetworkConfig,
    ) -> Self {
        let cached = load_best(cache.as_ref());
        Self {
            best: BestScore::new(cached),
            confirmed: BestScore::default(),
            global_top: BestScore::default(),
            cache,
            remote: Some(Remote { ledger, network }),
            status: RefCell::new(None),
            leaderboard: RefCell::new(LeaderboardView::Hidden),
            event_busy: BusyFlag::default(),
            leaderboard_busy: BusyFlag::default(),
        }
    }

    /// Displayed best score handle (shared with the game)
    pub fn best(&self) -> BestScore {
        self.best.clone()
    }

    pub fn best_score(&self) -> u32 {
        self.best.get()
    }

    pub fn confirmed_best(&self) -> u32 {
        self.confirmed.get()
    }

    pub fn global_top_score(&self) -> u32 {
        self.global_top.get()
    }

    pub fn status(&self) -> Option<SaveStatus> {
        self.status.borrow().clone()
    }

    pub fn leaderboard(&self) -> LeaderboardView {
        self.leaderboard.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.remote.is_some()
    }

    pub fn player(&self) -> Option<&PlayerId> {
        self.remote.as_ref().map(|r| r.ledger.player())
    }

    pub fn network(&self) -> Option<&NetworkConfig> {
        self.remote.as_ref().map(|r| &r.network)
    }

    /// Hide the status line (new session)
    pub fn clear_status(&self) {
        self.status.replace(None);
    }

    fn set_status(&self, status: SaveStatus) {
        log::debug!("Save status: {}", status);
        self.status.replace(Some(status));
    }

    /// Merge a finished score into the displayed best; offline this also
    /// updates the authority and the cache
    pub fn record_local(&self, score: u32) {
        self.best.set_best_score_if_higher(score);
        if self.remote.is_none() && self.confirmed.set_best_score_if_higher(score) {
            self.cache.set(score);
            log::info!("New best score {}", score);
        }
    }

    /// Everything that happens once a session is over
    pub async fn finish_session(&self, score: u32) -> Option<SaveStatus> {
        self.record_local(score);
        self.persist(score).await
    }

    /// Save `score` to the ledger if it beats the stored one. Returns the
    /// final status, or `None` when there was nothing to do.
    pub async fn persist(&self, score: u32) -> Option<SaveStatus> {
        let remote = self.remote.as_ref()?;
        if score == 0 {
            return None;
        }
        let ledger = remote.ledger.as_ref();

        self.set_status(SaveStatus::Checking);
        let stored = match ledger.read_score(ledger.player()).await {
            Ok(stored) => stored,
            Err(e) => {
                log::error!("Could not read stored score: {}", e);
                return Some(self.finish(SaveStatus::CheckFailed));
            }
        };
        self.confirmed.set_best_score_if_higher(stored);
        if score <= stored {
            return Some(self.finish(SaveStatus::NotHigher));
        }

        self.set_status(SaveStatus::Saving);
        let tx = match ledger.submit_score(score).await {
            Ok(tx) => tx,
            Err(e) => {
                log::error!("Score submission failed: {}", e);
                return Some(self.finish(SaveStatus::SubmitFailed(e)));
            }
        };
        log::info!("Score {} submitted in {}", score, tx.hash);
        self.set_status(SaveStatus::Pending { tx: tx.clone() });

        let status = match ledger.await_confirmation(&tx).await {
            Ok(Confirmation::Success) => {
                self.best.set_best_score_if_higher(score);
                self.confirmed.set_best_score_if_higher(score);
                self.global_top.set_best_score_if_higher(score);
                self.set_status(SaveStatus::Saved { tx: tx.clone() });
                self.refresh_leaderboard_data().await;
                SaveStatus::Saved { tx }
            }
            Ok(Confirmation::Failed { status }) => {
                log::error!("Transaction {} failed with status {}", tx.hash, status);
                SaveStatus::Reverted { tx, status }
            }
            Err(e) => {
                log::error!("Waiting for {} failed: {}", tx.hash, e);
                SaveStatus::ConfirmationUnknown { tx }
            }
        };
        Some(self.finish(status))
    }

    fn finish(&self, status: SaveStatus) -> SaveStatus {
        self.set_status(status.clone());
        status
    }

    /// Start a ledger session: load the player's stored best, the
    /// leaderboard and the global top, and subscribe to score events
    pub async fn connect(&self) -> Result<UnboundedReceiver<ScoreEvent>, LedgerError> {
        let Some(remote) = self.remote.as_ref() else {
            return Err(LedgerError::Unavailable("no ledger configured".to_string()));
        };
        let ledger = remote.ledger.as_ref();
        let stored = ledger.read_score(ledger.player()).await?;
        self.best.set_best_score_if_higher(stored);
        self.confirmed.set_best_score_if_higher(stored);
        log::info!(
            "Connected to {} as {}, stored best {}",
            remote.network.name,
            ledger.player().short(),
            stored
        );

        self.refresh_leaderboard_data().await;
        Ok(ledger.subscribe())
    }

    /// Apply one inbound score event. Returns false when the event was
    /// dropped because another one was still being handled.
    pub async fn handle_score_event(&self, event: ScoreEvent) -> bool {
        let Some(_busy) = self.event_busy.try_enter() else {
            log::debug!("Dropping score event from {} (busy)", event.player.short());
            return false;
        };

        self.global_top.set_best_score_if_higher(event.score);
        if event.score > 0 {
            self.refresh_leaderboard().await;
        }
        if self.player().is_some_and(|me| me.matches(&event.player)) {
            self.best.set_best_score_if_higher(event.score);
            self.confirmed.set_best_score_if_higher(event.score);
        }
        true
    }

    /// Consume the subscription until the ledger closes it
    pub async fn run_event_feed(&self, mut events: UnboundedReceiver<ScoreEvent>) {
        while let Some(event) = events.next().await {
            self.handle_score_event(event).await;
        }
        log::info!("Score event feed closed");
    }

    /// Rebuild the leaderboard from recent events. Returns false when skipped
    /// (offline, or a refresh is already running).
    pub async fn refresh_leaderboard(&self) -> bool {
        let Some(remote) = self.remote.as_ref() else {
            return false;
        };
        let Some(_busy) = self.leaderboard_busy.try_enter() else {
            log::debug!("Leaderboard refresh already running");
            return false;
        };

        match remote
            .ledger
            .query_recent_score_events(SCORE_EVENT_WINDOW)
            .await
        {
            Ok(events) => {
                let board = Leaderboard::from_events(&events);
                if let Some(top) = board.top_score() {
                    self.global_top.set_best_score_if_higher(top);
                }
                log::debug!("Leaderboard loaded ({} players)", board.entries.len());
                self.leaderboard.replace(LeaderboardView::Loaded(board));
            }
            Err(e) => {
                log::error!("Could not load leaderboard: {}", e);
                self.leaderboard.replace(LeaderboardView::Error);
            }
        }
        true
    }

    /// Highest score seen in recent events, merged into the global top
    pub async fn fetch_global_top_score(&self) -> Result<u32, LedgerError> {
        let Some(remote) = self.remote.as_ref() else {
            return Ok(self.global_top.get());
        };
        let events = remote
            .ledger
            .query_recent_score_events(SCORE_EVENT_WINDOW)
            .await?;
        self.global_top
            .set_best_score_if_higher(max_event_score(&events));
        Ok(self.global_top.get())
    }

    pub async fn refresh_leaderboard_data(&self) {
        self.refresh_leaderboard().await;
        if let Err(e) = self.fetch_global_top_score().await {
            log::error!("Could not fetch global top score: {}", e);
        }
    }
}
