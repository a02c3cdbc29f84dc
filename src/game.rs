//! Game session
//!
//! Owns everything one play session needs: simulation state, tuning, sprite
//! sizes, RNG, input latch and the frame driver. Hosts hold a `Game`, feed it
//! input, call `frame` once per animation frame, and paint the draw list it
//! returns.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::persistence::BestScore;
use crate::platform::{FrameDriver, JumpLatch, LoopControl};
use crate::renderer::{DrawList, SpriteSheet, render};
use crate::settings::{Settings, Tuning};
use crate::sim::{Collision, GameState, SessionState, TickInput, TickOutcome, tick};

/// Result of one animation frame
#[derive(Debug, Clone)]
pub struct Frame {
    pub draw: DrawList,
    pub control: LoopControl,
    /// Final score, reported on the frame the session ended and never again
    pub game_over: Option<u32>,
}

pub struct Game {
    state: GameState,
    tuning: Tuning,
    sprites: SpriteSheet,
    rng: Pcg32,
    input: JumpLatch,
    driver: FrameDriver,
    best: BestScore,
    last_collision: Option<Collision>,
}

impl Game {
    /// New session in `NotStarted`. `best` is the displayed best-score
    /// handle, usually `ScoreBridge::best()`.
    pub fn new(tuning: Tuning, sprites: SpriteSheet, seed: u64, best: BestScore) -> Self {
        let state = GameState::new(&tuning, sprites.bird);
        log::info!("Game created with seed {}", seed);
        Self {
            state,
            tuning,
            sprites,
            rng: Pcg32::seed_from_u64(seed),
            input: JumpLatch::new(),
            driver: FrameDriver::new(),
            best,
            last_collision: None,
        }
    }

    /// Like `new`, taking tuning and seed from settings; `fallback_seed` is
    /// used when the settings don't pin one
    pub fn from_settings(
        settings: &Settings,
        sprites: SpriteSheet,
        fallback_seed: u64,
        best: BestScore,
    ) -> Self {
        let seed = settings.rng_seed.unwrap_or(fallback_seed);
        Self::new(settings.tuning.clone(), sprites, seed, best)
    }

    /// Begin play without a jump impulse. Returns true when the host must
    /// schedule the first animation frame.
    pub fn start(&mut self) -> bool {
        match self.state.session {
            SessionState::NotStarted => {
                self.state.session = SessionState::Running;
                log::info!("Session started");
                self.driver.activate()
            }
            SessionState::Running => false,
            SessionState::Over => {
                log::debug!("Ignoring start on a finished session (reset first)");
                false
            }
        }
    }

    /// Request a jump. Before the first tick this also starts the session;
    /// the jump then applies on the first tick. Ignored once the session is
    /// over. Returns true when the host must schedule the first animation
    /// frame.
    pub fn submit_jump(&mut self) -> bool {
        match self.state.session {
            SessionState::Over => false,
            SessionState::NotStarted => {
                self.input.press();
                self.start()
            }
            SessionState::Running => {
                self.input.press();
                false
            }
        }
    }

    /// Back to `NotStarted` with the bird at its start position. The best
    /// score and bird size survive.
    pub fn reset(&mut self) {
        self.state.reset(&self.tuning);
        self.input.clear();
        self.last_collision = None;
        log::info!("Session reset");
    }

    pub fn session_state(&self) -> SessionState {
        self.state.session
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn best_score(&self) -> u32 {
        self.best.get()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// What ended the last session, if it is over
    pub fn last_collision(&self) -> Option<Collision> {
        self.last_collision
    }

    pub fn is_looping(&self) -> bool {
        self.driver.is_active()
    }

    /// Run exactly one simulation tick. Returns the final score on the tick
    /// that ends the session.
    pub fn step(&mut self) -> Option<u32> {
        let input = TickInput {
            jump: self.input.take(),
        };
        match tick(&mut self.state, &input, &self.tuning, &mut self.rng) {
            TickOutcome::GameOver(hit) => {
                let score = self.state.score;
                log::info!("Game over: {} with score {}", hit.describe(), score);
                if self.best.set_best_score_if_higher(score) {
                    log::info!("New best score {}", score);
                }
                self.last_collision = Some(hit);
                Some(score)
            }
            TickOutcome::Continue | TickOutcome::Idle => None,
        }
    }

    /// One animation frame: one tick while the loop is active, then render,
    /// and tell the host whether to keep looping
    pub fn frame(&mut self) -> Frame {
        let game_over = if self.driver.begin_frame() {
            self.step()
        } else {
            None
        };

        let draw = self.draw();
        let control = self.driver.end_frame(self.state.is_running());
        if control == LoopControl::Stop {
            log::debug!("Frame loop stopped ({})", self.state.session.as_str());
        }
        Frame {
            draw,
            control,
            game_over,
        }
    }

    /// Draw list for the current state without advancing anything
    pub fn draw(&self) -> DrawList {
        render(&self.state, &self.tuning, &self.sprites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::DrawCommand;

    fn game() -> Game {
        Game::new(Tuning::default(), SpriteSheet::default(), 42, BestScore::default())
    }

    /// Tuning where nothing can go wrong: no gravity, pipes never spawn
    fn calm() -> Tuning {
        Tuning {
            gravity: 0.0,
            first_pipe_delay: u32::MAX,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_start_schedules_one_loop() {
        let mut game = game();
        assert_eq!(game.session_state(), SessionState::NotStarted);
        assert!(game.start());
        assert!(!game.start());
        assert!(!game.submit_jump());
        assert_eq!(game.session_state(), SessionState::Running);
        assert!(game.is_looping());
    }

    #[test]
    fn test_start_has_no_impulse() {
        let mut game = game();
        game.start();
        game.step();
        assert_eq!(game.state().bird.speed, 0.25);
        assert_eq!(game.state().bird.pos.y, 250.25);
    }

    #[test]
    fn test_first_jump_starts_and_applies_on_first_tick() {
        let mut game = game();
        assert!(game.submit_jump());
        assert_eq!(game.session_state(), SessionState::Running);
        game.step();
        assert_eq!(game.state().bird.speed, -6.25);
    }

    #[test]
    fn test_jumps_collapse_within_a_tick() {
        let mut game = Game::new(calm(), SpriteSheet::default(), 1, BestScore::default());
        game.start();
        game.submit_jump();
        game.submit_jump();
        game.step();
        assert_eq!(game.state().bird.speed, -6.5);
        game.step();
        // Second tick has no latched jump left
        assert_eq!(game.state().bird.speed, -6.5);
        assert_eq!(game.state().bird.pos.y, 250.0 - 13.0);
    }

    #[test]
    fn test_game_over_reported_once_and_loop_stops() {
        let mut game = game();
        game.start();

        let mut reports = Vec::new();
        let mut last = LoopControl::Continue;
        for _ in 0..200 {
            let frame = game.frame();
            if let Some(score) = frame.game_over {
                reports.push(score);
            }
            last = frame.control;
            if last == LoopControl::Stop {
                break;
            }
        }

        assert_eq!(reports, vec![0]);
        assert_eq!(last, LoopControl::Stop);
        assert_eq!(game.session_state(), SessionState::Over);
        assert_eq!(game.last_collision(), Some(Collision::Ground));
        assert!(!game.is_looping());

        // Further frames and input change nothing
        let frame = game.frame();
        assert_eq!(frame.game_over, None);
        assert_eq!(frame.control, LoopControl::Stop);
        assert!(!game.submit_jump());
        assert!(!game.start());
    }

    #[test]
    fn test_every_frame_runs_one_tick() {
        let mut game = Game::new(calm(), SpriteSheet::default(), 5, BestScore::default());
        game.start();
        // Frame pacing is the host's business; each call is exactly one tick
        for expected in 1..=5 {
            let frame = game.frame();
            assert_eq!(frame.control, LoopControl::Continue);
            assert_eq!(game.state().frames, expected);
        }
    }

    #[test]
    fn test_frames_while_not_started_stop() {
        let mut game = game();
        let frame = game.frame();
        assert_eq!(frame.control, LoopControl::Stop);
        assert!(frame.draw.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "to Start"
        )));
        assert_eq!(game.state().frames, 0);
    }

    #[test]
    fn test_reset_keeps_best_and_allows_new_session() {
        let best = BestScore::new(5);
        let mut game = Game::new(Tuning::default(), SpriteSheet::default(), 3, best.clone());
        game.start();
        while game.frame().control == LoopControl::Continue {}
        assert_eq!(game.session_state(), SessionState::Over);

        game.reset();
        assert_eq!(game.session_state(), SessionState::NotStarted);
        assert_eq!(game.score(), 0);
        assert_eq!(game.best_score(), 5);
        assert_eq!(game.last_collision(), None);
        assert_eq!(game.state().bird.size, SpriteSheet::default().bird);

        // The loop stopped at game over, so a new one is needed
        assert!(game.submit_jump());
    }

    #[test]
    fn test_reset_mid_run_reuses_running_loop() {
        let mut game = Game::new(calm(), SpriteSheet::default(), 3, BestScore::default());
        assert!(game.start());
        game.frame();
        game.reset();
        // The scheduled frame is still pending; don't start a second loop
        assert!(!game.submit_jump());
        assert_eq!(game.frame().control, LoopControl::Continue);
    }

    #[test]
    fn test_best_score_raised_at_game_over() {
        let best = BestScore::new(0);
        let mut game = Game::new(Tuning::default(), SpriteSheet::default(), 9, best.clone());
        game.start();
        game.state.score = 4;
        let mut result = None;
        while result.is_none() {
            result = game.step();
        }
        assert_eq!(result, Some(4));
        assert_eq!(best.get(), 4);
    }

    #[test]
    fn test_same_seed_same_pipes() {
        let run = |seed| {
            let mut game = Game::new(calm(), SpriteSheet::default(), seed, BestScore::default());
            game.tuning.first_pipe_delay = 1;
            game.start();
            for _ in 0..130 {
                game.step();
            }
            game.state().pipes.clone()
        };
        assert_eq!(run(11), run(11));
        assert!(!run(11).is_empty());
    }

    #[test]
    fn test_settings_seed_wins() {
        let mut settings = Settings {
            rng_seed: Some(77),
            ..Settings::default()
        };
        settings.tuning = calm();
        settings.tuning.first_pipe_delay = 1;
        settings.tuning.pipe_interval = 2;

        let mut a = Game::from_settings(&settings, SpriteSheet::default(), 1, BestScore::default());
        let mut b = Game::from_settings(&settings, SpriteSheet::default(), 2, BestScore::default());
        for game in [&mut a, &mut b] {
            game.start();
            for _ in 0..9 {
                game.step();
            }
        }
        assert_eq!(a.state().pipes.len(), 5);
        assert_eq!(a.state(), b.state());
    }
}
