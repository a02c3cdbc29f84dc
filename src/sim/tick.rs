//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. One call
//! is one tick: gravity and scroll speed are per tick, not per second.

use rand::Rng;

use super::collision::{Collision, bounds_collision, pipe_collision, score_pipe};
use super::state::{GameState, Pipe, SessionState};
use crate::consts::BIRD_FRAME_COUNT;
use crate::settings::Tuning;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Jump request latched since the previous tick
    pub jump: bool,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Session not running; nothing changed
    Idle,
    /// Simulation advanced and the bird is still alive
    Continue,
    /// This tick moved the session into `Over`
    GameOver(Collision),
}

/// Advance the game state by one fixed timestep
pub fn tick<R: Rng>(
    state: &mut GameState,
    input: &TickInput,
    tuning: &Tuning,
    rng: &mut R,
) -> TickOutcome {
    if state.session != SessionState::Running {
        return TickOutcome::Idle;
    }

    if input.jump {
        apply_jump(state, tuning);
    }

    // Bird physics
    state.frames += 1;
    state.bird.speed += tuning.gravity;
    state.bird.pos.y += state.bird.speed;
    state.bird.frame = bird_frame(state.frames, tuning.bird_anim_ticks);

    // Pipe generation
    state.pipe_timer += 1;
    if spawn_due(state.pipe_timer, tuning.first_pipe_delay, tuning.pipe_interval) {
        let gap_top = draw_gap_top(rng, tuning);
        state
            .pipes
            .push(Pipe::new(tuning.playfield_width, gap_top, tuning.pipe_gap));
    }

    advance_pipes(&mut state.pipes, tuning.pipe_speed, tuning.pipe_width);

    if let Some(hit) = bounds_collision(&state.bird, tuning.ground_line()) {
        state.session = SessionState::Over;
        return TickOutcome::GameOver(hit);
    }

    for (i, pipe) in state.pipes.iter_mut().enumerate() {
        if pipe_collision(&state.bird, pipe, tuning.pipe_width) {
            state.session = SessionState::Over;
            return TickOutcome::GameOver(Collision::Pipe(i));
        }
        if score_pipe(pipe, &state.bird, tuning.pipe_width) {
            state.score += 1;
        }
    }

    TickOutcome::Continue
}

/// Override the bird's velocity with the jump impulse
pub fn apply_jump(state: &mut GameState, tuning: &Tuning) {
    state.bird.speed = tuning.jump_speed;
}

/// Whether a pipe spawns on this value of the spawn timer
pub fn spawn_due(timer: u32, first_delay: u32, interval: u32) -> bool {
    timer == first_delay
        || (timer > first_delay && (timer - first_delay).is_multiple_of(interval))
}

/// Draw a gap top that keeps the whole gap clear of ceiling and ground
pub fn draw_gap_top<R: Rng>(rng: &mut R, tuning: &Tuning) -> f32 {
    let lo = tuning.gap_edge_clearance;
    let hi = tuning.ground_line() - tuning.pipe_gap - tuning.gap_edge_clearance;
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Scroll pipes left and drop those that have fully left the playfield
pub fn advance_pipes(pipes: &mut Vec<Pipe>, speed: f32, pipe_width: f32) {
    for pipe in pipes.iter_mut() {
        pipe.x -= speed;
    }
    pipes.retain(|p| p.x > -pipe_width);
}

/// Sprite frame for the given tick count
pub fn bird_frame(frames: u64, anim_ticks: u64) -> usize {
    ((frames / anim_ticks.max(1)) % BIRD_FRAME_COUNT as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn running_state(tuning: &Tuning) -> GameState {
        let mut state = GameState::new(tuning, Vec2::new(34.0, 24.0));
        state.session = SessionState::Running;
        state
    }

    /// Tuning where the bird floats and every gap swallows it
    fn hover_tuning() -> Tuning {
        Tuning {
            gravity: 0.0,
            pipe_gap: 400.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_first_tick_integrates_gravity() {
        let tuning = Tuning::default();
        let mut state = running_state(&tuning);
        let mut rng = Pcg32::seed_from_u64(1);

        let outcome = tick(&mut state, &TickInput::default(), &tuning, &mut rng);

        assert_eq!(outcome, TickOutcome::Continue);
        assert_eq!(state.bird.speed, 0.25);
        assert_eq!(state.bird.pos.y, 250.25);
        assert_eq!(state.bird.pos.x, 100.0);
    }

    #[test]
    fn test_jump_overrides_velocity() {
        let tuning = Tuning::default();
        let mut state = running_state(&tuning);
        state.bird.speed = 5.75;

        apply_jump(&mut state, &tuning);
        assert_eq!(state.bird.speed, -6.5);

        state.bird.speed = -3.0;
        apply_jump(&mut state, &tuning);
        assert_eq!(state.bird.speed, -6.5);
    }

    #[test]
    fn test_jump_then_gravity_in_same_tick() {
        let tuning = Tuning::default();
        let mut state = running_state(&tuning);
        state.bird.speed = 3.0;
        let mut rng = Pcg32::seed_from_u64(1);

        tick(&mut state, &TickInput { jump: true }, &tuning, &mut rng);

        assert_eq!(state.bird.speed, -6.25);
        assert_eq!(state.bird.pos.y, 250.0 - 6.25);
    }

    #[test]
    fn test_spawn_schedule() {
        let due: Vec<u32> = (1..=450).filter(|&t| spawn_due(t, 60, 120)).collect();
        assert_eq!(due, vec![60, 180, 300, 420]);
    }

    #[test]
    fn test_spawn_ticks_in_simulation() {
        let tuning = hover_tuning();
        let mut state = running_state(&tuning);
        let mut rng = Pcg32::seed_from_u64(7);
        let fresh_x = tuning.playfield_width - tuning.pipe_speed;

        let mut spawned_on = Vec::new();
        for t in 1..=450u32 {
            let before = state.pipes.len();
            let outcome = tick(&mut state, &TickInput::default(), &tuning, &mut rng);
            assert_ne!(outcome, TickOutcome::Idle);
            assert!(!state.is_over(), "bird died on tick {}", t);
            let fresh = state.pipes.iter().filter(|p| p.x == fresh_x).count();
            assert!(fresh <= 1);
            if fresh == 1 {
                assert!(state.pipes.len() >= before);
                spawned_on.push(t);
            }
        }
        assert_eq!(spawned_on, vec![60, 180, 300, 420]);
    }

    #[test]
    fn test_no_spawn_unless_running() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(3);

        let mut state = GameState::new(&tuning, Vec2::new(34.0, 24.0));
        for _ in 0..200 {
            assert_eq!(
                tick(&mut state, &TickInput::default(), &tuning, &mut rng),
                TickOutcome::Idle
            );
        }
        assert!(state.pipes.is_empty());
        assert_eq!(state.pipe_timer, 0);

        state.session = SessionState::Over;
        for _ in 0..200 {
            tick(&mut state, &TickInput { jump: true }, &tuning, &mut rng);
        }
        assert!(state.pipes.is_empty());
    }

    #[test]
    fn test_gap_stays_clear_of_edges() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..1000 {
            let top = draw_gap_top(&mut rng, &tuning);
            assert!(top >= tuning.gap_edge_clearance);
            assert!(top + tuning.pipe_gap <= tuning.ground_line() - tuning.gap_edge_clearance);
        }
    }

    #[test]
    fn test_pipes_scroll_and_leave() {
        let mut pipes = vec![
            Pipe::new(-50.0, 100.0, 180.0),
            Pipe::new(-47.0, 100.0, 180.0),
            Pipe::new(200.0, 100.0, 180.0),
        ];
        advance_pipes(&mut pipes, 4.0, 52.0);
        // -54 is gone, -51 stays, order preserved
        assert_eq!(pipes.len(), 2);
        assert_eq!(pipes[0].x, -51.0);
        assert_eq!(pipes[1].x, 196.0);

        // exactly -pipe_width is removed
        let mut pipes = vec![Pipe::new(-48.0, 100.0, 180.0)];
        advance_pipes(&mut pipes, 4.0, 52.0);
        assert!(pipes.is_empty());
    }

    #[test]
    fn test_scoring_once_across_ticks() {
        let tuning = hover_tuning();
        let mut state = running_state(&tuning);
        // Lands at x = 40 after this tick's scroll: 40 + 52 = 92 < 100
        state.pipes.push(Pipe::new(44.0, 50.0, 400.0));
        let mut rng = Pcg32::seed_from_u64(1);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        }
        assert_eq!(state.score, 1);
        assert!(state.pipes[0].scored);
    }

    #[test]
    fn test_score_stands_when_later_pipe_hits() {
        let tuning = Tuning {
            gravity: 0.0,
            ..Tuning::default()
        };
        let mut state = running_state(&tuning);
        state.pipes.push(Pipe::new(44.0, 200.0, 180.0));
        // Overlaps the bird, gap far below it
        state.pipes.push(Pipe::new(94.0, 300.0, 180.0));
        let mut rng = Pcg32::seed_from_u64(1);

        let outcome = tick(&mut state, &TickInput::default(), &tuning, &mut rng);

        assert_eq!(outcome, TickOutcome::GameOver(Collision::Pipe(1)));
        assert_eq!(state.score, 1);
        assert_eq!(state.session, SessionState::Over);
    }

    #[test]
    fn test_ground_ends_run() {
        let tuning = Tuning::default();
        let mut state = running_state(&tuning);
        state.bird.pos.y = tuning.ground_line() - 24.0;
        state.bird.speed = 2.0;
        let mut rng = Pcg32::seed_from_u64(1);

        let outcome = tick(&mut state, &TickInput::default(), &tuning, &mut rng);
        assert_eq!(outcome, TickOutcome::GameOver(Collision::Ground));
    }

    #[test]
    fn test_ceiling_ends_run() {
        let tuning = Tuning::default();
        let mut state = running_state(&tuning);
        state.bird.pos.y = 3.0;
        let mut rng = Pcg32::seed_from_u64(1);

        let outcome = tick(&mut state, &TickInput { jump: true }, &tuning, &mut rng);
        assert_eq!(outcome, TickOutcome::GameOver(Collision::Ceiling));
    }

    #[test]
    fn test_over_is_absorbing() {
        let tuning = Tuning::default();
        let mut state = running_state(&tuning);
        state.pipes.push(Pipe::new(300.0, 100.0, 180.0));
        state.session = SessionState::Over;
        let snapshot = state.clone();
        let mut rng = Pcg32::seed_from_u64(1);

        for _ in 0..50 {
            let outcome = tick(&mut state, &TickInput { jump: true }, &tuning, &mut rng);
            assert_eq!(outcome, TickOutcome::Idle);
        }
        assert_eq!(state, snapshot);
    }

    #[test]
    fn test_bird_animation_cycles() {
        assert_eq!(bird_frame(0, 10), 0);
        assert_eq!(bird_frame(9, 10), 0);
        assert_eq!(bird_frame(10, 10), 1);
        assert_eq!(bird_frame(25, 10), 2);
        assert_eq!(bird_frame(30, 10), 0);
        // Zero rate never divides by zero
        assert_eq!(bird_frame(4, 0), 1);
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut a = running_state(&tuning);
        let mut b = running_state(&tuning);
        let mut rng_a = Pcg32::seed_from_u64(99999);
        let mut rng_b = Pcg32::seed_from_u64(99999);

        for t in 0..400u32 {
            let input = TickInput { jump: t % 18 == 0 };
            tick(&mut a, &input, &tuning, &mut rng_a);
            tick(&mut b, &input, &tuning, &mut rng_b);
        }
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_integration_is_exact(
            y in 60.0f32..400.0,
            speed in -6.5f32..6.0,
            gravity in 0.05f32..0.5,
        ) {
            let tuning = Tuning { gravity, ..Tuning::default() };
            let mut state = running_state(&tuning);
            state.bird.pos.y = y;
            state.bird.speed = speed;
            let mut rng = Pcg32::seed_from_u64(5);

            tick(&mut state, &TickInput::default(), &tuning, &mut rng);

            let expected_speed = speed + gravity;
            prop_assert_eq!(state.bird.speed, expected_speed);
            prop_assert_eq!(state.bird.pos.y, y + expected_speed);
        }

        #[test]
        fn prop_removal_keeps_order(xs in prop::collection::vec(-80.0f32..500.0, 0..12)) {
            let mut pipes: Vec<Pipe> = xs.iter().map(|&x| Pipe::new(x, 100.0, 180.0)).collect();
            advance_pipes(&mut pipes, 4.0, 52.0);

            let expected: Vec<f32> = xs.iter().map(|x| x - 4.0).filter(|&x| x > -52.0).collect();
            let got: Vec<f32> = pipes.iter().map(|p| p.x).collect();
            prop_assert_eq!(got, expected);
        }

        #[test]
        fn prop_gap_containment_decides_collision(
            pipe_x in 60.0f32..130.0,
            gap_top in 50.0f32..250.0,
            bird_y in 0.0f32..460.0,
        ) {
            let tuning = Tuning { gravity: 0.0, ..Tuning::default() };
            let mut state = running_state(&tuning);
            state.bird.pos.y = bird_y;
            // Pre-scroll so the pipe sits at pipe_x during the checks
            state.pipes.push(Pipe::new(pipe_x + tuning.pipe_speed, gap_top, tuning.pipe_gap));
            let inside = bird_y >= gap_top && bird_y + 24.0 <= gap_top + tuning.pipe_gap;
            let mut rng = Pcg32::seed_from_u64(5);

            let outcome = tick(&mut state, &TickInput::default(), &tuning, &mut rng);

            if inside {
                prop_assert_eq!(outcome, TickOutcome::Continue);
            } else {
                prop_assert_eq!(outcome, TickOutcome::GameOver(Collision::Pipe(0)));
                // A second tick changes nothing
                let after = state.clone();
                prop_assert_eq!(tick(&mut state, &TickInput::default(), &tuning, &mut rng), TickOutcome::Idle);
                prop_assert_eq!(state, after);
            }
        }
    }
}
