use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::round::{ExpiryOutcome, FrameOutcome, GestureOutcome, ReleaseOutcome, Round};
use crate::round_timer::RoundTimer;
use crate::view::{GameView, GameViewEffect, GameViewEvent};

pub const DEFAULT_ROUND_LIMIT: Duration = Duration::from_secs(60);

/// Emitted exactly once per round, when the countdown ends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameEnd {
    pub final_score: u32,
}

/// The whole game: menu flow, the active round and its countdown. No
/// ambient globals; everything a frame needs to know lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub view: GameView,
    pub round: Round,
    pub round_timer: RoundTimer,
}

impl GameState {
    pub fn new(round: Round) -> Self {
        Self::with_round_limit(round, DEFAULT_ROUND_LIMIT)
    }

    pub fn with_round_limit(round: Round, limit: Duration) -> Self {
        Self {
            view: GameView::default(),
            round,
            round_timer: RoundTimer::new(limit),
        }
    }

    /// Runs a view transition and its effect. Starting (or restarting) a
    /// game regrows the grid and rewinds the countdown.
    pub fn apply_view_event(&mut self, event: GameViewEvent) -> GameViewEffect {
        let (next, effect) = self.view.handle(event);
        self.view = next;
        if effect == GameViewEffect::ResetRound {
            self.round.reset();
            self.round_timer.reset();
        }
        effect
    }

    pub fn gesture_start(&mut self, x: f32, y: f32) -> GestureOutcome {
        if !self.view.is_playing() {
            return GestureOutcome::Ignored;
        }
        self.round.gesture_start(x, y)
    }

    pub fn gesture_move(&mut self, x: f32, y: f32) -> GestureOutcome {
        if !self.view.is_playing() {
            return GestureOutcome::Ignored;
        }
        self.round.gesture_move(x, y)
    }

    pub fn gesture_end(&mut self) -> ReleaseOutcome {
        if !self.view.is_playing() {
            return ReleaseOutcome::Ignored;
        }
        self.round.gesture_end()
    }

    /// Advances one display frame: animation step first, then the
    /// countdown. An expiry that lands mid-animation is deferred inside the
    /// round and surfaces here once the animation settles.
    pub fn tick(&mut self, dt: Duration) -> Option<GameEnd> {
        if !self.view.is_playing() {
            return None;
        }

        let dt_ms = dt.as_millis().min(u32::MAX as u128) as u32;
        if let FrameOutcome::RoundFinished { final_score } = self.round.step_frame(dt_ms) {
            self.view = self.view.handle(GameViewEvent::TimeExpired).0;
            return Some(GameEnd { final_score });
        }

        self.round_timer.tick_if_running(dt, true);
        if self.round_timer.is_up() && !self.round.is_over() {
            match self.round.time_expired() {
                ExpiryOutcome::Finished { final_score } => {
                    self.view = self.view.handle(GameViewEvent::TimeExpired).0;
                    return Some(GameEnd { final_score });
                }
                ExpiryOutcome::Deferred => {}
            }
        }
        None
    }
}
