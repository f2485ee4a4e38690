use std::time::Duration;

use crate::round::{GestureOutcome, ReleaseOutcome, Round};
use crate::score_store::BestScoreStore;
use crate::settings::{InputMode, PlayerSettings};
use crate::state::{GameEnd, GameState};
use crate::tile_core::{Tile, TileGrid};
use crate::view::GameViewEvent;

/// Drawing collaborator. Implementations own pixels; the core never draws.
pub trait GridRenderer {
    fn render_grid(&mut self, grid: &TileGrid);
    fn render_tile(&mut self, tile: &Tile);
}

/// Score/sum display collaborator. `sum_changed(None)` means "no path in
/// progress", which renders as an empty readout rather than a zero.
pub trait HudSink {
    fn sum_changed(&mut self, sum: Option<i64>);
    fn score_changed(&mut self, score: u32);
    fn game_over(&mut self, final_score: u32, is_new_best: bool);
}

/// Headless stand-in for both collaborators.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFrontend;

impl GridRenderer for NullFrontend {
    fn render_grid(&mut self, _grid: &TileGrid) {}
    fn render_tile(&mut self, _tile: &Tile) {}
}

impl HudSink for NullFrontend {
    fn sum_changed(&mut self, _sum: Option<i64>) {}
    fn score_changed(&mut self, _score: u32) {}
    fn game_over(&mut self, _final_score: u32, _is_new_best: bool) {}
}

/// Glue between the game state and its collaborators: forwards gestures and
/// frame ticks inward, pushes renders and HUD updates outward after every
/// state-affecting step, and settles the best score at round end.
#[derive(Debug)]
pub struct GameSession<R: GridRenderer, H: HudSink> {
    state: GameState,
    settings: PlayerSettings,
    best_scores: BestScoreStore,
    renderer: R,
    hud: H,
    last_sum: Option<i64>,
    last_score: u32,
}

impl<R: GridRenderer, H: HudSink> GameSession<R, H> {
    pub fn new(
        settings: PlayerSettings,
        seed: u64,
        best_scores: BestScoreStore,
        renderer: R,
        hud: H,
    ) -> Self {
        let settings = settings.sanitized();
        let round = Round::new(seed, settings.gameplay.arithmetic_tiles);
        let limit = Duration::from_secs(settings.gameplay.round_limit_secs);
        let state = GameState::with_round_limit(round, limit);
        let mut session = Self {
            state,
            settings,
            best_scores,
            renderer,
            hud,
            last_sum: None,
            last_score: 0,
        };
        session.renderer.render_grid(session.state.round.grid());
        session
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Read by the external input layer to decide how pointer events map to
    /// gestures. The core gesture API is identical in both modes.
    pub fn input_mode(&self) -> InputMode {
        self.settings.gameplay.input_mode
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn hud(&self) -> &H {
        &self.hud
    }

    pub fn start_game(&mut self) {
        self.state.apply_view_event(GameViewEvent::StartGame);
        self.renderer.render_grid(self.state.round.grid());
        self.push_hud();
    }

    pub fn play_again(&mut self) {
        self.state.apply_view_event(GameViewEvent::PlayAgain);
        self.renderer.render_grid(self.state.round.grid());
        self.push_hud();
    }

    pub fn gesture_start(&mut self, x: f32, y: f32) -> GestureOutcome {
        let outcome = self.state.gesture_start(x, y);
        self.present_gesture(outcome);
        outcome
    }

    pub fn gesture_move(&mut self, x: f32, y: f32) -> GestureOutcome {
        let outcome = self.state.gesture_move(x, y);
        self.present_gesture(outcome);
        outcome
    }

    pub fn gesture_end(&mut self) -> ReleaseOutcome {
        let outcome = self.state.gesture_end();
        if outcome != ReleaseOutcome::Ignored {
            self.renderer.render_grid(self.state.round.grid());
        }
        self.push_hud();
        outcome
    }

    /// One display frame. Returns the round end, if this frame produced it.
    pub fn frame(&mut self, dt: Duration) -> Option<GameEnd> {
        let was_animating = self.state.round.animating();
        let end = self.state.tick(dt);

        if was_animating || self.state.round.animating() || end.is_some() {
            self.renderer.render_grid(self.state.round.grid());
        }
        self.push_hud();

        if let Some(game_end) = end {
            let is_new_best = self.best_scores.maybe_record_score(game_end.final_score);
            self.hud.game_over(game_end.final_score, is_new_best);
        }
        end
    }

    fn present_gesture(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::Extended { coord, .. } => {
                if let Some(tile) = self.state.round.grid().tile(coord) {
                    self.renderer.render_tile(tile);
                }
            }
            GestureOutcome::Fidgeted(_) => {
                self.renderer.render_grid(self.state.round.grid());
            }
            GestureOutcome::Ignored | GestureOutcome::NoCell | GestureOutcome::Rejected => {}
        }
        self.push_hud();
    }

    fn push_hud(&mut self) {
        let sum = self.state.round.display_sum();
        if sum != self.last_sum {
            self.last_sum = sum;
            self.hud.sum_changed(sum);
        }
        let score = self.state.round.score();
        if score != self.last_score {
            self.last_score = score;
            self.hud.score_changed(score);
        }
    }
}
