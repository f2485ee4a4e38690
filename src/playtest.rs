use std::time::Duration;

use crate::round::Round;
use crate::state::GameState;

/// Deterministic game-stepping seam: pure state in, input in, next state
/// out. Keeping the step free of hidden inputs is what makes scripted
/// playtests and frame-hash regression possible.
pub trait GameLogic {
    type State;
    type Input;

    fn initial_state(&self) -> Self::State;
    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State;
}

/// One scripted input: a pointer gesture event, a menu event, or the
/// passage of one display frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Noop,
    StartGame,
    PlayAgain,
    GestureStart(f32, f32),
    GestureMove(f32, f32),
    GestureEnd,
    Frame(u32),
}

/// Headless build of the full game for scripted runs.
#[derive(Debug, Clone)]
pub struct MatchLogic {
    seed: u64,
    arithmetic_tiles: bool,
    round_limit: Duration,
}

impl MatchLogic {
    pub fn new(seed: u64, arithmetic_tiles: bool) -> Self {
        Self {
            seed,
            arithmetic_tiles,
            round_limit: crate::state::DEFAULT_ROUND_LIMIT,
        }
    }

    pub fn with_round_limit(mut self, limit: Duration) -> Self {
        self.round_limit = limit;
        self
    }
}

impl GameLogic for MatchLogic {
    type State = GameState;
    type Input = InputAction;

    fn initial_state(&self) -> Self::State {
        let round = Round::new(self.seed, self.arithmetic_tiles);
        GameState::with_round_limit(round, self.round_limit)
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Self::State {
        let mut next = state.clone();
        match input {
            InputAction::Noop => {}
            InputAction::StartGame => {
                next.apply_view_event(crate::view::GameViewEvent::StartGame);
            }
            InputAction::PlayAgain => {
                next.apply_view_event(crate::view::GameViewEvent::PlayAgain);
            }
            InputAction::GestureStart(x, y) => {
                next.gesture_start(x, y);
            }
            InputAction::GestureMove(x, y) => {
                next.gesture_move(x, y);
            }
            InputAction::GestureEnd => {
                next.gesture_end();
            }
            InputAction::Frame(dt_ms) => {
                next.tick(Duration::from_millis(dt_ms as u64));
            }
        }
        next
    }
}

/// Linear step driver over any `GameLogic`. Unlike an interactive frontend
/// it has no clock of its own; time only passes through `Frame` inputs.
#[derive(Debug)]
pub struct PlaytestRunner<G: GameLogic> {
    game: G,
    state: G::State,
    frames: usize,
}

impl<G: GameLogic> PlaytestRunner<G> {
    pub fn new(game: G) -> Self {
        let state = game.initial_state();
        Self {
            game,
            state,
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn state(&self) -> &G::State {
        &self.state
    }

    /// Direct state access for scenario setup, mirroring the public setup
    /// hooks on the core types.
    pub fn state_mut(&mut self) -> &mut G::State {
        &mut self.state
    }

    pub fn step(&mut self, input: G::Input) -> &G::State {
        self.state = self.game.step(&self.state, input);
        self.frames += 1;
        &self.state
    }

    pub fn run<I>(&mut self, inputs: I) -> &G::State
    where
        I: IntoIterator<Item = G::Input>,
    {
        for input in inputs {
            self.step(input);
        }
        &self.state
    }
}
