use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameView {
    #[default]
    MainMenu,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEvent {
    StartGame,
    TimeExpired,
    PlayAgain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameViewEffect {
    None,
    ResetRound,
}

impl GameView {
    /// Pure transition function for the menu / playing / game-over flow.
    ///
    /// Side effects (resetting the round and timer) are reported via
    /// `GameViewEffect` so callers stay deterministic and easy to test.
    pub fn handle(self, event: GameViewEvent) -> (GameView, GameViewEffect) {
        match (self, event) {
            (GameView::MainMenu, GameViewEvent::StartGame) => {
                (GameView::Playing, GameViewEffect::ResetRound)
            }
            (GameView::Playing, GameViewEvent::TimeExpired) => {
                (GameView::GameOver, GameViewEffect::None)
            }
            (GameView::GameOver, GameViewEvent::PlayAgain) => {
                (GameView::Playing, GameViewEffect::ResetRound)
            }

            // Ignore irrelevant events in the current state.
            (state, _) => (state, GameViewEffect::None),
        }
    }

    pub fn is_playing(self) -> bool {
        matches!(self, GameView::Playing)
    }

    pub fn is_game_over(self) -> bool {
        matches!(self, GameView::GameOver)
    }
}
