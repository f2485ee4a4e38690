use serde::{Deserialize, Serialize};

use crate::path::PathTracker;
use crate::tile_core::{Coord, TileFactory, TileGrid};

/// Pixels a vanishing tile shrinks per frame. Divides `TILE_SIZE` evenly,
/// and the step clamps at zero regardless.
pub const VANISH_STEP: f32 = 10.0;
/// Pixels a dropping tile falls per frame; clamps to land exactly on target.
pub const DROP_STEP: f32 = 10.0;
pub const FIDGET_STEP: f32 = 3.0;
pub const FIDGET_DURATION_MS: u32 = 150;

/// Animation phase of the round. `Idle` is the only phase that accepts
/// pointer-path input; the phase doubles as the single animation-in-progress
/// flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum AnimPhase {
    #[default]
    Idle,
    Vanishing,
    Compacting,
    Fidget {
        coord: Coord,
        origin_cx: f32,
        elapsed_ms: u32,
        moved_right: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Animation in progress or round over; input dropped.
    Ignored,
    /// Pointer outside every cell. A no-op, not an error.
    NoCell,
    /// Duplicate or non-adjacent cell; path unchanged.
    Rejected,
    /// Gesture landed on an arithmetic tile with no path started.
    Fidgeted(Coord),
    Extended {
        coord: Coord,
        sum: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Ignored,
    /// Non-zero sum (or empty path): highlights and path dropped, score and
    /// grid untouched.
    Discarded,
    /// Zero sum: score banked, vanish animation started.
    ClearStarted { score_gain: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Idle,
    Animating,
    /// An animation reached its terminal frame this step.
    Settled,
    /// A deferred time expiry was applied as the animation settled.
    RoundFinished { final_score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryOutcome {
    Finished { final_score: u32 },
    /// An animation is running; game-over side effects wait for its
    /// terminal frame.
    Deferred,
}

/// One round of play: the grid, its tile factory, the gesture path, the
/// score and the animation state machine, advanced by an external
/// once-per-frame `step_frame` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    grid: TileGrid,
    factory: TileFactory,
    path: PathTracker,
    score: u32,
    phase: AnimPhase,
    pending_game_over: bool,
    over: bool,
}

impl Round {
    pub fn new(seed: u64, arithmetic_tiles: bool) -> Self {
        let mut factory = TileFactory::new(seed);
        factory.set_arithmetic_tiles(arithmetic_tiles);
        let mut grid = TileGrid::new(0.0, 0.0);
        grid.init(&mut factory);
        Self {
            grid,
            factory,
            path: PathTracker::default(),
            score: 0,
            phase: AnimPhase::Idle,
            pending_game_over: false,
            over: false,
        }
    }

    /// Regrows the grid for a fresh round. Generation history survives so
    /// arithmetic-tile throttling keeps its cadence across rounds.
    pub fn reset(&mut self) {
        self.grid.init(&mut self.factory);
        self.path.reset();
        self.score = 0;
        self.phase = AnimPhase::Idle;
        self.pending_game_over = false;
        self.over = false;
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn path(&self) -> &PathTracker {
        &self.path
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> AnimPhase {
        self.phase
    }

    pub fn animating(&self) -> bool {
        self.phase != AnimPhase::Idle
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn display_sum(&self) -> Option<i64> {
        self.path.display_sum()
    }

    pub fn set_arithmetic_tiles(&mut self, enabled: bool) {
        self.factory.set_arithmetic_tiles(enabled);
    }

    pub fn gesture_start(&mut self, x: f32, y: f32) -> GestureOutcome {
        self.extend_path_at(x, y)
    }

    pub fn gesture_move(&mut self, x: f32, y: f32) -> GestureOutcome {
        self.extend_path_at(x, y)
    }

    fn extend_path_at(&mut self, x: f32, y: f32) -> GestureOutcome {
        if self.over || self.animating() {
            return GestureOutcome::Ignored;
        }
        let Some(coord) = self.grid.cell_at(x, y) else {
            return GestureOutcome::NoCell;
        };

        if self.path.is_empty() {
            let starts_on_adder = self
                .grid
                .tile(coord)
                .map(|tile| tile.kind().is_adder())
                .unwrap_or(false);
            // Arithmetic-operator tiles may never open a path.
            if !starts_on_adder {
                self.grid.clear_highlights();
                self.start_fidget(coord);
                return GestureOutcome::Fidgeted(coord);
            }
        }

        if self.path.try_extend(Some(coord), &self.grid) {
            self.grid.highlight(coord);
            GestureOutcome::Extended {
                coord,
                sum: self.path.sum(),
            }
        } else {
            GestureOutcome::Rejected
        }
    }

    /// Ends the gesture. The release point is irrelevant: wherever the
    /// pointer goes up, inside the canvas or out, the gesture is over.
    pub fn gesture_end(&mut self) -> ReleaseOutcome {
        if self.over || self.animating() {
            return ReleaseOutcome::Ignored;
        }

        if !self.path.is_empty() && self.path.sum() == 0 {
            let len = self.path.len() as u32;
            let score_gain = len.saturating_mul(len);
            self.score = self.score.saturating_add(score_gain);
            self.phase = AnimPhase::Vanishing;
            return ReleaseOutcome::ClearStarted { score_gain };
        }

        self.grid.clear_highlights();
        self.path.reset();
        ReleaseOutcome::Discarded
    }

    /// Countdown expiry. While an animation runs, game-over side effects are
    /// deferred to its terminal frame; otherwise the round ends on the spot.
    pub fn time_expired(&mut self) -> ExpiryOutcome {
        if self.over {
            return ExpiryOutcome::Finished {
                final_score: self.score,
            };
        }
        if self.animating() {
            self.pending_game_over = true;
            ExpiryOutcome::Deferred
        } else {
            self.finish();
            ExpiryOutcome::Finished {
                final_score: self.score,
            }
        }
    }

    fn finish(&mut self) {
        self.grid.clear_highlights();
        self.path.reset();
        self.over = true;
    }

    fn start_fidget(&mut self, coord: Coord) {
        let origin_cx = self.grid.tile(coord).map(|tile| tile.cx).unwrap_or(0.0);
        self.phase = AnimPhase::Fidget {
            coord,
            origin_cx,
            elapsed_ms: 0,
            moved_right: true,
        };
    }

    fn settle(&mut self) -> FrameOutcome {
        self.phase = AnimPhase::Idle;
        if self.pending_game_over {
            self.pending_game_over = false;
            self.finish();
            return FrameOutcome::RoundFinished {
                final_score: self.score,
            };
        }
        FrameOutcome::Settled
    }

    /// Advances the animation state machine by one display frame. Each call
    /// is a synchronous all-or-nothing pass over the affected tiles; there
    /// is no cancellation, an animation always runs to completion.
    pub fn step_frame(&mut self, dt_ms: u32) -> FrameOutcome {
        match self.phase {
            AnimPhase::Idle => FrameOutcome::Idle,
            AnimPhase::Vanishing => self.step_vanish(),
            AnimPhase::Compacting => self.step_compact(),
            AnimPhase::Fidget {
                coord,
                origin_cx,
                elapsed_ms,
                moved_right,
            } => self.step_fidget(coord, origin_cx, elapsed_ms, moved_right, dt_ms),
        }
    }

    fn step_vanish(&mut self) -> FrameOutcome {
        let mut all_collapsed = true;
        for &coord in self.path.coords() {
            if let Some(tile) = self.grid.tile_mut(coord) {
                if tile.tile_size > 0.0 {
                    tile.show_text = false;
                    tile.tile_size = (tile.tile_size - VANISH_STEP).max(0.0);
                }
                if tile.tile_size > 0.0 {
                    all_collapsed = false;
                }
            }
        }
        if !all_collapsed {
            return FrameOutcome::Animating;
        }

        // Every path tile has collapsed: the path is spent before the grid
        // closes the gaps, so the HUD sees "no sum" rather than a zero.
        let cleared: Vec<Coord> = self.path.coords().to_vec();
        self.path.reset();
        self.grid.remove_and_compact(&cleared, &mut self.factory);
        self.phase = AnimPhase::Compacting;
        FrameOutcome::Animating
    }

    fn step_compact(&mut self) -> FrameOutcome {
        let mut all_landed = true;
        for tile in self.grid.tiles_mut() {
            if tile.drop > 0.0 {
                let step = tile.drop.min(DROP_STEP);
                tile.drop -= step;
                tile.cy += step;
                if tile.drop > 0.0 {
                    all_landed = false;
                }
            }
        }
        if all_landed { self.settle() } else { FrameOutcome::Animating }
    }

    fn step_fidget(
        &mut self,
        coord: Coord,
        origin_cx: f32,
        elapsed_ms: u32,
        moved_right: bool,
        dt_ms: u32,
    ) -> FrameOutcome {
        let elapsed = elapsed_ms.saturating_add(dt_ms);
        if elapsed > FIDGET_DURATION_MS {
            if let Some(tile) = self.grid.tile_mut(coord) {
                tile.cx = origin_cx;
            }
            return self.settle();
        }

        if let Some(tile) = self.grid.tile_mut(coord) {
            tile.cx += if moved_right { FIDGET_STEP } else { -FIDGET_STEP };
        }
        self.phase = AnimPhase::Fidget {
            coord,
            origin_cx,
            elapsed_ms: elapsed,
            moved_right: !moved_right,
        };
        FrameOutcome::Animating
    }
}
