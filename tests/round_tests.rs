use nullsum::round::{
    AnimPhase, ExpiryOutcome, FIDGET_DURATION_MS, FrameOutcome, GestureOutcome, ReleaseOutcome,
    Round, VANISH_STEP,
};
use nullsum::tile_core::{Coord, GRID_SIZE, TILE_SIZE, TileKind};

const FRAME_MS: u32 = 16;

fn adders_round(seed: u64) -> Round {
    Round::new(seed, false)
}

/// Pixel center of a cell on a grid anchored at the origin.
fn center(col: usize, row: usize) -> (f32, f32) {
    (
        col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
        row as f32 * TILE_SIZE + TILE_SIZE / 2.0,
    )
}

fn start_at(round: &mut Round, col: usize, row: usize) -> GestureOutcome {
    let (x, y) = center(col, row);
    round.gesture_start(x, y)
}

fn move_to(round: &mut Round, col: usize, row: usize) -> GestureOutcome {
    let (x, y) = center(col, row);
    round.gesture_move(x, y)
}

fn step_until_idle(round: &mut Round, max_frames: usize) -> usize {
    for frame in 0..max_frames {
        if !round.animating() {
            return frame;
        }
        round.step_frame(FRAME_MS);
    }
    panic!("animation still running after {max_frames} frames");
}

#[test]
fn path_sum_is_the_left_fold_of_tile_operators() {
    let mut round = adders_round(1);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 3 });
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: 4 });
    round.grid_mut().set_tile(Coord::new(1, 1), TileKind::Multiplier { factor: 2 });
    round.grid_mut().set_tile(Coord::new(2, 1), TileKind::Square);

    assert_eq!(
        start_at(&mut round, 0, 0),
        GestureOutcome::Extended {
            coord: Coord::new(0, 0),
            sum: 3
        }
    );
    assert!(matches!(move_to(&mut round, 1, 0), GestureOutcome::Extended { sum: 7, .. }));
    // (3 + 4) * 2 = 14, then squared.
    assert!(matches!(move_to(&mut round, 1, 1), GestureOutcome::Extended { sum: 14, .. }));
    assert!(matches!(move_to(&mut round, 2, 1), GestureOutcome::Extended { sum: 196, .. }));
    assert_eq!(round.display_sum(), Some(196));
}

#[test]
fn revisiting_a_path_cell_is_rejected() {
    let mut round = adders_round(2);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 1 });
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: 1 });

    start_at(&mut round, 0, 0);
    move_to(&mut round, 1, 0);
    assert_eq!(move_to(&mut round, 0, 0), GestureOutcome::Rejected);
    assert_eq!(round.path().len(), 2);
    assert_eq!(round.display_sum(), Some(2));
}

#[test]
fn extensions_attach_to_any_prior_member_but_never_jump() {
    let mut round = adders_round(3);
    for col in 0..GRID_SIZE {
        for row in 0..GRID_SIZE {
            round
                .grid_mut()
                .set_tile(Coord::new(col, row), TileKind::Adder { value: 1 });
        }
    }

    start_at(&mut round, 0, 0);
    assert_eq!(move_to(&mut round, 2, 0), GestureOutcome::Rejected);
    move_to(&mut round, 1, 0);
    move_to(&mut round, 2, 0);
    // Adjacent only to the path's first member.
    assert!(matches!(move_to(&mut round, 0, 1), GestureOutcome::Extended { .. }));
    assert_eq!(round.path().len(), 4);
}

#[test]
fn gesture_over_padding_is_a_no_op() {
    let mut round = adders_round(4);
    assert_eq!(round.gesture_start(-40.0, 250.0), GestureOutcome::NoCell);
    assert!(round.path().is_empty());
    assert!(!round.animating());
}

#[test]
fn starting_on_an_arithmetic_tile_fidgets_instead_of_pathing() {
    let mut round = adders_round(5);
    round
        .grid_mut()
        .set_tile(Coord::new(2, 2), TileKind::Multiplier { factor: 2 });

    let outcome = start_at(&mut round, 2, 2);
    assert_eq!(outcome, GestureOutcome::Fidgeted(Coord::new(2, 2)));
    assert!(round.path().is_empty());
    assert!(round.animating(), "fidget must raise the animation flag");

    // Pointer input is dead while the tile fidgets.
    assert_eq!(start_at(&mut round, 0, 0), GestureOutcome::Ignored);
    assert_eq!(round.gesture_end(), ReleaseOutcome::Ignored);

    let origin_cx = 2.0 * TILE_SIZE + TILE_SIZE / 2.0;
    let frames = step_until_idle(&mut round, 64);
    assert!(
        frames as u32 * FRAME_MS > FIDGET_DURATION_MS,
        "fidget should run for its full duration"
    );
    let tile = round.grid().tile(Coord::new(2, 2)).unwrap();
    assert_eq!(tile.cx, origin_cx, "fidget must snap back to the origin");
}

#[test]
fn square_tile_cannot_open_a_path_even_when_adjacent() {
    let mut round = adders_round(6);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Square);

    assert_eq!(start_at(&mut round, 0, 0), GestureOutcome::Fidgeted(Coord::new(0, 0)));
    step_until_idle(&mut round, 64);

    // The same tile is a legal extension once a path exists.
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: 2 });
    assert!(matches!(start_at(&mut round, 1, 0), GestureOutcome::Extended { .. }));
    assert!(matches!(move_to(&mut round, 0, 0), GestureOutcome::Extended { sum: 4, .. }));
}

#[test]
fn zero_sum_release_scores_length_squared_and_clears() {
    let mut round = adders_round(7);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 3 });
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: -3 });

    start_at(&mut round, 0, 0);
    move_to(&mut round, 1, 0);
    assert_eq!(
        round.gesture_end(),
        ReleaseOutcome::ClearStarted { score_gain: 4 }
    );
    assert_eq!(round.score(), 4);
    assert_eq!(round.phase(), AnimPhase::Vanishing);

    step_until_idle(&mut round, 128);
    assert!(round.grid().is_fully_populated());
    assert!(round.path().is_empty());
    assert_eq!(round.display_sum(), None);
    assert_eq!(round.score(), 4);
}

#[test]
fn single_zero_tile_is_a_valid_clear() {
    let mut round = adders_round(8);
    round.grid_mut().set_tile(Coord::new(3, 3), TileKind::Adder { value: 0 });

    start_at(&mut round, 3, 3);
    assert_eq!(
        round.gesture_end(),
        ReleaseOutcome::ClearStarted { score_gain: 1 }
    );
    step_until_idle(&mut round, 128);
    assert_eq!(round.score(), 1);
}

#[test]
fn three_tile_clear_scores_nine() {
    let mut round = adders_round(9);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 5 });
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: -2 });
    round.grid_mut().set_tile(Coord::new(2, 0), TileKind::Adder { value: -3 });

    start_at(&mut round, 0, 0);
    move_to(&mut round, 1, 0);
    move_to(&mut round, 2, 0);
    assert_eq!(
        round.gesture_end(),
        ReleaseOutcome::ClearStarted { score_gain: 9 }
    );
    step_until_idle(&mut round, 128);
    assert_eq!(round.score(), 9);
}

#[test]
fn nonzero_release_discards_without_touching_score_or_grid() {
    let mut round = adders_round(10);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 3 });
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: 4 });

    let kinds_before: Vec<TileKind> = round.grid().tiles().map(|tile| tile.kind()).collect();

    start_at(&mut round, 0, 0);
    move_to(&mut round, 1, 0);
    // Release immediately ends the gesture wherever the pointer is.
    assert_eq!(round.gesture_end(), ReleaseOutcome::Discarded);

    assert_eq!(round.score(), 0);
    assert!(round.path().is_empty());
    assert_eq!(round.display_sum(), None);
    assert!(!round.animating());
    let kinds_after: Vec<TileKind> = round.grid().tiles().map(|tile| tile.kind()).collect();
    assert_eq!(kinds_before, kinds_after, "a discard must not alter the grid");
    assert!(round.grid().tiles().all(|tile| !tile.highlight));
}

#[test]
fn empty_release_is_a_harmless_discard() {
    let mut round = adders_round(11);
    assert_eq!(round.gesture_end(), ReleaseOutcome::Discarded);
    assert_eq!(round.score(), 0);
}

#[test]
fn vanish_collapses_within_the_step_bound_and_never_goes_negative() {
    let mut round = adders_round(12);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 2 });
    round.grid_mut().set_tile(Coord::new(0, 1), TileKind::Adder { value: -2 });

    start_at(&mut round, 0, 0);
    move_to(&mut round, 0, 1);
    round.gesture_end();

    let bound = (TILE_SIZE / VANISH_STEP).ceil() as usize;
    for frame in 0..bound {
        assert_eq!(
            round.phase(),
            AnimPhase::Vanishing,
            "still vanishing at frame {frame}"
        );
        round.step_frame(FRAME_MS);
        if round.phase() != AnimPhase::Vanishing {
            // The gaps were just refilled; the cleared cells now hold
            // fresh, full-size tiles.
            break;
        }
        for coord in [Coord::new(0, 0), Coord::new(0, 1)] {
            if let Some(tile) = round.grid().tile(coord) {
                assert!(tile.tile_size >= 0.0, "tile size must clamp at zero");
                assert!(!tile.show_text, "vanishing tiles suppress their text");
            }
        }
    }
    assert_eq!(
        round.phase(),
        AnimPhase::Compacting,
        "vanish must finish within {bound} steps"
    );
}

#[test]
fn compaction_drops_land_exactly_on_target() {
    let mut round = adders_round(13);
    round.grid_mut().set_tile(Coord::new(4, 4), TileKind::Adder { value: 0 });

    start_at(&mut round, 4, 4);
    round.gesture_end();
    step_until_idle(&mut round, 128);

    assert!(round.grid().is_fully_populated());
    for tile in round.grid().tiles() {
        assert_eq!(tile.drop, 0.0, "all drops must be walked back to zero");
    }
}

#[test]
fn input_stays_blocked_until_compaction_settles() {
    let mut round = adders_round(14);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 0 });

    start_at(&mut round, 0, 0);
    round.gesture_end();

    while round.animating() {
        assert_eq!(start_at(&mut round, 2, 2), GestureOutcome::Ignored);
        assert_eq!(round.gesture_end(), ReleaseOutcome::Ignored);
        round.step_frame(FRAME_MS);
    }
    // Once idle, gestures flow again.
    round.grid_mut().set_tile(Coord::new(2, 2), TileKind::Adder { value: 1 });
    assert!(matches!(start_at(&mut round, 2, 2), GestureOutcome::Extended { .. }));
}

#[test]
fn expiry_while_idle_ends_the_round_immediately() {
    let mut round = adders_round(15);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 1 });
    start_at(&mut round, 0, 0);

    assert_eq!(round.time_expired(), ExpiryOutcome::Finished { final_score: 0 });
    assert!(round.is_over());
    assert!(round.path().is_empty(), "expiry clears the open path");
    assert!(round.grid().tiles().all(|tile| !tile.highlight));
    assert_eq!(start_at(&mut round, 0, 0), GestureOutcome::Ignored);
}

#[test]
fn expiry_during_an_animation_is_deferred_to_its_terminal_frame() {
    let mut round = adders_round(16);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 2 });
    round.grid_mut().set_tile(Coord::new(1, 0), TileKind::Adder { value: -2 });

    start_at(&mut round, 0, 0);
    move_to(&mut round, 1, 0);
    round.gesture_end();
    assert!(round.animating());

    assert_eq!(round.time_expired(), ExpiryOutcome::Deferred);
    assert!(!round.is_over(), "game over side effects must wait");

    let mut finished = None;
    for _ in 0..128 {
        match round.step_frame(FRAME_MS) {
            FrameOutcome::RoundFinished { final_score } => {
                finished = Some(final_score);
                break;
            }
            FrameOutcome::Animating => {}
            other => panic!("unexpected frame outcome {other:?} before the round finished"),
        }
    }
    assert_eq!(finished, Some(4), "the banked clear still counts");
    assert!(round.is_over());
    assert!(round.grid().is_fully_populated(), "the animation ran to completion");
}

#[test]
fn reset_starts_a_fresh_round_on_a_full_grid() {
    let mut round = adders_round(17);
    round.grid_mut().set_tile(Coord::new(0, 0), TileKind::Adder { value: 0 });
    start_at(&mut round, 0, 0);
    round.gesture_end();
    step_until_idle(&mut round, 128);
    assert_eq!(round.score(), 1);
    round.time_expired();
    assert!(round.is_over());

    round.reset();
    assert!(!round.is_over());
    assert_eq!(round.score(), 0);
    assert!(round.path().is_empty());
    assert!(round.grid().is_fully_populated());
    assert!(!round.animating());
}
