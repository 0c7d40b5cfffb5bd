use battleship_royale::{BattleBoard, BattleCell, GridError, HitOutcome};
use proptest::prelude::*;

#[test]
fn ship_hit_then_already_resolved() {
    let mut board = BattleBoard::new(4, 4);
    board.mark_ship(1, 2).unwrap();
    assert_eq!(board.apply_hit(1, 2), Ok(HitOutcome::Hit));
    assert_eq!(board.get(1, 2), Some(BattleCell::HitShip));
    assert_eq!(board.apply_hit(1, 2), Ok(HitOutcome::AlreadyResolved));
    assert_eq!(board.get(1, 2), Some(BattleCell::HitShip));
}

#[test]
fn water_hit_is_a_miss() {
    let mut board = BattleBoard::new(4, 4);
    assert_eq!(board.apply_hit(0, 0), Ok(HitOutcome::Miss));
    assert_eq!(board.get(0, 0), Some(BattleCell::HitWater));
    assert_eq!(board.apply_hit(0, 0), Ok(HitOutcome::AlreadyResolved));
}

#[test]
fn hit_off_the_board_is_out_of_bounds() {
    let mut board = BattleBoard::new(33, 55);
    assert_eq!(board.apply_hit(33, 0), Err(GridError::OutOfBounds { row: 33, col: 0 }));
    assert_eq!(board.apply_hit(0, 55), Err(GridError::OutOfBounds { row: 0, col: 55 }));
    assert_eq!(board.count(BattleCell::Water), 33 * 55);
}

#[test]
fn wire_codes_are_stable() {
    let codes: Vec<u8> = BattleCell::ALL.iter().map(|c| c.code()).collect();
    assert_eq!(codes, vec![1, 2, 3, 4]);
    for cell in BattleCell::ALL {
        assert_eq!(BattleCell::from_code(cell.code()), Some(cell));
    }
    assert_eq!(BattleCell::from_code(0), None);
    assert_eq!(BattleCell::from_code(5), None);
}

#[test]
fn only_hit_states_are_terminal() {
    assert!(!BattleCell::Water.is_terminal());
    assert!(!BattleCell::Ship.is_terminal());
    assert!(BattleCell::HitWater.is_terminal());
    assert!(BattleCell::HitShip.is_terminal());
}

#[test]
fn server_verdict_overwrites_optimistic_miss() {
    let mut board = BattleBoard::new(3, 3);
    assert_eq!(board.apply_hit(2, 2), Ok(HitOutcome::Miss));
    assert_eq!(board.resolve(2, 2, BattleCell::HitShip), Ok(BattleCell::HitShip));
    assert_eq!(board.resolve(2, 2, BattleCell::Water), Ok(BattleCell::HitShip));
}

#[test]
fn mark_ship_never_touches_resolved_cells() {
    let mut board = BattleBoard::new(2, 2);
    board.apply_hit(0, 0).unwrap();
    board.mark_ship(0, 0).unwrap();
    assert_eq!(board.get(0, 0), Some(BattleCell::HitWater));
}

#[test]
fn fogged_view_hides_unhit_ships() {
    let mut board = BattleBoard::new(2, 3);
    board.mark_ship(0, 0).unwrap();
    board.mark_ship(0, 1).unwrap();
    board.apply_hit(0, 1).unwrap();
    board.apply_hit(1, 2).unwrap();
    let fog = board.fogged();
    assert_eq!(fog.get(0, 0), Some(&BattleCell::Water));
    assert_eq!(fog.get(0, 1), Some(&BattleCell::HitShip));
    assert_eq!(fog.get(1, 2), Some(&BattleCell::HitWater));
    assert_eq!(board.count(BattleCell::Ship), 1);
}

fn cell() -> impl Strategy<Value = BattleCell> {
    prop::sample::select(BattleCell::ALL.to_vec())
}

proptest! {
    #[test]
    fn apply_hit_is_idempotent(start in cell()) {
        let (once, _) = start.apply_hit();
        let (twice, outcome) = once.apply_hit();
        prop_assert_eq!(once, twice);
        prop_assert_eq!(outcome, HitOutcome::AlreadyResolved);
        prop_assert!(once.is_terminal());
    }

    #[test]
    fn board_hits_are_idempotent(row in 0..6usize, col in 0..6usize, ships in prop::collection::vec((0..6usize, 0..6usize), 0..12)) {
        let mut board = BattleBoard::new(6, 6);
        for (r, c) in ships {
            board.mark_ship(r, c).unwrap();
        }
        board.apply_hit(row, col).unwrap();
        let after_first = board.clone();
        prop_assert_eq!(board.apply_hit(row, col), Ok(HitOutcome::AlreadyResolved));
        prop_assert_eq!(board, after_first);
    }
}
