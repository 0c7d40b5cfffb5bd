use std::sync::Arc;

use battleship_royale::{
    Autopilot, BattleBoard, BattleCell, ClientConfig, InMemorySessionServer, PlayerId, SessionController,
};

fn config() -> ClientConfig {
    ClientConfig {
        battle_rows: 10,
        battle_cols: 10,
        ..ClientConfig::fast()
    }
}

#[test]
fn target_follows_up_on_a_hit() {
    let mut board = BattleBoard::new(10, 10);
    board.mark_ship(5, 5).unwrap();
    board.apply_hit(5, 5).unwrap();
    board.apply_hit(4, 5).unwrap();
    let mut pilot = Autopilot::seeded(1);
    for _ in 0..20 {
        let target = pilot.select_target(&board).unwrap();
        assert!([(6, 5), (5, 4), (5, 6)].contains(&target), "unexpected {:?}", target);
    }
}

#[test]
fn no_target_on_a_fully_resolved_board() {
    let mut board = BattleBoard::new(2, 2);
    for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        board.apply_hit(r, c).unwrap();
    }
    assert_eq!(board.count(BattleCell::Water), 0);
    assert_eq!(Autopilot::seeded(2).select_target(&board), None);
}

#[tokio::test(start_paused = true)]
async fn two_autopilots_play_a_full_match() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let mut first = SessionController::new(Arc::new(server.clone()), PlayerId::new("one"), config());
    let mut second = SessionController::new(Arc::new(server.clone()), PlayerId::new("two"), config());
    let mut pilot1 = Autopilot::seeded(100);
    let mut pilot2 = Autopilot::seeded(200);

    let (s1, s2) = tokio::try_join!(
        pilot1.run(&mut first, "Player One", 100),
        pilot2.run(&mut second, "Player Two", 100),
    )?;

    for summary in [&s1, &s2] {
        assert_eq!(summary.sunk.len(), 3);
        assert_eq!(summary.hits, 10);
        assert_eq!(summary.attacks, summary.hits + summary.misses);
        assert_eq!(summary.unconfirmed, 0);
    }
    assert_eq!(s1.player, "Player One");

    let json = serde_json::to_value(&s1)?;
    assert_eq!(json["sunk"].as_array().map(Vec::len), Some(3));

    first.leave().await?;
    second.leave().await?;
    assert_eq!(server.player_count(), 0);
    Ok(())
}
