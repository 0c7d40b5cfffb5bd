use battleship_royale::protocol::{
    Coordinates, HitRequest, HitVerdict, JoinRequest, JoinStatus, PlaceShipsRequest, ShipPayload,
};
use battleship_royale::{BattleCell, InMemorySessionServer, Orientation, PlayerId, SessionApi, SessionError};

fn join(name: &str) -> JoinRequest {
    JoinRequest {
        player_name: name.to_string(),
    }
}

fn ship(name: &str, ship_type: u8, row: usize, col: usize, orientation: Orientation) -> ShipPayload {
    ShipPayload {
        name: name.to_string(),
        ship_type,
        first_cell_coordinates: Coordinates { x: col, y: row },
        orientation,
    }
}

fn fleet() -> PlaceShipsRequest {
    PlaceShipsRequest {
        ships: vec![
            ship("Destroyer", 1, 0, 0, Orientation::Horizontal),
            ship("Submarine", 2, 2, 0, Orientation::Vertical),
            ship("Battleship", 3, 9, 5, Orientation::Horizontal),
        ],
    }
}

#[tokio::test]
async fn third_player_is_turned_away() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let (a, b, c) = (PlayerId::new("a"), PlayerId::new("b"), PlayerId::new("c"));
    assert_eq!(server.join(&a, join("Alice")).await?.join_status(), JoinStatus::Accepted);
    assert_eq!(server.join(&b, join("Bob")).await?.join_status(), JoinStatus::Accepted);
    assert_eq!(server.join(&c, join("Carol")).await?.join_status(), JoinStatus::SessionFull);
    assert_eq!(server.join(&a, join("Alice")).await?.join_status(), JoinStatus::Accepted);
    assert_eq!(server.players().await?.player_ids, vec![a.clone(), b]);
    assert_eq!(server.player_name(&a).as_deref(), Some("Alice"));
    Ok(())
}

#[tokio::test]
async fn placing_ships_marks_the_player_ready() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let (a, b) = (PlayerId::new("a"), PlayerId::new("b"));
    server.join(&a, join("Alice")).await?;
    server.join(&b, join("Bob")).await?;
    server.place_ships(&a, fleet()).await?;

    let ready = server.ready_states().await?;
    assert_eq!(ready.len(), 2);
    assert!(ready.iter().find(|e| e.id == a).unwrap().ready_for_battle);
    assert!(!ready.iter().find(|e| e.id == b).unwrap().ready_for_battle);

    let sea = server.sea(&a).unwrap();
    assert_eq!(sea.count(BattleCell::Ship), 10);
    assert_eq!(sea.get(3, 0), Some(BattleCell::Ship));
    assert_eq!(sea.get(9, 9), Some(BattleCell::Ship));
    Ok(())
}

#[tokio::test]
async fn invalid_layouts_are_refused() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let a = PlayerId::new("a");
    server.join(&a, join("Alice")).await?;

    let overhang = PlaceShipsRequest {
        ships: vec![ship("Battleship", 3, 0, 7, Orientation::Horizontal)],
    };
    assert!(matches!(
        server.place_ships(&a, overhang).await,
        Err(SessionError::UnexpectedServerResponse(_))
    ));

    let overlap = PlaceShipsRequest {
        ships: vec![
            ship("Destroyer", 1, 0, 0, Orientation::Horizontal),
            ship("Submarine", 2, 0, 1, Orientation::Vertical),
        ],
    };
    assert!(server.place_ships(&a, overlap).await.is_err());

    let incomplete = PlaceShipsRequest {
        ships: vec![
            ship("Destroyer", 1, 0, 0, Orientation::Horizontal),
            ship("Battleship", 3, 9, 5, Orientation::Horizontal),
        ],
    };
    assert!(matches!(
        server.place_ships(&a, incomplete).await,
        Err(SessionError::UnexpectedServerResponse(_))
    ));

    let duplicated = PlaceShipsRequest {
        ships: vec![
            ship("Destroyer", 1, 0, 0, Orientation::Horizontal),
            ship("Destroyer", 1, 2, 0, Orientation::Horizontal),
            ship("Battleship", 3, 9, 5, Orientation::Horizontal),
        ],
    };
    assert!(server.place_ships(&a, duplicated).await.is_err());

    let unknown = PlaceShipsRequest {
        ships: vec![ship("Carrier", 9, 0, 0, Orientation::Horizontal)],
    };
    assert!(server.place_ships(&a, unknown).await.is_err());
    assert!(server.sea(&a).is_none());
    assert!(!server.ready_states().await?[0].ready_for_battle);
    Ok(())
}

#[tokio::test]
async fn hits_resolve_against_the_opponent_and_report_sinking() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let (a, b) = (PlayerId::new("a"), PlayerId::new("b"));
    server.join(&a, join("Alice")).await?;
    server.join(&b, join("Bob")).await?;
    server.place_ships(&a, fleet()).await?;
    server.place_ships(&b, fleet()).await?;

    let miss = server.hit(&a, HitRequest::at(5, 5)).await?;
    assert_eq!(miss.result, HitVerdict::Miss);

    let first = server.hit(&a, HitRequest::at(0, 0)).await?;
    assert_eq!(first.result, HitVerdict::Hit);
    assert_eq!(first.sunk_ship, None);

    let second = server.hit(&a, HitRequest::at(0, 1)).await?;
    assert_eq!(second.result, HitVerdict::Sunk);
    assert_eq!(second.sunk_ship.as_deref(), Some("Destroyer"));

    let again = server.hit(&a, HitRequest::at(0, 1)).await?;
    assert_eq!(again.result, HitVerdict::Hit);

    assert_eq!(server.sea(&b).unwrap().get(0, 0), Some(BattleCell::HitShip));
    assert_eq!(server.sea(&a).unwrap().get(0, 0), Some(BattleCell::Ship));
    Ok(())
}

#[tokio::test]
async fn game_state_shows_the_opponent_sea_under_fog() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let (a, b) = (PlayerId::new("a"), PlayerId::new("b"));
    server.join(&a, join("Alice")).await?;
    server.join(&b, join("Bob")).await?;

    let empty = server.game_state(&a).await?.to_grid()?;
    assert_eq!(empty.dimensions(), (10, 10));
    assert_eq!(empty.count(|c| *c == BattleCell::Water), 100);

    server.place_ships(&b, fleet()).await?;
    server.hit(&a, HitRequest::at(2, 0)).await?;
    let view = server.game_state(&a).await?.to_grid()?;
    assert_eq!(view.get(2, 0), Some(&BattleCell::HitShip));
    assert_eq!(view.get(3, 0), Some(&BattleCell::Water));
    assert_eq!(view.count(|c| *c == BattleCell::Ship), 0);
    Ok(())
}

#[tokio::test]
async fn leaving_destroys_the_session() -> anyhow::Result<()> {
    let server = InMemorySessionServer::new(10, 10);
    let (a, b) = (PlayerId::new("a"), PlayerId::new("b"));
    server.join(&a, join("Alice")).await?;
    server.join(&b, join("Bob")).await?;
    server.leave(&a).await?;
    assert_eq!(server.player_count(), 0);
    assert_eq!(server.departures(), vec![a]);

    server.send_departure_beacon(&b);
    assert_eq!(server.departures().len(), 2);
    Ok(())
}

#[tokio::test]
async fn offline_server_fails_requests_and_loses_beacons() {
    let server = InMemorySessionServer::new(10, 10);
    let a = PlayerId::new("a");
    server.set_offline(true);
    assert!(matches!(
        server.players().await,
        Err(SessionError::NetworkFailure(_))
    ));
    server.send_departure_beacon(&a);
    assert!(server.departures().is_empty());
    server.set_offline(false);
    assert!(server.players().await.is_ok());
}
