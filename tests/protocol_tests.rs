use battleship_royale::protocol::{
    Coordinates, GameStateResponse, HitRequest, HitResponse, HitVerdict, JoinRequest, JoinResponse, JoinStatus,
    PlaceShipsRequest, PlayersResponse, ReadyEntry, ShipPayload,
};
use battleship_royale::{BattleBoard, BattleCell, HitOutcome, Orientation, PlacementEngine, PlayerId, SessionError, ShipId};
use serde_json::json;

#[test]
fn join_request_uses_camel_case() {
    let body = serde_json::to_value(JoinRequest {
        player_name: "Ahab".to_string(),
    })
    .unwrap();
    assert_eq!(body, json!({ "playerName": "Ahab" }));
}

#[test]
fn join_status_is_interpreted() {
    let accepted: JoinResponse = serde_json::from_value(json!({ "status": "Player accepted" })).unwrap();
    assert_eq!(accepted.join_status(), JoinStatus::Accepted);
    let full: JoinResponse = serde_json::from_value(json!({ "status": "Session full" })).unwrap();
    assert_eq!(full.join_status(), JoinStatus::SessionFull);
    let odd: JoinResponse = serde_json::from_value(json!({ "status": "Maintenance" })).unwrap();
    assert_eq!(odd.join_status(), JoinStatus::Other("Maintenance".to_string()));
}

#[test]
fn players_and_ready_lists_decode() {
    let players: PlayersResponse = serde_json::from_value(json!({ "playerIds": ["a1", "b2"] })).unwrap();
    assert_eq!(players.player_ids, vec![PlayerId::new("a1"), PlayerId::new("b2")]);

    let ready: Vec<ReadyEntry> = serde_json::from_value(json!([
        { "id": "a1", "readyForBattle": true },
        { "id": "b2", "readyForBattle": false }
    ]))
    .unwrap();
    assert_eq!(ready[0].id, PlayerId::new("a1"));
    assert!(ready[0].ready_for_battle);
    assert!(!ready[1].ready_for_battle);
}

#[test]
fn ship_payload_matches_the_server_schema() {
    let mut engine = PlacementEngine::standard();
    engine
        .try_place(ShipId::new(2).unwrap(), 4, 1, Orientation::Vertical)
        .unwrap();
    let layout = engine.describe_fleet();
    let request = PlaceShipsRequest {
        ships: vec![ShipPayload::from(&layout[1])],
    };
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(
        body,
        json!({
            "ships": [{
                "name": "Submarine",
                "shipType": 2,
                "firstCell_coordinates": { "x": 1, "y": 4 },
                "orientation": "VERTICAL"
            }]
        })
    );
    let back: PlaceShipsRequest = serde_json::from_value(body).unwrap();
    assert_eq!(back.ships[0].first_cell_coordinates, Coordinates { x: 1, y: 4 });
}

#[test]
fn game_state_decodes_cell_codes() {
    let state: GameStateResponse = serde_json::from_value(json!({
        "mainGrid": { "grid": [[1, 2, 3], [4, 1, 1]] }
    }))
    .unwrap();
    let grid = state.to_grid().unwrap();
    assert_eq!(grid.dimensions(), (2, 3));
    assert_eq!(grid.get(0, 1), Some(&BattleCell::HitWater));
    assert_eq!(grid.get(0, 2), Some(&BattleCell::Ship));
    assert_eq!(grid.get(1, 0), Some(&BattleCell::HitShip));
}

#[test]
fn game_state_rejects_unknown_codes_and_ragged_rows() {
    let unknown: GameStateResponse = serde_json::from_value(json!({
        "mainGrid": { "grid": [[1, 9]] }
    }))
    .unwrap();
    assert!(matches!(unknown.to_grid(), Err(SessionError::UnexpectedServerResponse(_))));

    let ragged: GameStateResponse = serde_json::from_value(json!({
        "mainGrid": { "grid": [[1, 1], [1]] }
    }))
    .unwrap();
    assert!(matches!(ragged.to_grid(), Err(SessionError::UnexpectedServerResponse(_))));
}

#[test]
fn game_state_encodes_a_board() {
    let mut board = BattleBoard::new(2, 2);
    board.apply_hit(1, 0).unwrap();
    let body = serde_json::to_value(GameStateResponse::from_grid(board.grid())).unwrap();
    assert_eq!(body, json!({ "mainGrid": { "grid": [[1, 1], [2, 1]] } }));
}

#[test]
fn hit_request_puts_column_in_x() {
    let body = serde_json::to_value(HitRequest::at(7, 30)).unwrap();
    assert_eq!(body, json!({ "x": 30, "y": 7 }));
}

#[test]
fn hit_response_with_and_without_sunk_ship() {
    let sunk: HitResponse = serde_json::from_value(json!({ "result": "sunk", "sunkShip": "Destroyer" })).unwrap();
    assert_eq!(sunk.result, HitVerdict::Sunk);
    assert_eq!(sunk.sunk_ship.as_deref(), Some("Destroyer"));
    assert_eq!(sunk.result.cell(), BattleCell::HitShip);
    assert_eq!(sunk.result.outcome(), HitOutcome::Sunk);

    let miss: HitResponse = serde_json::from_value(json!({ "result": "miss" })).unwrap();
    assert_eq!(miss.sunk_ship, None);
    assert_eq!(miss.result.cell(), BattleCell::HitWater);
    assert_eq!(serde_json::to_value(&miss).unwrap(), json!({ "result": "miss" }));
}
