//! Wire shapes of client and server messages.

use serde_json::json;
use strum::VariantNames;
use tictactoe_rules::{Game, JoinError, Outcome};
use tictactoe_server::{ClientMessage, ProtocolError, ServerMessage};

#[test]
fn test_parse_client_messages() {
    assert_eq!(
        ClientMessage::parse(r#"{"type": "get_state"}"#),
        Ok(ClientMessage::GetState)
    );
    assert_eq!(
        ClientMessage::parse(r#"{"type": "make_move", "x": 2, "y": 1}"#),
        Ok(ClientMessage::MakeMove { x: 2, y: 1 })
    );
}

#[test]
fn test_parse_rejections() {
    assert!(matches!(
        ClientMessage::parse("not json"),
        Err(ProtocolError::InvalidJson(_))
    ));
    assert_eq!(
        ClientMessage::parse(r#"{"x": 1}"#),
        Err(ProtocolError::MissingType)
    );
    assert_eq!(
        ClientMessage::parse(r#"{"type": "resign"}"#),
        Err(ProtocolError::UnknownType("resign".to_string()))
    );
    for payload in [
        r#"{"type": "make_move", "x": 1}"#,
        r#"{"type": "make_move", "x": "a", "y": 1}"#,
        r#"{"type": "make_move", "x": 1.5, "y": 1}"#,
    ] {
        assert!(
            matches!(ClientMessage::parse(payload), Err(ProtocolError::Malformed(_))),
            "{payload} accepted"
        );
    }
}

#[test]
fn test_every_tag_decodes_to_its_variant() {
    assert_eq!(ClientMessage::VARIANTS, ["get_state", "make_move"]);
    for message in [ClientMessage::GetState, ClientMessage::MakeMove { x: 0, y: 2 }] {
        let text = serde_json::to_string(&message).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(ClientMessage::VARIANTS.contains(&value["type"].as_str().unwrap()));
        assert_eq!(ClientMessage::parse(&text), Ok(message));
    }
}

#[test]
fn test_state_message_shape() {
    let mut game = Game::new("alice");
    game.admit("bob").unwrap();
    game.make_move("alice", 1, 1).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&ServerMessage::State(game.snapshot()).to_text().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "state",
            "board": [" ", " ", " ", " ", "O", " ", " ", " ", " "],
            "current_player": "bob",
            "state": "in_game",
            "winner": "",
        })
    );
}

#[test]
fn test_game_over_uses_draw_label() {
    let draw = ServerMessage::game_over(&Outcome::Draw, "Ничья!");
    assert_eq!(
        serde_json::to_value(&draw).unwrap(),
        json!({"type": "game_over", "winner": "Ничья!"})
    );

    let win = ServerMessage::game_over(&Outcome::Winner("bob".to_string()), "Ничья!");
    assert_eq!(
        serde_json::to_value(&win).unwrap(),
        json!({"type": "game_over", "winner": "bob"})
    );
}

#[test]
fn test_error_message_shape() {
    let message = ServerMessage::from(JoinError::LobbyFull);
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({"type": "error", "error": "lobby full"})
    );
}
