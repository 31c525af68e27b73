//! Broadcast fan-out and registration rules.

use axum::extract::ws::Message;
use tictactoe_server::{ConnectionManager, GameManager, ServerMessage};
use tokio::sync::mpsc;

fn text(message: Message) -> serde_json::Value {
    match message {
        Message::Text(text) => serde_json::from_str(text.as_str()).unwrap(),
        other => panic!("expected text frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_broadcast_reaches_every_socket_in_room() {
    let connections = ConnectionManager::default();
    let (alice_tx, mut alice_rx) = mpsc::unbounded_channel();
    let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
    let (carol_tx, mut carol_rx) = mpsc::unbounded_channel();
    connections.connect(1, "alice", alice_tx);
    connections.connect(1, "bob", bob_tx);
    connections.connect(2, "carol", carol_tx);

    let message = ServerMessage::GameOver {
        winner: "alice".to_string(),
    };
    assert_eq!(connections.broadcast(1, &message), 2);

    assert_eq!(text(alice_rx.recv().await.unwrap())["winner"], "alice");
    assert_eq!(text(bob_rx.recv().await.unwrap())["winner"], "alice");
    assert!(carol_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_failed_recipient_does_not_block_others() {
    let connections = ConnectionManager::default();
    let (alice_tx, alice_rx) = mpsc::unbounded_channel();
    let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
    connections.connect(1, "alice", alice_tx);
    connections.connect(1, "bob", bob_tx);
    drop(alice_rx);

    let message = ServerMessage::GameOver {
        winner: "bob".to_string(),
    };
    assert_eq!(connections.broadcast(1, &message), 1);
    assert_eq!(text(bob_rx.recv().await.unwrap())["type"], "game_over");
}

#[tokio::test]
async fn test_reconnect_replaces_and_stale_cleanup_is_ignored() {
    let connections = ConnectionManager::default();
    let (old_tx, _old_rx) = mpsc::unbounded_channel();
    let (new_tx, mut new_rx) = mpsc::unbounded_channel();

    let old = connections.connect(1, "alice", old_tx);
    let new = connections.connect(1, "alice", new_tx);
    assert_ne!(old, new);
    assert_eq!(connections.connection_count(1), 1);

    assert!(!connections.disconnect(1, "alice", old));
    assert_eq!(connections.connection_count(1), 1);

    connections.broadcast(1, &ServerMessage::GameOver { winner: "x".into() });
    assert!(new_rx.recv().await.is_some());

    assert!(connections.disconnect(1, "alice", new));
    assert_eq!(connections.room_count(), 0);
}

#[tokio::test]
async fn test_broadcast_game_state_and_game_over() {
    let games = GameManager::new();
    let connections = ConnectionManager::new("Draw!");
    let (tx, mut rx) = mpsc::unbounded_channel();
    games.connect_to_game(7, "alice").await.unwrap();
    games.connect_to_game(7, "bob").await.unwrap();
    connections.connect(7, "alice", tx);

    assert_eq!(connections.broadcast_game_state(&games, 7).await, 1);
    let state = text(rx.recv().await.unwrap());
    assert_eq!(state["type"], "state");
    assert_eq!(state["state"], "in_game");

    // Not finished: nothing to announce.
    assert_eq!(connections.broadcast_game_over(&games, 7).await, 0);

    // O X O / O X X / X O O
    for (name, x, y) in [
        ("alice", 0, 0),
        ("bob", 1, 0),
        ("alice", 2, 0),
        ("bob", 1, 1),
        ("alice", 0, 1),
        ("bob", 2, 1),
        ("alice", 1, 2),
        ("bob", 0, 2),
        ("alice", 2, 2),
    ] {
        games.make_move(7, name, x, y).await.unwrap();
    }
    assert_eq!(connections.broadcast_game_over(&games, 7).await, 1);
    assert_eq!(
        text(rx.recv().await.unwrap()),
        serde_json::json!({"type": "game_over", "winner": "Draw!"})
    );

    // Unknown rooms broadcast nothing.
    assert_eq!(connections.broadcast_game_state(&games, 99).await, 0);
}
