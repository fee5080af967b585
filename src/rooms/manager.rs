use log::{debug, info, warn};
use serde_json::Value;
use std::collections::HashMap;

use crate::connection::ConnectionRef;
use crate::error::RoomError;
use crate::models::{ChatOrigin, Player, Room, Seat, ServerMessage};
use crate::rooms::registry::ConnectionRegistry;

pub const GAME_START_NOTICE: &str = "Game started, red moves first";
pub const HOST_LEFT_NOTICE: &str = "Host left the room, game over";
pub const GUEST_LEFT_NOTICE: &str = "Opponent left the room";

/// Owns every active room and the connection -> room registry.
///
/// All mutation goes through `&mut self`, so callers serialize access by
/// holding the manager behind a single lock (see `AppState`).
#[derive(Default)]
pub struct RoomManager {
    rooms: HashMap<String, Room>,
    registry: ConnectionRegistry,
}

/// Serialize `msg` and push it to `conn`. Delivery is best-effort: a closed
/// peer is logged and skipped.
pub fn deliver(conn: &ConnectionRef, msg: &ServerMessage) {
    let text = match serde_json::to_string(msg) {
        Ok(text) => text,
        Err(e) => {
            warn!("Error serializing {} message: {}", msg.kind(), e);
            return;
        }
    };
    if let Err(e) = conn.send_text(text) {
        debug!("Dropped {} message: {}", msg.kind(), e);
    }
}

fn normalize_room_id(room_id: &str) -> Result<&str, RoomError> {
    let trimmed = room_id.trim();
    if trimmed.is_empty() {
        return Err(RoomError::InvalidRoomId);
    }
    Ok(trimmed)
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ConnectionRegistry {
        &mut self.registry
    }

    pub fn room(&self, room_id: &str) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Seat `conn` as host of a new room.
    pub fn create_room(&mut self, conn: ConnectionRef, room_id: &str) -> Result<(), RoomError> {
        let room_id = normalize_room_id(room_id)?;
        if self.rooms.contains_key(room_id) {
            return Err(RoomError::RoomAlreadyExists);
        }
        self.leave_current(conn.id());

        let room = Room::new(room_id.to_string(), conn.clone());
        let color = room.host.side;
        info!("Room {} created by {} ({})", room_id, room.host.name, conn.id());
        self.rooms.insert(room_id.to_string(), room);
        self.registry.seat(conn.id(), room_id);

        deliver(
            &conn,
            &ServerMessage::RoomCreated {
                room_id: room_id.to_string(),
                color,
            },
        );
        Ok(())
    }

    /// Seat `conn` as guest and start the game.
    ///
    /// The joiner hears `join_accepted` before the host hears
    /// `opponent_joined`, and `game_start` goes to both seats last.
    pub fn join_room(&mut self, conn: ConnectionRef, room_id: &str) -> Result<(), RoomError> {
        let room_id = normalize_room_id(room_id)?;
        let room = self.rooms.get(room_id).ok_or(RoomError::RoomNotFound)?;
        if room.seat_of(conn.id()).is_some() {
            return Err(RoomError::AlreadySeated);
        }
        if room.is_full() {
            return Err(RoomError::RoomFull);
        }
        self.leave_current(conn.id());

        let room = self.rooms.get_mut(room_id).ok_or(RoomError::RoomNotFound)?;
        let guest = Player::seated(conn.clone(), Seat::Guest);
        let color = guest.side;
        info!("{} ({}) joined room {}", guest.name, conn.id(), room_id);
        room.guest = Some(guest);
        self.registry.seat(conn.id(), room_id);

        deliver(
            &conn,
            &ServerMessage::JoinAccepted {
                room_id: room_id.to_string(),
                color,
            },
        );
        deliver(
            &room.host.conn,
            &ServerMessage::OpponentJoined {
                room_id: room_id.to_string(),
            },
        );

        room.started = true;
        let start = ServerMessage::GameStart {
            message: GAME_START_NOTICE.to_string(),
        };
        for player in room.players() {
            deliver(&player.conn, &start);
        }
        Ok(())
    }

    /// Remove `conn_id` from `room_id`. A leaving host closes the room; a
    /// leaving guest only vacates the guest seat. Unknown room or a
    /// connection that holds neither seat is a no-op.
    pub fn leave_room(&mut self, conn_id: &str, room_id: &str, notify_peer: bool) {
        let Some(seat) = self.rooms.get(room_id).and_then(|r| r.seat_of(conn_id)) else {
            return;
        };
        self.registry.release(conn_id);

        match seat {
            Seat::Host => {
                let Some(room) = self.rooms.remove(room_id) else {
                    return;
                };
                if let Some(guest) = &room.guest {
                    self.registry.release(guest.conn_id());
                    if notify_peer {
                        deliver(
                            &guest.conn,
                            &ServerMessage::OpponentDisconnected {
                                message: HOST_LEFT_NOTICE.to_string(),
                            },
                        );
                    }
                }
                info!("Room {} closed", room.id);
            }
            Seat::Guest => {
                let Some(room) = self.rooms.get_mut(room_id) else {
                    return;
                };
                room.guest = None;
                room.started = false;
                if notify_peer {
                    deliver(
                        &room.host.conn,
                        &ServerMessage::OpponentDisconnected {
                            message: GUEST_LEFT_NOTICE.to_string(),
                        },
                    );
                }
                info!("Guest {} left room {}", conn_id, room_id);
            }
        }
    }

    /// Leave whatever room `conn_id` currently sits in, notifying the peer.
    pub fn leave_current(&mut self, conn_id: &str) {
        if let Some(room_id) = self.registry.room_of(conn_id).map(str::to_owned) {
            self.leave_room(conn_id, &room_id, true);
        }
    }

    /// Cleanup for a closed connection. Safe to call more than once.
    pub fn handle_disconnect(&mut self, conn_id: &str) {
        if self.registry.room_of(conn_id).is_none() {
            debug!("Connection {} closed without a seat", conn_id);
            return;
        }
        self.leave_current(conn_id);
    }

    fn seated_room(&self, conn_id: &str) -> Option<&Room> {
        self.rooms.get(self.registry.room_of(conn_id)?)
    }

    /// The opponent of `conn_id`, but only while its room is full
    fn full_room_opponent(&self, conn_id: &str) -> Option<&Player> {
        self.seated_room(conn_id)
            .filter(|room| room.is_full())
            .and_then(|room| room.opponent_of(conn_id))
    }

    pub fn relay_move(&self, conn_id: &str, payload: Value) {
        match self.full_room_opponent(conn_id) {
            Some(opponent) => deliver(&opponent.conn, &ServerMessage::Move { payload }),
            None => debug!("Dropped move from {}: no opponent", conn_id),
        }
    }

    pub fn relay_chat(&self, conn_id: &str, message: String) {
        match self.seated_room(conn_id).and_then(|room| room.opponent_of(conn_id)) {
            Some(opponent) => deliver(
                &opponent.conn,
                &ServerMessage::Chat {
                    message,
                    from: ChatOrigin::Opponent,
                },
            ),
            None => debug!("Dropped chat from {}: no opponent", conn_id),
        }
    }

    pub fn relay_restart_request(&self, conn_id: &str) {
        match self.full_room_opponent(conn_id) {
            Some(opponent) => deliver(&opponent.conn, &ServerMessage::RestartRequest),
            None => debug!("Dropped restart request from {}: no opponent", conn_id),
        }
    }

    /// Unlike the request, acceptance goes to every occupied seat.
    pub fn relay_restart_accept(&self, conn_id: &str) {
        if let Some(room) = self.seated_room(conn_id) {
            for player in room.players() {
                deliver(&player.conn, &ServerMessage::RestartAccepted);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing::RecordingConnection;
    use crate::models::Side;
    use serde_json::json;
    use std::sync::Arc;

    fn paired(room_id: &str) -> (RoomManager, Arc<RecordingConnection>, Arc<RecordingConnection>) {
        let mut rooms = RoomManager::new();
        let host = RecordingConnection::new("a");
        let guest = RecordingConnection::new("b");
        rooms.create_room(host.clone(), room_id).unwrap();
        rooms.join_room(guest.clone(), room_id).unwrap();
        host.take();
        guest.take();
        (rooms, host, guest)
    }

    #[test]
    fn create_then_join_handshake() {
        let mut rooms = RoomManager::new();
        let a = RecordingConnection::new("a");
        let b = RecordingConnection::new("b");

        rooms.create_room(a.clone(), "42").unwrap();
        assert_eq!(
            a.take(),
            vec![json!({"type": "room_created", "roomId": "42", "color": "red"})]
        );

        rooms.join_room(b.clone(), "42").unwrap();
        let to_b = b.take();
        assert_eq!(
            to_b[0],
            json!({"type": "join_accepted", "roomId": "42", "color": "black"})
        );
        assert_eq!(to_b[1], json!({"type": "game_start", "message": GAME_START_NOTICE}));
        assert_eq!(to_b.len(), 2);

        let to_a = a.take();
        assert_eq!(to_a[0], json!({"type": "opponent_joined", "roomId": "42"}));
        assert_eq!(to_a[1]["type"], "game_start");
        assert_eq!(to_a.len(), 2);

        let room = rooms.room("42").unwrap();
        assert_eq!(room.id, "42");
        assert!(room.started);
        assert_eq!(room.host.side, Side::Red);
        assert_eq!(room.guest.as_ref().unwrap().side, Side::Black);
    }

    #[test]
    fn duplicate_room_id_is_rejected_for_anyone() {
        let mut rooms = RoomManager::new();
        let a = RecordingConnection::new("a");
        let b = RecordingConnection::new("b");
        rooms.create_room(a.clone(), "X").unwrap();

        assert_eq!(rooms.create_room(b.clone(), "X"), Err(RoomError::RoomAlreadyExists));
        assert_eq!(rooms.create_room(a.clone(), "X"), Err(RoomError::RoomAlreadyExists));
        assert_eq!(rooms.room_count(), 1);
        assert!(b.take().is_empty());
    }

    #[test]
    fn join_unknown_room() {
        let mut rooms = RoomManager::new();
        let b = RecordingConnection::new("b");
        assert_eq!(rooms.join_room(b.clone(), "X"), Err(RoomError::RoomNotFound));
        assert_eq!(rooms.registry().room_of("b"), None);
    }

    #[test]
    fn third_player_is_turned_away() {
        let (mut rooms, a, b) = paired("r");
        let c = RecordingConnection::new("c");
        assert_eq!(rooms.join_room(c.clone(), "r"), Err(RoomError::RoomFull));
        assert!(a.take().is_empty());
        assert!(b.take().is_empty());
        assert_eq!(rooms.registry().room_of("c"), None);
    }

    #[test]
    fn blank_room_id_is_invalid() {
        let mut rooms = RoomManager::new();
        let a = RecordingConnection::new("a");
        assert_eq!(rooms.create_room(a.clone(), "   "), Err(RoomError::InvalidRoomId));
        assert_eq!(rooms.join_room(a.clone(), ""), Err(RoomError::InvalidRoomId));
        rooms.create_room(a.clone(), " 7 ").unwrap();
        assert!(rooms.room("7").is_some());
    }

    #[test]
    fn host_leaving_closes_room() {
        let (mut rooms, _a, b) = paired("X");
        rooms.leave_room("a", "X", true);

        assert!(rooms.room("X").is_none());
        assert_eq!(rooms.registry().seated(), 0);
        assert_eq!(
            b.take(),
            vec![json!({"type": "opponent_disconnected", "message": HOST_LEFT_NOTICE})]
        );

        let c = RecordingConnection::new("c");
        assert_eq!(rooms.join_room(c, "X"), Err(RoomError::RoomNotFound));
    }

    #[test]
    fn guest_leaving_reopens_room() {
        let (mut rooms, a, b) = paired("X");
        rooms.leave_room("b", "X", true);

        let room = rooms.room("X").unwrap();
        assert!(room.guest.is_none());
        assert!(!room.started);
        assert_eq!(a.take_types(), vec!["opponent_disconnected"]);
        assert!(b.take().is_empty());

        let c = RecordingConnection::new("c");
        rooms.join_room(c.clone(), "X").unwrap();
        assert_eq!(c.take()[0]["color"], "black");
        assert!(rooms.room("X").unwrap().started);
    }

    #[test]
    fn silent_leave_notifies_nobody() {
        let (mut rooms, a, b) = paired("X");
        rooms.leave_room("b", "X", false);
        assert!(a.take().is_empty());

        rooms.join_room(b.clone(), "X").unwrap();
        a.take();
        rooms.leave_room("a", "X", false);
        assert!(b.take_types().iter().all(|t| t == "join_accepted" || t == "game_start"));
        assert_eq!(rooms.registry().room_of("b"), None);
    }

    #[test]
    fn leave_is_noop_for_strangers_and_unknown_rooms() {
        let (mut rooms, a, b) = paired("X");
        rooms.leave_room("c", "X", true);
        rooms.leave_room("a", "missing", true);
        assert!(rooms.room("X").unwrap().is_full());
        assert!(a.take().is_empty());
        assert!(b.take().is_empty());
    }

    #[test]
    fn moves_reach_only_the_opponent() {
        let (rooms, a, b) = paired("X");
        let payload = json!({"from": {"x": 1, "y": 9}, "to": {"x": 2, "y": 7}});

        rooms.relay_move("a", payload.clone());
        assert_eq!(b.take(), vec![json!({"type": "move", "move": payload.clone()})]);
        assert!(a.take().is_empty());

        rooms.relay_move("b", payload.clone());
        assert_eq!(a.take(), vec![json!({"type": "move", "move": payload})]);
        assert!(b.take().is_empty());
    }

    #[test]
    fn moves_in_open_room_are_dropped() {
        let mut rooms = RoomManager::new();
        let a = RecordingConnection::new("a");
        rooms.create_room(a.clone(), "X").unwrap();
        a.take();
        rooms.relay_move("a", json!("e2e4"));
        rooms.relay_move("nobody", json!("e2e4"));
        assert!(a.take().is_empty());
    }

    #[test]
    fn chat_is_tagged_as_opponent() {
        let (rooms, a, b) = paired("X");
        rooms.relay_chat("b", "good luck".into());
        assert_eq!(
            a.take(),
            vec![json!({"type": "chat", "message": "good luck", "from": "opponent"})]
        );
        assert!(b.take().is_empty());
    }

    #[test]
    fn chat_without_guest_is_dropped() {
        let mut rooms = RoomManager::new();
        let a = RecordingConnection::new("a");
        rooms.create_room(a.clone(), "X").unwrap();
        a.take();
        rooms.relay_chat("a", "anyone?".into());
        assert!(a.take().is_empty());
    }

    #[test]
    fn restart_request_is_one_way_accept_is_broadcast() {
        let (rooms, a, b) = paired("X");

        rooms.relay_restart_request("a");
        assert!(a.take().is_empty());
        assert_eq!(b.take_types(), vec!["restart_request"]);

        rooms.relay_restart_accept("b");
        assert_eq!(a.take_types(), vec!["restart_accepted"]);
        assert_eq!(b.take_types(), vec!["restart_accepted"]);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (mut rooms, a, _b) = paired("X");
        rooms.handle_disconnect("b");
        rooms.handle_disconnect("b");
        assert_eq!(a.take_types(), vec!["opponent_disconnected"]);

        rooms.handle_disconnect("never-seated");
        assert_eq!(rooms.room_count(), 1);
    }

    #[test]
    fn closed_peer_does_not_abort_the_operation() {
        let (mut rooms, a, b) = paired("X");
        b.close();
        rooms.relay_move("a", json!(1));
        rooms.leave_room("a", "X", true);
        assert!(rooms.room("X").is_none());
        assert_eq!(rooms.registry().seated(), 0);
        assert!(a.take().is_empty());
    }

    #[test]
    fn creating_elsewhere_leaves_the_old_room() {
        let (mut rooms, a, b) = paired("X");
        rooms.create_room(b.clone(), "Y").unwrap();

        assert_eq!(a.take_types(), vec!["opponent_disconnected"]);
        assert!(rooms.room("X").unwrap().guest.is_none());
        assert_eq!(rooms.registry().room_of("b"), Some("Y"));
        assert_eq!(b.take_types(), vec!["room_created"]);
    }

    #[test]
    fn rejected_join_keeps_current_seat() {
        let (mut rooms, a, _b) = paired("X");
        assert_eq!(rooms.join_room(a.clone(), "X"), Err(RoomError::AlreadySeated));
        assert_eq!(rooms.join_room(a.clone(), "nowhere"), Err(RoomError::RoomNotFound));
        assert_eq!(rooms.registry().room_of("a"), Some("X"));
        assert!(rooms.room("X").unwrap().is_full());
    }
}
