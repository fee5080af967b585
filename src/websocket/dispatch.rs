use log::{debug, info, warn};

use crate::connection::ConnectionRef;
use crate::models::{AppState, ClientMessage, ServerMessage};
use crate::rooms::deliver;

/// Decode one text frame and run it. Undecodable frames are logged and
/// skipped; they never end the session.
pub fn handle_text(app_state: &AppState, conn: &ConnectionRef, text: &str) {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => dispatch(app_state, conn, msg),
        Err(e) => warn!("Invalid message from {}: {} ({})", conn.id(), e, text),
    }
}

/// Route a decoded client message to the room manager.
pub fn dispatch(app_state: &AppState, conn: &ConnectionRef, msg: ClientMessage) {
    let conn_id = conn.id();
    match msg {
        ClientMessage::Ping => deliver(conn, &ServerMessage::Pong),
        ClientMessage::Unknown => debug!("Ignoring unknown message type from {}", conn_id),
        ClientMessage::CreateRoom { room_id } => {
            info!("Processing create_room {} from {}", room_id, conn_id);
            let result = app_state.rooms().create_room(conn.clone(), &room_id);
            if let Err(e) = result {
                info!("create_room {} rejected: {}", room_id, e);
                deliver(conn, &ServerMessage::error(e));
            }
        }
        ClientMessage::JoinRoom { room_id } => {
            info!("Processing join_room {} from {}", room_id, conn_id);
            let result = app_state.rooms().join_room(conn.clone(), &room_id);
            if let Err(e) = result {
                info!("join_room {} rejected: {}", room_id, e);
                deliver(conn, &ServerMessage::error(e));
            }
        }
        ClientMessage::LeaveRoom => app_state.rooms().leave_current(conn_id),
        ClientMessage::Move { payload } => app_state.rooms().relay_move(conn_id, payload),
        ClientMessage::Chat { message } => app_state.rooms().relay_chat(conn_id, message),
        ClientMessage::RestartRequest => app_state.rooms().relay_restart_request(conn_id),
        ClientMessage::RestartAccept => app_state.rooms().relay_restart_accept(conn_id),
    }
}
