use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::config::Heartbeat;
use crate::connection::{ConnectionRef, SessionHandle};
use crate::models::{AppState, RelayFrame};
use crate::websocket::dispatch;

/// One WebSocket client. Each session is its own actor; sessions only
/// interact through the shared `AppState`.
pub struct RelaySession {
    pub id: String,
    pub app_state: web::Data<AppState>,
    heartbeat: Heartbeat,
    last_seen: Instant,
    handle: Option<ConnectionRef>,
}

impl RelaySession {
    pub fn new(id: String, app_state: web::Data<AppState>, heartbeat: Heartbeat) -> Self {
        RelaySession {
            id,
            app_state,
            heartbeat,
            last_seen: Instant::now(),
            handle: None,
        }
    }

    /// Ping the client every interval and stop the session once it has
    /// been silent for longer than the timeout.
    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(self.heartbeat.interval, |_, ctx| {
            ctx.ping(b"");
        });
        ctx.run_interval(self.heartbeat.check_every(), |act, ctx| {
            if Instant::now().duration_since(act.last_seen) > act.heartbeat.timeout {
                warn!("Heartbeat timed out for {}, closing", act.id);
                ctx.stop();
            }
        });
    }
}

impl Actor for RelaySession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.handle = Some(Arc::new(SessionHandle::new(self.id.clone(), ctx.address())));
        let live = self.app_state.rooms().registry_mut().opened();
        info!("WebSocket connection started: {}", self.id);
        info!("Total active sessions: {}", live);
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        let live = {
            let mut rooms = self.app_state.rooms();
            rooms.handle_disconnect(&self.id);
            rooms.registry_mut().closed()
        };
        self.handle = None;
        info!("WebSocket connection closed: {}", self.id);
        info!("Total active sessions: {}", live);
    }
}

impl Handler<RelayFrame> for RelaySession {
    type Result = ();

    fn handle(&mut self, msg: RelayFrame, ctx: &mut Self::Context) {
        debug!("Forwarding message to {}: {}", self.id, msg.0);
        ctx.text(msg.0);
    }
}

// WebSocket message handler
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for RelaySession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Protocol error on {}: {}", self.id, e);
                ctx.stop();
                return;
            }
        };
        self.last_seen = Instant::now();

        match msg {
            ws::Message::Ping(bytes) => {
                ctx.pong(&bytes);
            }
            ws::Message::Pong(_) => {}
            ws::Message::Text(text) => {
                debug!("Received text message from {}: {}", self.id, text);
                if let Some(conn) = &self.handle {
                    dispatch::handle_text(&self.app_state, conn, &text);
                }
            }
            ws::Message::Binary(_) => {
                warn!("Binary messages are not supported, ignoring frame from {}", self.id);
            }
            ws::Message::Close(reason) => {
                info!("Connection closed by {}: {:?}", self.id, reason);
                ctx.close(reason);
                ctx.stop();
            }
            ws::Message::Continuation(_) => {
                warn!("Fragmented frames are not supported, closing {}", self.id);
                ctx.stop();
            }
            ws::Message::Nop => {}
        }
    }
}

/// WebSocket connection handler
pub async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
    heartbeat: web::Data<Heartbeat>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    info!("New WebSocket connection request: {}", id);

    let session = RelaySession::new(id, app_state, **heartbeat);
    ws::start(session, &req, stream)
}
