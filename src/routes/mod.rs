use actix_files as fs;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::path::Path;

use crate::models::AppState;

#[derive(Serialize)]
struct HealthReport {
    status: &'static str,
    rooms: usize,
    seated: usize,
    sessions: usize,
}

/// HTTP handler for the index page
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Xiangqi relay server. Connect over WebSocket at /ws")
}

/// Room and session counts
pub async fn health(app_state: web::Data<AppState>) -> impl Responder {
    let report = {
        let rooms = app_state.rooms();
        HealthReport {
            status: "ok",
            rooms: rooms.room_count(),
            seated: rooms.registry().seated(),
            sessions: rooms.registry().live(),
        }
    };
    HttpResponse::Ok().json(report)
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(crate::websocket::ws_index)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/").route(web::get().to(index)));
}

/// Serve the browser client from `dir` under /static, when configured
pub fn configure_static(cfg: &mut web::ServiceConfig, dir: Option<&Path>) {
    if let Some(dir) = dir {
        cfg.service(fs::Files::new("/static", dir).index_file("index.html"));
    }
}
