use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::rooms::RoomManager;

/// Application state shared between connections.
///
/// Rooms and the connection registry live behind one lock so that each
/// create/join/leave runs as a single atomic step.
#[derive(Default)]
pub struct AppState {
    rooms: Mutex<RoomManager>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooms(&self) -> MutexGuard<'_, RoomManager> {
        // Keep serving after a panic in another session.
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
