use std::collections::HashMap;

/// Tracks live sessions and which room, if any, each one is seated in.
#[derive(Default)]
pub struct ConnectionRegistry {
    seats: HashMap<String, String>,
    live: usize,
}

impl ConnectionRegistry {
    /// Count a newly opened session; returns the live total
    pub fn opened(&mut self) -> usize {
        self.live += 1;
        self.live
    }

    /// Count a closed session; returns the live total
    pub fn closed(&mut self) -> usize {
        self.live = self.live.saturating_sub(1);
        self.live
    }

    pub fn live(&self) -> usize {
        self.live
    }

    pub fn seat(&mut self, conn_id: &str, room_id: &str) {
        self.seats.insert(conn_id.to_string(), room_id.to_string());
    }

    pub fn room_of(&self, conn_id: &str) -> Option<&str> {
        self.seats.get(conn_id).map(String::as_str)
    }

    /// Drop the seat entry for `conn_id`, returning the room it pointed at
    pub fn release(&mut self, conn_id: &str) -> Option<String> {
        self.seats.remove(conn_id)
    }

    pub fn seated(&self) -> usize {
        self.seats.len()
    }
}
