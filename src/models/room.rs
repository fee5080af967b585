use serde::{Deserialize, Serialize};

use crate::connection::ConnectionRef;

/// The side a seated player moves for. Red always moves first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Red,
    Black,
}

/// Which of the two seats of a room a connection occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Host,
    Guest,
}

impl Seat {
    /// Host is always first-mover, guest always second-mover.
    pub fn side(self) -> Side {
        match self {
            Seat::Host => Side::Red,
            Seat::Guest => Side::Black,
        }
    }

    fn default_name(self) -> &'static str {
        match self {
            Seat::Host => "Host",
            Seat::Guest => "Guest",
        }
    }
}

/// A connection seated in a room. The player only references the
/// connection; the session actor owns its lifecycle.
pub struct Player {
    pub conn: ConnectionRef,
    pub side: Side,
    pub name: String,
}

impl Player {
    pub fn seated(conn: ConnectionRef, seat: Seat) -> Self {
        Player {
            conn,
            side: seat.side(),
            name: seat.default_name().to_string(),
        }
    }

    pub fn conn_id(&self) -> &str {
        self.conn.id()
    }
}

/// Two-seat session. A room always has a host; `guest` is present iff full.
pub struct Room {
    pub id: String,
    pub host: Player,
    pub guest: Option<Player>,
    pub started: bool,
}

impl Room {
    pub fn new(id: String, host: ConnectionRef) -> Self {
        Room {
            id,
            host: Player::seated(host, Seat::Host),
            guest: None,
            started: false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.guest.is_some()
    }

    /// Occupied seats, host first
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        std::iter::once(&self.host).chain(self.guest.as_ref())
    }

    pub fn seat_of(&self, conn_id: &str) -> Option<Seat> {
        if self.host.conn_id() == conn_id {
            Some(Seat::Host)
        } else if self.guest.as_ref().is_some_and(|g| g.conn_id() == conn_id) {
            Some(Seat::Guest)
        } else {
            None
        }
    }

    /// The player in the other seat, if `conn_id` is seated and that seat is occupied
    pub fn opponent_of(&self, conn_id: &str) -> Option<&Player> {
        match self.seat_of(conn_id)? {
            Seat::Host => self.guest.as_ref(),
            Seat::Guest => Some(&self.host),
        }
    }
}
