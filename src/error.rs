use thiserror::Error;

/// Reasons a room operation is rejected. The display text is what the
/// requesting client sees in the `error` message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room already exists, please choose another room id")]
    RoomAlreadyExists,

    #[error("Room not found")]
    RoomNotFound,

    #[error("Room is full")]
    RoomFull,

    #[error("Room id must not be empty")]
    InvalidRoomId,

    #[error("You are already in this room")]
    AlreadySeated,
}

/// Delivery to a connection failed because its session is gone.
#[derive(Debug, Error)]
#[error("connection {0} is closed")]
pub struct SendError(pub String);
