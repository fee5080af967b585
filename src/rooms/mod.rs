pub mod manager;
pub mod registry;

pub use manager::{deliver, RoomManager};
