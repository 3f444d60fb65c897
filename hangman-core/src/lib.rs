pub mod game;
pub mod messages;
pub mod ranking;
pub mod scoring;

// Re-export main components
pub use game::*;
pub use messages::*;
pub use ranking::*;
pub use scoring::*;
