pub mod controller;
pub mod directory;
pub mod state;
pub mod store;

// Re-export the pieces the binary and tests wire together.
pub use controller::ConversationController;
pub use directory::StudyDirectory;
pub use state::{AppState, StudyState, Theme};
pub use store::StudySessionStore;
