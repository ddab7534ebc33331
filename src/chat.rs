pub mod conversation;
pub mod loader;
pub mod record;
