//! API endpoints module.

pub mod chat;
pub mod contact;
pub mod events;

pub use chat::send_chat;
pub use contact::submit_contact;
pub use events::{get_inbox, list_status, post_event, post_route, post_status};
