//! Notification rendering, batching, and delivery.

pub mod batch;
pub mod format;
pub mod telegram;

pub use batch::{build_messages, OutboundMessage};
pub use format::render_block;
pub use telegram::TelegramNotifier;
