//! Telegram Bot API: `sendPhoto` with an inline URL keyboard.
//! Docs: <https://core.telegram.org/bots/api#sendphoto>

pub mod client;
pub mod types;

pub use client::{PhotoSender, TelegramClient};
pub use types::{InlineButton, InlineKeyboard};
