//! Telegram update handlers.
//!
//! Converts a teloxide `Message` into a transport-neutral `InboundEvent` and
//! hands it to the core router. Non-text messages arrive with empty text and
//! are ignored by the router.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use cstat_core::{domain::ChatId, messaging::types::InboundEvent};

use crate::router::AppState;

pub fn inbound_event(msg: &Message) -> InboundEvent {
    InboundEvent {
        destination: Some(ChatId(msg.chat.id.0)),
        text: msg.text().unwrap_or("").to_string(),
    }
}

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let ack = state.router.route(inbound_event(&msg)).await;
    if let Some(detail) = ack.detail {
        tracing::warn!(chat_id = msg.chat.id.0, %detail, "update handled with problems");
    }
    Ok(())
}
