use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    domain::ChatId,
    messaging::{port::MessagingPort, types::Reply},
};

/// Best-effort outbound delivery.
///
/// A failed or timed-out send is logged and reported as `false`; it is never
/// retried and never answered with a second message.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    send_timeout: Duration,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, send_timeout: Duration) -> Self {
        Self {
            messenger,
            send_timeout,
        }
    }

    pub async fn notify(&self, chat_id: ChatId, reply: &Reply) -> bool {
        let caps = self.messenger.capabilities();
        let text = truncate_lines(&reply.text, caps.max_message_len);
        let keyboard = reply
            .keyboard
            .clone()
            .filter(|_| caps.supports_reply_keyboards);
        let send = async {
            match keyboard {
                Some(kb) => self.messenger.send_with_keyboard(chat_id, &text, kb).await,
                None => self.messenger.send_html(chat_id, &text).await,
            }
        };

        match timeout(self.send_timeout, send).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::warn!(chat_id = chat_id.0, error = %e, "reply delivery failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    chat_id = chat_id.0,
                    timeout_ms = self.send_timeout.as_millis() as u64,
                    "reply delivery timed out"
                );
                false
            }
        }
    }
}

/// Drop whole trailing lines until the text fits.
///
/// Reply texts open and close their tags on one line, so cutting between
/// lines never leaves an unclosed tag or a split entity.
fn truncate_lines(text: &str, max_len: usize) -> String {
    if max_len == 0 || text.chars().count() <= max_len {
        return text.to_string();
    }
    const MARK: &str = "\n…";
    let budget = max_len.saturating_sub(MARK.chars().count());
    let mut out = String::new();
    let mut used = 0usize;
    for line in text.split_inclusive('\n') {
        let len = line.chars().count();
        if used + len > budget {
            break;
        }
        used += len;
        out.push_str(line);
    }
    out.truncate(out.trim_end_matches('\n').len());
    out.push_str(MARK);
    out
}
