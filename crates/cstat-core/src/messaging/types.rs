use crate::domain::ChatId;

/// Transport-neutral inbound chat event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    /// `None` when the transport could not tell who sent the message.
    pub destination: Option<ChatId>,
    pub text: String,
}

impl InboundEvent {
    pub fn new(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            destination: Some(chat_id),
            text: text.into(),
        }
    }
}

/// One outbound reply: HTML text plus an optional persistent keyboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<ReplyKeyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: ReplyKeyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// Reply keyboard (buttons below the input field) whose labels are sent back as text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
    pub resize: bool,
    pub one_time: bool,
}

impl ReplyKeyboard {
    /// Convenience for "one button per row" layouts.
    pub fn one_per_row<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: labels.into_iter().map(|l| vec![l.into()]).collect(),
            resize: true,
            one_time: false,
        }
    }
}

/// Acknowledgement handed back to the transport for every routed event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ack {
    pub handled: bool,
    pub detail: Option<String>,
}

impl Ack {
    pub fn handled() -> Self {
        Self {
            handled: true,
            detail: None,
        }
    }

    pub fn handled_with(detail: impl Into<String>) -> Self {
        Self {
            handled: true,
            detail: Some(detail.into()),
        }
    }
}

/// Capabilities / feature flags of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub supports_reply_keyboards: bool,
    pub max_message_len: usize,
}
