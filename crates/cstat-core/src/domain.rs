/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// One row exactly as the row source delivered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRow {
    pub identifier: String,
    pub status: String,
}

impl RawRow {
    pub fn new(identifier: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            status: status.into(),
        }
    }
}

/// Normalized payment state every raw table spelling is mapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalStatus {
    Paid,
    Unpaid,
    PostPay,
    Unknown,
}

impl CanonicalStatus {
    pub fn parse(s: &str) -> Option<Self> {
        let key = s
            .trim()
            .to_lowercase()
            .replace(|c: char| c == '-' || c == '_' || c.is_whitespace(), "");
        match key.as_str() {
            "paid" => Some(Self::Paid),
            "unpaid" => Some(Self::Unpaid),
            "postpay" => Some(Self::PostPay),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// One logical container row.
///
/// `identifier` and `raw_status` are kept verbatim for display; `status` is
/// the canonical mapping used for filtering and counting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerRecord {
    pub identifier: String,
    pub raw_status: String,
    pub status: CanonicalStatus,
}

/// Outcome of a single-container lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryResult {
    Found(ContainerRecord),
    /// Carries the identifier as the caller typed it.
    NotFound(String),
    ConnectionError(String),
}

/// Aggregate counts over the whole table.
///
/// Rows with an `Unknown` status count toward `total` only, so
/// `paid + unpaid + post_pay <= total`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub post_pay: usize,
}

impl Statistics {
    pub fn record(&mut self, status: CanonicalStatus) {
        self.total += 1;
        match status {
            CanonicalStatus::Paid => self.paid += 1,
            CanonicalStatus::Unpaid => self.unpaid += 1,
            CanonicalStatus::PostPay => self.post_pay += 1,
            CanonicalStatus::Unknown => {}
        }
    }

    /// Paid share in whole percent, rounded down; 0 for an empty table.
    pub fn paid_percentage(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.paid * 100 / self.total
    }
}

/// Classified purpose of one inbound chat message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    ShowMenu,
    PromptForContainer,
    ListUnpaid,
    ShowStatistics,
    ShowHelp,
    LookupContainer(String),
    Unrecognized,
}
