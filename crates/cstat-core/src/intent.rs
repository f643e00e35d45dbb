//! Inbound text → `Intent`.

use crate::domain::Intent;

pub const START_COMMAND: &str = "/start";

/// Literal trigger phrases per intent: menu-button labels and slash commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSet {
    pub check: Vec<String>,
    pub unpaid: Vec<String>,
    pub statistics: Vec<String>,
    pub help: Vec<String>,
}

impl Default for CommandSet {
    fn default() -> Self {
        let v = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
        Self {
            check: v(&["🔍 Проверить контейнер", "/check"]),
            unpaid: v(&["💰 Неоплаченные", "/unpaid"]),
            statistics: v(&["📊 Статистика", "/stats"]),
            help: v(&["❓ Справка", "/help"]),
        }
    }
}

impl CommandSet {
    /// Menu-button labels, in menu order (first non-slash key of each set).
    pub fn menu_labels(&self) -> Vec<String> {
        [&self.check, &self.unpaid, &self.statistics, &self.help]
            .into_iter()
            .filter_map(|keys| keys.iter().find(|k| !k.starts_with('/')).cloned())
            .collect()
    }

    fn exact(&self, text: &str) -> Option<Intent> {
        let hit = |keys: &[String]| keys.iter().any(|k| k == text);
        if hit(&self.check) {
            Some(Intent::PromptForContainer)
        } else if hit(&self.unpaid) {
            Some(Intent::ListUnpaid)
        } else if hit(&self.statistics) {
            Some(Intent::ShowStatistics)
        } else if hit(&self.help) {
            Some(Intent::ShowHelp)
        } else {
            None
        }
    }

    /// `/check TCLU1234567` carries the container code inline.
    fn inline_check_argument<'a>(&self, text: &'a str) -> Option<&'a str> {
        let (cmd, rest) = split_command(text)?;
        let rest = rest.trim();
        if rest.is_empty() {
            return None;
        }
        self.check
            .iter()
            .any(|k| k.starts_with('/') && *k == cmd)
            .then_some(rest)
    }
}

/// Classify one message. `None` means "ignore silently" (empty text).
///
/// Precedence: `/start`, exact command keys, inline `/check <code>`, then
/// anything at least `min_lookup_len` characters long is taken as a container
/// code, and the rest is unrecognized.
pub fn classify(text: &str, commands: &CommandSet, min_lookup_len: usize) -> Option<Intent> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let key = strip_bot_mention(text);
    if key == START_COMMAND {
        return Some(Intent::ShowMenu);
    }
    if let Some(intent) = commands.exact(&key) {
        return Some(intent);
    }
    if let Some(code) = commands.inline_check_argument(text) {
        return Some(Intent::LookupContainer(code.to_string()));
    }
    if text.chars().count() >= min_lookup_len {
        return Some(Intent::LookupContainer(text.to_string()));
    }
    Some(Intent::Unrecognized)
}

/// Split `/cmd@botname rest` into (`/cmd`, `rest`). `None` for non-commands.
fn split_command(text: &str) -> Option<(String, &str)> {
    if !text.starts_with('/') {
        return None;
    }
    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("");
    let cmd = first.split('@').next().unwrap_or("").to_string();
    Some((cmd, rest))
}

/// Telegram may deliver `/stats@my_bot` in group chats.
fn strip_bot_mention(text: &str) -> String {
    match split_command(text) {
        Some((cmd, rest)) if rest.trim().is_empty() => cmd,
        _ => text.to_string(),
    }
}
