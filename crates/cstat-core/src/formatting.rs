//! Reply texts (Telegram HTML).
//!
//! Everything here is a pure mapping from a repository outcome to text; no I/O.

use crate::domain::{CanonicalStatus, ContainerRecord, QueryResult, Statistics};
use crate::intent::CommandSet;

/// Longest table cell or user input echoed back verbatim.
pub const MAX_ECHO_CHARS: usize = 64;

/// Character budget for the unpaid list, kept under the 4096 Telegram limit.
pub const LIST_BUDGET_CHARS: usize = 3500;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn status_icon(status: CanonicalStatus) -> &'static str {
    match status {
        CanonicalStatus::Paid => "✅",
        CanonicalStatus::Unpaid => "❌",
        CanonicalStatus::PostPay => "🔄",
        CanonicalStatus::Unknown => "❓",
    }
}

pub fn format_query_result(result: &QueryResult) -> String {
    match result {
        QueryResult::Found(rec) => format_record(rec),
        QueryResult::NotFound(id) => format!(
            "❌ Контейнер <b>{}</b> не найден в базе",
            echo(id)
        ),
        QueryResult::ConnectionError(cause) => format_connection_error(cause),
    }
}

pub fn format_record(rec: &ContainerRecord) -> String {
    format!(
        "{} <b>Контейнер:</b> {}\n<b>Статус:</b> {}",
        status_icon(rec.status),
        echo(&rec.identifier),
        echo(&rec.raw_status)
    )
}

pub fn format_connection_error(cause: &str) -> String {
    format!(
        "❌ Ошибка подключения к таблице: {}",
        escape_html(&short_cause(cause))
    )
}

pub fn format_unpaid_list(records: &[ContainerRecord]) -> String {
    if records.is_empty() {
        return "✅ <b>Отлично!</b> Все контейнеры оплачены!"
            .to_string();
    }

    let mut out = format!(
        "💰 <b>Неоплаченные контейнеры ({}):</b>\n\n",
        records.len()
    );
    let mut used = out.chars().count();
    for (i, rec) in records.iter().enumerate() {
        let line = format!(
            "{}. 📦 {} - {}\n",
            i + 1,
            echo(&rec.identifier),
            echo(&rec.raw_status)
        );
        let len = line.chars().count();
        if used + len > LIST_BUDGET_CHARS {
            out.push_str(&format!("… и ещё {}\n", records.len() - i));
            break;
        }
        used += len;
        out.push_str(&line);
    }
    out
}

pub fn format_statistics(stats: &Statistics) -> String {
    format!(
        "📊 <b>Статистика:</b>\n\n\
📦 Всего: <b>{}</b>\n\
✅ Оплачено: <b>{}</b>\n\
❌ Неоплачено: <b>{}</b>\n\
🔄 Постоплата: <b>{}</b>\n\n\
Процент оплаты: <b>{}%</b>",
        stats.total,
        stats.paid,
        stats.unpaid,
        stats.post_pay,
        stats.paid_percentage()
    )
}

pub fn welcome_text() -> String {
    "🚢 <b>Добро пожаловать!</b>\n\n\
Я помогу тебе проверять статус оплаты контейнеров:\n\
✅ Проверить статус оплаты контейнера\n\
✅ Посмотреть список неоплаченных контейнеров\n\
✅ Получить статистику"
        .to_string()
}

pub fn container_prompt_text() -> String {
    "📦 Введи номер контейнера (например: TCLU1234567)".to_string()
}

pub fn help_text(commands: &CommandSet) -> String {
    let slash = |keys: &[String], fallback: &str| {
        keys.iter()
            .find(|k| k.starts_with('/'))
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    format!(
        "🔍 <b>Доступные команды:</b>\n\
/start - Главное меню\n\
{} TCLU1234567 - Проверить контейнер\n\
{} - Неоплаченные\n\
{} - Статистика\n\
{} - Эта справка\n\n\
Или просто отправь номер контейнера.",
        slash(&commands.check, "/check"),
        slash(&commands.unpaid, "/unpaid"),
        slash(&commands.statistics, "/stats"),
        slash(&commands.help, "/help"),
    )
}

pub fn unrecognized_text() -> String {
    "⚠️ Не понял команду. Нажми /start".to_string()
}

/// Escape table or user text, clipping it first so escaping cannot split an entity.
fn echo(text: &str) -> String {
    escape_html(&clip(text, MAX_ECHO_CHARS))
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn short_cause(cause: &str) -> String {
    const MAX: usize = 200;
    let first_line = cause.lines().next().unwrap_or("").trim();
    if first_line.chars().count() <= MAX {
        return first_line.to_string();
    }
    format!("{}...", first_line.chars().take(MAX).collect::<String>())
}
