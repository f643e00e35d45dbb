use std::{env, fs, path::Path, time::Duration};

use crate::{errors::Error, intent::CommandSet, status::StatusVocabulary, Result};

pub const DEFAULT_SHEET_NAME: &str = "Контейнеры";
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Контейнер";
pub const DEFAULT_STATUS_COLUMN: &str = "Статус";

/// How the row source authenticates against the Sheets API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SheetsAuth {
    ApiKey(String),
    BearerToken(String),
}

/// Typed configuration, resolved once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_bot_token: String,

    // Status table
    pub sheet_id: String,
    pub sheet_name: String,
    pub sheets_auth: SheetsAuth,
    pub sheets_api_base: String,
    pub identifier_column: String,
    pub status_column: String,
    pub status_vocabulary: StatusVocabulary,

    // Routing
    pub commands: CommandSet,
    pub min_lookup_len: usize,

    // Timeouts
    pub fetch_timeout: Duration,
    pub send_timeout: Duration,
}

impl Config {
    /// Read the process environment, after loading `.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key → value source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| get(key).and_then(non_empty);

        // Required
        let telegram_bot_token = var("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let sheet_id = var("SHEET_ID")
            .ok_or_else(|| Error::Config("SHEET_ID environment variable is required".to_string()))?;

        let sheets_auth = match (var("GOOGLE_ACCESS_TOKEN"), var("GOOGLE_SHEETS_API_KEY")) {
            (Some(token), _) => SheetsAuth::BearerToken(token),
            (None, Some(key)) => SheetsAuth::ApiKey(key),
            (None, None) => {
                return Err(Error::Config(
                    "GOOGLE_ACCESS_TOKEN or GOOGLE_SHEETS_API_KEY environment variable is required"
                        .to_string(),
                ))
            }
        };

        // Table layout
        let sheet_name = var("SHEET_NAME").unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string());
        let sheets_api_base = var("SHEETS_API_BASE")
            .unwrap_or_else(|| DEFAULT_SHEETS_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let identifier_column =
            var("IDENTIFIER_COLUMN").unwrap_or_else(|| DEFAULT_IDENTIFIER_COLUMN.to_string());
        let status_column =
            var("STATUS_COLUMN").unwrap_or_else(|| DEFAULT_STATUS_COLUMN.to_string());
        let status_vocabulary = match var("STATUS_VOCABULARY") {
            Some(table) => StatusVocabulary::parse(&table)?,
            None => StatusVocabulary::default(),
        };

        // Routing
        let min_lookup_len = parse_usize(&var, "MIN_LOOKUP_LEN")?.unwrap_or(6).max(1);

        // Timeouts
        let fetch_timeout = parse_timeout(&var, "FETCH_TIMEOUT_MS")?;
        let send_timeout = parse_timeout(&var, "SEND_TIMEOUT_MS")?;

        Ok(Self {
            telegram_bot_token,
            sheet_id,
            sheet_name,
            sheets_auth,
            sheets_api_base,
            identifier_column,
            status_column,
            status_vocabulary,
            commands: CommandSet::default(),
            min_lookup_len,
            fetch_timeout,
            send_timeout,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_u64(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    var(key)
        .map(|s| {
            s.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{key} must be a non-negative integer, got `{s}`"))
            })
        })
        .transpose()
}

/// Positive milliseconds, default 10s.
fn parse_timeout(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Duration> {
    match parse_u64(var, key)? {
        Some(0) => Err(Error::Config(format!("{key} must be greater than zero"))),
        Some(ms) => Ok(Duration::from_millis(ms)),
        None => Ok(Duration::from_millis(10_000)),
    }
}

fn parse_usize(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<usize>> {
    Ok(parse_u64(var, key)?.map(|v| v as usize))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CanonicalStatus;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    const BASE: &[(&str, &str)] = &[
        ("TELEGRAM_BOT_TOKEN", "123:abc"),
        ("SHEET_ID", "sheet-1"),
        ("GOOGLE_SHEETS_API_KEY", "key-1"),
    ];

    #[test]
    fn defaults_applied() {
        let c = cfg(BASE).unwrap();
        assert_eq!(c.sheet_name, "Контейнеры");
        assert_eq!(c.sheets_auth, SheetsAuth::ApiKey("key-1".into()));
        assert_eq!(c.sheets_api_base, "https://sheets.googleapis.com");
        assert_eq!(c.identifier_column, "Контейнер");
        assert_eq!(c.status_column, "Статус");
        assert_eq!(c.min_lookup_len, 6);
        assert_eq!(c.fetch_timeout, Duration::from_secs(10));
        assert_eq!(c.send_timeout, Duration::from_secs(10));
        assert_eq!(c.status_vocabulary, StatusVocabulary::default());
    }

    #[test]
    fn missing_required_values_are_config_errors() {
        for missing in ["TELEGRAM_BOT_TOKEN", "SHEET_ID", "GOOGLE_SHEETS_API_KEY"] {
            let pairs: Vec<_> = BASE.iter().copied().filter(|(k, _)| *k != missing).collect();
            let err = cfg(&pairs).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{missing}: {err}");
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut pairs = BASE.to_vec();
        pairs[0] = ("TELEGRAM_BOT_TOKEN", "  ");
        assert!(cfg(&pairs).is_err());
    }

    #[test]
    fn bearer_token_preferred_over_api_key() {
        let mut pairs = BASE.to_vec();
        pairs.push(("GOOGLE_ACCESS_TOKEN", "ya29.token"));
        let c = cfg(&pairs).unwrap();
        assert_eq!(c.sheets_auth, SheetsAuth::BearerToken("ya29.token".into()));
    }

    #[test]
    fn overrides_and_vocabulary() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("SHEET_NAME", "Лист1"),
            ("SHEETS_API_BASE", "http://localhost:9000/"),
            ("MIN_LOOKUP_LEN", "4"),
            ("FETCH_TIMEOUT_MS", "2500"),
            ("STATUS_VOCABULARY", "paid=paid;owed=unpaid"),
        ]);
        let c = cfg(&pairs).unwrap();
        assert_eq!(c.sheet_name, "Лист1");
        assert_eq!(c.sheets_api_base, "http://localhost:9000");
        assert_eq!(c.min_lookup_len, 4);
        assert_eq!(c.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(c.status_vocabulary.canonicalize("OWED"), CanonicalStatus::Unpaid);
        assert_eq!(
            c.status_vocabulary.canonicalize("Оплачено"),
            CanonicalStatus::Unknown
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SEND_TIMEOUT_MS", "soon"));
        assert!(matches!(cfg(&pairs), Err(Error::Config(_))));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        for key in ["FETCH_TIMEOUT_MS", "SEND_TIMEOUT_MS"] {
            let mut pairs = BASE.to_vec();
            pairs.push((key, "0"));
            let err = cfg(&pairs).unwrap_err();
            assert!(matches!(err, Error::Config(ref m) if m.contains(key)), "{key}: {err}");
        }
    }

    #[test]
    fn dotenv_parsing_strips_quotes_and_comments() {
        let parsed = parse_dotenv(
            "# comment\nSHEET_ID=\"abc\"\nexport SHEET_NAME='Лист 1'\n\nBROKEN\n=novalue\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("SHEET_ID".to_string(), "abc".to_string()),
                ("SHEET_NAME".to_string(), "Лист 1".to_string()),
            ]
        );
    }
}
