//! Raw table vocabulary → canonical status mapping.
//!
//! The sheet is maintained by hand and different deployments spell the same
//! state differently (`Оплаты нет`, `нет оплаты`, `просрочено`, ...). The mapping
//! is therefore data, not code: a table of folded raw spellings.

use std::collections::HashMap;

use crate::{domain::CanonicalStatus, errors::Error, Result};

/// Default raw spellings: the union of the known deployments.
const DEFAULT_VOCABULARY: &[(&str, CanonicalStatus)] = &[
    ("оплачено", CanonicalStatus::Paid),
    ("оплаты нет", CanonicalStatus::Unpaid),
    ("нет оплаты", CanonicalStatus::Unpaid),
    ("задолженость", CanonicalStatus::Unpaid),
    ("задолженность", CanonicalStatus::Unpaid),
    ("просрочено", CanonicalStatus::Unpaid),
    ("постоплата", CanonicalStatus::PostPay),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusVocabulary {
    entries: HashMap<String, CanonicalStatus>,
}

impl Default for StatusVocabulary {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_VOCABULARY.iter().copied())
    }
}

impl StatusVocabulary {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, CanonicalStatus)>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(raw, status)| (fold_status(raw), status))
            .collect();
        Self { entries }
    }

    /// Parse `raw=canonical` pairs separated by `;` or newlines.
    ///
    /// Example: `Оплачено=paid; Оплаты нет=unpaid; Постоплата=post_pay`.
    pub fn parse(table: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for item in table.split(|c: char| c == ';' || c == '\n') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let Some((raw, canonical)) = item.rsplit_once('=') else {
                return Err(Error::Config(format!(
                    "status vocabulary entry `{item}` is not `raw=canonical`"
                )));
            };
            let raw = fold_status(raw);
            if raw.is_empty() {
                return Err(Error::Config(format!(
                    "status vocabulary entry `{item}` has an empty raw spelling"
                )));
            }
            let status = CanonicalStatus::parse(canonical).ok_or_else(|| {
                Error::Config(format!(
                    "unknown canonical status `{}` (expected paid, unpaid, post_pay, unknown)",
                    canonical.trim()
                ))
            })?;
            entries.insert(raw, status);
        }

        if entries.is_empty() {
            return Err(Error::Config("status vocabulary is empty".to_string()));
        }
        Ok(Self { entries })
    }

    pub fn canonicalize(&self, raw: &str) -> CanonicalStatus {
        self.entries
            .get(&fold_status(raw))
            .copied()
            .unwrap_or(CanonicalStatus::Unknown)
    }

    /// Number of distinct raw spellings recognized.
    pub fn spelling_count(&self) -> usize {
        self.entries.len()
    }
}

/// Trim + case-fold a raw status cell.
pub fn fold_status(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trim + uppercase-fold a container identifier.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_uppercase()
}
