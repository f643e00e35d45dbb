//! Read-through status index over the external table.
//!
//! Every operation fetches the full row set once; nothing is cached between
//! calls, so the repository can be shared freely across concurrent updates.

use std::{sync::Arc, time::Duration};

use tokio::time::timeout;

use crate::{
    domain::{CanonicalStatus, ContainerRecord, QueryResult, RawRow, Statistics},
    errors::Error,
    ports::RowSource,
    status::{normalize_identifier, StatusVocabulary},
    Result,
};

#[derive(Clone)]
pub struct StatusRepository {
    source: Arc<dyn RowSource>,
    vocabulary: Arc<StatusVocabulary>,
    fetch_timeout: Duration,
}

impl StatusRepository {
    pub fn new(
        source: Arc<dyn RowSource>,
        vocabulary: Arc<StatusVocabulary>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            source,
            vocabulary,
            fetch_timeout,
        }
    }

    /// Find the first row whose normalized identifier equals the normalized input.
    ///
    /// Duplicate identifiers are possible in the table; table order decides.
    pub async fn lookup(&self, identifier: &str) -> QueryResult {
        let rows = match self.fetch().await {
            Ok(rows) => rows,
            Err(e) => return QueryResult::ConnectionError(e.user_cause()),
        };

        let wanted = normalize_identifier(identifier);
        rows.into_iter()
            .find(|row| normalize_identifier(&row.identifier) == wanted)
            .map(|row| QueryResult::Found(self.record(row)))
            .unwrap_or_else(|| QueryResult::NotFound(identifier.to_string()))
    }

    /// All rows mapping to `status`, in table order.
    pub async fn list_by_status(&self, status: CanonicalStatus) -> Result<Vec<ContainerRecord>> {
        let rows = self.fetch().await?;
        Ok(rows
            .into_iter()
            .map(|row| self.record(row))
            .filter(|rec| rec.status == status)
            .collect())
    }

    /// Totals per canonical bucket in a single pass.
    pub async fn aggregate(&self) -> Result<Statistics> {
        let rows = self.fetch().await?;
        let mut stats = Statistics::default();
        for row in &rows {
            stats.record(self.vocabulary.canonicalize(&row.status));
        }
        Ok(stats)
    }

    fn record(&self, row: RawRow) -> ContainerRecord {
        let status = self.vocabulary.canonicalize(&row.status);
        ContainerRecord {
            identifier: row.identifier.trim().to_string(),
            raw_status: row.status.trim().to_string(),
            status,
        }
    }

    async fn fetch(&self) -> Result<Vec<RawRow>> {
        let res = match timeout(self.fetch_timeout, self.source.fetch_all_rows()).await {
            Ok(res) => res,
            Err(_) => Err(Error::Connection(format!(
                "table read timed out after {}s",
                self.fetch_timeout.as_secs_f32()
            ))),
        };

        match res {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), "fetched status table");
                Ok(rows)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read status table");
                // Every fetch failure is a connection failure from the caller's view.
                Err(match e {
                    Error::Connection(_) => e,
                    other => Error::Connection(other.user_cause()),
                })
            }
        }
    }
}
