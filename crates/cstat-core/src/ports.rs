use async_trait::async_trait;

use crate::{domain::RawRow, Result};

/// Hexagonal port for the tabular record store.
///
/// One call reads the whole table; implementations hold no per-request state
/// and perform no retries. Failures should surface as `Error::Connection`.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_all_rows(&self) -> Result<Vec<RawRow>>;
}
