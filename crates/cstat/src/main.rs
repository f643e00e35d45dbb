use std::sync::Arc;

use cstat_core::{config::Config, ports::RowSource};
use cstat_sheets::SheetsRowSource;

#[tokio::main]
async fn main() -> Result<(), cstat_core::Error> {
    cstat_core::logging::init("cstat")?;

    let cfg = Arc::new(Config::load()?);
    let source: Arc<dyn RowSource> = Arc::new(SheetsRowSource::from_config(&cfg)?);

    tracing::info!(sheet_id = %cfg.sheet_id, "starting container status bot");

    cstat_telegram::router::run_polling(cfg, source)
        .await
        .map_err(|e| cstat_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
