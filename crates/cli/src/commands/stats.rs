//! Stats command handler.

use clap::Args;
use handbook_core::{AppConfig, AppError, AppResult};

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let index = super::open_index(config)?;

        let entries = index.len()?;
        let db_size_bytes = std::fs::metadata(&config.index_path)
            .map(|m| m.len())
            .unwrap_or(0);

        if self.json {
            let output = serde_json::json!({
                "indexPath": config.index_path,
                "entries": entries,
                "dbSizeBytes": db_size_bytes,
                "similarityThreshold": config.retrieval.similarity_threshold,
                "scopeDomain": config.search.scope_domain,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("Index:      {:?}", config.index_path);
            println!("Entries:    {}", entries);
            println!("Size:       {} bytes", db_size_bytes);
            println!("Threshold:  {}", config.retrieval.similarity_threshold);
            println!("Scope:      {}", config.search.scope_domain);
        }

        Ok(())
    }
}
