//! Seed command handler: bulk-load the handbook corpus into the index.
//!
//! Reads UTF-8 text files (directories are walked), chunks them at target
//! granularity, and hands the chunks to the corpus seeder. Seeding is a
//! no-op when the index already holds entries.

use clap::Args;
use handbook_core::{AppConfig, AppError, AppResult};
use handbook_knowledge::chunker::chunk_text;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Load the handbook corpus into the index
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// Files or directories holding the corpus text
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl SeedCommand {
    /// Execute the seed command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing seed command");

        let embedder = super::build_embedder(config)?;
        let index = super::open_index(config)?;

        let mut chunks: Vec<String> = Vec::new();

        for path in &self.paths {
            if path.is_file() {
                self.collect_file(path, config, &mut chunks)?;
            } else if path.is_dir() {
                for entry in WalkDir::new(path)
                    .follow_links(false)
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    let entry_path = entry.path();
                    if entry_path.is_file() {
                        self.collect_file(&entry_path.to_path_buf(), config, &mut chunks)?;
                    }
                }
            } else {
                return Err(AppError::Config(format!(
                    "Corpus path does not exist: {:?}",
                    path
                )));
            }
        }

        if chunks.is_empty() {
            return Err(AppError::Config(
                "No readable corpus text found in the given paths".to_string(),
            ));
        }

        tracing::info!("Collected {} chunks from {} path(s)", chunks.len(), self.paths.len());

        let written = handbook_knowledge::seed_corpus(
            &chunks,
            embedder.as_ref(),
            index.as_ref(),
            config.embedding.batch_size,
        )
        .await?;

        if written == 0 {
            println!(
                "Index at {:?} already populated ({} entries); nothing to do.",
                config.index_path,
                index.len()?
            );
        } else {
            println!("Seeded {} chunks into {:?}.", written, config.index_path);
        }

        Ok(())
    }

    /// Read one file and append its chunks. Non-UTF-8 files are skipped
    /// with a warning rather than aborting the whole load.
    fn collect_file(
        &self,
        path: &PathBuf,
        config: &AppConfig,
        chunks: &mut Vec<String>,
    ) -> AppResult<()> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                return Ok(());
            }
        };

        if text.trim().is_empty() {
            tracing::debug!("Skipping empty file {:?}", path);
            return Ok(());
        }

        let file_chunks = chunk_text(
            &text,
            config.retrieval.chunk_size,
            config.retrieval.chunk_overlap,
        );

        tracing::debug!("{:?}: {} chunks", path, file_chunks.len());
        chunks.extend(
            file_chunks
                .into_iter()
                .filter(|c| !c.trim().is_empty()),
        );

        Ok(())
    }
}
