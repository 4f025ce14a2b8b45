//! Ask command handler: one question, one answer.

use clap::Args;
use futures::StreamExt;
use handbook_core::{AppConfig, AppError, AppResult};
use handbook_llm::ChatMessage;
use handbook_prompt::ResponseStyle;
use std::io::Write;

/// Ask a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Answer in a single concise sentence instead of full detail
    #[arg(long)]
    pub concise: bool,

    /// Disable streaming (print the answer in one piece)
    #[arg(long)]
    pub no_stream: bool,

    /// Output as JSON (implies --no-stream)
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate()?;

        let question = self
            .question
            .clone()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        tracing::info!("Executing ask command");

        let pipeline = super::build_pipeline(config)?;
        let style = if self.concise {
            ResponseStyle::Concise
        } else {
            ResponseStyle::Detailed
        };

        let history = vec![ChatMessage::user(question)];

        if self.json || self.no_stream {
            let answer = pipeline.answer(&history, style).await?;

            if self.json {
                let output = serde_json::json!({
                    "answer": answer.text,
                    "provenance": answer.provenance,
                });
                let json = serde_json::to_string_pretty(&output)
                    .map_err(|e| AppError::Serialization(e.to_string()))?;
                println!("{}", json);
            } else {
                println!("{}", answer.text);
            }
        } else {
            let (provenance, mut stream) = pipeline.answer_stream(&history, style).await?;
            tracing::debug!("Answering from tier '{}'", provenance);

            while let Some(item) = stream.next().await {
                let chunk = item?;
                if !chunk.content.is_empty() {
                    print!("{}", chunk.content);
                    std::io::stdout().flush().ok();
                }
                if chunk.done {
                    break;
                }
            }
            println!();
        }

        Ok(())
    }
}
