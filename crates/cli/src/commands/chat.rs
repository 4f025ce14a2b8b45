//! Interactive chat command.
//!
//! Owns the conversation history for the session: each user line is pushed
//! before the pipeline runs, and the streamed answer is appended afterwards.
//! The core never stores the history itself.

use clap::Args;
use futures::StreamExt;
use handbook_core::{AppConfig, AppResult};
use handbook_llm::ChatMessage;
use handbook_prompt::ResponseStyle;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive chat session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Answer in a single concise sentence instead of full detail
    #[arg(long)]
    pub concise: bool,
}

impl ChatCommand {
    /// Execute the chat command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        config.validate()?;

        tracing::info!("Starting chat session");
        let pipeline = super::build_pipeline(config)?;

        let style = if self.concise {
            ResponseStyle::Concise
        } else {
            ResponseStyle::Detailed
        };

        println!("Handbook chat. Ask a question, 'clear' to reset history, 'exit' to quit.");

        let mut history: Vec<ChatMessage> = Vec::new();
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            match line {
                "" => continue,
                "exit" | "quit" => break,
                "clear" => {
                    history.clear();
                    println!("History cleared.");
                    continue;
                }
                _ => {}
            }

            history.push(ChatMessage::user(line));

            let (provenance, mut stream) = match pipeline.answer_stream(&history, style).await {
                Ok(result) => result,
                Err(e) => {
                    // Per-query failure: report and keep the session alive
                    eprintln!("error: {}", e);
                    history.pop();
                    continue;
                }
            };

            tracing::debug!("Answering from tier '{}'", provenance);

            let mut full_answer = String::new();
            while let Some(item) = stream.next().await {
                match item {
                    Ok(chunk) => {
                        if !chunk.content.is_empty() {
                            print!("{}", chunk.content);
                            std::io::stdout().flush().ok();
                            full_answer.push_str(&chunk.content);
                        }
                        if chunk.done {
                            break;
                        }
                    }
                    Err(e) => {
                        eprintln!("\nstream error: {}", e);
                        break;
                    }
                }
            }
            println!();

            history.push(ChatMessage::assistant(full_answer));
        }

        println!("Bye.");
        Ok(())
    }
}
