use std::io::Write;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use navigator_cli::{build_advisor, chat_turn, completion_options, describe, load_settings};
use navigator_core::telemetry::init_tracing;

#[derive(Parser)]
#[command(name = "navigator", version, about = "Навигатор по курсам Karpov.Courses")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask for a course recommendation.
    Ask {
        question: String,
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long = "max-tokens")]
        max_tokens: Option<u32>,
    },
    /// Print the closest stored chunks as JSON.
    Search {
        query: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Ask questions interactively until EOF or `exit`.
    Chat {
        #[arg(long)]
        temperature: Option<f32>,
        #[arg(long = "max-tokens")]
        max_tokens: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings()?;
    let advisor = build_advisor(&settings).await?;

    match cli.command {
        Command::Ask { question, temperature, max_tokens } => {
            let advice = advisor.process_query(&question, &completion_options(temperature, max_tokens)).await?;
            let (text, ok) = describe(&advice);
            if !ok {
                bail!(text);
            }
            println!("{text}");
        }
        Command::Search { query, limit } => {
            let hits = advisor.search(&query, limit)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Command::Chat { temperature, max_tokens } => {
            let options = completion_options(temperature, max_tokens);
            println!("Задайте вопрос о курсах (exit для выхода).");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                print!("> ");
                std::io::stdout().flush()?;
                let Some(line) = lines.next_line().await? else { break };
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                if question == "exit" || question == "quit" {
                    break;
                }
                let (text, ok) = chat_turn(&advisor, question, &options).await;
                if ok {
                    println!("{text}\n");
                } else {
                    eprintln!("{text}\n");
                }
            }
        }
    }
    Ok(())
}
