use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use agro_agents::Dispatcher;
use agro_catalog::{Catalog, Classifier};
use agro_core::{BotConfig, InboundMessage};
use agro_observability::{init_tracing, AppMetrics};
use agro_storage::MemorySessionStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "agro")]
#[command(about = "Agro Montes concierge CLI")]
struct Cli {
    #[arg(long, default_value = "catalog/catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat session against the full conversation state machine.
    Chat,
    /// Run a single message through the free-text classifier, bypassing
    /// session state. Useful for tuning catalog keywords.
    Eval { message: String },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    List,
}

fn main() -> Result<()> {
    init_tracing("agro_cli");
    let cli = Cli::parse();

    let catalog = Arc::new(Catalog::load_or_empty(&cli.catalog));
    let config = BotConfig::from_env();

    match cli.command {
        Command::Chat => {
            let agent = Dispatcher::new(
                catalog,
                config,
                Arc::new(MemorySessionStore::default()),
                AppMetrics::shared(),
            );
            run_chat(agent)?;
        }
        Command::Eval { message } => {
            let classifier = Classifier::new(catalog, config);
            println!("{}", classifier.evaluate(&message));
        }
        Command::Catalog { command } => match command {
            CatalogCommand::List => {
                println!("{}", serde_json::to_string_pretty(catalog.entries())?);
            }
        },
    }

    Ok(())
}

fn run_chat(agent: Dispatcher<MemorySessionStore>) -> Result<()> {
    let conversation_id = Uuid::new_v4().to_string();

    println!("Agro Montes chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent.handle_message(&InboundMessage {
            conversation_id: conversation_id.clone(),
            text: message.to_string(),
        });

        if reply.is_empty() {
            continue;
        }

        println!("\n{reply}\n");
    }

    Ok(())
}
