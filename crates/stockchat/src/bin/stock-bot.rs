//! Stock chat bot CLI
//!
//! Answers chat messages about 2024 tech-stock prices from a SQLite database.
//!
//! # Usage
//!
//! ```bash
//! # Optional: enable the remote model
//! export GOOGLE_API_KEY="..."
//! export GOOGLE_MODEL="gemini-2.0-flash-latest"
//!
//! # Interactive session
//! cargo run --bin stock-bot -- --db stocks.db
//!
//! # One message
//! cargo run --bin stock-bot -- --message "Статистика NVIDIA за первое полугодие"
//! ```

use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use stockchat::bot::{BotReply, Command, START_TEXT, StockBot};
use stockchat::config::BotConfig;

#[derive(Debug, Parser)]
#[command(name = "stock-bot", version, about = "Chat about 2024 tech-stock prices")]
struct Args {
    /// SQLite database with the stock_prices table [env: STOCKCHAT_DB, default: stocks.db]
    #[arg(long)]
    db: Option<PathBuf>,

    /// Answer one message and exit
    #[arg(short, long)]
    message: Option<String>,
}

fn print_replies(replies: &[BotReply]) {
    for reply in replies {
        match reply {
            BotReply::Text(text) => println!("{text}\n"),
            BotReply::Chart { data, caption } => {
                println!("{caption}");
                match data.close_range() {
                    Some((low, high)) => println!(
                        "[{} points, close ${low:.2} .. ${high:.2}]\n",
                        data.points.len()
                    ),
                    None => println!("[no points]\n"),
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockchat_utils::load_dotenv();
    stockchat_utils::init_tracing_with("warn,stockchat=info");

    let args = Args::parse();

    let mut config = BotConfig::from_env()?;
    if let Some(db) = args.db {
        config.database_path = db;
    }

    let bot = StockBot::from_config(&config)?;

    if let Some(message) = args.message {
        print_replies(&bot.handle(&message).await);
        return Ok(());
    }

    println!("{START_TEXT}\n");
    if !config.models.has_credential() {
        println!("(GOOGLE_API_KEY не задан, работаю на правилах)\n");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!(">>> ");
        stdout.flush()?;

        let mut input = String::new();
        match stdin.lock().read_line(&mut input) {
            Ok(0) => {
                println!();
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if matches!(Command::parse(input), Ok(Command::Exit)) {
            break;
        }

        print_replies(&bot.handle(input).await);
    }

    Ok(())
}
