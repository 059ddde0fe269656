use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "bookstore-cli")]
#[command(about = "Query a running BookStore API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5555")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Root status message and environment
    Status,
    /// Health check, including database connectivity
    Health,
    /// Database collections, or the static sample list with --sample
    Books {
        #[arg(long)]
        sample: bool,
    },
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Status => "/",
            Commands::Health => "/health",
            Commands::Books { sample: false } => "/books",
            Commands::Books { sample: true } => "/api/books",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());
    let res = client.get(url).send().await?;
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Err(e) = check_status(status) {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(e.into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Non-2xx responses make the command fail.
fn check_status(status: StatusCode) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("API returned status {}", status))
    }
}
