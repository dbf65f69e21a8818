use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "aggregator-cli")]
#[command(about = "Query a running API aggregator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch weather, news and playlist in one call
    Aggregate {
        /// Article order: "date" or "source"
        #[arg(long)]
        sort_by: Option<String>,

        /// Keep only articles from this source name
        #[arg(long)]
        filter_by: Option<String>,
    },
    /// Show per-source upstream latency statistics
    Statistics,
    /// Check that the service is up
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Aggregate { sort_by, filter_by } => {
            let mut query = Vec::new();
            if let Some(sort_by) = sort_by {
                query.push(("sortBy", sort_by));
            }
            if let Some(filter_by) = filter_by {
                query.push(("filterBy", filter_by));
            }
            let res = client
                .get(format!("{base}/aggregate"))
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Statistics => {
            let res = client.get(format!("{base}/statistics")).send().await?;
            print_response(res).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{base}/health")).send().await?;
            let status = res.status();
            println!("{} {}", status, res.text().await?);
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    match res.status() {
        StatusCode::NO_CONTENT => {
            println!("No data recorded yet");
            return Ok(());
        }
        StatusCode::SERVICE_UNAVAILABLE => {
            eprintln!("All upstream sources are unavailable");
        }
        status if !status.is_success() => {
            eprintln!("Error: aggregator returned status {}", status);
            if let Ok(text) = res.text().await {
                eprintln!("Response: {}", text);
            }
            return Ok(());
        }
        _ => {}
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
