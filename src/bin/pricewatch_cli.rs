//! Interactive operator client: local store actions against the embedded
//! database, plus remote queries against a running pricewatch-backend.

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sea_orm::Database;
use serde_json::{json, Value};

use pricewatch_backend::config::Config;
use pricewatch_backend::services::coingecko::CoinGeckoService;
use pricewatch_backend::services::prices::PriceService;
use pricewatch_backend::store::{self, TimeSeriesStore};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(author, version, about = "Cryptocurrency price service client")]
struct Cli {
    /// Base URL of the RPC server used by the remote actions
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    println!("Cryptocurrency Price Service CLI");

    // The local service opens the database and needs a configured
    // environment, so it is only built on first use.
    let mut local: Option<PriceService> = None;
    let http = reqwest::Client::new();

    loop {
        show_menu();
        let choice = match prompt("Enter your choice: ") {
            Ok(choice) => choice,
            Err(err) => {
                eprintln!("Input error: {err}");
                continue;
            }
        };

        let result = match choice.as_str() {
            "1" => fetch_and_store(&mut local).await,
            "2" => show_latest(&mut local).await,
            "3" => show_historical(&mut local).await,
            "4" => rpc_latest(&http, &cli.server).await,
            "5" => rpc_historical(&http, &cli.server).await,
            "6" => {
                println!("Exiting...");
                break;
            }
            _ => {
                println!("Invalid choice. Please try again.");
                continue;
            }
        };

        if let Err(err) = result {
            eprintln!("An error occurred: {err}");
        }
    }
}

fn show_menu() {
    println!(
        "\nChoose an action:\n  \
         1. Fetch and store latest prices (local)\n  \
         2. Get latest stored prices (local)\n  \
         3. Get historical prices (local)\n  \
         4. Get latest prices via RPC\n  \
         5. Get historical prices via RPC\n  \
         6. Exit\n"
    );
}

fn prompt(message: &str) -> io::Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompts for a millisecond time range until both bounds parse and
/// `from < to`.
fn prompt_time_range() -> io::Result<(i64, i64)> {
    loop {
        let from = prompt("Enter start timestamp (ms): ")?.parse::<i64>();
        let to = prompt("Enter end timestamp (ms): ")?.parse::<i64>();

        match (from, to) {
            (Ok(from), Ok(to)) if from < to => return Ok((from, to)),
            _ => println!("Invalid timestamps: start must be a number earlier than end."),
        }
    }
}

async fn local_service(slot: &mut Option<PriceService>) -> Result<&PriceService, Box<dyn Error>> {
    if slot.is_none() {
        let config = Config::from_env()?;

        let db = Database::connect(&config.database_url).await?;
        store::run_migrations(&db).await?;

        let coingecko = CoinGeckoService::new(
            config.coingecko_api_key,
            config.coingecko_base_url,
            Duration::from_millis(config.http_timeout_ms),
        )?;

        *slot = Some(PriceService::new(
            Arc::new(coingecko),
            TimeSeriesStore::new(db),
        ));
    }

    Ok(slot.as_ref().expect("local service initialized above"))
}

async fn fetch_and_store(slot: &mut Option<PriceService>) -> CliResult {
    let service = local_service(slot).await?;
    service.fetch_and_store().await?;
    println!("Prices updated and stored successfully.");
    Ok(())
}

async fn show_latest(slot: &mut Option<PriceService>) -> CliResult {
    let service = local_service(slot).await?;

    match service.get_latest().await? {
        Some(snapshot) => println!(
            "\nLatest Prices:\n{}",
            serde_json::to_string_pretty(&snapshot)?
        ),
        None => println!("\nNo prices stored yet."),
    }
    Ok(())
}

async fn show_historical(slot: &mut Option<PriceService>) -> CliResult {
    let (from, to) = prompt_time_range()?;
    let service = local_service(slot).await?;

    let entries = service.get_historical(from, to).await?;
    println!(
        "\nHistorical Prices:\n{}",
        serde_json::to_string_pretty(&entries)?
    );
    Ok(())
}

async fn rpc_latest(http: &reqwest::Client, server: &str) -> CliResult {
    let response: Value = http
        .post(format!("{server}/rpc/getLatestPrices"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    println!(
        "\nRPC Latest Prices:\n{}",
        serde_json::to_string_pretty(&response)?
    );
    Ok(())
}

async fn rpc_historical(http: &reqwest::Client, server: &str) -> CliResult {
    let (from, to) = prompt_time_range()?;

    let response: Value = http
        .post(format!("{server}/rpc/getHistoricalPrices"))
        .json(&json!({ "from": from, "to": to }))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    println!(
        "\nRPC Historical Prices:\n{}",
        serde_json::to_string_pretty(&response)?
    );
    Ok(())
}
