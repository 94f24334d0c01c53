use anyhow::{Context, Result};
use clap::Parser;
use salesmap::adapters::gemini::{GeminiClient, DEFAULT_AI_ENDPOINT, DEFAULT_AI_MODEL};
use salesmap::config::toml_config::AI_KEY_ENV;
use salesmap::domain::ports::PoiSuggester;
use salesmap::utils::logger;
use salesmap::Coord;

/// 檢查 AI 金鑰是否可用，必要時試跑一次設施建議
#[derive(Parser)]
#[command(name = "probe-ai")]
#[command(about = "Check that an AI credential can generate POI suggestions")]
struct Args {
    /// AI credential (falls back to GEMINI_API_KEY)
    #[arg(long)]
    key: Option<String>,

    #[arg(long, default_value = DEFAULT_AI_ENDPOINT)]
    endpoint: String,

    #[arg(long, default_value = DEFAULT_AI_MODEL)]
    model: String,

    /// Also request POI suggestions around this address
    #[arg(long)]
    address: Option<String>,

    #[arg(long, default_value_t = 121.5654)]
    lon: f64,

    #[arg(long, default_value_t = 25.0330)]
    lat: f64,

    #[arg(long, default_value_t = 4)]
    count: usize,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let key = match args.key.clone() {
        Some(key) => key,
        None => std::env::var(AI_KEY_ENV)
            .with_context(|| format!("pass --key or set {}", AI_KEY_ENV))?,
    };

    let client = GeminiClient::new(args.endpoint.clone(), args.model.clone(), key);

    println!("🚀 Calling {} ...", args.model);
    let text = client
        .generate_text("Hello, please respond with 'API is working'")
        .await
        .context("AI credential check failed")?;
    println!("✅ Response: {}", text.trim());

    if let Some(address) = &args.address {
        let center = Coord::new(args.lon, args.lat)?;
        println!("\n🤖 Requesting {} POIs around {} {}", args.count, address, center);

        let pois = client
            .suggest(address, center, args.count)
            .await
            .context("POI suggestion failed")?;

        for poi in &pois {
            println!(
                "  - {} ({}) 約 {} 分鐘 @ {}{}",
                poi.name,
                poi.kind,
                poi.minutes,
                poi.coord,
                poi.address
                    .as_deref()
                    .map(|a| format!(" / {}", a))
                    .unwrap_or_default()
            );
        }
        println!("\n🎉 Parsed {} POIs", pois.len());
    }

    Ok(())
}
