use clap::Parser;
use salesmap::app::report;
use salesmap::core::resolver::Notice;
use salesmap::domain::ports::Storage;
use salesmap::utils::error::{ErrorSeverity, SalesMapError};
use salesmap::utils::{logger, validation::Validate};
use salesmap::{
    AppConfig, CliConfig, GeminiFactory, InputForm, LocalStorage, LocationResolver, MapSession,
    MapboxGeocoder, Project, ProjectStore, StyleDocument, SubmitOutcome,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting SalesMap Studio");

    let config = match cli.load_app_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };
    if cli.verbose {
        tracing::debug!(
            "Output path: {}, AI enabled: {}",
            config.output.path,
            config.ai_credential().is_some()
        );
    }

    match run(&cli, &config).await {
        Ok(()) => Ok(()),
        Err(e) => exit_with(&e),
    }
}

async fn run(cli: &CliConfig, config: &AppConfig) -> salesmap::Result<()> {
    let access_token = config.access_token()?.to_string();
    let settings = config.render_settings();

    let store = ProjectStore::default();

    // 地圖工作階段跟著 store 的變更通知重新繪製
    let style_url = config.mapbox.style.clone();
    let initial = Project::default().center;
    let zoom = settings.zoom;
    let mut session = MapSession::new(settings, move || {
        StyleDocument::new(style_url.clone(), initial, zoom)
    });
    let updates = store.subscribe();
    let renderer = tokio::spawn(async move {
        session.follow(updates).await?;
        Ok::<_, SalesMapError>(session)
    });

    let mut form = InputForm::from_project(&store.current(), config.project.poi_count);
    if let Some(name) = &config.project.name {
        form.name = name.clone();
    }
    if let Some(address) = &config.project.address {
        form.address = address.clone();
    }
    if let Some(rings) = &config.project.ring_option {
        form.ring_option = rings.clone();
    }
    form.travel_mode = cli.travel_mode;
    form.ai_credential = config.ai_credential().map(str::to_string);

    if form.ai_credential.is_none() {
        tracing::info!("🧪 No AI credential, POIs will use mock templates");
    }

    let resolver = LocationResolver::new(
        MapboxGeocoder::new(
            config.mapbox.geocoding_endpoint.clone(),
            access_token.clone(),
            config.mapbox.country.clone(),
        ),
        GeminiFactory::new(config.ai.endpoint.clone(), config.ai.model.clone()),
    );

    match form.submit(&resolver, &store).await? {
        SubmitOutcome::Applied { notices } => {
            print_notices(&notices);
            tracing::info!("✅ Project updated");
        }
        SubmitOutcome::Unchanged { notices } | SubmitOutcome::Superseded { notices } => {
            print_notices(&notices);
            tracing::warn!("⚠️ Project left unchanged");
        }
        SubmitOutcome::Busy => tracing::warn!("⏳ A generation is already running"),
    }

    let project = store.current();
    drop(store);

    let session = renderer.await.map_err(|e| SalesMapError::RenderError {
        message: e.to_string(),
    })??;
    let document = session.into_surface().ok_or_else(|| SalesMapError::RenderError {
        message: "map surface was never initialized".to_string(),
    })?;

    let storage = LocalStorage::new(config.output.path.clone());
    storage
        .write_file("project.json", &serde_json::to_vec_pretty(&project)?)
        .await?;
    storage
        .write_file("map-style.json", &serde_json::to_vec_pretty(&document.to_json())?)
        .await?;
    if config.output.html {
        let html = document.to_html(&project.name, &access_token)?;
        storage.write_file("index.html", html.as_bytes()).await?;
    }

    for line in report::summary_lines(&project) {
        println!("{}", line);
    }
    println!("📁 Output saved to: {}", config.output.path);
    Ok(())
}

fn print_notices(notices: &[Notice]) {
    for notice in notices {
        tracing::warn!("{}", notice);
        eprintln!("⚠️ {}", notice);
    }
}

fn exit_with(e: &SalesMapError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );

    if let SalesMapError::MissingConfigError { .. } = e {
        eprintln!("Missing Configuration");
        eprintln!("Mapbox Access Token is missing.");
        eprintln!(
            "Please set MAPBOX_ACCESS_TOKEN in your environment or add access_token under [mapbox] in the config file."
        );
    } else {
        eprintln!("❌ {}", e.user_friendly_message());
    }
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
