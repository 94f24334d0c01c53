pub mod toml_config;

pub use toml_config::AppConfig;

#[cfg(feature = "cli")]
use crate::core::rings::RING_PRESETS;
#[cfg(feature = "cli")]
use crate::domain::model::TravelMode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "salesmap")]
#[command(about = "Generate a sales map with drive-time rings and nearby POIs")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Project name shown on the center marker
    #[arg(long)]
    pub name: Option<String>,

    /// Project address to geocode
    #[arg(long)]
    pub address: Option<String>,

    /// Ring minutes, comma separated (e.g. "5,10,15")
    #[arg(long, long_help = rings_help())]
    pub rings: Option<String>,

    #[arg(long, value_enum, default_value_t = TravelMode::Driving)]
    pub travel_mode: TravelMode,

    /// Number of POIs to generate
    #[arg(long)]
    pub poi_count: Option<usize>,

    /// AI credential; without it mock POIs are used
    #[arg(long)]
    pub ai_key: Option<String>,

    /// Output directory for project.json, map-style.json and index.html
    #[arg(long)]
    pub output_path: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
fn rings_help() -> String {
    let presets = RING_PRESETS
        .iter()
        .map(|(value, label)| format!("  {:<10} {}", value, label))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Ring minutes, comma separated. Invalid tokens are dropped; \
         an empty list falls back to 5,10,15.\n\nPresets:\n{}",
        presets
    )
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 預設值 ← 設定檔 ← 環境變數 ← 命令列
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };

        config.apply_env();

        if let Some(key) = &self.ai_key {
            config.ai.api_key = Some(key.clone());
        }
        if let Some(path) = &self.output_path {
            config.output.path = path.clone();
        }
        if let Some(name) = &self.name {
            config.project.name = Some(name.clone());
        }
        if let Some(address) = &self.address {
            config.project.address = Some(address.clone());
        }
        if let Some(rings) = &self.rings {
            config.project.ring_option = Some(rings.clone());
        }
        if let Some(count) = self.poi_count {
            config.project.poi_count = count;
        }

        Ok(config)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_override_config_file() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut temp_file,
            br#"
[mapbox]
access_token = "pk.file"

[project]
name = "from-file"
poi_count = 2
"#,
        )
        .unwrap();

        let cli = CliConfig::parse_from([
            "salesmap",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--name",
            "from-cli",
            "--poi-count",
            "6",
            "--travel-mode",
            "walking",
        ]);
        let config = cli.load_app_config().unwrap();

        assert_eq!(config.project.name.as_deref(), Some("from-cli"));
        assert_eq!(config.project.poi_count, 6);
        assert_eq!(config.access_token().unwrap(), "pk.file");
        assert_eq!(cli.travel_mode, TravelMode::Walking);
    }

    #[test]
    fn test_rings_help_lists_presets() {
        let help = rings_help();
        for (value, _label) in RING_PRESETS {
            assert!(help.contains(value));
        }
    }
}
