use super::prompts;
use crate::output::{Output, OutputFormat};
use crate::ConfigCommands;
use catalog_config::{Config, PathManager, API_KEY_ENV};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{modifiers, presets, Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, paths: &PathManager, config: Config, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(paths, &config, full, output),
        ConfigCommands::Init { api_key, force } => init_config(paths, api_key, force, output),
    }
}

fn show_config(paths: &PathManager, config: &Config, full: bool, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    let api_key = if full {
        config.catalog.api_key.clone()
    } else {
        mask_string(&config.catalog.api_key)
    };

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            if !config_file.exists() {
                output.warn(format!("Configuration file not found at: {}", config_file.display()));
                output.info("Showing defaults. Run 'moviescout config init' to create one.");
            }

            let mut table = Table::new();
            table.load_preset(presets::UTF8_FULL);
            table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
            table.set_header(vec![
                Cell::new("Setting").fg(Color::Cyan).add_attribute(Attribute::Bold),
                Cell::new("Value").fg(Color::Cyan).add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![Cell::new("Config File"), Cell::new(config_file.display())]);
            table.add_row(vec![Cell::new("Catalog URL"), Cell::new(&config.catalog.base_url)]);
            table.add_row(vec![Cell::new("API Key"), Cell::new(api_key)]);
            table.add_row(vec![Cell::new("Discover Sort"), Cell::new(&config.catalog.discover_sort)]);
            table.add_row(vec![
                Cell::new("Language"),
                Cell::new(config.catalog.language.as_deref().unwrap_or("<catalog default>")),
            ]);
            table.add_row(vec![Cell::new("Poster URL"), Cell::new(&config.catalog.poster_base_url)]);
            table.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{}s", config.catalog.timeout_secs))]);
            table.add_row(vec![
                Cell::new("Scroll Threshold"),
                Cell::new(config.scroll.scroll_threshold_ratio),
            ]);
            table.add_row(vec![
                Cell::new("Intersection Threshold"),
                Cell::new(config.scroll.intersection_threshold),
            ]);
            table.add_row(vec![Cell::new("Log Level"), Cell::new(&config.logging.level)]);
            table.add_row(vec![
                Cell::new("Log File"),
                Cell::new(
                    config
                        .logging
                        .file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "<stdout>".to_string()),
                ),
            ]);
            println!("{}", table);

            let configured = if config.is_catalog_configured() {
                "✓ ready".green().to_string()
            } else {
                format!("✗ missing API key (set it with 'moviescout config init' or {})", API_KEY_ENV)
                    .red()
                    .to_string()
            };
            println!("Catalog: {}", configured);
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            let mut value = serde_json::to_value(config)?;
            value["catalog"]["api_key"] = json!(api_key);
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "exists": config_file.exists(),
                "config": value,
            }));
        }
    }

    Ok(())
}

fn init_config(paths: &PathManager, api_key: Option<String>, force: bool, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    if config_file.exists() && !force {
        output.warn(format!("Configuration already exists at: {}", config_file.display()));
        output.info("Use --force to overwrite it.");
        return Ok(());
    }

    let api_key = match api_key {
        Some(key) => key,
        None => prompts::prompt_secret("Catalog API key")?,
    };
    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        return Err(eyre!("API key cannot be empty"));
    }

    let mut config = Config::default();
    config.catalog.api_key = api_key;
    config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;

    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create {}: {}", paths.config_dir().display(), e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    tracing::info!(path = %config_file.display(), "Configuration written");
    output.success(format!("Configuration saved to {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    let head: String = s.chars().take(2).collect();
    let tail: String = s.chars().rev().take(2).collect::<Vec<_>>().into_iter().rev().collect();
    format!("{}***{}", head, tail)
}
