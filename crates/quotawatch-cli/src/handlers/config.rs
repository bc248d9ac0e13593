//! Configuration command handlers

use crate::cli::{
    ConfigAction, ConfigArgs, ConfigFormat, ConfigGetArgs, ConfigGetFormat, ConfigInitArgs, ConfigSetArgs,
    ConfigShowArgs,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde_json::Value;
use std::path::Path;

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config_file: Option<&Path>,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, config_file, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Set(set_args) => handle_config_set(set_args, config_file, output),
        ConfigAction::Get(get_args) => handle_config_get(get_args, config, output),
        ConfigAction::Path => handle_config_path(config_file, output),
    }
}

fn handle_config_init(args: ConfigInitArgs, config_file: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => Config::user_config_path()
            .ok_or_else(|| Error::config("Unable to determine user config directory"))?,
    };

    if path.exists() && !args.force {
        output.warning(&format!("Config already exists at {} (use --force to overwrite)", path.display()))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it directly or use `quotawatch config set <key> <value>`.")
}

fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    output.writeln(content.trim_end())
}

fn handle_config_set(args: ConfigSetArgs, config_file: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    let path = Config::target_path(config_file)?;
    let mut config = if path.exists() {
        Config::from_file(&path)?
    } else {
        Config::default()
    };

    config.set_value(&args.key, &args.value)?;
    config.save(&path)?;

    tracing::info!(key = %args.key, path = %path.display(), "Configuration updated");
    output.success(&format!("✓ Set {} in {}", args.key, path.display()))
}

fn handle_config_get(args: ConfigGetArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let value = config.get_value(&args.key)?;

    match args.format {
        ConfigGetFormat::Value => {
            let text = match &value {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            output.writeln(&text)
        }
        ConfigGetFormat::Json => {
            let json_value = serde_json::json!({
                "key": args.key,
                "value": value
            });
            output.writeln(&serde_json::to_string_pretty(&json_value)?)
        }
    }
}

fn handle_config_path(config_file: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    let path = Config::target_path(config_file)?;
    let state = if path.exists() { "" } else { " (not created yet)" };
    output.writeln(&format!("{}{}", path.display(), state))
}
