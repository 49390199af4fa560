//! `aideas config`: Configuration management commands.

use aideas_config::BotConfig;
use std::path::Path;

pub async fn validate(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match BotConfig::load_with_env(config_path) {
        Ok(config) => {
            println!("   OK  Config parsed successfully");

            let mut warnings = Vec::new();

            if config.aideas_api.is_none() {
                warnings.push("No endpoint set (set aideas_api or the AIDEAS_API env var)");
            }

            if config.clear_memory_commands.is_empty() {
                warnings.push("No clear-memory commands configured; users cannot reset their session");
            }

            if config.expires_in_seconds.is_none() {
                warnings.push("Sessions never expire (expires_in_seconds unset)");
            }

            if warnings.is_empty() {
                println!("   OK  All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   WARN  {w}");
                }
            }

            println!();
            println!("   Endpoint:   {}", config.aideas_api.as_deref().unwrap_or("(none)"));
            println!("   Model:      {}", config.aideas_model);
            println!("   Max tokens: {}", config.conversation_max_tokens);
            println!("   Timeout:    {}s", config.request_timeout_secs);
        }
        Err(e) => {
            println!("   ERR  Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        BotConfig::load_with_env(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", config_path.display());
    Ok(())
}
