//! `aideas onboard`: First-time setup.

use aideas_config::BotConfig;
use std::path::Path;

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Aideas — First-Time Setup");
    println!("=========================\n");

    if let Some(config_dir) = config_path.parent() {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir)?;
            println!("Created config directory: {}", config_dir.display());
        } else {
            println!("  Config directory exists: {}", config_dir.display());
        }
    }

    if config_path.exists() {
        println!("\nConfig already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(config_path, BotConfig::default_toml())?;
        println!("Created config.toml at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Edit {} and set aideas_api", config_path.display());
        println!("   2. Run: aideas chat");
        println!("   3. Start chatting!\n");
    }

    Ok(())
}
