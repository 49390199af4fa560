//! `aideas chat`: Interactive or single-message chat mode.

use aideas_bot::AideasBot;
use aideas_channels::CliChannel;
use aideas_client::AideasClient;
use aideas_config::SharedConfig;
use aideas_core::channel::Channel;
use aideas_core::context::Context;
use aideas_core::message::SessionId;
use aideas_memory::InMemorySessionStore;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Wire the store, client and bot around one shared config.
fn build_bot(config: Arc<SharedConfig>) -> Result<AideasBot, Box<dyn std::error::Error>> {
    let sessions = Arc::new(InMemorySessionStore::new(config.clone()));
    let client = Arc::new(AideasClient::new(config.clone())?);
    Ok(AideasBot::new(config, sessions, client))
}

pub async fn run(
    config_path: &Path,
    message: Option<String>,
    session: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(
        SharedConfig::load_from(config_path).map_err(|e| format!("Failed to load config: {e}"))?,
    );

    // Check for an endpoint early: give a clear error
    let snapshot = config.snapshot();
    let Some(endpoint) = snapshot.aideas_api.clone() else {
        eprintln!();
        eprintln!("  ERROR: No Aideas endpoint configured!");
        eprintln!();
        eprintln!("  Set the environment variable:");
        eprintln!("    AIDEAS_API=https://your-aideas-host/api/qa");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", config_path.display());
        eprintln!("    aideas_api = \"https://your-aideas-host/api/qa\"");
        eprintln!();
        return Err("No Aideas endpoint found. See above for setup instructions.".into());
    };

    let bot = build_bot(config.clone())?;
    let session_id = SessionId::from(&session);
    tracing::debug!(endpoint = %endpoint, session_id = %session_id, "Chat session starting");

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let reply = bot.reply(&Context::text(msg, session_id)).await?;
        eprint!("\r              \r");
        println!("{}", reply.content);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         Aideas Bot — Interactive Mode        ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Endpoint:  {endpoint}");
    println!("  Model:     {}", snapshot.aideas_model);
    println!("  Session:   {session_id}");
    println!();
    println!("  Commands:  {} | #清除所有 | #更新配置", snapshot.clear_memory_commands.join(" | "));
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let channel = CliChannel::new(session_id.clone());
    let mut rx = channel.start().await.map_err(|e| format!("Channel error: {e}"))?;

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(ctx) => {
                eprint!("  ...");
                match bot.reply(&ctx).await {
                    Ok(reply) => {
                        eprint!("\r     \r");
                        println!();
                        channel.send(&ctx.session_id, &reply).await?;
                        println!();
                    }
                    Err(e) => {
                        eprint!("\r     \r");
                        tracing::warn!(session_id = %ctx.session_id, error = %e, "Reply failed");
                        eprintln!("  [Error] {e}");
                        println!();
                    }
                }

                print!("  You > ");
                std::io::stdout().flush()?;
            }
            Err(e) => {
                eprintln!("  [Channel Error] {e}");
                break;
            }
        }
    }

    channel.stop().await?;
    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
