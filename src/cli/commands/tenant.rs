use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::config;
use crate::database::TenantConfigStore;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "List routable tenants from the system database")]
    List,

    #[command(about = "Build the tenant's pool and run a test query")]
    Check {
        #[arg(help = "Tenant name")]
        name: String,
    },

    #[command(about = "Build pools for every tenant and report failures")]
    Warmup,
}

pub async fn handle(cmd: TenantCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = AppState::connect(config::config()).await?;

    let result = match cmd {
        TenantCommands::List => list(&state, output_format).await,
        TenantCommands::Check { name } => check(&state, &name, output_format).await,
        TenantCommands::Warmup => warmup(&state, output_format).await,
    };

    state.registry().close_all().await;
    result
}

async fn list(state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    let configs = state.registry().store().list_all().await?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "tenants": configs }))?);
        }
        OutputFormat::Text => {
            if configs.is_empty() {
                println!("No tenants configured");
                return Ok(());
            }
            println!("{:<20} {:<30} {:<20} {}", "NAME", "DATABASE", "HOST", "CREATED");
            println!("{}", "-".repeat(90));
            for config in &configs {
                println!(
                    "{:<20} {:<30} {:<20} {}",
                    config.name,
                    config.database,
                    config.host.as_deref().unwrap_or("-"),
                    config.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
    }
    Ok(())
}

async fn check(state: &AppState, name: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = match state.registry().get(name).await {
        Ok(pool) => pool,
        Err(e) => {
            let message = e.to_string();
            let code = ApiError::from(e).error_code();
            output_error(output_format, &message, Some(code))?;
            anyhow::bail!("tenant check failed for '{}'", name);
        }
    };

    sqlx::query("SELECT 1").execute(&pool).await?;
    output_success(
        output_format,
        &format!("Tenant '{}' is reachable", name),
        Some(json!({ "tenant": name, "pool_size": pool.size() })),
    )
}

async fn warmup(state: &AppState, output_format: OutputFormat) -> anyhow::Result<()> {
    let report = state.registry().get_all().await?;

    let mut ready: Vec<&String> = report.ready.keys().collect();
    ready.sort();
    let mut failed: Vec<(&String, String)> = report.failed.iter().map(|(n, e)| (n, e.to_string())).collect();
    failed.sort();

    match output_format {
        OutputFormat::Json => {
            let failed: serde_json::Map<String, serde_json::Value> = failed
                .iter()
                .map(|(name, message)| (name.to_string(), json!(message)))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "ready": ready, "failed": failed }))?
            );
        }
        OutputFormat::Text => {
            for name in &ready {
                println!("✓ {}", name);
            }
            for (name, message) in &failed {
                println!("✗ {}: {}", name, message);
            }
            println!("{} ready, {} failed", ready.len(), failed.len());
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} tenant(s) failed to warm up", failed.len());
    }
    Ok(())
}
