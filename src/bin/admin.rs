//! CLI administration tool for site-guard.
//!
//! Manages admin tokens and block records directly in the database, without
//! going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin token
//! cargo run --bin admin -- token create
//!
//! # Block an address manually
//! cargo run --bin admin -- block add 203.0.113.5 --reason "abuse report"
//!
//! # Lift a block but keep its history
//! cargo run --bin admin -- block disable 203.0.113.5
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): must match the server's value

use site_guard::application::services::BlockService;
use site_guard::application::services::auth_service::{generate_token, hash_token};
use site_guard::config::mask_connection_string;
use site_guard::domain::entities::BlockRecord;
use site_guard::domain::repositories::TokenRepository;
use site_guard::infrastructure::persistence::{PgBlockRepository, PgTokenRepository};
use site_guard::utils::ClientIdentity;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Store timeout for CLI operations; more lenient than the request path.
const CLI_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// CLI tool for managing site-guard.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage blocked addresses
    Block {
        #[command(subcommand)]
        action: BlockAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Create a new admin token
    Create {
        /// Token name (e.g., "Laptop", "Deploy bot")
        #[arg(short, long)]
        name: Option<String>,

        /// Custom token value (optional, auto-generated if not provided)
        #[arg(short, long)]
        token: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Revoke a token
    Revoke {
        /// Token name or ID to revoke
        name_or_id: String,
    },
}

#[derive(Subcommand)]
enum BlockAction {
    /// List all block records
    List,

    /// Block an address (reactivates an existing record)
    Add {
        ip: String,

        #[arg(short, long)]
        reason: Option<String>,
    },

    /// Reactivate an existing or create a new block
    Enable { ip: String },

    /// Deactivate a block, keeping the record
    Disable { ip: String },

    /// Delete a block record
    Remove {
        ip: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Token { action } => handle_token_action(action, &pool).await?,
        Commands::Block { action } => handle_block_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool, &database_url).await?,
    }

    Ok(())
}

async fn handle_token_action(action: TokenAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgTokenRepository::new(Arc::new(pool.clone())));

    match action {
        TokenAction::Create { name, token, yes } => create_token(repo, name, token, yes).await,
        TokenAction::List => list_tokens(repo).await,
        TokenAction::Revoke { name_or_id } => revoke_token(repo, name_or_id).await,
    }
}

/// Creates a new admin token with interactive prompts.
///
/// Only the HMAC-SHA256 digest keyed by `TOKEN_SIGNING_SECRET` is stored; the
/// raw token is displayed once.
async fn create_token(
    repo: Arc<PgTokenRepository>,
    name: Option<String>,
    token: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    let secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to create tokens")?;

    println!("{}", "🔑 Create Admin Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Admin")
            .interact_text()?,
    };

    let token_value = match token {
        Some(t) => {
            println!("{}", "⚠️  Using provided token value".yellow());
            t
        }
        None => {
            println!("{}", "✨ Generated new token".green());
            generate_token()
        }
    };

    println!();
    println!("{}", "Token details:".bright_white().bold());
    println!("  Name:  {}", token_name.cyan());
    println!("  Token: {}", token_value.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this token?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    repo.create(&token_name, &hash_token(&secret, &token_value))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create token: {}", e))?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/admin/blocks",
        token_value.bright_yellow()
    );
    println!();

    Ok(())
}

async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 Admin Tokens".bright_blue().bold());
    println!();

    let tokens = repo
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list tokens: {}", e))?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<4} {:<28} {:<18} {:<18} {:<8}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Created".bright_white().bold(),
        "Last used".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for token in &tokens {
        let status = if token.is_revoked() {
            "REVOKED".red()
        } else {
            "ACTIVE".green()
        };
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<4} {:<28} {:<18} {:<18} {}",
            token.id.to_string().bright_black(),
            token.name.cyan(),
            token
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            last_used.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Revokes a token by name or numeric ID after confirmation.
async fn revoke_token(repo: Arc<PgTokenRepository>, name_or_id: String) -> Result<()> {
    println!("{}", "🔒 Revoke Admin Token".bright_blue().bold());
    println!();

    let token = match name_or_id.parse::<i64>() {
        Ok(id) => repo.find_by_id(id).await,
        Err(_) => repo.find_by_name(&name_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
    .context("Token not found")?;

    if token.is_revoked() {
        println!("{}", "⚠️  This token is already revoked".yellow());
        return Ok(());
    }

    println!("  Token: {}", token.name.cyan());
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!();

    let confirmed = Confirm::new()
        .with_prompt("Revoke this token?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    repo.revoke(token.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke token: {}", e))?;

    println!();
    println!("{}", "✅ Token revoked successfully!".green().bold());
    println!();

    Ok(())
}

async fn handle_block_action(action: BlockAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgBlockRepository::new(Arc::new(pool.clone())));
    let service = BlockService::new(repo, CLI_STORE_TIMEOUT);

    match action {
        BlockAction::List => list_blocks(&service).await,
        BlockAction::Add { ip, reason } => {
            let record = service
                .set_active(&identity(&ip)?, true, reason)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to block {}: {}", ip, e))?;
            print_block_changed(&record);
            Ok(())
        }
        BlockAction::Enable { ip } => {
            let record = service
                .set_active(&identity(&ip)?, true, None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to enable block for {}: {}", ip, e))?;
            print_block_changed(&record);
            Ok(())
        }
        BlockAction::Disable { ip } => {
            let record = service
                .set_active(&identity(&ip)?, false, None)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to disable block for {}: {}", ip, e))?;
            print_block_changed(&record);
            Ok(())
        }
        BlockAction::Remove { ip, yes } => remove_block(&service, &ip, yes).await,
    }
}

/// Normalizes a command-line address with the same rules the gate uses.
fn identity(raw: &str) -> Result<ClientIdentity> {
    if raw.trim().is_empty() {
        anyhow::bail!("IP must not be blank");
    }
    Ok(ClientIdentity::new(raw))
}

async fn list_blocks(service: &BlockService) -> Result<()> {
    println!("{}", "🚫 Blocked Addresses".bright_blue().bold());
    println!();

    let list = service
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list blocks: {}", e))?;

    if list.items.is_empty() {
        println!("{}", "  No block records".yellow());
        return Ok(());
    }

    println!(
        "  {:<40} {:<9} {:<8} {:<18} {}",
        "IP".bright_white().bold(),
        "Status".bright_white().bold(),
        "Requests".bright_white().bold(),
        "Created".bright_white().bold(),
        "Reason".bright_white().bold()
    );
    println!("  {}", "─".repeat(100).bright_black());

    for block in &list.items {
        let status = if block.active {
            "ACTIVE".red()
        } else {
            "INACTIVE".bright_black()
        };

        println!(
            "  {:<40} {:<9} {:<8} {:<18} {}",
            block.ip.cyan(),
            status,
            block.request_count,
            block
                .created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            block.reason
        );
    }

    println!();
    println!(
        "  Total: {}  Active: {}",
        list.total.to_string().bright_white().bold(),
        list.active.to_string().red().bold()
    );
    println!();

    Ok(())
}

async fn remove_block(service: &BlockService, ip: &str, skip_confirm: bool) -> Result<()> {
    let identity = identity(ip)?;

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete the block record for {identity}?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .remove(&identity)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to remove block for {}: {}", identity, e))?;

    println!("{}", "✅ Block record deleted".green().bold());
    Ok(())
}

fn print_block_changed(record: &BlockRecord) {
    let state = if record.active {
        "blocked".red().bold()
    } else {
        "unblocked".green().bold()
    };

    println!("✅ {} is now {}", record.ip.cyan(), state);
    println!("   Reason: {}", record.reason);
}

async fn handle_db_action(action: DbAction, pool: &PgPool, database_url: &str) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let blocks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blocked_ips")
                .fetch_one(pool)
                .await?;

            let active_tokens: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM admin_tokens WHERE revoked_at IS NULL")
                    .fetch_one(pool)
                    .await?;

            println!("  URL:           {}", mask_connection_string(database_url));
            println!("  PostgreSQL:    {}", version.bright_white());
            println!(
                "  Block records: {}",
                blocks.to_string().bright_green().bold()
            );
            println!(
                "  Active tokens: {}",
                active_tokens.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}
