//! CLI administration tool for the local library.
//!
//! Covers the jobs that have no web form: creating accounts, granting
//! permissions, adding genres, languages and copies, lending copies out and
//! clearing stale sessions.
//!
//! # Usage
//!
//! ```bash
//! # Create a librarian account
//! cargo run --bin admin -- user create --username marian
//! cargo run --bin admin -- user grant marian can_mark_returned
//!
//! # Put a copy of book 1 on the shelf and lend it out
//! cargo run --bin admin -- copy add --book 1 --imprint "Gollancz, 2014"
//! cargo run --bin admin -- copy lend 7 reader --due 2024-06-01
//!
//! # View statistics
//! cargo run --bin admin -- stats
//! ```
//!
//! # Environment Variables
//!
//! Same as the server; at least `DATABASE_URL` and `SESSION_SECRET`. Password
//! hashes are keyed by `SESSION_SECRET`, so it must match the server's.

use local_library::config;
use local_library::domain::entities::{LoanStatus, NewBookInstance, Permission};
use local_library::state::{AppState, SessionSettings};
use local_library::utils::dates::parse_optional_date;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing the local library.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage user accounts and permissions
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage genres
    Genre {
        #[command(subcommand)]
        action: NameAction,
    },

    /// Manage languages
    Language {
        #[command(subcommand)]
        action: NameAction,
    },

    /// Manage physical copies of books
    Copy {
        #[command(subcommand)]
        action: CopyAction,
    },

    /// Manage browser sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Show catalog statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user
    Create {
        #[arg(short, long)]
        username: Option<String>,

        /// Generate a random password instead of prompting for one
        #[arg(short, long)]
        generate: bool,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all users
    List,

    /// Grant a permission, e.g. `can_mark_returned` or `catalog.add_book`
    Grant { username: String, permission: String },

    /// Revoke a permission
    Revoke { username: String, permission: String },
}

/// Shared by `genre` and `language`.
#[derive(Subcommand)]
enum NameAction {
    /// Add an entry
    Add { name: String },
}

#[derive(Subcommand)]
enum CopyAction {
    /// Add a copy of a book
    Add {
        #[arg(short, long)]
        book: i64,

        #[arg(short, long)]
        imprint: String,

        /// One of m, o, a, r
        #[arg(short, long, default_value = "m")]
        status: String,

        /// Due date, YYYY-MM-DD
        #[arg(short, long)]
        due: Option<String>,
    },

    /// Lend a copy to a user
    Lend {
        id: i64,
        username: String,

        /// Due date, YYYY-MM-DD
        #[arg(short, long)]
        due: String,
    },

    /// Mark a copy as returned
    Return { id: i64 },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Delete expired sessions
    Purge,
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
    let config = config::load_from_env()?;

    let pool = PgPool::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    let settings = SessionSettings {
        secret: config.session_secret.clone(),
        ttl_seconds: config.session_ttl_seconds,
        secure_cookies: config.secure_cookies,
    };
    let state = AppState::new(Arc::new(pool.clone()), &settings)?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &state).await?,
        Commands::Genre {
            action: NameAction::Add { name },
        } => {
            let genre = state.catalog_service.add_genre(&name).await?;
            println!("{} {} (id {})", "Genre added:".green().bold(), genre.name.cyan(), genre.id);
        }
        Commands::Language {
            action: NameAction::Add { name },
        } => {
            let language = state.catalog_service.add_language(&name).await?;
            println!(
                "{} {} (id {})",
                "Language added:".green().bold(),
                language.name.cyan(),
                language.id
            );
        }
        Commands::Copy { action } => handle_copy_action(action, &state).await?,
        Commands::Session {
            action: SessionAction::Purge,
        } => {
            let removed = state.session_service.purge_expired().await?;
            println!(
                "{} {}",
                "Expired sessions removed:".green().bold(),
                removed.to_string().bright_white()
            );
        }
        Commands::Stats => handle_stats(&state).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn parse_permission(raw: &str) -> Result<Permission> {
    raw.parse::<Permission>().map_err(|e| {
        let known: Vec<&str> = Permission::ALL.iter().map(|p| p.codename()).collect();
        anyhow!("{e}; expected one of: {}", known.join(", "))
    })
}

fn parse_due(raw: &str) -> Result<NaiveDate> {
    parse_optional_date(raw)
        .map_err(|_| anyhow!("Invalid date '{raw}', expected YYYY-MM-DD"))?
        .context("Due date must not be blank")
}

async fn handle_user_action(action: UserAction, state: &AppState) -> Result<()> {
    match action {
        UserAction::Create {
            username,
            generate,
            yes,
        } => create_user(state, username, generate, yes).await?,
        UserAction::List => list_users(state).await?,
        UserAction::Grant {
            username,
            permission,
        } => {
            let permission = parse_permission(&permission)?;
            state.auth_service.grant(&username, permission).await?;
            println!(
                "{} {} -> {}",
                "Granted".green().bold(),
                permission.to_string().cyan(),
                username.bright_white()
            );
        }
        UserAction::Revoke {
            username,
            permission,
        } => {
            let permission = parse_permission(&permission)?;
            if state.auth_service.revoke(&username, permission).await? {
                println!(
                    "{} {} from {}",
                    "Revoked".green().bold(),
                    permission.to_string().cyan(),
                    username.bright_white()
                );
            } else {
                println!(
                    "{}",
                    format!("{username} did not have {permission}").yellow()
                );
            }
        }
    }

    Ok(())
}

/// Creates a user with interactive prompts.
///
/// With `--generate` a random password is shown once; otherwise it is read
/// from the terminal twice.
async fn create_user(
    state: &AppState,
    username: Option<String>,
    generate: bool,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "Create user".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let password = if generate {
        let generated = generate_password();
        println!("  Password: {}", generated.bright_yellow().bold());
        println!(
            "{}",
            "Save this password now, it cannot be shown again.".red().bold()
        );
        generated
    } else {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Repeat password", "Passwords do not match")
            .interact()?
    };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create user '{username}'?"))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let user = state.auth_service.create_user(&username, &password).await?;

    println!();
    println!(
        "{} {} (id {})",
        "User created:".green().bold(),
        user.username.cyan(),
        user.id
    );
    println!(
        "  Grant librarian access with: {} admin user grant {} can_mark_returned",
        "cargo run --bin".bright_cyan(),
        user.username
    );

    Ok(())
}

async fn list_users(state: &AppState) -> Result<()> {
    println!("{}", "Users".bright_blue().bold());
    println!();

    let users = state.auth_service.list_users().await?;

    if users.is_empty() {
        println!("{}", "  No users found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<24} {:<18} {}",
        "ID".bright_white().bold(),
        "Username".bright_white().bold(),
        "Created".bright_white().bold(),
        "Permissions".bright_white().bold()
    );
    println!("  {}", "-".repeat(75).bright_black());

    for user in &users {
        let permissions = if user.permissions.is_empty() {
            "-".bright_black()
        } else {
            user.permissions
                .iter()
                .map(|p| p.codename())
                .collect::<Vec<_>>()
                .join(", ")
                .normal()
        };
        let name = if user.is_active {
            user.username.cyan()
        } else {
            user.username.red()
        };

        println!(
            "  {:<4} {:<24} {:<18} {}",
            user.id.to_string().bright_black(),
            name,
            user.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            permissions
        );
    }

    println!();
    println!("  Total: {}", users.len().to_string().bright_white().bold());

    Ok(())
}

async fn handle_copy_action(action: CopyAction, state: &AppState) -> Result<()> {
    match action {
        CopyAction::Add {
            book,
            imprint,
            status,
            due,
        } => {
            let status: LoanStatus = status.parse().map_err(|e: String| anyhow!(e))?;
            let due_back = due.as_deref().map(parse_due).transpose()?;

            let copy = state
                .loan_service
                .add_copy(NewBookInstance {
                    book_id: book,
                    imprint,
                    status,
                    due_back,
                })
                .await?;

            println!(
                "{} {} of '{}' ({})",
                "Copy added:".green().bold(),
                copy.id.to_string().bright_white(),
                copy.book_title.cyan(),
                copy.status
            );
        }
        CopyAction::Lend { id, username, due } => {
            let due_back = parse_due(&due)?;
            let copy = state.loan_service.lend(id, &username, due_back).await?;

            println!(
                "{} '{}' to {} until {}",
                "Lent".green().bold(),
                copy.book_title.cyan(),
                username.bright_white(),
                copy.due_back_display()
            );
        }
        CopyAction::Return { id } => {
            let copy = state.loan_service.mark_returned(id).await?;
            println!(
                "{} '{}' is {}",
                "Returned:".green().bold(),
                copy.book_title.cyan(),
                copy.status.to_string().to_lowercase()
            );
        }
    }

    Ok(())
}

async fn handle_stats(state: &AppState) -> Result<()> {
    println!("{}", "Statistics".bright_blue().bold());
    println!();

    let summary = state.catalog_service.summary().await?;

    let rows = [
        ("Books", summary.num_books),
        ("Copies", summary.num_instances),
        ("Available", summary.num_instances_available),
        ("Authors", summary.num_authors),
        ("Genres", summary.num_genres),
    ];
    for (label, value) in rows {
        println!(
            "  {:<12} {}",
            format!("{label}:"),
            value.to_string().bright_green().bold()
        );
    }
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", migrations.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}

/// Random 20-character alphanumeric password.
fn generate_password() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
    const PASSWORD_LEN: usize = 20;

    let mut rng = rand::rng();

    (0..PASSWORD_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}
