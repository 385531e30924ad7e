//! hqbridge - CLI for the Survey Solutions Headquarters API
//!
//! Connects to a configured HQ server, runs one call through the
//! normalization layer, and prints the result as JSON. Non-fatal endpoint
//! warnings go to stderr so piped output stays clean.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hqbridge::HqClient;
use hqbridge::auth::Credentials;
use hqbridge::config::Config;
use hqbridge::models::{NewUser, Role};

/// hqbridge - Survey Solutions HQ client
#[derive(Parser, Debug)]
#[command(name = "hqbridge")]
#[command(about = "Talk to a Survey Solutions Headquarters server")]
#[command(version)]
struct Args {
    /// HQ base URL (e.g., https://hq.example.org)
    #[arg(short, long, env = "HQ_BASE_URL")]
    base_url: Option<String>,

    /// Workspace to scope resource calls to
    #[arg(short, long, env = "HQ_WORKSPACE")]
    workspace: Option<String>,

    #[arg(short, long, env = "HQ_USERNAME")]
    username: Option<String>,

    #[arg(short, long, env = "HQ_PASSWORD")]
    password: Option<String>,

    /// Bearer token, for deployments that issue them
    #[arg(long, env = "HQ_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List workspaces
    Workspaces,
    /// Assemble the unified user directory
    Users {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// List assignments in the current workspace
    Assignments {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// List interviews in the current workspace
    Interviews {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show fallback counters for a workspace
    Status { name: String },
    /// Create a workspace
    CreateWorkspace { name: String, display_name: String },
    /// Change a workspace's display name
    RenameWorkspace { name: String, display_name: String },
    /// Enable a workspace
    EnableWorkspace { name: String },
    /// Disable a workspace
    DisableWorkspace { name: String },
    /// Create a user in HQ
    CreateUser {
        #[arg(long)]
        role: String,
        #[arg(long)]
        user_name: String,
        #[arg(long)]
        new_password: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Supervisor username, required when creating an interviewer
        #[arg(long)]
        supervisor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // For debugging, set RUST_LOG=debug
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let mut config = Config::load().unwrap_or_default();

    let profile = config.current_profile().cloned();
    let base_url = args
        .base_url
        .or_else(|| profile.as_ref().map(|p| p.base_url.clone()))
        .context("no base URL given (use --base-url or HQ_BASE_URL)")?;
    let workspace = args
        .workspace
        .or_else(|| profile.as_ref().and_then(|p| p.workspace.clone()));
    let username = args
        .username
        .or_else(|| profile.as_ref().and_then(|p| p.username.clone()))
        .context("no username given (use --username or HQ_USERNAME)")?;
    let Some(password) = args.password else {
        bail!("no password given (use --password or HQ_PASSWORD)");
    };

    let mut credentials = Credentials::new(username.clone(), password);
    if let Some(token) = args.token {
        credentials = credentials.with_bearer_token(token);
    }

    let client = HqClient::new(base_url.clone(), workspace.clone(), credentials)?;
    client
        .ensure_auth()
        .await
        .context("failed to authenticate against HQ")?;
    tracing::info!(mode = ?client.auth_mode().await, "authenticated against HQ");

    config.remember(&base_url, workspace.as_deref(), Some(&username));
    if let Err(err) = config.save() {
        tracing::warn!(error = %err, "could not save config");
    }

    run_command(&client, args.command).await
}

async fn run_command(client: &HqClient, command: Command) -> Result<()> {
    match command {
        Command::Workspaces => {
            let workspaces = client.get_workspaces().await?;
            print_json(&workspaces)?;
        }
        Command::Users { limit } => {
            let result = client.get_users_unified(limit).await;
            for warning in &result.warnings {
                eprintln!("warning: {warning}");
            }
            // A 403 on the supervisor listing means this account cannot see
            // the users module at all, which deserves a clearer message.
            if result
                .warnings
                .iter()
                .any(|w| w.contains("HTTP 403") && w.contains("supervisors"))
            {
                eprintln!("access to the users module is denied for this account");
            }
            print_json(&result)?;
        }
        Command::Assignments { limit } => {
            let assignments = client.get_assignments(limit).await?;
            print_json(&assignments)?;
        }
        Command::Interviews { limit } => {
            let interviews = client.get_interviews(limit).await?;
            print_json(&interviews)?;
        }
        Command::Status { name } => {
            let status = client.workspace_status(&name).await?;
            print_json(&status)?;
        }
        Command::CreateWorkspace { name, display_name } => {
            let created = client.create_workspace(&name, &display_name).await?;
            print_json(&created)?;
        }
        Command::RenameWorkspace { name, display_name } => {
            client.update_workspace(&name, &display_name).await?;
            eprintln!("workspace {name} updated");
        }
        Command::EnableWorkspace { name } => {
            client.enable_workspace(&name).await?;
            eprintln!("workspace {name} enabled");
        }
        Command::DisableWorkspace { name } => {
            client.disable_workspace(&name).await?;
            eprintln!("workspace {name} disabled");
        }
        Command::CreateUser {
            role,
            user_name,
            new_password,
            full_name,
            phone,
            email,
            supervisor,
        } => {
            let role = Role::normalize(&role).context("role must not be empty")?;
            let payload = NewUser {
                role,
                user_name,
                password: new_password,
                full_name,
                phone_number: phone,
                email,
                supervisor,
            };
            let id = client.create_user(&payload).await?;
            match id {
                Some(id) => println!("{id}"),
                None => eprintln!("user created (HQ returned no id)"),
            }
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
