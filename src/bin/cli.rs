use anyhow::{Context, Result};
use authforge::cli::{add_claim, assign_role, create_role, seed_roles};
use authforge::store::PgStore;
use authforge_db::{init_db_pool, run_migrations};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use dotenvy::dotenv;

#[derive(Parser)]
#[command(name = "authforge-cli")]
#[command(about = "Authforge CLI - Administrative tools for Authforge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a role
    CreateRole {
        /// Role name (prompted if not provided)
        name: Option<String>,
    },
    /// Create the default "User" and "Admin" roles if missing
    SeedRoles,
    /// Grant an existing role to a user
    AssignRole {
        /// User id
        #[arg(short = 'u', long)]
        user_id: Option<String>,

        /// Role name
        #[arg(short = 'r', long)]
        role: Option<String>,
    },
    /// Attach a custom claim carried by the user's future tokens
    AddClaim {
        /// User id
        #[arg(short = 'u', long)]
        user_id: Option<String>,

        /// Claim type (JWT payload key)
        #[arg(short = 't', long = "type")]
        claim_type: Option<String>,

        /// Claim value
        #[arg(short = 'v', long = "value")]
        claim_value: Option<String>,
    },
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Input::new()
            .with_prompt(prompt)
            .interact_text()
            .with_context(|| format!("Failed to read {}", prompt.to_lowercase())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("Failed to connect to database")?;

    let store = PgStore::new(pool);

    match cli.command {
        Commands::Migrate => {
            run_migrations(store.pool())
                .await
                .context("Migration failed")?;
            println!("✅ Migrations applied");
        }
        Commands::CreateRole { name } => {
            let name = prompt_if_missing(name, "Role name")?;
            if create_role(&store, &name).await? {
                println!("✅ Role '{}' created", name);
            } else {
                println!("ℹ️  Role '{}' already exists", name);
            }
        }
        Commands::SeedRoles => {
            let created = seed_roles(&store).await?;
            if created.is_empty() {
                println!("ℹ️  Default roles already present");
            } else {
                println!("✅ Created roles: {}", created.join(", "));
            }
        }
        Commands::AssignRole { user_id, role } => {
            let user_id = prompt_if_missing(user_id, "User id")?;
            let role = prompt_if_missing(role, "Role")?;
            assign_role(&store, &user_id, &role).await?;
            println!("✅ Role '{}' assigned to {}", role, user_id);
        }
        Commands::AddClaim {
            user_id,
            claim_type,
            claim_value,
        } => {
            let user_id = prompt_if_missing(user_id, "User id")?;
            let claim_type = prompt_if_missing(claim_type, "Claim type")?;
            let claim_value = prompt_if_missing(claim_value, "Claim value")?;
            add_claim(&store, &user_id, &claim_type, &claim_value).await?;
            println!("✅ Claim '{}' added to {}", claim_type, user_id);
        }
    }

    Ok(())
}
