//! User commands - run repository operations against the `users` table

use std::sync::Arc;

use anyhow::{anyhow, bail};
use clap::Args;
use tracing::info;

use super::Command;
use crate::config::AppConfig;
use crate::domain::{Criteria, Model, ModelId, Repository, User, Value};
use crate::domain::user::USERS_TABLE;
use crate::infrastructure::cache::CacheFactory;
use crate::infrastructure::logging::{init_logging, TracingLogger};
use crate::infrastructure::repository::CachedRepository;
use crate::infrastructure::storage::{StorageFactory, StorageType};

/// Arguments for the find-by command
#[derive(Args, Clone, Debug)]
pub struct FindByArgs {
    /// Equality condition as `attribute=value` (repeatable); the value is read
    /// as `true`/`false`, `null`, an integer, a float, or else text
    #[arg(long = "where", value_name = "ATTRIBUTE=VALUE", value_parser = parse_condition)]
    pub conditions: Vec<(String, Value)>,

    /// Return only the first match
    #[arg(long)]
    pub one: bool,
}

/// Arguments for the insert command
#[derive(Args, Clone, Debug)]
pub struct InsertArgs {
    /// User identifier
    pub id: String,

    pub username: String,

    pub password: String,

    /// Store the user as inactive
    #[arg(long)]
    pub inactive: bool,
}

/// Arguments for the update command
#[derive(Args, Clone, Debug)]
pub struct UpdateArgs {
    /// User identifier
    pub id: String,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    #[arg(long)]
    pub active: Option<bool>,
}

/// Parses `attribute=value`, typing the value as bool, null, integer, float or text
pub fn parse_condition(input: &str) -> Result<(String, Value), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected ATTRIBUTE=VALUE, got '{}'", input))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in '{}'", input));
    }

    Ok((name.to_string(), Value::parse_literal(value)))
}

/// Run a user command
pub async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    if config.storage.storage_type == StorageType::InMemory {
        info!("Using in-memory storage; data does not outlive this process");
    }

    if let Command::Init = command {
        StorageFactory::create_for::<User>(&config.storage, USERS_TABLE).await?;
        info!("Table '{}' is ready", USERS_TABLE);
        return Ok(());
    }

    let repository = build_repository(&config).await?;
    execute(&repository, command).await
}

async fn build_repository(config: &AppConfig) -> anyhow::Result<CachedRepository<User>> {
    let storage = StorageFactory::create(&config.storage).await?;
    let cache = CacheFactory::create::<User>(&config.cache).await?;

    Ok(CachedRepository::new(storage, cache, USERS_TABLE).with_logger(Arc::new(TracingLogger::new())))
}

async fn execute(repository: &dyn Repository<User>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Find { id } => {
            let id = ModelId::new(id)?;
            print_optional(repository.find(&id).await?)
        }
        Command::FindBy(args) => {
            let criteria: Criteria = args.conditions.into_iter().collect();

            if args.one {
                print_optional(repository.find_one_by(&criteria).await?)
            } else {
                for user in repository.find_by(&criteria).await? {
                    print_user(&user)?;
                }
                Ok(())
            }
        }
        Command::Insert(args) => {
            let user = User::new(ModelId::new(args.id)?, args.username, args.password)
                .with_active(!args.inactive);

            repository.insert(&user).await?;
            print_user(&user)
        }
        Command::Update(args) => {
            let id = ModelId::new(args.id)?;
            let mut user = repository
                .find(&id)
                .await?
                .ok_or_else(|| anyhow!("User '{}' not found", id))?;

            if let Some(username) = args.username {
                user.set_username(username);
            }
            if let Some(password) = args.password {
                user.set_password(password);
            }
            if let Some(active) = args.active {
                user.set_active(active);
            }

            repository.update(&user).await?;
            print_user(&user)
        }
        Command::Remove { id } => {
            let id = ModelId::new(id)?;
            let Some(user) = repository.find(&id).await? else {
                bail!("User '{}' not found", id);
            };

            repository.remove(&user).await?;
            Ok(())
        }
        Command::Init => Ok(()),
    }
}

fn print_optional(user: Option<User>) -> anyhow::Result<()> {
    match user {
        Some(user) => print_user(&user),
        None => Ok(()),
    }
}

fn print_user(user: &User) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(&user.to_persistence())?);
    Ok(())
}
