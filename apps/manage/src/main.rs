//! # Yatube management commands
//!
//! Group administration and cache maintenance against the configured
//! database and Redis server.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use yatube_core::domain::NewGroup;
use yatube_core::ports::{BaseRepository, Cache, GroupRepository, INDEX_CACHE_PREFIX};
use yatube_infra::database::connect;
use yatube_infra::{DatabaseConfig, PostgresStore, RedisCache, RedisConfig};

#[derive(Parser)]
#[command(name = "manage")]
#[command(about = "Yatube administration commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a group posts can be filed under.
    CreateGroup {
        slug: String,
        title: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// List every group.
    ListGroups,
    /// Delete a group. Its posts stay, without a group.
    DeleteGroup { slug: String },
    /// Drop cached index pages so new posts show up immediately.
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,manage=info")),
        )
        .init();

    match Cli::parse().command {
        Command::CreateGroup {
            slug,
            title,
            description,
        } => create_group(&slug, &title, &description).await,
        Command::ListGroups => list_groups().await,
        Command::DeleteGroup { slug } => delete_group(&slug).await,
        Command::ClearCache => clear_cache().await,
    }
}

async fn groups() -> Result<std::sync::Arc<dyn GroupRepository>> {
    let Some(config) = DatabaseConfig::from_env() else {
        bail!("DATABASE_URL is not set");
    };
    let db = connect(&config)
        .await
        .context("Failed to connect to database")?;
    Ok(PostgresStore::new(db).repositories().groups)
}

async fn create_group(slug: &str, title: &str, description: &str) -> Result<()> {
    let group = NewGroup::new(title, slug, description)?;
    let group = groups()
        .await?
        .create(group)
        .await
        .with_context(|| format!("Failed to create group {:?}", slug))?;

    tracing::info!(group_id = group.id, slug = %group.slug, "Group created");
    println!("Created group {} ({})", group.slug, group.title);
    Ok(())
}

async fn list_groups() -> Result<()> {
    let groups = groups().await?.list().await?;
    if groups.is_empty() {
        println!("No groups.");
    }
    for group in groups {
        println!("{:<24} {}", group.slug, group.title);
    }
    Ok(())
}

async fn delete_group(slug: &str) -> Result<()> {
    let repo = groups().await?;
    let Some(group) = repo.find_by_slug(slug).await? else {
        bail!("No group with slug {:?}", slug);
    };

    repo.delete(group.id).await?;
    tracing::info!(group_id = group.id, slug, "Group deleted");
    println!("Deleted group {}", slug);
    Ok(())
}

async fn clear_cache() -> Result<()> {
    if std::env::var("REDIS_URL").is_err() {
        bail!("REDIS_URL is not set; the in-memory cache lives inside the web process");
    }
    let cache = RedisCache::new(&RedisConfig::from_env())
        .await
        .context("Failed to connect to Redis")?;
    cache.delete_prefix(INDEX_CACHE_PREFIX).await?;

    println!("Cleared cached index pages");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_create_group_description_is_optional() {
        let cli = Cli::try_parse_from(["manage", "create-group", "cats", "Cats"]).unwrap();
        match cli.command {
            Command::CreateGroup {
                slug,
                title,
                description,
            } => {
                assert_eq!(slug, "cats");
                assert_eq!(title, "Cats");
                assert_eq!(description, "");
            }
            _ => panic!("expected create-group"),
        }
    }
}
