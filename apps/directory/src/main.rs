mod config;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use client_core::{
    forms::{submit_new_user, submit_user_edit},
    DirectoryError, DirectoryIntent, DirectoryStore, HttpUserSource, IntentOutcome, LoadOrigin,
    MissingUserSource, UserSource,
};
use shared::domain::{NewUser, SearchField, SortDirection, SortKey, UserId};
use storage::{SnapshotStore, Storage};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::{load_settings, Settings, DEFAULT_CONFIG_PATH};

#[derive(Parser, Debug)]
#[command(name = "directory", about = "Browse and edit a cached user directory")]
struct Cli {
    #[arg(long, global = true)]
    database_url: Option<String>,
    #[arg(long, global = true)]
    endpoint: Option<String>,
    /// Never contact the endpoint; only the local snapshot is used.
    #[arg(long, global = true)]
    offline: bool,
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = SortKey::Name)]
        sort_by: SortKey,
        #[arg(long, default_value_t = SortDirection::Ascending)]
        order: SortDirection,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<SearchField>,
    },
    Show {
        id: i64,
    },
    Add(UserFieldArgs),
    Edit {
        id: i64,
        #[command(flatten)]
        changes: UserFieldArgs,
    },
    Remove {
        id: i64,
    },
    /// Fetch from the endpoint and replace the snapshot.
    Refresh,
    /// Forget the local snapshot so the next load fetches remotely.
    Clear,
    Status,
}

/// Every user attribute as an optional flag. `add` starts from blank fields,
/// `edit` from the stored record.
#[derive(Args, Debug, Default)]
struct UserFieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    suite: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    zipcode: Option<String>,
    #[arg(long)]
    lat: Option<String>,
    #[arg(long)]
    lng: Option<String>,
    #[arg(long)]
    company: Option<String>,
    #[arg(long)]
    catch_phrase: Option<String>,
    #[arg(long)]
    bs: Option<String>,
}

impl UserFieldArgs {
    fn apply_to(self, mut fields: NewUser) -> NewUser {
        let overrides = [
            (self.name, &mut fields.name),
            (self.email, &mut fields.email),
            (self.phone, &mut fields.phone),
            (self.website, &mut fields.website),
            (self.street, &mut fields.address.street),
            (self.suite, &mut fields.address.suite),
            (self.city, &mut fields.address.city),
            (self.zipcode, &mut fields.address.zipcode),
            (self.lat, &mut fields.address.geo.lat),
            (self.lng, &mut fields.address.geo.lng),
            (self.company, &mut fields.company.name),
            (self.catch_phrase, &mut fields.company.catch_phrase),
            (self.bs, &mut fields.company.bs),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
        fields
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = load_settings(&cli.config);
    if let Some(database_url) = cli.database_url {
        settings.database_url = database_url;
    }
    if let Some(endpoint) = cli.endpoint {
        settings.endpoint_url = endpoint;
    }

    let database_url = settings.resolved_database_url();
    let storage = Storage::new(&database_url).await.map_err(|err| {
        error!(database_url = %database_url, error = %err, "failed to open snapshot database");
        err
    })?;

    let source: Arc<dyn UserSource> = if cli.offline {
        info!("offline mode, remote fetches disabled");
        Arc::new(MissingUserSource)
    } else {
        let endpoint = settings.checked_endpoint()?;
        Arc::new(HttpUserSource::new(endpoint.as_str(), settings.request_timeout())?)
    };
    let store = DirectoryStore::with_options(
        source,
        Arc::new(storage.clone()),
        settings.store_options(),
    );

    match cli.command {
        Command::List {
            search,
            sort_by,
            order,
            fields,
        } => {
            load_directory(&store).await?;
            store.dispatch(DirectoryIntent::SetSearchTerm(search)).await?;
            store.dispatch(DirectoryIntent::SetSortKey(sort_by)).await?;
            store.dispatch(DirectoryIntent::SetSortDirection(order)).await?;
            if !fields.is_empty() {
                store.set_search_fields(fields).await;
            }
            print!("{}", render::user_table(&store.projection().await));
        }
        Command::Show { id } => {
            load_directory(&store).await?;
            let Some(user) = store.user(UserId(id)).await else {
                bail!("no user with id {id}");
            };
            println!("{}", render::user_detail(&user));
        }
        Command::Add(args) => {
            load_directory(&store).await?;
            let fields = args.apply_to(NewUser::default());
            let created = submit_new_user(&store, fields).await.map_err(report)?;
            println!("created user_id={}", created.id);
        }
        Command::Edit { id, changes } => {
            load_directory(&store).await?;
            let Some(existing) = store.user(UserId(id)).await else {
                bail!("no user with id {id}");
            };
            let edited = changes.apply_to(existing.fields()).into_record(existing.id);
            let saved = submit_user_edit(&store, edited).await.map_err(report)?;
            println!("updated user_id={}", saved.id);
        }
        Command::Remove { id } => {
            load_directory(&store).await?;
            match store.dispatch(DirectoryIntent::Remove(UserId(id))).await? {
                IntentOutcome::Removed(Some(user)) => {
                    println!("removed user_id={} ({})", user.id, user.name)
                }
                _ => println!("no user with id {id}"),
            }
        }
        Command::Refresh => {
            store
                .dispatch(DirectoryIntent::Refresh)
                .await
                .context("refresh failed")?;
            println!("fetched {} users", store.records().await.len());
        }
        Command::Clear => {
            if storage.clear_snapshot(&settings.snapshot_key).await? {
                println!("cleared snapshot '{}'", settings.snapshot_key);
            } else {
                println!("no snapshot '{}' to clear", settings.snapshot_key);
            }
        }
        Command::Status => print_status(&settings, &database_url, &storage, cli.offline).await?,
    }

    Ok(())
}

async fn load_directory(store: &DirectoryStore) -> Result<LoadOrigin> {
    let origin = match store.dispatch(DirectoryIntent::Load).await {
        Ok(IntentOutcome::Loaded(origin)) => origin,
        Ok(other) => bail!("unexpected load outcome {other:?}"),
        Err(err) => return Err(err).context("failed to load users"),
    };
    info!(?origin, count = store.records().await.len(), "directory loaded");
    Ok(origin)
}

fn report(err: DirectoryError) -> anyhow::Error {
    match err.field_errors() {
        Some(errors) => {
            eprintln!("user not saved:\n{}", render::field_errors(errors));
            anyhow::anyhow!("{} invalid field(s)", errors.len())
        }
        None => err.into(),
    }
}

async fn print_status(
    settings: &Settings,
    database_url: &str,
    storage: &Storage,
    offline: bool,
) -> Result<()> {
    storage.health_check().await?;
    println!("database:  {database_url}");
    if offline {
        println!("endpoint:  (offline)");
    } else {
        println!("endpoint:  {}", settings.endpoint_url);
    }

    match storage.load_snapshot(&settings.snapshot_key).await? {
        Some(snapshot) => {
            let count = serde_json::from_str::<Vec<serde_json::Value>>(&snapshot.payload)
                .map(|users| users.len().to_string())
                .unwrap_or_else(|_| "unreadable".into());
            let age = Utc::now() - snapshot.updated_at;
            println!(
                "snapshot:  '{}' with {count} users, saved {} ({}s ago)",
                snapshot.key,
                snapshot.updated_at.to_rfc3339(),
                age.num_seconds()
            );
        }
        None => println!("snapshot:  '{}' not saved yet", settings.snapshot_key),
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
