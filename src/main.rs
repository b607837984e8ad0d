use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{info, warn};

use eventbrite_api::app::ports::{OptionStore, TransientStore};
use eventbrite_api::caller::Caller;
use eventbrite_api::common::constants::SERVICE_NAME;
use eventbrite_api::common::types::AccessToken;
use eventbrite_api::config::{CacheBackend, Config};
use eventbrite_api::connection::ConnectionHub;
use eventbrite_api::infra::credentials::InMemoryTokenStore;
use eventbrite_api::infra::http_client::ReqwestHttp;
use eventbrite_api::infra::option_store::{MemoryOptionStore, SqliteOptionStore};
use eventbrite_api::infra::transient_store::{MemoryTransientStore, SqliteTransientStore};
use eventbrite_api::logging;
use eventbrite_api::manager::Manager;
use eventbrite_api::query::{EventQuery, QueryVars};
use eventbrite_api::template;

const TOKEN_ENV: &str = "EVENTBRITE_TOKEN";
const USER_ID_ENV: &str = "EVENTBRITE_USER_ID";
const ENV_TOKEN_ID: &str = "env";

#[derive(Parser)]
#[command(name = "eventbrite")]
#[command(about = "Query Eventbrite events through a local response cache")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events, 10 per page
    Events {
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Events owned by the connected user instead of the public search
        #[arg(long)]
        private: bool,
        /// Owned-event status (only with --private)
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        organizer: Option<String>,
        #[arg(long)]
        venue: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        format: Option<String>,
        /// Event IDs to leave out (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// Return the whole remote page instead of one window
        #[arg(long)]
        all: bool,
        /// Base URL used to print permalinks
        #[arg(long, default_value = "/events")]
        base: String,
    },
    /// Show a single event
    Event {
        id: String,
        /// Skip the cache
        #[arg(long)]
        force: bool,
    },
    /// Delete every cached response
    Flush,
    /// Delete cached responses and stored options
    Uninstall,
}

struct App {
    manager: Arc<Manager>,
    caller: Arc<Caller>,
    hub: ConnectionHub,
}

fn build_app(config: &Config) -> Result<App> {
    let (transients, options): (Arc<dyn TransientStore>, Arc<dyn OptionStore>) = match config.cache.backend {
        CacheBackend::Memory => (Arc::new(MemoryTransientStore::new()), Arc::new(MemoryOptionStore::new())),
        CacheBackend::Sqlite => (
            Arc::new(SqliteTransientStore::open(&config.cache.path).context("opening transient store")?),
            Arc::new(SqliteOptionStore::open(&config.cache.path).context("opening option store")?),
        ),
    };

    let registry = Arc::new(config.registry()?);
    let http = Arc::new(ReqwestHttp::new(config.default_timeout())?);

    let tokens = Arc::new(InMemoryTokenStore::new());
    if let Ok(access_token) = std::env::var(TOKEN_ENV) {
        tokens.insert(AccessToken {
            id: ENV_TOKEN_ID.to_string(),
            access_token,
            user_id: std::env::var(USER_ID_ENV).ok(),
        });
    }

    let caller = Arc::new(
        Caller::new(registry.clone(), config.api.base_url.clone(), http, tokens, options.clone())
            .with_call_timeout(config.call_timeout()),
    );
    let manager = Arc::new(
        Manager::new(registry, caller.clone(), transients, options).with_ttl(config.cache_ttl()),
    );

    let mut hub = ConnectionHub::new();
    hub.subscribe(caller.clone());
    hub.subscribe(manager.clone());

    Ok(App { manager, caller, hub })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let app = build_app(&config)?;

    if std::env::var(TOKEN_ENV).is_ok() && !app.caller.has_active_connection() {
        app.hub.connection_verified(SERVICE_NAME, ENV_TOKEN_ID);
    }

    match cli.command {
        Commands::Events {
            page,
            private,
            status,
            limit,
            organizer,
            venue,
            category,
            subcategory,
            format,
            exclude,
            all,
            base,
        } => {
            let vars = QueryVars {
                paged: Some(page),
                display_private: private,
                status,
                limit,
                organizer_id: organizer,
                venue_id: venue,
                category_id: category,
                subcategory_id: subcategory,
                format_id: format,
                exclude,
                nopaging: all,
                ..Default::default()
            };
            let state = EventQuery::new(app.manager.clone()).get_records(vars).await;
            if let Some(e) = &state.error {
                warn!("Listing failed: {}", e);
            }

            for event in &state.posts {
                println!("{}  {}  {}", event.start.local, event.title, template::permalink(&base, event));
            }
            println!("{} found, {} pages", state.found_posts, state.max_num_pages);
            if let Some(nav) = template::paging_nav(&state) {
                println!("{}", serde_json::to_string(&nav)?);
            }
        }
        Commands::Event { id, force } => {
            let results = app.manager.get_event(&id, force).await?;
            let events = eventbrite_api::mapper::map_events(&results.events);
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Commands::Flush => {
            let flushed = app.manager.flush_transients()?;
            info!("Flushed {} cached responses", flushed);
            println!("Flushed {} cached responses", flushed);
        }
        Commands::Uninstall => {
            app.manager.uninstall()?;
            println!("Removed cached responses and stored options");
        }
    }

    Ok(())
}
