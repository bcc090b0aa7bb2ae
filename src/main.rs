use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use sw360_ui_config::core::client::Sw360Client;
use sw360_ui_config::core::session::StaticSession;
use sw360_ui_config::models::ConfigKey;
use sw360_ui_config::settings::Settings;
use sw360_ui_config::storage::FileStore;
use sw360_ui_config::{api, ConfigProvider, Result, UiConfigCache};

#[derive(Parser, Debug)]
#[command(name = "sw360-ui-config", version, about = "Mirror the SW360 UI configuration into a local cache")]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, env = "SW360_CONFIG", default_value = "sw360.json")]
    config: PathBuf,

    /// SW360 REST base URL, e.g. http://localhost:8080/resource/api
    #[arg(long = "api-url", env = "SW360_API_URL")]
    api_url: Option<String>,

    /// Access token for the SW360 REST API
    #[arg(long, env = "SW360_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Directory holding uiConfig.json
    #[arg(long = "cache-dir", env = "SW360_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Override the 15-minute cache TTL, in seconds (at most 86400)
    #[arg(long = "ttl", env = "SW360_CACHE_TTL_SECS")]
    ttl_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Force a refresh and print the processed configuration
    Fetch,
    /// Print the cached configuration without contacting the server
    Show,
    /// Print one value, refreshing first if the cache is stale
    Get {
        /// Config key, e.g. "ui.project.type"
        key: String,
    },
    /// Keep the cache fresh and serve it over a local HTTP API
    Serve {
        #[arg(long, env = "SW360_LISTEN")]
        listen: Option<String>,
    },
}

fn init_tracing() {
    let env = std::env::var("SW360_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        settings.api_base_url = url.clone();
    }
    if let Some(token) = &cli.token {
        settings.access_token = Some(token.clone());
    }
    if let Some(dir) = &cli.cache_dir {
        settings.cache_dir = dir.clone();
    }
    if let Some(ttl) = cli.ttl_secs {
        settings.cache_ttl_secs = ttl;
    }
    settings.validate()?;
    Ok(settings)
}

fn build_cache(settings: &Settings) -> Result<Arc<UiConfigCache>> {
    let client = Sw360Client::new(&settings.api_base_url, settings.request_timeout())?;
    let store = Arc::new(FileStore::new(&settings.cache_dir));
    let session = Arc::new(StaticSession::new(settings.access_token.clone()));
    Ok(Arc::new(UiConfigCache::new(
        client,
        store,
        session,
        settings.cache_ttl(),
    )))
}

async fn run(cli: Cli) -> Result<()> {
    let settings = resolve_settings(&cli)?;
    let cache = build_cache(&settings)?;

    match cli.command {
        Commands::Fetch => {
            let outcome = cache.refresh_config().await;
            tracing::info!("刷新结果: {:?}", outcome);
            println!("{}", serde_json::to_string_pretty(&cache.config())?);
        }
        Commands::Show => {
            println!("{}", serde_json::to_string_pretty(&cache.cached())?);
        }
        Commands::Get { key } => {
            let key = key.parse::<ConfigKey>()?;
            cache.fetch_and_process(false).await;
            println!("{}", serde_json::to_string_pretty(&cache.config_value(key))?);
        }
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or_else(|| settings.listen_addr.clone());
            // 卸载前一直持有
            let _provider = match ConfigProvider::mount(cache.clone()) {
                Some(provider) => Some(provider),
                None => {
                    tracing::warn!("没有可用的访问令牌，镜像 API 将拒绝所有请求");
                    None
                }
            };
            api::serve(cache, &listen).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
