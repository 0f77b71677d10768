use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rocket::{figment::Figment, routes, Build, Rocket};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;

mod config;
use config::HookfeedConfig;

mod cors;
use cors::Cors;

mod feed;

mod store;
use store::Store;

mod webhooks;
use webhooks::webhook;

#[derive(Parser)]
#[command(version)]
struct Opts {
    /// Configuration file for hookfeed, defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Mounts every route on a Rocket instance configured by `figment`, with `store` as the event
/// store of all handlers.
pub(crate) fn build_rocket(figment: Figment, store: Store) -> Rocket<Build> {
    rocket::custom(figment)
        .mount("/", routes![webhook, api::events, cors::preflight])
        .attach(Cors)
        .manage(store)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<HookfeedConfig> {
    let path = match path {
        Some(path) => path,
        None => return Ok(HookfeedConfig::default()),
    };

    let config_file =
        File::open(path).with_context(|| format!("couldn't open {}:", path.display()))?;
    serde_yaml::from_reader(BufReader::new(config_file)).context("couldn't parse config file")
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opts = Opts::parse();
    let config = load_config(opts.config.as_ref())?;

    let store = store::open(&config.storage).context("couldn't open event store")?;
    info!("storing events in {:?}", config.storage);

    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    build_rocket(figment, Store(store))
        .launch()
        .await
        .map(drop)
        .map_err(|err| anyhow::anyhow!("rocket failed: {}", err))
}
