use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use shelf::app::App;
use shelf::catalog::{CatalogRemote, HttpRemote, OfflineRemote};
use shelf::commands::Command;
use shelf::config::Config;
use shelf::logging;
use shelf::mirror::{LocalMirror, SqliteStorage};
use shelf::store::CatalogStore;

#[derive(Parser, Debug)]
#[command(name = "shelf")]
#[command(about = "A product catalog that keeps working when the inventory service is down")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./shelf.yaml or $XDG_CONFIG_HOME/shelf/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Do not contact the inventory service; work from the local mirror only
  #[arg(long, global = true)]
  offline: bool,

  /// Print JSON instead of tables
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log)?;

  let mirror_path = config.mirror.resolved_path()?;
  let storage = SqliteStorage::open(&mirror_path)?;
  let mirror = LocalMirror::new(storage, config.mirror.slot.clone());

  if args.offline {
    run(OfflineRemote, mirror, mirror_path, &args).await
  } else {
    let remote = HttpRemote::new(&config.remote)?;
    tracing::debug!(endpoint = remote.endpoint(), "using inventory service");
    run(remote, mirror, mirror_path, &args).await
  }
}

async fn run<R: CatalogRemote>(
  remote: R,
  mirror: LocalMirror<SqliteStorage>,
  mirror_path: PathBuf,
  args: &Args,
) -> Result<()> {
  let store = CatalogStore::new(remote, mirror);
  let app = App::new(store, args.json, mirror_path);
  app.run(args.command.clone()).await
}
