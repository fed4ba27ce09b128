// MarketMind - marketing intelligence workspace
//
// Architecture:
// - Store: single owner of AppState, persisted as one JSON document
// - Insight Service: mock or live backend behind one trait
// - Panels: per-tab workflows that call the service and patch the Store
// - Router: tab ids to panels and the state slices they touch
// - CLI (clap): the outer surface driving all of the above

mod cli;
mod config;
mod insight;
mod logging;
mod panels;
mod router;
mod startup;
mod state;
mod storage;
mod store;
mod util;
mod validator;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use router::{Router, Tab};
use storage::{FileStorage, MemoryStorage};
use store::Store;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that need neither state nor logging
    match &cli.command {
        Some(Commands::Config {
            show,
            reset,
            edit,
            update,
            path,
        }) => return cli::handle_config(*show, *reset, *edit, *update, *path),
        Some(Commands::Validate { file }) => return cli::handle_validate(file),
        _ => {}
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // The guard must live until exit so file logs flush
    let _file_guard = logging::init_tracing(&config.logging);

    let file_storage = FileStorage::new(&config.state_dir, &config.state_key);
    let scratch = cli
        .no_persist
        .then(|| MemoryStorage::seeded_from(&file_storage));
    let mut store = match &scratch {
        Some(memory) => {
            tracing::info!("--no-persist: changes stay in memory");
            Store::open(memory.clone())
        }
        None => Store::open(file_storage),
    };
    store.ensure_demo_csv();

    let service = insight::create_service(&config.insight);
    tracing::debug!("Insight backend: {}", service.name());

    let start = Tab::from_id(&config.start_tab).unwrap_or_else(|| {
        tracing::warn!(
            "Unknown start_tab {:?}, using {}",
            config.start_tab,
            Tab::default().id()
        );
        Tab::default()
    });
    let mut router = Router::new(start);

    let result = match cli.command {
        Some(Commands::Open { tab, args }) => {
            cli::handle_open(&tab, args, &mut router, &mut store, service.as_ref()).await
        }
        Some(Commands::Commit { file }) => cli::handle_commit(&file, &mut store),
        Some(Commands::State {
            show,
            path,
            clear,
            patch,
        }) => cli::handle_state(show, path, clear, patch, &mut store),
        Some(Commands::Config { .. }) | Some(Commands::Validate { .. }) => Ok(()),
        None => {
            let report = startup::StartupReport {
                config: &config,
                store: &store,
                insight: service.name(),
            };
            startup::print_startup(&report);
            startup::log_startup(&report);

            let view = router.active();
            println!(
                "  Start tab: {} ({})  -  run `marketmind open <tab>`",
                view.label,
                view.tab.id()
            );
            println!();
            Ok(())
        }
    };

    if let Some(memory) = scratch {
        tracing::info!("Discarded {} in-memory state write(s)", memory.writes());
    }
    result
}
