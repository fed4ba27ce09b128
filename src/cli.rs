// CLI module - command-line argument parsing and handlers
//
// Subcommands:
// - open <tab>: route to a tab and run its primary action
// - validate / commit: check or load a CSV dataset
// - state: inspect, patch or clear the persisted workspace
// - config: show, reset, edit, update or locate the config file

use crate::config::{Config, VERSION};
use crate::insight::InsightService;
use crate::panels::{
    campaigns, explainer, AudienceMatrix, CampaignFactory, Copilot, Dashboard, DataNarrator,
    ForecastSummary, MarketIntel, PanelStatus, ProductLab, RiskRadar, ScenarioEngine,
};
use crate::router::{self, Router, Tab, ViewDescriptor};
use crate::state::StatePatch;
use crate::store::Store;
use crate::validator;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::process::Command;

/// MarketMind - marketing intelligence workspace
#[derive(Parser)]
#[command(name = "marketmind")]
#[command(version = VERSION)]
#[command(about = "Marketing intelligence workspace", long_about = None)]
pub struct Cli {
    /// Work on an in-memory copy of the saved state; nothing is written back
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open a tab and run its primary action
    Open {
        /// Tab id (unknown ids open the dashboard)
        tab: String,

        #[command(flatten)]
        args: OpenArgs,
    },

    /// Validate a CSV file ("-" reads stdin)
    Validate { file: String },

    /// Validate a CSV file and make it the working dataset
    Commit { file: String },

    /// Inspect or modify the persisted workspace state
    State {
        /// Print the current state as JSON
        #[arg(long)]
        show: bool,

        /// Show the snapshot location
        #[arg(long)]
        path: bool,

        /// Delete the persisted snapshot
        #[arg(long)]
        clear: bool,

        /// Merge a JSON object of state fields
        #[arg(long, value_name = "JSON")]
        patch: Option<String>,
    },

    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Update config with new defaults (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Inputs for the tab actions; each tab reads the ones it needs
#[derive(clap::Args, Debug, Default)]
pub struct OpenArgs {
    /// Campaign goal (campaigns)
    #[arg(long)]
    pub goal: Option<String>,

    /// Research topic (market)
    #[arg(long)]
    pub topic: Option<String>,

    /// Message for the copilot (synexia)
    #[arg(long)]
    pub message: Option<String>,

    /// Price change in percent (simulator)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub price: f64,

    /// Marketing budget change in percent (simulator)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub budget: f64,

    /// Question for the narrator (explainer)
    #[arg(long)]
    pub query: Option<String>,

    /// Narrator persona (explainer)
    #[arg(long)]
    pub persona: Option<String>,

    /// Clean the dataset instead of explaining it (explainer)
    #[arg(long)]
    pub clean: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dataset commands
// ─────────────────────────────────────────────────────────────────────────────

/// Read a file, or stdin for "-"
fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
}

pub fn handle_validate(file: &str) -> Result<()> {
    let csv = read_input(file)?;
    match validator::inspect(&csv) {
        Ok(shape) => {
            println!(
                "✓ valid: {} columns, {} data rows",
                shape.columns(),
                shape.rows
            );
            println!("  headers: {}", shape.headers.join(", "));
            Ok(())
        }
        Err(e) => bail!("✗ {}", e),
    }
}

pub fn handle_commit(file: &str, store: &mut Store) -> Result<()> {
    let mut narrator = DataNarrator::with_input(read_input(file)?);
    narrator.commit(store).map_err(|e| anyhow::anyhow!("✗ {}", e))?;
    if let Some(message) = &narrator.success {
        println!("{}", message);
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// State command
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_state(
    show: bool,
    path: bool,
    clear: bool,
    patch: Option<String>,
    store: &mut Store,
) -> Result<()> {
    if path {
        println!("{}", store.storage_location());
    } else if clear {
        store
            .clear_persisted()
            .context("Failed to clear persisted state")?;
        println!("Cleared {}", store.storage_location());
    } else if let Some(json) = patch {
        let patch: StatePatch =
            serde_json::from_str(&json).context("Patch must be a JSON object of state fields")?;
        if patch.is_empty() {
            bail!("Patch contains no state fields");
        }
        // rawCsv stays empty or valid, same as `commit`
        if let Some(csv) = patch.raw_csv.as_deref().filter(|c| !c.trim().is_empty()) {
            validator::validate(csv).map_err(|e| anyhow::anyhow!("✗ rawCsv rejected: {}", e))?;
        }
        let slices = patch.slices();
        store.update(patch);
        if let Some(reason) = unsaved_reason(store) {
            eprintln!("Warning: update not persisted: {}", reason);
        }
        let names: Vec<_> = slices.iter().map(|s| s.field_name()).collect();
        println!("Updated {}", names.join(", "));
        let tabs: Vec<_> = router::tabs_touching(&slices)
            .iter()
            .map(|t| t.id())
            .collect();
        if !tabs.is_empty() {
            println!("Affects tabs: {}", tabs.join(", "));
        }
    } else if show {
        let json =
            serde_json::to_string_pretty(store.state()).context("Failed to serialize state")?;
        println!("{}", json);
    } else {
        println!("Usage: marketmind state [--show|--path|--clear|--patch <JSON>]");
    }
    Ok(())
}

fn unsaved_reason(store: &Store) -> Option<&str> {
    match store.persistence() {
        crate::store::PersistenceStatus::Unsaved { reason } => Some(reason),
        crate::store::PersistenceStatus::Saved => None,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Open command: route and run a tab's primary action
// ─────────────────────────────────────────────────────────────────────────────

fn print_header(view: &ViewDescriptor) {
    println!("== {} ({}) ==", view.label, view.tab.id());
}

pub async fn handle_open(
    tab_id: &str,
    args: OpenArgs,
    router: &mut Router,
    store: &mut Store,
    service: &dyn InsightService,
) -> Result<()> {
    let view = router.select(tab_id);

    // Reject a bad persona before anything is printed or committed
    let persona = match args.persona.as_deref() {
        Some(name) if view.tab == Tab::Explainer => explainer::persona(name).with_context(|| {
            format!(
                "Unknown persona {:?}; choose one of: {}",
                name,
                explainer::PERSONAS.join(", ")
            )
        })?,
        _ => explainer::DEFAULT_PERSONA,
    };

    print_header(&view);

    let status = match view.tab {
        Tab::Briefing | Tab::Hub | Tab::Vision => {
            print_overview(store);
            PanelStatus::Idle
        }
        Tab::Dashboard => {
            let kpis = Dashboard::kpis(store);
            for kpi in kpis {
                println!(
                    "  {:<20} {:>10}  {} {}",
                    kpi.title,
                    kpi.value,
                    trend_arrow(kpi.trend),
                    kpi.percentage
                );
            }
            println!("  {} of {} KPIs rising", Dashboard::rising(store), kpis.len());
            let mut dashboard = Dashboard::default();
            let pulse = dashboard.refresh_pulse(service).await;
            println!("\nMarket pulse: {}", pulse.text);
            dashboard.status
        }
        Tab::Products => {
            let mut lab = ProductLab::default();
            lab.analyze(store, service).await;
            if store.state().product_analysis.is_empty() {
                println!("No product analysis available.");
            }
            for p in &store.state().product_analysis {
                let rank = p.rank.map(|r| format!("#{}", r)).unwrap_or_default();
                let rec = p
                    .recommendation
                    .map(|r| format!("{:?}", r))
                    .unwrap_or_default();
                println!(
                    "  {:<4}{:<14} {:>10.0} -> {:>10.0}  {:<6} {}",
                    rank, p.name, p.revenue, p.forecast, p.growth, rec
                );
                if let Some(reasoning) = &p.reasoning {
                    println!("      {}", reasoning);
                }
            }
            if let Some(top) = ProductLab::top_pick(store) {
                println!("\nTop pick: {}", top.name);
            }
            lab.status
        }
        Tab::Forecast => {
            let summary = ForecastSummary::from_state(store.state());
            println!(
                "  {} actual points, {} projections",
                summary.actuals, summary.projections
            );
            if let Some((name, value)) = &summary.last_actual {
                println!("  Last actual: {} = {:.0}", name, value);
            }
            if let Some((name, value)) = &summary.peak_forecast {
                println!("  Peak forecast: {} = {:.0}", name, value);
            }
            if let Some(growth) = summary.projected_growth() {
                println!("  Projected growth: {:+.1}%", growth);
            }
            PanelStatus::Idle
        }
        Tab::Campaigns => {
            let mut factory = match args.goal {
                Some(goal) => CampaignFactory::with_goal(goal),
                None => CampaignFactory::default(),
            };
            factory.generate(store, service).await;
            println!("Goal: {}", factory.goal);
            if store.state().campaigns.is_empty() {
                println!("Campaign generation failed; no assets produced.");
            }
            for asset in &store.state().campaigns {
                println!("\n[{}] {}\n{}", asset.channel, asset.strategy, asset.copy);
            }
            factory.status
        }
        Tab::Segments => {
            let mut matrix = AudienceMatrix::default();
            matrix.segment(store, service).await;
            if store.state().segments.is_empty() {
                println!("Segmentation unavailable.");
            }
            for s in &store.state().segments {
                println!("  {:<22} {:<12} {:?}  {}", s.name, s.size, s.risk, s.strategy);
            }
            matrix.status
        }
        Tab::Simulator => {
            let mut engine = ScenarioEngine::default();
            engine.simulate(args.price, args.budget, store, service).await;
            match (&engine.result, &engine.error) {
                (Some(result), _) => println!("{}", result),
                (None, Some(error)) => println!("{}", error),
                (None, None) => {}
            }
            engine.status
        }
        Tab::Copilot => {
            let mut copilot = Copilot::default();
            let message = args.message.unwrap_or_default();
            if copilot.send(&message, store, service).await.is_none() {
                println!("(pass --message to ask a question)");
            }
            for entry in &copilot.history {
                println!("\n{}: {}", entry.role.as_str(), entry.content);
            }
            copilot.status
        }
        Tab::Explainer => {
            let mut narrator = DataNarrator::open(store);
            if args.clean {
                narrator.clean(store, service).await;
            } else {
                let query = args.query.as_deref().unwrap_or(explainer::DEFAULT_QUERY);
                narrator.explain(query, persona, store, service).await;
                if !narrator.explanation.is_empty() {
                    println!("{}", narrator.explanation);
                }
            }
            if let Some(success) = &narrator.success {
                println!("{}", success);
            }
            if let Some(error) = &narrator.error {
                println!("{}", error);
            }
            narrator.status
        }
        Tab::Risk => {
            let mut radar = RiskRadar::open(store);
            radar.scan(store, service).await;
            for alert in RiskRadar::ranked(store) {
                println!(
                    "  [{:?}] {} ({:?})\n      {}\n      -> {}",
                    alert.severity,
                    alert.title,
                    alert.category,
                    alert.description,
                    alert.recommendation
                );
            }
            radar.status
        }
        Tab::Market => {
            let mut intel = MarketIntel::default();
            let topic = args.topic.unwrap_or_default();
            match intel.search(&topic, service).await {
                Some(brief) => {
                    println!("{}", brief.text);
                    for source in &brief.sources {
                        println!("  - {} <{}>", source.title, source.uri);
                    }
                }
                None => println!("(pass --topic to research a market)"),
            }
            intel.status
        }
    };

    if let Some(reason) = status.fallback_reason() {
        eprintln!("Note: {} request failed, showing fallback ({})", view.tab.id(), reason);
    }
    if let Some(reason) = unsaved_reason(store) {
        eprintln!("Warning: changes not persisted: {}", reason);
    }
    println!(
        "\n◂ {}  |  {} ▸",
        view.tab.prev().id(),
        view.tab.next().id()
    );
    Ok(())
}

fn trend_arrow(trend: crate::state::Trend) -> &'static str {
    match trend {
        crate::state::Trend::Up => "▲",
        crate::state::Trend::Down => "▼",
        crate::state::Trend::Neutral => "■",
    }
}

/// Counts for the informational tabs
fn print_overview(store: &Store) {
    let state = store.state();
    println!("  KPIs:             {}", state.insights.len());
    println!("  Sales points:     {}", state.sales_data.len());
    match validator::inspect(&state.raw_csv) {
        Ok(shape) => println!(
            "  Dataset:          {} rows x {} columns",
            shape.rows,
            shape.columns()
        ),
        Err(e) => println!("  Dataset:          invalid ({})", e),
    }
    println!("  Risk alerts:      {}", state.risk_alerts.len());
    println!("  Campaign assets:  {}", state.campaigns.len());
    println!("  Segments:         {}", state.segments.len());
    println!("  Products ranked:  {}", state.product_analysis.len());
    println!("\nTabs:");
    for tab in Tab::all() {
        println!("  {:<10} {}", tab.id(), tab.label());
    }
    println!("\nDefault campaign goal: {}", campaigns::DEFAULT_GOAL);
}

// ─────────────────────────────────────────────────────────────────────────────
// Config command
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_config(show: bool, reset: bool, edit: bool, update: bool, path: bool) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show();
        Ok(())
    } else if reset {
        handle_config_reset()
    } else if edit {
        handle_config_edit()
    } else if update {
        handle_config_update()
    } else {
        // No flag provided, show help
        println!("Usage: marketmind config [--show|--reset|--edit|--update|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --update  Update config with new defaults (preserves user values)");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn config_path() -> Result<std::path::PathBuf> {
    Config::config_path().context("Could not determine config path")
}

fn handle_config_path() -> Result<()> {
    println!("{}", config_path()?.display());
    Ok(())
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    println!("state_dir = {:?}", config.state_dir.display().to_string());
    println!("state_key = {:?}", config.state_key);
    println!("start_tab = {:?}", config.start_tab);
    println!();
    println!("[insight]");
    println!("mode = {:?}", config.insight.mode.as_str());
    println!("latency_ms = {}", config.insight.latency_ms);
    println!("api_base = {:?}", config.insight.api_base);
    println!("model = {:?}", config.insight.model);
    println!("timeout_secs = {}", config.insight.timeout_secs);
    println!(
        "# api key: {}",
        if config.insight.has_api_key() {
            "set"
        } else {
            "not set"
        }
    );
    println!();
    println!("[logging]");
    println!("level = {:?}", config.logging.level);
    println!("file_enabled = {}", config.logging.file_enabled);
    println!(
        "file_dir = {:?}",
        config.logging.file_dir.display().to_string()
    );
    println!("file_rotation = {:?}", config.logging.file_rotation.as_str());
    println!("file_prefix = {:?}", config.logging.file_prefix);

    // Show source info
    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = config_path()?;

    // Confirm if file exists
    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }

    // Write the default config (using Config's single source of truth)
    std::fs::write(&path, Config::default().to_toml()).context("Error writing config")?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

fn handle_config_edit() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            // Platform-specific fallback
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    let status = Command::new(&editor).arg(&path).status().with_context(|| {
        format!(
            "Failed to launch editor '{}'; set $EDITOR to your preferred editor",
            editor
        )
    })?;

    if !status.success() {
        bail!("Editor exited with status: {}", status);
    }
    Ok(())
}

fn handle_config_update() -> Result<()> {
    let path = config_path()?;

    if !path.exists() {
        // No existing config, just create default
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return Ok(());
    }

    // Rebuild from the file alone so env overrides are not baked in
    let existing = Config::from_file_layer(&path)
        .map_err(|e| anyhow::anyhow!("Cannot update {}: {}", path.display(), e))?;
    let updated = existing.to_toml();

    let backup_path = path.with_extension("toml.bak");
    match std::fs::copy(&path, &backup_path) {
        Ok(_) => println!("Backup created: {}", backup_path.display()),
        Err(e) => eprintln!("Warning: Could not create backup: {}", e),
    }

    std::fs::write(&path, updated).context("Error writing config")?;

    println!("Config updated with latest structure: {}", path.display());
    println!("Your values have been preserved.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::MockInsightService;
    use crate::storage::MemoryStorage;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_persist_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["marketmind", "open", "risk", "--no-persist"]).unwrap();
        assert!(cli.no_persist);
        let cli = Cli::try_parse_from(["marketmind", "state", "--show"]).unwrap();
        assert!(!cli.no_persist);
    }

    #[test]
    fn test_parse_open_with_negative_delta() {
        let cli = Cli::try_parse_from([
            "marketmind",
            "open",
            "simulator",
            "--price",
            "-5",
            "--budget",
            "12.5",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Open { tab, args }) => {
                assert_eq!(tab, "simulator");
                assert_eq!(args.price, -5.0);
                assert_eq!(args.budget, 12.5);
            }
            _ => panic!("expected open"),
        }
    }

    #[test]
    fn test_state_patch_merges() {
        let mut store = Store::open(MemoryStorage::new());
        handle_state(
            false,
            false,
            false,
            Some(r#"{"rawCsv": "a,b\n1,2"}"#.to_string()),
            &mut store,
        )
        .unwrap();
        assert_eq!(store.state().raw_csv, "a,b\n1,2");
        assert_eq!(store.state().insights.len(), 4);
    }

    #[test]
    fn test_state_patch_rejects_unknown_or_empty() {
        let mut store = Store::open(MemoryStorage::new());
        assert!(handle_state(false, false, false, Some("{}".into()), &mut store).is_err());
        assert!(
            handle_state(false, false, false, Some(r#"{"bogus": 1}"#.into()), &mut store)
                .is_err()
        );
    }

    #[test]
    fn test_state_patch_rejects_invalid_raw_csv() {
        let storage = MemoryStorage::new();
        let mut store = Store::open(storage.clone());
        let before = store.snapshot();

        let err = handle_state(
            false,
            false,
            false,
            Some(r#"{"rawCsv": "a,b,c\n1", "segments": []}"#.to_string()),
            &mut store,
        )
        .unwrap_err();

        assert!(err.to_string().contains("line 2"));
        assert_eq!(*store.snapshot(), *before);
        assert_eq!(storage.writes(), 0);
    }

    #[test]
    fn test_state_patch_allows_clearing_raw_csv() {
        let mut store = Store::open(MemoryStorage::new());
        handle_state(
            false,
            false,
            false,
            Some(r#"{"rawCsv": ""}"#.to_string()),
            &mut store,
        )
        .unwrap();
        assert!(store.state().raw_csv.is_empty());
    }

    #[test]
    fn test_commit_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.csv");
        std::fs::write(&file, "a,b\n1").unwrap();

        let mut store = Store::open(MemoryStorage::new());
        let before = store.state().raw_csv.clone();
        let err = handle_commit(file.to_str().unwrap(), &mut store).unwrap_err();

        assert!(err.to_string().contains("line 2"));
        assert_eq!(store.state().raw_csv, before);
    }

    #[tokio::test]
    async fn test_open_unknown_tab_lands_on_dashboard() {
        let mut store = Store::open(MemoryStorage::new());
        let mut router = Router::default();
        handle_open(
            "nowhere",
            OpenArgs::default(),
            &mut router,
            &mut store,
            &MockInsightService::instant(),
        )
        .await
        .unwrap();
        assert_eq!(router.active().tab, Tab::Dashboard);
    }

    #[tokio::test]
    async fn test_open_explainer_rejects_unknown_persona() {
        let storage = MemoryStorage::new();
        let mut store = Store::open(storage.clone());
        let mut router = Router::default();
        let args = OpenArgs {
            persona: Some("Pirate".to_string()),
            ..OpenArgs::default()
        };

        let err = handle_open(
            "explainer",
            args,
            &mut router,
            &mut store,
            &MockInsightService::instant(),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Skeptical Auditor"));
        assert_eq!(storage.writes(), 0);
    }

    #[tokio::test]
    async fn test_open_explainer_accepts_persona_any_case() {
        let mut store = Store::open(MemoryStorage::new());
        let mut router = Router::default();
        let args = OpenArgs {
            persona: Some("growth visionary".to_string()),
            ..OpenArgs::default()
        };

        handle_open(
            "explainer",
            args,
            &mut router,
            &mut store,
            &MockInsightService::instant(),
        )
        .await
        .unwrap();
        assert_eq!(router.active().tab, Tab::Explainer);
    }

    #[tokio::test]
    async fn test_open_risk_populates_alerts() {
        let mut store = Store::open(MemoryStorage::new());
        let mut router = Router::default();
        handle_open(
            "risk",
            OpenArgs::default(),
            &mut router,
            &mut store,
            &MockInsightService::instant(),
        )
        .await
        .unwrap();
        assert_eq!(store.state().risk_alerts.len(), 2);
    }
}
