// Startup module - displays banner and module loading status
//
// Shows version info, where the config and snapshot live, and which
// backends came up.

use crate::config::{Config, VERSION};
use crate::store::{Origin, Store};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
}

/// Module loading result for display
pub struct ModuleStatus {
    pub name: &'static str,
    pub enabled: bool,
    pub description: String,
}

/// What the banner reports about the running session
pub struct StartupReport<'a> {
    pub config: &'a Config,
    pub store: &'a Store,
    /// Insight backend name ("mock" or "live")
    pub insight: &'static str,
}

/// Print the startup banner and module loading status
pub fn print_startup(report: &StartupReport<'_>) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}MarketMind{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Marketing intelligence workspace{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Loading modules...{RESET}");
    for module in &get_module_status(report) {
        print_module_status(module);
    }
    println!();

    if report.store.persistence().is_unsaved() {
        println!("  {YELLOW}▸{RESET} {YELLOW}Snapshot not persisted{RESET} {DIM}(see log){RESET}");
    }
}

/// Get status of all modules for this session
fn get_module_status(report: &StartupReport<'_>) -> Vec<ModuleStatus> {
    let origin = match report.store.origin() {
        Origin::Restored => "restored snapshot",
        Origin::Default => "built-in defaults",
    };

    let insight_detail = if report.insight == "live" {
        format!("live ({})", report.config.insight.model)
    } else {
        format!("mock ({}ms latency)", report.config.insight.latency_ms)
    };

    vec![
        ModuleStatus {
            name: "store",
            enabled: true, // Core, always on
            description: origin.to_string(),
        },
        ModuleStatus {
            name: "persistence",
            enabled: !report.store.persistence().is_unsaved(),
            description: report.store.storage_location(),
        },
        ModuleStatus {
            name: "insight",
            enabled: true,
            description: insight_detail,
        },
        ModuleStatus {
            name: "file-log",
            enabled: report.config.logging.file_enabled,
            description: report.config.logging.file_dir.display().to_string(),
        },
    ]
}

/// Print a single module's status
fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<12}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}

/// Mirror the banner into the log
pub fn log_startup(report: &StartupReport<'_>) {
    tracing::info!("MarketMind v{}", VERSION);
    for module in &get_module_status(report) {
        let icon = if module.enabled { "✓" } else { "○" };
        tracing::info!("  {} {} - {}", icon, module.name, module.description);
    }
}
