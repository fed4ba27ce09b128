// View router
//
// Maps tab identifiers to the panel that owns them and records which slices
// of AppState each panel reads and writes. The router itself only remembers
// the active tab; all state exists regardless of which tab is showing.

use crate::state::Slice;

/// Every tab the workspace can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    Briefing,
    Hub,
    #[default]
    Dashboard,
    Products,
    Forecast,
    Campaigns,
    Segments,
    Simulator,
    Copilot,
    Explainer,
    Vision,
    Risk,
    Market,
}

/// Sidebar order, used for the prev/next hint
const NAV_ORDER: [Tab; 13] = [
    Tab::Briefing,
    Tab::Hub,
    Tab::Dashboard,
    Tab::Products,
    Tab::Forecast,
    Tab::Campaigns,
    Tab::Segments,
    Tab::Market,
    Tab::Vision,
    Tab::Simulator,
    Tab::Copilot,
    Tab::Explainer,
    Tab::Risk,
];

impl Tab {
    pub fn all() -> &'static [Tab] {
        &NAV_ORDER
    }

    /// Identifier used on the command line and in config
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Briefing => "briefing",
            Tab::Hub => "hub",
            Tab::Dashboard => "dashboard",
            Tab::Products => "products",
            Tab::Forecast => "forecast",
            Tab::Campaigns => "campaigns",
            Tab::Segments => "segments",
            Tab::Simulator => "simulator",
            Tab::Copilot => "synexia",
            Tab::Explainer => "explainer",
            Tab::Vision => "vision",
            Tab::Risk => "risk",
            Tab::Market => "market",
        }
    }

    /// Exact lookup; `None` for unknown ids
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        NAV_ORDER.iter().copied().find(|tab| tab.id() == id)
    }

    /// Get display name for headers
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Briefing => "System Briefing",
            Tab::Hub => "Features Hub",
            Tab::Dashboard => "Intelligence",
            Tab::Products => "Product Lab",
            Tab::Forecast => "Growth Forecast",
            Tab::Campaigns => "Campaign Factory",
            Tab::Segments => "Audience Matrix",
            Tab::Simulator => "Scenario Engine",
            Tab::Copilot => "Decision Hub",
            Tab::Explainer => "Data Narrator",
            Tab::Vision => "Strategy Vision",
            Tab::Risk => "Risk Radar",
            Tab::Market => "Market Intel",
        }
    }

    fn position(self) -> usize {
        NAV_ORDER.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        NAV_ORDER[(self.position() + 1) % NAV_ORDER.len()]
    }

    pub fn prev(self) -> Self {
        NAV_ORDER[(self.position() + NAV_ORDER.len() - 1) % NAV_ORDER.len()]
    }
}

/// What a tab shows and which parts of the state it touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDescriptor {
    pub tab: Tab,
    pub label: &'static str,
    pub reads: &'static [Slice],
    pub writes: &'static [Slice],
}

impl ViewDescriptor {
    pub fn for_tab(tab: Tab) -> Self {
        use Slice::*;

        let (reads, writes): (&'static [Slice], &'static [Slice]) = match tab {
            Tab::Briefing | Tab::Hub | Tab::Vision | Tab::Market => (&[], &[]),
            Tab::Dashboard => (&[Insights, SalesData], &[]),
            Tab::Products => (&[RawCsv, ProductAnalysis], &[ProductAnalysis]),
            Tab::Forecast => (&[SalesData], &[]),
            Tab::Campaigns => (&[RawCsv, Campaigns], &[Campaigns]),
            Tab::Segments => (&[RawCsv, Segments], &[Segments]),
            Tab::Simulator | Tab::Copilot => (&[RawCsv], &[]),
            Tab::Explainer => (&[RawCsv], &[RawCsv]),
            Tab::Risk => (&[RawCsv, RiskAlerts], &[RiskAlerts]),
        };

        Self {
            tab,
            label: tab.label(),
            reads,
            writes,
        }
    }

    /// Whether the view depends on `slice`
    pub fn is_live(&self, slice: Slice) -> bool {
        self.reads.contains(&slice) || self.writes.contains(&slice)
    }
}

/// Tabs whose view reads or writes any of `slices`, in sidebar order
pub fn tabs_touching(slices: &[Slice]) -> Vec<Tab> {
    Tab::all()
        .iter()
        .copied()
        .filter(|tab| {
            let view = ViewDescriptor::for_tab(*tab);
            slices.iter().any(|slice| view.is_live(*slice))
        })
        .collect()
}

/// Resolve a tab id; unknown ids land on the dashboard
pub fn select(tab_id: &str) -> ViewDescriptor {
    let tab = Tab::from_id(tab_id).unwrap_or_else(|| {
        tracing::debug!("Unknown tab {:?}, falling back to dashboard", tab_id);
        Tab::default()
    });
    ViewDescriptor::for_tab(tab)
}

/// Holds the currently selected tab
#[derive(Debug, Clone, Default)]
pub struct Router {
    active: Tab,
}

impl Router {
    pub fn new(start: Tab) -> Self {
        Self { active: start }
    }

    pub fn active(&self) -> ViewDescriptor {
        ViewDescriptor::for_tab(self.active)
    }

    /// Switch to `tab_id` and return its descriptor
    pub fn select(&mut self, tab_id: &str) -> ViewDescriptor {
        let view = select(tab_id);
        self.active = view.tab;
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_round_trips() {
        for tab in Tab::all() {
            assert_eq!(select(tab.id()).tab, *tab);
        }
        assert_eq!(Tab::all().len(), 13);
    }

    #[test]
    fn test_unknown_id_falls_back_to_dashboard() {
        assert_eq!(select("nope").tab, Tab::Dashboard);
        assert_eq!(select("").tab, Tab::Dashboard);
        assert_eq!(select("RISK").tab, Tab::Dashboard);
    }

    #[test]
    fn test_copilot_id_is_synexia() {
        let view = select("synexia");
        assert_eq!(view.tab, Tab::Copilot);
        assert_eq!(view.label, "Decision Hub");
    }

    #[test]
    fn test_descriptor_slices() {
        let risk = select("risk");
        assert!(risk.is_live(Slice::RiskAlerts));
        assert!(risk.writes.contains(&Slice::RiskAlerts));
        assert!(!risk.is_live(Slice::Campaigns));

        let hub = select("hub");
        assert!(hub.reads.is_empty() && hub.writes.is_empty());
    }

    #[test]
    fn test_tab_neighbours_wrap() {
        assert_eq!(Tab::Risk.next(), Tab::Briefing);
        assert_eq!(Tab::Briefing.prev(), Tab::Risk);
        for tab in Tab::all() {
            assert_eq!(tab.next().prev(), *tab);
        }
    }

    #[test]
    fn test_tabs_touching_slice() {
        let tabs: Vec<_> = tabs_touching(&[Slice::Campaigns])
            .iter()
            .map(|t| t.id())
            .collect();
        assert_eq!(tabs, vec!["campaigns"]);
        assert!(tabs_touching(&[]).is_empty());
    }

    #[test]
    fn test_router_remembers_selection() {
        let mut router = Router::new(Tab::Risk);
        assert_eq!(router.active().tab, Tab::Risk);

        router.select("campaigns");
        assert_eq!(router.active().tab, Tab::Campaigns);
        router.select("unknown");
        assert_eq!(router.active().tab, Tab::Dashboard);
    }
}
