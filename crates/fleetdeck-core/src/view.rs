// ── Fleet view projection ──
//
// Pure function from the machine snapshot to what the rendering surface
// draws: one card per machine plus the aggregate counters. No side
// effects, no rendering — the TUI and CLI both consume this, and the
// classification rules are pinned by tests here rather than in either
// front-end.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{ConnectMethod, MacAddress, Machine, MachineKind};

/// Placeholder for an absent host address.
pub const UNKNOWN_ADDRESS: &str = "-";

/// Aggregate counters across the fleet.
///
/// `running + stopped == total` by construction — the classification is
/// binary, and "starting"/"error" states count as stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FleetSummary {
    pub total: usize,
    pub running: usize,
    pub stopped: usize,
}

/// An action control on a machine card, in row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardAction {
    Connect,
    Wake,
    PowerOff,
    Reboot,
    Delete,
}

/// Everything a rendering surface needs to draw one machine card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineCard {
    pub identity: MacAddress,
    pub name: String,
    /// Binary status indicator.
    pub running: bool,
    /// Host address, with [`UNKNOWN_ADDRESS`] standing in for absent.
    pub address: String,
    pub login_user: String,
    pub method: String,
    /// Raw status text as reported by the backend.
    pub status: String,
    pub kind: MachineKind,
    /// Action row. Wake appears only for physical machines; power-off,
    /// reboot, delete, and connect are always present regardless of the
    /// machine's current state.
    pub actions: Vec<CardAction>,
}

/// The full projected view: cards in backend order plus counters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FleetView {
    pub cards: Vec<MachineCard>,
    pub summary: FleetSummary,
}

/// Project the current machine snapshot into the view model.
pub fn project_fleet(machines: &[Arc<Machine>]) -> FleetView {
    let mut summary = FleetSummary {
        total: machines.len(),
        ..FleetSummary::default()
    };

    let cards = machines
        .iter()
        .map(|machine| {
            let running = machine.is_running();
            if running {
                summary.running += 1;
            } else {
                summary.stopped += 1;
            }
            project_card(machine, running)
        })
        .collect();

    FleetView { cards, summary }
}

fn project_card(machine: &Machine, running: bool) -> MachineCard {
    let mut actions = vec![CardAction::Connect];
    if machine.supports_wake() {
        actions.push(CardAction::Wake);
    }
    actions.extend([CardAction::PowerOff, CardAction::Reboot, CardAction::Delete]);

    MachineCard {
        identity: machine.identity.clone(),
        name: machine.display_name.clone(),
        running,
        address: machine
            .host_address
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_owned()),
        login_user: machine.login_user.clone(),
        method: machine.connect_method.to_string(),
        status: machine.status.clone(),
        kind: machine.kind,
        actions,
    }
}

impl MachineCard {
    pub fn has_action(&self, action: CardAction) -> bool {
        self.actions.contains(&action)
    }
}
