//! Fleet screen — the machine card grid.
//!
//! Holds the latest machine snapshot, projects it into cards through the
//! pure view function, and maps selection/intent keys into dispatch
//! actions. The grid is fully re-rendered from the current snapshot each
//! frame; with a handful of machines and a multi-second poll that is
//! exactly as cheap as it needs to be.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use fleetdeck_core::{CardAction, FleetView, Machine, MachineCard, PowerOp, project_fleet};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

const CARD_WIDTH: u16 = 40;
const CARD_HEIGHT: u16 = 9;

pub struct FleetScreen {
    machines: Arc<Vec<Arc<Machine>>>,
    view: FleetView,
    selected: usize,
    /// Grid columns, derived from the last known terminal width.
    columns: usize,
}

impl FleetScreen {
    pub fn new() -> Self {
        Self {
            machines: Arc::new(Vec::new()),
            view: FleetView::default(),
            selected: 0,
            columns: 2,
        }
    }

    /// The machine under the cursor, if any.
    pub fn selected_machine(&self) -> Option<&Arc<Machine>> {
        self.machines.get(self.selected)
    }

    /// Aggregate counters for the header.
    pub fn summary(&self) -> fleetdeck_core::FleetSummary {
        self.view.summary
    }

    fn clamp_selection(&mut self) {
        if self.view.cards.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.view.cards.len() {
            self.selected = self.view.cards.len() - 1;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.view.cards.is_empty() {
            return;
        }
        let len = self.view.cards.len() as isize;
        let next = (self.selected as isize + delta).clamp(0, len - 1);
        self.selected = usize::try_from(next).unwrap_or(0);
    }

    /// Map an intent key to a dispatch action for the selected machine.
    fn intent(&self, key: KeyCode) -> Option<Action> {
        let machine = self.selected_machine()?;
        let identity = machine.identity.clone();

        match key {
            KeyCode::Char('c') => Some(Action::RequestConnect { identity }),
            KeyCode::Char('w') => {
                // The wake control only exists on physical cards.
                if machine.supports_wake() {
                    Some(Action::RequestPower {
                        identity,
                        operation: PowerOp::Wake,
                    })
                } else {
                    None
                }
            }
            KeyCode::Char('p') => Some(Action::RequestPower {
                identity,
                operation: PowerOp::Off,
            }),
            KeyCode::Char('r') => Some(Action::RequestPower {
                identity,
                operation: PowerOp::Reboot,
            }),
            KeyCode::Char('d') => Some(Action::RequestDelete { identity }),
            _ => None,
        }
    }

    fn render_card(&self, frame: &mut Frame, area: Rect, card: &MachineCard, selected: bool) {
        let border = if selected {
            theme::border_focused()
        } else {
            theme::border_default()
        };

        let (dot, dot_style) = if card.running {
            ("●", theme::status_running())
        } else {
            ("●", theme::status_stopped())
        };

        let title = Line::from(vec![
            Span::styled(format!(" {} ", card.name), theme::title_style()),
            Span::styled(dot, dot_style),
            Span::raw(" "),
        ]);

        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let field = |label: &str, value: &str| {
            Line::from(vec![
                Span::styled(format!(" {label:<7}"), theme::field_label()),
                Span::styled(value.to_owned(), theme::field_value()),
            ])
        };

        let mut lines = vec![
            field("Address", &card.address),
            field("MAC", card.identity.as_str()),
            field("User", &card.login_user),
            field("Method", &card.method),
            field("Status", &card.status),
        ];

        // Action row: every card gets connect/off/reboot/delete, wake is
        // kind-gated by the projection.
        let mut hints: Vec<Span> = vec![Span::raw(" ")];
        for action in &card.actions {
            let (key, label) = match action {
                CardAction::Connect => ("c", "onnect "),
                CardAction::Wake => ("w", "ake "),
                CardAction::PowerOff => ("p", "ower-off "),
                CardAction::Reboot => ("r", "eboot "),
                CardAction::Delete => ("d", "elete "),
            };
            hints.push(Span::styled(key, theme::key_hint_key()));
            hints.push(Span::styled(label, theme::key_hint()));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(hints));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for FleetScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Right | KeyCode::Char('l') => Some(Action::SelectNext),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::SelectPrev),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::SelectDown),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::SelectUp),
            code => self.intent(code),
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::MachinesUpdated(snapshot) => {
                self.machines = Arc::clone(snapshot);
                self.view = project_fleet(&self.machines);
                self.clamp_selection();
            }
            Action::Resize(width, _) => {
                self.columns = usize::from(*width / CARD_WIDTH).max(1);
            }
            Action::SelectNext => self.move_selection(1),
            Action::SelectPrev => self.move_selection(-1),
            Action::SelectDown => self.move_selection(self.columns as isize),
            Action::SelectUp => self.move_selection(-(self.columns as isize)),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        if self.view.cards.is_empty() {
            frame.render_widget(
                Paragraph::new("  No machines yet — press a to add one")
                    .style(theme::field_label()),
                area,
            );
            return;
        }

        let columns = usize::from(area.width / CARD_WIDTH).max(1);
        for (index, card) in self.view.cards.iter().enumerate() {
            let col = index % columns;
            let row = index / columns;

            let x = area.x + u16::try_from(col).unwrap_or(0) * CARD_WIDTH;
            let y = area.y + u16::try_from(row).unwrap_or(0) * CARD_HEIGHT;
            if y + CARD_HEIGHT > area.y + area.height {
                break; // grid overflow: later cards wait for a taller window
            }

            let card_area = Rect::new(x, y, CARD_WIDTH.min(area.width), CARD_HEIGHT);
            self.render_card(frame, card_area, card, index == self.selected);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use fleetdeck_core::{ConnectMethod, MacAddress, MachineKind, RUNNING_STATUS};

    fn machine(name: &str, mac: &str, kind: MachineKind) -> Arc<Machine> {
        Arc::new(Machine {
            identity: MacAddress::new(mac),
            display_name: name.into(),
            host_address: Some("10.0.0.5".into()),
            login_user: "admin".into(),
            connect_method: ConnectMethod::Ssh,
            status: RUNNING_STATUS.into(),
            kind,
            last_updated: None,
        })
    }

    fn screen_with(machines: Vec<Arc<Machine>>) -> FleetScreen {
        let mut screen = FleetScreen::new();
        screen
            .update(&Action::MachinesUpdated(Arc::new(machines)))
            .unwrap();
        screen
    }

    #[test]
    fn selection_clamps_when_list_shrinks() {
        let mut screen = screen_with(vec![
            machine("a", "00:00:00:00:00:01", MachineKind::Virtual),
            machine("b", "00:00:00:00:00:02", MachineKind::Virtual),
            machine("c", "00:00:00:00:00:03", MachineKind::Virtual),
        ]);
        screen.update(&Action::SelectNext).unwrap();
        screen.update(&Action::SelectNext).unwrap();
        assert_eq!(screen.selected_machine().unwrap().display_name, "c");

        // The poll replaces the list with fewer machines.
        screen
            .update(&Action::MachinesUpdated(Arc::new(vec![machine(
                "a",
                "00:00:00:00:00:01",
                MachineKind::Virtual,
            )])))
            .unwrap();
        assert_eq!(screen.selected_machine().unwrap().display_name, "a");
    }

    #[test]
    fn wake_intent_only_for_physical_machines() {
        let mut screen = screen_with(vec![machine(
            "virt",
            "00:00:00:00:00:01",
            MachineKind::Virtual,
        )]);
        assert!(screen.intent(KeyCode::Char('w')).is_none());

        screen = screen_with(vec![machine(
            "phys",
            "00:00:00:00:00:02",
            MachineKind::Physical,
        )]);
        assert!(matches!(
            screen.intent(KeyCode::Char('w')),
            Some(Action::RequestPower {
                operation: PowerOp::Wake,
                ..
            })
        ));
    }

    #[test]
    fn power_intents_ignore_machine_state() {
        // A running machine still offers power-off; a stopped one reboot.
        let screen = screen_with(vec![machine(
            "virt",
            "00:00:00:00:00:01",
            MachineKind::Virtual,
        )]);
        assert!(matches!(
            screen.intent(KeyCode::Char('p')),
            Some(Action::RequestPower {
                operation: PowerOp::Off,
                ..
            })
        ));
        assert!(matches!(
            screen.intent(KeyCode::Char('r')),
            Some(Action::RequestPower {
                operation: PowerOp::Reboot,
                ..
            })
        ));
        assert!(matches!(
            screen.intent(KeyCode::Char('d')),
            Some(Action::RequestDelete { .. })
        ));
    }

    #[test]
    fn intents_require_a_selection() {
        let screen = FleetScreen::new();
        assert!(screen.intent(KeyCode::Char('p')).is_none());
        assert!(screen.intent(KeyCode::Char('c')).is_none());
    }
}
