//! Application core — event loop, modal gate, action dispatch.
//!
//! The modal gate lives here: while the password prompt, the add-machine
//! form, or the delete confirmation is open, it captures all key input.
//! Closing any surface clears its transient input state so nothing leaks
//! into a later open.

use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};
use secrecy::SecretString;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use fleetdeck_core::{
    AddMachineRequest, Controller, MacAddress, PowerOp, PowerProgress, connect_target,
};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::fleet::FleetScreen;
use crate::theme;
use crate::tui::Tui;
use crate::widgets::modal;

/// Connection status as seen by the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// The open password prompt. Survives failed attempts unchanged — the
/// pending action it belongs to is identified by `token`.
struct PasswordPrompt {
    token: u64,
    /// "name (address)" of the challenge target, for the prompt message.
    label: String,
    input: Input,
}

/// The open add-machine form. Field order matches the card layout.
struct AddForm {
    name: Input,
    mac: Input,
    host: Input,
    user: Input,
    method: Input,
    physical: bool,
    /// 0..=4 are the text fields above, 5 is the kind toggle.
    focus: usize,
}

impl AddForm {
    fn new() -> Self {
        Self {
            name: Input::default(),
            mac: Input::default(),
            host: Input::default(),
            user: Input::default(),
            method: Input::from("SSH".to_owned()),
            physical: false,
            focus: 0,
        }
    }

    fn focused_input(&mut self) -> Option<&mut Input> {
        match self.focus {
            0 => Some(&mut self.name),
            1 => Some(&mut self.mac),
            2 => Some(&mut self.host),
            3 => Some(&mut self.user),
            4 => Some(&mut self.method),
            _ => None,
        }
    }

    fn to_request(&self) -> AddMachineRequest {
        AddMachineRequest {
            vm_name: self.name.value().to_owned(),
            host_ip: self.host.value().to_owned(),
            mac: self.mac.value().to_owned(),
            method: self.method.value().to_owned(),
            user: self.user.value().to_owned(),
            kind: if self.physical { "physical" } else { "virtual" }.to_owned(),
        }
    }
}

/// Top-level application state and event loop.
pub struct App {
    /// The single fleet screen (card grid).
    fleet: FleetScreen,
    /// Whether the app should keep running.
    running: bool,
    connection_status: ConnectionStatus,
    /// Header clock, recomputed on every tick.
    clock: String,
    /// Action sender — components and spawned tasks dispatch through this.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver — main loop drains this.
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Modal gate surfaces. Each is an independent open/closed toggle.
    password_prompt: Option<PasswordPrompt>,
    add_form: Option<AddForm>,
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            fleet: FleetScreen::new(),
            running: true,
            connection_status: ConnectionStatus::default(),
            clock: String::new(),
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            password_prompt: None,
            add_form: None,
            pending_confirm: None,
            notification: None,
        }
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.fleet.init(self.action_tx.clone())?;
        if let Ok((w, h)) = tui.size() {
            let _ = self.fleet.update(&Action::Resize(w, h));
        }

        // Spawn the data bridge: controller lifecycle + stream forwarding.
        {
            let controller = self.controller.clone();
            let cancel = self.data_cancel.clone();
            let tx = self.action_tx.clone();
            tokio::spawn(async move {
                crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
            });
        }

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick — clock + toast expiry
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            // Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Key routing (modal gate first) ───────────────────────────

    /// Map a key event to an action. Open modal surfaces capture all
    /// input; otherwise global keys run first and the rest goes to the
    /// fleet screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Ctrl+C always quits, even with a modal open.
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Password prompt captures everything.
        if let Some(prompt) = self.password_prompt.as_mut() {
            return Ok(match key.code {
                KeyCode::Enter => Some(Action::SubmitPassword),
                KeyCode::Esc => Some(Action::CancelPassword),
                _ => {
                    prompt
                        .input
                        .handle_event(&crossterm::event::Event::Key(key));
                    None
                }
            });
        }

        // Add form captures everything.
        if let Some(form) = self.add_form.as_mut() {
            return Ok(match key.code {
                KeyCode::Enter => Some(Action::SubmitAdd),
                KeyCode::Esc => Some(Action::CloseAddModal),
                KeyCode::Tab | KeyCode::Down => {
                    form.focus = (form.focus + 1) % 6;
                    None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    form.focus = (form.focus + 5) % 6;
                    None
                }
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right if form.focus == 5 => {
                    form.physical = !form.physical;
                    None
                }
                _ => {
                    if let Some(input) = form.focused_input() {
                        input.handle_event(&crossterm::event::Event::Key(key));
                    }
                    None
                }
            });
        }

        // Confirmation dialog captures all input.
        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') => return Ok(Some(Action::Quit)),
            KeyCode::Char('a') => return Ok(Some(Action::OpenAddModal)),
            _ => {}
        }

        // Delegate to the fleet screen
        self.fleet.handle_key_event(key)
    }

    // ── Action processing ────────────────────────────────────────

    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Render => {}

            Action::Tick => {
                self.clock = chrono::Local::now().format("%H:%M:%S").to_string();
                // Auto-dismiss notifications after 4 seconds
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > Duration::from_secs(4) {
                        self.notification = None;
                    }
                }
            }

            Action::Connecting => self.connection_status = ConnectionStatus::Connecting,
            Action::Connected => self.connection_status = ConnectionStatus::Connected,
            Action::Disconnected(_) => self.connection_status = ConnectionStatus::Disconnected,

            // Data and layout updates go to the fleet screen.
            Action::MachinesUpdated(_)
            | Action::Resize(..)
            | Action::SelectNext
            | Action::SelectPrev
            | Action::SelectUp
            | Action::SelectDown => {
                if let Some(follow_up) = self.fleet.update(action)? {
                    self.action_tx.send(follow_up)?;
                }
            }

            // ── Power dispatch ────────────────────────────────────

            Action::RequestPower {
                identity,
                operation,
            } => {
                self.dispatch_begin_power(identity.clone(), *operation);
            }

            Action::PowerProgressed(progress) => self.on_power_progress(progress),

            Action::PowerFailed(message) => {
                // Terminal failure: the pending action is already cleared
                // in core; drop the prompt if one was open.
                self.password_prompt = None;
                self.notification = Some((Notification::error(message.clone()), Instant::now()));
            }

            Action::SubmitPassword => {
                if let Some(prompt) = &self.password_prompt {
                    let password = SecretString::from(prompt.input.value().to_owned());
                    self.dispatch_resume_power(prompt.token, password);
                }
            }

            Action::CancelPassword => {
                // Clear the stored password and the pending action; no
                // backend call is made.
                if let Some(prompt) = self.password_prompt.take() {
                    self.controller.cancel_power(prompt.token);
                }
            }

            // ── Delete (confirmation-gated) ───────────────────────

            Action::RequestDelete { identity } => {
                let name = self
                    .controller
                    .store()
                    .get(identity)
                    .map_or_else(|| identity.to_string(), |m| m.display_name.clone());
                self.action_tx
                    .send(Action::ShowConfirm(ConfirmAction::DeleteMachine {
                        identity: identity.clone(),
                        name,
                    }))?;
            }

            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(ConfirmAction::DeleteMachine { identity, .. }) =
                    self.pending_confirm.take()
                {
                    // Failures are logged in core, never surfaced here.
                    let controller = self.controller.clone();
                    tokio::spawn(async move {
                        controller.delete_machine(&identity).await;
                    });
                }
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
            }

            // ── Connect (no network call) ─────────────────────────

            Action::RequestConnect { identity } => {
                let notification = self.resolve_connect(identity);
                self.notification = Some((notification, Instant::now()));
            }

            // ── Add-machine modal ─────────────────────────────────

            Action::OpenAddModal => {
                self.add_form = Some(AddForm::new());
            }

            Action::CloseAddModal => {
                // Dropping the form resets every field.
                self.add_form = None;
            }

            Action::SubmitAdd => {
                if let Some(form) = &self.add_form {
                    self.dispatch_add(form.to_request());
                }
            }

            Action::AddSucceeded => {
                // Close and reset; the triggered refresh brings the new
                // machine into the grid.
                self.add_form = None;
            }

            Action::AddFailed(message) => {
                // Form stays open for another attempt.
                self.notification = Some((Notification::error(message.clone()), Instant::now()));
            }

            // ── Notifications ─────────────────────────────────────

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            Action::DismissNotification => {
                self.notification = None;
            }
        }

        Ok(())
    }

    // ── Dispatch helpers (spawned tasks report back via actions) ──

    fn dispatch_begin_power(&self, identity: MacAddress, operation: PowerOp) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match controller.begin_power(identity, operation).await {
                Ok(progress) => {
                    let _ = tx.send(Action::PowerProgressed(progress));
                }
                Err(e) => {
                    let _ = tx.send(Action::PowerFailed(e.to_string()));
                }
            }
        });
    }

    fn dispatch_resume_power(&self, token: u64, password: SecretString) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match controller.resume_power(token, password).await {
                Ok(progress) => {
                    let _ = tx.send(Action::PowerProgressed(progress));
                }
                Err(e) => {
                    let _ = tx.send(Action::PowerFailed(e.to_string()));
                }
            }
        });
    }

    fn dispatch_add(&self, request: AddMachineRequest) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match controller.add_machine(request).await {
                Ok(()) => {
                    let _ = tx.send(Action::AddSucceeded);
                }
                Err(e) => {
                    let _ = tx.send(Action::AddFailed(e.to_string()));
                }
            }
        });
    }

    /// One step of the two-phase protocol resolved.
    fn on_power_progress(&mut self, progress: &PowerProgress) {
        match progress {
            PowerProgress::Completed { message } => {
                self.password_prompt = None;
                self.notification = Some((Notification::success(message.clone()), Instant::now()));
            }

            PowerProgress::Challenge { token, machine } => {
                let label = machine.as_ref().map_or_else(
                    || "this machine".to_owned(),
                    |m| {
                        format!(
                            "{} ({})",
                            m.display_name,
                            m.host_address.as_deref().unwrap_or("-")
                        )
                    },
                );

                // Re-challenge after a wrong password: keep the prompt
                // (and its typed text) open, no separate error message.
                let same_action = self
                    .password_prompt
                    .as_ref()
                    .is_some_and(|p| p.token == *token);
                if same_action {
                    if let Some(prompt) = self.password_prompt.as_mut() {
                        prompt.label = label;
                    }
                } else {
                    self.password_prompt = Some(PasswordPrompt {
                        token: *token,
                        label,
                        input: Input::default(),
                    });
                }
            }

            PowerProgress::Superseded => {
                debug!("dropping superseded power resolution");
            }
        }
    }

    /// Resolve the Connect action locally and describe the result.
    fn resolve_connect(&self, identity: &MacAddress) -> Notification {
        let Some(machine) = self.controller.store().get(identity) else {
            return Notification::warning("Machine vanished from the inventory");
        };

        match connect_target(&machine, self.controller.client()) {
            Ok(target) => Notification::info(format!("Open: {}", target.as_str())),
            Err(e) => Notification::warning(e.to_string()),
        }
    }

    // ── Rendering ────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Card grid
            Constraint::Length(1), // Key hints
        ])
        .split(area);

        self.render_header(frame, layout[0]);
        self.fleet.render(frame, layout[1]);
        self.render_hints(frame, layout[2]);

        // Overlays on top (order matters: last = topmost)
        if let Some((ref notif, _)) = self.notification {
            self.render_notification(frame, area, notif);
        }
        if let Some(ref confirm) = self.pending_confirm {
            self.render_confirm_dialog(frame, area, confirm);
        }
        if let Some(ref form) = self.add_form {
            Self::render_add_form(frame, area, form);
        }
        if let Some(ref prompt) = self.password_prompt {
            Self::render_password_prompt(frame, area, prompt);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let summary = self.fleet.summary();

        let (status_label, status_style) = match self.connection_status {
            ConnectionStatus::Connected => ("● online", theme::status_running()),
            ConnectionStatus::Connecting => ("◌ connecting", theme::key_hint()),
            ConnectionStatus::Disconnected => ("○ offline", theme::status_stopped()),
        };

        let title = Line::from(vec![
            Span::styled(" fleetdeck ", theme::title_style()),
            Span::styled(
                format!(
                    "─ {} machines · {} running · {} stopped ",
                    summary.total, summary.running, summary.stopped
                ),
                theme::field_label(),
            ),
        ]);

        let right = Line::from(vec![
            Span::styled(status_label, status_style),
            Span::styled(format!("  {} ", self.clock), theme::field_value()),
        ])
        .right_aligned();

        let block = Block::default()
            .title(title)
            .title(right)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());
        frame.render_widget(block, area);
    }

    fn render_hints(&self, frame: &mut Frame, area: Rect) {
        let pairs: &[(&str, &str)] = &[
            ("q", "quit"),
            ("a", "add"),
            ("↑↓←→", "select"),
            ("c", "connect"),
            ("w", "wake"),
            ("p", "power-off"),
            ("r", "reboot"),
            ("d", "delete"),
        ];

        let mut spans = vec![Span::raw(" ")];
        for (key, label) in pairs {
            spans.push(Span::styled(*key, theme::key_hint_key()));
            spans.push(Span::styled(format!(" {label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_notification(&self, frame: &mut Frame, area: Rect, notif: &Notification) {
        use crate::action::NotificationLevel;

        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(24, 72).min(area.width);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above the hint bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height);

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::RUNNING_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Warning => (theme::AMBER, "!"),
            NotificationLevel::Info => (theme::HARBOR_BLUE, "·"),
        };

        modal::fill_background(frame, toast_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(ratatui::style::Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(
                format!(" {icon} "),
                ratatui::style::Style::default().fg(border_color),
            ),
            Span::styled(notif.message.clone(), theme::field_value()),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }

    /// Render a centered confirmation dialog.
    fn render_confirm_dialog(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let dialog_area = modal::centered_rect(area, 50, 5);
        modal::fill_background(frame, dialog_area);

        let block = Block::default()
            .title(Span::styled(" Confirm ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(ratatui::style::Style::default().fg(theme::AMBER));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let text = vec![
            Line::from(Span::styled(format!("  {confirm}"), theme::field_value())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    /// Render the password prompt for the pending power action.
    fn render_password_prompt(frame: &mut Frame, area: Rect, prompt: &PasswordPrompt) {
        let dialog_area = modal::centered_rect(area, 52, 8);
        modal::fill_background(frame, dialog_area);

        let block = Block::default()
            .title(Span::styled(" Authentication required ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // message
            Constraint::Length(3), // input
            Constraint::Length(1), // hints
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" Enter password for {}", prompt.label),
                theme::field_value(),
            ))),
            rows[0],
        );

        modal::render_text_field(frame, rows[1], "Password", &prompt.input, true, true);

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Enter ", theme::key_hint_key()),
                Span::styled("submit   ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            rows[2],
        );
    }

    /// Render the add-machine form.
    fn render_add_form(frame: &mut Frame, area: Rect, form: &AddForm) {
        let dialog_area = modal::centered_rect(area, 48, 21);
        modal::fill_background(frame, dialog_area);

        let block = Block::default()
            .title(Span::styled(" Add machine ", theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = Layout::vertical([
            Constraint::Length(3), // name
            Constraint::Length(3), // mac
            Constraint::Length(3), // host
            Constraint::Length(3), // user
            Constraint::Length(3), // method
            Constraint::Length(2), // kind toggle
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let fields = [
            ("Name", &form.name),
            ("MAC", &form.mac),
            ("Address", &form.host),
            ("User", &form.user),
            ("Method", &form.method),
        ];
        for (index, (label, input)) in fields.into_iter().enumerate() {
            modal::render_text_field(frame, rows[index], label, input, form.focus == index, false);
        }

        let kind_focused = form.focus == 5;
        let kind_label = if form.physical {
            "Kind: physical (wake-on-LAN capable)"
        } else {
            "Kind: virtual"
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {kind_label}"),
                if kind_focused {
                    theme::border_focused()
                } else {
                    theme::field_value()
                },
            ))),
            rows[5],
        );

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Enter ", theme::key_hint_key()),
                Span::styled("save   ", theme::key_hint()),
                Span::styled("Tab ", theme::key_hint_key()),
                Span::styled("next field   ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ])),
            rows[6],
        );
    }
}
