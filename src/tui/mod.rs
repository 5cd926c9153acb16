//! Ratatui-based configuration form.
//!
//! `TerminalForm` is a `ConfigForm` backed by a terminal: one list row per
//! configuration key, inline editing of the selected value, and a y/n popup
//! when an invalid configuration is about to be saved. The form state and
//! rendering live in `FormView` so they can be exercised without a terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use tracing::warn;

use crate::domain::{ConfigKey, Configuration};
use crate::editor::{ConfigEditor, ConfigForm, DialogOutcome, FieldState, IdentifierRegistry, ValidationPolicy};
use crate::error::AppError;

/// Open the form on `config` and return the accepted configuration, or `None`
/// if the operator quit without saving.
pub fn edit_config<R: IdentifierRegistry>(
    config: &Configuration,
    registry: R,
    policy: ValidationPolicy,
) -> Result<Option<Configuration>, AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut editor = ConfigEditor::with_policy(TerminalForm::new(terminal), registry, policy);
    editor.load(config);
    editor.validate();
    run_session(&mut editor)
}

fn run_session<B: Backend, R: IdentifierRegistry>(
    editor: &mut ConfigEditor<TerminalForm<B>, R>,
) -> Result<Option<Configuration>, AppError> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            editor.form_mut().redraw()?;
            needs_redraw = false;
        }

        let Some(key) = next_key()? else {
            continue;
        };
        needs_redraw = true;

        match editor.form_mut().view.handle_key(key) {
            Action::None => {}
            Action::Edited => {
                editor.validate();
            }
            Action::Cancel => return Ok(None),
            Action::Accept => match editor.accept() {
                DialogOutcome::Accepted => return Ok(Some(editor.read())),
                DialogOutcome::Rejected => {
                    editor.form_mut().view.status = "Not saved; choose another identifier.".to_string();
                }
            },
        }
    }
}

/// Next key press; `None` on timeout or non-key events.
fn next_key() -> Result<Option<KeyEvent>, AppError> {
    if !event::poll(Duration::from_millis(100))
        .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
    {
        return Ok(None);
    }
    match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// `ConfigForm` drawn on a terminal.
pub struct TerminalForm<B: Backend> {
    terminal: Terminal<B>,
    pub view: FormView,
}

impl<B: Backend> TerminalForm<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self {
            terminal,
            view: FormView::new(),
        }
    }

    fn redraw(&mut self) -> Result<(), AppError> {
        let view = &self.view;
        self.terminal
            .draw(|f| view.draw(f))
            .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
        Ok(())
    }

    fn ask(&mut self) -> Result<bool, AppError> {
        self.view.confirming = true;
        self.redraw()?;
        loop {
            let Some(key) = next_key()? else {
                continue;
            };
            match key.code {
                KeyCode::Char('y' | 'Y') => return Ok(true),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => return Ok(false),
                _ => {}
            }
        }
    }
}

impl<B: Backend> ConfigForm for TerminalForm<B> {
    fn set_text(&mut self, key: ConfigKey, value: &str) {
        self.view.values.set(key, value);
    }

    fn text(&self, key: ConfigKey) -> String {
        self.view.values.get(key).to_string()
    }

    fn mark_field(&mut self, key: ConfigKey, state: FieldState) {
        self.view.states[key.index()] = state;
    }

    fn set_accept_enabled(&mut self, enabled: bool) {
        self.view.accept_enabled = enabled;
    }

    fn confirm_invalid_save(&mut self) -> bool {
        let answer = self.ask().unwrap_or_else(|err| {
            warn!(error = %err, "confirmation prompt failed; not saving");
            false
        });
        self.view.confirming = false;
        answer
    }
}

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// A field value changed.
    Edited,
    Accept,
    Cancel,
}

/// Terminal-independent form state.
#[derive(Debug, Clone)]
pub struct FormView {
    pub values: Configuration,
    pub states: [FieldState; ConfigKey::COUNT],
    pub accept_enabled: bool,
    pub selected: usize,
    /// Edit buffer while a value is being edited.
    pub editing: Option<String>,
    pub confirming: bool,
    pub status: String,
}

impl Default for FormView {
    fn default() -> Self {
        Self::new()
    }
}

impl FormView {
    pub fn new() -> Self {
        Self {
            values: Configuration::from_fn(|_| String::new()),
            states: [FieldState::Valid; ConfigKey::COUNT],
            accept_enabled: true,
            selected: 0,
            editing: None,
            confirming: false,
            status: String::new(),
        }
    }

    pub fn selected_key(&self) -> ConfigKey {
        ConfigKey::ALL[self.selected]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if self.editing.is_some() {
            return self.handle_edit_key(key.code);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
            return Action::Accept;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Cancel,
            KeyCode::Char('s') => return Action::Accept,
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected + 1 < ConfigKey::COUNT {
                    self.selected += 1;
                }
            }
            KeyCode::Enter => {
                let key = self.selected_key();
                self.editing = Some(self.values.get(key).to_string());
                self.status = format!("Editing `{key}`. Enter to apply, Esc to cancel.");
            }
            _ => {}
        }
        Action::None
    }

    fn handle_edit_key(&mut self, code: KeyCode) -> Action {
        let Some(buffer) = self.editing.as_mut() else {
            return Action::None;
        };
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                let value = std::mem::take(buffer);
                let key = self.selected_key();
                self.editing = None;
                self.values.set(key, value);
                self.status = format!("Updated `{key}`.");
                return Action::Edited;
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(c) => buffer.push(c),
            _ => {}
        }
        Action::None
    }

    pub fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_fields(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.confirming {
            self.draw_confirm(frame, size);
        }
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let (validity, color) = if self.accept_enabled {
            ("configuration valid", Color::Green)
        } else {
            ("identifier already in use", Color::Red)
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("fwfit", Style::default().fg(Color::Cyan)),
                Span::raw(": fieldwork mesh fitting configuration"),
            ]),
            Line::from(Span::styled(validity, Style::default().fg(color))),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_fields(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let width = ConfigKey::ALL
            .iter()
            .map(|k| k.as_str().len())
            .max()
            .unwrap_or(0);

        let items: Vec<ListItem> = ConfigKey::ALL
            .iter()
            .enumerate()
            .map(|(i, key)| {
                let value = match &self.editing {
                    Some(buffer) if i == self.selected => format!("{buffer}_"),
                    _ => self.values.get(*key).to_string(),
                };
                let style = match self.states[i] {
                    FieldState::Valid => Style::default(),
                    FieldState::Invalid => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                };
                ListItem::new(format!("{:<width$}  {value}", key.as_str())).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = if self.editing.is_some() {
            "type to edit  Enter apply  Esc cancel"
        } else {
            "↑/↓ select  Enter edit  s save  q quit"
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_confirm(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let rect = centered(area, 52, 5);
        frame.render_widget(Clear, rect);
        let p = Paragraph::new("Identifier is already in use.\nSave anyway? (y/n)")
            .alignment(Alignment::Center)
            .block(Block::default().title("Confirm").borders(Borders::ALL))
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(p, rect);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
