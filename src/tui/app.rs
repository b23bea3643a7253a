#![forbid(unsafe_code)]

use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use crate::core::roster::{Roster, TubeColor};
use crate::tui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    AddEntry,
    RemoveEntry,
}

#[derive(Debug, Clone)]
struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    fn new(initial: impl Into<String>) -> Self {
        let text = initial.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn as_str(&self) -> &str {
        &self.text
    }

    fn insert_char(&mut self, c: char) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        chars.insert(cur, c);
        self.text = chars.into_iter().collect();
        self.cursor = cur + 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        if cur == 0 {
            return;
        }
        chars.remove(cur - 1);
        self.text = chars.into_iter().collect();
        self.cursor = cur - 1;
    }

    fn delete(&mut self) {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cur = self.cursor.min(chars.len());
        if cur >= chars.len() {
            return;
        }
        chars.remove(cur);
        self.text = chars.into_iter().collect();
    }

    fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    fn move_right(&mut self) {
        let len = self.text.chars().count();
        self.cursor = (self.cursor + 1).min(len);
    }

    fn move_home(&mut self) {
        self.cursor = 0;
    }

    fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddField {
    Name,
    Surname,
    Color,
}

#[derive(Debug, Clone)]
struct AddDialog {
    name: TextInput,
    surname: TextInput,
    color: TubeColor,
    field: AddField,
    error: Option<String>,
}

impl AddDialog {
    fn new(color: TubeColor) -> Self {
        Self {
            name: TextInput::new(""),
            surname: TextInput::new(""),
            color,
            field: AddField::Name,
            error: None,
        }
    }

    fn cycle_color(&mut self, forward: bool) {
        let idx = TubeColor::ALL
            .iter()
            .position(|c| *c == self.color)
            .unwrap_or(0);
        let len = TubeColor::ALL.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.color = TubeColor::ALL[next];
    }
}

#[derive(Debug, Clone)]
struct RemoveDialog {
    id: TextInput,
    error: Option<String>,
}

impl RemoveDialog {
    fn new(prefill: Option<u32>) -> Self {
        let initial = prefill.map(|id| id.to_string()).unwrap_or_default();
        Self {
            id: TextInput::new(initial),
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    until: Instant,
}

impl Toast {
    fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            until: Instant::now() + Duration::from_secs(3),
        }
    }
}

#[derive(Debug)]
struct AppState {
    cfg: crate::config::Config,

    mode: Mode,
    roster: Roster,
    table_state: TableState,
    show_summary: bool,

    add: Option<AddDialog>,
    remove: Option<RemoveDialog>,

    toast: Option<Toast>,
    should_quit: bool,
}

impl AppState {
    fn new(cfg: crate::config::Config) -> Self {
        let show_summary = cfg.ui.show_summary;
        let mut table_state = TableState::default();
        table_state.select(Some(0));

        Self {
            cfg,
            mode: Mode::Normal,
            roster: Roster::new(),
            table_state,
            show_summary,
            add: None,
            remove: None,
            toast: None,
            should_quit: false,
        }
    }

    fn selected_index(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn selected_id(&self) -> Option<u32> {
        let entries = self.roster.entries();
        if entries.is_empty() {
            return None;
        }
        let idx = self.selected_index().min(entries.len() - 1);
        Some(entries[idx].id)
    }

    fn clamp_selection(&mut self) {
        if self.roster.is_empty() {
            self.table_state.select(Some(0));
            return;
        }
        let idx = self.selected_index().min(self.roster.len() - 1);
        self.table_state.select(Some(idx));
    }

    fn move_selection(&mut self, delta: i64) {
        if self.roster.is_empty() {
            return;
        }
        let cur = i64::try_from(self.selected_index()).unwrap_or(0);
        let max = i64::try_from(self.roster.len().saturating_sub(1)).unwrap_or(0);
        let next = (cur + delta).clamp(0, max);
        self.table_state.select(Some(usize::try_from(next).unwrap_or(0)));
    }
}

pub fn run(cfg: crate::config::Config) -> anyhow::Result<()> {
    let terminal = tui::init_terminal()?;
    let mut guard = TerminalGuard::new(terminal);

    let mut app = AppState::new(cfg);

    loop {
        if let Some(toast) = &app.toast
            && Instant::now() >= toast.until
        {
            app.toast = None;
        }

        {
            let Some(terminal) = guard.terminal.as_mut() else {
                anyhow::bail!("terminal unavailable");
            };
            terminal.draw(|f| draw(f, &mut app))?;
        }

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key) = event::read()?
        {
            handle_key(key, &mut app);
        }
    }

    Ok(())
}

fn handle_key(key: KeyEvent, app: &mut AppState) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Normal => handle_normal_key(key, app),
        Mode::AddEntry => handle_add_key(key, app),
        Mode::RemoveEntry => handle_remove_key(key, app),
    }
}

fn handle_normal_key(key: KeyEvent, app: &mut AppState) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('a') => {
            app.add = Some(AddDialog::new(app.cfg.roster.default_color));
            app.mode = Mode::AddEntry;
        }
        KeyCode::Char('d') | KeyCode::Char('r') => {
            app.remove = Some(RemoveDialog::new(app.selected_id()));
            app.mode = Mode::RemoveEntry;
        }
        KeyCode::Char('s') => app.show_summary = !app.show_summary,
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Home | KeyCode::Char('g') => app.table_state.select(Some(0)),
        KeyCode::End | KeyCode::Char('G') => {
            app.table_state
                .select(Some(app.roster.len().saturating_sub(1)));
        }
        _ => {}
    }
}

fn handle_add_key(key: KeyEvent, app: &mut AppState) {
    let Some(dialog) = app.add.as_mut() else {
        app.mode = Mode::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.add = None;
            app.mode = Mode::Normal;
        }
        KeyCode::Tab | KeyCode::Down => {
            dialog.field = match dialog.field {
                AddField::Name => AddField::Surname,
                AddField::Surname => AddField::Color,
                AddField::Color => AddField::Name,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            dialog.field = match dialog.field {
                AddField::Name => AddField::Color,
                AddField::Surname => AddField::Name,
                AddField::Color => AddField::Surname,
            };
        }
        KeyCode::Enter => {
            if dialog.field == AddField::Color {
                submit_add(app);
            } else {
                dialog.field = match dialog.field {
                    AddField::Name => AddField::Surname,
                    AddField::Surname | AddField::Color => AddField::Color,
                };
            }
        }
        KeyCode::Left => match dialog.field {
            AddField::Color => dialog.cycle_color(false),
            AddField::Name => dialog.name.move_left(),
            AddField::Surname => dialog.surname.move_left(),
        },
        KeyCode::Right => match dialog.field {
            AddField::Color => dialog.cycle_color(true),
            AddField::Name => dialog.name.move_right(),
            AddField::Surname => dialog.surname.move_right(),
        },
        KeyCode::Home => match dialog.field {
            AddField::Name => dialog.name.move_home(),
            AddField::Surname => dialog.surname.move_home(),
            AddField::Color => {}
        },
        KeyCode::End => match dialog.field {
            AddField::Name => dialog.name.move_end(),
            AddField::Surname => dialog.surname.move_end(),
            AddField::Color => {}
        },
        KeyCode::Backspace => {
            dialog.error = None;
            match dialog.field {
                AddField::Name => dialog.name.backspace(),
                AddField::Surname => dialog.surname.backspace(),
                AddField::Color => {}
            }
        }
        KeyCode::Delete => {
            dialog.error = None;
            match dialog.field {
                AddField::Name => dialog.name.delete(),
                AddField::Surname => dialog.surname.delete(),
                AddField::Color => {}
            }
        }
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                // Typing resumes editing after a rejected submit.
                dialog.error = None;
                match dialog.field {
                    AddField::Name => dialog.name.insert_char(c),
                    AddField::Surname => dialog.surname.insert_char(c),
                    AddField::Color => {}
                }
            }
        }
        _ => {}
    }
}

fn submit_add(app: &mut AppState) {
    let Some(dialog) = app.add.as_mut() else {
        return;
    };
    match app.roster.add(
        dialog.name.as_str(),
        dialog.surname.as_str(),
        dialog.color,
    ) {
        Ok(entry) => {
            app.toast = Some(Toast::info(format!(
                "Added #{}: {} {}",
                entry.id, entry.name, entry.surname
            )));
            app.add = None;
            app.mode = Mode::Normal;
            app.table_state
                .select(Some(app.roster.len().saturating_sub(1)));
        }
        Err(err) => dialog.error = Some(err.to_string()),
    }
}

fn handle_remove_key(key: KeyEvent, app: &mut AppState) {
    let Some(dialog) = app.remove.as_mut() else {
        app.mode = Mode::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => {
            app.remove = None;
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => submit_remove(app),
        KeyCode::Left => dialog.id.move_left(),
        KeyCode::Right => dialog.id.move_right(),
        KeyCode::Home => dialog.id.move_home(),
        KeyCode::End => dialog.id.move_end(),
        KeyCode::Backspace => {
            dialog.error = None;
            dialog.id.backspace();
        }
        KeyCode::Delete => {
            dialog.error = None;
            dialog.id.delete();
        }
        KeyCode::Char(c) => {
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT)
            {
                dialog.error = None;
                dialog.id.insert_char(c);
            }
        }
        _ => {}
    }
}

fn submit_remove(app: &mut AppState) {
    let Some(dialog) = app.remove.as_mut() else {
        return;
    };
    match app.roster.remove(dialog.id.as_str()) {
        Ok(entry) => {
            app.toast = Some(Toast::info(format!(
                "Removed #{}: {} {}",
                entry.id, entry.name, entry.surname
            )));
            app.remove = None;
            app.mode = Mode::Normal;
            app.clamp_selection();
        }
        Err(err) => dialog.error = Some(err.to_string()),
    }
}

fn draw(f: &mut Frame<'_>, app: &mut AppState) {
    let area = f.area();

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    draw_title(f, root[0], app);
    draw_body(f, root[1], app);
    draw_footer(f, root[2], app);

    match app.mode {
        Mode::AddEntry => {
            let Some(dialog) = &app.add else {
                return;
            };
            draw_add_dialog(f, dialog);

            let popup = centered_rect(60, 40, area);
            let inner = Block::default()
                .borders(Borders::ALL)
                .title("Add entry")
                .inner(popup);

            let (line_idx, prefix, input) = match dialog.field {
                AddField::Name => (0u16, "Name:    ", &dialog.name),
                AddField::Surname => (1u16, "Surname: ", &dialog.surname),
                AddField::Color => return,
            };

            let prefix_len = prefix.chars().count();
            let x = inner.x
                + u16::try_from(prefix_len).unwrap_or(0)
                + cursor_x_for_text(input.as_str(), input.cursor);
            let y = inner.y + line_idx;
            f.set_cursor_position((x, y));
        }
        Mode::RemoveEntry => {
            let Some(dialog) = &app.remove else {
                return;
            };
            draw_remove_dialog(f, dialog);

            let popup = centered_rect(50, 25, area);
            let inner = Block::default()
                .borders(Borders::ALL)
                .title("Remove entry")
                .inner(popup);

            let prefix_len = "Id: ".chars().count();
            let x = inner.x
                + u16::try_from(prefix_len).unwrap_or(0)
                + cursor_x_for_text(dialog.id.as_str(), dialog.id.cursor);
            let y = inner.y;
            f.set_cursor_position((x, y));
        }
        Mode::Normal => {}
    }
}

fn draw_title(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let left = Line::from(vec![
        Span::styled("labtui", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(" · tube roster", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(left), chunks[0]);

    let right = Paragraph::new(Line::from(format!("{} entries", app.roster.len())))
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Right);
    f.render_widget(right, chunks[1]);
}

fn draw_body(f: &mut Frame<'_>, area: Rect, app: &mut AppState) {
    if !app.show_summary {
        draw_roster_table(f, area, app);
        return;
    }

    let width = app.cfg.ui.summary_width.clamp(10, 70);
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(100 - width),
            Constraint::Percentage(width),
        ])
        .split(area);

    draw_roster_table(f, layout[0], app);
    draw_summary(f, layout[1], app);
}

fn draw_roster_table(f: &mut Frame<'_>, area: Rect, app: &mut AppState) {
    let headers = Row::new(vec!["ID", "NAME", "COLOR"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let icons = app.cfg.ui.icons;
    let rows = app.roster.entries().iter().map(|e| {
        let color = if icons {
            format!("● {}", e.color.label())
        } else {
            e.color.label().to_owned()
        };
        Row::new(vec![
            Cell::from(e.id.to_string()),
            Cell::from(format!("{} {}", e.name, e.surname)),
            Cell::from(color).style(Style::default().fg(tube_color_style(e.color))),
        ])
    });

    let table = Table::new(
        rows,
        vec![
            Constraint::Length(6),
            Constraint::Min(10),
            Constraint::Length(12),
        ],
    )
    .header(headers)
    .block(Block::default().borders(Borders::ALL).title("Roster"))
    .row_highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::LightBlue)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");

    f.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_summary(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let block = Block::default().borders(Borders::ALL).title("Summary");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let summary = app.roster.summary();
    let icons = app.cfg.ui.icons;

    let mut lines: Vec<Line> = summary
        .counts()
        .map(|(color, count)| {
            let mut spans = Vec::new();
            if icons {
                spans.push(Span::styled(
                    "● ",
                    Style::default().fg(tube_color_style(color)),
                ));
            }
            spans.push(Span::raw(format!("{}: ", color.label())));
            spans.push(Span::styled(
                count.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            Line::from(spans)
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Total: ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(summary.total().to_string()),
    ]));

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &AppState) {
    let mut left = match app.mode {
        Mode::Normal => {
            "q quit • j/k move • a add • d remove • s summary".to_owned()
        }
        Mode::AddEntry => {
            "Enter next/add • Tab switch field • ←/→ color • Esc cancel".to_owned()
        }
        Mode::RemoveEntry => "Enter remove • Esc cancel".to_owned(),
    };

    if let Some(toast) = &app.toast {
        left.clone_from(&toast.message);
    }

    let p = Paragraph::new(Line::from(Span::styled(
        left,
        Style::default().fg(Color::White).bg(Color::Blue),
    )))
    .style(Style::default().bg(Color::Blue));
    f.render_widget(p, area);
}

fn draw_add_dialog(f: &mut Frame<'_>, dialog: &AddDialog) {
    let area = centered_rect(60, 40, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("Add entry");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let field_style = |active: bool| {
        if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        }
    };

    let color_value = if dialog.field == AddField::Color {
        format!("◂ {} ▸", dialog.color.label())
    } else {
        dialog.color.label().to_owned()
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:    ", field_style(dialog.field == AddField::Name)),
            Span::raw(dialog.name.as_str().to_owned()),
        ]),
        Line::from(vec![
            Span::styled("Surname: ", field_style(dialog.field == AddField::Surname)),
            Span::raw(dialog.surname.as_str().to_owned()),
        ]),
        Line::from(vec![
            Span::styled("Color:   ", field_style(dialog.field == AddField::Color)),
            Span::styled(
                color_value,
                Style::default().fg(tube_color_style(dialog.color)),
            ),
        ]),
        Line::from(""),
    ];

    if let Some(err) = &dialog.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Ukrainian letters only; the color picks the tube.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_remove_dialog(f: &mut Frame<'_>, dialog: &RemoveDialog) {
    let area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, area);
    let block = Block::default().borders(Borders::ALL).title("Remove entry");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Id: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(dialog.id.as_str().to_owned()),
        ]),
        Line::from(""),
    ];

    if let Some(err) = &dialog.error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Removes the entry with this id.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn tube_color_style(color: TubeColor) -> Color {
    match color {
        TubeColor::Red => Color::Red,
        TubeColor::Yellow => Color::Yellow,
        TubeColor::Green => Color::Green,
        TubeColor::Blue => Color::LightBlue,
    }
}

fn cursor_x_for_text(text: &str, cursor: usize) -> u16 {
    u16::try_from(text.chars().take(cursor).count()).unwrap_or(0)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

struct TerminalGuard {
    terminal: Option<tui::Term>,
}

impl TerminalGuard {
    fn new(terminal: tui::Term) -> Self {
        Self {
            terminal: Some(terminal),
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Some(terminal) = self.terminal.take() {
            let _ = tui::restore_terminal(terminal);
        }
    }
}
