use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};
use std::io;

use crate::{
    error::Error,
    picker::{self, Pick, Picker},
};

/// Full-screen fuzzy finder over the candidate labels.
#[derive(Default)]
pub struct FuzzyPicker;

impl Picker for FuzzyPicker {
    fn pick(
        &mut self,
        prompt: &str,
        count: usize,
        label: &dyn Fn(usize) -> String,
    ) -> crate::error::Result<Pick> {
        let labels = (0..count).map(label).collect();
        let mut app = App::new(prompt, labels);
        run(&mut app).map_err(|e| Error::PickerFailure(e.to_string()))
    }
}

// ── State ─────────────────────────────────────────────────────────────────────

struct App {
    prompt: String,
    labels: Vec<String>,
    query: String,
    /// Indices into `labels` that match `query`, best first.
    matches: Vec<usize>,
    selected: usize,
    outcome: Option<Pick>,
}

impl App {
    fn new(prompt: &str, labels: Vec<String>) -> Self {
        let matches = (0..labels.len()).collect();
        App {
            prompt: prompt.to_string(),
            labels,
            query: String::new(),
            matches,
            selected: 0,
            outcome: None,
        }
    }

    fn refilter(&mut self) {
        self.matches = picker::filter(&self.query, &self.labels);
        self.selected = 0;
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn run(app: &mut App) -> Result<Pick> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    // Always restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<Pick> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Some(outcome) = app.outcome {
            return Ok(outcome);
        }

        if !event::poll(std::time::Duration::from_millis(250))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key);
            }
        }
    }
}

// ── Key handling ──────────────────────────────────────────────────────────────

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.outcome = Some(Pick::Aborted),
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => app.outcome = Some(Pick::Aborted),
        KeyCode::Enter => {
            if let Some(&index) = app.matches.get(app.selected) {
                app.outcome = Some(Pick::Index(index));
            }
        }
        KeyCode::Up => move_up(app),
        KeyCode::Char('p') | KeyCode::Char('k') if ctrl => move_up(app),
        KeyCode::Down => move_down(app),
        KeyCode::Char('n') | KeyCode::Char('j') if ctrl => move_down(app),
        KeyCode::Char('u') if ctrl => {
            app.query.clear();
            app.refilter();
        }
        KeyCode::Backspace => {
            if app.query.pop().is_some() {
                app.refilter();
            }
        }
        KeyCode::Char(c) if !ctrl => {
            app.query.push(c);
            app.refilter();
        }
        _ => {}
    }
}

fn move_up(app: &mut App) {
    if app.selected > 0 {
        app.selected -= 1;
    }
}

fn move_down(app: &mut App) {
    if app.selected + 1 < app.matches.len() {
        app.selected += 1;
    }
}

// ── UI rendering ──────────────────────────────────────────────────────────────

fn ui(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Min(3),    // candidates
            Constraint::Length(3), // query
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_list(f, app, chunks[1]);
    render_query(f, app, chunks[2]);
}

fn render_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" aztx ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));

    let text = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("  {}", app.prompt),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   * marks the active one", Style::default().fg(Color::DarkGray)),
    ]))
    .block(block);

    f.render_widget(text, area);
}

fn render_list(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let title = format!(" {}/{} ", app.matches.len(), app.labels.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    if app.matches.is_empty() {
        let text = Paragraph::new(Line::from(Span::styled(
            "  No matches",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        f.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = app
        .matches
        .iter()
        .map(|&i| ListItem::new(Line::from(format!("  {}", app.labels[i]))))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(40, 40, 60))
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶");

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));

    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_query(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = Paragraph::new(Line::from(vec![
        Span::styled(
            "  > ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.query.clone(), Style::default().fg(Color::White)),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
        Span::styled(
            "   ↑↓ nav  ·  ↵ select  ·  esc cancel",
            Style::default().fg(Color::DarkGray),
        ),
    ]))
    .block(block);

    f.render_widget(text, area);
}
