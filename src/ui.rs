use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use registrant_chart::chart::{SUBTITLE, TITLE};
use registrant_chart::{AggregateBucket, PipelineSummary};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Chart,
    Disciplines,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Chart => Page::Disciplines,
            Page::Disciplines => Page::Chart,
        }
    }

    pub fn previous(&self) -> Self {
        // two pages: previous == next
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Chart => "Chart",
            Page::Disciplines => "Disciplines",
        }
    }
}

pub struct App {
    pub summary: PipelineSummary,
    pub state: TableState,
    pub current_page: Page,
}

impl App {
    pub fn new(summary: PipelineSummary) -> Self {
        let mut state = TableState::default();
        if !summary.buckets.is_empty() {
            state.select(Some(0));
        }

        Self {
            summary,
            state,
            current_page: Page::Chart,
        }
    }

    pub fn buckets(&self) -> &[AggregateBucket] {
        &self.summary.buckets
    }

    pub fn selected_bucket(&self) -> Option<&AggregateBucket> {
        self.state.selected().and_then(|i| self.buckets().get(i))
    }

    /// Share of complete registrants, in percent
    pub fn share(&self, bucket: &AggregateBucket) -> f64 {
        if self.summary.complete_rows == 0 {
            0.0
        } else {
            bucket.users_total as f64 * 100.0 / self.summary.complete_rows as f64
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn next(&mut self) {
        let len = self.buckets().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.buckets().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn last(&mut self) {
        if !self.buckets().is_empty() {
            self.state.select(Some(self.buckets().len() - 1));
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    session_result(res)
}

/// Surfaces a failed UI session once the terminal is back to normal.
fn session_result(res: io::Result<()>) -> Result<()> {
    res.context("Terminal UI session failed")
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        app.previous_page();
                    } else {
                        app.next_page();
                    }
                }
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Home => app.state.select(Some(0)),
                KeyCode::End => app.last(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title + page tabs
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Chart => render_chart(f, chunks[1], app),
        Page::Disciplines => render_table(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in [Page::Chart, Page::Disciplines].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let header_text = vec![
        Line::from(vec![
            Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" "),
            Span::styled(SUBTITLE, Style::default().fg(Color::Gray)),
        ]),
        Line::from(tab_spans),
    ];

    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_chart(f: &mut Frame, area: Rect, app: &App) {
    let bars: Vec<Bar> = app
        .buckets()
        .iter()
        .map(|b| {
            Bar::default()
                .label(Line::from(b.label().to_string()))
                .value(b.users_total as u64)
                .text_value(b.users_total.to_string())
                .style(Style::default().fg(Color::LightBlue))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Registrants per discipline "),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(app.summary.max_users_total().max(1) as u64)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Discipline", "Registrants", "Share"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .buckets()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let label_style = if b.disciplina.is_none() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(truncate(b.label(), 40)).style(label_style),
                Cell::from(b.users_total.to_string()),
                Cell::from(format!("{:.1}%", app.share(b))),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(42),
            Constraint::Length(13),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Disciplines "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.summary;

    let mut status_spans = vec![
        Span::styled(
            format!(" Rows: {} ", summary.total_rows),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("| "),
        Span::styled(
            format!("Complete: {}", summary.complete_rows),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" | "),
        Span::styled(
            format!("Excluded: {}", summary.excluded_rows),
            Style::default().fg(Color::Red),
        ),
    ];

    if app.current_page == Page::Disciplines {
        if let Some(bucket) = app.selected_bucket() {
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled(
                format!("{}: {}", truncate(bucket.label(), 20), bucket.users_total),
                Style::default().fg(Color::White),
            ));
        }
    }

    status_spans.extend([
        Span::raw(" | "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Page | "),
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Nav | "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);

    let status = Paragraph::new(Line::from(status_spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    f.render_widget(status, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
