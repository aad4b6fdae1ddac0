use std::io;
use std::time::Duration;

use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use miette::IntoDiagnostic;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::Tab;
use crate::domain::Direction;
use crate::lane::Phase;
use crate::surface::LaneView;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const SPINNER: &[&str] = &["|", "/", "-", "\\"];

pub struct Tui {
    focus: Direction,
    citing_scroll: u16,
    cited_by_scroll: u16,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            focus: Direction::Citing,
            citing_scroll: 0,
            cited_by_scroll: 0,
        }
    }

    pub fn run(&mut self, tab: &mut Tab) -> miette::Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().into_diagnostic()?;
        stdout.execute(EnterAlternateScreen).into_diagnostic()?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;
        terminal.clear().into_diagnostic()?;

        let result = self.event_loop(&mut terminal, tab);

        disable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        stdout.execute(LeaveAlternateScreen).into_diagnostic()?;
        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tab: &mut Tab,
    ) -> miette::Result<()> {
        let mut tick = 0usize;
        loop {
            tab.pump();
            terminal
                .draw(|frame| draw_ui(frame, self, tab, tick))
                .into_diagnostic()?;

            if event::poll(POLL_INTERVAL).into_diagnostic()? {
                if let Event::Key(key) = event::read().into_diagnostic()? {
                    if self.handle_key(key, tab) {
                        return Ok(());
                    }
                }
            }

            tick = tick.wrapping_add(1);
        }
    }

    fn handle_key(&mut self, key: KeyEvent, tab: &mut Tab) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let lines = focused_line_count(tab, self.focus);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.focus = Direction::Citing,
            KeyCode::Right => self.focus = Direction::CitedBy,
            KeyCode::Tab | KeyCode::BackTab => self.focus = other(self.focus),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('r') => {
                self.press(tab, self.focus);
            }
            KeyCode::Char('c') => self.press(tab, Direction::Citing),
            KeyCode::Char('b') => self.press(tab, Direction::CitedBy),
            KeyCode::Up => self.scroll(-1, lines),
            KeyCode::Down => self.scroll(1, lines),
            KeyCode::PageUp => self.scroll(-10, lines),
            KeyCode::PageDown => self.scroll(10, lines),
            _ => {}
        }
        false
    }

    fn press(&mut self, tab: &mut Tab, direction: Direction) {
        if tab.press(direction) {
            *self.scroll_mut(direction) = 0;
        }
    }

    // The offset stays on the lane's last line at most.
    fn scroll(&mut self, delta: i16, lines: usize) {
        let last = u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX);
        let current = self.scroll_mut(self.focus);
        *current = current.saturating_add_signed(delta).min(last);
    }

    fn scroll_mut(&mut self, direction: Direction) -> &mut u16 {
        match direction {
            Direction::Citing => &mut self.citing_scroll,
            Direction::CitedBy => &mut self.cited_by_scroll,
        }
    }

    fn scroll_of(&self, direction: Direction) -> u16 {
        match direction {
            Direction::Citing => self.citing_scroll,
            Direction::CitedBy => self.cited_by_scroll,
        }
    }
}

fn focused_line_count(tab: &Tab, direction: Direction) -> usize {
    tab.lane(direction)
        .map(|lane| lane_body(lane.surface(), lane.phase(), 0).len())
        .unwrap_or(0)
}

fn other(direction: Direction) -> Direction {
    match direction {
        Direction::Citing => Direction::CitedBy,
        Direction::CitedBy => Direction::Citing,
    }
}

fn draw_ui(frame: &mut ratatui::Frame, tui: &Tui, tab: &Tab, tick: usize) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(2),
    ])
    .split(frame.area());

    frame.render_widget(draw_header(tab), chunks[0]);

    let panes = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    for (direction, area) in Direction::ALL.into_iter().zip(panes.iter()) {
        draw_lane(frame, tui, tab, direction, *area, tick);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        "Enter search/refresh focused   c citing   b cited by   \u{2190}/\u{2192} focus   \u{2191}/\u{2193} scroll   q quit",
        Style::default().fg(Color::DarkGray),
    )))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);
}

fn draw_header(tab: &Tab) -> Paragraph<'static> {
    let record = tab
        .record()
        .map(|record| record.describe())
        .unwrap_or_else(|| "no record".to_string());
    let year = tab
        .record()
        .and_then(|record| record.year)
        .map(|year| format!("   Year: {year}"))
        .unwrap_or_default();
    let title_line = Line::from(vec![
        Span::styled(
            "CITATION RELATIONS",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(env!("CARGO_PKG_VERSION"), Style::default().fg(Color::Gray)),
    ]);
    let record_line = Line::from(vec![
        Span::styled("Record: ", Style::default().fg(Color::Gray)),
        Span::raw(record),
        Span::styled(year, Style::default().fg(Color::Gray)),
    ]);
    Paragraph::new(vec![title_line, record_line])
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::BOTTOM))
}

fn draw_lane(
    frame: &mut ratatui::Frame,
    tui: &Tui,
    tab: &Tab,
    direction: Direction,
    area: Rect,
    tick: usize,
) {
    let Some(lane) = tab.lane(direction) else {
        return;
    };
    let view = lane.surface();
    let focused = tui.focus == direction;

    let mut title = vec![Span::styled(
        format!(" {} ", direction.label()),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if view.refresh {
        title.push(Span::styled("[refresh] ", Style::default().fg(Color::Cyan)));
    }
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Line::from(title));

    let body = lane_body(view, lane.phase(), tick);
    let paragraph = Paragraph::new(body)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((tui.scroll_of(direction), 0));
    frame.render_widget(paragraph, area);
}

fn lane_body(view: &LaneView, phase: Phase, tick: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if view.start {
        lines.push(Line::from(Span::styled(
            "[ Search ]",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
    }
    if view.busy {
        lines.push(Line::from(vec![
            Span::styled(
                SPINNER[tick % SPINNER.len()],
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(" searching...", Style::default().fg(Color::Yellow)),
        ]));
        return lines;
    }
    if view.error {
        lines.push(Line::from(Span::styled(
            "Error",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        return lines;
    }
    if phase == Phase::Loaded {
        lines.extend(
            view.items
                .iter()
                .map(|item| Line::from(format!("\u{2022} {item}"))),
        );
    }
    lines
}
