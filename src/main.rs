use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use winstreak_board::config::AppConfig;
use winstreak_board::http_client::{HttpGet, ReqwestGet};
use winstreak_board::identifiers::IdentifierResolver;
use winstreak_board::pager::PageRequest;
use winstreak_board::player::{opt_display, Player, Variant};
use winstreak_board::provider;
use winstreak_board::relay::Transport;
use winstreak_board::roster_fetch::{RosterEndpoints, RosterFetcher};
use winstreak_board::controller::Controller;
use winstreak_board::state::{AppState, Delta, InputMode, NoticeKind, Status};

const ENTRY_HEIGHT: u16 = 3;
const GRID_COLUMNS: usize = 2;

struct App {
    controller: Controller,
    should_quit: bool,
    entry_areas: Vec<Rect>,
    modal_area: Option<Rect>,
}

impl App {
    fn new(controller: Controller) -> Self {
        Self {
            controller,
            should_quit: false,
            entry_areas: Vec::new(),
            modal_area: None,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.controller.state.input_mode == InputMode::Search {
            self.on_search_key(key);
            return;
        }

        if self.controller.state.selection.is_open() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('x') => {
                    self.controller.state.selection.on_escape()
                }
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') => self.controller.state.input_mode = InputMode::Search,
            KeyCode::Char('r') | KeyCode::Char('R') => self.controller.manual_refresh(),
            KeyCode::Char('t') | KeyCode::Char('T') => self.controller.toggle_variant(),
            KeyCode::Char('n') | KeyCode::Right => self.controller.change_page(PageRequest::Next),
            KeyCode::Char('p') | KeyCode::Left => self.controller.change_page(PageRequest::Prev),
            KeyCode::Char(c @ '0'..='9') => {
                let page = c.to_digit(10).map(|d| d as usize).unwrap_or(1);
                let page = if page == 0 { 10 } else { page };
                self.controller.change_page(PageRequest::Jump(page));
            }
            KeyCode::Char('j') | KeyCode::Down => self.controller.state.cursor_next(),
            KeyCode::Char('k') | KeyCode::Up => self.controller.state.cursor_prev(),
            KeyCode::Enter => self.controller.select_at_cursor(),
            KeyCode::Esc => self.controller.clear_search(),
            KeyCode::Char('?') => {
                let state = &mut self.controller.state;
                state.help_overlay = !state.help_overlay;
            }
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.controller.state.input_mode = InputMode::Normal,
            KeyCode::Backspace => self.controller.pop_search_char(),
            KeyCode::Char(c) => self.controller.push_search_char(c),
            _ => {}
        }
    }

    fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let (x, y) = (mouse.column, mouse.row);
        if self.controller.state.selection.is_open() {
            let inside = self
                .modal_area
                .is_some_and(|area| rect_contains(area, x, y));
            if !inside {
                self.controller.state.selection.on_outside_click();
            }
            return;
        }
        let hit = self
            .entry_areas
            .iter()
            .position(|area| rect_contains(*area, x, y));
        if let Some(idx) = hit {
            self.controller.select(idx);
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = AppConfig::from_env();
    let http: Arc<dyn HttpGet> = Arc::new(ReqwestGet::new(config.http_timeout)?);
    let transport = Transport::new(http, config.relay.clone());
    let fetcher = RosterFetcher::new(transport.clone(), RosterEndpoints::from_config(&config));
    let resolver = IdentifierResolver::from_config(transport, &config);

    let (tx, rx) = mpsc::channel();
    let (roster_tx, roster_rx) = mpsc::channel();
    let (identifier_tx, identifier_rx) = mpsc::channel();
    provider::spawn_roster_worker(fetcher, tx.clone(), roster_rx);
    provider::spawn_identifier_worker(resolver, tx, identifier_rx);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut controller = Controller::new(config, Some(roster_tx), Some(identifier_tx));
    controller.start();
    let mut app = App::new(controller);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.controller.apply(delta);
        }

        let now = Instant::now();
        app.controller.state.maybe_clear_notice(now);
        app.controller.maybe_refresh_roster(now);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.on_key(key),
                Event::Mouse(mouse) => app.on_mouse(mouse),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(ENTRY_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_lines(&app.controller.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_search_bar(frame, chunks[1], &app.controller.state);

    let info = app.controller.state.page_info();
    let section = Line::from(vec![
        Span::styled(
            app.controller.state.variant.label(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({} players)", info.total),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(section), chunks[2]);

    app.entry_areas = render_entries(frame, chunks[3], &app.controller.state);
    let drawn = app.entry_areas.len();
    app.controller.state.set_entry_limit(Some(drawn));

    if info.total > 0 {
        frame.render_widget(Paragraph::new(pager_line(&app.controller.state)), chunks[4]);
    }

    let console = Paragraph::new(console_text(&app.controller.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[5]);

    frame.render_widget(Paragraph::new(footer_line(&app.controller.state)), chunks[6]);

    app.modal_area = None;
    if let Some(selection) = app.controller.state.selection.current() {
        let area = centered_rect(50, 70, frame.size());
        frame.render_widget(Clear, area);
        let detail = Paragraph::new(detail_lines(
            &selection.player,
            &selection.identifier,
            selection.resolved,
            app.controller.config(),
        ))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(selection.player.display_name().to_string())
                .borders(Borders::ALL),
        );
        frame.render_widget(detail, area);
        app.modal_area = Some(area);
    }

    if app.controller.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_lines(state: &AppState) -> Vec<Line<'static>> {
    let status_style = match state.status {
        Status::Online => Style::default().fg(Color::Green),
        Status::Offline => Style::default().fg(Color::Red),
        Status::Loading => Style::default().fg(Color::Yellow),
    };
    vec![
        Line::from(vec![
            Span::styled("CoralMC", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw(" Top Winstreak"),
        ]),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::Cyan)),
            Span::styled(state.status.label(), status_style.add_modifier(Modifier::BOLD)),
            Span::styled(
                format!(" • {}", state.last_updated),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ]
}

fn render_search_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let editing = state.input_mode == InputMode::Search;
    let text = if state.search.is_empty() && !editing {
        Span::styled("Search player... (/)", Style::default().fg(Color::DarkGray))
    } else if editing {
        Span::raw(format!("{}_", state.search))
    } else {
        Span::raw(state.search.clone())
    };
    let refresh = if state.loading { "Loading..." } else { "r Refresh" };
    let toggle = match state.variant {
        Variant::Current => "t Top MAX WS",
        Variant::Highest => "t Top Current WS",
    };
    let border = if editing {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default()
    };
    let bar = Paragraph::new(Line::from(vec![text])).block(
        Block::default()
            .title(format!("Search | {refresh} | {toggle}"))
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(bar, area);
}

fn render_entries(frame: &mut Frame, area: Rect, state: &AppState) -> Vec<Rect> {
    let visible = state.visible_players();
    if visible.is_empty() {
        let text = if state.loading {
            "Loading leaderboard..."
        } else {
            "No players found"
        };
        let empty = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return Vec::new();
    }

    if area.height < ENTRY_HEIGHT {
        let empty = Paragraph::new("Leaderboard needs more height")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return Vec::new();
    }

    let rows_fit = (area.height / ENTRY_HEIGHT) as usize;
    let mut areas = Vec::with_capacity(visible.len());
    for (idx, player) in visible.iter().enumerate() {
        let row = idx / GRID_COLUMNS;
        if row >= rows_fit {
            break;
        }
        let col = idx % GRID_COLUMNS;
        let width = area.width / GRID_COLUMNS as u16;
        let cell = Rect {
            x: area.x + col as u16 * width,
            y: area.y + row as u16 * ENTRY_HEIGHT,
            width: width.saturating_sub(1),
            height: ENTRY_HEIGHT,
        };

        let selected = idx == state.cursor;
        let style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        frame.render_widget(
            Paragraph::new(entry_lines(player, state)).style(style),
            cell,
        );
        areas.push(cell);
    }
    areas
}

fn entry_lines(player: &Player, state: &AppState) -> Vec<Line<'static>> {
    let metric = state.variant.metric(player);
    let mut second = vec![
        Span::styled(
            metric.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Winstreak", Style::default().fg(Color::Cyan)),
    ];
    if let Some(clan) = &player.clan {
        second.push(Span::styled(
            format!("  [{clan}]"),
            Style::default().fg(Color::Yellow),
        ));
    }
    let avatar = match state.identifier_for(&player.name) {
        Some(id) => format!("avatar {}", short_id(id)),
        None if state.pending_identifiers.contains(&player.name) => "avatar …".to_string(),
        None => "avatar -".to_string(),
    };
    vec![
        Line::from(vec![
            Span::styled(
                format!("#{:<4}", player.global_rank),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::styled(
                format!(" {}", player.display_name()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(second),
        Line::from(Span::styled(avatar, Style::default().fg(Color::DarkGray))),
    ]
}

fn pager_line(state: &AppState) -> Line<'static> {
    let info = state.page_info();
    let enabled = Style::default();
    let disabled = Style::default().fg(Color::DarkGray);
    let prev_style = if info.page == 1 || state.loading {
        disabled
    } else {
        enabled
    };
    let next_style = if info.page == info.max_page || !info.has_more || state.loading {
        disabled
    } else {
        enabled
    };
    Line::from(vec![
        Span::styled("◀ Prev (p)", prev_style),
        Span::raw(format!("   Page {} of {}   ", info.page, info.max_page)),
        Span::styled("Next (n) ▶", next_style),
    ])
}

fn detail_lines(
    player: &Player,
    identifier: &str,
    resolved: bool,
    config: &AppConfig,
) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::Gray);
    let row = |name: &str, value: String, value_style: Style| {
        Line::from(vec![
            Span::styled(format!("{name:<12}"), label),
            Span::styled(value, value_style),
        ])
    };
    let id_note = if resolved { "" } else { " (fallback)" };
    vec![
        row("Rank:", format!("#{}", player.global_rank), Style::default()),
        row(
            "Current WS:",
            player.winstreak.to_string(),
            Style::default().fg(Color::Green),
        ),
        row(
            "Highest WS:",
            player.highest_winstreak.to_string(),
            Style::default().fg(Color::Yellow),
        ),
        row("Level:", opt_display(player.level), Style::default()),
        row("Kills:", opt_display(player.kills), Style::default()),
        row("Deaths:", opt_display(player.deaths), Style::default()),
        row(
            "K/D:",
            player.kdr_display().unwrap_or_else(|| "N/A".to_string()),
            Style::default(),
        ),
        row("Beds:", opt_display(player.beds), Style::default()),
        row("Wins:", opt_display(player.wins), Style::default()),
        row(
            "Clan:",
            player.clan.clone().unwrap_or_else(|| "N/A".to_string()),
            Style::default(),
        ),
        Line::from(""),
        row(
            "Identifier:",
            format!("{identifier}{id_note}"),
            Style::default().fg(Color::Cyan),
        ),
        row("Skin:", config.skin_url(identifier), Style::default()),
        Line::from(""),
        Line::from(Span::styled(
            "Esc / click outside to close",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_line(state: &AppState) -> Line<'static> {
    if let Some(notice) = &state.notice {
        let style = match notice.kind {
            NoticeKind::Success => Style::default().fg(Color::Green),
            NoticeKind::Failure => Style::default().fg(Color::Red),
        };
        return Line::from(Span::styled(notice.text.clone(), style));
    }
    let hints = match state.input_mode {
        InputMode::Search => "Type to filter | Backspace Delete | Enter/Esc Done",
        InputMode::Normal => {
            "/ Search | r Refresh | t Toggle | n/p Page | 1-0 Jump | j/k Move | Enter Details | ? Help | q Quit"
        }
    };
    Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn rect_contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x
        && x < area.x.saturating_add(area.width)
        && y >= area.y
        && y < area.y.saturating_add(area.height)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "CoralMC Top Winstreak - Help",
        "",
        "  /            Search (Enter/Esc to finish)",
        "  Esc          Clear search / close details",
        "  r            Refresh now",
        "  t            Toggle current / highest",
        "  n / →        Next page",
        "  p / ←        Previous page",
        "  1-9, 0       Jump to page (0 = 10)",
        "  j/k or ↑/↓   Move",
        "  Enter        Player details",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Mouse: click a player to open details,",
        "click outside the details to close them.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
