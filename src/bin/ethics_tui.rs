use std::io;
use std::path::Path;
use std::time::Duration;

use crossterm::{event, execute, terminal};
use ratatui::prelude::*;
use ratatui::widgets::*;

use ethics_dashboard::clients::SimulatorClient;
use ethics_dashboard::config::Config;
use ethics_dashboard::dashboard::{DashboardState, DashboardView};
use ethics_dashboard::frameworks::Framework;
use ethics_dashboard::results::compare::badge_label;
use ethics_dashboard::results::export::{DEFAULT_EXPORT_FILE, export_to_file};

const RUNNING_STATUS: &str = "Running...";

/// Columns the `s` key cycles through on the selected table.
const SORT_KEYS: [&str; 6] = ["id", "name", "gender", "department", "experience", "test_score"];

struct App {
    state: DashboardState,
    client: SimulatorClient,
    runtime: tokio::runtime::Runtime,
    cursor: usize,
    status: String,
}

impl App {
    fn refresh_scenarios(&mut self) {
        let result = self
            .runtime
            .block_on(self.state.load_scenarios(&self.client));
        self.status = match result {
            Ok(()) => format!("{} scenarios", self.state.scenarios.len()),
            Err(e) => e.to_string(),
        };
    }

    fn select_current(&mut self) {
        let Some(id) = self.state.scenarios.get(self.cursor).map(|s| s.id) else {
            return;
        };
        let result = self
            .runtime
            .block_on(self.state.select_scenario(&self.client, id));
        self.status = match result {
            Ok(()) => format!("Scenario {} loaded", id),
            Err(e) => e.to_string(),
        };
    }

    fn run(&mut self) {
        let result = self.runtime.block_on(self.state.run(&self.client));
        self.status = match result {
            Ok(()) => format!("{} framework results", self.state.results().len()),
            Err(e) => e.to_string(),
        };
    }

    fn export(&mut self) {
        if self.state.results().is_empty() {
            self.status = "Nothing to export yet".to_string();
            return;
        }
        self.status = match export_to_file(Path::new(DEFAULT_EXPORT_FILE), self.state.results()) {
            Ok(n) => format!("Exported {} rows to {}", n, DEFAULT_EXPORT_FILE),
            Err(e) => e.to_string(),
        };
    }

    fn next_sort(&mut self) {
        let pos = SORT_KEYS
            .iter()
            .position(|k| *k == self.state.sort.key)
            .unwrap_or(0);
        self.state.sort_by(SORT_KEYS[(pos + 1) % SORT_KEYS.len()]);
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    // stderr shares the terminal, so only log when asked to
    if std::env::var("RUST_LOG").is_ok() {
        ethics_dashboard::init_tracing(&config.runtime.log_level);
    }

    let mut app = App {
        state: DashboardState::new(&config),
        client: SimulatorClient::from_config(&config),
        runtime: tokio::runtime::Runtime::new()?,
        cursor: 0,
        status: String::new(),
    };
    app.refresh_scenarios();

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    loop {
        draw(&mut terminal, &app)?;

        if event::poll(Duration::from_millis(200))? {
            if let event::Event::Key(k) = event::read()? {
                use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers};
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match k.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Up => app.cursor = app.cursor.saturating_sub(1),
                    KeyCode::Down => {
                        if app.cursor + 1 < app.state.scenarios.len() {
                            app.cursor += 1;
                        }
                    }
                    KeyCode::Enter => app.select_current(),
                    KeyCode::Char('r') => {
                        // the request blocks the loop, so show the status first
                        app.status = RUNNING_STATUS.to_string();
                        draw(&mut terminal, &app)?;
                        app.run();
                    }
                    KeyCode::Char('l') => app.refresh_scenarios(),
                    KeyCode::Char('1') => app.state.toggle_framework(Framework::Utilitarian),
                    KeyCode::Char('2') => app.state.toggle_framework(Framework::Fairness),
                    KeyCode::Char('3') => app.state.toggle_framework(Framework::RuleBased),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.state.adjust_top_k(1),
                    KeyCode::Char('-') => app.state.adjust_top_k(-1),
                    KeyCode::Char('e') => app.export(),
                    KeyCode::Char('s') => app.next_sort(),
                    KeyCode::Char('a') => app.state.toggle_show_all_records(),
                    _ => {}
                }
            }
        }
    }

    terminal::disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::LeaveAlternateScreen)?;
    Ok(())
}

fn draw<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> io::Result<()> {
    let view = app.state.view();
    terminal.draw(|f| ui(f, app, &view))?;
    Ok(())
}

fn framework_color(fw: Framework) -> Color {
    match fw {
        Framework::Utilitarian => Color::Green,
        Framework::Fairness => Color::Blue,
        Framework::RuleBased => Color::Yellow,
    }
}

fn check(b: bool) -> &'static str {
    if b { "✓" } else { "" }
}

fn ui(f: &mut Frame, app: &App, view: &DashboardView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(11),
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(f.size());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "AI Ethics Simulator",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::raw(format!("Backend: {}", app.client.base_url())),
        Span::raw("  |  "),
        Span::raw(
            app.state
                .selected_scenario()
                .map(|s| format!("{} ({})", s.name, s.kind))
                .unwrap_or_else(|| "No scenario selected".to_string()),
        ),
        Span::raw("  |  "),
        Span::raw(app.status.clone()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("Overview"));
    f.render_widget(header, chunks[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);
    render_configuration(f, app, top[0]);
    render_metrics(f, view, top[1]);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);
    render_badges(f, view, mid[0]);
    render_tradeoff(f, view, mid[1]);

    let mut lines = vec![Line::styled(
        view.summary_insight.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    lines.extend(view.narrative.iter().map(|t| Line::raw(format!("• {}", t))));
    if let Some(err) = &view.error {
        lines.push(Line::styled(err.clone(), Style::default().fg(Color::Red)));
    }
    let summary = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Summary Insight"))
        .wrap(Wrap { trim: true });
    f.render_widget(summary, chunks[3]);

    if view.selected.is_empty() {
        render_records(f, view, chunks[4]);
    } else {
        render_selected(f, app, view, chunks[4]);
    }

    let help = Paragraph::new(vec![Line::raw(
        "Keys: q/Esc quit • ↑/↓ Enter pick scenario • r run • 1/2/3 toggle frameworks • +/- top k • s sort • a all records • e export • l reload",
    )])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(help, chunks[5]);
}

fn render_configuration(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Configuration");
    f.render_widget(block, area);
    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(4)])
        .margin(1)
        .split(area);

    let items: Vec<ListItem> = app
        .state
        .scenarios
        .iter()
        .map(|s| {
            let marker = if app.state.scenario_id == Some(s.id) { "●" } else { " " };
            ListItem::new(format!("{} {} ({})", marker, s.name, s.kind))
        })
        .collect();
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(app.cursor));
    }
    let list = List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, inner[0], &mut list_state);

    let toggles: Vec<String> = Framework::ALL
        .iter()
        .enumerate()
        .map(|(i, fw)| {
            let on = if app.state.frameworks.is_enabled(*fw) { "x" } else { " " };
            format!("{}[{}] {}", i + 1, on, fw.spaced_tag())
        })
        .collect();
    let weights: Vec<String> = app
        .state
        .params
        .weights
        .iter()
        .map(|(k, v)| format!("{}={:.2}", k, v))
        .collect();
    let params = Paragraph::new(vec![
        Line::raw(format!("Top K: {}", app.state.params.top_k)),
        Line::raw(format!("Weights: {}", weights.join(" · "))),
        Line::raw(toggles.join("  ")),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(params, inner[1]);
}

fn render_metrics(f: &mut Frame, view: &DashboardView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Key Metrics");
    f.render_widget(block, area);
    let inner = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .margin(1)
        .split(area);

    for (bar, rect) in view.bars.iter().zip(inner.iter()) {
        let kpi = view
            .kpis
            .iter()
            .find(|k| k.framework == bar.framework)
            .map(|k| format!("  KPI {}%", k.percent))
            .unwrap_or_default();
        let gauge = Gauge::default()
            .block(Block::default().title(format!("{}{}", bar.label, kpi)))
            .gauge_style(Style::default().fg(framework_color(bar.framework)))
            .percent(bar.percent.clamp(0, 100) as u16)
            .label(format!("{}%", bar.percent));
        f.render_widget(gauge, *rect);
    }
}

fn render_badges(f: &mut Frame, view: &DashboardView, area: Rect) {
    let rows: Vec<Row> = view
        .comparison_rows
        .iter()
        .map(|r| {
            let badges: Vec<&str> = r.badges.iter().map(|o| badge_label(*o)).collect();
            Row::new(vec![
                r.profile.framework.spaced_tag(),
                r.profile.strength.to_string(),
                r.profile.weakness.to_string(),
                badges.join(", "),
            ])
            .style(Style::default().fg(framework_color(r.profile.framework)))
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(20),
            Constraint::Length(32),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["Framework", "Strength", "Weakness", "Badges"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Framework Comparison Summary"),
    );
    f.render_widget(table, area);
}

fn render_tradeoff(f: &mut Frame, view: &DashboardView, area: Rect) {
    let data: Vec<(&str, u64)> = view
        .tradeoff
        .iter()
        .map(|(fw, v)| (fw.as_str(), (v.max(0.0) * 100.0) as u64))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Trade-off (score ×100)"),
        )
        .data(data.as_slice())
        .bar_width(11)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan));
    f.render_widget(chart, area);
}

fn render_selected(f: &mut Frame, app: &App, view: &DashboardView, area: Rect) {
    let sort = &app.state.sort;
    let title = format!(
        "Top Selected Candidates (sort: {} {})",
        sort.key,
        sort.direction.arrow()
    );
    let rows: Vec<Row> = view
        .selected
        .iter()
        .map(|r| {
            Row::new(vec![
                r.label(),
                r.column("gender"),
                r.column("department"),
                r.column("experience"),
                r.column("test_score"),
                check(r.utilitarian).to_string(),
                check(r.fairness).to_string(),
                check(r.rule_based).to_string(),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Ratio(1, 8); 8])
        .header(
            Row::new(vec![
                "Candidate",
                "Gender",
                "Dept",
                "Experience",
                "Test Score",
                "Utilitarian",
                "Fairness",
                "Rule-based",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, area);
}

fn render_records(f: &mut Frame, view: &DashboardView, area: Rect) {
    let records = &view.records;
    let columns = view.record_columns;
    let mut header: Vec<String> = columns.iter().map(|c| c.replace('_', " ")).collect();
    header.push("Selected?".to_string());
    let rows: Vec<Row> = records
        .rows
        .iter()
        .map(|(entity, selected)| {
            let mut cells: Vec<String> = columns.iter().map(|c| entity.display(c)).collect();
            cells.push(check(*selected).to_string());
            Row::new(cells)
        })
        .collect();
    let widths = vec![Constraint::Ratio(1, header.len() as u32); header.len()];
    let table = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Records Preview (showing {} of {})",
            records.shown, records.total
        )));
    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let config = Config::default();
        App {
            state: DashboardState::new(&config),
            client: SimulatorClient::new("http://127.0.0.1:9/api"),
            runtime: tokio::runtime::Runtime::new().unwrap(),
            cursor: 0,
            status: String::new(),
        }
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_running_status_is_drawn_before_request() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(160, 40)).unwrap();
        app.status = RUNNING_STATUS.to_string();
        draw(&mut terminal, &app).unwrap();
        assert!(screen(&terminal).contains(RUNNING_STATUS));
    }

    #[test]
    fn test_status_reports_failed_run() {
        let mut app = app();
        app.run();
        assert_eq!(app.status, "Please select a scenario.");
    }
}
