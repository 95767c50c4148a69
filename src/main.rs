use anyhow::Result;
use clap::{Parser, Subcommand};
use prettytable::{Table, row};
use std::path::PathBuf;

use ethics_dashboard::clients::{SimulationBackend, SimulatorClient};
use ethics_dashboard::config::Config;
use ethics_dashboard::dashboard::{DashboardState, DashboardView, parse_frameworks, parse_weight};
use ethics_dashboard::frameworks::{Framework, FrameworkToggles};
use ethics_dashboard::results::compare::badge_label;
use ethics_dashboard::results::export::{DEFAULT_EXPORT_FILE, export_to_file};
use ethics_dashboard::results::selection::RecordsPreview;
use ethics_dashboard::scenario::ScenarioKind;

#[derive(Parser)]
#[command(name = "ethics-dashboard")]
#[command(about = "Compare utilitarian, fairness-aware and rule-based decisions on a scenario")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available scenarios
    Scenarios,
    /// Show scenario details and a records preview
    Show {
        /// Scenario id
        id: i64,
        /// Show every record instead of the preview
        #[arg(long)]
        all: bool,
    },
    /// Run a simulation and print the comparison
    Simulate {
        /// Scenario id
        #[arg(long)]
        scenario: i64,
        /// Number of entities each framework selects (1-50)
        #[arg(long)]
        top_k: Option<i64>,
        /// Weight override, repeatable (key=value, -1..1)
        #[arg(long = "weight")]
        weights: Vec<String>,
        /// Framework to run, repeatable (utilitarian, fairness, rule_based); default all
        #[arg(long = "framework")]
        frameworks: Vec<String>,
        /// Write metrics to CSV (default file name when given without a value)
        #[arg(long, num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_FILE)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    ethics_dashboard::init_tracing(&config.runtime.log_level);
    let client = SimulatorClient::from_config(&config);
    tracing::debug!("Using simulation backend at {}", client.base_url());

    let mut state = DashboardState::new(&config);

    match cli.command {
        Commands::Scenarios => {
            state.load_scenarios(&client).await?;
            list_scenarios(&state);
        }
        Commands::Show { id, all } => {
            state.show_all_records = all;
            state.select_scenario(&client, id).await?;
            show_scenario(&state);
        }
        Commands::Simulate {
            scenario,
            top_k,
            weights,
            frameworks,
            export,
        } => {
            // Validate inputs before any network call
            let overrides = weights
                .iter()
                .map(|w| parse_weight(w))
                .collect::<ethics_dashboard::Result<Vec<_>>>()?;
            state.frameworks = FrameworkToggles::from_list(&parse_frameworks(&frameworks)?);

            if let Err(e) = simulate(&mut state, &client, scenario, top_k, &overrides).await {
                if e.is_user_facing() {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
                return Err(e.into());
            }
            print_results(&state.view());

            if let Some(path) = export {
                let count = export_to_file(&path, state.results())?;
                println!("\nExported {} metric rows to {}", count, path.display());
            }
        }
    }

    Ok(())
}

async fn simulate(
    state: &mut DashboardState,
    backend: &dyn SimulationBackend,
    scenario: i64,
    top_k: Option<i64>,
    overrides: &[(String, f64)],
) -> ethics_dashboard::Result<()> {
    state.select_scenario(backend, scenario).await?;
    if let Some(k) = top_k {
        state.set_top_k(k);
    }
    for (key, value) in overrides {
        state.set_weight(key, *value);
    }
    state.run(backend).await
}

fn list_scenarios(state: &DashboardState) {
    if state.scenarios.is_empty() {
        println!("No scenarios available.");
        return;
    }
    let mut table = Table::new();
    table.add_row(row!["ID", "Name", "Type", "Description"]);
    for s in &state.scenarios {
        table.add_row(row![
            s.id,
            s.name,
            s.kind,
            s.description.clone().unwrap_or_default()
        ]);
    }
    table.printstd();
}

fn show_scenario(state: &DashboardState) {
    let Some(detail) = &state.detail else {
        return;
    };
    let kind = ScenarioKind::from_tag(detail.type_tag());
    println!(
        "Scenario {}: {} ({})",
        state.scenario_id.unwrap_or_default(),
        detail.name.clone().unwrap_or_else(|| "-".to_string()),
        kind
    );
    println!("Entities: {}", detail.config.entities.len());
    println!("Top K: {}", state.params.top_k);
    let weights: Vec<String> = state
        .params
        .weights
        .iter()
        .map(|(k, v)| format!("{}={:.2}", k, v))
        .collect();
    if !weights.is_empty() {
        println!("Weights: {}", weights.join(" · "));
    }
    println!();
    print_records(&state.view().records, kind.record_columns());
}

fn bar(value: f64) -> String {
    let filled = (value * 20.0).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled.min(20)))
}

fn mark(selected: bool) -> &'static str {
    if selected { "✓" } else { "" }
}

fn print_records(records: &RecordsPreview, columns: &[&str]) {
    if records.total == 0 {
        return;
    }
    println!("Records Preview (showing {} of {} records)", records.shown, records.total);
    let mut table = Table::new();
    let mut header: Vec<String> = columns.iter().map(|c| c.replace('_', " ")).collect();
    header.push("Selected?".to_string());
    table.set_titles(header.into_iter().collect());
    for (entity, selected) in &records.rows {
        let mut cells: Vec<String> = columns.iter().map(|c| entity.display(c)).collect();
        cells.push(mark(*selected).to_string());
        table.add_row(cells.into_iter().collect());
    }
    table.printstd();
}

fn print_results(view: &DashboardView) {
    if let Some(err) = &view.error {
        println!("Error: {}", err);
    }

    println!("Key Metrics");
    for b in &view.bars {
        println!("  {:<28} {} {:>3}%  {}", b.label, bar(b.value), b.percent, b.description);
    }
    for line in &view.comparison_text {
        println!("  • {}", line);
    }

    if !view.kpis.is_empty() {
        println!();
        let mut table = Table::new();
        table.set_titles(view.kpis.iter().map(|k| k.label.clone()).collect());
        table.add_row(view.kpis.iter().map(|k| format!("{}%", k.percent)).collect());
        table.printstd();
    }

    println!("\nTrade-off (raw scores)");
    for (fw, score) in &view.tradeoff {
        println!("  {:<12} {:.3}", fw.as_str(), score);
    }

    println!("\nFramework Comparison Summary");
    let mut table = Table::new();
    table.add_row(row!["Framework", "Strength", "Weakness", "Badges"]);
    for r in &view.comparison_rows {
        let badges: Vec<&str> = r.badges.iter().map(|o| badge_label(*o)).collect();
        table.add_row(row![
            r.profile.framework.spaced_tag(),
            r.profile.strength,
            r.profile.weakness,
            badges.join(", ")
        ]);
    }
    table.printstd();

    println!("\nSummary Insight\n  {}", view.summary_insight);

    println!("\nMetrics & Explanations");
    for panel in &view.explanations {
        println!("  [{}]", panel.title);
        for line in panel.metrics_json.lines() {
            println!("    {}", line);
        }
        if let Some(text) = &panel.explanation {
            println!("    {}", text);
        }
    }
    for line in &view.narrative {
        println!("  • {}", line);
    }

    if !view.selected.is_empty() {
        println!("\nTop Selected Candidates");
        let mut table = Table::new();
        table.add_row(row![
            "Candidate",
            "Gender",
            "Dept",
            "Experience",
            "Test Score",
            "Utilitarian",
            "Fairness",
            "Rule-based"
        ]);
        for r in &view.selected {
            table.add_row(row![
                r.label(),
                r.column("gender"),
                r.column("department"),
                r.column("experience"),
                r.column("test_score"),
                mark(r.selected_by(Framework::Utilitarian)),
                mark(r.selected_by(Framework::Fairness)),
                mark(r.selected_by(Framework::RuleBased))
            ]);
        }
        table.printstd();
    }

    println!();
    print_records(&view.records, view.record_columns);
}
