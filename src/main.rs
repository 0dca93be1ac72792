use analytics::{
    Anomaly, AnomalyDetector, DescriptiveStats, ExecutiveSummary, Insight, InsightGenerator,
    Prediction, PredictionEngine, StatisticsEngine, Trend,
};
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Settings, SummaryOptions};
use core_types::DataSeries;
use serde::Serialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod demo;

use demo::DemoKind;

/// The main entry point for the Pulse analytics application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = configuration::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    let _guard = init_tracing(&settings)?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, settings)?,
        Commands::Summary(args) => handle_summary(args, settings)?,
        Commands::Demo(args) => handle_demo(args)?,
        Commands::Serve(args) => handle_serve(args, settings).await?,
    }

    Ok(())
}

/// Logs go to stderr so that JSON on stdout stays machine-readable. When a log
/// directory is configured, a daily rolling file is written as well.
fn init_tracing(settings: &Settings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .context("Invalid logging level")?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    match &settings.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "pulse.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            registry
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            registry.init();
            Ok(None)
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Statistics, anomaly detection, forecasts and insights for business time series.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every analysis on a single series.
    Analyze(AnalyzeArgs),
    /// Build an executive summary across several series.
    Summary(SummaryArgs),
    /// Print a deterministic synthetic series as JSON.
    Demo(DemoArgs),
    /// Start the HTTP API.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// A JSON file holding one series (`{"name": ..., "data": [...]}`).
    #[arg(long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Number of future periods to forecast.
    #[arg(long)]
    horizon: Option<usize>,

    /// Z-score threshold for anomaly detection.
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Parser)]
struct SummaryArgs {
    /// One or more series files.
    #[arg(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Label for the summary period (e.g. "T1 2024").
    #[arg(long)]
    period: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[derive(Parser)]
struct DemoArgs {
    #[arg(long, value_enum, default_value_t = DemoKind::Sales)]
    kind: DemoKind,

    #[arg(long, default_value_t = 90, value_parser = clap::value_parser!(u16).range(1..))]
    points: u16,

    /// Series name; defaults to the kind's French label.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.host` from the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port` from the configuration.
    #[arg(long)]
    port: Option<u16>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Everything `analyze` computes for one series.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisReport {
    series: String,
    stats: Option<DescriptiveStats>,
    trend: Trend,
    anomalies: Vec<Anomaly>,
    predictions: Vec<Prediction>,
    insights: Vec<Insight>,
}

fn read_series(path: &Path) -> anyhow::Result<DataSeries> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read series file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse series file {}", path.display()))
}

fn handle_analyze(args: AnalyzeArgs, mut settings: Settings) -> anyhow::Result<()> {
    if let Some(horizon) = args.horizon {
        settings.prediction.horizon = horizon;
    }
    if let Some(threshold) = args.threshold {
        settings.detection.threshold = threshold;
    }

    let series = read_series(&args.input)?;
    tracing::info!(series = %series.name, points = series.len(), "Analyzing series.");

    let engine = PredictionEngine::new();
    let generator =
        InsightGenerator::with_options(settings.detection.clone(), settings.prediction.clone());
    let report = AnalysisReport {
        series: series.name.clone(),
        stats: StatisticsEngine::new().describe(&series.values()),
        trend: engine.analyze_trend(&series)?,
        anomalies: AnomalyDetector::new().detect_anomalies(&series, &settings.detection)?,
        predictions: engine.predict(&series, &settings.prediction)?,
        insights: generator.generate_insights(&series, &settings.insights)?,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn handle_summary(args: SummaryArgs, settings: Settings) -> anyhow::Result<()> {
    let series = args
        .input
        .iter()
        .map(|path| read_series(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let generator = InsightGenerator::with_options(settings.detection, settings.prediction);
    let summary = generator.generate_executive_summary(
        &series,
        &SummaryOptions {
            period: args.period,
            insights: settings.insights,
        },
    )?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Table => print_summary(&summary),
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> anyhow::Result<()> {
    let name = args
        .name
        .unwrap_or_else(|| args.kind.default_name().to_string());
    let series = demo::generate(args.kind, usize::from(args.points), &name);
    println!("{}", serde_json::to_string_pretty(&series)?);
    Ok(())
}

async fn handle_serve(args: ServeArgs, settings: Settings) -> anyhow::Result<()> {
    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("Invalid listen address {host}:{port}"))?;
    web_server::run_server(addr, settings).await
}

// ==============================================================================
// Table Rendering
// ==============================================================================

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

fn print_report(report: &AnalysisReport) {
    println!("Série : {}", report.series);

    if let Some(stats) = &report.stats {
        let mut table = new_table(vec!["Statistique", "Valeur"]);
        for (name, value) in [
            ("Points", stats.count as f64),
            ("Minimum", stats.min),
            ("Maximum", stats.max),
            ("Moyenne", stats.mean),
            ("Médiane", stats.median),
            ("Écart-type", stats.standard_deviation),
            ("Asymétrie", stats.skewness),
            ("Kurtosis", stats.kurtosis),
        ] {
            table.add_row(vec![name.to_string(), format!("{value:.2}")]);
        }
        println!("{table}");
    }

    let trend = &report.trend;
    let mut table = new_table(vec!["Tendance", "Pente", "R²", "Variation", "Saisonnalité"]);
    let seasonality = if trend.seasonality.detected {
        format!("période {}", trend.seasonality.period)
    } else {
        "aucune".to_string()
    };
    table.add_row(vec![
        format!("{:?}", trend.direction),
        format!("{:.3}", trend.slope),
        format!("{:.3}", trend.r_squared),
        format!("{:+.1}%", trend.change_rate * 100.0),
        seasonality,
    ]);
    println!("{table}");

    if !report.anomalies.is_empty() {
        let mut table = new_table(vec!["Date", "Type", "Valeur", "Attendu", "Écart", "Sévérité"]);
        for anomaly in &report.anomalies {
            table.add_row(vec![
                anomaly.timestamp.format("%Y-%m-%d").to_string(),
                anomaly.kind.label().to_string(),
                format!("{:.2}", anomaly.value),
                format!("{:.2}", anomaly.expected_value),
                format!("{:+.1}%", anomaly.deviation),
                format!("{:?}", anomaly.severity),
            ]);
        }
        println!("{table}");
    }

    if !report.predictions.is_empty() {
        let mut table = new_table(vec!["Date", "Prévision", "Intervalle", "Confiance", "Modèle"]);
        for prediction in &report.predictions {
            table.add_row(vec![
                prediction.target_date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", prediction.predicted_value),
                format!("[{:.2}, {:.2}]", prediction.lower_bound, prediction.upper_bound),
                format!("{:.0}%", prediction.confidence * 100.0),
                prediction.model.to_string(),
            ]);
        }
        println!("{table}");
    }

    print_insights(&report.insights);
}

fn print_insights(insights: &[Insight]) {
    if insights.is_empty() {
        return;
    }
    let mut table = new_table(vec!["Priorité", "Type", "Titre", "Description"]);
    for insight in insights {
        table.add_row(vec![
            format!("{:?}", insight.priority),
            format!("{:?}", insight.kind),
            insight.title.clone(),
            insight.description.clone(),
        ]);
    }
    println!("{table}");
}

fn print_summary(summary: &ExecutiveSummary) {
    println!("Période : {}", summary.period);

    let mut table = new_table(vec!["Indicateur", "Valeur", "Variation", "Statut"]);
    for metric in &summary.key_metrics {
        table.add_row(vec![
            metric.name.clone(),
            format!("{:.2}", metric.value),
            format!("{:+.1}%", metric.change),
            format!("{:?}", metric.status),
        ]);
    }
    println!("{table}");

    for (title, lines) in [
        ("Points clés", &summary.highlights),
        ("Risques", &summary.risks),
        ("Opportunités", &summary.opportunities),
        ("Recommandations", &summary.recommendations),
    ] {
        if lines.is_empty() {
            continue;
        }
        println!("{title} :");
        for line in lines {
            println!("  - {line}");
        }
    }

    print_insights(&summary.top_insights);
}
