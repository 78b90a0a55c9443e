//! Campaign insight dashboard
//!
//! Command line front end: aggregate mapper engagement, compute campaign
//! progress, or build the whole insight dashboard of a campaign.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use campaign_insights::analysis::{CampaignProgress, MalformedPolicy, TimelineAggregator};
use campaign_insights::campaign::Campaign;
use campaign_insights::config::DashboardConfig;
use campaign_insights::dashboard::{run_dashboard, InsightClient, RunOptions};
use campaign_insights::plotting::{render_engagement, ChartRenderer, DatasetCollector, PngChartRenderer};
use campaign_insights::types::{parse_date, CampaignWindow, ContributionRecord};

#[derive(Parser, Debug)]
#[command(author, version, about = "Campaign insight dashboard", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/campaign-insights/config.json)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate contributor records into activity series and a histogram
    Engagement(EngagementArgs),
    /// Show how far a campaign has progressed
    Progress(ProgressArgs),
    /// Fetch every insight of a campaign and build the dashboard report
    Dashboard(DashboardArgs),
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Directory for chart images
    #[arg(long, value_hint = ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// Skip writing chart images
    #[arg(long)]
    no_charts: bool,
}

#[derive(Args, Debug)]
struct EngagementArgs {
    /// JSON array of contributor records (`-` for stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Campaign start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Campaign end date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Fail on a malformed timeline instead of skipping the contributor
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    charts: ChartArgs,
}

#[derive(Args, Debug)]
struct ProgressArgs {
    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,

    /// Evaluate as of this date instead of today
    #[arg(long)]
    today: Option<String>,
}

#[derive(Args, Debug)]
struct DashboardArgs {
    /// Campaign uuid
    uuid: String,

    /// Folder with campaign documents
    #[arg(long, value_hint = ValueHint::DirPath)]
    campaigns_folder: Option<PathBuf>,

    /// Campaign server root URL
    #[arg(long)]
    base_url: Option<String>,

    /// Viewing user
    #[arg(long)]
    username: Option<String>,

    /// Evaluate progress as of this date instead of today
    #[arg(long)]
    today: Option<String>,

    #[command(flatten)]
    charts: ChartArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = DashboardConfig::load_or_default(cli.config.as_deref())
        .context("loading configuration")?;

    match cli.command {
        Command::Engagement(args) => engagement(&config, args),
        Command::Progress(args) => progress(args),
        Command::Dashboard(args) => {
            let rt = Runtime::new().context("starting tokio runtime")?;
            rt.block_on(dashboard(config, args))
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 if cfg!(feature = "dev") => "debug",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn engagement(config: &DashboardConfig, args: EngagementArgs) -> Result<()> {
    let records = read_records(&args.input)?;
    let window = CampaignWindow::parse(args.start.as_deref(), args.end.as_deref())?;
    let policy = if args.strict {
        MalformedPolicy::Abort
    } else {
        MalformedPolicy::Skip
    };

    let summary = TimelineAggregator::new(window)
        .with_policy(policy)
        .aggregate(&records)?;

    if window.is_set() {
        let mut renderer = chart_renderer(config, &args.charts);
        render_engagement(renderer.as_mut(), &summary)?;
        for chart in renderer.outputs() {
            info!(chart = %chart, "rendered");
        }
    }

    print_json(&summary)
}

fn progress(args: ProgressArgs) -> Result<()> {
    let window = CampaignWindow::parse(args.start.as_deref(), args.end.as_deref())?;
    let today = today_or(args.today.as_deref())?;
    let progress = CampaignProgress::evaluate(&window, today);
    info!(status = %progress, "campaign progress");
    print_json(&progress)
}

async fn dashboard(mut config: DashboardConfig, args: DashboardArgs) -> Result<()> {
    if let Some(folder) = args.campaigns_folder {
        config.campaigns_folder = folder;
    }
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(username) = args.username {
        config.username = username;
    }

    let campaign = Campaign::load(&config.campaigns_folder, &args.uuid)
        .with_context(|| format!("loading campaign {}", args.uuid))?;
    let client = InsightClient::new(&config.base_url, &campaign.uuid, config.request_timeout())?;
    let options = RunOptions {
        username: config.username.clone(),
        max_concurrent_fetches: config.max_concurrent_fetches,
        today: today_or(args.today.as_deref())?,
    };

    let mut renderer = chart_renderer(&config, &args.charts);
    let report = run_dashboard(&client, &campaign, renderer.as_mut(), &options).await?;
    print_json(&report)
}

fn chart_renderer(config: &DashboardConfig, args: &ChartArgs) -> Box<dyn ChartRenderer> {
    if args.no_charts {
        return Box::new(DatasetCollector::new(config.chart.max_points));
    }
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    Box::new(PngChartRenderer::new(output_dir, config.chart.clone()))
}

fn read_records(input: &Path) -> Result<Vec<ContributionRecord>> {
    let content = if input == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading stdin")?;
        buffer
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };
    serde_json::from_str(&content).context("parsing contributor records")
}

fn today_or(value: Option<&str>) -> Result<NaiveDate> {
    match value {
        Some(text) => Ok(parse_date(text)?),
        None => Ok(Utc::now().date_naive()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
