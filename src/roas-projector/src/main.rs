//! ROAS Projector — projects ad funnel results from spend and funnel rates,
//! or derives the rates needed to hit a target ROAS.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roas_core::config::AppConfig;
use roas_core::insights::{campaign_advisory, field_advisory, roas_status};
use roas_core::types::{FunnelField, InsightKind, RawCampaignForm};
use roas_core::{Projection, RoasProjector};
use roas_reporting::report_builder::{count, money, shortfall_note};
use roas_reporting::{build_prompt, funnel_series, Assistant, ChartKind, ExportFormat, ReportBuilder};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "roas-projector")]
#[command(about = "Project ROAS, CPA and revenue across an ad funnel")]
#[command(version)]
struct Cli {
    /// TOML config file with benchmark overrides
    #[arg(long, env = "ROAS_PROJECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, default_value_t = false)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the funnel projection and insights
    Project {
        #[command(flatten)]
        form: FormArgs,

        /// Output format: text, csv, json
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,

        /// Product name used in exports (overrides config)
        #[arg(short, long)]
        product: Option<String>,

        /// Also print the funnel chart series: bar, doughnut, line
        #[arg(long)]
        chart: Option<ChartKind>,
    },

    /// Render the plain-text campaign planning report
    Report {
        #[command(flatten)]
        form: FormArgs,

        /// Product name shown on the cover (overrides config)
        #[arg(short, long)]
        product: Option<String>,

        /// Write the report to <stem>.txt in this directory instead of stdout
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Build the AI-assistant prompt for a projection
    Prompt {
        #[command(flatten)]
        form: FormArgs,

        /// Assistant: gemini, chatgpt, jasper, semrush, surfer (overrides config)
        #[arg(short, long)]
        assistant: Option<Assistant>,
    },

    /// Print the effective benchmark tables
    Benchmarks,
}

/// Campaign fields, taken verbatim and parsed leniently ("49,90" is fine).
#[derive(Args, Debug)]
struct FormArgs {
    #[arg(long, default_value = "")]
    spend: String,
    #[arg(long, default_value = "")]
    avg_price: String,
    #[arg(long, default_value = "")]
    target_roas: String,
    #[arg(long, default_value = "")]
    cpm: String,
    /// CTR in percent
    #[arg(long, default_value = "")]
    ctr: String,
    /// Connect rate in percent
    #[arg(long, default_value = "")]
    connect_rate: String,
    /// Landing page to checkout conversion in percent
    #[arg(long, default_value = "")]
    conv_lp: String,
    /// Checkout completion in percent
    #[arg(long, default_value = "")]
    conv_checkout: String,

    /// Derive CTR, Conv. LP and Conv. Checkout from the target ROAS
    #[arg(long, default_value_t = false)]
    auto: bool,
}

impl FormArgs {
    fn to_form(&self) -> RawCampaignForm {
        RawCampaignForm {
            spend: self.spend.clone(),
            avg_price: self.avg_price.clone(),
            target_roas: self.target_roas.clone(),
            cpm: self.cpm.clone(),
            ctr: self.ctr.clone(),
            connect_rate: self.connect_rate.clone(),
            conv_lp: self.conv_lp.clone(),
            conv_checkout: self.conv_checkout.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "roas_projector=info,roas_core=info".into());
    if cli.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    match cli.command {
        Commands::Project {
            form,
            format,
            product,
            chart,
        } => {
            let projector = RoasProjector::new(config.benchmarks.clone());
            let raw = form.to_form();
            let inputs = raw.parse(form.auto);
            let projection = projector.project(&inputs);
            let product = product.unwrap_or(config.report.product_name.clone());
            let builder = ReportBuilder::new(product);

            match format {
                ExportFormat::Text => print_text(&projector, &projection),
                ExportFormat::Csv => print!("{}", builder.export_csv(&projection)),
                ExportFormat::Json => println!("{}", builder.export_json(&projection)?),
            }
            if let Some(kind) = chart {
                print_chart(&projection, kind);
            }
        }
        Commands::Report {
            form,
            product,
            out_dir,
        } => {
            let projector = RoasProjector::new(config.benchmarks.clone());
            let projection = projector.project(&form.to_form().parse(form.auto));
            let builder =
                ReportBuilder::new(product.unwrap_or(config.report.product_name.clone()));
            let today = chrono::Local::now().date_naive();

            match out_dir {
                Some(dir) => {
                    let path = builder.write_outline(&dir, &projection, today)?;
                    info!(path = %path.display(), "report written");
                }
                None => print!("{}", builder.outline(&projection, today)),
            }
        }
        Commands::Prompt { form, assistant } => {
            let projector = RoasProjector::new(config.benchmarks.clone());
            let projection = projector.project(&form.to_form().parse(form.auto));
            let assistant = match assistant {
                Some(a) => a,
                None => config.report.default_assistant.parse()?,
            };

            let prompt = build_prompt(&projection)?;
            println!("{prompt}");
            match assistant.launch_url(&prompt)? {
                Some(url) => {
                    info!(assistant = assistant.display_name(), "prompt link ready");
                    println!("Open in {}: {url}", assistant.display_name());
                }
                None => println!(
                    "{} does not accept prompts by link; copy the text above manually.",
                    assistant.display_name()
                ),
            }
        }
        Commands::Benchmarks => {
            println!("{}", serde_json::to_string_pretty(&config.benchmarks)?);
        }
    }

    Ok(())
}

fn marker(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Warning => "!",
        InsightKind::Success => "+",
        InsightKind::Info => "i",
    }
}

fn print_text(projector: &RoasProjector, projection: &Projection) {
    let inputs = &projection.inputs;
    let m = &projection.metrics;

    if let Some(advisory) = campaign_advisory(inputs) {
        println!("[{}] {}\n", marker(advisory.kind), advisory.message);
    }

    println!("Funnel rates{}:", if inputs.auto_mode { " (derived)" } else { "" });
    println!("  CPM             {}", money(inputs.rates.cpm));
    for field in FunnelField::ALL {
        let value = field.value_in(&inputs.rates);
        let advisory = field_advisory(field, value, &projector.benchmarks().field_averages);
        println!(
            "  {:<15} {:>7}%  [{}] {}",
            field.label(),
            money(value),
            marker(advisory.kind),
            advisory.message
        );
    }

    let status = roas_status(m, inputs.target_roas);
    println!("\nROAS: {}x  [{}] {}", money(m.roas), marker(status.kind), status.message);

    println!("\nEstimated results:");
    println!("  Impressions       {}", count(m.impressions));
    println!("  Clicks            {}", count(m.clicks));
    println!("  CPC               {}", money(m.cpc));
    println!("  LP visits         {}", count(m.visits));
    println!("  Checkouts         {}", count(m.checkouts));
    println!("  Sales             {}", count(m.sales));
    println!("  CPA               {}", money(m.cpa));
    println!("  Revenue           {}", money(m.revenue));
    println!("  LP rate (%)       {}", money(m.landing_page_rate));

    if let Some(note) = shortfall_note(projection) {
        println!("\n{note}");
    }

    println!("\nInsights:");
    for insight in &projection.insights {
        println!("  [{}] {}", marker(insight.kind), insight.message);
    }
}

fn print_chart(projection: &Projection, kind: ChartKind) {
    let series = funnel_series(&projection.metrics, kind);
    if series.is_empty() {
        println!("\nFill in the campaign data to see the funnel.");
        return;
    }
    println!("\n{} ({:?}):", series.title, series.kind);
    for (point, retained) in series.points.iter().zip(series.retention_pct()) {
        println!(
            "  {:<20} {:>10}  {:>6}%",
            point.label,
            count(point.value),
            money(retained)
        );
    }
}
