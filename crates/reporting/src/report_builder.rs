//! Report builder — CSV and JSON exports of a projection, plus the plain-text
//! outline of the campaign planning report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use roas_core::solver::SolveOutcome;
use roas_core::types::InsightKind;
use roas_core::{Projection, ProjectorError, ProjectorResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = ProjectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ProjectorError::Validation(format!(
                "unknown export format '{other}'"
            ))),
        }
    }
}

/// Monetary fields and ratios: two decimals.
pub fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Counts of people or events: no decimals.
pub fn count(value: f64) -> String {
    format!("{value:.0}")
}

pub const CSV_COLUMNS: [&str; 17] = [
    "Product",
    "Spend",
    "Avg Price",
    "Target ROAS",
    "CPM",
    "CTR (%)",
    "Connect Rate (%)",
    "Conv LP (%)",
    "Conv Checkout (%)",
    "Projected ROAS",
    "Revenue",
    "Sales",
    "CPA",
    "Impressions",
    "Clicks",
    "LP Visits",
    "Checkouts",
];

const GLOSSARY: [(&str, &str); 8] = [
    ("ROAS", "Return on ad spend. Revenue generated for each unit of currency spent."),
    ("CPA", "Cost per acquisition. Average cost to win one customer."),
    ("CPC", "Cost per click. Amount paid for each ad click."),
    ("CPM", "Cost per mille. Cost to show the ad one thousand times."),
    ("CTR", "Click-through rate. Share of impressions that turn into clicks."),
    ("Connect Rate", "Share of clicks that load the landing page."),
    ("Conv. LP", "Landing page conversion. Share of visitors who start checkout."),
    ("Conv. Checkout", "Share of started checkouts that complete the purchase."),
];

// ─── Builder ────────────────────────────────────────────────────────────────

pub struct ReportBuilder {
    product_name: String,
}

impl ReportBuilder {
    pub fn new(product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
        }
    }

    fn product_label(&self) -> &str {
        if self.product_name.trim().is_empty() {
            "Not provided"
        } else {
            &self.product_name
        }
    }

    /// Suggested file stem, spaces replaced by underscores.
    pub fn file_stem(&self, prefix: &str) -> String {
        let product = self.product_name.trim();
        if product.is_empty() {
            format!("{prefix}_campaign")
        } else {
            format!("{prefix}_{}", product.replace(' ', "_"))
        }
    }

    /// Header plus one data row.
    pub fn export_csv(&self, projection: &Projection) -> String {
        let inputs = &projection.inputs;
        let rates = &inputs.rates;
        let m = &projection.metrics;

        let mut csv = CSV_COLUMNS.join(",");
        csv.push('\n');

        let cells = [
            format!("\"{}\"", self.product_name.replace('"', "\"\"")),
            money(inputs.spend),
            money(inputs.avg_price),
            money(inputs.target_roas),
            money(rates.cpm),
            money(rates.ctr_pct),
            money(rates.connect_rate_pct),
            money(rates.conv_lp_pct),
            money(rates.conv_checkout_pct),
            money(m.roas),
            money(m.revenue),
            count(m.sales),
            money(m.cpa),
            count(m.impressions),
            count(m.clicks),
            count(m.visits),
            count(m.checkouts),
        ];
        csv.push_str(&cells.join(","));
        csv.push('\n');
        csv
    }

    pub fn export_json(&self, projection: &Projection) -> ProjectorResult<String> {
        let mut value = serde_json::to_value(projection)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "product".to_string(),
                serde_json::Value::String(self.product_name.clone()),
            );
        }
        Ok(serde_json::to_string_pretty(&value)?)
    }

    /// Plain-text outline of the planning report: cover, inputs, results,
    /// diagnosis, conversion table, next steps and glossary.
    pub fn outline(&self, projection: &Projection, issued_on: NaiveDate) -> String {
        let inputs = &projection.inputs;
        let rates = &inputs.rates;
        let m = &projection.metrics;
        let auto = inputs.auto_mode;
        let mut out = String::new();

        // writeln! into a String cannot fail
        let _ = writeln!(out, "CAMPAIGN PLANNING REPORT");
        let _ = writeln!(out, "Target ROAS: {}x", money(inputs.target_roas));
        let _ = writeln!(out, "Product: {}", self.product_label());
        let _ = writeln!(out, "Issued on: {}", issued_on.format("%Y-%m-%d"));

        section(&mut out, "Executive summary");
        if auto {
            let _ = writeln!(
                out,
                "This plan sets performance goals for reaching the target ROAS of {}x. The funnel \
                 rates below are the KPIs the campaign needs to hit.",
                money(inputs.target_roas)
            );
        } else {
            let _ = writeln!(
                out,
                "This report projects results from the funnel rates provided for \"{}\".",
                self.product_label()
            );
        }
        if let Some(note) = shortfall_note(projection) {
            let _ = writeln!(out, "{note}");
        }

        section(
            &mut out,
            if auto { "Campaign target metrics" } else { "Campaign metrics" },
        );
        row(&mut out, "Spend", money(inputs.spend));
        row(&mut out, "Average price", money(inputs.avg_price));
        row(&mut out, "Target ROAS", format!("{}x", money(inputs.target_roas)));
        row(&mut out, "CPM", money(rates.cpm));
        row(&mut out, "CTR", format!("{}%", money(rates.ctr_pct)));
        row(&mut out, "Connect rate", format!("{}%", money(rates.connect_rate_pct)));
        row(&mut out, "Conv. LP", format!("{}%", money(rates.conv_lp_pct)));
        row(&mut out, "Conv. Checkout", format!("{}%", money(rates.conv_checkout_pct)));

        section(&mut out, "Projected results");
        row(&mut out, "Projected ROAS", format!("{}x", money(m.roas)));
        row(&mut out, "Revenue", money(m.revenue));
        row(&mut out, "Sales", count(m.sales));
        row(&mut out, "CPA", money(m.cpa));

        section(&mut out, "Funnel diagnosis");
        if projection.insights.is_empty() {
            let _ = writeln!(out, "No specific insight generated.");
        }
        for insight in &projection.insights {
            let tag = match insight.kind {
                InsightKind::Success => "[STRENGTH]",
                InsightKind::Warning => "[ATTENTION]",
                InsightKind::Info => "[NOTE]",
            };
            let _ = writeln!(out, "{tag} {}", insight.message);
        }

        section(&mut out, "Funnel conversion rates");
        let overall = if m.visits > 0.0 {
            m.sales / m.visits * 100.0
        } else {
            0.0
        };
        row(&mut out, "Visits to checkouts", format!("{}%", money(rates.conv_lp_pct)));
        row(&mut out, "Checkouts to sales", format!("{}%", money(rates.conv_checkout_pct)));
        row(&mut out, "Visits to sales (overall)", format!("{}%", money(overall)));

        section(&mut out, "Suggested next steps");
        let _ = writeln!(
            out,
            "Focus on the metrics flagged for attention. Small gains early in the funnel, such as \
             CTR, compound into the final result. Track the campaign closely and use these figures \
             as a guide for ongoing optimization."
        );

        section(&mut out, "Glossary");
        for (term, meaning) in GLOSSARY {
            row(&mut out, term, meaning.to_string());
        }

        debug!(bytes = out.len(), "report outline rendered");
        out
    }

    /// Render the outline into `<dir>/<stem>.txt` and return the path.
    pub fn write_outline(
        &self,
        dir: &Path,
        projection: &Projection,
        issued_on: NaiveDate,
    ) -> ProjectorResult<PathBuf> {
        let path = dir.join(format!("{}.txt", self.file_stem("roas_report")));
        std::fs::write(&path, self.outline(projection, issued_on))?;
        debug!(path = %path.display(), "report outline written");
        Ok(path)
    }
}

/// One-line explanation of why the derived rates miss the target, if they do.
pub fn shortfall_note(projection: &Projection) -> Option<String> {
    let report = projection.goal_seek.as_ref()?;
    let gap = money(report.shortfall?);
    let note = if report.limited_by_ceilings() {
        format!("Note: even at the realistic ceilings the plan projects {gap}x below target.")
    } else if report.outcome == SolveOutcome::NoBaselineSales {
        format!(
            "Note: the baseline rates project no sales, so there is nothing to scale; \
             the plan projects {gap}x below target."
        )
    } else {
        format!("Note: the derived rates project {gap}x below target.")
    };
    Some(note)
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n== {title} ==");
}

fn row(out: &mut String, label: &str, value: String) {
    let _ = writeln!(out, "{label:<28}{value}");
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use roas_core::types::{CampaignInputs, FunnelRates};
    use roas_core::{Benchmarks, RoasProjector};

    fn projection(auto_mode: bool) -> Projection {
        RoasProjector::default().project(&CampaignInputs {
            spend: 1000.0,
            avg_price: 50.0,
            target_roas: 4.0,
            rates: FunnelRates {
                cpm: 10.0,
                ctr_pct: 2.0,
                connect_rate_pct: 85.0,
                conv_lp_pct: 5.0,
                conv_checkout_pct: 85.0,
            },
            auto_mode,
        })
    }

    #[test]
    fn test_formatting_helpers() {
        assert_eq!(money(3612.5), "3612.50");
        assert_eq!(money(13.840830), "13.84");
        assert_eq!(count(72.25), "72");
        assert_eq!(count(100_000.0), "100000");
    }

    #[test]
    fn test_csv_export() {
        let csv = ReportBuilder::new("Online \"Pro\" Course").export_csv(&projection(false));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Product,Spend,"));
        assert!(lines[1].starts_with("\"Online \"\"Pro\"\" Course\",1000.00,50.00,4.00,10.00,"));
        assert!(lines[1].contains(",3.61,3612.50,72,13.84,100000,2000,1700,85"));
        assert_eq!(lines[1].matches(',').count(), CSV_COLUMNS.len() - 1);
    }

    #[test]
    fn test_json_export() {
        let json = ReportBuilder::new("Course").export_json(&projection(true)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["product"], "Course");
        assert!(parsed["metrics"]["sales"].as_f64().unwrap() > 72.25);
        assert!(parsed["goal_seek"].is_object());
    }

    #[test]
    fn test_outline_manual() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let text = ReportBuilder::new("").outline(&projection(false), date);
        assert!(text.contains("Product: Not provided"));
        assert!(text.contains("Issued on: 2026-10-19"));
        assert!(text.contains("== Campaign metrics =="));
        assert!(text.contains("[ATTENTION] CPA"));
        assert!(text.contains("Visits to sales (overall)   4.25%"));
        assert!(text.contains("== Glossary =="));
    }

    #[test]
    fn test_outline_auto() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let text = ReportBuilder::new("Course").outline(&projection(true), date);
        assert!(text.contains("== Campaign target metrics =="));
        assert!(text.contains("[NOTE] To reach a 4.00x ROAS"));
        assert!(!text.contains("Note: even at the realistic ceilings"));
    }

    #[test]
    fn test_outline_explains_missing_baseline_sales() {
        let benchmarks = Benchmarks {
            baseline: FunnelRates {
                ctr_pct: 0.0,
                ..FunnelRates::BENCHMARK
            },
            ..Benchmarks::default()
        };
        let mut inputs = projection(true).inputs;
        inputs.rates = FunnelRates::default();
        let projection = RoasProjector::new(benchmarks).project(&inputs);
        assert!(projection.falls_short());

        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let text = ReportBuilder::new("Course").outline(&projection, date);
        assert!(text.contains("Note: the baseline rates project no sales"));
        assert!(!text.contains("realistic ceilings"));
    }

    #[test]
    fn test_write_outline_to_directory() {
        let dir = std::env::temp_dir().join(format!("roas-report-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();

        let path = ReportBuilder::new("Pro Course")
            .write_outline(&dir, &projection(false), date)
            .unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert!(path.ends_with("roas_report_Pro_Course.txt"));
        assert!(written.starts_with("CAMPAIGN PLANNING REPORT"));

        let missing = std::env::temp_dir().join("roas-report-missing-dir/nested");
        assert!(matches!(
            ReportBuilder::new("x").write_outline(&missing, &projection(false), date),
            Err(ProjectorError::Io(_))
        ));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(
            ReportBuilder::new("Pro Course").file_stem("roas_projection"),
            "roas_projection_Pro_Course"
        );
        assert_eq!(ReportBuilder::new(" ").file_stem("report"), "report_campaign");
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
