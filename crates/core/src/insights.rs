//! Rule-based advisories over a computed projection.
//!
//! [`generate_insights`] is the ordered rule list shown under the results.
//! The smaller helpers drive the inline hints next to each input field.

use serde::{Deserialize, Serialize};

use crate::config::{FieldAverages, MarketBenchmark};
use crate::types::{CampaignInputs, FunnelField, Insight, InsightKind, OutcomeMetrics};

/// Run every insight rule in order. Rules are independent, so several can
/// fire for the same projection; the healthy-funnel fallback only fires when
/// none of the benchmark rules did.
///
/// `inputs` must carry the rates the metrics were computed from (the solver's
/// rates in auto mode).
pub fn generate_insights(
    inputs: &CampaignInputs,
    metrics: &OutcomeMetrics,
    benchmark: &MarketBenchmark,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    let rates = &inputs.rates;
    let target = inputs.target_roas;

    if inputs.auto_mode {
        insights.push(if target > 0.0 {
            Insight::info(format!(
                "To reach a {:.2}x ROAS your landing page needs to convert {:.2}% of visits into checkouts.",
                target, rates.conv_lp_pct
            ))
        } else {
            Insight::info(
                "Fill in the target ROAS to see the landing page conversion it requires.",
            )
        });
    }

    let before_rules = insights.len();

    if metrics.cpc > benchmark.cpc * 1.5 {
        insights.push(Insight::warning(format!(
            "CPC of {:.2} is well above the market average of {:.2}. Review targeting and creatives.",
            metrics.cpc, benchmark.cpc
        )));
    }
    if rates.ctr_pct < benchmark.ctr {
        insights.push(Insight::warning(format!(
            "CTR of {:.2}% is below the market average of {:.2}%. The ad is not earning enough clicks.",
            rates.ctr_pct, benchmark.ctr
        )));
    }
    if rates.connect_rate_pct < benchmark.connect_rate {
        insights.push(Insight::warning(format!(
            "Connect rate of {:.2}% is below {:.2}%. Clicks are being lost before the page loads; check page speed.",
            rates.connect_rate_pct, benchmark.connect_rate
        )));
    }
    if metrics.cpa > target * benchmark.cpa_to_target_ratio {
        insights.push(Insight::warning(format!(
            "CPA of {:.2} is high relative to the {:.2}x target.",
            metrics.cpa, target
        )));
    }
    if metrics.roas > target && target > 0.0 {
        insights.push(Insight::success(format!(
            "Projected ROAS of {:.2}x beats the {:.2}x target.",
            metrics.roas, target
        )));
    }

    if insights.len() == before_rules && inputs.spend > 0.0 {
        insights.push(Insight::info(
            "The funnel looks healthy: every stage is at or above market benchmarks.",
        ));
    }

    insights
}

/// A single inline hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: InsightKind,
    pub message: String,
}

fn advisory(kind: InsightKind, message: String) -> Advisory {
    Advisory { kind, message }
}

/// Classify one funnel rate against its market average.
pub fn field_advisory(field: FunnelField, value: f64, averages: &FieldAverages) -> Advisory {
    if value == 0.0 {
        return advisory(
            InsightKind::Info,
            format!("Please fill in {} (zero or greater).", field.label()),
        );
    }

    let avg = match field {
        FunnelField::Ctr => averages.ctr,
        FunnelField::ConnectRate => averages.connect_rate,
        FunnelField::ConvLp => averages.conv_lp,
        FunnelField::ConvCheckout => averages.conv_checkout,
    };

    if value >= avg * 1.5 {
        advisory(
            InsightKind::Success,
            format!("Your result ({value:.2}%) is well above the average ({avg:.2}%)."),
        )
    } else if value >= avg * 0.9 {
        advisory(
            InsightKind::Info,
            format!("Your result ({value:.2}%) is within the average ({avg:.2}%)."),
        )
    } else {
        advisory(
            InsightKind::Warning,
            format!("Your result ({value:.2}%) is below the average ({avg:.2}%)."),
        )
    }
}

/// Banner shown while spend, price or target is still missing.
pub fn campaign_advisory(inputs: &CampaignInputs) -> Option<Advisory> {
    if inputs.spend == 0.0 || inputs.avg_price == 0.0 || inputs.target_roas == 0.0 {
        return Some(advisory(
            InsightKind::Warning,
            "Please fill in the campaign data (all must be greater than zero).".to_string(),
        ));
    }
    None
}

/// Status line comparing the projected ROAS with the target.
pub fn roas_status(metrics: &OutcomeMetrics, target_roas: f64) -> Advisory {
    let roas = metrics.roas;
    if roas == 0.0 || target_roas == 0.0 {
        advisory(
            InsightKind::Info,
            "Waiting for campaign data and target ROAS...".to_string(),
        )
    } else if roas >= target_roas {
        advisory(
            InsightKind::Success,
            format!("Excellent! Your result ({roas:.2}x) meets or beats the target ({target_roas:.2}x)."),
        )
    } else {
        advisory(
            InsightKind::Warning,
            format!("Your result ({roas:.2}x) is below the target ({target_roas:.2}x)."),
        )
    }
}
