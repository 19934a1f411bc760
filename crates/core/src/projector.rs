//! One evaluation of the whole engine: solve (auto mode only), compute,
//! classify.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Benchmarks;
use crate::funnel::{compute, ForwardFunnel};
use crate::insights::generate_insights;
use crate::solver::{goal_seek, GoalSeekReport};
use crate::types::{CampaignInputs, Insight, OutcomeMetrics};

/// Final object handed to every consumer (charts, exports, prompts).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Inputs echoed with the rates the metrics were actually computed from.
    pub inputs: CampaignInputs,
    pub metrics: OutcomeMetrics,
    pub insights: Vec<Insight>,
    /// Present in auto mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_seek: Option<GoalSeekReport>,
}

impl Projection {
    /// The derived rates could not reach the target ROAS.
    pub fn falls_short(&self) -> bool {
        self.goal_seek
            .as_ref()
            .is_some_and(|report| report.shortfall.is_some())
    }
}

/// Holds the read-only benchmark tables and runs evaluations against them.
#[derive(Debug, Clone)]
pub struct RoasProjector {
    benchmarks: Benchmarks,
}

impl RoasProjector {
    pub fn new(benchmarks: Benchmarks) -> Self {
        info!(
            ctr_ceiling = benchmarks.ceilings.ctr_pct,
            conv_lp_ceiling = benchmarks.ceilings.conv_lp_pct,
            conv_checkout_ceiling = benchmarks.ceilings.conv_checkout_pct,
            "ROAS projector initialized"
        );
        Self { benchmarks }
    }

    pub fn benchmarks(&self) -> &Benchmarks {
        &self.benchmarks
    }

    pub fn project(&self, inputs: &CampaignInputs) -> Projection {
        let goal_seek = inputs.auto_mode.then(|| {
            goal_seek(
                inputs.spend,
                inputs.avg_price,
                inputs.target_roas,
                &inputs.rates,
                &self.benchmarks.baseline,
                &self.benchmarks.ceilings,
                &ForwardFunnel,
            )
        });

        let effective = match &goal_seek {
            Some(report) => inputs.with_rates(report.rates),
            None => *inputs,
        };
        let metrics = compute(&effective);
        let insights = generate_insights(&effective, &metrics, &self.benchmarks.market);

        debug!(
            auto_mode = inputs.auto_mode,
            sales = metrics.sales,
            roas = metrics.roas,
            insights = insights.len(),
            "projection computed"
        );

        Projection {
            inputs: effective,
            metrics,
            insights,
            goal_seek,
        }
    }
}

impl Default for RoasProjector {
    fn default() -> Self {
        Self::new(Benchmarks::default())
    }
}
