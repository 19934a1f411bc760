//! Goal-seeking solver for auto mode.
//!
//! Given a target ROAS, back-derives the funnel rates needed to reach it.
//! The required gain in sales is split geometrically across the three
//! conversion levers (CTR, Conv-LP, Conv-Checkout) since sales is linear in
//! their product. CPM and connect rate are never touched.
//!
//! This is a single closed-form pass. When a lever hits its ceiling the
//! returned rates can project a ROAS below target; [`goal_seek`] reports that
//! shortfall instead of re-solving.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LeverCeilings;
use crate::funnel::FunnelModel;
use crate::types::{CampaignInputs, FunnelRates};

/// Relative slack before a projected ROAS counts as missing its target.
const SHORTFALL_TOLERANCE: f64 = 1e-9;

/// Levers the solver is allowed to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lever {
    Ctr,
    ConvLp,
    ConvCheckout,
}

/// Which branch of the solver produced the rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveOutcome {
    /// Spend, price or target missing; benchmark rates returned.
    MissingCampaignData,
    /// Baseline projects no sales, nothing to scale from.
    NoBaselineSales,
    /// Baseline already reaches the target.
    TargetAlreadyMet,
    /// Levers scaled by the cube-root multiplier.
    Scaled,
}

/// Everything [`goal_seek`] learned while deriving the rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSeekReport {
    pub outcome: SolveOutcome,
    pub rates: FunnelRates,
    pub sales_needed: f64,
    pub sales_at_baseline: f64,
    /// Per-lever multiplier before clamping; 1.0 when nothing was scaled.
    pub multiplier: f64,
    pub clamped: Vec<Lever>,
    /// ROAS the returned rates actually project.
    pub projected_roas: f64,
    /// `target - projected` when the rates fall short, else `None`.
    pub shortfall: Option<f64>,
}

impl GoalSeekReport {
    /// The target was missed because at least one lever hit its ceiling.
    pub fn limited_by_ceilings(&self) -> bool {
        self.shortfall.is_some()
            && self.outcome == SolveOutcome::Scaled
            && !self.clamped.is_empty()
    }
}

/// Derive funnel rates that reach `target_roas`.
pub fn solve_for_target(
    spend: f64,
    avg_price: f64,
    target_roas: f64,
    current: &FunnelRates,
    benchmark: &FunnelRates,
    ceilings: &LeverCeilings,
    model: &impl FunnelModel,
) -> FunnelRates {
    goal_seek(spend, avg_price, target_roas, current, benchmark, ceilings, model).rates
}

/// Same pass as [`solve_for_target`], plus a check of what the result
/// projects.
pub fn goal_seek(
    spend: f64,
    avg_price: f64,
    target_roas: f64,
    current: &FunnelRates,
    benchmark: &FunnelRates,
    ceilings: &LeverCeilings,
    model: &impl FunnelModel,
) -> GoalSeekReport {
    let campaign = CampaignInputs {
        spend,
        avg_price,
        target_roas,
        rates: *benchmark,
        auto_mode: true,
    };

    if !(spend > 0.0 && avg_price > 0.0 && target_roas > 0.0) {
        debug!(spend, avg_price, target_roas, "campaign data incomplete, using benchmark rates");
        return finish(
            SolveOutcome::MissingCampaignData,
            *benchmark,
            0.0,
            0.0,
            1.0,
            Vec::new(),
            &campaign,
            model,
        );
    }

    let sales_needed = spend * target_roas / avg_price;
    let baseline = current.or_fallback(benchmark);
    let sales_at_baseline = model.evaluate(&campaign.with_rates(baseline)).sales;

    if sales_at_baseline <= 0.0 {
        return finish(
            SolveOutcome::NoBaselineSales,
            baseline,
            sales_needed,
            sales_at_baseline,
            1.0,
            Vec::new(),
            &campaign,
            model,
        );
    }
    if sales_needed <= sales_at_baseline {
        return finish(
            SolveOutcome::TargetAlreadyMet,
            baseline,
            sales_needed,
            sales_at_baseline,
            1.0,
            Vec::new(),
            &campaign,
            model,
        );
    }

    let improvement = sales_needed / sales_at_baseline;
    let multiplier = improvement.cbrt();

    let mut clamped = Vec::new();
    let mut scale = |lever: Lever, value: f64, ceiling: f64| {
        let scaled = value * multiplier;
        if scaled > ceiling {
            clamped.push(lever);
            ceiling
        } else {
            scaled
        }
    };
    let rates = FunnelRates {
        cpm: baseline.cpm,
        ctr_pct: scale(Lever::Ctr, baseline.ctr_pct, ceilings.ctr_pct),
        connect_rate_pct: baseline.connect_rate_pct,
        conv_lp_pct: scale(Lever::ConvLp, baseline.conv_lp_pct, ceilings.conv_lp_pct),
        conv_checkout_pct: scale(
            Lever::ConvCheckout,
            baseline.conv_checkout_pct,
            ceilings.conv_checkout_pct,
        ),
    };

    debug!(
        sales_needed,
        sales_at_baseline,
        multiplier,
        clamped = clamped.len(),
        "scaled funnel levers toward target"
    );

    finish(
        SolveOutcome::Scaled,
        rates,
        sales_needed,
        sales_at_baseline,
        multiplier,
        clamped,
        &campaign,
        model,
    )
}

#[allow(clippy::too_many_arguments)]
fn finish(
    outcome: SolveOutcome,
    rates: FunnelRates,
    sales_needed: f64,
    sales_at_baseline: f64,
    multiplier: f64,
    clamped: Vec<Lever>,
    campaign: &CampaignInputs,
    model: &impl FunnelModel,
) -> GoalSeekReport {
    let projected_roas = model.evaluate(&campaign.with_rates(rates)).roas;
    let target = campaign.target_roas;

    // Only meaningful when there was a real target to reach.
    let shortfall = (outcome != SolveOutcome::MissingCampaignData
        && target > 0.0
        && target - projected_roas > target * SHORTFALL_TOLERANCE)
        .then(|| target - projected_roas);

    if let Some(gap) = shortfall {
        warn!(
            target_roas = target,
            projected_roas,
            gap,
            ?clamped,
            "derived rates fall short of target ROAS"
        );
    }

    GoalSeekReport {
        outcome,
        rates,
        sales_needed,
        sales_at_baseline,
        multiplier,
        clamped,
        projected_roas,
        shortfall,
    }
}
