//! Forward funnel model: spend and funnel rates in, outcome metrics out.
//!
//! Every stage is the previous stage times a probability, so a zero anywhere
//! collapses everything downstream of it. Degenerate divisions yield 0.

use crate::types::{CampaignInputs, OutcomeMetrics};

/// Anything that can project outcome metrics from campaign inputs. The solver
/// takes one of these instead of re-deriving the funnel formulas.
pub trait FunnelModel {
    fn evaluate(&self, inputs: &CampaignInputs) -> OutcomeMetrics;
}

/// The multiplicative funnel described by [`compute`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardFunnel;

impl FunnelModel for ForwardFunnel {
    fn evaluate(&self, inputs: &CampaignInputs) -> OutcomeMetrics {
        compute(inputs)
    }
}

impl<F> FunnelModel for F
where
    F: Fn(&CampaignInputs) -> OutcomeMetrics,
{
    fn evaluate(&self, inputs: &CampaignInputs) -> OutcomeMetrics {
        self(inputs)
    }
}

/// Project outcome metrics for one snapshot of inputs.
///
/// Rates arrive on the percent scale and are converted to fractions here and
/// nowhere else.
pub fn compute(inputs: &CampaignInputs) -> OutcomeMetrics {
    let spend = inputs.spend;
    let rates = &inputs.rates;

    let ctr = rates.ctr_pct / 100.0;
    let connect_rate = rates.connect_rate_pct / 100.0;
    let conv_lp = rates.conv_lp_pct / 100.0;
    let conv_checkout = rates.conv_checkout_pct / 100.0;

    let impressions = finite(if rates.cpm > 0.0 {
        spend / rates.cpm * 1000.0
    } else {
        0.0
    });
    let clicks = finite(impressions * ctr);
    let cpc = if clicks > 0.0 { finite(spend / clicks) } else { 0.0 };
    let visits = finite(clicks * connect_rate);
    let checkouts = finite(visits * conv_lp);
    let sales = finite(checkouts * conv_checkout);
    let revenue = finite(sales * inputs.avg_price);
    let roas = if spend > 0.0 { finite(revenue / spend) } else { 0.0 };
    let cpa = if sales > 0.0 { finite(spend / sales) } else { 0.0 };
    let landing_page_rate = if visits > 0.0 {
        finite(checkouts / visits * 100.0)
    } else {
        0.0
    };

    OutcomeMetrics {
        impressions,
        clicks,
        cpc,
        visits,
        checkouts,
        sales,
        revenue,
        roas,
        cpa,
        landing_page_rate,
    }
}

/// Overflowed stages count as 0 so they cannot turn into NaN downstream.
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
