use serde::{Deserialize, Serialize};

/// The five funnel rates a campaign is described by. Everything except `cpm`
/// is on the percent scale (0..100) as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FunnelRates {
    #[serde(default)]
    pub cpm: f64,
    #[serde(default)]
    pub ctr_pct: f64,
    #[serde(default)]
    pub connect_rate_pct: f64,
    #[serde(default)]
    pub conv_lp_pct: f64,
    #[serde(default)]
    pub conv_checkout_pct: f64,
}

impl FunnelRates {
    /// Market-average rates used when a field is left empty in auto mode.
    pub const BENCHMARK: FunnelRates = FunnelRates {
        cpm: 15.0,
        ctr_pct: 2.5,
        connect_rate_pct: 85.0,
        conv_lp_pct: 5.0,
        conv_checkout_pct: 85.0,
    };

    /// Take each rate from `self` unless it is zero, in which case fall back
    /// to the matching rate in `fallback`.
    pub fn or_fallback(&self, fallback: &FunnelRates) -> FunnelRates {
        let pick = |value: f64, default: f64| if value != 0.0 { value } else { default };
        FunnelRates {
            cpm: pick(self.cpm, fallback.cpm),
            ctr_pct: pick(self.ctr_pct, fallback.ctr_pct),
            connect_rate_pct: pick(self.connect_rate_pct, fallback.connect_rate_pct),
            conv_lp_pct: pick(self.conv_lp_pct, fallback.conv_lp_pct),
            conv_checkout_pct: pick(self.conv_checkout_pct, fallback.conv_checkout_pct),
        }
    }
}

/// One immutable snapshot of what the user entered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CampaignInputs {
    pub spend: f64,
    pub avg_price: f64,
    pub target_roas: f64,
    pub rates: FunnelRates,
    /// When set the rates are derived from `target_roas` instead of typed.
    #[serde(default)]
    pub auto_mode: bool,
}

impl CampaignInputs {
    pub fn with_rates(&self, rates: FunnelRates) -> Self {
        Self { rates, ..*self }
    }
}

/// The eight campaign fields exactly as they were typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCampaignForm {
    pub spend: String,
    pub avg_price: String,
    pub target_roas: String,
    pub cpm: String,
    pub ctr: String,
    pub connect_rate: String,
    pub conv_lp: String,
    pub conv_checkout: String,
}

impl RawCampaignForm {
    pub fn parse(&self, auto_mode: bool) -> CampaignInputs {
        CampaignInputs {
            spend: parse_decimal(&self.spend),
            avg_price: parse_decimal(&self.avg_price),
            target_roas: parse_decimal(&self.target_roas),
            rates: FunnelRates {
                cpm: parse_decimal(&self.cpm),
                ctr_pct: parse_decimal(&self.ctr),
                connect_rate_pct: parse_decimal(&self.connect_rate),
                conv_lp_pct: parse_decimal(&self.conv_lp),
                conv_checkout_pct: parse_decimal(&self.conv_checkout),
            },
            auto_mode,
        }
    }
}

/// Lenient number parsing for form fields.
///
/// Accepts a comma as decimal separator and reads the longest numeric prefix
/// (`"12,5 %"` is 12.5). Empty, unparsable, non-finite and negative values
/// all become `0.0`.
pub fn parse_decimal(raw: &str) -> f64 {
    let normalized = raw.trim().replacen(',', ".", 1);
    match numeric_prefix(&normalized).parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

fn numeric_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // "5." is fine, a lone "." is not
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return "";
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    &s[..end]
}

/// Everything the forward model derives from one set of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomeMetrics {
    pub impressions: f64,
    pub clicks: f64,
    pub cpc: f64,
    pub visits: f64,
    pub checkouts: f64,
    pub sales: f64,
    pub revenue: f64,
    pub roas: f64,
    pub cpa: f64,
    /// Checkouts per visit, percent scale.
    pub landing_page_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Warning,
    Success,
    Info,
}

/// A classified advisory message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
}

impl Insight {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: InsightKind::Warning,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: InsightKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: InsightKind::Info,
            message: message.into(),
        }
    }
}

/// Rate fields that get their own inline advisory next to the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelField {
    Ctr,
    ConnectRate,
    ConvLp,
    ConvCheckout,
}

impl FunnelField {
    pub const ALL: [FunnelField; 4] = [
        FunnelField::Ctr,
        FunnelField::ConnectRate,
        FunnelField::ConvLp,
        FunnelField::ConvCheckout,
    ];

    pub fn value_in(&self, rates: &FunnelRates) -> f64 {
        match self {
            FunnelField::Ctr => rates.ctr_pct,
            FunnelField::ConnectRate => rates.connect_rate_pct,
            FunnelField::ConvLp => rates.conv_lp_pct,
            FunnelField::ConvCheckout => rates.conv_checkout_pct,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FunnelField::Ctr => "CTR",
            FunnelField::ConnectRate => "Connect Rate",
            FunnelField::ConvLp => "Conv. LP",
            FunnelField::ConvCheckout => "Conv. Checkout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_accepts_comma_separator() {
        assert!((parse_decimal("12,5") - 12.5).abs() < f64::EPSILON);
        assert!((parse_decimal(" 1000.25 ") - 1000.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_decimal_reads_numeric_prefix() {
        assert!((parse_decimal("2.5%") - 2.5).abs() < f64::EPSILON);
        assert!((parse_decimal("3x") - 3.0).abs() < f64::EPSILON);
        assert!((parse_decimal("1e3 BRL") - 1000.0).abs() < f64::EPSILON);
        assert!((parse_decimal("5.") - 5.0).abs() < f64::EPSILON);
        assert!((parse_decimal(".5") - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_decimal_defaults_to_zero() {
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal("."), 0.0);
        assert_eq!(parse_decimal("-10"), 0.0);
        assert_eq!(parse_decimal("inf"), 0.0);
    }

    #[test]
    fn test_or_fallback_only_replaces_zeros() {
        let current = FunnelRates {
            cpm: 10.0,
            ctr_pct: 0.0,
            connect_rate_pct: 70.0,
            conv_lp_pct: 0.0,
            conv_checkout_pct: 90.0,
        };
        let merged = current.or_fallback(&FunnelRates::BENCHMARK);
        assert_eq!(merged.cpm, 10.0);
        assert_eq!(merged.ctr_pct, 2.5);
        assert_eq!(merged.connect_rate_pct, 70.0);
        assert_eq!(merged.conv_lp_pct, 5.0);
        assert_eq!(merged.conv_checkout_pct, 90.0);
    }

    #[test]
    fn test_raw_form_parse() {
        let form = RawCampaignForm {
            spend: "1.000".into(),
            avg_price: "49,90".into(),
            target_roas: "3".into(),
            cpm: "".into(),
            ctr: "1,5".into(),
            connect_rate: "80".into(),
            conv_lp: "two".into(),
            conv_checkout: "75".into(),
        };
        let inputs = form.parse(true);
        assert!((inputs.spend - 1.0).abs() < f64::EPSILON);
        assert!((inputs.avg_price - 49.9).abs() < 1e-9);
        assert_eq!(inputs.rates.cpm, 0.0);
        assert!((inputs.rates.ctr_pct - 1.5).abs() < f64::EPSILON);
        assert_eq!(inputs.rates.conv_lp_pct, 0.0);
        assert!(inputs.auto_mode);
    }
}
