//! Prompt export for third-party AI assistants.
//!
//! Serializes a projection into free text and, for assistants that accept a
//! prompt through their URL, builds the link that opens it pre-filled.

use std::fmt::Write as _;
use std::str::FromStr;

use roas_core::types::InsightKind;
use roas_core::{Projection, ProjectorError, ProjectorResult};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::report_builder::money;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assistant {
    #[default]
    Gemini,
    ChatGpt,
    Jasper,
    Semrush,
    Surfer,
}

impl Assistant {
    pub fn display_name(&self) -> &'static str {
        match self {
            Assistant::Gemini => "Gemini",
            Assistant::ChatGpt => "ChatGPT",
            Assistant::Jasper => "Jasper AI",
            Assistant::Semrush => "Semrush AI",
            Assistant::Surfer => "Surfer AI",
        }
    }

    /// Whether the prompt can be handed over in the URL. The rest need a
    /// manual copy and paste.
    pub fn accepts_url_prompt(&self) -> bool {
        matches!(self, Assistant::Gemini | Assistant::ChatGpt)
    }

    /// Link that opens the assistant with `prompt` filled in, or `None` when
    /// the assistant has no such entry point.
    pub fn launch_url(&self, prompt: &str) -> ProjectorResult<Option<Url>> {
        if !self.accepts_url_prompt() {
            return Ok(None);
        }
        let parsed = match self {
            Assistant::Gemini => {
                Url::parse_with_params("https://gemini.google.com/app", &[("prompt", prompt)])
            }
            Assistant::ChatGpt => Url::parse_with_params(
                "https://chat.openai.com/",
                &[("model", "gpt-4o"), ("message", prompt)],
            ),
            Assistant::Jasper | Assistant::Semrush | Assistant::Surfer => return Ok(None),
        };
        parsed
            .map(Some)
            .map_err(|e| ProjectorError::Validation(format!("invalid assistant url: {e}")))
    }
}

impl FromStr for Assistant {
    type Err = ProjectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "chatgpt" | "openai" => Ok(Self::ChatGpt),
            "jasper" => Ok(Self::Jasper),
            "semrush" => Ok(Self::Semrush),
            "surfer" => Ok(Self::Surfer),
            other => Err(ProjectorError::Validation(format!(
                "unknown assistant '{other}'"
            ))),
        }
    }
}

/// Free-text prompt asking for a funnel review of `projection`.
pub fn build_prompt(projection: &Projection) -> ProjectorResult<String> {
    let inputs = &projection.inputs;
    if inputs.spend <= 0.0 {
        return Err(ProjectorError::Validation(
            "fill in the campaign data before exporting".to_string(),
        ));
    }
    let rates = &inputs.rates;
    let m = &projection.metrics;
    let mut out = String::new();

    // writeln! into a String cannot fail
    let _ = writeln!(
        out,
        "Hello, I need a sales funnel analysis and optimization suggestions based on the following data:"
    );
    let _ = writeln!(out, "\n**Campaign data:**");
    let _ = writeln!(out, "- Spend: {}", money(inputs.spend));
    let _ = writeln!(out, "- Average product price: {}", money(inputs.avg_price));
    let _ = writeln!(out, "- Target ROAS: {}x", money(inputs.target_roas));
    let _ = writeln!(out, "- Projected ROAS: {}x", money(m.roas));
    let _ = writeln!(out, "- Click-through rate (CTR): {}%", money(rates.ctr_pct));
    let _ = writeln!(
        out,
        "- Landing page visits (Connect Rate): {}%",
        money(rates.connect_rate_pct)
    );
    let _ = writeln!(out, "- Landing page conversion: {}%", money(rates.conv_lp_pct));
    let _ = writeln!(out, "- Checkout conversion: {}%", money(rates.conv_checkout_pct));

    let _ = writeln!(out, "\n**Critical funnel analysis:**");
    if projection.insights.is_empty() {
        let _ = writeln!(out, "- No specific findings.");
    }
    for insight in &projection.insights {
        let tag = match insight.kind {
            InsightKind::Warning => "attention",
            InsightKind::Success => "strength",
            InsightKind::Info => "note",
        };
        let _ = writeln!(out, "- ({tag}) {}", insight.message);
    }

    let _ = writeln!(out, "\nBased on this data, please help me with:");
    let _ = writeln!(out, "1. A detailed analysis of my sales funnel.");
    let _ = writeln!(
        out,
        "2. Optimization suggestions for the metrics listed in the critical funnel analysis."
    );
    let _ = writeln!(
        out,
        "3. A projection of how small funnel improvements could affect ROAS."
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use roas_core::types::{CampaignInputs, FunnelRates};
    use roas_core::RoasProjector;

    fn projection(spend: f64) -> Projection {
        RoasProjector::default().project(&CampaignInputs {
            spend,
            avg_price: 50.0,
            target_roas: 4.0,
            rates: FunnelRates {
                cpm: 10.0,
                ctr_pct: 2.0,
                connect_rate_pct: 85.0,
                conv_lp_pct: 5.0,
                conv_checkout_pct: 85.0,
            },
            auto_mode: false,
        })
    }

    #[test]
    fn test_prompt_contains_data_and_insights() {
        let prompt = build_prompt(&projection(1000.0)).unwrap();
        assert!(prompt.contains("- Spend: 1000.00"));
        assert!(prompt.contains("- Projected ROAS: 3.61x"));
        assert!(prompt.contains("- (attention) CPA of 13.84"));
        assert!(prompt.ends_with("affect ROAS.\n"));
    }

    #[test]
    fn test_prompt_requires_spend() {
        assert!(build_prompt(&projection(0.0)).is_err());
    }

    #[test]
    fn test_launch_url_encodes_prompt() {
        let url = Assistant::Gemini
            .launch_url("ROAS 3x & more")
            .unwrap()
            .unwrap();
        assert_eq!(url.host_str(), Some("gemini.google.com"));
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "prompt");
        assert_eq!(value, "ROAS 3x & more");
        assert!(!url.as_str().contains(' '));

        let url = Assistant::ChatGpt.launch_url("hi").unwrap().unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("model".to_string(), "gpt-4o".to_string()),
                ("message".to_string(), "hi".to_string())
            ]
        );
    }

    #[test]
    fn test_copy_only_assistants() {
        for assistant in [Assistant::Jasper, Assistant::Semrush, Assistant::Surfer] {
            assert!(!assistant.accepts_url_prompt());
            assert!(assistant.launch_url("hi").unwrap().is_none());
        }
    }

    #[test]
    fn test_assistant_parsing() {
        assert_eq!("ChatGPT".parse::<Assistant>().unwrap(), Assistant::ChatGpt);
        assert_eq!(Assistant::default(), Assistant::Gemini);
        assert!("bard".parse::<Assistant>().is_err());
    }
}
