//! Consumers of a projection — funnel chart series, CSV/JSON exports, the
//! planning report outline, and AI-assistant prompt export.

pub mod funnel;
pub mod prompt;
pub mod report_builder;

pub use funnel::{funnel_series, ChartKind, FunnelSeries};
pub use prompt::{build_prompt, Assistant};
pub use report_builder::{ExportFormat, ReportBuilder};
