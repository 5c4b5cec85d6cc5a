//! Analysis text for a ticker and period
//!
//! [`AnalysisGenerator`] asks the remote model for a short commentary and
//! falls back to [`narrate`], which derives the same kind of text from fixed
//! thresholds.

pub mod generator;
pub mod narrator;

pub use generator::{AI_HEADING, AnalysisGenerator, format_ai_response};
pub use narrator::{NARRATOR_HEADING, narrate};

/// Reply when the period holds no prices to analyse
pub const NO_ANALYSIS_DATA_MESSAGE: &str = "❌ Не удалось получить данные для анализа";

/// Reply when statistics could not be computed at all
pub const ANALYSIS_FAILED_MESSAGE: &str = "❌ Не удалось сформировать аналитику";
