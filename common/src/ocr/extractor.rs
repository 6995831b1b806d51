// Timer extraction from OCR tokens of an upgrade-list screenshot

use super::lines::{assemble_lines, join_texts};
use super::Token;
use crate::duration::{correct_ocr_noise, parse_duration};
use crate::errors::StoreError;
use crate::models::{NewTimer, DEFAULT_CATEGORY};
use crate::store::TimerStore;
use crate::telemetry;
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// A (name, duration text) pair read from one screenshot line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerCandidate {
    pub name: String,
    pub duration_text: String,
}

/// Reads named timers out of a two-column screenshot layout.
///
/// Names sit in the left column and remaining times in the right one. Lines
/// are independent, so names wrapped over several rows are not reconciled.
#[derive(Debug, Clone)]
pub struct TimerExtractor {
    start_marker: String,
    end_marker: String,
}

impl Default for TimerExtractor {
    fn default() -> Self {
        Self::new(super::DEFAULT_START_MARKER, super::DEFAULT_END_MARKER)
    }
}

impl TimerExtractor {
    pub fn new(start_marker: impl Into<String>, end_marker: impl Into<String>) -> Self {
        Self {
            start_marker: start_marker.into().to_lowercase(),
            end_marker: end_marker.into().to_lowercase(),
        }
    }

    /// Tokens between the start and end markers.
    ///
    /// The first token is the provider's full-text summary and is always
    /// dropped. Without both markers every other token is kept.
    pub fn relevant_tokens<'a>(&self, tokens: &'a [Token]) -> Vec<&'a Token> {
        let body = tokens.get(1..).unwrap_or_default();

        let start = body.iter().find(|t| contains_marker(t, &self.start_marker));
        let end = start.and_then(|start| {
            let start_bottom = start.bottom();
            body.iter()
                .find(|t| t.top() > start_bottom && contains_marker(t, &self.end_marker))
        });

        match (start, end) {
            (Some(start), Some(end)) => {
                let (lower, upper) = (start.bottom(), end.top());
                debug!(lower, upper, "Bounding extraction region by markers");
                body.iter()
                    .filter(|t| t.top() > lower && t.bottom() < upper)
                    .collect()
            }
            _ => {
                debug!("Markers not found, using every token");
                body.iter().collect()
            }
        }
    }

    /// Name/duration pairs found between the markers
    pub fn candidates(&self, tokens: &[Token]) -> Vec<TimerCandidate> {
        let relevant: Vec<Token> = self.relevant_tokens(tokens).into_iter().cloned().collect();
        let Some(split) = column_split(&relevant) else {
            return Vec::new();
        };

        assemble_lines(&relevant)
            .into_iter()
            .filter_map(|line| {
                let (names, durations): (Vec<&Token>, Vec<&Token>) =
                    line.tokens.iter().partition(|t| t.left_x() < split);
                let name = join_texts(names.into_iter());
                let duration_text = join_texts(durations.into_iter());

                if name.is_empty() || !has_unit_letter(&duration_text) {
                    return None;
                }
                Some(TimerCandidate {
                    name,
                    duration_text,
                })
            })
            .collect()
    }

    /// Create a timer for every parsable candidate and return their names.
    ///
    /// Unparsable durations are logged and skipped; store failures abort the batch.
    #[instrument(skip(self, tokens, store), fields(token_count = tokens.len()))]
    pub async fn extract(
        &self,
        tokens: &[Token],
        store: &dyn TimerStore,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, StoreError> {
        let mut created = Vec::new();

        for candidate in self.candidates(tokens) {
            let corrected = correct_ocr_noise(&candidate.duration_text);
            let seconds = match parse_duration(&corrected) {
                Ok(seconds) => seconds,
                Err(e) => {
                    warn!(
                        name = %candidate.name,
                        duration_text = %candidate.duration_text,
                        error = %e,
                        "Skipping unparsable duration"
                    );
                    continue;
                }
            };

            let timer = store
                .create(NewTimer::starting_at(
                    candidate.name.clone(),
                    DEFAULT_CATEGORY,
                    seconds,
                    false,
                    now,
                ))
                .await?;

            debug!(timer_id = %timer.id, name = %timer.name, seconds, "Imported timer");
            created.push(timer.name);
        }

        telemetry::record_timers_created("import", created.len());
        info!(created = created.len(), "Extracted timers from screenshot");
        Ok(created)
    }
}

fn contains_marker(token: &Token, marker: &str) -> bool {
    token.text.to_lowercase().contains(marker)
}

fn has_unit_letter(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c.to_ascii_lowercase(), 'd' | 'h' | 'm'))
}

/// Midpoint between the smallest and largest left edge
fn column_split(tokens: &[Token]) -> Option<f64> {
    let lefts = tokens.iter().map(Token::left_x);
    let min = lefts.clone().reduce(f64::min)?;
    let max = lefts.reduce(f64::max)?;
    Some((min + max) / 2.0)
}
