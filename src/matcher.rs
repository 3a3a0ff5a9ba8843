use serde::Deserialize;
use std::ops::Range;

/// Weights of the three terms of a fuzzy field score.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    #[serde(default = "default_completeness")]
    pub completeness: f64,
    #[serde(default = "default_consecutive")]
    pub consecutive: f64,
    #[serde(default = "default_coverage")]
    pub coverage: f64,
}

fn default_completeness() -> f64 { 0.5 }
fn default_consecutive() -> f64 { 0.3 }
fn default_coverage() -> f64 { 0.2 }

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            completeness: default_completeness(),
            consecutive: default_consecutive(),
            coverage: default_coverage(),
        }
    }
}

/// Score of one field plus the character spans (char indices) that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldScore {
    pub score: f64,
    pub spans: Vec<Range<usize>>,
}

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    pub fuzzy: bool,
    pub weights: ScoreWeights,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self::new(true, ScoreWeights::default())
    }
}

impl FuzzyMatcher {
    pub fn new(fuzzy: bool, weights: ScoreWeights) -> Self {
        Self { fuzzy, weights }
    }

    /// Score in `[0, 1]`; 0 when the query does not match at all.
    pub fn score(&self, text: &str, query: &str) -> f64 {
        self.score_field(text, query).map(|f| f.score).unwrap_or(0.0)
    }

    pub fn score_field(&self, text: &str, query: &str) -> Option<FieldScore> {
        let haystack = lowered(text);
        let needle = lowered(query);
        if needle.is_empty() || haystack.is_empty() {
            return None;
        }

        if !self.fuzzy {
            return find(&haystack, &needle).map(|pos| FieldScore {
                score: 1.0,
                spans: vec![pos..pos + needle.len()],
            });
        }

        if needle.len() > haystack.len() {
            return None;
        }
        if let Some(whole) = self.match_sequence(&haystack, &needle) {
            return Some(whole);
        }

        // "hp lap" against "Laptop HP": the words match out of order.
        let tokens: Vec<Vec<char>> = query.split_whitespace().map(lowered).collect();
        if tokens.len() < 2 {
            return None;
        }

        let mut total = 0.0;
        let mut spans = Vec::new();
        for token in &tokens {
            let hit = self.match_sequence(&haystack, token)?;
            total += hit.score;
            spans.extend(hit.spans);
        }
        Some(FieldScore {
            score: total / tokens.len() as f64,
            spans: merge_spans(spans),
        })
    }

    fn match_sequence(&self, haystack: &[char], needle: &[char]) -> Option<FieldScore> {
        if needle.len() > haystack.len() {
            return None;
        }
        let query_len = needle.len() as f64;
        let coverage = query_len / haystack.len() as f64;

        // A contiguous occurrence anywhere beats whatever the greedy scan finds.
        if let Some(pos) = find(haystack, needle) {
            return Some(FieldScore {
                score: self.combine(1.0, 1.0, coverage),
                spans: vec![pos..pos + needle.len()],
            });
        }

        let mut positions = Vec::with_capacity(needle.len());
        let mut consumed = 0;
        let mut run = 0;
        let mut longest_run = 0;
        for (i, &c) in haystack.iter().enumerate() {
            if consumed == needle.len() {
                break;
            }
            if c == needle[consumed] {
                run = match positions.last() {
                    Some(&prev) if prev + 1 == i => run + 1,
                    _ => 1,
                };
                longest_run = longest_run.max(run);
                positions.push(i);
                consumed += 1;
            }
        }

        if consumed < needle.len() {
            return None;
        }

        let completeness = consumed as f64 / query_len;
        let consecutiveness = longest_run as f64 / query_len;
        Some(FieldScore {
            score: self.combine(completeness, consecutiveness, coverage),
            spans: merge_spans(positions.into_iter().map(|p| p..p + 1).collect()),
        })
    }

    fn combine(&self, completeness: f64, consecutiveness: f64, coverage: f64) -> f64 {
        let w = &self.weights;
        let score = w.completeness * completeness + w.consecutive * consecutiveness + w.coverage * coverage;
        score.clamp(0.0, 1.0)
    }
}

/// Lowercases char by char so indices line up with the original text.
pub(crate) fn lowered(s: &str) -> Vec<char> {
    s.chars().map(|c| c.to_lowercase().next().unwrap_or(c)).collect()
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn merge_spans(mut spans: Vec<Range<usize>>) -> Vec<Range<usize>> {
    spans.sort_by_key(|r| r.start);
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}
