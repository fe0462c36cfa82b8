use crate::error::Result;

/// Outcome of an interactive pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Index(usize),
    Aborted,
}

/// Chooses one of `count` labelled candidates.
pub trait Picker {
    fn pick(
        &mut self,
        prompt: &str,
        count: usize,
        label: &dyn Fn(usize) -> String,
    ) -> Result<Pick>;
}

// ── Fuzzy matching ────────────────────────────────────────────────────────────

const MATCH: i64 = 16;
const CONSECUTIVE: i64 = 24;
const WORD_START: i64 = 20;
const GAP: i64 = 1;

/// Case-insensitive subsequence score; `None` when `query` does not match.
/// Higher is better.
pub fn fuzzy_score(query: &str, candidate: &str) -> Option<i64> {
    let query: Vec<char> = query.chars().flat_map(char::to_lowercase).collect();
    if query.is_empty() {
        return Some(0);
    }

    let chars: Vec<char> = candidate.chars().collect();
    let mut score = 0;
    let mut qi = 0;
    let mut last_match: Option<usize> = None;

    for (ci, &c) in chars.iter().enumerate() {
        if qi == query.len() {
            break;
        }
        if !c.to_lowercase().eq(std::iter::once(query[qi])) {
            continue;
        }
        score += MATCH;
        match last_match {
            Some(prev) if prev + 1 == ci => score += CONSECUTIVE,
            Some(prev) => score -= GAP * (ci - prev - 1) as i64,
            None => score -= GAP * ci as i64,
        }
        if ci == 0 || !chars[ci - 1].is_alphanumeric() {
            score += WORD_START;
        }
        last_match = Some(ci);
        qi += 1;
    }

    (qi == query.len()).then_some(score)
}

/// Indices of matching labels, best first; ties keep input order.
pub fn filter(query: &str, labels: &[String]) -> Vec<usize> {
    let mut scored: Vec<(usize, i64)> = labels
        .iter()
        .enumerate()
        .filter_map(|(i, label)| fuzzy_score(query, label).map(|s| (i, s)))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned answers and records how often it was asked.
    #[derive(Default)]
    pub struct ScriptedPicker {
        pub answers: VecDeque<Pick>,
        pub calls: usize,
        pub seen: Vec<Vec<String>>,
    }

    impl ScriptedPicker {
        pub fn new(answers: impl IntoIterator<Item = Pick>) -> Self {
            Self {
                answers: answers.into_iter().collect(),
                ..Self::default()
            }
        }
    }

    impl Picker for ScriptedPicker {
        fn pick(
            &mut self,
            _prompt: &str,
            count: usize,
            label: &dyn Fn(usize) -> String,
        ) -> Result<Pick> {
            self.calls += 1;
            self.seen.push((0..count).map(label).collect());
            Ok(self.answers.pop_front().unwrap_or(Pick::Aborted))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        assert_eq!(fuzzy_score("", "anything"), Some(0));
        let labels = vec!["b".to_string(), "a".to_string()];
        assert_eq!(filter("", &labels), vec![0, 1]);
    }

    #[test]
    fn subsequence_required() {
        assert!(fuzzy_score("prd", "Production").is_some());
        assert!(fuzzy_score("PRD", "production").is_some());
        assert!(fuzzy_score("xyz", "Production").is_none());
        assert!(fuzzy_score("dorp", "prod").is_none());
    }

    #[test]
    fn tighter_matches_rank_first() {
        let labels = vec![
            "contoso-dev-platform".to_string(),
            "Dev".to_string(),
            "sandbox".to_string(),
        ];
        let ranked = filter("dev", &labels);
        assert_eq!(ranked, vec![1, 0]);
    }
}
