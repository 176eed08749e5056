//! Detects descriptions that contradict their declared kind or category.
//!
//! Two strategies share the [`Classifier`] trait: [`KeywordClassifier`] looks for
//! foreign keywords verbatim, [`FuzzyClassifier`] normalizes free-typed categories
//! and tolerates misspelled keywords using [`similarity`] scores.

use serde::{Deserialize, Serialize};
use strsim::{normalized_levenshtein, sorensen_dice};

use crate::domain::{Taxonomy, TransactionKind};

/// Classifier outcome. Never an error; callers decide what a verdict means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Description is consistent; `category` is the spelling to commit.
    Match { category: String },
    /// Description contains `term`, which belongs to another kind or category.
    Mismatch { term: String },
    /// The category could not be mapped onto the taxonomy.
    Unrecognized {
        input: String,
        closest: Option<CategoryMatch>,
    },
}

impl Verdict {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Match { .. })
    }
}

/// Best taxonomy candidate for a free-typed category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatch {
    pub category: String,
    pub score: u8,
}

/// How keyword containment is tested by [`KeywordClassifier`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordMatching {
    /// Keyword must equal a whole whitespace-delimited token.
    #[default]
    Token,
    /// Keyword may appear anywhere, including inside longer words.
    Substring,
}

pub trait Classifier: Send + Sync {
    fn classify(&self, kind: TransactionKind, category: &str, description: &str) -> Verdict;

    fn taxonomy(&self) -> &Taxonomy;

    fn name(&self) -> &'static str;
}

/// Exact keyword strategy.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    taxonomy: Taxonomy,
    matching: KeywordMatching,
}

impl KeywordClassifier {
    pub fn new(taxonomy: Taxonomy, matching: KeywordMatching) -> Self {
        Self { taxonomy, matching }
    }

    fn find_term(&self, foreign: &[&str], description: &str) -> Option<String> {
        match self.matching {
            KeywordMatching::Token => {
                let tokens = tokenize(description);
                earliest(foreign.iter().filter_map(|keyword| {
                    find_token_sequence(&tokens, keyword).map(|position| (position, *keyword))
                }))
            }
            KeywordMatching::Substring => {
                let haystack = description.to_lowercase();
                earliest(foreign.iter().filter_map(|keyword| {
                    haystack.find(keyword).map(|position| (position, *keyword))
                }))
            }
        }
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, kind: TransactionKind, category: &str, description: &str) -> Verdict {
        // Free-form categories are allowed; only the kind-wide rules apply to them.
        let category = self
            .taxonomy
            .canonical_category(kind, category)
            .unwrap_or_else(|| category.trim())
            .to_string();
        let foreign = self.taxonomy.foreign_keywords(kind, &category);
        match self.find_term(&foreign, description) {
            Some(term) => Verdict::Mismatch { term },
            None => Verdict::Match { category },
        }
    }

    fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Fuzzy normalization strategy.
#[derive(Debug, Clone)]
pub struct FuzzyClassifier {
    taxonomy: Taxonomy,
    threshold: u8,
    min_token_len: usize,
}

impl FuzzyClassifier {
    pub const DEFAULT_THRESHOLD: u8 = 70;
    pub const DEFAULT_MIN_TOKEN_LEN: usize = 4;

    pub fn new(taxonomy: Taxonomy, threshold: u8, min_token_len: usize) -> Self {
        Self {
            taxonomy,
            threshold: threshold.min(100),
            min_token_len,
        }
    }

    /// Highest scoring taxonomy category for `input`, ties resolved by declaration order.
    pub fn closest_category(&self, kind: TransactionKind, input: &str) -> Option<CategoryMatch> {
        let mut best: Option<CategoryMatch> = None;
        for name in self.taxonomy.categories(kind) {
            let score = similarity(input, name);
            if best.as_ref().map_or(true, |current| score > current.score) {
                best = Some(CategoryMatch {
                    category: name.clone(),
                    score,
                });
            }
        }
        best
    }

    fn find_term(&self, foreign: &[&str], description: &str) -> Option<String> {
        let tokens = tokenize(description);
        // (token position, -score) orders earliest first, then strongest.
        let mut best: Option<(usize, i16, &str)> = None;
        for keyword in foreign {
            let hit = if keyword.contains(char::is_whitespace) {
                find_token_sequence(&tokens, keyword).map(|position| (position, 100u8))
            } else {
                tokens.iter().enumerate().find_map(|(position, token)| {
                    let score = self.token_score(token, keyword)?;
                    Some((position, score))
                })
            };
            if let Some((position, score)) = hit {
                let key = (position, -i16::from(score), *keyword);
                if best.map_or(true, |current| (key.0, key.1) < (current.0, current.1)) {
                    best = Some(key);
                }
            }
        }
        best.map(|(_, _, keyword)| keyword.to_string())
    }

    fn token_score(&self, token: &str, keyword: &str) -> Option<u8> {
        if token == keyword {
            return Some(100);
        }
        let token_len = token.chars().count();
        if token_len < self.min_token_len || token_len.abs_diff(keyword.chars().count()) > 1 {
            return None;
        }
        // An embedded keyword only counts as an inflection ("rents"), never inside
        // another word ("parent", "arent").
        if token.contains(keyword) && !token.starts_with(keyword) {
            return None;
        }
        let score = similarity(token, keyword);
        (score > self.threshold).then_some(score)
    }
}

impl Classifier for FuzzyClassifier {
    fn classify(&self, kind: TransactionKind, category: &str, description: &str) -> Verdict {
        let closest = self.closest_category(kind, category);
        let canonical = match &closest {
            Some(candidate) if candidate.score > self.threshold => candidate.category.clone(),
            _ => {
                return Verdict::Unrecognized {
                    input: category.trim().to_string(),
                    closest,
                }
            }
        };
        let foreign = self.taxonomy.foreign_keywords(kind, &canonical);
        match self.find_term(&foreign, description) {
            Some(term) => Verdict::Mismatch { term },
            None => Verdict::Match {
                category: canonical,
            },
        }
    }

    fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    fn name(&self) -> &'static str {
        "fuzzy"
    }
}

/// Case-insensitive similarity on a 0-100 scale: the better of normalized
/// Levenshtein and Sorensen-Dice bigram overlap.
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return if a == b { 100 } else { 0 };
    }
    let score = normalized_levenshtein(&a, &b).max(sorensen_dice(&a, &b));
    (score * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Lowercase whitespace tokens with surrounding punctuation removed.
fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            raw.trim_matches(|ch: char| !ch.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
        .collect()
}

/// Position of the first token window equal to the words of `keyword`.
fn find_token_sequence(tokens: &[String], keyword: &str) -> Option<usize> {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    if words.is_empty() || words.len() > tokens.len() {
        return None;
    }
    tokens
        .windows(words.len())
        .position(|window| window.iter().zip(&words).all(|(token, word)| token == word))
}

/// Earliest hit wins; at equal positions the longer keyword wins.
fn earliest<'a>(hits: impl Iterator<Item = (usize, &'a str)>) -> Option<String> {
    hits.min_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.len().cmp(&a.1.len())))
        .map(|(_, keyword)| keyword.to_string())
}
