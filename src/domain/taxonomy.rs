//! Category taxonomy: allowed categories per transaction kind and the keyword
//! sets that mark a description as belonging somewhere else.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionKind;

static STANDARD: Lazy<Taxonomy> = Lazy::new(|| Taxonomy::assemble(standard_definition()));

/// Which rows a [`MismatchRule`] applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleScope {
    /// Every row of the rule's kind, whatever its category.
    Kind,
    /// Only rows of the rule's kind filed under this category (case-insensitive).
    Category(String),
}

/// Declares which keyword sets are foreign to a kind or to one of its categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MismatchRule {
    pub kind: TransactionKind,
    pub scope: RuleScope,
    pub keyword_sets: Vec<String>,
}

impl MismatchRule {
    pub fn for_kind(kind: TransactionKind, keyword_sets: &[&str]) -> Self {
        Self {
            kind,
            scope: RuleScope::Kind,
            keyword_sets: keyword_sets.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn for_category(
        kind: TransactionKind,
        category: impl Into<String>,
        keyword_sets: &[&str],
    ) -> Self {
        Self {
            kind,
            scope: RuleScope::Category(category.into()),
            keyword_sets: keyword_sets.iter().map(|name| name.to_string()).collect(),
        }
    }

    fn applies_to(&self, kind: TransactionKind, category: &str) -> bool {
        if self.kind != kind {
            return false;
        }
        match &self.scope {
            RuleScope::Kind => true,
            RuleScope::Category(name) => name.trim().eq_ignore_ascii_case(category.trim()),
        }
    }
}

/// Unvalidated taxonomy as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyDefinition {
    pub categories: BTreeMap<TransactionKind, Vec<String>>,
    pub keyword_sets: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub rules: Vec<MismatchRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("no categories defined for {0}")]
    MissingCategories(TransactionKind),
    #[error("invalid category name `{0}`")]
    InvalidCategoryName(String),
    #[error("category `{category}` listed twice for {kind}")]
    DuplicateCategory {
        kind: TransactionKind,
        category: String,
    },
    #[error("keyword set `{0}` contains a blank keyword")]
    BlankKeyword(String),
    #[error("rule for {kind} references unknown keyword set `{set}`")]
    UnknownKeywordSet { kind: TransactionKind, set: String },
    #[error("rule references unknown {kind} category `{category}`")]
    UnknownCategory {
        kind: TransactionKind,
        category: String,
    },
}

/// Validated category taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: BTreeMap<TransactionKind, Vec<String>>,
    keyword_sets: BTreeMap<String, Vec<String>>,
    rules: Vec<MismatchRule>,
}

impl Taxonomy {
    /// Built-in personal finance taxonomy.
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Validates a definition and builds the taxonomy from it.
    pub fn from_definition(definition: TaxonomyDefinition) -> Result<Self, TaxonomyError> {
        validate(&definition)?;
        Ok(Self::assemble(definition))
    }

    fn assemble(definition: TaxonomyDefinition) -> Self {
        let categories = definition
            .categories
            .into_iter()
            .map(|(kind, names)| {
                let names: Vec<String> =
                    names.into_iter().map(|name| name.trim().to_string()).collect();
                (kind, names)
            })
            .collect();
        let keyword_sets = definition
            .keyword_sets
            .into_iter()
            .map(|(name, terms)| {
                let mut seen = BTreeSet::new();
                let normalized: Vec<String> = terms
                    .into_iter()
                    .map(|term| term.trim().to_lowercase())
                    .filter(|term| seen.insert(term.clone()))
                    .collect();
                (name, normalized)
            })
            .collect();
        Self {
            categories,
            keyword_sets,
            rules: definition.rules,
        }
    }

    /// Categories allowed for `kind`, in declaration order.
    pub fn categories(&self, kind: TransactionKind) -> &[String] {
        self.categories
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the canonical spelling of `input` when it names a known category of `kind`.
    pub fn canonical_category(&self, kind: TransactionKind, input: &str) -> Option<&str> {
        let needle = input.trim();
        self.categories(kind)
            .iter()
            .find(|name| name.eq_ignore_ascii_case(needle))
            .map(String::as_str)
    }

    pub fn keyword_set(&self, name: &str) -> Option<&[String]> {
        self.keyword_sets.get(name).map(Vec::as_slice)
    }

    pub fn rules(&self) -> &[MismatchRule] {
        &self.rules
    }

    /// Lowercase keywords that contradict a row of `kind` filed under `category`.
    /// Order follows rule order then set order, without duplicates.
    pub fn foreign_keywords(&self, kind: TransactionKind, category: &str) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(kind, category))
            .flat_map(|rule| rule.keyword_sets.iter())
            .filter_map(|set| self.keyword_sets.get(set))
            .flat_map(|terms| terms.iter().map(String::as_str))
            .filter(|term| seen.insert(*term))
            .collect()
    }

    /// Converts back into a serializable definition.
    pub fn to_definition(&self) -> TaxonomyDefinition {
        TaxonomyDefinition {
            categories: self.categories.clone(),
            keyword_sets: self.keyword_sets.clone(),
            rules: self.rules.clone(),
        }
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

/// A category name is valid when it is non-blank and free of digit characters
/// in any script.
pub fn is_valid_category(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty() && !trimmed.chars().any(char::is_numeric)
}

fn validate(definition: &TaxonomyDefinition) -> Result<(), TaxonomyError> {
    for kind in TransactionKind::ALL {
        let names = definition
            .categories
            .get(&kind)
            .filter(|names| !names.is_empty())
            .ok_or(TaxonomyError::MissingCategories(kind))?;
        let mut seen = BTreeSet::new();
        for name in names {
            let trimmed = name.trim();
            if !is_valid_category(trimmed) {
                return Err(TaxonomyError::InvalidCategoryName(name.clone()));
            }
            if !seen.insert(trimmed.to_lowercase()) {
                return Err(TaxonomyError::DuplicateCategory {
                    kind,
                    category: trimmed.to_string(),
                });
            }
        }
    }

    for (name, terms) in &definition.keyword_sets {
        if terms.iter().any(|term| term.trim().is_empty()) {
            return Err(TaxonomyError::BlankKeyword(name.clone()));
        }
    }

    for rule in &definition.rules {
        if let Some(set) = rule
            .keyword_sets
            .iter()
            .find(|set| !definition.keyword_sets.contains_key(*set))
        {
            return Err(TaxonomyError::UnknownKeywordSet {
                kind: rule.kind,
                set: set.clone(),
            });
        }
        if let RuleScope::Category(category) = &rule.scope {
            let known = definition
                .categories
                .get(&rule.kind)
                .map(|names| {
                    names
                        .iter()
                        .any(|name| name.trim().eq_ignore_ascii_case(category.trim()))
                })
                .unwrap_or(false);
            if !known {
                return Err(TaxonomyError::UnknownCategory {
                    kind: rule.kind,
                    category: category.clone(),
                });
            }
        }
    }
    Ok(())
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Definition behind [`Taxonomy::standard`].
pub fn standard_definition() -> TaxonomyDefinition {
    use TransactionKind::{Expense, Income};

    let mut categories = BTreeMap::new();
    categories.insert(
        Income,
        strings(&["Salary", "Freelance", "Investments", "Gifts", "Other"]),
    );
    categories.insert(
        Expense,
        strings(&[
            "Food",
            "Rent",
            "Utilities",
            "Transport",
            "Entertainment",
            "Shopping",
            "Healthcare",
            "Other",
        ]),
    );

    let mut keyword_sets = BTreeMap::new();
    keyword_sets.insert(
        "food".to_string(),
        strings(&[
            "grocery",
            "groceries",
            "supermarket",
            "restaurant",
            "lunch",
            "dinner",
            "breakfast",
            "takeout",
            "cafe",
            "coffee",
        ]),
    );
    keyword_sets.insert(
        "housing".to_string(),
        strings(&["rent", "mortgage", "lease", "landlord"]),
    );
    keyword_sets.insert(
        "utilities".to_string(),
        strings(&["electricity", "internet", "wifi", "phone"]),
    );
    keyword_sets.insert(
        "transport".to_string(),
        strings(&["fuel", "petrol", "uber", "taxi", "bus", "train", "parking"]),
    );
    keyword_sets.insert(
        "entertainment".to_string(),
        strings(&["movie", "movies", "cinema", "concert", "netflix", "spotify"]),
    );
    keyword_sets.insert(
        "shopping".to_string(),
        strings(&["clothes", "shoes", "mall", "amazon"]),
    );
    keyword_sets.insert(
        "healthcare".to_string(),
        strings(&["doctor", "pharmacy", "medicine", "hospital", "dentist"]),
    );
    keyword_sets.insert(
        "earnings".to_string(),
        strings(&[
            "salary",
            "paycheck",
            "payroll",
            "wages",
            "bonus",
            "dividend",
            "dividends",
        ]),
    );

    let rules = vec![
        MismatchRule::for_kind(
            Income,
            &[
                "food",
                "housing",
                "utilities",
                "transport",
                "entertainment",
                "shopping",
                "healthcare",
            ],
        ),
        MismatchRule::for_kind(Expense, &["earnings"]),
        MismatchRule::for_category(Expense, "Food", &["housing", "utilities"]),
        MismatchRule::for_category(Expense, "Rent", &["food", "entertainment"]),
        MismatchRule::for_category(Expense, "Transport", &["housing"]),
        MismatchRule::for_category(Expense, "Entertainment", &["housing", "healthcare"]),
        MismatchRule::for_category(Expense, "Healthcare", &["entertainment"]),
    ];

    TaxonomyDefinition {
        categories,
        keyword_sets,
        rules,
    }
}
