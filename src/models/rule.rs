//! Import rule and template models
//!
//! Import rules map payee patterns (regular expressions) to transaction
//! templates. The suggestion engine reads them; rule and template editing
//! happens outside this crate's engine surface.

use chrono::{DateTime, Utc};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, RuleId, TemplateId};
use super::money::Money;

/// A rule matching imported payee names to a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRule {
    /// Unique identifier
    pub id: RuleId,

    /// Regular expression matched against payee/merchant names
    pub pattern: String,

    /// The template this rule applies
    pub template_id: TemplateId,

    /// Notes about this rule
    #[serde(default)]
    pub notes: String,

    /// When the rule was created
    pub created_at: DateTime<Utc>,

    /// When the rule was last modified
    pub updated_at: DateTime<Utc>,
}

impl ImportRule {
    /// Create a new import rule
    pub fn new(id: RuleId, pattern: impl Into<String>, template_id: TemplateId) -> Self {
        let now = Utc::now();
        Self {
            id,
            pattern: pattern.into(),
            template_id,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check whether the rule's pattern matches the given text
    ///
    /// Matching is case-insensitive. Returns `None` for a malformed pattern
    /// so callers can skip the rule rather than fail the whole read.
    pub fn matches(&self, text: &str) -> Option<bool> {
        let regex = RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(regex.is_match(text))
    }
}

impl fmt::Display for ImportRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/ -> {}", self.pattern, self.template_id)
    }
}

/// A reusable transaction shape referenced by import rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: TemplateId,

    /// Template name
    pub name: String,

    /// The legs a transaction built from this template would have
    #[serde(default)]
    pub line_items: Vec<TemplateLineItem>,

    /// When the template was created
    pub created_at: DateTime<Utc>,

    /// When the template was last modified
    pub updated_at: DateTime<Utc>,
}

impl Template {
    /// Create a new template
    pub fn new(id: TemplateId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            line_items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One leg of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLineItem {
    /// The account this leg would post to
    pub account_id: Option<AccountId>,

    /// Signed amount
    pub amount: Money,

    /// Optional memo
    #[serde(default)]
    pub memo: String,
}
