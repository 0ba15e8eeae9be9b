//! Declarative rule catalog
//!
//! The catalog is plain data: an ordered list of categories and the rules that
//! produce findings in them. Backends read it; the engine uses its category
//! order to sort results. Keeping it apart from control flow lets tests and
//! deployments swap rule sets without touching engine code.
//!
//! ```toml
//! categories = ["Logo Usage", "Color"]
//!
//! [[rule]]
//! id = "logo-bg"
//! category = "Logo Usage"
//! title = "Logo placement needs attention"
//! description = "Logo sits on an unapproved background."
//! status = "fail"
//! suggestion = "Move the logo to an approved background."
//! guideline = "/guidelines/our-logos"
//! ```

use crate::error::CatalogError;
use crate::finding::{Finding, FindingStatus, GuidelineKey};
use brandscan_artifact::AttachmentKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// One rule: a finding template plus where it applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub status: FindingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline: Option<GuidelineKey>,
    /// Restrict the rule to one attachment kind; `None` applies to all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to: Option<AttachmentKind>,
}

impl Rule {
    fn new(
        id: &str,
        category: &str,
        title: &str,
        description: &str,
        status: FindingStatus,
    ) -> Self {
        Self {
            id: id.to_string(),
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            status,
            suggestion: None,
            guideline: None,
            applies_to: None,
        }
    }

    fn suggest(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    fn guideline(mut self, key: &str) -> Self {
        self.guideline = Some(GuidelineKey::new(key));
        self
    }

    /// Whether the rule applies to an attachment kind
    #[inline]
    #[must_use]
    pub fn applies(&self, kind: AttachmentKind) -> bool {
        self.applies_to.map_or(true, |k| k == kind)
    }

    /// Instantiate the finding
    #[must_use]
    pub fn to_finding(&self) -> Finding {
        Finding {
            id: self.id.clone(),
            category: self.category.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            suggestion: self.suggestion.clone(),
            guideline: self.guideline.clone(),
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default, rename = "rule")]
    rules: Vec<Rule>,
}

/// Validated rule catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<String>,
    rules: Vec<Rule>,
}

impl Catalog {
    /// Build a catalog from rules and an explicit category order
    ///
    /// An empty `categories` list means "order of first appearance".
    ///
    /// # Errors
    /// - `CatalogError::Empty` if there are no rules
    /// - `CatalogError::DuplicateId` if two rules share an id
    /// - `CatalogError::UnknownCategory` if a rule's category is not declared
    pub fn new(categories: Vec<String>, rules: Vec<Rule>) -> Result<Self, CatalogError> {
        if rules.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(CatalogError::DuplicateId(rule.id.clone()));
            }
        }

        let categories = if categories.is_empty() {
            let mut order: Vec<String> = Vec::new();
            for rule in &rules {
                if !order.contains(&rule.category) {
                    order.push(rule.category.clone());
                }
            }
            order
        } else {
            if let Some(rule) = rules.iter().find(|r| !categories.contains(&r.category)) {
                return Err(CatalogError::UnknownCategory {
                    rule: rule.id.clone(),
                    category: rule.category.clone(),
                });
            }
            categories
        };

        Ok(Self { categories, rules })
    }

    /// Parse a TOML catalog
    ///
    /// # Errors
    /// `CatalogError::Parse` for bad TOML, otherwise see [`Catalog::new`]
    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s)?;
        Self::new(file.categories, file.rules)
    }

    /// Read and parse a TOML catalog file
    ///
    /// # Errors
    /// `CatalogError::Io` if the file cannot be read, otherwise see
    /// [`Catalog::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), rules = catalog.rules.len(), "catalog loaded");
        Ok(catalog)
    }

    /// The built-in brand catalog: nine checks, one failing and two warnings
    #[must_use]
    pub fn standard() -> Self {
        use FindingStatus::{Fail, Pass, Warning};

        let rules = vec![
            Rule::new(
                "f1",
                "Logo Usage",
                "Logo placement needs attention",
                "The logo is placed on an unapproved background color. Our logo should only appear on white, black, or brand primary colors.",
                Fail,
            )
            .suggest("Move the logo to an approved background area or adjust the background color.")
            .guideline("/guidelines/our-logos"),
            Rule::new(
                "f2",
                "Color",
                "Banner color slightly off-brand",
                "The top banner uses #0055AA instead of our brand blue #0050A5.",
                Warning,
            )
            .suggest("Update the banner color to use the exact brand blue from our color tokens.")
            .guideline("/guidelines/colour-palette"),
            Rule::new(
                "f4",
                "Spacing",
                "Consistent spacing applied",
                "All spacing follows our 8px grid system correctly.",
                Pass,
            ),
            Rule::new(
                "f3",
                "Typography",
                "Avoid italic text for emphasis",
                "Italic text is used in the body copy. We recommend using bold or color for emphasis instead.",
                Warning,
            )
            .suggest("Replace italic styling with bold (font-weight: 600) for emphasis.")
            .guideline("/guidelines/typography"),
            Rule::new(
                "f5",
                "Imagery",
                "High-quality imagery used",
                "The hero image is high resolution and follows our photography guidelines.",
                Pass,
            ),
            Rule::new(
                "f7",
                "Copywriting",
                "Clear and active voice",
                "The copy uses active voice and maintains our friendly tone.",
                Pass,
            ),
            Rule::new(
                "f8",
                "Brand Assets",
                "Approved assets used",
                "All graphic elements are from our approved asset library.",
                Pass,
            ),
            Rule::new(
                "f6",
                "Accessibility",
                "Contrast ratios meet WCAG AA",
                "All text-background combinations meet the minimum 4.5:1 contrast ratio.",
                Pass,
            ),
            Rule::new(
                "f9",
                "Emotional Resonance",
                "Positive brand feeling",
                "The overall design conveys warmth and approachability.",
                Pass,
            ),
        ];

        let categories = rules.iter().map(|r| r.category.clone()).collect();
        Self { categories, rules }
    }

    /// Declared category order
    #[inline]
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// All rules
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Position of a category; unknown categories sort last
    #[must_use]
    pub fn category_rank(&self, category: &str) -> usize {
        self.categories
            .iter()
            .position(|c| c.eq_ignore_ascii_case(category))
            .unwrap_or(usize::MAX)
    }

    /// Findings produced for an attachment kind, in catalog order
    #[must_use]
    pub fn findings_for(&self, kind: AttachmentKind) -> Vec<Finding> {
        self.rules
            .iter()
            .filter(|r| r.applies(kind))
            .map(Rule::to_finding)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn standard_catalog_counts() {
        let findings = Catalog::standard().findings_for(AttachmentKind::Image);
        let count = |s| findings.iter().filter(|f| f.status == s).count();
        assert_eq!(findings.len(), 9);
        assert_eq!(count(FindingStatus::Pass), 6);
        assert_eq!(count(FindingStatus::Warning), 2);
        assert_eq!(count(FindingStatus::Fail), 1);
    }

    #[test]
    fn issues_carry_suggestions() {
        for finding in Catalog::standard().findings_for(AttachmentKind::Reference) {
            if finding.is_issue() {
                assert!(finding.suggestion.is_some(), "{} lacks a suggestion", finding.id);
            }
        }
    }

    #[test]
    fn parses_toml_catalog() {
        let catalog = Catalog::from_toml_str(
            r#"
            categories = ["Color", "Logo Usage"]

            [[rule]]
            id = "logo"
            category = "Logo Usage"
            title = "Logo ok"
            description = "fine"
            status = "pass"

            [[rule]]
            id = "figma-only"
            category = "Color"
            title = "Tokens"
            description = "uses tokens"
            status = "warning"
            suggestion = "bind colors to tokens"
            guideline = "/guidelines/colour-palette"
            applies_to = "reference"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.category_rank("color"), 0);
        assert_eq!(catalog.category_rank("Logo Usage"), 1);
        assert_eq!(catalog.category_rank("Imagery"), usize::MAX);
        assert_eq!(catalog.findings_for(AttachmentKind::Image).len(), 1);
        let reference = catalog.findings_for(AttachmentKind::Reference);
        assert_eq!(reference.len(), 2);
        assert_eq!(
            reference[1].guideline.as_ref().map(GuidelineKey::as_str),
            Some("/guidelines/colour-palette")
        );
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(Catalog::from_toml_str(""), Err(CatalogError::Empty)));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(
            vec![],
            vec![
                Rule::new("a", "Color", "t", "d", FindingStatus::Pass),
                Rule::new("a", "Color", "t", "d", FindingStatus::Fail),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn undeclared_category_is_rejected() {
        let err = Catalog::new(
            vec!["Color".to_string()],
            vec![Rule::new("a", "Spacing", "t", "d", FindingStatus::Pass)],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCategory { .. }));
    }
}
