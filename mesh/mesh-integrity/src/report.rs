//! Violation reports.
//!
//! A run produces one [`RuleResult`] per requested rule, collected into a
//! [`CheckRunResult`]. Violations are kept in ordered sets keyed by node, kind
//! and element index, so merging partial results is a set union and the final
//! report does not depend on the order work was executed in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write as _};

#[cfg(feature = "serde")]
use serde::{Serialize, Serializer};

use crate::id::{ElementKind, NodeId};
use crate::provider::NodeResolver;

/// One defect: a node, and for element-level rules, one element of its mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Violation {
    /// Node the violation is attributed to.
    pub node: NodeId,
    /// What `index` refers to.
    pub kind: ElementKind,
    /// Element index, absent for node-level rules.
    pub index: Option<usize>,
}

impl Violation {
    /// A node-level violation.
    #[must_use]
    pub fn node(node: NodeId) -> Self {
        Self {
            node,
            kind: ElementKind::Node,
            index: None,
        }
    }

    /// An element-level violation.
    #[must_use]
    pub fn element(node: NodeId, kind: ElementKind, index: usize) -> Self {
        Self {
            node,
            kind,
            index: Some(index),
        }
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Part of the input was skipped; the rule still ran.
    Warning,
    /// The rule could not be evaluated for a node.
    Error,
}

/// A note attached to a rule result about something that could not be checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Diagnostic {
    /// Node concerned, if any.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub node: Option<NodeId>,
    /// Element concerned, if any.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub element: Option<usize>,
    /// How serious the problem is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            node: None,
            element: None,
            severity,
            message: message.into(),
        }
    }

    /// Create a warning-level diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an error-level diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Attach the node concerned.
    #[must_use]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attach the element concerned.
    #[must_use]
    pub fn with_element(mut self, element: usize) -> Self {
        self.element = Some(element);
        self
    }

    /// Check if this is an error-level diagnostic.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

/// Overall outcome of one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(rename_all = "lowercase"))]
pub enum RuleStatus {
    /// Checked everything, found nothing.
    Passed,
    /// Checked everything, found violations.
    Failed,
    /// At least one node could not be checked.
    Degraded,
}

impl RuleStatus {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Degraded => "degraded",
        }
    }
}

/// Everything one rule found across all candidate nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleResult {
    rule: String,
    kind: ElementKind,
    violations: BTreeSet<Violation>,
    diagnostics: Vec<Diagnostic>,
}

impl RuleResult {
    /// Create an empty result.
    pub fn new(rule: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            rule: rule.into(),
            kind,
            violations: BTreeSet::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Name of the rule.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// What the violation indices refer to.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Record a violation. Recording the same violation twice has no effect.
    pub fn insert(&mut self, violation: Violation) {
        self.violations.insert(violation);
    }

    /// Record a diagnostic.
    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Fold another partial result for the same rule into this one.
    pub fn merge(&mut self, other: Self) {
        self.violations.extend(other.violations);
        self.diagnostics.extend(other.diagnostics);
        self.normalize();
    }

    /// Sort and deduplicate diagnostics.
    pub(crate) fn normalize(&mut self) {
        self.diagnostics.sort();
        self.diagnostics.dedup();
    }

    /// Violations in (node, element) order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Check if no violations were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Diagnostics recorded while checking.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Check if any node could not be checked.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Overall outcome.
    #[must_use]
    pub fn status(&self) -> RuleStatus {
        if self.is_degraded() {
            RuleStatus::Degraded
        } else if self.violations.is_empty() {
            RuleStatus::Passed
        } else {
            RuleStatus::Failed
        }
    }

    /// Nodes with at least one violation, in order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = self.violations.iter().map(|v| v.node).collect();
        nodes.dedup();
        nodes
    }

    /// Element indices grouped by node.
    ///
    /// Node-level violations appear as nodes with an empty index list.
    #[must_use]
    pub fn by_node(&self) -> BTreeMap<NodeId, Vec<usize>> {
        let mut grouped: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
        for violation in &self.violations {
            let indices = grouped.entry(violation.node).or_default();
            if let Some(index) = violation.index {
                indices.push(index);
            }
        }
        grouped
    }
}

/// The results of one check run, keyed by rule name.
///
/// Holds exactly one entry per requested rule, including rules that found
/// nothing and rules that could not be evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckRunResult {
    rules: BTreeMap<String, RuleResult>,
}

impl CheckRunResult {
    /// Create an empty result set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule result, merging with any existing result of the same name.
    pub fn insert(&mut self, result: RuleResult) {
        match self.rules.get_mut(result.rule()) {
            Some(existing) => existing.merge(result),
            None => {
                self.rules.insert(result.rule().to_owned(), result);
            }
        }
    }

    /// Result of one rule.
    #[must_use]
    pub fn get(&self, rule: &str) -> Option<&RuleResult> {
        self.rules.get(rule)
    }

    /// All results in rule-name order.
    pub fn iter(&self) -> impl Iterator<Item = &RuleResult> {
        self.rules.values()
    }

    /// Number of rules in the result.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the result covers no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Total violations across all rules.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.rules.values().map(RuleResult::len).sum()
    }

    /// Names of rules that found violations or could not run cleanly.
    #[must_use]
    pub fn failed_rules(&self) -> Vec<&str> {
        self.rules
            .values()
            .filter(|r| r.status() != RuleStatus::Passed)
            .map(RuleResult::rule)
            .collect()
    }

    /// Check if every rule passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rules
            .values()
            .all(|r| r.status() == RuleStatus::Passed)
    }

    /// Render a human-readable report, resolving node names through `resolver`.
    ///
    /// Nodes that no longer resolve are shown by id.
    #[must_use]
    pub fn render(&self, resolver: &dyn NodeResolver) -> String {
        let mut out = String::new();
        for result in self.rules.values() {
            let _ = writeln!(
                out,
                "{} [{}] {} violation(s)",
                result.rule(),
                result.status().as_str(),
                result.len()
            );

            for (node, indices) in result.by_node() {
                let name = resolver
                    .resolve_name(node)
                    .unwrap_or_else(|_| node.to_string());
                if indices.is_empty() {
                    let _ = writeln!(out, "  {name}");
                } else {
                    let list: Vec<String> = indices.iter().map(ToString::to_string).collect();
                    let _ = writeln!(
                        out,
                        "  {name}: {} {}",
                        result.kind().as_str(),
                        list.join(", ")
                    );
                }
            }

            for diagnostic in result.diagnostics() {
                let _ = writeln!(out, "  ! {}", diagnostic.message);
            }
        }
        out
    }

    /// Serialize the report as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`](crate::CheckError::Json) if serialization fails.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::CheckResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize the report as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Json`](crate::CheckError::Json) if serialization fails.
    #[cfg(feature = "serde")]
    pub fn to_json_pretty(&self) -> crate::CheckResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for CheckRunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Check Report:")?;
        writeln!(f, "  Rules: {}", self.len())?;
        writeln!(f, "  Violations: {}", self.violation_count())?;

        let failed = self.failed_rules();
        if !failed.is_empty() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            for result in self.rules.values().filter(|r| r.status() != RuleStatus::Passed) {
                writeln!(
                    f,
                    "    {}: {} ({})",
                    result.rule(),
                    result.len(),
                    result.status().as_str()
                )?;
            }
        }

        Ok(())
    }
}

/// Wire form of a rule result.
#[cfg(feature = "serde")]
#[derive(Serialize)]
struct RuleReport<'a> {
    rule: &'a str,
    kind: ElementKind,
    status: RuleStatus,
    violations: Findings,
    diagnostics: &'a [Diagnostic],
}

/// Node list for node-level rules, node-keyed index map otherwise.
#[cfg(feature = "serde")]
#[derive(Serialize)]
#[serde(untagged)]
enum Findings {
    Nodes(Vec<NodeId>),
    Elements(BTreeMap<NodeId, Vec<usize>>),
}

#[cfg(feature = "serde")]
impl Serialize for RuleResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let violations = if self.kind == ElementKind::Node {
            Findings::Nodes(self.nodes())
        } else {
            Findings::Elements(self.by_node())
        };
        RuleReport {
            rule: &self.rule,
            kind: self.kind,
            status: self.status(),
            violations,
            diagnostics: &self.diagnostics,
        }
        .serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl Serialize for CheckRunResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rules.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn id(n: u128) -> NodeId {
        NodeId::from(Uuid::from_u128(n))
    }

    #[test]
    fn violations_are_ordered_and_deduplicated() {
        let mut result = RuleResult::new("ngons", ElementKind::Polygon);
        result.insert(Violation::element(id(2), ElementKind::Polygon, 4));
        result.insert(Violation::element(id(1), ElementKind::Polygon, 9));
        result.insert(Violation::element(id(1), ElementKind::Polygon, 3));
        result.insert(Violation::element(id(1), ElementKind::Polygon, 3));

        assert_eq!(result.len(), 3);
        let by_node = result.by_node();
        assert_eq!(by_node[&id(1)], vec![3, 9]);
        assert_eq!(by_node[&id(2)], vec![4]);
        assert_eq!(result.nodes(), vec![id(1), id(2)]);
    }

    #[test]
    fn merge_is_commutative() {
        let mut a = RuleResult::new("poles", ElementKind::Vertex);
        a.insert(Violation::element(id(1), ElementKind::Vertex, 0));
        a.push_diagnostic(Diagnostic::error("gone").with_node(id(3)));

        let mut b = RuleResult::new("poles", ElementKind::Vertex);
        b.insert(Violation::element(id(2), ElementKind::Vertex, 7));
        b.push_diagnostic(Diagnostic::warning("skipped").with_node(id(2)));

        let mut ab = a.clone();
        ab.merge(b.clone());
        let mut ba = b;
        ba.merge(a);

        assert_eq!(ab, ba);
    }

    #[test]
    fn status_reflects_findings() {
        let mut result = RuleResult::new("layers", ElementKind::Node);
        assert_eq!(result.status(), RuleStatus::Passed);

        result.insert(Violation::node(id(1)));
        assert_eq!(result.status(), RuleStatus::Failed);

        result.push_diagnostic(Diagnostic::warning("skipped a face"));
        assert_eq!(result.status(), RuleStatus::Failed);

        result.push_diagnostic(Diagnostic::error("node vanished").with_node(id(2)));
        assert_eq!(result.status(), RuleStatus::Degraded);
    }

    #[test]
    fn run_result_summaries() {
        let mut run = CheckRunResult::new();
        run.insert(RuleResult::new("triangles", ElementKind::Polygon));

        let mut ngons = RuleResult::new("ngons", ElementKind::Polygon);
        ngons.insert(Violation::element(id(1), ElementKind::Polygon, 0));
        run.insert(ngons);

        assert_eq!(run.len(), 2);
        assert_eq!(run.violation_count(), 1);
        assert_eq!(run.failed_rules(), vec!["ngons"]);
        assert!(!run.is_clean());
        assert!(run.get("triangles").is_some_and(RuleResult::is_empty));
    }

    #[test]
    fn inserting_same_rule_merges() {
        let mut run = CheckRunResult::new();
        let mut first = RuleResult::new("poles", ElementKind::Vertex);
        first.insert(Violation::element(id(1), ElementKind::Vertex, 1));
        let mut second = RuleResult::new("poles", ElementKind::Vertex);
        second.insert(Violation::element(id(1), ElementKind::Vertex, 2));

        run.insert(first);
        run.insert(second);

        assert_eq!(run.len(), 1);
        assert_eq!(run.violation_count(), 2);
    }

    #[test]
    fn display_lists_issues() {
        let mut run = CheckRunResult::new();
        let mut layers = RuleResult::new("layers", ElementKind::Node);
        layers.insert(Violation::node(id(5)));
        run.insert(layers);

        let text = run.to_string();
        assert!(text.contains("Violations: 1"));
        assert!(text.contains("layers: 1 (failed)"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn element_rule_serializes_as_node_map() {
        let mut result = RuleResult::new("ngons", ElementKind::Polygon);
        for index in [42, 3, 17] {
            result.insert(Violation::element(id(1), ElementKind::Polygon, index));
        }

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rule"], "ngons");
        assert_eq!(json["kind"], "polygon");
        assert_eq!(json["status"], "failed");
        assert_eq!(
            json["violations"][id(1).to_string()],
            serde_json::json!([3, 17, 42])
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn node_rule_serializes_as_node_list() {
        let mut result = RuleResult::new("namespaces", ElementKind::Node);
        result.insert(Violation::node(id(2)));
        result.insert(Violation::node(id(1)));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json["violations"],
            serde_json::json!([id(1).to_string(), id(2).to_string()])
        );
    }
}
