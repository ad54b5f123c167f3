//! Diff & summary generator
//!
//! Compares two snapshots by concept code. A concept whose display text
//! changed between the snapshots counts as unchanged.

use crate::domain::{Concept, ConceptSnapshot};
use serde::Serialize;
use std::fmt::Write as _;

/// Concepts added and removed between two snapshots
///
/// `added` is in the after snapshot's code order, `removed` in the before
/// snapshot's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    pub added: Vec<Concept>,
    pub removed: Vec<Concept>,
}

/// Computes `after \ before` and `before \ after`
///
/// # Examples
///
/// ```
/// use procedures_sync::core::diff::diff;
/// use procedures_sync::domain::{Concept, ConceptSnapshot, ConceptSource};
///
/// let c = |code: &str| Concept::new(code, code, ConceptSource::BodySite);
/// let before = ConceptSnapshot::from_concepts(vec![c("A"), c("B")]);
/// let after = ConceptSnapshot::from_concepts(vec![c("B"), c("C")]);
///
/// let report = diff(&before, &after);
/// assert_eq!(report.added, vec![c("C")]);
/// assert_eq!(report.removed, vec![c("A")]);
/// ```
pub fn diff(before: &ConceptSnapshot, after: &ConceptSnapshot) -> DiffReport {
    let added = after
        .iter()
        .filter(|c| !before.contains(&c.code))
        .cloned()
        .collect();
    let removed = before
        .iter()
        .filter(|c| !after.contains(&c.code))
        .cloned()
        .collect();

    DiffReport { added, removed }
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Log the diff summary
    pub fn log_summary(&self) {
        tracing::info!(
            added = self.added.len(),
            removed = self.removed.len(),
            "Concept diff"
        );
        for concept in &self.added {
            tracing::info!(
                code = %concept.code,
                display = %concept.display,
                source = %concept.source,
                "Added"
            );
        }
        for concept in &self.removed {
            tracing::info!(
                code = %concept.code,
                display = %concept.display,
                source = %concept.source,
                "Removed"
            );
        }
    }

    /// Human readable summary
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.is_empty() {
            out.push_str("No concept changes\n");
            return out;
        }

        let _ = writeln!(out, "Added ({}):", self.added.len());
        for c in &self.added {
            let _ = writeln!(out, "  + {} {} [{}]", c.code, c.display, c.source);
        }
        let _ = writeln!(out, "Removed ({}):", self.removed.len());
        for c in &self.removed {
            let _ = writeln!(out, "  - {} {} [{}]", c.code, c.display, c.source);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConceptSource;

    fn concept(code: &str, display: &str) -> Concept {
        Concept::new(code, display, ConceptSource::BodySite)
    }

    fn snapshot(concepts: &[(&str, &str)]) -> ConceptSnapshot {
        ConceptSnapshot::from_concepts(concepts.iter().map(|(c, d)| concept(c, d)))
    }

    #[test]
    fn test_added_and_removed() {
        let before = snapshot(&[("A", "Arm"), ("B", "Back")]);
        let after = snapshot(&[("B", "Back"), ("C", "Chest")]);

        let report = diff(&before, &after);
        assert_eq!(report.added, vec![concept("C", "Chest")]);
        assert_eq!(report.removed, vec![concept("A", "Arm")]);
    }

    #[test]
    fn test_display_change_is_not_a_change() {
        let before = snapshot(&[("A", "Arm")]);
        let after = snapshot(&[("A", "Upper limb")]);
        assert!(diff(&before, &after).is_empty());
    }

    #[test]
    fn test_order_follows_code_order() {
        let before = ConceptSnapshot::new();
        let after = snapshot(&[("Z", "Zygoma"), ("A", "Arm"), ("M", "Mandible")]);

        let result = diff(&before, &after);
        let codes: Vec<&str> = result
            .added
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["A", "M", "Z"]);
    }

    #[test]
    fn test_identical_snapshots() {
        let s = snapshot(&[("A", "Arm")]);
        let report = diff(&s, &s);
        assert!(report.is_empty());
        assert_eq!(report.render(), "No concept changes\n");
    }

    #[test]
    fn test_render() {
        let report = diff(&snapshot(&[("A", "Arm")]), &snapshot(&[("C", "Chest")]));
        assert_eq!(
            report.render(),
            "Added (1):\n  + C Chest [bodySite]\nRemoved (1):\n  - A Arm [bodySite]\n"
        );
    }
}
