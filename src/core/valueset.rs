//! Value set builder
//!
//! Groups canonical records by category into [`ValueSet`]s. Group order is the
//! order in which each category is first seen, and member order within a group
//! is source order. Building is pure.

use crate::domain::{CanonicalRecord, Member, ValueSet};
use std::collections::{HashMap, HashSet};

/// Builds one value set per category found in `records`
///
/// Duplicate codes within a category are removed by [`dedup_members`].
///
/// # Examples
///
/// ```
/// use procedures_sync::core::valueset::build_value_sets;
/// use procedures_sync::domain::CanonicalRecord;
///
/// let records = vec![
///     CanonicalRecord::new("Body Site", "C1", "Arm", ""),
///     CanonicalRecord::new("Procedure", "P1", "X-ray", ""),
///     CanonicalRecord::new("Body Site", "C2", "Leg", ""),
/// ];
/// let value_sets = build_value_sets(records);
/// assert_eq!(value_sets.len(), 2);
/// assert_eq!(value_sets[0].name, "Body Site");
/// assert_eq!(value_sets[0].members.len(), 2);
/// ```
pub fn build_value_sets<I>(records: I) -> Vec<ValueSet>
where
    I: IntoIterator<Item = CanonicalRecord>,
{
    group_by_category(records)
        .into_iter()
        .map(|(category, members)| ValueSet::new(category, dedup_members(members)))
        .collect()
}

/// Groups records by category, preserving first-seen order
///
/// Returns `(category, members)` pairs; duplicates are kept at this stage.
pub fn group_by_category<I>(records: I) -> Vec<(String, Vec<Member>)>
where
    I: IntoIterator<Item = CanonicalRecord>,
{
    let mut groups: Vec<(String, Vec<Member>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let member = Member::new(record.code, record.display_name);
        match index.get(&record.category) {
            Some(&i) => groups[i].1.push(member),
            None => {
                index.insert(record.category.clone(), groups.len());
                groups.push((record.category, vec![member]));
            }
        }
    }

    groups
}

/// Stable dedup by code: the first occurrence wins, later ones are dropped
///
/// Dropping is silent. Re-running a conversion over a file that repeats a code
/// yields the same member list every time.
pub fn dedup_members(members: Vec<Member>) -> Vec<Member> {
    let mut seen: HashSet<String> = HashSet::with_capacity(members.len());
    members
        .into_iter()
        .filter(|m| seen.insert(m.code.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, code: &str, display: &str) -> CanonicalRecord {
        CanonicalRecord::new(category, code, display, "")
    }

    #[test]
    fn test_dedup_keeps_first_display() {
        let members = vec![
            Member::new("C1", "Arm"),
            Member::new("C2", "Leg"),
            Member::new("C1", "Upper arm"),
        ];
        let deduped = dedup_members(members);

        assert_eq!(
            deduped,
            vec![Member::new("C1", "Arm"), Member::new("C2", "Leg")]
        );
    }

    #[test]
    fn test_duplicate_code_yields_single_member() {
        let value_sets = build_value_sets(vec![
            record("Body Site", "C1", "Arm"),
            record("Body Site", "C1", "Arm (duplicate)"),
        ]);

        assert_eq!(value_sets.len(), 1);
        assert_eq!(value_sets[0].members, vec![Member::new("C1", "Arm")]);
    }

    #[test]
    fn test_same_code_in_different_categories_is_kept() {
        let value_sets = build_value_sets(vec![
            record("Body Site", "C1", "Arm"),
            record("Radiology", "C1", "Arm"),
        ]);

        assert_eq!(value_sets.len(), 2);
        assert_eq!(value_sets[1].members.len(), 1);
    }

    #[test]
    fn test_group_order_is_first_seen() {
        let groups = group_by_category(vec![
            record("Radiology", "R1", "CT"),
            record("Body Site", "C1", "Arm"),
            record("Radiology", "R2", "MRI"),
        ]);

        let names: Vec<_> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Radiology", "Body Site"]);
        let codes: Vec<_> = groups[0].1.iter().map(|m| m.code.as_str()).collect();
        assert_eq!(codes, vec!["R1", "R2"]);
    }

    #[test]
    fn test_building_twice_is_identical() {
        let records = vec![
            record("Body Site", "C1", "Arm"),
            record("Body Site", "C2", "Leg"),
            record("Procedure", "P1", "X-ray"),
        ];

        let first = build_value_sets(records.clone());
        let second = build_value_sets(records);

        assert_eq!(first, second);
        assert_eq!(first[0].identifier, second[0].identifier);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_value_sets(Vec::new()).is_empty());
    }
}
