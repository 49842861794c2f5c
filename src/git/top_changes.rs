use crate::git::classify::extract_reference;
use crate::git::{ChangeType, CommitRecord};
use serde::{Deserialize, Deserializer, Serialize};

/// Default number of top changes selected
pub const DEFAULT_TOP_CHANGES: usize = 3;

/// Priority for types without an explicit entry; ranks after all of them
const UNRANKED: u8 = 99;

/// A representative change picked for the report headline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopChange {
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    /// The commit subject
    pub summary: String,
    /// Human-readable impact label for the type
    pub impact: String,
    /// Issue/PR number referenced as `#<digits>` in the subject
    #[serde(default, alias = "pr_number", deserialize_with = "reference_number")]
    pub reference: Option<u64>,
    /// Short hash of the commit
    #[serde(default)]
    pub commit: String,
}

/// Older snapshots stored the number as a digit string
fn reference_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Number(u64),
        Digits(String),
    }

    Ok(match Option::<Stored>::deserialize(deserializer)? {
        Some(Stored::Number(n)) => Some(n),
        Some(Stored::Digits(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Selection rank of a change type (lower ranks first)
pub fn priority(change_type: ChangeType) -> u8 {
    match change_type {
        ChangeType::Feature => 1,
        ChangeType::Fix => 2,
        ChangeType::Refactor => 3,
        ChangeType::Performance => 4,
        _ => UNRANKED,
    }
}

/// Impact label shown next to a change of this type
pub fn impact_label(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Feature => "Feature added",
        ChangeType::Fix => "Bug fixed",
        ChangeType::Refactor => "Code improved",
        ChangeType::Performance => "Performance improved",
        ChangeType::Docs => "Docs updated",
        ChangeType::Test => "Tests added",
        ChangeType::Chore => "Maintenance",
        ChangeType::Style => "Code style",
        ChangeType::Other => "Other change",
    }
}

/// Pick up to `max_count` commits ordered by type priority.
///
/// The sort is stable, so commits of equal priority keep their input order.
pub fn select(commits: &[CommitRecord], max_count: usize) -> Vec<TopChange> {
    let mut ranked: Vec<&CommitRecord> = commits.iter().collect();
    ranked.sort_by_key(|c| priority(c.change_type));

    ranked
        .into_iter()
        .take(max_count)
        .map(|c| TopChange {
            change_type: c.change_type,
            summary: c.subject.clone(),
            impact: impact_label(c.change_type).to_string(),
            reference: extract_reference(&c.subject),
            commit: c.short_hash.clone(),
        })
        .collect()
}
