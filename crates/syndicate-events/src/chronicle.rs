//! Chronicle Entries
//!
//! The running history of a session: everything the engine did that a player
//! (or a notification layer) might want to read back.

use serde::{Deserialize, Serialize};

use crate::{EventId, GameTime};

/// Generates a chronicle entry ID with the given sequence number.
pub fn generate_entry_id(sequence: u64) -> String {
    format!("chr_{:08}", sequence)
}

/// Primary chronicle categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    Phase,
    Economy,
    Event,
    Conflict,
    Council,
    Social,
    Roster,
    Diplomacy,
    Loyalty,
}

impl EntryCategory {
    /// Returns all category variants.
    pub fn all() -> &'static [EntryCategory] {
        &[
            EntryCategory::Phase,
            EntryCategory::Economy,
            EntryCategory::Event,
            EntryCategory::Conflict,
            EntryCategory::Council,
            EntryCategory::Social,
            EntryCategory::Roster,
            EntryCategory::Diplomacy,
            EntryCategory::Loyalty,
        ]
    }

    /// Categories a notification layer should surface immediately.
    pub fn is_urgent(&self) -> bool {
        matches!(
            self,
            EntryCategory::Conflict | EntryCategory::Loyalty | EntryCategory::Council
        )
    }
}

/// Common tags for categorizing entries.
pub mod tags {
    /// Entry concerns a blocking event
    pub const BLOCKING: &str = "blocking";
    /// Soldiers died
    pub const CASUALTIES: &str = "casualties";
    /// An officer was wounded
    pub const WOUNDED: &str = "wounded";
    /// An officer was arrested
    pub const ARRESTED: &str = "arrested";
    /// Leadership-wide loyalty drop
    pub const LOYALTY_SHOCK: &str = "loyalty_shock";
    /// The player overrode the council
    pub const VETO: &str = "veto";
    /// An officer turned against the organization
    pub const BETRAYAL: &str = "betrayal";
    /// A rebel base was founded or destroyed
    pub const REBELLION: &str = "rebellion";
    /// Soldiers walked away
    pub const DESERTION: &str = "desertion";
    /// Conflict ended in victory
    pub const VICTORY: &str = "victory";
    /// Conflict ended in defeat
    pub const DEFEAT: &str = "defeat";
    /// Romance between officers
    pub const ROMANCE: &str = "romance";
    /// Self-healing reset of corrupted state
    pub const STATE_RESET: &str = "state_reset";
}

/// A single chronicle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronicleEntry {
    pub entry_id: String,
    pub time: GameTime,
    pub category: EntryCategory,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Officer, building or rival ids involved
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
}

impl ChronicleEntry {
    pub fn new(
        entry_id: impl Into<String>,
        time: GameTime,
        category: EntryCategory,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            entry_id: entry_id.into(),
            time,
            category,
            summary: summary.into(),
            tags: Vec::new(),
            subjects: Vec::new(),
            event_id: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subjects.push(subject.into());
        self
    }

    pub fn with_event(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn involves(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == subject)
    }

    /// Serializes to a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses a single JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Phase;

    #[test]
    fn test_entry_id_format() {
        assert_eq!(generate_entry_id(7), "chr_00000007");
    }

    #[test]
    fn test_entry_builder() {
        let entry = ChronicleEntry::new(
            generate_entry_id(1),
            GameTime::new(3, Phase::Night),
            EntryCategory::Conflict,
            "The Iron Lotus hit the mahjong parlor",
        )
        .with_tag(tags::CASUALTIES)
        .with_subject("rival_iron_lotus");

        assert!(entry.has_tag(tags::CASUALTIES));
        assert!(!entry.has_tag(tags::VETO));
        assert!(entry.involves("rival_iron_lotus"));
        assert!(entry.category.is_urgent());
    }

    #[test]
    fn test_jsonl_omits_empty_fields() {
        let entry = ChronicleEntry::new(
            "chr_00000001",
            GameTime::new(1, Phase::Morning),
            EntryCategory::Economy,
            "Collected 1200",
        );
        let line = entry.to_jsonl().unwrap();
        assert!(!line.contains("tags"));
        assert!(!line.contains("event_id"));
        assert!(line.contains("\"day_1.morning\""));

        let parsed = ChronicleEntry::from_jsonl(&line).unwrap();
        assert_eq!(parsed, entry);
    }

    #[test]
    fn test_all_categories_listed() {
        assert_eq!(EntryCategory::all().len(), 9);
    }
}
