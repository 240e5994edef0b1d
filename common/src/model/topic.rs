use serde::{Deserialize, Serialize};

/// Every activity generated from a spreadsheet row lasts this many minutes.
pub const ACTIVITY_DURATION: u32 = 20;

/// Chapter used when the row carries no usable `Chapter` cell.
pub const DEFAULT_CHAPTER: i64 = 1;

/// Curriculum used when the row carries no `Curriculum_Type` cell.
pub const DEFAULT_CURRICULUM: &str = "General";

/// The persisted shape of one spreadsheet row.
///
/// The structure is identical for every row: optional source cells become `null`
/// instead of disappearing, so consumers can rely on every key being present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDocument {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub grade_level: Option<String>,
    pub chapter_number: i64,
    pub curriculum: String,
    pub description: Option<String>,
    /// Always holds exactly one entry.
    pub topics: Vec<TopicEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicEntry {
    pub title: Option<String>,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub title: String,
    pub description: Option<String>,
    pub videos: Videos,
    /// Minutes.
    pub duration: u32,
}

/// Links to the three renditions of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Videos {
    pub vr_link: Option<String>,
    pub mobile_link: Option<String>,
    pub demo_link: Option<String>,
}
