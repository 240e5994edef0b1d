//! Flat spreadsheet row -> nested topic document.

use super::spreadsheet::Record;
use common::model::topic::{
    Activity, TopicDocument, TopicEntry, Videos, ACTIVITY_DURATION, DEFAULT_CHAPTER,
    DEFAULT_CURRICULUM,
};

/// Column headers the transformer understands. Anything else in the sheet is ignored.
pub mod cols {
    pub const TOPIC: &str = "Topic";
    pub const SUBJECT: &str = "Subject";
    pub const CLASS: &str = "Class";
    pub const CHAPTER: &str = "Chapter";
    pub const CURRICULUM_TYPE: &str = "Curriculum_Type";
    pub const DESCRIPTION: &str = "Description";
    pub const VR_URL: &str = "VR_URL";
    pub const VIDEO_URL: &str = "Video_URL";
    pub const WEBGL_URL: &str = "WebGL_URL";
}

/// One spreadsheet row with every recognized column optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicRow {
    pub topic: Option<String>,
    pub subject: Option<String>,
    pub class: Option<String>,
    pub chapter: Option<i64>,
    pub curriculum_type: Option<String>,
    pub description: Option<String>,
    pub vr_url: Option<String>,
    pub video_url: Option<String>,
    pub webgl_url: Option<String>,
}

impl TopicRow {
    /// Picks the recognized columns out of a record.
    ///
    /// A `Chapter` cell that is not a whole number counts as missing.
    pub fn from_record(record: &Record) -> Self {
        let text = |column: &str| record.get(column).cloned();
        TopicRow {
            topic: text(cols::TOPIC),
            subject: text(cols::SUBJECT),
            class: text(cols::CLASS),
            chapter: record.get(cols::CHAPTER).and_then(|c| parse_chapter(c)),
            curriculum_type: text(cols::CURRICULUM_TYPE),
            description: text(cols::DESCRIPTION),
            vr_url: text(cols::VR_URL),
            video_url: text(cols::VIDEO_URL),
            webgl_url: text(cols::WEBGL_URL),
        }
    }
}

fn parse_chapter(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Builds the document for one row. Pure and infallible.
pub fn transform_row(row: &TopicRow) -> TopicDocument {
    let activity_title = match row.topic.as_deref() {
        Some(topic) => format!("{} Activity", topic),
        None => "Activity".to_string(),
    };

    TopicDocument {
        title: row.topic.clone(),
        subject: row.subject.clone(),
        grade_level: row.class.clone(),
        chapter_number: row.chapter.unwrap_or(DEFAULT_CHAPTER),
        curriculum: row
            .curriculum_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CURRICULUM.to_string()),
        description: row.description.clone(),
        topics: vec![TopicEntry {
            title: row.topic.clone(),
            activities: vec![Activity {
                title: activity_title,
                description: row.description.clone(),
                videos: Videos {
                    vr_link: row.vr_url.clone(),
                    mobile_link: row.video_url.clone(),
                    demo_link: row.webgl_url.clone(),
                },
                duration: ACTIVITY_DURATION,
            }],
        }],
    }
}

/// Transforms every row, keeping row order. Identical rows stay separate documents.
pub fn transform_rows(rows: &[TopicRow]) -> Vec<TopicDocument> {
    rows.iter().map(transform_row).collect()
}
