//! Feedback types

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in the feedback log
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Rating a user gives a displayed turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLabel {
    /// Answer was helpful
    Helpful,
    /// Answer was not useful
    NotUseful,
}

impl FeedbackLabel {
    /// Label text written to the log
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackLabel::Helpful => "👍 Helpful",
            FeedbackLabel::NotUseful => "👎 Not Useful",
        }
    }

    /// Parse a label as written to the log
    pub fn from_log(value: &str) -> Option<Self> {
        match value {
            "👍 Helpful" => Some(FeedbackLabel::Helpful),
            "👎 Not Useful" => Some(FeedbackLabel::NotUseful),
            _ => None,
        }
    }
}

/// One row of the feedback log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub timestamp: NaiveDateTime,
    pub question: String,
    pub answer: String,
    /// Label text; kept as text so rows written by other tools still load
    pub feedback: String,
}

impl FeedbackRecord {
    /// Create a record stamped with the current local time
    pub fn new(question: impl Into<String>, answer: impl Into<String>, label: FeedbackLabel) -> Self {
        Self::at(Local::now().naive_local(), question, answer, label)
    }

    /// Create a record with an explicit timestamp
    pub fn at(
        timestamp: NaiveDateTime,
        question: impl Into<String>,
        answer: impl Into<String>,
        label: FeedbackLabel,
    ) -> Self {
        Self {
            timestamp,
            question: question.into(),
            answer: answer.into(),
            feedback: label.as_str().to_string(),
        }
    }

    /// Label, if the feedback text is one of the known labels
    pub fn label(&self) -> Option<FeedbackLabel> {
        FeedbackLabel::from_log(&self.feedback)
    }
}

/// Feedback request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub feedback: FeedbackLabel,
}
