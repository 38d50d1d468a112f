//! Feedback log and spreadsheet export

pub mod export;
pub mod log;

pub use export::{build_workbook, export_recent, EXPORT_FILE_NAME, XLSX_CONTENT_TYPE};
pub use log::FeedbackLog;
