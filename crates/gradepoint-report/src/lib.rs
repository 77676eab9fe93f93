//! gradepoint-report: Report rendering.
//!
//! Turns a [`TranscriptReport`](gradepoint_core::report::TranscriptReport)
//! into a self-contained HTML page.

pub mod html;

pub use html::{generate_html, write_html_report};
