mod generator;

pub use generator::{parse_summary, Summarizer, Summary, SummaryError, SummaryGenerator};
