// Text and JSON renderings of analysis results
pub mod json_export;
pub mod report_formatter;
