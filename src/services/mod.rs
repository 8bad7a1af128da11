pub mod content_service;
pub mod workbook_exporter;

pub use content_service::{ContentProvider, GeminiContentService};
pub use workbook_exporter::WorkbookExporter;
