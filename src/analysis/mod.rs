/// Line-based hygiene checks and manifest inspection
pub mod boundary;
pub mod dependencies;
pub mod duplicate_detector;
pub mod error;
pub mod file_classifier;
pub mod lines;
pub mod metrics;
pub mod scanner;
pub mod violation;

// Re-export commonly used types
pub use error::ManifestError;
pub use file_classifier::{classify_path, is_excluded, FileCategory, ManifestKind};
pub use lines::{split_lines, Line};
pub use scanner::{scan_lines, scan_text, HygieneReport, ScanOptions};
pub use violation::{Violation, ViolationKind};
