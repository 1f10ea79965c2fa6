/// Human-readable report rendering for hook output
pub mod report;

pub use report::{render_dependency_block, render_hygiene_block};
