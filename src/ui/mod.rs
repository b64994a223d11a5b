// UI and formatting module

pub mod sensor_formatters;

// Re-export commonly used items for cleaner imports
pub use sensor_formatters::{format_snapshot, print_snapshot};
