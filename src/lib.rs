// Export modules for use in tests
pub mod settings;
pub mod spool;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the print pipeline surface
pub use spool::{print_report, Orientation, PlacementPolicy, PrintFault};
