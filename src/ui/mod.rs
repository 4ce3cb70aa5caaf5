/// Presentation layer: every widget reads a [`crate::pipeline::DashboardView`]
/// and only writes widget selections back into the app state.
pub mod charts;
pub mod dashboard;
pub mod panels;
pub mod table;
