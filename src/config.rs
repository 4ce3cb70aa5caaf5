use std::path::PathBuf;

/// Dataset read when the user has not uploaded anything.
pub const FALLBACK_PATH: &str = "Imports_Exports_Dataset.csv";
/// Rows drawn from the fallback dataset.
pub const SAMPLE_SIZE: usize = 3001;
/// Seed for the fallback sample so every start shows the same rows.
pub const SAMPLE_SEED: u64 = 55005;

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub fallback_path: PathBuf,
    pub sample_size: usize,
    pub sample_seed: u64,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub sidebar_width: f32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fallback_path: PathBuf::from(FALLBACK_PATH),
            sample_size: SAMPLE_SIZE,
            sample_seed: SAMPLE_SEED,
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 500.0],
            sidebar_width: 240.0,
        }
    }
}
