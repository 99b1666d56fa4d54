use serde::{Deserialize, Serialize};

/// The settings for one re-ranking run.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// The number of global-retrieval candidates re-scored per query.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// The number of reference frames aggregated around each candidate.
    ///
    /// Windows are clamped at the ends of the reference sequence, so frames
    /// near the boundaries aggregate over fewer neighbors.
    #[serde(default = "default_window_length")]
    pub window_length: usize,
    /// The upper depth bound for a keypoint to count as geometrically
    /// trustworthy. Depths at or below zero are always rejected.
    #[serde(default = "default_depth_threshold")]
    pub depth_threshold: f32,
    /// Whether queries are processed by a worker pool instead of in order.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// The number of workers in the pool. Also the batch size: the driver
    /// dispatches this many queries at a time and joins between batches.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            window_length: default_window_length(),
            depth_threshold: default_depth_threshold(),
            parallel: default_parallel(),
            workers: default_workers(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

fn default_window_length() -> usize {
    5
}

fn default_depth_threshold() -> f32 {
    98.0
}

fn default_parallel() -> bool {
    false
}

fn default_workers() -> usize {
    4
}
