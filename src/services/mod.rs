pub mod acquisition;
pub mod chart;
pub mod indicators;
pub mod report;
pub mod window_stats;
