// Data models and period helpers shared by the metrics engine and its consumers.
pub mod models;
pub mod utils;
