pub mod circular;
pub mod output;
pub mod stats;
