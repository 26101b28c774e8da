//! Resolution sweep benchmark for the landmark quadtree.
//!
//! Seeds random landmarks, then for a range of resolutions times a tree
//! search against a brute-force scan and writes the numbers to text files.

pub mod config;
pub mod generate;
pub mod output;
pub mod sweep;

pub use config::Config;
pub use sweep::SweepRecord;
