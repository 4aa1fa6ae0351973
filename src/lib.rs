//! bincuts: quantile cut-point generation and feature discretization.
//!
//! Histogram-based tree learners need continuous features reduced to a small
//! number of ordered bins before per-bin statistics can be accumulated. This
//! crate computes the bin boundaries ("cut points") for one feature at a time
//! and maps raw values to bin indices.
//!
//! Cut points are chosen so that no cut falls inside a run of equal values,
//! every bin holds at least a configurable minimum of instances, and ties
//! between equally good layouts are broken by a seeded shuffle rather than by
//! array position. The same seed and input always reproduce the same cuts.
//!
//! # Example
//!
//! ```
//! use bincuts::{discretize, generate_quantile_cuts};
//!
//! let mut values: Vec<f64> = (1..=100).map(f64::from).collect();
//! let raw = values.clone();
//! let output = generate_quantile_cuts(42, &mut values, 4, 1).unwrap();
//! assert_eq!(output.cut_points.len(), 3);
//!
//! let bins = discretize(output.had_missing, &output.cut_points, &raw);
//! assert!(bins.iter().all(|&b| (0..4).contains(&b)));
//! ```

mod cuts;
mod discretize;
mod error;
mod ordering;
mod quota;
mod random;
mod segment;

pub use cuts::{generate_quantile_cuts, CutOutput};
pub use discretize::discretize;
pub use error::CutError;
pub use random::{IndexSource, SeededIndexSource};
