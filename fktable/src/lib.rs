//! `fktable` stores fast-kernel (FK) tables and convolves them with parton distribution functions.
//!
//! An FK table is a precomputed tensor that, contracted with PDFs evaluated on its x grid, yields
//! predictions for a set of datapoints. See [`fk_table::FkTable`] for the layout of the tensor,
//! [`header::FkHeader`] for the metadata and [`convolutions::PdfEvaluator`] for the interface to
//! PDFs.
//!
//! Diagnostic output is emitted through `tracing`; install a subscriber to see it.

pub mod cfactors;
pub mod convolutions;
pub mod error;
mod export;
pub mod fk_table;
pub mod flavour_map;
pub mod header;
pub mod pids;
pub mod scalar;
