//! Test harness for nameplate builds.
//!
//! Scripts whole builds, checks the finished solids with mesh and sampling
//! oracles, and renders diagnostic reports.
//!
//! # Key Components
//!
//! - [`PlateScenario`]: fluent builder that configures and runs one build
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`sampling`]: point-in-solid samples along vertical columns
//! - [`fixtures`]: a small block font with independently known areas
//! - [`report`]: structured text and JSON build descriptions
//! - [`assertions`]: assertion helpers with diagnostics

pub mod assertions;
pub mod fixtures;
pub mod helpers;
pub mod oracle;
pub mod report;
pub mod sampling;
pub mod scenario;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use report::NameplateReport;
pub use scenario::{BuiltPlate, PlateScenario};
