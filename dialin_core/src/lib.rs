#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Predictive and optimization core for espresso dial-in.
//!
//! Given a history of logged trials and the current shot's parameters,
//! this crate computes derived metrics, trains three small models and
//! produces ranked, constraint-respecting parameter suggestions. It is a
//! synchronous, on-demand pipeline with no I/O; persistence, rendering
//! and input collection live in the collaborating crates.
//!
//! ## Architecture
//!
//! - **History**: newest-first trial records with one-level delete undo
//!   (`history` module)
//! - **Features**: fixed-order feature vectors and the taste score
//!   (`features`), heuristic EY/TDS estimates (`estimate`)
//! - **Models**: informative-prior ridge regression and influence ranking
//!   (`ridge`), elastic-net surrogate (`elastic_net`), Gaussian process
//!   with Expected Improvement (`gp`, `optimize`)
//! - **Decisions**: the rule-based recommender (`recommend`)
//! - **Support**: grinder dial arithmetic (`grinder`), Gauss-Jordan
//!   solver (`linalg`)
//!
//! Models are pure functions of their inputs and are recomputed per
//! invocation; the only mutable state is the caller-owned history. The
//! optimizer's sampling is injectable via `rand::Rng` so tests can run
//! fully seeded.

pub mod elastic_net;
pub mod error;
pub mod estimate;
pub mod features;
pub mod gp;
pub mod grinder;
pub mod history;
pub mod linalg;
pub mod optimize;
pub mod recommend;
pub mod ridge;
pub mod types;

pub use error::{Result, SingularMatrix};
pub use grinder::{GrinderKind, GrinderState};
pub use history::{History, TrialRecord};
pub use optimize::{BoDiagnostics, BoOutcome, BoSuggestion};
pub use recommend::{Action, ActionKey, Flags, Recommendation};
pub use ridge::{Influence, PredictiveModel};
pub use types::{BrewParams, Defects, Metrics, Positives, PrepFlags};
