//! Seq2Single re-ranks coarse place-recognition candidates between two
//! image traverses captured from opposing viewpoints under differing
//! appearance.
//!
//! Global-descriptor retrieval proposes a short candidate list per query
//! image; each candidate is then re-scored by matching dense local
//! descriptors per feature channel, where every channel's keypoint is the
//! spatial cell of its maximal response. Reference-side keypoints are
//! pruned by estimated depth, and a short window of neighboring reference
//! frames contributes each channel's best match, so the temporal
//! neighborhood substitutes for exact spatial alignment between a
//! front-facing and a rear-facing camera. The candidate of minimum mean
//! distance wins.
//!
//! The crate consumes precomputed numeric arrays (global descriptors,
//! dense descriptor tensors, depth maps); no feature extraction happens
//! here.

pub mod dataset;
pub mod depth;
pub mod distance;
pub mod driver;
pub mod error;
pub mod features;
pub mod projection;
pub mod rerank;
pub mod retrieval;
pub mod settings;
pub mod window;

pub use dataset::{Dataset, QuerySet, ReferenceData};
pub use driver::{run, write_match_table, MatchTables};
pub use error::{Error, Result};
pub use rerank::rerank_candidates;
pub use retrieval::{retrieve_candidates, Retrieval};
pub use settings::Settings;
