//! GitHub Projects v2 board synchronizer.

pub mod client;
pub(crate) mod queries;
pub mod types;

pub use client::{ProjectsClient, parse_repository};
pub use types::{
    BulkOutcome, FieldDataType, FieldOption, ProjectField, ProjectProgress, parse_fields,
};
