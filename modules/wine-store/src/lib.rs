pub mod audit;
pub mod cleanup;
pub mod client;
pub mod linker;
pub mod loader;
pub mod lookups;
pub mod pipeline;
pub mod reset;
pub mod source;
pub mod tasters;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use audit::{audit, AuditReport};
pub use client::WineStore;
pub use pipeline::{Pipeline, PipelineReport};
pub use source::SourceBatch;

pub use mongodb::bson::{doc, Document};
