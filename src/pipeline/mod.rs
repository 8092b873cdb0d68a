//! The two ingestion stages and their shared Parquet sink.
//!
//! `catalog` must run before `events` within a run: the event stage re-reads
//! the songs table from the destination for its enrichment join. The
//! orchestrator's strict sequencing is the only ordering mechanism, and the
//! only one needed.

pub mod catalog;
pub mod events;
pub mod sink;
