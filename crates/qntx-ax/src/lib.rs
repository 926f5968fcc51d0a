//! QNTX query pipeline
//!
//! Wires together alias resolution, fuzzy expansion, SQL retrieval, Cartesian
//! claim expansion, grouping, conflict classification, and resolution-strategy
//! filtering into a single [`pipeline::execute_query`] entry point.

pub mod config;
pub mod error;
pub mod expander;
pub mod pipeline;
pub mod query;
pub mod resolution;

pub use config::{Config, ConfigHandle};
pub use error::{PipelineError, Result};
pub use expander::{EntityResolver, ExpandedClause, NoopEntityResolver, NoopQueryExpander, QueryExpander};
pub use pipeline::{execute_query, AxSummaryOut, PipelineDebug, PipelineResult};
pub use query::build_filter;
