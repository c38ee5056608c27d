//! Open5e API access and entity matching.
//!
//! ## Module Structure
//!
//! - `entity`: typed records and input normalization
//! - `matcher`: exact-then-partial matching
//! - `filter`: `search` vs `text` parameter per category
//! - `transport`: HTTP GET abstraction
//! - `resolver`: broad search, narrowing and listings

pub mod entity;
pub mod filter;
pub mod matcher;
pub mod resolver;
pub mod transport;

pub use entity::{normalize, Entity, UnknownEntityKind};
pub use filter::FilterPolicy;
pub use matcher::Match;
pub use resolver::{Open5eClient, Resolution, ResolutionResult, DEFAULT_RESULT_LIMIT};
pub use transport::{ReqwestTransport, Transport};
