//! Data models for the client
//!
//! Albums and videos are read-through projections of server state. Identifiers, the
//! language hint and the selected input file are owned by the client.

mod album;
mod file;
mod ids;
mod language;
mod video;

pub use album::*;
pub use file::*;
pub use ids::*;
pub use language::*;
pub use video::*;
