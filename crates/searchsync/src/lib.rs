//! Facade crate for searchsync.
//!
//! ## Crate layout
//! - `core`: path model, reindexing resolver graph, dirtiness filter,
//!   collector, and observability.
//! - `elastic`: Elasticsearch aggregation request assembly and typed
//!   response extraction.
//! - `query`: legacy direct-index hits window and cooperative timeout
//!   manager.
//!
//! The `prelude` module mirrors the runtime surface used by integrating
//! mappers and query layers.
#![warn(unreachable_pub)]

pub use searchsync_core as core;
pub use searchsync_elastic as elastic;
pub use searchsync_query as query;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use searchsync_core::error::{ErrorClass, ErrorOrigin, InternalError};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        core::prelude::*,
        elastic::prelude::*,
        query::prelude::*,
    };
}

///
/// TESTS
///
