//! Legacy direct-index query support for searchsync: the lazily growing
//! hits window and the cooperative poll-based timeout manager.
#![warn(unreachable_pub)]

pub mod hits;
pub mod timeout;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        hits::{Extraction, HitPage, QueryHits, Searcher},
        timeout::{Clock, MonotonicClock, TimeoutManager, TimeoutMode},
    };
}
