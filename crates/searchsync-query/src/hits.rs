use crate::timeout::{TimeoutManager, TimeoutMode};
use searchsync_core::error::InternalError;

/// Hits fetched up front before anything is asked for.
const INITIAL_WINDOW: usize = 100;

/// How many extraction steps run between two timeout polls.
const DEFAULT_POLL_INTERVAL: usize = 10;

///
/// Searcher
///
/// The backend call seam: run the query again with a result window of the
/// given size. Re-running with a larger window is how the hits cache grows;
/// the backend has no cursor to resume from.
///

pub trait Searcher {
    type Hit;

    fn search(&mut self, window_size: usize) -> Result<HitPage<Self::Hit>, InternalError>;
}

///
/// HitPage
///
/// One search result window plus the query's total hit count.
///

pub struct HitPage<H> {
    pub hits: Vec<H>,
    pub total: u64,
}

///
/// QueryHits
///
/// Cached hits of one query. Hits are fetched lazily: asking for an index
/// beyond the cached window re-runs the query with a doubled window.
/// Extraction polls the timeout manager between steps; in exception mode a
/// timeout propagates, in limit mode extraction stops early and the result
/// is flagged partial.
///

pub struct QueryHits<S: Searcher> {
    searcher: S,
    timeout: TimeoutManager,
    poll_interval: usize,
    window: Vec<S::Hit>,
    total: Option<u64>,
    partial: bool,
}

///
/// Extraction
///
/// The hits an extraction pass produced. `partial` is set when a limit-mode
/// timeout truncated the pass before the requested window was filled.
///

#[derive(Debug)]
pub struct Extraction<'a, H> {
    pub hits: &'a [H],
    pub partial: bool,
}

impl<S: Searcher> QueryHits<S> {
    #[must_use]
    pub fn new(searcher: S, mut timeout: TimeoutManager) -> Self {
        timeout.start();

        Self {
            searcher,
            timeout,
            poll_interval: DEFAULT_POLL_INTERVAL,
            window: Vec::new(),
            total: None,
            partial: false,
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: usize) -> Self {
        self.poll_interval = poll_interval.max(1);
        self
    }

    /// Total hit count of the query, fetching the first window if nothing
    /// has been fetched yet.
    pub fn total(&mut self) -> Result<u64, InternalError> {
        if self.total.is_none() {
            self.ensure_index(0)?;
        }

        Ok(self.total.unwrap_or(0))
    }

    /// The hit at `index`, or None past the end of the results.
    pub fn hit(&mut self, index: usize) -> Result<Option<&S::Hit>, InternalError> {
        if self.ensure_index(index)? {
            return Ok(self.window.get(index));
        }

        Ok(None)
    }

    /// Extract up to `limit` hits starting at `offset`, polling the timeout
    /// between steps.
    pub fn extract(
        &mut self,
        offset: usize,
        limit: usize,
    ) -> Result<Extraction<'_, S::Hit>, InternalError> {
        let mut available = 0;
        let mut truncated = false;

        for step in 0..limit {
            if step % self.poll_interval == 0 {
                self.timeout.check()?;
                if self.timeout.mode() == TimeoutMode::Limit && self.timeout.is_timed_out() {
                    truncated = true;
                    break;
                }
            }
            if !self.ensure_index(offset + step)? {
                break;
            }
            available = step + 1;
        }

        if truncated {
            self.partial = true;
        }

        let start = offset.min(self.window.len());
        let end = (offset + available).min(self.window.len());

        Ok(Extraction {
            hits: &self.window[start..end],
            partial: truncated,
        })
    }

    /// Whether any extraction pass was truncated by a limit-mode timeout.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.partial
    }

    // Grow the cached window until it covers `index`, re-running the query
    // with a doubled window when it does not. Returns whether a hit exists
    // at `index`.
    fn ensure_index(&mut self, index: usize) -> Result<bool, InternalError> {
        if index < self.window.len() {
            return Ok(true);
        }
        if let Some(total) = self.total
            && u64::try_from(index).unwrap_or(u64::MAX) >= total
        {
            return Ok(false);
        }

        let requested = (index + 1).max(self.window.len() * 2).max(INITIAL_WINDOW);
        let page = self.searcher.search(requested)?;
        self.total = Some(page.total);
        self.window = page.hits;

        Ok(index < self.window.len())
    }
}

///
/// TESTS
///
