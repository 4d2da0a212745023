use std::time::Duration;

use dynlist_types::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Runtime knobs of a [`ListEngine`](crate::ListEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest page size a request may ask for.
    pub max_limit: u32,
    /// Page size used when a request does not send one.
    pub default_limit: u32,
    /// Upper bound on one statement's execution; `None` waits indefinitely.
    pub statement_timeout: Option<Duration>,
    /// Statement text in failure logs is cut to this many characters.
    pub log_statement_max_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_limit: MAX_PAGE_LIMIT,
            default_limit: DEFAULT_PAGE_LIMIT,
            statement_timeout: None,
            log_statement_max_len: 2048,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_limit(mut self, max_limit: u32) -> Self {
        self.max_limit = max_limit;
        self
    }

    #[must_use]
    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        self.default_limit = default_limit;
        self
    }

    #[must_use]
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_log_statement_max_len(mut self, len: usize) -> Self {
        self.log_statement_max_len = len;
        self
    }

    /// Cuts statement text for logging, on a character boundary.
    pub(crate) fn truncate_statement<'a>(&self, sql: &'a str) -> &'a str {
        match sql.char_indices().nth(self.log_statement_max_len) {
            Some((index, _)) => &sql[..index],
            None => sql,
        }
    }
}
