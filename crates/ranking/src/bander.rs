//! Shaping a ranked list by how many candidates survived the cutoff.

use serde::{Deserialize, Serialize};
use workmatch_config::RankingConfig;

/// Which size band a result list fell into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// Nothing matched. The caller should widen the query.
    #[default]
    Empty,
    /// Few enough to show everything.
    All,
    /// A handful of pages; only the first is returned.
    FirstPage,
    /// Too many to browse. The caller should ask for an item id.
    Overflow,
}

impl Band {
    /// Band for `n` candidates with the default thresholds (5 and 15).
    pub fn for_count(n: usize) -> Self {
        ResultBander::default().band_of(n)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Band::Empty => "empty",
            Band::All => "all",
            Band::FirstPage => "first_page",
            Band::Overflow => "overflow",
        }
    }
}

impl std::fmt::Display for Band {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultBander {
    page_size: usize,
    overflow_limit: usize,
}

impl Default for ResultBander {
    fn default() -> Self {
        Self {
            page_size: 5,
            overflow_limit: 15,
        }
    }
}

impl ResultBander {
    /// `overflow_limit` is raised to `page_size` if smaller.
    pub fn new(page_size: usize, overflow_limit: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            overflow_limit: overflow_limit.max(page_size),
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.page_size, config.overflow_limit)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn band_of(&self, n: usize) -> Band {
        if n == 0 {
            Band::Empty
        } else if n <= self.page_size {
            Band::All
        } else if n <= self.overflow_limit {
            Band::FirstPage
        } else {
            Band::Overflow
        }
    }

    /// Cut an already score-sorted list down to what the caller sees.
    ///
    /// Overflowing lists are first truncated to `overflow_limit`, then to a page.
    pub fn band<T>(&self, mut sorted: Vec<T>) -> Vec<T> {
        match self.band_of(sorted.len()) {
            Band::Empty | Band::All => {}
            Band::FirstPage => sorted.truncate(self.page_size),
            Band::Overflow => {
                sorted.truncate(self.overflow_limit);
                sorted.truncate(self.page_size);
            }
        }
        sorted
    }
}
