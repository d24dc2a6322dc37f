use super::rate::{ParseFailure, parse_counter, round2};

pub const PAGES_DATA: &str = "innodb_buffer_pool_pages_data";
pub const PAGES_TOTAL: &str = "innodb_buffer_pool_pages_total";

/// Percentage of `total_pages` in use, rounded to two decimals.
///
/// `None` when either side was not observed or the pool reports zero pages.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_usage_ratio(used_pages: Option<u64>, total_pages: Option<u64>) -> Option<f64> {
    let (used, total) = used_pages.zip(total_pages)?;
    if total == 0 {
        return None;
    }

    let ratio = round2(used as f64 * 100.0 / total as f64);
    ratio.is_finite().then_some(ratio)
}

/// Buffer pool page gauges seen during a single poll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferPageSnapshot {
    pub data_pages: Option<u64>,
    pub total_pages: Option<u64>,
}

impl BufferPageSnapshot {
    /// Returns true when `field` is one of the two page gauges.
    #[must_use]
    pub fn tracks(field: &str) -> bool {
        field == PAGES_DATA || field == PAGES_TOTAL
    }

    /// Record a page gauge row. Rows for other fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ParseFailure` if the value is not a page count; the snapshot
    /// is left unchanged in that case.
    pub fn record(&mut self, field: &str, raw: &str) -> Result<(), ParseFailure> {
        let slot = match field {
            PAGES_DATA => &mut self.data_pages,
            PAGES_TOTAL => &mut self.total_pages,
            _ => return Ok(()),
        };
        *slot = Some(parse_counter(raw)?);
        Ok(())
    }

    #[must_use]
    pub fn usage(&self) -> Option<f64> {
        compute_usage_ratio(self.data_pages, self.total_pages)
    }
}
