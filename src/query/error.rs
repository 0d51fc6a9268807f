use std::fmt;

/// Failures raised by [`MemoryCollection`](crate::query::memory::MemoryCollection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    ScanBoundExceeded {
        estimated_rows: u64,
        max_scan_rows: u64,
    },
    InvalidQuery {
        reason: String,
    },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ScanBoundExceeded {
                estimated_rows,
                max_scan_rows,
            } => write!(
                f,
                "scan bound exceeded: estimated_rows={estimated_rows}, max_scan_rows={max_scan_rows}"
            ),
            QueryError::InvalidQuery { reason } => write!(f, "invalid query: {reason}"),
        }
    }
}

impl std::error::Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::QueryError;

    #[test]
    fn query_error_display_is_human_readable() {
        let err = QueryError::ScanBoundExceeded {
            estimated_rows: 20,
            max_scan_rows: 10,
        };
        assert_eq!(
            err.to_string(),
            "scan bound exceeded: estimated_rows=20, max_scan_rows=10"
        );
    }
}
