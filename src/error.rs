use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidPerPage,
    PerPageTooLarge,
    InvalidOrder,
    InvalidConfig,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidPerPage => "invalid_per_page",
            ErrorCode::PerPageTooLarge => "per_page_too_large",
            ErrorCode::InvalidOrder => "invalid_order",
            ErrorCode::InvalidConfig => "invalid_config",
        }
    }
}

/// Errors raised while building a page request.
///
/// Storage failures never show up here: they are the collection's own error
/// type and reach the caller untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginateError {
    #[error("per_page must be at least 1, got {per_page}")]
    InvalidPerPage { per_page: usize },
    #[error("per_page {per_page} exceeds the maximum of {max}")]
    PerPageTooLarge { per_page: usize, max: usize },
    #[error("invalid sort order '{value}', expected 'asc' or 'desc'")]
    InvalidOrder { value: String },
    #[error("invalid config: {message}")]
    InvalidConfig { message: String },
}

impl PaginateError {
    pub fn code(&self) -> ErrorCode {
        match self {
            PaginateError::InvalidPerPage { .. } => ErrorCode::InvalidPerPage,
            PaginateError::PerPageTooLarge { .. } => ErrorCode::PerPageTooLarge,
            PaginateError::InvalidOrder { .. } => ErrorCode::InvalidOrder,
            PaginateError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
        }
    }

    pub fn code_str(&self) -> &'static str {
        self.code().as_str()
    }
}
