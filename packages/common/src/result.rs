use crate::error::CommonError;

/// Result alias for filesystem and document helpers
pub type CommonResult<T> = Result<T, CommonError>;
