//! Input validation utilities for CLI commands
//!
//! Consistent validation across commands with clear error messages.

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Validation limits for CLI operations
pub mod limits {
    /// Maximum writer threads
    pub const MAX_BENCH_THREADS: usize = 256;
    /// Maximum records per batched write call
    pub const MAX_BATCH_SIZE: usize = 100_000;
    /// Maximum attempts per write unit
    pub const MAX_ATTEMPTS: u32 = 10;
    /// Maximum regions for a pre-split
    pub const MAX_REGIONS: i64 = 65_536;
}

/// Validate benchmark parameters
pub fn validate_bench_params(threads: usize, batch_size: usize, attempts: u32) -> CliResult<()> {
    if threads == 0 {
        return Err("threads must be at least 1".into());
    }
    if threads > limits::MAX_BENCH_THREADS {
        return Err(format!("threads cannot exceed {}", limits::MAX_BENCH_THREADS).into());
    }
    if batch_size == 0 {
        return Err("batch-size must be at least 1".into());
    }
    if batch_size > limits::MAX_BATCH_SIZE {
        return Err(format!("batch-size cannot exceed {}", limits::MAX_BATCH_SIZE).into());
    }
    if attempts == 0 || attempts > limits::MAX_ATTEMPTS {
        return Err(format!("attempts must be between 1 and {}", limits::MAX_ATTEMPTS).into());
    }
    Ok(())
}

/// Validate a region count for splitting
pub fn validate_region_count(count: i64) -> CliResult<()> {
    if count < 1 {
        return Err("count must be at least 1".into());
    }
    if count > limits::MAX_REGIONS {
        return Err(format!("count cannot exceed {}", limits::MAX_REGIONS).into());
    }
    Ok(())
}

/// Validate a table or column family name
pub fn validate_name(name: &str, what: &str) -> CliResult<()> {
    if name.is_empty() {
        return Err(format!("{} cannot be empty", what).into());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(format!(
            "{} may only contain letters, digits, '_', '-' and '.' (got '{}')",
            what, name
        )
        .into());
    }
    Ok(())
}

/// Parse a positive integer from string with a descriptive error
pub fn parse_positive_usize(value: &str, name: &str) -> CliResult<usize> {
    value
        .parse::<usize>()
        .map_err(|_| format!("{} must be a positive number", name).into())
}

/// Parse a u64 from string with a descriptive error
pub fn parse_u64(value: &str, name: &str) -> CliResult<u64> {
    value
        .parse::<u64>()
        .map_err(|_| format!("{} must be a non-negative number", name).into())
}

/// Parse an i64 from string with a descriptive error
pub fn parse_i64(value: &str, name: &str) -> CliResult<i64> {
    value
        .parse::<i64>()
        .map_err(|_| format!("{} must be an integer", name).into())
}
