/// The catch-all error of fallible operations without a dedicated error type.
pub type Error = anyhow::Error;
