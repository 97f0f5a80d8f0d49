pub type Result<T> = std::result::Result<T, crate::error::Error>;

#[macro_export]
macro_rules! verify_capacity {
    ($requested:expr, $max_size:expr) => {{
        $crate::result::verify_capacity($requested, $max_size)?;
    }};
}

#[inline]
pub fn verify_capacity(requested: usize, max_size: usize) -> Result<()> {
    if requested <= max_size {
        Ok(())
    } else {
        capacity_exceeded(requested, max_size)
    }
}

#[cold]
pub fn capacity_exceeded(requested: usize, max_size: usize) -> Result<()> {
    Err(crate::error::Error::capacity_exceeded(requested, max_size))
}
