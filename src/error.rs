use thiserror::Error;

/// Errors raised at the conversion boundaries of a [`CaseInsensitiveMap`].
///
/// Map operations themselves never fail on a missing key; these only cover
/// integers that cannot be represented in the key space.
///
/// [`CaseInsensitiveMap`]: crate::CaseInsensitiveMap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// An unsigned integer does not fit the signed 64-bit key space.
    #[error("integer key {0} is out of range for a signed 64-bit key")]
    KeyOutOfRange(u64),

    /// `push` was called after the integer key `i64::MAX` had been written.
    #[error("cannot append: the next integer key is already past i64::MAX")]
    NextIndexOverflow,
}

/// Alias for `core::result::Result` with this crate's [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::KeyOutOfRange(u64::MAX).to_string(),
            "integer key 18446744073709551615 is out of range for a signed 64-bit key"
        );
        assert!(Error::NextIndexOverflow.to_string().contains("i64::MAX"));
    }
}
