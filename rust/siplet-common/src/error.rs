use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// A request for `requested` slots against a container that can never hold
    /// more than `max_size`.
    pub fn capacity_exceeded(requested: usize, max_size: usize) -> Error {
        Error(
            ErrorKind::CapacityExceeded {
                requested,
                max_size,
            }
            .into(),
        )
    }

    /// `len + additional` does not fit in `usize`.
    pub fn capacity_overflow(len: usize, additional: usize) -> Error {
        Error(ErrorKind::CapacityOverflow { len, additional }.into())
    }

    /// Returns `true` for every failure caused by a size or capacity request
    /// beyond what the container can represent.
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::CapacityExceeded { .. } | ErrorKind::CapacityOverflow { .. }
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("requested capacity {requested} exceeds the maximum size {max_size}")]
    CapacityExceeded { requested: usize, max_size: usize },

    #[error("capacity overflow: {len} + {additional} elements")]
    CapacityOverflow { len: usize, additional: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        std::io::Error::new(std::io::ErrorKind::OutOfMemory, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_exceeded_display() {
        let e = Error::capacity_exceeded(10, 4);
        assert_eq!(
            e.to_string(),
            "requested capacity 10 exceeds the maximum size 4"
        );
        assert!(e.is_capacity_exceeded());
        assert_eq!(
            e.into_kind(),
            ErrorKind::CapacityExceeded {
                requested: 10,
                max_size: 4
            }
        );
    }

    #[test]
    fn test_capacity_overflow_is_capacity_exceeded() {
        let e = Error::capacity_overflow(usize::MAX, 1);
        assert!(e.is_capacity_exceeded());
        assert!(matches!(e.kind(), ErrorKind::CapacityOverflow { .. }));
    }

    #[test]
    fn test_io_error_conversion() {
        let e: std::io::Error = Error::capacity_exceeded(3, 2).into();
        assert_eq!(e.kind(), std::io::ErrorKind::OutOfMemory);
    }
}
