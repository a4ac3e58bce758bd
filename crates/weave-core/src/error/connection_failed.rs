use super::Error;

/// Error when the driver cannot connect to, or synchronize, the database.
///
/// The connect-and-sync loop logs these and retries; they never reach callers
/// of `fill` or `deep_save`.
#[derive(Debug)]
pub(super) struct ConnectionFailed {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl std::error::Error for ConnectionFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl core::fmt::Display for ConnectionFailed {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "connection failed: {}", self.inner)
    }
}

impl Error {
    pub fn connection_failed(err: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::from(super::ErrorKind::ConnectionFailed(ConnectionFailed {
            inner: Box::new(err),
        }))
    }

    pub fn is_connection_failed(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::ConnectionFailed(_)))
    }
}
