pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No free slot was available at submission time. Recoverable: retry
    /// after some queued tasks complete, or construct a larger pool.
    #[error("pool saturated: no free task slot")]
    Saturated,

    /// The pool has been stopped; submissions are rejected, never queued.
    #[error("pool terminated: submissions are no longer accepted")]
    Terminated,

    #[error("config error: {0}")]
    Config(String),

    #[error("executor error: {0}")]
    Executor(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn executor<S: Into<String>>(msg: S) -> Self {
        Error::Executor(msg.into())
    }
}
