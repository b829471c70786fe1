//! Application error type.
//!
//! Every fallible step returns `AppError`: a process exit code plus a
//! human-readable message. The exit code encodes the failure category so the
//! binary can map an unrecoverable error straight to `ExitCode`.

pub const EXIT_IO: u8 = 2;
pub const EXIT_PARSE: u8 = 3;
pub const EXIT_NETWORK: u8 = 4;
pub const EXIT_RENDER: u8 = 5;
pub const EXIT_SETUP: u8 = 6;

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Filesystem failure (missing staged file, unwritable directory, ...).
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    /// Malformed CSV content: schema, dates, numbers.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(EXIT_PARSE, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(EXIT_NETWORK, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(EXIT_RENDER, message)
    }

    /// Process setup: resolving paths, installing the log subscriber.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::new(EXIT_SETUP, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
