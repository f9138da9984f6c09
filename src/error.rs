use std::fmt;

use super::procfs::ProcfsAuxvError;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    ProcfsAuxv(ProcfsAuxvError),
    /// An `ENVDUMP_*` variable held a value we don't understand.
    Config { var: &'static str, value: String },
    Logger(log::SetLoggerError),
    /// argv could not be located, neither by the constructor nor on the stack.
    StartupNotFound,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ProcfsAuxvError> for Error {
    fn from(value: ProcfsAuxvError) -> Self {
        Self::ProcfsAuxv(value)
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(value: log::SetLoggerError) -> Self {
        Self::Logger(value)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::ProcfsAuxv(err) => write!(f, "reading /proc/self/auxv failed: {:?}", err),
            Error::Config { var, value } => write!(f, "invalid value for {}: {:?}", var, value),
            Error::Logger(err) => write!(f, "logger: {}", err),
            Error::StartupNotFound => f.write_str("could not locate the startup argument vector"),
        }
    }
}

impl std::error::Error for Error {}
