use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("syslog-ng control socket dial failed: {0}")]
    Dial(#[source] std::io::Error),

    #[error("syslog-ng control socket write failed: {0}")]
    Write(#[source] std::io::Error),

    #[error("syslog-ng control socket read failed: {0}")]
    Read(#[source] std::io::Error),

    #[error("Malformed stats line: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Target list error: {0}")]
    TargetList(String),

    #[error("HTTP probe error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
