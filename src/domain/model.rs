use crate::utils::error::Result;
use crate::utils::validation::validate_major_version;
use std::fmt;
use std::net::SocketAddr;

/// A PostgreSQL version to scan: a major plus an optional minor.
///
/// Without a minor the scanner walks the major page and then every released minor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    pub major: String,
    pub minor: Option<u32>,
}

impl VersionSpec {
    pub fn new(major: impl Into<String>, minor: Option<u32>) -> Result<Self> {
        let major = major.into();
        validate_major_version(&major)?;
        Ok(Self { major, minor })
    }

    /// `14`, `14.3`, `9.6`, `9.6.21`
    pub fn version_string(&self) -> String {
        match self.minor {
            Some(minor) => format!("{}.{}", self.major, minor),
            None => self.major.clone(),
        }
    }
}

/// One matched paragraph from a release-notes page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNote {
    pub version: String,
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    NewSynRecv,
    None,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Established => "ESTABLISHED",
            ConnectionStatus::SynSent => "SYN_SENT",
            ConnectionStatus::SynRecv => "SYN_RECV",
            ConnectionStatus::FinWait1 => "FIN_WAIT1",
            ConnectionStatus::FinWait2 => "FIN_WAIT2",
            ConnectionStatus::TimeWait => "TIME_WAIT",
            ConnectionStatus::Close => "CLOSE",
            ConnectionStatus::CloseWait => "CLOSE_WAIT",
            ConnectionStatus::LastAck => "LAST_ACK",
            ConnectionStatus::Listen => "LISTEN",
            ConnectionStatus::Closing => "CLOSING",
            ConnectionStatus::NewSynRecv => "NEW_SYN_RECV",
            ConnectionStatus::None => "NONE",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub local_address: Option<SocketAddr>,
    pub remote_address: Option<SocketAddr>,
    pub status: ConnectionStatus,
}

impl ConnectionRecord {
    /// Remote port, `None` when the socket has no peer (port 0).
    pub fn remote_port(&self) -> Option<u16> {
        self.remote_address
            .map(|addr| addr.port())
            .filter(|port| *port != 0)
    }
}

/// Snapshot of one OS process. Connections are fetched separately through the
/// `ProcessSource` so a listing stays cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub username: Option<String>,
    pub status: String,
    pub cmdline: Vec<String>,
}

impl ProcessRecord {
    /// First command-line argument, or the process name for kernel threads and zombies.
    pub fn argv0(&self) -> &str {
        self.cmdline
            .first()
            .map(String::as_str)
            .unwrap_or(self.name.as_str())
    }
}
