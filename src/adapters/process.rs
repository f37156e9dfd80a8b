use crate::domain::model::{ConnectionRecord, ConnectionStatus, ProcessRecord};
use crate::domain::ports::ProcessSource;
use crate::utils::error::Result;
use sysinfo::{ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, UpdateKind, Users};

/// Process table from sysinfo, sockets from procfs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessSource;

impl SystemProcessSource {
    pub fn new() -> Self {
        Self
    }
}

/// Lower-case names in the style of `ps`/psutil.
fn status_name(status: ProcessStatus) -> String {
    match status {
        ProcessStatus::Run => "running".to_string(),
        ProcessStatus::Sleep => "sleeping".to_string(),
        ProcessStatus::Idle => "idle".to_string(),
        ProcessStatus::Stop => "stopped".to_string(),
        ProcessStatus::Zombie => "zombie".to_string(),
        ProcessStatus::Dead => "dead".to_string(),
        ProcessStatus::UninterruptibleDiskSleep => "disk-sleep".to_string(),
        other => other.to_string().to_lowercase(),
    }
}

impl ProcessSource for SystemProcessSource {
    fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_user(UpdateKind::Always)
                .with_cmd(UpdateKind::Always),
        );
        let users = Users::new_with_refreshed_list();

        let mut records: Vec<ProcessRecord> = system
            .processes()
            .values()
            // Linux 上 sysinfo 也會列出執行緒，只保留行程本身
            .filter(|process| process.thread_kind().is_none())
            .map(|process| ProcessRecord {
                pid: process.pid().as_u32(),
                name: process.name().to_string_lossy().into_owned(),
                username: process
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|user| user.name().to_string()),
                status: status_name(process.status()),
                cmdline: process
                    .cmd()
                    .iter()
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect(),
            })
            .collect();

        records.sort_by_key(|record| record.pid);
        tracing::debug!("Enumerated {} processes", records.len());
        Ok(records)
    }

    #[cfg(target_os = "linux")]
    fn list_connections(&self, process: &ProcessRecord) -> Result<Vec<ConnectionRecord>> {
        linux::connections(process.pid)
    }

    #[cfg(not(target_os = "linux"))]
    fn list_connections(&self, process: &ProcessRecord) -> Result<Vec<ConnectionRecord>> {
        Err(crate::utils::error::ScoutError::Unsupported {
            message: format!("cannot list sockets of PID {} without procfs", process.pid),
        })
    }
}

#[cfg(target_os = "linux")]
mod linux {
    use super::*;
    use crate::utils::error::ScoutError;
    use procfs::net::{TcpNetEntry, TcpState};
    use procfs::process::{FDTarget, Process};
    use procfs::ProcError;
    use std::collections::HashSet;

    fn process_error(pid: u32, err: ProcError) -> ScoutError {
        ScoutError::ProcessError {
            message: format!("PID {}: {}", pid, err),
        }
    }

    pub(super) fn map_state(state: &TcpState) -> ConnectionStatus {
        #[allow(unreachable_patterns)]
        match state {
            TcpState::Established => ConnectionStatus::Established,
            TcpState::SynSent => ConnectionStatus::SynSent,
            TcpState::SynRecv => ConnectionStatus::SynRecv,
            TcpState::FinWait1 => ConnectionStatus::FinWait1,
            TcpState::FinWait2 => ConnectionStatus::FinWait2,
            TcpState::TimeWait => ConnectionStatus::TimeWait,
            TcpState::Close => ConnectionStatus::Close,
            TcpState::CloseWait => ConnectionStatus::CloseWait,
            TcpState::LastAck => ConnectionStatus::LastAck,
            TcpState::Listen => ConnectionStatus::Listen,
            TcpState::Closing => ConnectionStatus::Closing,
            TcpState::NewSynRecv => ConnectionStatus::NewSynRecv,
            _ => ConnectionStatus::None,
        }
    }

    fn to_record(entry: &TcpNetEntry) -> ConnectionRecord {
        ConnectionRecord {
            local_address: Some(entry.local_address),
            remote_address: Some(entry.remote_address),
            status: map_state(&entry.state),
        }
    }

    /// Sockets held by `pid`: its socket inodes joined with the tcp/tcp6
    /// tables of its network namespace.
    pub(super) fn connections(pid: u32) -> Result<Vec<ConnectionRecord>> {
        let proc_pid = i32::try_from(pid).map_err(|e| ScoutError::ProcessError {
            message: format!("PID {} out of range: {}", pid, e),
        })?;
        let process = Process::new(proc_pid).map_err(|e| process_error(pid, e))?;

        let mut inodes = HashSet::new();
        for fd in process.fd().map_err(|e| process_error(pid, e))? {
            let fd = fd.map_err(|e| process_error(pid, e))?;
            if let FDTarget::Socket(inode) = fd.target {
                inodes.insert(inode);
            }
        }
        if inodes.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = process.tcp().map_err(|e| process_error(pid, e))?;
        entries.extend(process.tcp6().map_err(|e| process_error(pid, e))?);

        Ok(entries
            .iter()
            .filter(|entry| inodes.contains(&entry.inode))
            .map(to_record)
            .collect())
    }
}
