use crate::config::CloseWaitSettings;
use crate::domain::model::{ConnectionStatus, ProcessRecord};
use crate::domain::ports::ProcessSource;
use crate::utils::error::Result;
use std::io::Write;

/// Totals for one pass over the process table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub processes: usize,
    pub close_wait: usize,
    pub statements: usize,
}

pub fn filter_by_user(processes: Vec<ProcessRecord>, username: &str) -> Vec<ProcessRecord> {
    processes
        .into_iter()
        .filter(|p| p.username.as_deref() == Some(username))
        .collect()
}

pub fn status_line(process: &ProcessRecord) -> String {
    format!(
        "PID {} status {} cmd {}",
        process.pid,
        process.status,
        process.argv0()
    )
}

/// SQL that cancels the backend serving `client_port`, but only once its state
/// has been unchanged for `min_wait_seconds`. `None` when pid or port is unknown.
pub fn cancel_statement(
    pid: Option<u32>,
    remote_port: Option<u16>,
    min_wait_seconds: u64,
) -> Option<String> {
    let (pid, port) = (pid?, remote_port?);
    Some(format!(
        "SELECT pg_cancel_backend(pid) FROM pg_stat_activity\n\
         WHERE pid = {} AND client_port = {}\n\
         AND state_change < now() - '{} seconds'::interval;",
        pid, port, min_wait_seconds
    ))
}

/// Writes the cancel statement preceded by a blank line; returns whether anything was written.
pub fn emit_cancel_statement<W: Write>(
    out: &mut W,
    pid: Option<u32>,
    remote_port: Option<u16>,
    min_wait_seconds: u64,
) -> Result<bool> {
    match cancel_statement(pid, remote_port, min_wait_seconds) {
        Some(sql) => {
            writeln!(out)?;
            writeln!(out, "{}", sql)?;
            writeln!(out)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Walks the process table once and prints cancel statements for sockets stuck
/// in CLOSE_WAIT. Nothing is executed against the database.
pub struct CloseWaitScanner<S: ProcessSource> {
    source: S,
    username: String,
    min_wait_seconds: u64,
}

impl<S: ProcessSource> CloseWaitScanner<S> {
    pub fn new(source: S, settings: &CloseWaitSettings) -> Self {
        Self {
            source,
            username: settings.username.clone(),
            min_wait_seconds: settings.min_wait_seconds,
        }
    }

    pub fn run<W: Write>(&self, out: &mut W) -> Result<ScanSummary> {
        let mut summary = ScanSummary::default();
        let processes = filter_by_user(self.source.list_processes()?, &self.username);
        tracing::debug!(
            "{} process(es) owned by {}",
            processes.len(),
            self.username
        );

        for process in &processes {
            summary.processes += 1;
            writeln!(out, "{}", status_line(process))?;

            // 行程可能在列舉後結束，錯誤直接往上拋
            for conn in self.source.list_connections(process)? {
                if conn.status != ConnectionStatus::CloseWait {
                    continue;
                }
                summary.close_wait += 1;
                tracing::debug!(
                    "PID {} has CLOSE_WAIT socket {:?} -> {:?}",
                    process.pid,
                    conn.local_address,
                    conn.remote_address
                );
                if emit_cancel_statement(
                    out,
                    Some(process.pid),
                    conn.remote_port(),
                    self.min_wait_seconds,
                )? {
                    summary.statements += 1;
                }
            }
        }

        out.flush()?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ConnectionRecord;
    use std::collections::HashMap;

    struct StaticSource {
        processes: Vec<ProcessRecord>,
        connections: HashMap<u32, Vec<ConnectionRecord>>,
    }

    impl ProcessSource for StaticSource {
        fn list_processes(&self) -> Result<Vec<ProcessRecord>> {
            Ok(self.processes.clone())
        }

        fn list_connections(&self, process: &ProcessRecord) -> Result<Vec<ConnectionRecord>> {
            Ok(self
                .connections
                .get(&process.pid)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn process(pid: u32, user: &str) -> ProcessRecord {
        ProcessRecord {
            pid,
            name: "postgres".to_string(),
            username: Some(user.to_string()),
            status: "sleeping".to_string(),
            cmdline: vec!["postgres: filip filip [local] idle".to_string()],
        }
    }

    fn conn(remote: &str, status: ConnectionStatus) -> ConnectionRecord {
        ConnectionRecord {
            local_address: Some("127.0.0.1:5432".parse().unwrap()),
            remote_address: Some(remote.parse().unwrap()),
            status,
        }
    }

    #[test]
    fn test_cancel_statement_text() {
        let sql = cancel_statement(Some(93950), Some(60510), 45).unwrap();
        assert_eq!(
            sql,
            "SELECT pg_cancel_backend(pid) FROM pg_stat_activity\n\
             WHERE pid = 93950 AND client_port = 60510\n\
             AND state_change < now() - '45 seconds'::interval;"
        );
    }

    #[test]
    fn test_cancel_statement_requires_pid_and_port() {
        let mut out = Vec::new();
        assert!(!emit_cancel_statement(&mut out, None, Some(60510), 45).unwrap());
        assert!(!emit_cancel_statement(&mut out, Some(93950), None, 45).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn test_filter_by_user() {
        let mut nobody = process(3, "root");
        nobody.username = None;
        let filtered = filter_by_user(
            vec![process(1, "postgres"), process(2, "root"), nobody],
            "postgres",
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].pid, 1);
    }

    #[test]
    fn test_only_close_wait_gets_sql() {
        let source = StaticSource {
            processes: vec![process(93950, "postgres"), process(100, "postgres")],
            connections: HashMap::from([
                (
                    93950,
                    vec![
                        conn("0.0.0.0:0", ConnectionStatus::Listen),
                        conn("127.0.0.1:60510", ConnectionStatus::CloseWait),
                        conn("127.0.0.1:60511", ConnectionStatus::Established),
                    ],
                ),
                (100, vec![conn("127.0.0.1:60600", ConnectionStatus::TimeWait)]),
            ]),
        };
        let scanner = CloseWaitScanner::new(source, &CloseWaitSettings::default());

        let mut out = Vec::new();
        let summary = scanner.run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            summary,
            ScanSummary {
                processes: 2,
                close_wait: 1,
                statements: 1
            }
        );
        assert_eq!(text.matches("pg_cancel_backend").count(), 1);
        assert!(text.contains("WHERE pid = 93950 AND client_port = 60510"));
        assert!(text.contains("PID 100 status sleeping cmd postgres: filip filip [local] idle"));
    }

    #[test]
    fn test_close_wait_without_peer_port_is_skipped() {
        let source = StaticSource {
            processes: vec![process(7, "postgres")],
            connections: HashMap::from([(7, vec![conn("0.0.0.0:0", ConnectionStatus::CloseWait)])]),
        };
        let scanner = CloseWaitScanner::new(source, &CloseWaitSettings::default());

        let mut out = Vec::new();
        let summary = scanner.run(&mut out).unwrap();

        assert_eq!(summary.close_wait, 1);
        assert_eq!(summary.statements, 0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "PID 7 status sleeping cmd postgres: filip filip [local] idle\n"
        );
    }
}
