//! Parsing of raw `netstat -ptu` output into connection records.
//!
//! Expected format:
//! ```text
//! Active Internet connections (w/o servers)
//! Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name
//! tcp        0      0 127.0.0.1:80            0.0.0.0:*               LISTEN      1234/nginx
//! udp        0      0 0.0.0.0:68              0.0.0.0:*                           812/dhclient
//!
//! ```
//! The two header lines and the trailing line are discarded.

use tracing::debug;

use super::record::{owner_pid, ConnectionRecord, NO_OWNER};
use crate::error::ParseError;

/// Number of banner/header lines preceding the data rows.
const HEADER_LINES: usize = 2;

/// Number of columns in a record.
const FIELD_COUNT: usize = 7;

/// Protocols whose rows may omit the state column.
const CONNECTIONLESS: &[&str] = &["udp", "udp6", "udpl", "udpl6", "raw", "raw6"];

/// Raw text produced by one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput(String);

impl RawOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RawOutput {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RawOutput {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

/// Parse raw scan output into records, in output order.
///
/// Malformed rows are logged and skipped; parsing never fails as a whole.
pub fn parse(raw: &RawOutput) -> Vec<ConnectionRecord> {
    let lines: Vec<&str> = raw
        .as_str()
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .collect();

    if lines.len() <= HEADER_LINES + 1 {
        return Vec::new();
    }

    lines[HEADER_LINES..lines.len() - 1]
        .iter()
        .filter_map(|line| match parse_line(line) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping connection table row");
                None
            }
        })
        .collect()
}

/// Parse one data row.
pub fn parse_line(line: &str) -> Result<ConnectionRecord, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let arity_error = || ParseError::Arity {
        found: tokens.len(),
        line: line.to_string(),
    };

    if tokens.len() < FIELD_COUNT - 1 {
        return Err(arity_error());
    }

    // Connectionless sockets usually have no state, so the owner sits in column 5.
    let (state, owner_start) = if is_connectionless(tokens[0]) && looks_like_owner(tokens[5]) {
        (String::new(), 5)
    } else if tokens.len() >= FIELD_COUNT {
        (tokens[5].to_string(), 6)
    } else {
        return Err(arity_error());
    };

    let fields: [String; FIELD_COUNT] = [
        tokens[0].to_string(),
        tokens[1].to_string(),
        tokens[2].to_string(),
        tokens[3].to_string(),
        tokens[4].to_string(),
        state,
        // Program names may contain spaces
        tokens[owner_start..].join(" "),
    ];

    for queue in &fields[1..3] {
        if queue.parse::<u64>().is_err() {
            return Err(ParseError::NonNumericQueue(queue.clone()));
        }
    }

    Ok(ConnectionRecord::from_fields(fields))
}

fn is_connectionless(protocol: &str) -> bool {
    CONNECTIONLESS.contains(&protocol.to_lowercase().as_str())
}

/// `-` or `pid/program`. A bare number is a raw socket's state, not an owner.
fn looks_like_owner(token: &str) -> bool {
    token == NO_OWNER || (token.contains('/') && owner_pid(token).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Active Internet connections (w/o servers)\n\
        Proto Recv-Q Send-Q Local Address           Foreign Address         State       PID/Program name\n";

    #[test]
    fn test_parse_single_row() {
        let raw = RawOutput::new(format!(
            "{}tcp 0 0 127.0.0.1:80 0.0.0.0:* LISTEN 1234/nginx\n",
            HEADER
        ));

        let records = parse(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].fields(),
            ["tcp", "0", "0", "127.0.0.1:80", "0.0.0.0:*", "LISTEN", "1234/nginx"]
        );
    }

    #[test]
    fn test_trailing_line_discarded_without_newline() {
        let raw = RawOutput::new(format!(
            "{}tcp 0 0 127.0.0.1:80 0.0.0.0:* LISTEN 1234/nginx\nfooter",
            HEADER
        ));
        assert_eq!(parse(&raw).len(), 1);
    }

    #[test]
    fn test_parse_n_rows() {
        let rows = [
            "tcp        0      0 10.0.0.5:22             10.0.0.9:51514          ESTABLISHED 5/sshd",
            "tcp6       0      0 ::1:631                 :::*                    LISTEN      -",
            "tcp        0     36 10.0.0.5:22             10.0.0.9:51515          ESTABLISHED 6/sshd: root@pts/0",
            "udp        0      0 0.0.0.0:5353            0.0.0.0:*                           700/avahi-daemon: r",
        ];
        let raw = RawOutput::new(format!("{}{}\n", HEADER, rows.join("\n")));

        let records = parse(&raw);
        assert_eq!(records.len(), rows.len());
        for record in &records {
            assert_eq!(record.fields().len(), 7);
        }
        assert_eq!(records[2].owner(), "6/sshd: root@pts/0");
        assert_eq!(records[2].owner_pid(), Some(6));
        assert_eq!(records[3].state(), "");
        assert_eq!(records[3].owner(), "700/avahi-daemon: r");
    }

    #[test]
    fn test_connected_udp_keeps_state() {
        let record = parse_line("udp 0 0 10.0.0.5:41000 1.1.1.1:53 ESTABLISHED 99/resolved").unwrap();
        assert_eq!(record.state(), "ESTABLISHED");
        assert_eq!(record.owner(), "99/resolved");
    }

    #[test]
    fn test_udp_without_state_is_padded() {
        let record = parse_line("udp 0 0 0.0.0.0:68 0.0.0.0:* 812/dhclient").unwrap();
        assert_eq!(record.state(), "");
        assert_eq!(record.owner(), "812/dhclient");
        assert_eq!(record.foreign_address(), "0.0.0.0:*");
    }

    #[test]
    fn test_raw_numeric_state_is_kept() {
        let record = parse_line("raw 0 0 0.0.0.0:1 0.0.0.0:* 7 -").unwrap();
        assert_eq!(record.state(), "7");
        assert_eq!(record.owner(), "-");

        let record = parse_line("raw6 0 0 :::58 :::* 7 1234/ping").unwrap();
        assert_eq!(record.state(), "7");
        assert_eq!(record.owner(), "1234/ping");
        assert_eq!(record.owner_pid(), Some(1234));
    }

    #[test]
    fn test_tcp_without_state_is_rejected() {
        let err = parse_line("tcp 0 0 0.0.0.0:80 0.0.0.0:* 1/init").unwrap_err();
        assert!(matches!(err, ParseError::Arity { found: 6, .. }));
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let raw = RawOutput::new(format!(
            "{}tcp 0 0 127.0.0.1:80 0.0.0.0:* LISTEN 1234/nginx\n\
             garbage\n\
             Proto Recv-Q Send-Q Local Foreign State Owner\n\
             udp 0 0 0.0.0.0:68 0.0.0.0:* -\n\n",
            HEADER
        ));

        let records = parse(&raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].owner(), "1234/nginx");
        assert_eq!(records[1].protocol(), "udp");
    }

    #[test]
    fn test_short_input_yields_nothing() {
        assert!(parse(&RawOutput::default()).is_empty());
        assert!(parse(&RawOutput::new(HEADER)).is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let raw = RawOutput::new(
            "banner\r\nheader\r\ntcp 0 0 127.0.0.1:80 0.0.0.0:* LISTEN 1234/nginx\r\n",
        );
        let records = parse(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner(), "1234/nginx");
    }
}
