//! Connection record domain model.

use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Owner token used by the connection table when no process owns the socket.
pub const NO_OWNER: &str = "-";

/// The ordered result of one scan, shared by reference between readers.
pub type RecordSet = Arc<[ConnectionRecord]>;

// ============================================================================
// Field
// ============================================================================

/// One column of a connection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Protocol,
    RecvQueue,
    SendQueue,
    #[default]
    LocalAddress,
    ForeignAddress,
    State,
    Owner,
}

impl Field {
    /// All fields, in column order.
    pub const ALL: [Field; 7] = [
        Field::Protocol,
        Field::RecvQueue,
        Field::SendQueue,
        Field::LocalAddress,
        Field::ForeignAddress,
        Field::State,
        Field::Owner,
    ];

    /// Column index of this field (0..=6).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Field at the given column index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Get the display name for this field.
    pub fn display_name(&self) -> &'static str {
        match self {
            Field::Protocol => "Protocol",
            Field::RecvQueue => "Received Queue",
            Field::SendQueue => "Sent Queue",
            Field::LocalAddress => "Local Address",
            Field::ForeignAddress => "Foreign Address",
            Field::State => "State",
            Field::Owner => "PID/Program Name",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Field::from_index(index)
                .ok_or_else(|| format!("field index {} is out of range 0-6", index));
        }

        match s.to_lowercase().as_str() {
            "protocol" | "proto" => Ok(Field::Protocol),
            "recv-queue" | "recv-q" | "recv" => Ok(Field::RecvQueue),
            "send-queue" | "send-q" | "send" => Ok(Field::SendQueue),
            "local-address" | "local" => Ok(Field::LocalAddress),
            "foreign-address" | "foreign" | "remote" => Ok(Field::ForeignAddress),
            "state" => Ok(Field::State),
            "owner" | "pid" | "program" => Ok(Field::Owner),
            other => Err(format!("unknown field: {}", other)),
        }
    }
}

// ============================================================================
// ConnectionRecord
// ============================================================================

/// One row of the connection table.
///
/// Exactly seven fields in fixed order. Records are immutable once parsed;
/// a refresh replaces the whole [`RecordSet`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    protocol: String,
    recv_queue: String,
    send_queue: String,
    local_address: String,
    foreign_address: String,
    state: String,
    owner: String,
}

impl ConnectionRecord {
    /// Build a record from its seven columns, in column order.
    pub fn from_fields(fields: [String; 7]) -> Self {
        let [protocol, recv_queue, send_queue, local_address, foreign_address, state, owner] =
            fields;
        Self {
            protocol,
            recv_queue,
            send_queue,
            local_address,
            foreign_address,
            state,
            owner,
        }
    }

    /// Convenience constructor used by tests and fixtures.
    pub fn new(
        protocol: impl Into<String>,
        recv_queue: impl Into<String>,
        send_queue: impl Into<String>,
        local_address: impl Into<String>,
        foreign_address: impl Into<String>,
        state: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self::from_fields([
            protocol.into(),
            recv_queue.into(),
            send_queue.into(),
            local_address.into(),
            foreign_address.into(),
            state.into(),
            owner.into(),
        ])
    }

    /// Value of one column.
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Protocol => &self.protocol,
            Field::RecvQueue => &self.recv_queue,
            Field::SendQueue => &self.send_queue,
            Field::LocalAddress => &self.local_address,
            Field::ForeignAddress => &self.foreign_address,
            Field::State => &self.state,
            Field::Owner => &self.owner,
        }
    }

    /// All seven columns, in column order.
    pub fn fields(&self) -> [&str; 7] {
        Field::ALL.map(|f| self.field(f))
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn local_address(&self) -> &str {
        &self.local_address
    }

    pub fn foreign_address(&self) -> &str {
        &self.foreign_address
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// The `pid/program` token, or `-` for kernel-owned sockets.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Whether a process owns this socket.
    pub fn is_owned(&self) -> bool {
        is_owned(&self.owner)
    }

    /// Process id of the owner, if it can be resolved.
    pub fn owner_pid(&self) -> Option<u32> {
        owner_pid(&self.owner)
    }

    /// Program name of the owner, if present.
    pub fn program_name(&self) -> Option<&str> {
        program_name(&self.owner)
    }
}

impl std::fmt::Display for ConnectionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} -> {} [{}] ({})",
            self.protocol, self.local_address, self.foreign_address, self.state, self.owner
        )
    }
}

// ============================================================================
// Owner tokens
// ============================================================================

fn owner_regex() -> &'static Regex {
    static OWNER: OnceLock<Regex> = OnceLock::new();
    OWNER.get_or_init(|| Regex::new(r"^(\d+)(?:/(.*))?$").expect("owner token regex is valid"))
}

/// Whether an owner token names a process (i.e. is not the `-` sentinel).
pub fn is_owned(owner: &str) -> bool {
    owner != NO_OWNER
}

/// Extract the numeric process id from a `pid/program` token.
pub fn owner_pid(owner: &str) -> Option<u32> {
    owner_regex()
        .captures(owner)
        .and_then(|caps| caps[1].parse().ok())
}

/// Extract the program name from a `pid/program` token.
pub fn program_name(owner: &str) -> Option<&str> {
    owner_regex()
        .captures(owner)
        .and_then(|caps| caps.get(2))
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
