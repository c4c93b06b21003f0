//! Allow-listed extra flags for the connection-listing utility.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// An extra `netstat` flag the operator may use to narrow the scan.
///
/// Only flags that keep the seven-column layout are listed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanFlag {
    /// `-a`: listening and non-listening sockets.
    All,
    /// `-l`: listening sockets only.
    Listening,
    /// `-n`: numeric addresses, no name resolution.
    Numeric,
    /// `-W`: do not truncate IP addresses.
    Wide,
    /// `-4`: IPv4 only.
    Ipv4,
    /// `-6`: IPv6 only.
    Ipv6,
}

impl ScanFlag {
    pub const ALL: [ScanFlag; 6] = [
        ScanFlag::All,
        ScanFlag::Listening,
        ScanFlag::Numeric,
        ScanFlag::Wide,
        ScanFlag::Ipv4,
        ScanFlag::Ipv6,
    ];

    /// Short option letter.
    pub fn letter(self) -> char {
        match self {
            ScanFlag::All => 'a',
            ScanFlag::Listening => 'l',
            ScanFlag::Numeric => 'n',
            ScanFlag::Wide => 'W',
            ScanFlag::Ipv4 => '4',
            ScanFlag::Ipv6 => '6',
        }
    }

    /// The flag as a standalone argv element.
    pub fn arg(self) -> &'static str {
        match self {
            ScanFlag::All => "-a",
            ScanFlag::Listening => "-l",
            ScanFlag::Numeric => "-n",
            ScanFlag::Wide => "-W",
            ScanFlag::Ipv4 => "-4",
            ScanFlag::Ipv6 => "-6",
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.letter() == letter)
    }
}

impl FromStr for ScanFlag {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start_matches('-');
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => match trimmed.to_lowercase().as_str() {
                "all" => Some(ScanFlag::All),
                "listening" => Some(ScanFlag::Listening),
                "numeric" => Some(ScanFlag::Numeric),
                "wide" => Some(ScanFlag::Wide),
                "ipv4" => Some(ScanFlag::Ipv4),
                "ipv6" => Some(ScanFlag::Ipv6),
                _ => None,
            },
        }
        .ok_or_else(|| ScanError::DisallowedArgument(s.to_string()))
    }
}

/// Extra flags appended to a scan, each as its own argv element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    flags: Vec<ScanFlag>,
}

impl ScanOptions {
    pub fn new(flags: impl IntoIterator<Item = ScanFlag>) -> Self {
        let mut options = Self::default();
        for flag in flags {
            if !options.flags.contains(&flag) {
                options.flags.push(flag);
            }
        }
        options
    }

    /// Validate a compact flag string such as `"ln"`, `"-l -n"` or `"listening numeric"`.
    ///
    /// Anything outside the allow-list is rejected before a process is spawned.
    pub fn from_extra_args(extra: &str) -> Result<Self, ScanError> {
        let mut flags = Vec::new();
        for word in extra.split_whitespace() {
            let stripped = word.trim_start_matches('-');
            if stripped.is_empty() {
                return Err(ScanError::DisallowedArgument(word.to_string()));
            }
            if let Ok(flag) = stripped.parse::<ScanFlag>() {
                flags.push(flag);
                continue;
            }
            // Clustered short options: "ln" / "-ln"
            for letter in stripped.chars() {
                let flag = ScanFlag::from_letter(letter)
                    .ok_or_else(|| ScanError::DisallowedArgument(word.to_string()))?;
                flags.push(flag);
            }
        }
        Ok(Self::new(flags))
    }

    pub fn flags(&self) -> &[ScanFlag] {
        &self.flags
    }

    /// Extra argv elements, in the order given.
    pub fn args(&self) -> Vec<&'static str> {
        self.flags.iter().map(|flag| flag.arg()).collect()
    }
}
