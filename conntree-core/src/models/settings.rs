//! Connection settings and inheritance flags carried by every node.

use serde::{Deserialize, Serialize};

/// Remote access protocol of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolType {
    /// Secure Shell
    #[default]
    Ssh,
    /// Remote Desktop Protocol
    Rdp,
    /// Virtual Network Computing
    Vnc,
}

impl ProtocolType {
    /// Returns the well-known port for this protocol
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::Ssh => 22,
            Self::Rdp => 3389,
            Self::Vnc => 5900,
        }
    }

    /// Returns the lowercase protocol name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Rdp => "rdp",
            Self::Vnc => "vnc",
        }
    }
}

impl std::fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection target settings
///
/// Containers carry settings too so that descendants can inherit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// Protocol used to connect
    #[serde(default)]
    pub protocol: ProtocolType,
    /// Remote host address (hostname or IP)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    /// Remote port number
    #[serde(default = "default_port")]
    pub port: u16,
    /// Username for authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Domain for Windows authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

const fn default_port() -> u16 {
    ProtocolType::Ssh.default_port()
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            protocol: ProtocolType::default(),
            host: String::new(),
            port: default_port(),
            username: None,
            domain: None,
        }
    }
}

/// Per-field flags selecting which settings are taken from the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Inheritance {
    /// Inherit the protocol
    #[serde(default)]
    pub protocol: bool,
    /// Inherit the port
    #[serde(default)]
    pub port: bool,
    /// Inherit the username
    #[serde(default)]
    pub username: bool,
    /// Inherit the domain
    #[serde(default)]
    pub domain: bool,
}

impl Inheritance {
    /// Inherit every field from the parent
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            protocol: true,
            port: true,
            username: true,
            domain: true,
        }
    }

    /// Returns true if at least one field is inherited
    #[must_use]
    pub const fn any(&self) -> bool {
        self.protocol || self.port || self.username || self.domain
    }
}
