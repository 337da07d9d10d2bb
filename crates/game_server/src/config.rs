//! Server configuration.

/// Configuration for one game server instance.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Chat content is truncated to this many characters server-side,
    /// regardless of what the client declares.
    pub max_chat_len: usize,
    /// Player names are truncated to this many characters.
    pub max_name_len: usize,
    /// Entries kept on the chat backlog component.
    pub chat_backlog: usize,
    /// Minimum seconds between accepted chat messages per client.
    pub chat_cooldown: f64,
    /// Seconds after connect before the welcome tip is delivered.
    pub welcome_delay: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20.0,
            max_ticks: 0,
            max_chat_len: 300,
            max_name_len: 32,
            chat_backlog: 20,
            chat_cooldown: 0.5,
            welcome_delay: 5.0,
        }
    }
}
