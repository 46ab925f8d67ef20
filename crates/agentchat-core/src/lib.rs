pub mod config;
pub mod format;
pub mod render;
pub mod state;
pub mod transport;

// Re-export main types for convenience
pub use config::{Config, ConfigError};
pub use format::{display_url, parse_summary_to_list};
pub use render::{Body, MessageView, SourceLink, SourcesBlock, TraceBlock, TraceEntry};
pub use state::{ChatMessage, ChatRole, ChatSession, ToolStep, TraceValue};
pub use transport::{exchange, AgentReply, ChatTransport, HttpTransport, TransportError};
