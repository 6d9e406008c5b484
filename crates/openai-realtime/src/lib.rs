pub mod audio;
pub mod channel;
mod client;
mod error;

pub use client::config::{Config, ConfigBuilder};
pub use client::stats::Stats;
pub use client::{Client, connect, connect_with_config, negotiation_session};
pub use error::ClientError;
pub use openai_realtime_types as types;
