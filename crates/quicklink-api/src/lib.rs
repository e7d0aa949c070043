// quicklink-api: async Rust client for the Home Assistant quick_automation commands

pub mod error;
pub mod models;
pub mod quick_automation;
pub mod rest;
pub mod transport;
pub mod websocket;

pub use error::Error;
pub use models::{InstanceConfig, RawEntry, RawLink, RawResolution, RawTarget};
pub use rest::RestClient;
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{HassClient, ReconnectConfig, websocket_url};
