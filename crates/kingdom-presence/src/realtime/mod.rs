//! Supabase Realtime presence client (Phoenix Channels v1 over WebSocket).
//!
//! A background task owns the socket: it sends heartbeats, joins channels,
//! tracks presence, and reconnects with backoff, replaying joins and the
//! last tracked payload on every new socket.

mod client;
mod connection;
mod handler;
mod types;

pub use client::RealtimeClient;
pub use handler::{parse_presence_map, PresenceMap};
pub use types::{ChannelConfig, PhoenixMessage, PresenceKeyConfig, RealtimeConfig, RealtimeEvent};
