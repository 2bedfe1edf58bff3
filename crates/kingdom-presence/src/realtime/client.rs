//! Public handle on the background realtime connection.

use kingdom_common::StoreError;
use tokio::sync::mpsc;

use super::connection::connection_loop;
use super::types::{ChannelConfig, RealtimeCommand, RealtimeConfig, RealtimeEvent};

/// Sends commands to the connection task.
///
/// A successful return means the command was queued, not that the server
/// applied it. Commands issued while the socket is down are replayed after
/// the next reconnect. Dropping the client ends the connection task.
pub struct RealtimeClient {
    command_tx: mpsc::Sender<RealtimeCommand>,
}

impl RealtimeClient {
    /// Start the background connection. Returns the client and its event stream.
    pub fn connect(config: RealtimeConfig) -> (Self, mpsc::Receiver<RealtimeEvent>) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(64);

        tokio::spawn(connection_loop(config, event_tx, command_rx));

        (Self { command_tx }, event_rx)
    }

    async fn send(&self, command: RealtimeCommand) -> Result<(), StoreError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| StoreError::Closed)
    }

    pub async fn join_channel(&self, topic: &str, config: ChannelConfig) -> Result<(), StoreError> {
        self.send(RealtimeCommand::JoinChannel {
            topic: topic.to_string(),
            config,
        })
        .await
    }

    pub async fn leave_channel(&self, topic: &str) -> Result<(), StoreError> {
        self.send(RealtimeCommand::LeaveChannel {
            topic: topic.to_string(),
        })
        .await
    }

    /// Replace this connection's presence payload on `topic`.
    pub async fn presence_track(
        &self,
        topic: &str,
        payload: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.send(RealtimeCommand::PresenceTrack {
            topic: topic.to_string(),
            payload,
        })
        .await
    }

    pub async fn presence_untrack(&self, topic: &str) -> Result<(), StoreError> {
        self.send(RealtimeCommand::PresenceUntrack {
            topic: topic.to_string(),
        })
        .await
    }

    /// Leave every channel and close the socket. No reconnect follows.
    pub async fn disconnect(&self) -> Result<(), StoreError> {
        self.send(RealtimeCommand::Disconnect).await
    }
}
