//! The presenter: owns all session state and runs the event loop.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use kingdom_atlas::WORLD_REGIONS;
use kingdom_common::{ClientId, StoreError};
use kingdom_config::{KingdomConfig, PresenceConfig, RealtimeSettings};
use kingdom_presence::{
    Clock, MemoryStore, PresenceAggregator, PresencePolicy, PresencePublisher, PresenceView,
    RealtimeConfig, RealtimeStore, SharedStore,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::records::PromptRecord;
use crate::render::{compose_frame, TerminalRenderer};
use crate::sequencer::{Sequencer, Transition};

/// A keyboard command, one per input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Restart,
    Quit,
}

impl Command {
    /// An empty line (plain Enter) counts as `Next`.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "n" | "next" | "" => Some(Command::Next),
            "r" | "restart" => Some(Command::Restart),
            "q" | "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

pub fn realtime_config(settings: &RealtimeSettings) -> RealtimeConfig {
    RealtimeConfig {
        project_ref: settings.project_ref.clone(),
        api_key: settings.api_key.clone(),
        heartbeat_interval_secs: u64::from(settings.heartbeat_interval),
        reconnect_delay_secs: u64::from(settings.reconnect_delay),
        max_reconnect_delay_secs: u64::from(settings.max_reconnect_delay),
    }
}

pub fn presence_policy(config: &PresenceConfig) -> PresencePolicy {
    PresencePolicy {
        ttl: Duration::from_secs(u64::from(config.ttl_secs)),
        sweep_interval: Duration::from_secs(u64::from(config.sweep_interval_secs)),
    }
}

/// The shared store this session talks to.
pub struct StoreHandle {
    pub shared: Arc<dyn SharedStore>,
    realtime: Option<Arc<RealtimeStore>>,
}

impl StoreHandle {
    pub fn memory() -> Self {
        Self {
            shared: Arc::new(MemoryStore::new()),
            realtime: None,
        }
    }

    /// Connect to the hosted channel, or fall back to an in-process store
    /// when offline, unconfigured, or unreachable.
    pub async fn connect(config: &KingdomConfig, client_id: &ClientId, offline: bool) -> Self {
        if offline {
            info!("Offline mode: presence stays local");
            return Self::memory();
        }
        if !config.realtime.is_configured() {
            info!("Realtime not configured: presence stays local");
            return Self::memory();
        }

        match RealtimeStore::connect(
            realtime_config(&config.realtime),
            &config.presence.collection,
            client_id,
        )
        .await
        {
            Ok(store) => {
                let store = Arc::new(store);
                Self {
                    shared: store.clone(),
                    realtime: Some(store),
                }
            }
            Err(e) => {
                warn!(error = %e, "Realtime store unavailable, presence stays local");
                Self::memory()
            }
        }
    }

    pub async fn close(&self) {
        if let Some(store) = &self.realtime {
            if let Err(e) = store.close().await {
                debug!(error = %e, "Realtime close failed");
            }
        }
    }
}

/// Single-screen presenter.
pub struct Presenter<W: Write> {
    config: KingdomConfig,
    sequencer: Sequencer,
    others: PresenceView,
    publisher: Option<PresencePublisher>,
    aggregator: Option<PresenceAggregator>,
    renderer: TerminalRenderer<W>,
}

impl<W: Write> Presenter<W> {
    pub fn new(
        config: KingdomConfig,
        records: Vec<PromptRecord>,
        store: Arc<dyn SharedStore>,
        client_id: &ClientId,
        clock: Arc<dyn Clock>,
        out: W,
    ) -> Result<Self, StoreError> {
        let sequencer = Sequencer::new(
            records,
            Duration::from_millis(u64::from(config.sequencer.transition_delay_ms)),
            config.sequencer.restart_policy,
        )
        .with_seed(config.sequencer.shuffle_seed);

        let (publisher, aggregator) = if config.presence.enabled {
            let collection = &config.presence.collection;
            let aggregator = PresenceAggregator::start(
                &*store,
                collection,
                client_id.clone(),
                presence_policy(&config.presence),
                Arc::clone(&clock),
            )?;
            let publisher = PresencePublisher::new(store, collection, client_id, clock);
            (Some(publisher), Some(aggregator))
        } else {
            info!("Presence disabled");
            (None, None)
        };

        let others = aggregator
            .as_ref()
            .map(PresenceAggregator::view)
            .unwrap_or_default();

        Ok(Self {
            config,
            sequencer,
            others,
            publisher,
            aggregator,
            renderer: TerminalRenderer::new(out),
        })
    }

    fn redraw(&mut self) -> kingdom_common::Result<()> {
        let frame = compose_frame(
            self.sequencer.current(),
            self.sequencer.is_fading(),
            &self.others,
            WORLD_REGIONS,
            &self.config.records,
        );
        self.renderer.render(&frame)?;
        Ok(())
    }

    async fn publish_current(&self) {
        if let (Some(publisher), Some(record)) = (&self.publisher, self.sequencer.current()) {
            publisher.publish(&record.country).await;
        }
    }

    /// Start a fade; the caller arms the timer.
    pub fn next(&mut self) -> Option<Transition> {
        self.sequencer.begin_advance()
    }

    /// The fade timer fired.
    pub async fn transition_elapsed(&mut self, transition: Transition) {
        if self.sequencer.finish_transition(transition) {
            self.publish_current().await;
        }
    }

    pub async fn restart(&mut self) {
        self.sequencer.restart();
        self.publish_current().await;
    }

    /// Remove this client's presence entry and stop listening.
    pub async fn shutdown(&mut self) {
        if let Some(publisher) = &self.publisher {
            publisher.retract().await;
        }
        if let Some(aggregator) = self.aggregator.take() {
            aggregator.stop();
        }
    }

    /// Run until `q`, end of input, or Ctrl-C.
    pub async fn run<R>(mut self, input: R) -> kingdom_common::Result<W>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut view_rx = self.aggregator.as_ref().map(PresenceAggregator::watch);
        let mut pending: Option<Transition> = None;
        let timer = tokio::time::sleep(Duration::ZERO);
        tokio::pin!(timer);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        if self.sequencer.is_empty() {
            warn!("No prayer records loaded; showing the loading screen");
        }
        info!(records = self.sequencer.len(), "Presenter running");
        self.publish_current().await;
        self.redraw()?;

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => match Command::parse(&line) {
                        Some(Command::Next) => {
                            if let Some(transition) = self.next() {
                                timer.as_mut().reset(Instant::now() + transition.delay);
                                pending = Some(transition);
                                self.redraw()?;
                            }
                        }
                        Some(Command::Restart) => {
                            pending = None;
                            self.restart().await;
                            self.redraw()?;
                        }
                        Some(Command::Quit) => break,
                        None => debug!(input = %line.trim(), "Unknown command"),
                    },
                    Ok(None) => {
                        debug!("Input closed");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read input");
                        break;
                    }
                },
                () = &mut timer, if pending.is_some() => {
                    if let Some(transition) = pending.take() {
                        self.transition_elapsed(transition).await;
                        self.redraw()?;
                    }
                }
                alive = wait_for_view(&mut view_rx) => {
                    match (alive, view_rx.as_mut()) {
                        (true, Some(rx)) => {
                            self.others = rx.borrow_and_update().clone();
                            self.redraw()?;
                        }
                        _ => {
                            warn!("Presence view ended; keeping the last one");
                            view_rx = None;
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    info!("Interrupted");
                    break;
                }
            }
        }

        self.shutdown().await;
        info!("Presenter stopped");
        Ok(self.renderer.into_inner())
    }
}

/// Resolves when the view changes; never resolves without a receiver.
async fn wait_for_view(rx: &mut Option<watch::Receiver<PresenceView>>) -> bool {
    match rx {
        Some(rx) => rx.changed().await.is_ok(),
        None => std::future::pending().await,
    }
}
