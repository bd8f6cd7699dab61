//! `TackyServer` builder and server loop.
//!
//! This is the entry point for running a Tacky server. It ties together
//! all the layers: transport → protocol → session → matchmaking.

use std::marker::PhantomData;
use std::sync::Arc;

use tacky_match::{MatchLogic, MatchQueue, MatchTable, SharedMatches, spawn_coordinator};
use tacky_protocol::{Codec, LineCodec};
use tacky_session::{Registry, SharedRegistry, outbound_channel};
use tacky_transport::{TcpLineTransport, Transport};

use crate::handler::handle_connection;
use crate::{ServerConfig, TackyError};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// registry and match table carry their own locks.
pub(crate) struct ServerState<G: MatchLogic, C: Codec> {
    pub(crate) registry: SharedRegistry,
    pub(crate) matches: SharedMatches,
    pub(crate) queue: MatchQueue,
    pub(crate) codec: C,
    _logic: PhantomData<fn() -> G>,
}

/// Builder for configuring and starting a Tacky server.
///
/// # Example
///
/// ```rust,no_run
/// use tacky::prelude::*;
///
/// # async fn start() -> Result<(), TackyError> {
/// let server = TackyServerBuilder::new()
///     .bind("0.0.0.0:8081")
///     .build::<NoRules>()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TackyServerBuilder {
    config: ServerConfig,
}

impl TackyServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the capacity of each session's outbound queue.
    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.config.outbound_capacity = capacity;
        self
    }

    /// Binds the listener and starts the matchmaking coordinator.
    ///
    /// Uses [`LineCodec`] and [`TcpLineTransport`].
    pub async fn build<G: MatchLogic>(
        self,
    ) -> Result<TackyServer<G, LineCodec>, TackyError> {
        self.config.validate()?;
        let transport = TcpLineTransport::bind(&self.config.bind_addr).await?;

        let registry = Registry::shared();
        let matches = MatchTable::shared();
        // The coordinator runs detached for the life of the process.
        let (queue, _coordinator) =
            spawn_coordinator::<G>(Arc::clone(&registry), Arc::clone(&matches));

        let state = Arc::new(ServerState {
            registry,
            matches,
            queue,
            codec: LineCodec,
            _logic: PhantomData,
        });

        Ok(TackyServer {
            transport,
            state,
            config: self.config,
        })
    }
}

impl Default for TackyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tacky server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TackyServer<G: MatchLogic, C: Codec> {
    transport: TcpLineTransport,
    state: Arc<ServerState<G, C>>,
    config: ServerConfig,
}

impl<G, C> TackyServer<G, C>
where
    G: MatchLogic,
    C: Codec + Clone,
{
    /// Creates a new builder.
    pub fn builder() -> TackyServerBuilder {
        TackyServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the session registry.
    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.state.registry)
    }

    /// Returns a handle to the match table.
    pub fn matches(&self) -> SharedMatches {
        Arc::clone(&self.state.matches)
    }

    /// Runs the server accept loop.
    ///
    /// Each accepted connection is appended to the registry here, in
    /// accept order, before its handler task is spawned. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), TackyError> {
        tracing::info!(addr = %self.config.bind_addr, "Tacky server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let (outbound, outbound_rx) =
                        outbound_channel(self.config.outbound_capacity);
                    let session_id =
                        self.state.registry.lock().await.register(outbound.clone());

                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(
                            conn,
                            session_id,
                            outbound,
                            outbound_rx,
                            state,
                        )
                        .await
                        {
                            tracing::debug!(
                                %session_id,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
