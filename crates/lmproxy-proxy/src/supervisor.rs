//! Proxy supervisor for managing the chat-completions server lifecycle.
//!
//! The supervisor owns the server state internally behind a
//! `tokio::sync::Mutex`; callers (the `start` chat command, the CLI) only
//! hold the supervisor itself.
//!
//! - **Bind-then-report**: the listener binds first, then the real address
//!   is reported.
//! - **Single instance**: `start` while listening is refused without a
//!   second bind.
//! - **Abandoned starts**: a `start` future dropped mid-bind leaves the
//!   supervisor as it was before the call.
//! - **Crash detection**: `status()` uses the cancellation token to tell a
//!   clean stop from a server task that exited on its own.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use lmproxy_core::{DEFAULT_HOSTNAME, DEFAULT_PORT, LanguageModelHost};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running proxy server.
struct ProxyHandle {
    cancel_token: CancellationToken,
    join_handle: JoinHandle<anyhow::Result<()>>,
    bound_addr: SocketAddr,
}

/// Internal lifecycle state. A start in progress is tracked separately.
enum Lifecycle {
    Stopped,
    Listening(ProxyHandle),
    Failed(String),
}

/// Marks a start as in progress; clears the mark on drop.
///
/// Held across the bind so a cancelled `start` cannot leave the
/// supervisor reporting `Starting`.
struct StartingGuard<'a> {
    starting: &'a AtomicBool,
}

impl<'a> StartingGuard<'a> {
    /// `None` when another start already holds the mark.
    fn claim(starting: &'a AtomicBool) -> Option<Self> {
        (!starting.swap(true, Ordering::SeqCst)).then_some(Self { starting })
    }
}

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        self.starting.store(false, Ordering::SeqCst);
    }
}

/// Externally visible status of the proxy server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyStatus {
    /// Never started, or stopped cleanly.
    Stopped,
    /// A start is binding the listener.
    Starting,
    /// Accepting connections.
    Listening {
        /// Address the server is bound to.
        address: SocketAddr,
    },
    /// The last start failed, or the server task exited on its own.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for ProxyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "Stopped"),
            Self::Starting => write!(f, "Starting"),
            Self::Listening { address } => write!(f, "Listening on {address}"),
            Self::Failed { reason } => write!(f, "Failed: {reason}"),
        }
    }
}

/// Error from supervisor operations.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The server is already listening.
    #[error("Proxy is already running on {0}")]
    AlreadyRunning(SocketAddr),

    /// Another start is in progress.
    #[error("Proxy is already starting")]
    AlreadyStarting,

    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {reason}")]
    BindFailed { address: String, reason: String },

    /// The server is not running.
    #[error("Proxy is not running")]
    NotRunning,

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration for starting the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Hostname or address to bind to.
    pub hostname: String,
    /// Port to bind to (0 for auto-assign).
    pub port: u16,
    /// Directory with Swagger UI assets served under `/api-docs/static`.
    pub docs_assets_dir: Option<PathBuf>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_HOSTNAME.to_string(),
            port: DEFAULT_PORT,
            docs_assets_dir: None,
        }
    }
}

/// Result of a successful start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedProxy {
    /// Address the listener is bound to.
    pub address: SocketAddr,
    /// `http://<hostname>:<bound port>`, using the configured hostname.
    pub base_url: String,
}

impl StartedProxy {
    /// Base URL OpenAI clients should use.
    pub fn api_url(&self) -> String {
        format!("{}/v1", self.base_url)
    }

    /// URL of the interactive API documentation.
    pub fn docs_url(&self) -> String {
        format!("{}{}", self.base_url, crate::docs::DOCS_PATH)
    }
}

/// Supervisor for the chat-completions proxy.
///
/// # Example
///
/// ```ignore
/// let supervisor = ProxySupervisor::new();
/// let started = supervisor.start(ProxyConfig::default(), host).await?;
/// println!("Serving on {}", started.api_url());
/// supervisor.stop().await?;
/// ```
pub struct ProxySupervisor {
    state: Mutex<Lifecycle>,
    starting: AtomicBool,
}

impl Default for ProxySupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxySupervisor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Lifecycle::Stopped),
            starting: AtomicBool::new(false),
        }
    }

    /// Start the proxy server.
    ///
    /// Binds first, then spawns the server task on the bound listener.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` or `AlreadyStarting` if a server is up or coming up,
    /// `BindFailed` if the address cannot be bound (the status becomes
    /// `Failed`).
    pub async fn start(
        &self,
        config: ProxyConfig,
        host: Arc<dyn LanguageModelHost>,
    ) -> Result<StartedProxy, SupervisorError> {
        let _starting = {
            let mut guard = self.state.lock().await;
            if let Lifecycle::Listening(h) = &*guard {
                if !h.join_handle.is_finished() {
                    return Err(SupervisorError::AlreadyRunning(h.bound_addr));
                }
            }
            let starting =
                StartingGuard::claim(&self.starting).ok_or(SupervisorError::AlreadyStarting)?;

            if let Lifecycle::Listening(old) = std::mem::replace(&mut *guard, Lifecycle::Stopped) {
                match old.join_handle.await {
                    Ok(Ok(())) => debug!("Previous proxy task completed normally"),
                    Ok(Err(e)) => warn!("Previous proxy task ended with error: {e}"),
                    Err(e) => warn!("Previous proxy task panicked: {e}"),
                }
            }
            starting
        };

        let bind_addr = format!("{}:{}", config.hostname, config.port);
        let bound = match TcpListener::bind((config.hostname.as_str(), config.port)).await {
            Ok(listener) => listener.local_addr().map(|addr| (listener, addr)).map_err(|e| {
                SupervisorError::Internal(format!("Failed to get local address: {e}"))
            }),
            Err(e) => Err(SupervisorError::BindFailed {
                address: bind_addr,
                reason: e.to_string(),
            }),
        };

        let mut guard = self.state.lock().await;
        let (listener, bound_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                error!("Proxy failed to start: {e}");
                *guard = Lifecycle::Failed(e.to_string());
                return Err(e);
            }
        };

        info!("Proxy bound to {bound_addr}");

        let cancel_token = CancellationToken::new();
        let cancel_clone = cancel_token.clone();
        let docs_assets_dir = config.docs_assets_dir;
        let join_handle = tokio::spawn(async move {
            debug!(addr = %bound_addr, "Proxy task starting");
            crate::server::serve(listener, host, docs_assets_dir, cancel_clone).await
        });

        *guard = Lifecycle::Listening(ProxyHandle {
            cancel_token,
            join_handle,
            bound_addr,
        });

        Ok(StartedProxy {
            address: bound_addr,
            base_url: format!("http://{}:{}", config.hostname, bound_addr.port()),
        })
    }

    /// Stop the proxy server.
    ///
    /// Cancels the server (and every in-flight invocation) and waits for the
    /// task. A task still running after five seconds is aborted.
    ///
    /// # Errors
    ///
    /// `NotRunning` if nothing is listening, `Internal` if the task failed,
    /// panicked or had to be aborted.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        let mut guard = self.state.lock().await;

        let handle = match std::mem::replace(&mut *guard, Lifecycle::Stopped) {
            Lifecycle::Listening(h) => h,
            other => {
                *guard = other;
                return Err(SupervisorError::NotRunning);
            }
        };

        info!("Stopping proxy on {}", handle.bound_addr);
        handle.cancel_token.cancel();

        let mut join = handle.join_handle;
        match tokio::time::timeout(STOP_TIMEOUT, &mut join).await {
            Ok(Ok(Ok(()))) => {
                info!("Proxy stopped cleanly");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                error!("Proxy task ended with error: {e}");
                Err(SupervisorError::Internal(format!("Proxy error: {e}")))
            }
            Ok(Err(join_err)) => {
                error!("Proxy task panicked: {join_err}");
                Err(SupervisorError::Internal(format!(
                    "Task panicked: {join_err}"
                )))
            }
            Err(_) => {
                warn!("Proxy stop timed out; aborting task");
                join.abort();
                Err(SupervisorError::Internal(
                    "Proxy stop timed out; task aborted".into(),
                ))
            }
        }
    }

    /// Current status of the proxy.
    ///
    /// A server task that finished without being cancelled is reported
    /// (and remembered) as `Failed`.
    pub async fn status(&self) -> ProxyStatus {
        let mut guard = self.state.lock().await;

        match &*guard {
            Lifecycle::Stopped | Lifecycle::Failed(_) if self.starting.load(Ordering::SeqCst) => {
                ProxyStatus::Starting
            }
            Lifecycle::Stopped => ProxyStatus::Stopped,
            Lifecycle::Failed(reason) => ProxyStatus::Failed {
                reason: reason.clone(),
            },
            Lifecycle::Listening(h) if !h.join_handle.is_finished() => ProxyStatus::Listening {
                address: h.bound_addr,
            },
            Lifecycle::Listening(h) => {
                if h.cancel_token.is_cancelled() {
                    *guard = Lifecycle::Stopped;
                    ProxyStatus::Stopped
                } else {
                    warn!("Detected crashed proxy, cleaning up handle");
                    let reason = "Proxy server exited unexpectedly".to_string();
                    *guard = Lifecycle::Failed(reason.clone());
                    ProxyStatus::Failed { reason }
                }
            }
        }
    }

    /// The bound address while listening.
    pub async fn bound_address(&self) -> Option<SocketAddr> {
        match &*self.state.lock().await {
            Lifecycle::Listening(h) if !h.join_handle.is_finished() => Some(h.bound_addr),
            _ => None,
        }
    }
}

impl fmt::Debug for ProxySupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySupervisor").finish()
    }
}
