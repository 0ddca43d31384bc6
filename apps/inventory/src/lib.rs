//! # Inventory Application Library
//!
//! Startup wiring and the command-line front-end. `main.rs` only parses
//! arguments and calls into this crate.
//!
//! ## Module Organization
//! ```text
//! inventory_app/
//! ├── lib.rs          ◄─── You are here (logging setup, exports)
//! ├── config.rs       ◄─── AppConfig: defaults, TOML, env overrides
//! ├── container.rs    ◄─── AppContainer: database, repository, view models
//! ├── cli.rs          ◄─── clap commands driven through the view models
//! └── error.rs        ◄─── AppError and the JSON error report
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Application Startup                               │
//! │                                                                         │
//! │  1. Parse Arguments ──────────────────────────────────────────────────► │
//! │     • clap: global --json / --config / --db                            │
//! │                                                                         │
//! │  2. Initialize Logging ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr            │
//! │     • starts on the default filter so config loading is logged         │
//! │                                                                         │
//! │  3. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults ◄── inventory.toml ◄── INVENTORY_* ◄── --db             │
//! │     • switch to the configured filter (RUST_LOG still wins)            │
//! │                                                                         │
//! │  4. Open Database ────────────────────────────────────────────────────► │
//! │     • Linux: ~/.local/share/inventory/inventory.db                     │
//! │     • Run pending migrations (or rebuild when destructive)             │
//! │                                                                         │
//! │  5. Run Command ──────────────────────────────────────────────────────► │
//! │     • AppContainer hands out view models                               │
//! │     • Close the pool on the way out                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod container;
pub mod error;

use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use container::AppContainer;
pub use error::{AppError, AppResult, ErrorCode, ErrorReport};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=inventory_ui=trace` - Show trace for the view models only
/// - Default: `filter` (from config, `INVENTORY_LOG`, or [`config::DEFAULT_LOG_FILTER`])
///
/// Logs go to stderr so command output on stdout stays parseable.
/// Calling it twice keeps the first subscriber and returns `None`.
pub fn init_tracing(filter: &str) -> Option<LogFilterHandle> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok()
        .map(|()| LogFilterHandle(handle))
}

/// Swaps the filter of the subscriber installed by [`init_tracing`].
#[derive(Clone)]
pub struct LogFilterHandle(reload::Handle<EnvFilter, Registry>);

impl LogFilterHandle {
    /// Applies `filter` unless `RUST_LOG` is set.
    pub fn set_filter(&self, filter: &str) {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            return;
        }
        if let Err(e) = self.0.reload(EnvFilter::new(filter)) {
            warn!(error = %e, "Could not apply configured log filter");
        }
    }
}
