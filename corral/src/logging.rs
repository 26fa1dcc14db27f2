// Logging for Corral
//
// The pool reports through the `tracing` ecosystem: lifecycle changes at INFO,
// per-task flow at DEBUG, rejections and ignored lifecycle calls at WARN/DEBUG,
// worker panics and spawn failures at ERROR. Nothing is printed directly.
//
// # Usage Examples
//
// ## Basic Initialization
//
// ```rust
// use corral::logging;
//
// // INFO level, console output
// logging::init_default();
//
// // Or with custom settings
// let config = logging::LogConfig {
//     level: tracing::Level::DEBUG,
//     json_format: false,
//     ..Default::default()
// };
// logging::init(config);
// ```
//
// ## Development / Production / Tests
//
// ```rust
// use corral::logging;
//
// logging::init_development(); // DEBUG, file/line info, corral=trace
// logging::init_production();  // INFO, JSON, no file/line
// logging::init_test();        // WARN, compact
// ```
//
// ## Pool Macros
//
// ```rust
// use corral::{log_lifecycle, log_task, worker_span};
//
// let span = worker_span!(3);
// let _guard = span.enter();
// log_task!(17, "started");
// log_lifecycle!("pause", "applied");
// ```
//
// Worker threads install the dispatcher that was current when the pool was
// initialized, so a thread-local subscriber set up by a test also captures
// the workers' events.

use std::sync::Once;
use tracing::{Level, Subscriber};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Configuration for the Corral logging system
///
/// # Examples
///
/// ```rust
/// use corral::logging::LogConfig;
/// use tracing::Level;
///
/// let custom_config = LogConfig {
///     level: Level::DEBUG,
///     json_format: true,
///     show_file_line: false,
///     show_thread_info: true,
///     show_time: true,
///     target_filters: Some("corral=debug,corral::pool=trace".to_string()),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: Level,
    /// Whether to use JSON format for logs
    pub json_format: bool,
    /// Whether to include file and line information
    pub show_file_line: bool,
    /// Whether to include thread name/id; worker threads are named after their id
    pub show_thread_info: bool,
    /// Whether to include timestamps
    pub show_time: bool,
    /// Target filter expressions (format: "target=level,target2=level2,...")
    pub target_filters: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            show_file_line: true,
            show_thread_info: true,
            show_time: true,
            target_filters: None,
        }
    }
}

// Initialization guard to ensure we only initialize once
static INIT: Once = Once::new();

fn env_filter(config: &LogConfig) -> EnvFilter {
    let mut env_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    if let Some(filters) = &config.target_filters {
        for filter in filters.split(',') {
            if let Ok(directive) = filter.parse() {
                env_filter = env_filter.add_directive(directive);
            }
        }
    }
    env_filter
}

/// Initialize the logging system with the given configuration
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init(config: LogConfig) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(env_filter(&config));

        let subscriber: Box<dyn Subscriber + Send + Sync> = if config.json_format {
            Box::new(registry.with(fmt::layer().json().flatten_event(true)))
        } else {
            let fmt_layer = fmt::layer()
                .with_ansi(atty::is(atty::Stream::Stdout))
                .with_file(config.show_file_line)
                .with_line_number(config.show_file_line)
                .with_thread_names(config.show_thread_info)
                .with_thread_ids(config.show_thread_info);

            if config.show_time {
                Box::new(registry.with(fmt_layer))
            } else {
                Box::new(registry.with(fmt_layer.without_time()))
            }
        };

        set_global_subscriber(subscriber);
    });
}

// Helper function to set the global subscriber
fn set_global_subscriber<S>(subscriber: S)
where
    S: Subscriber + Send + Sync + 'static,
{
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Error setting global tracing subscriber: {}", err);
    }
}

/// INFO level, human-readable console output.
pub fn init_default() {
    init(LogConfig::default());
}

/// Initialize logging optimized for development environments
///
/// - DEBUG level for all modules, TRACE for the pool internals
/// - Colorized console output with file/line information
/// - Thread names and IDs displayed
pub fn init_development() {
    let config = LogConfig {
        level: Level::DEBUG,
        json_format: false,
        show_file_line: true,
        show_thread_info: true,
        show_time: true,
        target_filters: Some("corral=debug,corral::pool=trace".to_string()),
    };
    init(config);
}

/// Initialize logging optimized for production environments
///
/// JSON output for log aggregators, no file/line information.
pub fn init_production() {
    let config = LogConfig {
        level: Level::INFO,
        json_format: true,
        show_file_line: false,
        show_thread_info: true,
        show_time: true,
        target_filters: None,
    };
    init(config);
}

/// Initialize logging for tests: warnings and errors only, no timestamps.
pub fn init_test() {
    let config = LogConfig {
        level: Level::WARN,
        json_format: false,
        show_file_line: true,
        show_thread_info: false,
        show_time: false,
        target_filters: None,
    };
    init(config);
}

/// Span covering everything a worker does.
///
/// ```rust
/// use corral::worker_span;
///
/// let span = worker_span!(2);
/// let _guard = span.enter();
/// ```
#[macro_export]
macro_rules! worker_span {
    ($worker_id:expr) => {
        tracing::info_span!("worker", id = $worker_id)
    };
    ($worker_id:expr, $($fields:tt)*) => {
        tracing::info_span!("worker", id = $worker_id, $($fields)*)
    };
}

/// Log pool lifecycle events (initialize, pause, terminate, ...).
///
/// ```rust
/// use corral::log_lifecycle;
///
/// log_lifecycle!("initialize", "applied", workers = 4);
/// ```
#[macro_export]
macro_rules! log_lifecycle {
    ($operation:expr, $outcome:expr) => {
        tracing::info!(operation = $operation, outcome = $outcome)
    };
    ($operation:expr, $outcome:expr, $($fields:tt)*) => {
        tracing::info!(operation = $operation, outcome = $outcome, $($fields)*)
    };
}

/// Log per-task progress.
///
/// ```rust
/// use corral::log_task;
///
/// log_task!(42, "finished", output = 7);
/// ```
#[macro_export]
macro_rules! log_task {
    ($task_id:expr, $event:expr) => {
        tracing::debug!(task_id = $task_id, event = $event)
    };
    ($task_id:expr, $event:expr, $($fields:tt)*) => {
        tracing::debug!(task_id = $task_id, event = $event, $($fields)*)
    };
}

/// The dispatcher current on this thread.
///
/// The pool captures it at initialize and installs it in every worker thread.
#[inline]
pub fn current_subscriber() -> tracing::Dispatch {
    tracing::dispatcher::get_default(|d| d.clone())
}
