use corral_api::PoolError;

pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

pub const DEFAULT_THREAD_NAME_PREFIX: &str = "corral-worker-";

/// Configuration for a `WorkerPool`.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of workers spawned by `WorkerPool::start`.
    pub workers: usize,

    /// Maximum number of queued tasks. Submissions beyond it are rejected.
    pub queue_capacity: usize,

    /// Worker threads are named `{prefix}{id}`.
    pub thread_name_prefix: String,

    /// Whether terminate logs the final statistics.
    pub log_statistics_on_shutdown: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name_prefix: DEFAULT_THREAD_NAME_PREFIX.to_string(),
            log_statistics_on_shutdown: true,
        }
    }
}

impl PoolConfig {
    /// Default configuration with the given queue capacity.
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            queue_capacity,
            ..Self::default()
        }
    }

    /// Check that the configuration can back a pool.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.queue_capacity == 0 {
            return Err(PoolError::ConfigError(
                "queue capacity must be positive".to_string(),
            ));
        }
        if self.thread_name_prefix.is_empty() {
            return Err(PoolError::ConfigError(
                "thread name prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn thread_name(&self, worker_id: usize) -> String {
        format!("{}{}", self.thread_name_prefix, worker_id)
    }
}
