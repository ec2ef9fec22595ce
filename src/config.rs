/*!
 * Monitor Configuration
 *
 * Every option with its default, validated when a monitor is built.
 * Sources: code, JSON (string or file), and `MEMORY_*` environment overrides.
 */

use crate::core::serde::{serde_as, DurationMilliSeconds};
use crate::core::{MonitorError, MonitorResult};
use crate::memory::{SizeClass, SystemMemorySource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const MB: u64 = 1024 * 1024;

/// Log level gating the tracing subscriber when `RUST_LOG` is unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl FromStr for LogLevel {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(MonitorError::invalid_config(format!(
                "unknown log level '{}'",
                other
            ))),
        }
    }
}

/// Byte size of each pool class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSizes {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
    pub xlarge: usize,
}

impl PoolSizes {
    pub fn size_of(&self, class: SizeClass) -> usize {
        match class {
            SizeClass::Small => self.small,
            SizeClass::Medium => self.medium,
            SizeClass::Large => self.large,
            SizeClass::XLarge => self.xlarge,
        }
    }
}

impl Default for PoolSizes {
    fn default() -> Self {
        Self {
            small: 64,
            medium: 1024,
            large: 16384,
            xlarge: 65536,
        }
    }
}

/// Monitor configuration
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub enable_smart_gc: bool,
    pub enable_leak_detection: bool,
    pub enable_heap_optimization: bool,
    pub enable_memory_pools: bool,
    pub enable_predictive_allocation: bool,

    /// Overall pressure above which a remediation pass runs (default: 0.85)
    pub memory_pressure_threshold: f64,
    /// Heap growth in MiB per sample that counts as a leak (default: 0.1)
    pub leak_detection_threshold: f64,
    /// Fragmentation above which defragmentation runs (default: 0.3)
    pub heap_fragmentation_threshold: f64,

    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "monitoring_interval_ms")]
    pub monitoring_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "gc_optimization_interval_ms")]
    pub gc_optimization_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "leak_detection_interval_ms")]
    pub leak_detection_interval: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "heap_optimization_interval_ms")]
    pub heap_optimization_interval: Duration,
    /// Minimum gap between pressure-triggered passes; zero disables it
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "remediation_cooldown_ms")]
    pub remediation_cooldown: Duration,

    /// Heap budget without heap introspection (default: 80% of system RAM)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_heap_size: Option<u64>,
    /// Host free memory below this is treated as an emergency (bytes)
    pub min_free_memory: u64,

    pub pool_sizes: PoolSizes,
    /// Capacity of each pool's idle list
    pub max_pool_size: usize,
    /// Idle objects created per pool at construction
    pub pool_prealloc: usize,

    pub log_level: LogLevel,
}

impl MonitorConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self {
            enable_smart_gc: true,
            enable_leak_detection: true,
            enable_heap_optimization: true,
            enable_memory_pools: true,
            enable_predictive_allocation: true,
            memory_pressure_threshold: 0.85,
            leak_detection_threshold: 0.1,
            heap_fragmentation_threshold: 0.3,
            monitoring_interval: Duration::from_millis(5_000),
            gc_optimization_interval: Duration::from_millis(30_000),
            leak_detection_interval: Duration::from_millis(60_000),
            heap_optimization_interval: Duration::from_millis(120_000),
            remediation_cooldown: Duration::from_secs(10),
            max_heap_size: None,
            min_free_memory: 100 * MB,
            pool_sizes: PoolSizes::default(),
            max_pool_size: 1000,
            pool_prealloc: 10,
            log_level: LogLevel::Info,
        }
    }

    /// Tight cadences and early remediation, for memory-constrained hosts
    pub fn aggressive() -> Self {
        Self {
            memory_pressure_threshold: 0.7,
            leak_detection_threshold: 0.05,
            heap_fragmentation_threshold: 0.2,
            monitoring_interval: Duration::from_millis(1_000),
            gc_optimization_interval: Duration::from_millis(10_000),
            leak_detection_interval: Duration::from_millis(30_000),
            heap_optimization_interval: Duration::from_millis(60_000),
            remediation_cooldown: Duration::from_secs(5),
            ..Self::new()
        }
    }

    /// Slow cadences and late remediation, for hosts with headroom
    pub fn relaxed() -> Self {
        Self {
            memory_pressure_threshold: 0.95,
            leak_detection_threshold: 0.5,
            heap_fragmentation_threshold: 0.5,
            monitoring_interval: Duration::from_millis(15_000),
            gc_optimization_interval: Duration::from_millis(120_000),
            leak_detection_interval: Duration::from_millis(300_000),
            heap_optimization_interval: Duration::from_millis(600_000),
            remediation_cooldown: Duration::from_secs(60),
            ..Self::new()
        }
    }

    pub fn from_json_str(json: &str) -> MonitorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> MonitorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            MonitorError::invalid_config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Defaults (or `MEMORY_CONFIG` file) overlaid with `MEMORY_*` variables
    ///
    /// - MEMORY_CONFIG: path to a JSON config file
    /// - MEMORY_PRESSURE_THRESHOLD, MEMORY_LEAK_THRESHOLD,
    ///   MEMORY_FRAGMENTATION_THRESHOLD: ratios
    /// - MEMORY_MONITORING_INTERVAL_MS: monitoring cadence
    /// - MEMORY_MAX_HEAP_SIZE, MEMORY_MIN_FREE: bytes
    /// - MEMORY_ENABLE_POOLS: true/false
    /// - MEMORY_LOG_LEVEL: error|warn|info|debug
    pub fn from_env() -> MonitorResult<Self> {
        let mut config = match std::env::var("MEMORY_CONFIG") {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::new(),
        };

        if let Some(v) = env_parse::<f64>("MEMORY_PRESSURE_THRESHOLD")? {
            config.memory_pressure_threshold = v;
        }
        if let Some(v) = env_parse::<f64>("MEMORY_LEAK_THRESHOLD")? {
            config.leak_detection_threshold = v;
        }
        if let Some(v) = env_parse::<f64>("MEMORY_FRAGMENTATION_THRESHOLD")? {
            config.heap_fragmentation_threshold = v;
        }
        if let Some(v) = env_parse::<u64>("MEMORY_MONITORING_INTERVAL_MS")? {
            config.monitoring_interval = Duration::from_millis(v);
        }
        if let Some(v) = env_parse::<u64>("MEMORY_MAX_HEAP_SIZE")? {
            config.max_heap_size = Some(v);
        }
        if let Some(v) = env_parse::<u64>("MEMORY_MIN_FREE")? {
            config.min_free_memory = v;
        }
        if let Some(v) = env_parse::<bool>("MEMORY_ENABLE_POOLS")? {
            config.enable_memory_pools = v;
        }
        if let Some(v) = env_parse::<LogLevel>("MEMORY_LOG_LEVEL")? {
            config.log_level = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MonitorResult<()> {
        for (name, value) in [
            ("memory_pressure_threshold", self.memory_pressure_threshold),
            ("heap_fragmentation_threshold", self.heap_fragmentation_threshold),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(MonitorError::invalid_config(format!(
                    "{} must be in (0, 1], got {}",
                    name, value
                )));
            }
        }

        if !(self.leak_detection_threshold > 0.0 && self.leak_detection_threshold.is_finite()) {
            return Err(MonitorError::invalid_config(format!(
                "leak_detection_threshold must be positive, got {}",
                self.leak_detection_threshold
            )));
        }

        for (name, interval) in [
            ("monitoring_interval", self.monitoring_interval),
            ("gc_optimization_interval", self.gc_optimization_interval),
            ("leak_detection_interval", self.leak_detection_interval),
            ("heap_optimization_interval", self.heap_optimization_interval),
        ] {
            if interval.is_zero() {
                return Err(MonitorError::invalid_config(format!("{} must be non-zero", name)));
            }
        }

        if SizeClass::ALL
            .iter()
            .any(|&class| self.pool_sizes.size_of(class) == 0)
        {
            return Err(MonitorError::invalid_config("pool sizes must be non-zero"));
        }

        if self.max_pool_size == 0 {
            return Err(MonitorError::invalid_config("max_pool_size must be non-zero"));
        }

        if self.pool_prealloc > self.max_pool_size {
            return Err(MonitorError::invalid_config(format!(
                "pool_prealloc ({}) exceeds max_pool_size ({})",
                self.pool_prealloc, self.max_pool_size
            )));
        }

        if self.max_heap_size == Some(0) {
            return Err(MonitorError::invalid_config("max_heap_size must be non-zero"));
        }

        Ok(())
    }

    /// Configured heap budget, or 80% of host memory
    pub fn resolved_max_heap_size(&self) -> u64 {
        self.max_heap_size.unwrap_or_else(|| {
            let total = SystemMemorySource::total_system_memory();
            (total as f64 * 0.8) as u64
        })
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_parse<T>(key: &str) -> MonitorResult<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| MonitorError::invalid_config(format!("{}: {}", key, e))),
        Err(_) => Ok(None),
    }
}
