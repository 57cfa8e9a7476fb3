//! Debug infrastructure with per-module loggers.
//!
//! Control via the `GNAW_DEBUG` environment variable:
//! - `GNAW_DEBUG=*` - Enable all loggers
//! - `GNAW_DEBUG=engine` - Enable only the engine
//! - `GNAW_DEBUG=engine,tree` - Enable multiple
//!
//! Verbosity via `GNAW_DEBUG_VERBOSITY` (0-3, default 1)

use std::collections::HashSet;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

// ============================================================================
// Configuration
// ============================================================================

struct Config {
    all: bool,
    modules: HashSet<String>,
    verbosity: u8,
}

impl Config {
    fn load() -> Self {
        let value = env::var("GNAW_DEBUG").unwrap_or_default();
        let all = matches!(value.as_str(), "*" | "1" | "true");
        let modules = if all {
            HashSet::new()
        } else {
            value.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        };
        let verbosity = env::var("GNAW_DEBUG_VERBOSITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(|v: u8| v.min(3))
            .unwrap_or(1);
        Config { all, modules, verbosity }
    }

    fn enables(&self, name: &str) -> bool {
        self.all || self.modules.contains(name)
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

fn config() -> &'static Config {
    CONFIG.get_or_init(Config::load)
}

// ============================================================================
// Logger
// ============================================================================

pub struct Logger {
    name: &'static str,
    enabled: bool,
    indent: AtomicUsize,
}

impl Logger {
    pub const fn disabled() -> Self {
        Self { name: "", enabled: false, indent: AtomicUsize::new(0) }
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    fn prefix(&self) -> String {
        let indent = self.indent.load(Ordering::Relaxed);
        format!("{}[{}]", "  ".repeat(indent), self.name)
    }

    #[inline]
    pub fn log(&self, msg: &str) {
        if self.enabled && config().verbosity >= 1 {
            eprintln!("{} {}", self.prefix(), msg);
        }
    }

    #[inline]
    pub fn detail(&self, msg: &str) {
        if self.enabled && config().verbosity >= 2 {
            eprintln!("{} {}", self.prefix(), msg);
        }
    }

    #[inline]
    pub fn success(&self, msg: &str) {
        if self.enabled && config().verbosity >= 1 {
            eprintln!("{} OK: {}", self.prefix(), msg);
        }
    }

    #[inline]
    pub fn fail(&self, msg: &str) {
        if self.enabled && config().verbosity >= 1 {
            eprintln!("{} FAIL: {}", self.prefix(), msg);
        }
    }

    #[inline]
    pub fn push_indent(&self) {
        if self.enabled {
            self.indent.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn pop_indent(&self) {
        if self.enabled {
            let _ = self
                .indent
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| Some(v.saturating_sub(1)));
        }
    }
}

/// Create a logger. The name must be a static string.
pub fn create_logger(name: &'static str) -> Logger {
    Logger {
        name,
        enabled: config().enables(name),
        indent: AtomicUsize::new(0),
    }
}

// ============================================================================
// Macros - avoid format! cost when disabled
// ============================================================================

#[macro_export]
macro_rules! log {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.log(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_detail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.detail(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_success {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.success(&format!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! log_fail {
    ($logger:expr, $($arg:tt)*) => {
        if $logger.enabled() {
            $logger.fail(&format!($($arg)*));
        }
    };
}
