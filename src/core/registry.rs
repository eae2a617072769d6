//! Name to logger directory

use super::error::Result;
use super::logger::Logger;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Name of the logger every registry starts with
pub const ROOT_LOGGER_NAME: &str = "root";

static GLOBAL: OnceLock<LoggerRegistry> = OnceLock::new();

/// Maps logger names to shared loggers
///
/// Every registry holds a `root` logger (synchronous, default pattern,
/// console output, DEBUG threshold) that cannot be replaced or removed.
/// Registration is first-wins: adding a second logger under a taken name is
/// a silent no-op.
///
/// Statics are never dropped, so loggers held by the
/// [global](LoggerRegistry::global) registry are not drained on their own
/// when the process exits. Call [`shutdown_all`] (or
/// [`LoggerRegistry::shutdown_all`]) before returning from `main`.
///
/// # Example
///
/// ```
/// use rust_async_logger::prelude::*;
///
/// let registry = LoggerRegistry::new();
/// let db = Logger::builder("db").build_into(&registry).unwrap();
///
/// assert!(registry.contains("db"));
/// assert!(std::sync::Arc::ptr_eq(&db, &registry.get("db").unwrap()));
/// assert_eq!(registry.root().name(), "root");
/// ```
pub struct LoggerRegistry {
    root: Arc<Logger>,
    loggers: Mutex<HashMap<String, Arc<Logger>>>,
}

impl LoggerRegistry {
    /// Create an independent registry holding only the root logger
    pub fn new() -> Self {
        let root = Arc::new(Logger::root());
        let mut loggers = HashMap::new();
        loggers.insert(ROOT_LOGGER_NAME.to_string(), Arc::clone(&root));
        Self {
            root,
            loggers: Mutex::new(loggers),
        }
    }

    /// The process-wide registry, created on first use
    pub fn global() -> &'static LoggerRegistry {
        GLOBAL.get_or_init(LoggerRegistry::new)
    }

    /// Look up a logger by name
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.lock().get(name).cloned()
    }

    /// Register `logger` under its own name
    ///
    /// Returns `false` and leaves the registry untouched when the name is
    /// already taken.
    pub fn add(&self, logger: Arc<Logger>) -> bool {
        let mut loggers = self.loggers.lock();
        if loggers.contains_key(logger.name()) {
            return false;
        }
        loggers.insert(logger.name().to_string(), logger);
        true
    }

    pub fn root(&self) -> Arc<Logger> {
        Arc::clone(&self.root)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.loggers.lock().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.loggers.lock().len()
    }

    /// Always false; the root logger is never removed
    pub fn is_empty(&self) -> bool {
        self.loggers.lock().is_empty()
    }

    /// Shut down every registered logger, root included
    ///
    /// Asynchronous loggers drain their pipelines and stop accepting
    /// records; every sink is flushed. Loggers stay registered, and handles
    /// held elsewhere see the stopped state. This is the exit hook for
    /// registries that are never dropped.
    ///
    /// # Errors
    ///
    /// Returns the first flush error; every logger is still shut down.
    pub fn shutdown_all(&self) -> Result<()> {
        let loggers: Vec<Arc<Logger>> = self.loggers.lock().values().cloned().collect();
        let mut first_error = None;
        for logger in loggers {
            if let Err(e) = logger.shutdown() {
                eprintln!("[LOGGER ERROR] Failed to shut down logger '{}': {}", logger.name(), e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Remove every logger except root
    ///
    /// Loggers still referenced elsewhere stay alive until their last
    /// handle drops; the rest shut down here.
    pub fn clear(&self) {
        let removed: Vec<Arc<Logger>> = {
            let mut loggers = self.loggers.lock();
            let names: Vec<String> = loggers
                .keys()
                .filter(|name| name.as_str() != ROOT_LOGGER_NAME)
                .cloned()
                .collect();
            names.iter().filter_map(|name| loggers.remove(name)).collect()
        };
        // Dropped outside the lock so draining pipelines cannot stall lookups
        drop(removed);
    }
}

impl Default for LoggerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up `name` in the process-wide registry
pub fn get_logger(name: &str) -> Option<Arc<Logger>> {
    LoggerRegistry::global().get(name)
}

/// The root logger of the process-wide registry
pub fn root_logger() -> Arc<Logger> {
    LoggerRegistry::global().root()
}

/// Drain and flush every logger of the process-wide registry
///
/// Call once before the process exits.
///
/// # Example
///
/// ```no_run
/// use rust_async_logger::prelude::*;
///
/// fn main() -> rust_async_logger::Result<()> {
///     let app = Logger::builder("app")
///         .sink(FileSink::new("logs/app.log")?)
///         .async_mode()
///         .build_global()?;
///     app.info(file!(), line!(), "started");
///
///     shutdown_all()
/// }
/// ```
///
/// # Errors
///
/// Same as [`LoggerRegistry::shutdown_all`].
pub fn shutdown_all() -> Result<()> {
    LoggerRegistry::global().shutdown_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use crate::sinks::MemorySink;

    #[test]
    fn test_new_registry_has_root() {
        let registry = LoggerRegistry::new();
        let root = registry.root();

        assert_eq!(root.name(), ROOT_LOGGER_NAME);
        assert_eq!(root.level(), LogLevel::Debug);
        assert!(!root.is_async());
        assert_eq!(registry.names(), vec!["root"]);
        assert!(Arc::ptr_eq(&root, &registry.get("root").unwrap()));
    }

    #[test]
    fn test_first_registration_wins() {
        let registry = LoggerRegistry::new();
        let first_sink = MemorySink::new();
        let second_sink = MemorySink::new();

        let first = Arc::new(
            Logger::builder("net")
                .pattern("%m")
                .sink(first_sink.clone())
                .build()
                .unwrap(),
        );
        let second = Arc::new(
            Logger::builder("net")
                .pattern("%m")
                .sink(second_sink.clone())
                .build()
                .unwrap(),
        );

        assert!(registry.add(Arc::clone(&first)));
        assert!(!registry.add(second));

        registry.get("net").unwrap().info(file!(), line!(), "x");
        assert_eq!(first_sink.contents(), "x");
        assert_eq!(second_sink.contents(), "");
    }

    #[test]
    fn test_root_cannot_be_replaced() {
        let registry = LoggerRegistry::new();
        let impostor = Arc::new(Logger::builder("root").pattern("%m").build().unwrap());
        assert!(!registry.add(Arc::clone(&impostor)));
        assert!(!Arc::ptr_eq(&registry.root(), &impostor));
    }

    #[test]
    fn test_build_into_returns_existing() {
        let registry = LoggerRegistry::new();
        let a = Logger::builder("svc").build_into(&registry).unwrap();
        let b = Logger::builder("svc")
            .min_level(LogLevel::Error)
            .build_into(&registry)
            .unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.level(), LogLevel::Debug);
    }

    #[test]
    fn test_clear_keeps_root() {
        let registry = LoggerRegistry::new();
        for name in ["a", "b", "c"] {
            Logger::builder(name).build_into(&registry).unwrap();
        }
        assert_eq!(registry.len(), 4);

        registry.clear();
        assert_eq!(registry.names(), vec!["root"]);
        assert!(registry.get("a").is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_shutdown_all_drains_held_loggers() {
        let registry = LoggerRegistry::new();
        let capture = MemorySink::new();
        let held = Logger::builder("held-async")
            .pattern("%m%n")
            .sink(capture.clone())
            .async_mode()
            .build_into(&registry)
            .unwrap();

        for i in 0..50 {
            held.info(file!(), line!(), &i.to_string());
        }
        registry.shutdown_all().unwrap();

        assert_eq!(capture.lines().len(), 50);
        assert!(registry.contains("held-async"));

        held.info(file!(), line!(), "late");
        assert_eq!(capture.lines().len(), 50);
        assert_eq!(held.metrics().dropped_count(), 1);
    }

    #[test]
    fn test_global_registry_is_shared() {
        let logger = Logger::builder("registry-global-test").build_global().unwrap();
        let found = get_logger("registry-global-test").unwrap();
        assert!(Arc::ptr_eq(&logger, &found));
        assert!(Arc::ptr_eq(&root_logger(), &LoggerRegistry::global().root()));
    }
}
