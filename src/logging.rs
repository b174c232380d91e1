//! Logger collaborator used by the engine.
//!
//! The engine reports what it does (registrations, init, each transition
//! attempt, hook failures, close and reset) through a [`Logger`]. By default
//! nothing is logged. [`TracingLogger`] routes the messages into `tracing`,
//! and any `Fn(&str)` closure works as a logger too.

use std::fmt;

/// Sink for engine log messages.
pub trait Logger: Send + Sync {
    /// Log a preformatted message.
    fn log(&self, message: &str);

    /// Log a formatted message.
    ///
    /// The default implementation renders `args` and forwards to [`log`](Logger::log).
    fn log_fmt(&self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(message) => self.log(message),
            None => self.log(&args.to_string()),
        }
    }
}

/// Logger that drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopLogger;

impl Logger for NopLogger {
    fn log(&self, _message: &str) {}

    fn log_fmt(&self, _args: fmt::Arguments<'_>) {}
}

/// Logger that emits each message as a `tracing` info event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!(target: "switchyard", "{message}");
    }

    fn log_fmt(&self, args: fmt::Arguments<'_>) {
        tracing::info!(target: "switchyard", "{args}");
    }
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closure_logger_receives_formatted_messages() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = move |message: &str| sink.lock().unwrap().push(message.to_string());

        logger.log("plain");
        logger.log_fmt(format_args!("state [{}]", "idle"));

        assert_eq!(*lines.lock().unwrap(), vec!["plain", "state [idle]"]);
    }

    #[test]
    fn nop_and_tracing_loggers_accept_messages() {
        let loggers: Vec<Box<dyn Logger>> = vec![Box::new(NopLogger), Box::new(TracingLogger)];
        for logger in &loggers {
            logger.log("message");
            logger.log_fmt(format_args!("{} {}", 1, 2));
        }
    }
}
