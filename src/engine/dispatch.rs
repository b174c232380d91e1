//! Concurrent fan-out of post-transition hooks.

use crate::context::FsmContext;
use crate::core::State;
use crate::logging::Logger;
use crate::transition::{HookRegistry, TransitionKey};
use futures::future::join_all;
use tracing::Instrument;

/// Spawn every hook matching `from -> to` and wait for all of them.
///
/// All four buckets are launched before anything is awaited, so hooks from
/// different buckets run concurrently. Failures and panics are logged and
/// counted; they never reach the caller. Returns the number of failed hooks.
pub(crate) async fn run_hooks(
    hooks: &HookRegistry,
    from: &State,
    to: &State,
    ctx: &FsmContext,
    logger: &dyn Logger,
) -> usize {
    let mut keys: Vec<TransitionKey> = Vec::new();
    let mut handles = Vec::new();

    for bucket in hooks.resolve(from, to) {
        for (index, hook) in bucket.hooks.iter().enumerate() {
            let span = tracing::debug_span!("hook", key = %bucket.key, index);
            let task = hook(from.clone(), to.clone(), ctx.clone()).instrument(span);
            handles.push(tokio::spawn(task));
            keys.push(bucket.key.clone());
        }
    }

    if handles.is_empty() {
        return 0;
    }
    tracing::debug!(launched = handles.len(), "waiting for post-transition hooks");

    let mut failed = 0;
    for (key, outcome) in keys.iter().zip(join_all(handles).await) {
        let message = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => format!("{err:#}"),
            Err(join_err) if join_err.is_panic() => "hook panicked".to_string(),
            Err(join_err) => join_err.to_string(),
        };
        failed += 1;
        logger.log_fmt(format_args!(
            "Post-transition hook [{key}] from state [{from}] to state [{to}] failed: [{message}]"
        ));
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::{hook, Endpoint};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Barrier;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Logger) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let logger = move |message: &str| sink.lock().unwrap().push(message.to_string());
        (lines, logger)
    }

    #[tokio::test]
    async fn empty_registry_runs_nothing() {
        let (lines, logger) = recorder();
        let failed = run_hooks(
            &HookRegistry::new(),
            &State::from("a"),
            &State::from("b"),
            &FsmContext::background(),
            &logger,
        )
        .await;

        assert_eq!(failed, 0);
        assert!(lines.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hooks_across_buckets_run_concurrently() {
        // Every hook waits on the same barrier, so the join only completes
        // if all four were launched before any was awaited.
        let barrier = Arc::new(Barrier::new(4));
        let mut registry = HookRegistry::new();
        for key in TransitionKey::buckets(&State::from("a"), &State::from("b")) {
            let barrier = Arc::clone(&barrier);
            registry.register(
                key,
                hook(move |_, _, _| {
                    let barrier = Arc::clone(&barrier);
                    async move {
                        barrier.wait().await;
                        Ok(())
                    }
                }),
            );
        }

        let (_, logger) = recorder();
        let failed = run_hooks(
            &registry,
            &State::from("a"),
            &State::from("b"),
            &FsmContext::background(),
            &logger,
        )
        .await;
        assert_eq!(failed, 0);
    }

    #[tokio::test]
    async fn failures_and_panics_are_logged_not_returned() {
        let ran = Arc::new(AtomicUsize::new(0));
        let mut registry = HookRegistry::new();
        registry.register(
            TransitionKey::new("a", Endpoint::Any),
            hook(|_, _, _| async { Err(anyhow::anyhow!("disk full")) }),
        );
        registry.register(
            TransitionKey::new(Endpoint::Any, Endpoint::Any),
            hook(|from, _, _| async move {
                assert_ne!(from, "a", "boom");
                Ok(())
            }),
        );
        let counter = Arc::clone(&ran);
        registry.register(
            TransitionKey::new("a", "b"),
            hook(move |_, _, _| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        );

        let (lines, logger) = recorder();
        let failed = run_hooks(
            &registry,
            &State::from("a"),
            &State::from("b"),
            &FsmContext::background(),
            &logger,
        )
        .await;

        assert_eq!(failed, 2);
        assert_eq!(ran.load(Ordering::SeqCst), 1);

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[a -> *]"));
        assert!(lines[0].contains("disk full"));
        assert!(lines[1].contains("hook panicked"));
    }

    #[tokio::test]
    async fn hooks_receive_decided_transition() {
        let seen = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&seen);
        let mut registry = HookRegistry::new();
        registry.register(
            TransitionKey::new(Endpoint::Any, Endpoint::Any),
            hook(move |from, to, _| {
                *slot.lock().unwrap() = Some((from, to));
                async { Ok(()) }
            }),
        );

        let (_, logger) = recorder();
        run_hooks(
            &registry,
            &State::from("idle"),
            &State::from("moving"),
            &FsmContext::background(),
            &logger,
        )
        .await;

        assert_eq!(
            *seen.lock().unwrap(),
            Some((State::from("idle"), State::from("moving")))
        );
    }
}
