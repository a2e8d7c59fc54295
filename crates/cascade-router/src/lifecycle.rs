//! Activation and deactivation hooks for routing scopes

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

/// Lifecycle callbacks run when a scope is mounted or unmounted
///
/// Both methods default to no-ops so implementors only override what they
/// need.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    async fn activate(&self, _scope: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn deactivate(&self, _scope: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Activate,
    Deactivate,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecyclePhase::Activate => f.write_str("activate"),
            LifecyclePhase::Deactivate => f.write_str("deactivate"),
        }
    }
}

/// Runs every hook for `phase` as one settle-all batch
///
/// All hooks start together and all are awaited; a failing hook never stops
/// the others. Failures are reported together once the batch settled.
pub async fn run_hooks(
    hooks: &[Arc<dyn LifecycleHook>],
    phase: LifecyclePhase,
    scope: &str,
) -> anyhow::Result<()> {
    let outcomes = join_all(hooks.iter().map(|hook| async move {
        match phase {
            LifecyclePhase::Activate => hook.activate(scope).await,
            LifecyclePhase::Deactivate => hook.deactivate(scope).await,
        }
    }))
    .await;

    let failures: Vec<String> = outcomes
        .into_iter()
        .filter_map(|outcome| outcome.err())
        .map(|err| format!("{:#}", err))
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{} {} hook(s) failed for scope `{}`: {}",
            failures.len(),
            phase,
            scope,
            failures.join("; ")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl LifecycleHook for Counting {
        async fn deactivate(&self, _scope: &str) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("boom");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failing_hook_does_not_stop_others() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hooks: Vec<Arc<dyn LifecycleHook>> = vec![
            Arc::new(Counting { calls: calls.clone(), fail: true }),
            Arc::new(Counting { calls: calls.clone(), fail: false }),
            Arc::new(Counting { calls: calls.clone(), fail: true }),
        ];

        let err = run_hooks(&hooks, LifecyclePhase::Deactivate, "details")
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let message = err.to_string();
        assert!(message.starts_with("2 deactivate hook(s) failed"));
        assert!(message.contains("boom"));
    }

    #[tokio::test]
    async fn test_default_methods_are_noops() {
        let calls = Arc::new(AtomicUsize::new(0));
        let hooks: Vec<Arc<dyn LifecycleHook>> =
            vec![Arc::new(Counting { calls: calls.clone(), fail: true })];

        run_hooks(&hooks, LifecyclePhase::Activate, "x").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
