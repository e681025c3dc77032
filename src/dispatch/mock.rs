//! Mock dispatcher for testing.
//!
//! Targets are registered up front with scripted behavior per selector.
//! Every invocation that reaches a registered target is recorded.

use super::revert::encode_revert_reason;
use super::traits::*;
use crate::primitives::{Address, Selector};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scripted response of a mock target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Succeed with the given return data.
    Return(Vec<u8>),
    /// Fail with the given raw failure payload.
    Revert(Vec<u8>),
    /// The dispatch itself fails (transport error).
    Unreachable,
}

impl MockBehavior {
    /// Fail with an encoded human-readable reason.
    pub fn revert_with_reason(reason: &str) -> Self {
        MockBehavior::Revert(encode_revert_reason(reason))
    }
}

#[derive(Default)]
struct MockTarget {
    /// Behavior keyed by selector; `None` keys the plain value transfer.
    behaviors: HashMap<Option<Selector>, MockBehavior>,
}

#[derive(Default)]
struct MockState {
    targets: HashMap<Address, MockTarget>,
    calls: Vec<Invocation>,
}

/// Mock dispatcher for testing.
#[derive(Clone, Default)]
pub struct MockDispatcher {
    state: Arc<Mutex<MockState>>,
}

impl MockDispatcher {
    /// Create new mock dispatcher with no live targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live target. Unscripted selectors succeed with empty data.
    pub fn register(&self, endpoint: Address) {
        self.state().targets.entry(endpoint).or_default();
    }

    /// Script the response of `endpoint` for `selector`.
    ///
    /// Registers the target if needed. `Selector::NOOP` scripts the plain
    /// value transfer.
    pub fn on_call(&self, endpoint: Address, selector: Selector, behavior: MockBehavior) {
        let key = (!selector.is_noop()).then_some(selector);
        self.state()
            .targets
            .entry(endpoint)
            .or_default()
            .behaviors
            .insert(key, behavior);
    }

    /// Invocations that reached a registered target, oldest first.
    pub fn calls(&self) -> Vec<Invocation> {
        self.state().calls.clone()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Dispatcher for MockDispatcher {
    async fn is_callable(&self, endpoint: &Address) -> bool {
        self.state().targets.contains_key(endpoint)
    }

    async fn invoke(&self, call: &Invocation) -> DispatchResult<CallOutcome> {
        let mut state = self.state();

        let behavior = match state.targets.get(&call.endpoint) {
            Some(target) => target
                .behaviors
                .get(&call.selector)
                .cloned()
                .unwrap_or(MockBehavior::Return(Vec::new())),
            None => return Err(DispatchError::Unreachable(call.endpoint)),
        };

        if behavior == MockBehavior::Unreachable {
            return Err(DispatchError::Unreachable(call.endpoint));
        }

        state.calls.push(call.clone());

        match behavior {
            MockBehavior::Return(data) => Ok(CallOutcome::success(data)),
            MockBehavior::Revert(data) => Ok(CallOutcome::failure(data)),
            MockBehavior::Unreachable => Err(DispatchError::Unreachable(call.endpoint)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::revert::decode_revert_reason;

    fn selector() -> Selector {
        Selector::new([1, 2, 3, 4])
    }

    #[tokio::test]
    async fn test_unregistered_target_is_not_callable() {
        let dispatcher = MockDispatcher::new();
        let target = Address::from_label("target");

        assert!(!dispatcher.is_callable(&target).await);
        let call = Invocation::for_operation(target, selector(), &[], 0);
        assert!(matches!(
            dispatcher.invoke(&call).await,
            Err(DispatchError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_registered_target_defaults_to_success() {
        let dispatcher = MockDispatcher::new();
        let target = Address::from_label("target");
        dispatcher.register(target);

        let call = Invocation::for_operation(target, selector(), &[7], 0);
        let outcome = dispatcher.invoke(&call).await.unwrap();
        assert!(outcome.success);
        assert!(outcome.return_data.is_empty());
        assert_eq!(dispatcher.calls(), vec![call]);
    }

    #[tokio::test]
    async fn test_scripted_revert() {
        let dispatcher = MockDispatcher::new();
        let target = Address::from_label("target");
        dispatcher.on_call(target, selector(), MockBehavior::revert_with_reason("boom"));

        let call = Invocation::for_operation(target, selector(), &[], 0);
        let outcome = dispatcher.invoke(&call).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(
            decode_revert_reason(&outcome.return_data),
            Some("boom".to_string())
        );
    }

    #[tokio::test]
    async fn test_noop_scripts_value_transfer() {
        let dispatcher = MockDispatcher::new();
        let target = Address::from_label("vault");
        dispatcher.on_call(target, Selector::NOOP, MockBehavior::Return(vec![1]));

        let call = Invocation::for_operation(target, Selector::NOOP, &[5, 5], 10);
        let outcome = dispatcher.invoke(&call).await.unwrap();
        assert_eq!(outcome.return_data, vec![1]);
        assert_eq!(dispatcher.calls()[0].value, 10);
    }

    #[tokio::test]
    async fn test_unreachable_behavior_is_not_recorded() {
        let dispatcher = MockDispatcher::new();
        let target = Address::from_label("target");
        dispatcher.on_call(target, selector(), MockBehavior::Unreachable);

        assert!(dispatcher.is_callable(&target).await);
        let call = Invocation::for_operation(target, selector(), &[], 0);
        assert!(dispatcher.invoke(&call).await.is_err());
        assert!(dispatcher.calls().is_empty());
    }
}
