//! Observable UI state built from mutable inputs

use tokio::sync::watch;

/// Holds a view-model's inputs and republishes the derived UI state
///
/// Observers only see a new value when the derived state actually changes.
pub(crate) struct StateHolder<I, S> {
    inputs: watch::Sender<I>,
    state: watch::Sender<S>,
    produce: fn(&I) -> S,
}

impl<I, S> StateHolder<I, S>
where
    S: Clone + PartialEq,
{
    /// Start from `inputs`, publishing `initial` until the first update
    pub(crate) fn new(inputs: I, initial: S, produce: fn(&I) -> S) -> Self {
        let (inputs, _) = watch::channel(inputs);
        let (state, _) = watch::channel(initial);
        Self {
            inputs,
            state,
            produce,
        }
    }

    /// Mutate the inputs and publish the resulting state
    pub(crate) fn update(&self, f: impl FnOnce(&mut I)) {
        self.inputs.send_modify(|inputs| {
            f(inputs);
            let next = (self.produce)(inputs);
            self.state.send_if_modified(|current| {
                if *current == next {
                    false
                } else {
                    *current = next;
                    true
                }
            });
        });
    }

    /// Read a value out of the current inputs
    pub(crate) fn read<T>(&self, f: impl FnOnce(&I) -> T) -> T {
        f(&*self.inputs.borrow())
    }

    pub(crate) fn current(&self) -> S {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    /// Wait until the published state satisfies `ready`
    pub(crate) async fn wait_for(&self, ready: impl FnMut(&S) -> bool) -> S {
        let mut rx = self.subscribe();
        let state = match rx.wait_for(ready).await {
            Ok(state) => state.clone(),
            Err(_) => self.current(),
        };
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doubled(input: &u32) -> u32 {
        input * 2
    }

    #[test]
    fn test_update_publishes_derived_state() {
        let holder = StateHolder::new(1, 0, doubled);
        assert_eq!(holder.current(), 0);

        holder.update(|input| *input = 5);
        assert_eq!(holder.current(), 10);
        assert_eq!(holder.read(|input| *input), 5);
    }

    #[test]
    fn test_unchanged_state_is_not_republished() {
        let holder = StateHolder::new(1, 2, doubled);
        let mut rx = holder.subscribe();
        rx.borrow_and_update();

        holder.update(|input| *input = 1);
        assert!(!rx.has_changed().unwrap());

        holder.update(|input| *input = 2);
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_wait_for_returns_first_matching_state() {
        let holder = std::sync::Arc::new(StateHolder::new(1, 2, doubled));
        assert_eq!(holder.wait_for(|state| *state == 2).await, 2);

        let updater = holder.clone();
        let handle = tokio::spawn(async move {
            updater.update(|input| *input = 3);
            updater.update(|input| *input = 4);
        });

        assert!(holder.wait_for(|state| *state >= 6).await >= 6);
        handle.await.unwrap();
        assert_eq!(holder.current(), 8);
    }
}
