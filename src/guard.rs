//! State Guard & Transaction (§4.6): binds all mutable engine state to the
//! single worker thread that owns it, and gives multi-step handlers an
//! all-or-nothing commit.

use std::thread::ThreadId;

/// Single-owner container for engine state. Every access asserts it is
/// running on the thread that constructed the guard — the engines are
/// single-threaded cooperative loops (§5), so this is a correctness
/// assertion, not a lock.
#[derive(Debug)]
pub struct StateGuard<T> {
    owner: ThreadId,
    state: T,
}

impl<T> StateGuard<T> {
    pub fn new(state: T) -> Self {
        StateGuard {
            owner: std::thread::current().id(),
            state,
        }
    }

    fn assert_owner(&self) {
        assert_eq!(
            std::thread::current().id(),
            self.owner,
            "StateGuard accessed from a thread other than its owning engine worker"
        );
    }

    pub fn get(&self) -> &T {
        self.assert_owner();
        &self.state
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.assert_owner();
        &mut self.state
    }

    /// Run `f` against a clone-snapshot of the state. On `Ok`, the snapshot
    /// (with `f`'s mutations) replaces the live state; on `Err`, the
    /// snapshot is discarded and the live state is untouched. This is the
    /// "clone is cheap, maps are small per step" transaction model §9
    /// sanctions over an undo journal.
    pub fn transaction<R, E>(
        &mut self,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<R, E>
    where
        T: Clone,
    {
        self.assert_owner();
        let mut snapshot = self.state.clone();
        match f(&mut snapshot) {
            Ok(r) => {
                self.state = snapshot;
                Ok(r)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_commits_on_ok() {
        let mut guard = StateGuard::new(vec![1, 2, 3]);
        let _: Result<(), ()> = guard.transaction(|v| {
            v.push(4);
            Ok(())
        });
        assert_eq!(guard.get(), &vec![1, 2, 3, 4]);
    }

    #[test]
    fn transaction_rolls_back_on_err() {
        let mut guard = StateGuard::new(vec![1, 2, 3]);
        let result: Result<(), &str> = guard.transaction(|v| {
            v.push(4);
            Err("boom")
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(guard.get(), &vec![1, 2, 3]);
    }

    #[test]
    fn access_from_other_thread_panics() {
        let guard = StateGuard::new(42);
        let result = std::thread::spawn(move || {
            guard.get();
        })
        .join();
        assert!(result.is_err(), "expected access from another thread to panic");
    }
}
