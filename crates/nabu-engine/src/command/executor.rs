use super::CommandList;

/// A command record that knows how to apply itself to render-thread state.
pub trait Apply<S: ?Sized> {
    fn apply(self, target: &mut S);
}

/// Executor lifecycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExecutorState {
    Idle,
    Draining,
}

/// Single-threaded interpreter for one command category.
///
/// Owns the consumer-side buffer of a `CommandList` so the allocation is
/// reused every frame. Must only be ticked from the render thread.
#[derive(Debug)]
pub struct CommandExecutor<C> {
    back: Vec<C>,
    state: ExecutorState,
    batches: u64,
    executed: u64,
}

impl<C> Default for CommandExecutor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandExecutor<C> {
    pub fn new() -> Self {
        Self {
            back: Vec::new(),
            state: ExecutorState::Idle,
            batches: 0,
            executed: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> ExecutorState {
        self.state
    }

    /// Non-empty batches drained so far.
    #[inline]
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Records applied so far.
    #[inline]
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Drains `list` and applies each record to `target` in order.
    ///
    /// A record that fails does so by logging inside `apply`; the rest of the
    /// batch still runs. Returns the number of records applied.
    pub fn tick<S>(&mut self, list: &CommandList<C>, target: &mut S) -> usize
    where
        S: ?Sized,
        C: Apply<S>,
    {
        debug_assert_eq!(self.state, ExecutorState::Idle);

        let n = list.swap(&mut self.back);
        if n == 0 {
            return 0;
        }

        // Back to idle even if a record panics; the unapplied rest of the
        // batch is dropped with the drain.
        let guard = DrainGuard::enter(&mut self.state);
        for record in self.back.drain(..) {
            record.apply(target);
        }
        drop(guard);

        self.batches += 1;
        self.executed += n as u64;
        log::trace!("{}: applied {n} command(s)", list.label());

        n
    }
}

struct DrainGuard<'a>(&'a mut ExecutorState);

impl<'a> DrainGuard<'a> {
    fn enter(state: &'a mut ExecutorState) -> Self {
        *state = ExecutorState::Draining;
        Self(state)
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        *self.0 = ExecutorState::Idle;
    }
}
