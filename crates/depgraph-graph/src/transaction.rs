use tracing::trace;

/// How a transaction scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeOutcome {
    /// `complete()` was called before the scope was dropped.
    Completed,
    /// The scope was dropped without completion (error or panic).
    Abandoned,
}

/// Host side of the graph transaction.
///
/// The host decides what a transaction means for its graph representation,
/// typically batching change notifications until `end` runs.
pub trait GraphTransactions: Send + Sync {
    fn begin(&self);

    fn end(&self, outcome: ScopeOutcome);
}

/// Host that does not need transactional visibility.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransactions;

impl GraphTransactions for NoopTransactions {
    fn begin(&self) {}

    fn end(&self, _outcome: ScopeOutcome) {}
}

/// Guard bounding the processing of one input node.
///
/// `end` is invoked exactly once, when the guard is dropped, on every exit path.
#[must_use = "dropping the scope immediately ends the transaction"]
pub struct TransactionScope<'a> {
    host: &'a dyn GraphTransactions,
    completed: bool,
}

impl<'a> TransactionScope<'a> {
    pub fn begin(host: &'a dyn GraphTransactions) -> Self {
        trace!("begin graph transaction");
        host.begin();
        Self {
            host,
            completed: false,
        }
    }

    /// Mark the scope completed and end it.
    pub fn complete(mut self) {
        self.completed = true;
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        let outcome = if self.completed {
            ScopeOutcome::Completed
        } else {
            ScopeOutcome::Abandoned
        };
        trace!(?outcome, "end graph transaction");
        self.host.end(outcome);
    }
}
