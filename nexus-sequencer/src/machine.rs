/// State owned by a sequencer worker, plus the policy that decides which
/// pending requests it may service.
///
/// Every method runs on the worker thread, one call at a time, so
/// implementations mutate `self` freely without locks.
///
/// Requests carry their own reply channels. `apply` and `expire` are
/// responsible for answering the caller; a request that is dropped without
/// an answer is observed by its caller as a disposal.
pub trait Machine: Send + 'static {
    /// The request type this machine services.
    type Request: Send + 'static;

    /// Returns `true` if `request` may be applied against the current state.
    ///
    /// Must be a pure function of `self` and the request.
    fn admits(&self, request: &Self::Request) -> bool;

    /// Applies an admitted request and answers its caller.
    fn apply(&mut self, request: Self::Request);

    /// Answers a request whose deadline elapsed while pending.
    ///
    /// Must not mutate observable state.
    fn expire(&mut self, request: Self::Request);

    /// Returns `true` if applying `request` must settle every pending
    /// request it makes admissible within the same step.
    ///
    /// Those requests are serviced in arrival order before any deadline is
    /// checked again, so a state change that releases waiters releases all of
    /// them at once.
    fn releases_waiters(request: &Self::Request) -> bool {
        let _ = request;
        false
    }

    /// Short label used in trace output.
    fn kind(request: &Self::Request) -> &'static str {
        let _ = request;
        "request"
    }
}
