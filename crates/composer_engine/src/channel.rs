use std::sync::Arc;

/// Boundary to whatever actually delivers a message to the agent.
pub trait SubmissionChannel {
    /// Hand `text` over. Fire-and-forget; completion shows up on the
    /// activity signal, not here.
    fn dispatch(&self, text: &str);

    /// Best-effort interrupt of in-flight work.
    fn cancel(&self);
}

impl<C: SubmissionChannel + ?Sized> SubmissionChannel for Arc<C> {
    fn dispatch(&self, text: &str) {
        (**self).dispatch(text)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}
