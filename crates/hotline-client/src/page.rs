//! Page abstraction.

/// The document kept in sync with the development server.
///
/// Reloading is fire-and-forget: once triggered, the session that requested
/// it is over and the client hands control back to its caller.
pub trait Page: Send {
    /// Perform a full reload.
    fn reload(&mut self);
}

impl<F: FnMut() + Send> Page for F {
    fn reload(&mut self) {
        self();
    }
}
