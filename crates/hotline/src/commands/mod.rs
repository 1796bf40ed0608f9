//! CLI command implementations.

pub(crate) mod watch;

pub(crate) use watch::WatchArgs;
