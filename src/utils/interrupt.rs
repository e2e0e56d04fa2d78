//! Ctrl-C handling.
//!
//! An interrupt while a child process runs reaches the child too; the child
//! dies and the failure it reports is turned into
//! [`ReleaseError::UserCancelled`]. An interrupt anywhere else, typically at
//! a prompt, ends the process right away with the same warning.

use {
    crate::error::ReleaseError,
    anyhow::{Context, Result},
    log::{debug, warn},
    scopeguard::ScopeGuard,
    std::{
        process,
        sync::atomic::{AtomicBool, Ordering},
    },
};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static CHILD_RUNNING: AtomicBool = AtomicBool::new(false);

pub fn install() -> Result<()> {
    ctrlc::set_handler(on_interrupt).context("failed to install the Ctrl-C handler")
}

fn on_interrupt() {
    INTERRUPTED.store(true, Ordering::SeqCst);
    if !CHILD_RUNNING.load(Ordering::SeqCst) {
        warn_cancelled();
        process::exit(0);
    }
}

pub fn warn_cancelled() {
    warn!("release cancelled by user, files already changed are left as they are");
}

pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

fn child_finished(_: ()) {
    CHILD_RUNNING.store(false, Ordering::SeqCst);
}

/// Marks a child process as running until the returned guard drops.
pub fn track_child() -> ScopeGuard<(), fn(())> {
    CHILD_RUNNING.store(true, Ordering::SeqCst);
    scopeguard::guard((), child_finished as fn(()))
}

/// A failure seen after an interrupt is the interrupt's doing.
pub fn as_cancellation(err: anyhow::Error, interrupted: bool) -> anyhow::Error {
    if !interrupted || ReleaseError::is_cancelled(&err) {
        return err;
    }
    debug!("failed after interrupt: {err:#}");
    ReleaseError::UserCancelled.into()
}
