//! Ctrl-C handling.
//!
//! The first interrupt only raises a flag. Child commands share the
//! terminal's process group and receive the same signal, so the running
//! command fails, the command runner reports the run as cancelled, and the
//! orchestrator unwinds, dropping any temporary template clone on the way
//! out. A second interrupt exits at once.

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Context as _;

/// Conventional exit status for a SIGINT-terminated process.
pub const EXIT_INTERRUPTED: u8 = 130;

static INTERRUPTED: OnceLock<Arc<AtomicBool>> = OnceLock::new();

/// The process-wide interrupt flag.
pub fn flag() -> Arc<AtomicBool> {
    Arc::clone(INTERRUPTED.get_or_init(|| Arc::new(AtomicBool::new(false))))
}

pub fn interrupted() -> bool {
    flag().load(Ordering::SeqCst)
}

/// Install the Ctrl-C handler for this process.
pub fn install() -> anyhow::Result<()> {
    let flag = flag();
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(i32::from(EXIT_INTERRUPTED));
        }
    })
    .context("installing the Ctrl-C handler")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_is_shared() {
        let a = flag();
        let b = flag();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn exit_status_matches_shell_convention() {
        assert_eq!(EXIT_INTERRUPTED, 128 + 2);
    }
}
