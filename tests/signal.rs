#![cfg(unix)]

use std::process::Command;
use std::time::Duration;

use ai_battle_sim::prelude::*;

// Alone in its own test binary: the interrupt is delivered to the whole process.
#[test]
fn interrupt_right_after_install_cancels() {
    let cancel = CancellationToken::new();
    cancel.cancel_on_ctrl_c().unwrap();

    let status = Command::new("kill")
        .args(["-INT", &std::process::id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    assert!(cancel.wait(Duration::from_secs(10)).is_err());
    assert!(cancel.is_cancelled());
}
