use std::sync::atomic::{AtomicBool, Ordering};

use crate::{errors::Error, Result};

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Initialize logging/tracing for the bot.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    // Default: info for our crates, warn for everything else.
    // Can be overridden with `RUST_LOG`.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,relaybot=info,relaybot_core=info,relaybot_openai=info,relaybot_telegram=info,{service_name}=info"
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .try_init()
        .map_err(|e| Error::Config(format!("logging init failed: {e}")))
}

/// Install the process-wide panic hook.
///
/// A panic inside a spawned task is logged and the task is dropped; the
/// runtime and the other tasks keep going. Any hook present before the call
/// still runs after ours. Returns `false` if the hook was already installed
/// by an earlier call.
pub fn install_panic_hook() -> bool {
    if PANIC_HOOK_INSTALLED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return false;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(%location, "unhandled panic: {payload}");
        previous(info);
    }));

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    static EARLIER_HOOK_CALLS: AtomicUsize = AtomicUsize::new(0);

    #[test]
    fn panic_hook_installs_once_and_keeps_the_earlier_hook() {
        std::panic::set_hook(Box::new(|_| {
            EARLIER_HOOK_CALLS.fetch_add(1, Ordering::SeqCst);
        }));

        assert!(install_panic_hook());
        assert!(!install_panic_hook());

        let caught = std::panic::catch_unwind(|| panic!("boom"));
        assert!(caught.is_err());
        assert!(EARLIER_HOOK_CALLS.load(Ordering::SeqCst) >= 1);
    }
}
