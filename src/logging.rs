//! Tracing subscriber setup
//!
//! In the browser events go to the devtools console through `tracing-wasm`;
//! natively they go to stderr, filtered by `RUST_LOG` (default
//! `orgcore=info`). Safe to call more than once; if the host application
//! already installed a global subscriber that one is kept.

use std::sync::Once;

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(install);
}

#[cfg(target_arch = "wasm32")]
fn install() {
    let _ = tracing_wasm::try_set_as_global_default();
}

#[cfg(not(target_arch = "wasm32"))]
fn install() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "orgcore=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        tracing::info!("logging initialised twice without panicking");
    }
}
