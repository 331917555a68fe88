//! The process-wide translator chain, installed at most once.

use std::sync::{Arc, OnceLock};

use crate::chain::TranslatorChain;

static PROCESS_CHAIN: OnceLock<Arc<TranslatorChain>> = OnceLock::new();

/// Installs `chain` as the process-wide translator chain.
///
/// Only the first call has an effect; later calls return `false`. The chain
/// itself stays open for further retrievers through its own methods.
pub fn install(chain: Arc<TranslatorChain>) -> bool {
    let installed = PROCESS_CHAIN.set(chain).is_ok();
    if !installed {
        tracing::debug!("process translator chain already installed");
    }
    installed
}

/// The process-wide chain, if one has been installed.
pub fn installed() -> Option<Arc<TranslatorChain>> {
    PROCESS_CHAIN.get().cloned()
}
