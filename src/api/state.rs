use crate::relay::CompletionRelay;

/// Shared state handed to every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub relay: CompletionRelay,
}

impl AppState {
    pub fn new(relay: CompletionRelay) -> Self {
        Self { relay }
    }
}
