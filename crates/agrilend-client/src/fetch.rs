//! Per-screen fetch state with stale-result discard.
//!
//! A screen owns its fetched data and replaces it wholesale on refetch. Each
//! fetch takes a [`Ticket`]; only the newest ticket may land, and nothing
//! lands after the screen unmounts.

use std::future::Future;

use crate::error::ClientError;

/// Where a screen's data is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    /// Inline error text. There is no automatic retry.
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Identifies one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Data of one screen plus the bookkeeping to ignore late responses.
#[derive(Debug, Clone)]
pub struct ScreenData<T> {
    state: FetchState<T>,
    latest: u64,
    mounted: bool,
}

impl<T> Default for ScreenData<T> {
    fn default() -> Self {
        ScreenData {
            state: FetchState::Idle,
            latest: 0,
            mounted: true,
        }
    }
}

impl<T> ScreenData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Starts a fetch. Any earlier ticket becomes stale.
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        self.state = FetchState::Loading;
        Ticket(self.latest)
    }

    /// Lands a result. Returns `false` when the ticket is stale or the screen
    /// has unmounted, in which case the state is untouched.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, ClientError>) -> bool {
        if !self.mounted {
            log::debug!("discarding fetch {} after unmount", ticket.0);
            return false;
        }
        if ticket.0 != self.latest {
            let latest = self.latest;
            log::debug!("discarding stale fetch {} (latest {latest})", ticket.0);
            return false;
        }
        self.state = match result {
            Ok(data) => FetchState::Loaded(data),
            Err(err) => FetchState::Failed(err.to_string()),
        };
        true
    }

    /// Runs `fetch` and lands its result under a fresh ticket.
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let ticket = self.begin();
        let result = fetch.await;
        self.complete(ticket, result)
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_ticket_wins() {
        let mut screen: ScreenData<Vec<u32>> = ScreenData::new();
        let first = screen.begin();
        let second = screen.begin();

        assert!(screen.complete(second, Ok(vec![2])));
        assert!(!screen.complete(first, Ok(vec![1])));
        assert_eq!(screen.state().data(), Some(&vec![2]));
    }

    #[test]
    fn errors_become_inline_text() {
        let mut screen: ScreenData<()> = ScreenData::new();
        let ticket = screen.begin();
        assert!(screen.state().is_loading());
        screen.complete(ticket, Err(ClientError::http(503)));
        assert_eq!(
            screen.state().error(),
            Some("request failed with HTTP 503: Service Unavailable")
        );
    }

    #[test]
    fn nothing_lands_after_unmount() {
        let mut screen: ScreenData<u8> = ScreenData::new();
        let ticket = screen.begin();
        screen.unmount();
        assert!(!screen.complete(ticket, Ok(1)));
        assert!(screen.state().is_loading());
    }

    #[tokio::test]
    async fn load_lands_result() {
        let mut screen: ScreenData<&str> = ScreenData::new();
        assert!(screen.load(async { Ok("farmers") }).await);
        assert_eq!(screen.state(), &FetchState::Loaded("farmers"));
    }
}
