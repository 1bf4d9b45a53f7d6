//! Request identity tokens for stale-response suppression.
//!
//! Every catalog fetch is issued with a monotonically increasing sequence
//! number. Only the most recently issued request is current; a response for
//! any other token is dropped on arrival.

use pocketshop_core::Filter;

/// What a response does to the displayed pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestKind {
    /// Page 0; replaces the displayed sequence when it lands.
    FirstPage,
    /// Page N > 0; appends to the displayed sequence.
    NextPage,
}

/// Identity of one issued page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestToken {
    pub(crate) filter: Filter,
    pub(crate) page: usize,
    pub(crate) kind: RequestKind,
    pub(crate) seq: u64,
}

/// Issues tokens and remembers which one is outstanding.
#[derive(Debug, Default)]
pub(crate) struct RequestTracker {
    next_seq: u64,
    pending: Option<RequestToken>,
}

impl RequestTracker {
    /// Issue a new token, superseding any pending one.
    pub(crate) fn issue(&mut self, filter: Filter, page: usize, kind: RequestKind) -> RequestToken {
        self.next_seq += 1;
        let token = RequestToken {
            filter,
            page,
            kind,
            seq: self.next_seq,
        };
        self.pending = Some(token.clone());
        token
    }

    pub(crate) fn is_current(&self, token: &RequestToken) -> bool {
        self.pending.as_ref() == Some(token)
    }

    pub(crate) const fn pending(&self) -> Option<&RequestToken> {
        self.pending.as_ref()
    }

    /// Mark `token` finished if it is still the current one.
    pub(crate) fn complete(&mut self, token: &RequestToken) -> bool {
        if self.is_current(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Forget the pending request; its response will be ignored.
    pub(crate) fn cancel(&mut self) -> Option<RequestToken> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_token_supersedes_older() {
        let mut tracker = RequestTracker::default();
        let first = tracker.issue(Filter::category("a"), 0, RequestKind::FirstPage);
        let second = tracker.issue(Filter::category("b"), 0, RequestKind::FirstPage);

        assert!(second.seq > first.seq);
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        assert!(!tracker.complete(&first));
        assert!(tracker.pending().is_some());
        assert!(tracker.complete(&second));
        assert!(tracker.pending().is_none());
    }

    #[test]
    fn test_same_filter_reissue_is_distinct() {
        let mut tracker = RequestTracker::default();
        let first = tracker.issue(Filter::All, 0, RequestKind::FirstPage);
        let again = tracker.issue(Filter::All, 0, RequestKind::FirstPage);
        assert_ne!(first, again);
        assert!(!tracker.is_current(&first));
    }

    #[test]
    fn test_cancel_invalidates_pending() {
        let mut tracker = RequestTracker::default();
        let token = tracker.issue(Filter::All, 1, RequestKind::NextPage);
        assert_eq!(tracker.cancel(), Some(token.clone()));
        assert!(!tracker.is_current(&token));
    }
}
