// Transient notices shown in the corner of the screen
use chrono::{DateTime, Duration, Utc};
use pkgscout_core::Notice;
use std::collections::VecDeque;

/// How many toasts fit on screen at once
const MAX_VISIBLE: usize = 3;

#[derive(Debug)]
pub struct Toasts {
    items: VecDeque<Notice>,
    ttl: Duration,
}

impl Toasts {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: VecDeque::new(),
            ttl,
        }
    }

    pub fn push(&mut self, notice: Notice) {
        self.items.push_back(notice);
        while self.items.len() > MAX_VISIBLE {
            self.items.pop_front();
        }
    }

    /// Drop everything older than the TTL
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.items.retain(|n| !n.is_expired(ttl, now));
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(Duration::seconds(3))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire() {
        let mut toasts = Toasts::new(Duration::seconds(3));
        let notice = Notice::success("lodash has been added to favorites!");
        let raised = notice.raised_at;
        toasts.push(notice);

        toasts.prune(raised + Duration::seconds(1));
        assert_eq!(toasts.len(), 1);

        toasts.prune(raised + Duration::seconds(3));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_oldest_toast_drops_when_full() {
        let mut toasts = Toasts::default();
        for i in 0..5 {
            toasts.push(Notice::info(format!("n{}", i)));
        }

        let messages: Vec<_> = toasts.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["n2", "n3", "n4"]);
        assert_eq!(toasts.latest().unwrap().message, "n4");
    }
}
