//! Change notification for presentation layers.

use std::fmt;

/// What changed in the project.
///
/// Delivered after the mutation has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    /// Current matches changed in `[first, last]`.
    MatchesChanged { first: usize, last: usize },
    /// Decimation changed somewhere in `[first, last]`.
    DecimationChanged { first: usize, last: usize },
    /// Collected metrics for `frame` changed.
    MetricsChanged { frame: usize },
    CombedFramesChanged,
    SectionsChanged,
    PresetsChanged,
    CustomListsChanged,
    FreezeFramesChanged,
    BookmarksChanged,
    InterlacedFadesChanged,
    PatternGuessingChanged,
    OutputSettingsChanged,
}

/// Callback receiving project events.
pub type ChangeCallback = Box<dyn Fn(&ProjectEvent) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscribed callbacks, called in subscription order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, ChangeCallback)>,
}

impl Observers {
    pub fn subscribe(&mut self, callback: ChangeCallback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, callback));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.callbacks.len() != before
    }

    pub fn notify(&self, event: &ProjectEvent) {
        for (_, callback) in &self.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.callbacks.len())
            .finish()
    }
}
