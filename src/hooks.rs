//! Shared tracker state for the component tree, plus the handle
//! JavaScript entry points use to reach it.

use crate::map::LeafletMap;
use crate::storage::BrowserStorage;
use mapty::Tracker;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use yew::prelude::*;

pub type AppTracker = Tracker<BrowserStorage, LeafletMap>;

thread_local! {
    /// The mounted tracker, reachable from calls that come in from
    /// JavaScript rather than through the component tree.
    static ACTIVE_TRACKER: RefCell<Option<Rc<RefCell<AppTracker>>>> = const { RefCell::new(None) };
}

/// Run `f` against the mounted tracker, if there is one.
pub fn with_active_tracker<R>(f: impl FnOnce(&mut AppTracker) -> R) -> Option<R> {
    let tracker = ACTIVE_TRACKER.with(|slot| slot.borrow().clone())?;
    let mut tracker = tracker.borrow_mut();
    Some(f(&mut tracker))
}

/// Shared access to the application controller.
///
/// Every event goes through [`TrackerHandle::update`], which re-renders the
/// owning component afterwards.
#[derive(Clone)]
pub struct TrackerHandle {
    tracker: Rc<RefCell<AppTracker>>,
    refresh: UseForceUpdateHandle,
}

impl TrackerHandle {
    pub fn update<R>(&self, f: impl FnOnce(&mut AppTracker) -> R) -> R {
        let result = f(&mut self.tracker.borrow_mut());
        self.refresh.force_update();
        result
    }

    pub fn borrow(&self) -> Ref<'_, AppTracker> {
        self.tracker.borrow()
    }
}

impl PartialEq for TrackerHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.tracker, &other.tracker)
    }
}

/// Custom hook owning the single [`AppTracker`] for the component's lifetime.
///
/// The tracker is rehydrated from browser storage on first render.
#[hook]
pub fn use_tracker() -> TrackerHandle {
    let tracker = use_mut_ref(|| Tracker::new(BrowserStorage::open()));
    let refresh = use_force_update();

    {
        let tracker = tracker.clone();
        use_effect_with((), move |_| {
            ACTIVE_TRACKER.with(|slot| *slot.borrow_mut() = Some(tracker));
            || ACTIVE_TRACKER.with(|slot| *slot.borrow_mut() = None)
        });
    }

    TrackerHandle { tracker, refresh }
}
