//! Read-state updates for notifications.
//!
//! These operate on an explicit list; persisting the result is up to the caller.

use crate::models::{Id, Notification};

/// Mark one notification as read. Returns true if its state changed.
pub fn mark_as_read(notifications: &mut [Notification], id: &Id) -> bool {
    match notifications.iter_mut().find(|n| &n.id == id) {
        Some(n) if !n.read => {
            n.read = true;
            true
        }
        _ => false,
    }
}

/// Mark everything as read. Returns how many notifications changed.
pub fn mark_all_as_read(notifications: &mut [Notification]) -> usize {
    let mut changed = 0;
    for n in notifications.iter_mut().filter(|n| !n.read) {
        n.read = true;
        changed += 1;
    }
    changed
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}
