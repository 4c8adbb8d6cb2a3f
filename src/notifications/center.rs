//! In-memory notification inbox backing the bell menu.

use std::collections::VecDeque;

use crate::constants::MAX_INBOX_SIZE;

use super::client::NotificationEvent;
use super::message::Notification;

/// Newest-first list of notifications with read tracking
#[derive(Debug)]
pub struct NotificationCenter {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_capacity(MAX_INBOX_SIZE)
    }
}

impl NotificationCenter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Replace the inbox with a list fetched from the server
    pub fn replace_all(&mut self, mut notifications: Vec<Notification>) {
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notifications.truncate(self.capacity);
        self.items = notifications.into();
    }

    /// Add a notification at the top. A notification with a known id
    /// replaces the stored copy instead of duplicating it.
    pub fn push(&mut self, notification: Notification) {
        self.items.retain(|n| n.id != notification.id);
        self.items.push_front(notification);
        self.items.truncate(self.capacity);
    }

    /// Feed a client event; returns the notification if one was added
    pub fn apply_event(&mut self, event: &NotificationEvent) -> Option<&Notification> {
        match event {
            NotificationEvent::Notification(n) => {
                self.push(n.clone());
                self.items.front()
            }
            _ => None,
        }
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in self.items.iter_mut() {
            n.read = true;
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Notification> {
        let index = self.items.iter().position(|n| n.id == id)?;
        self.items.remove(index)
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }
}
