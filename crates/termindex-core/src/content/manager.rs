//! Content manager: version flags and change notification.
//!
//! Keeps the current snapshot of each item in memory and hands every change
//! to the index session. It does not keep version history.

use super::ids::generate_id;
use super::item::ContentItem;
use crate::session::IndexSession;
use crate::{Result, TermIndexError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Which version state a newly created item starts in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOptions {
    /// Published and latest.
    Published,
    /// Latest only.
    Draft,
}

pub struct ContentManager {
    items: RwLock<HashMap<String, ContentItem>>,
    session: Arc<IndexSession>,
}

impl ContentManager {
    pub fn new(session: Arc<IndexSession>) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            session,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ContentItem>> {
        match self.items.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ContentItem>> {
        match self.items.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// A new, unsaved item of the given type.
    pub fn new_item(&self, content_type: &str) -> ContentItem {
        ContentItem::new(content_type)
    }

    pub fn get(&self, content_item_id: &str) -> Option<ContentItem> {
        self.read().get(content_item_id).cloned()
    }

    pub fn list(&self, content_type: &str) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .read()
            .values()
            .filter(|item| item.content_type == content_type)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_utc.cmp(&b.created_utc));
        items
    }

    /// Change an item under the write lock and hand the result to the
    /// session before the lock is released, so the session sees snapshots
    /// in the order the map took them.
    fn modify(
        &self,
        content_item_id: &str,
        f: impl FnOnce(&mut ContentItem),
    ) -> Result<ContentItem> {
        let mut items = self.write();
        let item = items
            .get_mut(content_item_id)
            .ok_or_else(|| TermIndexError::NotFound {
                content_item_id: content_item_id.to_string(),
            })?;
        f(item);
        item.content_item_version_id = generate_id();
        item.modified_utc = Some(Utc::now());
        let item = item.clone();
        self.session.save(item.clone());
        Ok(item)
    }

    /// Save a new item.
    pub fn create(&self, mut item: ContentItem, options: VersionOptions) -> Result<ContentItem> {
        let mut items = self.write();
        if items.contains_key(&item.content_item_id) {
            return Err(TermIndexError::Validation {
                field: "content_item_id".to_string(),
                message: format!("{} already exists", item.content_item_id),
            });
        }

        let now = Utc::now();
        item.created_utc = Some(now);
        item.modified_utc = Some(now);
        item.latest = true;
        item.published = options == VersionOptions::Published;
        if item.published {
            item.published_utc = Some(now);
        }

        debug!(
            "Created {} item {} ({:?})",
            item.content_type, item.content_item_id, options
        );
        items.insert(item.content_item_id.clone(), item.clone());
        self.session.save(item.clone());
        Ok(item)
    }

    /// Replace the content of an existing item, keeping its version flags.
    pub fn update(&self, item: ContentItem) -> Result<ContentItem> {
        let content_item_id = item.content_item_id.clone();
        self.modify(&content_item_id, move |current| {
            let (published, latest, created_utc, published_utc) = (
                current.published,
                current.latest,
                current.created_utc,
                current.published_utc,
            );
            *current = item;
            current.published = published;
            current.latest = latest;
            current.created_utc = created_utc;
            current.published_utc = published_utc;
        })
    }

    pub fn publish(&self, content_item_id: &str) -> Result<ContentItem> {
        self.modify(content_item_id, |item| {
            item.published = true;
            item.latest = true;
            item.published_utc = Some(Utc::now());
        })
    }

    /// Unpublish an item. It stays the latest version.
    pub fn unpublish(&self, content_item_id: &str) -> Result<ContentItem> {
        self.modify(content_item_id, |item| {
            item.published = false;
            item.latest = true;
        })
    }

    /// Remove an item by clearing both version flags.
    pub fn remove(&self, content_item_id: &str) -> Result<ContentItem> {
        let mut items = self.write();
        let mut item = items
            .remove(content_item_id)
            .ok_or_else(|| TermIndexError::NotFound {
                content_item_id: content_item_id.to_string(),
            })?;
        item.published = false;
        item.latest = false;
        item.modified_utc = Some(Utc::now());
        debug!("Removed content item {}", content_item_id);
        self.session.save(item.clone());
        Ok(item)
    }
}
