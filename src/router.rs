//! Sheet router: slot arena and document-ordering policy.
//!
//! Every distinct media query gets its own sheet slot; one plain slot
//! holds everything else. Slots live in a slotmap arena with a separate
//! document-order list. The plain slot — created lazily — is always first;
//! non-plain slots are placed by the configured comparator, or in
//! first-seen order when none is given. Rules are only ever appended to a
//! slot, never reordered or removed.

use std::cmp::Ordering;

use slotmap::{new_key_type, SlotMap};

use crate::injector::Injector;
use crate::sheet::{MemorySheet, SheetBackend};

new_key_type! {
    /// Stable handle to a sheet slot.
    pub struct SheetKey;
}

/// Comparator deciding the document order of two media query strings.
pub type MediaComparator = Box<dyn Fn(&str, &str) -> Ordering>;

/// One backing stylesheet with its rule caches.
pub struct SheetSlot {
    /// The media query, or `None` for the plain slot.
    pub media: Option<String>,
    /// The external rule container.
    pub backend: Box<dyn SheetBackend>,
    /// The slot's fingerprint caches.
    pub injector: Injector,
}

/// The slot arena and its ordering policy.
pub struct SheetRouter {
    slots: SlotMap<SheetKey, SheetSlot>,
    order: Vec<SheetKey>,
    plain: Option<SheetKey>,
    media_order: Option<MediaComparator>,
}

impl SheetRouter {
    /// Create an empty router with an optional media comparator.
    pub fn new(media_order: Option<MediaComparator>) -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
            plain: None,
            media_order,
        }
    }

    /// Adopt a pre-existing backend as a slot, placing it per the ordering
    /// policy. Used at construction for host-supplied sheets.
    pub fn adopt(&mut self, backend: Box<dyn SheetBackend>) -> SheetKey {
        let media = backend.media().map(str::to_string);
        let key = self.slots.insert(SheetSlot {
            media: media.clone(),
            backend,
            injector: Injector::new(),
        });
        match media {
            None => {
                debug_assert!(self.plain.is_none(), "only one plain sheet is allowed");
                self.plain = Some(key);
                self.order.insert(0, key);
            }
            Some(query) => self.place_media(key, &query),
        }
        key
    }

    /// Resolve the slot for a selector context's media part, creating a
    /// [`MemorySheet`]-backed slot on demand.
    pub fn route(&mut self, media: Option<&str>) -> SheetKey {
        match media {
            None => self.plain_key(),
            Some(query) => {
                let existing = self
                    .order
                    .iter()
                    .copied()
                    .find(|&key| self.slots[key].media.as_deref() == Some(query));
                if let Some(key) = existing {
                    return key;
                }
                let key = self.slots.insert(SheetSlot {
                    media: Some(query.to_string()),
                    backend: Box::new(MemorySheet::with_media(query)),
                    injector: Injector::new(),
                });
                self.place_media(key, query);
                key
            }
        }
    }

    /// The plain slot, created lazily at the front of the document order.
    pub fn plain_key(&mut self) -> SheetKey {
        if let Some(key) = self.plain {
            return key;
        }
        let key = self.slots.insert(SheetSlot {
            media: None,
            backend: Box::new(MemorySheet::new()),
            injector: Injector::new(),
        });
        self.plain = Some(key);
        self.order.insert(0, key);
        key
    }

    /// Mutable access to a slot.
    pub fn slot_mut(&mut self, key: SheetKey) -> &mut SheetSlot {
        &mut self.slots[key]
    }

    /// Slots in document order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &SheetSlot> {
        self.order.iter().map(|&key| &self.slots[key])
    }

    /// Keys in document order.
    pub fn keys_in_order(&self) -> Vec<SheetKey> {
        self.order.clone()
    }

    /// Insert a new media slot before the first existing media slot the
    /// comparator orders it ahead of; append when no comparator is set.
    /// The plain slot is never part of the comparison.
    fn place_media(&mut self, key: SheetKey, query: &str) {
        let position = self.media_order.as_ref().and_then(|compare| {
            self.order.iter().position(|&existing| {
                match self.slots[existing].media.as_deref() {
                    Some(other) => compare(query, other) == Ordering::Less,
                    None => false,
                }
            })
        });
        match position {
            Some(index) => self.order.insert(index, key),
            None => self.order.push(key),
        }
    }
}
