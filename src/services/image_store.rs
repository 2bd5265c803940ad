use crate::models::classify_types::ImageHandle;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Session-scoped table of image bytes addressed by opaque handles.
///
/// Handles stay resolvable until they are revoked, which happens when the
/// run that created them is replaced, reset or aborted.
#[derive(Clone, Default)]
pub struct ImageStore {
    images: Arc<RwLock<HashMap<ImageHandle, Arc<[u8]>>>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, data: Arc<[u8]>) -> ImageHandle {
        let handle = ImageHandle::new();
        self.images
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(handle, data);
        handle
    }

    pub fn resolve(&self, handle: &ImageHandle) -> Option<Arc<[u8]>> {
        self.images
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(handle)
            .cloned()
    }

    pub fn revoke(&self, handle: &ImageHandle) -> bool {
        self.images
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(handle)
            .is_some()
    }

    pub fn revoke_all<'a>(&self, handles: impl IntoIterator<Item = &'a ImageHandle>) -> usize {
        let mut images = self.images.write().unwrap_or_else(PoisonError::into_inner);
        handles
            .into_iter()
            .filter(|h| images.remove(h).is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.images.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
