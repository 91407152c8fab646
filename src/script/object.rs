/*!
 * Tagged Object Handles
 * Opaque native payloads carried through script code under a type tag
 */

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Opaque handle carrying a native payload
///
/// Recovering the payload is a checked downcast: both the tag and the
/// concrete type must match.
#[derive(Clone)]
pub struct ObjectHandle {
    tag: Arc<str>,
    payload: Arc<dyn Any + Send + Sync>,
}

impl ObjectHandle {
    pub fn new<T: Any + Send + Sync>(tag: &str, payload: Arc<T>) -> Self {
        Self {
            tag: Arc::from(tag),
            payload,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        &*self.tag == tag
    }

    /// Recover the payload, or `None` on tag or type mismatch
    pub fn downcast<T: Any + Send + Sync>(&self, expected_tag: &str) -> Option<Arc<T>> {
        if !self.has_tag(expected_tag) {
            return None;
        }
        Arc::clone(&self.payload).downcast::<T>().ok()
    }
}

impl PartialEq for ObjectHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl Eq for ObjectHandle {}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHandle").field("tag", &self.tag).finish()
    }
}
