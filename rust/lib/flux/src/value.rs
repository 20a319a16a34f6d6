use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A shared, type-erased state value.
///
/// Every entry in the [`StateStore`](crate::StateStore) is one of these.
/// Cloning bumps a reference count; the payload itself is never copied, so
/// a feed with hundreds of items can be handed to every subscriber for free.
#[derive(Clone)]
pub struct StateValue {
    inner: Arc<dyn Any + Send + Sync>,
}

impl StateValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    /// Borrow the payload as `T`, or `None` if it holds something else.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Clone the payload out as `T`.
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// True when both values point at the same allocation.
    pub fn ptr_eq(&self, other: &StateValue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateValue")
            .field("type_id", &(*self.inner).type_id())
            .finish()
    }
}

/// Handle returned by `subscribe`, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counters {
        likes: u32,
        liked: bool,
    }

    #[test]
    fn downcast_to_stored_type() {
        let v = StateValue::new(Counters { likes: 5, liked: false });
        assert_eq!(v.downcast_ref::<Counters>().map(|c| c.likes), Some(5));
        assert!(v.is::<Counters>());
    }

    #[test]
    fn downcast_to_other_type_is_none() {
        let v = StateValue::new(5u32);
        assert!(v.downcast_ref::<u64>().is_none());
        assert!(v.downcast_ref::<String>().is_none());
        assert!(!v.is::<Counters>());
    }

    #[test]
    fn cloned_copies_payload_out() {
        let v = StateValue::new(Counters { likes: 6, liked: true });
        let c: Counters = v.cloned().unwrap();
        assert_eq!(c, Counters { likes: 6, liked: true });
        assert!(v.cloned::<String>().is_none());
    }

    #[test]
    fn clone_shares_allocation() {
        let a = StateValue::new(vec![1u8; 1024]);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&StateValue::new(vec![1u8; 1024])));
    }

    #[test]
    fn debug_does_not_require_debug_payload() {
        struct Opaque;
        let v = StateValue::new(Opaque);
        assert!(format!("{:?}", v).starts_with("StateValue"));
    }
}
