use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Shared, single-threaded mutable state.
///
/// Scheduler handlers are used through `&self`, so the ones that remember something between
/// calls (the dry-run action log, test doubles) keep it in a `WrappedRcRefCell` that the owner
/// can clone and inspect.
#[derive(Debug, Default)]
pub struct WrappedRcRefCell<T>(Rc<RefCell<T>>);

impl<T> WrappedRcRefCell<T> {
    pub fn wrap(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    #[track_caller]
    pub fn get(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[track_caller]
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for WrappedRcRefCell<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}
