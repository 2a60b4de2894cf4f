//! Shared component handles.

use std::any::Any;
use std::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use quanta_comp_core::CompId;

use super::traits::Component;

/// Parent links can form a cycle if a component is re-parented under its
/// own subtree; ancestry walks stop here.
const MAX_ANCESTRY_DEPTH: usize = 1024;

pub(crate) struct CompNode {
    id: CompId,
    class: &'static str,
    /// Set when a parent materializes this component.
    parent: RefCell<Weak<CompNode>>,
    component: RefCell<Box<dyn Component>>,
}

/// A shared handle to a component.
///
/// The tree holds children through these handles, the host renders them,
/// and application code keeps them to mutate components from event
/// handlers. Cloning is cheap and yields a handle to the same component.
#[derive(Clone)]
pub struct Comp(Rc<CompNode>);

impl Comp {
    /// Wrap a component in a handle.
    pub fn new<C: Component>(component: C) -> Self {
        Self::from_box(Box::new(component))
    }

    /// Wrap a boxed component in a handle.
    pub fn from_box(component: Box<dyn Component>) -> Self {
        let base = component.base();
        Self(Rc::new(CompNode {
            id: base.id().clone(),
            class: base.class(),
            parent: RefCell::new(Weak::new()),
            component: RefCell::new(component),
        }))
    }

    #[inline]
    pub fn id(&self) -> &CompId {
        &self.0.id
    }

    #[inline]
    pub fn class(&self) -> &'static str {
        self.0.class
    }

    /// `Class_id`.
    pub fn label(&self) -> String {
        format!("{}_{}", self.0.class, self.0.id)
    }

    /// Borrow the component.
    ///
    /// # Panics
    ///
    /// Panics if the component is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, dyn Component> {
        Ref::map(self.0.component.borrow(), |c| &**c)
    }

    /// Mutably borrow the component.
    ///
    /// # Panics
    ///
    /// Panics if the component is already borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Component> {
        RefMut::map(self.0.component.borrow_mut(), |c| &mut **c)
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, dyn Component>, BorrowError> {
        self.0
            .component
            .try_borrow()
            .map(|r| Ref::map(r, |c| &**c))
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Component>, BorrowMutError> {
        self.0
            .component
            .try_borrow_mut()
            .map(|r| RefMut::map(r, |c| &mut **c))
    }

    /// Run `f` with the component downcast to `T`.
    ///
    /// Returns `None` if the component is not a `T`.
    pub fn with<T: Component, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let component = self.0.component.borrow();
        let any: &dyn Any = &**component;
        any.downcast_ref::<T>().map(f)
    }

    /// Run `f` with the component mutably downcast to `T`.
    pub fn with_mut<T: Component, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut component = self.0.component.borrow_mut();
        let any: &mut dyn Any = &mut **component;
        any.downcast_mut::<T>().map(f)
    }

    /// Whether the component is a `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.with::<T, _>(|_| ()).is_some()
    }

    /// The parent recorded at the last materialization, if still alive.
    pub fn parent(&self) -> Option<Comp> {
        self.0.parent.borrow().upgrade().map(Comp)
    }

    pub(crate) fn set_parent(&self, parent: &Comp) {
        *self.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
    }

    /// The chain of labels from the root down to this component,
    /// joined with `" / "`.
    ///
    /// Uses the parent links recorded during materialization, so it names
    /// only as much of the tree as has rendered. Never borrows components,
    /// so it is safe to call while a component is being rendered.
    pub fn ancestry(&self) -> String {
        let mut labels = vec![self.label()];
        let mut current = self.parent();
        while let Some(comp) = current {
            if labels.len() > MAX_ANCESTRY_DEPTH || comp.ptr_eq(self) {
                break;
            }
            labels.push(comp.label());
            current = comp.parent();
        }
        labels.reverse();
        labels.join(" / ")
    }

    /// A weak handle that does not keep the component alive.
    pub fn downgrade(&self) -> WeakComp {
        WeakComp(Rc::downgrade(&self.0))
    }

    /// Whether two handles refer to the same component.
    pub fn ptr_eq(&self, other: &Comp) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Comp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comp({})", self.label())
    }
}

/// Weak counterpart of [`Comp`].
#[derive(Clone)]
pub struct WeakComp(Weak<CompNode>);

impl WeakComp {
    pub fn upgrade(&self) -> Option<Comp> {
        self.0.upgrade().map(Comp)
    }
}

impl fmt::Debug for WeakComp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(comp) => write!(f, "WeakComp({})", comp.label()),
            None => f.write_str("WeakComp(dropped)"),
        }
    }
}
