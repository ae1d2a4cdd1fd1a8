//! Settlement functions and the values callbacks hand back to a chain.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::eventual::{Eventual, Settlement};

/// What an `Eventual` is resolved with: a plain value, or another `Eventual`
/// whose outcome it adopts.
pub enum Resolution<T, E> {
    Value(T),
    Adopt(Eventual<T, E>),
}

impl<T, E> From<Eventual<T, E>> for Resolution<T, E> {
    fn from(inner: Eventual<T, E>) -> Self {
        Self::Adopt(inner)
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Adopt(_) => f.write_str("Adopt(..)"),
        }
    }
}

/// The return type of every chained callback.
///
/// `Ok` resolves the next `Eventual` in the chain; `Err` rejects it.
pub type Reaction<T, E> = Result<Resolution<T, E>, E>;

/// Fulfill the next `Eventual` with `value`.
pub fn fulfill<T, E>(value: T) -> Reaction<T, E> {
    Ok(Resolution::Value(value))
}

/// Resolve the next `Eventual` with the eventual outcome of `inner`.
pub fn adopt<T, E>(inner: Eventual<T, E>) -> Reaction<T, E> {
    Ok(Resolution::Adopt(inner))
}

/// Reject the next `Eventual` with `reason`.
pub fn reject<T, E>(reason: E) -> Reaction<T, E> {
    Err(reason)
}

/// The fulfilling half of an `Eventual`'s settlement functions.
///
/// A `Resolve` and its paired [`Reject`] share one latch: only the first call
/// to either has any effect, even if the `Eventual` is still waiting on an
/// adopted inner `Eventual` when the second call arrives.
pub struct Resolve<T, E> {
    target: Eventual<T, E>,
    latch: Rc<Cell<bool>>,
}

/// The rejecting half of an `Eventual`'s settlement functions.
pub struct Reject<T, E> {
    target: Eventual<T, E>,
    latch: Rc<Cell<bool>>,
}

pub(crate) fn settlement_functions<T, E>(target: &Eventual<T, E>) -> (Resolve<T, E>, Reject<T, E>) {
    let latch = Rc::new(Cell::new(false));
    let resolve = Resolve {
        target: target.clone(),
        latch: Rc::clone(&latch),
    };
    let reject = Reject {
        target: target.clone(),
        latch,
    };
    (resolve, reject)
}

/// Flip the latch; true only for the first caller.
fn claim(latch: &Cell<bool>) -> bool {
    !latch.replace(true)
}

impl<T, E> Resolve<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Fulfill with `value`, unless this pair was already used.
    pub fn resolve(&self, value: T) {
        self.resolve_with(Resolution::Value(value));
    }

    /// Resolve with the eventual outcome of `inner`.
    pub fn adopt(&self, inner: Eventual<T, E>) {
        self.resolve_with(Resolution::Adopt(inner));
    }

    /// Resolve with a plain value or an `Eventual` to adopt.
    pub fn resolve_with(&self, resolution: Resolution<T, E>) {
        if claim(&self.latch) {
            self.target.schedule_settle(Settlement::Resolve(resolution));
        }
    }

    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.latch.get()
    }
}

impl<T, E> Reject<T, E>
where
    T: Clone + 'static,
    E: Clone + fmt::Debug + 'static,
{
    /// Reject with `reason`, unless this pair was already used.
    pub fn reject(&self, reason: E) {
        if claim(&self.latch) {
            self.target.schedule_settle(Settlement::Reject(reason));
        }
    }

    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.latch.get()
    }
}

impl<T, E> Clone for Resolve<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            latch: Rc::clone(&self.latch),
        }
    }
}

impl<T, E> Clone for Reject<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            latch: Rc::clone(&self.latch),
        }
    }
}

impl<T, E> fmt::Debug for Resolve<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolve")
            .field("spent", &self.latch.get())
            .finish_non_exhaustive()
    }
}

impl<T, E> fmt::Debug for Reject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("spent", &self.latch.get())
            .finish_non_exhaustive()
    }
}
