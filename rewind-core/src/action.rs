//! Reversible actions: the unit of undoable work.
//!
//! An [`Action`] pairs a forward operation with a reverse operation and a
//! display label. Operations are closures that capture whatever host state they
//! touch (usually through `Rc<RefCell<_>>`), so the engine never needs to know
//! what is being edited.

use std::fmt;

use thiserror::Error;

/// Error raised by a forward or reverse operation.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("target not found: {0}")]
    TargetNotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Any host error; lets operation closures use `?` freely.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for action operations.
pub type ActionResult<T = ()> = Result<T, ActionError>;

type Operation = Box<dyn FnMut() -> ActionResult>;

/// A forward/reverse operation pair with a human-readable label.
///
/// Two actions built from identical closures are still independent history
/// entries; the engine never compares actions.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use rewind_core::Action;
///
/// let value = Rc::new(Cell::new(0));
/// let (fwd, rev) = (value.clone(), value.clone());
/// let action = Action::infallible(move || fwd.set(fwd.get() + 1), move || rev.set(rev.get() - 1))
///     .with_description("Increment");
/// assert_eq!(action.description(), "Increment");
/// ```
pub struct Action {
    forward: Operation,
    reverse: Operation,
    description: String,
}

impl Action {
    /// Build an action from two fallible operations. The description starts empty.
    pub fn new<F, R>(forward: F, reverse: R) -> Self
    where
        F: FnMut() -> ActionResult + 'static,
        R: FnMut() -> ActionResult + 'static,
    {
        Self {
            forward: Box::new(forward),
            reverse: Box::new(reverse),
            description: String::new(),
        }
    }

    /// Build an action from two operations that cannot fail.
    pub fn infallible<F, R>(mut forward: F, mut reverse: R) -> Self
    where
        F: FnMut() + 'static,
        R: FnMut() + 'static,
    {
        Self::new(
            move || {
                forward();
                Ok(())
            },
            move || {
                reverse();
                Ok(())
            },
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Label shown in undo/redo menus. May be empty.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub(crate) fn run_forward(&mut self) -> ActionResult {
        (self.forward)()
    }

    pub(crate) fn run_reverse(&mut self) -> ActionResult {
        (self.reverse)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
