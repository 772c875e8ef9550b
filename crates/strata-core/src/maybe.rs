/*! Short-circuiting optional chains.
 *
 * Conversion routines are written as a pipeline of small steps, any of which may fail. `Maybe`
 * carries either a value or nothing through that pipeline; once a step yields nothing, every later
 * step is skipped and the absence surfaces at the end without explicit checks in between.
 */

/// A value of type `T`, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Maybe<T>(Option<T>);

impl<T> Maybe<T> {
    pub fn some(value: T) -> Self {
        Self(Some(value))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Applies `f` to the present value. `f` may itself yield nothing.
    pub fn and_then<U, R, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> R,
        R: Into<Maybe<U>>,
    {
        match self.0 {
            Some(value) => f(value).into(),
            None => Maybe::none(),
        }
    }

    /// Applies an infallible `f` to the present value.
    pub fn map<U, F>(self, f: F) -> Maybe<U>
    where
        F: FnOnce(T) -> U,
    {
        Maybe(self.0.map(f))
    }

    /// Ends the chain, handing the result over in the caller's shape.
    pub fn take_wrapped<W>(self) -> W
    where
        W: FromMaybe<T>,
    {
        W::from_maybe(self)
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }

    pub fn as_ref(&self) -> Maybe<&T> {
        Maybe(self.0.as_ref())
    }
}

impl<T> Maybe<Vec<T>> {
    /// Projects a one-element sequence down to its element. Any other length is absent.
    pub fn unwrap(self) -> Maybe<T> {
        self.and_then(|mut values: Vec<T>| {
            if values.len() == 1 {
                values.pop()
            } else {
                None
            }
        })
    }
}

impl<T> Default for Maybe<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        Self(value)
    }
}

/// Terminal shapes a [`Maybe`] chain can be collected into.
pub trait FromMaybe<T>: Sized {
    fn from_maybe(maybe: Maybe<T>) -> Self;
}

impl<T> FromMaybe<T> for Option<T> {
    fn from_maybe(maybe: Maybe<T>) -> Self {
        maybe.0
    }
}

impl<T> FromMaybe<T> for Maybe<T> {
    fn from_maybe(maybe: Maybe<T>) -> Self {
        maybe
    }
}
