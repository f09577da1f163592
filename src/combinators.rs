//! `resolve`, `reject`, `all` and `race`, built only from `new` and `then`.
//!
use crate::{promise::Resolution, Error, Promise};
use log::trace;
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

impl<T: Clone + 'static, E: Clone + 'static> Promise<T, E> {
    /// An already fulfilled promise.
    pub fn fulfilled(value: T) -> Self {
        Promise::new(move |resolver| {
            resolver.resolve(value);
            Ok(())
        })
    }

    /// An already rejected promise. `reason` is stored as is, whatever it is.
    pub fn reject(reason: E) -> Self {
        Promise::new(move |resolver| {
            resolver.reject(reason);
            Ok(())
        })
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// A promise for `value`. A promise passed in is followed, not wrapped.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::Promise;
    ///
    /// let inner = Promise::<i32, String>::fulfilled(7);
    /// let outer = Promise::<i32, String>::resolve(inner);
    /// assert_eq!(outer.wait(), Ok(Ok(7)));
    /// ```
    pub fn resolve(value: impl Into<Resolution<T, E>>) -> Self {
        let resolution = value.into();
        Promise::new(move |resolver| {
            resolver.settle(resolution);
            Ok(())
        })
    }

    /// Fulfills with every item's value, in input order, once all of them
    /// have fulfilled. Rejects with the first rejection as soon as it
    /// happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::{Promise, Resolution};
    ///
    /// let (resolver, late) = Promise::<i32, String>::pair();
    /// let all = Promise::<i32, String>::all(vec![
    ///     Resolution::from(late),
    ///     Resolution::Value(2),
    ///     Resolution::from(Promise::fulfilled(3)),
    /// ]);
    /// resolver.resolve(1);
    /// assert_eq!(all.wait(), Ok(Ok(vec![1, 2, 3])));
    /// ```
    pub fn all<I>(items: Vec<I>) -> Promise<Vec<T>, E>
    where
        I: Into<Resolution<T, E>>,
    {
        let total = items.len();
        Promise::new(move |resolver| {
            if total == 0 {
                resolver.resolve(vec![]);
                return Ok(());
            }
            let slots = Rc::new(RefCell::new(vec![None; total]));
            let remaining = Rc::new(Cell::new(total));
            for (index, item) in items.into_iter().enumerate() {
                let (slots, remaining) = (slots.clone(), remaining.clone());
                let (fulfilled, rejected) = (resolver.clone(), resolver.clone());
                Promise::<T, E>::resolve(item).then(
                    move |value| {
                        slots.borrow_mut()[index] = Some(value);
                        remaining.set(remaining.get() - 1);
                        if remaining.get() == 0 {
                            trace!("all {} item(s) fulfilled", total);
                            let values = slots.borrow_mut().drain(..).flatten().collect();
                            fulfilled.resolve(values);
                        }
                        Ok(())
                    },
                    move |reason| {
                        rejected.reject(reason);
                        Ok(())
                    },
                );
            }
            Ok(())
        })
    }

    /// Settles the same way as whichever item settles first. With no items
    /// the promise stays pending.
    pub fn race<I>(items: Vec<I>) -> Self
    where
        I: Into<Resolution<T, E>>,
    {
        Promise::new(move |resolver| {
            for item in items {
                let (fulfilled, rejected) = (resolver.clone(), resolver.clone());
                Promise::<T, E>::resolve(item).then(
                    move |value| {
                        fulfilled.resolve(value);
                        Ok(())
                    },
                    move |reason| {
                        rejected.reject(reason);
                        Ok(())
                    },
                );
            }
            Ok(())
        })
    }
}
