//! The promise cell, its [`Resolver`], and `then`/`catch` chaining.
//!
use crate::{
    queue::{Scheduler, TaskQueue},
    Error,
};
use log::{debug, trace};
use std::{
    any::Any,
    cell::RefCell,
    fmt,
    future::Future,
    mem,
    pin::Pin,
    rc::{Rc, Weak},
    task::{Context, Poll, Waker},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    Fulfilled,
    Rejected,
}

/// Either a plain value or a promise that will produce one.
///
/// A promise handed to a [`Resolver`] or returned from a handler is never
/// stored as a value; the receiving promise follows it instead.
pub enum Resolution<T, E> {
    Value(T),
    Promise(Promise<T, E>),
}

impl<T, E> From<Promise<T, E>> for Resolution<T, E> {
    fn from(promise: Promise<T, E>) -> Self {
        Resolution::Promise(promise)
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Resolution::Promise(promise) => f.debug_tuple("Promise").field(promise).finish(),
        }
    }
}

/// What a handler may return.
///
/// `Ok(value)` fulfills the derived promise, `Err(reason)` rejects it, and a
/// [`Promise`] makes it follow that promise.
pub trait IntoResolution<E> {
    type Value;

    fn into_resolution(self) -> Result<Resolution<Self::Value, E>, E>;
}

impl<T, E> IntoResolution<E> for Result<T, E> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        self.map(Resolution::Value)
    }
}

impl<T, E> IntoResolution<E> for Promise<T, E> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(Resolution::Promise(self))
    }
}

impl<T, E> IntoResolution<E> for Resolution<T, E> {
    type Value = T;

    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(self)
    }
}

/// A registered handler pair, run once with the outcome it waited for.
trait Reaction<T, E> {
    fn call(self: Box<Self>, outcome: Result<T, E>);

    /// Forgets the handler types so the pair can be dropped somewhere else.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

struct Waiter<F, G> {
    on_fulfilled: F,
    on_rejected: G,
}

impl<T, E, F, G> Reaction<T, E> for Waiter<F, G>
where
    F: FnOnce(T) + 'static,
    G: FnOnce(E) + 'static,
{
    fn call(self: Box<Self>, outcome: Result<T, E>) {
        let Waiter { on_fulfilled, on_rejected } = *self;
        match outcome {
            Ok(value) => on_fulfilled(value),
            Err(reason) => on_rejected(reason),
        }
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

fn waiter<T, E>(
    on_fulfilled: impl FnOnce(T) + 'static,
    on_rejected: impl FnOnce(E) + 'static,
) -> Box<dyn Reaction<T, E>> {
    Box::new(Waiter { on_fulfilled, on_rejected })
}

/// Waiters of dropped promises. A waiter owns the resolver of the next
/// promise in its chain, so dropping them in place recurses once per link.
struct Orphans {
    draining: bool,
    waiters: Vec<Box<dyn Any>>,
}

thread_local! {
    static ORPHANS: RefCell<Orphans> = RefCell::new(Orphans {
        draining: false,
        waiters: vec![],
    });
}

struct Inner<T, E> {
    result: Option<Result<T, E>>,
    waiters: Vec<Box<dyn Reaction<T, E>>>,
    wakers: Vec<Waker>,
    // Set once the resolver has handed this promise another promise to follow.
    locked: bool,
    upstream: Option<Weak<dyn Node>>,
    scheduler: Rc<dyn Scheduler>,
}

impl<T, E> Inner<T, E> {
    fn state(&self) -> State {
        match self.result {
            None => State::Pending,
            Some(Ok(_)) => State::Fulfilled,
            Some(Err(_)) => State::Rejected,
        }
    }
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        if self.waiters.is_empty() {
            return;
        }
        let waiters = mem::take(&mut self.waiters);
        // Only the outermost drop drains; nested ones just queue their waiters.
        // Once the thread-local is gone the waiters drop in place.
        let drain = ORPHANS.try_with(|orphans| {
            let mut orphans = orphans.borrow_mut();
            orphans.waiters.extend(waiters.into_iter().map(|waiter| waiter.into_any()));
            !mem::replace(&mut orphans.draining, true)
        });
        if !matches!(drain, Ok(true)) {
            return;
        }
        loop {
            let orphan = ORPHANS.with(|orphans| orphans.borrow_mut().waiters.pop());
            match orphan {
                Some(orphan) => drop(orphan),
                None => break,
            }
        }
        ORPHANS.with(|orphans| orphans.borrow_mut().draining = false);
    }
}

type Shared<T, E> = Rc<RefCell<Inner<T, E>>>;

/// A promise of any type, seen only as a link in a chain of promises waiting
/// on each other.
trait Node {
    /// The promise this one is waiting on, while it is still pending.
    fn upstream(&self) -> Option<Rc<dyn Node>>;
}

impl<T, E> Node for RefCell<Inner<T, E>> {
    fn upstream(&self) -> Option<Rc<dyn Node>> {
        let inner = self.borrow();
        if inner.result.is_some() {
            return None;
        }
        inner.upstream.as_ref().and_then(Weak::upgrade)
    }
}

/// Moves a pending cell to its final state and hands the outcome to every
/// waiter through the scheduler. Returns `false` if the cell had already
/// settled.
fn settle<T, E>(cell: &Shared<T, E>, outcome: Result<T, E>) -> bool
where
    T: Clone + 'static,
    E: Clone + 'static,
{
    let (waiters, wakers, scheduler) = {
        let mut inner = cell.borrow_mut();
        if inner.result.is_some() {
            return false;
        }
        inner.result = Some(outcome.clone());
        trace!("promise {:?}; {} waiter(s)", inner.state(), inner.waiters.len());
        (
            mem::take(&mut inner.waiters),
            mem::take(&mut inner.wakers),
            inner.scheduler.clone(),
        )
    };
    for waiter in waiters {
        let outcome = outcome.clone();
        scheduler.schedule(Box::new(move || waiter.call(outcome)));
    }
    for waker in wakers {
        waker.wake()
    }
    true
}

/// Whether `target` is reached by following pending promises upstream from
/// `source`, through both adoptions and `then`.
fn waits_on(source: Rc<dyn Node>, target: *const ()) -> bool {
    let mut next = Some(source);
    while let Some(node) = next {
        if Rc::as_ptr(&node) as *const () == target {
            return true;
        }
        next = node.upstream();
    }
    false
}

/// The settlement capability of one promise. Only the first effective call
/// counts; after that every call is ignored.
///
/// # Examples
///
/// ```
/// use promise_chain::{Promise, State};
///
/// let promise = Promise::<&str, String>::new(|resolver| {
///     resolver.resolve("first");
///     resolver.resolve("second");
///     resolver.reject("too late".to_string());
///     Ok(())
/// });
/// assert_eq!(promise.state(), State::Fulfilled);
/// assert_eq!(promise.outcome(), Some(Ok("first")));
/// ```
pub struct Resolver<T, E> {
    cell: Shared<T, E>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Resolver { cell: self.cell.clone() }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Resolver<T, E> {
    ///promise.resolve
    pub fn resolve(&self, value: T) {
        if self.is_pending() {
            settle(&self.cell, Ok(value));
        } else {
            debug!("ignoring resolve on a promise that is already resolved");
        }
    }

    ///promise.reject
    pub fn reject(&self, reason: E) {
        if self.is_pending() {
            settle(&self.cell, Err(reason));
        } else {
            debug!("ignoring reject on a promise that is already resolved");
        }
    }

    /// Whether a call on this resolver can still change the promise. Turns
    /// `false` on settlement and also as soon as the promise adopts another.
    pub fn is_pending(&self) -> bool {
        let inner = self.cell.borrow();
        inner.result.is_none() && !inner.locked
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// Resolves with another promise: this promise settles however `promise`
    /// does. If `promise` is this one, or is itself waiting on this one
    /// through adoptions or `then`, this promise rejects with
    /// [`Error::Cycle`] instead.
    pub fn adopt(&self, promise: Promise<T, E>) {
        if !self.is_pending() {
            debug!("ignoring adopt on a promise that is already resolved");
            return;
        }
        if waits_on(promise.cell.clone(), Rc::as_ptr(&self.cell) as *const ()) {
            debug!("promise resolved with itself; rejecting");
            settle(&self.cell, Err(Error::Cycle.into()));
            return;
        }
        {
            let upstream = Rc::downgrade(&promise.cell) as Weak<dyn Node>;
            let mut inner = self.cell.borrow_mut();
            inner.locked = true;
            inner.upstream = Some(upstream);
        }
        let (fulfilled, rejected) = (self.cell.clone(), self.cell.clone());
        promise.subscribe(waiter(
            move |value| {
                settle(&fulfilled, Ok(value));
            },
            move |reason| {
                settle(&rejected, Err(reason));
            },
        ));
    }

    pub fn settle(&self, resolution: Resolution<T, E>) {
        match resolution {
            Resolution::Value(value) => self.resolve(value),
            Resolution::Promise(promise) => self.adopt(promise),
        }
    }

    /// Settles from whatever a handler produced.
    fn settle_with<R: IntoResolution<E, Value = T>>(&self, outcome: R) {
        match outcome.into_resolution() {
            Ok(resolution) => self.settle(resolution),
            Err(reason) => self.reject(reason),
        }
    }
}

impl<T, E> fmt::Debug for Resolver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("state", &self.cell.borrow().state())
            .finish()
    }
}

/// A value of type `T`, or a rejection of type `E`, that becomes known once.
///
/// Handlers registered with [`then`](Promise::then) and friends run from the
/// promise's [`Scheduler`], never from the call that registered or settled
/// them. Clones refer to the same promise.
///
/// # Examples
///
/// ```
/// use promise_chain::{Promise, Scheduler, TaskQueue};
///
/// let promise = Promise::<i32, String>::new(|resolver| {
///     resolver.resolve(5);
///     Ok(())
/// })
/// .and_then(|value| Ok(value + 1));
/// assert!(promise.is_pending());
/// TaskQueue::current().run_until_stalled();
/// assert_eq!(promise.outcome(), Some(Ok(6)));
/// ```
pub struct Promise<T, E> {
    cell: Shared<T, E>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Promise { cell: self.cell.clone() }
    }
}

impl<T: Clone + 'static, E: Clone + 'static> Promise<T, E> {
    /// Runs `executor` right away with this promise's resolver. An `Err`
    /// from the executor rejects the promise, unless it was already resolved.
    pub fn new<F>(executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>) -> Result<(), E>,
    {
        Self::new_in(Rc::new(TaskQueue::current()), executor)
    }

    /// Like [`new`](Promise::new), with handlers going to `scheduler`.
    /// Promises chained from this one use the same scheduler.
    pub fn new_in<F>(scheduler: Rc<dyn Scheduler>, executor: F) -> Self
    where
        F: FnOnce(Resolver<T, E>) -> Result<(), E>,
    {
        let promise = Promise {
            cell: Rc::new(RefCell::new(Inner {
                result: None,
                waiters: vec![],
                wakers: vec![],
                locked: false,
                upstream: None,
                scheduler,
            })),
        };
        let resolver = Resolver { cell: promise.cell.clone() };
        if let Err(reason) = executor(resolver.clone()) {
            trace!("executor failed");
            resolver.reject(reason);
        }
        promise
    }

    /// A pending promise together with its resolver.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::Promise;
    /// use futures::executor::block_on;
    ///
    /// let (resolver, promise) = Promise::<String, String>::pair();
    /// resolver.resolve("Hi".into());
    /// assert_eq!(block_on(promise), Ok("Hi".to_string()));
    /// ```
    pub fn pair() -> (Resolver<T, E>, Self) {
        let mut resolver = None;
        let promise = Self::new(|r| {
            resolver = Some(r);
            Ok(())
        });
        let resolver = match resolver {
            Some(resolver) => resolver,
            None => unreachable!("executor runs before new returns"),
        };
        (resolver, promise)
    }

    pub fn state(&self) -> State {
        self.cell.borrow().state()
    }

    pub fn is_pending(&self) -> bool {
        self.state() == State::Pending
    }

    /// The settled outcome, or `None` while pending.
    pub fn outcome(&self) -> Option<Result<T, E>> {
        self.cell.borrow().result.clone()
    }

    /// Drains this promise's scheduler and returns the outcome. Fails with
    /// [`Error::Stalled`] if the promise is still pending afterwards.
    pub fn wait(&self) -> Result<Result<T, E>, Error> {
        let scheduler = self.scheduler();
        scheduler.run_until_stalled();
        self.outcome().ok_or(Error::Stalled)
    }

    fn scheduler(&self) -> Rc<dyn Scheduler> {
        self.cell.borrow().scheduler.clone()
    }

    /// Queues `waiter` if pending, otherwise schedules it straight away.
    fn subscribe(&self, waiter: Box<dyn Reaction<T, E>>) {
        let mut inner = self.cell.borrow_mut();
        match inner.result.clone() {
            None => inner.waiters.push(waiter),
            Some(outcome) => {
                let scheduler = inner.scheduler.clone();
                drop(inner);
                scheduler.schedule(Box::new(move || waiter.call(outcome)));
            }
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + 'static,
    E: Clone + From<Error> + 'static,
{
    /// Registers both handlers and returns the promise their result settles.
    ///
    /// If a handler returns a promise that waits on the returned one, the
    /// returned one rejects with [`Error::Cycle`] converted into `E`.
    ///
    /// # Examples
    ///
    /// ```
    /// use promise_chain::Promise;
    ///
    /// let recovered = Promise::<i32, String>::reject("boom".into())
    ///     .then(|value| Ok(value.to_string()), |reason| Ok(reason));
    /// assert_eq!(recovered.wait(), Ok(Ok("boom".to_string())));
    /// ```
    pub fn then<F, R, G, S>(&self, on_fulfilled: F, on_rejected: G) -> Promise<R::Value, E>
    where
        F: FnOnce(T) -> R + 'static,
        R: IntoResolution<E>,
        R::Value: Clone + 'static,
        G: FnOnce(E) -> S + 'static,
        S: IntoResolution<E, Value = R::Value>,
    {
        Promise::new_in(self.scheduler(), |resolver| {
            let upstream = Rc::downgrade(&self.cell) as Weak<dyn Node>;
            resolver.cell.borrow_mut().upstream = Some(upstream);
            let rejected = resolver.clone();
            self.subscribe(waiter(
                move |value| resolver.settle_with(on_fulfilled(value)),
                move |reason| rejected.settle_with(on_rejected(reason)),
            ));
            Ok(())
        })
    }

    /// `then` with a rejection handler that passes the reason on.
    pub fn and_then<F, R>(&self, on_fulfilled: F) -> Promise<R::Value, E>
    where
        F: FnOnce(T) -> R + 'static,
        R: IntoResolution<E>,
        R::Value: Clone + 'static,
    {
        self.then(on_fulfilled, Err::<R::Value, E>)
    }

    /// `then` with a fulfillment handler that passes the value on.
    pub fn catch<G, S>(&self, on_rejected: G) -> Promise<T, E>
    where
        G: FnOnce(E) -> S + 'static,
        S: IntoResolution<E, Value = T>,
    {
        self.then(Ok::<T, E>, on_rejected)
    }

    /// `then` with no handlers: a new promise with the same outcome.
    pub fn forward(&self) -> Promise<T, E> {
        self.then(Ok::<T, E>, Err::<T, E>)
    }
}

/// Awaiting a promise drains its scheduler first, so the handlers it depends
/// on get to run.
impl<T: Clone + 'static, E: Clone + 'static> Future for Promise<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.scheduler().run_until_stalled();
        let mut inner = self.cell.borrow_mut();
        if let Some(outcome) = inner.result.clone() {
            return Poll::Ready(outcome);
        }
        inner.wakers.push(cx.waker().clone());
        Poll::Pending
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("state", &self.cell.borrow().state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
#[allow(unused_imports)]
use futures::executor::block_on;
use super::{Promise, Resolution, State};
use crate::{Error, Scheduler, TaskQueue};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_executor_runs_synchronously() {
    init_logger();
    let ran = Cell::new(false);
    let promise = Promise::<i32, String>::new(|_| {
        ran.set(true);
        Ok(())
    });
    assert!(ran.get());
    assert_eq!(promise.state(), State::Pending);
}

#[test]
fn test_executor_error_rejects() {
    init_logger();
    let promise = Promise::<i32, String>::new(|_| Err("thrown".into()));
    assert_eq!(promise.outcome(), Some(Err("thrown".to_string())));
}

#[test]
fn test_executor_error_after_resolve_is_ignored() {
    init_logger();
    let promise = Promise::<i32, String>::new(|resolver| {
        resolver.resolve(1);
        Err("thrown".into())
    });
    assert_eq!(promise.outcome(), Some(Ok(1)));
}

#[test]
fn test_single_settlement() {
    init_logger();
    let (resolver, promise) = Promise::<i32, String>::pair();
    resolver.reject("first".into());
    resolver.resolve(2);
    resolver.reject("second".into());
    assert_eq!(promise.state(), State::Rejected);
    assert_eq!(promise.outcome(), Some(Err("first".to_string())));
    assert!(!resolver.is_pending());
}

#[test]
fn test_adopting_locks_out_later_settlement() {
    init_logger();
    let (inner_resolver, inner) = Promise::<i32, String>::pair();
    let (resolver, promise) = Promise::<i32, String>::pair();
    resolver.adopt(inner);
    resolver.resolve(1);
    assert!(promise.is_pending());
    inner_resolver.resolve(2);
    assert_eq!(promise.wait(), Ok(Ok(2)));
}

#[test]
fn test_handlers_never_run_synchronously() {
    init_logger();
    let ran = Rc::new(Cell::new(false));
    let flag = ran.clone();
    let settled = Promise::<i32, String>::fulfilled(1);
    let derived = settled.and_then(move |value| {
        flag.set(true);
        Ok(value)
    });
    assert!(!ran.get());
    assert!(derived.is_pending());
    TaskQueue::current().run_until_stalled();
    assert!(ran.get());
    assert_eq!(derived.outcome(), Some(Ok(1)));
}

#[test]
fn test_waiters_run_in_registration_order() {
    init_logger();
    let (resolver, promise) = Promise::<i32, String>::pair();
    let order = Rc::new(RefCell::new(vec![]));
    for i in 0..3 {
        let order = order.clone();
        promise.and_then(move |_| {
            order.borrow_mut().push(i);
            Ok(())
        });
    }
    assert!(order.borrow().is_empty());
    resolver.resolve(0);
    assert!(order.borrow().is_empty());
    TaskQueue::current().run_until_stalled();
    assert_eq!(*order.borrow(), vec![0, 1, 2]);
}

#[test]
fn test_handler_error_rejects_derived() {
    init_logger();
    let derived = Promise::<i32, String>::fulfilled(1)
        .and_then(|_| Err::<i32, _>("nope".to_string()));
    assert_eq!(derived.wait(), Ok(Err("nope".to_string())));
}

#[test]
fn test_forward_passes_outcome_through() {
    init_logger();
    let fulfilled = Promise::<i32, String>::fulfilled(3).forward();
    let rejected = Promise::<i32, String>::reject("r".into()).forward();
    assert_eq!(fulfilled.wait(), Ok(Ok(3)));
    assert_eq!(rejected.wait(), Ok(Err("r".to_string())));
}

#[test]
fn test_rejection_skips_fulfillment_handlers() {
    init_logger();
    let called = Rc::new(Cell::new(false));
    let flag = called.clone();
    let recovered = Promise::<i32, String>::reject("early".into())
        .and_then(move |value| {
            flag.set(true);
            Ok(value * 2)
        })
        .catch(|reason| Ok(reason.len() as i32));
    assert_eq!(recovered.wait(), Ok(Ok(5)));
    assert!(!called.get());
}

#[test]
fn test_catch_can_be_chained() {
    init_logger();
    let chained = Promise::<i32, String>::reject("x".into())
        .catch(|_| Ok(10))
        .and_then(|value| Ok(value + 1));
    assert_eq!(chained.wait(), Ok(Ok(11)));
}

#[test]
fn test_catch_passes_value_through() {
    init_logger();
    let caught = Rc::new(Cell::new(false));
    let flag = caught.clone();
    let passed = Promise::<i32, String>::fulfilled(3).catch(move |_| {
        flag.set(true);
        Ok(0)
    });
    assert_eq!(passed.wait(), Ok(Ok(3)));
    assert!(!caught.get());
}

#[test]
fn test_handler_returning_promise_is_flattened() {
    init_logger();
    let (inner_resolver, inner) = Promise::<i32, String>::pair();
    let derived = Promise::<i32, String>::fulfilled(0).and_then(move |_| inner);
    assert_eq!(derived.wait(), Err(Error::Stalled));
    inner_resolver.reject("late".into());
    assert_eq!(derived.wait(), Ok(Err("late".to_string())));
}

#[test]
fn test_resolution_value_fulfills() {
    init_logger();
    let derived = Promise::<i32, String>::fulfilled(2)
        .and_then(|value| Resolution::Value(value * 3));
    assert_eq!(derived.wait(), Ok(Ok(6)));
}

#[test]
fn test_self_adoption_rejects_with_cycle() {
    init_logger();
    let (resolver, promise) = Promise::<i32, String>::pair();
    resolver.adopt(promise.clone());
    assert_eq!(promise.outcome(), Some(Err(Error::Cycle.to_string())));
}

#[test]
fn test_transitive_adoption_rejects_with_cycle() {
    init_logger();
    let (resolver_a, a) = Promise::<i32, String>::pair();
    let (resolver_b, b) = Promise::<i32, String>::pair();
    resolver_a.adopt(b.clone());
    resolver_b.adopt(a.clone());
    assert_eq!(b.outcome(), Some(Err(Error::Cycle.to_string())));
    assert_eq!(a.wait(), Ok(Err(Error::Cycle.to_string())));
}

#[test]
fn test_handler_returning_its_own_promise_rejects_with_cycle() {
    init_logger();
    let slot: Rc<RefCell<Option<Promise<i32, String>>>> = Rc::new(RefCell::new(None));
    let handler_slot = slot.clone();
    let derived = Promise::<i32, String>::fulfilled(1).and_then(move |_| {
        handler_slot.borrow_mut().take().expect("derived promise stored")
    });
    *slot.borrow_mut() = Some(derived.clone());
    assert_eq!(derived.wait(), Ok(Err(Error::Cycle.to_string())));
}

#[test]
fn test_dropping_long_pending_chain() {
    init_logger();
    let (resolver, root) = Promise::<u32, String>::pair();
    let mut last = root.clone();
    for _ in 0..100_000 {
        last = last.and_then(|value| Ok(value + 1));
    }
    assert!(last.is_pending());
    drop(last);
    drop(root);
    drop(resolver);
    assert_eq!(TaskQueue::current().run_until_stalled(), 0);
}

#[test]
fn test_wait_reports_stalled_promise() {
    init_logger();
    let never = Promise::<i32, String>::new(|_| Ok(()));
    assert_eq!(never.wait(), Err(Error::Stalled));
    assert!(never.is_pending());
}

#[test]
fn test_derived_promises_use_source_scheduler() {
    init_logger();
    let queue = TaskQueue::new();
    let source = Promise::<i32, String>::new_in(Rc::new(queue.clone()), |resolver| {
        resolver.resolve(4);
        Ok(())
    });
    let derived = source.and_then(|value| Ok(value * value));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.run_until_stalled(), 1);
    assert_eq!(derived.outcome(), Some(Ok(16)));
}

#[test]
fn test_block_on_promise() {
    init_logger();
    let (resolver, promise) = Promise::<i32, String>::pair();
    resolver.resolve(3);
    let doubled = promise.and_then(|value| Ok(value * 2));
    assert_eq!(block_on(doubled), Ok(6));
}

#[test]
fn test_await_is_woken_by_settlement() {
    use futures::{executor::LocalPool, task::LocalSpawnExt};
    init_logger();
    let mut pool = LocalPool::new();
    let (resolver, promise) = Promise::<i32, String>::pair();
    let seen = Rc::new(RefCell::new(None));
    let slot = seen.clone();
    pool.spawner()
        .spawn_local(async move {
            *slot.borrow_mut() = Some(promise.await);
        })
        .expect("spawn on local pool");
    pool.run_until_stalled();
    assert!(seen.borrow().is_none());
    resolver.resolve(9);
    pool.run_until_stalled();
    assert_eq!(*seen.borrow(), Some(Ok(9)));
}
}
