//! Tenant bound to the in-flight unit of work.
//!
//! Async request handling runs inside [`TenantContext::scope`], which gives every
//! task its own slot and drops it when the scoped future completes or is dropped.
//! Code running outside any scope (plain OS threads, blocking sections) falls back
//! to a thread-local slot. That slot outlives the unit of work, so whoever binds it
//! must clear it, preferably through [`TenantContext::enter`].
//!
//! Children never share the parent's slot. [`TenantContext::spawn`] and
//! [`TenantContext::spawn_thread`] copy the binding at spawn time; later `bind` or
//! `clear` calls on either side are not seen by the other.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;

use tokio::task::JoinHandle;
use tracing::debug;

use super::id::TenantId;

tokio::task_local! {
    static TASK_TENANT: RefCell<Option<TenantId>>;
}

thread_local! {
    static THREAD_TENANT: RefCell<Option<TenantId>> = const { RefCell::new(None) };
}

pub struct TenantContext;

impl TenantContext {
    /// Bind `tenant` to the calling unit of work, replacing any previous binding
    pub fn bind(tenant: TenantId) {
        debug!(tenant = %tenant, "Binding tenant context");
        Self::with_slot(|slot| {
            *slot.borrow_mut() = Some(tenant);
        });
    }

    pub fn current() -> Option<TenantId> {
        Self::with_slot(|slot| slot.borrow().clone())
    }

    /// Remove the binding. Clearing an unbound context is a no-op.
    pub fn clear() {
        Self::with_slot(|slot| {
            slot.borrow_mut().take();
        });
    }

    /// True when the caller runs inside a task scope rather than on the thread slot
    pub fn is_scoped() -> bool {
        TASK_TENANT.try_with(|_| ()).is_ok()
    }

    /// Run `fut` with its own tenant slot, initialised to `tenant`.
    ///
    /// The slot is gone once the returned future finishes or is dropped, whatever the
    /// outcome, so nothing bound inside can reach the next unit of work.
    pub fn scope<F>(tenant: Option<TenantId>, fut: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        TASK_TENANT.scope(RefCell::new(tenant), fut)
    }

    /// `tokio::spawn` that hands the current binding to the child task
    pub fn spawn<F>(fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let inherited = Self::current();
        tokio::spawn(Self::scope(inherited, fut))
    }

    /// `std::thread::spawn` that hands the current binding to the child thread.
    /// The child's thread slot is cleared again when `f` returns or unwinds.
    pub fn spawn_thread<F, T>(f: F) -> std::thread::JoinHandle<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let inherited = Self::current();
        std::thread::spawn(move || {
            let _guard = Self::enter(inherited);
            f()
        })
    }

    /// Bind `tenant` (or unbind, for `None`) until the guard drops, then restore the
    /// previous binding. For synchronous code; async code should use `scope`.
    pub fn enter(tenant: Option<TenantId>) -> TenantGuard {
        let previous = Self::with_slot(|slot| slot.replace(tenant));
        TenantGuard {
            previous,
            _not_send: PhantomData,
        }
    }

    fn with_slot<R>(f: impl FnOnce(&RefCell<Option<TenantId>>) -> R) -> R {
        if Self::is_scoped() {
            TASK_TENANT.with(f)
        } else {
            THREAD_TENANT.with(f)
        }
    }
}

/// Restores the previous binding on drop. Tied to the thread or task that created it.
#[must_use = "the binding is reverted as soon as the guard is dropped"]
pub struct TenantGuard {
    previous: Option<TenantId>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for TenantGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        TenantContext::with_slot(|slot| {
            *slot.borrow_mut() = previous;
        });
    }
}
