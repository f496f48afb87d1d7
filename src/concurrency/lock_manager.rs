//! Page-granularity shared/exclusive locking.
//!
//! The [`LockManager`] keeps two views of the same lock state:
//! - forward: page → `Shared{holders}` or `Exclusive(owner)` (absent = free)
//! - reverse: transaction → pages held shared, pages held exclusive
//!
//! Both live behind one mutex and are always updated together. Blocked
//! requests wait on a condition variable that every release signals, so the
//! mutex is free while a request waits.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{trace, warn};

use crate::common::{Error, PageId, Result, TransactionId};

/// Lock modes supported by the lock manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Shared lock for reads.
    Shared,
    /// Exclusive lock for writes.
    Exclusive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageLock {
    Shared(HashSet<TransactionId>),
    Exclusive(TransactionId),
}

enum Grant {
    Denied,
    AlreadyHeld,
    Granted,
    Upgraded,
}

#[derive(Debug, Default)]
struct HeldPages {
    shared: HashSet<PageId>,
    exclusive: HashSet<PageId>,
}

impl HeldPages {
    fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.exclusive.is_empty()
    }
}

#[derive(Debug, Default)]
struct LockTable {
    pages: HashMap<PageId, PageLock>,
    held: HashMap<TransactionId, HeldPages>,
    /// Blocked transaction → transactions it is waiting on. Only maintained
    /// when cycle detection is enabled.
    waits_for: HashMap<TransactionId, HashSet<TransactionId>>,
}

impl LockTable {
    /// Grant the request if the current state allows it.
    fn try_grant(&mut self, tid: TransactionId, pid: PageId, mode: LockMode) -> bool {
        let outcome = match self.pages.entry(pid) {
            Entry::Vacant(slot) => {
                slot.insert(match mode {
                    LockMode::Shared => PageLock::Shared(HashSet::from([tid])),
                    LockMode::Exclusive => PageLock::Exclusive(tid),
                });
                Grant::Granted
            }
            Entry::Occupied(mut slot) => match (mode, slot.get_mut()) {
                (_, PageLock::Exclusive(owner)) if *owner == tid => Grant::AlreadyHeld,
                (_, PageLock::Exclusive(_)) => Grant::Denied,
                (LockMode::Shared, PageLock::Shared(holders)) => {
                    holders.insert(tid);
                    Grant::Granted
                }
                (LockMode::Exclusive, lock) => {
                    let sole_holder =
                        matches!(lock, PageLock::Shared(h) if h.len() == 1 && h.contains(&tid));
                    if sole_holder {
                        *lock = PageLock::Exclusive(tid);
                        Grant::Upgraded
                    } else {
                        Grant::Denied
                    }
                }
            },
        };

        match outcome {
            Grant::Denied => false,
            Grant::AlreadyHeld => true,
            Grant::Granted => {
                self.index(tid, pid, mode);
                true
            }
            Grant::Upgraded => {
                let held = self.held.entry(tid).or_default();
                held.shared.remove(&pid);
                held.exclusive.insert(pid);
                true
            }
        }
    }

    fn index(&mut self, tid: TransactionId, pid: PageId, mode: LockMode) {
        let held = self.held.entry(tid).or_default();
        match mode {
            LockMode::Shared => held.shared.insert(pid),
            LockMode::Exclusive => held.exclusive.insert(pid),
        };
    }

    /// Transactions whose locks keep `tid` from getting `mode` on `pid`.
    fn blockers(&self, tid: TransactionId, pid: PageId, mode: LockMode) -> HashSet<TransactionId> {
        match (mode, self.pages.get(&pid)) {
            (_, Some(PageLock::Exclusive(owner))) if *owner != tid => HashSet::from([*owner]),
            (LockMode::Exclusive, Some(PageLock::Shared(holders))) => {
                holders.iter().copied().filter(|&h| h != tid).collect()
            }
            _ => HashSet::new(),
        }
    }

    /// Whether `from` can reach `target` by following wait-for edges.
    fn waits_transitively(&self, from: TransactionId, target: TransactionId) -> bool {
        let mut stack = vec![from];
        let mut visited = HashSet::new();

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if visited.insert(current) {
                if let Some(next) = self.waits_for.get(&current) {
                    stack.extend(next.iter().copied());
                }
            }
        }
        false
    }

    /// Remove `tid` from one page's forward and reverse state.
    fn release(&mut self, tid: TransactionId, pid: PageId) -> bool {
        let released = match self.pages.entry(pid) {
            Entry::Occupied(mut slot) => {
                let (released, now_free) = match slot.get_mut() {
                    PageLock::Exclusive(owner) => (*owner == tid, *owner == tid),
                    PageLock::Shared(holders) => {
                        let removed = holders.remove(&tid);
                        (removed, holders.is_empty())
                    }
                };
                if now_free {
                    slot.remove();
                }
                released
            }
            Entry::Vacant(_) => false,
        };

        if let Some(held) = self.held.get_mut(&tid) {
            held.shared.remove(&pid);
            held.exclusive.remove(&pid);
            if held.is_empty() {
                self.held.remove(&tid);
            }
        }
        released
    }
}

/// Page lock table for one buffer pool.
///
/// # Blocking
/// A request that cannot be granted waits for at most the configured
/// timeout. There is no queue: whichever waiter finds its request grantable
/// after a release proceeds, so starvation is possible. When the timeout
/// passes the requesting transaction gets `Error::TransactionAborted` and
/// the lock table is left as it was.
///
/// # Deadlocks
/// By default deadlocks are broken only by the timeout, which can also abort
/// transactions that were merely slow. With cycle detection enabled, a
/// request that would close a wait-for cycle aborts immediately.
///
/// # Example
/// ```
/// use heapdb::concurrency::{LockManager, LockMode};
/// use heapdb::{PageId, TableId, TransactionId};
/// use std::time::Duration;
///
/// let lm = LockManager::new(Duration::from_millis(10), false);
/// let pid = PageId::new(TableId(1), 0);
/// let (t1, t2) = (TransactionId::new(1), TransactionId::new(2));
///
/// lm.acquire(t1, pid, LockMode::Exclusive).unwrap();
/// assert!(lm.acquire(t2, pid, LockMode::Shared).unwrap_err().is_transaction_aborted());
///
/// lm.release_all(t1);
/// lm.acquire(t2, pid, LockMode::Shared).unwrap();
/// ```
#[derive(Debug)]
pub struct LockManager {
    table: Mutex<LockTable>,
    released: Condvar,
    timeout: Duration,
    detect_deadlocks: bool,
}

impl LockManager {
    /// Create an empty lock table.
    pub fn new(timeout: Duration, detect_deadlocks: bool) -> Self {
        Self {
            table: Mutex::new(LockTable::default()),
            released: Condvar::new(),
            timeout,
            detect_deadlocks,
        }
    }

    /// The wait bound for blocked requests.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Acquire `mode` on `pid` for `tid`, waiting if necessary.
    ///
    /// Re-requesting a lock already held is a no-op; asking for `Exclusive`
    /// while being the only shared holder upgrades in place.
    ///
    /// # Errors
    /// `Error::TransactionAborted` if the request is still not grantable when
    /// the timeout passes, or (with cycle detection) if waiting would
    /// deadlock.
    pub fn acquire(&self, tid: TransactionId, pid: PageId, mode: LockMode) -> Result<()> {
        let deadline = Instant::now() + self.timeout;
        let mut table = self.table.lock();

        loop {
            if table.try_grant(tid, pid, mode) {
                if self.detect_deadlocks {
                    table.waits_for.remove(&tid);
                }
                trace!(%tid, %pid, ?mode, "lock granted");
                return Ok(());
            }

            if self.detect_deadlocks {
                let blockers = table.blockers(tid, pid, mode);
                if blockers.iter().any(|&b| table.waits_transitively(b, tid)) {
                    table.waits_for.remove(&tid);
                    warn!(%tid, %pid, ?mode, "deadlock detected, aborting requester");
                    return Err(Error::TransactionAborted(tid));
                }
                table.waits_for.insert(tid, blockers);
            }

            if Instant::now() >= deadline {
                if self.detect_deadlocks {
                    table.waits_for.remove(&tid);
                }
                warn!(%tid, %pid, ?mode, timeout = ?self.timeout, "lock wait timed out");
                return Err(Error::TransactionAborted(tid));
            }

            // Releases the table mutex while waiting
            self.released.wait_until(&mut table, deadline);
        }
    }

    /// Release whatever lock `tid` holds on `pid`.
    pub fn release(&self, tid: TransactionId, pid: PageId) {
        let released = self.table.lock().release(tid, pid);
        if released {
            trace!(%tid, %pid, "lock released");
            self.released.notify_all();
        }
    }

    /// Release every lock `tid` holds, in either mode.
    pub fn release_all(&self, tid: TransactionId) {
        let mut table = self.table.lock();
        let pages = match table.held.remove(&tid) {
            Some(held) => held,
            None => {
                table.waits_for.remove(&tid);
                return;
            }
        };

        for pid in pages.shared.iter().chain(pages.exclusive.iter()) {
            table.release(tid, *pid);
        }

        table.waits_for.remove(&tid);
        for waiting_on in table.waits_for.values_mut() {
            waiting_on.remove(&tid);
        }
        drop(table);

        trace!(%tid, "released all locks");
        self.released.notify_all();
    }

    /// Whether `tid` holds any lock on `pid`.
    pub fn holds(&self, tid: TransactionId, pid: PageId) -> bool {
        self.lock_mode(tid, pid).is_some()
    }

    /// The mode in which `tid` holds `pid`, if it holds it at all.
    pub fn lock_mode(&self, tid: TransactionId, pid: PageId) -> Option<LockMode> {
        match self.table.lock().pages.get(&pid) {
            Some(PageLock::Exclusive(owner)) if *owner == tid => Some(LockMode::Exclusive),
            Some(PageLock::Shared(holders)) if holders.contains(&tid) => Some(LockMode::Shared),
            _ => None,
        }
    }

    /// Every page `tid` holds, in ascending order.
    pub fn pages_held(&self, tid: TransactionId) -> Vec<PageId> {
        let table = self.table.lock();
        let mut pages: Vec<PageId> = match table.held.get(&tid) {
            Some(held) => held.shared.iter().chain(held.exclusive.iter()).copied().collect(),
            None => Vec::new(),
        };
        pages.sort();
        pages
    }

    /// The exclusive owner of `pid`, if any.
    pub fn exclusive_holder(&self, pid: PageId) -> Option<TransactionId> {
        match self.table.lock().pages.get(&pid) {
            Some(PageLock::Exclusive(owner)) => Some(*owner),
            _ => None,
        }
    }

    /// The shared holders of `pid` (empty when free or exclusively held).
    pub fn shared_holders(&self, pid: PageId) -> Vec<TransactionId> {
        match self.table.lock().pages.get(&pid) {
            Some(PageLock::Shared(holders)) => {
                let mut holders: Vec<TransactionId> = holders.iter().copied().collect();
                holders.sort();
                holders
            }
            _ => Vec::new(),
        }
    }
}
