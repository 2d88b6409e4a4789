//! Deadlock-free acquisition of several mutexes at once.
//!
//! Every call site that needs an overlapping subset of the same mutexes
//! acquires them in ascending address order, so no two tasks can ever
//! wait on each other in a cycle. Guards release on drop, which covers
//! every exit path without manual unlock calls.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};

/// Index permutation that visits `addresses` in ascending order.
fn acquisition_order<const K: usize>(addresses: [usize; K]) -> [usize; K] {
    let mut order: [usize; K] = core::array::from_fn(|i| i);
    order.sort_unstable_by_key(|&i| addresses[i]);
    order
}

/// Locks every mutex in `handles`, blocking until all are held, and
/// returns the guards in the same positions as the inputs.
///
/// Acquisition happens in ascending address order regardless of argument
/// order. The handles must be distinct: ownership of a guard already
/// makes a second guard for the same mutex meaningless, so an aliased
/// destination is expressed at the call site (one `&mut`) rather than by
/// reentrant locking.
pub async fn lock_ordered<'a, M: RawMutex, T, const K: usize>(
    handles: [&'a Mutex<M, T>; K],
) -> [MutexGuard<'a, M, T>; K] {
    let addresses = handles.map(|m| core::ptr::from_ref(m) as usize);
    let order = acquisition_order(addresses);

    debug_assert!(
        order.windows(2).all(|w| addresses[w[0]] != addresses[w[1]]),
        "duplicate mutex handle in ordered lock set"
    );

    let mut guards: [Option<MutexGuard<'a, M, T>>; K] = [const { None }; K];
    for &i in &order {
        guards[i] = Some(handles[i].lock().await);
    }
    guards.map(|guard| guard.expect("every handle is locked exactly once"))
}
