// crates.io
use tokio::sync::oneshot;
// self
use crate::{
	_prelude::*,
	auth::{PrincipalScope, TokenSecret},
	error::RefreshFailure,
};

/// Result every request waiting on a refresh receives.
pub(crate) type RefreshOutcome = Result<TokenSecret, RefreshFailure>;

#[derive(Debug, Default)]
struct ScopeSlot {
	in_flight: bool,
	waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Per-scope single-flight coordinator.
///
/// The first request to [`join`](Self::join) an idle scope becomes the leader and performs the
/// refresh; later requests queue in arrival order until the leader settles. Admin and vendor
/// slots never share state.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
	slots: Mutex<HashMap<PrincipalScope, ScopeSlot>>,
}
impl RefreshGate {
	pub(crate) fn join(&self, scope: PrincipalScope) -> Ticket<'_> {
		let mut slots = self.slots.lock();
		let slot = slots.entry(scope).or_default();

		if slot.in_flight {
			let (sender, receiver) = oneshot::channel();

			slot.waiters.push_back(sender);

			Ticket::Follower { receiver, position: slot.waiters.len() }
		} else {
			slot.in_flight = true;

			Ticket::Leader(RefreshLease { gate: self, scope, settled: false })
		}
	}

	#[cfg(test)]
	fn is_in_flight(&self, scope: PrincipalScope) -> bool {
		self.slots.lock().get(&scope).is_some_and(|slot| slot.in_flight)
	}

	#[cfg(test)]
	fn queued(&self, scope: PrincipalScope) -> usize {
		self.slots.lock().get(&scope).map_or(0, |slot| slot.waiters.len())
	}

	// Clears the flag before waking anyone so a woken waiter can lead the next refresh.
	fn release(&self, scope: PrincipalScope, outcome: &RefreshOutcome) -> usize {
		let waiters = {
			let mut slots = self.slots.lock();
			let slot = slots.entry(scope).or_default();

			slot.in_flight = false;

			std::mem::take(&mut slot.waiters)
		};
		let woken = waiters.len();

		for waiter in waiters {
			// A waiter whose caller was dropped has nobody left to notify.
			let _ = waiter.send(outcome.clone());
		}

		woken
	}
}

/// Role a request plays in its scope's refresh.
pub(crate) enum Ticket<'a> {
	Leader(RefreshLease<'a>),
	Follower {
		receiver: oneshot::Receiver<RefreshOutcome>,
		/// 1-based place in the queue.
		position: usize,
	},
}

/// Leadership of an in-flight refresh.
///
/// Dropping an unsettled lease wakes every waiter with [`RefreshFailure::Abandoned`].
pub(crate) struct RefreshLease<'a> {
	gate: &'a RefreshGate,
	scope: PrincipalScope,
	settled: bool,
}
impl RefreshLease<'_> {
	/// Publishes the outcome to every queued request in FIFO order; returns how many were woken.
	pub(crate) fn settle(mut self, outcome: &RefreshOutcome) -> usize {
		self.settled = true;

		self.gate.release(self.scope, outcome)
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if !self.settled {
			self.gate.release(self.scope, &Err(RefreshFailure::Abandoned));
		}
	}
}

/// Waits for the leader's outcome; a leader that vanished counts as abandoned.
pub(crate) async fn wait(receiver: oneshot::Receiver<RefreshOutcome>) -> RefreshOutcome {
	receiver.await.unwrap_or(Err(RefreshFailure::Abandoned))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn leader(ticket: Ticket<'_>) -> RefreshLease<'_> {
		match ticket {
			Ticket::Leader(lease) => lease,
			Ticket::Follower { .. } => panic!("First join on an idle scope should lead."),
		}
	}

	fn follower(ticket: Ticket<'_>) -> (oneshot::Receiver<RefreshOutcome>, usize) {
		match ticket {
			Ticket::Follower { receiver, position } => (receiver, position),
			Ticket::Leader(_) => panic!("Joins during an in-flight refresh should follow."),
		}
	}

	#[tokio::test]
	async fn followers_receive_the_leader_outcome_in_order() {
		let gate = RefreshGate::default();
		let lease = leader(gate.join(PrincipalScope::Vendor));
		let (first, first_position) = follower(gate.join(PrincipalScope::Vendor));
		let (second, second_position) = follower(gate.join(PrincipalScope::Vendor));

		assert_eq!((first_position, second_position), (1, 2));
		assert!(gate.is_in_flight(PrincipalScope::Vendor));
		assert_eq!(gate.queued(PrincipalScope::Vendor), 2);

		let woken = lease.settle(&Ok(TokenSecret::new("access-2")));

		assert_eq!(woken, 2);
		assert!(!gate.is_in_flight(PrincipalScope::Vendor));
		assert_eq!(gate.queued(PrincipalScope::Vendor), 0);
		assert_eq!(wait(first).await, Ok(TokenSecret::new("access-2")));
		assert_eq!(wait(second).await, Ok(TokenSecret::new("access-2")));
	}

	#[tokio::test]
	async fn failures_reach_every_follower() {
		let gate = RefreshGate::default();
		let lease = leader(gate.join(PrincipalScope::Admin));
		let (receiver, _) = follower(gate.join(PrincipalScope::Admin));
		let failure = RefreshFailure::Rejected { status: 401, message: "expired".into() };

		lease.settle(&Err(failure.clone()));

		assert_eq!(wait(receiver).await, Err(failure));
	}

	#[tokio::test]
	async fn dropped_lease_abandons_waiters_and_reopens_the_gate() {
		let gate = RefreshGate::default();
		let lease = leader(gate.join(PrincipalScope::Vendor));
		let (receiver, _) = follower(gate.join(PrincipalScope::Vendor));

		drop(lease);

		assert_eq!(wait(receiver).await, Err(RefreshFailure::Abandoned));
		assert!(!gate.is_in_flight(PrincipalScope::Vendor));

		let _next = leader(gate.join(PrincipalScope::Vendor));
	}

	#[test]
	fn scopes_refresh_independently() {
		let gate = RefreshGate::default();
		let _vendor = leader(gate.join(PrincipalScope::Vendor));
		let _admin = leader(gate.join(PrincipalScope::Admin));

		assert!(gate.is_in_flight(PrincipalScope::Vendor));
		assert!(gate.is_in_flight(PrincipalScope::Admin));
		assert_eq!(gate.queued(PrincipalScope::Admin), 0);
	}
}
