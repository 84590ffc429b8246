//! Transient social state: pending marriage proposals and per-user cooldowns.
//!
//! None of this is persisted; a restart clears proposals and cooldowns.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::config::SocialConfig;
use crate::store::{Rejection, ServerId, UserId};

/// One adoption per day per user.
pub const ADOPT_COOLDOWN: Duration = Duration::from_secs(86_400);

type Key = (ServerId, UserId);

#[derive(Debug, Clone, Copy)]
pub struct Proposal {
    pub from: UserId,
    pub created_at: Instant,
}

pub struct SocialState {
    /// Keyed by the user being proposed to.
    proposals: HashMap<Key, Proposal>,
    proposal_timeout: Duration,
    proposal_last: HashMap<Key, Instant>,
    proposal_cooldown: Duration,
    rep_last: HashMap<Key, Instant>,
    rep_cooldown: Duration,
    adopt_last: HashMap<Key, Instant>,
    adopt_cooldown: Duration,
}

fn remaining(cooldown: Duration, since: Duration) -> u64 {
    let left = cooldown.saturating_sub(since);
    // Round up so "0s" is never reported while still blocked.
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

/// Record `now` for `key` unless the previous use is within `cooldown`.
fn take_slot(map: &mut HashMap<Key, Instant>, key: Key, cooldown: Duration, now: Instant) -> Result<(), Rejection> {
    if let Some(last) = map.get(&key) {
        let since = now.saturating_duration_since(*last);
        if since < cooldown {
            return Err(Rejection::Cooldown {
                remaining_secs: remaining(cooldown, since),
            });
        }
    }
    map.insert(key, now);
    Ok(())
}

impl SocialState {
    pub fn new(cfg: &SocialConfig) -> Self {
        Self {
            proposals: HashMap::new(),
            proposal_timeout: Duration::from_secs(cfg.proposal_timeout_seconds),
            proposal_last: HashMap::new(),
            proposal_cooldown: Duration::from_secs(cfg.proposal_cooldown_seconds),
            rep_last: HashMap::new(),
            rep_cooldown: Duration::from_secs(cfg.rep_cooldown_seconds),
            adopt_last: HashMap::new(),
            adopt_cooldown: ADOPT_COOLDOWN,
        }
    }

    /// Drop expired proposals and cooldown entries that no longer block.
    pub fn prune_expired(&mut self, now: Instant) {
        let timeout = self.proposal_timeout;
        self.proposals
            .retain(|_, p| now.saturating_duration_since(p.created_at) < timeout);
        for (map, cooldown) in [
            (&mut self.proposal_last, self.proposal_cooldown),
            (&mut self.rep_last, self.rep_cooldown),
            (&mut self.adopt_last, self.adopt_cooldown),
        ] {
            map.retain(|_, last| now.saturating_duration_since(*last) < cooldown);
        }
    }

    /// Open a proposal from `from` to `to`, replacing any older one aimed at `to`.
    pub fn propose(&mut self, server: ServerId, from: UserId, to: UserId, now: Instant) -> Result<(), Rejection> {
        self.prune_expired(now);
        take_slot(&mut self.proposal_last, (server, from), self.proposal_cooldown, now)?;
        self.proposals.insert((server, to), Proposal { from, created_at: now });
        Ok(())
    }

    /// Remove and return the live proposal aimed at `to`.
    pub fn take_proposal(&mut self, server: ServerId, to: UserId, now: Instant) -> Result<Proposal, Rejection> {
        self.prune_expired(now);
        self.proposals.remove(&(server, to)).ok_or(Rejection::NoProposal)
    }

    /// Drop the proposal aimed at `to`, if any.
    pub fn withdraw(&mut self, server: ServerId, to: UserId) {
        self.proposals.remove(&(server, to));
    }

    pub fn pending_for(&self, server: ServerId, to: UserId, now: Instant) -> Option<Proposal> {
        self.proposals
            .get(&(server, to))
            .filter(|p| now.saturating_duration_since(p.created_at) < self.proposal_timeout)
            .copied()
    }

    pub fn allow_rep(&mut self, server: ServerId, giver: UserId, now: Instant) -> Result<(), Rejection> {
        take_slot(&mut self.rep_last, (server, giver), self.rep_cooldown, now)
    }

    pub fn allow_adopt(&mut self, server: ServerId, parent: UserId, now: Instant) -> Result<(), Rejection> {
        take_slot(&mut self.adopt_last, (server, parent), self.adopt_cooldown, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SocialState {
        SocialState::new(&SocialConfig::default())
    }

    #[test]
    fn test_proposal_expires() {
        let mut s = state();
        let t0 = Instant::now();
        s.propose(1, 10, 20, t0).unwrap();
        assert_eq!(s.pending_for(1, 20, t0).map(|p| p.from), Some(10));
        let late = t0 + Duration::from_secs(121);
        assert_eq!(s.take_proposal(1, 20, late).unwrap_err(), Rejection::NoProposal);
    }

    #[test]
    fn test_proposal_is_taken_once() {
        let mut s = state();
        let t0 = Instant::now();
        s.propose(1, 10, 20, t0).unwrap();
        assert_eq!(s.take_proposal(1, 20, t0).unwrap().from, 10);
        assert!(s.take_proposal(1, 20, t0).is_err());
    }

    #[test]
    fn test_withdraw_drops_only_that_proposal() {
        let mut s = state();
        let t0 = Instant::now();
        s.propose(1, 10, 20, t0).unwrap();
        s.propose(1, 30, 40, t0).unwrap();
        s.withdraw(1, 20);
        assert!(s.pending_for(1, 20, t0).is_none());
        assert_eq!(s.pending_for(1, 40, t0).map(|p| p.from), Some(30));
    }

    #[test]
    fn test_proposer_cooldown() {
        let mut s = state();
        let t0 = Instant::now();
        s.propose(1, 10, 20, t0).unwrap();
        let err = s.propose(1, 10, 30, t0 + Duration::from_secs(10)).unwrap_err();
        assert_eq!(err, Rejection::Cooldown { remaining_secs: 3590 });
        // cooldowns are per server
        assert!(s.propose(2, 10, 30, t0).is_ok());
    }

    #[test]
    fn test_rep_cooldown() {
        let mut s = state();
        let t0 = Instant::now();
        assert!(s.allow_rep(1, 5, t0).is_ok());
        assert!(s.allow_rep(1, 5, t0 + Duration::from_secs(60)).is_err());
        assert!(s.allow_rep(1, 5, t0 + Duration::from_secs(43_200)).is_ok());
    }
}
