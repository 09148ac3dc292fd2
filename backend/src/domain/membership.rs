//! Membership reconciliation shared by projects, contest teams and groups.
//!
//! Every owner keeps a set of member rows keyed by user. A [`MemberSync`]
//! request is planned against the persisted set to produce the minimal
//! [`MembershipDiff`], which store adapters then apply inside a single
//! transaction. `Replace` is the general form; `Add` never deletes and
//! `Remove` never inserts.

use std::collections::{HashMap, HashSet};

use super::{Error, UserId};

/// A member row that can be reconciled against the persisted set.
pub trait Member: Clone + Send + Sync {
    /// User the row belongs to. At most one row per user and owner.
    fn user_id(&self) -> UserId;

    /// Whether `self` carries different attributes from `persisted` for the
    /// same user, so the stored row needs an update.
    fn differs_from(&self, persisted: &Self) -> bool;
}

impl Member for UserId {
    fn user_id(&self) -> UserId {
        *self
    }

    fn differs_from(&self, _persisted: &Self) -> bool {
        false
    }
}

/// Requested change to an owner's member set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberSync<M> {
    /// Insert members that are not yet present. Existing members are kept
    /// unchanged.
    Add(Vec<M>),
    /// Make the member set exactly equal to the given list. An empty list
    /// removes every member.
    Replace(Vec<M>),
    /// Delete the named members. Users that are not members are ignored.
    Remove(Vec<UserId>),
}

/// Minimal set of row operations turning the persisted set into the desired
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipDiff<M> {
    pub inserts: Vec<M>,
    pub updates: Vec<M>,
    pub deletes: Vec<UserId>,
}

impl<M> MembershipDiff<M> {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Row counts of this diff.
    pub fn change(&self) -> MembershipChange {
        MembershipChange {
            inserted: self.inserts.len(),
            updated: self.updates.len(),
            deleted: self.deletes.len(),
        }
    }
}

/// Counts of rows touched by an applied membership sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MembershipChange {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl MembershipChange {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0 && self.deleted == 0
    }
}

fn dedup_members<M: Member>(members: Vec<M>) -> Vec<M> {
    let mut seen = HashSet::new();
    members
        .into_iter()
        .filter(|member| seen.insert(member.user_id()))
        .collect()
}

impl<M: Member> MemberSync<M> {
    /// Reject requests that cannot mean anything. Performs no I/O.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            Self::Add(members) if members.is_empty() => {
                Err(Error::invalid_argument("at least one member must be added"))
            }
            Self::Remove(users) if users.is_empty() => {
                Err(Error::invalid_argument("at least one member must be removed"))
            }
            _ => Ok(()),
        }
    }

    /// Users named by the request, in request order without duplicates.
    pub fn requested_users(&self) -> Vec<UserId> {
        let mut seen = HashSet::new();
        let ids: Vec<UserId> = match self {
            Self::Add(members) | Self::Replace(members) => {
                members.iter().map(Member::user_id).collect()
            }
            Self::Remove(users) => users.clone(),
        };
        ids.into_iter().filter(|id| seen.insert(*id)).collect()
    }

    /// Borrow the member payloads carried by `Add` and `Replace`.
    pub fn members(&self) -> &[M] {
        match self {
            Self::Add(members) | Self::Replace(members) => members,
            Self::Remove(_) => &[],
        }
    }

    /// Compute the diff against the persisted member rows.
    ///
    /// Duplicate requested users keep their first occurrence.
    pub fn plan(self, existing: &[M]) -> MembershipDiff<M> {
        let persisted: HashMap<UserId, &M> = existing
            .iter()
            .map(|member| (member.user_id(), member))
            .collect();

        match self {
            Self::Add(members) => MembershipDiff {
                inserts: dedup_members(members)
                    .into_iter()
                    .filter(|member| !persisted.contains_key(&member.user_id()))
                    .collect(),
                updates: Vec::new(),
                deletes: Vec::new(),
            },
            Self::Replace(members) => {
                let desired = dedup_members(members);
                let wanted: HashSet<UserId> = desired.iter().map(Member::user_id).collect();
                let deletes = existing
                    .iter()
                    .map(Member::user_id)
                    .filter(|id| !wanted.contains(id))
                    .collect();
                let mut inserts = Vec::new();
                let mut updates = Vec::new();
                for member in desired {
                    match persisted.get(&member.user_id()) {
                        None => inserts.push(member),
                        Some(current) if member.differs_from(current) => updates.push(member),
                        Some(_) => {}
                    }
                }
                MembershipDiff {
                    inserts,
                    updates,
                    deletes,
                }
            }
            Self::Remove(users) => {
                let mut seen = HashSet::new();
                MembershipDiff {
                    inserts: Vec::new(),
                    updates: Vec::new(),
                    deletes: users
                        .into_iter()
                        .filter(|id| persisted.contains_key(id) && seen.insert(*id))
                        .collect(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Tagged {
        user: UserId,
        tag: u8,
    }

    impl Member for Tagged {
        fn user_id(&self) -> UserId {
            self.user
        }

        fn differs_from(&self, persisted: &Self) -> bool {
            self.tag != persisted.tag
        }
    }

    #[fixture]
    fn users() -> [UserId; 4] {
        [
            UserId::random(),
            UserId::random(),
            UserId::random(),
            UserId::random(),
        ]
    }

    #[rstest]
    fn add_inserts_only_missing_members(users: [UserId; 4]) {
        let [a, b, c, _] = users;
        let diff = MemberSync::Add(vec![b, c, c]).plan(&[a, b]);
        assert_eq!(diff.inserts, vec![c]);
        assert!(diff.updates.is_empty());
        assert!(diff.deletes.is_empty());
    }

    #[rstest]
    fn add_of_existing_members_is_empty(users: [UserId; 4]) {
        let [a, b, _, _] = users;
        let diff = MemberSync::Add(vec![a, b]).plan(&[a, b]);
        assert!(diff.is_empty());
        assert!(diff.change().is_noop());
    }

    #[rstest]
    fn replace_computes_inserts_updates_and_deletes(users: [UserId; 4]) {
        let [a, b, c, d] = users;
        let existing = vec![
            Tagged { user: a, tag: 1 },
            Tagged { user: b, tag: 1 },
            Tagged { user: c, tag: 1 },
        ];
        let desired = vec![
            Tagged { user: b, tag: 1 },
            Tagged { user: c, tag: 2 },
            Tagged { user: d, tag: 1 },
        ];
        let diff = MemberSync::Replace(desired).plan(&existing);
        assert_eq!(diff.inserts, vec![Tagged { user: d, tag: 1 }]);
        assert_eq!(diff.updates, vec![Tagged { user: c, tag: 2 }]);
        assert_eq!(diff.deletes, vec![a]);
        assert_eq!(
            diff.change(),
            MembershipChange {
                inserted: 1,
                updated: 1,
                deleted: 1
            }
        );
    }

    #[rstest]
    fn replace_with_empty_set_deletes_everything(users: [UserId; 4]) {
        let [a, b, _, _] = users;
        let diff = MemberSync::<UserId>::Replace(Vec::new()).plan(&[a, b]);
        assert_eq!(diff.deletes, vec![a, b]);
        assert!(diff.inserts.is_empty());
    }

    #[rstest]
    fn replace_keeps_first_duplicate(users: [UserId; 4]) {
        let [a, _, _, _] = users;
        let diff = MemberSync::Replace(vec![
            Tagged { user: a, tag: 7 },
            Tagged { user: a, tag: 9 },
        ])
        .plan(&[]);
        assert_eq!(diff.inserts, vec![Tagged { user: a, tag: 7 }]);
    }

    #[rstest]
    fn remove_ignores_non_members(users: [UserId; 4]) {
        let [a, b, c, _] = users;
        let diff = MemberSync::<UserId>::Remove(vec![b, c, b]).plan(&[a, b]);
        assert_eq!(diff.deletes, vec![b]);
    }

    #[rstest]
    #[case(MemberSync::Add(Vec::new()), true)]
    #[case(MemberSync::Remove(Vec::new()), true)]
    #[case(MemberSync::Replace(Vec::new()), false)]
    fn empty_requests_are_validated(#[case] request: MemberSync<UserId>, #[case] rejected: bool) {
        let result = request.validate();
        assert_eq!(result.is_err(), rejected);
        if let Err(error) = result {
            assert_eq!(error.code(), ErrorCode::InvalidArgument);
        }
    }

    #[rstest]
    fn requested_users_are_deduplicated_in_order(users: [UserId; 4]) {
        let [a, b, _, _] = users;
        let request = MemberSync::Add(vec![b, a, b]);
        assert_eq!(request.requested_users(), vec![b, a]);
    }
}
