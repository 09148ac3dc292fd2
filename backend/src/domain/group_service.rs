//! Group repository service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::ports::{DirectorySource, GroupRepository, GroupStore, UserStore};
use crate::domain::user_view::UserViewResolver;
use crate::domain::{
    CreateGroupArgs, Error, Group, GroupDetail, GroupId, GroupMember, GroupMemberRecord, Member,
    MemberSync, UpdateGroupArgs, UserGroup, UserId,
};

/// Group service implementing [`GroupRepository`].
pub struct GroupService<G, U, D> {
    store: Arc<G>,
    users: UserViewResolver<U, D>,
}

impl<G, U, D> GroupService<G, U, D> {
    pub fn new(store: Arc<G>, user_store: Arc<U>, directory: Arc<D>) -> Self {
        Self {
            store,
            users: UserViewResolver::new(user_store, directory),
        }
    }
}

impl<G, U, D> GroupService<G, U, D>
where
    G: GroupStore,
    U: UserStore,
    D: DirectorySource,
{
    async fn sync_members(
        &self,
        id: &GroupId,
        request: MemberSync<GroupMemberRecord>,
    ) -> Result<(), Error> {
        request.validate()?;
        let change = self.store.sync_group_members(id, request).await?;
        debug!(
            group_id = %id,
            inserted = change.inserted,
            updated = change.updated,
            deleted = change.deleted,
            "synced group members"
        );
        Ok(())
    }
}

#[async_trait]
impl<G, U, D> GroupRepository for GroupService<G, U, D>
where
    G: GroupStore,
    U: UserStore,
    D: DirectorySource,
{
    async fn get_groups(&self) -> Result<Vec<Group>, Error> {
        let records = self.store.list_groups().await?;
        Ok(records.iter().map(|record| record.summary()).collect())
    }

    async fn get_group(&self, id: &GroupId) -> Result<GroupDetail, Error> {
        let record = self.store.find_group(id).await?;
        let members = self.store.list_group_members(id).await?;

        // Leader and members share one batched resolution.
        let mut ids: Vec<UserId> = members.iter().map(Member::user_id).collect();
        if !ids.contains(&record.leader) {
            ids.push(record.leader);
        }
        let mut views = self.users.resolve(&ids).await?;
        let leader = views
            .get(&record.leader)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("user {} not found", record.leader)))?;
        let members = members
            .into_iter()
            .filter_map(|member| {
                views.remove(&member.user_id).map(|user| GroupMember {
                    user,
                    duration: member.duration,
                })
            })
            .collect();

        Ok(GroupDetail {
            group: record.summary(),
            link: record.link,
            description: record.description,
            leader,
            members,
        })
    }

    async fn create_group(&self, args: CreateGroupArgs) -> Result<Group, Error> {
        args.validate()?;
        let record = args.into_record(GroupId::random());
        self.store.create_group(&record).await?;
        info!(group_id = %record.id, name = %record.name, "created group");
        Ok(record.summary())
    }

    async fn update_group(&self, id: &GroupId, args: UpdateGroupArgs) -> Result<Group, Error> {
        args.validate()?;
        let current = self.store.find_group(id).await?;
        if args.is_empty() {
            return Ok(current.summary());
        }
        self.store.update_group(&args.apply(&current)).await?;
        Ok(self.store.find_group(id).await?.summary())
    }

    async fn delete_group(&self, id: &GroupId) -> Result<(), Error> {
        self.store.delete_group(id).await?;
        info!(group_id = %id, "deleted group");
        Ok(())
    }

    async fn get_group_members(&self, id: &GroupId) -> Result<Vec<GroupMember>, Error> {
        self.store.find_group(id).await?;
        let members = self.store.list_group_members(id).await?;
        let ids: Vec<UserId> = members.iter().map(Member::user_id).collect();
        let mut views = self.users.resolve(&ids).await?;
        Ok(members
            .into_iter()
            .filter_map(|member| {
                views.remove(&member.user_id).map(|user| GroupMember {
                    user,
                    duration: member.duration,
                })
            })
            .collect())
    }

    async fn add_group_members(
        &self,
        id: &GroupId,
        members: Vec<GroupMemberRecord>,
    ) -> Result<(), Error> {
        self.sync_members(id, MemberSync::Add(members)).await
    }

    async fn edit_group_members(
        &self,
        id: &GroupId,
        members: Vec<GroupMemberRecord>,
    ) -> Result<(), Error> {
        self.sync_members(id, MemberSync::Replace(members)).await
    }

    async fn delete_group_members(
        &self,
        id: &GroupId,
        user_ids: Vec<UserId>,
    ) -> Result<(), Error> {
        self.sync_members(id, MemberSync::Remove(user_ids)).await
    }

    async fn get_user_groups(&self, user_id: &UserId) -> Result<Vec<UserGroup>, Error> {
        Ok(self.store.list_user_groups(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        DirectoryUser, MockDirectorySource, MockGroupStore, MockUserStore, StoreError,
    };
    use crate::domain::{
        ErrorCode, GroupRecord, Semester, UserRecord, YearWithSemester, YearWithSemesterDuration,
    };

    fn user(name: &str) -> UserRecord {
        UserRecord {
            id: UserId::random(),
            name: name.to_owned(),
            bio: String::new(),
            check: false,
        }
    }

    #[tokio::test]
    async fn detail_resolves_leader_and_members_in_one_batch() {
        let leader = user("lead");
        let member = user("member");
        let group = GroupRecord {
            id: GroupId::random(),
            name: "infra".to_owned(),
            link: String::new(),
            description: String::new(),
            leader: leader.id,
        };
        let group_id = group.id;
        let duration =
            YearWithSemesterDuration::new(YearWithSemester::new(2023, Semester::FIRST), None)
                .expect("valid");
        let member_row = GroupMemberRecord {
            user_id: member.id,
            duration,
        };

        let mut store = MockGroupStore::new();
        store.expect_find_group().return_once(move |_| Ok(group));
        store
            .expect_list_group_members()
            .return_once(move |_| Ok(vec![member_row]));
        let rows = vec![leader.clone(), member.clone()];
        let mut users = MockUserStore::new();
        users
            .expect_find_users_by_ids()
            .times(1)
            .return_once(move |_| Ok(rows));
        let mut directory = MockDirectorySource::new();
        directory.expect_list_users().times(1).return_once(|| {
            Ok(vec![DirectoryUser {
                name: "lead".to_owned(),
                real_name: "Group Lead".to_owned(),
                alphabetic_name: String::new(),
            }])
        });

        let service = GroupService::new(Arc::new(store), Arc::new(users), Arc::new(directory));
        let detail = service.get_group(&group_id).await.expect("detail");
        assert_eq!(detail.leader.real_name, "Group Lead");
        assert_eq!(detail.members.len(), 1);
        assert_eq!(detail.members[0].user.id, member.id);
        assert_eq!(detail.members[0].duration, duration);
    }

    type MockedService = GroupService<MockGroupStore, MockUserStore, MockDirectorySource>;

    fn service(store: MockGroupStore) -> MockedService {
        GroupService::new(
            Arc::new(store),
            Arc::new(MockUserStore::new()),
            Arc::new(MockDirectorySource::new()),
        )
    }

    #[tokio::test]
    async fn empty_add_is_rejected_without_touching_the_store() {
        let service = service(MockGroupStore::new());
        let err = service
            .add_group_members(&GroupId::random(), Vec::new())
            .await
            .expect_err("empty add");
        assert_eq!(err.code(), ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn members_of_unknown_group_are_not_found() {
        let mut store = MockGroupStore::new();
        store
            .expect_find_group()
            .return_once(|_| Err(StoreError::not_found("group")));
        let err = service(store)
            .get_group_members(&GroupId::random())
            .await
            .expect_err("unknown group");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn empty_update_returns_current_without_writing() {
        let record = GroupRecord {
            id: GroupId::random(),
            name: "infra".to_owned(),
            link: String::new(),
            description: String::new(),
            leader: UserId::random(),
        };
        let id = record.id;
        let mut store = MockGroupStore::new();
        store.expect_find_group().times(1).return_once(move |_| Ok(record));
        store.expect_update_group().never();

        let group = service(store)
            .update_group(&id, UpdateGroupArgs::default())
            .await
            .expect("no-op update");
        assert_eq!(group.name, "infra");
    }
}
