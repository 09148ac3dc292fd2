//! Batched resolution of member ids into merged user views.

use std::collections::HashMap;
use std::sync::Arc;

use super::ports::{DirectorySource, DirectoryUser, UserStore};
use super::{Error, User, UserId};

/// Resolves user ids with one local `IN` query and one directory listing.
pub struct UserViewResolver<U, D> {
    users: Arc<U>,
    directory: Arc<D>,
}

impl<U, D> Clone for UserViewResolver<U, D> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<U, D> UserViewResolver<U, D> {
    pub fn new(users: Arc<U>, directory: Arc<D>) -> Self {
        Self { users, directory }
    }
}

impl<U, D> UserViewResolver<U, D>
where
    U: UserStore,
    D: DirectorySource,
{
    /// Map each id to its user view.
    ///
    /// No I/O is performed for an empty slice. Ids without a local row are
    /// [`super::ErrorCode::NotFound`]; names missing from the directory
    /// resolve to an empty real name.
    pub async fn resolve(&self, ids: &[UserId]) -> Result<HashMap<UserId, User>, Error> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let records = self.users.find_users_by_ids(ids).await?;
        let real_names = real_names_by_user(self.directory.list_users().await?);

        let views: HashMap<UserId, User> = records
            .into_iter()
            .map(|record| {
                let real_name = real_names.get(&record.name).cloned().unwrap_or_default();
                (record.id, record.into_user(real_name))
            })
            .collect();
        if let Some(missing) = ids.iter().find(|id| !views.contains_key(id)) {
            return Err(Error::not_found(format!("user {missing} not found")));
        }
        Ok(views)
    }

    /// Resolve `ids` and return the views in the same order.
    pub async fn resolve_ordered(&self, ids: &[UserId]) -> Result<Vec<User>, Error> {
        let mut views = self.resolve(ids).await?;
        Ok(ids.iter().filter_map(|id| views.remove(id)).collect())
    }
}

/// Index directory entries by name.
pub(crate) fn real_names_by_user(entries: Vec<DirectoryUser>) -> HashMap<String, String> {
    entries
        .into_iter()
        .map(|entry| (entry.name, entry.real_name))
        .collect()
}
