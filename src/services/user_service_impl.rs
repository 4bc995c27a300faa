//! `SeaORM` implementation of the [`UserService`] trait.

use crate::cache::{Cache, CacheKey, Mutation};
use crate::db::{Store, UserChanges};
use crate::services::business_service::BusinessSummary;
use crate::services::user_service::{
    FavoriteChange, RegisterUserRequest, UpdateUserRequest, UserDto, UserError, UserService,
    is_valid_email,
};
use std::sync::Arc;
use tracing::info;

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct SeaOrmUserService {
    store: Arc<Store>,
    cache: Cache,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Arc<Store>, cache: Cache) -> Self {
        Self { store, cache }
    }

    async fn require_user(&self, id: i32) -> Result<(), UserError> {
        match self.store.get_user(id).await? {
            Some(_) => Ok(()),
            None => Err(UserError::NotFound(id)),
        }
    }

    async fn require_business(&self, id: i32) -> Result<(), UserError> {
        match self.store.get_business(id).await? {
            Some(_) => Ok(()),
            None => Err(UserError::BusinessNotFound(id)),
        }
    }
}

#[async_trait::async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, request: RegisterUserRequest) -> Result<UserDto, UserError> {
        let name = request.name.trim();
        let email = request.email.trim().to_lowercase();

        if name.is_empty() {
            return Err(UserError::Validation("name is required".to_string()));
        }
        if !is_valid_email(&email) {
            return Err(UserError::Validation(format!("invalid email: {email}")));
        }
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(UserError::Conflict(email));
        }

        let id = self.store.add_user(name, &email).await?;
        self.cache.apply(&Mutation::RegisterUser).await;

        info!(user_id = id, "User registered");
        self.get(id).await
    }

    async fn get(&self, id: i32) -> Result<UserDto, UserError> {
        self.store
            .get_user(id)
            .await?
            .map(UserDto::from)
            .ok_or(UserError::NotFound(id))
    }

    async fn update(&self, id: i32, request: UpdateUserRequest) -> Result<UserDto, UserError> {
        let current = self
            .store
            .get_user(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        let email = filled(request.email)
            .map(|e| e.to_lowercase())
            .filter(|e| *e != current.email);
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(UserError::Validation(format!("invalid email: {email}")));
            }
            if self.store.find_user_by_email(email).await?.is_some() {
                return Err(UserError::Conflict(email.clone()));
            }
        }

        let changes = UserChanges {
            name: filled(request.name),
            email,
            phone: filled(request.phone),
            occupation: filled(request.occupation),
            avatar: filled(request.avatar),
        };

        if !self.store.update_user(id, changes).await? {
            return Err(UserError::NotFound(id));
        }
        let reviewed_business_ids = self.store.reviewed_business_ids(id).await?;
        self.cache
            .apply(&Mutation::EditUser {
                reviewed_business_ids,
            })
            .await;

        info!(user_id = id, "User profile updated");
        self.get(id).await
    }

    async fn delete(&self, id: i32) -> Result<(), UserError> {
        let deleted = self
            .store
            .delete_user(id)
            .await?
            .ok_or(UserError::NotFound(id))?;

        self.store
            .add_activity("user_deleted", &format!("User {id} was deleted"))
            .await?;
        self.cache
            .apply(&Mutation::DeleteUser {
                reviewed_business_ids: deleted.reviewed_business_ids,
                favorited_business_ids: deleted.favorited_business_ids,
            })
            .await;

        info!(user_id = id, "User deleted");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<UserDto>, UserError> {
        self.cache
            .cached(CacheKey::Users, || async {
                let rows = self.store.list_users().await?;
                Ok::<_, UserError>(rows.into_iter().map(UserDto::from).collect())
            })
            .await
    }

    async fn add_favorite(
        &self,
        user_id: i32,
        business_id: i32,
    ) -> Result<FavoriteChange, UserError> {
        self.require_user(user_id).await?;
        self.require_business(business_id).await?;

        let changed = self.store.add_favorite(user_id, business_id).await?;
        self.cache
            .apply(&Mutation::AddFavorite { business_id })
            .await;

        Ok(FavoriteChange {
            business_id,
            changed,
        })
    }

    async fn remove_favorite(
        &self,
        user_id: i32,
        business_id: i32,
    ) -> Result<FavoriteChange, UserError> {
        self.require_user(user_id).await?;

        let changed = self.store.remove_favorite(user_id, business_id).await?;
        self.cache
            .apply(&Mutation::RemoveFavorite { business_id })
            .await;

        Ok(FavoriteChange {
            business_id,
            changed,
        })
    }

    async fn favorites(&self, user_id: i32) -> Result<Vec<BusinessSummary>, UserError> {
        self.require_user(user_id).await?;

        let rows = self.store.list_favorites(user_id).await?;
        let ids: Vec<i32> = rows.iter().map(|b| b.id).collect();
        let ratings = self.store.average_ratings(&ids).await?;

        Ok(rows
            .iter()
            .map(|b| BusinessSummary::from_model(b, ratings.get(&b.id).copied()))
            .collect())
    }
}
