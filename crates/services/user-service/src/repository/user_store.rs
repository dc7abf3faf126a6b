//! SeaORM implementation of `UserRepository`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use domain::{
    Credentials, DomainError, DomainResult, Email, Gender, PasswordHash, Profile, User,
    UserRepository, Username,
};

use super::entities::{credential, profile, user};

/// Users split over the `users`, `credentials` and `profiles` tables.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Load the user owning `creds`.
    async fn assemble(&self, creds: credential::Model) -> DomainResult<User> {
        let row = user::Entity::find_by_id(creds.user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| DomainError::not_found("user"))?;
        let profile = profile::Entity::find_by_id(creds.user_id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| DomainError::persistence("user has no profile row"))?;

        to_domain(row, creds, profile)
    }

    /// Number of stored users.
    pub async fn count(&self) -> DomainResult<u64> {
        user::Entity::find()
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn find_credentials(&self, condition: Condition) -> DomainResult<User> {
        let creds = credential::Entity::find()
            .filter(condition)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| DomainError::not_found("user"))?;
        self.assemble(creds).await
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn create(&self, user: &mut User) -> DomainResult<()> {
        if user.id().is_some() {
            return Err(DomainError::internal("user is already persisted"));
        }
        let id = Uuid::new_v4();
        let txn = self.db.begin().await.map_err(map_db_err)?;

        user::ActiveModel {
            id: Set(id),
            created_at: Set(user.created_at()),
            updated_at: Set(user.updated_at()),
        }
        .insert(&txn)
        .await
        .map_err(map_db_err)?;
        credentials_model(id, user.credentials())
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        profile_model(id, user.profile())
            .insert(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        user.assign_id(id)
    }

    async fn get_by_id(&self, id: Uuid) -> DomainResult<User> {
        self.find_credentials(Condition::all().add(credential::Column::UserId.eq(id)))
            .await
    }

    async fn get_by_email(&self, email: &Email) -> DomainResult<User> {
        self.find_credentials(Condition::all().add(credential::Column::Email.eq(email.as_str())))
            .await
    }

    async fn get_by_username(&self, username: &Username) -> DomainResult<User> {
        self.find_credentials(
            Condition::all().add(credential::Column::Username.eq(username.as_str())),
        )
        .await
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        let id = user.id().ok_or_else(|| DomainError::not_found("user"))?;
        let txn = self.db.begin().await.map_err(map_db_err)?;

        user::ActiveModel {
            id: Set(id),
            created_at: Set(user.created_at()),
            updated_at: Set(user.updated_at()),
        }
        .update(&txn)
        .await
        .map_err(map_db_err)?;
        credentials_model(id, user.credentials())
            .update(&txn)
            .await
            .map_err(map_db_err)?;
        profile_model(id, user.profile())
            .update(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)
    }

    async fn delete_by_id(&self, id: Uuid) -> DomainResult<()> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        profile::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        credential::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        let result = user::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found("user"));
        }
        txn.commit().await.map_err(map_db_err)
    }

    async fn exists(&self, email: &Email, username: &Username) -> DomainResult<bool> {
        let count = credential::Entity::find()
            .filter(
                Condition::any()
                    .add(credential::Column::Email.eq(email.as_str()))
                    .add(credential::Column::Username.eq(username.as_str())),
            )
            .count(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(count > 0)
    }
}

fn credentials_model(user_id: Uuid, creds: &Credentials) -> credential::ActiveModel {
    credential::ActiveModel {
        user_id: Set(user_id),
        email: Set(creds.email.as_str().to_string()),
        username: Set(creds.username.as_str().to_string()),
        password_hash: Set(creds.password_hash.as_str().to_string()),
        email_verified: Set(creds.email_verified),
        mfa_enabled: Set(creds.mfa_enabled),
        mfa_secret: Set(creds.mfa_secret.clone()),
        last_login_at: Set(creds.last_login_at),
    }
}

fn profile_model(user_id: Uuid, profile: &Profile) -> profile::ActiveModel {
    profile::ActiveModel {
        user_id: Set(user_id),
        first_name: Set(profile.first_name.clone()),
        last_name: Set(profile.last_name.clone()),
        gender: Set(profile.gender.as_str().to_string()),
        date_of_birth: Set(profile.date_of_birth),
        bio: Set(profile.bio.clone()),
        display_name: Set(profile.display_name.clone()),
        avatar_photo_id: Set(profile.avatar_photo_id),
        relationship_id: Set(profile.relationship_id),
        locale: Set(profile.locale.clone()),
        timezone: Set(profile.timezone.clone()),
    }
}

fn to_domain(
    row: user::Model,
    creds: credential::Model,
    profile: profile::Model,
) -> DomainResult<User> {
    let corrupt = |e: DomainError| {
        DomainError::persistence(format!("stored user {} is invalid: {}", row.id, e))
    };

    let credentials = Credentials {
        email: Email::parse(&creds.email).map_err(corrupt)?,
        username: Username::parse(&creds.username).map_err(corrupt)?,
        password_hash: PasswordHash::from_hash(creds.password_hash).map_err(corrupt)?,
        email_verified: creds.email_verified,
        mfa_enabled: creds.mfa_enabled,
        mfa_secret: creds.mfa_secret,
        last_login_at: creds.last_login_at,
    };
    let profile = Profile {
        first_name: profile.first_name,
        last_name: profile.last_name,
        gender: Gender::parse(&profile.gender).map_err(corrupt)?,
        date_of_birth: profile.date_of_birth,
        bio: profile.bio,
        display_name: profile.display_name,
        avatar_photo_id: profile.avatar_photo_id,
        relationship_id: profile.relationship_id,
        locale: profile.locale,
        timezone: profile.timezone,
    };

    Ok(User::restore(
        row.id,
        row.created_at,
        row.updated_at,
        credentials,
        profile,
    ))
}

/// Unique-constraint violations become `Conflict`, other storage errors `Persistence`.
fn map_db_err(err: DbErr) -> DomainError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return if detail.contains("username") {
            DomainError::conflict("username is already taken")
        } else {
            DomainError::conflict("email is already registered")
        };
    }
    match err {
        DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => DomainError::not_found("user"),
        other => DomainError::persistence(other.to_string()),
    }
}
