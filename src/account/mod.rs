//! User registration, profile editing and account removal.

mod media;

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

pub use media::MediaStore;

use crate::{
    db::{
        models::{NewUser, User, UserProfileChanges},
        Database, DATE_FORMAT,
    },
    log_info,
};

const ENABLE_LOGS: bool = true;

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("User not found")]
    UserNotFound,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("invalid birth date '{0}', expected YYYY-MM-DD")]
    InvalidBirthDate(String),

    #[error("Invalid file type. Only images are allowed.")]
    InvalidImage,

    #[error("failed to store profile image: {0}")]
    Media(#[from] std::io::Error),

    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

/// An uploaded profile picture.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Fields to change on a profile. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub gender: Option<String>,
    /// `YYYY-MM-DD`.
    pub birth_date: Option<String>,
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub profile_image: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    fn from_user(user: User) -> Self {
        let profile_image = user
            .profile_image
            .map(PathBuf::from)
            .filter(|path| path.exists());

        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            gender: user.gender,
            birth_date: user
                .birth_date
                .map(|date| date.format(DATE_FORMAT).to_string()),
            profile_image,
            created_at: user.created_at,
        }
    }
}

/// Loose shape check: one `@`, a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), AccountError> {
    let invalid = || AccountError::InvalidEmail(email.to_string());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }
    Ok(())
}

fn parse_birth_date(value: &str) -> Result<NaiveDate, AccountError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| AccountError::InvalidBirthDate(value.to_string()))
}

#[derive(Clone)]
pub struct AccountService {
    db: Database,
    media: MediaStore,
}

impl AccountService {
    pub fn new(db: Database, media: MediaStore) -> Self {
        Self { db, media }
    }

    pub async fn register(&self, username: &str, email: &str) -> Result<User, AccountError> {
        let username = username.trim();
        let email = email.trim();
        if username.is_empty() {
            return Err(AccountError::EmptyUsername);
        }
        validate_email(email)?;

        if self.db.username_taken(username, None).await? {
            return Err(AccountError::UsernameTaken);
        }
        if self.db.get_user_by_email(email).await?.is_some() {
            return Err(AccountError::EmailTaken);
        }

        let user = self
            .db
            .insert_user(NewUser {
                username: username.to_string(),
                email: email.to_string(),
            })
            .await?;
        log_info!("Registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<User, AccountError> {
        self.db
            .get_user_by_username(username)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    async fn user(&self, user_id: i64) -> Result<User, AccountError> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    pub async fn profile(&self, user_id: i64) -> Result<Profile, AccountError> {
        Ok(Profile::from_user(self.user(user_id).await?))
    }

    /// Apply `update`. Every field is validated before anything is written;
    /// a replaced image is deleted only after the row is updated.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<Profile, AccountError> {
        let current = self.user(user_id).await?;
        let mut changes = UserProfileChanges {
            full_name: update.full_name,
            gender: update.gender,
            ..UserProfileChanges::default()
        };

        if let Some(username) = update.username {
            let username = username.trim().to_string();
            if username.is_empty() {
                return Err(AccountError::EmptyUsername);
            }
            if self.db.username_taken(&username, Some(user_id)).await? {
                return Err(AccountError::UsernameTaken);
            }
            changes.username = Some(username);
        }

        if let Some(email) = update.email {
            let email = email.trim().to_string();
            validate_email(&email)?;
            if self.db.email_taken(&email, Some(user_id)).await? {
                return Err(AccountError::EmailTaken);
            }
            changes.email = Some(email);
        }

        if let Some(birth_date) = update.birth_date {
            changes.birth_date = Some(parse_birth_date(birth_date.trim())?);
        }

        let image_format = match &update.image {
            Some(upload) => {
                Some(MediaStore::detect_format(&upload.bytes).ok_or(AccountError::InvalidImage)?)
            }
            None => None,
        };

        let mut stored_image = None;
        if let (Some(upload), Some(format)) = (&update.image, image_format) {
            let path = self.media.store(user_id, format, &upload.bytes).await?;
            log_info!(
                "Stored image '{}' for user {user_id} at {}",
                upload.file_name,
                path.display()
            );
            changes.profile_image = Some(path.to_string_lossy().into_owned());
            stored_image = Some(path);
        }

        if changes.is_empty() {
            return Ok(Profile::from_user(current));
        }

        let updated = match self.db.update_user_profile(user_id, changes).await {
            Ok(user) => user,
            Err(err) => {
                if let Some(path) = &stored_image {
                    self.media.remove(path).await;
                }
                return Err(err.into());
            }
        };

        if stored_image.is_some() {
            if let Some(old) = &current.profile_image {
                self.media.remove(Path::new(old)).await;
            }
        }

        Ok(Profile::from_user(updated))
    }

    /// Remove the user row with every tracker entry, then the profile image.
    pub async fn delete_account(&self, user_id: i64) -> Result<(), AccountError> {
        let user = self.user(user_id).await?;
        self.db.delete_user(user_id).await?;
        if let Some(image) = &user.profile_image {
            self.media.remove(Path::new(image)).await;
        }
        log_info!("Deleted account {} ({})", user.id, user.username);
        Ok(())
    }
}
