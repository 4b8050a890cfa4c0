use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{format_date, parse_datetime, parse_optional_date},
    models::{NewUser, User, UserProfileChanges},
};

const USER_COLUMNS: &str =
    "id, username, email, full_name, gender, birth_date, profile_image, created_at";

fn row_to_user(row: &Row) -> Result<User> {
    let created_at: String = row.get("created_at")?;
    let birth_date: Option<String> = row.get("birth_date")?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        full_name: row.get("full_name")?,
        gender: row.get("gender")?,
        birth_date: parse_optional_date(birth_date, "birth_date")?,
        profile_image: row.get("profile_image")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn query_user(conn: &Connection, clause: &str, value: &dyn rusqlite::ToSql) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {clause}");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params![value])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_user(row)?)),
        None => Ok(None),
    }
}

impl Database {
    pub async fn insert_user(&self, user: NewUser) -> Result<User> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
                params![user.username, user.email, Utc::now().to_rfc3339()],
            )?;
            let id = conn.last_insert_rowid();
            query_user(conn, "id = ?1", &id)?.ok_or_else(|| anyhow!("User not found after insert"))
        })
        .await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.execute(move |conn| query_user(conn, "id = ?1", &user_id))
            .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let username = username.to_string();
        self.execute(move |conn| query_user(conn, "username = ?1", &username))
            .await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_string();
        self.execute(move |conn| query_user(conn, "email = ?1", &email))
            .await
    }

    /// Whether `username` belongs to a user other than `except_id`.
    pub async fn username_taken(&self, username: &str, except_id: Option<i64>) -> Result<bool> {
        let username = username.to_string();
        self.execute(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM users WHERE username = ?1 AND id != ?2",
                    params![username, except_id.unwrap_or(-1)],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    /// Whether `email` belongs to a user other than `except_id`.
    pub async fn email_taken(&self, email: &str, except_id: Option<i64>) -> Result<bool> {
        let email = email.to_string();
        self.execute(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT id FROM users WHERE email = ?1 AND id != ?2",
                    params![email, except_id.unwrap_or(-1)],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    pub async fn update_user_profile(
        &self,
        user_id: i64,
        changes: UserProfileChanges,
    ) -> Result<User> {
        self.execute(move |conn| {
            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(username) = changes.username {
                updates.push("username = ?");
                params_vec.push(Box::new(username));
            }
            if let Some(email) = changes.email {
                updates.push("email = ?");
                params_vec.push(Box::new(email));
            }
            if let Some(full_name) = changes.full_name {
                updates.push("full_name = ?");
                params_vec.push(Box::new(full_name));
            }
            if let Some(gender) = changes.gender {
                updates.push("gender = ?");
                params_vec.push(Box::new(gender));
            }
            if let Some(birth_date) = changes.birth_date {
                updates.push("birth_date = ?");
                params_vec.push(Box::new(format_date(birth_date)));
            }
            if let Some(profile_image) = changes.profile_image {
                updates.push("profile_image = ?");
                params_vec.push(Box::new(profile_image));
            }

            if !updates.is_empty() {
                let query = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));
                params_vec.push(Box::new(user_id));

                let params_refs: Vec<&dyn rusqlite::ToSql> =
                    params_vec.iter().map(|b| b.as_ref()).collect();
                let rows_affected = conn.execute(&query, params_refs.as_slice())?;
                if rows_affected == 0 {
                    return Err(anyhow!("User not found"));
                }
            }

            query_user(conn, "id = ?1", &user_id)?.ok_or_else(|| anyhow!("User not found"))
        })
        .await
    }

    /// Delete the user and every tracker entry they own.
    pub async fn delete_user(&self, user_id: i64) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM tracker_entries WHERE user_id = ?1",
                params![user_id],
            )?;
            let rows_affected = tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
            if rows_affected == 0 {
                return Err(anyhow!("User not found"));
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    async fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("test.sqlite3")).unwrap();
        (dir, db)
    }

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.into(),
            email: format!("{name}@example.com"),
        }
    }

    #[tokio::test]
    async fn insert_and_lookup() {
        let (_dir, db) = open().await;
        let user = db.insert_user(new_user("ana")).await.unwrap();

        assert_eq!(db.get_user(user.id).await.unwrap().unwrap(), user);
        assert_eq!(
            db.get_user_by_username("ana").await.unwrap().unwrap().id,
            user.id
        );
        assert_eq!(
            db.get_user_by_email("ana@example.com").await.unwrap().unwrap().id,
            user.id
        );
        assert!(db.get_user_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_by_schema() {
        let (_dir, db) = open().await;
        db.insert_user(new_user("ana")).await.unwrap();
        let duplicate = NewUser {
            username: "ana".into(),
            email: "other@example.com".into(),
        };
        assert!(db.insert_user(duplicate).await.is_err());
    }

    #[tokio::test]
    async fn taken_checks_ignore_the_owner() {
        let (_dir, db) = open().await;
        let ana = db.insert_user(new_user("ana")).await.unwrap();

        assert!(db.username_taken("ana", None).await.unwrap());
        assert!(!db.username_taken("ana", Some(ana.id)).await.unwrap());
        assert!(db.email_taken("ana@example.com", None).await.unwrap());
        assert!(!db.email_taken("ana@example.com", Some(ana.id)).await.unwrap());
    }

    #[tokio::test]
    async fn profile_update_only_touches_given_columns() {
        let (_dir, db) = open().await;
        let ana = db.insert_user(new_user("ana")).await.unwrap();

        let updated = db
            .update_user_profile(
                ana.id,
                UserProfileChanges {
                    full_name: Some("Ana Lima".into()),
                    birth_date: NaiveDate::from_ymd_opt(1994, 5, 17),
                    ..UserProfileChanges::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name.as_deref(), Some("Ana Lima"));
        assert_eq!(updated.birth_date, NaiveDate::from_ymd_opt(1994, 5, 17));
        assert_eq!(updated.username, "ana");
        assert_eq!(updated.gender, None);
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let (_dir, db) = open().await;
        let ana = db.insert_user(new_user("ana")).await.unwrap();
        db.delete_user(ana.id).await.unwrap();
        assert!(db.get_user(ana.id).await.unwrap().is_none());
        assert!(db.delete_user(ana.id).await.is_err());
    }
}
