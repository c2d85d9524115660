use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String, // bcrypt hash, never the plaintext
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Fields for a new user row; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
}

/// Persistence seam for the credential operations. Email uniqueness is the
/// store's job (schema constraint), not the caller's.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn insert(&self, user: NewUser) -> anyhow::Result<Uuid>;
    async fn update_password(&self, email: &str, password_hash: &str) -> anyhow::Result<()>;
}

/// Postgres-backed store.
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, phone_number, gender, dob, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> anyhow::Result<Uuid> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, password_hash, phone_number, gender, dob)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.phone_number)
        .bind(&user.gender)
        .bind(&user.dob)
        .fetch_one(&self.db)
        .await?;
        Ok(id)
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> anyhow::Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("no user row updated for email");
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory store that counts every call, so tests can assert which
    /// operations touched the store.
    #[derive(Default)]
    pub struct MemoryStore {
        users: Mutex<Vec<User>>,
        pub finds: AtomicUsize,
        pub inserts: AtomicUsize,
        pub updates: AtomicUsize,
    }

    impl MemoryStore {
        pub fn call_count(&self) -> usize {
            self.finds.load(Ordering::SeqCst)
                + self.inserts.load(Ordering::SeqCst)
                + self.updates.load(Ordering::SeqCst)
        }

        pub fn password_hash_of(&self, email: &str) -> Option<String> {
            self.users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .map(|u| u.password_hash.clone())
        }
    }

    #[async_trait]
    impl UserStore for MemoryStore {
        async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn insert(&self, user: NewUser) -> anyhow::Result<Uuid> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            // Same contract as the schema's UNIQUE constraint.
            if users.iter().any(|u| u.email == user.email) {
                anyhow::bail!("duplicate key value violates unique constraint \"users_email_key\"");
            }
            let id = Uuid::new_v4();
            users.push(User {
                id,
                username: user.username,
                email: user.email,
                password_hash: user.password_hash,
                phone_number: user.phone_number,
                gender: user.gender,
                dob: user.dob,
                created_at: OffsetDateTime::now_utc(),
            });
            Ok(id)
        }

        async fn update_password(&self, email: &str, password_hash: &str) -> anyhow::Result<()> {
            self.updates.fetch_add(1, Ordering::SeqCst);
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.email == email) {
                Some(user) => {
                    user.password_hash = password_hash.to_string();
                    Ok(())
                }
                None => anyhow::bail!("no user row updated for email"),
            }
        }
    }
}
