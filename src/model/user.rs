#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// argon2 PHC string
    pub password: String,
}
