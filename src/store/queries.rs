//! SQL query constants
//!
//! Contains all SQL statements used by the application.

/// Tables owned by the API, created on startup when missing
pub const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username VARCHAR(255) NOT NULL,
        password VARCHAR(255) NOT NULL,
        role VARCHAR(100) NOT NULL DEFAULT 'user',
        faction VARCHAR(255),
        custom_role VARCHAR(255),
        status TEXT,
        avatar TEXT,
        is_banned BOOLEAN NOT NULL DEFAULT FALSE,
        is_muted BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

pub const CREATE_POSTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS posts (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users(id),
        title VARCHAR(500) NOT NULL,
        content TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
"#;

pub const CREATE_POSTS_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC)";

/// List every user without the password column.
///
/// Columns are normalized so tables created outside this service decode too:
/// `TIMESTAMP` is read as `TIMESTAMPTZ`, NULL names and flags read as defaults.
pub const LIST_USERS: &str = r#"
    SELECT id,
           COALESCE(username, '') AS username,
           COALESCE(role, 'user') AS role,
           faction, custom_role, status, avatar,
           COALESCE(is_banned, FALSE) AS is_banned,
           COALESCE(is_muted, FALSE) AS is_muted,
           created_at::timestamptz AS created_at
    FROM users
    ORDER BY created_at DESC, id DESC
"#;

/// List every post with its author's username and avatar
pub const LIST_POSTS: &str = r#"
    SELECT p.id,
           COALESCE(p.title, '') AS title,
           COALESCE(p.content, '') AS content,
           p.created_at::timestamptz AS created_at,
           COALESCE(u.username, '') AS author,
           u.avatar AS author_avatar
    FROM posts p
    JOIN users u ON p.user_id = u.id
    ORDER BY p.created_at DESC, p.id DESC
"#;

pub const INSERT_USER: &str = r#"
    INSERT INTO users (username, password, role)
    VALUES ($1, $2, $3)
    RETURNING id, username, COALESCE(role, 'user') AS role, avatar
"#;

/// Login candidates; the password is compared outside SQL
pub const FIND_BY_USERNAME: &str = r#"
    SELECT id,
           COALESCE(username, '') AS username,
           COALESCE(role, 'user') AS role,
           faction, custom_role, status, avatar,
           COALESCE(is_banned, FALSE) AS is_banned,
           COALESCE(is_muted, FALSE) AS is_muted,
           created_at::timestamptz AS created_at,
           password
    FROM users
    WHERE username = $1 AND password IS NOT NULL
    ORDER BY id
"#;

pub const INSERT_POST: &str = r#"
    INSERT INTO posts (user_id, title, content)
    VALUES ($1, $2, $3)
    RETURNING id
"#;

pub const UPDATE_ROLE: &str = "UPDATE users SET role = $1 WHERE id = $2";

pub const UPDATE_FACTION: &str = "UPDATE users SET faction = $1 WHERE id = $2";

pub const SET_BANNED: &str = "UPDATE users SET is_banned = $1 WHERE id = $2";

pub const SET_MUTED: &str = "UPDATE users SET is_muted = $1 WHERE id = $2";

pub const UPDATE_AVATAR: &str = "UPDATE users SET avatar = $1 WHERE id = $2";

#[cfg(test)]
mod tests {
    use super::*;

    /// Every statement whose rows become a `User` or `Post`
    const DECODED_SELECTS: [&str; 3] = [LIST_USERS, LIST_POSTS, FIND_BY_USERNAME];

    #[test]
    fn test_timestamps_are_read_as_timestamptz() {
        for sql in DECODED_SELECTS {
            assert!(
                sql.contains("created_at::timestamptz AS created_at"),
                "{}",
                sql
            );
        }
    }

    #[test]
    fn test_required_text_columns_never_decode_null() {
        for column in ["username", "role"] {
            for sql in [LIST_USERS, FIND_BY_USERNAME] {
                assert!(sql.contains(&format!("AS {}", column)), "{} in {}", column, sql);
            }
        }
        for column in ["title", "content", "author"] {
            assert!(LIST_POSTS.contains(&format!("AS {}", column)), "{}", column);
        }
        // A missing password must never match an empty one
        assert!(FIND_BY_USERNAME.contains("password IS NOT NULL"));
        assert!(!FIND_BY_USERNAME.contains("COALESCE(password"));
    }

    #[test]
    fn test_flags_default_to_false() {
        for sql in [LIST_USERS, FIND_BY_USERNAME] {
            assert!(sql.contains("COALESCE(is_banned, FALSE) AS is_banned"));
            assert!(sql.contains("COALESCE(is_muted, FALSE) AS is_muted"));
        }
    }

    #[test]
    fn test_password_stays_out_of_listing() {
        assert!(!LIST_USERS.contains("password"));
    }
}
