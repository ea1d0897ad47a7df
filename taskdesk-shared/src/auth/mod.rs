/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: bearer token generation and validation
/// - [`middleware`]: request authentication and the [`middleware::AuthContext`] extractor
/// - [`authorization`]: role and ownership checks
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::auth::jwt::{create_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let claims = Claims::new("alice", Duration::minutes(30))?;
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
