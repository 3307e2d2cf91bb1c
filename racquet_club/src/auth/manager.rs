//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    gate::require_admin,
    models::{
        AccessTokenClaims, AuthSession, LoginRequest, NewPlayerRequest, NewUser, PlayerUpdate,
        ProfileUpdate, RegisterRequest, Role, User, UserId,
    },
};
use crate::db::UserRepository;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::{Arc, OnceLock};

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// Longest accepted email address, in characters
pub const MAX_EMAIL_LEN: usize = 255;

/// Longest accepted full name, in characters
pub const MAX_FULL_NAME_LEN: usize = 255;

const USERNAME_LEN: std::ops::RangeInclusive<usize> = 3..=32;

/// Hash verified against when a login names no account, so a miss costs
/// the same Argon2 work as a wrong password.
static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn dummy_hash() -> Option<&'static str> {
    DUMMY_HASH
        .get_or_init(|| {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(b"racquet-club-placeholder", &salt)
                .map(|hash| hash.to_string())
                .ok()
        })
        .as_deref()
}

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    pepper: String,
    jwt_secret: String,
    token_ttl: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - User storage
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(users: Arc<dyn UserRepository>, pepper: String, jwt_secret: String) -> Self {
        Self {
            users,
            pepper,
            jwt_secret,
            token_ttl: Duration::hours(24),
        }
    }

    /// Override the access token lifetime (default 24 hours)
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Register a new player account and sign a token for it
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidUsername` / `InvalidEmail` / `WeakPassword` - Bad input
    /// * `AuthError::UsernameTaken` / `EmailTaken` - Duplicate account
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<AuthSession> {
        let user = self
            .create_account(
                request.username,
                request.email,
                &request.password,
                request.full_name,
                Role::Player,
                0,
            )
            .await?;

        log::info!("Registered player {} ({})", user.username, user.id);
        let token = self.generate_access_token(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Login with a username or email address
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - Unknown login or wrong password
    /// * `AuthError::AccountDeactivated` - Account exists but is inactive
    pub async fn login(&self, request: LoginRequest) -> AuthResult<AuthSession> {
        let Some(record) = self.users.find_by_login(request.login.trim()).await? else {
            if let Some(hash) = dummy_hash() {
                let _ = self.verify_password(&request.password, hash);
            }
            return Err(AuthError::InvalidCredentials);
        };

        self.verify_password(&request.password, &record.password_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if !record.user.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        let token = self.generate_access_token(&record.user)?;
        Ok(AuthSession {
            user: record.user,
            token,
        })
    }

    /// Resolve a bearer token to the active user it names.
    ///
    /// The returned user is read fresh from storage, so role changes and
    /// deactivation take effect before the token expires.
    pub async fn authenticate(&self, token: &str) -> AuthResult<User> {
        let claims = self.verify_access_token(token)?;
        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or(AuthError::UnknownSubject)?;

        if !user.is_active {
            return Err(AuthError::AccountDeactivated);
        }
        Ok(user)
    }

    /// Make sure an admin account named `username` exists.
    ///
    /// An existing account with that username is left untouched.
    pub async fn ensure_admin(&self, username: &str, email: &str, password: &str) -> AuthResult<User> {
        if let Some(existing) = self.users.find_by_login(username).await? {
            if !existing.user.is_admin() {
                log::warn!("Bootstrap admin {} exists but is not an admin", username);
            }
            return Ok(existing.user);
        }

        let user = self
            .create_account(
                username.to_string(),
                email.to_string(),
                password,
                username.to_string(),
                Role::Admin,
                0,
            )
            .await?;
        log::info!("Created bootstrap admin {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Fresh copy of the caller's profile
    pub async fn profile(&self, user_id: UserId) -> AuthResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Self-service profile update.
    ///
    /// Ranking is only applied for players and only when positive.
    pub async fn update_profile(&self, caller: &User, update: ProfileUpdate) -> AuthResult<User> {
        let mut user = self.profile(caller.id).await?;

        if let Some(full_name) = update.full_name {
            user.full_name = validate_full_name(&full_name)?;
        }
        if let Some(email) = update.email {
            user.email = validate_email(&email)?;
        }
        if let Some(ranking) = update.ranking.filter(|r| *r > 0) {
            if user.is_player() {
                user.ranking = ranking;
            }
        }

        self.users.save_user(&user).await
    }

    /// Rotate the caller's password after verifying the current one
    pub async fn change_password(
        &self,
        caller: &User,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        let record = self
            .users
            .find_record(caller.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.verify_password(current_password, &record.password_hash)
            .map_err(|_| AuthError::InvalidCurrentPassword)?;
        validate_password(new_password)?;

        let password_hash = self.hash_password(new_password)?;
        self.users.set_password_hash(caller.id, &password_hash).await?;
        log::info!("User {} changed password", caller.id);
        Ok(())
    }

    /// Every account, ordered by id (admin only)
    pub async fn list_users(&self, caller: &User) -> AuthResult<Vec<User>> {
        require_admin(caller)?;
        self.users.list_users(None).await
    }

    /// Change the role of any account (admin only)
    pub async fn update_role(&self, caller: &User, user_id: UserId, role: &str) -> AuthResult<User> {
        require_admin(caller)?;
        let role: Role = role
            .parse()
            .map_err(|_| AuthError::InvalidRole(role.to_string()))?;

        let mut user = self.profile(user_id).await?;
        user.role = role;
        let user = self.users.save_user(&user).await?;
        log::info!("Admin {} set role of user {} to {}", caller.id, user.id, role);
        Ok(user)
    }

    /// All player accounts
    pub async fn list_players(&self) -> AuthResult<Vec<User>> {
        self.users.list_users(Some(Role::Player)).await
    }

    /// One player account; admins are reported as missing
    pub async fn get_player(&self, player_id: UserId) -> AuthResult<User> {
        self.users
            .find_by_id(player_id)
            .await?
            .filter(User::is_player)
            .ok_or(AuthError::UserNotFound)
    }

    /// Create a player account on someone's behalf (admin only)
    pub async fn create_player(&self, caller: &User, request: NewPlayerRequest) -> AuthResult<User> {
        require_admin(caller)?;
        validate_ranking(request.ranking)?;

        let user = self
            .create_account(
                request.username,
                request.email,
                &request.password,
                request.full_name,
                Role::Player,
                request.ranking,
            )
            .await?;
        log::info!("Admin {} created player {} ({})", caller.id, user.username, user.id);
        Ok(user)
    }

    /// Edit a player account (admin only)
    pub async fn update_player(
        &self,
        caller: &User,
        player_id: UserId,
        update: PlayerUpdate,
    ) -> AuthResult<User> {
        require_admin(caller)?;
        let mut user = self.get_player(player_id).await?;

        if let Some(full_name) = update.full_name {
            user.full_name = validate_full_name(&full_name)?;
        }
        if let Some(email) = update.email {
            user.email = validate_email(&email)?;
        }
        if let Some(ranking) = update.ranking {
            validate_ranking(ranking)?;
            user.ranking = ranking;
        }

        self.users.save_user(&user).await
    }

    /// Hard-delete a player account (admin only)
    pub async fn delete_player(&self, caller: &User, player_id: UserId) -> AuthResult<()> {
        require_admin(caller)?;
        if !self.users.delete_user(player_id, Some(Role::Player)).await? {
            return Err(AuthError::UserNotFound);
        }
        log::info!("Admin {} deleted player {}", caller.id, player_id);
        Ok(())
    }

    /// Verify an access token's signature and expiry
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn create_account(
        &self,
        username: String,
        email: String,
        password: &str,
        full_name: String,
        role: Role,
        ranking: i32,
    ) -> AuthResult<User> {
        let username = validate_username(&username)?;
        let email = validate_email(&email)?;
        let full_name = validate_full_name(&full_name)?;
        validate_password(password)?;

        let password_hash = self.hash_password(password)?;
        self.users
            .create_user(NewUser {
                username,
                email,
                password_hash,
                full_name,
                role,
                ranking,
            })
            .await
    }

    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);

        Ok(Argon2::default()
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::HashingFailed)?;

        Argon2::default()
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    fn generate_access_token(&self, user: &User) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: user.id,
            role: user.role,
            exp: (now + self.token_ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(AuthError::TokenSigning)
    }
}

fn validate_username(username: &str) -> AuthResult<String> {
    let username = username.trim();
    if !USERNAME_LEN.contains(&username.chars().count()) {
        return Err(AuthError::InvalidUsername(
            "Username must be 3-32 characters".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(AuthError::InvalidUsername(
            "Username can only contain letters, numbers, '_', '.' and '-'".to_string(),
        ));
    }

    Ok(username.to_string())
}

fn validate_email(email: &str) -> AuthResult<String> {
    let email = email.trim();
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AuthError::InvalidEmail(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(AuthError::InvalidEmail(
            "Email must look like name@domain".to_string(),
        ));
    }
    Ok(email.to_string())
}

fn validate_full_name(full_name: &str) -> AuthResult<String> {
    let full_name = full_name.trim();
    if full_name.chars().count() > MAX_FULL_NAME_LEN {
        return Err(AuthError::InvalidInput(format!(
            "Full name cannot exceed {MAX_FULL_NAME_LEN} characters"
        )));
    }
    Ok(full_name.to_string())
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_ranking(ranking: i32) -> AuthResult<()> {
    if ranking < 0 {
        return Err(AuthError::InvalidInput(
            "Ranking cannot be negative".to_string(),
        ));
    }
    Ok(())
}
