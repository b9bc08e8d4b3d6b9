// ============================================================================
// NavHub Core - Authentication Service
// File: crates/navhub-core/src/services/auth_service.rs
// ============================================================================
//! Authentication service with register, login, and token verification

use std::sync::Arc;
use tracing::{info, warn};

use navhub_security::{JwtError, JwtService, PasswordService};
use navhub_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use navhub_shared::utils::{mask_email, normalize_email};

use crate::domain::{Role, User};
use crate::error::DomainError;
use crate::repositories::UserRepository;
use crate::services::access_policy::{AccessPolicy, Capability, Principal};

/// Authentication service for handling user register/login flows
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

/// Registration payload after wire-level parsing.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { user_repo, jwt }
    }

    /// Register a new user and issue an access token
    pub async fn register(&self, input: RegisterInput) -> Result<AuthResult, DomainError> {
        let email = normalize_email(&input.email);
        info!("Registration attempt for email: {}", mask_email(&email));

        // 1. Check password bounds before hashing
        let length = input.password.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooShort);
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(DomainError::PasswordTooLong);
        }

        // 2. Check if email already exists
        if self.user_repo.find_by_email(&email).await?.is_some() {
            warn!("Registration failed: email already exists: {}", mask_email(&email));
            return Err(DomainError::EmailAlreadyExists(email));
        }

        // 3. Hash password
        let password_hash = PasswordService::hash(&input.password)
            .map_err(|e| DomainError::PasswordHashError(e.to_string()))?;

        // 4. Create user entity
        let user = User::new(
            input.username,
            email,
            password_hash,
            input.role.unwrap_or_default(),
        )?;

        // 5. Save; the store re-checks email uniqueness
        let created_user = self.user_repo.create(&user).await?;
        let token = self.issue_token(&created_user)?;

        info!(user_id = %created_user.id, role = created_user.role.as_str(), "Registration successful");

        Ok(AuthResult {
            user: UserInfo::from(&created_user),
            token,
        })
    }

    /// Login with email and password
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, DomainError> {
        let email = normalize_email(email);
        info!("Login attempt for email: {}", mask_email(&email));

        let user = self.user_repo.find_by_email(&email).await?.ok_or_else(|| {
            warn!("Login failed: email not found: {}", mask_email(&email));
            DomainError::InvalidCredentials
        })?;

        let password_valid = PasswordService::verify(password, &user.password_hash)
            .map_err(|_| DomainError::InvalidCredentials)?;

        if !password_valid {
            warn!("Login failed: invalid password for: {}", mask_email(&email));
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "Login successful");

        Ok(AuthResult {
            user: UserInfo::from(&user),
            token,
        })
    }

    /// Decode a bearer token into the calling principal
    pub fn authenticate_token(&self, token: &str) -> Result<Principal, DomainError> {
        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::TokenExpired => DomainError::InvalidToken("token expired".to_string()),
            other => DomainError::InvalidToken(other.to_string()),
        })?;

        let user_id = claims
            .user_id()
            .map_err(|e| DomainError::InvalidToken(e.to_string()))?;
        let role = Role::from_str(&claims.role)
            .ok_or_else(|| DomainError::InvalidToken(format!("unknown role: {}", claims.role)))?;

        Ok(Principal::new(user_id, role))
    }

    /// Profile of the calling user
    pub async fn current_user(&self, principal: &Principal) -> Result<UserInfo, DomainError> {
        self.user_repo
            .find_by_id(&principal.user_id)
            .await?
            .map(|user| UserInfo::from(&user))
            .ok_or_else(|| DomainError::InvalidToken("user no longer exists".to_string()))
    }

    /// All users, admin only
    pub async fn list_users(&self, principal: &Principal) -> Result<Vec<UserInfo>, DomainError> {
        AccessPolicy::authorize(principal, Capability::ManageUsers)?;

        let users = self.user_repo.list().await?;
        Ok(users.iter().map(UserInfo::from).collect())
    }

    fn issue_token(&self, user: &User) -> Result<String, DomainError> {
        self.jwt
            .generate_access_token(&user.id, user.role.as_str())
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))
    }
}

/// Result of successful login or registration
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: UserInfo,
    pub token: String,
}

/// User info returned in auth responses
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}
