//! Account registration, login and session resolution.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use validator::Validate;

use super::{require_admin, ServiceError, ServiceResult};
use crate::db::{Database, DbError, Session};
use crate::models::{AuthToken, Credentials, NewAccount, Principal, Role, User};
use crate::security::{hash_token, PasswordHasher, TokenIssuer};

/// Default session lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

const BAD_CREDENTIALS: &str = "invalid email or password";
const BAD_SESSION: &str = "missing, invalid or expired token";

/// Authentication service.
pub struct AuthService<'a> {
    db: &'a Database,
    hasher: &'a dyn PasswordHasher,
    issuer: &'a dyn TokenIssuer,
    token_ttl: Duration,
}

impl<'a> AuthService<'a> {
    pub fn new(
        db: &'a Database,
        hasher: &'a dyn PasswordHasher,
        issuer: &'a dyn TokenIssuer,
    ) -> Self {
        Self {
            db,
            hasher,
            issuer,
            token_ttl: Duration::hours(DEFAULT_TOKEN_TTL_HOURS),
        }
    }

    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Self-register a patient account. Clinic accounts are created by an
    /// administrator through [`AuthService::create_clinic_account`].
    pub fn register(&self, account: NewAccount) -> ServiceResult<User> {
        account.validate()?;
        let password_hash = self.hasher.hash(&account.password);
        self.register_hashed(account, password_hash)
    }

    /// [`AuthService::register`] with the password already hashed, so the
    /// caller can hash outside any lock it holds around the database.
    pub fn register_hashed(
        &self,
        account: NewAccount,
        password_hash: String,
    ) -> ServiceResult<User> {
        account.validate()?;

        match account.role {
            Role::Patient => {}
            Role::Admin => {
                warn!(email = %account.email, "Rejected administrator self-registration");
                return Err(ServiceError::Forbidden(
                    "administrator accounts cannot be self-registered".into(),
                ));
            }
            Role::Clinic => {
                warn!(email = %account.email, "Rejected clinic self-registration");
                return Err(ServiceError::Forbidden(
                    "clinic accounts are created by an administrator".into(),
                ));
            }
        }

        let profile_id = self.patient_profile(&account)?;
        self.open_account(account, password_hash, profile_id)
    }

    /// Create the account a clinic acts through. Administrators only.
    pub fn create_clinic_account(
        &self,
        principal: &Principal,
        account: NewAccount,
    ) -> ServiceResult<User> {
        require_admin(principal)?;
        account.validate()?;
        let password_hash = self.hasher.hash(&account.password);
        self.create_clinic_account_hashed(principal, account, password_hash)
    }

    pub fn create_clinic_account_hashed(
        &self,
        principal: &Principal,
        account: NewAccount,
        password_hash: String,
    ) -> ServiceResult<User> {
        require_admin(principal)?;
        account.validate()?;
        if account.role != Role::Clinic {
            return Err(ServiceError::Validation("role: must be CLINIC".into()));
        }

        let id = account.profile_id.as_deref().ok_or_else(|| {
            ServiceError::Validation("profileId: a clinic account must name its clinic".into())
        })?;
        let clinic = self
            .db
            .get_clinic(id)?
            .ok_or_else(|| ServiceError::not_found("clinic", id))?;
        self.open_account(account, password_hash, Some(clinic.id))
    }

    /// The patient profile a self-registered account acts for.
    ///
    /// A named profile must carry the account's email; without one the
    /// profile is matched by email, if any.
    fn patient_profile(&self, account: &NewAccount) -> ServiceResult<Option<String>> {
        let Some(id) = &account.profile_id else {
            return Ok(self
                .db
                .get_patient_by_email(&account.email)?
                .map(|patient| patient.id));
        };

        let patient = self
            .db
            .get_patient(id)?
            .ok_or_else(|| ServiceError::not_found("patient", id))?;
        if !patient.email.eq_ignore_ascii_case(&account.email) {
            warn!(email = %account.email, profile_id = %id, "Rejected link to another patient's profile");
            return Err(ServiceError::Forbidden(
                "profile belongs to another email".into(),
            ));
        }
        Ok(Some(patient.id))
    }

    fn open_account(
        &self,
        account: NewAccount,
        password_hash: String,
        profile_id: Option<String>,
    ) -> ServiceResult<User> {
        if self.db.user_email_exists(&account.email)? {
            return Err(ServiceError::Conflict(format!(
                "email {} is already registered",
                account.email
            )));
        }
        if let Some(id) = &profile_id {
            if self.db.profile_has_account(id)? {
                return Err(ServiceError::Conflict(format!(
                    "profile {} already has an account",
                    id
                )));
            }
        }

        let user = User::new(
            account.name,
            account.email,
            password_hash,
            account.role,
            profile_id,
        );
        self.insert_account(&user)?;

        info!(user_id = %user.id, role = %user.role, "Account registered");
        Ok(user)
    }

    fn insert_account(&self, user: &User) -> ServiceResult<()> {
        self.db.insert_user(user).map_err(|e| match e {
            DbError::Duplicate(_) => ServiceError::Conflict(format!(
                "email {} or its profile is already registered",
                user.email
            )),
            other => other.into(),
        })
    }

    /// Exchange credentials for a bearer token.
    pub fn login(&self, credentials: Credentials) -> ServiceResult<AuthToken> {
        let user = self.login_candidate(&credentials)?;
        verify_password(self.hasher, &credentials, &user)?;
        self.open_session(&user)
    }

    /// The active account behind a login attempt, before the password check.
    pub fn login_candidate(&self, credentials: &Credentials) -> ServiceResult<User> {
        credentials.validate()?;

        match self.db.get_user_by_email(&credentials.email)? {
            Some(user) if user.active => Ok(user),
            _ => {
                warn!(email = %credentials.email, "Login rejected");
                Err(ServiceError::Unauthenticated(BAD_CREDENTIALS.into()))
            }
        }
    }

    /// Issue a bearer token for an account whose password was verified.
    pub fn open_session(&self, user: &User) -> ServiceResult<AuthToken> {
        let token = self.issuer.issue();
        let issued_at = Utc::now();
        let expires_at = (issued_at + self.token_ttl).to_rfc3339();
        self.db.insert_session(&Session {
            token_hash: hash_token(&token),
            user_id: user.id.clone(),
            issued_at: issued_at.to_rfc3339(),
            expires_at: expires_at.clone(),
        })?;

        info!(user_id = %user.id, "Session opened");
        Ok(AuthToken {
            token,
            token_type: "Bearer".into(),
            role: user.role,
            expires_at,
        })
    }

    /// Resolve a bearer token into the calling principal.
    pub fn authenticate(&self, token: &str) -> ServiceResult<Principal> {
        let token_hash = hash_token(token);
        let session = self
            .db
            .get_session(&token_hash)?
            .ok_or_else(|| ServiceError::Unauthenticated(BAD_SESSION.into()))?;

        let expired = DateTime::parse_from_rfc3339(&session.expires_at)
            .map(|at| at.with_timezone(&Utc) <= Utc::now())
            .unwrap_or(true);
        if expired {
            debug!(user_id = %session.user_id, "Dropping expired session");
            self.db.delete_session(&token_hash)?;
            return Err(ServiceError::Unauthenticated(BAD_SESSION.into()));
        }

        match self.db.get_user(&session.user_id)? {
            Some(user) if user.active => Ok(Principal {
                user_id: user.id,
                role: user.role,
                profile_id: user.profile_id,
            }),
            _ => Err(ServiceError::Unauthenticated(BAD_SESSION.into())),
        }
    }

    /// End the session behind a token. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> ServiceResult<()> {
        if self.db.delete_session(&hash_token(token))? {
            debug!("Session closed");
        }
        Ok(())
    }

    /// Create the administrator account unless one with that email exists.
    /// Returns whether an account was created.
    pub fn bootstrap_admin(&self, name: &str, email: &str, password: &str) -> ServiceResult<bool> {
        if self.db.user_email_exists(email)? {
            debug!(email, "Administrator account already present");
            return Ok(false);
        }
        if password.len() < 6 {
            return Err(ServiceError::Validation(
                "admin password must have at least 6 characters".into(),
            ));
        }

        let admin = User::new(
            name.to_string(),
            email.to_string(),
            self.hasher.hash(password),
            Role::Admin,
            None,
        );
        self.insert_account(&admin)?;
        info!(email, "Administrator account created");
        Ok(true)
    }
}

/// Check a login password against the stored hash. Needs no database.
pub fn verify_password(
    hasher: &dyn PasswordHasher,
    credentials: &Credentials,
    user: &User,
) -> ServiceResult<()> {
    if hasher.verify(&credentials.password, &user.password_hash) {
        Ok(())
    } else {
        warn!(email = %credentials.email, "Login rejected");
        Err(ServiceError::Unauthenticated(BAD_CREDENTIALS.into()))
    }
}
