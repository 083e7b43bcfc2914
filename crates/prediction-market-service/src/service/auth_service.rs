//! 账号服务
//!
//! 邮箱密码注册登录、Google 账号登录和当前用户查询

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::auth::{GOOGLE_PROVIDER, GoogleProfile, JwtManager, hash_password, verify_password};
use crate::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{ApiError, Result};
use crate::models::{NewUser, User, UserRole};
use crate::repository::UserRepositoryTrait;

pub struct AuthService<UR>
where
    UR: UserRepositoryTrait,
{
    user_repo: Arc<UR>,
    jwt_manager: Arc<JwtManager>,
}

impl<UR> AuthService<UR>
where
    UR: UserRepositoryTrait,
{
    pub fn new(user_repo: Arc<UR>, jwt_manager: Arc<JwtManager>) -> Self {
        Self {
            user_repo,
            jwt_manager,
        }
    }

    fn issue(&self, user: User) -> Result<AuthResponse> {
        let (token, _) = self.jwt_manager.generate_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        let req = RegisterRequest {
            email: req.email.trim().to_lowercase(),
            name: req.name.trim().to_string(),
            password: req.password,
        };
        req.validate()?;

        if self.user_repo.find_by_email(&req.email).await?.is_some() {
            return Err(ApiError::EmailAlreadyRegistered);
        }

        let user = self
            .user_repo
            .create(&NewUser {
                email: req.email,
                password_hash: Some(hash_password(&req.password)?),
                name: req.name,
                role: UserRole::User,
                oauth_provider: None,
                oauth_id: None,
            })
            .await?;

        info!(user_id = user.id, "用户注册成功");
        self.issue(user)
    }

    #[instrument(skip_all, fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let req = LoginRequest {
            email: req.email.trim().to_lowercase(),
            password: req.password,
        };
        req.validate()?;

        let user = self
            .user_repo
            .find_by_email(&req.email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        // OAuth 账号没有密码，同样按凭据错误处理
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(ApiError::InvalidCredentials)?;
        if !verify_password(&req.password, hash)? {
            return Err(ApiError::InvalidCredentials);
        }

        info!(user_id = user.id, "用户登录成功");
        self.issue(user)
    }

    /// 按 Google 账号查找用户，不存在则创建
    #[instrument(skip_all, fields(oauth_id = %profile.sub))]
    pub async fn oauth_login(&self, profile: &GoogleProfile) -> Result<AuthResponse> {
        if let Some(user) = self
            .user_repo
            .find_by_oauth(GOOGLE_PROVIDER, &profile.sub)
            .await?
        {
            return self.issue(user);
        }

        let created = self
            .user_repo
            .create(&NewUser {
                email: profile.email_or_fallback(),
                password_hash: None,
                name: profile.name_or_fallback(),
                role: UserRole::User,
                oauth_provider: Some(GOOGLE_PROVIDER.to_string()),
                oauth_id: Some(profile.sub.clone()),
            })
            .await;

        let user = match created {
            Ok(user) => user,
            // 并发的首次登录撞上 (provider, oauth_id) 唯一约束时，改用已建好的账号
            Err(ApiError::EmailAlreadyRegistered) => self
                .user_repo
                .find_by_oauth(GOOGLE_PROVIDER, &profile.sub)
                .await?
                .ok_or(ApiError::EmailAlreadyRegistered)?,
            Err(e) => return Err(e),
        };

        info!(user_id = user.id, "Google 用户首次登录，已创建账号");
        self.issue(user)
    }

    pub async fn current_user(&self, user_id: i64) -> Result<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound(user_id))
    }
}
