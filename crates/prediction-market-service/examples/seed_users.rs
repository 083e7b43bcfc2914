//! 初始化演示账号
//!
//! 创建一个管理员和一个普通用户，已存在则跳过。
//!
//! ```bash
//! cargo run -p prediction-market-service --example seed_users
//! ```

use prediction_market::{
    MIGRATOR,
    auth::hash_password,
    models::{NewUser, UserRole},
    repository::{UserRepository, UserRepositoryTrait},
};
use tracing::info;
use vote_shared::{config::AppConfig, database::Database};

struct SeedUser {
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: UserRole,
}

const SEED_USERS: &[SeedUser] = &[
    SeedUser {
        email: "admin@example.com",
        password: "admin123",
        name: "Admin",
        role: UserRole::Admin,
    },
    SeedUser {
        email: "user@example.com",
        password: "user123",
        name: "Demo User",
        role: UserRole::User,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load("prediction-market-service")?;
    let db = Database::connect(&config.database).await?;
    db.run_migrations(&MIGRATOR).await?;

    let repo = UserRepository::new(db.pool().clone());

    for seed in SEED_USERS {
        if repo.find_by_email(seed.email).await?.is_some() {
            info!("{} 已存在，跳过", seed.email);
            continue;
        }

        let user = repo
            .create(&NewUser {
                email: seed.email.to_string(),
                password_hash: Some(hash_password(seed.password)?),
                name: seed.name.to_string(),
                role: seed.role,
                oauth_provider: None,
                oauth_id: None,
            })
            .await?;
        info!(user_id = user.id, role = ?user.role, "已创建 {}", user.email);
    }

    db.close().await;
    Ok(())
}
