//! 账号集成测试
//!
//! Google 首次登录依赖 (oauth_provider, oauth_id) 唯一约束，需要真实 PostgreSQL。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... \
//!   cargo test -p prediction-market-service --test auth_flow_test -- --ignored
//! ```

use prediction_market::{MIGRATOR, auth::GoogleProfile, state::AppState};
use sqlx::PgPool;
use vote_shared::{
    config::AppConfig,
    database::Database,
    test_utils::{test_database_config, unique_oauth_id},
};

async fn setup() -> (PgPool, AppState) {
    let db = Database::connect(&test_database_config())
        .await
        .expect("数据库连接失败");
    db.run_migrations(&MIGRATOR).await.expect("迁移失败");

    let pool = db.pool().clone();
    let state = AppState::new(pool.clone(), &AppConfig::default()).expect("装配服务失败");
    (pool, state)
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_first_google_login_yields_one_account() {
    let (pool, state) = setup().await;
    let profile = GoogleProfile {
        sub: unique_oauth_id(),
        email: None,
        name: Some("Racer".to_string()),
    };

    let (a, b) = tokio::join!(
        state.auth_service.oauth_login(&profile),
        state.auth_service.oauth_login(&profile),
    );
    let a = a.expect("第一次登录失败");
    let b = b.expect("第二次登录失败");
    assert_eq!(a.user.id, b.user.id);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE oauth_provider = 'google' AND oauth_id = $1",
    )
    .bind(&profile.sub)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_repeat_google_login_reuses_account() {
    let (_pool, state) = setup().await;
    let profile = GoogleProfile {
        sub: unique_oauth_id(),
        email: None,
        name: None,
    };

    let first = state.auth_service.oauth_login(&profile).await.unwrap();
    let second = state.auth_service.oauth_login(&profile).await.unwrap();
    assert_eq!(first.user.id, second.user.id);
    assert_eq!(first.user.name, "Google User");
}
