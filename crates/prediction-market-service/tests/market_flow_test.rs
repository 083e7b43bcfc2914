//! 市场生命周期集成测试
//!
//! 使用真实 PostgreSQL 覆盖投票、关闭、结算加分和徽章发放的完整链路。
//! 结算和投票依赖行锁与唯一约束，mock 无法覆盖，因此需要集成测试。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... \
//!   cargo test -p prediction-market-service --test market_flow_test -- --ignored
//! ```

use chrono::{DateTime, Duration, Utc};
use prediction_market::{
    MIGRATOR,
    dto::CreateMarketRequest,
    error::ApiError,
    models::{Market, MarketStatus, NewUser, User, UserRole, VoteChoice, VoteResult},
    repository::{MarketRepository, MarketRepositoryTrait, UserRepository, UserRepositoryTrait},
    state::AppState,
};
use sqlx::PgPool;
use vote_shared::{
    config::AppConfig,
    database::Database,
    test_utils::{test_database_config, unique_email},
};

// ==================== 辅助函数 ====================

async fn setup() -> (PgPool, AppState) {
    let db = Database::connect(&test_database_config())
        .await
        .expect("数据库连接失败");
    db.run_migrations(&MIGRATOR).await.expect("迁移失败");

    let pool = db.pool().clone();
    let state = AppState::new(pool.clone(), &AppConfig::default()).expect("装配服务失败");
    (pool, state)
}

async fn create_user(pool: &PgPool, role: UserRole) -> User {
    UserRepository::new(pool.clone())
        .create(&NewUser {
            email: unique_email("flow"),
            password_hash: None,
            name: "Flow Tester".to_string(),
            role,
            oauth_provider: None,
            oauth_id: None,
        })
        .await
        .expect("创建用户失败")
}

/// 截止时间放在远期，避免被其他用例的批量关闭波及
async fn create_market(state: &AppState, admin: &User, show_totals: bool) -> Market {
    create_market_closing_at(state, admin, Utc::now() + Duration::days(30), show_totals).await
}

async fn create_market_closing_at(
    state: &AppState,
    admin: &User,
    close_time: DateTime<Utc>,
    show_totals: bool,
) -> Market {
    let req = CreateMarketRequest {
        title: "Will it rain tomorrow?".to_string(),
        description: "Resolves YES if it rains".to_string(),
        rules: None,
        close_time,
        show_totals,
    };
    state
        .market_service
        .create(admin.id, req, Utc::now())
        .await
        .expect("创建市场失败")
}

/// 直接关闭单个市场
async fn close_market(pool: &PgPool, market_id: i64) {
    sqlx::query("UPDATE markets SET status = 'closed' WHERE id = $1 AND status = 'open'")
        .bind(market_id)
        .execute(pool)
        .await
        .expect("关闭市场失败");
}

async fn user_points(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT points FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("查询积分失败")
}

async fn earned_badges(state: &AppState, user_id: i64) -> Vec<String> {
    state
        .query_service
        .badges(user_id)
        .await
        .expect("查询徽章失败")
        .into_iter()
        .filter(|b| b.earned_at.is_some())
        .map(|b| b.badge.name)
        .collect()
}

/// 创建市场、投票、关闭并按给定结果结算
async fn play_market(
    pool: &PgPool,
    state: &AppState,
    admin: &User,
    voter: &User,
    choice: VoteChoice,
    resolution: VoteChoice,
) {
    let market = create_market(state, admin, true).await;
    state
        .vote_service
        .cast(voter.id, market.id, choice)
        .await
        .expect("投票失败");
    close_market(pool, market.id).await;
    state
        .market_service
        .resolve(market.id, resolution)
        .await
        .expect("结算失败");
}

// ==================== 测试用例 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_full_market_lifecycle_awards_winners() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let yes_voter = create_user(&pool, UserRole::User).await;
    let no_voter = create_user(&pool, UserRole::User).await;

    let close_time = Utc::now() + Duration::hours(1);
    let market = create_market_closing_at(&state, &admin, close_time, true).await;
    assert_eq!(market.status, MarketStatus::Open);

    state
        .vote_service
        .cast(yes_voter.id, market.id, VoteChoice::Yes)
        .await
        .unwrap();
    state
        .vote_service
        .cast(no_voter.id, market.id, VoteChoice::No)
        .await
        .unwrap();

    // 开放期间不允许结算
    let err = state
        .market_service
        .resolve(market.id, VoteChoice::Yes)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MarketNotClosed(_)));

    let closed = state
        .market_service
        .close_expired(close_time + Duration::seconds(1))
        .await
        .unwrap();
    assert!(closed >= 1);

    let detail = state.market_service.get(market.id).await.unwrap();
    assert_eq!(detail.market.status, MarketStatus::Closed);
    assert_eq!(detail.yes_count, Some(1));
    assert_eq!(detail.no_count, Some(1));

    // 关闭后不再接受投票
    let late = create_user(&pool, UserRole::User).await;
    let err = state
        .vote_service
        .cast(late.id, market.id, VoteChoice::Yes)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MarketNotOpen(_)));

    let resolved = state
        .market_service
        .resolve(market.id, VoteChoice::Yes)
        .await
        .unwrap();
    assert_eq!(resolved.market.status, MarketStatus::Resolved);
    assert_eq!(resolved.market.resolution, Some(VoteChoice::Yes));
    assert!(resolved.market.resolved_at.is_some());
    assert_eq!(resolved.points_awarded, 10);

    assert_eq!(user_points(&pool, yes_voter.id).await, 10);
    assert_eq!(user_points(&pool, no_voter.id).await, 0);

    // 重复结算被拒绝且不会重复加分
    let err = state
        .market_service
        .resolve(market.id, VoteChoice::No)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MarketAlreadyResolved(_)));
    assert_eq!(user_points(&pool, yes_voter.id).await, 10);
    assert_eq!(user_points(&pool, no_voter.id).await, 0);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_second_vote_on_same_market_is_rejected() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let voter = create_user(&pool, UserRole::User).await;
    let market = create_market(&state, &admin, true).await;

    state
        .vote_service
        .cast(voter.id, market.id, VoteChoice::Yes)
        .await
        .unwrap();

    let err = state
        .vote_service
        .cast(voter.id, market.id, VoteChoice::No)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::AlreadyVoted(_)));

    let vote = state
        .vote_service
        .my_vote(voter.id, market.id)
        .await
        .unwrap()
        .expect("投票应存在");
    assert_eq!(vote.choice, VoteChoice::Yes);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_votes_from_same_user_store_one() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let voter = create_user(&pool, UserRole::User).await;
    let market = create_market(&state, &admin, true).await;

    let (a, b) = tokio::join!(
        state.vote_service.cast(voter.id, market.id, VoteChoice::Yes),
        state.vote_service.cast(voter.id, market.id, VoteChoice::No),
    );
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE market_id = $1 AND user_id = $2")
            .bind(market.id)
            .bind(voter.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_vote_on_unknown_market_is_not_found() {
    let (pool, state) = setup().await;
    let voter = create_user(&pool, UserRole::User).await;

    let err = state
        .vote_service
        .cast(voter.id, i64::MAX, VoteChoice::Yes)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::MarketNotFound(_)));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_hidden_totals_revealed_after_close() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let voter = create_user(&pool, UserRole::User).await;
    let market = create_market(&state, &admin, false).await;

    state
        .vote_service
        .cast(voter.id, market.id, VoteChoice::No)
        .await
        .unwrap();

    let open = state.market_service.get(market.id).await.unwrap();
    assert_eq!(open.yes_count, None);
    assert_eq!(open.no_count, None);
    assert_eq!(open.total_votes, None);

    close_market(&pool, market.id).await;

    let closed = state.market_service.get(market.id).await.unwrap();
    assert_eq!(closed.yes_count, Some(0));
    assert_eq!(closed.no_count, Some(1));
    assert_eq!(closed.total_votes, Some(1));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_history_stats_and_badges_after_three_markets() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let voter = create_user(&pool, UserRole::User).await;

    play_market(&pool, &state, &admin, &voter, VoteChoice::Yes, VoteChoice::Yes).await;
    play_market(&pool, &state, &admin, &voter, VoteChoice::No, VoteChoice::Yes).await;
    play_market(&pool, &state, &admin, &voter, VoteChoice::No, VoteChoice::No).await;

    let history = state.vote_service.history(voter.id).await.unwrap();
    assert_eq!(history.stats.total, 3);
    assert_eq!(history.stats.correct, 2);
    assert_eq!(history.stats.incorrect, 1);
    assert_eq!(history.stats.pending, 0);
    assert!(history.votes.iter().all(|v| v.result != VoteResult::Pending));

    assert_eq!(user_points(&pool, voter.id).await, 20);

    let badges = earned_badges(&state, voter.id).await;
    assert!(badges.contains(&"First Vote".to_string()));
    assert!(!badges.contains(&"Predictor".to_string()));
    assert!(!badges.contains(&"Winning Streak".to_string()));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_vote_enthusiast_awarded_on_tenth_vote() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let voter = create_user(&pool, UserRole::User).await;

    for _ in 0..9 {
        let market = create_market(&state, &admin, true).await;
        state
            .vote_service
            .cast(voter.id, market.id, VoteChoice::Yes)
            .await
            .unwrap();
    }
    assert!(!earned_badges(&state, voter.id)
        .await
        .contains(&"Vote Enthusiast".to_string()));

    let market = create_market(&state, &admin, true).await;
    state
        .vote_service
        .cast(voter.id, market.id, VoteChoice::Yes)
        .await
        .unwrap();
    assert!(earned_badges(&state, voter.id)
        .await
        .contains(&"Vote Enthusiast".to_string()));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_winning_streak_requires_consecutive_wins() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let voter = create_user(&pool, UserRole::User).await;

    // 一次失误后连续押中 4 次，尚未达到连胜 5
    play_market(&pool, &state, &admin, &voter, VoteChoice::Yes, VoteChoice::No).await;
    for _ in 0..4 {
        play_market(&pool, &state, &admin, &voter, VoteChoice::Yes, VoteChoice::Yes).await;
    }
    assert!(!earned_badges(&state, voter.id)
        .await
        .contains(&"Winning Streak".to_string()));

    play_market(&pool, &state, &admin, &voter, VoteChoice::Yes, VoteChoice::Yes).await;
    let badges = earned_badges(&state, voter.id).await;
    assert!(badges.contains(&"Winning Streak".to_string()));
    assert!(badges.contains(&"Predictor".to_string()));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_leaderboard_orders_by_points() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let winner = create_user(&pool, UserRole::User).await;
    let loser = create_user(&pool, UserRole::User).await;

    let market = create_market(&state, &admin, true).await;
    state
        .vote_service
        .cast(winner.id, market.id, VoteChoice::Yes)
        .await
        .unwrap();
    state
        .vote_service
        .cast(loser.id, market.id, VoteChoice::No)
        .await
        .unwrap();
    close_market(&pool, market.id).await;
    state
        .market_service
        .resolve(market.id, VoteChoice::Yes)
        .await
        .unwrap();

    let board = state.query_service.leaderboard(None).await.unwrap();
    let pos = |id: i64| board.iter().position(|e| e.id == id);
    if let (Some(w), Some(l)) = (pos(winner.id), pos(loser.id)) {
        assert!(w < l);
        assert_eq!(board[w].correct_votes, 1);
        assert_eq!(board[w].total_votes, 1);
    }
    assert!(board.windows(2).all(|p| p[0].points >= p[1].points));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_auto_close_skips_future_markets_and_is_idempotent() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;
    let repo = MarketRepository::new(pool.clone());

    let soon = Utc::now() + Duration::hours(1);
    let due = create_market_closing_at(&state, &admin, soon, true).await;
    let future = create_market_closing_at(&state, &admin, Utc::now() + Duration::days(60), true).await;

    let run_at = soon + Duration::seconds(1);
    let first = repo.close_expired(run_at).await.unwrap();
    assert!(!first.contains(&future.id));

    let second = repo.close_expired(run_at).await.unwrap();
    assert!(!second.contains(&due.id));
    assert!(!second.contains(&future.id));

    let due_now = state.market_service.get(due.id).await.unwrap();
    assert_eq!(due_now.market.status, MarketStatus::Closed);
    let future_now = state.market_service.get(future.id).await.unwrap();
    assert_eq!(future_now.market.status, MarketStatus::Open);

    // 截止时间恰好等于运行时刻也会被关闭
    let exact = create_market_closing_at(&state, &admin, soon + Duration::minutes(5), true).await;
    repo.close_expired(exact.close_time).await.unwrap();
    let exact_now = state.market_service.get(exact.id).await.unwrap();
    assert_eq!(exact_now.market.status, MarketStatus::Closed);
}

/// 按顺序对多个市场投票，返回市场 ID
async fn vote_on_new_markets(
    state: &AppState,
    admin: &User,
    voter: &User,
    choices: &[VoteChoice],
) -> Vec<i64> {
    let mut ids = Vec::new();
    for choice in choices {
        let market = create_market(state, admin, true).await;
        state
            .vote_service
            .cast(voter.id, market.id, *choice)
            .await
            .unwrap();
        ids.push(market.id);
    }
    ids
}

async fn close_and_resolve(pool: &PgPool, state: &AppState, market_id: i64, resolution: VoteChoice) {
    close_market(pool, market_id).await;
    state
        .market_service
        .resolve(market_id, resolution)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_streak_follows_resolution_order_not_vote_order() {
    let (pool, state) = setup().await;
    let admin = create_user(&pool, UserRole::Admin).await;

    // 最早投出的错误票最后结算：按结算顺序最近一次是失误，不算连胜
    let late_miss = create_user(&pool, UserRole::User).await;
    let ids = vote_on_new_markets(&state, &admin, &late_miss, &[VoteChoice::No; 6]).await;
    for id in &ids[1..] {
        close_and_resolve(&pool, &state, *id, VoteChoice::No).await;
    }
    close_and_resolve(&pool, &state, ids[0], VoteChoice::Yes).await;

    let badges = earned_badges(&state, late_miss.id).await;
    assert!(badges.contains(&"Predictor".to_string()));
    assert!(!badges.contains(&"Winning Streak".to_string()));

    // 最后投出的错误票最先结算：之后连续 5 次押中，获得连胜
    let early_miss = create_user(&pool, UserRole::User).await;
    let ids = vote_on_new_markets(&state, &admin, &early_miss, &[VoteChoice::Yes; 6]).await;
    close_and_resolve(&pool, &state, ids[5], VoteChoice::No).await;
    for id in &ids[..5] {
        close_and_resolve(&pool, &state, *id, VoteChoice::Yes).await;
    }

    let badges = earned_badges(&state, early_miss.id).await;
    assert!(badges.contains(&"Winning Streak".to_string()));
}
