//! 领域模型
//!
//! 用户、市场、投票和徽章

pub mod badge;
pub mod enums;
pub mod market;
pub mod user;
pub mod vote;

pub use badge::{Badge, BadgeWithEarned, UserStats};
pub use enums::{MarketStatus, RequirementType, UserRole, VoteChoice, VoteResult};
pub use market::{Market, MarketWithStats, NewMarket, ResolvedMarket};
pub use user::{LeaderboardEntry, NewUser, User};
pub use vote::{Vote, VoteHistoryRow, VoteStats};
