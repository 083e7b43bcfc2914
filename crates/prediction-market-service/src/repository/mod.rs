//! 数据库仓储层
//!
//! 封装 SQL 操作细节，仓储只负责持久化，不包含业务逻辑。
//! 需要原子性的多步写入（投票、结算）在仓储内部开启事务。

mod badge_repo;
mod market_repo;
mod traits;
mod user_repo;
mod vote_repo;

pub use badge_repo::BadgeRepository;
pub use market_repo::MarketRepository;
pub use traits::*;
pub use user_repo::UserRepository;
pub use vote_repo::VoteRepository;
