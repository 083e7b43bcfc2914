//! 请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use request::{
    CastVoteRequest, CreateMarketRequest, LeaderboardQuery, LoginRequest, MarketListQuery,
    OAuthCallbackQuery, RegisterRequest, ResolveMarketRequest,
};
pub use response::{
    ApiResponse, AuthResponse, ResolveMarketResponse, VoteHistoryItem, VoteHistoryResponse,
};
