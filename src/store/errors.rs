use thiserror::Error;

/// A business rule refused the request. The `Display` text is short and safe
/// to show to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("bio too long (max {max} characters)")]
    BioTooLong { max: usize },

    #[error("title too long (max {max} characters)")]
    TitleTooLong { max: usize },

    #[error("name too long (max {max} characters)")]
    NameTooLong { max: usize },

    #[error("{0} cannot be empty")]
    EmptyText(&'static str),

    #[error("you can't do that to yourself")]
    SelfTarget,

    #[error("already married")]
    AlreadyMarried,

    #[error("that user is already married")]
    PartnerAlreadyMarried,

    #[error("not married")]
    NotMarried,

    #[error("already friends")]
    AlreadyFriends,

    #[error("not on your friends list")]
    NotFriends,

    #[error("friend list is full (max {max})")]
    FriendLimit { max: usize },

    #[error("'{0}' not found")]
    CosmeticNotFound(String),

    #[error("{0} is not unlocked")]
    NotUnlocked(String),

    #[error("already unlocked")]
    AlreadyUnlocked,

    #[error("badge '{0}' not found")]
    BadgeNotFound(String),

    #[error("already has badge")]
    AlreadyHasBadge,

    #[error("no pending proposal")]
    NoProposal,

    #[error("on cooldown, try again in {remaining_secs}s")]
    Cooldown { remaining_secs: u64 },

    #[error("only bot owners can do that")]
    NotAuthorized,

    #[error("not muted")]
    NotMuted,
}

/// Failures of the persistence layer. These are logged, never shown to users.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("background write failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
