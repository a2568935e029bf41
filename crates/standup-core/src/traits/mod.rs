//! Traits (ports) implemented by the infrastructure crates

mod clock;
mod platform;
mod repositories;
mod summarizer;

pub use clock::{Clock, SystemClock};
pub use platform::{
    ChannelInfo, ChatPlatform, OutgoingMessage, PlatformError, PlatformResult, PostedMessage,
    UserProfile, BOT_REMOVED_CODES,
};
pub use repositories::{
    ChannelRepository, RepoResult, ResponseRepository, StandupRepository, TeamRepository,
};
pub use summarizer::{Analysis, Summarizer, SummarizerError};
