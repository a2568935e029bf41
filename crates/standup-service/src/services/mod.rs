//! Business logic services
//!
//! This module contains the standup engines (lifecycle, ingestion,
//! completion, reminders), the scheduler driver that runs them on timers,
//! and the channel configuration and reporting services.

pub mod availability;
pub mod channel;
pub mod completion;
pub mod context;
pub mod error;
pub mod ingestion;
pub mod lifecycle;
pub mod messages;
pub mod reminder;
pub mod reporting;
pub mod scheduler;
pub mod team;

// Re-export all services for convenience
pub use availability::{AvailabilityReport, AvailabilityService};
pub use channel::{ChannelService, MembershipChange};
pub use completion::{CheckOutcome, CompletionDecision, CompletionReason, CompletionService, Trigger};
pub use context::{ServiceContext, ServiceContextBuilder, StandupSettings};
pub use error::{ServiceError, ServiceResult};
pub use ingestion::{IgnoreReason, IncomingReply, IngestOutcome, IngestionService};
pub use lifecycle::LifecycleService;
pub use reminder::ReminderService;
pub use reporting::{format_debug, format_status, ChannelStatusReport, DebugReport, ReportingService};
pub use scheduler::{Scheduler, SchedulerSettings};
pub use team::TeamService;
