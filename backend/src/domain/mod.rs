//! Domain primitives, aggregates and the services that reconcile them.
//!
//! Purpose: merge locally owned rows with records fetched from the presence,
//! directory and calendar services into single portfolio entities, keep
//! membership joins consistent, and report every failure through one
//! [`Error`] taxonomy.
//!
//! Public surface:
//! - Entity types (`User`, `Project`, `Contest`, `Group`, `Event`, ...).
//! - Driving ports in [`ports`] (`UserRepository`, `ProjectRepository`, ...)
//!   implemented by the `*Service` types below.
//! - Driven ports in [`ports`] implemented by `crate::outbound` adapters.

pub mod account;
pub mod contest;
pub mod contest_service;
pub mod duration;
pub mod error;
mod error_translation;
pub mod event;
pub mod event_service;
pub mod group;
pub mod group_service;
pub mod ids;
pub mod membership;
pub mod ports;
pub mod project;
pub mod project_service;
pub mod user;
pub mod user_service;
mod user_view;

pub use self::account::{
    Account, AccountType, AccountValidationError, CreateAccountArgs, UpdateAccountArgs,
};
pub use self::contest::{
    Contest, ContestDetail, ContestRecord, ContestTeam, ContestTeamDetail, ContestTeamRecord,
    CreateContestArgs, CreateContestTeamArgs, UpdateContestArgs, UpdateContestTeamArgs,
    UserContest,
};
pub use self::contest_service::ContestService;
pub use self::duration::{
    DurationValidationError, Semester, YearWithSemester, YearWithSemesterDuration,
};
pub use self::error::{Error, ErrorCode};
pub use self::event::{Event, EventDetail, EventLevel, EventLevelRecord, LevelUpdate};
pub use self::event_service::EventService;
pub use self::group::{
    CreateGroupArgs, Group, GroupDetail, GroupMember, GroupMemberRecord, GroupRecord,
    UpdateGroupArgs, UserGroup,
};
pub use self::group_service::GroupService;
pub use self::ids::{
    AccountId, ContestId, ContestTeamId, EventId, GroupId, IdParseError, ProjectId, UserId,
};
pub use self::membership::{Member, MemberSync, MembershipChange, MembershipDiff};
pub use self::project::{
    CreateProjectArgs, Project, ProjectDetail, ProjectMember, ProjectMemberRecord,
    ProjectRecord, UpdateProjectArgs, UserProject, check_member_spans,
};
pub use self::project_service::ProjectService;
pub use self::user::{
    CreateUserArgs, GetUsersArgs, UpdateUserArgs, User, UserDetail, UserRecord, UserState,
};
pub use self::user_service::UserService;
