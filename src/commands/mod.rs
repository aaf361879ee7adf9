//! CLI commands for cohortgrade

pub mod compare;
pub mod criteria;
pub mod discover;
pub mod dispatch;
pub mod format;
pub mod grade;
pub mod init;
