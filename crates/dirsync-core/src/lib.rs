//! Directory group reconciliation engine
//!
//! Given a desired-state description and a [`DirectoryClient`], this crate
//! computes and applies the changes that bring a directory in line:
//! - group existence and membership ([`GroupReconciler`])
//! - group settings compliance ([`GroupAuditor`])
//! - per-user batches: session sign-out and signature provisioning
//!   ([`BatchUserOperator`])
//!
//! Every operation returns the same `{changed, failed, messages}` shape
//! ([`RunResult`]) and keeps going past individual item failures.

pub mod auditor;
pub mod batch;
pub mod client;
pub mod desired;
pub mod diff;
pub mod errors;
pub mod models;
pub mod options;
pub mod reconciler;
pub mod result;
pub mod settings;

pub use auditor::GroupAuditor;
pub use batch::{BatchTargets, BatchUserOperator, ResolvedTargets};
pub use client::{DirectoryClient, RenderError, SignatureRenderer};
pub use desired::DesiredState;
pub use diff::{diff, MembershipPlan};
pub use errors::{DirectoryError, DirectoryResult, Result, SyncError};
pub use models::{
    DirectoryGroup, GroupDefinition, GroupTypeDefinition, MemberSet, SettingsRecord, UserProfile,
};
pub use options::RunOptions;
pub use reconciler::{GroupReconciler, MemberAction, MemberChange};
pub use result::{
    AuditResult, BatchResult, ExistenceState, Message, OperationOutcome, ReconciliationResult,
    RunResult,
};
pub use settings::{differing_fields, settings_equal};
