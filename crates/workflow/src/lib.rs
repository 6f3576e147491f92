//! ScholarFlow Workflow Core
//!
//! The manuscript review workflow model:
//! - Manuscript, review entry, and revision round data model
//! - Workflow state machine governing legal transitions
//! - In-memory manuscript store with per-manuscript write serialization
//! - Payment gate mediating the payment-pending -> published edge
//! - Read-only reporting views over the stored collections

pub mod engine;
pub mod model;
pub mod payment;
pub mod reporting;
pub mod review;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use engine::{FinalVerdict, Resubmission, ReviewSubmission, Submission, WorkflowEngine};
pub use model::{Author, Fee, Files, Manuscript, Sections, TransitionEvent};
pub use payment::{Checkout, PaymentGate, PaymentGateway, PaymentRecord, PaymentStatus};
pub use review::{ChecklistItem, Recommendation, ReviewEntry, RevisionRound};
pub use state::WorkflowState;
pub use store::ManuscriptStore;
