//! Entity services.
//!
//! Each service owns the validation, ownership, and role invariants for one
//! collection and talks to the store (and, for users, the identity
//! provider) through injected `Arc` handles. Handlers stay thin: they
//! deserialize the request, call one service method, and map the result to
//! a response.
//!
//! Counter maintenance is paired with the content write it accounts for in
//! a single batch commit, so a crash cannot leave a counter diverged from
//! the documents it counts.

mod admin;
mod quiz;
mod symptoms;
mod users;
mod viruses;

pub use admin::{AdminService, LatestSnapshot, PendingDeletions};
pub use quiz::{QuizService, ResultsUpload};
pub use symptoms::{SymptomInput, SymptomOption, SymptomService, SymptomUpdate};
pub use users::{LoginRequest, SignupRequest, UserDetails, UserProfile, UserService};
pub use viruses::{VirusInput, VirusService, VirusSummary, VirusUpdate};
