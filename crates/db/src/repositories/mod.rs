//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod certificate_repo;
pub mod evaluation_repo;
pub mod profile_repo;
pub mod progress_repo;
pub mod rid_submission_repo;
pub mod skill_module_repo;

pub use certificate_repo::CertificateRepo;
pub use evaluation_repo::EvaluationRepo;
pub use profile_repo::ProfileRepo;
pub use progress_repo::ProgressRepo;
pub use rid_submission_repo::RidSubmissionRepo;
pub use skill_module_repo::SkillModuleRepo;
