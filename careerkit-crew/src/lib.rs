//! # careerkit Crew
//!
//! The crew turns a career profile into a plan:
//! 1. The profile is validated and rendered into three prompt tasks
//! 2. Skill gap analysis runs first, then the learning path, then the action plan
//! 3. Every stage sees the outputs of the stages before it
//! 4. The aggregated text is split into named sections
//! 5. Sections and profile are turned into downloadable exports
//!
//! One remote call per stage, strictly in order. A failing stage ends the run.

pub mod config;
pub mod credentials;
mod crew;
pub mod export;
pub mod parser;
pub mod profile;
pub mod retry;
pub mod template;

pub use config::{CrewConfig, ProviderSettings};
pub use credentials::{resolve_api_key, CredentialSource, SecretStore, DEFAULT_CREDENTIAL_VAR};
pub use crew::{Crew, PipelineResult, RunState, StageOutput};
pub use export::{plan_exports, PlanExport};
pub use parser::{parse_sections, Sections};
pub use profile::{Profile, ProfileField, MAX_WEEKLY_HOURS};
pub use retry::{RetryFailure, RetryPolicy};
pub use template::{PromptTask, Stage, StageConfig, TemplateStore};
