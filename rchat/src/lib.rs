//! Provider selection, fallback execution, and hybrid synthesis.
//!
//! [`ChatService`] is the inbound surface. It hands each request to the
//! [`FallbackExecutor`], which asks [`plan_providers`] for an attempt order
//! and walks it until one provider answers. The hybrid preference instead
//! runs two providers at once and merges their answers.
//!
//! ```rust
//! use rchat::{ProviderPlan, plan_for_settings};
//! use rprovider::{ProviderKind, Settings};
//!
//! assert_eq!(
//!     plan_for_settings(&Settings::default()),
//!     ProviderPlan::Sequence(vec![ProviderKind::Gemini])
//! );
//! ```

mod error;
mod executor;
mod features;
mod hybrid;
mod selector;
mod service;
mod types;

pub mod prelude {
    pub use crate::{
        ChatError, ChatErrorKind, ChatService, ExecutionResult, FallbackExecutor, ProviderPlan,
        SubmitRequest,
    };
    pub use rprovider::prelude::*;
}

pub use error::{ChatError, ChatErrorKind};
pub use executor::{EXECUTE_OPERATION, FallbackExecutor};
pub use features::relevant_memories;
pub use hybrid::{
    DEGRADED_INSTRUCTION, DEGRADED_OPERATION, HYBRID_OPERATION, SYNTHESIS_INSTRUCTION,
    SYNTHESIS_OPERATION, synthesis_prompt,
};
pub use selector::{ProviderPlan, SelectorInput, plan_for_settings, plan_providers};
pub use service::{ChatService, DEFAULT_PERSONA, render_error};
pub use types::{
    ExecutionPlan, ExecutionResult, MemoryRecord, OfflineCache, SessionSummary, Skill,
    SourcedAnswer, SubmitRequest,
};
