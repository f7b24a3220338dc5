//! Best-effort JSON extraction for structured model output.
//!
//! Models asked for JSON often wrap it in prose or code fences. This crate
//! recovers the value when it can and reports [`ExtractErrorKind::NoParseableJson`]
//! when it cannot.

mod error;
mod fields;
mod sanitize;

pub mod prelude {
    pub use crate::{
        ExtractError, ExtractErrorKind, extract_as, extract_json, extract_object,
        required_string, string_list,
    };
}

pub use error::{ExtractError, ExtractErrorKind};
pub use fields::{
    extract_object, flag, optional_string, optional_u64, required_string, string_list,
    value_list,
};
pub use sanitize::{extract_as, extract_json, strip_code_fences};
