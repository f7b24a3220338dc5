/// Creates a single [`ConversationTurn`](crate::ConversationTurn) from a role shorthand.
///
/// `model` is accepted as an alias for `assistant`.
///
/// ```rust
/// use relay::{Role, relay_turn};
///
/// let turn = relay_turn!(assistant => "Done.");
/// assert_eq!(turn.role, Role::Assistant);
/// assert_eq!(turn.text, "Done.");
/// ```
#[macro_export]
macro_rules! relay_turn {
    (user => $text:expr $(,)?) => {
        $crate::ConversationTurn::user($text)
    };
    (assistant => $text:expr $(,)?) => {
        $crate::ConversationTurn::assistant($text)
    };
    (model => $text:expr $(,)?) => {
        $crate::ConversationTurn::assistant($text)
    };
    ($role:ident => $text:expr $(,)?) => {
        compile_error!("unsupported role: use user, assistant, or model");
    };
}

/// Creates a `Vec<ConversationTurn>` from role/text pairs, oldest first.
///
/// ```rust
/// use relay::{Role, relay_history};
///
/// let history = relay_history![
///     user => "Summarize this repository.",
///     assistant => "It orchestrates AI providers.",
/// ];
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[1].role, Role::Assistant);
/// ```
#[macro_export]
macro_rules! relay_history {
    () => {
        Vec::<$crate::ConversationTurn>::new()
    };
    ($($role:ident => $text:expr),+ $(,)?) => {
        vec![$($crate::relay_turn!($role => $text)),+]
    };
}

/// Creates [`Settings`](crate::Settings) with preference shorthand and,
/// for the key-rotating providers, an optional key list.
///
/// ```rust
/// use relay::{ProviderPreference, relay_settings};
///
/// let settings = relay_settings!(huggingface, ["hf-key-1"]);
/// assert_eq!(settings.provider, ProviderPreference::HuggingFace);
/// assert_eq!(settings.hugging_face.len(), 1);
/// ```
#[macro_export]
macro_rules! relay_settings {
    (auto $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::Auto)
    };
    (gemini $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::Gemini)
    };
    (openrouter $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::OpenRouter)
    };
    (huggingface $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::HuggingFace)
    };
    (hybrid $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::Hybrid)
    };
    (custom $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::Custom)
    };
    (openrouter, [$($key:expr),* $(,)?] $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::OpenRouter)
            .with_open_router($crate::CredentialList::new([$($key),*]))
    };
    (huggingface, [$($key:expr),* $(,)?] $(,)?) => {
        $crate::Settings::new($crate::ProviderPreference::HuggingFace)
            .with_hugging_face($crate::CredentialList::new([$($key),*]))
    };
    ($preference:expr $(,)?) => {
        $crate::Settings::new($preference)
    };
}
