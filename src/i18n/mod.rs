//! Internationalization (i18n) support for alcalor
//!
//! User-facing error descriptions are available in English (en) and
//! Spanish (es), the language of the archive.
//!
//! # Environment Variables
//!
//! - `ALCALOR_LANG`: Set the preferred language (en, es). Defaults to English.
//!
//! # Usage
//!
//! ```rust,ignore
//! use alcalor::i18n::{set_locale, t};
//!
//! set_locale("es");
//! let msg = t!("errors.category.query");
//! ```

use std::sync::RwLock;

// Note: rust_i18n::i18n! macro is declared in lib.rs (crate root)

static CURRENT_LOCALE: RwLock<String> = RwLock::new(String::new());

/// Set the current locale for translations
///
/// # Examples
///
/// ```rust,ignore
/// use alcalor::i18n::set_locale;
///
/// set_locale("es-MX");
/// ```
pub fn set_locale(locale: &str) {
    let normalized = normalize_locale(locale);
    rust_i18n::set_locale(normalized);
    if let Ok(mut current) = CURRENT_LOCALE.write() {
        *current = normalized.to_string();
    }
}

/// Get the current locale
///
/// Returns the currently active locale or the default fallback.
pub fn current_locale() -> String {
    CURRENT_LOCALE
        .read()
        .ok()
        .filter(|current| !current.is_empty())
        .map(|current| current.clone())
        .unwrap_or_else(|| "en".to_string())
}

/// Initialize i18n from environment variables
///
/// Reads `ALCALOR_LANG`, falling back to English if not set or unknown.
pub fn init_from_env() {
    let locale = std::env::var("ALCALOR_LANG").unwrap_or_else(|_| "en".to_string());
    set_locale(&locale);
}

/// Normalize locale code to supported format
///
/// - es-ES, es_MX, spanish, español -> es
/// - anything else -> en
fn normalize_locale(locale: &str) -> &'static str {
    let lower = locale.trim().to_lowercase();

    if lower.starts_with("es") || lower == "spanish" {
        "es"
    } else {
        "en"
    }
}

/// Translate a key with optional parameters
///
/// This is a re-export of rust_i18n::t! for convenience.
///
/// ```rust,ignore
/// use alcalor::i18n::t;
///
/// let msg = t!("errors.tokenization.invalid_encoding", id = 42);
/// ```
#[doc(inline)]
pub use rust_i18n::t;
