/*!
 * Glossary term preservation.
 *
 * Terms listed in the glossary must survive translation untouched. Before a
 * text is sent to a provider every whole-word, case-insensitive occurrence of a
 * term is swapped for a placeholder token; after translation the tokens are
 * swapped back for the exact original substrings.
 *
 * - `terms`: normalized, longest-first term sets
 * - `guard`: the protect/restore engine
 * - `placeholder`: collision-free placeholder tokens
 * - `defaults`: the built-in preserve list
 * - `loader`: reading terms from text and JSON glossary files
 */

pub mod defaults;
pub mod guard;
pub mod loader;
pub mod placeholder;
pub mod terms;

pub use self::defaults::DEFAULT_PRESERVE_TERMS;
pub use self::guard::{Placeholders, ProtectedText, TermGuard};
pub use self::loader::{load_terms, load_terms_from_file};
pub use self::terms::TermSet;
