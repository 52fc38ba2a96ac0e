//! Field normalizers and locale vocabulary for bank statements.

pub mod amounts;
pub mod category;
pub mod dates;
pub mod description;
pub mod patterns;
pub mod vocabulary;

pub use amounts::{is_amount, normalize_amount};
pub use category::classify;
pub use dates::{is_date, normalize_date};
pub use description::{normalize_description, DESCRIPTION_MAX_CHARS};
pub use vocabulary::UNKNOWN_BANK;
