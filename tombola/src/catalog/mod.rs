//! Catalog module providing the playable numbers and the sponsor list.
//!
//! Both come from JSON feeds that are validated before they reach the game:
//! - Number entries with a non-numeric `number` are dropped, the rest sorted
//! - Sponsors without a logo are dropped, links coerced to http(s) or `"#"`
//!
//! ## Example
//!
//! ```
//! use tombola::catalog::{parse_entries, parse_sponsors};
//!
//! let entries = parse_entries(r#"{"numbers": [{"number": 2, "italian": "'A piccerella"},
//!                                             {"number": 1, "italian": "L'Italia"}]}"#).unwrap();
//! assert_eq!(entries[0].number, 1);
//!
//! let sponsors = parse_sponsors(r#"[{"logo": "bar.png", "url": "ftp://bar"}]"#).unwrap();
//! assert_eq!(sponsors[0].target_url, "#");
//! ```

pub mod errors;
pub mod feed;
pub mod models;

pub use errors::{FeedError, FeedResult};
pub use feed::{FeedSource, FileFeed, StaticFeed, parse_entries, parse_sponsors, sanitize_url};
pub use models::{Entry, PLACEHOLDER_URL, Sponsor};
