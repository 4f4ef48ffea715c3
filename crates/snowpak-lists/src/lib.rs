//! Load list and sound list formats.
//!
//! - [`load_list`] - the dependency-ordered `pak.load_list` format, its
//!   ordering checks and the canonical list for `initial.pak`
//! - [`sound_list`] - the `.sound_list` name table
//!
//! # Example
//!
//! ```no_run
//! use snowpak_lists::LoadList;
//!
//! let list = LoadList::read_file("pak.load_list")?;
//! for warning in list.validate_ordering() {
//!     println!("{warning}");
//! }
//! # Ok::<(), snowpak_lists::Error>(())
//! ```

mod error;
pub mod load_list;
pub mod sound_list;

pub use error::{Error, Result};
pub use load_list::{
    AssetEntry, EntryKind, EntryType, LoadList, LoadListEntry, LoadListSummary, OrderingIssue,
    OrderingWarning, LOAD_LIST_NAME,
};
pub use sound_list::{read_sound_list, read_sound_list_file, write_sound_list, write_sound_list_file};
