//! dirsort - sort the files of a directory by extension
//!
//! Classifies the immediate regular files of a directory by extension into
//! five fixed categories (documents, images, music, videos, archives) and
//! moves each into a subdirectory of the same name.

pub mod cli;
pub mod file_category;
pub mod file_organizer;
pub mod logging;
pub mod output;

pub use file_category::{Category, CategoryTable};
pub use file_organizer::{FileOutcome, MoveError, OrganizeError, OrganizeReport, Organizer};

pub use cli::{Cli, RunStatus, run};
