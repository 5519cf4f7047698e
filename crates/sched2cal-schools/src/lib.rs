//! School portal clients.
//!
//! Each supported school implements [`SchoolPortal`]: log in, list the terms
//! the student can pick, and scrape that term's timetable into
//! [`ScheduleEntry`] values.

pub mod entry;
mod html;
pub mod huflit;
pub mod portal;
pub mod sgu;

pub use entry::{Credentials, ScheduleEntry, SemesterOptions, SemesterSelection};
pub use huflit::HuflitPortal;
pub use portal::{School, SchoolPortal};
pub use sgu::SguPortal;
