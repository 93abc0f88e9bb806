mod day_key;
mod listing;
mod ui_flag;

pub use day_key::{now, DayKey};
pub use listing::{paginate, PageRequest, SubmissionPage};
pub use ui_flag::UiFlag;
