mod submission;

pub use submission::{DayGroup, Submission, SubmissionFields};
