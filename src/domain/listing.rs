use serde::Serialize;

use crate::model::{DayGroup, Submission};

/// Page selection over the flattened listing, both values start at 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Values below 1 are raised to 1
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE, Self::DEFAULT_LIMIT)
    }
}

/// One page of the date-grouped listing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPage {
    pub submissions: Vec<DayGroup>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total_records: u64,
}

/// Paginate day groups over their flattened records.
///
/// `groups` must be sorted newest day first, each list oldest record first,
/// which is what [`crate::repo::SubmissionStore::grouped_by_day`] returns.
/// Every list is reversed so the flattened sequence runs newest to oldest,
/// the page is sliced out of that sequence and regrouped by day.
pub fn paginate(groups: Vec<DayGroup>, request: PageRequest) -> SubmissionPage {
    let flattened: Vec<(String, Submission)> = groups
        .into_iter()
        .flat_map(|group| {
            let date = group.date;
            group
                .list
                .into_iter()
                .rev()
                .map(move |submission| (date.clone(), submission))
        })
        .collect();

    let total_records = flattened.len() as u64;
    let total_pages = total_records.div_ceil(request.limit());

    let skip = usize::try_from(request.offset()).unwrap_or(usize::MAX);
    let take = usize::try_from(request.limit()).unwrap_or(usize::MAX);

    let mut submissions: Vec<DayGroup> = Vec::new();
    for (date, submission) in flattened.into_iter().skip(skip).take(take) {
        match submissions.last_mut() {
            Some(group) if group.date == date => group.list.push(submission),
            _ => submissions.push(DayGroup {
                date,
                list: vec![submission],
            }),
        }
    }

    SubmissionPage {
        submissions,
        total_pages,
        current_page: request.page(),
        total_records,
    }
}
