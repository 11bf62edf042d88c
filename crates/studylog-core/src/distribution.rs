use crate::model::{ActivityDistribution, Category, TimeEntry};

const MS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bucket {
    Study,
    Rest,
    Other,
}

pub fn bucket_for(category: Category) -> Bucket {
    match category {
        Category::Study => Bucket::Study,
        Category::Exercise => Bucket::Rest,
        Category::Work | Category::Other => Bucket::Other,
    }
}

/// Timer hours folded into distribution buckets. `sleep` is left at zero;
/// sleep has no timer and is filled from the sleep metric by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimerTotals {
    pub distribution: ActivityDistribution,
    pub study_hours: f64,
    pub timer_hours: f64,
}

impl TimerTotals {
    pub fn record(&mut self, entry: &TimeEntry) {
        let hours = entry.recorded_ms() as f64 / MS_PER_HOUR;
        self.timer_hours += hours;
        match bucket_for(entry.category) {
            Bucket::Study => {
                self.distribution.study += hours;
                self.study_hours += hours;
            }
            Bucket::Rest => self.distribution.rest += hours,
            Bucket::Other => self.distribution.other += hours,
        }
    }
}

pub fn fold_entries<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> TimerTotals {
    let mut totals = TimerTotals::default();
    for entry in entries {
        totals.record(entry);
    }
    totals
}
