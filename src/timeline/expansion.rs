use std::collections::HashMap;

/// Expanded/collapsed flags for the timeline view.
///
/// Buckets are addressed by their position in the current grouping: a date
/// index, a (date, time) pair, or a (date, time, place) triple. Every bucket
/// starts expanded. Flags are keyed by position, not by label, so they
/// follow the slot rather than the bucket when the grouping changes shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldState {
    dates: HashMap<usize, bool>,
    times: HashMap<(usize, usize), bool>,
    places: HashMap<(usize, usize, usize), bool>,
}

impl FoldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_date_expanded(&self, date: usize) -> bool {
        self.dates.get(&date).copied().unwrap_or(true)
    }

    pub fn is_time_expanded(&self, date: usize, time: usize) -> bool {
        self.times.get(&(date, time)).copied().unwrap_or(true)
    }

    pub fn is_place_expanded(&self, date: usize, time: usize, place: usize) -> bool {
        self.places.get(&(date, time, place)).copied().unwrap_or(true)
    }

    /// Flips a date bucket and returns its new state.
    pub fn toggle_date(&mut self, date: usize) -> bool {
        flip(&mut self.dates, date)
    }

    /// Flips a time bucket and returns its new state.
    pub fn toggle_time(&mut self, date: usize, time: usize) -> bool {
        flip(&mut self.times, (date, time))
    }

    /// Flips a place bucket and returns its new state.
    pub fn toggle_place(&mut self, date: usize, time: usize, place: usize) -> bool {
        flip(&mut self.places, (date, time, place))
    }
}

fn flip<K: std::hash::Hash + Eq>(flags: &mut HashMap<K, bool>, key: K) -> bool {
    let expanded = flags.entry(key).or_insert(true);
    *expanded = !*expanded;
    *expanded
}
