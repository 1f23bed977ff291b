/// A mutation waiting for the next commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// Replace the count with an absolute value.
    Set(u64),
    /// Shift the count by `delta`, never ending below `floor`.
    ///
    /// Every single add clamps at zero. Folding them keeps that behaviour:
    /// `max(max(x + a, f) + b, 0) == max(x + a + b, max(f + b, 0))`.
    Add { delta: i64, floor: u64 },
}

impl Pending {
    pub fn apply(self, base: u64) -> u64 {
        match self {
            Pending::Set(value) => value,
            Pending::Add { delta, floor } => base.saturating_add_signed(delta).max(floor),
        }
    }

    fn then_add(self, delta: i64) -> Pending {
        match self {
            Pending::Set(value) => Pending::Set(value.saturating_add_signed(delta)),
            Pending::Add { delta: d, floor } => {
                let floor = floor.saturating_add_signed(delta);
                let delta = d.saturating_add(delta);
                // base + delta >= delta for any base, so a floor at or under
                // delta never applies
                let floor = match i64::try_from(floor) {
                    Ok(f) if f <= delta => 0,
                    _ => floor,
                };
                Pending::Add { delta, floor }
            }
        }
    }
}

/// A count held by the cache: the value last read from the store (if it has
/// been read yet) plus whatever mutation is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Count {
    stored: Option<u64>,
    pending: Option<Pending>,
}

impl Count {
    /// A count whose stored value is already known.
    pub fn loaded(stored: u64) -> Self {
        Count {
            stored: Some(stored),
            pending: None,
        }
    }

    /// A count whose stored value has not been read yet.
    pub fn unloaded() -> Self {
        Count::default()
    }

    pub fn increment(&mut self, n: u64) {
        self.add(i64::try_from(n).unwrap_or(i64::MAX));
    }

    pub fn decrement(&mut self, n: u64) {
        self.add(i64::try_from(n).map(|n| -n).unwrap_or(-i64::MAX));
    }

    pub fn add(&mut self, delta: i64) {
        let next = match self.pending {
            Some(pending) => pending.then_add(delta),
            None => Pending::Add { delta, floor: 0 },
        };
        self.pending = Some(next);
    }

    /// Replace any pending mutation with an absolute value.
    pub fn set(&mut self, value: u64) {
        self.pending = Some(Pending::Set(value));
    }

    /// Current logical value, if it can be known without reading the store.
    pub fn value(&self) -> Option<u64> {
        match (self.stored, self.pending) {
            (_, Some(Pending::Set(value))) => Some(value),
            (Some(base), Some(pending)) => Some(pending.apply(base)),
            (Some(base), None) => Some(base),
            (None, _) => None,
        }
    }

    pub fn stored(&self) -> Option<u64> {
        self.stored
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn is_dirty(&self) -> bool {
        self.pending.is_some()
    }

    /// Record the store's value when it was not known yet.
    pub(crate) fn fill(&mut self, stored: u64) -> u64 {
        *self.stored.get_or_insert(stored)
    }

    /// The store now holds `value`; nothing is pending anymore.
    pub(crate) fn mark_committed(&mut self, value: u64) {
        self.stored = Some(value);
        self.pending = None;
    }
}
