use crate::models::Maneuver;

/// Handle to a scheduled maneuver, usable to cancel it before it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManeuverId(u64);

#[derive(Debug)]
struct Entry {
    id: ManeuverId,
    maneuver: Maneuver,
}

/// Time-ordered pending velocity edits. Insertion keeps ascending time order;
/// equal times keep scheduling order, so `pop_due` drains strictly in the
/// order the maneuvers must apply.
#[derive(Debug, Default)]
pub struct ManeuverQueue {
    entries: Vec<Entry>,
    next_id: u64,
}

impl ManeuverQueue {
    pub fn new() -> Self {
        ManeuverQueue {
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Inserts preserving ascending time order.
    pub fn schedule(&mut self, maneuver: Maneuver) -> ManeuverId {
        let id = ManeuverId(self.next_id);
        self.next_id += 1;

        // Upper bound: first entry strictly later than the new time, so equal
        // times stay in scheduling order.
        let at = self
            .entries
            .partition_point(|entry| entry.maneuver.time <= maneuver.time);
        self.entries.insert(at, Entry { id, maneuver });
        id
    }

    /// Removes a pending maneuver. Returns whether it was still queued.
    pub fn cancel(&mut self, id: ManeuverId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(at) => {
                self.entries.remove(at);
                true
            }
            None => false,
        }
    }

    /// Drops every pending maneuver against `body`, returning how many were
    /// removed.
    pub fn cancel_for_body(&mut self, body: crate::models::BodyId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.maneuver.body != body);
        before - self.entries.len()
    }

    /// Takes the next maneuver due at or before `now`, earliest first.
    pub fn pop_due(&mut self, now: f64) -> Option<Maneuver> {
        if self
            .entries
            .first()
            .is_some_and(|entry| entry.maneuver.time <= now)
        {
            Some(self.entries.remove(0).maneuver)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time of the next pending maneuver, if any.
    pub fn next_time(&self) -> Option<f64> {
        self.entries.first().map(|entry| entry.maneuver.time)
    }
}
