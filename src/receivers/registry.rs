use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::summary::{LinkSummary, SummaryContext};
use crate::backend::types::ProfileResponse;
use crate::coverage::UnitKey;
use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ReceiverId(Uuid);

impl ReceiverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReceiverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReceiverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ReceiverId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReceiverEntry {
    pub id: ReceiverId,
    pub position: GeoPoint,
    pub selected: bool,
    /// `None` while the first summary is still being computed.
    pub summary: Option<LinkSummary>,
    #[serde(skip)]
    revision: u64,
}

/// Handed out whenever an entry needs an asynchronous elevation lookup. The
/// result is only written back if no newer computation was started for the
/// same entry in the meantime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryTicket {
    pub id: ReceiverId,
    pub position: GeoPoint,
    revision: u64,
}

#[derive(Debug, Default)]
pub struct ReceiverRegistry {
    entries: Vec<ReceiverEntry>,
    next_revision: u64,
}

impl ReceiverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReceiverEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ReceiverId) -> Option<&ReceiverEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn selected(&self) -> Option<&ReceiverEntry> {
        self.entries.iter().find(|e| e.selected)
    }

    fn bump(&mut self) -> u64 {
        self.next_revision += 1;
        self.next_revision
    }

    /// Appends a pending receiver and makes it the only selected one.
    pub fn add(&mut self, position: GeoPoint) -> SummaryTicket {
        let revision = self.bump();
        for entry in &mut self.entries {
            entry.selected = false;
        }
        let entry = ReceiverEntry {
            id: ReceiverId::new(),
            position,
            selected: true,
            summary: None,
            revision,
        };
        let ticket = SummaryTicket {
            id: entry.id,
            position,
            revision,
        };
        self.entries.push(entry);
        ticket
    }

    /// Removes the entry. The returned entry tells the caller whether the
    /// selection was lost along with it.
    pub fn remove(&mut self, id: ReceiverId) -> Option<ReceiverEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Selects exactly `id`. Unknown ids leave the selection untouched.
    pub fn select(&mut self, id: ReceiverId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for entry in &mut self.entries {
            entry.selected = entry.id == id;
        }
        true
    }

    /// Re-derives every summary against `ctx`. Known elevations are carried
    /// over; entries still lacking one get a ticket for a fresh lookup.
    /// Path-profile data survives only when `keep_path_data` is set.
    pub fn recompute_all(
        &mut self,
        ctx: &SummaryContext<'_>,
        keep_path_data: bool,
    ) -> Vec<SummaryTicket> {
        let mut tickets = Vec::new();
        for index in 0..self.entries.len() {
            let revision = self.bump();
            let entry = &mut self.entries[index];
            let mut summary = LinkSummary::derive(ctx, entry.position);
            if let Some(previous) = &entry.summary {
                summary.elevation_m = previous.elevation_m;
                if keep_path_data {
                    summary.keep_path_data(previous);
                }
            }
            entry.revision = revision;
            if summary.elevation_m.is_none() {
                tickets.push(SummaryTicket {
                    id: entry.id,
                    position: entry.position,
                    revision,
                });
            }
            entry.summary = Some(summary);
        }
        tickets
    }

    /// Writes the outcome of a ticket's elevation lookup. Returns `false` if
    /// the entry is gone or a newer computation superseded the ticket.
    pub fn complete(
        &mut self,
        ticket: &SummaryTicket,
        ctx: &SummaryContext<'_>,
        elevation_m: Option<f64>,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == ticket.id) else {
            return false;
        };
        if entry.revision != ticket.revision {
            return false;
        }

        let mut summary = LinkSummary::derive(ctx, entry.position);
        summary.elevation_m = elevation_m;
        if let Some(previous) = &entry.summary {
            summary.keep_path_data(previous);
            if summary.elevation_m.is_none() {
                summary.elevation_m = previous.elevation_m;
            }
        }
        entry.summary = Some(summary);
        true
    }

    /// Re-evaluates the pending flag for a new display unit. No lookups.
    pub fn refresh_pending(&mut self, unit: UnitKey) {
        for summary in self.entries.iter_mut().filter_map(|e| e.summary.as_mut()) {
            summary.refresh_pending(unit);
        }
    }

    pub fn apply_profile(
        &mut self,
        id: ReceiverId,
        profile: &ProfileResponse,
        ctx: &SummaryContext<'_>,
    ) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let position = entry.position;
        let summary = entry
            .summary
            .get_or_insert_with(|| LinkSummary::derive(ctx, position));
        summary.apply_profile(profile, ctx.unit);
        true
    }
}
