//! In-memory [`MonitorStore`] for unit tests.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use crate::access::{AccessRequest, RequestStatus};
use crate::city::City;
use crate::ponding_point::PondingPoint;
use crate::spell::{Spell, SpellStatus};
use crate::store::{Conflict, MonitorStore, WriteBatch, WriteOp};

/// 2024-07-`day` `hour`:00 local time.
pub(crate) fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Local
        .with_ymd_and_hms(2024, 7, day, hour, 0, 0)
        .unwrap()
        .with_timezone(&Utc)
}

#[derive(Debug, Clone, Default)]
struct State {
    cities: Vec<City>,
    points: BTreeMap<String, PondingPoint>,
    spells: Vec<Spell>,
    requests: Vec<AccessRequest>,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: RefCell<State>,
    /// Successful commits so far.
    pub commits: Cell<usize>,
    /// When set, every commit fails as if the store were unreachable.
    pub offline: Cell<bool>,
}

impl MemoryStore {
    pub fn with_points(points: Vec<PondingPoint>) -> Self {
        let store = MemoryStore::default();
        store
            .state
            .borrow_mut()
            .points
            .extend(points.into_iter().map(|p| (p.id.clone(), p)));
        store
    }

    pub fn point(&self, id: &str) -> PondingPoint {
        self.state.borrow().points[id].clone()
    }

    pub fn spells(&self) -> Vec<Spell> {
        self.state.borrow().spells.clone()
    }
}

pub(crate) fn point(id: &str, name: &str, city: &str, current_spell: f64, ponding: f64) -> PondingPoint {
    PondingPoint {
        id: id.to_string(),
        name: name.to_string(),
        city_name: city.to_string(),
        current_spell,
        max_spell_rainfall: current_spell,
        cleared_in_time: String::new(),
        ponding,
        is_raining: current_spell > 0.0,
        daily_max_spell: current_spell,
        updated_at: None,
    }
}

fn apply(state: &mut State, op: WriteOp) -> anyhow::Result<()> {
    match op {
        WriteOp::InsertCity(city) => state.cities.push(city),
        WriteOp::PutPoint(point) => {
            state.points.insert(point.id.clone(), point);
        }
        WriteOp::DeletePoint { id } => {
            state.points.remove(&id);
        }
        WriteOp::InsertSpell(spell) => {
            if state
                .spells
                .iter()
                .any(|s| s.city_name == spell.city_name && s.is_active())
            {
                return Err(Conflict(format!("active spell exists for {}", spell.city_name)).into());
            }
            state.spells.push(spell);
        }
        WriteOp::CompleteSpell {
            id,
            end_time,
            spell_data,
        } => {
            let spell = state
                .spells
                .iter_mut()
                .find(|s| s.id == id && s.is_active())
                .ok_or_else(|| Conflict(format!("spell {id} is not active")))?;
            spell.status = SpellStatus::Completed;
            spell.end_time = Some(end_time);
            spell.spell_data = spell_data;
        }
        WriteOp::InsertAccessRequest(request) => state.requests.push(request),
    }
    Ok(())
}

impl MonitorStore for MemoryStore {
    fn list_cities(&self) -> anyhow::Result<Vec<City>> {
        let mut cities = self.state.borrow().cities.clone();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    fn find_city(&self, name: &str) -> anyhow::Result<Option<City>> {
        Ok(self
            .state
            .borrow()
            .cities
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    fn list_points(&self, city_name: &str) -> anyhow::Result<Vec<PondingPoint>> {
        let mut points: Vec<PondingPoint> = self
            .state
            .borrow()
            .points
            .values()
            .filter(|p| p.city_name == city_name)
            .cloned()
            .collect();
        points.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(points)
    }

    fn get_point(&self, id: &str) -> anyhow::Result<Option<PondingPoint>> {
        Ok(self.state.borrow().points.get(id).cloned())
    }

    fn find_active_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>> {
        Ok(self
            .state
            .borrow()
            .spells
            .iter()
            .find(|s| s.city_name == city_name && s.is_active())
            .cloned())
    }

    fn latest_completed_spell(&self, city_name: &str) -> anyhow::Result<Option<Spell>> {
        Ok(self
            .state
            .borrow()
            .spells
            .iter()
            .filter(|s| s.city_name == city_name && s.status == SpellStatus::Completed)
            .max_by_key(|s| s.end_time)
            .cloned())
    }

    fn find_pending_request(&self, email: &str) -> anyhow::Result<Option<AccessRequest>> {
        Ok(self
            .state
            .borrow()
            .requests
            .iter()
            .find(|r| r.email == email && r.status == RequestStatus::Pending)
            .cloned())
    }

    fn pending_requests(&self) -> anyhow::Result<Vec<AccessRequest>> {
        let mut pending: Vec<AccessRequest> = self
            .state
            .borrow()
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.requested_at);
        Ok(pending)
    }

    fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        if self.offline.get() {
            anyhow::bail!("store unreachable");
        }
        let mut next = self.state.borrow().clone();
        for op in batch {
            apply(&mut next, op)?;
        }
        *self.state.borrow_mut() = next;
        self.commits.set(self.commits.get() + 1);
        Ok(())
    }
}
