pub mod queue;

pub use queue::{ManeuverId, ManeuverQueue};

use crate::constants::{G, SAMPLE_SPACING_DEFAULT, SOFTENING_DEFAULT, SUBSTEP_DEFAULT};
use crate::errors::EngineError;
use crate::integrators::leapfrog::leapfrog_step;
use crate::models::{Body, BodyId, ExternalAccel, Maneuver, ManeuverKind, TransferPlan};
use crate::physics::gravity::{gravity_acceleration, GravitySource};
use crate::physics::orbital::OrbitElements;
use crate::tracking::{find_intercepts, Intercept, TrajectoryRecorder};
use nalgebra as na;
use std::collections::HashMap;

/// Propagation parameters, fixed at engine construction. The softening length
/// is in the caller's length units and should be scaled with the unit system
/// chosen at setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityConfig {
    pub softening: f64,
    /// Fixed internal integration sub-step for `advance`.
    pub substep: f64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        GravityConfig {
            softening: SOFTENING_DEFAULT,
            substep: SUBSTEP_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Free { generation: u32 },
    Occupied { generation: u32, row: usize },
}

/// One entry of the dense body table. `slot` is the back-reference to the
/// handle slot owning this row; it must be re-synchronized whenever rows
/// shift during compaction.
struct BodyRow {
    slot: u32,
    body: Body,
}

/// The propagation and planning context. Owns all registered bodies, the
/// maneuver queue, and the trajectory recorders; every mutation happens on
/// the caller's stack, synchronously.
pub struct OrbitalEngine {
    config: GravityConfig,
    time: f64,
    slots: Vec<Slot>,
    free: Vec<u32>,
    rows: Vec<BodyRow>,
    queue: ManeuverQueue,
    recorders: HashMap<BodyId, TrajectoryRecorder>,
}

impl Default for OrbitalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitalEngine {
    pub fn new() -> Self {
        Self::with_config(GravityConfig::default())
    }

    pub fn with_config(config: GravityConfig) -> Self {
        OrbitalEngine {
            config,
            time: 0.0,
            slots: Vec::new(),
            free: Vec::new(),
            rows: Vec::new(),
            queue: ManeuverQueue::new(),
            recorders: HashMap::new(),
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn body_count(&self) -> usize {
        self.rows.len()
    }

    // ── Registration ──

    pub fn register_body(
        &mut self,
        mass: f64,
        position: na::Vector3<f64>,
        velocity: na::Vector3<f64>,
    ) -> BodyId {
        self.insert(Body::new(mass, position, velocity))
    }

    /// Registers a body with an external acceleration source, queried once
    /// per integration sub-step.
    pub fn register_body_with_accel(
        &mut self,
        mass: f64,
        position: na::Vector3<f64>,
        velocity: na::Vector3<f64>,
        accel: ExternalAccel,
    ) -> BodyId {
        self.insert(Body::new(mass, position, velocity).with_external_accel(accel))
    }

    fn insert(&mut self, body: Body) -> BodyId {
        let row = self.rows.len();
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::Free { generation: 0 });
                (self.slots.len() - 1) as u32
            }
        };
        let generation = match self.slots[index as usize] {
            Slot::Free { generation } => generation,
            Slot::Occupied { .. } => unreachable!("free list held an occupied slot"),
        };
        self.slots[index as usize] = Slot::Occupied { generation, row };
        self.rows.push(BodyRow { slot: index, body });
        BodyId { index, generation }
    }

    /// Removes a body. The dense table compacts by shifting later rows down,
    /// so every shifted row's slot back-reference is re-indexed here. Pending
    /// maneuvers and the recording for the body are dropped with it.
    pub fn deregister_body(&mut self, id: BodyId) -> Result<(), EngineError> {
        let row = self.resolve(id)?;
        self.rows.remove(row);
        for shifted in &self.rows[row..] {
            match &mut self.slots[shifted.slot as usize] {
                Slot::Occupied { row: r, .. } => *r -= 1,
                Slot::Free { .. } => unreachable!("live row pointed at a free slot"),
            }
        }
        self.slots[id.index as usize] = Slot::Free {
            generation: id.generation + 1,
        };
        self.free.push(id.index);
        self.queue.cancel_for_body(id);
        self.recorders.remove(&id);
        Ok(())
    }

    /// Activates or deactivates a body. Inactive bodies are skipped by the
    /// propagator entirely; their state stays frozen.
    pub fn set_active(&mut self, id: BodyId, active: bool) -> Result<(), EngineError> {
        let row = self.resolve(id)?;
        self.rows[row].body.active = active;
        Ok(())
    }

    fn resolve(&self, id: BodyId) -> Result<usize, EngineError> {
        match self.slots.get(id.index as usize) {
            Some(Slot::Occupied { generation, row }) if *generation == id.generation => Ok(*row),
            _ => Err(EngineError::UnknownBody),
        }
    }

    pub fn body(&self, id: BodyId) -> Result<&Body, EngineError> {
        Ok(&self.rows[self.resolve(id)?].body)
    }

    // ── Query ──

    pub fn position(&self, id: BodyId) -> Result<na::Vector3<f64>, EngineError> {
        Ok(self.body(id)?.position)
    }

    pub fn velocity(&self, id: BodyId) -> Result<na::Vector3<f64>, EngineError> {
        Ok(self.body(id)?.velocity)
    }

    pub fn state(&self, id: BodyId) -> Result<(na::Vector3<f64>, na::Vector3<f64>), EngineError> {
        let body = self.body(id)?;
        Ok((body.position, body.velocity))
    }

    /// Orbital elements of `id` about `central`, derived from the current
    /// relative state.
    pub fn orbit_elements(
        &self,
        id: BodyId,
        central: BodyId,
    ) -> Result<OrbitElements, EngineError> {
        let body = self.body(id)?;
        let central_body = self.body(central)?;
        let r = body.position - central_body.position;
        let v = body.velocity - central_body.velocity;
        Ok(OrbitElements::from_state_vectors(&r, &v, central_body.mass))
    }

    // ── Scheduling ──

    /// Queues a maneuver. Scheduling against an unregistered body or into
    /// the past is a logic error and is rejected outright.
    pub fn schedule(&mut self, maneuver: Maneuver) -> Result<ManeuverId, EngineError> {
        self.resolve(maneuver.body)?;
        if maneuver.time < self.time {
            return Err(EngineError::ManeuverInPast {
                time: maneuver.time,
                now: self.time,
            });
        }
        Ok(self.queue.schedule(maneuver))
    }

    /// Queues every maneuver of a plan. Validation happens up front so a
    /// rejected plan schedules nothing.
    pub fn schedule_plan(&mut self, plan: TransferPlan) -> Result<Vec<ManeuverId>, EngineError> {
        for maneuver in &plan.maneuvers {
            self.resolve(maneuver.body)?;
            if maneuver.time < self.time {
                return Err(EngineError::ManeuverInPast {
                    time: maneuver.time,
                    now: self.time,
                });
            }
        }
        Ok(plan
            .maneuvers
            .into_iter()
            .map(|m| self.queue.schedule(m))
            .collect())
    }

    /// Cancels a pending maneuver. Returns whether it was still queued.
    pub fn cancel(&mut self, id: ManeuverId) -> bool {
        self.queue.cancel(id)
    }

    pub fn pending_maneuvers(&self) -> usize {
        self.queue.len()
    }

    // ── Recording ──

    pub fn start_recording(&mut self, id: BodyId) -> Result<(), EngineError> {
        self.start_recording_with_spacing(id, SAMPLE_SPACING_DEFAULT)
    }

    pub fn start_recording_with_spacing(
        &mut self,
        id: BodyId,
        min_spacing: f64,
    ) -> Result<(), EngineError> {
        self.resolve(id)?;
        self.recorders
            .insert(id, TrajectoryRecorder::new(min_spacing));
        Ok(())
    }

    pub fn stop_recording(&mut self, id: BodyId) -> bool {
        self.recorders.remove(&id).is_some()
    }

    pub fn recording(&self, id: BodyId) -> Option<&TrajectoryRecorder> {
        self.recorders.get(&id)
    }

    /// Propagates a ghost copy of `id` forward by `duration` against the
    /// current massive bodies (held frozen), sampling the predicted path into
    /// the body's recorder at future timestamps. Engine time and the body
    /// itself are untouched; as `advance` later moves simulation time past
    /// each predicted sample, the recorder prunes it.
    pub fn predict(&mut self, id: BodyId, duration: f64) -> Result<(), EngineError> {
        let row = self.resolve(id)?;
        if !self.recorders.contains_key(&id) {
            return Err(EngineError::NotRecording);
        }

        let sources = self.gravity_sources(None);
        let softening = self.config.softening;
        let h = self.config.substep;
        let steps = (duration / h).ceil().max(1.0) as usize;

        let body = &self.rows[row].body;
        let mut position = body.position;
        let mut velocity = body.velocity;
        let mut t = self.time;

        let recorder = self.recorders.get_mut(&id).expect("checked above");
        recorder.sample(position, velocity, t);
        for _ in 0..steps {
            let v0 = velocity;
            let ext = self.rows[row].body.external_accel.as_deref();
            leapfrog_step(&mut position, &mut velocity, h, |p| {
                let mut a = gravity_acceleration(p, &sources, softening);
                if let Some(f) = ext {
                    a += f(t, p, &v0);
                }
                a
            });
            t += h;
            recorder.sample(position, velocity, t);
        }
        Ok(())
    }

    /// Finds where the recorded paths of `a` and `b` cross within the given
    /// tolerances. Both bodies must be recording.
    pub fn find_intercepts(
        &self,
        a: BodyId,
        b: BodyId,
        distance_tol: f64,
        time_tol: f64,
    ) -> Result<Vec<Intercept>, EngineError> {
        let rec_a = self.recorders.get(&a).ok_or(EngineError::NotRecording)?;
        let rec_b = self.recorders.get(&b).ok_or(EngineError::NotRecording)?;
        Ok(find_intercepts(
            &rec_a.snapshot(),
            &rec_b.snapshot(),
            distance_tol,
            time_tol,
        ))
    }

    // ── Propagation ──

    /// Advances all active bodies by `dt`, splitting it into the fixed
    /// internal sub-step. Maneuvers due within a sub-step apply, in time
    /// order, strictly before that sub-step's gravity integration, so a burn
    /// is visible to the very next position update.
    pub fn advance(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let substeps = (dt / self.config.substep).ceil().max(1.0) as usize;
        let h = dt / substeps as f64;

        for _ in 0..substeps {
            self.execute_due(self.time);
            self.integrate_substep(h);
            self.time += h;
        }
        // Maneuvers landing exactly on the advance boundary take effect
        // before the next sub-step integrates
        self.execute_due(self.time);

        self.sample_recorders();
    }

    /// Applies every maneuver due at or before `t`, earliest first.
    fn execute_due(&mut self, t: f64) {
        while let Some(mut maneuver) = self.queue.pop_due(t) {
            let row = match self.resolve(maneuver.body) {
                Ok(row) => row,
                Err(_) => {
                    log::warn!(
                        "dropping maneuver for stale {} at t={:.3}",
                        maneuver.body,
                        maneuver.time
                    );
                    continue;
                }
            };
            let body = &mut self.rows[row].body;
            match maneuver.kind {
                ManeuverKind::VectorDelta(dv) => body.velocity += dv,
                ManeuverKind::ScalarDelta(dv) => {
                    let speed = body.velocity.magnitude();
                    if speed > 0.0 {
                        body.velocity += body.velocity * (dv / speed);
                    } else {
                        log::warn!(
                            "scalar burn on {} skipped: velocity direction undefined at rest",
                            maneuver.body
                        );
                    }
                }
                ManeuverKind::SetVelocity(v) => body.velocity = v,
            }
            if let Some(callback) = maneuver.on_complete.take() {
                callback(maneuver.time);
            }
        }
    }

    /// Snapshot of all active massive bodies as gravity sources, optionally
    /// excluding one row (a massive body does not attract itself).
    fn gravity_sources(&self, exclude: Option<usize>) -> Vec<GravitySource> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(i, row)| Some(*i) != exclude && row.body.active && row.body.mass > 0.0)
            .map(|(_, row)| GravitySource {
                position: row.body.position,
                mu: G * row.body.mass,
            })
            .collect()
    }

    fn integrate_substep(&mut self, h: f64) {
        let softening = self.config.softening;

        // Massive bodies first: mutual kick-drift-kick. Accelerations come
        // from a positions snapshot so the update order of the bodies within
        // the sub-step cannot bias the forces.
        let massive: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.body.active && row.body.mass > 0.0)
            .map(|(i, _)| i)
            .collect();

        if !massive.is_empty() {
            let half = 0.5 * h;
            let t0 = self.time;

            let accels: Vec<na::Vector3<f64>> = massive
                .iter()
                .map(|&i| self.massive_accel(i, t0, softening))
                .collect();
            for (&i, a) in massive.iter().zip(&accels) {
                self.rows[i].body.velocity += a * half;
            }
            for &i in &massive {
                let v = self.rows[i].body.velocity;
                self.rows[i].body.position += v * h;
            }
            let accels: Vec<na::Vector3<f64>> = massive
                .iter()
                .map(|&i| self.massive_accel(i, t0 + h, softening))
                .collect();
            for (&i, a) in massive.iter().zip(&accels) {
                self.rows[i].body.velocity += a * half;
            }
        }

        // Massless fast path: leapfrog each test body over the updated
        // massive sources. With no sources the body free-flights.
        let sources = self.gravity_sources(None);
        let t0 = self.time;
        for i in 0..self.rows.len() {
            let body = &self.rows[i].body;
            if !body.active || !body.is_test_body() {
                continue;
            }
            let mut position = body.position;
            let mut velocity = body.velocity;
            let v0 = velocity;
            let ext = body.external_accel.as_deref();
            leapfrog_step(&mut position, &mut velocity, h, |p| {
                let mut a = gravity_acceleration(p, &sources, softening);
                if let Some(f) = ext {
                    a += f(t0, p, &v0);
                }
                a
            });
            let body = &mut self.rows[i].body;
            body.position = position;
            body.velocity = velocity;
        }
    }

    /// Softened acceleration on massive body `row` from the other active
    /// massive bodies plus its external source, if any.
    fn massive_accel(&self, row: usize, t: f64, softening: f64) -> na::Vector3<f64> {
        let sources = self.gravity_sources(Some(row));
        let body = &self.rows[row].body;
        let mut a = gravity_acceleration(&body.position, &sources, softening);
        if let Some(f) = body.external_accel.as_deref() {
            a += f(t, &body.position, &body.velocity);
        }
        a
    }

    /// Once per tick: append each recorded body's post-integration state and
    /// prune samples that simulation time has passed.
    fn sample_recorders(&mut self) {
        let ids: Vec<BodyId> = self.recorders.keys().copied().collect();
        for id in ids {
            if let Ok(row) = self.resolve(id) {
                let body = &self.rows[row].body;
                let (position, velocity) = (body.position, body.velocity);
                let recorder = self.recorders.get_mut(&id).expect("key just listed");
                recorder.sample(position, velocity, self.time);
                recorder.prune(self.time);
            }
        }
    }
}
