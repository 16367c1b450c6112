//! Port controller - main entry point for running the simulation
//!
//! The controller owns every ship (in an ECS world), the docks, the gate and
//! both queues. It advances on `update(delta_ms)`:
//!
//! 1. the clock moves forward;
//! 2. due timers fire (arrivals, mid-dwell cargo exchanges);
//! 3. inbound gate crossings are paused or resumed against the gate flag;
//! 4. transitions advance and their events are handled in creation order.
//!
//! A transition with no start delay starts inside the call that launches it,
//! so a dock is closed before any other ship can look it up.

use crate::components::*;
use crate::config::PortConfig;
use crate::error::{PortError, Result};
use crate::generation::{arrival_rng, generate_port, roll_cargo, spawn_ship, PortLayout};
use crate::stage::{NullStage, Stage, VisualHandle, VisualKind};
use crate::systems::*;
use hecs::World;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

const WATER_COLOR: u32 = 0x17577E;
const BARRIER_COLOR: u32 = 0xEED202;
const BARRIER_WIDTH: f32 = 5.0;
const QUEUE_MARKER_COLOR: u32 = 0x000000;

/// Which part of a visit a transition moves the ship through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    GateIn,
    ToQueue,
    ToDock(usize),
    Departure(usize),
    Exit,
}

/// Tag carried by every controller transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub ship: ShipId,
    pub kind: LegKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Arrival,
    CargoExchange(ShipId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockState {
    pub index: usize,
    pub cargo: CargoState,
    pub admission: Admission,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLengths {
    pub empty: usize,
    pub full: usize,
}

impl QueueLengths {
    pub fn total(&self) -> usize {
        self.empty + self.full
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub serial: u32,
    pub cargo: CargoState,
    pub phase: ShipPhase,
    pub position: Vec2,
    pub dock: Option<usize>,
}

/// Serializable view of the whole port at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSnapshot {
    pub now_ms: f64,
    pub gate: Admission,
    pub docks: Vec<DockState>,
    pub queues: QueueLengths,
    pub ships: Vec<ShipSnapshot>,
    pub stats: PortStats,
}

fn queue_slot(cargo: CargoState) -> usize {
    match cargo {
        CargoState::Empty => 0,
        CargoState::Full => 1,
    }
}

/// Create a self-driving port with no renderer attached
pub fn create_port(config: PortConfig) -> Result<PortController> {
    PortController::new(config)
}

/// Main port traffic controller
pub struct PortController<S: Stage = NullStage> {
    config: PortConfig,
    /// ECS world holding every ship in the port
    world: World,
    docks: Vec<Dock>,
    gate: Gate,
    /// Indexed by `queue_slot`: empty ships, then full ships
    queues: [ShipQueue; 2],
    spawn_point: Vec2,
    gate_point: Vec2,
    exit_point: Vec2,
    tweener: Tweener<Leg>,
    timers: Timers<Task>,
    arrival_timer: Option<TimerId>,
    stage: S,
    scenery: Vec<VisualHandle>,
    dock_visuals: Vec<VisualHandle>,
    rng: StdRng,
    journal: EventJournal,
    now_ms: f64,
    next_serial: u32,
}

impl PortController<NullStage> {
    pub fn new(config: PortConfig) -> Result<Self> {
        Self::with_stage(config, NullStage::default())
    }
}

impl<S: Stage> PortController<S> {
    /// Build the port and draw its scenery on `stage`. The first ship arrives
    /// one arrival period after creation.
    pub fn with_stage(config: PortConfig, mut stage: S) -> Result<Self> {
        config.validate()?;

        let PortLayout {
            width,
            height,
            docks,
            gate,
            empty_queue,
            full_queue,
            spawn_point,
            gate_point,
            exit_point,
        } = generate_port(&config);

        let mut scenery = Vec::new();
        let water = stage.create_visual(VisualKind::Water, WATER_COLOR);
        stage.set_visual_position(water, Vec2::ZERO);
        scenery.push(water);

        let barrier_x = gate.x() - BARRIER_WIDTH;
        for y in [0.0, gate.bottom_position().y] {
            let barrier = stage.create_visual(VisualKind::GateBarrier, BARRIER_COLOR);
            stage.set_visual_position(barrier, Vec2::new(barrier_x, y));
            scenery.push(barrier);
        }

        for queue in [&empty_queue, &full_queue] {
            let marker = stage.create_visual(VisualKind::QueueMarker, QUEUE_MARKER_COLOR);
            stage.set_visual_position(marker, queue.origin());
            scenery.push(marker);
        }

        let dock_visuals = docks
            .iter()
            .map(|dock| {
                let visual = stage.create_visual(VisualKind::Dock, dock_color(dock.cargo()));
                stage.set_visual_position(visual, dock.position());
                visual
            })
            .collect();

        let mut timers = Timers::new();
        let arrival_timer = Some(timers.schedule(config.ship_arrival_period_ms, Task::Arrival));

        log::info!(
            "port {}x{} ready: {} docks, arrivals every {} ms, dwell {} ms",
            width,
            height,
            docks.len(),
            config.ship_arrival_period_ms,
            config.ship_dwell_ms
        );

        Ok(Self {
            rng: arrival_rng(config.seed),
            config,
            world: World::new(),
            docks,
            gate,
            queues: [empty_queue, full_queue],
            spawn_point,
            gate_point,
            exit_point,
            tweener: Tweener::new(),
            timers,
            arrival_timer,
            stage,
            scenery,
            dock_visuals,
            journal: EventJournal::new(),
            now_ms: 0.0,
            next_serial: 0,
        })
    }

    /// Advance the port by `delta_ms` of simulated time
    pub fn update(&mut self, delta_ms: f64) {
        if !(delta_ms > 0.0) || !delta_ms.is_finite() {
            return;
        }
        self.now_ms += delta_ms;

        self.run_timers();
        self.regulate_gate();

        for event in self.tweener.advance(delta_ms) {
            self.handle_transition(event);
        }
    }

    /// Force an arrival now, outside the regular schedule
    pub fn admit_ship(&mut self, cargo: CargoState) -> ShipId {
        self.next_serial += 1;
        let serial = self.next_serial;
        let visual = self.stage.create_visual(VisualKind::Ship, ship_color(cargo));
        self.stage.set_visual_position(visual, self.spawn_point);
        let ship = spawn_ship(&mut self.world, serial, cargo, self.spawn_point, visual);

        log::info!("ship #{} arrived {:?}", serial, cargo);
        self.record(PortEvent::Arrived { ship: serial, cargo });

        self.cross_gate_in(ship, self.config.timings.gate_in_ms);
        ship
    }

    /// Take a ship out of the simulation wherever it is.
    ///
    /// Its transitions and pending cargo exchange are cancelled, it leaves its
    /// queue, and any gate claim is released. A dock it was parking at or
    /// parked in stays closed until `release_dock` is called for it.
    pub fn remove_ship(&mut self, ship: ShipId) {
        debug_assert!(self.world.contains(ship), "ship {:?} already removed", ship);
        let voyage = match self.world.get::<&Voyage>(ship) {
            Ok(v) => (*v).clone(),
            Err(_) => {
                log::warn!("ship {:?} already removed, ignoring", ship);
                return;
            }
        };
        let serial = self.serial(ship);

        for id in [voyage.transition, voyage.exit].into_iter().flatten() {
            self.tweener.cancel(id);
        }
        if let Some(timer) = voyage.exchange_timer {
            self.timers.cancel(timer);
        }

        for q in 0..self.queues.len() {
            if self.queues[q].remove_ship(ship).is_some() {
                self.compact_queue(q);
            }
        }

        if voyage.holds_gate && self.gate.release() {
            self.record(PortEvent::GateOpened);
        }

        if let Some(dock) = voyage.dock {
            log::warn!(
                "ship #{} removed while {} at dock {}; dock stays closed",
                serial,
                voyage.phase.name(),
                dock
            );
        }
        self.record(PortEvent::Removed {
            ship: serial,
            stranded_dock: voyage.dock,
        });
        self.despawn(ship);

        // It may have been the ship an open dock was waiting for
        self.promote_waiting();
    }

    /// Reopen a closed dock that no ship holds (after a removal or a manual
    /// closure) and let a waiting ship have it.
    pub fn release_dock(&mut self, index: usize) -> Result<()> {
        self.check_dock(index)?;
        if self.dock_holder(index).is_some() {
            return Err(PortError::DockInUse { index });
        }
        if self.docks[index].is_open() {
            return Ok(());
        }

        self.docks[index].force_admission(Admission::Open);
        log::info!("dock {} released", index);
        self.record(PortEvent::DockReopened { dock: index });
        self.promote(index);
        Ok(())
    }

    /// Take a dock out of service. Ships already assigned to it are unaffected.
    pub fn close_dock(&mut self, index: usize) -> Result<()> {
        self.check_dock(index)?;
        if self.docks[index].is_open() {
            self.docks[index].force_admission(Admission::Closed);
            log::info!("dock {} closed", index);
        }
        Ok(())
    }

    /// Override the gate flag. Inbound crossings react on the next update.
    pub fn set_gate_open(&mut self, open: bool) {
        if self.gate.is_open() == open {
            return;
        }
        self.gate.set_open(open);
        self.record(if open {
            PortEvent::GateOpened
        } else {
            PortEvent::GateClosed
        });
    }

    /// Stop scheduling arrivals. Ships already in the port carry on.
    pub fn stop_arrivals(&mut self) {
        if let Some(timer) = self.arrival_timer.take() {
            self.timers.cancel(timer);
            log::info!("arrivals stopped at {} ms", self.now_ms);
        }
    }

    /// Tear the port down: cancel every timer and transition, destroy all
    /// visuals, and hand the stage back.
    pub fn shutdown(mut self) -> S {
        self.timers.clear();
        self.tweener.clear();

        let visuals: Vec<VisualHandle> = self
            .world
            .query::<&Visual>()
            .iter()
            .map(|(_, v)| v.0)
            .collect();
        for visual in visuals
            .into_iter()
            .chain(self.dock_visuals.drain(..))
            .chain(self.scenery.drain(..))
        {
            self.stage.destroy_visual(visual);
        }
        self.world.clear();

        log::info!("port shut down at {} ms", self.now_ms);
        self.stage
    }

    // ── Introspection ───────────────────────────────────────────────────

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn config(&self) -> &PortConfig {
        &self.config
    }

    pub fn dock_states(&self) -> Vec<DockState> {
        self.docks
            .iter()
            .map(|d| DockState {
                index: d.index(),
                cargo: d.cargo(),
                admission: d.admission(),
            })
            .collect()
    }

    pub fn docks(&self) -> &[Dock] {
        &self.docks
    }

    pub fn queue_lengths(&self) -> QueueLengths {
        QueueLengths {
            empty: self.queues[queue_slot(CargoState::Empty)].len(),
            full: self.queues[queue_slot(CargoState::Full)].len(),
        }
    }

    /// Queue holding ships that carry `cargo`
    pub fn queue(&self, cargo: CargoState) -> &ShipQueue {
        &self.queues[queue_slot(cargo)]
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn gate_open(&self) -> bool {
        self.gate.is_open()
    }

    /// Ships currently in the port
    pub fn active_ship_count(&self) -> usize {
        self.world.query::<&Ship>().iter().count()
    }

    /// Live ships in arrival order
    pub fn ships(&self) -> Vec<ShipId> {
        let mut ships: Vec<(u32, ShipId)> = self
            .world
            .query::<&Ship>()
            .iter()
            .map(|(id, ship)| (ship.serial(), id))
            .collect();
        ships.sort_unstable_by_key(|(serial, _)| *serial);
        ships.into_iter().map(|(_, id)| id).collect()
    }

    pub fn contains_ship(&self, ship: ShipId) -> bool {
        self.world.contains(ship)
    }

    pub fn ship_serial(&self, ship: ShipId) -> Option<u32> {
        self.world.get::<&Ship>(ship).ok().map(|s| s.serial())
    }

    pub fn ship_cargo(&self, ship: ShipId) -> Option<CargoState> {
        self.world.get::<&Ship>(ship).ok().map(|s| s.cargo())
    }

    pub fn ship_phase(&self, ship: ShipId) -> Option<ShipPhase> {
        self.world.get::<&Voyage>(ship).ok().map(|v| v.phase)
    }

    pub fn ship_position(&self, ship: ShipId) -> Option<Vec2> {
        self.world.get::<&Position>(ship).ok().map(|p| p.0)
    }

    /// Dock the ship is parking at or parked in
    pub fn ship_dock(&self, ship: ShipId) -> Option<usize> {
        self.world.get::<&Voyage>(ship).ok().and_then(|v| v.dock)
    }

    /// Cargo exchanges the ship has been through on this visit
    pub fn ship_exchanges(&self, ship: ShipId) -> Option<u32> {
        self.world.get::<&Voyage>(ship).ok().map(|v| v.exchanges)
    }

    /// Progress of the ship's current leg
    pub fn ship_progress(&self, ship: ShipId) -> Option<f32> {
        let id = self.current_transition(ship)?;
        self.tweener.progress(id)
    }

    /// True while the ship's current leg is paused (held at the gate)
    pub fn ship_paused(&self, ship: ShipId) -> bool {
        self.current_transition(ship)
            .is_some_and(|id| self.tweener.is_paused(id))
    }

    pub fn stats(&self) -> PortStats {
        self.journal.stats()
    }

    pub fn events(&self) -> impl Iterator<Item = &PortEventRecord> {
        self.journal.records()
    }

    pub fn drain_events(&mut self) -> Vec<PortEventRecord> {
        self.journal.drain()
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut S {
        &mut self.stage
    }

    pub fn snapshot(&self) -> PortSnapshot {
        let ships = self
            .ships()
            .into_iter()
            .filter_map(|id| {
                let ship = self.world.get::<&Ship>(id).ok()?;
                let voyage = self.world.get::<&Voyage>(id).ok()?;
                let position = self.world.get::<&Position>(id).ok()?;
                Some(ShipSnapshot {
                    serial: ship.serial(),
                    cargo: ship.cargo(),
                    phase: voyage.phase,
                    position: position.0,
                    dock: voyage.dock,
                })
            })
            .collect();

        PortSnapshot {
            now_ms: self.now_ms,
            gate: self.gate.admission(),
            docks: self.dock_states(),
            queues: self.queue_lengths(),
            ships,
            stats: self.stats(),
        }
    }

    /// Check the port's structural invariants. Returns one message per
    /// violation; empty means consistent.
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for dock in &self.docks {
            let holders: Vec<(ShipId, CargoState)> = self
                .world
                .query::<(&Ship, &Voyage)>()
                .iter()
                .filter(|(_, (_, v))| v.dock == Some(dock.index()))
                .map(|(id, (s, _))| (id, s.cargo()))
                .collect();
            if holders.len() > 1 {
                violations.push(format!("dock {} held by {} ships", dock.index(), holders.len()));
            }
            if !holders.is_empty() && dock.is_open() {
                violations.push(format!("dock {} is open while held", dock.index()));
            }
            for (_, cargo) in holders {
                if cargo == dock.cargo() {
                    violations.push(format!(
                        "dock {} cargo {:?} matches its ship",
                        dock.index(),
                        cargo
                    ));
                }
            }
        }

        for (id, voyage) in self.world.query::<&Voyage>().iter() {
            if voyage.dock.is_some() != voyage.phase.holds_dock() {
                violations.push(format!(
                    "ship {:?} {} with dock {:?}",
                    id,
                    voyage.phase.name(),
                    voyage.dock
                ));
            }
        }

        for queue in &self.queues {
            let cargo = queue.cargo();
            if !queue.is_empty()
                && self.docks.iter().any(|d| d.accepts(cargo))
                && self.inbound(cargo) == 0
            {
                violations.push(format!(
                    "{} {:?} ships wait while an open dock accepts them and none is inbound",
                    queue.len(),
                    cargo
                ));
            }

            for ship in queue.ships() {
                match (self.ship_cargo(ship), self.ship_phase(ship)) {
                    (Some(cargo), Some(ShipPhase::Queued)) if cargo == queue.cargo() => {}
                    (cargo, phase) => violations.push(format!(
                        "queue {:?} holds ship {:?} with cargo {:?} while {}",
                        queue.cargo(),
                        ship,
                        cargo,
                        phase.map_or("despawned", |p| p.name())
                    )),
                }
            }
        }

        let claims = self
            .world
            .query::<&Voyage>()
            .iter()
            .filter(|(_, v)| v.holds_gate)
            .count() as u32;
        if claims != self.gate.claims() {
            violations.push(format!(
                "gate has {} claims but {} ships hold it",
                self.gate.claims(),
                claims
            ));
        }

        violations
    }

    // ── Timers ──────────────────────────────────────────────────────────

    fn run_timers(&mut self) {
        while let Some((_, due_ms, task)) = self.timers.pop_due(self.now_ms) {
            match task {
                Task::Arrival => {
                    self.arrival_timer = Some(self.timers.schedule(
                        due_ms + self.config.ship_arrival_period_ms,
                        Task::Arrival,
                    ));
                    let cargo = roll_cargo(&mut self.rng, self.config.empty_probability);
                    self.admit_ship(cargo);
                }
                Task::CargoExchange(ship) => {
                    if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
                        voyage.exchange_timer = None;
                    }
                    self.exchange_cargo(ship);
                }
            }
        }
    }

    // ── Gate congestion ─────────────────────────────────────────────────

    fn regulate_gate(&mut self) {
        let mut inbound: Vec<(TransitionId, ShipId)> = self
            .world
            .query::<&Voyage>()
            .iter()
            .filter(|(_, v)| v.phase == ShipPhase::CrossingGateIn)
            .filter_map(|(ship, v)| v.transition.map(|id| (id, ship)))
            .collect();
        if inbound.is_empty() {
            return;
        }
        inbound.sort_unstable_by_key(|(id, _)| *id);

        let actions = regulate_inbound(
            &self.gate,
            &mut self.tweener,
            inbound.iter().map(|(id, _)| *id),
        );
        for action in actions {
            let (GateAction::Paused(id) | GateAction::Resumed(id)) = action;
            let Some(&(_, ship)) = inbound.iter().find(|(t, _)| *t == id) else {
                continue;
            };
            let serial = self.serial(ship);
            match action {
                GateAction::Paused(_) => {
                    log::debug!("ship #{} holding at the gate", serial);
                    self.record(PortEvent::InboundPaused { ship: serial });
                }
                GateAction::Resumed(_) => {
                    log::debug!("ship #{} resuming through the gate", serial);
                    self.record(PortEvent::InboundResumed { ship: serial });
                }
            }
        }
    }

    // ── Transitions ─────────────────────────────────────────────────────

    fn handle_transition(&mut self, event: TransitionEvent<Leg>) {
        let leg = *event.target();
        if !self.is_current(leg.ship, event.id()) {
            return;
        }

        match event {
            TransitionEvent::Started { id, .. } => self.on_leg_started(leg, id),
            TransitionEvent::Updated {
                progress, position, ..
            } => {
                self.place(leg.ship, position);
                self.on_leg_updated(leg, progress);
            }
            TransitionEvent::Completed { position, .. } => {
                self.place(leg.ship, position);
                self.on_leg_completed(leg);
            }
        }
    }

    fn on_leg_started(&mut self, leg: Leg, id: TransitionId) {
        let ship = leg.ship;
        match leg.kind {
            LegKind::ToDock(dock) => {
                self.docks[dock].set_open(false);
                if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
                    voyage.dock = Some(dock);
                }
                let serial = self.serial(ship);
                log::info!("ship #{} assigned dock {}", serial, dock);
                self.record(PortEvent::Docked { ship: serial, dock });
            }
            LegKind::Departure(dock) => {
                // The exchange must land before the dock is handed to anyone else
                let pending = self
                    .world
                    .get::<&mut Voyage>(ship)
                    .ok()
                    .and_then(|mut v| v.exchange_timer.take());
                if let Some(timer) = pending {
                    self.timers.cancel(timer);
                    self.exchange_cargo(ship);
                }

                if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
                    voyage.phase = ShipPhase::CrossingGateOut;
                    voyage.dock = None;
                }
                self.docks[dock].set_open(true);
                log::debug!("dock {} reopened", dock);
                self.record(PortEvent::DockReopened { dock });
                self.promote(dock);
            }
            LegKind::Exit => {
                if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
                    voyage.transition = Some(id);
                    voyage.exit = None;
                    voyage.phase = ShipPhase::Exiting;
                }
            }
            LegKind::GateIn | LegKind::ToQueue => {}
        }
    }

    fn on_leg_updated(&mut self, leg: Leg, progress: f32) {
        if let LegKind::Departure(_) = leg.kind {
            if progress <= OUTBOUND_CLAIM_PROGRESS {
                return;
            }
            let claimed = match self.world.get::<&mut Voyage>(leg.ship) {
                Ok(mut voyage) if !voyage.holds_gate => {
                    voyage.holds_gate = true;
                    true
                }
                _ => false,
            };
            if claimed {
                log::debug!("ship #{} claimed the gate lane", self.serial(leg.ship));
                if self.gate.claim() {
                    self.record(PortEvent::GateClosed);
                }
            }
        }
    }

    fn on_leg_completed(&mut self, leg: Leg) {
        let ship = leg.ship;
        match leg.kind {
            LegKind::GateIn => {
                self.assign_dock(ship);
                self.promote_waiting();
            }
            LegKind::ToQueue => {
                if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
                    voyage.transition = None;
                }
            }
            LegKind::ToDock(dock) => self.begin_dwell(ship, dock),
            LegKind::Departure(_) => {
                let held = match self.world.get::<&mut Voyage>(ship) {
                    Ok(mut voyage) => {
                        voyage.transition = None;
                        std::mem::replace(&mut voyage.holds_gate, false)
                    }
                    Err(_) => false,
                };
                if held && self.gate.release() {
                    log::debug!("gate lane free");
                    self.record(PortEvent::GateOpened);
                }
            }
            LegKind::Exit => {
                let serial = self.serial(ship);
                log::info!("ship #{} left the port", serial);
                self.record(PortEvent::Departed { ship: serial });
                self.despawn(ship);
            }
        }
    }

    // ── Allocation ──────────────────────────────────────────────────────

    fn cross_gate_in(&mut self, ship: ShipId, duration_ms: f64) {
        if let Some(id) = self.move_ship(ship, self.gate_point, duration_ms, LegKind::GateIn) {
            self.set_phase(ship, ShipPhase::CrossingGateIn);
            self.launch(id);
        }
    }

    /// Gate crossed: park at the first matching dock, or wait in line
    fn assign_dock(&mut self, ship: ShipId) {
        let Some(cargo) = self.ship_cargo(ship) else {
            return;
        };
        let promoted = self
            .world
            .get::<&mut Voyage>(ship)
            .map(|mut v| std::mem::replace(&mut v.promoted, false))
            .unwrap_or(false);
        match find_dock(&self.docks, cargo) {
            Some(dock) => self.park(ship, dock),
            None => self.enqueue(ship, cargo, promoted),
        }
    }

    fn park(&mut self, ship: ShipId, dock: usize) {
        let to = self.docks[dock].parking_position(Ship::footprint());
        let duration = self.config.timings.dock_ms;
        if let Some(id) = self.move_ship(ship, to, duration, LegKind::ToDock(dock)) {
            self.set_phase(ship, ShipPhase::Parking);
            // Starts synchronously: the dock is closed before this returns
            self.launch(id);
        }
    }

    /// Wait in line for a dock. A promoted ship that lost its dock goes back
    /// to the head of the line.
    fn enqueue(&mut self, ship: ShipId, cargo: CargoState, readmit: bool) {
        let q = queue_slot(cargo);
        let slot = if readmit {
            self.queues[q].readmit_ship(ship);
            0
        } else {
            self.queues[q].add_ship(ship);
            self.queues[q].len() - 1
        };
        let to = self.queues[q].slot_position(slot);

        let serial = self.serial(ship);
        log::debug!("ship #{} queued {:?} at slot {}", serial, cargo, slot);
        self.record(PortEvent::Queued {
            ship: serial,
            cargo,
            slot,
        });

        self.set_phase(ship, ShipPhase::Queued);
        if let Some(id) = self.move_ship(ship, to, self.config.timings.queue_ms, LegKind::ToQueue) {
            self.launch(id);
        }
        if readmit {
            log::debug!("ship #{} lost its dock, back at the head of the line", serial);
            self.compact_queue(q);
        }
    }

    /// Move every ship in queue `q` to its current slot
    fn compact_queue(&mut self, q: usize) {
        let duration = self.config.timings.queue_ms;
        for (ship, slot) in self.queues[q].slots() {
            if let Some(id) = self.move_ship(ship, slot, duration, LegKind::ToQueue) {
                self.launch(id);
            }
        }
    }

    /// Dock `dock` just reopened: hand it to the front of the matching queue
    fn promote(&mut self, dock: usize) {
        self.promote_front(queue_slot(served_class(&self.docks[dock])));
    }

    /// Promote from each queue until every open dock that accepts its class
    /// has a ship of that class on the way
    fn promote_waiting(&mut self) {
        for cargo in [CargoState::Empty, CargoState::Full] {
            loop {
                let open = self.docks.iter().filter(|d| d.accepts(cargo)).count();
                if open <= self.inbound(cargo) || !self.promote_front(queue_slot(cargo)) {
                    break;
                }
            }
        }
    }

    /// Send the front ship of queue `q` back through the gate if some dock
    /// would take it. Returns whether a ship was promoted.
    fn promote_front(&mut self, q: usize) -> bool {
        let Some((ship, target)) = promotion_candidate(&self.queues[q], &self.docks) else {
            return false;
        };
        self.queues[q].remove_first_ship();
        self.compact_queue(q);

        let serial = self.serial(ship);
        log::info!("ship #{} promoted toward dock {}", serial, target);
        self.record(PortEvent::Promoted {
            ship: serial,
            dock: target,
        });

        if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
            voyage.phase = ShipPhase::Promoted;
            voyage.promoted = true;
        }
        self.cross_gate_in(ship, self.config.timings.promoted_gate_in_ms);
        true
    }

    /// Ships of class `cargo` heading through the gate toward a dock lookup
    fn inbound(&self, cargo: CargoState) -> usize {
        self.world
            .query::<(&Ship, &Voyage)>()
            .iter()
            .filter(|(_, (s, v))| s.cargo() == cargo && v.phase == ShipPhase::CrossingGateIn)
            .count()
    }

    /// Parked: schedule the departure after the dwell and the cargo exchange
    /// halfway through it
    fn begin_dwell(&mut self, ship: ShipId, dock: usize) {
        let Some(from) = self.ship_position(ship) else {
            return;
        };
        let timings = self.config.timings;
        let dwell = self.config.ship_dwell_ms;

        let departure = self.tweener.create(
            Leg {
                ship,
                kind: LegKind::Departure(dock),
            },
            from,
            self.gate_point,
            timings.departure_ms,
            dwell,
        );
        let exit = self.tweener.create(
            Leg {
                ship,
                kind: LegKind::Exit,
            },
            self.gate_point,
            self.exit_point,
            timings.exit_ms,
            0.0,
        );
        self.tweener.chain(departure, exit);

        let half_dwell = dwell / 2.0;
        let exchange_timer = if half_dwell > 0.0 {
            Some(
                self.timers
                    .schedule(self.now_ms + half_dwell, Task::CargoExchange(ship)),
            )
        } else {
            None
        };

        if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
            voyage.phase = ShipPhase::Parked;
            voyage.transition = Some(departure);
            voyage.exit = Some(exit);
            voyage.exchange_timer = exchange_timer;
        }
        log::debug!("ship #{} parked at dock {}", self.serial(ship), dock);

        if exchange_timer.is_none() {
            self.exchange_cargo(ship);
        }
        self.launch(departure);
    }

    /// Swap cargo between a parked ship and its dock
    fn exchange_cargo(&mut self, ship: ShipId) {
        let Some(dock) = self.ship_dock(ship) else {
            return;
        };
        let (cargo, color) = {
            let Ok(mut s) = self.world.get::<&mut Ship>(ship) else {
                return;
            };
            let d = &mut self.docks[dock];
            if s.is_empty() {
                s.load();
                d.unload();
            } else {
                s.unload();
                d.load();
            }
            debug_assert_ne!(s.cargo(), d.cargo(), "dock {} no longer complements its ship", dock);
            (s.cargo(), s.color())
        };

        if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
            voyage.exchanges += 1;
        }
        if let Some(visual) = self.visual(ship) {
            self.stage.set_visual_color(visual, color);
        }
        let dock_visual = self.dock_visuals[dock];
        self.stage
            .set_visual_color(dock_visual, dock_color(self.docks[dock].cargo()));

        let serial = self.serial(ship);
        log::info!("ship #{} now {:?} at dock {}", serial, cargo, dock);
        self.record(PortEvent::CargoExchanged {
            ship: serial,
            dock,
            cargo,
        });
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    /// Create (but do not start) a leg from the ship's current position,
    /// replacing whatever leg it had
    fn move_ship(
        &mut self,
        ship: ShipId,
        to: Vec2,
        duration_ms: f64,
        kind: LegKind,
    ) -> Option<TransitionId> {
        let from = self.ship_position(ship)?;
        if let Some(old) = self.current_transition(ship) {
            self.tweener.cancel(old);
        }
        let id = self
            .tweener
            .create(Leg { ship, kind }, from, to, duration_ms, 0.0);
        if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
            voyage.transition = Some(id);
        }
        Some(id)
    }

    /// Play a transition, handling its start right away if it has no delay
    fn launch(&mut self, id: TransitionId) {
        if let Some(started) = self.tweener.play(id) {
            self.handle_transition(started);
        }
    }

    fn is_current(&self, ship: ShipId, id: TransitionId) -> bool {
        self.world
            .get::<&Voyage>(ship)
            .is_ok_and(|v| v.transition == Some(id) || v.exit == Some(id))
    }

    fn current_transition(&self, ship: ShipId) -> Option<TransitionId> {
        self.world.get::<&Voyage>(ship).ok().and_then(|v| v.transition)
    }

    fn set_phase(&mut self, ship: ShipId, phase: ShipPhase) {
        if let Ok(mut voyage) = self.world.get::<&mut Voyage>(ship) {
            voyage.phase = phase;
        }
    }

    fn place(&mut self, ship: ShipId, position: Vec2) {
        if let Ok(mut pos) = self.world.get::<&mut Position>(ship) {
            pos.0 = position;
        }
        if let Some(visual) = self.visual(ship) {
            self.stage.set_visual_position(visual, position);
        }
    }

    fn visual(&self, ship: ShipId) -> Option<VisualHandle> {
        self.world.get::<&Visual>(ship).ok().map(|v| v.0)
    }

    fn serial(&self, ship: ShipId) -> u32 {
        self.ship_serial(ship).unwrap_or(0)
    }

    fn despawn(&mut self, ship: ShipId) {
        if let Some(visual) = self.visual(ship) {
            self.stage.destroy_visual(visual);
        }
        let _ = self.world.despawn(ship);
    }

    fn dock_holder(&self, dock: usize) -> Option<ShipId> {
        self.world
            .query::<&Voyage>()
            .iter()
            .find(|(_, v)| v.dock == Some(dock))
            .map(|(id, _)| id)
    }

    fn check_dock(&self, index: usize) -> Result<()> {
        if index < self.docks.len() {
            Ok(())
        } else {
            Err(PortError::UnknownDock {
                index,
                count: self.docks.len(),
            })
        }
    }

    fn record(&mut self, event: PortEvent) {
        self.journal.record(self.now_ms, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::RecordingStage;

    const FRAME_MS: f64 = 1000.0 / 60.0;

    fn config() -> PortConfig {
        PortConfig {
            seed: Some(7),
            ..Default::default()
        }
    }

    /// Port whose scheduled arrivals never fire during a test
    fn quiet_port(config: PortConfig) -> PortController<RecordingStage> {
        let mut port = PortController::with_stage(config, RecordingStage::new()).unwrap();
        port.stop_arrivals();
        port
    }

    fn run(port: &mut PortController<impl Stage>, ms: f64) {
        let frames = (ms / FRAME_MS).ceil() as usize;
        for _ in 0..frames {
            port.update(FRAME_MS);
        }
    }

    fn run_until<S: Stage>(
        port: &mut PortController<S>,
        limit_ms: f64,
        mut done: impl FnMut(&PortController<S>) -> bool,
    ) -> bool {
        let mut elapsed = 0.0;
        while elapsed < limit_ms {
            if done(&*port) {
                return true;
            }
            port.update(FRAME_MS);
            elapsed += FRAME_MS;
        }
        done(&*port)
    }

    #[test]
    fn test_port_creation() {
        let port = create_port(config()).unwrap();
        assert_eq!(port.active_ship_count(), 0);
        assert_eq!(port.dock_states().len(), 4);
        assert_eq!(port.queue_lengths(), QueueLengths::default());
        assert!(port.gate_open());
        assert_eq!(port.now_ms(), 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = create_port(PortConfig {
            dock_count: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(PortError::InvalidConfig(_))));
    }

    #[test]
    fn test_scenery_drawn() {
        let port = quiet_port(config());
        let stage = port.stage();
        assert_eq!(stage.count(VisualKind::Water), 1);
        assert_eq!(stage.count(VisualKind::Dock), 4);
        assert_eq!(stage.count(VisualKind::GateBarrier), 2);
        assert_eq!(stage.count(VisualKind::QueueMarker), 2);
    }

    #[test]
    fn test_arrivals_on_period() {
        let mut port = create_port(config()).unwrap();
        port.update(7999.0);
        assert_eq!(port.stats().arrived, 0);
        port.update(1.0);
        assert_eq!(port.stats().arrived, 1);
        port.update(8000.0);
        assert_eq!(port.stats().arrived, 2);
    }

    #[test]
    fn test_large_step_catches_up_arrivals() {
        let mut port = create_port(config()).unwrap();
        port.update(24_000.0);
        assert_eq!(port.stats().arrived, 3);
    }

    #[test]
    fn test_empty_ship_gets_dock_zero() {
        // All docks full and open: an empty ship takes the lowest index
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        let ship = port.admit_ship(CargoState::Empty);
        assert_eq!(port.ship_phase(ship), Some(ShipPhase::CrossingGateIn));

        run(&mut port, 4100.0);
        assert_eq!(port.ship_phase(ship), Some(ShipPhase::Parking));
        assert_eq!(port.ship_dock(ship), Some(0));
        assert!(!port.docks()[0].is_open());
        assert!(port.docks()[1..].iter().all(|d| d.is_open()));
    }

    #[test]
    fn test_no_open_dock_enqueues() {
        for cargo in [CargoState::Empty, CargoState::Full] {
            let mut port = quiet_port(config());
            for i in 0..4 {
                port.close_dock(i).unwrap();
            }
            let before = port.queue_lengths().total();
            let ship = port.admit_ship(cargo);
            run(&mut port, 4100.0);

            assert_eq!(port.ship_phase(ship), Some(ShipPhase::Queued));
            assert_eq!(port.queue_lengths().total(), before + 1);
            assert_eq!(port.queue(cargo).first_ship(), Some(ship));
        }
    }

    #[test]
    fn test_promotion_compacts_queue() {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        for i in 0..4 {
            port.close_dock(i).unwrap();
        }
        let ships: Vec<ShipId> = (0..3).map(|_| port.admit_ship(CargoState::Empty)).collect();
        run(&mut port, 5200.0);
        assert_eq!(port.queue_lengths().empty, 3);

        let slot = ShipQueue::slot_width();
        let before: Vec<f32> = ships[1..]
            .iter()
            .map(|&s| port.queue(CargoState::Empty).available_position(s).unwrap().x)
            .collect();

        port.release_dock(2).unwrap();
        assert_eq!(port.ship_phase(ships[0]), Some(ShipPhase::CrossingGateIn));
        assert_eq!(port.queue_lengths().empty, 2);

        for (i, &s) in ships[1..].iter().enumerate() {
            let after = port.queue(CargoState::Empty).available_position(s).unwrap().x;
            assert!((before[i] - after - slot).abs() < 0.001);
        }

        // The remaining ships walk to their new slots
        run(&mut port, 1100.0);
        for &s in &ships[1..] {
            let slot_pos = port.queue(CargoState::Empty).available_position(s).unwrap();
            assert!(port.ship_position(s).unwrap().distance(&slot_pos) < 0.01);
        }
        assert_eq!(port.ship_dock(ships[0]), Some(2));
    }

    /// All docks full and closed, three empty ships waiting
    fn port_with_empty_queue() -> (PortController<RecordingStage>, Vec<ShipId>) {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        for i in 0..4 {
            port.close_dock(i).unwrap();
        }
        let ships: Vec<ShipId> = (0..3).map(|_| port.admit_ship(CargoState::Empty)).collect();
        run(&mut port, 5200.0);
        (port, ships)
    }

    #[test]
    fn test_removed_promoted_ship_hands_dock_on() {
        let (mut port, ships) = port_with_empty_queue();
        port.release_dock(2).unwrap();
        assert_eq!(port.ship_phase(ships[0]), Some(ShipPhase::CrossingGateIn));

        port.remove_ship(ships[0]);
        assert_eq!(port.ship_phase(ships[1]), Some(ShipPhase::CrossingGateIn));
        assert_eq!(port.queue_lengths().empty, 1);
        assert!(port.invariant_violations().is_empty());

        run(&mut port, 1100.0);
        assert_eq!(port.ship_dock(ships[1]), Some(2));
        assert_eq!(port.queue(CargoState::Empty).first_ship(), Some(ships[2]));
        assert_eq!(port.stats().promoted, 2);
    }

    #[test]
    fn test_promoted_ship_that_loses_its_dock_keeps_its_place() {
        let (mut port, ships) = port_with_empty_queue();
        let newcomer = port.admit_ship(CargoState::Empty);
        run(&mut port, 3200.0);
        assert!(port.ship_progress(newcomer).unwrap() > 0.75);

        // The newcomer reaches the gate first and takes dock 0
        port.release_dock(0).unwrap();
        run(&mut port, 1100.0);
        assert_eq!(port.ship_dock(newcomer), Some(0));

        let queue = port.queue(CargoState::Empty);
        assert_eq!(port.ship_phase(ships[0]), Some(ShipPhase::Queued));
        assert_eq!(queue.first_ship(), Some(ships[0]));
        assert_eq!(queue.index_of(ships[1]), Some(1));
        assert_eq!(queue.index_of(ships[2]), Some(2));
        assert!(port.invariant_violations().is_empty());

        run(&mut port, 1100.0);
        let slot = port.queue(CargoState::Empty).slot_position(0);
        assert!(port.ship_position(ships[0]).unwrap().distance(&slot) < 0.01);
    }

    #[test]
    fn test_stalled_queue_is_reported() {
        let (mut port, _) = port_with_empty_queue();
        assert!(port.invariant_violations().is_empty());

        // Open a dock behind the controller's back: nobody is sent to it
        port.docks[1].force_admission(Admission::Open);
        let violations = port.invariant_violations();
        assert_eq!(violations.len(), 1, "{:?}", violations);
        assert!(violations[0].contains("wait while an open dock accepts them"));
    }

    #[test]
    fn test_gate_pause_and_resume() {
        let mut port = quiet_port(config());
        let ship = port.admit_ship(CargoState::Empty);
        run(&mut port, 2400.0);
        let progress = port.ship_progress(ship).unwrap();
        assert!(progress > 0.5);

        port.set_gate_open(false);
        port.update(FRAME_MS);
        assert!(port.ship_paused(ship));
        let held = port.ship_position(ship).unwrap();

        run(&mut port, 3000.0);
        assert!(port.ship_paused(ship));
        assert_eq!(port.ship_position(ship), Some(held));
        assert_eq!(port.ship_phase(ship), Some(ShipPhase::CrossingGateIn));
        let paused_progress = port.ship_progress(ship).unwrap();

        port.set_gate_open(true);
        port.update(FRAME_MS);
        assert!(!port.ship_paused(ship));
        let resumed = port.ship_progress(ship).unwrap();
        assert!(resumed > paused_progress);
        assert!(resumed - paused_progress < 0.01);
    }

    #[test]
    fn test_closed_gate_does_not_stop_early_crossings() {
        let mut port = quiet_port(config());
        let ship = port.admit_ship(CargoState::Full);
        port.set_gate_open(false);
        run(&mut port, 1000.0);
        assert!(!port.ship_paused(ship));
        run(&mut port, 1500.0);
        assert!(port.ship_paused(ship));
        assert!(port.ship_progress(ship).unwrap() > 0.5);
    }

    #[test]
    fn test_full_visit_flips_cargo_once() {
        let mut port = quiet_port(config());
        let ship = port.admit_ship(CargoState::Empty);
        let dock_before = port.dock_states();

        // Gate in, park, half the dwell
        run(&mut port, 4000.0 + 4000.0 + 2600.0);
        assert_eq!(port.ship_phase(ship), Some(ShipPhase::Parked));
        assert_eq!(port.ship_cargo(ship), Some(CargoState::Full));
        assert_eq!(port.ship_exchanges(ship), Some(1));
        let dock = port.ship_dock(ship).unwrap();
        assert_eq!(port.docks()[dock].cargo(), CargoState::Empty);
        assert_ne!(dock_before[dock].cargo, port.docks()[dock].cargo());
        assert!(!port.docks()[dock].is_open());

        // Rest of the dwell: departure starts and the dock reopens
        run(&mut port, 2600.0);
        assert_eq!(port.ship_phase(ship), Some(ShipPhase::CrossingGateOut));
        assert!(port.docks()[dock].is_open());
        assert_eq!(port.ship_exchanges(ship), Some(1));

        assert!(run_until(&mut port, 20_000.0, |p| !p.contains_ship(ship)));
        assert_eq!(port.stats().departed, 1);
        assert_eq!(port.stats().exchanges, 1);
        assert_eq!(port.stage().count(VisualKind::Ship), 0);
        assert!(port.gate_open());
    }

    #[test]
    fn test_departure_claims_gate_past_half() {
        let mut port = quiet_port(config());
        let ship = port.admit_ship(CargoState::Full);
        assert!(run_until(&mut port, 30_000.0, |p| {
            p.ship_phase(ship) == Some(ShipPhase::CrossingGateOut)
        }));
        assert!(port.gate_open());

        assert!(run_until(&mut port, 5_000.0, |p| !p.gate_open()));
        assert!(port.ship_progress(ship).unwrap() > 0.5);
        assert_eq!(port.gate().claims(), 1);

        assert!(run_until(&mut port, 5_000.0, |p| {
            p.ship_phase(ship) == Some(ShipPhase::Exiting)
        }));
        assert!(port.gate_open());
        assert_eq!(port.gate().claims(), 0);
    }

    #[test]
    fn test_same_tick_arrivals_get_distinct_docks() {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        let a = port.admit_ship(CargoState::Empty);
        let b = port.admit_ship(CargoState::Empty);
        run(&mut port, 4100.0);

        assert_eq!(port.ship_dock(a), Some(0));
        assert_eq!(port.ship_dock(b), Some(1));
        assert!(port.invariant_violations().is_empty());
    }

    #[test]
    fn test_dock_closed_from_parking_to_departure() {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Empty; 4],
            ..config()
        });
        let ship = port.admit_ship(CargoState::Full);
        let mut saw_closed = false;
        let done = run_until(&mut port, 30_000.0, |p| {
            match p.ship_phase(ship) {
                Some(ShipPhase::Parking) | Some(ShipPhase::Parked) => {
                    saw_closed = true;
                    assert!(!p.docks()[0].is_open());
                }
                Some(ShipPhase::CrossingGateOut) | Some(ShipPhase::Exiting) => {
                    assert!(p.docks()[0].is_open());
                }
                _ => {}
            }
            !p.contains_ship(ship)
        });
        assert!(done);
        assert!(saw_closed);
    }

    #[test]
    fn test_removed_ship_leaves_dock_closed() {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        let ship = port.admit_ship(CargoState::Empty);
        run(&mut port, 5000.0);
        assert_eq!(port.ship_phase(ship), Some(ShipPhase::Parking));

        port.remove_ship(ship);
        assert!(!port.contains_ship(ship));
        assert_eq!(port.active_ship_count(), 0);
        assert!(!port.docks()[0].is_open());
        assert_eq!(port.stats().removed, 1);
        assert_eq!(port.stage().count(VisualKind::Ship), 0);

        // Nothing reopens it on its own
        run(&mut port, 20_000.0);
        assert!(!port.docks()[0].is_open());

        port.release_dock(0).unwrap();
        assert!(port.docks()[0].is_open());
    }

    #[test]
    fn test_release_dock_errors() {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        assert!(matches!(
            port.release_dock(9),
            Err(PortError::UnknownDock { index: 9, count: 4 })
        ));

        let ship = port.admit_ship(CargoState::Empty);
        run(&mut port, 4100.0);
        assert_eq!(port.ship_dock(ship), Some(0));
        assert!(matches!(
            port.release_dock(0),
            Err(PortError::DockInUse { index: 0 })
        ));
    }

    #[test]
    fn test_removing_queued_ship_compacts() {
        let mut port = quiet_port(config());
        for i in 0..4 {
            port.close_dock(i).unwrap();
        }
        let ships: Vec<ShipId> = (0..3).map(|_| port.admit_ship(CargoState::Full)).collect();
        run(&mut port, 5200.0);

        port.remove_ship(ships[0]);
        let queue = port.queue(CargoState::Full);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.available_position(ships[1]), Some(queue.slot_position(0)));
        assert!(port.invariant_violations().is_empty());
    }

    #[test]
    fn test_removing_outbound_ship_frees_gate() {
        let mut port = quiet_port(config());
        let ship = port.admit_ship(CargoState::Full);
        assert!(run_until(&mut port, 30_000.0, |p| !p.gate_open()));

        port.remove_ship(ship);
        assert!(port.gate_open());
        assert_eq!(port.gate().claims(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already removed")]
    fn test_double_removal_asserts() {
        let mut port = quiet_port(config());
        let ship = port.admit_ship(CargoState::Full);
        port.remove_ship(ship);
        port.remove_ship(ship);
    }

    #[test]
    fn test_zero_dwell_still_exchanges_first() {
        let mut port = quiet_port(PortConfig {
            ship_dwell_ms: 0.0,
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        let ship = port.admit_ship(CargoState::Empty);
        assert!(run_until(&mut port, 10_000.0, |p| {
            p.ship_phase(ship) == Some(ShipPhase::CrossingGateOut)
        }));
        assert_eq!(port.ship_exchanges(ship), Some(1));
        assert_eq!(port.ship_cargo(ship), Some(CargoState::Full));
        assert_eq!(port.docks()[0].cargo(), CargoState::Empty);
        assert!(port.docks()[0].is_open());
    }

    #[test]
    fn test_recoloring_on_exchange() {
        let mut port = quiet_port(PortConfig {
            dock_cargo: vec![CargoState::Full; 4],
            ..config()
        });
        let ship = port.admit_ship(CargoState::Empty);
        run(&mut port, 4000.0 + 4000.0 + 2600.0);

        let visual = port.visual(ship).unwrap();
        assert_eq!(port.stage().get(visual).unwrap().color, ship_color(CargoState::Full));
        let dock_visual = port.dock_visuals[0];
        assert_eq!(
            port.stage().get(dock_visual).unwrap().color,
            dock_color(CargoState::Empty)
        );
    }

    #[test]
    fn test_shutdown_destroys_everything() {
        let mut port = PortController::with_stage(config(), RecordingStage::new()).unwrap();
        run(&mut port, 20_000.0);
        assert!(port.active_ship_count() > 0);

        let stage = port.shutdown();
        assert_eq!(stage.live(), 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut port = create_port(config()).unwrap();
        run(&mut port, 9000.0);
        let snapshot = port.snapshot();
        assert_eq!(snapshot.ships.len(), 1);
        assert_eq!(snapshot.ships[0].serial, 1);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: PortSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.docks, snapshot.docks);
    }
}
