use std::collections::BTreeSet;

use glam::Vec3;
use groundfall_common::{BodyHandle, ColliderHandle, Pose};
use serde::{Deserialize, Serialize};
use slotmap::{Key, SlotMap};

use crate::body::{BodyDesc, BodyKind, MotionState, RigidBody};
use crate::config::WorldConfig;
use crate::contact::{self, Contact};
use crate::error::PhysicsError;
use crate::shape::{Collider, Shape};

/// An event record produced by every structural mutation.
///
/// Stepping is not logged, so the log only grows with world edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    BodyCreated { body: BodyHandle, kind: BodyKind },
    BodyRemoved { body: BodyHandle },
    ColliderAttached { collider: ColliderHandle, body: BodyHandle },
    ColliderRemoved { collider: ColliderHandle, body: BodyHandle },
}

/// Outcome of one `World::step`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub tick: u64,
    /// Contacts found in the first detection pass.
    pub contacts: usize,
    /// Detect/resolve passes actually run.
    pub iterations: u32,
    /// Deepest overlap left after resolution, zero when none.
    pub residual_penetration: f32,
    /// Classification of every dynamic body, in arena order.
    pub motion: Vec<(BodyHandle, MotionState)>,
}

impl StepReport {
    pub fn motion_of(&self, body: BodyHandle) -> Option<MotionState> {
        self.motion
            .iter()
            .find(|(handle, _)| *handle == body)
            .map(|(_, state)| *state)
    }

    pub fn all_resting(&self) -> bool {
        self.motion
            .iter()
            .all(|(_, state)| *state == MotionState::Resting)
    }
}

/// The rigid-body simulation state.
///
/// Bodies and colliders live in generational arenas, so handles held by the
/// caller stay valid across insertions and are rejected after removal.
/// Arena iteration order depends only on the sequence of operations, which
/// keeps stepping deterministic.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    bodies: SlotMap<BodyHandle, RigidBody>,
    colliders: SlotMap<ColliderHandle, Collider>,
    tick: u64,
    contacts: Vec<Contact>,
    halted: bool,
    /// Append-only log of structural mutations.
    event_log: Vec<WorldEvent>,
}

impl World {
    /// Create an empty world with default solver settings and the given gravity.
    ///
    /// `gravity` must be finite. Use [`World::with_config`] for values that
    /// come from outside the program.
    pub fn new(gravity: Vec3) -> Self {
        debug_assert!(gravity.is_finite(), "non-finite gravity {gravity}");
        Self::from_valid_config(WorldConfig::with_gravity(gravity))
    }

    /// Create an empty world from a full configuration, rejecting invalid values.
    pub fn with_config(config: WorldConfig) -> Result<Self, PhysicsError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: SlotMap::with_key(),
            colliders: SlotMap::with_key(),
            tick: 0,
            contacts: Vec::new(),
            halted: false,
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    pub fn time_step(&self) -> f32 {
        self.config.time_step
    }

    /// Number of completed steps.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// True once a step has failed; further steps are refused.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    pub fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> {
        self.colliders.iter()
    }

    /// Contacts found in the first detection pass of the last step.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn events(&self) -> &[WorldEvent] {
        &self.event_log
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Add a body. Dynamic bodies need a positive, finite mass.
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyHandle, PhysicsError> {
        let body = RigidBody::from_desc(&desc)?;
        let kind = body.kind();
        let handle = self.bodies.insert(body);
        tracing::debug!(?handle, ?kind, position = %desc.pose.position, "body created");
        self.event_log.push(WorldEvent::BodyCreated { body: handle, kind });
        Ok(handle)
    }

    /// Attach a validated shape to an existing body.
    pub fn attach_collider(
        &mut self,
        body: BodyHandle,
        shape: Shape,
    ) -> Result<ColliderHandle, PhysicsError> {
        if !self.bodies.contains_key(body) {
            return Err(PhysicsError::UnknownBody(body));
        }
        shape.validate()?;
        let kind = shape.kind_name();
        let collider = self.colliders.insert(Collider { shape, body });
        if let Some(owner) = self.bodies.get_mut(body) {
            owner.colliders.push(collider);
        }
        tracing::debug!(?collider, ?body, shape = kind, "collider attached");
        self.event_log
            .push(WorldEvent::ColliderAttached { collider, body });
        Ok(collider)
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<Collider, PhysicsError> {
        let collider = self
            .colliders
            .remove(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?;
        if let Some(owner) = self.bodies.get_mut(collider.body) {
            owner.colliders.retain(|c| *c != handle);
        }
        tracing::debug!(collider = ?handle, body = ?collider.body, "collider removed");
        self.event_log.push(WorldEvent::ColliderRemoved {
            collider: handle,
            body: collider.body,
        });
        Ok(collider)
    }

    /// Remove a body together with every collider attached to it.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody, PhysicsError> {
        let owned = self
            .bodies
            .get(handle)
            .ok_or(PhysicsError::UnknownBody(handle))?
            .colliders
            .clone();
        for collider in owned {
            self.remove_collider(collider)?;
        }
        let body = self
            .bodies
            .remove(handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        tracing::debug!(?handle, "body removed");
        self.event_log.push(WorldEvent::BodyRemoved { body: handle });
        Ok(body)
    }

    pub fn body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.bodies
            .get(handle)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    pub fn collider(&self, handle: ColliderHandle) -> Result<&Collider, PhysicsError> {
        self.colliders
            .get(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))
    }

    /// Snapshot of a body's pose after the last completed step.
    pub fn body_pose(&self, handle: BodyHandle) -> Result<Pose, PhysicsError> {
        self.body(handle).map(RigidBody::pose)
    }

    /// Change a dynamic body's velocity by `impulse / mass`. Fixed bodies ignore it.
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        let inv_mass = body.inv_mass();
        body.add_velocity(impulse * inv_mass);
        Ok(())
    }

    /// Signed separation between two colliders' shapes, negative when overlapping.
    pub fn separation(
        &self,
        a: ColliderHandle,
        b: ColliderHandle,
    ) -> Result<Option<f32>, PhysicsError> {
        let ca = self.collider(a)?;
        let cb = self.collider(b)?;
        let pose_a = self.body_pose(ca.body)?;
        let pose_b = self.body_pose(cb.body)?;
        Ok(contact::separation(&ca.shape, &pose_a, &cb.shape, &pose_b).map(|s| s.distance))
    }

    /// Advance every dynamic body by one fixed time step.
    ///
    /// Gravity and semi-implicit Euler integration first, then up to
    /// `solver_iterations` passes of contact detection and resolution. A
    /// non-finite body state halts the world.
    pub fn step(&mut self) -> Result<StepReport, PhysicsError> {
        if self.halted {
            return Err(PhysicsError::Halted);
        }
        let _span = tracing::trace_span!("world_step", tick = self.tick + 1).entered();

        let gravity = self.config.gravity;
        let dt = self.config.time_step;
        for body in self.bodies.values_mut() {
            body.integrate(gravity, dt);
        }

        let mut touched = BTreeSet::new();
        let mut iterations = 0;
        self.contacts.clear();
        for pass in 0..self.config.solver_iterations {
            let contacts = self.detect_contacts();
            if contacts.is_empty() {
                break;
            }
            iterations += 1;
            for c in &contacts {
                self.resolve(c);
                touched.insert(c.body_a);
                touched.insert(c.body_b);
            }
            if pass == 0 {
                self.contacts = contacts;
            }
        }

        if let Some((handle, _)) = self.bodies.iter().find(|(_, b)| !b.is_finite()) {
            self.halted = true;
            tracing::error!(?handle, tick = self.tick, "non-finite body state, halting simulation");
            return Err(PhysicsError::NonFinite(handle));
        }

        let residual = self.detect_contacts();
        let residual_penetration = residual.iter().map(|c| c.depth).fold(0.0, f32::max);
        let tolerance = self.config.resting_tolerance;
        let motion: Vec<_> = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(handle, _)| {
                let deepest = residual
                    .iter()
                    .filter(|c| c.body_a == handle || c.body_b == handle)
                    .map(|c| c.depth)
                    .fold(0.0, f32::max);
                let state = if touched.contains(&handle) && deepest <= tolerance {
                    MotionState::Resting
                } else {
                    MotionState::FreeFalling
                };
                (handle, state)
            })
            .collect();

        self.tick += 1;
        tracing::trace!(
            contacts = self.contacts.len(),
            iterations,
            residual_penetration,
            "step complete"
        );

        Ok(StepReport {
            tick: self.tick,
            contacts: self.contacts.len(),
            iterations,
            residual_penetration,
            motion,
        })
    }

    /// All overlapping collider pairs on distinct bodies with at least one dynamic side.
    fn detect_contacts(&self) -> Vec<Contact> {
        let entries: Vec<(ColliderHandle, &Collider)> = self.colliders.iter().collect();
        let mut contacts = Vec::new();
        for (i, (handle_a, ca)) in entries.iter().enumerate() {
            for (handle_b, cb) in &entries[i + 1..] {
                if ca.body == cb.body {
                    continue;
                }
                let (Some(body_a), Some(body_b)) = (self.bodies.get(ca.body), self.bodies.get(cb.body))
                else {
                    continue;
                };
                if !body_a.is_dynamic() && !body_b.is_dynamic() {
                    continue;
                }
                let Some(sep) =
                    contact::separation(&ca.shape, &body_a.pose(), &cb.shape, &body_b.pose())
                else {
                    continue;
                };
                if sep.distance < 0.0 {
                    contacts.push(Contact {
                        collider_a: *handle_a,
                        collider_b: *handle_b,
                        body_a: ca.body,
                        body_b: cb.body,
                        normal: sep.normal,
                        depth: -sep.distance,
                    });
                }
            }
        }
        contacts
    }

    /// Push the pair apart by inverse mass and remove their approaching
    /// normal velocity. No restitution.
    fn resolve(&mut self, contact: &Contact) {
        let (Some(a), Some(b)) = (self.bodies.get(contact.body_a), self.bodies.get(contact.body_b))
        else {
            return;
        };
        let inv_a = a.inv_mass();
        let inv_b = b.inv_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum <= 0.0 {
            return;
        }
        let n = contact.normal;
        let correction = n * (contact.depth * self.config.position_correction / inv_sum);
        let approach = (b.linear_velocity() - a.linear_velocity()).dot(n);
        let impulse = if approach < 0.0 { -approach / inv_sum } else { 0.0 };

        if let Some(a) = self.bodies.get_mut(contact.body_a) {
            a.translate(-correction * inv_a);
            a.add_velocity(-n * (impulse * inv_a));
        }
        if let Some(b) = self.bodies.get_mut(contact.body_b) {
            b.translate(correction * inv_b);
            b.add_velocity(n * (impulse * inv_b));
        }
    }

    /// Deterministic hash of the simulation state for replay comparison.
    /// Covers tick and every body's kind, pose, and velocities in arena order.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for (handle, body) in &self.bodies {
            mix(&mut h, &handle.data().as_ffi().to_le_bytes());
            mix(&mut h, &[body.is_dynamic() as u8]);
            let pose = body.pose();
            let values = pose
                .position
                .to_array()
                .into_iter()
                .chain(pose.orientation.to_array())
                .chain(body.linear_velocity().to_array())
                .chain(body.angular_velocity().to_array());
            for v in values {
                mix(&mut h, &v.to_le_bytes());
            }
        }
        h
    }
}
