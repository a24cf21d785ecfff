use std::collections::BTreeMap;

use groundfall_common::{BodyHandle, Pose};
use groundfall_kernel::{PhysicsError, StepReport, World};

/// Receiver of body poses, typically a set of visual transforms.
///
/// Sinks only see pose copies, so they cannot mutate the world.
pub trait PoseSink {
    /// Identifies the visual object a body drives.
    type Key;

    /// Overwrite the visual transform for `key` with `pose`.
    fn apply_pose(&mut self, key: &Self::Key, pose: Pose);
}

/// Counters from one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub applied: usize,
    /// Bindings removed because their body no longer exists.
    pub dropped: usize,
}

/// Maps bodies to visual keys and copies poses across once per frame.
#[derive(Debug, Clone)]
pub struct SyncBridge<K> {
    bindings: Vec<(BodyHandle, K)>,
}

impl<K> Default for SyncBridge<K> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<K> SyncBridge<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive `key` from `body`. A body may drive several keys.
    pub fn bind(&mut self, body: BodyHandle, key: K) {
        self.bindings.push((body, key));
    }

    /// Remove every binding for `body`, returning their keys.
    pub fn unbind(&mut self, body: BodyHandle) -> Vec<K> {
        let (removed, kept) = std::mem::take(&mut self.bindings)
            .into_iter()
            .partition(|(handle, _)| *handle == body);
        self.bindings = kept;
        removed.into_iter().map(|(_, key)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BodyHandle, &K)> {
        self.bindings.iter().map(|(body, key)| (*body, key))
    }

    /// Forward the current pose of every bound body to `sink`.
    ///
    /// Bindings whose body was removed are dropped.
    pub fn sync<S>(&mut self, world: &World, sink: &mut S) -> SyncStats
    where
        S: PoseSink<Key = K>,
    {
        let mut stats = SyncStats::default();
        self.bindings
            .retain(|(body, key)| match world.body_pose(*body) {
                Ok(pose) => {
                    sink.apply_pose(key, pose);
                    stats.applied += 1;
                    true
                }
                Err(_) => {
                    tracing::warn!(?body, "dropping sync binding for removed body");
                    stats.dropped += 1;
                    false
                }
            });
        tracing::trace!(applied = stats.applied, dropped = stats.dropped, "poses synced");
        stats
    }

    /// One frame: step the world once, then sync. Nothing is synced if the step fails.
    pub fn frame<S>(
        &mut self,
        world: &mut World,
        sink: &mut S,
    ) -> Result<(StepReport, SyncStats), PhysicsError>
    where
        S: PoseSink<Key = K>,
    {
        let report = world.step()?;
        let stats = self.sync(world, sink);
        Ok((report, stats))
    }
}

/// Sink that keeps the latest pose per key.
#[derive(Debug, Clone)]
pub struct PoseBuffer<K> {
    poses: BTreeMap<K, Pose>,
}

impl<K> Default for PoseBuffer<K> {
    fn default() -> Self {
        Self {
            poses: BTreeMap::new(),
        }
    }
}

impl<K: Ord> PoseBuffer<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&Pose> {
        self.poses.get(key)
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Pose)> {
        self.poses.iter()
    }
}

impl<K: Ord + Clone> PoseSink for PoseBuffer<K> {
    type Key = K;

    fn apply_pose(&mut self, key: &K, pose: Pose) {
        self.poses.insert(key.clone(), pose);
    }
}
