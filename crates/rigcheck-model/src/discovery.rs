//! Deadline-bounded discovery of the robot structure.
//!
//! [`Discoverer::poll`] is the non-blocking step, driven by an engine tick.
//! [`discover`] wraps it in a blocking loop that sleeps on a [`Clock`]
//! between attempts.

use std::time::Duration;

use tracing::{debug, info, warn};

use rigcheck_core::config::DiscoveryConfig;
use rigcheck_core::time::{Clock, Timestamp};

use crate::error::DiscoveryError;
use crate::robot::RobotModel;
use crate::source::{RobotDescription, StructureSource};

/// Result of one discovery poll.
#[derive(Debug)]
pub enum DiscoveryPoll {
    /// Nothing yet; poll again later.
    Pending,
    Ready(Box<RobotModel>),
}

/// Polls a structure source until it yields, the deadline passes or the
/// source fails.
#[derive(Debug, Clone)]
pub struct Discoverer {
    config: DiscoveryConfig,
    started: Option<Timestamp>,
    next_attempt: Option<Timestamp>,
    attempts: u32,
    /// Description found but still settling.
    found: Option<(Timestamp, RobotDescription)>,
}

impl Discoverer {
    pub const fn new(config: DiscoveryConfig) -> Self {
        Self {
            config,
            started: None,
            next_attempt: None,
            attempts: 0,
            found: None,
        }
    }

    /// Number of `locate` calls made so far.
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Time since the first poll.
    pub fn elapsed(&self, now: Timestamp) -> Duration {
        self.started.map_or(Duration::ZERO, |s| now - s)
    }

    /// Advances discovery to `now`.
    ///
    /// The source is asked at most once per poll interval. Once it yields,
    /// the model is built after the configured settle time.
    pub fn poll(
        &mut self,
        source: &mut (impl StructureSource + ?Sized),
        now: Timestamp,
    ) -> Result<DiscoveryPoll, DiscoveryError> {
        let started = *self.started.get_or_insert(now);

        if self.found.is_none() && self.next_attempt.is_none_or(|t| now >= t) {
            self.attempts += 1;
            match source.locate()? {
                Some(description) => {
                    debug!(
                        source = source.name(),
                        attempt = self.attempts,
                        "robot structure located"
                    );
                    self.found = Some((now, description));
                }
                None => {
                    debug!(
                        source = source.name(),
                        attempt = self.attempts,
                        "robot structure not available yet"
                    );
                    self.next_attempt = Some(now + self.config.poll_interval());
                }
            }
        }

        if let Some((found_at, description)) = self.found.take() {
            if now - found_at < self.config.settle() {
                self.found = Some((found_at, description));
                return Ok(DiscoveryPoll::Pending);
            }
            let model = RobotModel::from_description(&description)?;
            info!(
                robot = model.name(),
                links = model.links().len(),
                joints = model.joints().len(),
                colliders = model.colliders().len(),
                "robot structure discovered"
            );
            return Ok(DiscoveryPoll::Ready(Box::new(model)));
        }

        let waited = now - started;
        if waited >= self.config.timeout() {
            warn!(
                source = source.name(),
                attempts = self.attempts,
                "robot structure discovery timed out after {waited:?}"
            );
            return Err(DiscoveryError::Timeout {
                waited,
                attempts: self.attempts,
            });
        }
        Ok(DiscoveryPoll::Pending)
    }
}

/// Blocks until the source yields a robot or discovery fails.
pub fn discover(
    source: &mut (impl StructureSource + ?Sized),
    config: &DiscoveryConfig,
    clock: &mut (impl Clock + ?Sized),
) -> Result<RobotModel, DiscoveryError> {
    let mut discoverer = Discoverer::new(config.clone());
    loop {
        match discoverer.poll(&mut *source, clock.now())? {
            DiscoveryPoll::Ready(model) => return Ok(*model),
            DiscoveryPoll::Pending => clock.sleep(config.poll_interval()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
