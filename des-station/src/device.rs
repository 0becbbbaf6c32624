//! Pool of identical devices (servers)
//!
//! Devices are scanned in index order and a job goes to the first free one.
//! Each assignment draws a fresh service duration from the pool's distribution.

use crate::dists::ServiceTimeDistribution;
use crate::error::StationError;
use crate::job::JobId;
use crate::time::SimTime;
use std::fmt;

pub type DeviceId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    id: DeviceId,
    job: Option<JobId>,
    started_at: SimTime,
    finish_time: SimTime,
}

impl Device {
    fn new(id: DeviceId) -> Self {
        Self {
            id,
            job: None,
            started_at: SimTime::zero(),
            finish_time: SimTime::zero(),
        }
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Job currently bound to this device.
    pub fn job(&self) -> Option<JobId> {
        self.job
    }

    pub fn started_at(&self) -> SimTime {
        self.started_at
    }

    /// When the current (or last) service ends.
    pub fn finish_time(&self) -> SimTime {
        self.finish_time
    }

    /// Free at `time`: holds no job and its last service has ended.
    ///
    /// A device whose service ends exactly at `time` stays busy until its
    /// completion releases it; the event queue orders that release ahead of any
    /// arrival at the same instant.
    pub fn is_free(&self, time: SimTime) -> bool {
        self.job.is_none() && self.finish_time <= time
    }
}

/// Where and until when a job will be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub device: DeviceId,
    pub finish_time: SimTime,
}

pub struct DevicePool {
    devices: Vec<Device>,
    service: Box<dyn ServiceTimeDistribution>,
}

impl fmt::Debug for DevicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevicePool")
            .field("devices", &self.devices)
            .finish_non_exhaustive()
    }
}

impl DevicePool {
    pub fn new(count: usize, service: Box<dyn ServiceTimeDistribution>) -> Self {
        Self {
            devices: (0..count).map(Device::new).collect(),
            service,
        }
    }

    pub fn has_free_device(&self, time: SimTime) -> bool {
        self.devices.iter().any(|device| device.is_free(time))
    }

    /// Bind `job` to the first free device and draw its service duration.
    pub fn assign(&mut self, job: JobId, time: SimTime) -> Result<Assignment, StationError> {
        let device = self
            .devices
            .iter_mut()
            .find(|device| device.is_free(time))
            .ok_or(StationError::NoFreeDevice { time })?;

        let finish_time = time + self.service.sample();
        device.job = Some(job);
        device.started_at = time;
        device.finish_time = finish_time;

        Ok(Assignment {
            device: device.id,
            finish_time,
        })
    }

    /// Unbind `job` from its device and return that device.
    pub fn release(&mut self, job: JobId) -> Result<DeviceId, StationError> {
        let device = self
            .devices
            .iter_mut()
            .find(|device| device.job == Some(job))
            .ok_or(StationError::JobNotFound { job })?;

        device.job = None;
        Ok(device.id)
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn busy_count(&self) -> usize {
        self.devices.iter().filter(|device| device.job.is_some()).count()
    }
}
