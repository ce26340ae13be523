use super::config::{MemoryGuardConfig, MemoryLimits};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySample {
    pub resident_bytes: u64,
    pub available_bytes: u64,
}

impl MemorySample {
    pub fn exceeds(&self, limits: &MemoryLimits) -> bool {
        self.resident_bytes > limits.max_resident_bytes
            || self.available_bytes < limits.min_available_bytes
    }
}

/// Source of resource-pressure readings.
///
/// Returning `None` means the reading is unavailable; the guard treats that as "no pressure".
pub trait MemoryProbe {
    fn sample(&mut self) -> Option<MemorySample>;
}

/// Reads this process's resident set and the system's available memory through `sysinfo`.
pub struct SystemMemoryProbe {
    system: System,
    pid: Option<Pid>,
}

impl SystemMemoryProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Cannot determine the current process id, memory probing disabled: {}", e);
                None
            }
        };
        Self {
            system: System::new(),
            pid,
        }
    }
}

impl Default for SystemMemoryProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SystemMemoryProbe {
    fn sample(&mut self) -> Option<MemorySample> {
        let pid = self.pid?;
        self.system.refresh_memory();
        self.system
            .refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        let resident_bytes = self.system.process(pid)?.memory();
        Some(MemorySample {
            resident_bytes,
            available_bytes: self.system.available_memory(),
        })
    }
}

/// Counts processed items for one pipeline stage and samples the probe at a fixed interval.
///
/// A disarmed guard never samples and never trips. Once tripped it stays tripped.
pub struct MemoryGuard<'p> {
    probe: &'p mut dyn MemoryProbe,
    limits: MemoryLimits,
    interval: u64,
    armed: bool,
    since_check: u64,
    tripped: bool,
}

impl<'p> MemoryGuard<'p> {
    /// Builds the guard for a stage expected to handle `estimated_volume` items; it is armed only
    /// when guarding is enabled and the volume exceeds `activation`.
    pub fn for_stage(
        probe: &'p mut dyn MemoryProbe,
        config: &MemoryGuardConfig,
        estimated_volume: u64,
        activation: u64,
    ) -> Self {
        let armed = config.enabled && estimated_volume > activation;
        debug!(
            "Memory guard {} (estimated volume {}, activation {})",
            if armed { "armed" } else { "idle" },
            estimated_volume,
            activation
        );
        Self {
            probe,
            limits: config.limits,
            interval: config.check_interval.max(1),
            armed,
            since_check: 0,
            tripped: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn tripped(&self) -> bool {
        self.tripped
    }

    /// Records `items` more processed items. Returns `true` if the stage should stop.
    pub fn record(&mut self, items: u64) -> bool {
        if self.tripped {
            return true;
        }
        if !self.armed {
            return false;
        }
        self.since_check += items;
        if self.since_check < self.interval {
            return false;
        }
        self.since_check = 0;

        match self.probe.sample() {
            Some(sample) if sample.exceeds(&self.limits) => {
                warn!(
                    "Memory pressure detected (resident {} bytes, available {} bytes), stopping early",
                    sample.resident_bytes, sample.available_bytes
                );
                self.tripped = true;
            }
            Some(_) => {}
            None => debug!("Memory sample unavailable, continuing"),
        }
        self.tripped
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Replays a fixed list of samples, then repeats the last one.
    pub(crate) struct ScriptedProbe {
        samples: Vec<Option<MemorySample>>,
        pub(crate) calls: usize,
    }

    impl ScriptedProbe {
        pub(crate) fn new(samples: Vec<Option<MemorySample>>) -> Self {
            Self { samples, calls: 0 }
        }

        pub(crate) fn calm() -> Self {
            Self::new(vec![Some(sample(0, u64::MAX))])
        }

        pub(crate) fn pressured() -> Self {
            Self::new(vec![Some(sample(u64::MAX, 0))])
        }
    }

    impl MemoryProbe for ScriptedProbe {
        fn sample(&mut self) -> Option<MemorySample> {
            let index = self.calls.min(self.samples.len().saturating_sub(1));
            self.calls += 1;
            self.samples.get(index).copied().flatten()
        }
    }

    pub(crate) fn sample(resident_bytes: u64, available_bytes: u64) -> MemorySample {
        MemorySample {
            resident_bytes,
            available_bytes,
        }
    }

    fn config(interval: u64) -> MemoryGuardConfig {
        MemoryGuardConfig {
            check_interval: interval,
            ..MemoryGuardConfig::default()
        }
    }

    #[test]
    fn guard_below_activation_never_samples() {
        let mut probe = ScriptedProbe::pressured();
        let mut guard = MemoryGuard::for_stage(&mut probe, &config(1), 10, 10);
        assert!(!guard.is_armed());
        assert!(!guard.record(1_000));
        drop(guard);
        assert_eq!(probe.calls, 0);
    }

    #[test]
    fn disabled_guard_is_never_armed() {
        let mut probe = ScriptedProbe::pressured();
        let cfg = MemoryGuardConfig {
            enabled: false,
            ..config(1)
        };
        let guard = MemoryGuard::for_stage(&mut probe, &cfg, u64::MAX, 0);
        assert!(!guard.is_armed());
    }

    #[test]
    fn guard_samples_once_per_interval() {
        let mut probe = ScriptedProbe::calm();
        let mut guard = MemoryGuard::for_stage(&mut probe, &config(10), 100, 0);
        for _ in 0..35 {
            assert!(!guard.record(1));
        }
        drop(guard);
        assert_eq!(probe.calls, 3);
    }

    #[test]
    fn guard_trips_on_resident_limit_and_stays_tripped() {
        let limits = MemoryLimits::default();
        let mut probe = ScriptedProbe::new(vec![
            Some(sample(limits.max_resident_bytes, u64::MAX)),
            Some(sample(limits.max_resident_bytes + 1, u64::MAX)),
            Some(sample(0, u64::MAX)),
        ]);
        let mut guard = MemoryGuard::for_stage(&mut probe, &config(1), 100, 0);
        assert!(!guard.record(1));
        assert!(guard.record(1));
        assert!(guard.record(1));
        assert!(guard.tripped());
    }

    #[test]
    fn guard_trips_on_low_available_memory() {
        let limits = MemoryLimits::default();
        let mut probe =
            ScriptedProbe::new(vec![Some(sample(0, limits.min_available_bytes - 1))]);
        let mut guard = MemoryGuard::for_stage(&mut probe, &config(5), 100, 0);
        assert!(guard.record(5));
    }

    #[test]
    fn unavailable_sample_does_not_trip() {
        let mut probe = ScriptedProbe::new(vec![None]);
        let mut guard = MemoryGuard::for_stage(&mut probe, &config(1), 100, 0);
        assert!(!guard.record(10));
        assert!(!guard.tripped());
    }
}
