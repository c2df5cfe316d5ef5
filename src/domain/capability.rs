//! Capability detection - which rendering tier to run
//!
//! Decided once per engine construction from a snapshot of host signals.
//! Probing lives in `platform::probe` (browser) or is supplied by the caller.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Devices below this many logical cores get the software tier
pub const MIN_LOGICAL_CORES: u32 = 3;
/// Devices reporting this much memory or less get the software tier
pub const LOW_MEMORY_GB: f32 = 1.0;

const ASSUMED_CORES: u32 = 4;
const ASSUMED_MEMORY_GB: f32 = 4.0;

#[wasm_bindgen]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Full fluid solver, presented through a GPU context
    Gpu = 0,
    /// Software radial-gradient trail
    Fallback2d = 1,
    /// Nothing is rendered
    Disabled = 2,
}

/// Snapshot of everything the decision depends on.
/// `None` means the host did not report the value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostSignals {
    pub enabled: bool,
    pub reduced_motion: bool,
    pub gpu_context: bool,
    pub logical_cores: Option<u32>,
    pub device_memory_gb: Option<f32>,
    /// Network Information `effectiveType` ("4g", "3g", "2g", "slow-2g")
    pub effective_connection: Option<String>,
}

impl Default for HostSignals {
    fn default() -> Self {
        Self {
            enabled: true,
            reduced_motion: false,
            gpu_context: true,
            logical_cores: None,
            device_memory_gb: None,
            effective_connection: None,
        }
    }
}

impl HostSignals {
    pub fn is_low_power(&self) -> bool {
        let cores = self.logical_cores.unwrap_or(ASSUMED_CORES);
        let memory = self.device_memory_gb.unwrap_or(ASSUMED_MEMORY_GB);
        let slow_network = self
            .effective_connection
            .as_deref()
            .map(|c| c.to_ascii_lowercase().contains("2g"))
            .unwrap_or(false);
        cores < MIN_LOGICAL_CORES || memory <= LOW_MEMORY_GB || slow_network
    }
}

pub fn decide(signals: &HostSignals) -> Tier {
    if !signals.enabled || signals.reduced_motion {
        return Tier::Disabled;
    }
    if !signals.gpu_context || signals.is_low_power() {
        return Tier::Fallback2d;
    }
    Tier::Gpu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capable_host_gets_gpu() {
        assert_eq!(decide(&HostSignals::default()), Tier::Gpu);
    }

    #[test]
    fn disabled_and_reduced_motion() {
        let s = HostSignals { enabled: false, ..Default::default() };
        assert_eq!(decide(&s), Tier::Disabled);
        let s = HostSignals { reduced_motion: true, ..Default::default() };
        assert_eq!(decide(&s), Tier::Disabled);
    }

    #[test]
    fn low_power_signals_fall_back() {
        let s = HostSignals { logical_cores: Some(2), ..Default::default() };
        assert_eq!(decide(&s), Tier::Fallback2d);
        let s = HostSignals { logical_cores: Some(3), ..Default::default() };
        assert_eq!(decide(&s), Tier::Gpu);
        let s = HostSignals { device_memory_gb: Some(1.0), ..Default::default() };
        assert_eq!(decide(&s), Tier::Fallback2d);
        let s = HostSignals { effective_connection: Some("slow-2g".into()), ..Default::default() };
        assert_eq!(decide(&s), Tier::Fallback2d);
        let s = HostSignals { effective_connection: Some("4g".into()), ..Default::default() };
        assert_eq!(decide(&s), Tier::Gpu);
    }

    #[test]
    fn missing_gpu_context_falls_back() {
        let s = HostSignals { gpu_context: false, ..Default::default() };
        assert_eq!(decide(&s), Tier::Fallback2d);
    }
}
