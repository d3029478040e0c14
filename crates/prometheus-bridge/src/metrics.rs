use anyhow::Context;
use limit_core::SystemState;
use limit_sim::SimulationStep;
use prometheus::{Encoder, GaugeVec, IntCounterVec, Opts, Registry, TextEncoder};

/// Engine gauges and counters on a private registry, so several instances
/// can coexist in one process.
pub struct EngineMetrics {
    registry: Registry,
    pub effective_energy: GaugeVec,
    pub state_severity: GaugeVec,
    pub state_transitions_total: IntCounterVec,
    pub halts_total: IntCounterVec,
}

impl EngineMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let effective_energy = GaugeVec::new(
            Opts::new("limit_effective_energy", "Latest effective energy per run"),
            &["run_id"],
        )?;
        registry.register(Box::new(effective_energy.clone()))?;

        let state_severity = GaugeVec::new(
            Opts::new(
                "limit_state_severity",
                "Latest state per run as severity 0 (STABLE) to 3 (SYSTEM_SHOULD_HALT)",
            ),
            &["run_id"],
        )?;
        registry.register(Box::new(state_severity.clone()))?;

        let state_transitions_total = IntCounterVec::new(
            Opts::new("limit_state_transitions_total", "State changes between consecutive ticks"),
            &["from", "to"],
        )?;
        registry.register(Box::new(state_transitions_total.clone()))?;

        let halts_total = IntCounterVec::new(
            Opts::new("limit_halts_total", "Ticks classified SYSTEM_SHOULD_HALT per run"),
            &["run_id"],
        )?;
        registry.register(Box::new(halts_total.clone()))?;

        Ok(Self {
            registry,
            effective_energy,
            state_severity,
            state_transitions_total,
            halts_total,
        })
    }

    pub fn observe_step(&self, previous: Option<SystemState>, step: &SimulationStep) {
        let run_id = step.run_id.to_string();
        let state = step.calculated_state;
        self.effective_energy
            .with_label_values(&[run_id.as_str()])
            .set(step.effective_energy);
        self.state_severity
            .with_label_values(&[run_id.as_str()])
            .set(f64::from(state.severity()));
        if let Some(previous) = previous.filter(|p| *p != state) {
            self.state_transitions_total
                .with_label_values(&[previous.as_str(), state.as_str()])
                .inc();
        }
        if state.is_terminal() {
            self.halts_total.with_label_values(&[run_id.as_str()]).inc();
        }
    }

    /// Text exposition format of everything registered here.
    pub fn gather_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .context("encode metric families")?;
        String::from_utf8(buffer).context("metrics exposition is not utf-8")
    }
}
