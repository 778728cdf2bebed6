//! Per-tick assembly of a MeterValues sample with per-phase electrical simulation.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_ocpp::v1_6::types::{
    Location, Measurand, MeterValue, Phase, ReadingContext, SampledValue, UnitOfMeasure, ValueFormat,
};

const BASE_VOLTAGE: f64 = 232.0;
const VOLTAGE_SAG_PER_AMP: f64 = 0.15;

/// Result of one full electrical-model sample, alongside the assembled
/// MeterValue ready to attach to a `MeterValues` call.
pub struct MeterSample {
    pub meter_value: MeterValue,
    pub reported_power_w: f64,
    pub energy_increment_wh: f64,
}

/// Builds one MeterValues sample for a charging connector.
///
/// `per_phase_current` / `effective_phases` come either from a car
/// simulator's tick result, or, absent a car, straight from the connector's
/// offered current and the charger's wired phase count.
pub fn build_meter_value(
    timestamp: DateTime<Utc>,
    interval_seconds: f64,
    cumulative_energy_wh: f64,
    offered_current_a: f64,
    per_phase_current: f64,
    effective_phases: u8,
    soc: Option<f64>,
) -> MeterSample {
    let mut rng = rand::thread_rng();

    let currents: [f64; 3] = [
        if effective_phases >= 1 { per_phase_current } else { 0.0 },
        if effective_phases >= 2 { per_phase_current } else { 0.0 },
        if effective_phases >= 3 { per_phase_current } else { 0.0 },
    ];
    let voltages: [f64; 3] = currents.map(|i| {
        BASE_VOLTAGE - VOLTAGE_SAG_PER_AMP * i + rng.gen_range(-0.5..0.5)
    });

    let reported_power_w: f64 = (0..3).map(|k| voltages[k] * currents[k]).sum();
    let energy_increment_wh = reported_power_w * interval_seconds / 3600.0;

    let body_temp = 20.0 + rng.gen_range(-1.0..1.0);
    let cable_temp = 19.0 + rng.gen_range(-1.0..1.0);

    let mut sampled = vec![
        sample(
            format!("{:.3}", cumulative_energy_wh / 1000.0),
            Measurand::EnergyActiveImportRegister,
            Some(UnitOfMeasure::KWh),
            Location::Outlet,
            None,
        ),
        sample(
            format!("{:.1}", offered_current_a),
            Measurand::CurrentOffered,
            Some(UnitOfMeasure::A),
            Location::Outlet,
            None,
        ),
        sample(
            format!("{:.1}", body_temp),
            Measurand::Temperature,
            Some(UnitOfMeasure::Celsius),
            Location::Body,
            None,
        ),
        sample(
            format!("{:.1}", cable_temp),
            Measurand::Temperature,
            Some(UnitOfMeasure::Celsius),
            Location::Cable,
            None,
        ),
        sample(
            format!("{:.1}", reported_power_w),
            Measurand::PowerActiveImport,
            Some(UnitOfMeasure::W),
            Location::Outlet,
            None,
        ),
    ];

    let phases = [Phase::L1, Phase::L2, Phase::L3];
    for (k, phase) in phases.iter().enumerate().take(effective_phases as usize) {
        sampled.push(sample(
            format!("{:.1}", voltages[k]),
            Measurand::Voltage,
            Some(UnitOfMeasure::V),
            Location::Outlet,
            Some(phase.clone()),
        ));
        sampled.push(sample(
            format!("{:.1}", currents[k]),
            Measurand::CurrentImport,
            Some(UnitOfMeasure::A),
            Location::Outlet,
            Some(phase.clone()),
        ));
    }

    if let Some(soc) = soc {
        sampled.push(sample(
            format!("{:.1}", soc * 100.0),
            Measurand::SoC,
            Some(UnitOfMeasure::Percent),
            Location::EV,
            None,
        ));
    }

    MeterSample {
        meter_value: MeterValue {
            timestamp,
            sampled_value: sampled,
        },
        reported_power_w,
        energy_increment_wh,
    }
}

fn sample(
    value: String,
    measurand: Measurand,
    unit: Option<UnitOfMeasure>,
    location: Location,
    phase: Option<Phase>,
) -> SampledValue {
    SampledValue {
        value,
        context: Some(ReadingContext::SamplePeriodic),
        format: Some(ValueFormat::Raw),
        measurand: Some(measurand),
        phase,
        location: Some(location),
        unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_phase_omits_l2_l3() {
        let sample = build_meter_value(Utc::now(), 15.0, 0.0, 16.0, 16.0, 1, None);
        let phase_samples: Vec<_> = sample
            .meter_value
            .sampled_value
            .iter()
            .filter(|s| s.phase.is_some())
            .collect();
        assert_eq!(phase_samples.len(), 2); // one voltage + one current, L1 only
        assert!(phase_samples.iter().all(|s| matches!(s.phase, Some(Phase::L1))));
    }

    #[test]
    fn three_phase_reports_all_phases() {
        let sample = build_meter_value(Utc::now(), 15.0, 0.0, 16.0, 16.0, 3, None);
        let phase_samples: Vec<_> = sample
            .meter_value
            .sampled_value
            .iter()
            .filter(|s| s.phase.is_some())
            .collect();
        assert_eq!(phase_samples.len(), 6);
    }

    #[test]
    fn soc_sample_present_only_with_car() {
        let without = build_meter_value(Utc::now(), 15.0, 0.0, 16.0, 16.0, 3, None);
        assert!(without
            .meter_value
            .sampled_value
            .iter()
            .all(|s| !matches!(s.measurand, Some(Measurand::SoC))));

        let with = build_meter_value(Utc::now(), 15.0, 0.0, 16.0, 16.0, 3, Some(0.5));
        assert!(with
            .meter_value
            .sampled_value
            .iter()
            .any(|s| matches!(s.measurand, Some(Measurand::SoC))));
    }

    #[test]
    fn zero_current_yields_zero_power() {
        let sample = build_meter_value(Utc::now(), 15.0, 0.0, 0.0, 0.0, 3, None);
        assert_eq!(sample.reported_power_w, 0.0);
    }
}
