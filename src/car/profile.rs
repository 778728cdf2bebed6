//! Static parameters of a simulated EV.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaperCurve {
    Linear,
    Exponential,
}

#[derive(Debug, Clone)]
pub struct CarProfile {
    pub id: String,
    pub name: String,
    pub battery_capacity_kwh: f64,
    pub max_ac_current_a: f64,
    pub onboard_charger_kw: f64,
    pub phases: u8,
    pub taper_start_soc: f64,
    pub taper_end_soc: f64,
    pub taper_curve: TaperCurve,
}

/// The small built-in catalog referenced by the end-to-end scenarios.
pub fn builtin_profiles() -> Vec<CarProfile> {
    vec![
        CarProfile {
            id: "generic-medium".to_string(),
            name: "Generic medium EV".to_string(),
            battery_capacity_kwh: 60.0,
            max_ac_current_a: 32.0,
            onboard_charger_kw: 11.0,
            phases: 3,
            taper_start_soc: 0.8,
            taper_end_soc: 1.0,
            taper_curve: TaperCurve::Linear,
        },
        CarProfile {
            id: "1p-32a".to_string(),
            name: "Single-phase 32A EV".to_string(),
            battery_capacity_kwh: 40.0,
            max_ac_current_a: 32.0,
            onboard_charger_kw: 7.4,
            phases: 1,
            taper_start_soc: 0.85,
            taper_end_soc: 1.0,
            taper_curve: TaperCurve::Linear,
        },
        CarProfile {
            id: "3p-11kw".to_string(),
            name: "Three-phase 11kW EV".to_string(),
            battery_capacity_kwh: 77.0,
            max_ac_current_a: 16.0,
            onboard_charger_kw: 11.0,
            phases: 3,
            taper_start_soc: 0.8,
            taper_end_soc: 0.98,
            taper_curve: TaperCurve::Exponential,
        },
    ]
}

pub fn find_profile(id: &str) -> Option<CarProfile> {
    builtin_profiles().into_iter().find(|p| p.id == id)
}
