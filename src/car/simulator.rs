//! Stateful per-connector car battery simulation.

use rand::Rng;

use crate::car::profile::{CarProfile, TaperCurve};

const TAPER_FLOOR: f64 = 0.05;
const VOLTAGE: f64 = 230.0;

/// Result of a single simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickResult {
    pub draw_a: f64,
    pub power_w: f64,
    pub energy_increment_wh: f64,
    pub soc: f64,
}

/// Live per-connector simulation state.
#[derive(Debug, Clone)]
pub struct CarSimulator {
    pub profile: CarProfile,
    pub effective_phases: u8,
    pub soc: f64,
    pub offered_current_a: f64,
    pub actual_current_a: f64,
    pub energy_delivered_wh: f64,
    margin: f64,
}

impl CarSimulator {
    /// `charger_phases` caps the car's own phase count at the connector's
    /// physical wiring. `margin` is sampled once, here, from `U[0.5, 1.5)`.
    pub fn new(profile: CarProfile, charger_phases: u8, initial_soc: f64) -> Self {
        let effective_phases = profile.phases.min(charger_phases);
        let margin = rand::thread_rng().gen_range(0.5..1.5);
        Self {
            profile,
            effective_phases,
            soc: initial_soc.clamp(0.0, 1.0),
            offered_current_a: 0.0,
            actual_current_a: 0.0,
            energy_delivered_wh: 0.0,
            margin,
        }
    }

    pub fn set_offered_current(&mut self, amps: f64) {
        self.offered_current_a = amps.max(0.0);
    }

    /// Runs one tick of the algorithm and mutates `soc`/`energy_delivered_wh`
    /// / `actual_current_a` in place, returning the sampled result.
    pub fn tick(&mut self, interval_seconds: f64) -> TickResult {
        if self.soc >= 1.0 {
            self.actual_current_a = 0.0;
            return TickResult {
                draw_a: 0.0,
                power_w: 0.0,
                energy_increment_wh: 0.0,
                soc: self.soc,
            };
        }

        let i_car = self.profile.max_ac_current_a.min(
            (self.profile.onboard_charger_kw * 1000.0) / (VOLTAGE * self.profile.phases as f64),
        );

        let taper_factor = self.taper_factor();
        let tapered_car = i_car * taper_factor;

        let offered_prime = (self.offered_current_a - self.margin).max(0.0);
        let mut draw = tapered_car.min(offered_prime);

        let jitter: f64 = rand::thread_rng().gen_range(-0.2..0.2);
        draw = (draw + jitter).max(0.0);
        draw = (draw * 10.0).round() / 10.0;

        let power_w = VOLTAGE * draw * self.effective_phases as f64;
        let energy_increment_wh = power_w * interval_seconds / 3600.0;

        self.energy_delivered_wh += energy_increment_wh;
        self.soc += energy_increment_wh / (self.profile.battery_capacity_kwh * 1000.0);

        if self.soc >= 1.0 {
            self.soc = 1.0;
            self.actual_current_a = 0.0;
        } else {
            self.actual_current_a = draw;
        }

        TickResult {
            draw_a: draw,
            power_w,
            energy_increment_wh,
            soc: self.soc,
        }
    }

    fn taper_factor(&self) -> f64 {
        if self.soc < self.profile.taper_start_soc {
            return 1.0;
        }
        let span = self.profile.taper_end_soc - self.profile.taper_start_soc;
        let p = if span > 0.0 {
            ((self.soc - self.profile.taper_start_soc) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let t = match self.profile.taper_curve {
            TaperCurve::Linear => 1.0 - p,
            TaperCurve::Exponential => (-3.0 * p).exp(),
        };
        t.max(TAPER_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::car::profile::find_profile;

    fn profile(id: &str) -> CarProfile {
        find_profile(id).unwrap()
    }

    #[test]
    fn full_soc_yields_zero_draw() {
        let mut sim = CarSimulator::new(profile("generic-medium"), 3, 1.0);
        sim.set_offered_current(32.0);
        let result = sim.tick(15.0);
        assert_eq!(result.draw_a, 0.0);
        assert_eq!(result.power_w, 0.0);
        assert_eq!(sim.actual_current_a, 0.0);
    }

    #[test]
    fn soc_is_monotonic_and_converges() {
        let mut sim = CarSimulator::new(profile("1p-32a"), 1, 0.5);
        sim.set_offered_current(32.0);
        let mut last_soc = sim.soc;
        for _ in 0..100_000 {
            let result = sim.tick(15.0);
            assert!(result.soc >= last_soc - f64::EPSILON);
            last_soc = result.soc;
            if last_soc >= 1.0 {
                break;
            }
        }
        assert!((last_soc - 1.0).abs() < 1e-9);
        assert_eq!(sim.actual_current_a, 0.0);
    }

    #[test]
    fn soc_clamped_after_tick() {
        let mut sim = CarSimulator::new(profile("generic-medium"), 3, 0.999_999);
        sim.set_offered_current(32.0);
        for _ in 0..10 {
            sim.tick(15.0);
            assert!(sim.soc <= 1.0);
        }
    }

    #[test]
    fn effective_phases_capped_by_charger() {
        let sim = CarSimulator::new(profile("generic-medium"), 1, 0.5);
        assert_eq!(sim.effective_phases, 1);
    }

    #[test]
    fn taper_reduces_draw_near_full() {
        let mut low = CarSimulator::new(profile("1p-32a"), 1, 0.5);
        low.set_offered_current(32.0);
        let low_result = low.tick(15.0);

        let mut high = CarSimulator::new(profile("1p-32a"), 1, 0.98);
        high.set_offered_current(32.0);
        let high_result = high.tick(15.0);

        assert!(high_result.draw_a <= low_result.draw_a);
    }
}
