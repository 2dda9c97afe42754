//! Bipolar junction transistor model.
//!
//! Ebers-Moll exponential base drive with the Early effect:
//!   Ib = Is * (exp(sign * Vbe / Vt) - 1)
//!   Ic = β * Ib * (1 + Vce / Va)
//!
//! plus saturation-region detection with a soft current scale so the
//! active/saturation transition stays continuous, and a Miller
//! capacitance estimate. sign is +1 for NPN and -1 for PNP; reported
//! currents are polarity-true, so a forward-biased PNP carries negative
//! Ib, Ic, and Ie.

use crate::{thermal_voltage, ROOM_TEMPERATURE};

/// Base-emitter voltage limit in multiples of Vt; the exponential is
/// extrapolated linearly beyond it.
const V_CRIT_FACTOR: f64 = 40.0;

/// Collector-to-drive ratio above which Vce_sat starts to grow.
const SATURATION_RATIO_KNEE: f64 = 0.9;

/// Transistor polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransistorType {
    Npn,
    Pnp,
}

impl TransistorType {
    /// Polarity sign: +1 for NPN, -1 for PNP.
    fn sign(self) -> f64 {
        match self {
            TransistorType::Npn => 1.0,
            TransistorType::Pnp => -1.0,
        }
    }
}

/// A bipolar junction transistor.
#[derive(Debug, Clone)]
pub struct Transistor {
    transistor_type: TransistorType,
    /// Forward current gain (hFE)
    beta: f64,
    /// Thermal voltage in volts, tracks the operating temperature
    vt: f64,
    /// Saturation current in amperes
    is: f64,
    /// Early voltage in volts
    va: f64,
    /// Operating temperature in Kelvin
    temperature: f64,
    /// Base-collector (Miller) capacitance in farads
    cbc: f64,
    /// Base spreading resistance in ohms
    rb: f64,
    /// Collector resistance in ohms
    rc: f64,
    /// Emitter resistance in ohms
    re: f64,
    /// Saturation knee voltage at the reference temperature
    vce_sat: f64,

    // Bookkeeping only, cleared by reset()
    last_vbe: f64,
    last_vce: f64,
    last_ic: f64,
    last_ib: f64,
    last_ie: f64,
}

impl Transistor {
    /// Create a transistor with generic small-signal defaults.
    pub fn new(transistor_type: TransistorType) -> Self {
        Self::with_parameters(transistor_type, 100.0, 1e-12, 100.0, 0.2)
    }

    /// Create a transistor with explicit parameters.
    ///
    /// # Arguments
    /// * `beta` - forward current gain, clamped to [1, 2000]
    /// * `is` - saturation current in amperes, clamped to [1e-18, 1e-3]
    /// * `va` - Early voltage in volts, clamped to [1, 1000]
    /// * `vce_sat` - saturation knee in volts, clamped to [0.01, 1]
    pub fn with_parameters(
        transistor_type: TransistorType,
        beta: f64,
        is: f64,
        va: f64,
        vce_sat: f64,
    ) -> Self {
        Self {
            transistor_type,
            beta: beta.clamp(1.0, 2000.0),
            vt: thermal_voltage(ROOM_TEMPERATURE),
            is: is.clamp(1e-18, 1e-3),
            va: va.clamp(1.0, 1000.0),
            temperature: ROOM_TEMPERATURE,
            cbc: 1e-12,
            rb: 100.0,
            rc: 1.0,
            re: 0.1,
            vce_sat: vce_sat.clamp(0.01, 1.0),
            last_vbe: 0.0,
            last_vce: 0.0,
            last_ic: 0.0,
            last_ib: 0.0,
            last_ie: 0.0,
        }
    }

    /// Set the forward current gain, clamped to [1, 2000].
    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta.clamp(1.0, 2000.0);
    }

    /// Get the forward current gain.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Set the saturation current, clamped to [1e-18 A, 1e-3 A].
    pub fn set_is(&mut self, is: f64) {
        self.is = is.clamp(1e-18, 1e-3);
    }

    /// Get the saturation current in amperes.
    pub fn is_current(&self) -> f64 {
        self.is
    }

    /// Set the Early voltage, clamped to [1 V, 1000 V].
    pub fn set_early_voltage(&mut self, va: f64) {
        self.va = va.clamp(1.0, 1000.0);
    }

    /// Get the Early voltage in volts.
    pub fn early_voltage(&self) -> f64 {
        self.va
    }

    /// Set the saturation knee voltage, clamped to [0.01 V, 1 V].
    pub fn set_vce_sat(&mut self, vce_sat: f64) {
        self.vce_sat = vce_sat.clamp(0.01, 1.0);
    }

    /// Set the base-collector capacitance, clamped to [0, 1 nF].
    pub fn set_miller_cap(&mut self, cbc: f64) {
        self.cbc = cbc.clamp(0.0, 1e-9);
    }

    /// Set the base spreading resistance in ohms.
    pub fn set_base_resistance(&mut self, rb: f64) {
        self.rb = rb.max(0.0);
    }

    /// Set the collector resistance in ohms.
    pub fn set_collector_resistance(&mut self, rc: f64) {
        self.rc = rc.max(0.0);
    }

    /// Set the emitter resistance in ohms.
    pub fn set_emitter_resistance(&mut self, re: f64) {
        self.re = re.max(0.0);
    }

    /// Set the operating temperature in Kelvin, clamped to [-40°C, 100°C].
    /// Recomputes the thermal voltage as k*T/q.
    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature.clamp(233.15, 373.15);
        self.vt = thermal_voltage(self.temperature);
    }

    /// Get the operating temperature in Kelvin.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Get the thermal voltage in volts.
    pub fn vt(&self) -> f64 {
        self.vt
    }

    /// Get the polarity.
    pub fn transistor_type(&self) -> TransistorType {
        self.transistor_type
    }

    /// Base-emitter junction current, polarity-folded and extrapolated
    /// linearly beyond 40 * Vt.
    fn junction_current(&self, vbe: f64) -> f64 {
        let v = self.transistor_type.sign() * vbe;
        let v_crit = V_CRIT_FACTOR * self.vt;

        if v > v_crit {
            let i_crit = self.is * ((v_crit / self.vt).exp() - 1.0);
            let g_crit = self.is / self.vt * (v_crit / self.vt).exp();
            i_crit + g_crit * (v - v_crit)
        } else {
            self.is * ((v / self.vt).exp() - 1.0)
        }
    }

    /// Saturation knee voltage for the present operating point.
    ///
    /// Grows with temperature (base * (1 + (T - T_ref)/100)) and with the
    /// collector-to-drive ratio Ic/(β*Ib) once that ratio passes 0.9.
    fn effective_vce_sat(&self, ratio: f64) -> f64 {
        let mut vce_sat =
            self.vce_sat * (1.0 + (self.temperature - ROOM_TEMPERATURE) / 100.0);
        if ratio > SATURATION_RATIO_KNEE {
            vce_sat *= 1.0 + (ratio - SATURATION_RATIO_KNEE);
        }
        vce_sat
    }

    /// Collector current for the given junction voltages.
    ///
    /// Active region: Ic = β * Ib * (1 + Vce/Va). In saturation
    /// (sign*Vce below the knee) the current is scaled by
    /// max(0, 1 - (Vce_sat - sign*Vce)/(0.1*Vce_sat)) so the transition
    /// is continuous rather than a hard clamp.
    ///
    /// The returned current is polarity-true: negative for a
    /// forward-biased PNP.
    pub fn collector_current(&mut self, vbe: f64, vce: f64) -> f64 {
        let sign = self.transistor_type.sign();
        // Polarity-folded magnitudes; the sign is restored before storing
        let ib_fold = self.junction_current(vbe);
        let mut ic_fold = self.beta * ib_fold * (1.0 + sign * vce / self.va);

        // Cutoff carries no collector current and no meaningful drive
        // ratio, so the saturation logic only applies with real base
        // drive
        if ib_fold.abs() > 1e-15 {
            let ratio = ic_fold / (self.beta * ib_fold);
            let vce_sat = self.effective_vce_sat(ratio);
            let vce_eff = sign * vce;
            if vce_eff < vce_sat {
                let soft = (1.0 - (vce_sat - vce_eff) / (0.1 * vce_sat)).max(0.0);
                ic_fold *= soft;
            }
        }

        let ib = sign * ib_fold;
        let ic = sign * ic_fold;
        self.last_vbe = vbe;
        self.last_vce = vce;
        self.last_ib = ib;
        self.last_ic = ic;
        self.last_ie = ic + ib;
        ic
    }

    /// Base current for the given junction voltages, polarity-true.
    pub fn base_current(&mut self, vbe: f64, vce: f64) -> f64 {
        let ib = self.transistor_type.sign() * self.junction_current(vbe);
        self.last_vbe = vbe;
        self.last_vce = vce;
        self.last_ib = ib;
        ib
    }

    /// Emitter current, Ie = Ic + Ib.
    pub fn emitter_current(&mut self, vbe: f64, vce: f64) -> f64 {
        let ic = self.collector_current(vbe, vce);
        ic + self.last_ib
    }

    /// Miller effect capacitance, Cm = Cbc * (1 + |Av|).
    pub fn miller_capacitance(&self, gain: f64) -> f64 {
        self.cbc * (1.0 + gain.abs())
    }

    /// Last base-emitter voltage seen by a calculate call.
    pub fn last_vbe(&self) -> f64 {
        self.last_vbe
    }

    /// Last collector-emitter voltage seen by a calculate call.
    pub fn last_vce(&self) -> f64 {
        self.last_vce
    }

    /// Last computed collector current.
    pub fn last_ic(&self) -> f64 {
        self.last_ic
    }

    /// Last computed base current.
    pub fn last_ib(&self) -> f64 {
        self.last_ib
    }

    /// Last computed emitter current.
    pub fn last_ie(&self) -> f64 {
        self.last_ie
    }

    /// Clear the operating-point bookkeeping. Configuration untouched.
    pub fn reset(&mut self) {
        self.last_vbe = 0.0;
        self.last_vce = 0.0;
        self.last_ic = 0.0;
        self.last_ib = 0.0;
        self.last_ie = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cutoff() {
        // Zero base drive carries zero collector current regardless of Vce
        for vce in [0.0, 1.0, 5.0, 9.0] {
            let mut q = Transistor::with_parameters(TransistorType::Npn, 400.0, 1e-12, 100.0, 0.15);
            assert_eq!(q.collector_current(0.0, vce), 0.0);
        }
    }

    #[test]
    fn test_active_region_gain() {
        let mut q = Transistor::with_parameters(TransistorType::Npn, 100.0, 1e-12, 100.0, 0.15);
        let vbe = 0.65;
        let vce = 5.0;
        let ic = q.collector_current(vbe, vce);
        let ib = q.last_ib();
        // Early effect raises the ratio slightly above beta
        assert_relative_eq!(ic / ib, 100.0 * (1.0 + 5.0 / 100.0), max_relative = 1e-9);
    }

    #[test]
    fn test_early_effect_increases_ic() {
        let mut q = Transistor::new(TransistorType::Npn);
        let low = q.collector_current(0.65, 2.0);
        let high = q.collector_current(0.65, 8.0);
        assert!(high > low);
    }

    #[test]
    fn test_saturation_reduces_ic() {
        let mut q = Transistor::with_parameters(TransistorType::Npn, 400.0, 1e-12, 100.0, 0.15);
        let active = q.collector_current(0.65, 5.0);
        let saturated = q.collector_current(0.65, 0.05);
        assert!(saturated < active);
        assert!(saturated >= 0.0);
    }

    #[test]
    fn test_saturation_transition_is_continuous() {
        // Just above and just below the knee the current should differ by
        // a small factor, not a step
        let mut q = Transistor::with_parameters(TransistorType::Npn, 400.0, 1e-12, 100.0, 0.15);
        // The drive ratio sits near 1 + vce/va, so the effective knee is
        // close to 0.15 * (1 + (1.0017 - 0.9))
        let knee = 0.1653;
        let above = q.collector_current(0.65, knee + 0.002);
        let below = q.collector_current(0.65, knee - 0.002);
        assert!((above - below).abs() < above * 0.3);
    }

    #[test]
    fn test_pnp_polarity() {
        let mut q = Transistor::new(TransistorType::Pnp);
        // Forward-biased PNP: negative Vbe, negative Vce, and all three
        // terminal currents report negative
        let ic = q.collector_current(-0.65, -5.0);
        assert!(ic < 0.0);
        assert!(q.last_ib() < 0.0);
        assert!(q.last_ie() < 0.0);
        // Reverse drive stays within the saturation-current floor
        q.reset();
        let off = q.collector_current(0.65, -5.0);
        assert!(off.abs() < 1e-9);
    }

    #[test]
    fn test_npn_pnp_mirror() {
        // Mirrored bias points produce mirrored currents
        let mut npn = Transistor::with_parameters(TransistorType::Npn, 100.0, 1e-12, 100.0, 0.2);
        let mut pnp = Transistor::with_parameters(TransistorType::Pnp, 100.0, 1e-12, 100.0, 0.2);
        let ic_n = npn.collector_current(0.65, 5.0);
        let ic_p = pnp.collector_current(-0.65, -5.0);
        assert_relative_eq!(ic_p, -ic_n, max_relative = 1e-12);
        assert_relative_eq!(pnp.last_ib(), -npn.last_ib(), max_relative = 1e-12);
    }

    #[test]
    fn test_emitter_current_sums() {
        let mut q = Transistor::new(TransistorType::Npn);
        let ie = q.emitter_current(0.6, 5.0);
        assert_relative_eq!(ie, q.last_ic() + q.last_ib(), max_relative = 1e-12);
    }

    #[test]
    fn test_temperature_updates_vt() {
        let mut q = Transistor::new(TransistorType::Npn);
        let vt_cold = q.vt();
        q.set_temperature(ROOM_TEMPERATURE + 40.0);
        assert!(q.vt() > vt_cold);
        // k*T/q scales linearly with T
        assert_relative_eq!(
            q.vt() / vt_cold,
            (ROOM_TEMPERATURE + 40.0) / ROOM_TEMPERATURE,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_miller_capacitance() {
        let q = Transistor::new(TransistorType::Npn);
        assert_relative_eq!(q.miller_capacitance(-100.0), 1e-12 * 101.0, max_relative = 1e-12);
    }

    #[test]
    fn test_reset_clears_bookkeeping() {
        let mut q = Transistor::new(TransistorType::Npn);
        q.collector_current(0.65, 5.0);
        q.reset();
        assert_eq!(q.last_ic(), 0.0);
        assert_eq!(q.last_ib(), 0.0);
        assert_eq!(q.last_vbe(), 0.0);
    }
}
