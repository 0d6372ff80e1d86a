use nalgebra::Vector2;

use crate::error::{ModelError, Result};
use crate::forcing::inflow;
use crate::params::ModelParams;

// ODE state vector: x = pond depth h, y = wetted-front depth L.
pub type State = Vector2<f64>;

// Coupled governing equations for the falling head test.
//
//   dh/dt = -K (h + L)/L - E + Qf(t)
//   dL/dt =  K (h + L) / (L phi (1 - S))
//
// Both equations share the same infiltration flux K(h+L)/L; it is computed
// once so the coupling is exact rather than re-derived with rounding drift.
pub fn derivatives(state: &State, t: f64, params: &ModelParams) -> Result<State> {
    let h = state.x;
    let l = state.y;
    if !(l > 0.0) {
        return Err(ModelError::Divergence {
            t,
            message: format!("wetted-front depth L = {l} is not positive"),
        });
    }
    if !h.is_finite() || !l.is_finite() {
        return Err(ModelError::Divergence {
            t,
            message: format!("non-finite state (h = {h}, L = {l})"),
        });
    }
    let flux = params.k * (h + l) / l;
    let dhdt = -flux - params.e + inflow(t, params);
    let dldt = flux / (params.phi * (1.0 - params.s));
    Ok(Vector2::new(dhdt, dldt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> ModelParams {
        ModelParams {
            k: 0.01,
            phi: 0.35,
            s: 0.1,
            e: 0.001,
            q: 0.02,
            q_finish: 10.0,
            h0: 0.5,
            l0: 0.05,
            name: String::new(),
        }
    }

    #[test]
    fn derivatives_match_hand_computation() {
        // flux = 0.01 * (0.5 + 0.05) / 0.05 = 0.11
        let d = derivatives(&Vector2::new(0.5, 0.05), 0.0, &params()).unwrap();
        assert_relative_eq!(d.x, -0.11 - 0.001 + 0.02, max_relative = 1e-12);
        assert_relative_eq!(d.y, 0.11 / (0.35 * 0.9), max_relative = 1e-12);
    }

    #[test]
    fn inflow_term_drops_after_cutoff() {
        let p = params();
        let before = derivatives(&Vector2::new(0.5, 0.05), 10.0, &p).unwrap();
        let after = derivatives(&Vector2::new(0.5, 0.05), 10.1, &p).unwrap();
        assert_relative_eq!(before.x - after.x, p.q, max_relative = 1e-12);
        // dL/dt carries no forcing term
        assert_relative_eq!(before.y, after.y, max_relative = 1e-12);
    }

    #[test]
    fn nonpositive_front_depth_is_divergence() {
        assert!(matches!(
            derivatives(&Vector2::new(0.5, 0.0), 1.0, &params()),
            Err(ModelError::Divergence { .. })
        ));
        assert!(matches!(
            derivatives(&Vector2::new(0.5, -0.01), 1.0, &params()),
            Err(ModelError::Divergence { .. })
        ));
    }

    #[test]
    fn non_finite_state_is_divergence() {
        assert!(matches!(
            derivatives(&Vector2::new(f64::NAN, 0.05), 1.0, &params()),
            Err(ModelError::Divergence { .. })
        ));
    }
}
