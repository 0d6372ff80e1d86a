use crate::params::ModelParams;

// Flux into the pond (as volume/(time*area)). The supply runs at a constant
// rate and shuts off after q_finish; the boundary itself still sees inflow.
pub fn inflow(t: f64, params: &ModelParams) -> f64 {
    if t <= params.q_finish { params.q } else { 0.0 }
}
