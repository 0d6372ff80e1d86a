use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dataset::DataSet;
use crate::equations::{State, derivatives};
use crate::error::{ModelError, Result};
use crate::params::ModelParams;

// Number of reported evaluation points per solve.
pub const GRID_POINTS: usize = 60;

// Integrator settings. Defaults suit typical falling head tests; overrides
// can be read from a TOML file (e.g. solver.toml).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    pub rtol: f64,        // Relative error tolerance per step
    pub atol: f64,        // Absolute error tolerance per step
    pub max_steps: usize, // Step budget; exhausting it aborts the solve
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 100_000,
        }
    }
}

impl SolverOptions {
    pub fn from_toml(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| ModelError::Parse {
            line: 0,
            message: e.to_string(),
        })
    }
}

// Simulated (t, h, L) series, one entry per grid point.
#[derive(Clone, Debug)]
pub struct Trajectory {
    pub times: Vec<f64>,
    pub h: Vec<f64>,
    pub l: Vec<f64>,
}

// n points log-spaced between start and end inclusive, ascending, endpoints
// exact. Falling head tests move fast early and slow late, so resolution is
// concentrated at early times. A test that begins at t = 0 (or below) cannot
// anchor a log ladder, so the ladder starts from a small positive floor and
// the first grid value is the domain start itself.
pub fn log_grid(start: f64, end: f64, n: usize) -> Vec<f64> {
    debug_assert!(n >= 2);
    let lo = if start > 0.0 {
        start
    } else {
        end.abs().max(1.0) * 1e-6
    };
    let (la, lb) = (lo.log10(), end.log10());
    let step = (lb - la) / (n - 1) as f64;
    let mut grid: Vec<f64> = (0..n).map(|i| 10f64.powf(la + step * i as f64)).collect();
    grid[0] = start;
    grid[n - 1] = end;
    grid
}

// Cash-Karp embedded Runge-Kutta 4(5) tableau.
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 3.0 / 5.0;
const C5: f64 = 1.0;
const C6: f64 = 7.0 / 8.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 3.0 / 10.0;
const A42: f64 = -9.0 / 10.0;
const A43: f64 = 6.0 / 5.0;
const A51: f64 = -11.0 / 54.0;
const A52: f64 = 5.0 / 2.0;
const A53: f64 = -70.0 / 27.0;
const A54: f64 = 35.0 / 27.0;
const A61: f64 = 1631.0 / 55296.0;
const A62: f64 = 175.0 / 512.0;
const A63: f64 = 575.0 / 13824.0;
const A64: f64 = 44275.0 / 110592.0;
const A65: f64 = 253.0 / 4096.0;

// 5th-order solution weights and the embedded 4th-order weights.
const B1: f64 = 37.0 / 378.0;
const B3: f64 = 250.0 / 621.0;
const B4: f64 = 125.0 / 594.0;
const B6: f64 = 512.0 / 1771.0;
const D1: f64 = 2825.0 / 27648.0;
const D3: f64 = 18575.0 / 48384.0;
const D4: f64 = 13525.0 / 55296.0;
const D5: f64 = 277.0 / 14336.0;
const D6: f64 = 1.0 / 4.0;

// One trial step of size dt from (t, y). Returns the 5th-order state and the
// embedded error estimate. A stage evaluated at L <= 0 surfaces as an error,
// which the caller treats as a step-size rejection.
fn cash_karp_step(y: &State, t: f64, dt: f64, params: &ModelParams) -> Result<(State, State)> {
    let k1 = derivatives(y, t, params)?;
    let k2 = derivatives(&(y + dt * (A21 * k1)), t + C2 * dt, params)?;
    let k3 = derivatives(&(y + dt * (A31 * k1 + A32 * k2)), t + C3 * dt, params)?;
    let k4 = derivatives(&(y + dt * (A41 * k1 + A42 * k2 + A43 * k3)), t + C4 * dt, params)?;
    let k5 = derivatives(
        &(y + dt * (A51 * k1 + A52 * k2 + A53 * k3 + A54 * k4)),
        t + C5 * dt,
        params,
    )?;
    let k6 = derivatives(
        &(y + dt * (A61 * k1 + A62 * k2 + A63 * k3 + A64 * k4 + A65 * k5)),
        t + C6 * dt,
        params,
    )?;

    let y5 = y + dt * (B1 * k1 + B3 * k3 + B4 * k4 + B6 * k6);
    let y4 = y + dt * (D1 * k1 + D3 * k3 + D4 * k4 + D5 * k5 + D6 * k6);
    Ok((y5, y5 - y4))
}

// Scaled RMS error of a trial step against the mixed tolerance.
fn error_norm(y: &State, y_new: &State, err: &State, opts: &SolverOptions) -> f64 {
    let mut acc = 0.0;
    for i in 0..2 {
        let scale = opts.atol + opts.rtol * y[i].abs().max(y_new[i].abs());
        acc += (err[i] / scale).powi(2);
    }
    (acc / 2.0).sqrt()
}

// Integrate the governing equations from (h0, L0) over a 60-point log-spaced
// grid spanning the observation's time domain. The state at each grid point
// is reported; the first point is the initial condition. Adaptive sub-steps
// between grid points are internal and not observable.
pub fn solve(params: &ModelParams, pond: &DataSet, opts: &SolverOptions) -> Result<Trajectory> {
    params.validate()?;

    // A log grid needs a positive-width domain ending at positive time;
    // a single-row data set (or one ending at t <= 0) cannot span one.
    let span = pond.end - pond.start;
    if !(span > 0.0) || !(pond.end > 0.0) {
        return Err(ModelError::InvalidParameter {
            name: "time domain",
            value: span,
        });
    }

    let grid = log_grid(pond.start, pond.end, GRID_POINTS);
    let dt_min = span * 1e-12;

    let mut y = State::new(params.h0, params.l0);
    let mut t = grid[0];
    let mut dt = span * 1e-4;
    let mut steps = 0_usize;

    let mut times = Vec::with_capacity(GRID_POINTS);
    let mut pond_depth = Vec::with_capacity(GRID_POINTS);
    let mut front_depth = Vec::with_capacity(GRID_POINTS);
    times.push(t);
    pond_depth.push(y.x);
    front_depth.push(y.y);

    for &target in &grid[1..] {
        while t < target {
            steps += 1;
            if steps > opts.max_steps {
                return Err(ModelError::Divergence {
                    t,
                    message: format!("step budget of {} exhausted", opts.max_steps),
                });
            }

            let remaining = target - t;
            let capped = dt >= remaining;
            let dt_trial = if capped { remaining } else { dt };

            match cash_karp_step(&y, t, dt_trial, params) {
                Err(e) => {
                    // Infeasible stage: shrink and retry until the step floor.
                    if dt_trial <= dt_min {
                        return Err(e);
                    }
                    dt = dt_trial * 0.5;
                }
                Ok((y_new, err_est)) => {
                    let err = error_norm(&y, &y_new, &err_est, opts);
                    if err <= 1.0 {
                        t = if capped { target } else { t + dt_trial };
                        y = y_new;
                        if !(y.y > 0.0) || !y.x.is_finite() || !y.y.is_finite() {
                            return Err(ModelError::Divergence {
                                t,
                                message: format!(
                                    "state left the physical domain (h = {}, L = {})",
                                    y.x, y.y
                                ),
                            });
                        }
                        let grow = if err == 0.0 {
                            5.0
                        } else {
                            (0.9 * err.powf(-0.2)).clamp(0.2, 5.0)
                        };
                        dt = dt_trial * grow;
                    } else {
                        dt = dt_trial * (0.9 * err.powf(-0.25)).clamp(0.1, 0.9);
                        if dt < dt_min {
                            return Err(ModelError::Divergence {
                                t,
                                message: "step size underflow".to_string(),
                            });
                        }
                    }
                }
            }
        }
        times.push(target);
        pond_depth.push(y.x);
        front_depth.push(y.y);
    }

    Ok(Trajectory {
        times,
        h: pond_depth,
        l: front_depth,
    })
}

// Fetch the data set named by the parameters, then solve.
pub fn solve_in(dir: &Path, params: &ModelParams, opts: &SolverOptions) -> Result<Trajectory> {
    let pond = DataSet::load(dir, &params.name)?;
    solve(params, &pond, opts)
}
