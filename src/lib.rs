mod dataset;
mod equations;
mod error;
mod forcing;
mod params;
mod report;
mod solver;

pub use dataset::DataSet;
pub use equations::{State, derivatives};
pub use error::{ModelError, Result};
pub use forcing::inflow;
pub use params::{ModelParams, PARAMS_FILE};
pub use report::{OUTPUT_FILE, PlotSink, compare, persist};
pub use solver::{GRID_POINTS, SolverOptions, Trajectory, log_grid, solve, solve_in};
