use std::fs;
use std::path::Path;

use crate::dataset::DataSet;
use crate::error::Result;
use crate::solver::Trajectory;

pub const OUTPUT_FILE: &str = "model_output.txt";

// Write the simulated trajectory as a tab-separated table, header then one
// row per grid point. The table is staged in a temp file and renamed into
// place, so a failure never leaves a partial overwrite of earlier output.
pub fn persist(trajectory: &Trajectory, path: &Path) -> Result<()> {
    let mut out = String::from("time\th\tL\n");
    for i in 0..trajectory.times.len() {
        out.push_str(&format!(
            "{}\t{}\t{}\n",
            trajectory.times[i], trajectory.h[i], trajectory.l[i]
        ));
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, out)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

// Collaborator seam for visual comparison. The plotting layer lives outside
// the model; it receives the observed and simulated depth series and either
// renders them or queues them for rendering.
pub trait PlotSink {
    fn compare(
        &mut self,
        observed_times: &[f64],
        observed_depths: &[f64],
        model_times: &[f64],
        model_depths: &[f64],
    );
}

pub fn compare(pond: &DataSet, trajectory: &Trajectory, sink: &mut dyn PlotSink) {
    sink.compare(&pond.times, &pond.depths, &trajectory.times, &trajectory.h);
}
