use std::fs;
use std::path::Path;

use crate::error::{ModelError, Result};

pub const PARAMS_FILE: &str = "params.txt";

// Fixed line order of the persisted parameter file. The format is positional:
// line index is the schema, so load and save must agree on this ordering.
const KEYS: [&str; 9] = ["K", "phi", "S", "E", "Q", "QFinish", "h0", "L0", "name"];

// Physical constants and initial conditions for one test scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelParams {
    pub k: f64,        // Hydraulic conductivity [length/time]
    pub phi: f64,      // Porosity [-]
    pub s: f64,        // Residual saturation fraction [0, 1)
    pub e: f64,        // Evaporation/loss rate [length/time]
    pub q: f64,        // Inflow rate while active [length/time]
    pub q_finish: f64, // Time at which inflow stops
    pub h0: f64,       // Initial pond depth [length]
    pub l0: f64,       // Initial wetted-front depth [length], strictly positive
    pub name: String,  // Data set identifier
}

impl ModelParams {
    // Positional parse: line i must carry KEYS[i] followed by its value.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut lines = text.lines();
        let mut values = [0.0_f64; 8];
        let mut name = String::new();

        for (i, key) in KEYS.iter().enumerate() {
            let line = lines.next().ok_or_else(|| ModelError::Parse {
                line: i + 1,
                message: format!("missing line for key '{key}'"),
            })?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 2 {
                return Err(ModelError::Parse {
                    line: i + 1,
                    message: format!("expected 'key value', got {} fields", fields.len()),
                });
            }
            if fields[0] != *key {
                return Err(ModelError::Parse {
                    line: i + 1,
                    message: format!("expected key '{key}', found '{}'", fields[0]),
                });
            }
            if *key == "name" {
                name = fields[1].to_string();
            } else {
                values[i] = fields[1].parse().map_err(|_| ModelError::Parse {
                    line: i + 1,
                    message: format!("non-numeric value '{}' for key '{key}'", fields[1]),
                })?;
            }
        }

        Ok(ModelParams {
            k: values[0],
            phi: values[1],
            s: values[2],
            e: values[3],
            q: values[4],
            q_finish: values[5],
            h0: values[6],
            l0: values[7],
            name,
        })
    }

    // Full overwrite in the fixed key order. Written to a temp file first and
    // renamed into place so a failed write leaves the prior file intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        let numeric = [self.k, self.phi, self.s, self.e, self.q, self.q_finish, self.h0, self.l0];
        for (key, value) in KEYS.iter().zip(numeric.iter()) {
            out.push_str(&format!("{key}\t{value}\n"));
        }
        out.push_str(&format!("name\t{}\n", self.name));

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, out)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    // Bounds that must hold before integration: l0 and phi appear as divisors,
    // and (1 - s) must stay positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.l0 > 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "L0",
                value: self.l0,
            });
        }
        if !(self.s >= 0.0 && self.s < 1.0) {
            return Err(ModelError::InvalidParameter {
                name: "S",
                value: self.s,
            });
        }
        if !(self.phi > 0.0) {
            return Err(ModelError::InvalidParameter {
                name: "phi",
                value: self.phi,
            });
        }
        Ok(())
    }
}
