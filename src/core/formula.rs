use super::error::SimulationError;

// bbl per acre-ft
pub const BARRELS_PER_ACRE_FOOT: f64 = 7758.0;

pub fn stoiip(
    grv: f64,
    phi: f64,
    s_oil: f64,
    b_oil: f64,
    ntg: f64,
) -> Result<f64, SimulationError> {
    if b_oil == 0.0 {
        return Err(SimulationError::ZeroFormationFactor);
    }
    Ok(BARRELS_PER_ACRE_FOOT * (grv * phi * s_oil * ntg) / b_oil)
}

// Without net-to-gross or unit conversion; not used by the engine.
pub fn stoiip_base(
    rock_volume: f64,
    phi: f64,
    s_oil: f64,
    b_oil: f64,
) -> Result<f64, SimulationError> {
    if b_oil == 0.0 {
        return Err(SimulationError::ZeroFormationFactor);
    }
    Ok((rock_volume * phi * s_oil) / b_oil)
}
