//! Noisy Bell-state run from a calibration export
//!
//! ```text
//! cargo run -p noisim_engine --example noisy_bell [calibrations.csv]
//! ```
//!
//! Without an argument a small three-qubit export is written to the temp
//! directory and used instead.

use noisim_core::CircuitBuilder;
use noisim_engine::prelude::*;
use std::path::PathBuf;

const SAMPLE_CSV: &str = "\
Qubit,T1 (us),T2 (us),Prob meas0 prep1 ,Prob meas1 prep0 ,Readout length (ns),ID error ,Single-qubit gate length (ns),Z-axis rotation (rz) error ,√x (sx) error ,Pauli-X error ,ECR error ,Gate time (ns)
0,231.5,140.2,0.0164,0.0106,1400,0.00021,60,0,0.00021,0.00021,1:0.0052,1:660
1,180.0,410.7,0.0122,0.008,1400,0.00018,60,0,0.00018,0.00018,0:0.0052;2:0.0071,0:660;2:660
2,150.2,95.3,0.0301,0.0129,1400,0.00025,60,0,0.00025,0.00025,1:0.0071,1:660
";

fn calibration_path() -> anyhow::Result<PathBuf> {
    if let Some(arg) = std::env::args().nth(1) {
        return Ok(PathBuf::from(arg));
    }
    let path = std::env::temp_dir().join("noisim_sample_calibrations.csv");
    std::fs::write(&path, SAMPLE_CSV)?;
    Ok(path)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let session = NoisySimulation::with_defaults()?;
    let path = calibration_path()?;

    session.noise_data().import_csv_data("device data", &path)?;
    session.noise_models().create_noise_model("device_model", "device_data")?;
    session.simulators().create_simulator("device_sim", "device_model")?;

    println!("{}", session.noise_data().get_instance_data()?);
    println!("{}", session.noise_models().get_instance_data()?);
    println!("{}", session.simulators().get_instance_data()?);

    let bell = CircuitBuilder::new(2)
        .name("bell")
        .h(0)
        .cx(0, 1)
        .measure_all()
        .build()?;
    for level in 0..=3 {
        let job = session
            .simulators()
            .run_simulator("device_sim", &bell, level, 4096)?;
        let result = job.wait()?;
        let fidelity = result.probability("00") + result.probability("11");
        println!("level {}: {} (P(00)+P(11) = {:.4})", level, job.job_id(), fidelity);
    }

    // Dependents first
    session.simulators().remove_simulator_instance("device_sim")?;
    session.noise_models().remove_noise_model_instance("device_model")?;
    session.noise_data().remove_noise_data_instance("device_data")?;
    Ok(())
}
