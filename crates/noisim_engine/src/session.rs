//! Linked set of managers
//!
//! Gantree: L6_Engine → NoisySimulation
//!
//! Owns one manager per instance category, linked in pipeline order and
//! reporting to one notifier.

use crate::noise_data_manager::NoiseDataManager;
use crate::noise_model_manager::NoiseModelManager;
use crate::simulator_manager::SimulatorManager;
use noisim_backend::{BackendFactory, LocalSimulatorFactory};
use noisim_calibration::CalibrationConfig;
use noisim_core::{InsResult, LogNotifier, SharedNotifier};
use noisim_noise::{ErrorModelBuilder, NoiseModelBuilder};
use std::sync::Arc;

/// Gantree: NoisySimulation // 통합 세션
pub struct NoisySimulation {
    notifier: SharedNotifier,
    noise_data: NoiseDataManager,
    noise_models: NoiseModelManager,
    simulators: SimulatorManager,
}

impl NoisySimulation {
    /// Session with the bundled model builder and local simulator
    /// Gantree: new(config, notifier) -> Result<Self> // 생성자
    pub fn new(config: CalibrationConfig, notifier: SharedNotifier) -> InsResult<Self> {
        Self::with_components(
            config,
            Arc::new(NoiseModelBuilder::new()),
            Arc::new(LocalSimulatorFactory::default()),
            notifier,
        )
    }

    /// Session with custom collaborators
    pub fn with_components(
        config: CalibrationConfig,
        builder: Arc<dyn ErrorModelBuilder>,
        factory: Arc<dyn BackendFactory>,
        notifier: SharedNotifier,
    ) -> InsResult<Self> {
        config.validate()?;
        let noise_data = NoiseDataManager::new(config.clone(), Arc::clone(&notifier));
        let mut noise_models = NoiseModelManager::new(builder, config, Arc::clone(&notifier));
        noise_models.link_noise_data_manager(&noise_data)?;
        let mut simulators = SimulatorManager::new(factory, Arc::clone(&notifier));
        simulators.link_noise_model_manager(&noise_models)?;

        Ok(Self {
            notifier,
            noise_data,
            noise_models,
            simulators,
        })
    }

    /// IBM Quantum CSV layout, notifications sent to the `log` facade
    pub fn with_defaults() -> InsResult<Self> {
        Self::new(CalibrationConfig::default(), Arc::new(LogNotifier))
    }

    pub fn notifier(&self) -> &SharedNotifier {
        &self.notifier
    }

    pub fn noise_data(&self) -> &NoiseDataManager {
        &self.noise_data
    }

    pub fn noise_models(&self) -> &NoiseModelManager {
        &self.noise_models
    }

    pub fn simulators(&self) -> &SimulatorManager {
        &self.simulators
    }
}
