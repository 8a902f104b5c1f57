//! Simulator manager
//!
//! Gantree: L6_Engine → SimulatorManager
//!
//! Builds simulation backends from linked noise models and submits
//! circuits to them. Each simulator pins the noise model key it was built
//! from until the simulator is removed.

use crate::instances::{source_availability, yes_no, InstanceListing, SimulatorInstance};
use crate::noise_data_manager::SharedKeyBlocker;
use crate::noise_model_manager::{NoiseModelManager, SharedNoiseModels};
use crate::operation::{existing_key, Operation};
use chrono::Utc;
use noisim_backend::{BackendFactory, JobHandle, LocalSimulatorFactory, Transpiler};
use noisim_core::{
    execution, Circuit, InsError, InsResult, InstanceCategory, KeyRegistry, MessageKey,
    Notification, SharedNotifier,
};
use std::sync::{Arc, RwLock};

/// Shared simulator registry
pub type SharedSimulators = Arc<RwLock<KeyRegistry<SimulatorInstance>>>;

/// Handles taken from the noise model manager when linking
#[derive(Clone)]
struct ModelLink {
    key_blocker: SharedKeyBlocker,
    noise_models: SharedNoiseModels,
}

/// Gantree: SimulatorManager // 시뮬레이터 관리자
pub struct SimulatorManager {
    /// Gantree: factory: Arc<dyn BackendFactory> // 백엔드 팩토리
    factory: Arc<dyn BackendFactory>,

    notifier: SharedNotifier,

    /// Gantree: link: Option<ModelLink> // 모델 관리자 연결
    link: Option<ModelLink>,

    /// Gantree: simulators: Arc<RwLock<KeyRegistry>> // 시뮬레이터 레지스트리
    simulators: SharedSimulators,
}

impl SimulatorManager {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Gantree: new(factory, notifier) -> Self // 생성자
    pub fn new(factory: Arc<dyn BackendFactory>, notifier: SharedNotifier) -> Self {
        Self {
            factory,
            notifier,
            link: None,
            simulators: Arc::new(RwLock::new(KeyRegistry::new(InstanceCategory::Simulator))),
        }
    }

    /// Manager creating [`LocalSimulator`](noisim_backend::LocalSimulator) backends
    pub fn with_default_factory(notifier: SharedNotifier) -> Self {
        Self::new(Arc::new(LocalSimulatorFactory::default()), notifier)
    }

    pub fn simulators(&self) -> SharedSimulators {
        Arc::clone(&self.simulators)
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// Gantree: link_noise_model_manager(&NoiseModelManager) // 연결
    ///
    /// The noise model manager must already be linked to its noise data
    /// manager, whose key blocker is shared by all three managers. A
    /// manager links once.
    pub fn link_noise_model_manager(&mut self, manager: &NoiseModelManager) -> InsResult<()> {
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::LinkingManager).with("manager", "NoiseModelManager"),
        );
        let result = match manager.key_blocker() {
            _ if self.link.is_some() => Err(InsError::AlreadyLinked {
                manager: "SimulatorManager".to_string(),
                linked: "NoiseModelManager".to_string(),
            }),
            Some(key_blocker) => {
                self.link = Some(ModelLink {
                    key_blocker,
                    noise_models: manager.noise_models(),
                });
                Ok(())
            }
            None => Err(InsError::Linkage {
                manager: "NoiseModelManager".to_string(),
                required: "NoiseDataManager".to_string(),
                method: "link_noise_data_manager".to_string(),
            }),
        };
        op.finish(result, |_| {
            Notification::new(MessageKey::LinkingSuccess)
                .with("manager", "SimulatorManager")
                .with("linked", "NoiseModelManager")
        })
    }

    fn linked(&self) -> InsResult<&ModelLink> {
        self.link.as_ref().ok_or_else(|| InsError::Linkage {
            manager: "SimulatorManager".to_string(),
            required: "NoiseModelManager".to_string(),
            method: "link_noise_model_manager".to_string(),
        })
    }

    // ========================================================================
    // Create / Remove
    // ========================================================================

    /// Build a backend from the noise model under `model_key`
    /// Gantree: create_simulator(sim_key, model_key) -> Result // 시뮬레이터 생성
    pub fn create_simulator(&self, sim_key: &str, model_key: &str) -> InsResult<()> {
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::CreatingSimulator),
        );
        let sim_key = op.new_key(sim_key);
        let model_key = existing_key(model_key);
        let result = self.create(&sim_key, &model_key);
        op.finish(result, |_| {
            Notification::new(MessageKey::CreatedSimulator)
                .with("key", &sim_key)
                .with("source", &model_key)
        })
    }

    fn create(&self, sim_key: &str, model_key: &str) -> InsResult<()> {
        let link = self.linked()?;
        let mut blocker = link.key_blocker.lock()?;
        let models = link.noise_models.read()?;
        let mut simulators = self.simulators.write()?;

        let source = models.lookup(model_key)?;
        simulators.ensure_absent(sim_key)?;
        blocker.check_blocked_key(sim_key, InstanceCategory::Simulator)?;

        let backend = self
            .factory
            .create(Arc::clone(&source.noise_model), source.coupling_map.clone())?;
        log::debug!(
            "backend '{}' with {} qubits for simulator '{}'",
            backend.name(),
            backend.num_qubits(),
            sim_key
        );

        let instance = SimulatorInstance {
            noise_model_source: model_key.to_string(),
            backend,
            created_at: Utc::now(),
        };
        blocker.block_key(model_key, InstanceCategory::NoiseModel, sim_key)?;
        if let Err(e) = simulators.register(sim_key, instance) {
            blocker.unblock_key(model_key, InstanceCategory::NoiseModel, sim_key)?;
            return Err(e);
        }
        Ok(())
    }

    /// Remove a simulator, releasing its noise model key
    /// Gantree: remove_simulator_instance(key) -> Result // 시뮬레이터 삭제
    pub fn remove_simulator_instance(&self, sim_key: &str) -> InsResult<()> {
        let instance_type = InstanceCategory::Simulator.label();
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::RemovingInstance).with("instance_type", instance_type),
        );
        let sim_key = existing_key(sim_key);
        let result = self.remove(&sim_key);
        op.finish(result, |_| {
            Notification::new(MessageKey::RemovedInstance)
                .with("instance_type", instance_type)
                .with("key", &sim_key)
        })
    }

    fn remove(&self, sim_key: &str) -> InsResult<()> {
        self.simulators.read()?.ensure_present(sim_key)?;
        let link = self.linked()?;
        let mut blocker = link.key_blocker.lock()?;
        let mut simulators = self.simulators.write()?;

        let source = simulators.lookup(sim_key)?.noise_model_source.clone();
        blocker.unblock_key(&source, InstanceCategory::NoiseModel, sim_key)?;
        simulators.remove(sim_key).map(|_| ())
    }

    // ========================================================================
    // Run
    // ========================================================================

    /// Transpile `circuit` for the simulator and submit it
    /// Gantree: run_simulator(key, circuit, level, shots) -> Result<JobHandle> // 실행
    ///
    /// Returns as soon as the job is submitted.
    pub fn run_simulator(
        &self,
        sim_key: &str,
        circuit: &Circuit,
        optimization_level: u8,
        shots: u64,
    ) -> InsResult<JobHandle> {
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::RunningSimulator),
        );
        let sim_key = existing_key(sim_key);
        let result = self.run(&op, &sim_key, circuit, optimization_level, shots);
        op.finish(result, |job| {
            Notification::new(MessageKey::JobSubmitted)
                .with("key", &sim_key)
                .with("job_id", job.job_id())
                .with("shots", shots)
        })
    }

    fn run(
        &self,
        op: &Operation<'_>,
        sim_key: &str,
        circuit: &Circuit,
        optimization_level: u8,
        shots: u64,
    ) -> InsResult<JobHandle> {
        if !execution::is_valid_optimization_level(optimization_level) {
            return Err(InsError::InvalidOptimizationLevel(optimization_level));
        }
        if shots == 0 {
            return Err(InsError::InvalidShots(shots));
        }

        // The backend outlives the registry lock
        let backend = Arc::clone(&self.simulators.read()?.lookup(sim_key)?.backend);
        let transpiled =
            Transpiler::for_backend(backend.as_ref(), optimization_level)?.transpile(circuit)?;
        op.note(
            Notification::new(MessageKey::TranspiledCircuit)
                .with("gates", transpiled.gate_count())
                .with("depth", transpiled.depth())
                .with("level", optimization_level),
        );
        backend.run(&transpiled, shots)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Clone of one simulator instance
    pub fn get_instance(&self, sim_key: &str) -> InsResult<SimulatorInstance> {
        Ok(self
            .simulators
            .read()?
            .lookup(&existing_key(sim_key))?
            .clone())
    }

    /// Gantree: get_instance_data() -> Result<InstanceListing> // 목록
    pub fn get_instance_data(&self) -> InsResult<InstanceListing> {
        let model_keys = match &self.link {
            Some(link) => link.noise_models.read()?.keys(),
            None => Vec::new(),
        };
        let simulators = self.simulators.read()?;

        let mut listing = InstanceListing::new(&[
            "Reference key",
            "Noise model source",
            "Noise model source availability",
            "Qubits",
            "Noisy",
        ]);
        for (key, instance) in simulators.iter() {
            listing.push_row(vec![
                key.to_string(),
                instance.noise_model_source.clone(),
                source_availability(model_keys.contains(&instance.noise_model_source)),
                instance.qubit_count().to_string(),
                yes_no(instance.has_noise()),
            ]);
        }
        Ok(listing)
    }

    pub fn instance_keys(&self) -> InsResult<Vec<String>> {
        Ok(self.simulators.read()?.keys())
    }
}
