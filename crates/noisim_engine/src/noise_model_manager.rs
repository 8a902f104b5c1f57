//! Noise model manager
//!
//! Gantree: L6_Engine → NoiseModelManager
//!
//! Builds noise model instances from linked noise data. Each model pins
//! the data key it was built from until the model is removed.

use crate::instances::{source_availability, yes_no, InstanceListing, NoiseModelInstance};
use crate::noise_data_manager::{NoiseDataManager, SharedKeyBlocker, SharedNoiseData};
use crate::operation::{existing_key, Operation};
use chrono::Utc;
use noisim_calibration::CalibrationConfig;
use noisim_core::{
    CouplingMap, InsError, InsResult, InstanceCategory, KeyRegistry, MessageKey, Notification,
    SharedNotifier,
};
use noisim_noise::{derive_noise_parameters, ErrorModelBuilder, NoiseModelBuilder};
use std::sync::{Arc, RwLock};

/// Shared noise model registry
pub type SharedNoiseModels = Arc<RwLock<KeyRegistry<NoiseModelInstance>>>;

/// Handles taken from the noise data manager when linking
#[derive(Clone)]
struct DataLink {
    key_blocker: SharedKeyBlocker,
    noise_data: SharedNoiseData,
}

/// Gantree: NoiseModelManager // 노이즈 모델 관리자
pub struct NoiseModelManager {
    /// Gantree: builder: Arc<dyn ErrorModelBuilder> // 모델 빌더
    builder: Arc<dyn ErrorModelBuilder>,

    config: CalibrationConfig,

    notifier: SharedNotifier,

    /// Gantree: link: Option<DataLink> // 데이터 관리자 연결
    link: Option<DataLink>,

    /// Gantree: noise_models: Arc<RwLock<KeyRegistry>> // 모델 레지스트리
    noise_models: SharedNoiseModels,
}

impl NoiseModelManager {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Gantree: new(builder, config, notifier) -> Self // 생성자
    pub fn new(
        builder: Arc<dyn ErrorModelBuilder>,
        config: CalibrationConfig,
        notifier: SharedNotifier,
    ) -> Self {
        Self {
            builder,
            config,
            notifier,
            link: None,
            noise_models: Arc::new(RwLock::new(KeyRegistry::new(InstanceCategory::NoiseModel))),
        }
    }

    /// Manager using the bundled [`NoiseModelBuilder`]
    pub fn with_default_builder(config: CalibrationConfig, notifier: SharedNotifier) -> Self {
        Self::new(Arc::new(NoiseModelBuilder::new()), config, notifier)
    }

    /// Registry handle read by the simulator manager
    pub fn noise_models(&self) -> SharedNoiseModels {
        Arc::clone(&self.noise_models)
    }

    /// Key blocker shared through the linked noise data manager
    pub fn key_blocker(&self) -> Option<SharedKeyBlocker> {
        self.link.as_ref().map(|l| Arc::clone(&l.key_blocker))
    }

    pub fn is_linked(&self) -> bool {
        self.link.is_some()
    }

    /// Gantree: link_noise_data_manager(&NoiseDataManager) -> Result // 연결
    ///
    /// A manager links once. Its models pin data keys in the lock table
    /// of that noise data manager, and linked simulator managers share it.
    pub fn link_noise_data_manager(&mut self, manager: &NoiseDataManager) -> InsResult<()> {
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::LinkingManager).with("manager", "NoiseDataManager"),
        );
        let result = if self.link.is_some() {
            Err(InsError::AlreadyLinked {
                manager: "NoiseModelManager".to_string(),
                linked: "NoiseDataManager".to_string(),
            })
        } else {
            self.link = Some(DataLink {
                key_blocker: manager.key_blocker(),
                noise_data: manager.noise_data(),
            });
            Ok(())
        };
        op.finish(result, |_| {
            Notification::new(MessageKey::LinkingSuccess)
                .with("manager", "NoiseModelManager")
                .with("linked", "NoiseDataManager")
        })
    }

    fn linked(&self) -> InsResult<&DataLink> {
        self.link.as_ref().ok_or_else(|| InsError::Linkage {
            manager: "NoiseModelManager".to_string(),
            required: "NoiseDataManager".to_string(),
            method: "link_noise_data_manager".to_string(),
        })
    }

    // ========================================================================
    // Create / Remove
    // ========================================================================

    /// Build a noise model from the noise data under `data_key`
    /// Gantree: create_noise_model(model_key, data_key) -> Result // 모델 생성
    pub fn create_noise_model(&self, model_key: &str, data_key: &str) -> InsResult<()> {
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::CreatingNoiseModel),
        );
        let model_key = op.new_key(model_key);
        let data_key = existing_key(data_key);
        let result = self.create(&op, &model_key, &data_key);
        op.finish(result, |_| {
            Notification::new(MessageKey::CreatedNoiseModel)
                .with("key", &model_key)
                .with("source", &data_key)
        })
    }

    fn create(&self, op: &Operation<'_>, model_key: &str, data_key: &str) -> InsResult<()> {
        let link = self.linked()?;
        let mut blocker = link.key_blocker.lock()?;
        let data = link.noise_data.read()?;
        let mut models = self.noise_models.write()?;

        let source = data.lookup(data_key)?;
        models.ensure_absent(model_key)?;
        blocker.check_blocked_key(model_key, InstanceCategory::NoiseModel)?;

        let params = derive_noise_parameters(&source.table, &self.config)?;
        let noise_model = self.builder.build(&params)?;
        let coupling_map = CouplingMap::new(params.num_qubits, params.coupling_edges.clone())?;

        if !params.skipped.is_empty() {
            op.note(
                Notification::new(MessageKey::SkippedCalibrationValue)
                    .with("count", params.skipped.len()),
            );
        }
        if noise_model.is_ideal() {
            op.note(Notification::new(MessageKey::NoiselessModel).with("key", model_key));
        }

        let instance = NoiseModelInstance {
            data_source: data_key.to_string(),
            noise_model,
            coupling_map,
            created_at: Utc::now(),
        };
        blocker.block_key(data_key, InstanceCategory::NoiseData, model_key)?;
        if let Err(e) = models.register(model_key, instance) {
            blocker.unblock_key(data_key, InstanceCategory::NoiseData, model_key)?;
            return Err(e);
        }
        log::debug!("noise model '{}' pins noise data '{}'", model_key, data_key);
        Ok(())
    }

    /// Remove a noise model no simulator depends on, releasing its data key
    /// Gantree: remove_noise_model_instance(key) -> Result // 모델 삭제
    pub fn remove_noise_model_instance(&self, model_key: &str) -> InsResult<()> {
        let instance_type = InstanceCategory::NoiseModel.label();
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::RemovingInstance).with("instance_type", instance_type),
        );
        let model_key = existing_key(model_key);
        let result = self.remove(&model_key);
        op.finish(result, |_| {
            Notification::new(MessageKey::RemovedInstance)
                .with("instance_type", instance_type)
                .with("key", &model_key)
        })
    }

    fn remove(&self, model_key: &str) -> InsResult<()> {
        self.noise_models.read()?.ensure_present(model_key)?;
        let link = self.linked()?;
        let mut blocker = link.key_blocker.lock()?;
        let mut models = self.noise_models.write()?;

        let data_source = models.lookup(model_key)?.data_source.clone();
        blocker.check_blocked_key(model_key, InstanceCategory::NoiseModel)?;
        blocker.unblock_key(&data_source, InstanceCategory::NoiseData, model_key)?;
        models.remove(model_key).map(|_| ())
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Clone of one noise model instance
    pub fn get_instance(&self, model_key: &str) -> InsResult<NoiseModelInstance> {
        Ok(self
            .noise_models
            .read()?
            .lookup(&existing_key(model_key))?
            .clone())
    }

    /// Gantree: get_instance_data() -> Result<InstanceListing> // 목록
    pub fn get_instance_data(&self) -> InsResult<InstanceListing> {
        let data_keys = match &self.link {
            Some(link) => link.noise_data.read()?.keys(),
            None => Vec::new(),
        };
        let models = self.noise_models.read()?;

        let mut listing = InstanceListing::new(&[
            "Reference key",
            "Data source",
            "Data source availability",
            "Qubits",
            "Noisy",
            "Basis gates",
        ]);
        for (key, instance) in models.iter() {
            listing.push_row(vec![
                key.to_string(),
                instance.data_source.clone(),
                source_availability(data_keys.contains(&instance.data_source)),
                instance.qubit_count().to_string(),
                yes_no(instance.has_noise()),
                instance.basis_gates_str(),
            ]);
        }
        Ok(listing)
    }

    pub fn instance_keys(&self) -> InsResult<Vec<String>> {
        Ok(self.noise_models.read()?.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_fixture, DEVICE_CSV, NOISELESS_CSV};
    use noisim_core::RecordingNotifier;
    use noisim_noise::{ErrorModel, NoiseParameters};

    struct Setup {
        data: NoiseDataManager,
        models: NoiseModelManager,
        recorder: Arc<RecordingNotifier>,
    }

    fn setup(csv: &str, name: &str) -> Setup {
        let recorder = Arc::new(RecordingNotifier::new());
        let data = NoiseDataManager::new(CalibrationConfig::default(), recorder.clone());
        let mut models =
            NoiseModelManager::with_default_builder(CalibrationConfig::default(), recorder.clone());
        models.link_noise_data_manager(&data).unwrap();
        data.import_csv_data("d1", write_fixture(name, csv)).unwrap();
        Setup {
            data,
            models,
            recorder,
        }
    }

    #[test]
    fn test_unlinked_manager() {
        let recorder = Arc::new(RecordingNotifier::new());
        let models =
            NoiseModelManager::with_default_builder(CalibrationConfig::default(), recorder.clone());
        assert!(!models.is_linked());
        assert!(models.key_blocker().is_none());

        let err = models.create_noise_model("m1", "d1").unwrap_err();
        assert!(matches!(err, InsError::Linkage { .. }));
        assert_eq!(recorder.count(MessageKey::OperationFailed), 1);
        assert!(models.get_instance_data().unwrap().rows.is_empty());
    }

    #[test]
    fn test_link_notifications() {
        let s = setup(DEVICE_CSV, "model_link.csv");
        assert!(s.models.is_linked());
        assert_eq!(
            s.recorder
                .last(MessageKey::LinkingSuccess)
                .map(|n| n.render()),
            Some("NoiseModelManager is now linked to NoiseDataManager".to_string())
        );
    }

    #[test]
    fn test_second_link_rejected() {
        let s = setup(DEVICE_CSV, "model_relink.csv");
        let mut models = s.models;
        models.create_noise_model("m1", "d1").unwrap();

        let other = NoiseDataManager::new(CalibrationConfig::default(), s.recorder.clone());
        other
            .import_csv_data("d2", write_fixture("model_relink_other.csv", DEVICE_CSV))
            .unwrap();
        assert!(matches!(
            models.link_noise_data_manager(&other),
            Err(InsError::AlreadyLinked { .. })
        ));
        assert_eq!(s.recorder.count(MessageKey::LinkingSuccess), 1);
        assert_eq!(s.recorder.count(MessageKey::OperationFailed), 1);

        // Still bound to the first data manager
        assert!(matches!(
            models.create_noise_model("m2", "d2"),
            Err(InsError::MissingKey { .. })
        ));
        models.remove_noise_model_instance("m1").unwrap();
        s.data.remove_noise_data_instance("d1").unwrap();
    }

    #[test]
    fn test_create_pins_data_key() {
        let s = setup(DEVICE_CSV, "model_create.csv");
        s.models.create_noise_model("m1", "d1").unwrap();

        let instance = s.models.get_instance("m1").unwrap();
        assert_eq!(instance.data_source, "d1");
        assert_eq!(instance.qubit_count(), 5);
        assert!(instance.has_noise());
        assert!(instance.coupling_map.is_connected(3, 4));
        assert!(!instance.coupling_map.is_connected(0, 4));

        let blocker = s.data.key_blocker();
        assert_eq!(
            blocker.lock().unwrap().blocker_of("d1", InstanceCategory::NoiseData),
            Some("m1")
        );
        // Qubit 3 reports no √X error
        assert_eq!(s.recorder.count(MessageKey::SkippedCalibrationValue), 1);
        assert_eq!(s.recorder.count(MessageKey::CreatedNoiseModel), 1);
    }

    #[test]
    fn test_create_rejections_leave_state() {
        let s = setup(DEVICE_CSV, "model_reject.csv");
        s.models.create_noise_model("m1", "d1").unwrap();

        assert!(matches!(
            s.models.create_noise_model("m1", "d1"),
            Err(InsError::DuplicateKey { .. })
        ));
        assert!(matches!(
            s.models.create_noise_model("m2", "nope"),
            Err(InsError::MissingKey { .. })
        ));
        assert_eq!(s.models.instance_keys().unwrap(), vec!["m1"]);
        assert_eq!(
            s.data
                .key_blocker()
                .lock()
                .unwrap()
                .blockers_of("d1", InstanceCategory::NoiseData),
            &["m1".to_string()]
        );
    }

    #[test]
    fn test_noiseless_model_warning() {
        let s = setup(NOISELESS_CSV, "model_noiseless.csv");
        s.models.create_noise_model("quiet", "d1").unwrap();
        assert!(!s.models.get_instance("quiet").unwrap().has_noise());
        assert_eq!(
            s.recorder.last(MessageKey::NoiselessModel).map(|n| n.render()),
            Some("Noise model 'quiet' contains no errors".to_string())
        );
    }

    #[test]
    fn test_remove_releases_data_key() {
        let s = setup(DEVICE_CSV, "model_remove.csv");
        s.models.create_noise_model("m1", "d1").unwrap();
        assert!(s.data.remove_noise_data_instance("d1").is_err());

        s.models.remove_noise_model_instance("m1").unwrap();
        assert!(s.models.instance_keys().unwrap().is_empty());
        s.data.remove_noise_data_instance("d1").unwrap();
    }

    #[test]
    fn test_listing_reports_source() {
        let s = setup(DEVICE_CSV, "model_listing.csv");
        s.models.create_noise_model("m 1", "d1").unwrap();

        let listing = s.models.get_instance_data().unwrap();
        assert_eq!(listing.column("Reference key"), vec!["m_1"]);
        assert_eq!(listing.column("Data source availability"), vec!["Available"]);
        assert_eq!(listing.column("Noisy"), vec!["Yes"]);
        assert_eq!(listing.column("Qubits"), vec!["5"]);
        assert!(listing.column("Basis gates")[0].starts_with("delay; measure; reset"));
    }

    #[derive(Debug)]
    struct FailingBuilder;

    impl ErrorModelBuilder for FailingBuilder {
        fn build(&self, _params: &NoiseParameters) -> InsResult<Arc<dyn ErrorModel>> {
            Err(InsError::InvalidErrorParameter("rejected".into()))
        }
    }

    #[test]
    fn test_builder_failure_leaves_no_lock() {
        let recorder = Arc::new(RecordingNotifier::new());
        let data = NoiseDataManager::new(CalibrationConfig::default(), recorder.clone());
        let mut models = NoiseModelManager::new(
            Arc::new(FailingBuilder),
            CalibrationConfig::default(),
            recorder.clone(),
        );
        models.link_noise_data_manager(&data).unwrap();
        data.import_csv_data("d1", write_fixture("model_failing.csv", DEVICE_CSV))
            .unwrap();

        assert!(models.create_noise_model("m1", "d1").is_err());
        assert!(models.instance_keys().unwrap().is_empty());
        assert!(!data
            .key_blocker()
            .lock()
            .unwrap()
            .is_blocked("d1", InstanceCategory::NoiseData));
    }
}
