//! Noise data manager
//!
//! Gantree: L6_Engine → NoiseDataManager
//!
//! Imports calibration CSV exports as noise data instances and answers
//! per-qubit queries. The manager owns the key blocker that the
//! downstream managers share after linking.

use crate::instances::{InstanceListing, NoiseDataInstance};
use crate::operation::{existing_key, Operation};
use chrono::Utc;
use noisim_calibration::{load_calibration_csv, CalibrationConfig, CellValue};
use noisim_core::{
    InsResult, InstanceCategory, KeyBlocker, KeyRegistry, MessageKey, Notification, QubitId,
    SharedNotifier,
};
use std::path::Path;
use std::sync::{Arc, Mutex, RwLock};

/// Display name and value of every column of one qubit
pub type QubitData = Vec<(String, CellValue)>;

/// Shared lock tables
pub type SharedKeyBlocker = Arc<Mutex<KeyBlocker>>;

/// Shared noise data registry
pub type SharedNoiseData = Arc<RwLock<KeyRegistry<NoiseDataInstance>>>;

/// Gantree: NoiseDataManager // 보정 데이터 관리자
pub struct NoiseDataManager {
    /// Gantree: config: CalibrationConfig // 가져오기 설정
    config: CalibrationConfig,

    notifier: SharedNotifier,

    /// Gantree: key_blocker: Arc<Mutex<KeyBlocker>> // 공유 차단 테이블
    key_blocker: SharedKeyBlocker,

    /// Gantree: noise_data: Arc<RwLock<KeyRegistry>> // 데이터 레지스트리
    noise_data: SharedNoiseData,
}

impl NoiseDataManager {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Gantree: new(config, notifier) -> Self // 생성자
    pub fn new(config: CalibrationConfig, notifier: SharedNotifier) -> Self {
        Self {
            config,
            notifier,
            key_blocker: Arc::new(Mutex::new(KeyBlocker::new())),
            noise_data: Arc::new(RwLock::new(KeyRegistry::new(InstanceCategory::NoiseData))),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Lock tables shared with the managers linked downstream
    pub fn key_blocker(&self) -> SharedKeyBlocker {
        Arc::clone(&self.key_blocker)
    }

    /// Registry handle read by the noise model manager
    pub fn noise_data(&self) -> SharedNoiseData {
        Arc::clone(&self.noise_data)
    }

    // ========================================================================
    // Import / Remove
    // ========================================================================

    /// Import a calibration CSV under `key`
    /// Gantree: import_csv_data(key, path) -> Result // CSV 가져오기
    pub fn import_csv_data(&self, key: &str, path: impl AsRef<Path>) -> InsResult<()> {
        let op = Operation::begin(&self.notifier, Notification::new(MessageKey::ImportingCsv));
        let key = op.new_key(key);
        let result = self.import(&op, &key, path.as_ref());
        op.finish(result, |_| {
            Notification::new(MessageKey::SuccessfulCsvImport).with("key", &key)
        })
    }

    fn import(&self, op: &Operation<'_>, key: &str, path: &Path) -> InsResult<()> {
        let blocker = self.key_blocker.lock()?;
        let mut data = self.noise_data.write()?;
        data.ensure_absent(key)?;
        blocker.check_blocked_key(key, InstanceCategory::NoiseData)?;

        let (table, summary) = load_calibration_csv(path, &self.config)?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let full_path = std::fs::canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        op.note(
            Notification::new(MessageKey::CsvFileInformation)
                .with("file_name", &file_name)
                .with("full_path", &full_path),
        );
        if let Some(reset_time) = summary.default_reset_time {
            op.note(Notification::new(MessageKey::DefaultResetTime).with("reset_time", reset_time));
        }
        log::debug!(
            "imported '{}': {} qubits, {} missing cells",
            key,
            table.num_qubits(),
            summary.missing_cells
        );

        data.register(
            key,
            NoiseDataInstance {
                file_name,
                full_path,
                table,
                summary,
                created_at: Utc::now(),
            },
        )
    }

    /// Remove a noise data instance no noise model depends on
    /// Gantree: remove_noise_data_instance(key) -> Result // 인스턴스 삭제
    pub fn remove_noise_data_instance(&self, key: &str) -> InsResult<()> {
        let instance_type = InstanceCategory::NoiseData.label();
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::RemovingInstance).with("instance_type", instance_type),
        );
        let key = existing_key(key);
        let result = self.remove(&key);
        op.finish(result, |_| {
            Notification::new(MessageKey::RemovedInstance)
                .with("instance_type", instance_type)
                .with("key", &key)
        })
    }

    fn remove(&self, key: &str) -> InsResult<()> {
        let blocker = self.key_blocker.lock()?;
        let mut data = self.noise_data.write()?;
        data.ensure_present(key)?;
        blocker.check_blocked_key(key, InstanceCategory::NoiseData)?;
        data.remove(key).map(|_| ())
    }

    // ========================================================================
    // Qubit Queries
    // ========================================================================

    /// Calibration data of one qubit, in catalogue order
    /// Gantree: get_qubit_data(key, q) -> Result<QubitData> // 큐비트 조회
    pub fn get_qubit_data(&self, key: &str, qubit: i64) -> InsResult<QubitData> {
        let key = existing_key(key);
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::RetrievingQubitData),
        );
        let result = self.with_instance(&key, |instance| {
            let q = instance.validate_qubit(qubit)?;
            Ok(instance.table.qubit_data(q, &self.config))
        });
        op.finish(result, |_| {
            Notification::new(MessageKey::QubitDataRetrieved)
                .with("qubit", qubit)
                .with("key", &key)
        })
    }

    /// Calibration data of several qubits; nothing is returned unless
    /// every index is valid
    pub fn get_qubits_data(&self, key: &str, qubits: &[i64]) -> InsResult<Vec<(QubitId, QubitData)>> {
        let key = existing_key(key);
        let op = Operation::begin(
            &self.notifier,
            Notification::new(MessageKey::RetrievingQubitData),
        );
        let result = self.with_instance(&key, |instance| {
            let validated = qubits
                .iter()
                .map(|&q| instance.validate_qubit(q))
                .collect::<InsResult<Vec<_>>>()?;
            Ok(validated
                .into_iter()
                .map(|q| (q, instance.table.qubit_data(q, &self.config)))
                .collect())
        });
        let listed = qubits
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        op.finish(result, |_| {
            Notification::new(MessageKey::QubitDataRetrieved)
                .with("qubit", listed)
                .with("key", &key)
        })
    }

    /// Calibration data of every qubit
    /// Gantree: get_all_qubit_data(key) -> Result<Vec> // 전체 조회
    pub fn get_all_qubit_data(&self, key: &str) -> InsResult<Vec<(QubitId, QubitData)>> {
        let key = existing_key(key);
        self.with_instance(&key, |instance| {
            Ok((0..instance.qubit_count())
                .map(|q| (q, instance.table.qubit_data(q, &self.config)))
                .collect())
        })
    }

    fn with_instance<R>(
        &self,
        key: &str,
        f: impl FnOnce(&NoiseDataInstance) -> InsResult<R>,
    ) -> InsResult<R> {
        let data = self.noise_data.read()?;
        f(data.lookup(key)?)
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Clone of one noise data instance
    pub fn get_instance(&self, key: &str) -> InsResult<NoiseDataInstance> {
        self.with_instance(&existing_key(key), |instance| Ok(instance.clone()))
    }

    /// Gantree: get_instance_data() -> Result<InstanceListing> // 목록
    pub fn get_instance_data(&self) -> InsResult<InstanceListing> {
        let data = self.noise_data.read()?;
        let mut listing = InstanceListing::new(&[
            "Reference key",
            "Source file",
            "Source file path on device",
        ]);
        for (key, instance) in data.iter() {
            listing.push_row(vec![
                key.to_string(),
                instance.file_name.clone(),
                instance.full_path.clone(),
            ]);
        }
        Ok(listing)
    }

    pub fn instance_keys(&self) -> InsResult<Vec<String>> {
        Ok(self.noise_data.read()?.keys())
    }

    /// Display name and description of every catalogue column
    /// Gantree: help_csv_columns() -> Vec<(name, description)> // 열 도움말
    pub fn help_csv_columns(&self) -> Vec<(String, String)> {
        self.config
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.description.clone()))
            .collect()
    }
}
