//! User-facing notifications for NoiSim
//!
//! Gantree: L2_Bookkeeping → Notify
//!
//! Managers report every lifecycle event as a [`Notification`] (message
//! key plus placeholder values) to an injected [`Notifier`]. How the
//! stream is rendered is up to the notifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

// ============================================================================
// Severity and Message Keys
// ============================================================================

/// Gantree: Severity // 알림 등급
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Opens the output block of one operation
    Heading,
    Info,
    Success,
    Warning,
    Error,
}

/// Catalogue of every message a manager can emit
/// Gantree: MessageKey // 메시지 키
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKey {
    // ========================================================================
    // Headings
    // ========================================================================
    ImportingCsv,
    RemovingInstance,
    RetrievingQubitData,
    CreatingNoiseModel,
    CreatingSimulator,
    RunningSimulator,
    LinkingManager,

    // ========================================================================
    // Information
    // ========================================================================
    ModifiedReferenceKey,
    CsvFileInformation,
    DefaultResetTime,
    SkippedCalibrationValue,
    NoiselessModel,
    TranspiledCircuit,

    // ========================================================================
    // Success
    // ========================================================================
    SuccessfulCsvImport,
    RemovedInstance,
    QubitDataRetrieved,
    CreatedNoiseModel,
    CreatedSimulator,
    LinkingSuccess,
    JobSubmitted,

    // ========================================================================
    // Errors
    // ========================================================================
    OperationFailed,
}

impl MessageKey {
    /// Message text with `{placeholder}` slots
    /// Gantree: template() -> &str // 메시지 틀
    pub fn template(&self) -> &'static str {
        match self {
            MessageKey::ImportingCsv => "Importing CSV data",
            MessageKey::RemovingInstance => "Removing {instance_type}",
            MessageKey::RetrievingQubitData => "Retrieving qubit data",
            MessageKey::CreatingNoiseModel => "Creating noise model",
            MessageKey::CreatingSimulator => "Creating simulator",
            MessageKey::RunningSimulator => "Running simulator",
            MessageKey::LinkingManager => "Linking {manager}",
            MessageKey::ModifiedReferenceKey => {
                "Reference key '{original}' contains spaces; it was saved as '{key}'"
            }
            MessageKey::CsvFileInformation => "File '{file_name}' located at '{full_path}'",
            MessageKey::DefaultResetTime => {
                "Reset time is not part of the calibration export; using {reset_time} ns"
            }
            MessageKey::SkippedCalibrationValue => {
                "{count} calibration value(s) were missing and their errors were skipped"
            }
            MessageKey::NoiselessModel => "Noise model '{key}' contains no errors",
            MessageKey::TranspiledCircuit => {
                "Transpiled circuit: {gates} gates, depth {depth} (optimization level {level})"
            }
            MessageKey::SuccessfulCsvImport => {
                "CSV data was imported as noise data instance '{key}'"
            }
            MessageKey::RemovedInstance => "Removed {instance_type} '{key}'",
            MessageKey::QubitDataRetrieved => {
                "Retrieved data of qubit {qubit} from noise data instance '{key}'"
            }
            MessageKey::CreatedNoiseModel => {
                "Created noise model instance '{key}' from noise data instance '{source}'"
            }
            MessageKey::CreatedSimulator => {
                "Created simulator instance '{key}' from noise model instance '{source}'"
            }
            MessageKey::LinkingSuccess => "{manager} is now linked to {linked}",
            MessageKey::JobSubmitted => {
                "Simulator '{key}' accepted job {job_id} with {shots} shots"
            }
            MessageKey::OperationFailed => "{error}",
        }
    }

    /// Gantree: severity() -> Severity // 기본 등급
    pub fn severity(&self) -> Severity {
        match self {
            MessageKey::ImportingCsv
            | MessageKey::RemovingInstance
            | MessageKey::RetrievingQubitData
            | MessageKey::CreatingNoiseModel
            | MessageKey::CreatingSimulator
            | MessageKey::RunningSimulator
            | MessageKey::LinkingManager => Severity::Heading,
            MessageKey::ModifiedReferenceKey
            | MessageKey::SkippedCalibrationValue
            | MessageKey::NoiselessModel => Severity::Warning,
            MessageKey::CsvFileInformation
            | MessageKey::DefaultResetTime
            | MessageKey::TranspiledCircuit => Severity::Info,
            MessageKey::SuccessfulCsvImport
            | MessageKey::RemovedInstance
            | MessageKey::QubitDataRetrieved
            | MessageKey::CreatedNoiseModel
            | MessageKey::CreatedSimulator
            | MessageKey::LinkingSuccess
            | MessageKey::JobSubmitted => Severity::Success,
            MessageKey::OperationFailed => Severity::Error,
        }
    }
}

// ============================================================================
// Notification
// ============================================================================

/// One structured, user-visible event
/// Gantree: Notification // 알림
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub key: MessageKey,
    pub values: Vec<(String, String)>,
}

impl Notification {
    /// Gantree: new(key) -> Self // 생성자
    pub fn new(key: MessageKey) -> Self {
        Self {
            severity: key.severity(),
            key,
            values: Vec::new(),
        }
    }

    /// Attach a placeholder value
    pub fn with(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.values.push((name.to_string(), value.to_string()));
        self
    }

    /// Value of a placeholder, if set
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Fill the template; unknown placeholders are left as written
    /// Gantree: render() -> String // 메시지 생성
    pub fn render(&self) -> String {
        self.values
            .iter()
            .fold(self.key.template().to_string(), |text, (name, value)| {
                text.replace(&format!("{{{}}}", name), value)
            })
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

// ============================================================================
// Notifiers
// ============================================================================

/// Sink for notifications
/// Gantree: Notifier // trait
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Shared notifier handle
pub type SharedNotifier = Arc<dyn Notifier>;

/// Forwards notifications to the `log` facade
/// Gantree: LogNotifier // 로그 출력
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        let text = notification.render();
        match notification.severity {
            Severity::Heading => log::info!("== {} ==", text),
            Severity::Info | Severity::Success => log::info!("{}", text),
            Severity::Warning => log::warn!("{}", text),
            Severity::Error => log::error!("{}", text),
        }
    }
}

/// Discards every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps notifications in memory for presentation layers and tests
/// Gantree: RecordingNotifier // 기록 보관
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    records: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        // A panic while pushing cannot leave the Vec inconsistent
        self.records.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Snapshot of every notification so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.records().clone()
    }

    /// Number of notifications with the given key
    pub fn count(&self, key: MessageKey) -> usize {
        self.records().iter().filter(|n| n.key == key).count()
    }

    /// Most recent notification with the given key
    pub fn last(&self, key: MessageKey) -> Option<Notification> {
        self.records().iter().rev().find(|n| n.key == key).cloned()
    }

    /// Rendered lines, oldest first
    pub fn rendered(&self) -> Vec<String> {
        self.records().iter().map(Notification::render).collect()
    }

    pub fn clear(&self) {
        self.records().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.records().push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_values() {
        let n = Notification::new(MessageKey::ModifiedReferenceKey)
            .with("original", "my data")
            .with("key", "my_data");
        assert_eq!(
            n.render(),
            "Reference key 'my data' contains spaces; it was saved as 'my_data'"
        );
        assert_eq!(n.severity, Severity::Warning);
        assert_eq!(n.value("key"), Some("my_data"));
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let n = Notification::new(MessageKey::RemovedInstance).with("key", "d1");
        assert_eq!(n.render(), "Removed {instance_type} 'd1'");
    }

    #[test]
    fn test_every_heading_is_heading() {
        assert_eq!(MessageKey::ImportingCsv.severity(), Severity::Heading);
        assert_eq!(MessageKey::OperationFailed.severity(), Severity::Error);
    }

    #[test]
    fn test_recording_notifier() {
        let recorder = RecordingNotifier::new();
        recorder.notify(Notification::new(MessageKey::ImportingCsv));
        recorder.notify(Notification::new(MessageKey::OperationFailed).with("error", "boom"));

        assert_eq!(recorder.count(MessageKey::OperationFailed), 1);
        assert_eq!(
            recorder.last(MessageKey::OperationFailed).map(|n| n.render()),
            Some("boom".to_string())
        );
        assert_eq!(recorder.rendered(), vec!["Importing CSV data", "boom"]);

        recorder.clear();
        assert!(recorder.notifications().is_empty());
    }

    #[test]
    fn test_shared_notifier_object() {
        let shared: SharedNotifier = Arc::new(NullNotifier);
        shared.notify(Notification::new(MessageKey::LinkingManager));
        let log: SharedNotifier = Arc::new(LogNotifier);
        log.notify(Notification::new(MessageKey::LinkingManager).with("manager", "x"));
    }
}
