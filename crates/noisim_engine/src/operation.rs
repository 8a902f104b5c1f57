//! Notification stream of one manager operation
//!
//! Gantree: L6_Engine → Operation
//!
//! Every operation opens with a heading, may add info or warning lines,
//! and closes with either a success line or `OperationFailed`.

use noisim_core::{
    normalize_reference_key, InsResult, MessageKey, Notification, SharedNotifier,
};

/// Gantree: Operation // 작업 알림
pub(crate) struct Operation<'a> {
    notifier: &'a SharedNotifier,
}

impl<'a> Operation<'a> {
    /// Emit the heading and start the operation
    pub(crate) fn begin(notifier: &'a SharedNotifier, heading: Notification) -> Self {
        notifier.notify(heading);
        Self { notifier }
    }

    pub(crate) fn note(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Normalize the key of an instance about to be created
    pub(crate) fn new_key(&self, raw: &str) -> String {
        let (key, modified) = normalize_reference_key(raw);
        if modified {
            self.note(
                Notification::new(MessageKey::ModifiedReferenceKey)
                    .with("original", raw)
                    .with("key", &key),
            );
        }
        key
    }

    /// Close the operation with a success line or the error
    /// Gantree: finish(result, success) -> Result // 작업 종료
    pub(crate) fn finish<T>(
        self,
        result: InsResult<T>,
        success: impl FnOnce(&T) -> Notification,
    ) -> InsResult<T> {
        match &result {
            Ok(value) => self.note(success(value)),
            Err(e) => {
                log::debug!("operation failed: {:?}", e);
                self.note(Notification::new(MessageKey::OperationFailed).with("error", e));
            }
        }
        result
    }
}

/// Normalize a key that refers to an existing instance
pub(crate) fn existing_key(raw: &str) -> String {
    normalize_reference_key(raw).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use noisim_core::{InsError, RecordingNotifier};
    use std::sync::Arc;

    #[test]
    fn test_success_stream() {
        let recorder = Arc::new(RecordingNotifier::new());
        let notifier: SharedNotifier = recorder.clone();

        let op = Operation::begin(&notifier, Notification::new(MessageKey::ImportingCsv));
        let key = op.new_key("my data");
        let result = op.finish(Ok(3), |n| {
            Notification::new(MessageKey::SuccessfulCsvImport).with("key", n)
        });

        assert_eq!(key, "my_data");
        assert_eq!(result, Ok(3));
        assert_eq!(
            recorder.rendered(),
            vec![
                "Importing CSV data".to_string(),
                "Reference key 'my data' contains spaces; it was saved as 'my_data'".to_string(),
                "CSV data was imported as noise data instance '3'".to_string(),
            ]
        );
    }

    #[test]
    fn test_failure_stream() {
        let recorder = Arc::new(RecordingNotifier::new());
        let notifier: SharedNotifier = recorder.clone();

        let op = Operation::begin(&notifier, Notification::new(MessageKey::CreatingSimulator));
        assert_eq!(op.new_key("s1"), "s1");
        let result: InsResult<()> = op.finish(Err(InsError::InvalidShots(0)), |_| {
            Notification::new(MessageKey::CreatedSimulator)
        });

        assert!(result.is_err());
        assert_eq!(recorder.count(MessageKey::ModifiedReferenceKey), 0);
        assert_eq!(recorder.count(MessageKey::CreatedSimulator), 0);
        assert_eq!(
            recorder.last(MessageKey::OperationFailed).map(|n| n.render()),
            Some(InsError::InvalidShots(0).to_string())
        );
    }

    #[test]
    fn test_existing_key_is_silent() {
        assert_eq!(existing_key("a b\tc"), "a_b_c");
    }
}
