//! Tests for logging initialization and the status layer.

use super::*;
use serial_test::serial;
use std::fs;
use std::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;

fn capture(layer: StatusLayer, emit: impl FnOnce()) {
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, emit);
}

mod status_layer {
    use super::*;

    #[test]
    fn forwards_warnings_and_errors() {
        let (tx, rx) = mpsc::channel();
        capture(StatusLayer::new(tx), || {
            tracing::warn!("minimap overlay missing");
            tracing::error!("store notification failed");
        });

        let first = rx.try_recv().expect("warning forwarded");
        assert_eq!(first.level, Level::WARN);
        assert_eq!(first.message, "minimap overlay missing");

        let second = rx.try_recv().expect("error forwarded");
        assert_eq!(second.level, Level::ERROR);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn drops_events_below_min_level() {
        let (tx, rx) = mpsc::channel();
        capture(StatusLayer::new(tx), || {
            tracing::info!("accepted source data");
            tracing::debug!("selection changed");
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn custom_min_level_includes_info() {
        let (tx, rx) = mpsc::channel();
        capture(StatusLayer::with_min_level(tx, Level::INFO), || {
            tracing::info!("accepted source data");
            tracing::trace!("tick");
        });
        assert_eq!(rx.try_recv().unwrap().level, Level::INFO);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn appends_structured_fields() {
        let (tx, rx) = mpsc::channel();
        capture(StatusLayer::new(tx), || {
            tracing::warn!(nodes = 3, "pruned {}", "stale handles");
        });
        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.message, "pruned stale handles nodes=3");
        assert_eq!(entry.to_string(), "WARN: pruned stale handles nodes=3");
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        capture(StatusLayer::new(tx), || {
            tracing::error!("nobody is listening");
        });
    }
}

mod init {
    use super::*;

    #[test]
    #[serial(tracing_init)]
    fn creates_log_directory_if_missing() {
        let test_dir = std::env::temp_dir().join("topoview_test_logs_create");
        let log_file = test_dir.join("test.log");
        let _ = fs::remove_dir_all(&test_dir);

        // the global subscriber may already be set by another test
        let _ = init(&log_file, None);

        assert!(
            test_dir.exists(),
            "Log directory should be created: {:?}",
            test_dir
        );
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn succeeds_when_directory_already_exists() {
        let test_dir = std::env::temp_dir().join("topoview_test_logs_exists");
        let log_file = test_dir.join("test.log");
        let _ = fs::create_dir_all(&test_dir);

        let (tx, _rx) = mpsc::channel();
        let _ = init(&log_file, Some(tx));

        assert!(test_dir.exists());
        let _ = fs::remove_dir_all(&test_dir);
    }

    #[test]
    #[serial(tracing_init)]
    fn second_init_reports_subscriber_already_set() {
        let test_dir = std::env::temp_dir().join("topoview_test_logs_twice");
        let log_file = test_dir.join("twice.log");

        let _ = init(&log_file, None);
        let second = init(&log_file, None);
        assert!(matches!(second, Err(LoggingError::SubscriberAlreadySet)));
        let _ = fs::remove_dir_all(&test_dir);
    }
}
