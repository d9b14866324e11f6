use system_volume::VolumeError;
use system_volume::backend::MockBackend;
use system_volume::controller::VolumeController;

fn controller_at(volume: u8) -> (VolumeController<MockBackend>, MockBackend) {
    let backend = MockBackend::with_volume(volume);
    let handle = backend.clone();
    (VolumeController::new(backend), handle)
}

/// Basic get/set behavior
#[cfg(test)]
mod simple_operations {
    use super::*;

    #[test]
    fn test_set_then_get_round_trip() {
        let (controller, _) = controller_at(50);

        for volume in [0, 1, 37, 99, 100] {
            controller.set_volume(volume).unwrap();
            assert_eq!(controller.volume().unwrap(), volume);
        }
    }

    #[test]
    fn test_set_volume_out_of_range_is_rejected() {
        let (controller, backend) = controller_at(50);

        let err = controller.set_volume(101).unwrap_err();
        assert!(matches!(err, VolumeError::InvalidArgument(_)));

        // Rejected before any adapter interaction
        assert_eq!(backend.write_count(), 0);
        assert_eq!(backend.read_count(), 0);
        assert_eq!(backend.current_volume(), 50);
    }

    #[test]
    fn test_backend_write_failure_propagates() {
        let (controller, backend) = controller_at(50);
        backend.set_write_failure(true);

        let err = controller.set_volume(70).unwrap_err();
        assert!(matches!(err, VolumeError::BackendUnavailable(_)));
    }

    #[test]
    fn test_backend_identity_passthrough() {
        let (controller, backend) = controller_at(50);

        assert_eq!(controller.backend_name(), "mock");
        assert_eq!(controller.current_device().as_deref(), Some("Mock Output"));

        backend.set_device_name(None);
        assert_eq!(controller.current_device(), None);
    }
}

/// Increment/decrement clamping
#[cfg(test)]
mod volume_steps {
    use super::*;

    #[test]
    fn test_increase_and_decrease() {
        let (controller, _) = controller_at(50);

        assert_eq!(controller.increase_volume(10).unwrap(), 60);
        assert_eq!(controller.decrease_volume(25).unwrap(), 35);
    }

    #[test]
    fn test_increase_never_exceeds_full() {
        for (start, step) in [(95, 10), (100, 1), (0, 200), (60, 255)] {
            let (controller, backend) = controller_at(start);
            assert_eq!(controller.increase_volume(step).unwrap(), 100);
            assert_eq!(backend.current_volume(), 100);
        }
    }

    #[test]
    fn test_decrease_never_drops_below_zero() {
        for (start, step) in [(5, 10), (0, 1), (100, 200), (40, 255)] {
            let (controller, backend) = controller_at(start);
            assert_eq!(controller.decrease_volume(step).unwrap(), 0);
            assert_eq!(backend.current_volume(), 0);
        }
    }

    #[test]
    fn test_zero_step_is_rejected_without_adapter_calls() {
        let (controller, backend) = controller_at(50);

        let err = controller.increase_volume(0).unwrap_err();
        assert!(matches!(err, VolumeError::InvalidArgument(_)));
        let err = controller.decrease_volume(0).unwrap_err();
        assert!(matches!(err, VolumeError::InvalidArgument(_)));

        assert_eq!(backend.read_count(), 0);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_read_failure_aborts_step_before_writing() {
        let (controller, backend) = controller_at(50);
        backend.set_read_failure(true);

        let err = controller.increase_volume(10).unwrap_err();
        assert!(matches!(err, VolumeError::BackendUnavailable(_)));
        assert_eq!(backend.write_count(), 0);
    }
}

/// Mute handling
#[cfg(test)]
mod mute_operations {
    use super::*;

    #[test]
    fn test_mute_and_unmute() {
        let (controller, backend) = controller_at(50);

        controller.mute().unwrap();
        assert!(controller.is_muted().unwrap());
        assert!(backend.currently_muted());

        controller.unmute().unwrap();
        assert!(!controller.is_muted().unwrap());
    }

    #[test]
    fn test_toggle_flips_and_reports_new_state() {
        let (controller, _) = controller_at(50);

        assert!(controller.toggle_mute().unwrap());
        assert!(controller.is_muted().unwrap());

        assert!(!controller.toggle_mute().unwrap());
        assert!(!controller.is_muted().unwrap());
    }

    #[test]
    fn test_mute_does_not_touch_volume() {
        let (controller, backend) = controller_at(42);

        controller.mute().unwrap();
        controller.unmute().unwrap();

        assert_eq!(backend.current_volume(), 42);
        assert_eq!(backend.write_count(), 0);
    }
}
