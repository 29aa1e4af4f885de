#[cfg(test)]
mod tests {
    use meshpong_core::*;

    // ── Handle tests ───────────────────────────────────────────

    #[test]
    fn test_handle_rejects_wildcard_and_sentinel() {
        assert!(Handle::new(0).is_none());
        assert!(Handle::new(255).is_none());
        assert_eq!(Handle::new(7).unwrap().get(), 7);
    }

    #[test]
    fn test_handle_within_count() {
        let h = Handle::new(20).unwrap();
        assert!(h.within(20));
        assert!(!h.within(19));
    }

    #[test]
    fn test_handle_all_is_ascending_and_complete() {
        let all: Vec<u8> = Handle::all(20).map(Handle::get).collect();
        assert_eq!(all.len(), 20);
        assert_eq!(all.first(), Some(&1));
        assert_eq!(all.last(), Some(&20));
        assert!(all.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_handle_all_caps_at_max_count() {
        assert_eq!(Handle::all(255).count(), 254);
        assert_eq!(Handle::all(0).count(), 0);
    }

    #[test]
    fn test_handle_serde_rejects_zero() {
        let h: Handle = serde_json::from_str("5").unwrap();
        assert_eq!(h.get(), 5);
        assert!(serde_json::from_str::<Handle>("0").is_err());
    }

    // ── DeviceAddr tests ───────────────────────────────────────

    #[test]
    fn test_device_addr_parse_and_display() {
        let addr: DeviceAddr = "c1:02:03:04:05:06".parse().unwrap();
        // Least significant byte first in memory.
        assert_eq!(addr.as_bytes(), &[0x06, 0x05, 0x04, 0x03, 0x02, 0xc1]);
        assert_eq!(addr.to_string(), "c1:02:03:04:05:06");
    }

    #[test]
    fn test_device_addr_rejects_garbage() {
        assert!("c1:02:03".parse::<DeviceAddr>().is_err());
        assert!("zz:02:03:04:05:06".parse::<DeviceAddr>().is_err());
        assert!("c1:2:03:04:05:06".parse::<DeviceAddr>().is_err());
    }

    #[test]
    fn test_device_addr_random_is_static() {
        let addr = DeviceAddr::random();
        assert_eq!(addr.as_bytes()[5] & 0xC0, 0xC0);
    }

    // ── Payload tests ──────────────────────────────────────────

    #[test]
    fn test_payload_layout() {
        let addr = DeviceAddr::new([1, 2, 3, 4, 5, 6]);
        let payload = Payload::new(addr);
        assert_eq!(payload.as_bytes(), &[1, 2, 3, 4, 5, 6, 0, 0]);
        assert_eq!(payload.as_bytes().len(), MAX_VALUE_LENGTH);
        assert_eq!(payload.address(), addr);
        assert_eq!(payload.counter(), 0);
    }

    #[test]
    fn test_payload_counter_wraps() {
        let mut payload = Payload::new(DeviceAddr::new([9; 6]));
        for _ in 0..255 {
            payload.bump();
        }
        assert_eq!(payload.counter(), 255);
        assert_eq!(payload.bump(), 0);
        assert_eq!(payload.address(), DeviceAddr::new([9; 6]));
    }

    // ── Event tests ────────────────────────────────────────────

    #[test]
    fn test_event_tags_are_distinct() {
        let h = Handle::new(3).unwrap();
        let events = [
            MeshEvent::UpdateValue { handle: h },
            MeshEvent::ConflictingValue { handle: h },
            MeshEvent::NewValue { handle: h },
            MeshEvent::Initialized,
            MeshEvent::Tx { handle: h },
        ];
        let tags: String = events.iter().map(MeshEvent::tag).collect();
        assert_eq!(tags, "UCNIT");
    }

    #[test]
    fn test_event_value_handle() {
        let h = Handle::new(3).unwrap();
        assert_eq!(MeshEvent::NewValue { handle: h }.value_handle(), Some(h));
        assert_eq!(MeshEvent::Tx { handle: h }.value_handle(), None);
        assert_eq!(MeshEvent::Initialized.value_handle(), None);
    }

    #[test]
    fn test_event_serde_tagged() {
        let event = MeshEvent::ConflictingValue {
            handle: Handle::new(4).unwrap(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"conflicting_value\""));
        let restored: MeshEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, event);
    }

    // ── CommandBytes tests ─────────────────────────────────────

    #[test]
    fn test_command_bytes_keeps_framing() {
        let cmd = CommandBytes::from("5\n");
        assert_eq!(cmd.len(), 2);
        assert_eq!(cmd.as_bytes(), b"5\n");
        assert!(CommandBytes::default().is_empty());
    }

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = MeshpongError::Store {
            handle: 4,
            reason: "radio busy".into(),
        };
        let s = err.to_string();
        assert!(s.contains("handle 4"));
        assert!(s.contains("radio busy"));
    }

    #[test]
    fn test_error_invalid_handle() {
        let err = MeshpongError::InvalidHandle { handle: 30, max: 20 };
        assert_eq!(err.to_string(), "handle 30 is outside 1..=20");
    }
}
