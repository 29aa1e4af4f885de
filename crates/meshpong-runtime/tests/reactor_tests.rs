#[cfg(test)]
mod tests {
    use meshpong_core::{CommandBytes, DeviceAddr, Handle, MeshEvent};
    use meshpong_mesh::{RecordingStore, StoreCall};
    use meshpong_runtime::*;
    use tracing_test::traced_test;

    const COUNT: u8 = 20;

    fn h(raw: u8) -> Handle {
        Handle::new(raw).unwrap()
    }

    fn addr() -> DeviceAddr {
        DeviceAddr::new([1, 2, 3, 4, 5, 0xC6])
    }

    fn responder() -> Responder<RecordingStore> {
        Responder::new(addr(), RecordingStore::new(), LedIndicator::new(), COUNT)
    }

    fn value_events(handle: Handle) -> [MeshEvent; 3] {
        [
            MeshEvent::NewValue { handle },
            MeshEvent::UpdateValue { handle },
            MeshEvent::ConflictingValue { handle },
        ]
    }

    // ── Initial state ──────────────────────────────────────────

    #[test]
    fn test_starts_unset_with_address_payload() {
        let r = responder();
        assert_eq!(r.state().filter(), Filter::Unset);
        assert_eq!(r.state().counter(), 0);
        assert_eq!(r.state().payload().as_bytes(), &[1, 2, 3, 4, 5, 0xC6, 0, 0]);
    }

    #[test]
    fn test_unset_filter_disables_everything() {
        let mut r = responder();
        for raw in 1..=COUNT {
            let outcome = r.on_event(MeshEvent::NewValue { handle: h(raw) }).unwrap();
            assert_eq!(outcome, EventOutcome::Disabled { handle: h(raw) });
        }
        assert_eq!(r.store().disables().len(), COUNT as usize);
        assert!(r.store().sets().is_empty());
        assert_eq!(r.state().counter(), 0);
    }

    // ── Event reactor ──────────────────────────────────────────

    #[test]
    fn test_matching_handle_republishes_once() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("7\n")).unwrap();

        for event in value_events(h(7)) {
            let calls_before = r.store().calls().len();
            let counter_before = r.state().counter();

            let outcome = r.on_event(event).unwrap();

            let new_calls = &r.store().calls()[calls_before..];
            assert_eq!(new_calls.len(), 1);
            match &new_calls[0] {
                StoreCall::Set { handle, value } => {
                    assert_eq!(*handle, h(7));
                    assert_eq!(value[6], counter_before.wrapping_add(1));
                    assert_eq!(&value[..6], &[1, 2, 3, 4, 5, 0xC6]);
                }
                other => panic!("expected set, got {other:?}"),
            }
            assert_eq!(
                outcome,
                EventOutcome::Republished {
                    handle: h(7),
                    counter: counter_before.wrapping_add(1)
                }
            );
        }
        assert!(r.store().disables().is_empty());
    }

    #[test]
    fn test_wildcard_republishes_every_handle() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("0\n")).unwrap();
        let sets_before = r.store().sets().len();

        for raw in 1..=COUNT {
            let counter_before = r.state().counter();
            r.on_event(MeshEvent::NewValue { handle: h(raw) }).unwrap();
            assert_eq!(r.state().counter(), counter_before.wrapping_add(1));
        }

        let sets = r.store().sets();
        assert_eq!(sets.len() - sets_before, COUNT as usize);
        assert!(r.store().disables().is_empty());
    }

    #[test]
    fn test_other_handle_is_disabled_without_mutation() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("5\n")).unwrap();
        let payload_before = *r.state().payload();
        let calls_before = r.store().calls().len();

        for raw in (1..=COUNT).filter(|&raw| raw != 5) {
            for event in value_events(h(raw)) {
                let outcome = r.on_event(event).unwrap();
                assert_eq!(outcome, EventOutcome::Disabled { handle: h(raw) });
            }
        }

        let new_calls = &r.store().calls()[calls_before..];
        assert_eq!(new_calls.len(), (COUNT as usize - 1) * 3);
        assert!(
            new_calls
                .iter()
                .all(|c| matches!(c, StoreCall::Disable { handle } if handle.get() != 5))
        );
        assert_eq!(*r.state().payload(), payload_before);
        assert_eq!(r.state().filter(), Filter::Handle(h(5)));
    }

    #[test]
    fn test_lifecycle_events_are_inert() {
        for cmd in ["0\n", "5\n"] {
            let mut r = responder();
            r.on_command(&CommandBytes::from(cmd)).unwrap();
            let calls_before = r.store().calls().len();
            let state_before = r.state().clone();

            for _ in 0..3 {
                assert_eq!(
                    r.on_event(MeshEvent::Initialized).unwrap(),
                    EventOutcome::Acknowledged
                );
                assert_eq!(
                    r.on_event(MeshEvent::Tx { handle: h(5) }).unwrap(),
                    EventOutcome::Acknowledged
                );
            }

            assert_eq!(r.store().calls().len(), calls_before);
            assert_eq!(r.state().filter(), state_before.filter());
            assert_eq!(r.state().payload(), state_before.payload());
        }
    }

    #[test]
    fn test_indicator_toggles_only_on_interest() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("3\n")).unwrap();
        r.on_event(MeshEvent::UpdateValue { handle: h(3) }).unwrap();
        r.on_event(MeshEvent::UpdateValue { handle: h(4) }).unwrap();
        r.on_event(MeshEvent::Initialized).unwrap();
        assert_eq!(r.indicator().toggles(), 1);
        assert!(r.indicator().is_lit());
    }

    #[test]
    #[traced_test]
    fn test_wildcard_logs_event_tags() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("0\n")).unwrap();
        r.on_event(MeshEvent::UpdateValue { handle: h(4) }).unwrap();
        r.on_event(MeshEvent::ConflictingValue { handle: h(9) }).unwrap();
        r.on_event(MeshEvent::NewValue { handle: h(12) }).unwrap();
        assert!(logs_contain("U[4]"));
        assert!(logs_contain("C[9]"));
        assert!(logs_contain("N[12]"));
    }

    #[test]
    #[traced_test]
    fn test_single_handle_does_not_log_event_tags() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("4\n")).unwrap();
        r.on_event(MeshEvent::UpdateValue { handle: h(4) }).unwrap();
        assert!(!logs_contain("U[4]"));
    }

    #[test]
    fn test_store_errors_propagate() {
        let store = RecordingStore::new().failing_on(h(2));
        let mut r = Responder::new(addr(), store, LedIndicator::new(), COUNT);
        r.on_command(&CommandBytes::from("0\n")).unwrap_err();

        let store = RecordingStore::new().failing_on(h(2));
        let mut r = Responder::new(addr(), store, LedIndicator::new(), COUNT);
        r.on_command(&CommandBytes::from("1\n")).unwrap();
        assert!(r.on_event(MeshEvent::NewValue { handle: h(2) }).is_err());
    }

    // ── Command reactor ────────────────────────────────────────

    #[test]
    fn test_command_zero_broadcasts_to_all() {
        let mut r = responder();
        let outcome = r.on_command(&CommandBytes::from("0\n")).unwrap();
        assert_eq!(outcome, CommandOutcome::RespondingToAll { counter: 1 });
        assert_eq!(r.state().filter(), Filter::All);

        let sets = r.store().sets();
        assert_eq!(sets.len(), COUNT as usize);
        let handles: Vec<u8> = sets.iter().map(|(h, _)| h.get()).collect();
        assert_eq!(handles, (1..=COUNT).collect::<Vec<_>>());
        assert!(sets.iter().all(|(_, v)| *v == sets[0].1));
        assert_eq!(sets[0].1[6], 1);
        assert!(r.store().disables().is_empty());
    }

    #[test]
    #[traced_test]
    fn test_command_out_of_bounds_is_rejected() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("5\n")).unwrap();
        let calls_before = r.store().calls().len();
        let counter_before = r.state().counter();

        let outcome = r.on_command(&CommandBytes::from("21\n")).unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Rejected(ConfigurationError::OutOfBounds {
                requested: 21,
                max: COUNT
            })
        );
        assert_eq!(r.state().filter(), Filter::Handle(h(5)));
        assert_eq!(r.state().counter(), counter_before);
        assert_eq!(r.store().calls().len(), calls_before);
        logs_assert(|lines: &[&str]| {
            match lines.iter().filter(|l| l.contains("OUT OF BOUNDS!")).count() {
                1 => Ok(()),
                n => Err(format!("expected one rejection line, saw {n}")),
            }
        });
        assert!(logs_contain("MAX: 20"));
    }

    #[test]
    fn test_command_five_sets_one_handle() {
        let mut r = responder();
        let outcome = r.on_command(&CommandBytes::from("5\n")).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::RespondingTo {
                handle: h(5),
                counter: 1
            }
        );
        assert_eq!(r.state().filter(), Filter::Handle(h(5)));
        let sets = r.store().sets();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].0, h(5));
        assert_eq!(sets[0].1[6], 1);
    }

    #[test]
    fn test_short_commands_are_ignored() {
        let mut r = responder();
        for cmd in ["", "5", "\n"] {
            assert_eq!(
                r.on_command(&CommandBytes::from(cmd)).unwrap(),
                CommandOutcome::Ignored
            );
        }
        assert!(r.store().calls().is_empty());
        assert_eq!(r.state().filter(), Filter::Unset);
    }

    #[test]
    fn test_highest_handle_is_accepted() {
        let mut r = responder();
        let outcome = r.on_command(&CommandBytes::from("20\n")).unwrap();
        assert!(matches!(outcome, CommandOutcome::RespondingTo { handle, .. } if handle.get() == 20));
    }

    #[test]
    fn test_non_numeric_is_wildcard_when_lenient() {
        let mut r = responder();
        let outcome = r.on_command(&CommandBytes::from("hello\n")).unwrap();
        assert_eq!(outcome, CommandOutcome::RespondingToAll { counter: 1 });
        assert_eq!(r.state().filter(), Filter::All);
    }

    #[test]
    fn test_non_numeric_is_rejected_when_strict() {
        let mut r = responder().with_parse_mode(ParseMode::Strict);
        r.on_command(&CommandBytes::from("3\n")).unwrap();
        let outcome = r.on_command(&CommandBytes::from("hello\n")).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Rejected(ConfigurationError::NotANumber("hello".into()))
        );
        assert_eq!(r.state().filter(), Filter::Handle(h(3)));
        assert_eq!(r.store().sets().len(), 1);
    }

    #[test]
    #[traced_test]
    fn test_negative_handle_is_rejected() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("5\n")).unwrap();
        let calls_before = r.store().calls().len();

        let outcome = r.on_command(&CommandBytes::from("-3\n")).unwrap();

        assert_eq!(
            outcome,
            CommandOutcome::Rejected(ConfigurationError::OutOfBounds {
                requested: -3,
                max: COUNT
            })
        );
        assert_eq!(r.state().filter(), Filter::Handle(h(5)));
        assert_eq!(r.store().calls().len(), calls_before);
        assert!(logs_contain("OUT OF BOUNDS!"));
    }

    #[test]
    fn test_negative_zero_is_wildcard() {
        let mut r = responder();
        let outcome = r.on_command(&CommandBytes::from("-0\n")).unwrap();
        assert_eq!(outcome, CommandOutcome::RespondingToAll { counter: 1 });
        assert_eq!(r.state().filter(), Filter::All);
        assert_eq!(r.store().sets().len(), usize::from(COUNT));
    }

    #[test]
    fn test_huge_number_is_out_of_bounds() {
        let mut r = responder();
        let outcome = r
            .on_command(&CommandBytes::from("99999999999999999999999\n"))
            .unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::Rejected(ConfigurationError::OutOfBounds {
                requested: i64::MAX,
                max: COUNT
            })
        );
    }

    #[test]
    fn test_reconfigure_overwrites_filter() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("0\n")).unwrap();
        assert_eq!(r.state().filter(), Filter::All);
        r.on_command(&CommandBytes::from("9\n")).unwrap();
        assert_eq!(r.state().filter(), Filter::Handle(h(9)));
        r.on_event(MeshEvent::NewValue { handle: h(1) }).unwrap();
        assert_eq!(r.store().disables(), vec![h(1)]);
    }

    // ── Parsing ────────────────────────────────────────────────

    #[test]
    fn test_parse_handle() {
        assert_eq!(parse_handle(b"5\n"), Some(5));
        assert_eq!(parse_handle(b"  12abc"), Some(12));
        assert_eq!(parse_handle(b"+7\r\n"), Some(7));
        assert_eq!(parse_handle(b"007"), Some(7));
        assert_eq!(parse_handle(b"-3\n"), Some(-3));
        assert_eq!(parse_handle(b" -0"), Some(0));
        assert_eq!(parse_handle(b"-"), None);
        assert_eq!(parse_handle(b"+-1"), None);
        assert_eq!(parse_handle(b"abc"), None);
        assert_eq!(parse_handle(b""), None);
    }

    #[test]
    fn test_usage_names_range() {
        assert!(usage(20).ends_with("MAX: 20"));
        assert_eq!(responder().usage(), usage(20));
    }

    // ── Counter wraparound ─────────────────────────────────────

    #[test]
    fn test_counter_wraps_after_256_increments() {
        let mut r = responder();
        r.on_command(&CommandBytes::from("0\n")).unwrap();
        let start = r.state().counter();

        // 1 more command plus 255 events: 256 increments in total.
        r.on_command(&CommandBytes::from("6\n")).unwrap();
        for _ in 0..255 {
            r.on_event(MeshEvent::UpdateValue { handle: h(6) }).unwrap();
        }
        assert_eq!(r.state().counter(), start);
        assert_eq!(r.state().payload().address(), addr());
    }
}
