use audio_switch_rs::audio::{EndpointInfo, MemorySource, SourceCall};
use audio_switch_rs::{codec, defaults, mutate, pattern};
use audio_switch_rs::{DeviceRegistry, DeviceRole, DeviceState, Direction};

fn endpoint(id: &str, name: &str, direction: Direction) -> EndpointInfo {
    EndpointInfo::new(id, name, direction, DeviceState::Active)
}

#[test]
fn pattern_is_anchored_at_both_ends() {
    assert!(!pattern::matches("abc", "abcd"));
    assert!(pattern::matches("abc*", "abcd"));
    assert!(pattern::matches("*Astro*Game*", "Astro Game"));
}

#[test]
fn assign_picks_first_astro_game_device() {
    let source = MemorySource::new()
        .with(endpoint("astro", "Astro Game", Direction::Playback))
        .with(endpoint("other", "Other", Direction::Playback));
    let mut registry = DeviceRegistry::build(&source).unwrap();

    let found = defaults::assign(
        &mut registry,
        &source,
        DeviceRole::Console,
        Direction::Playback,
        "*Astro*Game*",
    );

    assert!(found);
    assert_eq!(
        source.journal(),
        vec![SourceCall::SetDefault {
            device_id: "astro".to_string(),
            role: DeviceRole::Console,
        }]
    );
}

#[test]
fn assign_tie_break_follows_enumeration_order() {
    let source = MemorySource::new()
        .with(endpoint("one", "USB Audio", Direction::Capture))
        .with(endpoint("two", "USB Audio", Direction::Capture));
    let mut registry = DeviceRegistry::build(&source).unwrap();

    for _ in 0..3 {
        assert!(defaults::assign(
            &mut registry,
            &source,
            DeviceRole::Communications,
            Direction::Capture,
            "USB Audio",
        ));
    }

    assert!(source.journal().iter().all(|c| c.device_id() == "one"));
}

#[test]
fn inverted_unmute_skips_only_the_mic() {
    let source = MemorySource::new();
    source.add(endpoint("a", "Speakers", Direction::Playback), 0.2, -20.0, true);
    source.add(endpoint("b", "Mic Array", Direction::Capture), 0.2, -20.0, true);
    source.add(endpoint("c", "Line In", Direction::Capture), 0.2, -20.0, true);
    let mut registry = DeviceRegistry::build(&source).unwrap();

    let summary = mutate::apply(&mut registry, &source, 1.0, false, "*Mic*", true);

    assert_eq!(summary.written, 2);
    assert_eq!(source.levels("a"), Some((1.0, -20.0, false)));
    assert_eq!(source.levels("c"), Some((1.0, -20.0, false)));
    assert_eq!(source.levels("b"), Some((0.2, -20.0, true)));
    for id in ["a", "b", "c"] {
        assert!(source.calls_for(id).contains(&SourceCall::SetVisible {
            device_id: id.to_string(),
            visible: true,
        }));
    }
}

#[test]
fn save_then_load_round_trips_active_devices() {
    let source = MemorySource::new();
    source.add(endpoint("spk", "Speakers", Direction::Playback), 0.42, -7.25, false);
    source.add(endpoint("hp", "Headphones", Direction::Playback), 0.9, -1.5, true);
    source.add(endpoint("mic", "Microphone", Direction::Capture), 0.33, -12.0, true);
    source.set_current_default(Direction::Playback, DeviceRole::Console, "hp");
    source.set_current_default(Direction::Playback, DeviceRole::Communications, "spk");
    source.set_current_default(Direction::Capture, DeviceRole::Console, "mic");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.cfg");

    let mut registry = DeviceRegistry::build(&source).unwrap();
    codec::save(&mut registry, &source, &path).unwrap();
    let before = registry.devices().to_vec();

    // Scramble everything, then restore.
    mutate::apply(&mut registry, &source, 0.0, false, "*", false);
    let playback = Direction::Playback;
    defaults::assign(&mut registry, &source, DeviceRole::Console, playback, "Speakers");
    defaults::assign(&mut registry, &source, DeviceRole::Communications, playback, "Headphones");

    let mut registry = DeviceRegistry::build(&source).unwrap();
    let summary = codec::load(&mut registry, &source, &path).unwrap();
    assert_eq!(summary.records_matched, 3);
    assert!(summary.unknown_names.is_empty());

    let after = DeviceRegistry::build(&source).unwrap();
    assert_eq!(after.devices(), before.as_slice());
}

#[test]
fn load_ignores_records_for_absent_devices() {
    let source = MemorySource::new()
        .with(endpoint("spk", "Speakers", Direction::Playback))
        .with(endpoint("mic", "Microphone", Direction::Capture));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.cfg");
    std::fs::write(
        &path,
        "Name: Old Headset\nVolumeScalar: 0\nVolumeLevel: -60\nIsMute: 1\n\
         IsDefaultPlayback: 1\nIsDefaultRecording: 0\nIsDefaultCommunicationPlayback: 1\n\
         IsDefaultCommunicationRecording: 0\nState: 1\n\
         Name: Microphone\nVolumeScalar: 0.5\nVolumeLevel: -6\nIsMute: 1\n\
         IsDefaultPlayback: 0\nIsDefaultRecording: 1\nIsDefaultCommunicationPlayback: 0\n\
         IsDefaultCommunicationRecording: 0\nState: 1\n",
    )
    .unwrap();

    let mut registry = DeviceRegistry::build(&source).unwrap();
    let summary = codec::load(&mut registry, &source, &path).unwrap();

    assert_eq!(summary.unknown_names, vec!["Old Headset".to_string()]);
    assert!(source.calls_for("spk").is_empty());
    assert_eq!(source.levels("mic"), Some((0.5, -6.0, true)));
    assert_eq!(
        source.default_for(Direction::Capture, DeviceRole::Console),
        Some("mic".to_string())
    );
}
