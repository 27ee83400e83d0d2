mod support;

use simkit::prelude::*;
use support::{Journal, JournalToolkit, entries, env, registry};

fn settings_from(args: &[&str], registry: &BackendRegistry) -> Settings {
    let argv = std::iter::once("simulator").chain(args.iter().copied());
    match configure(argv, env(&[]), registry).expect("configure") {
        Startup::Run(settings) => settings,
        other => panic!("expected Run, got {:?}", other),
    }
}

#[test]
fn startup_sequence_runs_in_order() {
    let journal = Journal::default();
    let registry = registry(&journal, &[]);
    let settings = settings_from(&["-W", "480", "-H", "272"], &registry);

    launch(&settings, &registry, &mut JournalToolkit::new(&journal))
        .expect("launch");

    assert_eq!(
        entries(&journal),
        vec![
            "toolkit:init",
            "backend:init:lcd",
            "backend:init:touch",
            "toolkit:screen:lcd:480x272",
            "backend:run:lcd",
            "toolkit:timers",
        ]
    );
}

#[test]
fn selected_backend_replaces_the_default() {
    let journal = Journal::default();
    let registry = registry(&journal, &[]);
    let settings = settings_from(&["-b", "monitor"], &registry);

    launch(&settings, &registry, &mut JournalToolkit::new(&journal))
        .expect("launch");

    let log = entries(&journal);
    assert!(log.contains(&"backend:init:monitor".to_string()));
    assert!(!log.contains(&"backend:init:lcd".to_string()));
    assert!(log.contains(&"backend:run:monitor".to_string()));
}

#[test]
fn primary_failure_skips_aux_screen_and_run_loop() {
    let journal = Journal::default();
    let registry = registry(&journal, &["lcd"]);
    let settings = settings_from(&[], &registry);

    let err = launch(&settings, &registry, &mut JournalToolkit::new(&journal))
        .expect_err("primary failure is fatal");

    assert!(matches!(err, SimError::Init(InitError::Primary { .. })));
    assert_eq!(entries(&journal), vec!["toolkit:init", "backend:init:lcd"]);
}

#[test]
fn aux_failure_stops_before_the_screen_is_built() {
    let journal = Journal::default();
    let registry = registry(&journal, &["touch"]);
    let settings = settings_from(&[], &registry);

    let err = launch(&settings, &registry, &mut JournalToolkit::new(&journal))
        .expect_err("aux failure is fatal");

    assert!(matches!(err, SimError::Init(InitError::Auxiliary { .. })));
    assert_eq!(
        entries(&journal),
        vec!["toolkit:init", "backend:init:lcd", "backend:init:touch"]
    );
}

#[test]
fn listing_backends_initializes_nothing() {
    let journal = Journal::default();
    let registry = registry(&journal, &[]);

    let startup =
        configure(["simulator", "-B"], env(&[]), &registry).expect("-B");

    assert_eq!(
        startup,
        Startup::ListBackends(vec!["lcd", "monitor", "touch"])
    );
    assert!(entries(&journal).is_empty());
}

#[test]
fn unknown_backend_fails_before_init() {
    let journal = Journal::default();
    let registry = registry(&journal, &[]);

    let err = configure(["simulator", "-b", "vga"], env(&[]), &registry)
        .expect_err("unknown backend");

    assert!(matches!(err, ConfigError::UnknownBackend(_)));
    assert!(entries(&journal).is_empty());
}

#[test]
fn precedence_defaults_environment_flags() {
    let journal = Journal::default();
    let registry = registry(&journal, &[]);
    let lookup = env(&[
        ("LV_SIM_WINDOW_WIDTH", "1280"),
        ("LV_SIM_WINDOW_HEIGHT", "720"),
    ]);

    let Startup::Run(from_env) =
        configure(["simulator"], &lookup, &registry).unwrap()
    else {
        panic!("expected Run");
    };
    assert_eq!(from_env.window_size(), (1280, 720));

    let Startup::Run(from_flags) =
        configure(["simulator", "-W", "640"], &lookup, &registry).unwrap()
    else {
        panic!("expected Run");
    };
    assert_eq!(from_flags.window_size(), (640, 720));
}

#[test]
fn version_flag_reports_three_part_version_with_tag() {
    let registry = registry(&Journal::default(), &[]);
    let Startup::Version(version) =
        configure(["simulator", "-V"], env(&[]), &registry).unwrap()
    else {
        panic!("expected Version");
    };

    let (numbers, tag) = version.split_once('-').expect("build tag");
    assert_eq!(numbers.split('.').count(), 3);
    assert!(numbers.split('.').all(|n| n.parse::<u32>().is_ok()));
    assert!(!tag.is_empty());
}

// With the evdev feature the pointer device would have to exist as well.
#[cfg(not(feature = "evdev"))]
#[test]
#[serial_test::serial]
fn headless_backend_runs_to_the_frame_limit() {
    let journal = Journal::default();
    let registry = register_all().expect("built-in catalog");
    let settings = Settings {
        window_width: 32,
        window_height: 16,
        selected_backend: Some("headless".to_string()),
        frame_limit: Some(2),
        ..Settings::default()
    };

    launch(&settings, &registry, &mut JournalToolkit::new(&journal))
        .expect("headless run");

    let log = entries(&journal);
    assert_eq!(log[0], "toolkit:init");
    assert_eq!(log[1], "toolkit:screen:headless:32x16");
    assert!(log[2..].iter().all(|entry| entry == "toolkit:timers"));
    assert!(log.len() > 2);
}
