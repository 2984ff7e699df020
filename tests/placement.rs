use assert_fs::TempDir;
use assert_fs::prelude::*;
use filemover::{
    CollisionAvoidance, Config, DestinationCollision, FileOutcome, Mover, MoverConfig,
    RenamePipeline, SourceRetention, TimestampPolicy, TimestampPosition,
};
use predicates::prelude::*;

fn two_destination_mover(
    td: &TempDir,
    retention: SourceRetention,
    collision: DestinationCollision,
    avoidance: CollisionAvoidance,
) -> Mover {
    let config = MoverConfig::builder()
        .name("reports")
        .source_directory(td.child("inbox").path())
        .destination_directories([td.child("archive").path(), td.child("backup").path()])
        .file_types(["csv"])
        .keep_source_behavior(retention)
        .destination_collision_behavior(collision)
        .collision_avoidance_behavior(avoidance)
        .build()
        .unwrap();
    Mover::new(config)
}

#[test]
fn one_colliding_destination_is_left_alone_and_source_kept() {
    let td = TempDir::new().unwrap();
    td.child("inbox/q1.csv").write_str("fresh").unwrap();
    td.child("backup/q1.csv").write_str("stale").unwrap();

    let mover = two_destination_mover(
        &td,
        SourceRetention::KeepIfNoneCollide,
        DestinationCollision::Ignore,
        CollisionAvoidance::None,
    );
    let summary = mover.move_files();

    assert_eq!(summary.matched, 1);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.removed, 0);
    td.child("archive/q1.csv").assert("fresh");
    td.child("backup/q1.csv").assert("stale");
    td.child("inbox/q1.csv").assert(predicate::path::exists());
}

#[test]
fn cancel_if_any_collide_touches_nothing() {
    let td = TempDir::new().unwrap();
    td.child("inbox/q1.csv").write_str("fresh").unwrap();
    td.child("backup/q1.csv").write_str("stale").unwrap();

    for retention in SourceRetention::ALL {
        let mover = two_destination_mover(
            &td,
            retention,
            DestinationCollision::Overwrite,
            CollisionAvoidance::CancelIfAnyCollide,
        );
        let summary = mover.move_files();

        assert_eq!(summary.cancelled, 1, "{retention}");
        td.child("archive/q1.csv").assert(predicate::path::missing());
        td.child("backup/q1.csv").assert("stale");
        td.child("inbox/q1.csv").assert("fresh");
    }
}

#[test]
fn plain_move_removes_source() {
    let td = TempDir::new().unwrap();
    td.child("inbox/q1.csv").write_str("data").unwrap();
    td.child("inbox/notes.txt").write_str("ignored").unwrap();

    let mover = two_destination_mover(
        &td,
        SourceRetention::NeverKeep,
        DestinationCollision::Ignore,
        CollisionAvoidance::None,
    );
    mover.move_files();

    td.child("archive/q1.csv").assert("data");
    td.child("backup/q1.csv").assert("data");
    td.child("inbox/q1.csv").assert(predicate::path::missing());
    td.child("inbox/notes.txt").assert(predicate::path::exists());
}

#[test]
fn timestamped_rename_is_identical_across_destinations() {
    let td = TempDir::new().unwrap();
    td.child("inbox/q1.csv").write_str("data").unwrap();

    let config = MoverConfig::builder()
        .source_directory(td.child("inbox").path())
        .destination_directories([td.child("a").path(), td.child("b").path()])
        .file_type("csv")
        .keep_source_behavior(SourceRetention::AlwaysKeep)
        .rename(
            RenamePipeline::builder()
                .prefix("PRE_")
                .timestamp(
                    TimestampPolicy::new("%Y%m%d%H%M%S%f", Some("UTC"), TimestampPosition::AfterPrefix)
                        .unwrap(),
                )
                .build(),
        )
        .build()
        .unwrap();
    let mover = Mover::new(config);

    let source = td.child("inbox/q1.csv");
    let plan = mover.plan(source.path()).unwrap();
    let outcome = mover.process_file(source.path()).unwrap();

    let FileOutcome::Placed { written, .. } = outcome else {
        panic!("expected placement");
    };
    assert_eq!(written.len(), 2);
    let names: Vec<_> = written.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
    assert_eq!(names[0], names[1]);

    let name = names[0].to_string_lossy();
    assert!(name.starts_with("PRE_"));
    assert!(name.ends_with("_q1.csv"));
    assert_eq!(plan.destinations.len(), 2);
}

#[test]
fn recursive_flag_controls_nested_matches() {
    let td = TempDir::new().unwrap();
    td.child("inbox/top.csv").touch().unwrap();
    td.child("inbox/2024/nested.csv").touch().unwrap();

    let build = |recursive| {
        Mover::new(
            MoverConfig::builder()
                .source_directory(td.child("inbox").path())
                .destination_directory(td.child("out").path())
                .file_type("csv")
                .recursive(recursive)
                .build()
                .unwrap(),
        )
    };

    let flat = build(false).get_matched_files();
    assert_eq!(flat, vec![td.child("inbox/top.csv").path().to_path_buf()]);

    let deep = build(true).get_matched_files();
    assert_eq!(deep.len(), 2);
    assert!(deep.contains(&td.child("inbox/2024/nested.csv").path().to_path_buf()));
}

#[test]
fn config_document_drives_a_full_run() {
    let td = TempDir::new().unwrap();
    td.child("in/Report_Q1.XLS").write_str("q1").unwrap();
    td.child("in/summary.pdf").write_str("pdf").unwrap();

    let doc = serde_json::json!({
        "mover_name": "spreadsheets",
        "source_directory": td.child("in").path(),
        "destination_directory": td.child("out").path(),
        "file_type_regex": "(?i)xl(s|t)x?$",
        "keep_source_behavior": "always_keep",
        "rename": {
            "replace": [{"search": "report_", "replace": "rpt-"}]
        }
    });
    td.child("mover.json").write_str(&doc.to_string()).unwrap();

    let config = Config::load(Some(td.child("mover.json").path())).unwrap();
    let movers = config.movers().unwrap();
    assert_eq!(movers[0].name(), "spreadsheets");

    Mover::new(movers[0].clone()).move_files();

    // Case-insensitive replace lower-cases the whole name
    td.child("out/rpt-q1.xls").assert("q1");
    td.child("out/summary.pdf").assert(predicate::path::missing());
    td.child("in/Report_Q1.XLS").assert(predicate::path::exists());
}
