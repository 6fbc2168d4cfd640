mod common;
use crate::common::{batch, Clock, ConfigFileBuilder, GroupBuilder, SignalBuilder, TestResult};

use std::time::Duration;

use signalwatch::engine::SignalCore;
use signalwatch::Value;

#[test]
fn qualifying_signals_share_one_emission() -> TestResult {
    let clock = Clock::new();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("env", "report")
                .signal(SignalBuilder::new("a").build())
                .signal(SignalBuilder::new("b").build())
                .signal(SignalBuilder::new("c").build())
                .build(),
        )
        .with_group(
            GroupBuilder::new("idle", "sleep")
                .signal(SignalBuilder::new("z").build())
                .build(),
        )
        .build();
    let mut core = SignalCore::from_config(&cfg);

    // Update order differs from declaration order.
    let out = core.ingest_at(batch([("c", 3), ("a", 1), ("b", 2)]), clock.at(0.0));

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].action, "report");
    assert_eq!(out[0].group, "env");
    let names: Vec<&str> = out[0].values.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["a", "b", "c"]);

    Ok(())
}

#[test]
fn nothing_qualifying_means_no_emission() -> TestResult {
    let clock = Clock::new();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("env", "report")
                .signal(SignalBuilder::new("a").threshold(10.0).build())
                .build(),
        )
        .build();
    let mut core = SignalCore::from_config(&cfg);

    assert_eq!(core.ingest_at(batch([("a", 1)]), clock.at(0.0)).len(), 1);
    assert!(core.ingest_at(batch([("a", 2)]), clock.at(1.0)).is_empty());
    assert!(core.ingest_at(batch([("other", 2)]), clock.at(2.0)).is_empty());

    Ok(())
}

#[test]
fn groups_fire_in_declared_order() -> TestResult {
    let clock = Clock::new();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("halt", "stop")
                .signal(SignalBuilder::new("button").required("stop").build())
                .build(),
        )
        .with_group(
            GroupBuilder::new("status", "report")
                .signal(SignalBuilder::new("battery").build())
                .build(),
        )
        .build();
    let mut core = SignalCore::from_config(&cfg);

    let updates = batch([
        ("battery", Value::Int(80)),
        ("button", Value::Text("stop".into())),
    ]);
    let out = core.ingest_at(updates, clock.at(0.0));

    let actions: Vec<&str> = out.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["stop", "report"]);

    Ok(())
}

#[test]
fn groups_share_one_state_entry_per_name() -> TestResult {
    let clock = Clock::new();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("coarse", "big-change")
                .signal(SignalBuilder::new("temp").threshold(10.0).build())
                .build(),
        )
        .with_group(
            GroupBuilder::new("fine", "small-change")
                .signal(SignalBuilder::new("temp").threshold(1.0).build())
                .build(),
        )
        .build();
    let mut core = SignalCore::from_config(&cfg);

    // The first group records the emission on the shared entry, so the
    // second group compares against that same reading in this pass.
    let out = core.ingest_at(batch([("temp", 20.0)]), clock.at(0.0));
    let actions: Vec<&str> = out.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["big-change"]);

    let out = core.ingest_at(batch([("temp", 22.0)]), clock.at(1.0));
    let actions: Vec<&str> = out.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["small-change"]);

    assert_eq!(core.tracked(), 1);

    Ok(())
}

#[test]
fn one_shot_signal_refires_after_reset() -> TestResult {
    let clock = Clock::new();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("G", "wake")
                .signal(
                    SignalBuilder::new("motion")
                        .threshold(1.0)
                        .timeout(Duration::from_secs(5))
                        .reset(true)
                        .build(),
                )
                .build(),
        )
        .build();
    let mut core = SignalCore::from_config(&cfg);

    for t in [0.0, 1.0, 1.5] {
        let out = core.ingest_at(batch([("motion", 1)]), clock.at(t));
        assert_eq!(out.len(), 1, "t={t} should emit");
        assert_eq!(out[0].action, "wake");
        assert_eq!(out[0].values.get("motion"), Some(&Value::Int(1)));
        assert!(core.state("motion").is_none());
    }

    Ok(())
}

#[test]
fn one_shot_reset_hides_name_from_later_groups() -> TestResult {
    let clock = Clock::new();
    let cfg = ConfigFileBuilder::new()
        .with_group(
            GroupBuilder::new("pulse", "ring")
                .signal(SignalBuilder::new("doorbell").reset(true).build())
                .build(),
        )
        .with_group(
            GroupBuilder::new("log", "record")
                .signal(SignalBuilder::new("doorbell").build())
                .build(),
        )
        .build();
    let mut core = SignalCore::from_config(&cfg);

    let out = core.ingest_at(batch([("doorbell", true)]), clock.at(0.0));
    let actions: Vec<&str> = out.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["ring"]);

    Ok(())
}

#[test]
fn unreferenced_names_can_be_dropped() -> TestResult {
    let clock = Clock::new();
    let group = GroupBuilder::new("G", "wake")
        .signal(SignalBuilder::new("motion").build())
        .build();

    let mut keeping = SignalCore::from_config(
        &ConfigFileBuilder::new().with_group(group.clone()).build(),
    );
    keeping.ingest_at(batch([("motion", 1), ("noise", 5)]), clock.at(0.0));
    assert_eq!(keeping.tracked(), 2);

    let mut dropping = SignalCore::from_config(
        &ConfigFileBuilder::new()
            .with_group(group)
            .track_unreferenced(false)
            .build(),
    );
    let out = dropping.ingest_at(batch([("motion", 1), ("noise", 5)]), clock.at(0.0));
    assert_eq!(out.len(), 1);
    assert_eq!(dropping.tracked(), 1);
    assert!(dropping.state("noise").is_none());

    Ok(())
}
