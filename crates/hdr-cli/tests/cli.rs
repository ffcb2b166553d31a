//! End-to-end runs of the `hdr` binary on files it does not need external
//! tools for.

use std::path::Path;
use std::process::{Command, Output};

fn hdr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hdr"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(out: &Output) -> String {
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn path_str(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn mux_then_inspect() {
    let dir = tempfile::tempdir().unwrap();
    let sdr = dir.path().join("sdr.jpg");
    let gm = dir.path().join("gm.jpg");
    let out = dir.path().join("out.jpg");
    std::fs::write(&sdr, [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x03, 0x00, 0xFF, 0xD9]).unwrap();
    std::fs::write(&gm, [0xFF, 0xD8, 0xFF, 0xD9]).unwrap();

    let muxed = hdr(&["mux", path_str(&sdr), path_str(&gm), "-o", path_str(&out), "--headroom", "4"]);
    stdout(&muxed);

    let text = stdout(&hdr(&["inspect", path_str(&out)]));
    assert!(text.contains("SOI check:  ok"));
    assert!(text.contains("GainMapMax: 2.0000 stops"));
    assert!(text.contains("(gain map)"));
}

#[test]
fn plan_pq_on_hdr_target() {
    let dir = tempfile::tempdir().unwrap();
    let desc = dir.path().join("desc.yaml");
    std::fs::write(&desc, "primaries: bt2020\ntransfer: pq\nrange: full\n").unwrap();

    let text = stdout(&hdr(&["plan", path_str(&desc), "--hdr-target", "--builtin-profiles"]));
    assert!(text.contains("A: absolute HDR (PQ)"));
    assert!(text.contains("Stages:     none (passthrough)"));
}

#[test]
fn plan_accepts_probe_output() {
    let dir = tempfile::tempdir().unwrap();
    let json = dir.path().join("probe.json");
    std::fs::write(
        &json,
        r#"{"streams":[{"codec_type":"video","color_primaries":"bt709","color_transfer":"bt709","color_range":"tv"}]}"#,
    )
    .unwrap();
    let probe = stdout(&hdr(&["probe", "--json", path_str(&json)]));
    let probed = dir.path().join("probed.yaml");
    std::fs::write(&probed, probe).unwrap();

    let text = stdout(&hdr(&["plan", path_str(&probed), "--sdr-target", "--builtin-profiles"]));
    assert!(text.contains("C: standard SDR"));
    assert!(text.contains("RangeExpand"));
}

#[test]
fn curve_table() {
    let text = stdout(&hdr(&["curve", "hlg", "--size", "5"]));
    assert_eq!(text.lines().count(), 5);
    assert!(text.starts_with("0.000000 0.000000"));
}

#[test]
fn mux_rejects_non_jpeg() {
    let dir = tempfile::tempdir().unwrap();
    let sdr = dir.path().join("sdr.gif");
    std::fs::write(&sdr, b"GIF89a").unwrap();
    let out = hdr(&["mux", path_str(&sdr), path_str(&sdr), "-o", path_str(&dir.path().join("o.jpg"))]);
    assert!(!out.status.success());
}
