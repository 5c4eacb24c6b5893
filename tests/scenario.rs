/* embcordic | scenario.rs
 * Copyright (c) 2025 L. Sartory
 * SPDX-License-Identifier: MIT
 */

/* End to end checks through the public interface */

/******************************************************************************/

use approx::assert_abs_diff_eq;
use embcordic::*;

fn config() -> CordicConfig {
    CordicConfig::default().with_widths(12, 12, 19).with_stages(15).with_aux(true)
}

#[test]
fn quarter_turn_after_gain_correction() {
    let mut seq = SeqCordic::new(config()).unwrap();
    assert_abs_diff_eq!(seq.gain().value(), 1.1644, epsilon = 1e-4);

    let out = seq.rotate(Request::new(0x20000, 1000, 0).with_aux(true));
    assert!(out.done && out.aux);
    let c = seq.correction(16);
    assert!(c.apply(out.x).abs() <= 2);
    assert!((c.apply(out.y) - 1000).abs() <= 2);
}

#[test]
fn full_scale_inputs_keep_their_sign() {
    let mut seq = SeqCordic::new(config()).unwrap();
    let mut pipe = PipeCordic::new(config()).unwrap();
    let c = seq.correction(16);

    let out = seq.rotate(Request::new(0, 2047, 0));
    assert!((c.apply(out.x) - 2047).abs() <= 3, "x = {}", out.x);
    let out = seq.rotate(Request::new(0x40000, 2047, -2048));
    assert!((c.apply(out.x) + 2047).abs() <= 3 && (c.apply(out.y) - 2048).abs() <= 3, "{out:?}");

    for _ in 0..pipe.latency() {
        pipe.tick(Some(Request::new(0x60000, -2048, -2048)));
    }
    let out = pipe.output();
    assert!((c.apply(out.x) + 2048).abs() <= 3 && (c.apply(out.y) - 2048).abs() <= 3, "{out:?}");
}

#[test]
fn engines_agree_over_a_sweep() {
    let mut seq = SeqCordic::new(config()).unwrap();
    let mut pipe = PipeCordic::new(config()).unwrap();
    let requests: Vec<Request> = (0..64u64).map(|k| Request::new(k << 13, 1500, -200).with_aux(k % 3 == 0)).collect();

    let mut results = Vec::new();
    for request in requests.iter().copied().chain(std::iter::repeat(Request::default()).take(pipe.latency() - 1)) {
        let out = pipe.tick(Some(request));
        if out.valid {
            results.push(out);
        }
    }
    assert_eq!(results.len(), requests.len());
    for (request, out) in requests.iter().zip(&results) {
        let expected = seq.rotate(*request);
        assert_eq!((out.x, out.y, out.aux), (expected.x, expected.y, request.aux));
    }
}

#[test]
fn sine_from_both_tables() {
    let lg = 10;
    let mut full = FullTableGen::new(TableConfig::new(lg, 16)).unwrap();
    let mut quarter = QuarterWaveGen::new(TableConfig::new(lg, 16)).unwrap();
    for phase in 0..(1u64 << lg) {
        let a = full.tick(Some(TableRequest::new(phase))).value;
        let exact = 32767.0 * (phase as f64 * core::f64::consts::TAU / 1024.0).sin();
        assert!((a as f64 - exact).abs() <= 0.5 + 1e-9);
        quarter.tick(Some(TableRequest::new(phase)));
    }
    // flush the quarter-wave pipeline and check the last sample
    quarter.tick(Some(TableRequest::new(0)));
    let last = quarter.tick(Some(TableRequest::new(0))).value;
    assert_eq!(last, SineTable::full_offset(lg, 16).get(1023));
    assert!(last < 0 && last > -200);
}

#[test]
fn generated_image_reads_back() {
    let dir = std::env::temp_dir().join(format!("embcordic-scenario-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut module = Vec::new();
    let request = GenerateRequest::new(GeneratorKind::FullTable, "out/sintable.v", 8, 12).with_reset(ResetStyle::Sync);
    let artifacts = generate(&mut module, &dir, &request, &PlainHeader { project: "scenario" }).unwrap();
    assert_eq!(artifacts.module_name, "sintable");
    assert_eq!(artifacts.hex_path, dir.join("sintable.hex"));

    let text = std::fs::read_to_string(&artifacts.hex_path).unwrap();
    assert!(text.lines().all(|line| line.len() == 3));
    let image = HexImage::parse(&text, 12).unwrap();
    assert_eq!(image.rows(), SineTable::full(8, 12).as_slice());

    let module = String::from_utf8(module).unwrap();
    assert!(module.contains("// Project:\tscenario"));
    assert!(module.contains("i_reset"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn rejected_tables_leave_nothing_behind() {
    let dir = std::env::temp_dir().join(format!("embcordic-rejected-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut module = Vec::new();
    let request = GenerateRequest::new(GeneratorKind::QuarterWave, "tiny", 2, 12);
    let err = generate(&mut module, &dir, &request, &PlainHeader::default()).unwrap_err();
    assert!(err.is_precondition());
    let request = GenerateRequest::new(GeneratorKind::FullTable, "huge", 24, 12);
    let err = generate(&mut module, &dir, &request, &PlainHeader::default()).unwrap_err();
    assert!(!err.is_precondition());
    assert!(err.to_string().contains("24"));

    assert!(module.is_empty());
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    std::fs::remove_dir_all(&dir).unwrap();
}
