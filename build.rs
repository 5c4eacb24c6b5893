use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Cumulative magnitude growth of the micro-rotations `2^-1, 2^-2, ...`
///
/// Entry `n` is the gain after `n` stages. The first rotation by 45° is never performed
/// since the quadrant pre-rotation already folds the angle into ±45°.
fn compute_gain_table() -> [f64; 64] {
    let mut g = 1.0;
    (0..64)
        .map(|n| {
            if n > 0 {
                g *= f64::sqrt(1.0 + f64::powf(2.0, -2.0 * n as f64));
            }
            g
        })
        .collect::<Vec<f64>>()
        .try_into()
        .unwrap()
}

fn main() {
    let out_dir = env::var_os("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("gain_table.rs");
    let mut f = File::create(dest_path).unwrap();

    let gain_table = compute_gain_table();
    writeln!(&mut f, "const GAIN_TABLE: [f64; {}] = {:?};", gain_table.len(), gain_table).unwrap();
    println!("cargo:rerun-if-changed=build.rs");
}
