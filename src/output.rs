// CSV export: one curve file per pair plus a manifest.

use std::path::{Path, PathBuf};

use csv::WriterBuilder;

use crate::curve::Curve;

/// File name carrying the pair parameters, so reruns overwrite their own
/// output deterministically.
pub fn curve_file_name(curve: &Curve) -> String {
    format!("curve_J{:.3}_k{:.3}.csv", curve.coupling, curve.field)
}

/// Write `T,M,chi,c,low_confidence` rows for one curve. M is the
/// normalized magnetization; the columns consumed by the external
/// comparison tooling come first.
pub fn write_curve(dir: &Path, curve: &Curve) -> csv::Result<PathBuf> {
    let path = dir.join(curve_file_name(curve));
    let mut wtr = WriterBuilder::new().from_path(&path)?;

    wtr.write_record(["T", "M", "chi", "c", "low_confidence"])?;
    for s in &curve.samples {
        wtr.write_record(&[
            s.temperature.to_string(),
            s.magnetization.to_string(),
            s.susceptibility.to_string(),
            s.energy_fluctuation.to_string(),
            (s.low_confidence as u8).to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(path)
}

/// Write every curve plus `manifest.csv` indexing the set; per-curve
/// numerical annotations (degenerate, low-confidence counts) surface here
/// alongside the data rather than as failures.
pub fn write_curves(dir: &Path, curves: &[Curve]) -> csv::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let manifest_path = dir.join("manifest.csv");
    let mut manifest = WriterBuilder::new().from_path(&manifest_path)?;
    manifest.write_record([
        "J",
        "k",
        "points",
        "degenerate",
        "low_confidence_points",
        "file",
    ])?;

    for curve in curves {
        let path = write_curve(dir, curve)?;
        manifest.write_record(&[
            curve.coupling.to_string(),
            curve.field.to_string(),
            curve.samples.len().to_string(),
            (curve.degenerate as u8).to_string(),
            curve.low_confidence_points().to_string(),
            path.file_name().unwrap().to_string_lossy().into_owned(),
        ])?;
    }
    manifest.flush()?;
    Ok(manifest_path)
}
