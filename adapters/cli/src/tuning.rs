//! Loads director tuning overrides from TOML.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use spawn_director_core::DirectorTuning;

/// Reads tuning overrides from `path`, or returns the defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<DirectorTuning> {
    let Some(path) = path else {
        return Ok(DirectorTuning::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read tuning file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid tuning file {}", path.display()))
}

fn parse(contents: &str) -> Result<DirectorTuning> {
    let tuning: DirectorTuning =
        toml::from_str(contents).context("failed to parse tuning toml contents")?;
    if tuning.base_limit == 0 {
        bail!("base_limit must be positive");
    }
    if !(tuning.admission_curve_base.is_finite() && tuning.admission_curve_base > 1.0) {
        bail!(
            "admission_curve_base must be a finite value above 1, got {}",
            tuning.admission_curve_base
        );
    }
    if !tuning.dry_run_threshold.is_finite() {
        bail!("dry_run_threshold must be finite");
    }
    Ok(tuning)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        assert_eq!(load(None).expect("defaults"), DirectorTuning::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let tuning = parse("base_limit = 200\njoke_odds = 10\n").expect("valid tuning");
        assert_eq!(tuning.base_limit, 200);
        assert_eq!(tuning.joke_odds, 10);
        assert_eq!(tuning.per_boss_increment, 20);
        assert_eq!(tuning.cinematic_limit, 100);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = parse("base_limt = 200\n").expect_err("typo must be rejected");
        assert!(format!("{error:#}").contains("base_limt"));
    }

    #[test]
    fn flat_admission_curve_is_rejected() {
        let error = parse("admission_curve_base = 1.0\n").expect_err("flat curve");
        assert!(error.to_string().contains("admission_curve_base"));
    }

    #[test]
    fn unreadable_file_reports_its_path() {
        let error = load(Some(Path::new("/nonexistent/tuning.toml"))).expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/tuning.toml"));
    }
}
