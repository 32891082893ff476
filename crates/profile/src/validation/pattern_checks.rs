//! Regex compilation checks for every configured pattern.

use regex::Regex;

use super::ValidationResult;
use crate::compiled::compile_callout_pattern;
use crate::schema::ManualProfile;

fn check(result: &mut ValidationResult, path: String, what: &str, source: &str) {
    if let Err(e) = Regex::new(source) {
        result.error(path, format!("invalid regex for {what}: {e}"));
    }
}

pub fn validate_patterns(profile: &ManualProfile, result: &mut ValidationResult) {
    for (i, level) in profile.structure.hierarchy.iter().enumerate() {
        let path = format!("structure.hierarchy[{i}]");
        let n = level.level;
        if let Some(p) = &level.id_pattern {
            check(result, format!("{path}.id_pattern"), &format!("id_pattern at hierarchy level {n}"), p);
        }
        if let Some(p) = &level.title_pattern {
            check(result, format!("{path}.title_pattern"), &format!("title_pattern at hierarchy level {n}"), p);
        }
        for (a, alt) in level.alternate_patterns.iter().enumerate() {
            let alt_path = format!("{path}.alternate_patterns[{a}]");
            if let Some(p) = &alt.id_pattern {
                check(result, format!("{alt_path}.id_pattern"), &format!("alternate id_pattern at hierarchy level {n}"), p);
            }
            if let Some(p) = &alt.title_pattern {
                check(result, format!("{alt_path}.title_pattern"), &format!("alternate title_pattern at hierarchy level {n}"), p);
            }
        }
    }

    for (i, p) in profile.structure.step_patterns.iter().enumerate() {
        check(result, format!("structure.step_patterns[{i}]"), &format!("step_patterns[{i}]"), p);
    }

    if let Some(fig) = &profile.structure.figure_reference {
        check(result, "structure.figure_reference.pattern".into(), "figure reference pattern", &fig.pattern);
    }

    if let Some(xref) = &profile.structure.cross_reference {
        for (i, p) in xref.patterns.iter().enumerate() {
            check(result, format!("structure.cross_reference.patterns[{i}]"), "cross reference pattern", p);
        }
    }

    for (i, callout) in profile.safety_callouts.iter().enumerate() {
        let path = format!("safety_callouts[{i}].pattern");
        if callout.pattern.trim().is_empty() {
            result.error(path, "safety callout pattern is empty");
        } else if let Err(e) = compile_callout_pattern(path.clone(), &callout.pattern) {
            result.error(path, format!("invalid regex for safety callout pattern: {e}"));
        }
    }
}
