//! Boundary detection with level disambiguation.
//!
//! Every line is tested against every level. When several levels match, the
//! line goes to the shallowest level strictly deeper than the current context,
//! falling back to the shallowest match overall (re-anchoring). The context is
//! an explicit accumulator threaded through a left fold over the lines.

use regex::Captures;
use tracing::info;

use manual_core::{Boundary, DocumentLines};
use manual_profile::{CompiledLevel, CompiledProfile, LevelMatcher};

/// One level's match on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMatch<'p> {
    pub level: u32,
    pub level_name: &'p str,
    pub id: Option<String>,
    pub title: Option<String>,
}

/// Group 1 when present and matched, the whole match otherwise.
fn primary_text(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn apply_matcher(matcher: &LevelMatcher, line: &str) -> Option<(Option<String>, Option<String>)> {
    let title_from_pattern = || {
        matcher
            .title
            .as_ref()
            .and_then(|re| re.captures(line))
            .and_then(|caps| primary_text(&caps))
    };

    match &matcher.id {
        Some(id_re) => {
            let caps = id_re.captures(line)?;
            let id = primary_text(&caps);
            let title = title_from_pattern().or_else(|| {
                let end = caps.get(0).map_or(0, |m| m.end());
                let rest = line[end..]
                    .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | '-'))
                    .trim();
                (!rest.is_empty()).then(|| rest.to_string())
            });
            Some((id, title))
        }
        None => title_from_pattern().map(|title| (None, Some(title))),
    }
}

/// Match `line` against one level. Matchers are tried in declaration order;
/// the first success wins.
pub fn match_level<'p>(level: &'p CompiledLevel, line: &str) -> Option<LevelMatch<'p>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    level
        .matchers
        .iter()
        .find_map(|m| apply_matcher(m, line))
        .map(|(id, title)| LevelMatch {
            level: level.level,
            level_name: &level.name,
            id,
            title,
        })
}

/// All levels matching `line`, shallowest first.
pub fn match_line<'p>(profile: &'p CompiledProfile, line: &str) -> Vec<LevelMatch<'p>> {
    profile
        .levels
        .iter()
        .filter_map(|level| match_level(level, line))
        .collect()
}

/// Choose among simultaneous matches given the level of the current context
/// (0 = above the shallowest level).
pub fn resolve_level<'a, 'p>(
    current_level: u32,
    matches: &'a [LevelMatch<'p>],
) -> Option<&'a LevelMatch<'p>> {
    matches
        .iter()
        .filter(|m| m.level > current_level)
        .min_by_key(|m| m.level)
        .or_else(|| matches.iter().min_by_key(|m| m.level))
}

#[derive(Debug, Default)]
struct DetectState {
    current_level: u32,
    boundaries: Vec<Boundary>,
}

/// Scan the whole document and emit boundaries in line order.
pub fn detect_boundaries(doc: &DocumentLines, profile: &CompiledProfile) -> Vec<Boundary> {
    let state = doc
        .iter()
        .fold(DetectState::default(), |mut state, (offset, page, line)| {
            let matches = match_line(profile, line);
            if let Some(chosen) = resolve_level(state.current_level, &matches) {
                state.current_level = chosen.level;
                state.boundaries.push(Boundary {
                    level: chosen.level,
                    level_name: chosen.level_name.to_string(),
                    id: chosen.id.clone(),
                    title: chosen.title.clone(),
                    page_number: page,
                    line_offset: offset,
                });
            }
            state
        });

    info!(
        manual_id = %profile.manual_id,
        lines = doc.len(),
        boundaries = state.boundaries.len(),
        "detected boundaries"
    );
    state.boundaries
}
