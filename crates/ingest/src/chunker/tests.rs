use super::*;
use crate::structure::{build_manifest, detect_boundaries};
use crate::test_support::{compile, doc, three_level_profile, words};
use manual_core::{CalloutLevel, ChunkId};
use regex::Regex;

fn lines(text: &[&str]) -> Vec<String> {
    text.iter().map(|s| s.to_string()).collect()
}

fn sized(min_tokens: usize, max_tokens: usize) -> CompiledProfile {
    let mut profile = compile(vec![]);
    profile.sizes.min_tokens = min_tokens;
    profile.sizes.max_tokens = max_tokens;
    profile.sizes.max_merge_tokens = max_tokens;
    profile
}

fn step(n: usize, count: usize) -> String {
    format!("({n}) {}", words(count))
}

fn run(rule: RuleFn, lines: &[String], profile: &CompiledProfile, cuts: Vec<usize>) -> Vec<Span> {
    let spans = detect_spans(lines, profile);
    let ctx = EntryContext::new(lines, profile, &spans);
    let plan = ChunkPlan::default().with_cuts(ctx.len(), cuts);
    rule(plan, &ctx).candidates
}

// ── Detection ───────────────────────────────────────────────────────

#[test]
fn step_sequence_survives_blank_lines() {
    let text = lines(&[
        "(1) Drain coolant.",
        "into a clean container",
        "",
        "(2) Remove hose.",
        "(3) Install hose.",
        "",
        "Next paragraph starts here.",
    ]);
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(steps, vec![StepSequenceSpan { start_line: 0, end_line: 5 }]);
}

#[test]
fn first_ordinal_starts_new_sequence() {
    let text = lines(&["(1) a", "(2) b", "", "(1) c", "(2) d"]);
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(
        steps,
        vec![
            StepSequenceSpan { start_line: 0, end_line: 2 },
            StepSequenceSpan { start_line: 3, end_line: 5 },
        ]
    );
}

#[test]
fn trailing_intro_line_leaves_sequence() {
    let text = lines(&["(1) a", "(2) b", "Then do the following:", "", "Other text."]);
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(steps, vec![StepSequenceSpan { start_line: 0, end_line: 2 }]);
}

fn lettered(range: std::ops::RangeInclusive<char>, count: usize) -> Vec<String> {
    range.map(|c| format!("{c}. {}", words(count))).collect()
}

#[test]
fn lettered_list_continues_through_i() {
    let text = lettered('a'..='j', 10);
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(steps, vec![StepSequenceSpan { start_line: 0, end_line: 10 }]);

    let plan = plan_lines(&text, &sized(5, 40));
    assert_eq!(plan.candidates, vec![Span::new(0, 10)]);
}

#[test]
fn lettered_list_restarts_at_a() {
    let mut text = lettered('a'..='c', 3);
    text.push(String::new());
    text.extend(lettered('a'..='b', 3));
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(
        steps,
        vec![
            StepSequenceSpan { start_line: 0, end_line: 3 },
            StepSequenceSpan { start_line: 4, end_line: 6 },
        ]
    );
}

#[test]
fn callout_between_steps_keeps_sequence() {
    let text = lines(&[
        &step(1, 10),
        &step(2, 10),
        "CAUTION: Do not overtighten the fitting.",
        &step(3, 10),
        &step(4, 10),
    ]);
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(steps, vec![StepSequenceSpan { start_line: 0, end_line: 5 }]);

    let plan = plan_lines(&text, &sized(5, 30));
    assert_eq!(plan.candidates, vec![Span::new(0, 5)]);
}

#[test]
fn callout_after_last_step_ends_sequence() {
    let text = lines(&["(1) a", "(2) b", "", "NOTE: Check the level.", "", "Prose follows."]);
    let profile = compile(vec![]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(steps, vec![StepSequenceSpan { start_line: 0, end_line: 2 }]);
}

#[test]
fn steps_without_captured_ordinal_form_one_sequence() {
    let mut profile = compile(vec![]);
    profile.step_patterns = vec![Regex::new(r"^-\s").unwrap()];
    let text = lines(&["- Loosen clamp.", "- Remove hose.", "", "- Install new hose."]);
    let steps = detect_step_sequences(&text, &profile.step_patterns, &profile.safety_callouts);
    assert_eq!(steps, vec![StepSequenceSpan { start_line: 0, end_line: 4 }]);
}

#[test]
fn double_spaced_prose_is_not_a_table() {
    let text: Vec<String> = (0..40)
        .map(|i| format!("Sentence {i} here.  Another sentence follows.  And a third one."))
        .collect();
    assert!(detect_tables(&text).is_empty());

    let plan = plan_lines(&text, &sized(5, 60));
    assert!(plan.candidates.len() > 1);
    for c in &plan.candidates {
        let tokens: usize = text[c.start..c.end].iter().map(|l| manual_core::count_words(l)).sum();
        assert!(tokens <= 60, "{c:?} has {tokens} tokens");
    }
}

#[test]
fn block_callout_runs_to_blank_line() {
    let text = lines(&["WARNING: Hot coolant", "can scald.", "", "(1) Step"]);
    let profile = compile(vec![]);
    let callouts = detect_safety_callouts(&text, &profile.safety_callouts, &profile.step_patterns);
    assert_eq!(callouts.len(), 1);
    assert_eq!(callouts[0].level, CalloutLevel::Warning);
    assert_eq!(callouts[0].line_range, Span::new(0, 2));
    assert_eq!(callouts[0].text, "WARNING: Hot coolant can scald.");
}

#[test]
fn dot_leader_table_includes_title() {
    let text = lines(&[
        "SPECIFICATIONS",
        "Drain plug torque .... 30 Nm",
        "Coolant capacity .... 9.9 L",
        "",
        "The system is filled at the factory.",
    ]);
    assert_eq!(detect_tables(&text), vec![TableSpan { start_line: 0, end_line: 3 }]);
}

#[test]
fn column_table_detected() {
    let text = lines(&["Intro text line.", "Bolt    Torque    Thread", "Drain   30 Nm     M14"]);
    assert_eq!(detect_tables(&text), vec![TableSpan { start_line: 1, end_line: 3 }]);
}

#[test]
fn figure_ids_per_line() {
    let text = lines(&["Remove hose (Fig. 3).", "(Fig. 4) shows (Fig. 5)"]);
    let profile = compile(vec![]);
    let figures = detect_figure_references(&text, profile.figure_reference.as_ref());
    let found: Vec<(&str, usize)> = figures.iter().map(|f| (f.id.as_str(), f.line)).collect();
    assert_eq!(found, vec![("3", 0), ("4", 1), ("5", 1)]);
}

#[test]
fn callout_attaches_to_following_steps() {
    let text = lines(&["CAUTION: Do not overtighten.", "", "(1) a", "(2) b", "", "After."]);
    let spans = detect_spans(&text, &compile(vec![]));
    assert_eq!(spans.safety_attachments, vec![Span::new(0, 4)]);
}

#[test]
fn chained_callouts_share_attachment() {
    let text = lines(&["WARNING: Hot.", "", "NOTE: Wait.", "", "(1) a", "(2) b"]);
    let spans = detect_spans(&text, &compile(vec![]));
    assert_eq!(spans.safety_attachments[0], Span::new(0, 6));
    assert_eq!(spans.safety_attachments[1], Span::new(2, 6));
}

#[test]
fn trailing_callout_has_no_attachment() {
    let text = lines(&["Text here.", "", "NOTE: Nothing follows."]);
    let spans = detect_spans(&text, &compile(vec![]));
    assert!(spans.safety_attachments.is_empty());
}

// ── Rules ───────────────────────────────────────────────────────────

#[test]
fn pipeline_order_is_fixed() {
    let codes: Vec<&str> = RULE_PIPELINE.iter().map(|(id, _)| id.code()).collect();
    assert_eq!(codes, vec!["R1", "R3", "R4", "R5", "R2", "R6", "R7", "R8"]);
}

#[test]
fn primary_unit_covers_entry() {
    let text = lines(&["one", "", "two"]);
    assert_eq!(run(primary_unit, &text, &compile(vec![]), vec![1, 2]), vec![Span::new(0, 3)]);
}

#[test]
fn step_cut_moves_to_nearer_edge() {
    let text = lines(&["Intro words here.", "", "(1) a", "(2) b", "(3) c", "(4) d"]);
    let profile = compile(vec![]);
    assert_eq!(
        run(never_split_steps, &text, &profile, vec![3]),
        vec![Span::new(0, 2), Span::new(2, 6)]
    );
    assert_eq!(run(never_split_steps, &text, &profile, vec![5]), vec![Span::new(0, 6)]);
}

#[test]
fn cut_inside_attachment_removed() {
    let text = lines(&["NOTE: Check level.", "", "Top off the reservoir as needed."]);
    assert_eq!(
        run(safety_attachment, &text, &compile(vec![]), vec![2]),
        vec![Span::new(0, 3)]
    );
}

#[test]
fn trailing_callout_only_candidate_joins_previous() {
    let text = lines(&["Para text here.", "", "NOTE: Trailing note."]);
    assert_eq!(
        run(safety_attachment, &text, &compile(vec![]), vec![2]),
        vec![Span::new(0, 3)]
    );
}

#[test]
fn cut_inside_table_removed() {
    let text = lines(&[
        "SPECIFICATIONS",
        "Drain plug torque .... 30 Nm",
        "Coolant capacity .... 9.9 L",
        "",
        "Filled at the factory.",
    ]);
    assert_eq!(
        run(table_integrity, &text, &compile(vec![]), vec![2, 3]),
        vec![Span::new(0, 3), Span::new(3, 5)]
    );
}

#[test]
fn ceiling_prefers_paragraph_breaks() {
    let text = lines(&[&words(20), "", &words(20), "", &words(20)]);
    let profile = sized(5, 30);
    let spans = detect_spans(&text, &profile);
    let ctx = EntryContext::new(&text, &profile, &spans);
    let plan = size_ceiling(primary_unit(ChunkPlan::default(), &ctx), &ctx);
    assert_eq!(
        plan.candidates,
        vec![Span::new(0, 2), Span::new(2, 4), Span::new(4, 5)]
    );
}

#[test]
fn ceiling_never_splits_step_sequence() {
    let text = lines(&[
        &words(10),
        "",
        &step(1, 10),
        &step(2, 10),
        &step(3, 10),
        "",
        &words(10),
    ]);
    let plan = plan_lines(&text, &sized(5, 25));
    assert_eq!(
        plan.candidates,
        vec![Span::new(0, 2), Span::new(2, 5), Span::new(5, 7)]
    );
}

#[test]
fn oversized_table_stays_whole() {
    let mut text = vec!["SPECIFICATIONS".to_string()];
    text.extend((0..20).map(|i| format!("Item {i} torque .... {i}0 Nm")));
    let plan = plan_lines(&text, &sized(5, 25));
    assert_eq!(plan.candidates, vec![Span::new(0, 21)]);
}

#[test]
fn callout_stays_with_steps_only_when_attachment_runs_first() {
    let text = lines(&[
        "CAUTION: Drain the coolant only when cold.",
        "",
        &step(1, 10),
        &step(2, 10),
        &step(3, 10),
    ]);
    let profile = sized(5, 35);

    let size_first: [(RuleId, RuleFn); 2] = [
        (RuleId::PrimaryUnit, primary_unit),
        (RuleId::SizeCeiling, size_ceiling),
    ];
    let naive = plan_lines_with(&size_first, &text, &profile);
    assert_eq!(naive.candidates, vec![Span::new(0, 2), Span::new(2, 5)]);

    let full = plan_lines(&text, &profile);
    assert_eq!(full.candidates, vec![Span::new(0, 5)]);
}

#[test]
fn small_candidate_merges_within_ceiling() {
    let text = lines(&[&words(3), "", &words(50)]);
    assert_eq!(run(merge_small, &text, &sized(10, 100), vec![2]), vec![Span::new(0, 3)]);
    assert_eq!(
        run(merge_small, &text, &sized(10, 40), vec![2]),
        vec![Span::new(0, 2), Span::new(2, 3)]
    );
}

#[test]
fn cross_reference_only_candidate_joins_previous() {
    let text = lines(&[&words(20), "", "COOLING", "Refer to Group 7 for draining."]);
    assert_eq!(
        run(cross_ref_merge, &text, &compile(vec![]), vec![2]),
        vec![Span::new(0, 4)]
    );

    let mixed = lines(&[&words(20), "", "Refer to Group 7.", "then do more work"]);
    assert_eq!(
        run(cross_ref_merge, &mixed, &compile(vec![]), vec![2]),
        vec![Span::new(0, 2), Span::new(2, 4)]
    );
}

#[test]
fn figure_continuation_joins_previous() {
    let text = lines(&["Remove the hose (Fig. 3).", "", "(Fig. 3) Hose clamp detail"]);
    assert_eq!(
        run(figure_continuity, &text, &compile(vec![]), vec![2]),
        vec![Span::new(0, 3)]
    );

    let other = lines(&["Remove the hose (Fig. 3).", "", "(Fig. 4) Radiator cap"]);
    assert_eq!(
        run(figure_continuity, &other, &compile(vec![]), vec![2]),
        vec![Span::new(0, 2), Span::new(2, 3)]
    );
}

// ── Assembly ────────────────────────────────────────────────────────

const COOLING_PAGE: &str = "GROUP 7

COOLING

Draining Coolant:
WARNING: Hot coolant can burn.

(1) Open the drain cock (Fig. 1).
(2) Remove the cap.

Filling Coolant:
(1) Close the drain cock.
(2) Fill the radiator. Refer to Group 9 for engine details.";

const ENGINE_PAGE: &str = "GROUP 9

ENGINE
Some engine text here.";

fn assemble(profile: &CompiledProfile) -> Vec<Chunk> {
    let doc = doc(&[COOLING_PAGE, ENGINE_PAGE]);
    let boundaries = detect_boundaries(&doc, profile);
    let manifest = build_manifest(&boundaries, profile, &doc);
    assemble_chunks(&manifest, &doc, profile).unwrap()
}

#[test]
fn small_entries_merge_within_group() {
    let chunks = assemble(&three_level_profile());
    let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["test-manual::7::COOLING::Filling Coolant", "test-manual::9::ENGINE"]
    );

    let cooling = &chunks[0];
    assert!(cooling.text.starts_with("GROUP 7\nCOOLING\nDraining Coolant:"));
    assert_eq!(cooling.metadata.level1_id.as_deref(), Some("7"));
    assert_eq!(cooling.metadata.line_range, LineRange::new(0, 13));
    assert_eq!(
        cooling.metadata.hierarchical_header,
        "Test Manual | 7 | COOLING | Filling Coolant"
    );
    assert_eq!(cooling.metadata.safety_levels, vec![CalloutLevel::Warning]);
    assert!(cooling.metadata.has_safety_callouts);
    assert_eq!(cooling.metadata.figure_references, vec!["1"]);
    assert_eq!(cooling.metadata.cross_references, vec!["test-manual::9"]);
    assert_eq!(cooling.metadata.vehicle_models, vec!["all"]);

    let engine = &chunks[1];
    assert_eq!(engine.metadata.page_range, PageRange { start: 1, end: 1 });
    assert!(!engine.metadata.has_safety_callouts);
}

#[test]
fn entries_keep_own_text_without_merging() {
    let mut profile = three_level_profile();
    profile.sizes.min_tokens = 0;
    let chunks = assemble(&profile);
    let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "test-manual::7",
            "test-manual::7::COOLING",
            "test-manual::7::COOLING::Draining Coolant",
            "test-manual::7::COOLING::Filling Coolant",
            "test-manual::9",
            "test-manual::9::ENGINE",
        ]
    );
    assert_eq!(chunks[1].text, "COOLING");
    assert_eq!(chunks[2].metadata.line_range, LineRange::new(4, 9));
}

#[test]
fn skipped_group_produces_nothing() {
    let mut profile = three_level_profile();
    profile.skip_sections.insert("9".to_string());
    let chunks = assemble(&profile);
    assert!(chunks.iter().all(|c| c.level1_id() == Some("7")));
    assert_eq!(chunks.len(), 1);
}

#[test]
fn empty_manifest_follows_policy() {
    let document = doc(&["Just some prose with no headings at all."]);
    let manifest = Manifest::new("test-manual");

    let mut profile = three_level_profile();
    assert!(assemble_chunks(&manifest, &document, &profile).unwrap().is_empty());

    profile.sizes.empty_document = EmptyDocumentPolicy::WholeDocument;
    let chunks = assemble_chunks(&manifest, &document, &profile).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_id, "test-manual");
    assert_eq!(chunks[0].metadata.level1_id, None);
    assert_eq!(chunks[0].metadata.content_type, WHOLE_DOCUMENT_LEVEL);
}

#[test]
fn split_entry_gets_part_suffixes() {
    let page = format!("GROUP 7\n\n{}\n\n{}\n\n{}", words(20), words(20), words(20));
    let document = doc(&[page.as_str()]);
    let mut profile = three_level_profile();
    profile.sizes.min_tokens = 5;
    profile.sizes.max_tokens = 25;
    profile.sizes.max_merge_tokens = 25;
    let boundaries = detect_boundaries(&document, &profile);
    let manifest = build_manifest(&boundaries, &profile, &document);
    let chunks = assemble_chunks(&manifest, &document, &profile).unwrap();

    let ids: Vec<&str> = chunks.iter().map(|c| c.chunk_id.as_str()).collect();
    assert_eq!(ids, vec!["test-manual::7", "test-manual::7#2", "test-manual::7#3"]);
    assert_eq!(ChunkId::parse(ids[2]).part, Some(3));
    assert_eq!(chunks[1].metadata.line_range, LineRange::new(4, 5));
}

#[test]
fn assembly_is_deterministic() {
    let profile = three_level_profile();
    assert_eq!(assemble(&profile), assemble(&profile));
}
