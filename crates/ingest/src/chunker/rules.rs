//! The semantic chunk rules, applied as an ordered list of pure plan
//! transformations.
//!
//! R3, R4 and R5 register protected spans before R2 enforces the size
//! ceiling, so the size splitter can only cut where no step sequence,
//! safety attachment or table would be separated.

use tracing::{debug, trace};

use super::types::*;

pub type RuleFn = fn(ChunkPlan, &EntryContext<'_>) -> ChunkPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleId {
    PrimaryUnit,
    SizeCeiling,
    NeverSplitSteps,
    SafetyAttachment,
    TableIntegrity,
    MergeSmall,
    CrossRefMerge,
    FigureContinuity,
}

impl RuleId {
    pub fn code(&self) -> &'static str {
        match self {
            RuleId::PrimaryUnit => "R1",
            RuleId::SizeCeiling => "R2",
            RuleId::NeverSplitSteps => "R3",
            RuleId::SafetyAttachment => "R4",
            RuleId::TableIntegrity => "R5",
            RuleId::MergeSmall => "R6",
            RuleId::CrossRefMerge => "R7",
            RuleId::FigureContinuity => "R8",
        }
    }
}

/// R1, R3, R4, R5, R2, R6, R7, R8.
pub const RULE_PIPELINE: [(RuleId, RuleFn); 8] = [
    (RuleId::PrimaryUnit, primary_unit),
    (RuleId::NeverSplitSteps, never_split_steps),
    (RuleId::SafetyAttachment, safety_attachment),
    (RuleId::TableIntegrity, table_integrity),
    (RuleId::SizeCeiling, size_ceiling),
    (RuleId::MergeSmall, merge_small),
    (RuleId::CrossRefMerge, cross_ref_merge),
    (RuleId::FigureContinuity, figure_continuity),
];

/// Fold `pipeline` over an empty plan.
pub fn apply_rules(pipeline: &[(RuleId, RuleFn)], ctx: &EntryContext<'_>) -> ChunkPlan {
    pipeline.iter().fold(ChunkPlan::default(), |plan, (id, rule)| {
        let plan = rule(plan, ctx);
        trace!(rule = id.code(), candidates = plan.candidates.len(), "applied rule");
        plan
    })
}

/// Merge each candidate into its predecessor while `absorb(prev, next)` holds.
fn merge_into_previous(
    plan: ChunkPlan,
    ctx: &EntryContext<'_>,
    absorb: impl Fn(Span, Span, &EntryContext<'_>) -> bool,
) -> ChunkPlan {
    let ChunkPlan {
        candidates,
        protected,
    } = plan;
    let mut merged: Vec<Span> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match merged.last_mut() {
            Some(prev) if absorb(*prev, candidate, ctx) => prev.end = candidate.end,
            _ => merged.push(candidate),
        }
    }
    ChunkPlan {
        candidates: merged,
        protected,
    }
}

fn drop_cuts_inside(plan: ChunkPlan, len: usize, spans: &[Span]) -> ChunkPlan {
    let cuts = plan
        .cuts()
        .into_iter()
        .filter(|&cut| !spans.iter().any(|s| s.splits_at(cut)))
        .collect();
    plan.with_cuts(len, cuts)
}

// ── R1 ──────────────────────────────────────────────────────────────

/// One candidate covering the whole entry text.
pub fn primary_unit(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    plan.with_cuts(ctx.len(), Vec::new())
}

// ── R3 ──────────────────────────────────────────────────────────────

/// Protect step sequences; a cut inside one moves to its nearer edge.
pub fn never_split_steps(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    let spans: Vec<Span> = ctx.spans.steps.iter().map(StepSequenceSpan::span).collect();
    let cuts = plan
        .cuts()
        .into_iter()
        .map(|cut| match spans.iter().find(|s| s.splits_at(cut)) {
            Some(s) if cut - s.start <= s.end - cut => s.start,
            Some(s) => s.end,
            None => cut,
        })
        .collect();
    plan.protect(Protection::Steps, spans.iter().copied())
        .with_cuts(ctx.len(), cuts)
}

// ── R4 ──────────────────────────────────────────────────────────────

fn is_callout_only(span: Span, ctx: &EntryContext<'_>) -> bool {
    let mut lines = ctx.content_lines(span).peekable();
    lines.peek().is_some()
        && lines.all(|(i, _)| {
            ctx.spans
                .callouts
                .iter()
                .any(|c| c.line_range.contains_line(i))
        })
}

/// Protect callout-to-procedure attachments. A candidate holding nothing but
/// callouts joins the following candidate, or the preceding one when last.
pub fn safety_attachment(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    let attachments = &ctx.spans.safety_attachments;
    let plan = drop_cuts_inside(plan, ctx.len(), attachments)
        .protect(Protection::SafetyAttachment, attachments.iter().copied());

    let plan = merge_into_previous(plan, ctx, |prev, _, ctx| is_callout_only(prev, ctx));
    let trailing = plan.candidates.len() > 1
        && plan
            .candidates
            .last()
            .is_some_and(|&last| is_callout_only(last, ctx));
    if !trailing {
        return plan;
    }
    let mut cuts = plan.cuts();
    cuts.pop();
    plan.with_cuts(ctx.len(), cuts)
}

// ── R5 ──────────────────────────────────────────────────────────────

/// Protect tables; no cut may fall inside one, whatever its size.
pub fn table_integrity(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    let tables: Vec<Span> = ctx.spans.tables.iter().map(TableSpan::span).collect();
    drop_cuts_inside(plan, ctx.len(), &tables).protect(Protection::Table, tables)
}

// ── R2 ──────────────────────────────────────────────────────────────

/// Cut points that bring `span` under the ceiling without separating any
/// protected span. Prefers paragraph breaks that leave at least
/// `min_tokens` behind, then the latest legal line.
fn split_points(span: Span, plan: &ChunkPlan, ctx: &EntryContext<'_>) -> Vec<usize> {
    let sizes = &ctx.profile.sizes;
    let legal = |p: usize| p > span.start && p < span.end && !plan.is_protected_cut(p);

    let mut cuts = Vec::new();
    let mut start = span.start;
    while ctx.tokens(Span::new(start, span.end)) > sizes.max_tokens {
        let mut reach = start;
        let mut words = 0;
        while reach < span.end {
            let w = ctx.words(Span::new(reach, reach + 1));
            if sizes.tokens_for_words(words + w) > sizes.max_tokens {
                break;
            }
            words += w;
            reach += 1;
        }

        let window: Vec<usize> = (start + 1..=reach).rev().filter(|&p| legal(p)).collect();
        let cut = window
            .iter()
            .copied()
            .find(|&p| ctx.is_blank(p - 1) && ctx.tokens(Span::new(start, p)) >= sizes.min_tokens)
            .or_else(|| window.first().copied())
            .or_else(|| (reach.max(start + 1)..span.end).find(|&p| legal(p)));

        match cut {
            Some(c) => {
                cuts.push(c);
                start = c;
            }
            None => break,
        }
    }
    cuts
}

/// Split candidates above the hard ceiling.
pub fn size_ceiling(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    let sizes = &ctx.profile.sizes;
    let mut cuts = plan.cuts();
    for &candidate in &plan.candidates {
        if ctx.tokens(candidate) > sizes.max_tokens {
            cuts.extend(split_points(candidate, &plan, ctx));
        }
    }
    let plan = plan.with_cuts(ctx.len(), cuts);

    for candidate in &plan.candidates {
        let tokens = ctx.tokens(*candidate);
        if !sizes.within_target(tokens) {
            debug!(
                start = candidate.start,
                end = candidate.end,
                tokens,
                "chunk outside target size"
            );
        }
    }
    plan
}

// ── R6 ──────────────────────────────────────────────────────────────

/// A candidate under `min_tokens` absorbs the next one while the result
/// stays within `max_tokens`.
pub fn merge_small(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    let sizes = ctx.profile.sizes;
    merge_into_previous(plan, ctx, |prev, next, ctx| {
        ctx.tokens(prev) < sizes.min_tokens
            && ctx.tokens(Span::new(prev.start, next.end)) <= sizes.max_tokens
    })
}

// ── R7 ──────────────────────────────────────────────────────────────

/// Heading-like: has letters and no lowercase letters.
fn is_heading_line(line: &str) -> bool {
    line.chars().any(char::is_alphabetic) && !line.chars().any(char::is_lowercase)
}

/// Every content line is a cross-reference or a heading, and at least one
/// cross-reference is present.
pub(crate) fn is_cross_ref_only(span: Span, ctx: &EntryContext<'_>) -> bool {
    let patterns = &ctx.profile.cross_references;
    let mut any_reference = false;
    for (_, line) in ctx.content_lines(span) {
        if patterns.iter().any(|re| re.is_match(line)) {
            any_reference = true;
        } else if !is_heading_line(line) {
            return false;
        }
    }
    any_reference
}

pub fn cross_ref_merge(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    merge_into_previous(plan, ctx, |_, next, ctx| is_cross_ref_only(next, ctx))
}

// ── R8 ──────────────────────────────────────────────────────────────

/// Figure id referenced at the very start of the candidate's first line.
pub(crate) fn leading_figure(span: Span, ctx: &EntryContext<'_>) -> Option<String> {
    let re = ctx.profile.figure_reference.as_ref()?;
    let (_, first) = ctx.content_lines(span).next()?;
    let caps = re.captures(first)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 {
        return None;
    }
    Some(caps.get(1).unwrap_or(whole).as_str().trim().to_string())
}

pub fn figure_continuity(plan: ChunkPlan, ctx: &EntryContext<'_>) -> ChunkPlan {
    merge_into_previous(plan, ctx, |prev, next, ctx| {
        leading_figure(next, ctx).is_some_and(|id| {
            ctx.spans
                .figures
                .iter()
                .any(|f| f.id == id && prev.contains_line(f.line))
        })
    })
}
