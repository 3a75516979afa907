//! Edge case tests for press-text

use press_text::{FontContext, FontQuery, Segment, break_lines, force_break, measure, shape};

// ============================================================================
// Fallback Resolution
// ============================================================================

#[test]
fn test_builtin_context_measures_text() {
    let ctx = FontContext::builtin_only();
    let (font, err) = ctx.resolve_or_fallback(&FontQuery::new(&["serif"]));
    assert!(err.is_some());
    assert!(measure(&font, "The quick brown fox", 12.0, 0.0) > 50.0);
}

#[test]
fn test_bold_fallback_is_wider() {
    let ctx = FontContext::builtin_only();
    let (regular, _) = ctx.resolve_or_fallback(&FontQuery::default());
    let (bold, _) = ctx.resolve_or_fallback(&FontQuery::default().bold());
    assert!(measure(&bold, "dark", 12.0, 0.0) > measure(&regular, "dark", 12.0, 0.0));
}

#[test]
fn test_unmappable_text_still_has_width() {
    let ctx = FontContext::builtin_only();
    let (font, _) = ctx.resolve_or_fallback(&FontQuery::default());
    let run = shape(&font, "中文", 12.0, 0.0).unwrap();
    assert_eq!(run.len(), 2);
    assert!(run.width > 0.0);
}

// ============================================================================
// Wrapping
// ============================================================================

#[test]
fn test_paragraph_wraps_within_width() {
    let ctx = FontContext::builtin_only();
    let (font, _) = ctx.resolve_or_fallback(&FontQuery::default());
    let text = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor";
    let space = measure(&font, " ", 12.0, 0.0);
    let segments: Vec<Segment> = text
        .split(' ')
        .map(|w| Segment {
            width: measure(&font, w, 12.0, 0.0),
            space_after: space,
            ..Segment::default()
        })
        .collect();

    let available = 120.0;
    let lines = break_lines(&segments, available);
    assert!(lines.len() > 1);
    for line in lines {
        let width: f32 = segments[line.clone()].iter().map(|s| s.width).sum::<f32>()
            + space * (line.len() - 1) as f32;
        assert!(width <= available + 0.01, "line {:?} is {} wide", line, width);
    }
}

#[test]
fn test_long_word_is_split_with_real_metrics() {
    let ctx = FontContext::builtin_only();
    let (font, _) = ctx.resolve_or_fallback(&FontQuery::default());
    let word = "a".repeat(100);
    let pieces = force_break(&word, 50.0, |s| measure(&font, s, 12.0, 0.0));
    assert!(pieces.len() > 1);
    assert_eq!(pieces.concat(), word);
    assert!(pieces.iter().all(|p| measure(&font, p, 12.0, 0.0) <= 50.01));
}
