//! Line breaking
//!
//! Greedy packing of pre-measured segments (words, atomic inlines) into
//! lines, plus character-level splitting for words wider than a line.

use std::ops::Range;

/// Slack for float accumulation when comparing against the line width
const EPSILON: f32 = 0.01;

/// One unbreakable piece of inline content
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Segment {
    pub width: f32,
    /// Width of the collapsible space that follows, if any
    pub space_after: f32,
    /// A forced line break follows this segment
    pub break_after: bool,
    /// No break is allowed between this segment and the next
    pub glue_after: bool,
}

/// Pack segments into lines no wider than `available`
///
/// A segment (or glued run of segments) wider than `available` gets a line
/// of its own. Trailing spaces do not count toward a line's width.
pub fn break_lines(segments: &[Segment], available: f32) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut width = 0.0f32;

    for (i, seg) in segments.iter().enumerate() {
        if i > start {
            let prev = &segments[i - 1];
            if width + prev.space_after + seg.width > available + EPSILON {
                let opportunity = (start + 1..=i).rev().find(|&j| !segments[j - 1].glue_after);
                match opportunity {
                    Some(j) => {
                        lines.push(start..j);
                        start = j;
                        width = run_width(&segments[j..=i]);
                    }
                    None => width += prev.space_after + seg.width,
                }
            } else {
                width += prev.space_after + seg.width;
            }
        } else {
            width = seg.width;
        }

        if seg.break_after {
            lines.push(start..i + 1);
            start = i + 1;
            width = 0.0;
        }
    }

    if start < segments.len() {
        lines.push(start..segments.len());
    }
    lines
}

/// Width of consecutive segments on one line
fn run_width(segments: &[Segment]) -> f32 {
    let spaces: f32 = segments.iter().rev().skip(1).map(|s| s.space_after).sum();
    segments.iter().map(|s| s.width).sum::<f32>() + spaces
}

/// Split a word that is wider than `available` into pieces that fit
///
/// Every piece holds at least one character, so a single glyph wider than
/// the line still makes progress.
pub fn force_break(word: &str, available: f32, mut measure: impl FnMut(&str) -> f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for c in word.chars() {
        current.push(c);
        if measure(&current) > available + EPSILON && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(widths: &[f32]) -> Vec<Segment> {
        widths
            .iter()
            .map(|&w| Segment {
                width: w,
                space_after: 5.0,
                ..Segment::default()
            })
            .collect()
    }

    #[test]
    fn test_greedy_packing() {
        // 30 + 5 + 30 = 65 fits in 70, the third word does not
        let lines = break_lines(&words(&[30.0, 30.0, 30.0]), 70.0);
        assert_eq!(lines, vec![0..2, 2..3]);
    }

    #[test]
    fn test_everything_fits() {
        let lines = break_lines(&words(&[10.0, 10.0, 10.0]), 100.0);
        assert_eq!(lines, vec![0..3]);
    }

    #[test]
    fn test_oversized_segment_gets_own_line() {
        let lines = break_lines(&words(&[10.0, 200.0, 10.0]), 100.0);
        assert_eq!(lines, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_forced_break() {
        let mut segs = words(&[10.0, 10.0, 10.0]);
        segs[0].break_after = true;
        assert_eq!(break_lines(&segs, 100.0), vec![0..1, 1..3]);
    }

    #[test]
    fn test_glued_segments_move_together() {
        // "ab" + "cd" without a space between them cannot be separated
        let mut segs = words(&[30.0, 20.0, 20.0]);
        segs[1].space_after = 0.0;
        segs[1].glue_after = true;
        assert_eq!(break_lines(&segs, 60.0), vec![0..1, 1..3]);
    }

    #[test]
    fn test_empty_input() {
        assert!(break_lines(&[], 100.0).is_empty());
    }

    #[test]
    fn test_force_break_pieces_fit() {
        let pieces = force_break("abcdefghij", 30.0, |s| s.chars().count() as f32 * 10.0);
        assert_eq!(pieces, vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn test_force_break_makes_progress_on_wide_glyph() {
        let pieces = force_break("ab", 5.0, |s| s.chars().count() as f32 * 10.0);
        assert_eq!(pieces, vec!["a", "b"]);
    }
}
