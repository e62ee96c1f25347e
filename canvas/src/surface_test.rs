#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// StateStack
// =============================================================

#[test]
fn nested_restore_reverts_only_innermost_mutation() {
    let mut stack = StateStack::new();
    let baseline = stack.current().clone();

    stack.save();
    stack.current_mut().stroke_style = "#ff0000".to_owned();
    stack.save();
    stack.current_mut().stroke_style = "#00ff00".to_owned();
    stack.current_mut().line_width = 4.0;

    assert!(stack.restore());
    assert_eq!(stack.current().stroke_style, "#ff0000");
    assert_eq!(stack.current().line_width, 1.0);

    assert!(stack.restore());
    assert_eq!(stack.current(), &baseline);
}

#[test]
fn restore_on_empty_stack_is_noop() {
    let mut stack = StateStack::new();
    stack.current_mut().fill_style = "red".to_owned();
    assert!(!stack.restore());
    assert_eq!(stack.current().fill_style, "red");
    assert_eq!(stack.depth(), 0);
}

#[test]
fn depth_tracks_unmatched_saves() {
    let mut stack = StateStack::new();
    stack.save();
    stack.save();
    assert_eq!(stack.depth(), 2);
    stack.restore();
    assert_eq!(stack.depth(), 1);
}

#[test]
fn reset_unwinds_and_restores_defaults() {
    let mut stack = StateStack::new();
    stack.save();
    stack.current_mut().transforms.push(Transform::Rotate(1.0));
    stack.save();
    stack.current_mut().font = "20px serif".to_owned();
    stack.reset();
    assert_eq!(stack.depth(), 0);
    assert_eq!(stack.current(), &DrawState::default());
}

#[test]
fn transforms_are_part_of_saved_state() {
    let mut stack = StateStack::new();
    stack.save();
    stack.current_mut().transforms.push(Transform::Translate(5.0, 6.0));
    assert_eq!(stack.current().transforms.len(), 1);
    stack.restore();
    assert!(stack.current().transforms.is_empty());
}

#[test]
fn non_finite_transforms_are_dropped() {
    let mut stack = StateStack::new();
    assert!(!stack.push_transform(Transform::Translate(f64::NAN, 0.0)));
    assert!(!stack.push_transform(Transform::Rotate(f64::INFINITY)));
    assert!(!stack.push_transform(Transform::Scale(1.0, f64::NEG_INFINITY)));
    assert!(stack.current().transforms.is_empty());

    assert!(stack.push_transform(Transform::Rotate(0.5)));
    assert_eq!(stack.current().transforms, vec![Transform::Rotate(0.5)]);
}

// =============================================================
// Dash normalization
// =============================================================

#[test]
fn dash_even_list_kept() {
    assert_eq!(normalize_dash(&[4.0, 2.0]), Some(vec![4.0, 2.0]));
}

#[test]
fn dash_odd_list_repeated() {
    assert_eq!(normalize_dash(&[5.0, 1.0, 2.0]), Some(vec![5.0, 1.0, 2.0, 5.0, 1.0, 2.0]));
}

#[test]
fn dash_negative_rejected() {
    assert_eq!(normalize_dash(&[4.0, -1.0]), None);
    assert_eq!(normalize_dash(&[f64::NAN]), None);
}

#[test]
fn dash_empty_clears() {
    assert_eq!(normalize_dash(&[]), Some(Vec::new()));
}

// =============================================================
// TextAlign
// =============================================================

#[test]
fn text_align_parse_round_trips_keywords() {
    for kw in ["start", "end", "left", "right", "center"] {
        assert_eq!(TextAlign::parse(kw).map(TextAlign::as_str), Some(kw));
    }
    assert_eq!(TextAlign::parse("middle"), None);
}

#[test]
fn text_align_svg_anchor() {
    assert_eq!(TextAlign::Center.svg_anchor(), "middle");
    assert_eq!(TextAlign::Right.svg_anchor(), "end");
    assert_eq!(TextAlign::End.svg_anchor(), "end");
    assert_eq!(TextAlign::Left.svg_anchor(), "start");
    assert_eq!(TextAlign::default().svg_anchor(), "start");
}

#[test]
fn all_finite_detects_nan() {
    assert!(all_finite(&[1.0, 2.0]));
    assert!(!all_finite(&[1.0, f64::INFINITY]));
}
