#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn rect(left: f64, top: f64, width: f64, height: f64) -> ElementRect {
    ElementRect { left, top, width, height }
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

// --- resize ---

#[test]
fn default_viewport_is_unsized() {
    let vp = Viewport::default();
    assert!(!vp.is_sized());
    assert_eq!(vp.dpr, 1.0);
}

#[test]
fn resize_sets_logical_size_and_dpr() {
    let mut vp = Viewport::default();
    assert!(vp.resize(800.0, 600.0, 2.0));
    assert_eq!(vp, Viewport { width: 800.0, height: 600.0, dpr: 2.0 });
}

#[test]
fn resize_ignores_zero_size() {
    let mut vp = Viewport::default();
    vp.resize(800.0, 600.0, 1.0);
    assert!(!vp.resize(0.0, 600.0, 1.0));
    assert!(!vp.resize(800.0, 0.0, 1.0));
    assert_eq!(vp.width, 800.0);
}

#[test]
fn resize_to_same_size_reports_unchanged() {
    let mut vp = Viewport::default();
    vp.resize(100.0, 100.0, 1.0);
    assert!(!vp.resize(100.0, 100.0, 1.0));
}

#[test]
fn resize_keeps_fractional_dpr() {
    let mut vp = Viewport::default();
    vp.resize(100.0, 100.0, 0.5);
    assert_eq!(vp.dpr, 0.5);
}

#[test]
fn resize_falls_back_to_unit_dpr_when_missing() {
    let mut vp = Viewport::default();
    vp.resize(100.0, 100.0, 0.0);
    assert_eq!(vp.dpr, 1.0);
    vp.resize(100.0, 100.0, f64::NAN);
    assert_eq!(vp.dpr, 1.0);
}

// --- backing_size ---

#[test]
fn backing_size_scales_by_dpr() {
    let vp = Viewport { width: 800.0, height: 600.0, dpr: 2.0 };
    assert_eq!(vp.backing_size(), (1600, 1200));
}

#[test]
fn backing_size_rounds_fractional_dpr() {
    let vp = Viewport { width: 333.0, height: 101.0, dpr: 1.5 };
    assert_eq!(vp.backing_size(), (500, 152));
}

// --- client_to_logical ---

#[test]
fn client_to_logical_subtracts_origin() {
    let vp = Viewport { width: 800.0, height: 600.0, dpr: 2.0 };
    let p = vp.client_to_logical(Point::new(110.0, 70.0), rect(10.0, 20.0, 800.0, 600.0)).unwrap();
    assert!(approx_eq(p.x, 100.0));
    assert!(approx_eq(p.y, 50.0));
}

#[test]
fn client_to_logical_cancels_css_stretching() {
    let vp = Viewport { width: 800.0, height: 600.0, dpr: 1.0 };
    let p = vp.client_to_logical(Point::new(200.0, 150.0), rect(0.0, 0.0, 400.0, 300.0)).unwrap();
    assert!(approx_eq(p.x, 400.0));
    assert!(approx_eq(p.y, 300.0));
}

#[test]
fn client_to_logical_is_independent_of_dpr() {
    let a = Viewport { width: 800.0, height: 600.0, dpr: 1.0 };
    let b = Viewport { width: 800.0, height: 600.0, dpr: 3.0 };
    let r = rect(5.0, 5.0, 800.0, 600.0);
    let pt = Point::new(123.0, 456.0);
    assert_eq!(a.client_to_logical(pt, r), b.client_to_logical(pt, r));
}

#[test]
fn client_to_logical_zero_rect_is_none() {
    let vp = Viewport { width: 800.0, height: 600.0, dpr: 1.0 };
    assert!(vp.client_to_logical(Point::new(1.0, 1.0), rect(0.0, 0.0, 0.0, 0.0)).is_none());
}
