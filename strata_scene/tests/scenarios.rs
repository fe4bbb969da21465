// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end reordering and containment scenarios through the public API.

use hashbrown::HashSet;
use kurbo::Rect;
use strata_scene::frame::frame_children;
use strata_scene::{
    Element, ElementId, ElementKind, Engine, FractionalIndex, SelectionContext, ValidateOptions,
    validate_indices,
};

fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(id, ElementKind::Rectangle).with_geometry(x, y, w, h)
}

fn frame(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
    Element::new(id, ElementKind::Frame).with_geometry(x, y, w, h)
}

fn key(s: &str) -> FractionalIndex {
    FractionalIndex::parse(s).unwrap()
}

fn order(elements: &[Element]) -> Vec<&str> {
    elements.iter().map(|e| e.id.as_str()).collect()
}

fn with_keys(elements: Vec<Element>) -> Vec<Element> {
    let keys = strata_fractional::n_keys_between(None, None, elements.len()).unwrap();
    elements
        .into_iter()
        .zip(keys)
        .map(|(e, k)| e.with_index(k))
        .collect()
}

#[test]
fn repair_moves_new_child_below_frame() {
    let scene = with_keys(vec![
        rect("A", 200.0, 200.0, 10.0, 10.0),
        frame("Frame", 0.0, 0.0, 100.0, 100.0),
        rect("B", 10.0, 10.0, 10.0, 10.0),
    ]);
    let mut engine = Engine::new();
    let ctx = SelectionContext::new();
    let out = engine.repair_ordering(scene, &["B".into()], &"Frame".into(), &ctx);
    assert_eq!(order(&out), ["A", "B", "Frame"]);
    assert_eq!(out[1].frame_id, Some("Frame".into()));
    assert!(validate_indices(&out, ValidateOptions::default()).is_ok());

    // Only B was written: its frame and its index.
    let mutations = engine.mutator().mutations();
    assert_eq!(mutations.len(), 1);
    assert!(mutations.contains("B"));
}

#[test]
fn shift_right_reindexes_between_neighbors() {
    let scene = vec![
        rect("A", 0.0, 0.0, 1.0, 1.0).with_index(key("a0")),
        rect("B", 0.0, 0.0, 1.0, 1.0).with_index(key("a1")),
        rect("C", 0.0, 0.0, 1.0, 1.0).with_index(key("a2")),
    ];
    let out = Engine::new().move_one_right(scene, &SelectionContext::selecting(["A"]));
    assert_eq!(order(&out), ["B", "A", "C"]);
    let a = out[1].index.clone().unwrap();
    assert!(key("a1") < a && a < key("a2"));
    assert_eq!(out[0].index, Some(key("a1")));
    assert_eq!(out[2].index, Some(key("a2")));
}

#[test]
fn shrinking_frame_drops_child_left_outside() {
    let scene = vec![
        rect("X", 10.0, 10.0, 20.0, 20.0).with_frame("F"),
        rect("Y", 150.0, 10.0, 20.0, 20.0).with_frame("F"),
        frame("F", 0.0, 0.0, 200.0, 100.0),
    ];
    let next = Engine::new().recompute_on_resize(
        &scene,
        &"F".into(),
        Rect::new(0.0, 0.0, 100.0, 100.0),
        &SelectionContext::new(),
    );
    assert_eq!(next, [ElementId::from("X")]);
}

#[test]
fn move_all_right_shifts_frame_and_loose_buckets_independently() {
    let scene = with_keys(vec![
        rect("L", 0.0, 0.0, 1.0, 1.0),
        rect("X", 0.0, 0.0, 1.0, 1.0).with_frame("F"),
        rect("Y", 0.0, 0.0, 1.0, 1.0).with_frame("F"),
        frame("F", 0.0, 0.0, 10.0, 10.0),
        rect("M", 0.0, 0.0, 1.0, 1.0),
        rect("N", 0.0, 0.0, 1.0, 1.0),
    ]);
    let ctx = SelectionContext::selecting(["L", "X", "M"]);
    let out = Engine::new().move_all_right(scene, &ctx);
    assert_eq!(order(&out), ["Y", "X", "F", "N", "L", "M"]);
    assert!(validate_indices(&out, ValidateOptions::default()).is_ok());
}

#[test]
fn left_then_right_restores_order() {
    let scene = with_keys(vec![
        rect("A", 0.0, 0.0, 1.0, 1.0),
        rect("B", 0.0, 0.0, 1.0, 1.0),
        rect("C", 0.0, 0.0, 1.0, 1.0),
    ]);
    let ctx = SelectionContext::selecting(["B"]);
    let mut engine = Engine::new();
    let left = engine.move_one_left(scene.clone(), &ctx);
    let back = engine.move_one_right(left, &ctx);
    assert_eq!(order(&back), order(&scene));
}

#[test]
fn shifting_the_front_element_forward_is_a_no_op() {
    let scene = with_keys(vec![
        rect("A", 0.0, 0.0, 1.0, 1.0),
        rect("B", 0.0, 0.0, 1.0, 1.0),
    ]);
    let mut engine = Engine::new();
    let out = engine.move_one_right(scene.clone(), &SelectionContext::selecting(["B"]));
    assert_eq!(out, scene);
    let out = engine.move_all_right(out, &SelectionContext::selecting(["B"]));
    assert_eq!(out, scene);
    assert!(engine.mutator().mutations().is_empty());
}

#[test]
fn resize_keeps_groups_whole() {
    let scene = vec![
        rect("a", 10.0, 10.0, 10.0, 10.0)
            .with_frame("F")
            .with_groups(["g"]),
        rect("b", 150.0, 10.0, 10.0, 10.0)
            .with_frame("F")
            .with_groups(["g"]),
        frame("F", 0.0, 0.0, 200.0, 100.0),
    ];
    let next = Engine::new().recompute_on_resize(
        &scene,
        &"F".into(),
        Rect::new(0.0, 0.0, 100.0, 100.0),
        &SelectionContext::new(),
    );
    assert_eq!(next.len(), 2);

    let next = Engine::new().recompute_on_resize(
        &scene,
        &"F".into(),
        Rect::new(300.0, 300.0, 400.0, 400.0),
        &SelectionContext::new(),
    );
    assert!(next.is_empty());
}

#[test]
fn frames_never_nest() {
    let scene = vec![
        rect("a", 10.0, 10.0, 10.0, 10.0).with_groups(["g"]),
        frame("inner", 20.0, 20.0, 10.0, 10.0).with_groups(["g"]),
        rect("loose", 30.0, 30.0, 10.0, 10.0),
        frame("outer", 0.0, 0.0, 100.0, 100.0),
    ];
    let mut engine = Engine::new();
    let ids: Vec<ElementId> = ["a", "inner", "loose"].map(ElementId::from).to_vec();
    let out = engine.repair_ordering(scene, &ids, &"outer".into(), &SelectionContext::new());
    let children: HashSet<&str> = frame_children(&out, &"outer".into())
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(children, HashSet::from_iter(["loose"]));
    assert!(out.iter().all(|e| !e.is_frame_like() || e.frame_id.is_none()));
    assert_eq!(order(&out), ["a", "inner", "loose", "outer"]);
}

#[test]
fn moving_above_an_unknown_target_changes_nothing() {
    let scene = with_keys(vec![
        rect("A", 0.0, 0.0, 1.0, 1.0),
        rect("B", 0.0, 0.0, 1.0, 1.0),
    ]);
    let mut engine = Engine::new();
    let out = engine.move_above_element(scene.clone(), &["B".into()], &"nope".into());
    assert_eq!(out, scene);
    assert!(engine.mutator().mutations().is_empty());
}
