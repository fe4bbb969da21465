// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walk a small diagram through frame adoption, resizing and reordering.
//!
//! Run with logging to see every engine decision:
//! - `RUST_LOG=strata_scene=trace cargo run -p strata_demos --example zorder_walkthrough`

use kurbo::Rect;
use log::{error, info};
use strata_scene::{
    Element, ElementKind, Engine, SelectionContext, ValidateOptions, validate_indices,
};

fn print_scene(label: &str, scene: &[Element]) {
    let order: Vec<String> = scene
        .iter()
        .map(|e| match (&e.frame_id, &e.index) {
            (Some(frame), Some(index)) => format!("{}[{index}]@{frame}", e.id),
            (None, Some(index)) => format!("{}[{index}]", e.id),
            (Some(frame), None) => format!("{}@{frame}", e.id),
            (None, None) => e.id.to_string(),
        })
        .collect();
    println!("{label:>24}: {}", order.join("  "));
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let scene = vec![
        Element::new("note", ElementKind::Rectangle).with_geometry(20.0, 20.0, 40.0, 30.0),
        Element::new("board", ElementKind::Frame).with_geometry(0.0, 0.0, 200.0, 120.0),
        Element::new("circle", ElementKind::Ellipse).with_geometry(80.0, 30.0, 30.0, 30.0),
        Element::new("left", ElementKind::Rectangle)
            .with_geometry(150.0, 60.0, 20.0, 20.0)
            .with_groups(["pair"]),
        Element::new("right", ElementKind::Rectangle)
            .with_geometry(260.0, 60.0, 20.0, 20.0)
            .with_groups(["pair"]),
        Element::new("far", ElementKind::Diamond).with_geometry(400.0, 400.0, 20.0, 20.0),
    ];
    let mut engine = Engine::new();
    let idle = SelectionContext::new();

    // Stamp initial indices by repairing from scratch.
    let mut scene = scene;
    let indexer = *engine.indexer();
    indexer.sync_invalid_indices(&mut scene, engine.mutator_mut());
    print_scene("initial", &scene);

    // Adopt everything the board overlaps; the pair comes along as a whole.
    let adopt: Vec<_> = {
        let board = &scene[1];
        engine
            .eligible_children_of(&scene, board)
            .iter()
            .map(|e| e.id.clone())
            .collect()
    };
    info!(children = adopt.len(); "Adopting board children");
    let scene = engine.repair_ordering(scene, &adopt, &"board".into(), &idle);
    print_scene("after adoption", &scene);

    // Shrink the board so only the note and circle remain fully inside.
    let next = engine.recompute_on_resize(
        &scene,
        &"board".into(),
        Rect::new(0.0, 0.0, 120.0, 100.0),
        &idle,
    );
    let scene = engine.repair_ordering(scene, &next, &"board".into(), &idle);
    print_scene("after shrinking", &scene);

    // Reorder inside and outside the board.
    let scene = engine.move_one_left(scene, &SelectionContext::selecting(["circle"]));
    print_scene("circle one left", &scene);
    let scene = engine.move_all_left(scene, &SelectionContext::selecting(["far"]));
    print_scene("far to back", &scene);
    let scene = engine.move_all_right(scene, &SelectionContext::selecting(["board"]));
    print_scene("board to front", &scene);

    match validate_indices(&scene, ValidateOptions::default()) {
        Ok(()) => info!("Indices are consistent"),
        Err(err) => error!(err:err; "Indices are inconsistent"),
    }
    println!("{} elements written", engine.mutator().mutations().len());
}
