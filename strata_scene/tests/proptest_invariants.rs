// Copyright 2025 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariants of the reordering and containment operations.
//!
//! Scenes are built from loose elements, deleted elements, labelled
//! containers, flat and nested groups, and frames with children (some of them
//! deleted), laid out coherently and fully indexed. After any shift, with or
//! without an editing group:
//!
//! 1. The scene is a permutation of the input.
//! 2. Every frame's children, deleted ones included, form one block directly
//!    below the frame.
//! 3. Every group stays contiguous.
//! 4. Every label sits directly above its container.
//! 5. Indices are strictly increasing.
//! 6. Live elements outside the selection keep their index.
//! 7. Sending to an extreme twice equals sending once.
//!
//! Repairing a frame with any group-closed set of children keeps 1 to 5 and
//! points exactly the expected elements at the frame. Repairing with the
//! current children changes nothing.

use hashbrown::HashSet;
use proptest::prelude::*;
use proptest::sample::Index;
use strata_scene::{
    BoundElement, Element, ElementFlags, ElementId, ElementKind, Engine, GroupId,
    SelectionContext, ValidateOptions, selected_with_dependents, validate_indices,
};

#[derive(Clone, Copy, Debug)]
enum Block {
    Loose,
    Deleted,
    Labelled,
    Group(usize),
    Nested(usize),
    Frame { children: usize, deleted: bool },
}

#[derive(Clone, Copy, Debug)]
enum Op {
    OneLeft,
    OneRight,
    AllLeft,
    AllRight,
}

fn block_strategy() -> impl Strategy<Value = Block> {
    prop_oneof![
        Just(Block::Loose),
        Just(Block::Deleted),
        Just(Block::Labelled),
        (2_usize..4).prop_map(Block::Group),
        (3_usize..5).prop_map(Block::Nested),
        (0_usize..4, any::<bool>())
            .prop_map(|(children, deleted)| Block::Frame { children, deleted }),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::OneLeft),
        Just(Op::OneRight),
        Just(Op::AllLeft),
        Just(Op::AllRight),
    ]
}

fn build_scene(blocks: &[Block]) -> Vec<Element> {
    let mut scene = Vec::new();
    for (b, block) in blocks.iter().enumerate() {
        match *block {
            Block::Loose => scene.push(Element::new(format!("e{b}"), ElementKind::Rectangle)),
            Block::Deleted => scene.push(
                Element::new(format!("d{b}"), ElementKind::Rectangle)
                    .with_flags(ElementFlags::DELETED),
            ),
            Block::Labelled => {
                scene.push(
                    Element::new(format!("b{b}"), ElementKind::Rectangle)
                        .with_bound(BoundElement::text(format!("t{b}"))),
                );
                scene.push(Element::new(
                    format!("t{b}"),
                    ElementKind::Text {
                        container_id: Some(format!("b{b}").into()),
                    },
                ));
            }
            Block::Group(n) => {
                for j in 0..n {
                    scene.push(
                        Element::new(format!("g{b}_{j}"), ElementKind::Ellipse)
                            .with_groups([format!("g{b}")]),
                    );
                }
            }
            Block::Nested(n) => {
                for j in 0..n {
                    let element = Element::new(format!("n{b}_{j}"), ElementKind::Diamond);
                    scene.push(if j < 2 {
                        element.with_groups([format!("i{b}"), format!("o{b}")])
                    } else {
                        element.with_groups([format!("o{b}")])
                    });
                }
            }
            Block::Frame { children, deleted } => {
                if deleted {
                    scene.push(
                        Element::new(format!("x{b}"), ElementKind::Rectangle)
                            .with_frame(format!("f{b}"))
                            .with_flags(ElementFlags::DELETED),
                    );
                }
                for j in 0..children {
                    scene.push(
                        Element::new(format!("c{b}_{j}"), ElementKind::Rectangle)
                            .with_frame(format!("f{b}")),
                    );
                }
                scene.push(Element::new(format!("f{b}"), ElementKind::Frame));
            }
        }
    }
    let keys = strata_fractional::n_keys_between(None, None, scene.len()).unwrap();
    scene
        .into_iter()
        .zip(keys)
        .map(|(e, k)| e.with_index(k))
        .collect()
}

fn scene_strategy() -> impl Strategy<Value = (Vec<Element>, Vec<bool>)> {
    prop::collection::vec(block_strategy(), 1..7).prop_flat_map(|blocks| {
        let scene = build_scene(&blocks);
        let n = scene.len();
        (Just(scene), prop::collection::vec(any::<bool>(), n))
    })
}

/// The outermost group of the first nested group, if any.
fn editable_group(scene: &[Element]) -> Option<GroupId> {
    scene
        .iter()
        .find(|e| e.group_ids.len() > 1)
        .and_then(|e| e.group_ids.last().cloned())
}

/// Elements picked by `mask`, widened so that labels bring their container
/// and groups below `editing` are taken whole. With `editing`, only members
/// of that group are picked.
fn widen(
    scene: &[Element],
    mask: &[bool],
    editing: Option<&GroupId>,
    keep_deleted: bool,
) -> Vec<ElementId> {
    let picked: Vec<&Element> = scene
        .iter()
        .zip(mask)
        .filter(|(e, m)| **m && (keep_deleted || !e.is_deleted()) && !e.is_frame_like())
        .map(|(e, _)| e)
        .filter(|e| editing.is_none_or(|g| e.group_ids.contains(g)))
        .collect();
    let containers: HashSet<&ElementId> =
        picked.iter().filter_map(|e| e.container_id()).collect();
    let groups: HashSet<&GroupId> = picked
        .iter()
        .flat_map(|e| {
            e.group_ids
                .iter()
                .take_while(move |g| editing.is_none_or(|outer| *g != outer))
        })
        .collect();
    scene
        .iter()
        .filter(|e| {
            picked.iter().any(|p| p.id == e.id)
                || containers.contains(&e.id)
                || e.group_ids.iter().any(|g| groups.contains(g))
        })
        .map(|e| e.id.clone())
        .collect()
}

fn selection(scene: &[Element], mask: &[bool], edit: bool) -> SelectionContext {
    let editing = edit.then(|| editable_group(scene)).flatten();
    let ids = widen(scene, mask, editing.as_ref(), false);
    let ctx = SelectionContext::selecting(ids);
    match editing {
        Some(group) => ctx.with_editing_group(group),
        None => ctx,
    }
}

fn apply(
    engine: &mut Engine,
    scene: Vec<Element>,
    op: Op,
    ctx: &SelectionContext,
) -> Vec<Element> {
    match op {
        Op::OneLeft => engine.move_one_left(scene, ctx),
        Op::OneRight => engine.move_one_right(scene, ctx),
        Op::AllLeft => engine.move_all_left(scene, ctx),
        Op::AllRight => engine.move_all_right(scene, ctx),
    }
}

fn position(scene: &[Element], id: &ElementId) -> usize {
    scene.iter().position(|e| e.id == *id).unwrap()
}

fn check_is_permutation(before: &[Element], after: &[Element]) -> Result<(), TestCaseError> {
    let mut a: Vec<&str> = before.iter().map(|e| e.id.as_str()).collect();
    let mut b: Vec<&str> = after.iter().map(|e| e.id.as_str()).collect();
    a.sort_unstable();
    b.sort_unstable();
    prop_assert_eq!(a, b);
    Ok(())
}

fn check_frame_blocks_contiguous(scene: &[Element]) -> Result<(), TestCaseError> {
    for frame in scene.iter().filter(|e| e.is_frame_like()) {
        let at = position(scene, &frame.id);
        let children: Vec<usize> = scene
            .iter()
            .enumerate()
            .filter(|(_, e)| e.frame_id.as_ref() == Some(&frame.id))
            .map(|(i, _)| i)
            .collect();
        for (k, &i) in children.iter().enumerate() {
            prop_assert_eq!(
                i + children.len(),
                at + k,
                "children of {} are not directly below it",
                frame.id
            );
        }
    }
    Ok(())
}

fn check_groups_contiguous(scene: &[Element]) -> Result<(), TestCaseError> {
    let groups: HashSet<_> = scene.iter().flat_map(|e| e.group_ids.iter()).collect();
    for group in groups {
        let members: Vec<usize> = scene
            .iter()
            .enumerate()
            .filter(|(_, e)| e.group_ids.contains(group))
            .map(|(i, _)| i)
            .collect();
        let span = members[members.len() - 1] - members[0] + 1;
        prop_assert_eq!(span, members.len(), "group {} was split", group);
    }
    Ok(())
}

fn check_labels_follow_containers(scene: &[Element]) -> Result<(), TestCaseError> {
    for (i, label) in scene.iter().enumerate() {
        if let Some(container) = label.container_id() {
            prop_assert_eq!(
                position(scene, container) + 1,
                i,
                "{} left its container",
                label.id
            );
        }
    }
    Ok(())
}

fn check_scene_is_coherent(before: &[Element], after: &[Element]) -> Result<(), TestCaseError> {
    check_is_permutation(before, after)?;
    check_frame_blocks_contiguous(after)?;
    check_groups_contiguous(after)?;
    check_labels_follow_containers(after)?;
    prop_assert!(validate_indices(after, ValidateOptions::default()).is_ok());
    Ok(())
}

fn check_unselected_keep_indices(
    before: &[Element],
    after: &[Element],
    selected: &HashSet<ElementId>,
) -> Result<(), TestCaseError> {
    // Deleted elements are carried along with the selection around them.
    for element in after
        .iter()
        .filter(|e| !e.is_deleted() && !selected.contains(&e.id))
    {
        let original = &before[position(before, &element.id)];
        prop_assert_eq!(&element.index, &original.index);
    }
    Ok(())
}

fn check_shift_preserves_invariants(
    scene: Vec<Element>,
    mask: Vec<bool>,
    edit: bool,
    op: Op,
) -> Result<(), TestCaseError> {
    let ctx = selection(&scene, &mask, edit);
    let selected = selected_with_dependents(&scene, &ctx);
    let mut engine = Engine::new();
    let after = apply(&mut engine, scene.clone(), op, &ctx);

    check_scene_is_coherent(&scene, &after)?;
    check_unselected_keep_indices(&scene, &after, &selected)?;
    Ok(())
}

fn check_extreme_is_idempotent(
    scene: Vec<Element>,
    mask: Vec<bool>,
    edit: bool,
    left: bool,
) -> Result<(), TestCaseError> {
    let ctx = selection(&scene, &mask, edit);
    let op = if left { Op::AllLeft } else { Op::AllRight };
    let mut engine = Engine::new();
    let once = apply(&mut engine, scene, op, &ctx);
    let twice = apply(&mut engine, once.clone(), op, &ctx);
    prop_assert_eq!(once, twice);
    Ok(())
}

/// The frame an element should point at after repairing `frame` with
/// `next`.
fn expected_frame(
    element: &Element,
    next: &HashSet<&ElementId>,
    frame: &ElementId,
) -> Option<ElementId> {
    let listed = next.contains(&element.id)
        || element.container_id().is_some_and(|c| next.contains(c));
    let child = element.frame_id.as_ref() == Some(frame);
    if element.is_frame_like() {
        element.frame_id.clone()
    } else if listed && (!element.is_deleted() || child) {
        Some(frame.clone())
    } else if child {
        None
    } else {
        element.frame_id.clone()
    }
}

fn check_repair_preserves_contiguity(
    scene: Vec<Element>,
    mask: Vec<bool>,
    pick: Index,
) -> Result<(), TestCaseError> {
    let frames: Vec<ElementId> = scene
        .iter()
        .filter(|e| e.is_frame_like())
        .map(|e| e.id.clone())
        .collect();
    if frames.is_empty() {
        return Ok(());
    }
    let frame = &frames[pick.index(frames.len())];
    let next = widen(&scene, &mask, None, true);

    let mut engine = Engine::new();
    let after = engine.repair_ordering(scene.clone(), &next, frame, &SelectionContext::new());
    check_scene_is_coherent(&scene, &after)?;

    let listed: HashSet<&ElementId> = next.iter().collect();
    for element in &scene {
        let repaired = &after[position(&after, &element.id)];
        prop_assert_eq!(
            &repaired.frame_id,
            &expected_frame(element, &listed, frame),
            "{} has the wrong frame",
            element.id
        );
    }
    Ok(())
}

fn check_repair_with_current_children_changes_nothing(
    scene: Vec<Element>,
    pick: Index,
) -> Result<(), TestCaseError> {
    let frames: Vec<ElementId> = scene
        .iter()
        .filter(|e| e.is_frame_like())
        .map(|e| e.id.clone())
        .collect();
    if frames.is_empty() {
        return Ok(());
    }
    let frame = &frames[pick.index(frames.len())];
    let children: Vec<ElementId> = scene
        .iter()
        .filter(|e| e.frame_id.as_ref() == Some(frame))
        .map(|e| e.id.clone())
        .collect();

    let mut engine = Engine::new();
    let after =
        engine.repair_ordering(scene.clone(), &children, frame, &SelectionContext::new());
    prop_assert_eq!(after, scene);
    prop_assert!(engine.mutator().mutations().is_empty());
    Ok(())
}

proptest! {
    #[test]
    fn shift_preserves_invariants(
        (scene, mask) in scene_strategy(),
        edit in any::<bool>(),
        op in op_strategy(),
    ) {
        check_shift_preserves_invariants(scene, mask, edit, op)?;
    }

    #[test]
    fn extreme_is_idempotent(
        (scene, mask) in scene_strategy(),
        edit in any::<bool>(),
        left in any::<bool>(),
    ) {
        check_extreme_is_idempotent(scene, mask, edit, left)?;
    }

    #[test]
    fn repair_preserves_contiguity((scene, mask) in scene_strategy(), pick in any::<Index>()) {
        check_repair_preserves_contiguity(scene, mask, pick)?;
    }

    #[test]
    fn repair_with_current_children_changes_nothing(
        (scene, _) in scene_strategy(),
        pick in any::<Index>(),
    ) {
        check_repair_with_current_children_changes_nothing(scene, pick)?;
    }
}
