mod common;

use common::{engine, engine_with_recorder, figure_and_axes};
use runmat_graphics::commands;
use runmat_graphics::{GraphicsError, Handle, ObjectKind, Tensor, Value};

fn h(handle: Handle) -> Value {
    Value::from(handle)
}

#[test]
fn get_and_set_through_the_builtins() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();

    commands::set(
        &mut e,
        &[h(line), "Tag".into(), "first".into(), "LineWidth".into(), Value::Num(2.0)],
    )
    .unwrap();
    assert_eq!(
        commands::get(&mut e, &[h(line), "tag".into()]).unwrap(),
        Value::from("first")
    );

    let both = commands::get(
        &mut e,
        &[h(line), Value::string_cell(&["tag", "linewidth"])],
    )
    .unwrap();
    assert_eq!(both, Value::Cell(vec![Value::from("first"), Value::Num(2.0)]));

    let Value::Struct(all) = commands::get(&mut e, &[h(line)]).unwrap() else {
        panic!("get(h) should return a struct");
    };
    assert_eq!(all.get("linewidth"), Some(&Value::Num(2.0)));
    assert!(all.get("__autopos_tag__").is_none());
}

#[test]
fn set_with_several_handles_and_value_cells() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let a = e.create(ObjectKind::Line, ax, &[]).unwrap();
    let b = e.create(ObjectKind::Line, ax, &[]).unwrap();
    let both = Value::Tensor(Tensor::column(&[a.value(), b.value()]));

    commands::set(
        &mut e,
        &[
            both.clone(),
            Value::string_cell(&["tag"]),
            Value::Cell(vec![Value::from("a"), Value::from("b")]),
        ],
    )
    .unwrap();
    assert_eq!(e.get(a, "tag").unwrap(), Value::from("a"));
    assert_eq!(e.get(b, "tag").unwrap(), Value::from("b"));

    let tags = commands::get(&mut e, &[both, "tag".into()]).unwrap();
    assert_eq!(tags, Value::Cell(vec![Value::from("a"), Value::from("b")]));
}

#[test]
fn set_with_a_struct_applies_every_field() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    let mut fields = runmat_graphics::StructValue::new();
    fields.insert("tag", Value::from("s"));
    fields.insert("linewidth", Value::Num(4.0));
    commands::set(&mut e, &[h(line), Value::Struct(fields)]).unwrap();
    assert_eq!(e.get(line, "linewidth").unwrap(), Value::Num(4.0));
}

#[test]
fn set_with_only_a_name_lists_the_choices() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    assert_eq!(
        commands::set(&mut e, &[h(line), "busyaction".into()]).unwrap(),
        Value::string_cell(&["queue", "cancel"])
    );
    assert_eq!(
        commands::set(&mut e, &[h(line), "tag".into()]).unwrap(),
        Value::Cell(Vec::new())
    );
}

#[test]
fn odd_argument_lists_are_usage_errors() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    let err = commands::set(&mut e, &[h(fig), "tag".into(), "x".into(), "name".into()])
        .unwrap_err();
    assert!(matches!(err, GraphicsError::Usage { builtin: "set", .. }));
    assert!(matches!(
        commands::get(&mut e, &[Value::Num(12345.0), "tag".into()]),
        Err(GraphicsError::InvalidHandle(_))
    ));
}

#[test]
fn ishandle_keeps_the_shape_of_its_input() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    assert_eq!(
        commands::ishandle(&mut e, &[h(fig)]).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        commands::ishandle(&mut e, &["figure".into()]).unwrap(),
        Value::Bool(false)
    );
    let Value::Tensor(flags) =
        commands::ishandle(&mut e, &[Value::row(&[0.0, fig.value(), 99.0])]).unwrap()
    else {
        panic!("array input should give an array");
    };
    assert_eq!(flags.shape, vec![1, 3]);
    assert_eq!(flags.data, vec![1.0, 1.0, 0.0]);
}

#[test]
fn delete_checks_every_handle_first() {
    let mut e = engine();
    let (fig, ax) = figure_and_axes(&mut e);
    let err = commands::delete(&mut e, &[h(ax), Value::Num(4242.0)]).unwrap_err();
    assert!(matches!(err, GraphicsError::InvalidHandle(_)));
    assert!(e.is_handle(ax));

    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    commands::delete(&mut e, &[h(ax), h(line)]).unwrap();
    assert!(!e.is_handle(ax));
    assert!(!e.is_handle(line));
    assert!(e.is_handle(fig));
}

#[test]
fn addproperty_and_listeners() {
    let (mut e, recorder) = engine_with_recorder();
    let fig = e.create_figure(None, &[]).unwrap();
    commands::addproperty(
        &mut e,
        &["mode2".into(), h(fig), "radio".into(), "slow|{fast}".into()],
    )
    .unwrap();
    assert_eq!(e.get(fig, "mode2").unwrap(), Value::from("fast"));
    assert!(e.set(fig, "mode2", &Value::from("medium")).is_err());

    commands::addlistener(&mut e, &[h(fig), "mode2".into(), "changed".into()]).unwrap();
    e.set(fig, "mode2", &Value::from("slow")).unwrap();
    e.process_events(false);
    assert_eq!(recorder.calls(), vec!["changed".to_string()]);

    commands::dellistener(&mut e, &[h(fig), "mode2".into()]).unwrap();
    e.set(fig, "mode2", &Value::from("fast")).unwrap();
    e.process_events(false);
    assert_eq!(recorder.calls().len(), 1);

    assert!(matches!(
        commands::addproperty(&mut e, &["mode2".into(), h(fig), "string".into()]),
        Err(GraphicsError::PropertyExists { .. })
    ));
}

#[test]
fn reset_builtin_restores_factory_values() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e
        .create(ObjectKind::Line, ax, &[("linestyle", Value::from("--"))])
        .unwrap();
    commands::reset(&mut e, &[h(line)]).unwrap();
    assert_eq!(e.get(line, "linestyle").unwrap(), Value::from("-"));
    assert!(commands::reset(&mut e, &[]).is_err());
}

#[test]
fn drawnow_runs_pending_callbacks() {
    let (mut e, recorder) = engine_with_recorder();
    let fig = e
        .create_figure(None, &[("createfcn", Value::from("created"))])
        .unwrap();
    assert!(recorder.calls().is_empty());
    commands::drawnow(&mut e, &[]).unwrap();
    assert_eq!(recorder.calls(), vec!["created".to_string()]);

    e.post_callback(fig, "createfcn", Value::Empty).unwrap();
    commands::drawnow(&mut e, &["expose".into()]).unwrap();
    assert_eq!(recorder.calls().len(), 1);
    assert!(commands::drawnow(&mut e, &["sideways".into()]).is_err());
}

#[test]
fn drawnow_printing_needs_a_capable_toolkit() {
    let mut e = engine();
    e.create_figure(None, &[]).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out.png");
    let err = commands::drawnow(
        &mut e,
        &["png".into(), Value::from(file.to_string_lossy().into_owned())],
    )
    .unwrap_err();
    assert!(matches!(err, GraphicsError::Toolkit { .. }));

    let missing = dir.path().join("nope").join("out.png");
    let err = commands::drawnow(
        &mut e,
        &["png".into(), Value::from(missing.to_string_lossy().into_owned())],
    )
    .unwrap_err();
    assert!(matches!(err, GraphicsError::Usage { builtin: "drawnow", .. }));
}

#[test]
fn waitfor_returns_once_the_property_matches() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    e.post_set(fig, "userdata", Value::Num(5.0));
    commands::waitfor(&mut e, &[h(fig), "userdata".into(), Value::Num(5.0)]).unwrap();
    assert_eq!(e.get(fig, "userdata").unwrap(), Value::Num(5.0));

    // Nothing to wait for on an empty or stale handle.
    commands::waitfor(&mut e, &[Value::Empty]).unwrap();
    e.delete(fig).unwrap();
    commands::waitfor(&mut e, &[h(fig)]).unwrap();
}

#[test]
fn builtins_are_reachable_by_name() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    assert_eq!(
        commands::call(&mut e, "ishandle", &[h(fig)]).unwrap(),
        Value::Bool(true)
    );
    assert!(commands::call(&mut e, "plot", &[]).is_err());
}
