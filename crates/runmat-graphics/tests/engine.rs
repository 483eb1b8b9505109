mod common;

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use common::{assert_close, engine, engine_with_recorder, figure_and_axes, numbers};
use runmat_graphics::{
    GraphicsConfig, GraphicsEngine, GraphicsError, Handle, ObjectKind, Value, ZoomMode,
};

#[test]
fn figures_take_the_lowest_free_integer() {
    let mut e = engine();
    let f1 = e.create_figure(None, &[]).unwrap();
    let f2 = e.create_figure(None, &[]).unwrap();
    assert_eq!(f1, Handle::new(1.0));
    assert_eq!(f2, Handle::new(2.0));
    assert_eq!(e.current_figure(), Some(f2));

    let ax = e.create(ObjectKind::Axes, f1, &[]).unwrap();
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    assert!(!ax.is_integer());
    assert!(!line.is_integer());
    assert_ne!(ax, line);

    e.delete(f1).unwrap();
    assert_eq!(e.create_figure(None, &[]).unwrap(), Handle::new(1.0));
}

#[test]
fn deleting_a_figure_takes_its_subtree() {
    let mut e = engine();
    let (fig, ax) = figure_and_axes(&mut e);
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    e.delete(fig).unwrap();
    for h in [fig, ax, line] {
        assert!(!e.is_handle(h));
    }
    assert_eq!(e.current_figure(), None);
    assert!(matches!(
        e.delete(Handle::ROOT),
        Err(GraphicsError::Structural(_))
    ));
}

#[test]
fn abbreviated_names_resolve_when_unique() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    e.set(line, "LineW", &Value::Num(2.0)).unwrap();
    assert_eq!(e.get(line, "linewidth").unwrap(), Value::Num(2.0));
    assert!(matches!(
        e.get(line, "xdat"),
        Err(GraphicsError::AmbiguousProperty { .. })
    ));
    assert!(matches!(
        e.get(line, "nosuchthing"),
        Err(GraphicsError::UnknownProperty { .. })
    ));
}

#[test]
fn out_of_range_values_are_rejected_and_leave_the_old_value() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let err = e.set(ax, "linewidth", &Value::Num(-1.0)).unwrap_err();
    assert!(matches!(err, GraphicsError::InvalidValue { .. }));
    assert_eq!(e.get(ax, "linewidth").unwrap(), Value::Num(0.5));
    assert!(e.set(ax, "visible", &Value::from("maybe")).is_err());
}

#[test]
fn setting_the_same_value_twice_notifies_once() {
    let (mut e, recorder) = engine_with_recorder();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    e.add_listener(line, "linewidth", Value::from("heard"), false)
        .unwrap();
    e.set(line, "linewidth", &Value::Num(3.0)).unwrap();
    e.set(line, "linewidth", &Value::Num(3.0)).unwrap();
    e.process_events(false);
    assert_eq!(recorder.calls(), vec!["heard".to_string()]);
}

#[test]
fn defaults_are_inherited_from_ancestors() {
    let mut e = engine();
    e.set(Handle::ROOT, "defaultlinelinewidth", &Value::Num(2.0))
        .unwrap();
    let (fig, ax) = figure_and_axes(&mut e);
    e.set(fig, "defaultlinelinewidth", &Value::Num(4.0)).unwrap();
    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    assert_eq!(e.get(line, "linewidth").unwrap(), Value::Num(4.0));
    assert_eq!(
        e.get(ax, "defaultlinelinewidth").unwrap(),
        Value::Num(4.0)
    );

    e.set(line, "linewidth", &Value::Num(1.0)).unwrap();
    e.set(line, "linewidth", &Value::from("default")).unwrap();
    assert_eq!(e.get(line, "linewidth").unwrap(), Value::Num(4.0));
    e.set(line, "linewidth", &Value::from("factory")).unwrap();
    assert_eq!(e.get(line, "linewidth").unwrap(), Value::Num(0.5));
}

#[test]
fn figure_positions_survive_a_units_round_trip() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    let before = numbers(&e, fig, "position");
    e.set(fig, "units", &Value::from("normalized")).unwrap();
    let normalized = numbers(&e, fig, "position");
    assert!(normalized.iter().all(|v| *v <= 1.0));
    e.set(fig, "units", &Value::from("pixels")).unwrap();
    assert_close(&numbers(&e, fig, "position"), &before);
}

#[test]
fn automatic_limits_follow_the_data() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e
        .create(
            ObjectKind::Line,
            ax,
            &[
                ("xdata", Value::row(&[1.0, 2.0, 3.0])),
                ("ydata", Value::row(&[40.0, 50.0, 60.0])),
            ],
        )
        .unwrap();
    let xlim = numbers(&e, ax, "xlim");
    let ylim = numbers(&e, ax, "ylim");
    assert!(xlim[0] <= 1.0 && xlim[1] >= 3.0, "{xlim:?}");
    assert!(ylim[0] <= 40.0 && ylim[1] >= 60.0, "{ylim:?}");
    assert!(ylim[1] - ylim[0] < 100.0, "{ylim:?}");

    e.set(line, "visible", &Value::from("off")).unwrap();
    let hidden = numbers(&e, ax, "ylim");
    assert!(hidden[1] < 40.0, "{hidden:?}");

    e.set(ax, "xlim", &Value::row(&[0.0, 10.0])).unwrap();
    assert_eq!(e.get(ax, "xlimmode").unwrap(), Value::from("manual"));
    e.set(line, "xdata", &Value::row(&[100.0, 200.0, 300.0])).unwrap();
    assert_close(&numbers(&e, ax, "xlim"), &[0.0, 10.0]);
}

#[test]
fn reparenting_moves_the_current_axes() {
    let mut e = engine();
    let (f1, ax) = figure_and_axes(&mut e);
    let f2 = e.create_figure(None, &[]).unwrap();
    assert_eq!(e.get(f1, "currentaxes").unwrap(), Value::from(ax));

    e.set(ax, "parent", &Value::from(f2)).unwrap();
    assert_eq!(e.get(f1, "currentaxes").unwrap(), Value::Empty);
    assert_eq!(e.get(f2, "currentaxes").unwrap(), Value::from(ax));
    assert_eq!(e.get(ax, "parent").unwrap(), Value::from(f2));

    let line = e.create(ObjectKind::Line, ax, &[]).unwrap();
    assert!(matches!(
        e.set(ax, "parent", &Value::from(line)),
        Err(GraphicsError::Structural(_))
    ));
}

#[test]
fn busy_objects_drop_cancellable_callbacks() {
    let (mut e, recorder) = engine_with_recorder();
    let (_, ax) = figure_and_axes(&mut e);
    let a = e
        .create(
            ObjectKind::Line,
            ax,
            &[
                ("interruptible", Value::from("off")),
                ("buttondownfcn", Value::from("outer")),
            ],
        )
        .unwrap();
    let b = e
        .create(ObjectKind::Line, ax, &[("buttondownfcn", Value::from("cancelled"))])
        .unwrap();
    let c = e
        .create(
            ObjectKind::Line,
            ax,
            &[
                ("busyaction", Value::from("queue")),
                ("buttondownfcn", Value::from("queued")),
            ],
        )
        .unwrap();
    recorder.on("outer", move |engine, _| {
        assert!(engine.is_busy());
        engine.post_callback(b, "buttondownfcn", Value::Empty).unwrap();
        engine.post_callback(c, "buttondownfcn", Value::Empty).unwrap();
    });

    e.post_callback(a, "buttondownfcn", Value::Empty).unwrap();
    assert_eq!(e.process_events(false), 2);
    assert_eq!(
        recorder.calls(),
        vec!["outer".to_string(), "queued".to_string()]
    );
}

#[test]
fn an_object_deleted_inside_its_own_callback_is_erased_afterwards() {
    let (mut e, recorder) = engine_with_recorder();
    let (_, ax) = figure_and_axes(&mut e);
    let line = e
        .create(ObjectKind::Line, ax, &[("buttondownfcn", Value::from("self"))])
        .unwrap();
    let alive_inside = Rc::new(Cell::new(false));
    let seen = alive_inside.clone();
    recorder.on("self", move |engine, args| {
        let h = Handle::from_value(&args[0]).unwrap();
        engine.delete(h).unwrap();
        seen.set(engine.is_handle(h));
    });
    e.execute_named_callback(line, "buttondownfcn", Value::Empty);
    assert!(alive_inside.get());
    assert!(!e.is_handle(line));
}

#[test]
fn deletefcn_runs_while_the_object_is_still_readable() {
    let (mut e, recorder) = engine_with_recorder();
    let (fig, ax) = figure_and_axes(&mut e);
    let line = e
        .create(
            ObjectKind::Line,
            ax,
            &[("deletefcn", Value::from("bye")), ("tag", Value::from("doomed"))],
        )
        .unwrap();
    let tag = Rc::new(std::cell::RefCell::new(String::new()));
    let sink = tag.clone();
    recorder.on("bye", move |engine, args| {
        let h = Handle::from_value(&args[0]).unwrap();
        *sink.borrow_mut() = engine.get(h, "tag").unwrap().as_str().unwrap().to_string();
        assert_eq!(engine.get(h, "beingdeleted").unwrap(), Value::from("on"));
    });
    e.delete(fig).unwrap();
    assert_eq!(recorder.calls(), vec!["bye".to_string()]);
    assert_eq!(tag.borrow().as_str(), "doomed");
    assert!(!e.is_handle(line));
}

#[test]
fn reset_restores_defaults_but_keeps_structure() {
    let mut e = engine();
    let (fig, ax) = figure_and_axes(&mut e);
    let line = e
        .create(ObjectKind::Line, ax, &[("linewidth", Value::Num(3.0))])
        .unwrap();
    e.set(line, "tag", &Value::from("kept?")).unwrap();
    e.reset(line).unwrap();
    assert_eq!(e.get(line, "linewidth").unwrap(), Value::Num(0.5));
    assert_eq!(e.get(line, "tag").unwrap(), Value::from(""));
    assert_eq!(e.get(line, "parent").unwrap(), Value::from(ax));

    e.set(ax, "xlim", &Value::row(&[0.0, 5.0])).unwrap();
    e.reset(ax).unwrap();
    assert_eq!(e.get(ax, "xlimmode").unwrap(), Value::from("auto"));
    assert_eq!(e.get(ax, "parent").unwrap(), Value::from(fig));
}

#[test]
fn patch_mesh_and_columns_stay_in_sync() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    let patch = e
        .create(
            ObjectKind::Patch,
            ax,
            &[
                (
                    "vertices",
                    Value::Tensor(runmat_graphics::Tensor::from_rows(&[
                        &[0.0, 0.0],
                        &[2.0, 0.0],
                        &[2.0, 1.0],
                    ])),
                ),
                ("faces", Value::row(&[1.0, 2.0, 3.0])),
            ],
        )
        .unwrap();
    let Value::Tensor(x) = e.get(patch, "xdata").unwrap() else {
        panic!("xdata should be numeric");
    };
    assert_eq!(x.shape, vec![3, 1]);
    assert_eq!(x.data, vec![0.0, 2.0, 2.0]);
    assert_eq!(e.get(patch, "zdata").unwrap(), Value::Empty);

    e.set(patch, "ydata", &Value::Tensor(runmat_graphics::Tensor::column(&[5.0, 6.0, 7.0])))
        .unwrap();
    let Value::Tensor(vertices) = e.get(patch, "vertices").unwrap() else {
        panic!("vertices should be numeric");
    };
    assert_eq!(vertices.shape, vec![3, 2]);
    assert_eq!(vertices.get2(2, 1), 7.0);
}

#[test]
fn paper_geometry_tracks_units_and_orientation() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    e.set(fig, "paperunits", &Value::from("centimeters")).unwrap();
    assert_close(&numbers(&e, fig, "papersize"), &[21.59, 27.94]);
    e.set(fig, "paperorientation", &Value::from("landscape"))
        .unwrap();
    assert_close(&numbers(&e, fig, "papersize"), &[27.94, 21.59]);
    e.set(fig, "papertype", &Value::from("a4")).unwrap();
    assert_close(&numbers(&e, fig, "papersize"), &[29.7, 21.0]);
}

#[test]
fn zoom_saves_and_restores_the_view() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    e.set(ax, "xlim", &Value::row(&[0.0, 10.0])).unwrap();
    e.set(ax, "ylim", &Value::row(&[0.0, 10.0])).unwrap();
    assert!(e.zoom_stack_is_empty(ax));

    e.zoom(ax, ZoomMode::Both, 2.0).unwrap();
    assert_close(&numbers(&e, ax, "xlim"), &[2.5, 7.5]);
    assert_close(&numbers(&e, ax, "ylim"), &[2.5, 7.5]);
    assert!(!e.zoom_stack_is_empty(ax));

    e.translate(ax, ZoomMode::Horizontal, [5.0, 5.0], [4.0, 5.0], true)
        .unwrap();
    assert_close(&numbers(&e, ax, "xlim"), &[3.5, 8.5]);

    e.unzoom(ax).unwrap();
    assert_close(&numbers(&e, ax, "xlim"), &[0.0, 10.0]);
    assert!(e.zoom_stack_is_empty(ax));
    assert!(e.zoom(ax, ZoomMode::Both, 0.0).is_err());
}

#[test]
fn rotation_clamps_elevation_and_wraps_azimuth() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    e.rotate_view(ax, -100.0, 30.0, true).unwrap();
    assert_close(&numbers(&e, ax, "view"), &[260.0, 90.0]);
    e.rotate_view(ax, 150.0, -200.0, false).unwrap();
    assert_close(&numbers(&e, ax, "view"), &[50.0, -90.0]);

    e.unzoom(ax).unwrap();
    assert_close(&numbers(&e, ax, "view"), &[0.0, 90.0]);
}

#[test]
fn posted_functions_run_on_the_next_drain() {
    let (mut e, recorder) = engine_with_recorder();
    let fig = e
        .create_figure(None, &[("buttondownfcn", Value::from("click"))])
        .unwrap();
    e.post_function(move |engine| {
        engine.set(fig, "name", &Value::from("posted")).unwrap();
    });
    assert_eq!(e.get(fig, "name").unwrap(), Value::from(""));
    assert_eq!(e.process_events(false), 1);
    assert_eq!(e.get(fig, "name").unwrap(), Value::from("posted"));

    let seen = Rc::new(Cell::new(None));
    let inside = seen.clone();
    recorder.on("click", move |engine, _| inside.set(engine.callback_object()));
    e.post_callback(fig, "buttondownfcn", Value::Empty).unwrap();
    e.process_events(false);
    assert_eq!(seen.get(), Some(fig));
    assert_eq!(e.callback_object(), None);
}

#[test]
fn turning_off_integer_handles_renumbers_the_figure() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    let ax = e.create(ObjectKind::Axes, fig, &[]).unwrap();
    let moved = e
        .set_pairs(
            fig,
            &[
                ("integerhandle".to_string(), Value::from("off")),
                ("tag".to_string(), Value::from("moved")),
            ],
        )
        .unwrap();
    assert!(!moved.is_integer());
    assert!(!e.is_handle(fig));
    assert_eq!(e.get(moved, "tag").unwrap(), Value::from("moved"));
    assert_eq!(e.get(ax, "parent").unwrap(), Value::from(moved));
    assert_eq!(e.current_figure(), Some(moved));
}

#[test]
fn axes_labels_are_hidden_children() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    assert_eq!(e.get(ax, "children").unwrap(), Value::Empty);
    let title = Handle::from_value(&e.get(ax, "title").unwrap()).unwrap();
    assert_eq!(e.get(title, "handlevisibility").unwrap(), Value::from("off"));

    e.delete(title).unwrap();
    let replacement = Handle::from_value(&e.get(ax, "title").unwrap()).unwrap();
    assert!(e.is_handle(replacement));
    assert_ne!(replacement, title);
}

fn line_with(e: &mut GraphicsEngine, ax: Handle, x: &[f64], y: &[f64]) -> Handle {
    e.create(
        ObjectKind::Line,
        ax,
        &[("xdata", Value::row(x)), ("ydata", Value::row(y))],
    )
    .unwrap()
}

fn span(limits: &[f64]) -> f64 {
    limits[1] - limits[0]
}

#[test]
fn automatic_aspect_ratios_follow_the_limits() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    e.set(ax, "xlim", &Value::row(&[0.0, 10.0])).unwrap();
    e.set(ax, "ylim", &Value::row(&[0.0, 2.0])).unwrap();
    e.set(ax, "zlim", &Value::row(&[0.0, 1.0])).unwrap();
    assert_close(&numbers(&e, ax, "plotboxaspectratio"), &[1.0, 1.0, 1.0]);
    assert_close(&numbers(&e, ax, "dataaspectratio"), &[10.0, 2.0, 1.0]);

    e.set(ax, "dataaspectratio", &Value::row(&[1.0, 1.0, 1.0])).unwrap();
    assert_eq!(e.get(ax, "dataaspectratiomode").unwrap(), Value::from("manual"));
    assert_close(&numbers(&e, ax, "plotboxaspectratio"), &[10.0, 2.0, 1.0]);

    // Manual limits are never widened.
    e.set(ax, "plotboxaspectratio", &Value::row(&[1.0, 1.0, 1.0])).unwrap();
    assert_close(&numbers(&e, ax, "xlim"), &[0.0, 10.0]);
    assert_close(&numbers(&e, ax, "ylim"), &[0.0, 2.0]);
}

#[test]
fn fixed_aspect_ratios_widen_automatic_limits() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    line_with(&mut e, ax, &[0.0, 10.0], &[0.0, 2.0]);
    let before: Vec<Vec<f64>> = ["xlim", "ylim", "zlim"]
        .iter()
        .map(|n| numbers(&e, ax, n))
        .collect();
    let widest = before.iter().map(|l| span(l)).fold(0.0, f64::max);

    e.set(ax, "dataaspectratio", &Value::row(&[1.0, 1.0, 1.0])).unwrap();
    e.set(ax, "plotboxaspectratio", &Value::row(&[1.0, 1.0, 1.0])).unwrap();
    for (name, old) in ["xlim", "ylim", "zlim"].iter().zip(&before) {
        let mid = (old[0] + old[1]) / 2.0;
        assert_close(
            &numbers(&e, ax, name),
            &[mid - widest / 2.0, mid + widest / 2.0],
        );
        assert_eq!(
            e.get(ax, &format!("{name}mode")).unwrap(),
            Value::from("auto")
        );
    }
    let ylim = numbers(&e, ax, "ylim");
    let yticks = numbers(&e, ax, "ytick");
    assert!(yticks
        .iter()
        .all(|t| *t >= ylim[0] - 1e-9 && *t <= ylim[1] + 1e-9));
    assert!(span(&ylim) > 2.0 + 1e-9);
}

#[test]
fn widening_a_log_axis_keeps_its_data_inside() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    e.set(ax, "xscale", &Value::from("log")).unwrap();
    line_with(&mut e, ax, &[3.0, 250.0], &[1.0, 2.0]);
    assert_close(&numbers(&e, ax, "xlim"), &[1.0, 1000.0]);
    let ylim = numbers(&e, ax, "ylim");
    let zlim = numbers(&e, ax, "zlim");
    let widest = [3.0, span(&ylim), span(&zlim)]
        .into_iter()
        .fold(0.0, f64::max);

    e.set(ax, "dataaspectratio", &Value::row(&[1.0, 1.0, 1.0])).unwrap();
    e.set(ax, "plotboxaspectratio", &Value::row(&[1.0, 1.0, 1.0])).unwrap();

    let xlim = numbers(&e, ax, "xlim");
    let lo = 10f64.powf(1.5 - widest / 2.0);
    let hi = 10f64.powf(1.5 + widest / 2.0);
    assert!((xlim[0] - lo).abs() < 1e-6 * lo, "{xlim:?}");
    assert!((xlim[1] - hi).abs() < 1e-6 * hi, "{xlim:?}");
    assert!(xlim[0] > 0.0 && xlim[0] <= 3.0 && xlim[1] >= 250.0);

    let xticks = numbers(&e, ax, "xtick");
    assert!(!xticks.is_empty());
    assert!(xticks
        .iter()
        .all(|t| *t > 0.0 && *t >= xlim[0] * (1.0 - 1e-9) && *t <= xlim[1] * (1.0 + 1e-9)));
    let ylim = numbers(&e, ax, "ylim");
    assert!(ylim[0] <= 1.0 && ylim[1] >= 2.0);
}

#[test]
fn log_axes_snap_limits_to_decades() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    e.set(ax, "xscale", &Value::from("log")).unwrap();
    let line = line_with(&mut e, ax, &[3.0, 250.0], &[1.0, 2.0]);
    assert_close(&numbers(&e, ax, "xlim"), &[1.0, 1000.0]);

    e.set(line, "xdata", &Value::row(&[-250.0, -3.0])).unwrap();
    assert_close(&numbers(&e, ax, "xlim"), &[-1000.0, -1.0]);

    e.set(ax, "xscale", &Value::from("linear")).unwrap();
    let xlim = numbers(&e, ax, "xlim");
    assert!(xlim[0] <= -250.0 && xlim[1] >= -3.0 && xlim[1] <= 0.0);
}

#[test]
fn deleting_a_context_menu_clears_references_to_it() {
    let mut e = engine();
    let (fig, ax) = figure_and_axes(&mut e);
    let menu = e.create(ObjectKind::UiContextMenu, fig, &[]).unwrap();
    let line = e
        .create(ObjectKind::Line, ax, &[("uicontextmenu", Value::from(menu))])
        .unwrap();
    e.set(ax, "uicontextmenu", &Value::from(menu)).unwrap();
    assert_eq!(e.get(line, "uicontextmenu").unwrap(), Value::from(menu));

    e.delete(menu).unwrap();
    assert_eq!(e.get(line, "uicontextmenu").unwrap(), Value::Empty);
    assert_eq!(e.get(ax, "uicontextmenu").unwrap(), Value::Empty);
    assert!(matches!(
        e.set(line, "uicontextmenu", &Value::from(menu)),
        Err(GraphicsError::InvalidValue { .. })
    ));
}

#[test]
fn short_waitfor_timeouts_are_raised_to_the_minimum() {
    let mut config = GraphicsConfig::default();
    config.events.waitfor_min_timeout = 0.2;
    config.events.waitfor_poll_ms = 10;
    let mut e = GraphicsEngine::new(config);
    let fig = e.create_figure(None, &[]).unwrap();

    let start = Instant::now();
    e.waitfor(fig, Some("userdata"), Some(Value::Num(1.0)), Some(0.01))
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(200));
    assert!(e.is_handle(fig));
    let userdata = e.object(fig).unwrap().properties().get("userdata").unwrap();
    assert!(!userdata.has_listeners());
}

#[test]
fn waitfor_returns_when_the_object_goes_away() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    e.post_function(move |engine| engine.delete(fig).unwrap());
    e.waitfor(fig, None, None, None).unwrap();
    assert!(!e.is_handle(fig));
}

#[test]
fn waitfor_on_a_dynamic_property_ends_when_the_object_is_deleted() {
    let (mut e, recorder) = engine_with_recorder();
    let fig = e
        .create_figure(None, &[("buttondownfcn", Value::from("wait"))])
        .unwrap();
    e.add_property(fig, "progress", "any", &[]).unwrap();

    // Deleting the figure from inside its own callback keeps the handle
    // alive until the callback returns, so only the pre-delete listener
    // can end this wait.
    let waited = Rc::new(Cell::new(None));
    let outcome = waited.clone();
    recorder.on("wait", move |engine, _| {
        engine.post_function(move |engine| engine.delete(fig).unwrap());
        let start = Instant::now();
        let result = engine.waitfor(fig, Some("progress"), Some(Value::Num(1.0)), Some(5.0));
        assert!(engine.is_handle(fig));
        outcome.set(Some((result.is_ok(), start.elapsed())));
    });
    e.post_callback(fig, "buttondownfcn", Value::Empty).unwrap();
    e.process_events(false);

    let (ok, elapsed) = waited.get().expect("callback ran");
    assert!(ok);
    assert!(elapsed < Duration::from_secs(2));
    assert!(!e.is_handle(fig));
}

#[test]
fn text_font_units_convert_against_the_axes_height() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    e.set(ax, "units", &Value::from("pixels")).unwrap();
    let height = numbers(&e, ax, "position")[3];
    let text = e
        .create(ObjectKind::Text, ax, &[("string", Value::from("hello"))])
        .unwrap();
    let pixels = 10.0 * 96.0 / 72.0;

    e.set(text, "fontunits", &Value::from("normalized")).unwrap();
    assert_close(&numbers(&e, text, "fontsize"), &[pixels / height]);
    e.set(text, "fontunits", &Value::from("pixels")).unwrap();
    assert_close(&numbers(&e, text, "fontsize"), &[pixels]);
    e.set(text, "fontunits", &Value::from("inches")).unwrap();
    assert_close(&numbers(&e, text, "fontsize"), &[10.0 / 72.0]);
    e.set(text, "fontunits", &Value::from("points")).unwrap();
    assert_close(&numbers(&e, text, "fontsize"), &[10.0]);
}

#[test]
fn uicontrol_font_units_convert_against_the_control_height() {
    let mut e = engine();
    let fig = e.create_figure(None, &[]).unwrap();
    let control = e
        .create(
            ObjectKind::UiControl,
            fig,
            &[("position", Value::row(&[10.0, 10.0, 100.0, 40.0]))],
        )
        .unwrap();
    e.set(control, "fontunits", &Value::from("normalized")).unwrap();
    assert_close(&numbers(&e, control, "fontsize"), &[10.0 * 96.0 / 72.0 / 40.0]);
    e.set(control, "fontunits", &Value::from("centimeters")).unwrap();
    assert_close(&numbers(&e, control, "fontsize"), &[10.0 / 72.0 * 2.54]);
}

#[test]
fn reset_recreates_labels_and_restores_modes_last() {
    let mut e = engine();
    let (_, ax) = figure_and_axes(&mut e);
    line_with(&mut e, ax, &[0.0, 10.0], &[0.0, 2.0]);
    let auto_xlim = numbers(&e, ax, "xlim");
    let auto_xtick = numbers(&e, ax, "xtick");
    let old_labels: Vec<Handle> = ["title", "xlabel", "ylabel", "zlabel"]
        .iter()
        .map(|n| Handle::from_value(&e.get(ax, n).unwrap()).unwrap())
        .collect();

    e.set(ax, "xlim", &Value::row(&[2.0, 3.0])).unwrap();
    e.set(ax, "xtick", &Value::row(&[2.0, 2.5, 3.0])).unwrap();
    assert_eq!(e.get(ax, "xtickmode").unwrap(), Value::from("manual"));

    e.reset(ax).unwrap();
    assert_eq!(e.get(ax, "xlimmode").unwrap(), Value::from("auto"));
    assert_eq!(e.get(ax, "xtickmode").unwrap(), Value::from("auto"));
    assert_close(&numbers(&e, ax, "xlim"), &auto_xlim);
    assert_close(&numbers(&e, ax, "xtick"), &auto_xtick);

    for (name, old) in ["title", "xlabel", "ylabel", "zlabel"].iter().zip(old_labels) {
        let new = Handle::from_value(&e.get(ax, name).unwrap()).unwrap();
        assert_ne!(new, old);
        assert!(!e.is_handle(old));
        assert_eq!(e.object(new).unwrap().parent(), Some(ax));
    }
}
