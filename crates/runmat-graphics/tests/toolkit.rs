mod common;

use common::{engine_with_toolkit, numbers};
use runmat_graphics::{commands, Handle, ObjectKind, Value};

#[test]
fn the_root_reports_the_toolkit_screen() {
    let (e, _, _) = engine_with_toolkit();
    assert_eq!(
        e.get(Handle::ROOT, "screenpixelsperinch").unwrap(),
        Value::Num(72.0)
    );
    assert_eq!(numbers(&e, Handle::ROOT, "screensize"), vec![1.0, 1.0, 1280.0, 800.0]);
}

#[test]
fn drawnow_redraws_only_modified_figures() {
    let (mut e, toolkit, _) = engine_with_toolkit();
    let f1 = e.create_figure(None, &[]).unwrap();
    let f2 = e.create_figure(None, &[]).unwrap();
    e.drawnow(false).unwrap();
    toolkit.redraws.borrow_mut().clear();

    e.set(f1, "name", &Value::from("changed")).unwrap();
    e.drawnow(false).unwrap();
    assert_eq!(*toolkit.redraws.borrow(), vec![f1]);
    assert!(toolkit
        .changes
        .borrow()
        .contains(&(f1, "name".to_string())));

    toolkit.redraws.borrow_mut().clear();
    e.drawnow(false).unwrap();
    assert!(toolkit.redraws.borrow().is_empty());
    assert!(e.is_handle(f2));
}

#[test]
fn drawnow_prints_the_current_figure() {
    let (mut e, toolkit, _) = engine_with_toolkit();
    let fig = e.create_figure(None, &[]).unwrap();
    commands::drawnow(&mut e, &["svg".into(), "|lpr".into()]).unwrap();
    assert_eq!(
        *toolkit.prints.borrow(),
        vec![(fig, "svg".to_string(), "|lpr".to_string())]
    );
}

#[test]
fn resizing_a_figure_posts_its_resize_callback() {
    let (mut e, _, recorder) = engine_with_toolkit();
    let fig = e
        .create_figure(None, &[("sizechangedfcn", Value::from("resized"))])
        .unwrap();
    e.process_events(false);

    e.set(fig, "position", &Value::row(&[10.0, 10.0, 300.0, 200.0]))
        .unwrap();
    e.process_events(false);
    assert_eq!(recorder.calls(), vec!["resized".to_string()]);

    // Moving without resizing is not a resize.
    e.set(fig, "position", &Value::row(&[50.0, 50.0, 300.0, 200.0]))
        .unwrap();
    e.process_events(false);
    assert_eq!(recorder.calls().len(), 1);
}

#[test]
fn making_a_figure_visible_makes_it_current() {
    let (mut e, _, _) = engine_with_toolkit();
    let f1 = e
        .create_figure(None, &[("visible", Value::from("off"))])
        .unwrap();
    let f2 = e.create_figure(None, &[]).unwrap();
    assert_eq!(e.current_figure(), Some(f2));
    e.set(f1, "visible", &Value::from("on")).unwrap();
    assert_eq!(e.current_figure(), Some(f1));
    assert_eq!(e.figure_handles().first(), Some(&f1));
}

#[test]
fn hidden_handles_are_listed_only_on_request() {
    let (mut e, _, _) = engine_with_toolkit();
    let fig = e.create_figure(None, &[]).unwrap();
    let ax = e.create(ObjectKind::Axes, fig, &[]).unwrap();
    let shown = e.handles(false);
    assert_eq!(shown, vec![fig, ax]);
    assert!(e.handles(true).len() > shown.len());

    e.set(Handle::ROOT, "showhiddenhandles", &Value::from("on"))
        .unwrap();
    assert_eq!(e.handles(false).len(), e.handles(true).len());
}
