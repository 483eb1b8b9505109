//! MATLAB-compatible graphics property builtins: `get`, `set`,
//! `addproperty`, `addlistener`, `dellistener`, `reset`, `delete`,
//! `ishandle`, `drawnow` and `waitfor`.
//!
//! Each builtin takes the engine and its raw argument list and returns a
//! single value (`[]` for commands without output).

use crate::engine::GraphicsEngine;
use crate::error::{GraphicsError, GraphicsResult};
use crate::handle::Handle;
use crate::property::PropertyKind;
use crate::value::{Tensor, Value};

pub type Builtin = fn(&mut GraphicsEngine, &[Value]) -> GraphicsResult<Value>;

pub const BUILTIN_NAMES: [&str; 10] = [
    "get",
    "set",
    "addproperty",
    "addlistener",
    "dellistener",
    "reset",
    "delete",
    "ishandle",
    "drawnow",
    "waitfor",
];

/// Look up a builtin by name.
pub fn builtin(name: &str) -> Option<Builtin> {
    let f: Builtin = match name {
        "get" => get,
        "set" => set,
        "addproperty" => addproperty,
        "addlistener" => addlistener,
        "dellistener" => dellistener,
        "reset" => reset,
        "delete" => delete,
        "ishandle" => ishandle,
        "drawnow" => drawnow,
        "waitfor" => waitfor,
        _ => return None,
    };
    Some(f)
}

pub fn call(engine: &mut GraphicsEngine, name: &str, args: &[Value]) -> GraphicsResult<Value> {
    let f = builtin(name).ok_or_else(|| {
        GraphicsError::usage("call", format!("unknown graphics builtin \"{name}\""))
    })?;
    f(engine, args)
}

// ----- argument helpers ------------------------------------------------------

fn text_arg<'a>(value: &'a Value, builtin: &'static str, what: &str) -> GraphicsResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| GraphicsError::usage(builtin, format!("{what} must be a string")))
}

fn is_keyword(value: &Value, keyword: &str) -> bool {
    value
        .as_str()
        .map(|s| s.trim().eq_ignore_ascii_case(keyword))
        .unwrap_or(false)
}

/// Every handle in `value`, each required to be live.
fn handles_arg(
    engine: &GraphicsEngine,
    value: &Value,
    builtin: &'static str,
) -> GraphicsResult<Vec<Handle>> {
    let handles = Handle::list_from_value(value)
        .ok_or_else(|| GraphicsError::usage(builtin, "H must be a graphics handle"))?;
    if let Some(bad) = handles.iter().find(|h| !engine.is_handle(**h)) {
        return Err(GraphicsError::invalid_handle(bad.value()));
    }
    Ok(handles)
}

fn single_handle(
    engine: &GraphicsEngine,
    value: &Value,
    builtin: &'static str,
) -> GraphicsResult<Handle> {
    match handles_arg(engine, value, builtin)?.as_slice() {
        [h] => Ok(*h),
        _ => Err(GraphicsError::usage(builtin, "H must be a single graphics handle")),
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Cell(items) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => None,
    }
}

// ----- get -------------------------------------------------------------------

#[derive(Debug)]
enum GetRequest {
    All,
    One(String),
    Many(Vec<String>),
}

/// `get(h)`, `get(h, name)` or `get(h, {names...})`. Several handles give a
/// cell with one entry per handle.
pub fn get(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let (target, request) = match args {
        [] => return Err(GraphicsError::usage("get", "not enough input arguments")),
        [h] => (h, GetRequest::All),
        [h, Value::String(name)] => (h, GetRequest::One(name.clone())),
        [h, names @ Value::Cell(_)] => (
            h,
            GetRequest::Many(
                string_list(names)
                    .ok_or_else(|| GraphicsError::usage("get", "property names must be strings"))?,
            ),
        ),
        [_, _] => return Err(GraphicsError::usage("get", "NAME must be a string or cell of strings")),
        _ => return Err(GraphicsError::usage("get", "too many input arguments")),
    };
    if target.is_empty() {
        return Ok(Value::Empty);
    }
    let handles = handles_arg(engine, target, "get")?;
    let mut values = Vec::with_capacity(handles.len());
    for h in &handles {
        let value = match &request {
            GetRequest::All => Value::Struct(engine.get_all(*h, false)?),
            GetRequest::One(name) => engine.get(*h, name)?,
            GetRequest::Many(names) => Value::Cell(
                names
                    .iter()
                    .map(|n| engine.get(*h, n))
                    .collect::<GraphicsResult<_>>()?,
            ),
        };
        values.push(value);
    }
    Ok(match values.len() {
        1 => values.remove(0),
        _ => Value::Cell(values),
    })
}

// ----- set -------------------------------------------------------------------

#[derive(Debug)]
enum SetRequest {
    /// The allowed values of one property.
    Options(String),
    /// Name/value pairs per handle.
    Pairs(Vec<Vec<(String, Value)>>),
}

fn parse_set(rest: &[Value], handle_count: usize) -> GraphicsResult<SetRequest> {
    let same = |pairs: Vec<(String, Value)>| SetRequest::Pairs(vec![pairs; handle_count]);
    match rest {
        [] => Err(GraphicsError::usage("set", "not enough input arguments")),
        [Value::String(name)] => Ok(SetRequest::Options(name.clone())),
        [Value::Struct(fields)] => Ok(same(
            fields
                .fields
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )),
        [names @ Value::Cell(_), Value::Cell(values)] => {
            let names = string_list(names)
                .ok_or_else(|| GraphicsError::usage("set", "property names must be strings"))?;
            let m = names.len();
            if values.len() == m {
                Ok(same(names.into_iter().zip(values.iter().cloned()).collect()))
            } else if m > 0 && values.len() == m * handle_count {
                Ok(SetRequest::Pairs(
                    values
                        .chunks(m)
                        .map(|row| names.iter().cloned().zip(row.iter().cloned()).collect())
                        .collect(),
                ))
            } else {
                Err(GraphicsError::usage(
                    "set",
                    "size of the value cell does not match the property names",
                ))
            }
        }
        pairs if pairs.len() % 2 == 0 => {
            let pairs = pairs
                .chunks(2)
                .map(|pair| Ok((text_arg(&pair[0], "set", "property name")?.to_string(), pair[1].clone())))
                .collect::<GraphicsResult<Vec<_>>>()?;
            Ok(same(pairs))
        }
        _ => Err(GraphicsError::usage(
            "set",
            "property names and values must come in pairs",
        )),
    }
}

fn property_options(engine: &GraphicsEngine, h: Handle, name: &str) -> GraphicsResult<Value> {
    let obj = engine
        .object(h)
        .ok_or_else(|| GraphicsError::invalid_handle(h.value()))?;
    let prop = obj.properties().lookup(name)?;
    Ok(match prop.kind() {
        PropertyKind::Radio(radio)
        | PropertyKind::DoubleRadio { radio, .. }
        | PropertyKind::Color {
            radio: Some(radio), ..
        } => Value::string_cell(radio.values()),
        PropertyKind::Bool => Value::string_cell(&["on", "off"]),
        _ => Value::Cell(Vec::new()),
    })
}

/// `set(h, name, value, ...)`, `set(h, struct)`, `set(h, {names}, {values})`
/// or `set(h, name)` to list the allowed values of an enumerated property.
pub fn set(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let Some((target, rest)) = args.split_first() else {
        return Err(GraphicsError::usage("set", "not enough input arguments"));
    };
    let handles = handles_arg(engine, target, "set")?;
    match parse_set(rest, handles.len())? {
        SetRequest::Options(name) => match handles.first() {
            Some(h) => property_options(engine, *h, &name),
            None => Ok(Value::Empty),
        },
        SetRequest::Pairs(per_handle) => {
            for (h, pairs) in handles.into_iter().zip(per_handle) {
                engine.set_pairs(h, &pairs)?;
            }
            Ok(Value::Empty)
        }
    }
}

// ----- dynamic properties and listeners --------------------------------------

/// `addproperty(name, h, type, args...)`.
pub fn addproperty(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let [name, h, type_name, extra @ ..] = args else {
        return Err(GraphicsError::usage("addproperty", "not enough input arguments"));
    };
    let name = text_arg(name, "addproperty", "NAME")?;
    let h = single_handle(engine, h, "addproperty")?;
    let type_name = text_arg(type_name, "addproperty", "TYPE")?;
    engine.add_property(h, name, type_name, extra)?;
    Ok(Value::Empty)
}

/// `addlistener(h, name, fcn[, "persistent"])`.
pub fn addlistener(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let (persistent, args) = match args {
        [rest @ .., last] if rest.len() >= 3 && is_keyword(last, "persistent") => (true, rest),
        _ => (false, args),
    };
    let [h, name, callback] = args else {
        return Err(GraphicsError::usage("addlistener", "expected H, PROP and FCN"));
    };
    let name = text_arg(name, "addlistener", "PROP")?;
    for h in handles_arg(engine, h, "addlistener")? {
        engine.add_listener(h, name, callback.clone(), persistent)?;
    }
    Ok(Value::Empty)
}

/// `dellistener(h, name[, fcn][, "persistent"])`.
pub fn dellistener(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let (persistent, args) = match args {
        [rest @ .., last] if rest.len() >= 2 && is_keyword(last, "persistent") => (true, rest),
        _ => (false, args),
    };
    let (h, name, callback) = match args {
        [h, name] => (h, name, None),
        [h, name, callback] => (h, name, Some(callback)),
        _ => return Err(GraphicsError::usage("dellistener", "expected H, PROP and optional FCN")),
    };
    let name = text_arg(name, "dellistener", "PROP")?;
    for h in handles_arg(engine, h, "dellistener")? {
        engine.delete_listener(h, name, callback, persistent)?;
    }
    Ok(Value::Empty)
}

// ----- object lifetime -------------------------------------------------------

/// `reset(h)`: restore every settable property to its default.
pub fn reset(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let [h] = args else {
        return Err(GraphicsError::usage("reset", "expected a single argument H"));
    };
    for h in handles_arg(engine, h, "reset")? {
        engine.reset(h)?;
    }
    Ok(Value::Empty)
}

/// `delete(h, ...)`. All handles are checked before anything is deleted.
pub fn delete(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    if args.is_empty() {
        return Err(GraphicsError::usage("delete", "not enough input arguments"));
    }
    let mut handles = Vec::new();
    for value in args {
        handles.extend(handles_arg(engine, value, "delete")?);
    }
    for h in handles {
        // An earlier entry may already have taken this one down with it.
        if engine.is_handle(h) {
            engine.delete(h)?;
        }
    }
    Ok(Value::Empty)
}

/// `ishandle(x)`: logical of the same shape as `x`.
pub fn ishandle(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let [value] = args else {
        return Err(GraphicsError::usage("ishandle", "expected a single argument"));
    };
    let Some(tensor) = value.to_tensor() else {
        return Ok(Value::Bool(false));
    };
    if !matches!(value, Value::Tensor(_)) && tensor.len() == 1 {
        return Ok(Value::Bool(engine.is_handle(Handle::new(tensor.data[0]))));
    }
    let flags = tensor
        .data
        .iter()
        .map(|v| f64::from(u8::from(engine.is_handle(Handle::new(*v)))))
        .collect();
    Tensor::new(flags, tensor.shape.clone())
        .map(Value::Tensor)
        .map_err(|e| GraphicsError::usage("ishandle", e))
}

// ----- drawnow and waitfor ---------------------------------------------------

#[derive(Debug, PartialEq)]
enum DrawnowAction {
    Update { expose_only: bool },
    Print {
        format: String,
        file: String,
        debug_file: Option<String>,
    },
}

fn parse_drawnow(args: &[Value]) -> GraphicsResult<DrawnowAction> {
    match args {
        [] => Ok(DrawnowAction::Update { expose_only: false }),
        [flag] if is_keyword(flag, "expose") => Ok(DrawnowAction::Update { expose_only: true }),
        [format, file] | [format, file, _] => Ok(DrawnowAction::Print {
            format: text_arg(format, "drawnow", "FORMAT")?.to_string(),
            file: text_arg(file, "drawnow", "FILE")?.to_string(),
            debug_file: match args.get(2) {
                Some(v) => Some(text_arg(v, "drawnow", "DEBUG_FILE")?.to_string()),
                None => None,
            },
        }),
        _ => Err(GraphicsError::usage("drawnow", "invalid arguments")),
    }
}

/// `drawnow()`, `drawnow("expose")` or `drawnow(format, file[, debug_file])`.
pub fn drawnow(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    match parse_drawnow(args)? {
        DrawnowAction::Update { expose_only } => engine.drawnow(expose_only)?,
        DrawnowAction::Print {
            format,
            file,
            debug_file,
        } => engine.print_figure(&format, &file, debug_file.as_deref())?,
    }
    Ok(Value::Empty)
}

#[derive(Debug, PartialEq)]
struct WaitforRequest {
    property: Option<String>,
    target: Option<Value>,
    timeout: Option<f64>,
}

fn parse_waitfor(rest: &[Value]) -> GraphicsResult<WaitforRequest> {
    let mut positional = Vec::new();
    let mut timeout = None;
    let mut i = 0;
    while i < rest.len() {
        if is_keyword(&rest[i], "timeout") {
            let value = rest
                .get(i + 1)
                .ok_or_else(|| GraphicsError::usage("waitfor", "missing TIMEOUT value"))?;
            let seconds = value
                .as_f64()
                .filter(|t| t.is_finite())
                .ok_or_else(|| GraphicsError::usage("waitfor", "TIMEOUT must be a real scalar"))?;
            timeout = Some(seconds);
            i += 2;
        } else {
            positional.push(&rest[i]);
            i += 1;
        }
    }
    match positional.as_slice() {
        [] => Ok(WaitforRequest {
            property: None,
            target: None,
            timeout,
        }),
        [name] | [name, _] => Ok(WaitforRequest {
            property: Some(text_arg(name, "waitfor", "PROP")?.to_string()),
            target: positional.get(1).map(|v| (*v).clone()),
            timeout,
        }),
        _ => Err(GraphicsError::usage("waitfor", "too many input arguments")),
    }
}

/// `waitfor(h[, prop[, value]][, "timeout", seconds])`.
pub fn waitfor(engine: &mut GraphicsEngine, args: &[Value]) -> GraphicsResult<Value> {
    let Some((target, rest)) = args.split_first() else {
        return Err(GraphicsError::usage("waitfor", "not enough input arguments"));
    };
    if target.is_empty() {
        return Ok(Value::Empty);
    }
    let h = target
        .as_f64()
        .map(Handle::new)
        .ok_or_else(|| GraphicsError::usage("waitfor", "H must be a scalar graphics handle"))?;
    let request = parse_waitfor(rest)?;
    engine.waitfor(
        h,
        request.property.as_deref(),
        request.target,
        request.timeout,
    )?;
    Ok(Value::Empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawnow_forms() {
        assert_eq!(
            parse_drawnow(&[]).unwrap(),
            DrawnowAction::Update { expose_only: false }
        );
        assert_eq!(
            parse_drawnow(&[Value::from("Expose")]).unwrap(),
            DrawnowAction::Update { expose_only: true }
        );
        assert_eq!(
            parse_drawnow(&[Value::from("png"), Value::from("out.png")]).unwrap(),
            DrawnowAction::Print {
                format: "png".into(),
                file: "out.png".into(),
                debug_file: None,
            }
        );
        assert!(parse_drawnow(&[Value::from("redraw")]).is_err());
    }

    #[test]
    fn waitfor_timeout_anywhere() {
        let req = parse_waitfor(&[
            Value::from("timeout"),
            Value::Num(2.5),
            Value::from("userdata"),
            Value::Num(3.0),
        ])
        .unwrap();
        assert_eq!(req.property.as_deref(), Some("userdata"));
        assert_eq!(req.target, Some(Value::Num(3.0)));
        assert_eq!(req.timeout, Some(2.5));
        assert!(parse_waitfor(&[Value::from("timeout")]).is_err());
    }

    #[test]
    fn set_value_cells_per_handle() {
        let names = Value::string_cell(&["tag", "userdata"]);
        let values = Value::Cell(vec![
            Value::from("a"),
            Value::Num(1.0),
            Value::from("b"),
            Value::Num(2.0),
        ]);
        let SetRequest::Pairs(rows) = parse_set(&[names, values], 2).unwrap() else {
            panic!("expected pairs");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], ("tag".to_string(), Value::from("b")));
        assert!(parse_set(&[Value::from("tag"), Value::Num(1.0), Value::Num(2.0)], 1).is_err());
    }

    #[test]
    fn builtin_table_is_complete() {
        for name in BUILTIN_NAMES {
            assert!(builtin(name).is_some(), "{name}");
        }
        assert!(builtin("plot").is_none());
    }
}
