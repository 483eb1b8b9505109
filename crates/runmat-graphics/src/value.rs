use std::collections::BTreeMap;
use std::fmt;

/// Dynamically typed value flowing through the property system.
///
/// Graphics handles are carried as `Num` values; empty matrices (`[]`) are
/// the dedicated `Empty` variant so that "no handle" and "no data" have a
/// single representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Empty,
    Num(f64),
    Bool(bool),
    String(String),
    Tensor(Tensor),
    Cell(Vec<Value>),
    Struct(StructValue),
    FunctionHandle(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    pub fields: BTreeMap<String, Value>,
}

impl StructValue {
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Column-major numeric array.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    pub data: Vec<f64>,
    pub shape: Vec<usize>, // Column-major layout
    pub rows: usize,       // Compatibility for 2D usage
    pub cols: usize,       // Compatibility for 2D usage
}

impl Tensor {
    pub fn new(data: Vec<f64>, shape: Vec<usize>) -> Result<Self, String> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(format!(
                "Tensor data length {} doesn't match shape {:?}",
                data.len(),
                shape
            ));
        }
        let rows = shape.first().copied().unwrap_or(1);
        let cols = if shape.len() >= 2 {
            shape[1..].iter().product()
        } else {
            1
        };
        Ok(Tensor {
            data,
            shape,
            rows,
            cols,
        })
    }

    pub fn new_2d(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self, String> {
        Self::new(data, vec![rows, cols])
    }

    pub fn row(values: &[f64]) -> Self {
        Tensor {
            data: values.to_vec(),
            shape: vec![1, values.len()],
            rows: 1,
            cols: values.len(),
        }
    }

    pub fn column(values: &[f64]) -> Self {
        Tensor {
            data: values.to_vec(),
            shape: vec![values.len(), 1],
            rows: values.len(),
            cols: 1,
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Tensor {
            data: vec![0.0; rows * cols],
            shape: vec![rows, cols],
            rows,
            cols,
        }
    }

    /// Build a matrix from row slices (all rows must share one length).
    pub fn from_rows(rows: &[&[f64]]) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = vec![0.0; nrows * ncols];
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate().take(ncols) {
                data[i + j * nrows] = *v;
            }
        }
        Tensor {
            data,
            shape: vec![nrows, ncols],
            rows: nrows,
            cols: ncols,
        }
    }

    pub fn scalar(value: f64) -> Self {
        Self::row(&[value])
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn ndims(&self) -> usize {
        self.shape.len().max(2)
    }

    pub fn is_vector(&self) -> bool {
        self.shape.len() <= 2 && (self.rows == 1 || self.cols == 1)
    }

    pub fn get2(&self, row: usize, col: usize) -> f64 {
        self.data[row + col * self.rows]
    }

    pub fn set2(&mut self, row: usize, col: usize, value: f64) {
        let rows = self.rows;
        self.data[row + col * rows] = value;
    }

    pub fn transpose(&self) -> Tensor {
        let mut out = Tensor::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.set2(j, i, self.get2(i, j));
            }
        }
        out
    }

    /// Reinterpret as a column vector keeping column-major element order.
    pub fn as_column(&self) -> Tensor {
        Tensor::column(&self.data)
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        let mut it = self.data.iter().copied().filter(|v| v.is_finite());
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[](0x0)");
        }
        if self.shape.len() > 2 {
            return write!(f, "[{} array]", dims_label(&self.shape));
        }
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, "; ")?;
            }
            for j in 0..self.cols {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", format_short_g(self.get2(i, j)))?;
            }
        }
        write!(f, "]")
    }
}

fn dims_label(shape: &[usize]) -> String {
    shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("x")
}

/// `%g`-style rendering used for diagnostics and tick labels.
pub fn format_short_g(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let exp = value.abs().log10().floor() as i32;
    if !(-5..6).contains(&exp) {
        let mantissa = value / 10f64.powi(exp);
        let mantissa = trim_decimal(&format!("{mantissa:.4}"));
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}e{sign}{:02}", exp.abs());
    }
    let decimals = (4 - exp).clamp(0, 10) as usize;
    trim_decimal(&format!("{value:.decimals$}"))
}

fn trim_decimal(text: &str) -> String {
    if !text.contains('.') {
        return text.to_string();
    }
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

impl Value {
    pub fn class_name(&self) -> &'static str {
        match self {
            Value::Empty | Value::Num(_) | Value::Tensor(_) => "double",
            Value::Bool(_) => "logical",
            Value::String(_) => "char",
            Value::Cell(_) => "cell",
            Value::Struct(_) => "struct",
            Value::FunctionHandle(_) => "function_handle",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Tensor(t) => t.is_empty(),
            Value::String(s) => s.is_empty(),
            Value::Cell(c) => c.is_empty(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Empty | Value::Num(_) | Value::Bool(_) | Value::Tensor(_)
        )
    }

    /// Scalar view of numeric and logical values (including 1x1 tensors).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Tensor(t) if t.len() == 1 => Some(t.data[0]),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Numeric array view; scalars become 1x1 and `[]` becomes 0x0.
    pub fn to_tensor(&self) -> Option<Tensor> {
        match self {
            Value::Empty => Some(Tensor {
                data: Vec::new(),
                shape: vec![0, 0],
                rows: 0,
                cols: 0,
            }),
            Value::Num(n) => Some(Tensor::scalar(*n)),
            Value::Bool(b) => Some(Tensor::scalar(if *b { 1.0 } else { 0.0 })),
            Value::Tensor(t) => Some(t.clone()),
            _ => None,
        }
    }

    /// Flat numeric contents, or `None` for non-numeric values.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        self.to_tensor().map(|t| t.data)
    }

    pub fn is_string_list(&self) -> bool {
        match self {
            Value::String(_) => true,
            Value::Cell(items) => items.iter().all(|v| matches!(v, Value::String(_))),
            _ => false,
        }
    }

    /// Display lines of a text-like value: a string splits on newlines, a
    /// cell contributes one line per element and numbers are formatted.
    pub fn text_lines(&self) -> Vec<String> {
        match self {
            Value::Empty => Vec::new(),
            Value::String(s) => s.split('\n').map(str::to_string).collect(),
            Value::Num(n) => vec![format_short_g(*n)],
            Value::Bool(b) => vec![if *b { "1" } else { "0" }.to_string()],
            Value::Tensor(t) => t.data.iter().map(|v| format_short_g(*v)).collect(),
            Value::Cell(items) => items.iter().flat_map(Value::text_lines).collect(),
            other => vec![other.to_string()],
        }
    }

    pub fn row(values: &[f64]) -> Value {
        Value::Tensor(Tensor::row(values))
    }

    pub fn string_cell<S: AsRef<str>>(items: &[S]) -> Value {
        Value::Cell(
            items
                .iter()
                .map(|s| Value::String(s.as_ref().to_string()))
                .collect(),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "[](0x0)"),
            Value::Num(n) => write!(f, "{}", format_short_g(*n)),
            Value::Bool(b) => write!(f, "{}", if *b { 1 } else { 0 }),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Tensor(t) => write!(f, "{t}"),
            Value::Cell(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            Value::Struct(st) => write!(f, "struct(fields={})", st.fields.len()),
            Value::FunctionHandle(name) => write!(f, "@{name}"),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Tensor> for Value {
    fn from(t: Tensor) -> Self {
        Value::Tensor(t)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self {
        Value::Struct(s)
    }
}
