//! Argument logging.
//!
//! Logs a call and its bound arguments before the call runs:
//!
//! ```text
//! DEBUG: log_args_fn(arg_0='arg_0 value', arg_1=1234)
//! ```
//!
//! Two front ends share the formatting here:
//!
//! - the `#[log_args]` attribute (re-exported from `mklog-macros`) for plain
//!   Rust functions, where parameter names are captured at compile time;
//! - [`ArgLogger::wrap`], a combinator for callables invoked with dynamic
//!   positional/keyword arguments against an explicit [`Signature`].

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::event::CallSite;
use crate::facility::Facility;
use crate::level::{IntoLevel, Level};

/// A bound argument value, displayed in literal form.
///
/// Strings are single-quoted (double-quoted when they contain a single quote
/// and no double quote) with control characters escaped as `\xNN`. Booleans
/// render as `True`/`False`, a missing value as `None`, sequences as `[..]`
/// and tuples as `(..)`.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    None,
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    List(Vec<ArgValue>),
    Tuple(Vec<ArgValue>),
    /// Pre-rendered text, written as-is.
    Raw(String),
}

impl ArgValue {
    /// Wrap a value's `Debug` output for types without a [`ToArgValue`] impl.
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        ArgValue::Raw(format!("{value:?}"))
    }
}

fn write_str_repr(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    write!(f, "{quote}")?;
    for ch in s.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c == quote => write!(f, "\\{c}")?,
            c if c.is_control() => write!(f, "\\x{:02x}", u32::from(c))?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "{quote}")
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[ArgValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::None => f.write_str("None"),
            ArgValue::Bool(true) => f.write_str("True"),
            ArgValue::Bool(false) => f.write_str("False"),
            ArgValue::Int(i) => write!(f, "{i}"),
            ArgValue::Float(x) => write!(f, "{x:?}"),
            ArgValue::Str(s) => write_str_repr(f, s),
            ArgValue::List(items) => {
                f.write_str("[")?;
                write_seq(f, items)?;
                f.write_str("]")
            }
            ArgValue::Tuple(items) => {
                f.write_str("(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            ArgValue::Raw(text) => f.write_str(text),
        }
    }
}

/// Conversion of a parameter value into its logged form.
pub trait ToArgValue {
    fn to_arg_value(&self) -> ArgValue;
}

impl ToArgValue for ArgValue {
    fn to_arg_value(&self) -> ArgValue {
        self.clone()
    }
}

impl<T: ToArgValue + ?Sized> ToArgValue for &T {
    fn to_arg_value(&self) -> ArgValue {
        (**self).to_arg_value()
    }
}

impl<T: ToArgValue + ?Sized> ToArgValue for &mut T {
    fn to_arg_value(&self) -> ArgValue {
        (**self).to_arg_value()
    }
}

impl<T: ToArgValue + ?Sized> ToArgValue for Box<T> {
    fn to_arg_value(&self) -> ArgValue {
        (**self).to_arg_value()
    }
}

impl ToArgValue for str {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.to_owned())
    }
}

impl ToArgValue for String {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.clone())
    }
}

impl ToArgValue for Cow<'_, str> {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.to_string())
    }
}

impl ToArgValue for char {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.to_string())
    }
}

impl ToArgValue for bool {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Bool(*self)
    }
}

macro_rules! int_arg_value {
    ($($ty:ty),*) => {
        $(
            impl ToArgValue for $ty {
                fn to_arg_value(&self) -> ArgValue {
                    ArgValue::Int(i128::from(*self))
                }
            }
        )*
    };
}

int_arg_value!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl ToArgValue for isize {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Int(*self as i128)
    }
}

impl ToArgValue for usize {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Int(*self as i128)
    }
}

impl ToArgValue for u128 {
    fn to_arg_value(&self) -> ArgValue {
        i128::try_from(*self).map_or_else(|_| ArgValue::Raw(self.to_string()), ArgValue::Int)
    }
}

impl ToArgValue for f32 {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Float(f64::from(*self))
    }
}

impl ToArgValue for f64 {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Float(*self)
    }
}

impl ToArgValue for Path {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Str(self.to_string_lossy().into_owned())
    }
}

impl ToArgValue for PathBuf {
    fn to_arg_value(&self) -> ArgValue {
        self.as_path().to_arg_value()
    }
}

impl<T: ToArgValue> ToArgValue for Option<T> {
    fn to_arg_value(&self) -> ArgValue {
        self.as_ref().map_or(ArgValue::None, ToArgValue::to_arg_value)
    }
}

impl<T: ToArgValue> ToArgValue for [T] {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::List(self.iter().map(ToArgValue::to_arg_value).collect())
    }
}

impl<T: ToArgValue, const N: usize> ToArgValue for [T; N] {
    fn to_arg_value(&self) -> ArgValue {
        self.as_slice().to_arg_value()
    }
}

impl<T: ToArgValue> ToArgValue for Vec<T> {
    fn to_arg_value(&self) -> ArgValue {
        self.as_slice().to_arg_value()
    }
}

impl<A: ToArgValue, B: ToArgValue> ToArgValue for (A, B) {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Tuple(vec![self.0.to_arg_value(), self.1.to_arg_value()])
    }
}

impl<A: ToArgValue, B: ToArgValue, C: ToArgValue> ToArgValue for (A, B, C) {
    fn to_arg_value(&self) -> ArgValue {
        ArgValue::Tuple(vec![
            self.0.to_arg_value(),
            self.1.to_arg_value(),
            self.2.to_arg_value(),
        ])
    }
}

/// Why a call could not be bound to a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    TooManyPositional {
        callable: String,
        expected: usize,
        given: usize,
    },
    MissingArguments {
        callable: String,
        names: Vec<String>,
    },
    UnexpectedKeyword {
        callable: String,
        name: String,
    },
    MultipleValues {
        callable: String,
        name: String,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::TooManyPositional {
                callable,
                expected,
                given,
            } => write!(
                f,
                "{callable}() takes {expected} positional arguments but {given} were given"
            ),
            BindingError::MissingArguments { callable, names } => {
                write!(f, "{callable}() missing required arguments: {}", names.join(", "))
            }
            BindingError::UnexpectedKeyword { callable, name } => {
                write!(f, "{callable}() got an unexpected keyword argument {name:?}")
            }
            BindingError::MultipleValues { callable, name } => {
                write!(f, "{callable}() got multiple values for argument {name:?}")
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: String,
    default: Option<ArgValue>,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, default: impl ToArgValue) -> Self {
        Self {
            name: name.into(),
            default: Some(default.to_arg_value()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn default(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }
}

/// Declared parameter list of a callable, captured when it is wrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    name: String,
    params: Vec<Param>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param::required(name));
        self
    }

    #[must_use]
    pub fn param_default(mut self, name: impl Into<String>, default: impl ToArgValue) -> Self {
        self.params.push(Param::with_default(name, default));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Bind a call: positional arguments fill parameters in declaration
    /// order, keywords fill by name, defaults fill whatever is left.
    pub fn bind(&self, args: CallArgs) -> std::result::Result<BoundCall, BindingError> {
        let CallArgs {
            positional,
            keyword,
        } = args;

        if positional.len() > self.params.len() {
            return Err(BindingError::TooManyPositional {
                callable: self.name.clone(),
                expected: self.params.len(),
                given: positional.len(),
            });
        }

        let mut slots: Vec<Option<ArgValue>> = vec![None; self.params.len()];
        for (slot, value) in slots.iter_mut().zip(positional) {
            *slot = Some(value);
        }

        for (name, value) in keyword {
            let Some(index) = self.params.iter().position(|p| p.name == name) else {
                return Err(BindingError::UnexpectedKeyword {
                    callable: self.name.clone(),
                    name,
                });
            };
            if slots[index].is_some() {
                return Err(BindingError::MultipleValues {
                    callable: self.name.clone(),
                    name,
                });
            }
            slots[index] = Some(value);
        }

        let mut missing = Vec::new();
        let mut call = BoundCall::new(self.name.clone());
        for (param, slot) in self.params.iter().zip(slots) {
            match slot.or_else(|| param.default.clone()) {
                Some(value) => call.push(param.name.clone(), value),
                None => missing.push(param.name.clone()),
            }
        }

        if missing.is_empty() {
            Ok(call)
        } else {
            Err(BindingError::MissingArguments {
                callable: self.name.clone(),
                names: missing,
            })
        }
    }
}

/// Arguments supplied at a call site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    keyword: Vec<(String, ArgValue)>,
}

impl CallArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl ToArgValue) -> Self {
        self.positional.push(value.to_arg_value());
        self
    }

    /// Append a keyword argument.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl ToArgValue) -> Self {
        self.keyword.push((name.into(), value.to_arg_value()));
        self
    }
}

/// A call with every parameter bound, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundCall {
    name: String,
    arguments: Vec<(String, ArgValue)>,
}

impl BoundCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: ArgValue) {
        self.arguments.push((name.into(), value));
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn arguments(&self) -> &[(String, ArgValue)] {
        &self.arguments
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.arguments
            .iter()
            .find(|(arg, _)| arg == name)
            .map(|(_, value)| value)
    }

    /// `name(a=1, b='x')`, restricted to `selection` when given.
    ///
    /// Selected names keep declaration order; names that are not bound are
    /// skipped.
    #[must_use]
    pub fn message<S: AsRef<str>>(&self, selection: Option<&[S]>) -> String {
        let rendered: Vec<String> = self
            .arguments
            .iter()
            .filter(|(name, _)| {
                selection.is_none_or(|names| names.iter().any(|n| n.as_ref() == name))
            })
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{}({})", self.name, rendered.join(", "))
    }
}

/// Build an argument logger emitting at `level`.
///
/// `args_to_log` restricts the logged parameters; `None` logs all of them.
pub fn log_args(level: impl IntoLevel, args_to_log: Option<&[&str]>) -> Result<ArgLogger> {
    Ok(ArgLogger {
        level: level.into_level()?,
        args_to_log: args_to_log.map(|names| names.iter().map(|n| (*n).to_owned()).collect()),
    })
}

/// Emits one line per call describing the bound arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgLogger {
    level: Level,
    args_to_log: Option<Vec<String>>,
}

impl ArgLogger {
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message for a bound call under this logger's selection.
    #[must_use]
    pub fn message(&self, call: &BoundCall) -> String {
        call.message(self.args_to_log.as_deref())
    }

    /// Emit the line for `call` if the facility's threshold allows it.
    pub fn emit(&self, facility: &Facility, site: &CallSite, call: &BoundCall) {
        if facility.enabled(self.level) {
            facility.emit(self.level, site, &self.message(call));
        }
    }

    /// Wrap `f` so each call is bound against `signature` and logged first.
    pub fn wrap<F, R>(self, facility: &Facility, signature: Signature, f: F) -> LoggedFn<'_, F>
    where
        F: Fn(&BoundCall) -> R,
    {
        LoggedFn {
            logger: self,
            facility,
            signature,
            f,
        }
    }
}

/// A callable wrapped by [`ArgLogger::wrap`].
pub struct LoggedFn<'a, F> {
    logger: ArgLogger,
    facility: &'a Facility,
    signature: Signature,
    f: F,
}

impl<F> fmt::Debug for LoggedFn<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggedFn")
            .field("logger", &self.logger)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

impl<F, R> LoggedFn<'_, F>
where
    F: Fn(&BoundCall) -> R,
{
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Bind, log, then invoke the wrapped callable.
    ///
    /// Binding always happens, so a bad call fails even when the log line
    /// would be filtered out. The callable's return value is passed through
    /// untouched.
    #[track_caller]
    pub fn call(&self, args: CallArgs) -> Result<R> {
        let site = CallSite::caller();
        let bound = self.signature.bind(args).map_err(Error::ArgumentBinding)?;
        self.logger.emit(self.facility, &site, &bound);
        Ok((self.f)(&bound))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FacilityConfig;
    use crate::testing::CaptureSink;

    fn facility(level: &str) -> (Facility, CaptureSink) {
        let capture = CaptureSink::new();
        let facility = Facility::new();
        facility
            .init_with(
                &FacilityConfig::new(level).stream(false).color(false),
                vec![Box::new(capture.clone())],
            )
            .unwrap();
        (facility, capture)
    }

    fn sig() -> Signature {
        Signature::new("log_args_fn").param("arg_0").param("arg_1")
    }

    #[test]
    fn repr_of_scalars() {
        assert_eq!("value".to_arg_value().to_string(), "'value'");
        assert_eq!("it's".to_arg_value().to_string(), "\"it's\"");
        assert_eq!("a'b\"c".to_arg_value().to_string(), "'a\\'b\"c'");
        assert_eq!("tab\there".to_arg_value().to_string(), "'tab\\there'");
        assert_eq!(1234i32.to_arg_value().to_string(), "1234");
        assert_eq!((-7i64).to_arg_value().to_string(), "-7");
        assert_eq!(1.0f64.to_arg_value().to_string(), "1.0");
        assert_eq!(true.to_arg_value().to_string(), "True");
        assert_eq!(false.to_arg_value().to_string(), "False");
        assert_eq!("\x1b[31mred".to_arg_value().to_string(), "'\\x1b[31mred'");
        assert_eq!("bell\x07\x7f".to_arg_value().to_string(), "'bell\\x07\\x7f'");
        assert_eq!(None::<i32>.to_arg_value().to_string(), "None");
        assert_eq!(Some("x").to_arg_value().to_string(), "'x'");
    }

    #[test]
    fn repr_of_collections() {
        assert_eq!(vec![1i32, 2].to_arg_value().to_string(), "[1, 2]");
        assert_eq!(("a", 1i32).to_arg_value().to_string(), "('a', 1)");
        assert_eq!(ArgValue::Tuple(vec![ArgValue::Int(1)]).to_string(), "(1,)");
        assert_eq!(ArgValue::debug(&[1u8]).to_string(), "[1]");
    }

    #[test]
    fn bind_positional() {
        let call = sig().bind(CallArgs::new().arg("value").arg(1234)).unwrap();
        assert_eq!(call.message::<&str>(None), "log_args_fn(arg_0='value', arg_1=1234)");
    }

    #[test]
    fn bind_keyword_keeps_declaration_order() {
        let call = sig()
            .bind(CallArgs::new().kwarg("arg_1", 2).kwarg("arg_0", "x"))
            .unwrap();
        assert_eq!(call.message::<&str>(None), "log_args_fn(arg_0='x', arg_1=2)");
    }

    #[test]
    fn bind_applies_defaults() {
        let signature = Signature::new("connect")
            .param("host")
            .param_default("port", 8080)
            .param_default("tls", false);
        let call = signature
            .bind(CallArgs::new().arg("db").kwarg("tls", true))
            .unwrap();
        assert_eq!(call.get("port"), Some(&ArgValue::Int(8080)));
        assert_eq!(
            call.message::<&str>(None),
            "connect(host='db', port=8080, tls=True)"
        );
    }

    #[test]
    fn bind_errors() {
        assert!(matches!(
            sig().bind(CallArgs::new().arg(1).arg(2).arg(3)),
            Err(BindingError::TooManyPositional { expected: 2, given: 3, .. })
        ));
        assert_eq!(
            sig().bind(CallArgs::new()),
            Err(BindingError::MissingArguments {
                callable: "log_args_fn".into(),
                names: vec!["arg_0".into(), "arg_1".into()],
            })
        );
        assert!(matches!(
            sig().bind(CallArgs::new().arg(1).arg(2).kwarg("arg_2", 3)),
            Err(BindingError::UnexpectedKeyword { name, .. }) if name == "arg_2"
        ));
        assert!(matches!(
            sig().bind(CallArgs::new().arg(1).kwarg("arg_0", 3)),
            Err(BindingError::MultipleValues { name, .. }) if name == "arg_0"
        ));
    }

    #[test]
    fn selection_preserves_declaration_order_and_skips_unknown() {
        let call = Signature::new("f")
            .param("a")
            .param("b")
            .param("c")
            .bind(CallArgs::new().arg(1).arg(2).arg(3))
            .unwrap();
        assert_eq!(call.message(Some(&["c", "zzz", "a"][..])), "f(a=1, c=3)");
        assert_eq!(call.message::<&str>(Some(&[][..])), "f()");
    }

    #[test]
    fn wrapped_call_logs_then_returns_result() {
        let (facility, capture) = facility("d");
        let logger = log_args(Level::DEBUG, None).unwrap();
        let wrapped = logger.wrap(&facility, sig(), |call| {
            format!("ran with {}", call.arguments().len())
        });

        let out = wrapped.call(CallArgs::new().arg("value").arg(1234)).unwrap();

        assert_eq!(out, "ran with 2");
        assert_eq!(
            capture.lines(),
            vec!["DEBUG: log_args_fn(arg_0='value', arg_1=1234)\n"]
        );
    }

    #[test]
    fn wrapped_call_filtered_below_threshold() {
        let (facility, capture) = facility("i");
        let wrapped = log_args("DEBUG", None)
            .unwrap()
            .wrap(&facility, sig(), |_| 7);
        assert_eq!(wrapped.call(CallArgs::new().arg("v").arg(1)).unwrap(), 7);
        assert!(capture.lines().is_empty());
    }

    #[test]
    fn binding_error_propagates_even_when_filtered() {
        let (facility, capture) = facility("e");
        let wrapped = log_args(Level::DEBUG, None)
            .unwrap()
            .wrap(&facility, sig(), |_| -> i32 { panic!("must not run") });
        let err = wrapped.call(CallArgs::new().arg("only one")).unwrap_err();
        assert!(matches!(
            err,
            Error::ArgumentBinding(BindingError::MissingArguments { .. })
        ));
        assert!(capture.lines().is_empty());
    }

    #[test]
    fn wrapped_errors_pass_through_unchanged() {
        let (facility, capture) = facility("d");
        let wrapped = log_args(Level::INFO, Some(&["arg_1"]))
            .unwrap()
            .wrap(&facility, sig(), |_| Err::<(), _>("boom"));
        let result = wrapped.call(CallArgs::new().arg("a").arg(2)).unwrap();
        assert_eq!(result, Err("boom"));
        assert_eq!(capture.lines(), vec!["INFO: log_args_fn(arg_1=2)\n"]);
    }

    #[test]
    fn unknown_level_name_is_rejected() {
        assert!(matches!(
            log_args("TRACE", None),
            Err(Error::UnknownSeverity(_))
        ));
    }
}
