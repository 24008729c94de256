//! Declarative endpoint binding.
//!
//! Every endpoint is an immutable [`EndpointSpec`]: the remote path, the
//! logical parameter list with defaults, the logical-to-remote name mapping,
//! and the parameters that come from the owning wrapper rather than the call
//! site. [`bind`] turns call arguments into request parameters and [`call`]
//! runs the request and hands the envelope to the endpoint's parser body.

use tracing::trace;

use crate::api::{Api, Envelope, ParamValue, Params};
use crate::error::{ArgumentError, BinderError, Result};

/// Default for a logical parameter that the caller did not supply
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    /// The caller must supply a value
    Required,
    /// Omitted from the request unless supplied
    None,
    Int(i64),
    Bool(bool),
    Str(&'static str),
}

impl ParamDefault {
    fn value(self) -> Option<ParamValue> {
        match self {
            ParamDefault::Required => None,
            ParamDefault::None => Some(ParamValue::None),
            ParamDefault::Int(i) => Some(ParamValue::Int(i)),
            ParamDefault::Bool(b) => Some(ParamValue::Bool(b)),
            ParamDefault::Str(s) => Some(ParamValue::Str(s.to_string())),
        }
    }
}

/// One logical parameter in declaration order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub default: ParamDefault,
}

impl ParamSpec {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: ParamDefault::Required,
        }
    }

    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            default: ParamDefault::None,
        }
    }

    pub const fn with_default(name: &'static str, default: ParamDefault) -> Self {
        Self { name, default }
    }
}

/// Request metadata for one endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointSpec {
    /// Remote path without host or suffix, e.g. `char/AssetList`
    pub path: &'static str,
    /// Logical parameters the caller may pass, in positional order
    pub params: &'static [ParamSpec],
    /// Logical name to remote query parameter name
    pub map_params: &'static [(&'static str, &'static str)],
    /// Logical names whose value is read from the owning wrapper
    pub prop_to_param: &'static [&'static str],
}

impl EndpointSpec {
    /// Endpoint without parameters
    pub const fn bare(path: &'static str) -> Self {
        Self {
            path,
            params: &[],
            map_params: &[],
            prop_to_param: &[],
        }
    }

    fn remote_name(&self, logical: &str) -> Option<&'static str> {
        self.map_params
            .iter()
            .find(|(from, _)| *from == logical)
            .map(|(_, to)| *to)
    }
}

/// Positional and keyword arguments for one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<ParamValue>,
    pub keyword: Vec<(String, ParamValue)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(values: impl IntoIterator<Item = ParamValue>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keyword: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl Into<ParamValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }
}

/// Supplies property-sourced parameters from the wrapper an endpoint is
/// bound to, such as the character id of a `Char`
pub trait ParamSource {
    fn param(&self, name: &str) -> Option<ParamValue>;
}

/// Wrappers with no instance state
impl ParamSource for () {
    fn param(&self, _name: &str) -> Option<ParamValue> {
        None
    }
}

/// Resolve call arguments into remote request parameters.
///
/// Argument misuse fails with [`ArgumentError`]. A parameter with no remote
/// name, or a property the source cannot supply, is a declaration defect and
/// fails with [`BinderError`]. Parameters resolving to `None` are left out.
pub fn bind(spec: &EndpointSpec, source: &dyn ParamSource, args: CallArgs) -> Result<Params> {
    let endpoint = spec.path;

    if args.positional.len() > spec.params.len() {
        return Err(ArgumentError::TooManyArguments {
            endpoint: endpoint.to_string(),
            max: spec.params.len(),
            given: args.positional.len(),
        }
        .into());
    }

    let mut bound: Vec<(&'static str, ParamValue)> = spec
        .params
        .iter()
        .zip(args.positional)
        .map(|(param, value)| (param.name, value))
        .collect();

    for (name, value) in args.keyword {
        let Some(param) = spec.params.iter().find(|p| p.name == name) else {
            return Err(ArgumentError::UnexpectedKeyword {
                endpoint: endpoint.to_string(),
                name,
            }
            .into());
        };
        if bound.iter().any(|(n, _)| *n == param.name) {
            return Err(ArgumentError::DuplicateArgument {
                endpoint: endpoint.to_string(),
                name,
            }
            .into());
        }
        bound.push((param.name, value));
    }

    for param in spec.params {
        if bound.iter().any(|(n, _)| *n == param.name) {
            continue;
        }
        match param.default.value() {
            Some(value) => bound.push((param.name, value)),
            None => {
                return Err(ArgumentError::MissingArgument {
                    endpoint: endpoint.to_string(),
                    name: param.name.to_string(),
                }
                .into());
            }
        }
    }

    for &name in spec.prop_to_param {
        let value = source.param(name).ok_or_else(|| BinderError::MissingProperty {
            endpoint: endpoint.to_string(),
            name: name.to_string(),
        })?;
        match bound.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => bound.push((name, value)),
        }
    }

    let mut params = Params::new();
    for (name, value) in bound {
        let remote = spec
            .remote_name(name)
            .ok_or_else(|| BinderError::UnmappedParameter {
                endpoint: endpoint.to_string(),
                name: name.to_string(),
            })?;
        if value.is_none() {
            trace!(endpoint, param = name, "Dropping unset parameter");
            continue;
        }
        params.insert(remote, value);
    }

    trace!(endpoint, params = params.len(), "Bound endpoint arguments");
    Ok(params)
}

/// Bind, fetch and parse one endpoint call.
///
/// With a `prefetched` envelope the request is skipped and `body` runs on
/// that envelope directly; arguments are still validated.
pub fn call<T>(
    api: &Api,
    spec: &EndpointSpec,
    source: &dyn ParamSource,
    args: CallArgs,
    prefetched: Option<Envelope>,
    body: impl FnOnce(Envelope) -> Result<T>,
) -> Result<T> {
    let params = bind(spec, source, args)?;

    let envelope = match prefetched {
        Some(envelope) => {
            trace!(endpoint = spec.path, "Using prefetched envelope");
            envelope
        }
        None => api.fetch(spec.path, &params)?,
    };

    body(envelope)
}
