/// Prepared statements and parameter binding
///
/// A `Statement` collects parameters for one execution at a time:
/// - keys without a `:` or `@` sigil (including numeric indices) are
///   positional and keep the order of the `bind` calls
/// - `:name` / `@name` keys are named and stored under the literal key,
///   sigil included; binding the same key again replaces the value
///
/// Values are handed to the client as-is. Parameters are cleared by every
/// `execute`, successful or not.
use crate::error::Result;
use crate::models::ExecutionContext;
use crate::result::QueryResult;
use libsql::params::Params;
use libsql::Value;
use tracing::debug;

/// Key passed to [`Statement::bind`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKey {
    Index(usize),
    Name(String),
}

impl ParamKey {
    /// Named keys carry a `:` or `@` sigil; everything else binds positionally.
    pub fn is_named(&self) -> bool {
        match self {
            ParamKey::Index(_) => false,
            ParamKey::Name(name) => is_named_key(name),
        }
    }
}

fn is_named_key(name: &str) -> bool {
    name.starts_with([':', '@'])
}

impl From<usize> for ParamKey {
    fn from(index: usize) -> Self {
        ParamKey::Index(index)
    }
}

impl From<i32> for ParamKey {
    fn from(index: i32) -> Self {
        ParamKey::Index(usize::try_from(index).unwrap_or_default())
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

/// Parameters accumulated for the next execution
#[derive(Debug, Clone, Default)]
pub struct BoundParameters {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl BoundParameters {
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &[(String, Value)] {
        &self.named
    }

    /// Look up a named parameter by its literal key, sigil included
    pub fn get_named(&self, key: &str) -> Option<&Value> {
        self.named.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    fn bind(&mut self, key: ParamKey, value: Value) {
        match key {
            ParamKey::Name(name) if is_named_key(&name) => {
                match self.named.iter_mut().find(|(k, _)| *k == name) {
                    Some((_, slot)) => *slot = value,
                    None => self.named.push((name, value)),
                }
            }
            _ => self.positional.push(value),
        }
    }

    /// Convert into the client's parameter form.
    ///
    /// `slots` lists the placeholder names of the compiled SQL by index
    /// (`None` for an anonymous `?`). When both kinds are bound, the values
    /// are laid out in slot order: named slots take their named value,
    /// the others take positional values in bind order. Without slot
    /// information, positional values are sent as `?1`, `?2`, ... instead.
    pub fn into_params(self, slots: &[Option<String>]) -> Params {
        match (self.positional.is_empty(), self.named.is_empty()) {
            (true, true) => Params::None,
            (false, true) => Params::Positional(self.positional),
            (true, false) => Params::Named(self.named),
            (false, false) if slots.is_empty() => {
                let mut named: Vec<(String, Value)> = self
                    .positional
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (format!("?{}", i + 1), v))
                    .collect();
                named.extend(self.named);
                Params::Named(named)
            }
            (false, false) => {
                let mut positional = self.positional.into_iter();
                let ordered = slots
                    .iter()
                    .map(|slot| match slot {
                        Some(name) if is_named_key(name) => self
                            .named
                            .iter()
                            .find(|(k, _)| k == name)
                            .map_or(Value::Null, |(_, v)| v.clone()),
                        _ => positional.next().unwrap_or(Value::Null),
                    })
                    .collect();
                Params::Positional(ordered)
            }
        }
    }
}

#[derive(Debug)]
pub struct Statement {
    ctx: ExecutionContext,
    sql: String,
    columns: Vec<String>,
    parameter_names: Vec<Option<String>>,
    params: BoundParameters,
}

impl Statement {
    pub(crate) fn new(
        ctx: ExecutionContext,
        sql: String,
        columns: Vec<String>,
        parameter_names: Vec<Option<String>>,
    ) -> Self {
        Statement {
            ctx,
            sql,
            columns,
            parameter_names,
            params: BoundParameters::default(),
        }
    }

    /// Bind a value for the next execution.
    pub fn bind(&mut self, key: impl Into<ParamKey>, value: impl Into<Value>) {
        self.params.bind(key.into(), value.into());
    }

    /// Execute with the bound parameters, then clear them.
    ///
    /// Runs on the connection's active transaction if one is open at call time.
    pub fn execute(&mut self) -> Result<QueryResult> {
        let params = std::mem::take(&mut self.params);
        debug!(conn_id = %self.ctx.conn_id, bound = params.len(), "executing prepared statement");
        self.ctx
            .run(&self.sql, params.into_params(&self.parameter_names))
    }

    /// Clear bound parameters without executing.
    pub fn reset(&mut self) {
        self.params = BoundParameters::default();
    }

    pub fn parameters(&self) -> &BoundParameters {
        &self.params
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Number of result columns reported when the SQL was compiled
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Number of placeholders in the SQL
    pub fn parameter_count(&self) -> usize {
        self.parameter_names.len()
    }

    /// Placeholder names by index, `None` for anonymous `?`
    pub fn parameter_names(&self) -> &[Option<String>] {
        &self.parameter_names
    }
}
