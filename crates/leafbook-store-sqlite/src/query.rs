//! Renders a [`PlantQuery`] into parameterised SQL.
//!
//! User-supplied text only ever travels as a bound parameter; the SQL string
//! is assembled from fixed fragments.

use leafbook_core::store::PlantQuery;
use rusqlite::{Connection, functions::FunctionFlags, types::Value};

use crate::encode::PLANT_COLUMNS;

/// A SQL statement together with its positional parameters.
#[derive(Debug)]
pub struct BoundSql {
  pub sql:    String,
  pub params: Vec<Value>,
}

impl BoundSql {
  fn new(base: &str) -> Self {
    Self { sql: base.to_owned(), params: Vec::new() }
  }

  /// Append a fragment whose `?` placeholders are numbered automatically.
  fn push(&mut self, fragment: &str, values: impl IntoIterator<Item = Value>) {
    let mut rendered = String::with_capacity(fragment.len() + 4);
    let mut values = values.into_iter();
    for ch in fragment.chars() {
      if ch == '?' {
        let value = values.next().unwrap_or(Value::Null);
        self.params.push(value);
        rendered.push_str(&format!("?{}", self.params.len()));
      } else {
        rendered.push(ch);
      }
    }
    self.sql.push(' ');
    self.sql.push_str(&rendered);
  }
}

/// SQL function lowercasing its argument with Unicode rules. SQLite's own
/// `lower()` and `LIKE` only fold ASCII letters.
const FOLD_CASE: &str = "fold_case";

/// Register the functions [`select_plants`] relies on.
pub fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    FOLD_CASE,
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|s| s.to_lowercase())),
  )
}

/// Escape LIKE wildcards so `text` is matched literally.
fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for ch in text.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(ch);
  }
  out.push('%');
  out
}

pub fn select_plants(query: &PlantQuery) -> BoundSql {
  let mut stmt = BoundSql::new(&format!("SELECT {PLANT_COLUMNS} FROM plants"));

  if let Some(text) = query.text.as_deref() {
    let pattern = like_pattern(&text.to_lowercase());
    stmt.push(
      &format!(
        "WHERE {FOLD_CASE}(name) LIKE ? ESCAPE '\\' \
         OR {FOLD_CASE}(family) LIKE ? ESCAPE '\\'"
      ),
      [Value::Text(pattern.clone()), Value::Text(pattern)],
    );
  }

  stmt.push("ORDER BY name COLLATE NOCASE, id", []);

  if let Some(limit) = query.limit {
    stmt.push("LIMIT ?", [Value::Integer(limit as i64)]);
  }

  stmt
}
