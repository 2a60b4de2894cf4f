//! Merge-based component state.
//!
//! A [`State`] owns a single record (a JSON object) and offers two writes:
//! a shallow merge and a full replace. Before the owning component renders
//! for the first time the container is unbound and writes apply directly,
//! which lets constructors seed state. During render the host runtime binds
//! the container to its per-instance reactive cell ([`State::bind`]); from
//! then on every write is sent to the host as an updater and triggers a
//! re-render.
//!
//! ```
//! use quanta_comp_core::State;
//! use serde_json::json;
//!
//! let state = State::new();
//! state.merge(&json!({"expanded": false, "label": "More"})).unwrap();
//! state.merge(&json!({"expanded": true})).unwrap();
//!
//! assert_eq!(state.record()["expanded"], json!(true));
//! assert_eq!(state.record()["label"], json!("More"));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{CompError, CompResult, value_kind};

/// A state record: field name to value.
pub type StateRecord = Map<String, Value>;

/// A pending state change, applied by whoever owns the reactive cell.
pub type StateUpdater = Box<dyn FnOnce(&StateRecord) -> StateRecord>;

/// The host runtime's setter for a bound reactive cell.
///
/// Calling it applies the updater to the cell's current value and schedules
/// a re-render of the owning component.
pub type StateSetter = Rc<dyn Fn(StateUpdater)>;

/// Hook applied to every record before it is stored.
pub type StateTranslator = Rc<dyn Fn(StateRecord) -> StateRecord>;

/// Field set by [`State::ensure_visibility_defaults`].
pub const FIELD_VISIBLE: &str = "visible";
/// Field set by [`State::ensure_visibility_defaults`].
pub const FIELD_ENABLED: &str = "enabled";

/// A lazily bound, merge-based state cell.
///
/// Cloning yields another handle to the same record, so a state container
/// can be shared between a component and the code that built it.
#[derive(Clone, Default)]
pub struct State {
    record: Rc<RefCell<StateRecord>>,
    setter: Rc<RefCell<Option<StateSetter>>>,
    translator: Rc<RefCell<Option<StateTranslator>>>,
}

impl State {
    /// Create an empty, unbound state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unbound state seeded with `record`.
    pub fn with_record(record: StateRecord) -> Self {
        let state = Self::default();
        *state.record.borrow_mut() = record;
        state
    }

    /// Install a translator applied to every stored record.
    pub fn set_translator(&self, translator: impl Fn(StateRecord) -> StateRecord + 'static) {
        *self.translator.borrow_mut() = Some(Rc::new(translator));
    }

    /// Whether the state is bound to a host reactive cell.
    pub fn is_bound(&self) -> bool {
        self.setter.borrow().is_some()
    }

    /// Bind to the host's reactive cell.
    ///
    /// Called on every render with the cell's current value and setter; the
    /// local record is refreshed from the cell.
    pub fn bind(&self, current: StateRecord, setter: StateSetter) {
        *self.record.borrow_mut() = current;
        *self.setter.borrow_mut() = Some(setter);
    }

    /// Snapshot of the current record.
    pub fn record(&self) -> StateRecord {
        self.record.borrow().clone()
    }

    /// Read the record without cloning.
    pub fn with_record_ref<R>(&self, f: impl FnOnce(&StateRecord) -> R) -> R {
        f(&self.record.borrow())
    }

    /// Read a single field.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.record.borrow().get(name).cloned()
    }

    /// Deserialize the whole record into a typed view.
    pub fn get<T: DeserializeOwned>(&self) -> CompResult<T> {
        let value = Value::Object(self.record());
        Ok(serde_json::from_value(value)?)
    }

    /// Shallow-merge a serializable value into the record.
    pub fn merge<T: Serialize + ?Sized>(&self, partial: &T) -> CompResult<()> {
        self.merge_record(to_record(partial)?);
        Ok(())
    }

    /// Replace the record with a serializable value.
    pub fn replace<T: Serialize + ?Sized>(&self, record: &T) -> CompResult<()> {
        self.replace_record(to_record(record)?);
        Ok(())
    }

    /// Shallow-merge `partial` into the record.
    pub fn merge_record(&self, partial: StateRecord) {
        tracing::trace!(target: "quanta_comp::state", fields = partial.len(), bound = self.is_bound(), "merge state");
        self.apply(Box::new(move |current| {
            let mut next = current.clone();
            for (name, value) in partial {
                next.insert(name, value);
            }
            next
        }));
    }

    /// Replace the record with `record`.
    pub fn replace_record(&self, record: StateRecord) {
        tracing::trace!(target: "quanta_comp::state", fields = record.len(), bound = self.is_bound(), "replace state");
        self.apply(Box::new(move |_| record));
    }

    /// Fill `visible` and `enabled` with `true` when absent.
    ///
    /// A bound state writes the defaults through the host cell so the next
    /// bind keeps them. Nothing is written when both fields are present.
    pub fn ensure_visibility_defaults(&self) {
        let missing = self.with_record_ref(|record| {
            [FIELD_VISIBLE, FIELD_ENABLED]
                .iter()
                .any(|field| !record.contains_key(*field))
        });
        if !missing {
            return;
        }
        self.apply(Box::new(|current| {
            let mut next = current.clone();
            for field in [FIELD_VISIBLE, FIELD_ENABLED] {
                next.entry(field.to_string()).or_insert(Value::Bool(true));
            }
            next
        }));
    }

    fn apply(&self, updater: StateUpdater) {
        let translator = self.translator.borrow().clone();
        let record = Rc::clone(&self.record);
        let write_through: StateUpdater = Box::new(move |current| {
            let mut next = updater(current);
            if let Some(translate) = translator {
                next = translate(next);
            }
            *record.borrow_mut() = next.clone();
            next
        });

        let setter = self.setter.borrow().clone();
        match setter {
            Some(setter) => setter(write_through),
            None => {
                let current = self.record();
                write_through(&current);
            }
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("record", &*self.record.borrow())
            .field("bound", &self.is_bound())
            .finish()
    }
}

fn to_record<T: Serialize + ?Sized>(value: &T) -> CompResult<StateRecord> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        // `None`/unit state means "empty record".
        Value::Null => Ok(StateRecord::new()),
        other => Err(CompError::StateNotRecord {
            found: value_kind(&other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::cell::Cell;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct PanelState {
        #[serde(default)]
        expanded: bool,
        #[serde(default)]
        title: Option<String>,
    }

    #[test]
    fn test_unbound_merge_and_replace() {
        let state = State::new();
        state.merge(&json!({"a": 1, "b": 2})).unwrap();
        state.merge(&json!({"b": 3})).unwrap();
        assert_eq!(Value::Object(state.record()), json!({"a": 1, "b": 3}));

        state.replace(&json!({"c": 4})).unwrap();
        assert_eq!(Value::Object(state.record()), json!({"c": 4}));
    }

    #[test]
    fn test_typed_access() {
        let state = State::new();
        state
            .merge(&PanelState {
                expanded: true,
                title: Some("Files".into()),
            })
            .unwrap();
        let typed: PanelState = state.get().unwrap();
        assert!(typed.expanded);
        assert_eq!(typed.title.as_deref(), Some("Files"));
    }

    #[test]
    fn test_non_record_rejected() {
        let state = State::new();
        let err = state.merge(&json!(["x"])).unwrap_err();
        assert!(matches!(err, CompError::StateNotRecord { found: "array" }));
        assert!(state.record().is_empty());
    }

    #[test]
    fn test_bound_writes_go_through_setter() {
        let state = State::new();
        state.merge(&json!({"count": 1})).unwrap();

        let cell = Rc::new(RefCell::new(state.record()));
        let renders = Rc::new(Cell::new(0));
        let setter: StateSetter = {
            let cell = Rc::clone(&cell);
            let renders = Rc::clone(&renders);
            Rc::new(move |updater: StateUpdater| {
                let next = updater(&cell.borrow());
                *cell.borrow_mut() = next;
                renders.set(renders.get() + 1);
            })
        };
        state.bind(cell.borrow().clone(), setter);
        assert!(state.is_bound());

        state.merge(&json!({"count": 2})).unwrap();
        assert_eq!(renders.get(), 1);
        assert_eq!(cell.borrow()["count"], json!(2));
        // Write-through keeps the local record current.
        assert_eq!(state.field("count"), Some(json!(2)));
    }

    #[test]
    fn test_translator_applies_to_writes() {
        let state = State::new();
        state.set_translator(|mut record| {
            if let Some(Value::String(s)) = record.get_mut("name") {
                *s = s.to_uppercase();
            }
            record
        });
        state.merge(&json!({"name": "quanta"})).unwrap();
        assert_eq!(state.field("name"), Some(json!("QUANTA")));
    }

    #[test]
    fn test_visibility_defaults() {
        let state = State::with_record(json!({"visible": false}).as_object().cloned().unwrap());
        state.ensure_visibility_defaults();
        assert_eq!(state.field(FIELD_VISIBLE), Some(json!(false)));
        assert_eq!(state.field(FIELD_ENABLED), Some(json!(true)));
    }

    #[test]
    fn test_bound_visibility_defaults_survive_rebind() {
        let cell = Rc::new(RefCell::new(json!({"x": 1}).as_object().cloned().unwrap()));
        let writes = Rc::new(Cell::new(0));
        let setter: StateSetter = {
            let cell = Rc::clone(&cell);
            let writes = Rc::clone(&writes);
            Rc::new(move |updater: StateUpdater| {
                let next = updater(&cell.borrow());
                *cell.borrow_mut() = next;
                writes.set(writes.get() + 1);
            })
        };
        let state = State::new();
        state.bind(cell.borrow().clone(), Rc::clone(&setter));

        state.ensure_visibility_defaults();
        assert_eq!(writes.get(), 1);
        assert_eq!(
            Value::Object(cell.borrow().clone()),
            json!({"x": 1, "visible": true, "enabled": true})
        );

        // The next render binds from the host cell again.
        state.bind(cell.borrow().clone(), setter);
        assert_eq!(state.field(FIELD_ENABLED), Some(json!(true)));

        // Already present: no further write.
        state.ensure_visibility_defaults();
        assert_eq!(writes.get(), 1);
    }

    #[test]
    fn test_clones_share_record() {
        let state = State::new();
        let shared = state.clone();
        shared.merge(&json!({"x": true})).unwrap();
        assert_eq!(state.field("x"), Some(json!(true)));
    }
}
