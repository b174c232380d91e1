//! Event identifiers.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Opaque token naming a stimulus fed to the machine.
///
/// Any value is a valid event, including the empty string. The engine never
/// interprets events; it stamps them into the event context for the action
/// to read back with [`event_from_context`](crate::context::event_from_context).
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Event(Cow<'static, str>);

impl Event {
    pub const fn from_static(name: &'static str) -> Self {
        Event(Cow::Borrowed(name))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Event {
    fn from(name: &'static str) -> Self {
        Event::from_static(name)
    }
}

impl From<String> for Event {
    fn from(name: String) -> Self {
        Event(Cow::Owned(name))
    }
}

impl PartialEq<str> for Event {
    fn eq(&self, other: &str) -> bool {
        self.name() == other
    }
}

impl PartialEq<&str> for Event {
    fn eq(&self, other: &&str) -> bool {
        self.name() == *other
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
