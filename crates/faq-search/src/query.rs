use std::cell::RefCell;
use std::rc::Rc;

/// The raw query text, shared between the search view and whoever keeps it
/// alive across view changes.
///
/// Anyone holding a handle can read it; only the coordinator writes it.
#[derive(Debug, Clone, Default)]
pub struct QueryStore(Rc<RefCell<String>>);

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self(Rc::new(RefCell::new(text.to_string())))
    }

    pub fn text(&self) -> String {
        self.0.borrow().clone()
    }

    /// Whitespace-only queries count as empty
    pub fn is_blank(&self) -> bool {
        self.0.borrow().trim().is_empty()
    }

    pub(crate) fn replace(&self, text: &str) {
        let mut current = self.0.borrow_mut();
        current.clear();
        current.push_str(text);
    }
}
