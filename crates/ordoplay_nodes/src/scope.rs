// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declaration scope tracking.
//!
//! A frame must be declared as
//! `begin_editor (begin_node (begin_*_attribute end_attribute)* end_node)* link* end_editor`.
//! Any call made out of that order is a caller bug and panics.

/// Where in the declaration sequence the editor currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Outside any frame
    #[default]
    None,
    /// Inside the editor, nodes may still be declared
    Editor,
    /// Inside the editor after the first link; only links may follow
    Links,
    /// Inside a node
    Node,
    /// Inside an attribute of a node
    Attribute,
}

impl Scope {
    /// Panic unless the current scope is one of `allowed`
    #[track_caller]
    pub fn expect(self, allowed: &[Scope], call: &str) {
        assert!(
            allowed.contains(&self),
            "{call} called in {self:?} scope, expected one of {allowed:?}"
        );
    }

    /// Check scope and move to `next`
    #[track_caller]
    pub fn transition(&mut self, allowed: &[Scope], next: Scope, call: &str) {
        self.expect(allowed, call);
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transition() {
        let mut scope = Scope::None;
        scope.transition(&[Scope::None], Scope::Editor, "begin_editor");
        scope.transition(&[Scope::Editor], Scope::Node, "begin_node");
        assert_eq!(scope, Scope::Node);
    }

    #[test]
    #[should_panic(expected = "end_node called in Editor scope")]
    fn test_invalid_transition_panics() {
        let mut scope = Scope::Editor;
        scope.transition(&[Scope::Node], Scope::Editor, "end_node");
    }
}
