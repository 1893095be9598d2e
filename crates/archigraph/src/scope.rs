//! The stack of open diagram and cluster scopes.
//!
//! Every [`Diagram`](crate::Diagram) owns one [`ScopeStack`]. The bottom entry is
//! the diagram's root cluster; each open nested cluster sits above its parent. The
//! top entry owns any node created "now".
//!
//! Pops name the scope they expect to close, so mismatched nesting is detected at
//! the call that causes it rather than silently closing the wrong cluster.

use log::debug;

use archigraph_core::identifier::ClusterId;

use crate::error::ConstructionError;

/// Ordered list of currently open scopes, innermost last.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<ClusterId>,
}

impl ScopeStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens `scope` on top of the stack.
    pub fn push(&mut self, scope: ClusterId) {
        self.scopes.push(scope);
        debug!(scope:% = scope, depth = self.scopes.len(); "Scope opened");
    }

    /// Closes `expected`, which must be the innermost open scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MismatchedScope`] if another scope is on top and
    /// [`ConstructionError::EmptyScopeStack`] if nothing is open. The stack is left
    /// unchanged on error.
    pub fn pop(&mut self, expected: ClusterId) -> Result<ClusterId, ConstructionError> {
        match self.scopes.last().copied() {
            Some(found) if found == expected => {
                self.scopes.pop();
                debug!(scope:% = found, depth = self.scopes.len(); "Scope closed");
                Ok(found)
            }
            Some(found) => Err(ConstructionError::MismatchedScope { expected, found }),
            None => Err(ConstructionError::EmptyScopeStack { expected }),
        }
    }

    /// Closes every scope above and including `scope`.
    ///
    /// Used to release scopes on failure paths. Returns the scopes that were closed,
    /// innermost first; nothing is closed if `scope` is not open.
    pub fn unwind_to(&mut self, scope: ClusterId) -> Vec<ClusterId> {
        let Some(position) = self.scopes.iter().rposition(|open| *open == scope) else {
            return Vec::new();
        };
        let mut released: Vec<ClusterId> = self.scopes.drain(position..).collect();
        released.reverse();
        debug!(released = released.len(), depth = self.scopes.len(); "Scopes unwound");
        released
    }

    /// Returns the innermost open scope.
    pub fn current(&self) -> Option<ClusterId> {
        self.scopes.last().copied()
    }

    /// Returns the number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Returns the open scopes from outermost to innermost.
    pub fn iter(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.scopes.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use archigraph_core::identifier::IdGenerator;

    use super::*;

    fn scopes(count: usize) -> Vec<ClusterId> {
        let mut ids = IdGenerator::new();
        (0..count).map(|_| ids.next_cluster()).collect()
    }

    #[test]
    fn test_push_pop_balanced() {
        let ids = scopes(3);
        let mut stack = ScopeStack::new();
        for id in &ids {
            stack.push(*id);
        }

        assert_eq!(stack.depth(), 3);
        assert_eq!(stack.current(), Some(ids[2]));

        assert_eq!(stack.pop(ids[2]), Ok(ids[2]));
        assert_eq!(stack.pop(ids[1]), Ok(ids[1]));
        assert_eq!(stack.pop(ids[0]), Ok(ids[0]));
        assert!(stack.is_empty());
        assert_eq!(stack.current(), None);
    }

    #[test]
    fn test_pop_mismatched_scope() {
        let ids = scopes(2);
        let mut stack = ScopeStack::new();
        stack.push(ids[0]);
        stack.push(ids[1]);

        let err = stack.pop(ids[0]).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::MismatchedScope {
                expected: ids[0],
                found: ids[1]
            }
        );
        // The stack is untouched after a failed pop
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_pop_empty_stack() {
        let ids = scopes(1);
        let mut stack = ScopeStack::new();
        assert_eq!(
            stack.pop(ids[0]),
            Err(ConstructionError::EmptyScopeStack { expected: ids[0] })
        );
    }

    #[test]
    fn test_unwind_to() {
        let ids = scopes(4);
        let mut stack = ScopeStack::new();
        for id in &ids {
            stack.push(*id);
        }

        let released = stack.unwind_to(ids[1]);
        assert_eq!(released, vec![ids[3], ids[2], ids[1]]);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec![ids[0]]);
    }

    #[test]
    fn test_unwind_to_unknown_scope() {
        let ids = scopes(2);
        let mut stack = ScopeStack::new();
        stack.push(ids[0]);

        assert!(stack.unwind_to(ids[1]).is_empty());
        assert_eq!(stack.depth(), 1);
    }
}
