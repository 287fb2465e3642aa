//! Message selection predicates.
//!
//! A predicate decides whether a header takes part in a template scan or an
//! index build. Composition is explicit: [`AnyOf`] selects a message when at
//! least one member matches (an empty set matches everything), [`AllOf`]
//! requires every member.

use crate::header::MessageHeader;

/// A boolean test over one message header.
pub trait Predicate: Send + Sync {
    fn matches(&self, header: &MessageHeader) -> bool;
}

impl<F> Predicate for F
where
    F: Fn(&MessageHeader) -> bool + Send + Sync,
{
    fn matches(&self, header: &MessageHeader) -> bool {
        self(header)
    }
}

/// Logical OR over a set of predicates. An empty set matches everything,
/// so "no selection" means "take all".
#[derive(Default)]
pub struct AnyOf {
    members: Vec<Box<dyn Predicate>>,
}

impl AnyOf {
    pub fn new(members: Vec<Box<dyn Predicate>>) -> Self {
        Self { members }
    }

    pub fn push(&mut self, predicate: Box<dyn Predicate>) {
        self.members.push(predicate);
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for AnyOf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyOf")
            .field("members", &self.members.len())
            .finish()
    }
}

impl Predicate for AnyOf {
    fn matches(&self, header: &MessageHeader) -> bool {
        self.members.is_empty() || self.members.iter().any(|p| p.matches(header))
    }
}

/// Logical AND over a set of predicates. An empty set matches everything.
#[derive(Default)]
pub struct AllOf {
    members: Vec<Box<dyn Predicate>>,
}

impl AllOf {
    pub fn new(members: Vec<Box<dyn Predicate>>) -> Self {
        Self { members }
    }

    pub fn push(&mut self, predicate: Box<dyn Predicate>) {
        self.members.push(predicate);
    }
}

impl Predicate for AllOf {
    fn matches(&self, header: &MessageHeader) -> bool {
        self.members.iter().all(|p| p.matches(header))
    }
}
