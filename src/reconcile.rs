//! Arbitration of element names the server reports for a collection's members.
//!
//! A response normally names each object with the schema element of the kind the caller asked
//! for. Servers may instead report a meeting message under its concrete kind, and some older
//! servers vary the casing of those names. Only the meeting kinds below may stand in for another
//! kind, and only when the session allows it.

use crate::types::ServiceObjectType;

static COMPATIBLE_TYPES: [(&str, ServiceObjectType); 4] = [
    ("MeetingMessage", ServiceObjectType::MeetingMessage),
    ("MeetingCancellation", ServiceObjectType::MeetingCancellation),
    ("MeetingRequest", ServiceObjectType::MeetingRequest),
    ("MeetingResponse", ServiceObjectType::MeetingResponse),
];

/// The outcome of comparing a reported element name with the expected one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeMatch {
    /// The names are identical.
    Exact,
    /// The reported kind is a compatible substitute for the expected one.
    Substituted(ServiceObjectType),
    /// The reported kind cannot be used in place of the expected one.
    Rejected,
}

/// Look up a substitutable kind by element name, ignoring ASCII case.
pub fn compatible_type(name: &str) -> Option<ServiceObjectType> {
    COMPATIBLE_TYPES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|&(_, kind)| kind)
}

/// Decide whether an element named `observed` may be loaded into an object of kind `target`
/// whose element name is `expected`.
///
/// `observed` and `expected` are compared byte for byte. When they differ the element is only
/// accepted if `allow_relaxed` is set and `observed` names a substitutable kind that derives
/// from `target`.
pub fn reconcile(
    observed: &str,
    expected: &str,
    target: ServiceObjectType,
    allow_relaxed: bool,
) -> TypeMatch {
    if observed == expected {
        return TypeMatch::Exact;
    }
    if !allow_relaxed {
        return TypeMatch::Rejected;
    }
    match compatible_type(observed) {
        Some(kind) if target.is_assignable_from(kind) => TypeMatch::Substituted(kind),
        _ => TypeMatch::Rejected,
    }
}
