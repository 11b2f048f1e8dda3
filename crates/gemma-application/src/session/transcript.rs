//! Reconciliation of panel-held transcripts with the stored ones.

use gemma_core::topic::ChatMessage;

/// Outcome of comparing a panel's transcript with the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// Both transcripts are identical.
    UpToDate,
    /// The stored transcript is a strict prefix; these messages are missing.
    Append(Vec<ChatMessage>),
    /// The panel copy rewrites or drops stored history.
    Diverged,
}

/// Compares `supplied` against `stored` without ever rewriting stored history.
///
/// Messages match on content alone; display times are not compared.
pub fn reconcile(stored: &[ChatMessage], supplied: &[ChatMessage]) -> Reconciliation {
    let is_prefix = supplied.len() >= stored.len()
        && stored
            .iter()
            .zip(supplied)
            .all(|(kept, offered)| kept.same_content(offered));
    if !is_prefix {
        return Reconciliation::Diverged;
    }

    if supplied.len() == stored.len() {
        Reconciliation::UpToDate
    } else {
        Reconciliation::Append(supplied[stored.len()..].to_vec())
    }
}
