pub mod board;
pub mod dev_status;
pub mod fields;
pub mod ticket;

pub use board::{Epic, Sprint};
pub use dev_status::{LinkedPullRequests, PullRequestSummary};
pub use ticket::{NewTicket, Ticket, Transition};

use serde::{Deserialize, Deserializer};

/// Reads a list that the server may send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
