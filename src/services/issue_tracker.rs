use async_trait::async_trait;

use crate::domain::ticket::{Ticket, TicketKey, TicketLink};
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Fetches a ticket with its status, labels, summary and links.
    async fn fetch_ticket(&self, key: &TicketKey) -> AppResult<Ticket>;

    /// Every ticket matching `jql`, with the same fields as `fetch_ticket`.
    async fn search_tickets(&self, jql: &str) -> AppResult<Vec<Ticket>>;

    /// Recreates `link` between `owner` and the link's other ticket,
    /// keeping its type and orientation.
    async fn create_link(&self, owner: &TicketKey, link: &TicketLink) -> AppResult<()>;

    async fn delete_link(&self, link_id: &str) -> AppResult<()>;
}
