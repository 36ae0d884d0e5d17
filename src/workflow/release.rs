use std::collections::BTreeSet;

use crate::context::AppContext;
use crate::domain::ticket::{Ticket, TicketKey};
use crate::error::{AppError, AppResult};
use crate::workflow::links::substantive_links;

/// JQL selecting every ticket of `project` scheduled for a fix version.
pub fn fix_version_query(project: &str, version_prefix: &str, version: &str) -> String {
    let name = match version_prefix.trim() {
        "" => version.trim().to_string(),
        prefix => format!("{prefix} {}", version.trim()),
    };
    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("project = {project} AND fixVersion = \"{escaped}\"")
}

/// Tickets the tracker schedules for `version` in the configured project.
pub async fn fix_version_tickets(ctx: &AppContext, version: &str) -> AppResult<Vec<Ticket>> {
    if version.trim().is_empty() {
        return Err(AppError::Configuration(
            "fix version must not be empty".to_string(),
        ));
    }
    let jql = fix_version_query(
        &ctx.config.release_project,
        &ctx.config.release_version_prefix,
        version,
    );
    let tickets = ctx.issue_tracker.search_tickets(&jql).await?;
    if tickets.is_empty() {
        tracing::warn!(%jql, "no tickets scheduled for the fix version");
    }
    Ok(tickets)
}

/// Keys of the release tickets plus every ticket they substantively link.
pub fn release_ticket_keys(release_tickets: &[Ticket]) -> BTreeSet<TicketKey> {
    release_tickets
        .iter()
        .flat_map(|ticket| {
            std::iter::once(ticket.key.clone())
                .chain(substantive_links(ticket).into_iter().map(|link| link.other))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::workflow::testing::{FakeRepository, FakeTracker, context, keys, link, ticket};

    #[test]
    fn builds_fix_version_query() {
        assert_eq!(
            fix_version_query("CAP", "ts_xml", " 20.1 "),
            "project = CAP AND fixVersion = \"ts_xml 20.1\""
        );
        assert_eq!(
            fix_version_query("DM", "", "v2"),
            "project = DM AND fixVersion = \"v2\""
        );
        assert_eq!(
            fix_version_query("CAP", "ts_xml", "20.1 \"rc\""),
            "project = CAP AND fixVersion = \"ts_xml 20.1 \\\"rc\\\"\""
        );
    }

    #[test]
    fn collects_release_tickets_and_their_links() {
        let mut first = ticket("CAP-10", "Done", "Release ts_xml 20.1");
        first.links = vec![
            link("1", "relates to", "DM-1"),
            link("2", "is triggering", "DM-2"),
        ];
        let mut second = ticket("CAP-11", "To Do", "Deploy");
        second.links = vec![link("3", "is blocked by", "DM-1")];

        assert_eq!(
            release_ticket_keys(&[first, second]),
            keys(&["CAP-10", "CAP-11", "DM-1"])
        );
    }

    #[tokio::test]
    async fn searches_configured_project_and_prefix() {
        let jql = "project = CAP AND fixVersion = \"ts_xml 20.1\"";
        let tracker = Arc::new(
            FakeTracker::default()
                .with_ticket(ticket("CAP-10", "Done", "Release"))
                .with_search(jql, &["CAP-10"]),
        );
        let ctx = context(Arc::new(FakeRepository::default()), tracker.clone());

        let found = fix_version_tickets(&ctx, "20.1").await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(*tracker.queries.lock().unwrap(), vec![jql]);
        assert_eq!(tracker.lookup_count(), 0);
    }

    #[tokio::test]
    async fn blank_fix_version_is_rejected() {
        let tracker = Arc::new(FakeTracker::default());
        let ctx = context(Arc::new(FakeRepository::default()), tracker.clone());

        let result = fix_version_tickets(&ctx, "  ").await;

        assert!(matches!(result, Err(AppError::Configuration(_))));
        assert!(tracker.queries.lock().unwrap().is_empty());
    }
}
